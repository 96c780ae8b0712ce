//! Letter grades and quality points.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::CourseRecord;
use crate::rng::RngProvider;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub const ALL: [Grade; 5] = [Grade::A, Grade::B, Grade::C, Grade::D, Grade::F];

    /// Numeric weight of the grade on a 4-point scale
    pub fn points(&self) -> f64 {
        match self {
            Grade::A => 4.0,
            Grade::B => 3.0,
            Grade::C => 2.0,
            Grade::D => 1.0,
            Grade::F => 0.0,
        }
    }

    pub fn is_passing(&self) -> bool {
        !matches!(self, Grade::F)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(s)
    }
}

/// A course with its grade. `quality_points == credit_hours * grade.points()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradedCourse {
    #[serde(flatten)]
    pub course: CourseRecord,
    pub grade: Grade,
    pub quality_points: f64,
}

impl GradedCourse {
    pub fn new(course: CourseRecord, grade: Grade) -> Self {
        let quality_points = course.credit_hours * grade.points();
        Self {
            course,
            grade,
            quality_points,
        }
    }
}

/// Relative weights for each letter grade.
///
/// The default only ever yields A or B, at 2:1 odds, which keeps every
/// generated record a strong-student profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeDistribution {
    pub a: u32,
    pub b: u32,
    pub c: u32,
    pub d: u32,
    pub f: u32,
}

impl Default for GradeDistribution {
    fn default() -> Self {
        Self { a: 4, b: 2, c: 0, d: 0, f: 0 }
    }
}

impl GradeDistribution {
    fn weights(&self) -> [u32; 5] {
        [self.a, self.b, self.c, self.d, self.f]
    }

    pub fn validate(&self) -> Result<()> {
        if self.weights().iter().all(|w| *w == 0) {
            return Err(Error::ConfigError("grade distribution has no positive weight".into()));
        }
        Ok(())
    }

    /// Draw one grade.
    pub fn draw<R: RngProvider>(&self, rng: &mut R) -> Result<Grade> {
        rng.weighted_index(&self.weights())
            .map(|i| Grade::ALL[i])
            .ok_or_else(|| Error::ConfigError("grade distribution has no positive weight".into()))
    }
}

/// Grade each course independently from `distribution`.
pub fn assign_grades<R: RngProvider>(
    courses: Vec<CourseRecord>,
    distribution: &GradeDistribution,
    rng: &mut R,
) -> Result<Vec<GradedCourse>> {
    courses
        .into_iter()
        .map(|course| Ok(GradedCourse::new(course, distribution.draw(rng)?)))
        .collect()
}
