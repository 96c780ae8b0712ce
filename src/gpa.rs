//! Term and cumulative GPA arithmetic.

use serde::Serialize;

use crate::grades::GradedCourse;
use crate::{Error, Result};

/// Round to two decimal places, halves away from zero.
pub fn round2(value: f64) -> f64 {
    // Nudge by a tiny epsilon so binary artifacts like 3.674999.. still round up.
    let scaled = value * 100.0;
    let nudged = scaled + scaled.signum() * 1e-9;
    nudged.round() / 100.0
}

/// `quality_points / attempted_hours` rounded, or `DivisionUndefined` for zero hours.
pub fn gpa(quality_points: f64, attempted_hours: f64) -> Result<f64> {
    if attempted_hours <= 0.0 {
        return Err(Error::DivisionUndefined);
    }
    Ok(round2(quality_points / attempted_hours))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TermStats {
    pub attempted_hours: f64,
    pub earned_hours: f64,
    pub quality_points: f64,
    pub gpa: f64,
}

/// Prior history plus every generated term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CumulativeStats {
    pub prior_hours: f64,
    pub prior_gpa: f64,
    pub attempted_hours: f64,
    pub earned_hours: f64,
    pub quality_points: f64,
    pub gpa: f64,
}

/// Aggregate one term. Earned hours equal attempted hours; failing grades
/// are unreachable under the default distribution.
pub fn compute_term_stats(courses: &[GradedCourse]) -> Result<TermStats> {
    let attempted_hours: f64 = courses.iter().map(|c| c.course.credit_hours).sum();
    let quality_points: f64 = courses.iter().map(|c| c.quality_points).sum();
    Ok(TermStats {
        attempted_hours,
        earned_hours: attempted_hours,
        quality_points,
        gpa: gpa(quality_points, attempted_hours)?,
    })
}

pub fn compute_cumulative(
    prior_hours: f64,
    prior_gpa: f64,
    terms: &[TermStats],
) -> Result<CumulativeStats> {
    let prior_quality_points = prior_hours * prior_gpa;
    let attempted_hours = prior_hours + terms.iter().map(|t| t.attempted_hours).sum::<f64>();
    let earned_hours = prior_hours + terms.iter().map(|t| t.earned_hours).sum::<f64>();
    let quality_points = prior_quality_points + terms.iter().map(|t| t.quality_points).sum::<f64>();
    Ok(CumulativeStats {
        prior_hours,
        prior_gpa,
        attempted_hours,
        earned_hours,
        quality_points,
        gpa: gpa(quality_points, attempted_hours)?,
    })
}
