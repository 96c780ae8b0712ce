//! Picks one term's course set from the catalog.

use log::debug;
use serde::Deserialize;

use crate::catalog::{Catalog, CourseRecord, Track};
use crate::rng::RngProvider;
use crate::{Error, Result};

/// How a term's courses split between the major pool and the common core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SplitPolicy {
    /// Courses taken per term
    pub courses_per_term: usize,
    /// Bounds on how many of those come from the major pool, drawn uniformly
    pub major_min: usize,
    pub major_max: usize,
}

impl Default for SplitPolicy {
    fn default() -> Self {
        Self {
            courses_per_term: 5,
            major_min: 2,
            major_max: 3,
        }
    }
}

impl SplitPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.courses_per_term == 0 {
            return Err(Error::ConfigError("courses_per_term must be at least 1".into()));
        }
        if self.major_min > self.major_max || self.major_max > self.courses_per_term {
            return Err(Error::ConfigError(format!(
                "major course bounds {}..={} do not fit {} courses per term",
                self.major_min, self.major_max, self.courses_per_term
            )));
        }
        Ok(())
    }

    /// Most core courses one term can need
    pub fn core_max(&self) -> usize {
        self.courses_per_term - self.major_min
    }

    /// Check that `catalog` can fill `terms` terms for every registered track
    /// without repeating a course, whatever the draws.
    pub fn check_catalog(&self, catalog: &Catalog, terms: usize) -> Result<()> {
        let core_needed = self.core_max() * terms;
        if catalog.common_core().len() < core_needed {
            return Err(Error::ConfigError(format!(
                "common core has {} courses, needs at least {}",
                catalog.common_core().len(),
                core_needed
            )));
        }
        let major_needed = self.major_max * terms;
        for track in catalog.tracks() {
            let pool = catalog.pool(track)?;
            if pool.len() < major_needed {
                return Err(Error::ConfigError(format!(
                    "track '{}' has {} courses, needs at least {}",
                    track,
                    pool.len(),
                    major_needed
                )));
            }
        }
        Ok(())
    }
}

/// Select `policy.courses_per_term` distinct courses for `track`, none of
/// them in `taken`: `major_min..=major_max` (uniform) from the major pool,
/// the rest from the common core, both without replacement.
pub fn select_courses<R: RngProvider>(
    catalog: &Catalog,
    track: Track,
    policy: &SplitPolicy,
    taken: &[CourseRecord],
    rng: &mut R,
) -> Result<Vec<CourseRecord>> {
    let is_taken = |c: &CourseRecord, picked: &[CourseRecord]| {
        taken.iter().chain(picked).any(|t| t.code == c.code)
    };

    let pool: Vec<&CourseRecord> = catalog
        .pool(track)?
        .iter()
        .filter(|c| !is_taken(c, &[]))
        .collect();

    let num_major = rng.uniform_int(policy.major_min as i64, policy.major_max as i64) as usize;
    let num_core = policy.courses_per_term - num_major;

    if pool.len() < num_major {
        return Err(Error::ConfigError(format!(
            "track '{}' has {} courses left, needs at least {}",
            track,
            pool.len(),
            num_major
        )));
    }

    let mut selected: Vec<CourseRecord> = rng
        .sample_indices(pool.len(), num_major)
        .into_iter()
        .map(|i| pool[i].clone())
        .collect();

    // A course listed in both pools must not appear twice in one term.
    let candidates: Vec<&CourseRecord> = catalog
        .common_core()
        .iter()
        .filter(|c| !is_taken(c, &selected))
        .collect();
    if candidates.len() < num_core {
        return Err(Error::ConfigError(format!(
            "common core has {} usable courses, needs at least {}",
            candidates.len(),
            num_core
        )));
    }
    selected.extend(
        rng.sample_indices(candidates.len(), num_core)
            .into_iter()
            .map(|i| candidates[i].clone()),
    );

    debug!("selected {} major + {} core courses for {}", num_major, num_core, track);
    Ok(selected)
}
