//! Tuition, differential tuition, and the fixed fee schedule.

use log::debug;
use serde::Serialize;

use crate::catalog::College;
use crate::rng::RngProvider;
use crate::{Error, Result};

/// Fixed per-term fees, in display order.
pub const FEE_SCHEDULE: [(&str, f64); 7] = [
    ("Student Services Fee", 340.0),
    ("Technology Fee", 210.0),
    ("Library Fee", 150.0),
    ("Transportation Fee", 95.0),
    ("Health Center Fee", 680.0),
    ("Records Fee", 75.0),
    ("Facilities and Infrastructure Fee", 1650.0),
];

/// Differential tuition tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeeTier {
    Business,
    Science,
    Standard,
}

impl FeeTier {
    pub fn for_college(college: College) -> Self {
        match college {
            College::Business => FeeTier::Business,
            College::Science => FeeTier::Science,
            College::Engineering | College::LiberalArts => FeeTier::Standard,
        }
    }

    /// Tier for a free-text college name. Anything that mentions neither
    /// "Business" nor "Science" lands in the standard tier.
    pub fn from_college_name(name: &str) -> Self {
        if name.contains("Business") {
            FeeTier::Business
        } else if name.contains("Science") {
            FeeTier::Science
        } else {
            FeeTier::Standard
        }
    }

    pub fn differential(&self) -> f64 {
        match self {
            FeeTier::Business => 1250.0,
            FeeTier::Science => 975.0,
            FeeTier::Standard => 450.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeLine {
    pub name: String,
    pub amount: f64,
}

/// `total == base + differential + sum(fees)`; `fee_total` is the fees
/// plus the differential.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TuitionBreakdown {
    pub base: f64,
    pub tier: FeeTier,
    pub differential: f64,
    pub fees: Vec<FeeLine>,
    pub fee_total: f64,
    pub total: f64,
}

impl TuitionBreakdown {
    pub fn fees_sum(&self) -> f64 {
        self.fees.iter().map(|f| f.amount).sum()
    }
}

/// Build the breakdown for a known base tuition.
pub fn breakdown(base: f64, tier: FeeTier) -> TuitionBreakdown {
    let fees: Vec<FeeLine> = FEE_SCHEDULE
        .iter()
        .map(|(name, amount)| FeeLine {
            name: (*name).to_string(),
            amount: *amount,
        })
        .collect();
    let differential = tier.differential();
    let fee_total = fees.iter().map(|f| f.amount).sum::<f64>() + differential;
    TuitionBreakdown {
        base,
        tier,
        differential,
        fees,
        fee_total,
        total: base + fee_total,
    }
}

/// Draw base tuition uniformly from `base_range` and price the term for `college`.
pub fn compute_tuition<R: RngProvider>(
    college: College,
    base_range: (u32, u32),
    rng: &mut R,
) -> Result<TuitionBreakdown> {
    let (low, high) = base_range;
    if low > high {
        return Err(Error::ConfigError(format!(
            "base tuition range is empty: {}..={}",
            low, high
        )));
    }
    let base = rng.uniform_int(low as i64, high as i64) as f64;
    let tier = FeeTier::for_college(college);
    debug!("tuition base {} tier {:?} for {}", base, tier, college);
    Ok(breakdown(base, tier))
}
