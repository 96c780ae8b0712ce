//! recordsynth
//!
//! Generates internally consistent synthetic student records (identity,
//! graded course terms, term and cumulative GPA, tuition breakdown) and
//! exports their rendered document surfaces as one stitched raster image or
//! as an archive of separate images.
//!
//! # Features
//!
//! - **Reproducible generation**: every draw goes through an injected
//!   [`rng::RngProvider`]; a seeded provider yields byte-identical records
//! - **Two export contracts**: stitched (grid or single row) and archived
//! - **Safe layout overrides**: temporary layout changes are scoped and
//!   always restored, even when a capture fails
//! - **Swappable backends**: rasterizer, archive writer and save target sit
//!   behind async traits; `raster` (PNG) and `archive` (zip) are default
//!   features
//!
//! # Example
//!
//! ```
//! use recordsynth::{GeneratorConfig, RecordGenerator};
//! use recordsynth::rng::SeededRng;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let generator = RecordGenerator::new(GeneratorConfig::default())?;
//! let mut rng = SeededRng::from_seed(42);
//! let today = chrono::NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
//! let record = generator.generate(&mut rng, today)?;
//! assert_eq!(record.current_term.courses.len(), 5);
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::Deserialize;

pub mod error;
pub use error::{Error, Result};

pub mod billing;
pub mod catalog;
pub mod format;
pub mod generator;
pub mod gpa;
pub mod grades;
pub mod identity;
pub mod rng;
pub mod selector;

// Document surfaces and the shared layout container they live in
pub mod surfaces;

// Capture, scoped layout overrides, archive/save primitives, orchestration
pub mod export;

// Built-in rasterizer producing PNG bytes (feature-gated under `raster`)
#[cfg(feature = "raster")]
pub mod rendering;

pub mod session;

pub use catalog::{Catalog, College, CourseRecord, Track};
pub use export::{ExportJob, ExportMode, ExportOrchestrator, ExportReport, ExportState};
pub use generator::{RecordGenerator, StudentRecord, TermCourseSet};
pub use grades::{Grade, GradeDistribution, GradedCourse};
pub use selector::SplitPolicy;
pub use session::Session;

/// Configuration for record generation
///
/// All ranges are inclusive `(low, high)` pairs. Defaults describe a
/// mid-program undergraduate with a strong grade profile:
/// - base tuition between $8,400 and $11,800
/// - 24 to 90 prior credit hours at a 3.00 to 3.95 prior GPA
/// - a statement dated up to 45 days ago, due 14 to 30 days later
///
/// # Examples
///
/// ```
/// let cfg = recordsynth::GeneratorConfig {
///     base_tuition_range: (9600, 9600),
///     ..Default::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Base tuition in whole dollars
    pub base_tuition_range: (u32, u32),
    /// Prior attempted hours; drawn in multiples of three
    pub prior_hours_range: (u32, u32),
    /// Prior GPA in hundredths of a point (`300` is 3.00)
    pub prior_gpa_range_hundredths: (u32, u32),
    /// How many days before "today" the statement is dated
    pub statement_lookback_days: (u32, u32),
    /// Days from statement date to due date
    pub due_offset_days: (u32, u32),
    /// How many days before "today" the transcript is issued
    pub issue_lookback_days: (u32, u32),
    /// Letter grade weights
    pub grade_distribution: GradeDistribution,
    /// Major/core split of each term's courses
    pub split: SplitPolicy,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_tuition_range: (8400, 11800),
            prior_hours_range: (24, 90),
            prior_gpa_range_hundredths: (300, 395),
            statement_lookback_days: (1, 45),
            due_offset_days: (14, 30),
            issue_lookback_days: (0, 7),
            grade_distribution: GradeDistribution::default(),
            split: SplitPolicy::default(),
        }
    }
}

impl GeneratorConfig {
    /// Reject configurations that could break record invariants.
    pub fn validate(&self) -> Result<()> {
        let ranges = [
            ("base_tuition_range", self.base_tuition_range),
            ("prior_hours_range", self.prior_hours_range),
            ("prior_gpa_range_hundredths", self.prior_gpa_range_hundredths),
            ("statement_lookback_days", self.statement_lookback_days),
            ("due_offset_days", self.due_offset_days),
            ("issue_lookback_days", self.issue_lookback_days),
        ];
        for (name, (low, high)) in ranges {
            if low > high {
                return Err(Error::ConfigError(format!("{} is empty: {}..={}", name, low, high)));
            }
        }
        if self.due_offset_days.0 < 14 || self.due_offset_days.1 > 30 {
            return Err(Error::ConfigError(format!(
                "due_offset_days must stay within 14..=30, got {}..={}",
                self.due_offset_days.0, self.due_offset_days.1
            )));
        }
        if self.statement_lookback_days.0 == 0 {
            return Err(Error::ConfigError("statement date must lie in the past".into()));
        }
        if self.prior_gpa_range_hundredths.1 > 400 {
            return Err(Error::ConfigError("prior GPA cannot exceed 4.00".into()));
        }
        let (low, high) = self.prior_hours_range;
        if low.div_ceil(3) > high / 3 {
            return Err(Error::ConfigError(format!(
                "prior_hours_range {}..={} holds no multiple of three",
                low, high
            )));
        }
        self.split.validate()?;
        self.grade_distribution.validate()
    }
}

/// Configuration for exports
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File name for stitched (grid and row) exports
    pub stitched_file_name: String,
    /// File name for archived exports
    pub archive_file_name: String,
    /// Columns in the steady-state grid layout
    pub grid_columns: u32,
    /// Gap between surfaces, in pixels
    pub gap: u32,
    /// Gap between surfaces while the single-row override is active
    pub row_gap: u32,
    /// Width of one document surface, in pixels
    pub surface_width: u32,
    /// Tag carried by non-content caption labels
    pub label_tag: String,
    /// Marker added to the container while the single-row override is active
    pub row_marker: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            stitched_file_name: "student_documents.png".to_string(),
            archive_file_name: "student_documents.zip".to_string(),
            grid_columns: 2,
            gap: 24,
            row_gap: 16,
            surface_width: 420,
            label_tag: "label".to_string(),
            row_marker: "export-row".to_string(),
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<()> {
        if self.grid_columns == 0 {
            return Err(Error::ConfigError("grid_columns must be at least 1".into()));
        }
        if self.surface_width < 64 {
            return Err(Error::ConfigError("surface_width must be at least 64px".into()));
        }
        if self.stitched_file_name.is_empty() || self.archive_file_name.is_empty() {
            return Err(Error::ConfigError("output file names must not be empty".into()));
        }
        Ok(())
    }
}

/// Both configuration sections, as loaded from a JSON settings file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub generator: GeneratorConfig,
    pub export: ExportConfig,
}

impl Settings {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let settings: Settings =
            serde_json::from_str(s).map_err(|e| Error::ConfigError(e.to_string()))?;
        settings.generator.validate()?;
        settings.export.validate()?;
        Ok(settings)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }
}
