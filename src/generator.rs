//! Builds one complete, self-consistent synthetic student record.

use chrono::{Datelike, Duration, NaiveDate};
use log::debug;
use serde::Serialize;

use crate::billing::{compute_tuition, TuitionBreakdown};
use crate::catalog::{Catalog, CourseRecord, Track};
use crate::gpa::{compute_cumulative, compute_term_stats, CumulativeStats, TermStats};
use crate::grades::{assign_grades, GradedCourse};
use crate::identity::{draw_identity, Identity};
use crate::rng::RngProvider;
use crate::selector::select_courses;
use crate::{GeneratorConfig, Result};

/// Terms generated per record: the current one and the next
pub const TERMS_PER_RECORD: usize = 2;

/// One term's graded courses and their aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermCourseSet {
    pub term: String,
    pub courses: Vec<GradedCourse>,
    pub stats: TermStats,
}

/// Aggregate root of a generated record.
///
/// Invariant: `due_date - statement_date` lies in the configured due offset
/// window (14..=30 days by default). `issue_date` is drawn independently.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentRecord {
    pub identity: Identity,
    pub statement_date: NaiveDate,
    pub due_date: NaiveDate,
    pub issue_date: NaiveDate,
    pub track: Track,
    pub major: String,
    pub program: String,
    pub college: String,
    pub current_term: TermCourseSet,
    pub next_term: TermCourseSet,
    pub cumulative: CumulativeStats,
    pub tuition: TuitionBreakdown,
}

impl StudentRecord {
    pub fn terms(&self) -> [&TermCourseSet; 2] {
        [&self.current_term, &self.next_term]
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| crate::Error::Other(e.to_string()))
    }
}

/// Academic term containing `date`, plus the term after it.
pub fn term_labels(date: NaiveDate) -> (String, String) {
    let year = date.year();
    match date.month() {
        1..=5 => (format!("Spring {}", year), format!("Fall {}", year)),
        6..=7 => (format!("Summer {}", year), format!("Fall {}", year)),
        _ => (format!("Fall {}", year), format!("Spring {}", year + 1)),
    }
}

/// Orchestrates course selection, grading, GPA and billing into a record.
pub struct RecordGenerator {
    catalog: Catalog,
    config: GeneratorConfig,
}

impl RecordGenerator {
    /// Generator over the built-in catalog
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        Self::with_catalog(config, Catalog::standard())
    }

    /// Generator over a custom catalog. Fails when a registered pool is too
    /// small to fill every term under the configured split.
    pub fn with_catalog(config: GeneratorConfig, catalog: Catalog) -> Result<Self> {
        config.validate()?;
        config.split.check_catalog(&catalog, TERMS_PER_RECORD)?;
        Ok(Self { catalog, config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a record for a track drawn uniformly from [`Track::ALL`].
    ///
    /// `today` anchors the date draws so a seeded provider gives identical
    /// output across runs.
    pub fn generate<R: RngProvider>(&self, rng: &mut R, today: NaiveDate) -> Result<StudentRecord> {
        let idx = rng.uniform_int(0, Track::ALL.len() as i64 - 1) as usize;
        self.generate_for_track(Track::ALL[idx], rng, today)
    }

    /// Generate a record for `track`. Nothing is returned unless every part
    /// of the record was produced.
    pub fn generate_for_track<R: RngProvider>(
        &self,
        track: Track,
        rng: &mut R,
        today: NaiveDate,
    ) -> Result<StudentRecord> {
        let cfg = &self.config;
        // Fail fast before spending any draws.
        self.catalog.pool(track)?;

        let identity = draw_identity(rng);

        let statement_date = days_before(rng, today, cfg.statement_lookback_days);
        let due_date = rng.date_in_range(
            statement_date + Duration::days(cfg.due_offset_days.0 as i64),
            statement_date + Duration::days(cfg.due_offset_days.1 as i64),
        );
        let issue_date = days_before(rng, today, cfg.issue_lookback_days);

        let (current_label, next_label) = term_labels(statement_date);
        let current_term = self.term(track, current_label, &[], rng)?;
        let completed: Vec<CourseRecord> = current_term.courses.iter().map(|c| c.course.clone()).collect();
        let next_term = self.term(track, next_label, &completed, rng)?;

        let prior_hours = draw_prior_hours(rng, cfg.prior_hours_range);
        let (gpa_low, gpa_high) = cfg.prior_gpa_range_hundredths;
        let prior_gpa = rng.uniform_int(gpa_low as i64, gpa_high as i64) as f64 / 100.0;
        let cumulative = compute_cumulative(
            prior_hours,
            prior_gpa,
            &[current_term.stats, next_term.stats],
        )?;

        let tuition = compute_tuition(track.college(), cfg.base_tuition_range, rng)?;

        debug!(
            "generated record for {} ({}), cumulative gpa {}",
            identity.student_id, track, cumulative.gpa
        );

        Ok(StudentRecord {
            identity,
            statement_date,
            due_date,
            issue_date,
            track,
            major: track.major().to_string(),
            program: track.program().to_string(),
            college: track.college().name().to_string(),
            current_term,
            next_term,
            cumulative,
            tuition,
        })
    }

    fn term<R: RngProvider>(
        &self,
        track: Track,
        label: String,
        taken: &[CourseRecord],
        rng: &mut R,
    ) -> Result<TermCourseSet> {
        let selected = select_courses(&self.catalog, track, &self.config.split, taken, rng)?;
        let courses = assign_grades(selected, &self.config.grade_distribution, rng)?;
        let stats = compute_term_stats(&courses)?;
        Ok(TermCourseSet {
            term: label,
            courses,
            stats,
        })
    }
}

/// Uniform date between `range.1` and `range.0` days before `today`.
fn days_before<R: RngProvider>(rng: &mut R, today: NaiveDate, range: (u32, u32)) -> NaiveDate {
    rng.date_in_range(
        today - Duration::days(range.1 as i64),
        today - Duration::days(range.0 as i64),
    )
}

/// Prior hours come in whole three-credit courses.
fn draw_prior_hours<R: RngProvider>(rng: &mut R, range: (u32, u32)) -> f64 {
    let low = range.0.div_ceil(3) as i64;
    let high = (range.1 / 3) as i64;
    (rng.uniform_int(low, high) * 3) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRng;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn term_labels_follow_the_calendar() {
        let d = |m| NaiveDate::from_ymd_opt(2026, m, 10).unwrap();
        assert_eq!(term_labels(d(2)), ("Spring 2026".into(), "Fall 2026".into()));
        assert_eq!(term_labels(d(6)), ("Summer 2026".into(), "Fall 2026".into()));
        assert_eq!(term_labels(d(10)), ("Fall 2026".into(), "Spring 2027".into()));
    }

    #[test]
    fn dates_respect_ordering() {
        let generator = RecordGenerator::new(GeneratorConfig::default()).unwrap();
        for seed in 0..40 {
            let mut rng = SeededRng::from_seed(seed);
            let r = generator.generate(&mut rng, today()).unwrap();
            let offset = (r.due_date - r.statement_date).num_days();
            assert!((14..=30).contains(&offset), "offset {offset}");
            assert!(r.statement_date < today());
            assert!(r.issue_date <= today());
        }
    }

    #[test]
    fn prior_hours_are_whole_courses() {
        let mut rng = SeededRng::from_seed(8);
        for _ in 0..50 {
            let h = draw_prior_hours(&mut rng, (24, 90));
            assert_eq!(h % 3.0, 0.0);
            assert!((24.0..=90.0).contains(&h));
        }
    }

    #[test]
    fn missing_pool_produces_no_record() {
        let catalog = Catalog::new(Catalog::standard().common_core().to_vec());
        let generator = RecordGenerator::with_catalog(GeneratorConfig::default(), catalog).unwrap();
        let mut rng = SeededRng::from_seed(1);
        let res = generator.generate_for_track(Track::Psychology, &mut rng, today());
        assert!(matches!(res, Err(crate::Error::InvalidTrack(_))));
    }

    /// Counts date draws and otherwise defers to a seeded provider.
    struct CountingRng {
        inner: SeededRng,
        date_draws: usize,
    }

    impl RngProvider for CountingRng {
        fn uniform_int(&mut self, low: i64, high: i64) -> i64 {
            self.inner.uniform_int(low, high)
        }

        fn weighted_index(&mut self, weights: &[u32]) -> Option<usize> {
            self.inner.weighted_index(weights)
        }

        fn sample_indices(&mut self, len: usize, amount: usize) -> Vec<usize> {
            self.inner.sample_indices(len, amount)
        }

        fn date_in_range(&mut self, start: NaiveDate, end: NaiveDate) -> NaiveDate {
            self.date_draws += 1;
            self.inner.date_in_range(start, end)
        }
    }

    #[test]
    fn dates_come_from_the_provider_date_draw() {
        let generator = RecordGenerator::new(GeneratorConfig::default()).unwrap();
        let mut rng = CountingRng {
            inner: SeededRng::from_seed(4),
            date_draws: 0,
        };
        generator.generate(&mut rng, today()).unwrap();
        assert_eq!(rng.date_draws, 3);
    }

    #[test]
    fn next_term_repeats_no_current_course() {
        let generator = RecordGenerator::new(GeneratorConfig::default()).unwrap();
        for seed in 0..100 {
            let mut rng = SeededRng::from_seed(seed);
            let r = generator.generate_for_track(Track::English, &mut rng, today()).unwrap();
            for c in &r.next_term.courses {
                assert!(
                    !r.current_term.courses.iter().any(|p| p.course.code == c.course.code),
                    "seed {seed}: {} taken twice",
                    c.course.code
                );
            }
        }
    }

    #[test]
    fn undersized_pool_is_rejected_at_construction() {
        let mut catalog = Catalog::standard();
        let short = catalog.pool(Track::Finance).unwrap()[..4].to_vec();
        catalog.register(Track::Finance, short);
        let res = RecordGenerator::with_catalog(GeneratorConfig::default(), catalog);
        assert!(matches!(res, Err(crate::Error::ConfigError(_))));
    }

    #[test]
    fn metadata_matches_track() {
        let generator = RecordGenerator::new(GeneratorConfig::default()).unwrap();
        let mut rng = SeededRng::from_seed(12);
        let r = generator
            .generate_for_track(Track::ComputerScience, &mut rng, today())
            .unwrap();
        assert_eq!(r.major, "Computer Science");
        assert_eq!(r.college, "College of Science");
        assert_eq!(r.tuition.differential, 975.0);
    }
}
