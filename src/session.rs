//! Session context: the current record, its layout container, the selected
//! export mode, and the busy indicator.
//!
//! The presentation layer owns a `Session` and is the only place that swaps
//! in a new record; generation and export stay free functions of their
//! inputs.

use chrono::NaiveDate;
use log::info;

use crate::export::{CancelToken, ExportJob, ExportMode, ExportOrchestrator, ExportReport, ExportState};
use crate::generator::{RecordGenerator, StudentRecord};
use crate::rng::RngProvider;
use crate::surfaces::{build_container, SharedContainer};
use crate::{Error, Result, Track};

pub struct Session {
    generator: RecordGenerator,
    orchestrator: ExportOrchestrator,
    record: Option<StudentRecord>,
    container: Option<SharedContainer>,
    mode: ExportMode,
}

impl Session {
    pub fn new(generator: RecordGenerator, orchestrator: ExportOrchestrator) -> Self {
        Self {
            generator,
            orchestrator,
            record: None,
            container: None,
            mode: ExportMode::StitchedGrid,
        }
    }

    pub fn record(&self) -> Option<&StudentRecord> {
        self.record.as_ref()
    }

    pub fn container(&self) -> Option<&SharedContainer> {
        self.container.as_ref()
    }

    pub fn mode(&self) -> ExportMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ExportMode) {
        self.mode = mode;
    }

    pub fn is_busy(&self) -> bool {
        self.orchestrator.state() == ExportState::Exporting
    }

    pub fn last_failure(&self) -> Option<String> {
        self.orchestrator.last_failure()
    }

    /// Replace the current record with a fresh one. On error the previous
    /// record stays in place.
    pub fn regenerate<R: RngProvider>(
        &mut self,
        track: Option<Track>,
        rng: &mut R,
        today: NaiveDate,
    ) -> Result<&StudentRecord> {
        let record = match track {
            Some(track) => self.generator.generate_for_track(track, rng, today)?,
            None => self.generator.generate(rng, today)?,
        };
        let container = build_container(&record, self.orchestrator.config()).shared();
        info!("session record replaced: {} ({})", record.identity.student_id, record.track);
        self.container = Some(container);
        Ok(self.record.insert(record))
    }

    /// Export the current record in the selected mode.
    pub async fn export(&self, cancel: &CancelToken) -> Result<ExportReport> {
        let container = self
            .container
            .clone()
            .ok_or_else(|| Error::Other("no record has been generated yet".into()))?;
        let job = ExportJob::new(self.mode, container);
        self.orchestrator.export_with_cancel(&job, cancel).await
    }
}
