//! Export orchestration: stitched (grid or row) and archived modes.
//!
//! State machine: `Idle -> Exporting -> Idle`. A request made while an
//! export is in flight is rejected with [`Error::ExportInProgress`]. Every
//! exit path, success or failure, restores any layout override before the
//! error surfaces and returns the orchestrator to `Idle`.

pub mod capture;
pub mod guard;
pub mod sink;

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{error, info};
use tokio::sync::watch;

use crate::surfaces::{SharedContainer, SurfaceKind};
use crate::{Error, ExportConfig, Result};
use capture::{CaptureAdapter, CaptureRegion, Rasterizer};
use guard::{apply_override, StyleOverride};
use sink::{ArchiveWriter, NamedBuffer, SaveSink, SavedFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// Capture the container as displayed
    StitchedGrid,
    /// Capture the container forced into a single row, without labels
    StitchedRow,
    /// Capture each surface separately and pack them into one archive
    Archived,
}

impl ExportMode {
    pub const ALL: [ExportMode; 3] = [ExportMode::StitchedGrid, ExportMode::StitchedRow, ExportMode::Archived];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportMode::StitchedGrid => "grid",
            ExportMode::StitchedRow => "row",
            ExportMode::Archived => "archive",
        }
    }
}

impl fmt::Display for ExportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" | "stitched-grid" => Ok(ExportMode::StitchedGrid),
            "row" | "stitched-row" => Ok(ExportMode::StitchedRow),
            "archive" | "archived" | "zip" => Ok(ExportMode::Archived),
            other => Err(Error::ConfigError(format!("unknown export mode '{}'", other))),
        }
    }
}

/// One export request: the mode and the container whose surfaces it reads.
#[derive(Clone)]
pub struct ExportJob {
    pub mode: ExportMode,
    pub container: SharedContainer,
}

impl ExportJob {
    pub fn new(mode: ExportMode, container: SharedContainer) -> Self {
        Self { mode, container }
    }

    /// One region per content surface, in container order, each paired
    /// with its surface kind.
    pub fn source_regions(&self) -> Result<Vec<(SurfaceKind, CaptureRegion)>> {
        let c = self
            .container
            .lock()
            .map_err(|_| Error::Other("layout container lock poisoned".into()))?;
        let width = c.style.surface_width;
        Ok(c.surfaces()
            .iter()
            .map(|s| (s.kind, CaptureRegion::surface(s, width)))
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    Exporting,
}

/// Outcome of a finished export
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub mode: ExportMode,
    pub file_name: String,
    pub saved: SavedFile,
    /// Archive entry names; empty for stitched modes
    pub entries: Vec<String>,
}

/// Cancellation shared between a caller and a running export.
///
/// The export checks it between steps and also races every pending capture,
/// pack and save against it, so a long capture is interrupted as soon as
/// [`CancelToken::cancel`] is called.
#[derive(Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns on cancel.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Run `fut` unless the token fires first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(Error::Cancelled),
            res = fut => res,
        }
    }
}

/// Clears the busy flag when the export ends or its future is dropped.
struct BusyFlag<'a>(&'a AtomicBool);

impl<'a> BusyFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for BusyFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ExportOrchestrator {
    capture: CaptureAdapter,
    archive: Arc<dyn ArchiveWriter>,
    sink: Arc<dyn SaveSink>,
    config: ExportConfig,
    in_flight: tokio::sync::Mutex<()>,
    busy: AtomicBool,
    last_failure: Mutex<Option<String>>,
}

impl ExportOrchestrator {
    pub fn new(
        rasterizer: Arc<dyn Rasterizer>,
        archive: Arc<dyn ArchiveWriter>,
        sink: Arc<dyn SaveSink>,
        config: ExportConfig,
    ) -> Self {
        Self {
            capture: CaptureAdapter::new(rasterizer),
            archive,
            sink,
            config,
            in_flight: tokio::sync::Mutex::new(()),
            busy: AtomicBool::new(false),
            last_failure: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Busy indicator
    pub fn state(&self) -> ExportState {
        if self.busy.load(Ordering::Acquire) {
            ExportState::Exporting
        } else {
            ExportState::Idle
        }
    }

    /// User-facing notice for the most recent failed export, cleared on success
    pub fn last_failure(&self) -> Option<String> {
        self.last_failure.lock().ok().and_then(|f| f.clone())
    }

    pub async fn export(&self, job: &ExportJob) -> Result<ExportReport> {
        self.export_with_cancel(job, &CancelToken::new()).await
    }

    pub async fn export_with_cancel(&self, job: &ExportJob, cancel: &CancelToken) -> Result<ExportReport> {
        let _busy = self.in_flight.try_lock().map_err(|_| {
            info!("rejecting {} export: another export is in flight", job.mode);
            Error::ExportInProgress
        })?;
        let _flag = BusyFlag::raise(&self.busy);
        info!("export started: {}", job.mode);

        let res = match job.mode {
            ExportMode::StitchedGrid => self.stitched_grid(job, cancel).await,
            ExportMode::StitchedRow => self.stitched_row(job, cancel).await,
            ExportMode::Archived => self.archived(job, cancel).await,
        };

        let notice = match &res {
            Ok(report) => {
                info!("export finished: {} -> {}", job.mode, report.saved.location);
                None
            }
            Err(err) => {
                error!("export failed: {}: {}", job.mode, err);
                Some(format!("Export failed: {}", err))
            }
        };
        if let Ok(mut slot) = self.last_failure.lock() {
            *slot = notice;
        }
        res
    }

    async fn stitched_grid(&self, job: &ExportJob, cancel: &CancelToken) -> Result<ExportReport> {
        cancel.check()?;
        let region = {
            let c = job
                .container
                .lock()
                .map_err(|_| Error::Other("layout container lock poisoned".into()))?;
            CaptureRegion::container(&c, Vec::new())
        };
        let bytes = cancel.run(self.capture.capture(&region)).await?;
        self.save_stitched(job.mode, bytes, cancel).await
    }

    async fn stitched_row(&self, job: &ExportJob, cancel: &CancelToken) -> Result<ExportReport> {
        cancel.check()?;
        let patch = StyleOverride::single_row(self.config.row_gap, &self.config.row_marker);
        let guard = apply_override(&job.container, &patch)?;
        let region = CaptureRegion::container(&guard.snapshot(), vec![self.config.label_tag.clone()]);
        let captured = cancel.run(self.capture.capture(&region)).await;
        guard.restore();

        let bytes = captured?;
        self.save_stitched(job.mode, bytes, cancel).await
    }

    async fn save_stitched(&self, mode: ExportMode, bytes: Vec<u8>, cancel: &CancelToken) -> Result<ExportReport> {
        cancel.check()?;
        let file_name = self.config.stitched_file_name.clone();
        let saved = cancel.run(self.save(&file_name, &bytes)).await?;
        Ok(ExportReport {
            mode,
            file_name,
            saved,
            entries: Vec::new(),
        })
    }

    async fn archived(&self, job: &ExportJob, cancel: &CancelToken) -> Result<ExportReport> {
        cancel.check()?;
        let (kinds, regions): (Vec<SurfaceKind>, Vec<CaptureRegion>) =
            job.source_regions()?.into_iter().unzip();
        if regions.is_empty() {
            return Err(Error::Other("no surfaces to export".into()));
        }
        let captured = cancel.run(self.capture.capture_many(&regions)).await?;
        cancel.check()?;

        let entries: Vec<NamedBuffer> = kinds
            .iter()
            .zip(captured)
            .map(|(kind, bytes)| NamedBuffer {
                name: kind.entry_name(),
                bytes,
            })
            .collect();
        let archive = cancel.run(self.archive.pack(&entries)).await?;
        cancel.check()?;

        let file_name = self.config.archive_file_name.clone();
        let saved = cancel.run(self.save(&file_name, &archive)).await?;
        Ok(ExportReport {
            mode: ExportMode::Archived,
            file_name,
            saved,
            entries: entries.into_iter().map(|e| e.name).collect(),
        })
    }

    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<SavedFile> {
        self.sink.save(file_name, bytes).await.map_err(|e| match e {
            Error::SaveFailed(_) => e,
            other => Error::SaveFailed(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_mode_parses_aliases() {
        assert_eq!("grid".parse::<ExportMode>().unwrap(), ExportMode::StitchedGrid);
        assert_eq!("Row".parse::<ExportMode>().unwrap(), ExportMode::StitchedRow);
        assert_eq!("zip".parse::<ExportMode>().unwrap(), ExportMode::Archived);
        assert!("pdf".parse::<ExportMode>().is_err());
        for m in ExportMode::ALL {
            assert_eq!(m.as_str().parse::<ExportMode>().unwrap(), m);
        }
    }

    #[test]
    fn cancel_token_trips_check() {
        let token = CancelToken::new();
        assert!(token.check().is_ok());
        let clone = token.clone();
        clone.cancel();
        assert!(matches!(token.check(), Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn cancel_interrupts_a_pending_future() {
        let token = CancelToken::new();
        let trigger = token.clone();
        let (res, _) = tokio::join!(
            token.run(std::future::pending::<Result<()>>()),
            async move {
                tokio::task::yield_now().await;
                trigger.cancel();
            }
        );
        assert!(matches!(res, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn run_passes_through_when_not_cancelled() {
        let token = CancelToken::new();
        assert_eq!(token.run(async { Ok(7) }).await.unwrap(), 7);
    }
}
