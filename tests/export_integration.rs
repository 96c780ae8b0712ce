//! Export orchestration against fake rasterizers and sinks

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Notify;

use recordsynth::export::capture::{CaptureRegion, CaptureTarget, Rasterizer};
use recordsynth::export::sink::{ArchiveWriter, MemorySink, NamedBuffer, SaveSink, SavedFile};
use recordsynth::export::CancelToken;
use recordsynth::rng::SeededRng;
use recordsynth::surfaces::{build_container, Flow, LayoutContainer, SharedContainer, SurfaceKind};
use recordsynth::{
    Error, ExportConfig, ExportJob, ExportMode, ExportOrchestrator, ExportState, GeneratorConfig,
    RecordGenerator, Result, Track,
};

/// Records what it was asked to capture; fails regions whose id is listed.
#[derive(Default)]
struct FakeRasterizer {
    fail: HashSet<String>,
    seen: Mutex<Vec<CaptureRegion>>,
    gate: Option<Arc<Notify>>,
}

impl FakeRasterizer {
    fn failing(ids: &[&str]) -> Self {
        Self {
            fail: ids.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Default::default()
        }
    }

    fn seen(&self) -> Vec<CaptureRegion> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Rasterizer for FakeRasterizer {
    async fn rasterize(&self, region: &CaptureRegion) -> Result<Vec<u8>> {
        self.seen.lock().unwrap().push(region.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        tokio::task::yield_now().await;
        if self.fail.contains(&region.id) {
            return Err(Error::RenderError(format!("{} is not capturable", region.id)));
        }
        Ok(format!("raster:{}", region.id).into_bytes())
    }
}

/// Joins entries as `name=bytes;` so tests can inspect order without unzipping.
struct ListingArchive;

#[async_trait]
impl ArchiveWriter for ListingArchive {
    async fn pack(&self, entries: &[NamedBuffer]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for e in entries {
            out.extend_from_slice(e.name.as_bytes());
            out.push(b'=');
            out.extend_from_slice(&e.bytes);
            out.push(b';');
        }
        Ok(out)
    }
}

struct BrokenSink;

#[async_trait]
impl SaveSink for BrokenSink {
    async fn save(&self, _file_name: &str, _bytes: &[u8]) -> Result<SavedFile> {
        Err(Error::SaveFailed("disk full".into()))
    }
}

fn container() -> SharedContainer {
    let generator = RecordGenerator::new(GeneratorConfig::default()).unwrap();
    let mut rng = SeededRng::from_seed(5);
    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let record = generator
        .generate_for_track(Track::Biology, &mut rng, today)
        .unwrap();
    build_container(&record, &ExportConfig::default()).shared()
}

fn snapshot(c: &SharedContainer) -> LayoutContainer {
    c.lock().unwrap().clone()
}

fn overridden(c: &SharedContainer) -> bool {
    c.lock().unwrap().override_active
}

async fn until_overridden(c: &SharedContainer) {
    while !overridden(c) {
        tokio::task::yield_now().await;
    }
}

fn orchestrator(raster: Arc<FakeRasterizer>, sink: Arc<MemorySink>) -> ExportOrchestrator {
    ExportOrchestrator::new(raster, Arc::new(ListingArchive), sink, ExportConfig::default())
}

#[tokio::test]
async fn grid_export_captures_container_as_is() {
    let raster = Arc::new(FakeRasterizer::default());
    let sink = Arc::new(MemorySink::new());
    let orch = orchestrator(raster.clone(), sink.clone());
    let shared = container();
    let before = snapshot(&shared);

    let report = orch
        .export(&ExportJob::new(ExportMode::StitchedGrid, shared.clone()))
        .await
        .unwrap();

    assert_eq!(report.file_name, "student_documents.png");
    assert!(report.entries.is_empty());
    let saved = sink.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].bytes, b"raster:documents");

    let seen = raster.seen();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].exclude_tags.is_empty());
    match &seen[0].target {
        CaptureTarget::Container(c) => assert_eq!(c.style.flow, Flow::Grid { columns: 2 }),
        other => panic!("unexpected target {:?}", other),
    }
    assert_eq!(snapshot(&shared), before);
    assert_eq!(orch.state(), ExportState::Idle);
}

#[tokio::test]
async fn row_export_overrides_then_restores() {
    let raster = Arc::new(FakeRasterizer::default());
    let sink = Arc::new(MemorySink::new());
    let orch = orchestrator(raster.clone(), sink.clone());
    let shared = container();
    let before = snapshot(&shared);

    orch.export(&ExportJob::new(ExportMode::StitchedRow, shared.clone()))
        .await
        .unwrap();

    let seen = raster.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].exclude_tags, vec!["label".to_string()]);
    match &seen[0].target {
        CaptureTarget::Container(c) => {
            assert_eq!(c.style.flow, Flow::Row);
            assert_eq!(c.style.gap, 16);
            assert!(c.markers.contains(&"export-row".to_string()));
        }
        other => panic!("unexpected target {:?}", other),
    }
    assert_eq!(snapshot(&shared), before);
    assert_eq!(sink.saved().len(), 1);
}

#[tokio::test]
async fn archived_export_has_three_fixed_entries_in_order() {
    let raster = Arc::new(FakeRasterizer::default());
    let sink = Arc::new(MemorySink::new());
    let orch = orchestrator(raster, sink.clone());

    let report = orch
        .export(&ExportJob::new(ExportMode::Archived, container()))
        .await
        .unwrap();

    assert_eq!(
        report.entries,
        vec!["tuition_statement.png", "transcript.png", "schedule.png"]
    );
    let expected: Vec<String> = SurfaceKind::ALL.iter().map(|k| k.entry_name()).collect();
    assert_eq!(report.entries, expected);
    let saved = sink.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].name, "student_documents.zip");
    assert_eq!(
        String::from_utf8(saved[0].bytes.clone()).unwrap(),
        "tuition_statement.png=raster:tuition_statement;\
         transcript.png=raster:transcript;\
         schedule.png=raster:schedule;"
    );
}

#[tokio::test]
async fn one_uncapturable_surface_fails_the_whole_archive() {
    let raster = Arc::new(FakeRasterizer::failing(&["transcript"]));
    let sink = Arc::new(MemorySink::new());
    let orch = orchestrator(raster, sink.clone());

    let err = orch
        .export(&ExportJob::new(ExportMode::Archived, container()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::CaptureFailed { ref region, .. } if region == "transcript"));
    assert!(sink.saved().is_empty());
    assert!(orch.last_failure().unwrap().contains("transcript"));
    assert_eq!(orch.state(), ExportState::Idle);
}

#[tokio::test]
async fn failing_archive_alongside_failing_row_export_restores_layout() {
    let shared = container();
    let before = snapshot(&shared);

    let archive_sink = Arc::new(MemorySink::new());
    let archive_orch = orchestrator(
        Arc::new(FakeRasterizer::failing(&["schedule"])),
        archive_sink.clone(),
    );
    let row_sink = Arc::new(MemorySink::new());
    let row_orch = orchestrator(Arc::new(FakeRasterizer::failing(&["documents"])), row_sink.clone());

    let archive_job = ExportJob::new(ExportMode::Archived, shared.clone());
    let row_job = ExportJob::new(ExportMode::StitchedRow, shared.clone());
    let (a, r) = tokio::join!(archive_orch.export(&archive_job), row_orch.export(&row_job));

    assert!(matches!(a, Err(Error::CaptureFailed { .. })));
    assert!(matches!(r, Err(Error::CaptureFailed { .. })));
    assert!(archive_sink.saved().is_empty());
    assert!(row_sink.saved().is_empty());
    assert_eq!(snapshot(&shared), before);
}

#[tokio::test]
async fn second_export_while_busy_is_rejected() {
    let gate = Arc::new(Notify::new());
    let raster = Arc::new(FakeRasterizer::gated(gate.clone()));
    let sink = Arc::new(MemorySink::new());
    let orch = orchestrator(raster, sink.clone());
    let shared = container();
    let first = ExportJob::new(ExportMode::StitchedRow, shared.clone());
    let second = ExportJob::new(ExportMode::StitchedGrid, shared.clone());

    let (a, b) = tokio::join!(orch.export(&first), async {
        while orch.state() != ExportState::Exporting {
            tokio::task::yield_now().await;
        }
        let res = orch.export(&second).await;
        gate.notify_one();
        res
    });

    assert!(a.is_ok());
    assert!(matches!(b, Err(Error::ExportInProgress)));
    assert_eq!(sink.saved().len(), 1);
    assert_eq!(orch.state(), ExportState::Idle);
}

#[tokio::test]
async fn cancelled_export_saves_nothing_and_restores() {
    let raster = Arc::new(FakeRasterizer::default());
    let sink = Arc::new(MemorySink::new());
    let orch = orchestrator(raster, sink.clone());
    let shared = container();
    let before = snapshot(&shared);

    let cancel = CancelToken::new();
    cancel.cancel();
    for mode in ExportMode::ALL {
        let res = orch
            .export_with_cancel(&ExportJob::new(mode, shared.clone()), &cancel)
            .await;
        assert!(matches!(res, Err(Error::Cancelled)), "{mode}");
    }
    assert!(sink.saved().is_empty());
    assert_eq!(snapshot(&shared), before);
}

#[tokio::test]
async fn save_failure_is_surfaced() {
    let orch = ExportOrchestrator::new(
        Arc::new(FakeRasterizer::default()),
        Arc::new(ListingArchive),
        Arc::new(BrokenSink),
        ExportConfig::default(),
    );
    let shared = container();
    let before = snapshot(&shared);
    let err = orch
        .export(&ExportJob::new(ExportMode::StitchedRow, shared.clone()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SaveFailed(_)));
    assert!(orch.last_failure().unwrap().contains("disk full"));
    assert_eq!(snapshot(&shared), before);
}

#[tokio::test]
async fn overlapping_row_exports_on_one_container_leave_grid_layout() {
    let shared = container();
    let before = snapshot(&shared);

    let gate = Arc::new(Notify::new());
    let first_sink = Arc::new(MemorySink::new());
    let first = orchestrator(Arc::new(FakeRasterizer::gated(gate.clone())), first_sink.clone());
    let second_sink = Arc::new(MemorySink::new());
    let second = orchestrator(Arc::new(FakeRasterizer::default()), second_sink.clone());

    let first_job = ExportJob::new(ExportMode::StitchedRow, shared.clone());
    let second_job = ExportJob::new(ExportMode::StitchedRow, shared.clone());
    let (a, b) = tokio::join!(first.export(&first_job), async {
        until_overridden(&shared).await;
        let res = second.export(&second_job).await;
        gate.notify_one();
        res
    });

    assert!(a.is_ok());
    assert!(matches!(b, Err(Error::ExportInProgress)));
    assert_eq!(first_sink.saved().len(), 1);
    assert!(second_sink.saved().is_empty());
    assert_eq!(snapshot(&shared), before);

    second.export(&second_job).await.unwrap();
    assert_eq!(snapshot(&shared), before);
}

#[tokio::test]
async fn cancel_during_row_capture_restores_layout() {
    let gate = Arc::new(Notify::new());
    let sink = Arc::new(MemorySink::new());
    let orch = orchestrator(Arc::new(FakeRasterizer::gated(gate)), sink.clone());
    let shared = container();
    let before = snapshot(&shared);
    let job = ExportJob::new(ExportMode::StitchedRow, shared.clone());

    let cancel = CancelToken::new();
    let (res, _) = tokio::join!(orch.export_with_cancel(&job, &cancel), async {
        until_overridden(&shared).await;
        assert_eq!(orch.state(), ExportState::Exporting);
        cancel.cancel();
    });

    assert!(matches!(res, Err(Error::Cancelled)));
    assert!(sink.saved().is_empty());
    assert_eq!(snapshot(&shared), before);
    assert_eq!(orch.state(), ExportState::Idle);
}

#[tokio::test]
async fn dropped_row_export_restores_layout() {
    let gate = Arc::new(Notify::new());
    let sink = Arc::new(MemorySink::new());
    let orch = orchestrator(Arc::new(FakeRasterizer::gated(gate)), sink.clone());
    let shared = container();
    let before = snapshot(&shared);
    let job = ExportJob::new(ExportMode::StitchedRow, shared.clone());

    let res = tokio::time::timeout(Duration::from_millis(50), orch.export(&job)).await;

    assert!(res.is_err(), "export should still be waiting on the capture");
    assert!(sink.saved().is_empty());
    assert_eq!(snapshot(&shared), before);
    assert_eq!(orch.state(), ExportState::Idle);
    assert!(!overridden(&shared));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn polling_busy_state_never_rejects_an_export() {
    let sink = Arc::new(MemorySink::new());
    let orch = Arc::new(orchestrator(Arc::new(FakeRasterizer::default()), sink.clone()));
    let job = ExportJob::new(ExportMode::StitchedGrid, container());

    let stop = Arc::new(AtomicBool::new(false));
    let poller = {
        let orch = orch.clone();
        let stop = stop.clone();
        std::thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                let _ = orch.state();
            }
        })
    };

    for _ in 0..200 {
        orch.export(&job).await.unwrap();
    }
    stop.store(true, Ordering::Relaxed);
    poller.join().unwrap();

    assert_eq!(sink.saved().len(), 200);
    assert_eq!(orch.state(), ExportState::Idle);
}
