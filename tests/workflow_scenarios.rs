//! End-to-end scenarios for the workflow controller, driven against a
//! scripted backend. Time is paused, so the 5 s dismiss timer is simulated.

use binsight_lib::models::analysis_types::{AnalysisResult, PredictResponse, ServiceStatus};
use binsight_lib::models::view_types::{Screen, ViewModel};
use binsight_lib::models::workflow_types::{ReturnState, SelectedFile, WorkflowState};
use binsight_lib::{ApiClient, AppError, ClientConfig, Command, ErrorKind, WorkflowController};
use image::{ImageBuffer, ImageFormat, Rgb};
use pretty_assertions::assert_eq;
use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Backend that answers `predict` from a script, after a fixed latency.
/// Replies keyed by file name win over the shared queue.
struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<AnalysisResult, AppError>>>,
    by_name: Mutex<HashMap<String, Result<AnalysisResult, AppError>>>,
    latency: Duration,
    predict_calls: AtomicUsize,
}

impl ScriptedBackend {
    fn new(replies: Vec<Result<AnalysisResult, AppError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            by_name: Mutex::new(HashMap::new()),
            latency: Duration::from_millis(300),
            predict_calls: AtomicUsize::new(0),
        })
    }

    fn by_name(replies: Vec<(&str, Result<AnalysisResult, AppError>)>) -> Arc<Self> {
        let backend = Self::new(Vec::new());
        backend.by_name.lock().unwrap().extend(
            replies
                .into_iter()
                .map(|(name, reply)| (name.to_string(), reply)),
        );
        backend
    }

    fn calls(&self) -> usize {
        self.predict_calls.load(Ordering::SeqCst)
    }
}

impl ApiClient for ScriptedBackend {
    async fn health(&self) -> Result<ServiceStatus, AppError> {
        Ok(ServiceStatus {
            status: "healthy".to_string(),
            model_loaded: true,
            model_path: None,
            timestamp: None,
        })
    }

    async fn predict(&self, file: &SelectedFile) -> Result<AnalysisResult, AppError> {
        self.predict_calls.fetch_add(1, Ordering::SeqCst);
        let keyed = self.by_name.lock().unwrap().remove(&file.name);
        let reply = keyed.unwrap_or_else(|| {
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::unreachable()))
        });
        tokio::time::sleep(self.latency).await;
        reply
    }

    async fn download_model(&self) -> Result<Vec<u8>, AppError> {
        Ok(Vec::new())
    }
}

fn bin_full() -> AnalysisResult {
    AnalysisResult::try_from(PredictResponse {
        class_name: None,
        confidence: 0.92,
        confidence_percent: Some(92.0),
        status: "Full".to_string(),
        color: "#ff0000".to_string(),
        emoji: "🗑️".to_string(),
        message: "Bin is full".to_string(),
        priority: None,
        num_detections: None,
        processing_time: 0.45,
    })
    .unwrap()
}

fn png_file(name: &str, size: usize) -> SelectedFile {
    SelectedFile::from_bytes(name, "image/png", vec![0u8; size])
}

fn real_png() -> SelectedFile {
    let img = ImageBuffer::from_pixel(40, 30, Rgb([239u8, 68, 68]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    SelectedFile::from_bytes("photo.png", "image/png", out.into_inner())
}

type Controller = WorkflowController<ScriptedBackend, Vec<ViewModel>>;

fn controller(backend: &Arc<ScriptedBackend>) -> Controller {
    WorkflowController::new(Arc::clone(backend), Vec::new(), &ClientConfig::default())
}

fn selected_name(state: &WorkflowState) -> Option<&str> {
    state.selected_file().map(|f| f.name.as_str())
}

/// Pump until the state satisfies `done` or nothing is left to wait on.
async fn pump_until(controller: &mut Controller, done: impl Fn(&WorkflowState) -> bool) {
    while !done(controller.state()) {
        assert!(controller.pump().await, "ran out of pending work");
    }
}

// ── Happy path ────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn select_analyze_result_updates_stats() {
    let backend = ScriptedBackend::new(vec![Ok(bin_full())]);
    let mut controller = controller(&backend);

    controller.select_file(png_file("bin.png", 500 * 1024));
    assert!(matches!(controller.state(), WorkflowState::Previewing(_)));

    controller.analyze();
    assert!(matches!(controller.state(), WorkflowState::Analyzing { .. }));

    controller.finish_analysis().await;
    assert_eq!(controller.state(), &WorkflowState::Result(bin_full()));

    let snapshot = controller.session().stats().snapshot().unwrap();
    assert_eq!(snapshot.count, 1);
    assert_eq!(snapshot.mean_confidence_percent, 92.0);
    assert_eq!(backend.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn no_stats_view_before_first_success() {
    let backend = ScriptedBackend::new(vec![
        Err(AppError::new(ErrorKind::Http(500), "error 500: Internal Server Error")),
        Ok(bin_full()),
    ]);
    let mut controller = controller(&backend);

    controller.select_file(png_file("bin.png", 1024));
    controller.analyze();
    controller.finish_analysis().await;
    assert!(matches!(controller.state(), WorkflowState::Error { .. }));

    // Retry straight from the error banner by picking the file again.
    controller.select_file(png_file("bin.png", 1024));
    controller.analyze();
    controller.finish_analysis().await;

    let views = controller.renderer();
    let first_with_stats = views.iter().position(|v| v.stats.is_some()).unwrap();
    assert!(matches!(views[first_with_stats].screen, Screen::Result(_)));
    assert!(views[..first_with_stats].iter().all(|v| v.stats.is_none()));
}

#[tokio::test(start_paused = true)]
async fn stats_survive_reset_cycles() {
    let backend = ScriptedBackend::new(vec![Ok(bin_full()), Ok(bin_full())]);
    let mut controller = controller(&backend);

    for _ in 0..2 {
        controller.select_file(png_file("bin.png", 2048));
        controller.analyze();
        controller.finish_analysis().await;
        controller.reset();
    }

    assert_eq!(controller.state(), &WorkflowState::Idle);
    assert_eq!(controller.session().stats().count(), 2);
    assert_eq!(controller.session().view().stats.unwrap().total_analyses, 2);
}

#[tokio::test(start_paused = true)]
async fn preview_is_attached_once_decoded() {
    let backend = ScriptedBackend::new(vec![]);
    let mut controller = controller(&backend);

    controller.select_file(real_png());
    pump_until(&mut controller, |state| match state {
        WorkflowState::Previewing(file) => file.preview.is_some(),
        _ => false,
    })
    .await;

    match controller.session().view().screen {
        Screen::Preview { preview, .. } => {
            let preview = preview.unwrap();
            assert_eq!((preview.width, preview.height), (40, 30));
        }
        other => panic!("unexpected screen {other:?}"),
    }
}

// ── Single in-flight analysis ───────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn second_analyze_while_analyzing_is_a_no_op() {
    let backend = ScriptedBackend::new(vec![Ok(bin_full())]);
    let mut controller = controller(&backend);

    controller.select_file(png_file("bin.png", 1024));
    controller.analyze();
    let version = controller.session().version();
    let renders = controller.renderer().len();

    controller.analyze();
    controller.analyze();
    assert_eq!(controller.session().version(), version);
    assert_eq!(controller.renderer().len(), renders);

    controller.finish_analysis().await;
    assert_eq!(backend.calls(), 1);
    assert_eq!(controller.session().stats().count(), 1);
}

#[tokio::test(start_paused = true)]
async fn completion_after_reset_is_discarded() {
    let backend = ScriptedBackend::new(vec![Ok(bin_full())]);
    let mut controller = controller(&backend);

    controller.select_file(png_file("bin.png", 1024));
    controller.analyze();
    controller.reset();
    assert_eq!(controller.state(), &WorkflowState::Idle);

    while controller.pump().await {}

    assert_eq!(controller.state(), &WorkflowState::Idle);
    assert_eq!(controller.session().stats().count(), 0);
    assert_eq!(backend.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn stale_completion_does_not_leak_into_newer_analysis() {
    let backend = ScriptedBackend::by_name(vec![
        ("first.png", Ok(bin_full())),
        (
            "second.png",
            Err(AppError::new(ErrorKind::Http(502), "error 502: Bad Gateway")),
        ),
    ]);
    let mut controller = controller(&backend);

    controller.select_file(png_file("first.png", 1024));
    controller.analyze();
    controller.reset();

    controller.select_file(png_file("second.png", 1024));
    controller.analyze();
    controller.finish_analysis().await;

    // The first request's success was dropped; the second one's failure shows.
    match controller.state() {
        WorkflowState::Error { error, return_to } => {
            assert_eq!(error.kind, ErrorKind::Http(502));
            match return_to {
                ReturnState::Previewing(file) => assert_eq!(file.name, "second.png"),
                other => panic!("unexpected return point {other:?}"),
            }
        }
        other => panic!("unexpected state {other:?}"),
    }
    assert_eq!(controller.session().stats().count(), 0);
}

// ── Errors and auto-dismiss ───────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn oversized_file_errors_then_reverts_to_idle() {
    let backend = ScriptedBackend::new(vec![]);
    let mut controller = controller(&backend);
    let start = Instant::now();

    controller.select_file(png_file("huge.png", 20 * 1024 * 1024));
    match controller.state() {
        WorkflowState::Error { error, return_to } => {
            assert_eq!(error.kind, ErrorKind::TooLarge);
            assert_eq!(return_to, &ReturnState::Idle);
        }
        other => panic!("unexpected state {other:?}"),
    }

    pump_until(&mut controller, |state| *state == WorkflowState::Idle).await;
    assert!(start.elapsed() >= Duration::from_secs(5));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn unreachable_backend_returns_to_preview_of_same_file() {
    // Empty script: every predict fails as unreachable.
    let backend = ScriptedBackend::new(vec![]);
    let mut controller = controller(&backend);

    controller.select_file(png_file("bin.png", 1024));
    controller.analyze();
    controller.finish_analysis().await;

    match controller.state() {
        WorkflowState::Error { error, return_to } => {
            assert_eq!(error.kind, ErrorKind::Network);
            assert!(error.message.starts_with("Analysis failed: "));
            assert!(matches!(return_to, ReturnState::Previewing(f) if f.name == "bin.png"));
        }
        other => panic!("unexpected state {other:?}"),
    }

    pump_until(&mut controller, |state| {
        matches!(state, WorkflowState::Previewing(_))
    })
    .await;
    assert_eq!(selected_name(controller.state()), Some("bin.png"));

    // No automatic retry.
    assert_eq!(backend.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn stale_dismiss_timer_does_not_revert_newer_state() {
    let backend = ScriptedBackend::new(vec![]);
    let mut controller = controller(&backend);

    controller.select_file(SelectedFile::from_bytes("notes.txt", "text/plain", b"hi".to_vec()));
    assert!(matches!(controller.state(), WorkflowState::Error { .. }));

    controller.select_file(png_file("bin.png", 1024));
    assert!(matches!(controller.state(), WorkflowState::Previewing(_)));
    let version = controller.session().version();

    tokio::time::sleep(Duration::from_secs(6)).await;
    while controller.pump().await {}

    assert!(matches!(controller.state(), WorkflowState::Previewing(_)));
    assert_eq!(controller.session().version(), version);
}

#[tokio::test(start_paused = true)]
async fn analyze_without_file_shows_error_and_reverts() {
    let backend = ScriptedBackend::new(vec![]);
    let mut controller = controller(&backend);

    controller.analyze();
    match controller.state() {
        WorkflowState::Error { error, return_to } => {
            assert_eq!(error.kind, ErrorKind::NoFileSelected);
            assert_eq!(return_to, &ReturnState::Idle);
        }
        other => panic!("unexpected state {other:?}"),
    }

    pump_until(&mut controller, |state| *state == WorkflowState::Idle).await;
    assert_eq!(backend.calls(), 0);
}

// ── Reset ─────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn reset_always_lands_on_idle_without_file() {
    let backend = ScriptedBackend::new(vec![Ok(bin_full())]);
    let mut controller = controller(&backend);

    controller.reset();
    assert_eq!(controller.state(), &WorkflowState::Idle);

    controller.select_file(png_file("bin.png", 1024));
    controller.reset();
    assert_eq!(selected_name(controller.state()), None);

    controller.select_file(png_file("bin.png", 1024));
    controller.analyze();
    controller.finish_analysis().await;
    controller.reset();
    assert_eq!(controller.state(), &WorkflowState::Idle);

    controller.select_file(png_file("big.png", 11 * 1024 * 1024));
    controller.reset();
    assert_eq!(controller.state(), &WorkflowState::Idle);
    assert_eq!(controller.session().view().screen, Screen::DropZone);
}

// ── Command loop ──────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn command_loop_processes_user_actions_in_order() {
    let backend = ScriptedBackend::new(vec![Ok(bin_full())]);
    let (tx, rx) = mpsc::unbounded_channel();

    let user = async move {
        tx.send(Command::Select(png_file("bin.png", 1024))).unwrap();
        tx.send(Command::Analyze).unwrap();
        tx.send(Command::Analyze).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(tx);
    };
    let (session, ()) = tokio::join!(controller(&backend).run(rx), user);

    assert_eq!(session.state(), &WorkflowState::Result(bin_full()));
    assert_eq!(session.stats().count(), 1);
    assert_eq!(backend.calls(), 1);
}
