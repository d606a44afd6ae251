use crate::config::ClientConfig;
use crate::models::view_types::ViewModel;
use crate::models::workflow_types::{SelectedFile, WorkflowState};
use crate::services::api_client::ApiClient;
use crate::services::preview_service;
use crate::services::presenter;
use crate::services::stats_aggregator::StatsAggregator;
use crate::services::workflow::machine::{self, Effect, Event, Outcome};
use futures::future::LocalBoxFuture;
use futures::stream::FuturesUnordered;
use futures::{FutureExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Consumer of view-models, e.g. a page or a terminal.
pub trait Renderer {
    fn render(&mut self, view: &ViewModel);
}

impl Renderer for Vec<ViewModel> {
    fn render(&mut self, view: &ViewModel) {
        self.push(view.clone());
    }
}

/// Everything that lives for the whole session: the current workflow
/// state, its version and the running statistics.
#[derive(Debug, Default)]
pub struct Session {
    state: WorkflowState,
    version: u64,
    stats: StatsAggregator,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn stats(&self) -> &StatsAggregator {
        &self.stats
    }

    pub fn view(&self) -> ViewModel {
        presenter::present(&self.state, &self.stats)
    }
}

/// User intents accepted by [`WorkflowController::run`].
#[derive(Debug, Clone)]
pub enum Command {
    Select(SelectedFile),
    Analyze,
    Reset,
}

impl From<Command> for Event {
    fn from(command: Command) -> Self {
        match command {
            Command::Select(file) => Event::FileSelected(file),
            Command::Analyze => Event::AnalyzeRequested,
            Command::Reset => Event::ResetRequested,
        }
    }
}

type Pending = LocalBoxFuture<'static, Option<Event>>;

/// Drives the workflow machine on a single task. Network calls, preview
/// decoding and dismiss timers are kept as pending futures and fed back as
/// events when they finish; nothing runs in parallel with a transition.
pub struct WorkflowController<C, R> {
    session: Session,
    client: Arc<C>,
    renderer: R,
    dismiss_delay: Duration,
    pending: FuturesUnordered<Pending>,
}

impl<C, R> WorkflowController<C, R>
where
    C: ApiClient + 'static,
    R: Renderer,
{
    pub fn new(client: Arc<C>, renderer: R, config: &ClientConfig) -> Self {
        Self {
            session: Session::new(),
            client,
            renderer,
            dismiss_delay: config.dismiss_delay,
            pending: FuturesUnordered::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> &WorkflowState {
        self.session.state()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    pub fn select_file(&mut self, file: SelectedFile) {
        self.dispatch(Event::FileSelected(file));
    }

    pub fn analyze(&mut self) {
        self.dispatch(Event::AnalyzeRequested);
    }

    pub fn reset(&mut self) {
        self.dispatch(Event::ResetRequested);
    }

    /// Probe the backend once; a failure shows the connectivity banner.
    pub fn check_health(&mut self) {
        let client = Arc::clone(&self.client);
        self.pending.push(
            async move {
                let outcome = client.health().await;
                if let Err(e) = &outcome {
                    tracing::error!(error = %e, "API connection failed");
                }
                Some(Event::HealthChecked(outcome))
            }
            .boxed_local(),
        );
    }

    /// Apply one event: transition, run its effects, then render.
    pub fn dispatch(&mut self, event: Event) {
        let from = self.session.state.name();
        let completion = event.completion_ticket();
        match machine::transition(&self.session.state, self.session.version, event) {
            Outcome::Ignored => match completion {
                Some(ticket) => {
                    tracing::warn!(ticket, state = from, "discarding stale analysis result")
                }
                None => tracing::debug!(state = from, "event ignored"),
            },
            Outcome::Refreshed(state) => {
                self.session.state = state;
                self.render();
            }
            Outcome::Transitioned { next, effects } => {
                self.session.version += 1;
                self.session.state = next;
                tracing::debug!(
                    from,
                    to = self.session.state.name(),
                    version = self.session.version,
                    "transition"
                );
                if let WorkflowState::Error { error, .. } = &self.session.state {
                    tracing::warn!(kind = ?error.kind, "{}", error.message);
                }
                for effect in effects {
                    self.run_effect(effect);
                }
                self.render();
            }
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::RecordResult(result) => {
                tracing::info!(
                    status = result.status(),
                    confidence = result.confidence_percent(),
                    "analysis complete"
                );
                self.session.stats.fold(&result);
            }
            Effect::Predict { ticket, file } => {
                let client = Arc::clone(&self.client);
                self.pending.push(
                    async move {
                        let outcome = client.predict(&file).await;
                        Some(Event::PredictCompleted { ticket, outcome })
                    }
                    .boxed_local(),
                );
            }
            Effect::ScheduleDismiss { version } => {
                let deadline = tokio::time::Instant::now() + self.dismiss_delay;
                self.pending.push(
                    async move {
                        tokio::time::sleep_until(deadline).await;
                        Some(Event::DismissElapsed { version })
                    }
                    .boxed_local(),
                );
            }
            Effect::DecodePreview { selection, file } => {
                let content = Arc::clone(&file.content);
                self.pending.push(
                    async move {
                        let decoded = tokio::task::spawn_blocking(move || {
                            preview_service::decode_preview(&content)
                        })
                        .await;
                        match decoded {
                            Ok(Ok(preview)) => Some(Event::PreviewDecoded { selection, preview }),
                            Ok(Err(e)) => {
                                tracing::warn!(file = %file.name, error = %e, "preview unavailable");
                                None
                            }
                            Err(e) => {
                                tracing::warn!(file = %file.name, error = %e, "preview task failed");
                                None
                            }
                        }
                    }
                    .boxed_local(),
                );
            }
        }
    }

    fn render(&mut self) {
        let view = self.session.view();
        self.renderer.render(&view);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Wait for the next pending task and apply what it produced.
    /// Returns `false` when nothing is pending.
    pub async fn pump(&mut self) -> bool {
        match self.pending.next().await {
            Some(Some(event)) => {
                self.dispatch(event);
                true
            }
            Some(None) => true,
            None => false,
        }
    }

    /// Keep pumping until the in-flight analysis (if any) has resolved.
    pub async fn finish_analysis(&mut self) {
        while matches!(self.session.state, WorkflowState::Analyzing { .. }) {
            if !self.pump().await {
                break;
            }
        }
    }

    /// Serve commands until the sender side closes, then hand back the
    /// session.
    pub async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) -> Session {
        self.render();
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.dispatch(command.into()),
                    None => break,
                },
                Some(event) = self.pending.next(), if !self.pending.is_empty() => {
                    if let Some(event) = event {
                        self.dispatch(event);
                    }
                }
            }
        }
        self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::analysis_types::{AnalysisResult, ServiceStatus};
    use crate::models::view_types::Screen;

    struct Offline;

    impl ApiClient for Offline {
        async fn health(&self) -> Result<ServiceStatus, AppError> {
            Err(AppError::unreachable())
        }

        async fn predict(&self, _file: &SelectedFile) -> Result<AnalysisResult, AppError> {
            Err(AppError::unreachable())
        }

        async fn download_model(&self) -> Result<Vec<u8>, AppError> {
            Err(AppError::unreachable())
        }
    }

    fn controller() -> WorkflowController<Offline, Vec<ViewModel>> {
        WorkflowController::new(Arc::new(Offline), Vec::new(), &ClientConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn renders_after_every_transition_only() {
        let mut controller = controller();
        controller.analyze();
        controller.analyze();
        assert_eq!(controller.renderer().len(), 1);
        assert_eq!(controller.session().version(), 1);

        controller.reset();
        assert_eq!(controller.renderer().len(), 2);
        assert_eq!(controller.renderer()[1].screen, Screen::DropZone);
    }

    #[tokio::test(start_paused = true)]
    async fn startup_health_failure_shows_banner_then_clears() {
        let mut controller = controller();
        controller.check_health();
        assert!(controller.pump().await);
        assert!(matches!(controller.state(), WorkflowState::Error { .. }));

        assert!(controller.pump().await);
        assert_eq!(controller.state(), &WorkflowState::Idle);
        assert!(!controller.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_completion_is_dropped_without_render() {
        let mut controller = controller();
        controller.reset();
        let renders = controller.renderer().len();

        controller.dispatch(Event::PredictCompleted {
            ticket: 0,
            outcome: Err(AppError::unreachable()),
        });

        assert_eq!(controller.state(), &WorkflowState::Idle);
        assert_eq!(controller.renderer().len(), renders);
        assert_eq!(controller.session().version(), 1);
        assert!(!controller.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn run_serves_commands_until_closed() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(Command::Analyze).unwrap();
        tx.send(Command::Reset).unwrap();
        drop(tx);

        let session = controller().run(rx).await;
        assert_eq!(session.state(), &WorkflowState::Idle);
        assert_eq!(session.version(), 2);
        assert_eq!(session.stats().count(), 0);
    }
}
