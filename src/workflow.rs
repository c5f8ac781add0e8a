//! Two-stage generation run: blurb first, then a cover image for it.

use crate::{
    error::{GenerationError, Result},
    logger,
    models::{GeneratedCover, GenerationRequest, WorkflowState},
    openai::{BlurbGenerator, CoverGenerator},
};
use std::sync::Arc;
use uuid::Uuid;

pub const VALIDATION_MESSAGE: &str = "Please enter both title and theme";
pub const FAILURE_MESSAGE: &str = "Error generating manga - please try again";

/// Presentation surface driven by the workflow.
pub trait WorkflowView {
    /// `true` disables the inputs, hides the trigger and shows the busy
    /// indicator; `false` reverses all three.
    fn set_busy(&mut self, busy: bool);
    fn clear_results(&mut self);
    fn show_result(&mut self, blurb: &str, image_url: &str);
    fn notify_error(&mut self, message: &str);
}

#[derive(Debug)]
pub enum RunOutcome {
    /// Input failed validation; nothing was sent.
    Rejected(GenerationError),
    Failed(GenerationError),
    Completed(GeneratedCover),
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }

    pub fn cover(&self) -> Option<&GeneratedCover> {
        match self {
            RunOutcome::Completed(cover) => Some(cover),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&GenerationError> {
        match self {
            RunOutcome::Rejected(e) | RunOutcome::Failed(e) => Some(e),
            RunOutcome::Completed(_) => None,
        }
    }
}

pub struct Workflow<V: WorkflowView> {
    blurbs: Arc<dyn BlurbGenerator>,
    covers: Arc<dyn CoverGenerator>,
    view: V,
    state: WorkflowState,
}

impl<V: WorkflowView> Workflow<V> {
    pub fn new(blurbs: Arc<dyn BlurbGenerator>, covers: Arc<dyn CoverGenerator>, view: V) -> Self {
        Self {
            blurbs,
            covers,
            view,
            state: WorkflowState::Idle,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// Runs one submission end to end and drives the view accordingly.
    ///
    /// The view leaves the busy state exactly once per accepted submission,
    /// including when a client panics or the returned future is dropped
    /// before completion. Failures from either client produce the same
    /// single notification.
    pub async fn submit(&mut self, title: &str, theme: &str) -> RunOutcome {
        let request = match GenerationRequest::new(title, theme) {
            Ok(request) => request,
            Err(e) => {
                log::debug!("Submission rejected: {}", e);
                self.view.notify_error(VALIDATION_MESSAGE);
                return RunOutcome::Rejected(e);
            }
        };

        let run_id = Uuid::new_v4();
        log::info!(
            "Run {} started: title='{}' theme='{}'",
            run_id,
            request.title(),
            request.theme()
        );

        let result = {
            let _timer = logger::timer(&format!("run {}", run_id));
            let mut busy = BusyGuard::enter(&mut self.view, &mut self.state);

            let result = generate(self.blurbs.as_ref(), self.covers.as_ref(), &request).await;
            if let Ok(cover) = &result {
                busy.view().show_result(&cover.blurb, &cover.image.url);
            }
            result
        };

        match result {
            Ok(cover) => {
                log::info!("Run {} completed: {}", run_id, cover.image.url);
                RunOutcome::Completed(cover)
            }
            Err(e) => {
                // Already written to the diagnostic log by the failing client.
                log::info!("Run {} aborted", run_id);
                self.view.notify_error(FAILURE_MESSAGE);
                RunOutcome::Failed(e)
            }
        }
    }
}

async fn generate(
    blurbs: &dyn BlurbGenerator,
    covers: &dyn CoverGenerator,
    request: &GenerationRequest,
) -> Result<GeneratedCover> {
    let blurb = blurbs.generate_blurb(request).await?;
    let image = covers.generate_cover_image(&blurb).await?;
    Ok(GeneratedCover { blurb, image })
}

/// Holds the view in the busy state until dropped.
struct BusyGuard<'a, V: WorkflowView> {
    view: &'a mut V,
    state: &'a mut WorkflowState,
}

impl<'a, V: WorkflowView> BusyGuard<'a, V> {
    fn enter(view: &'a mut V, state: &'a mut WorkflowState) -> Self {
        view.set_busy(true);
        view.clear_results();
        *state = WorkflowState::Busy;
        Self { view, state }
    }

    fn view(&mut self) -> &mut V {
        self.view
    }
}

impl<V: WorkflowView> Drop for BusyGuard<'_, V> {
    fn drop(&mut self) {
        self.view.set_busy(false);
        *self.state = WorkflowState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::OpenAiConfig, credential::Credential, diagnostics::MemoryDiagnostics,
        models::CoverImageReference, openai::OpenAiClient,
    };
    use async_trait::async_trait;
    use mockito::Server;
    use std::sync::Mutex;
    use std::time::Duration;

    const BLURB: &str = "A fallen warrior seeks redemption in the shadows.";
    const IMAGE_URL: &str = "https://example.com/img.png";

    #[derive(Debug, Clone, PartialEq)]
    enum ViewEvent {
        Busy(bool),
        Cleared,
        Shown(String, String),
        Notified(String),
    }

    #[derive(Default)]
    struct RecordingView {
        events: Vec<ViewEvent>,
    }

    impl RecordingView {
        fn count(&self, wanted: &ViewEvent) -> usize {
            self.events.iter().filter(|e| *e == wanted).count()
        }

        fn notifications(&self) -> usize {
            self.events
                .iter()
                .filter(|e| matches!(e, ViewEvent::Notified(_)))
                .count()
        }
    }

    impl WorkflowView for RecordingView {
        fn set_busy(&mut self, busy: bool) {
            self.events.push(ViewEvent::Busy(busy));
        }

        fn clear_results(&mut self) {
            self.events.push(ViewEvent::Cleared);
        }

        fn show_result(&mut self, blurb: &str, image_url: &str) {
            self.events
                .push(ViewEvent::Shown(blurb.to_string(), image_url.to_string()));
        }

        fn notify_error(&mut self, message: &str) {
            self.events.push(ViewEvent::Notified(message.to_string()));
        }
    }

    type CallLog = Arc<Mutex<Vec<String>>>;

    enum Reply {
        Succeed(String),
        Fail(u16),
        Hang,
    }

    struct StubBlurbs {
        reply: Reply,
        calls: CallLog,
    }

    #[async_trait]
    impl BlurbGenerator for StubBlurbs {
        async fn generate_blurb(&self, request: &GenerationRequest) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("text:{}|{}", request.title(), request.theme()));
            match &self.reply {
                Reply::Succeed(text) => Ok(text.trim().to_string()),
                Reply::Fail(status) => Err(GenerationError::remote(Some(*status), "stub failure")),
                Reply::Hang => std::future::pending().await,
            }
        }
    }

    struct StubCovers {
        reply: Reply,
        calls: CallLog,
    }

    #[async_trait]
    impl CoverGenerator for StubCovers {
        async fn generate_cover_image(&self, prompt: &str) -> Result<CoverImageReference> {
            self.calls.lock().unwrap().push(format!("image:{}", prompt));
            match &self.reply {
                Reply::Succeed(url) => Ok(CoverImageReference { url: url.clone() }),
                Reply::Fail(status) => Err(GenerationError::remote(Some(*status), "stub failure")),
                Reply::Hang => std::future::pending().await,
            }
        }
    }

    fn workflow(text: Reply, image: Reply) -> (Workflow<RecordingView>, CallLog) {
        let calls = CallLog::default();
        let blurbs = StubBlurbs {
            reply: text,
            calls: calls.clone(),
        };
        let covers = StubCovers {
            reply: image,
            calls: calls.clone(),
        };
        (
            Workflow::new(Arc::new(blurbs), Arc::new(covers), RecordingView::default()),
            calls,
        )
    }

    fn calls(log: &CallLog) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_successful_run_publishes_both_results() {
        let (mut workflow, log) = workflow(
            Reply::Succeed(format!("  {}\n", BLURB)),
            Reply::Succeed(IMAGE_URL.to_string()),
        );

        let outcome = workflow.submit("Shadow Blade", "redemption").await;

        assert!(outcome.is_completed());
        assert_eq!(
            calls(&log),
            vec![
                "text:Shadow Blade|redemption".to_string(),
                format!("image:{}", BLURB),
            ]
        );
        assert_eq!(
            workflow.view().events,
            vec![
                ViewEvent::Busy(true),
                ViewEvent::Cleared,
                ViewEvent::Shown(BLURB.to_string(), IMAGE_URL.to_string()),
                ViewEvent::Busy(false),
            ]
        );
        assert_eq!(workflow.state(), WorkflowState::Idle);

        let cover = outcome.cover().unwrap();
        assert_eq!(cover.blurb, BLURB);
        assert_eq!(cover.image.url, IMAGE_URL);
    }

    #[tokio::test]
    async fn test_text_failure_skips_image_generation() {
        let (mut workflow, log) = workflow(Reply::Fail(500), Reply::Succeed(IMAGE_URL.into()));

        let outcome = workflow.submit("Shadow Blade", "redemption").await;

        assert!(matches!(outcome, RunOutcome::Failed(_)));
        assert_eq!(calls(&log), vec!["text:Shadow Blade|redemption".to_string()]);
        assert_eq!(
            workflow.view().events,
            vec![
                ViewEvent::Busy(true),
                ViewEvent::Cleared,
                ViewEvent::Busy(false),
                ViewEvent::Notified(FAILURE_MESSAGE.to_string()),
            ]
        );
        assert_eq!(workflow.state(), WorkflowState::Idle);
    }

    #[tokio::test]
    async fn test_image_failure_shows_no_partial_result() {
        let (mut workflow, log) = workflow(Reply::Succeed(BLURB.into()), Reply::Fail(400));

        let outcome = workflow.submit("Shadow Blade", "redemption").await;

        assert_eq!(outcome.error().and_then(|e| e.status()), Some(400));
        assert_eq!(calls(&log).len(), 2);
        let view = workflow.view();
        assert!(!view
            .events
            .iter()
            .any(|e| matches!(e, ViewEvent::Shown(_, _))));
        assert_eq!(view.count(&ViewEvent::Busy(false)), 1);
        assert_eq!(view.notifications(), 1);
    }

    #[tokio::test]
    async fn test_empty_title_is_rejected_without_calls() {
        let (mut workflow, log) = workflow(
            Reply::Succeed(BLURB.into()),
            Reply::Succeed(IMAGE_URL.into()),
        );

        let outcome = workflow.submit("", "war").await;

        assert!(matches!(
            outcome,
            RunOutcome::Rejected(GenerationError::Validation(_))
        ));
        assert!(calls(&log).is_empty());
        assert_eq!(
            workflow.view().events,
            vec![ViewEvent::Notified(VALIDATION_MESSAGE.to_string())]
        );
        assert_eq!(workflow.state(), WorkflowState::Idle);
    }

    #[tokio::test]
    async fn test_every_run_toggles_busy_once() {
        let (mut workflow, _log) = workflow(
            Reply::Succeed(BLURB.into()),
            Reply::Succeed(IMAGE_URL.into()),
        );

        workflow.submit("Shadow Blade", "redemption").await;
        workflow.submit("Iron Petal", "friendship").await;

        let view = workflow.into_view();
        assert_eq!(view.count(&ViewEvent::Busy(true)), 2);
        assert_eq!(view.count(&ViewEvent::Busy(false)), 2);
        assert_eq!(view.count(&ViewEvent::Cleared), 2);
    }

    #[tokio::test]
    async fn test_dropped_run_returns_to_idle() {
        let (mut workflow, log) = workflow(Reply::Hang, Reply::Succeed(IMAGE_URL.into()));

        let run = tokio::time::timeout(
            Duration::from_millis(20),
            workflow.submit("Shadow Blade", "redemption"),
        )
        .await;

        assert!(run.is_err());
        assert_eq!(calls(&log).len(), 1);
        assert_eq!(workflow.state(), WorkflowState::Idle);
        assert_eq!(
            workflow.view().events.last(),
            Some(&ViewEvent::Busy(false))
        );
        assert_eq!(workflow.view().notifications(), 0);
    }

    #[tokio::test]
    async fn test_rate_limited_text_call_end_to_end() {
        let mut server = Server::new_async().await;
        let text_mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body(r#"{"error": {"message": "Rate limit reached"}}"#)
            .expect(1)
            .create_async()
            .await;
        let image_mock = server
            .mock("POST", "/v1/images/generations")
            .expect(0)
            .create_async()
            .await;

        let config = OpenAiConfig::new().with_endpoints(
            format!("{}/v1/chat/completions", server.url()),
            format!("{}/v1/images/generations", server.url()),
        );
        let diagnostics = MemoryDiagnostics::new();
        let client = OpenAiClient::with_diagnostics(
            config,
            Credential::new("sk-test"),
            Arc::new(diagnostics.clone()),
        )
        .unwrap();
        let mut workflow = Workflow::new(
            Arc::new(client.text().clone()),
            Arc::new(client.image().clone()),
            RecordingView::default(),
        );

        let outcome = workflow.submit("Shadow Blade", "redemption").await;

        text_mock.assert_async().await;
        image_mock.assert_async().await;
        assert!(matches!(
            outcome,
            RunOutcome::Failed(GenerationError::RemoteService {
                status: Some(429),
                ..
            })
        ));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(workflow.view().notifications(), 1);
        assert_eq!(workflow.state(), WorkflowState::Idle);
    }
}
