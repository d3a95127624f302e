//! FormSubmissionController - mediates between a form surface and the relay
//!
//! The controller owns one [`SubmissionState`], feeds it events, and carries
//! out the effects it returns: dispatching through the submission pipeline
//! and telling the surface to clear its fields. Every failure is folded into
//! the four-value status; nothing propagates to the caller.

use crate::axon::Axon;
use crate::pipeline::{AttemptId, RelayHandle, submission_pipeline};
use chrono::Utc;
use flowparty_core::bus::Bus;
use flowparty_core::config::FormConfig;
use flowparty_core::error::{RelayError, ValidationError};
use flowparty_core::payload::{AccessKey, ContactForm, FormFields, FormPayload};
use flowparty_core::relay::{Relay, RelayResponse, RelayVerdict};
use flowparty_core::schematic::Schematic;
use flowparty_core::state::{
    Disposition, Effect, FormEvent, ReentryPolicy, SubmissionState, SubmissionStatus,
};
use flowparty_core::timeline::{Timeline, TimelineEvent};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

/// The rendering collaborator.
pub trait FormSurface: Send + Sync {
    /// Clear the inputs the surface owns. Called once per successful attempt.
    fn clear_fields(&self);

    /// Called after every applied state change, in the order the changes
    /// were applied. Must not call `submit` or `reset` on the same controller.
    fn render(&self, _state: &SubmissionState) {}
}

/// Surface for headless callers that own no inputs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSurface;

impl FormSurface for NoSurface {
    fn clear_fields(&self) {}
}

pub struct FormSubmissionController {
    policy: ReentryPolicy,
    relay: RelayHandle,
    surface: Arc<dyn FormSurface>,
    pipeline: Axon<FormPayload, RelayResponse, RelayError>,
    state: Mutex<SubmissionState>,
    history: Mutex<Timeline>,
    updates: watch::Sender<SubmissionState>,
    /// Held from the state step until the surface has rendered it.
    /// Always taken before `state`.
    publish: Mutex<()>,
}

impl FormSubmissionController {
    pub fn new(relay: impl Relay) -> Self {
        let (updates, _) = watch::channel(SubmissionState::new());
        Self {
            policy: ReentryPolicy::default(),
            relay: RelayHandle::new(relay),
            surface: Arc::new(NoSurface),
            pipeline: submission_pipeline(),
            state: Mutex::new(SubmissionState::new()),
            history: Mutex::new(Timeline::new()),
            updates,
            publish: Mutex::new(()),
        }
    }

    pub fn from_config(config: &FormConfig, relay: impl Relay) -> Self {
        Self::new(relay).with_policy(config.reentry)
    }

    pub fn with_policy(mut self, policy: ReentryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_surface(mut self, surface: Arc<dyn FormSurface>) -> Self {
        self.surface = surface;
        self
    }

    pub fn policy(&self) -> ReentryPolicy {
        self.policy
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SubmissionState {
        self.state.lock().clone()
    }

    pub fn status(&self) -> SubmissionStatus {
        self.state.lock().status()
    }

    pub fn error_message(&self) -> Option<String> {
        self.state.lock().error_message().map(str::to_string)
    }

    /// Receiver that observes every applied state change.
    pub fn subscribe(&self) -> watch::Receiver<SubmissionState> {
        self.updates.subscribe()
    }

    pub fn history(&self) -> Timeline {
        self.history.lock().clone()
    }

    pub fn schematic(&self) -> &Schematic {
        self.pipeline.schematic()
    }

    /// Submit `fields` with `credential`.
    ///
    /// Returns the state once the attempt has resolved. Under
    /// [`ReentryPolicy::IgnoreWhileSubmitting`] a call made while another
    /// attempt is in flight returns the current (`Submitting`) state at once
    /// and sends nothing.
    pub async fn submit(&self, fields: FormFields, credential: &AccessKey) -> SubmissionState {
        let effects = self.apply(FormEvent::Submit {
            fields,
            credential: credential.clone(),
        });

        for effect in effects {
            match effect {
                Effect::Dispatch { attempt, payload } => {
                    let verdict = self.dispatch(attempt, payload).await;
                    let follow_up = self.apply(FormEvent::Resolved { attempt, verdict });
                    follow_up.into_iter().for_each(|e| self.perform_local(e));
                }
                other => self.perform_local(other),
            }
        }

        self.state()
    }

    /// Validate `form` first, then submit it.
    pub async fn submit_contact(
        &self,
        form: &ContactForm,
        credential: &AccessKey,
    ) -> Result<SubmissionState, ValidationError> {
        let fields = form.validate()?;
        Ok(self.submit(fields, credential).await)
    }

    /// Back to `Idle` with no error, from any state.
    pub fn reset(&self) {
        let effects = self.apply(FormEvent::Reset);
        effects.into_iter().for_each(|e| self.perform_local(e));
    }

    async fn dispatch(&self, attempt: u64, payload: FormPayload) -> RelayVerdict {
        let mut bus = Bus::new()
            .with(self.relay.clone())
            .with(AttemptId(attempt));

        let outcome = self.pipeline.execute(payload, &mut bus).await;
        let verdict = RelayVerdict::from(outcome.into_result());
        tracing::debug!(attempt, ?verdict, "attempt resolved");
        verdict
    }

    fn perform_local(&self, effect: Effect) {
        match effect {
            Effect::ClearFields => {
                let attempt = self.state.lock().attempt();
                self.history.lock().push(TimelineEvent::FieldsCleared {
                    attempt,
                    at: Utc::now(),
                });
                self.surface.clear_fields();
            }
            Effect::Dispatch { attempt, .. } => {
                tracing::error!(attempt, "dispatch requested outside submit; dropped");
            }
        }
    }

    /// Run one event through the state machine and publish the result.
    fn apply(&self, event: FormEvent) -> Vec<Effect> {
        let _publishing = self.publish.lock();
        let applied = {
            let mut state = self.state.lock();
            let before = state.clone();
            let step = state.step(event, self.policy);
            *state = step.state.clone();

            let mut history = self.history.lock();
            let at = Utc::now();
            let attempt = step.state.attempt();
            match step.disposition {
                Disposition::IgnoredReentry => {
                    tracing::info!(attempt, "submit ignored: already submitting");
                    history.push(TimelineEvent::SubmitIgnored { attempt, at });
                }
                Disposition::StaleResolution => {
                    tracing::info!(current = attempt, "stale resolution dropped");
                    history.push(TimelineEvent::StaleResolutionDropped { attempt, at });
                }
                Disposition::Applied => {
                    if before.status() != step.state.status() {
                        tracing::info!(
                            attempt,
                            from = %before.status(),
                            to = %step.state.status(),
                            "submission status changed"
                        );
                        history.push(TimelineEvent::StatusChanged {
                            attempt,
                            from: before.status(),
                            to: step.state.status(),
                            at,
                        });
                    }
                    for effect in &step.effects {
                        if let Effect::Dispatch { attempt, .. } = effect {
                            history.push(TimelineEvent::Dispatched {
                                attempt: *attempt,
                                at,
                            });
                        }
                    }
                }
            }

            (step.disposition == Disposition::Applied).then_some(step)
        };

        match applied {
            Some(step) => {
                self.updates.send_replace(step.state.clone());
                self.surface.render(&step.state);
                step.effects
            }
            None => Vec::new(),
        }
    }
}

impl std::fmt::Debug for FormSubmissionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormSubmissionController")
            .field("policy", &self.policy)
            .field("relay", &self.relay)
            .field("state", &*self.state.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Relay that answers from a script. Call `i` waits on `gates[i]` if set.
    #[derive(Default)]
    struct ScriptedRelay {
        replies: Mutex<VecDeque<Result<RelayResponse, RelayError>>>,
        gates: Vec<Arc<Notify>>,
        calls: AtomicUsize,
    }

    impl ScriptedRelay {
        fn replying(replies: impl IntoIterator<Item = Result<RelayResponse, RelayError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().collect()),
                ..Default::default()
            }
        }

        fn gated(mut self, gates: usize) -> Self {
            self.gates = (0..gates).map(|_| Arc::new(Notify::new())).collect();
            self
        }

        fn release(&self, call: usize) {
            self.gates[call].notify_one();
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn wait_for_calls(&self, n: usize) {
            while self.calls() < n {
                tokio::task::yield_now().await;
            }
        }
    }

    #[async_trait]
    impl Relay for ScriptedRelay {
        async fn deliver(&self, _payload: &FormPayload) -> Result<RelayResponse, RelayError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self
                .replies
                .lock()
                .pop_front()
                .unwrap_or_else(|| Ok(RelayResponse::accepted()));
            if let Some(gate) = self.gates.get(call) {
                gate.notified().await;
            }
            reply
        }
    }

    #[derive(Default)]
    struct CountingSurface {
        clears: AtomicUsize,
        renders: AtomicUsize,
    }

    impl FormSurface for CountingSurface {
        fn clear_fields(&self) {
            self.clears.fetch_add(1, Ordering::SeqCst);
        }

        fn render(&self, _state: &SubmissionState) {
            self.renders.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Surface whose `Submitting` render is slow, recording what it last showed.
    #[derive(Default)]
    struct SlowSurface {
        rendering_submitting: AtomicBool,
        shown: Mutex<Option<SubmissionStatus>>,
    }

    impl FormSurface for SlowSurface {
        fn clear_fields(&self) {}

        fn render(&self, state: &SubmissionState) {
            if state.status() == SubmissionStatus::Submitting {
                self.rendering_submitting.store(true, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(200));
            }
            *self.shown.lock() = Some(state.status());
        }
    }

    fn fields() -> FormFields {
        FormFields::new()
            .with("name", "Ada")
            .with("email", "ada@example.com")
            .with("message", "See you at the party")
    }

    fn key() -> AccessKey {
        AccessKey::new("test-key")
    }

    #[tokio::test]
    async fn success_clears_fields_exactly_once() {
        let surface = Arc::new(CountingSurface::default());
        let controller = FormSubmissionController::new(ScriptedRelay::replying([Ok(
            RelayResponse::accepted(),
        )]))
        .with_surface(surface.clone());

        let state = controller.submit(fields(), &key()).await;

        assert_eq!(state.status(), SubmissionStatus::Succeeded);
        assert_eq!(state.error_message(), None);
        assert_eq!(surface.clears.load(Ordering::SeqCst), 1);
        assert_eq!(surface.renders.load(Ordering::SeqCst), 2);
        assert_eq!(
            controller.history().statuses(),
            vec![SubmissionStatus::Submitting, SubmissionStatus::Succeeded]
        );
        assert_eq!(controller.history().clear_count(), 1);
    }

    #[tokio::test]
    async fn rejection_surfaces_server_message() {
        let controller = FormSubmissionController::new(ScriptedRelay::replying([Ok(
            RelayResponse::rejected(Some("Invalid email".into())),
        )]));

        let state = controller.submit(fields(), &key()).await;

        assert_eq!(state.status(), SubmissionStatus::Failed);
        assert_eq!(state.error_message(), Some("Invalid email"));
    }

    #[tokio::test]
    async fn rejection_without_message_falls_back() {
        let surface = Arc::new(CountingSurface::default());
        let controller =
            FormSubmissionController::new(ScriptedRelay::replying([Ok(RelayResponse::rejected(None))]))
                .with_surface(surface.clone());

        controller.submit(fields(), &key()).await;

        assert_eq!(controller.error_message().as_deref(), Some("Something went wrong"));
        assert_eq!(surface.clears.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transport_failure_is_generic() {
        let controller = FormSubmissionController::new(ScriptedRelay::replying([Err(
            RelayError::Transport("connection refused".into()),
        )]));

        let state = controller.submit(fields(), &key()).await;

        assert_eq!(state.status(), SubmissionStatus::Failed);
        assert_eq!(state.error_message(), Some("Network error. Please try again."));
    }

    #[tokio::test]
    async fn retry_after_failure_can_succeed() {
        let relay = Arc::new(ScriptedRelay::replying([
            Err(RelayError::MalformedResponse("not json".into())),
            Ok(RelayResponse::accepted()),
        ]));
        let controller = FormSubmissionController::new(relay.clone());

        assert_eq!(
            controller.submit(fields(), &key()).await.status(),
            SubmissionStatus::Failed
        );
        let retried = controller.submit(fields(), &key()).await;

        assert_eq!(retried.status(), SubmissionStatus::Succeeded);
        assert_eq!(retried.attempt(), 2);
        assert_eq!(relay.calls(), 2);
        assert_eq!(controller.history().dispatch_count(), 2);
    }

    #[tokio::test]
    async fn resubmit_after_success_starts_new_attempt() {
        let surface = Arc::new(CountingSurface::default());
        let relay = Arc::new(ScriptedRelay::default());
        let controller =
            FormSubmissionController::new(relay.clone()).with_surface(surface.clone());

        controller.submit(fields(), &key()).await;
        let again = controller.submit(fields(), &key()).await;

        assert_eq!(again.status(), SubmissionStatus::Succeeded);
        assert_eq!(again.attempt(), 2);
        assert_eq!(relay.calls(), 2);
        assert_eq!(surface.clears.load(Ordering::SeqCst), 2);
        assert_eq!(
            controller.history().statuses(),
            vec![
                SubmissionStatus::Submitting,
                SubmissionStatus::Succeeded,
                SubmissionStatus::Submitting,
                SubmissionStatus::Succeeded,
            ]
        );
    }

    #[tokio::test]
    async fn reset_returns_to_idle_and_is_idempotent() {
        let controller = FormSubmissionController::new(ScriptedRelay::replying([Err(
            RelayError::Transport("timeout".into()),
        )]));
        controller.submit(fields(), &key()).await;
        assert_eq!(controller.status(), SubmissionStatus::Failed);

        controller.reset();
        let once = controller.state();
        controller.reset();

        assert_eq!(once.status(), SubmissionStatus::Idle);
        assert_eq!(once.error_message(), None);
        assert_eq!(controller.state(), once);
    }

    #[tokio::test]
    async fn subscribers_see_final_state() {
        let controller = FormSubmissionController::new(ScriptedRelay::default());
        let mut rx = controller.subscribe();

        controller.submit(fields(), &key()).await;

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().status(), SubmissionStatus::Succeeded);
    }

    #[tokio::test]
    async fn invalid_contact_form_sends_nothing() {
        let relay = Arc::new(ScriptedRelay::default());
        let controller = FormSubmissionController::new(relay.clone());

        let err = controller
            .submit_contact(&ContactForm::new("Ada", "", "hi"), &key())
            .await
            .unwrap_err();

        assert_eq!(err, ValidationError::MissingField("email"));
        assert_eq!(relay.calls(), 0);
        assert_eq!(controller.status(), SubmissionStatus::Idle);
    }

    #[tokio::test]
    async fn reentrant_submit_is_ignored() {
        let relay = Arc::new(ScriptedRelay::replying([Ok(RelayResponse::accepted())]).gated(1));
        let controller = Arc::new(FormSubmissionController::new(relay.clone()));

        let first = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit(fields(), &key()).await }
        });
        relay.wait_for_calls(1).await;

        let second = controller.submit(fields(), &key()).await;
        assert_eq!(second.status(), SubmissionStatus::Submitting);
        assert_eq!(relay.calls(), 1);

        relay.release(0);
        let done = first.await.unwrap();

        assert_eq!(done.status(), SubmissionStatus::Succeeded);
        assert_eq!(relay.calls(), 1);
        assert!(controller
            .history()
            .events
            .iter()
            .any(|e| matches!(e, TimelineEvent::SubmitIgnored { .. })));
    }

    #[tokio::test]
    async fn resolution_after_reset_is_dropped() {
        let surface = Arc::new(CountingSurface::default());
        let relay = Arc::new(ScriptedRelay::replying([Ok(RelayResponse::accepted())]).gated(1));
        let controller = Arc::new(
            FormSubmissionController::new(relay.clone()).with_surface(surface.clone()),
        );

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit(fields(), &key()).await }
        });
        relay.wait_for_calls(1).await;

        controller.reset();
        relay.release(0);
        let state = pending.await.unwrap();

        assert_eq!(state.status(), SubmissionStatus::Idle);
        assert_eq!(surface.clears.load(Ordering::SeqCst), 0);
        assert!(controller
            .history()
            .events
            .iter()
            .any(|e| matches!(e, TimelineEvent::StaleResolutionDropped { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn reset_during_render_is_shown_last() {
        // relay never answers; the attempt stays in flight
        let relay = Arc::new(ScriptedRelay::default().gated(1));
        let surface = Arc::new(SlowSurface::default());
        let controller = Arc::new(
            FormSubmissionController::new(relay.clone()).with_surface(surface.clone()),
        );

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.submit(fields(), &key()).await }
        });
        while !surface.rendering_submitting.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }

        controller.reset();

        assert_eq!(controller.status(), SubmissionStatus::Idle);
        assert_eq!(*surface.shown.lock(), Some(SubmissionStatus::Idle));
        assert_eq!(controller.subscribe().borrow().status(), SubmissionStatus::Idle);
        pending.abort();
    }

    #[tokio::test]
    async fn last_response_wins_when_configured() {
        let relay = Arc::new(
            ScriptedRelay::replying([
                Ok(RelayResponse::accepted()),
                Ok(RelayResponse::rejected(Some("late".into()))),
            ])
            .gated(2),
        );
        let controller = Arc::new(
            FormSubmissionController::new(relay.clone())
                .with_policy(ReentryPolicy::LastResponseWins),
        );

        let spawn_submit = |controller: Arc<FormSubmissionController>| {
            tokio::spawn(async move { controller.submit(fields(), &key()).await })
        };

        let first = spawn_submit(controller.clone());
        relay.wait_for_calls(1).await;
        let second = spawn_submit(controller.clone());
        relay.wait_for_calls(2).await;

        // second request answers first, first request answers last
        relay.release(1);
        second.await.unwrap();
        assert_eq!(controller.status(), SubmissionStatus::Failed);

        relay.release(0);
        first.await.unwrap();

        assert_eq!(controller.status(), SubmissionStatus::Succeeded);
        assert_eq!(relay.calls(), 2);
    }

    #[test]
    fn schematic_is_exposed() {
        let controller = FormSubmissionController::new(ScriptedRelay::default());
        assert_eq!(controller.schematic().nodes.len(), 3);
    }
}
