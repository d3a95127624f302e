//! Submission pipeline: the steps one dispatched attempt runs through.

use crate::axon::Axon;
use async_trait::async_trait;
use flowparty_core::bus::Bus;
use flowparty_core::error::RelayError;
use flowparty_core::outcome::Outcome;
use flowparty_core::payload::FormPayload;
use flowparty_core::relay::{Relay, RelayResponse};
use flowparty_core::transition::Transition;
use std::sync::Arc;

pub const PIPELINE_NAME: &str = "ContactSubmission";

/// Shared relay placed on the Bus for [`DeliverToRelay`].
#[derive(Clone)]
pub struct RelayHandle(pub Arc<dyn Relay>);

impl RelayHandle {
    pub fn new(relay: impl Relay) -> Self {
        RelayHandle(Arc::new(relay))
    }
}

impl std::fmt::Debug for RelayHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RelayHandle").field(&self.0.name()).finish()
    }
}

/// Attempt number placed on the Bus so steps can tag their logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptId(pub u64);

/// Sends the payload through the relay on the Bus. One request, no retry.
pub struct DeliverToRelay;

#[async_trait]
impl Transition<FormPayload, RelayResponse> for DeliverToRelay {
    type Error = RelayError;

    async fn run(&self, payload: FormPayload, bus: &mut Bus) -> Outcome<RelayResponse, Self::Error> {
        let Some(RelayHandle(relay)) = bus.get::<RelayHandle>().cloned() else {
            return Outcome::Fault(RelayError::MissingResource("RelayHandle"));
        };
        let attempt = bus.get::<AttemptId>().map(|a| a.0).unwrap_or_default();

        tracing::debug!(
            attempt,
            relay = relay.name(),
            fields = ?payload.field_names(),
            "delivering submission"
        );
        relay.deliver(&payload).await.into()
    }
}

/// Turns a decoded `success = false` body into a rejection fault.
pub struct CheckAcceptance;

#[async_trait]
impl Transition<RelayResponse, RelayResponse> for CheckAcceptance {
    type Error = RelayError;

    async fn run(&self, response: RelayResponse, _bus: &mut Bus) -> Outcome<RelayResponse, Self::Error> {
        if response.success {
            Outcome::Next(response)
        } else {
            Outcome::Fault(RelayError::Rejected {
                message: response.message,
            })
        }
    }
}

/// `FormPayload -> DeliverToRelay -> CheckAcceptance`
pub fn submission_pipeline() -> Axon<FormPayload, RelayResponse, RelayError> {
    Axon::<FormPayload, FormPayload, RelayError>::start(PIPELINE_NAME)
        .then(DeliverToRelay)
        .then(CheckAcceptance)
}
