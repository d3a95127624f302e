use crate::state::SubmissionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A discrete event in a form's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TimelineEvent {
    /// Status moved from one value to another.
    StatusChanged {
        attempt: u64,
        from: SubmissionStatus,
        to: SubmissionStatus,
        at: DateTime<Utc>,
    },
    /// A request was handed to the relay.
    Dispatched { attempt: u64, at: DateTime<Utc> },
    /// A `submit` was refused because one was already in flight.
    SubmitIgnored { attempt: u64, at: DateTime<Utc> },
    /// A resolution arrived for an attempt that is no longer current.
    StaleResolutionDropped { attempt: u64, at: DateTime<Utc> },
    /// The surface was asked to clear its inputs.
    FieldsCleared { attempt: u64, at: DateTime<Utc> },
}

impl TimelineEvent {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            TimelineEvent::StatusChanged { at, .. }
            | TimelineEvent::Dispatched { at, .. }
            | TimelineEvent::SubmitIgnored { at, .. }
            | TimelineEvent::StaleResolutionDropped { at, .. }
            | TimelineEvent::FieldsCleared { at, .. } => *at,
        }
    }
}

/// A sequential record of one form's submissions.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Timeline {
    pub events: Vec<TimelineEvent>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: TimelineEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of requests handed to the relay.
    pub fn dispatch_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TimelineEvent::Dispatched { .. }))
            .count()
    }

    pub fn clear_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TimelineEvent::FieldsCleared { .. }))
            .count()
    }

    /// Status values in the order they were entered.
    pub fn statuses(&self) -> Vec<SubmissionStatus> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TimelineEvent::StatusChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect()
    }
}
