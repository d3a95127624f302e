//! SubmissionState - The form's four-value state machine
//!
//! ```text
//! Idle --submit--> Submitting --accepted--> Succeeded --reset--> Idle
//!                       |
//!                       +--rejected / transport--> Failed --reset--> Idle
//!                                                     |
//!                                                 submit (retry) --> Submitting
//! ```
//!
//! This layer is pure: `step` takes an event and returns the next state plus
//! the effects the owner must carry out. No IO, no clock, no async.

use crate::payload::{AccessKey, FormFields, FormPayload};
use crate::relay::RelayVerdict;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The status a surface renders against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Idle => "idle",
            SubmissionStatus::Submitting => "submitting",
            SubmissionStatus::Succeeded => "succeeded",
            SubmissionStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum Phase {
    Idle,
    Submitting,
    Succeeded,
    Failed { message: String },
}

/// What to do with `submit` while a request is already in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReentryPolicy {
    /// Refuse the second submit; drop resolutions that are not for the
    /// current in-flight attempt.
    #[default]
    IgnoreWhileSubmitting,
    /// Dispatch every submit; whichever resolution arrives last decides.
    LastResponseWins,
}

impl FromStr for ReentryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore-while-submitting" | "ignore" => Ok(ReentryPolicy::IgnoreWhileSubmitting),
            "last-response-wins" | "last-wins" => Ok(ReentryPolicy::LastResponseWins),
            other => Err(other.to_string()),
        }
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone)]
pub enum FormEvent {
    Submit {
        fields: FormFields,
        credential: AccessKey,
    },
    Resolved {
        attempt: u64,
        verdict: RelayVerdict,
    },
    Reset,
}

/// Instructions for the owner of the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Issue exactly one request carrying `payload`.
    Dispatch { attempt: u64, payload: FormPayload },
    /// Clear the inputs the surface owns.
    ClearFields,
}

/// Whether an event changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Applied,
    /// `submit` arrived while `Submitting` under `IgnoreWhileSubmitting`.
    IgnoredReentry,
    /// A resolution arrived for an attempt that is no longer in flight.
    StaleResolution,
}

/// Result of one `step`.
#[derive(Debug, Clone)]
pub struct Step {
    pub state: SubmissionState,
    pub effects: Vec<Effect>,
    pub disposition: Disposition,
}

/// Lifecycle state of one form. Created `Idle`, changed only by `step`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionState {
    phase: Phase,
    attempt: u64,
}

impl Default for SubmissionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionState {
    pub fn new() -> Self {
        SubmissionState {
            phase: Phase::Idle,
            attempt: 0,
        }
    }

    pub fn status(&self) -> SubmissionStatus {
        match self.phase {
            Phase::Idle => SubmissionStatus::Idle,
            Phase::Submitting => SubmissionStatus::Submitting,
            Phase::Succeeded => SubmissionStatus::Succeeded,
            Phase::Failed { .. } => SubmissionStatus::Failed,
        }
    }

    /// Present only while `Failed`.
    pub fn error_message(&self) -> Option<&str> {
        match &self.phase {
            Phase::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// Number of requests dispatched so far; also the id of the latest one.
    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == Phase::Submitting
    }

    /// Advance the machine by one event.
    pub fn step(&self, event: FormEvent, policy: ReentryPolicy) -> Step {
        match event {
            FormEvent::Submit { fields, credential } => self.on_submit(fields, &credential, policy),
            FormEvent::Resolved { attempt, verdict } => self.on_resolved(attempt, verdict, policy),
            FormEvent::Reset => Step {
                state: SubmissionState {
                    phase: Phase::Idle,
                    attempt: self.attempt,
                },
                effects: Vec::new(),
                disposition: Disposition::Applied,
            },
        }
    }

    fn on_submit(&self, fields: FormFields, credential: &AccessKey, policy: ReentryPolicy) -> Step {
        if self.is_submitting() && policy == ReentryPolicy::IgnoreWhileSubmitting {
            return self.unchanged(Disposition::IgnoredReentry);
        }

        let attempt = self.attempt + 1;
        Step {
            state: SubmissionState {
                phase: Phase::Submitting,
                attempt,
            },
            effects: vec![Effect::Dispatch {
                attempt,
                payload: FormPayload::assemble(fields, credential),
            }],
            disposition: Disposition::Applied,
        }
    }

    fn on_resolved(&self, attempt: u64, verdict: RelayVerdict, policy: ReentryPolicy) -> Step {
        let current = attempt == self.attempt && self.is_submitting();
        if !current && policy == ReentryPolicy::IgnoreWhileSubmitting {
            return self.unchanged(Disposition::StaleResolution);
        }

        let (phase, effects) = match verdict.user_message() {
            None => (Phase::Succeeded, vec![Effect::ClearFields]),
            Some(message) => (Phase::Failed { message }, Vec::new()),
        };

        Step {
            state: SubmissionState {
                phase,
                attempt: self.attempt,
            },
            effects,
            disposition: Disposition::Applied,
        }
    }

    fn unchanged(&self, disposition: Disposition) -> Step {
        Step {
            state: self.clone(),
            effects: Vec::new(),
            disposition,
        }
    }
}
