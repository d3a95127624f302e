//! Flow Party Core - submission state machine and the contracts around it
//!
//! **IMPORTANT**: This layer is pure Rust - no HTTP, no runtime, no clock in
//! the state machine. Delivery lives behind the [`Relay`] trait.

pub mod bus;
pub mod config;
pub mod error;
pub mod outcome;
pub mod payload;
pub mod relay;
pub mod schematic;
pub mod state;
pub mod timeline;
pub mod transition;

pub use bus::Bus;
pub use config::FormConfig;
pub use error::{ConfigError, RelayError, ValidationError};
pub use outcome::Outcome;
pub use payload::{AccessKey, ContactForm, FormFields, FormPayload};
pub use relay::{Relay, RelayResponse, RelayVerdict};
pub use schematic::Schematic;
pub use state::{Effect, FormEvent, ReentryPolicy, SubmissionState, SubmissionStatus};
pub use timeline::{Timeline, TimelineEvent};
pub use transition::Transition;

pub mod prelude {
    pub use crate::bus::Bus;
    pub use crate::config::FormConfig;
    pub use crate::error::{ConfigError, RelayError, ValidationError};
    pub use crate::outcome::Outcome;
    pub use crate::payload::{AccessKey, ContactForm, FormFields, FormPayload};
    pub use crate::relay::{Relay, RelayResponse, RelayVerdict};
    pub use crate::state::{ReentryPolicy, SubmissionState, SubmissionStatus};
    pub use crate::transition::Transition;
}
