//! Flow Party facade crate.
//!
//! Re-exports the core state machine, the runtime controller, and (by
//! default) the Web3Forms relay and tracing setup behind one entry point.

pub use flowparty_core as core;
#[cfg(feature = "observe")]
pub use flowparty_observe as observe;
#[cfg(feature = "relay")]
pub use flowparty_relay as relay;
pub use flowparty_runtime as runtime;

pub use flowparty_core::{
    AccessKey, ContactForm, FormConfig, FormFields, ReentryPolicy, SubmissionState,
    SubmissionStatus,
};
#[cfg(feature = "relay")]
pub use flowparty_relay::Web3FormsRelay;
pub use flowparty_runtime::{FormSubmissionController, FormSurface, NoSurface};

pub mod prelude {
    pub use flowparty_core::prelude::*;
    pub use flowparty_runtime::prelude::*;
    #[cfg(feature = "relay")]
    pub use flowparty_relay::Web3FormsRelay;
}
