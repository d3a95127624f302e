pub mod axon;
pub mod controller;
pub mod pipeline;

pub mod prelude {
    pub use crate::axon::Axon;
    pub use crate::controller::{FormSubmissionController, FormSurface, NoSurface};
    pub use crate::pipeline::submission_pipeline;
}

pub use axon::Axon;
pub use controller::{FormSubmissionController, FormSurface, NoSurface};
pub use pipeline::{RelayHandle, submission_pipeline};
