//! The seam between the pipeline and whatever actually delivers a payload.

use crate::error::RelayError;
use crate::payload::FormPayload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default Web3Forms submission endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.web3forms.com/submit";

/// Decoded relay response body.
///
/// Only `success` is required; `message` is shown verbatim on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl RelayResponse {
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn rejected(message: Option<String>) -> Self {
        Self {
            success: false,
            message,
        }
    }

    /// Decode a raw body. Anything that is not the expected JSON object is a
    /// malformed response.
    pub fn from_json(body: &[u8]) -> Result<Self, RelayError> {
        serde_json::from_slice(body).map_err(|e| RelayError::MalformedResponse(e.to_string()))
    }

    pub fn into_result(self) -> Result<(), RelayError> {
        if self.success {
            Ok(())
        } else {
            Err(RelayError::Rejected {
                message: self.message,
            })
        }
    }
}

/// How one attempt ended, as far as the state machine cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayVerdict {
    Accepted,
    Failed(RelayError),
}

impl RelayVerdict {
    /// The text a user should see, or `None` when the relay accepted.
    pub fn user_message(&self) -> Option<String> {
        match self {
            RelayVerdict::Accepted => None,
            RelayVerdict::Failed(err) => Some(err.user_message()),
        }
    }
}

impl From<Result<RelayResponse, RelayError>> for RelayVerdict {
    fn from(result: Result<RelayResponse, RelayError>) -> Self {
        match result.and_then(RelayResponse::into_result) {
            Ok(()) => RelayVerdict::Accepted,
            Err(err) => {
                if !err.is_rejection() {
                    tracing::warn!(error = %err, "relay delivery failed");
                }
                RelayVerdict::Failed(err)
            }
        }
    }
}

/// Delivers one payload and returns the decoded response.
///
/// Implementations issue exactly one request per call and never retry.
#[async_trait]
pub trait Relay: Send + Sync + 'static {
    async fn deliver(&self, payload: &FormPayload) -> Result<RelayResponse, RelayError>;

    /// Name used in logs and the pipeline schematic.
    fn name(&self) -> &str {
        "relay"
    }
}

#[async_trait]
impl<R: Relay + ?Sized> Relay for std::sync::Arc<R> {
    async fn deliver(&self, payload: &FormPayload) -> Result<RelayResponse, RelayError> {
        (**self).deliver(payload).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_success_body() {
        let res = RelayResponse::from_json(br#"{"success":true,"message":"Email sent successfully!"}"#)
            .unwrap();
        assert!(res.success);

        let verdict = RelayVerdict::from(Ok(res));
        assert_eq!(verdict, RelayVerdict::Accepted);
        assert_eq!(verdict.user_message(), None);
    }

    #[test]
    fn decodes_failure_without_message() {
        let res = RelayResponse::from_json(br#"{"success":false}"#).unwrap();
        let verdict = RelayVerdict::from(Ok(res));
        assert_eq!(
            verdict,
            RelayVerdict::Failed(RelayError::Rejected { message: None })
        );
        assert_eq!(verdict.user_message().as_deref(), Some("Something went wrong"));
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = RelayResponse::from_json(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, RelayError::MalformedResponse(_)));

        let verdict = RelayVerdict::from(Err(err));
        assert!(matches!(
            verdict,
            RelayVerdict::Failed(RelayError::MalformedResponse(_))
        ));
        assert_eq!(
            verdict.user_message().as_deref(),
            Some("Network error. Please try again.")
        );
    }

    #[test]
    fn missing_success_field_is_malformed() {
        let err = RelayResponse::from_json(br#"{"message":"hi"}"#).unwrap_err();
        assert!(matches!(err, RelayError::MalformedResponse(_)));
    }
}
