use thiserror::Error;

/// Shown when the relay rejects a submission without saying why.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";

/// Shown for every transport-level failure. The cause is logged, not shown.
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// Why a submission did not succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The relay answered and reported `success = false`.
    #[error("relay rejected submission: {}", .message.as_deref().unwrap_or("<no message>"))]
    Rejected { message: Option<String> },

    /// The request could not complete (unreachable, timeout, connection reset).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The relay answered with something that is not the expected JSON body.
    #[error("malformed relay response: {0}")]
    MalformedResponse(String),

    /// A pipeline step could not find a resource it needs on the Bus.
    #[error("missing pipeline resource: {0}")]
    MissingResource(&'static str),
}

impl RelayError {
    /// The text a user should see for this failure.
    pub fn user_message(&self) -> String {
        match self {
            RelayError::Rejected { message } => message
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or(GENERIC_FAILURE_MESSAGE)
                .to_string(),
            _ => NETWORK_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, RelayError::Rejected { .. })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("field `{0}` is required")]
    MissingField(&'static str),
    #[error("`{0}` is not a valid email address")]
    InvalidEmail(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("no access key configured (set `access_key` or FLOWPARTY_ACCESS_KEY)")]
    MissingAccessKey,
}
