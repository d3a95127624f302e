//! Web3Forms relay adapter.
//!
//! Implements [`Relay`] with `reqwest`: one multipart `POST` per payload, JSON
//! body decoded into [`RelayResponse`]. The HTTP status is not consulted;
//! Web3Forms reports rejections in the body, and the body decides.

use async_trait::async_trait;
use flowparty_core::config::FormConfig;
use flowparty_core::error::RelayError;
use flowparty_core::payload::FormPayload;
use flowparty_core::relay::{Relay, RelayResponse};
use reqwest::header::ACCEPT;
use reqwest::multipart::Form;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("flowparty/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum RelayBuildError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct Web3FormsRelay {
    client: reqwest::Client,
    endpoint: String,
}

impl Web3FormsRelay {
    pub fn from_config(config: &FormConfig) -> Result<Self, RelayBuildError> {
        Self::with_options(&config.endpoint, config.timeout())
    }

    pub fn with_options(
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, RelayBuildError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn form(payload: &FormPayload) -> Form {
        payload.iter().fold(Form::new(), |form, (name, value)| {
            form.text(name.to_string(), value.to_string())
        })
    }
}

fn transport(err: reqwest::Error) -> RelayError {
    if err.is_timeout() {
        RelayError::Transport(format!("timed out: {err}"))
    } else {
        RelayError::Transport(err.to_string())
    }
}

#[async_trait]
impl Relay for Web3FormsRelay {
    async fn deliver(&self, payload: &FormPayload) -> Result<RelayResponse, RelayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .multipart(Self::form(payload))
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(transport)?;
        tracing::debug!(%status, bytes = body.len(), "relay responded");

        RelayResponse::from_json(&body)
    }

    fn name(&self) -> &str {
        "web3forms"
    }
}
