//! `flowparty submit` - validate, send, report

use anyhow::{Context, Result, bail};
use flowparty::prelude::*;
use flowparty::runtime::FormSurface;
use std::path::Path;
use std::sync::Arc;

pub struct SubmitArgs {
    pub name: String,
    pub email: String,
    pub message: String,
    pub access_key: Option<String>,
    pub endpoint: Option<String>,
}

/// Prints each status the controller enters.
struct TerminalSurface;

impl FormSurface for TerminalSurface {
    fn clear_fields(&self) {
        tracing::debug!("form cleared");
    }

    fn render(&self, state: &SubmissionState) {
        match state.status() {
            SubmissionStatus::Idle => {}
            SubmissionStatus::Submitting => eprintln!("Sending..."),
            SubmissionStatus::Succeeded => eprintln!("Message Sent!"),
            SubmissionStatus::Failed => {
                eprintln!("{}", state.error_message().unwrap_or_default())
            }
        }
    }
}

pub async fn run_submit_command(config_path: Option<&Path>, args: SubmitArgs) -> Result<()> {
    let mut config = FormConfig::load(config_path).context("Failed to load configuration")?;
    if let Some(key) = args.access_key {
        config = config.with_access_key(key);
    }
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    let key = config.require_access_key()?.clone();

    let form = ContactForm::new(args.name, args.email, args.message);
    let fields = form.validate().context("Form is incomplete")?;

    let relay = Web3FormsRelay::from_config(&config)?;
    tracing::info!(endpoint = relay.endpoint(), "submitting contact form");
    let controller = FormSubmissionController::from_config(&config, relay)
        .with_surface(Arc::new(TerminalSurface));

    let state = controller.submit(fields, &key).await;
    match state.status() {
        SubmissionStatus::Succeeded => Ok(()),
        status => bail!(
            "submission {}: {}",
            status,
            state.error_message().unwrap_or("no response")
        ),
    }
}
