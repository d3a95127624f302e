//! Flow Party CLI - send the contact form from a terminal
//!
//! # Commands
//! - `flowparty submit --name .. --email .. --message ..` - Send a message through the relay
//! - `flowparty schematic [-o file]` - Print the submission pipeline graph as JSON
//! - `flowparty config` - Show the effective configuration (key redacted)

mod inspect;
mod submit;

use anyhow::Result;
use clap::{Parser, Subcommand};
use flowparty::observe::LogFormat;
use std::path::PathBuf;

/// Flow Party contact form CLI
#[derive(Parser)]
#[command(name = "flowparty")]
#[command(author, version, about = "Send Flow Party contact messages through Web3Forms")]
struct Cli {
    /// Config file (default: ./flowparty.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a contact message
    Submit {
        /// Your name
        #[arg(long)]
        name: String,

        /// Reply-to email address
        #[arg(long)]
        email: String,

        /// Message body
        #[arg(long)]
        message: String,

        /// Relay access key (overrides config and FLOWPARTY_ACCESS_KEY)
        #[arg(long)]
        access_key: Option<String>,

        /// Relay endpoint (overrides config and FLOWPARTY_ENDPOINT)
        #[arg(long)]
        endpoint: Option<String>,
    },

    /// Print the submission pipeline schematic as JSON
    Schematic {
        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    flowparty::observe::init(format)?;

    match cli.command {
        Commands::Submit {
            name,
            email,
            message,
            access_key,
            endpoint,
        } => {
            let args = submit::SubmitArgs {
                name,
                email,
                message,
                access_key,
                endpoint,
            };
            submit::run_submit_command(cli.config.as_deref(), args).await
        }
        Commands::Schematic { output } => inspect::run_schematic_command(output.as_deref()),
        Commands::Config => inspect::run_config_command(cli.config.as_deref()),
    }
}
