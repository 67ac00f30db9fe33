//! claimcheck - command line client for the document verification service.
//!
//! Startup order:
//! 1. Parse arguments and configuration (flags override `CLAIMCHECK_*` env vars).
//! 2. Initialise tracing on stderr so command output stays pipeable.
//! 3. Open the saved task list and connect the HTTP backend.
//! 4. Run the command.

mod cli;
mod commands;

use clap::Parser;
use claimcheck_core::ClientConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::commands::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = ClientConfig::from_env();
    if let Some(url) = cli.api_url.clone() {
        cfg.api_url = url;
    }
    if let Some(dir) = cli.state_dir.clone() {
        cfg.state_dir = dir;
    }
    if let Some(dir) = cli.report_dir.clone() {
        cfg.report_dir = dir;
    }

    init_tracing(&cfg);

    let app = App::open(cfg)?;
    app.run(cli.command).await
}

fn init_tracing(cfg: &ClientConfig) {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => match cfg.log_level.parse::<EnvFilter>() {
            Ok(f) => f,
            Err(e) => {
                eprintln!(
                    "WARN: CLAIMCHECK_LOG='{}' is not a valid tracing filter ({}); \
                     falling back to 'info'",
                    cfg.log_level, e
                );
                EnvFilter::new("info")
            }
        },
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cfg.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
