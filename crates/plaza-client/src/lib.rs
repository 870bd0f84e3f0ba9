pub mod commands;
pub mod config;
pub mod session;
pub mod shell;
pub mod state;

use std::io::{self, BufRead, Write};

use tracing_subscriber::{fmt, EnvFilter};

use plaza_shared::constants::APP_NAME;

use crate::config::ClientConfig;
use crate::shell::{Outcome, Shell};
use crate::state::AppState;

/// Logs go to stderr so that stdout carries only command replies.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("plaza=info,plaza_client_lib=debug,plaza_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

pub fn run() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!("Starting {} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let config = ClientConfig::from_env();
    tracing::info!(?config, "Loaded configuration");

    let shell = Shell::new(AppState::new(config).into_shared());

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", shell::help())?;

    for line in stdin.lock().lines() {
        match shell.execute(&line?) {
            Outcome::Reply(reply) => writeln!(stdout, "{reply}")?,
            Outcome::Nothing => {}
            Outcome::Quit => break,
        }
        stdout.flush()?;
    }

    tracing::info!("{} shell closed", APP_NAME);
    Ok(())
}
