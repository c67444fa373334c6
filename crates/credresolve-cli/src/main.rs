//! credresolve - resolve pipeline variables from the command line

mod cli;
mod error;

use std::io::Write;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::{execute, Cli};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env("CREDRESOLVE_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("credresolve=debug,credresolve_core=debug")
        } else {
            EnvFilter::new("credresolve=warn,credresolve_core=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false).without_time())
        .init();

    match execute(&cli) {
        Ok(output) => {
            let mut stdout = std::io::stdout().lock();
            if stdout.write_all(output.as_bytes()).and_then(|_| stdout.flush()).is_err() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
