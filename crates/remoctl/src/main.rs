//! remoctl - one-shot environmental sensor poller
//!
//! Fetches the newest readings from the hub, applies its calibration
//! offsets, then appends a CSV row and/or prints the values.

use anyhow::{Context, Result};
use clap::Parser;
use remo_common::{HttpSensorClient, PollerConfig};
use remoctl::cli::Cli;
use remoctl::errors::{exit_code_for, EXIT_SUCCESS};
use remoctl::output::{render_json, render_text, OutputMode};
use remoctl::{logging, poll};
use tracing::debug;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(&cli) {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(e) => {
            // Errors go to stdout, same stream as results
            println!("{:#}", e);
            std::process::exit(exit_code_for(&e));
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = PollerConfig::load(cli.config.as_deref(), &cli.overrides())?;
    debug!("Resolved config: {:?}", config);

    let mode = OutputMode::resolve(cli.output, config.csv_file.is_some())?;
    let client = HttpSensorClient::new(&config)?;
    let outcome = poll::run(&client, &config, mode, &chrono::Local::now())?;
    if let Some(row) = &outcome.csv_row {
        debug!("Logged row: {}", row.to_line());
    }

    if mode.prints() {
        if cli.json {
            let json = render_json(&outcome.device, &outcome.reading)
                .context("Failed to encode reading as JSON")?;
            println!("{}", json);
        } else {
            println!("{}", render_text(&outcome.reading));
        }
    }

    Ok(())
}
