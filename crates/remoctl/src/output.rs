//! Output formatting
//!
//! Plain ASCII result block, or JSON with `--json`.

use clap::ValueEnum;
use remo_common::{Device, PollerError, ReadingSnapshot};
use serde::Serialize;

const BANNER: &str = "===== RESULT =====";

/// Where a run's result goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Standard output only
    Print,
    /// Append to the CSV file only
    Csv,
    /// Append to the CSV file, then print
    Both,
}

impl OutputMode {
    /// Pick the mode for this run.
    ///
    /// Without an explicit choice: `Both` when a CSV file is configured,
    /// `Print` otherwise.
    pub fn resolve(
        requested: Option<OutputMode>,
        csv_configured: bool,
    ) -> Result<Self, PollerError> {
        let mode = requested.unwrap_or(if csv_configured {
            OutputMode::Both
        } else {
            OutputMode::Print
        });
        if mode.writes_csv() && !csv_configured {
            return Err(PollerError::Config(
                "CSV output requested but no CSV file configured (set CSV_FILE or --csv-file)"
                    .to_string(),
            ));
        }
        Ok(mode)
    }

    pub fn writes_csv(&self) -> bool {
        matches!(self, OutputMode::Csv | OutputMode::Both)
    }

    pub fn prints(&self) -> bool {
        matches!(self, OutputMode::Print | OutputMode::Both)
    }
}

/// Result block for the terminal
pub fn render_text(reading: &ReadingSnapshot) -> String {
    let [temperature, humidity, illuminance, motion] = reading.formatted();
    format!(
        "{banner}\nTemperature: {}\nHumidity: {}\nIlluminance: {}\nMotion: {}\n{banner}",
        temperature,
        humidity,
        illuminance,
        motion,
        banner = BANNER
    )
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    device: &'a str,
    device_id: &'a str,
    reading: &'a ReadingSnapshot,
}

pub fn render_json(
    device: &Device,
    reading: &ReadingSnapshot,
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonReport {
        device: &device.name,
        device_id: &device.id,
        reading,
    })
}
