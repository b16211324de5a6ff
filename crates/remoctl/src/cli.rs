//! CLI - Command-line argument parsing
//!
//! One pass per invocation: fetch, calibrate, then print and/or log.

use crate::output::OutputMode;
use clap::Parser;
use remo_common::Overrides;
use std::path::PathBuf;

/// Environmental sensor poller for Nature Remo hubs
#[derive(Parser, Debug)]
#[command(name = "remoctl")]
#[command(about = "Poll a Nature Remo hub for temperature, humidity, illuminance and motion", long_about = None)]
#[command(version = env!("REMOCTL_VERSION"))]
pub struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/remo-poller/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where results go (default: both if a CSV file is configured, else print)
    #[arg(long, value_enum)]
    pub output: Option<OutputMode>,

    /// CSV file to append to (overrides $CSV_FILE)
    #[arg(long)]
    pub csv_file: Option<PathBuf>,

    /// Device name or id (default: first device)
    #[arg(long)]
    pub device: Option<String>,

    /// API endpoint (overrides $REMO_API_URL)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            endpoint: self.endpoint.clone(),
            csv_file: self.csv_file.clone(),
            timeout_secs: self.timeout,
            device: self.device.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["remoctl"]).unwrap();
        assert!(cli.output.is_none());
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
        let overrides = cli.overrides();
        assert!(overrides.endpoint.is_none());
        assert!(overrides.device.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "remoctl",
            "--output",
            "csv",
            "--csv-file",
            "/tmp/r.csv",
            "--device",
            "Study",
            "--timeout",
            "3",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.output, Some(OutputMode::Csv));
        assert_eq!(cli.verbose, 2);
        let overrides = cli.overrides();
        assert_eq!(overrides.csv_file, Some(PathBuf::from("/tmp/r.csv")));
        assert_eq!(overrides.device.as_deref(), Some("Study"));
        assert_eq!(overrides.timeout_secs, Some(3));
    }

    #[test]
    fn test_unknown_output_rejected() {
        assert!(Cli::try_parse_from(["remoctl", "--output", "stdout"]).is_err());
    }
}
