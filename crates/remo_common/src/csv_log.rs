//! CSV reading log
//!
//! One row per poll, no header:
//! `timestamp,temperature,humidity,illuminance,motion`
//!
//! The timestamp is RFC 3339 at second precision. Cells are timestamps and
//! plain decimals, so nothing ever needs quoting.

use crate::error::PollerError;
use crate::reading::ReadingSnapshot;
use chrono::{DateTime, FixedOffset, Offset, SecondsFormat, TimeZone};
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const FIELD_COUNT: usize = 5;

/// A single log row
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub timestamp: DateTime<FixedOffset>,
    pub reading: ReadingSnapshot,
}

impl CsvRow {
    pub fn new<Tz: TimeZone>(reading: ReadingSnapshot, at: &DateTime<Tz>) -> Self {
        Self {
            timestamp: at.with_timezone(&at.offset().fix()),
            reading,
        }
    }

    /// Render without the line terminator
    pub fn to_line(&self) -> String {
        let [temperature, humidity, illuminance, motion] = self.reading.formatted();
        format!(
            "{},{},{},{},{}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            temperature,
            humidity,
            illuminance,
            motion
        )
    }

    /// Read a row back
    pub fn parse(line: &str) -> Result<Self, PollerError> {
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split(',').collect();
        if fields.len() != FIELD_COUNT {
            return Err(PollerError::Decode(format!(
                "CSV row has {} fields, expected {}",
                fields.len(),
                FIELD_COUNT
            )));
        }

        let timestamp = DateTime::parse_from_rfc3339(fields[0])
            .map_err(|e| PollerError::Decode(format!("Bad timestamp '{}': {}", fields[0], e)))?;
        let number = |s: &str| {
            s.parse::<f64>()
                .map_err(|_| PollerError::Decode(format!("Bad value '{}'", s)))
        };

        Ok(Self {
            timestamp,
            reading: ReadingSnapshot {
                temperature: number(fields[1])?,
                humidity: number(fields[2])?,
                illuminance: number(fields[3])?,
                motion: number(fields[4])?,
            },
        })
    }
}

/// Append-only log file
#[derive(Debug, Clone)]
pub struct CsvLog {
    path: PathBuf,
}

impl CsvLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row stamped with `at`
    pub fn append<Tz: TimeZone>(
        &self,
        reading: &ReadingSnapshot,
        at: &DateTime<Tz>,
    ) -> Result<CsvRow, PollerError> {
        let row = CsvRow::new(*reading, at);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&self.path)?;

        // A hand-edited file may lack the final newline
        if !ends_with_newline(&mut file)? {
            writeln!(file)?;
        }
        writeln!(file, "{}", row.to_line())?;
        file.flush()?;

        info!("Appended reading to {}", self.path.display());
        Ok(row)
    }

    #[cfg(test)]
    fn read_rows(&self) -> Result<Vec<CsvRow>, PollerError> {
        let content = std::fs::read_to_string(&self.path)?;
        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(CsvRow::parse)
            .collect()
    }
}

/// True for an empty file or one whose last byte is `\n`
fn ends_with_newline(file: &mut std::fs::File) -> Result<bool, PollerError> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }
    file.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}
