//! Poll pipeline
//!
//! fetch -> select device -> calibrate -> append (optional). Printing is
//! left to the caller so the pipeline stays testable.

use crate::output::OutputMode;
use chrono::{DateTime, TimeZone, Utc};
use remo_common::{
    select_device, CsvLog, CsvRow, Device, PollerConfig, PollerError, ReadingSnapshot,
    SensorClient,
};
use tracing::{debug, info};

/// What one run produced
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub device: Device,
    pub reading: ReadingSnapshot,
    /// Row written, if the mode logs to CSV
    pub csv_row: Option<CsvRow>,
}

pub fn run<C, Tz>(
    client: &C,
    config: &PollerConfig,
    mode: OutputMode,
    now: &DateTime<Tz>,
) -> Result<PollOutcome, PollerError>
where
    C: SensorClient + ?Sized,
    Tz: TimeZone,
{
    let devices = client.fetch_devices()?;
    let device = select_device(&devices, config.device.as_deref())?;
    info!("Reading device {} ({})", device.name, device.id);
    log_event_ages(device, &now.with_timezone(&Utc));

    let reading = ReadingSnapshot::from_device(device);

    let csv_row = if mode.writes_csv() {
        let path = config
            .csv_file
            .as_ref()
            .ok_or_else(|| PollerError::Config("No CSV file configured".to_string()))?;
        Some(CsvLog::new(path).append(&reading, now)?)
    } else {
        None
    };

    Ok(PollOutcome {
        device: device.clone(),
        reading,
        csv_row,
    })
}

fn log_event_ages(device: &Device, now: &DateTime<Utc>) {
    let events = &device.newest_events;
    for (sensor, event) in [
        ("temperature", &events.te),
        ("humidity", &events.hu),
        ("illuminance", &events.il),
        ("motion", &events.mo),
    ] {
        if let Some(created_at) = event.as_ref().and_then(|e| e.created_at) {
            let age = now.signed_duration_since(created_at);
            debug!("{} reading is {}s old", sensor, age.num_seconds());
        }
    }
}
