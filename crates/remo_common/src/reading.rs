//! Reading snapshot
//!
//! One poll's worth of calibrated values. Temperature and humidity get the
//! device's additive offsets; illuminance and motion are reported as read.
//! A sensor the hub doesn't have reads as zero.

use crate::device::{Device, SensorEvent};
use crate::error::PollerError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Calibrated values from one poll
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadingSnapshot {
    pub temperature: f64,
    pub humidity: f64,
    pub illuminance: f64,
    pub motion: f64,
}

/// Per-device additive corrections
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Calibration {
    pub temperature_offset: f64,
    pub humidity_offset: f64,
}

impl Calibration {
    pub fn new(temperature_offset: f64, humidity_offset: f64) -> Self {
        Self {
            temperature_offset,
            humidity_offset,
        }
    }

    pub fn for_device(device: &Device) -> Self {
        Self::new(device.temperature_offset, device.humidity_offset)
    }

    /// Apply offsets to a raw snapshot
    pub fn apply(&self, raw: ReadingSnapshot) -> ReadingSnapshot {
        ReadingSnapshot {
            temperature: raw.temperature + self.temperature_offset,
            humidity: raw.humidity + self.humidity_offset,
            ..raw
        }
    }
}

/// Render a value the way every output does: two decimals.
pub fn format_value(value: f64) -> String {
    format!("{:.2}", value)
}

fn value_or_zero(event: &Option<SensorEvent>, sensor: &str) -> f64 {
    match event {
        Some(e) => e.val,
        None => {
            warn!("Device reports no {} event, using 0", sensor);
            0.0
        }
    }
}

impl ReadingSnapshot {
    /// Raw newest-event values, no calibration
    pub fn raw_from_device(device: &Device) -> Self {
        let events = &device.newest_events;
        Self {
            temperature: value_or_zero(&events.te, "temperature"),
            humidity: value_or_zero(&events.hu, "humidity"),
            illuminance: value_or_zero(&events.il, "illuminance"),
            motion: value_or_zero(&events.mo, "motion"),
        }
    }

    /// Calibrated snapshot for a device
    pub fn from_device(device: &Device) -> Self {
        let raw = Self::raw_from_device(device);
        let calibration = Calibration::for_device(device);
        debug!(
            "Calibrating {} with offsets te={} hu={}",
            device.id, calibration.temperature_offset, calibration.humidity_offset
        );
        calibration.apply(raw)
    }

    /// Temperature, humidity, illuminance, motion as two-decimal strings
    pub fn formatted(&self) -> [String; 4] {
        [
            format_value(self.temperature),
            format_value(self.humidity),
            format_value(self.illuminance),
            format_value(self.motion),
        ]
    }
}

/// Pick the device to report on
///
/// Without a selector this is the first device in the list.
pub fn select_device<'a>(
    devices: &'a [Device],
    selector: Option<&str>,
) -> Result<&'a Device, PollerError> {
    if devices.is_empty() {
        return Err(PollerError::NoDevices);
    }
    match selector {
        None => Ok(&devices[0]),
        Some(sel) => devices
            .iter()
            .find(|d| d.matches(sel))
            .ok_or_else(|| PollerError::DeviceNotFound(sel.to_string())),
    }
}
