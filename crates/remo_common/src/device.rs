//! Device list wire types
//!
//! Shapes of the `GET /1/devices` response. Only the fields the poller
//! reads are modelled; anything else in the payload is ignored.

use crate::error::PollerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single sensor's newest value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorEvent {
    pub val: f64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Newest value of each sensor on the hub
///
/// Hub models without a given sensor leave its key out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewestEvents {
    /// Temperature
    #[serde(default)]
    pub te: Option<SensorEvent>,
    /// Humidity
    #[serde(default)]
    pub hu: Option<SensorEvent>,
    /// Illuminance
    #[serde(default)]
    pub il: Option<SensorEvent>,
    /// Motion
    #[serde(default)]
    pub mo: Option<SensorEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub temperature_offset: f64,
    #[serde(default)]
    pub humidity_offset: f64,
    #[serde(default)]
    pub firmware_version: String,
    #[serde(default)]
    pub mac_address: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub newest_events: NewestEvents,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Device {
    /// True if `selector` equals this device's name or id
    pub fn matches(&self, selector: &str) -> bool {
        self.name == selector || self.id == selector
    }
}

/// Decode a device list response body
pub fn parse_devices(body: &str) -> Result<Vec<Device>, PollerError> {
    let devices: Vec<Device> = serde_json::from_str(body)?;
    Ok(devices)
}
