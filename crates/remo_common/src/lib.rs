//! Shared types for the remo poller: configuration, device list wire
//! types, calibrated readings, the HTTP client seam and the CSV log.

pub mod client;
pub mod config;
pub mod csv_log;
pub mod device;
pub mod error;
pub mod reading;

pub use client::{FakeSensorClient, HttpSensorClient, SensorClient};
pub use config::{FileConfig, Overrides, PollerConfig};
pub use csv_log::{CsvLog, CsvRow};
pub use device::Device;
pub use error::PollerError;
pub use reading::{select_device, Calibration, ReadingSnapshot};
