//! Local 1-wire temperature sensor backed by the kernel's w1 sysfs interface.
//!
//! Devices appear under `/sys/bus/w1/devices/` as `{family:02x}-{id}`
//! directories; the `temperature` attribute holds millidegrees Celsius.

use crate::error::ReadError;
use std::io;
use std::path::PathBuf;

/// A resolved handle to an attached 1-wire device.
#[derive(Debug, Clone)]
pub struct W1Handle {
    pub device_path: PathBuf,
}

/// Enumeration interface for the 1-wire bus, keyed by (family, element id).
pub trait W1Bus {
    /// Resolve an attached device. `SensorNotFound` when nothing matches;
    /// any other bus error is reported as-is.
    fn resolve(&self, family: i64, hardware_id: &str) -> Result<W1Handle, ReadError>;

    /// Read the device's current temperature in degrees Fahrenheit.
    fn read_fahrenheit(&self, handle: &W1Handle) -> Result<f64, ReadError>;
}

/// Sysfs-backed implementation of [`W1Bus`].
pub struct SysfsW1Bus {
    root: PathBuf,
}

impl SysfsW1Bus {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/sys/bus/w1/devices"),
        }
    }

    /// Bus rooted at an alternate directory (used by tests).
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }
}

impl Default for SysfsW1Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl W1Bus for SysfsW1Bus {
    fn resolve(&self, family: i64, hardware_id: &str) -> Result<W1Handle, ReadError> {
        let device_path = self.root.join(format!("{:02x}-{}", family, hardware_id));

        match std::fs::metadata(&device_path) {
            Ok(meta) if meta.is_dir() => Ok(W1Handle { device_path }),
            Ok(_) => Err(ReadError::SensorNotFound {
                family,
                hardware_id: hardware_id.to_string(),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ReadError::SensorNotFound {
                family,
                hardware_id: hardware_id.to_string(),
            }),
            Err(e) => Err(ReadError::Bus(e)),
        }
    }

    fn read_fahrenheit(&self, handle: &W1Handle) -> Result<f64, ReadError> {
        let raw = std::fs::read_to_string(handle.device_path.join("temperature"))?;
        let millidegrees_c: i64 = raw.trim().parse().map_err(|_| {
            ReadError::Bus(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unparseable temperature value '{}'", raw.trim()),
            ))
        })?;

        let celsius = millidegrees_c as f64 / 1000.0;
        Ok(celsius * 9.0 / 5.0 + 32.0)
    }
}

/// Resolve the device and read its current temperature in degrees Fahrenheit.
pub fn read_temperature(bus: &dyn W1Bus, family: i64, hardware_id: &str) -> Result<f64, ReadError> {
    let handle = bus.resolve(family, hardware_id)?;
    bus.read_fahrenheit(&handle)
}
