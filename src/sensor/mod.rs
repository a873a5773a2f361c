//! Polymorphic read/availability contract over the sensor variants.
//!
//! Each `SensorKind` has a physical read strategy (remote weather feed or
//! local 1-wire bus) behind a trait seam, so both can be exercised with
//! fakes in tests. Dispatch is by the kind tag fixed at construction.

pub mod accuweather;
pub mod w1therm;

pub use accuweather::{HttpFetcher, WeatherFetch};
pub use w1therm::{SysfsW1Bus, W1Bus};

use crate::db::now_ms;
use crate::error::ReadError;
use crate::types::{Reading, Sensor, SensorKind};

/// The physical interfaces a read can go through.
pub struct ReadContext {
    pub weather: Box<dyn WeatherFetch>,
    pub bus: Box<dyn W1Bus>,
}

impl ReadContext {
    /// Context backed by the real HTTP client and the sysfs 1-wire bus.
    pub fn new() -> Result<Self, ReadError> {
        Ok(Self {
            weather: Box::new(HttpFetcher::new()?),
            bus: Box::new(SysfsW1Bus::new()),
        })
    }

    /// Context with explicit backends (used by tests).
    pub fn with(weather: Box<dyn WeatherFetch>, bus: Box<dyn W1Bus>) -> Self {
        Self { weather, bus }
    }
}

impl Sensor {
    /// Take a current temperature reading from this sensor.
    ///
    /// The returned `Reading` is transient; persisting it is a separate,
    /// explicit step.
    pub fn read(&self, ctx: &ReadContext) -> Result<Reading, ReadError> {
        let value = match &self.kind {
            SensorKind::Accuweather { loc_code } => {
                accuweather::read_temperature(ctx.weather.as_ref(), loc_code)?
            }
            SensorKind::W1Therm {
                family,
                hardware_id,
            } => w1therm::read_temperature(ctx.bus.as_ref(), *family, hardware_id)?,
        };
        Ok(Reading::new(self.id, now_ms(), value))
    }

    /// Report whether this sensor can currently be read.
    ///
    /// The two variants deliberately differ:
    /// - Accuweather probes with a full `read()` (same latency and network
    ///   side effects) and maps any failure to `Ok(false)`.
    /// - W1Therm only resolves the hardware handle; not-found maps to
    ///   `Ok(false)` while any other bus error propagates.
    pub fn available(&self, ctx: &ReadContext) -> Result<bool, ReadError> {
        match &self.kind {
            SensorKind::Accuweather { .. } => Ok(self.read(ctx).is_ok()),
            SensorKind::W1Therm {
                family,
                hardware_id,
            } => match ctx.bus.resolve(*family, hardware_id) {
                Ok(_) => Ok(true),
                Err(ReadError::SensorNotFound { .. }) => Ok(false),
                Err(e) => Err(e),
            },
        }
    }
}
