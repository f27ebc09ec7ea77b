//! Hourly environmental readings sent alongside each prediction request.

use serde::{Deserialize, Serialize};

use crate::validation::{SeriesDefect, ValidationFailure};

/// Number of hourly readings in a series (one week).
pub const SERIES_LENGTH: usize = 168;

/// One hourly reading.
///
/// Serialized as a four-element array: `[temperature, humidity,
/// soil_moisture, ph_index]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct EnvironmentalReading {
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    pub ph_index: f64,
}

impl EnvironmentalReading {
    pub const fn new(temperature: f64, humidity: f64, soil_moisture: f64, ph_index: f64) -> Self {
        Self {
            temperature,
            humidity,
            soil_moisture,
            ph_index,
        }
    }

    pub fn is_finite(&self) -> bool {
        [self.temperature, self.humidity, self.soil_moisture, self.ph_index]
            .iter()
            .all(|v| v.is_finite())
    }
}

impl From<[f64; 4]> for EnvironmentalReading {
    fn from([temperature, humidity, soil_moisture, ph_index]: [f64; 4]) -> Self {
        Self::new(temperature, humidity, soil_moisture, ph_index)
    }
}

impl From<EnvironmentalReading> for [f64; 4] {
    fn from(reading: EnvironmentalReading) -> Self {
        [
            reading.temperature,
            reading.humidity,
            reading.soil_moisture,
            reading.ph_index,
        ]
    }
}

/// An ordered series of hourly readings.
///
/// Any length can be held; [`EnvironmentalSeries::check`] enforces the
/// contract before a request is built.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnvironmentalSeries(Vec<EnvironmentalReading>);

impl EnvironmentalSeries {
    pub fn new(readings: Vec<EnvironmentalReading>) -> Self {
        Self(readings)
    }

    /// A full week of the same reading.
    pub fn constant(reading: EnvironmentalReading) -> Self {
        Self(vec![reading; SERIES_LENGTH])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn readings(&self) -> &[EnvironmentalReading] {
        &self.0
    }

    /// Checks length and that every value is finite.
    pub fn check(&self) -> Result<(), ValidationFailure> {
        if self.0.len() != SERIES_LENGTH {
            return Err(ValidationFailure::MalformedSeries {
                defect: SeriesDefect::WrongLength {
                    expected: SERIES_LENGTH,
                    actual: self.0.len(),
                },
            });
        }

        if let Some(index) = self.0.iter().position(|reading| !reading.is_finite()) {
            return Err(ValidationFailure::MalformedSeries {
                defect: SeriesDefect::NonFiniteReading { index },
            });
        }

        Ok(())
    }
}

/// Produces the environmental series for a submission.
pub trait EnvironmentalSource: Send + Sync {
    fn series(&self) -> EnvironmentalSeries;
}

/// Fills every hour with the same reading.
///
/// Stands in until field sensors are wired up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticEnvironment {
    pub reading: EnvironmentalReading,
}

impl SyntheticEnvironment {
    pub const DEFAULT_READING: EnvironmentalReading =
        EnvironmentalReading::new(28.0, 75.0, 60.0, 6.5);
}

impl Default for SyntheticEnvironment {
    fn default() -> Self {
        Self {
            reading: Self::DEFAULT_READING,
        }
    }
}

impl EnvironmentalSource for SyntheticEnvironment {
    fn series(&self) -> EnvironmentalSeries {
        EnvironmentalSeries::constant(self.reading)
    }
}

/// Serves a series that was loaded up front.
impl EnvironmentalSource for EnvironmentalSeries {
    fn series(&self) -> EnvironmentalSeries {
        self.clone()
    }
}
