//! Local validation failures.
//!
//! Everything in this module is raised before a request is built. A request
//! that fails validation never reaches the network.

use std::fmt;

use thiserror::Error;

use crate::soil::SoilField;

/// Why an environmental series was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesDefect {
    /// The series does not have the fixed number of hourly readings.
    WrongLength { expected: usize, actual: usize },
    /// A reading contains NaN or an infinity.
    NonFiniteReading { index: usize },
}

impl fmt::Display for SeriesDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeriesDefect::WrongLength { expected, actual } => {
                write!(f, "expected {expected} readings, got {actual}")
            }
            SeriesDefect::NonFiniteReading { index } => {
                write!(f, "reading {index} is not a finite number")
            }
        }
    }
}

/// A single local validation failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationFailure {
    #[error("{field} must not be negative (got {value})")]
    NegativeValue { field: SoilField, value: f64 },

    #[error("{field} must be a finite number")]
    NonFiniteValue { field: SoilField },

    #[error("unknown crop '{value}'")]
    UnknownCrop { value: String },

    #[error("unsupported image type '{mime_type}' (expected PNG or JPEG)")]
    UnsupportedFormat { mime_type: String },

    #[error("image is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    #[error("malformed environmental series: {defect}")]
    MalformedSeries { defect: SeriesDefect },
}

impl ValidationFailure {
    /// The message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ValidationFailure::NegativeValue { field, .. }
            | ValidationFailure::NonFiniteValue { field } => {
                format!("Please enter a valid non-negative value for {}.", field.label())
            }
            ValidationFailure::UnknownCrop { .. } => "Please select a supported crop.".to_string(),
            ValidationFailure::UnsupportedFormat { .. } => {
                "Please upload a PNG or JPEG image.".to_string()
            }
            ValidationFailure::TooLarge { .. } => "The image must be 10 MB or smaller.".to_string(),
            ValidationFailure::MalformedSeries { .. } => {
                "Environmental data must contain one reading per hour for a full week.".to_string()
            }
        }
    }

    /// Whether this failure concerns the uploaded image.
    pub fn is_image_failure(&self) -> bool {
        matches!(
            self,
            ValidationFailure::UnsupportedFormat { .. } | ValidationFailure::TooLarge { .. }
        )
    }
}

/// The full set of failures collected by a validation pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationErrors(Vec<ValidationFailure>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, failure: ValidationFailure) {
        self.0.push(failure);
    }

    pub fn extend(&mut self, other: ValidationErrors) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationFailure> {
        self.0.iter()
    }

    /// Returns true if any failure is a negative value for `field`.
    pub fn has_negative(&self, field: SoilField) -> bool {
        self.0.iter().any(
            |failure| matches!(failure, ValidationFailure::NegativeValue { field: f, .. } if *f == field),
        )
    }

    /// Returns `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn into_vec(self) -> Vec<ValidationFailure> {
        self.0
    }
}

impl From<Vec<ValidationFailure>> for ValidationErrors {
    fn from(failures: Vec<ValidationFailure>) -> Self {
        Self(failures)
    }
}

impl From<ValidationFailure> for ValidationErrors {
    fn from(failure: ValidationFailure) -> Self {
        Self(vec![failure])
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationFailure;
    type IntoIter = std::vec::IntoIter<ValidationFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationFailure;
    type IntoIter = std::slice::Iter<'a, ValidationFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|failure| failure.to_string()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}
