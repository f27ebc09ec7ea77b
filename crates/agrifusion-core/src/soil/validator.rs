use std::str::FromStr;

use super::{Crop, SoilField, SoilSample};
use crate::validation::{ValidationErrors, ValidationFailure};

/// Validates a form sample, collecting every violation.
///
/// Returns the parsed crop when the sample is acceptable.
pub fn validate(sample: &SoilSample) -> Result<Crop, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let crop = match Crop::from_str(sample.crop.trim()) {
        Ok(crop) => Some(crop),
        Err(_) => {
            errors.push(ValidationFailure::UnknownCrop {
                value: sample.crop.clone(),
            });
            None
        }
    };

    for field in SoilField::ALL {
        let value = sample.value(field);
        if !value.is_finite() {
            errors.push(ValidationFailure::NonFiniteValue { field });
        } else if value < 0.0 {
            errors.push(ValidationFailure::NegativeValue { field, value });
        }
    }

    match crop {
        Some(crop) if errors.is_empty() => Ok(crop),
        _ => Err(errors),
    }
}
