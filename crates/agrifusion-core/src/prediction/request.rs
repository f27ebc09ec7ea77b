//! Assembly of the multi-modal prediction request.
//!
//! The relay and the inference engine read the body by fixed key names, so
//! the field names and nesting of [`PredictionRequest`] are part of the wire
//! contract and must not change.

use serde::{Deserialize, Serialize};

use crate::environment::EnvironmentalSeries;
use crate::image::{EncodedImage, ImageAsset, encode_image};
use crate::soil::{self, Crop, SoilSample};
use crate::validation::ValidationErrors;

/// Soil and microbial block of the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilData {
    pub primary_crop: Crop,
    pub nitrogen_kg_ha: f64,
    pub phosphorus_kg_ha: f64,
    pub potassium_kg_ha: f64,
    pub organic_carbon_percent: f64,
    pub microbe_trichoderma_cfu_g: f64,
    pub microbe_pseudomonas_cfu_g: f64,
}

impl SoilData {
    fn from_sample(crop: Crop, sample: &SoilSample) -> Self {
        Self {
            primary_crop: crop,
            nitrogen_kg_ha: sample.nitrogen_kg_ha,
            phosphorus_kg_ha: sample.phosphorus_kg_ha,
            potassium_kg_ha: sample.potassium_kg_ha,
            organic_carbon_percent: sample.organic_carbon_percent,
            microbe_trichoderma_cfu_g: sample.microbe_trichoderma_cfu_g,
            microbe_pseudomonas_cfu_g: sample.microbe_pseudomonas_cfu_g,
        }
    }
}

/// A complete, validated request. Built fresh for every submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    environmental_data: EnvironmentalSeries,
    soil_data: SoilData,
    image_data: String,
}

impl PredictionRequest {
    pub fn environmental_data(&self) -> &EnvironmentalSeries {
        &self.environmental_data
    }

    pub fn soil_data(&self) -> &SoilData {
        &self.soil_data
    }

    /// Base64 image text, without a data-URI prefix.
    pub fn image_data(&self) -> &str {
        &self.image_data
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Builds a request from raw form inputs.
///
/// The sample, the image and the series are all checked and every failure is
/// returned together; no partial request is ever produced.
pub fn build_request(
    sample: &SoilSample,
    image: &ImageAsset,
    environmental: &EnvironmentalSeries,
) -> Result<PredictionRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let encoded = match encode_image(image) {
        Ok(encoded) => Some(encoded),
        Err(failure) => {
            errors.push(failure);
            None
        }
    };

    match (assemble_checked(sample, environmental, &mut errors), encoded) {
        (Some(crop), Some(encoded)) if errors.is_empty() => Ok(PredictionRequest {
            environmental_data: environmental.clone(),
            soil_data: SoilData::from_sample(crop, sample),
            image_data: encoded.into_string(),
        }),
        _ => Err(errors),
    }
}

/// Builds a request around an image that has already been encoded.
pub fn assemble_request(
    sample: &SoilSample,
    image: &EncodedImage,
    environmental: &EnvironmentalSeries,
) -> Result<PredictionRequest, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    match assemble_checked(sample, environmental, &mut errors) {
        Some(crop) if errors.is_empty() => Ok(PredictionRequest {
            environmental_data: environmental.clone(),
            soil_data: SoilData::from_sample(crop, sample),
            image_data: image.as_str().to_string(),
        }),
        _ => Err(errors),
    }
}

fn assemble_checked(
    sample: &SoilSample,
    environmental: &EnvironmentalSeries,
    errors: &mut ValidationErrors,
) -> Option<Crop> {
    let crop = match soil::validate(sample) {
        Ok(crop) => Some(crop),
        Err(soil_errors) => {
            errors.extend(soil_errors);
            None
        }
    };

    if let Err(failure) = environmental.check() {
        errors.push(failure);
    }

    crop
}
