//! Soil chemistry and microbial form data.

mod validator;

pub use validator::validate;

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoEnumIterator;

/// Crops the yield model was trained on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Crop {
    Banana,
    Arecanut,
    #[serde(rename = "Black Pepper")]
    #[strum(serialize = "Black Pepper")]
    BlackPepper,
}

impl Crop {
    /// Canonical names in selector order.
    pub fn names() -> Vec<&'static str> {
        Crop::iter().map(|crop| crop.name()).collect()
    }

    /// The name sent to the prediction service.
    pub fn name(self) -> &'static str {
        match self {
            Crop::Banana => "Banana",
            Crop::Arecanut => "Arecanut",
            Crop::BlackPepper => "Black Pepper",
        }
    }
}

/// The numeric fields of a [`SoilSample`].
///
/// Code that needs to visit every field iterates [`SoilField::ALL`] rather
/// than looking fields up by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoilField {
    Nitrogen,
    Phosphorus,
    Potassium,
    OrganicCarbon,
    Trichoderma,
    Pseudomonas,
}

impl SoilField {
    pub const ALL: [SoilField; 6] = [
        SoilField::Nitrogen,
        SoilField::Phosphorus,
        SoilField::Potassium,
        SoilField::OrganicCarbon,
        SoilField::Trichoderma,
        SoilField::Pseudomonas,
    ];

    /// Key used for this field in the wire request.
    pub fn key(self) -> &'static str {
        match self {
            SoilField::Nitrogen => "nitrogen_kg_ha",
            SoilField::Phosphorus => "phosphorus_kg_ha",
            SoilField::Potassium => "potassium_kg_ha",
            SoilField::OrganicCarbon => "organic_carbon_percent",
            SoilField::Trichoderma => "microbe_trichoderma_cfu_g",
            SoilField::Pseudomonas => "microbe_pseudomonas_cfu_g",
        }
    }

    /// Human-readable label with unit.
    pub fn label(self) -> &'static str {
        match self {
            SoilField::Nitrogen => "Nitrogen (kg/ha)",
            SoilField::Phosphorus => "Phosphorus (kg/ha)",
            SoilField::Potassium => "Potassium (kg/ha)",
            SoilField::OrganicCarbon => "Organic Carbon (%)",
            SoilField::Trichoderma => "Trichoderma (cfu/g)",
            SoilField::Pseudomonas => "Pseudomonas (cfu/g)",
        }
    }
}

impl fmt::Display for SoilField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Soil and microbial measurements as entered in the form.
///
/// The crop is kept as the raw selector value; it only becomes a [`Crop`]
/// once [`validate`] accepts it.
#[derive(Debug, Clone, PartialEq)]
pub struct SoilSample {
    pub crop: String,
    pub nitrogen_kg_ha: f64,
    pub phosphorus_kg_ha: f64,
    pub potassium_kg_ha: f64,
    pub organic_carbon_percent: f64,
    pub microbe_trichoderma_cfu_g: f64,
    pub microbe_pseudomonas_cfu_g: f64,
}

impl SoilSample {
    pub fn value(&self, field: SoilField) -> f64 {
        match field {
            SoilField::Nitrogen => self.nitrogen_kg_ha,
            SoilField::Phosphorus => self.phosphorus_kg_ha,
            SoilField::Potassium => self.potassium_kg_ha,
            SoilField::OrganicCarbon => self.organic_carbon_percent,
            SoilField::Trichoderma => self.microbe_trichoderma_cfu_g,
            SoilField::Pseudomonas => self.microbe_pseudomonas_cfu_g,
        }
    }

    /// Returns a copy with `field` replaced.
    pub fn with_value(mut self, field: SoilField, value: f64) -> Self {
        let slot = match field {
            SoilField::Nitrogen => &mut self.nitrogen_kg_ha,
            SoilField::Phosphorus => &mut self.phosphorus_kg_ha,
            SoilField::Potassium => &mut self.potassium_kg_ha,
            SoilField::OrganicCarbon => &mut self.organic_carbon_percent,
            SoilField::Trichoderma => &mut self.microbe_trichoderma_cfu_g,
            SoilField::Pseudomonas => &mut self.microbe_pseudomonas_cfu_g,
        };
        *slot = value;
        self
    }

    pub fn with_crop(mut self, crop: impl Into<String>) -> Self {
        self.crop = crop.into();
        self
    }
}

impl Default for SoilSample {
    /// Typical values for a banana plot.
    fn default() -> Self {
        Self {
            crop: Crop::Banana.name().to_string(),
            nitrogen_kg_ha: 300.0,
            phosphorus_kg_ha: 45.0,
            potassium_kg_ha: 250.0,
            organic_carbon_percent: 1.5,
            microbe_trichoderma_cfu_g: 500_000.0,
            microbe_pseudomonas_cfu_g: 400_000.0,
        }
    }
}
