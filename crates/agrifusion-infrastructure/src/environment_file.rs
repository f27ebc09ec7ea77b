//! Reads an environmental series from a JSON file.
//!
//! The file holds an array of `[temperature, humidity, soil_moisture,
//! ph_index]` arrays, one per hour.

use agrifusion_core::environment::{EnvironmentalSeries, SERIES_LENGTH};
use agrifusion_core::error::{AgriError, Result};
use std::path::Path;
use tokio::fs;

/// Loads a series without checking its length.
///
/// Length is enforced when the request is built, so a short file surfaces
/// as a `MalformedSeries` validation failure rather than a load error.
pub async fn load_series(path: &Path) -> Result<EnvironmentalSeries> {
    let content = fs::read_to_string(path).await?;

    let series: EnvironmentalSeries = serde_json::from_str(&content).map_err(|e| {
        AgriError::Serialization {
            format: "JSON".to_string(),
            message: format!("{}: {}", path.display(), e),
        }
    })?;

    if series.len() != SERIES_LENGTH {
        tracing::warn!(
            "[Environment] {} has {} readings, expected {}",
            path.display(),
            series.len(),
            SERIES_LENGTH
        );
    }

    Ok(series)
}
