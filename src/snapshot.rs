//! Snapshot Module
//!
//! Loads the initial collection from a JSON file and writes it back out.
//!
//! ## File Format
//! A JSON array of cities, each with its `id` and `creation_date`:
//!
//! ```json
//! [
//!   {
//!     "id": 1, "name": "Moscow", "coordinates": { "x": 10, "y": 20 },
//!     "creation_date": "2024-01-01T00:00:00Z", "area": 2511, "population": 13010112,
//!     "meters_above_sea_level": 156.0, "climate": "HUMID_SUBTROPICAL",
//!     "government": "KLEPTOCRACY", "standard_of_living": "HIGH", "governor": null
//!   }
//! ]
//! ```

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{CityError, Result};
use crate::model::City;
use crate::store::Store;

/// Read cities from a JSON snapshot file
pub fn read(path: &Path) -> Result<Vec<City>> {
    let raw = fs::read_to_string(path).map_err(|e| {
        CityError::Snapshot(format!("cannot read {}: {}", path.display(), e))
    })?;
    let cities: Vec<City> = serde_json::from_str(&raw).map_err(|e| {
        CityError::Snapshot(format!("cannot parse {}: {}", path.display(), e))
    })?;
    Ok(cities)
}

/// Load a snapshot file into `store`
///
/// Every record is validated and ids must be unique; on any failure the
/// store is left untouched and the error is a `CityError::Snapshot`.
pub fn load(path: &Path, store: &Store) -> Result<usize> {
    let cities = read(path)?;
    let count = store.install(cities).map_err(|e| {
        CityError::Snapshot(format!("invalid record in {}: {}", path.display(), e))
    })?;

    info!(
        path = %path.display(),
        records = count,
        "Loaded snapshot"
    );
    Ok(count)
}

/// Write the store's sorted view to `path` as pretty JSON
pub fn save(path: &Path, store: &Store) -> Result<usize> {
    let cities = store.sorted_view();
    let json = serde_json::to_string_pretty(&cities)?;
    fs::write(path, json)?;

    info!(
        path = %path.display(),
        records = cities.len(),
        "Saved snapshot"
    );
    Ok(cities.len())
}
