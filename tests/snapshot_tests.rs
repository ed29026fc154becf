//! Snapshot Tests
//!
//! Loading the startup collection from JSON and writing it back.

use std::fs;

use cityvault::model::{CityDraft, Climate, Coordinates, Government, StandardOfLiving};
use cityvault::{snapshot, CityError, Store};
use tempfile::tempdir;

// =============================================================================
// Helper Functions
// =============================================================================

fn draft(name: &str, area: i32) -> CityDraft {
    CityDraft {
        name: name.to_string(),
        coordinates: Coordinates { x: 3, y: 4 },
        area,
        population: 1_000,
        meters_above_sea_level: 12.5,
        climate: Climate::RainForest,
        government: Government::Timocracy,
        standard_of_living: StandardOfLiving::Low,
        governor: None,
    }
}

const TWO_CITIES: &str = r#"[
  {
    "id": 2, "name": "Moscow", "coordinates": { "x": 10, "y": 20 },
    "creation_date": "2024-01-01T00:00:00Z", "area": 2511, "population": 13010112,
    "meters_above_sea_level": 156.0, "climate": "HUMID_SUBTROPICAL",
    "government": "KLEPTOCRACY", "standard_of_living": "HIGH", "governor": null
  },
  {
    "id": 5, "name": "Minsk", "coordinates": { "x": 1, "y": 1 },
    "creation_date": "2024-02-01T12:30:00Z", "area": 409, "population": 1995471,
    "meters_above_sea_level": 220.0, "climate": "TUNDRA",
    "government": "MATRIARCHY", "standard_of_living": "VERY_HIGH",
    "governor": { "name": "Olga" }
  }
]"#;

// =============================================================================
// Load Tests
// =============================================================================

#[test]
fn test_load_keeps_ids_and_dates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cities.json");
    fs::write(&path, TWO_CITIES).unwrap();

    let store = Store::default();
    assert_eq!(snapshot::load(&path, &store).unwrap(), 2);

    assert_eq!(store.keys(), vec![2, 5]);
    let minsk = store.get(5).unwrap();
    assert_eq!(minsk.governor.unwrap().name, "Olga");
    assert_eq!(minsk.creation_date.to_rfc3339(), "2024-02-01T12:30:00+00:00");
}

#[test]
fn test_generated_keys_follow_loaded_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cities.json");
    fs::write(&path, TWO_CITIES).unwrap();

    let store = Store::default();
    snapshot::load(&path, &store).unwrap();

    assert_eq!(store.add(None, draft("Kyiv", 839)).unwrap(), 1);
    assert_eq!(store.add(None, draft("Riga", 304)).unwrap(), 3);
}

#[test]
fn test_missing_file_is_snapshot_error() {
    let dir = tempdir().unwrap();
    let store = Store::default();
    let result = snapshot::load(&dir.path().join("absent.json"), &store);
    assert!(matches!(result, Err(CityError::Snapshot(_))));
}

#[test]
fn test_invalid_json_is_snapshot_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "[{\"id\": 1,").unwrap();

    let store = Store::default();
    assert!(matches!(
        snapshot::load(&path, &store),
        Err(CityError::Snapshot(_))
    ));
    assert!(store.is_empty());
}

#[test]
fn test_duplicate_ids_leave_store_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dupes.json");
    fs::write(&path, TWO_CITIES.replace("\"id\": 5", "\"id\": 2")).unwrap();

    let store = Store::default();
    assert!(snapshot::load(&path, &store).is_err());
    assert!(store.is_empty());
}

#[test]
fn test_invalid_record_leaves_store_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("invalid.json");
    fs::write(&path, TWO_CITIES.replace("\"area\": 409", "\"area\": 0")).unwrap();

    let store = Store::default();
    match snapshot::load(&path, &store) {
        Err(CityError::Snapshot(msg)) => assert!(msg.contains("area must be positive")),
        other => panic!("expected snapshot error, got {:?}", other),
    }
    assert!(store.is_empty());
}

#[test]
fn test_unknown_enum_name_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("enum.json");
    fs::write(&path, TWO_CITIES.replace("TUNDRA", "DESERT")).unwrap();

    let store = Store::default();
    assert!(snapshot::load(&path, &store).is_err());
    assert!(store.is_empty());
}

// =============================================================================
// Save Tests
// =============================================================================

#[test]
fn test_save_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.json");

    let saved = Store::default();
    saved.add(None, draft("Oslo", 454)).unwrap();
    saved.add(Some(9), draft("Bergen", 465)).unwrap();
    assert_eq!(snapshot::save(&path, &saved).unwrap(), 2);

    let restored = Store::default();
    snapshot::load(&path, &restored).unwrap();

    assert_eq!(restored.sorted_view(), saved.sorted_view());
}

#[test]
fn test_read_without_installing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cities.json");
    fs::write(&path, TWO_CITIES).unwrap();

    let cities = snapshot::read(&path).unwrap();
    assert_eq!(cities.len(), 2);
    assert_eq!(cities[0].name, "Moscow");
}
