//! Model Tests
//!
//! Tests verify:
//! - Enum code tables (1-based codes, names, out-of-range handling)
//! - Parsing positional fields into a draft
//! - Field validation
//! - The replace-if-greater ordering

use std::cmp::Ordering;

use chrono::Utc;
use cityvault::model::{
    City, CityDraft, Climate, Coded, Coordinates, Government, Human, StandardOfLiving,
    COORD_X_MAX, COORD_Y_MIN,
};
use cityvault::CityError;

// =============================================================================
// Helper Functions
// =============================================================================

fn draft(name: &str, area: i32, population: i64) -> CityDraft {
    CityDraft {
        name: name.to_string(),
        coordinates: Coordinates { x: 1, y: 2 },
        area,
        population,
        meters_above_sea_level: 100.0,
        climate: Climate::Tundra,
        government: Government::Anarchy,
        standard_of_living: StandardOfLiving::High,
        governor: None,
    }
}

fn city(id: i32, name: &str, area: i32, population: i64) -> City {
    City::from_draft(id, Utc::now(), draft(name, area, population))
}

// =============================================================================
// Enum Code Tests
// =============================================================================

#[test]
fn test_codes_are_one_based() {
    assert_eq!(Climate::from_code(1).unwrap(), Climate::RainForest);
    assert_eq!(Climate::from_code(3).unwrap(), Climate::Tundra);
    assert_eq!(Government::from_code(4).unwrap(), Government::Timocracy);
    assert_eq!(
        StandardOfLiving::from_code(5).unwrap(),
        StandardOfLiving::Nightmare
    );
}

#[test]
fn test_out_of_range_code_is_validation_error() {
    for code in [0, -1, 4, i64::MAX] {
        match Climate::from_code(code) {
            Err(CityError::Validation(msg)) => assert!(msg.contains("climate")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}

#[test]
fn test_from_name_ignores_case() {
    assert_eq!(
        StandardOfLiving::from_name("very_high").unwrap(),
        StandardOfLiving::VeryHigh
    );
    assert_eq!(Government::from_name("Anarchy").unwrap(), Government::Anarchy);
}

#[test]
fn test_unknown_name_lists_choices() {
    match StandardOfLiving::from_name("medium") {
        Err(CityError::Validation(msg)) => {
            assert!(msg.contains("VERY_HIGH"));
            assert!(msg.contains("NIGHTMARE"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_display_matches_table() {
    assert_eq!(Climate::HumidSubtropical.to_string(), "HUMID_SUBTROPICAL");
    assert_eq!(StandardOfLiving::VeryLow.to_string(), "VERY_LOW");
}

// =============================================================================
// Field Parsing Tests
// =============================================================================

#[test]
fn test_parse_nine_fields() {
    let parsed =
        CityDraft::parse_fields(&["Minsk", "10", "20", "409", "1995471", "220.5", "2", "3", "1"])
            .unwrap();

    assert_eq!(parsed.name, "Minsk");
    assert_eq!(parsed.coordinates, Coordinates { x: 10, y: 20 });
    assert_eq!(parsed.area, 409);
    assert_eq!(parsed.population, 1_995_471);
    assert_eq!(parsed.meters_above_sea_level, 220.5);
    assert_eq!(parsed.climate, Climate::HumidSubtropical);
    assert_eq!(parsed.government, Government::Matriarchy);
    assert_eq!(parsed.standard_of_living, StandardOfLiving::VeryHigh);
    assert_eq!(parsed.governor, None);
}

#[test]
fn test_parse_ten_fields_sets_governor() {
    let parsed = CityDraft::parse_fields(&[
        "Paris", "1", "1", "105", "2100000", "35", "1", "1", "2", "Anne",
    ])
    .unwrap();

    assert_eq!(
        parsed.governor,
        Some(Human {
            name: "Anne".to_string()
        })
    );
}

#[test]
fn test_parse_wrong_field_count() {
    let result = CityDraft::parse_fields(&["Paris", "1", "1"]);
    assert!(matches!(result, Err(CityError::InvalidArgument(_))));

    let eleven = vec!["x"; 11];
    assert!(matches!(
        CityDraft::parse_fields(&eleven),
        Err(CityError::InvalidArgument(_))
    ));
}

#[test]
fn test_parse_non_numeric_field() {
    let result =
        CityDraft::parse_fields(&["Paris", "one", "1", "105", "2100000", "35", "1", "1", "2"]);
    match result {
        Err(CityError::InvalidArgument(msg)) => assert!(msg.contains("coordinate x")),
        other => panic!("expected invalid argument, got {:?}", other),
    }
}

#[test]
fn test_parse_bad_enum_code() {
    let result =
        CityDraft::parse_fields(&["Paris", "1", "1", "105", "2100000", "35", "9", "1", "2"]);
    assert!(matches!(result, Err(CityError::Validation(_))));
}

// =============================================================================
// Validation Tests
// =============================================================================

#[test]
fn test_valid_draft_passes() {
    assert!(draft("Rome", 1285, 2_873_000).validate().is_ok());
}

#[test]
fn test_empty_name_rejected() {
    assert!(draft("", 1, 1).validate().is_err());
    assert!(draft("   ", 1, 1).validate().is_err());
}

#[test]
fn test_non_positive_numbers_rejected() {
    assert!(draft("A", 0, 1).validate().is_err());
    assert!(draft("A", -5, 1).validate().is_err());
    assert!(draft("A", 1, 0).validate().is_err());
    assert!(draft("A", 1, -1).validate().is_err());
}

#[test]
fn test_coordinate_bounds() {
    let mut d = draft("A", 1, 1);
    d.coordinates.x = COORD_X_MAX;
    assert!(d.validate().is_ok());
    d.coordinates.x = COORD_X_MAX + 1;
    assert!(d.validate().is_err());

    let mut d = draft("A", 1, 1);
    d.coordinates.y = COORD_Y_MIN + 1;
    assert!(d.validate().is_ok());
    d.coordinates.y = COORD_Y_MIN;
    assert!(d.validate().is_err());
}

#[test]
fn test_height_may_be_negative_but_finite() {
    let mut d = draft("Baku", 1, 1);
    d.meters_above_sea_level = -28.0;
    assert!(d.validate().is_ok());
    d.meters_above_sea_level = f64::NAN;
    assert!(d.validate().is_err());
}

#[test]
fn test_blank_governor_rejected() {
    let mut d = draft("A", 1, 1);
    d.governor = Some(Human {
        name: " ".to_string(),
    });
    assert!(d.validate().is_err());
}

#[test]
fn test_city_requires_positive_id() {
    assert!(city(0, "A", 1, 1).validate().is_err());
    assert!(city(1, "A", 1, 1).validate().is_ok());
}

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_order_by_area_first() {
    let current = city(1, "Zeta", 100, 1_000_000);
    assert_eq!(draft("Alpha", 101, 1).rank_cmp(&current), Ordering::Greater);
    assert_eq!(draft("Zzz", 99, 9_999_999).rank_cmp(&current), Ordering::Less);
}

#[test]
fn test_order_population_breaks_area_tie() {
    let current = city(1, "Same", 100, 500);
    assert_eq!(draft("Same", 100, 501).rank_cmp(&current), Ordering::Greater);
    assert_eq!(draft("Same", 100, 499).rank_cmp(&current), Ordering::Less);
}

#[test]
fn test_order_name_breaks_remaining_tie() {
    let current = city(1, "Minsk", 100, 500);
    assert_eq!(draft("Moscow", 100, 500).rank_cmp(&current), Ordering::Greater);
    assert_eq!(draft("Minsk", 100, 500).rank_cmp(&current), Ordering::Equal);
}

#[test]
fn test_city_order_uses_id_last() {
    let a = city(1, "Same", 10, 10);
    let b = city(2, "Same", 10, 10);
    assert_eq!(a.rank_cmp(&b), Ordering::Less);
}

#[test]
fn test_apply_keeps_identity() {
    let mut c = city(7, "Old", 1, 1);
    let created = c.creation_date;
    c.apply(draft("New", 2, 2));

    assert_eq!(c.id, 7);
    assert_eq!(c.creation_date, created);
    assert_eq!(c.name, "New");
    assert_eq!(c.area, 2);
}
