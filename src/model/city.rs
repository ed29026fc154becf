//! City record
//!
//! A `CityDraft` is what a user types; the store turns it into a `City` by
//! attaching a key and a creation date. Neither of those can change after.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CityError, Result};
use super::{Climate, Coded, Government, StandardOfLiving};

/// Largest allowed `x` coordinate (inclusive)
pub const COORD_X_MAX: i32 = 416;

/// `y` must be strictly greater than this
pub const COORD_Y_MIN: i64 = -655;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: i32,
    pub y: i64,
}

/// A city governor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Human {
    pub name: String,
}

/// The user-controlled fields of a city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityDraft {
    pub name: String,
    pub coordinates: Coordinates,
    pub area: i32,
    pub population: i64,
    pub meters_above_sea_level: f64,
    pub climate: Climate,
    pub government: Government,
    pub standard_of_living: StandardOfLiving,
    pub governor: Option<Human>,
}

/// A stored city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: i32,
    pub name: String,
    pub coordinates: Coordinates,
    pub creation_date: DateTime<Utc>,
    pub area: i32,
    pub population: i64,
    pub meters_above_sea_level: f64,
    pub climate: Climate,
    pub government: Government,
    pub standard_of_living: StandardOfLiving,
    pub governor: Option<Human>,
}

// =============================================================================
// Draft
// =============================================================================

impl CityDraft {
    /// Number of positional fields without / with a governor
    pub const FIELDS: usize = 9;
    pub const FIELDS_WITH_GOVERNOR: usize = 10;

    /// Build a draft from positional text fields
    ///
    /// Order: name, x, y, area, population, meters above sea level,
    /// climate code, government code, standard of living code [, governor].
    /// The result is validated.
    pub fn parse_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self> {
        if fields.len() != Self::FIELDS && fields.len() != Self::FIELDS_WITH_GOVERNOR {
            return Err(CityError::InvalidArgument(format!(
                "expected {} or {} city fields (name x y area population height climate government standard_of_living [governor]), got {}",
                Self::FIELDS,
                Self::FIELDS_WITH_GOVERNOR,
                fields.len()
            )));
        }
        let field = |i: usize| fields[i].as_ref();

        let draft = CityDraft {
            name: field(0).to_string(),
            coordinates: Coordinates {
                x: parse_number(field(1), "coordinate x")?,
                y: parse_number(field(2), "coordinate y")?,
            },
            area: parse_number(field(3), "area")?,
            population: parse_number(field(4), "population")?,
            meters_above_sea_level: parse_number(field(5), "meters above sea level")?,
            climate: Climate::from_code(parse_number(field(6), "climate code")?)?,
            government: Government::from_code(parse_number(field(7), "government code")?)?,
            standard_of_living: StandardOfLiving::from_code(parse_number(
                field(8),
                "standard of living code",
            )?)?,
            governor: fields.get(9).map(|n| Human {
                name: n.as_ref().to_string(),
            }),
        };

        draft.validate()?;
        Ok(draft)
    }

    /// Check every field constraint
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CityError::Validation("name must not be empty".to_string()));
        }
        if self.coordinates.x > COORD_X_MAX {
            return Err(CityError::Validation(format!(
                "coordinate x must be at most {}, got {}",
                COORD_X_MAX, self.coordinates.x
            )));
        }
        if self.coordinates.y <= COORD_Y_MIN {
            return Err(CityError::Validation(format!(
                "coordinate y must be greater than {}, got {}",
                COORD_Y_MIN, self.coordinates.y
            )));
        }
        if self.area <= 0 {
            return Err(CityError::Validation(format!(
                "area must be positive, got {}",
                self.area
            )));
        }
        if self.population <= 0 {
            return Err(CityError::Validation(format!(
                "population must be positive, got {}",
                self.population
            )));
        }
        if !self.meters_above_sea_level.is_finite() {
            return Err(CityError::Validation(
                "meters above sea level must be a finite number".to_string(),
            ));
        }
        if let Some(governor) = &self.governor {
            if governor.name.trim().is_empty() {
                return Err(CityError::Validation(
                    "governor name must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Compare under the replace-if-greater order
    pub fn rank_cmp(&self, other: &City) -> Ordering {
        rank(self.area, self.population, &self.name).cmp(&other.rank())
    }
}

fn parse_number<T: FromStr>(raw: &str, what: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        CityError::InvalidArgument(format!("{} must be a number, got '{}'", what, raw))
    })
}

/// area, then population, then name
fn rank(area: i32, population: i64, name: &str) -> (i32, i64, &str) {
    (area, population, name)
}

// =============================================================================
// City
// =============================================================================

impl City {
    /// Attach identity to a validated draft
    pub fn from_draft(id: i32, creation_date: DateTime<Utc>, draft: CityDraft) -> Self {
        Self {
            id,
            name: draft.name,
            coordinates: draft.coordinates,
            creation_date,
            area: draft.area,
            population: draft.population,
            meters_above_sea_level: draft.meters_above_sea_level,
            climate: draft.climate,
            government: draft.government,
            standard_of_living: draft.standard_of_living,
            governor: draft.governor,
        }
    }

    /// Overwrite every field except `id` and `creation_date`
    pub fn apply(&mut self, draft: CityDraft) {
        let id = self.id;
        let creation_date = self.creation_date;
        *self = City::from_draft(id, creation_date, draft);
    }

    /// The user-controlled part of this city
    pub fn to_draft(&self) -> CityDraft {
        CityDraft {
            name: self.name.clone(),
            coordinates: self.coordinates,
            area: self.area,
            population: self.population,
            meters_above_sea_level: self.meters_above_sea_level,
            climate: self.climate,
            government: self.government,
            standard_of_living: self.standard_of_living,
            governor: self.governor.clone(),
        }
    }

    /// Validate a full record (used for snapshot input)
    pub fn validate(&self) -> Result<()> {
        if self.id <= 0 {
            return Err(CityError::Validation(format!(
                "id must be positive, got {}",
                self.id
            )));
        }
        self.to_draft().validate()
    }

    fn rank(&self) -> (i32, i64, &str) {
        rank(self.area, self.population, &self.name)
    }

    /// Total order: area, population, name, then id so the order is strict
    pub fn rank_cmp(&self, other: &City) -> Ordering {
        self.rank()
            .cmp(&other.rank())
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} ({}, {}) area={} population={} height={} climate={} government={} standard_of_living={}",
            self.id,
            self.name,
            self.coordinates.x,
            self.coordinates.y,
            self.area,
            self.population,
            self.meters_above_sea_level,
            self.climate,
            self.government,
            self.standard_of_living,
        )?;
        if let Some(governor) = &self.governor {
            write!(f, " governor={}", governor.name)?;
        }
        write!(f, " created={}", self.creation_date.format("%Y-%m-%d %H:%M:%S"))
    }
}
