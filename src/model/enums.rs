//! Enumerated city attributes
//!
//! Users address variants by a 1-based code (`insert ... 2 1 3`) or by name
//! (`remove_all_by_standard_of_living very_high`). Both go through an explicit
//! table so a bad code is a validation error, never an index fault.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CityError, Result};

/// An enum with a fixed code table
pub trait Coded: Sized + Copy + 'static {
    /// Field name used in error messages
    const FIELD: &'static str;

    /// Code table: `TABLE[i]` has code `i + 1`
    const TABLE: &'static [(Self, &'static str)];

    /// Resolve a 1-based code
    fn from_code(code: i64) -> Result<Self> {
        let len = Self::TABLE.len() as i64;
        if code < 1 || code > len {
            return Err(CityError::Validation(format!(
                "{} code {} out of range 1..={}",
                Self::FIELD,
                code,
                len
            )));
        }
        Ok(Self::TABLE[(code - 1) as usize].0)
    }

    /// Resolve a variant name, ignoring ASCII case
    fn from_name(name: &str) -> Result<Self> {
        Self::TABLE
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name.trim()))
            .map(|(v, _)| *v)
            .ok_or_else(|| {
                CityError::Validation(format!(
                    "unknown {} '{}', expected one of: {}",
                    Self::FIELD,
                    name,
                    Self::names().join(", ")
                ))
            })
    }

    /// All variant names in code order
    fn names() -> Vec<&'static str> {
        Self::TABLE.iter().map(|(_, n)| *n).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Climate {
    RainForest,
    HumidSubtropical,
    Tundra,
}

impl Coded for Climate {
    const FIELD: &'static str = "climate";
    const TABLE: &'static [(Self, &'static str)] = &[
        (Climate::RainForest, "RAIN_FOREST"),
        (Climate::HumidSubtropical, "HUMID_SUBTROPICAL"),
        (Climate::Tundra, "TUNDRA"),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Government {
    Anarchy,
    Kleptocracy,
    Matriarchy,
    Timocracy,
}

impl Coded for Government {
    const FIELD: &'static str = "government";
    const TABLE: &'static [(Self, &'static str)] = &[
        (Government::Anarchy, "ANARCHY"),
        (Government::Kleptocracy, "KLEPTOCRACY"),
        (Government::Matriarchy, "MATRIARCHY"),
        (Government::Timocracy, "TIMOCRACY"),
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StandardOfLiving {
    VeryHigh,
    High,
    Low,
    VeryLow,
    Nightmare,
}

impl Coded for StandardOfLiving {
    const FIELD: &'static str = "standard of living";
    const TABLE: &'static [(Self, &'static str)] = &[
        (StandardOfLiving::VeryHigh, "VERY_HIGH"),
        (StandardOfLiving::High, "HIGH"),
        (StandardOfLiving::Low, "LOW"),
        (StandardOfLiving::VeryLow, "VERY_LOW"),
        (StandardOfLiving::Nightmare, "NIGHTMARE"),
    ];
}

fn table_name<T: Coded + PartialEq>(value: T) -> &'static str {
    T::TABLE
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, n)| *n)
        .unwrap_or("?")
}

impl fmt::Display for Climate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(table_name(*self))
    }
}

impl fmt::Display for Government {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(table_name(*self))
    }
}

impl fmt::Display for StandardOfLiving {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(table_name(*self))
    }
}
