//! Model Module
//!
//! The city record and everything needed to validate one.
//!
//! ## Responsibilities
//! - `City`: a stored record, carrying its key and creation date
//! - `CityDraft`: the user-supplied part of a record (no identity yet)
//! - Field and cross-field validation
//! - Enum code tables (1-based codes typed by users)
//! - The total order used by `replace_if_greater` and `show`

mod city;
mod enums;

pub use city::{City, CityDraft, Coordinates, Human, COORD_X_MAX, COORD_Y_MIN};
pub use enums::{Climate, Coded, Government, StandardOfLiving};
