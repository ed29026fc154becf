//! Command Module
//!
//! Maps command names to handlers over the shared store.
//!
//! ## Dispatch rules
//! - Names are matched case-insensitively
//! - An unknown name yields `Response::not_found()`, never an error
//! - Handlers return `Result<Response>`; the registry turns every `Err`
//!   into an error Response, so nothing a client sends can fault the
//!   connection from here

mod args;
mod handlers;
mod registry;

pub use registry::{Handler, Registry};

/// Every server-side command with a one-line description
pub const COMMANDS: &[(&str, &str)] = &[
    ("info", "print information about the collection"),
    ("show", "print every element of the collection"),
    (
        "insert",
        "insert name x y area population height climate government standard_of_living [governor]",
    ),
    ("update", "update <key> followed by the insert fields"),
    ("remove_key", "remove_key <key>: remove the element with that key"),
    ("clear", "remove every element"),
    (
        "replace_if_greater",
        "replace_if_greater <key> followed by the insert fields: replace if the new city is greater",
    ),
    ("remove_greater_key", "remove_greater_key <key>: remove every element with a greater key"),
    ("remove_lower_key", "remove_lower_key <key>: remove every element with a lower key"),
    (
        "remove_all_by_standard_of_living",
        "remove_all_by_standard_of_living <name>: remove every element with that standard of living",
    ),
    (
        "average_of_meters_above_sea_level",
        "print the average height above sea level",
    ),
    (
        "filter_starts_with_name",
        "filter_starts_with_name <prefix>: print elements whose name starts with the prefix",
    ),
];
