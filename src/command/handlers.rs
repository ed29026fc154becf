//! Command handlers
//!
//! One function per command. Each validates its own arguments and performs
//! exactly one store call.

use crate::error::{CityError, Result};
use crate::model::{CityDraft, Coded, StandardOfLiving};
use crate::protocol::{Argument, Arguments, Response};
use crate::store::Store;

use super::args;

pub fn info(store: &Store, arguments: &Arguments) -> Result<Response> {
    args::none("info", arguments)?;
    Ok(Response::message(store.info().to_string()))
}

pub fn show(store: &Store, arguments: &Arguments) -> Result<Response> {
    args::none("show", arguments)?;

    let cities = store.sorted_view();
    if cities.is_empty() {
        return Ok(Response::message("Collection is empty."));
    }
    let lines: Vec<String> = cities.iter().map(ToString::to_string).collect();
    Ok(Response::message(format!(
        "Collection elements:\n{}",
        lines.join("\n")
    )))
}

pub fn insert(store: &Store, arguments: &Arguments) -> Result<Response> {
    let fields = args::texts("insert", arguments)?;
    let draft = CityDraft::parse_fields(&fields)?;
    let id = store.add(None, draft)?;
    Ok(Response::message(format!("City added with id {}.", id)))
}

pub fn update(store: &Store, arguments: &Arguments) -> Result<Response> {
    let fields = args::texts("update", arguments)?;
    let (raw_key, rest) = match fields.split_first() {
        Some(split) => split,
        None => {
            return Err(CityError::InvalidArgument(
                "'update' expects a key followed by the city fields".to_string(),
            ))
        }
    };
    let key = args::key(raw_key)?;
    let draft = CityDraft::parse_fields(rest)?;

    if store.update(key, draft)? {
        Ok(Response::message(format!("Element with key {} updated.", key)))
    } else {
        Err(CityError::NotFound(key))
    }
}

pub fn remove_key(store: &Store, arguments: &Arguments) -> Result<Response> {
    let key = args::key(args::single("remove_key", arguments, "key")?)?;
    if store.remove(key) {
        Ok(Response::message(format!("Element with key {} removed.", key)))
    } else {
        Err(CityError::NotFound(key))
    }
}

pub fn clear(store: &Store, arguments: &Arguments) -> Result<Response> {
    args::none("clear", arguments)?;
    store.clear();
    Ok(Response::message("Collection cleared."))
}

pub fn replace_if_greater(store: &Store, arguments: &Arguments) -> Result<Response> {
    let (key, candidate) = match arguments {
        Arguments::List(list) => match list.as_slice() {
            [Argument::Text(raw_key), Argument::City(draft)] => (args::key(raw_key)?, draft),
            _ => {
                return Err(CityError::InvalidArgument(
                    "'replace_if_greater' expects a key and a city".to_string(),
                ))
            }
        },
        _ => {
            return Err(CityError::InvalidArgument(
                "'replace_if_greater' expects a key and a city".to_string(),
            ))
        }
    };

    if store.replace_if_greater(key, candidate.clone())? {
        Ok(Response::message(format!(
            "Element with key {} replaced: the new city is greater.",
            key
        )))
    } else {
        Ok(Response::message(format!(
            "Element with key {} was not replaced: the new city is not greater.",
            key
        )))
    }
}

pub fn remove_greater_key(store: &Store, arguments: &Arguments) -> Result<Response> {
    let key = args::key(args::single("remove_greater_key", arguments, "key")?)?;
    let removed = store.remove_greater_key(key);
    Ok(Response::message(format!(
        "Removed {} elements with key greater than {}.",
        removed, key
    )))
}

pub fn remove_lower_key(store: &Store, arguments: &Arguments) -> Result<Response> {
    let key = args::key(args::single("remove_lower_key", arguments, "key")?)?;
    let removed = store.remove_lower_key(key);
    Ok(Response::message(format!(
        "Removed {} elements with key lower than {}.",
        removed, key
    )))
}

pub fn remove_all_by_standard_of_living(
    store: &Store,
    arguments: &Arguments,
) -> Result<Response> {
    let raw = args::single(
        "remove_all_by_standard_of_living",
        arguments,
        "standard of living",
    )?;
    let value = StandardOfLiving::from_name(raw)?;
    let removed = store.remove_all_by_standard_of_living(value);
    Ok(Response::message(format!(
        "Removed {} elements with standard of living {}.",
        removed, value
    )))
}

pub fn average_of_meters_above_sea_level(
    store: &Store,
    arguments: &Arguments,
) -> Result<Response> {
    args::none("average_of_meters_above_sea_level", arguments)?;
    match store.height_summary() {
        (0, _) => Ok(Response::message("Collection is empty, average is 0.")),
        (_, mean) => Ok(Response::message(format!(
            "Average meters above sea level: {}",
            mean
        ))),
    }
}

/// `prefix_len` of `Some(n)` requires a prefix of exactly `n` characters
pub fn filter_starts_with_name(
    store: &Store,
    arguments: &Arguments,
    prefix_len: Option<usize>,
) -> Result<Response> {
    let prefix = args::single("filter_starts_with_name", arguments, "prefix")?;
    if let Some(len) = prefix_len {
        if prefix.chars().count() != len {
            return Err(CityError::InvalidArgument(format!(
                "prefix must be exactly {} character(s), got '{}'",
                len, prefix
            )));
        }
    }

    let cities = store.filter_starts_with_name(prefix)?;
    if cities.is_empty() {
        return Ok(Response::message(format!(
            "No cities whose name starts with '{}'.",
            prefix
        )));
    }
    let lines: Vec<String> = cities.iter().map(ToString::to_string).collect();
    Ok(Response::with_data(
        format!(
            "Cities whose name starts with '{}':\n{}",
            prefix,
            lines.join("\n")
        ),
        cities,
    ))
}
