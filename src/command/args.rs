//! Argument helpers shared by the handlers

use crate::error::{CityError, Result};
use crate::protocol::{Argument, Arguments};

/// Reject any argument
pub fn none(command: &str, args: &Arguments) -> Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CityError::InvalidArgument(format!(
            "'{}' takes no arguments, got {}",
            command,
            args.len()
        )))
    }
}

/// Exactly one text argument
pub fn single<'a>(command: &str, args: &'a Arguments, what: &str) -> Result<&'a str> {
    match args.single_text() {
        Some(s) if !s.trim().is_empty() => Ok(s),
        _ => Err(CityError::InvalidArgument(format!(
            "'{}' expects exactly one argument: {}",
            command, what
        ))),
    }
}

/// All arguments as text; composite values are rejected
pub fn texts<'a>(command: &str, args: &'a Arguments) -> Result<Vec<&'a str>> {
    match args {
        Arguments::None => Ok(Vec::new()),
        Arguments::Single(s) => Ok(vec![s.as_str()]),
        Arguments::List(list) => list
            .iter()
            .map(|arg| match arg {
                Argument::Text(s) => Ok(s.as_str()),
                Argument::City(_) => Err(CityError::InvalidArgument(format!(
                    "'{}' expects text arguments only",
                    command
                ))),
            })
            .collect(),
    }
}

/// Parse an integer key
pub fn key(raw: &str) -> Result<i32> {
    raw.trim().parse().map_err(|_| {
        CityError::InvalidArgument(format!("key must be an integer, got '{}'", raw))
    })
}
