//! Request definitions
//!
//! Represents commands from clients.

use serde::{Deserialize, Serialize};

use crate::model::CityDraft;

/// One positional argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Argument {
    Text(String),
    City(CityDraft),
}

/// Arguments attached to a request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Arguments {
    #[default]
    None,
    Single(String),
    List(Vec<Argument>),
}

/// A command sent by a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Command name as typed (dispatch lowercases it)
    pub command_name: String,

    pub arguments: Arguments,
}

impl Request {
    pub fn new(command_name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            command_name: command_name.into(),
            arguments,
        }
    }

    /// A request without arguments
    pub fn bare(command_name: impl Into<String>) -> Self {
        Self::new(command_name, Arguments::None)
    }

    /// A request with one text argument
    pub fn single(command_name: impl Into<String>, arg: impl Into<String>) -> Self {
        Self::new(command_name, Arguments::Single(arg.into()))
    }

    /// A request with positional text arguments
    pub fn texts<S: Into<String>>(
        command_name: impl Into<String>,
        args: impl IntoIterator<Item = S>,
    ) -> Self {
        let list = args
            .into_iter()
            .map(|a| Argument::Text(a.into()))
            .collect();
        Self::new(command_name, Arguments::List(list))
    }
}

impl Arguments {
    /// The one text argument, whether sent as `Single` or as a one-element list
    pub fn single_text(&self) -> Option<&str> {
        match self {
            Arguments::Single(s) => Some(s.as_str()),
            Arguments::List(list) => match list.as_slice() {
                [Argument::Text(s)] => Some(s.as_str()),
                _ => None,
            },
            Arguments::None => None,
        }
    }

    /// Number of positional values
    pub fn len(&self) -> usize {
        match self {
            Arguments::None => 0,
            Arguments::Single(_) => 1,
            Arguments::List(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
