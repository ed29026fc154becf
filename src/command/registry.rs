//! Command registry
//!
//! A name → closure table. Closures capture whatever they operate on
//! (normally an `Arc<Store>`), so the registry itself holds no state.

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::protocol::{Arguments, Request, Response};
use crate::store::Store;

use super::handlers;

/// A command handler
pub type Handler = Box<dyn Fn(&Arguments) -> Result<Response> + Send + Sync>;

/// A command that needs nothing but the store
type StoreHandler = fn(&Store, &Arguments) -> Result<Response>;

/// Every command except `filter_starts_with_name`, which also takes the
/// configured prefix length
const STORE_COMMANDS: &[(&str, StoreHandler)] = &[
    ("info", handlers::info),
    ("show", handlers::show),
    ("insert", handlers::insert),
    ("update", handlers::update),
    ("remove_key", handlers::remove_key),
    ("clear", handlers::clear),
    ("replace_if_greater", handlers::replace_if_greater),
    ("remove_greater_key", handlers::remove_greater_key),
    ("remove_lower_key", handlers::remove_lower_key),
    (
        "remove_all_by_standard_of_living",
        handlers::remove_all_by_standard_of_living,
    ),
    (
        "average_of_meters_above_sea_level",
        handlers::average_of_meters_above_sea_level,
    ),
];

/// Name → handler table
#[derive(Default)]
pub struct Registry {
    handlers: HashMap<String, Handler>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every city command bound to `store`
    pub fn for_store(store: Arc<Store>, config: &Config) -> Self {
        let mut registry = Self::new();

        for &(name, handler) in STORE_COMMANDS {
            let store = Arc::clone(&store);
            registry.register(
                name,
                Box::new(move |args: &Arguments| handler(&store, args)),
            );
        }

        let prefix_len = config.filter_prefix_len;
        registry.register(
            "filter_starts_with_name",
            Box::new(move |args: &Arguments| {
                handlers::filter_starts_with_name(&store, args, prefix_len)
            }),
        );

        registry
    }

    /// Register (or replace) a handler under a lowercase name
    pub fn register(&mut self, name: &str, handler: Handler) {
        self.handlers.insert(name.to_lowercase(), handler);
    }

    /// Look up and run the command named in `request`
    pub fn dispatch(&self, request: &Request) -> Response {
        let name = request.command_name.trim().to_lowercase();

        let handler = match self.handlers.get(&name) {
            Some(handler) => handler,
            None => {
                tracing::warn!("Command not found: {}", request.command_name);
                return Response::not_found();
            }
        };

        match handler(&request.arguments) {
            Ok(response) => {
                tracing::debug!("Executed {}", name);
                response
            }
            Err(e) => {
                tracing::debug!("Command {} rejected: {}", name, e);
                Response::error(&e.to_string())
            }
        }
    }

    /// Whether `name` is registered (case-insensitive)
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(&name.to_lowercase())
    }

    /// Registered names in alphabetical order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
