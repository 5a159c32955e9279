//! Format registry
//!
//! Output formats implement [`Formatter`] and are looked up by name. The
//! registry keeps them ordered by name so listings are stable.

use crate::compiler::CompiledEndpoint;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unknown format '{}' (available: {})", .name, .available.join(", "))]
    UnknownFormat { name: String, available: Vec<String> },
    #[error("failed to render {format}: {message}")]
    Render { format: &'static str, message: String },
}

/// Renders a compiled endpoint as text.
pub trait Formatter: Send + Sync {
    /// Registry key, e.g. "json"
    fn name(&self) -> &'static str;

    fn render(&self, compiled: &CompiledEndpoint) -> Result<String, FormatError>;

    /// One-line summary shown by `qtree formats`
    fn description(&self) -> &'static str {
        ""
    }
}

#[derive(Default)]
pub struct FormatRegistry {
    formatters: BTreeMap<&'static str, Box<dyn Formatter>>,
}

impl FormatRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The json, yaml and treeviz formatters
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(super::JsonFormatter);
        registry.register(super::YamlFormatter);
        registry.register(super::TreevizFormatter);
        registry
    }

    /// Add a formatter. A formatter with the same name is replaced.
    pub fn register<F: Formatter + 'static>(&mut self, formatter: F) {
        self.formatters.insert(formatter.name(), Box::new(formatter));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Formatter> {
        self.formatters.get(name).map(|f| f.as_ref())
    }

    pub fn render(&self, compiled: &CompiledEndpoint, format: &str) -> Result<String, FormatError> {
        let formatter = self.get(format).ok_or_else(|| FormatError::UnknownFormat {
            name: format.to_string(),
            available: self.names().map(str::to_string).collect(),
        })?;
        formatter.render(compiled)
    }

    /// Format names in order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.formatters.keys().copied()
    }

    /// `(name, description)` pairs in name order
    pub fn describe(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.formatters.values().map(|f| (f.name(), f.description()))
    }
}
