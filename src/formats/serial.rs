//! Structured serializations of a compiled endpoint

use super::registry::{FormatError, Formatter};
use crate::compiler::CompiledEndpoint;

pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn render(&self, compiled: &CompiledEndpoint) -> Result<String, FormatError> {
        serde_json::to_string_pretty(compiled).map_err(|e| FormatError::Render {
            format: self.name(),
            message: e.to_string(),
        })
    }

    fn description(&self) -> &'static str {
        "Pretty-printed JSON of the tree, template options and endpoint metadata"
    }
}

pub struct YamlFormatter;

impl Formatter for YamlFormatter {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn render(&self, compiled: &CompiledEndpoint) -> Result<String, FormatError> {
        serde_yaml::to_string(compiled).map_err(|e| FormatError::Render {
            format: self.name(),
            message: e.to_string(),
        })
    }

    fn description(&self) -> &'static str {
        "YAML of the tree, template options and endpoint metadata"
    }
}
