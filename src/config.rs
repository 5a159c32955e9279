//! Compiler configuration
//!
//! `defaults/qtree.default.yaml` is embedded into the library so the documented
//! defaults and [`CompilerConfig::default`] stay in sync (a test checks this).
//! Applications layer their own YAML files and individual overrides on top via
//! [`ConfigLoader`]; the binary goes through [`discover`], which also reads a
//! `qtree.yaml` next to where it runs.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_YAML: &str = include_str!("../defaults/qtree.default.yaml");

/// Settings consumed by the compiler and the template specializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Longest chain of production references followed before a branch is truncated
    pub max_depth: usize,
    /// Deepest expansion (bracket nesting plus references) within one compile
    pub max_nesting: usize,
    /// Most nodes one compiled tree may hold before expansion stops
    pub max_nodes: usize,
    pub prompts: PromptConfig,
    pub template: TemplateConfig,
    /// Endpoint reported for productions with no use-case header; `{name}` is substituted
    pub endpoint_fallback: String,
}

/// Fallback prompt wording
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptConfig {
    pub choice: String,
    pub sequence: String,
    /// `{literal}` is replaced with the literal value
    pub literal: String,
    /// `{name}` is replaced with the identifier
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConfig {
    pub marker: String,
    pub document_hint: String,
}

impl CompilerConfig {
    pub fn endpoint_for(&self, production: &str) -> String {
        self.endpoint_fallback.replace("{name}", production)
    }

    /// Reject settings the expander cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("max_depth", self.max_depth),
            ("max_nesting", self.max_nesting),
            ("max_nodes", self.max_nodes),
        ] {
            if value == 0 {
                return Err(ConfigError::Message(format!("{key} must be at least 1")));
            }
        }
        if self.template.marker.is_empty() {
            return Err(ConfigError::Message("template.marker must not be empty".into()));
        }
        Ok(())
    }
}

impl PromptConfig {
    pub fn literal_prompt(&self, literal: &str) -> String {
        self.literal.replace("{literal}", literal)
    }

    pub fn field_prompt(&self, name: &str) -> String {
        self.field.replace("{name}", name)
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_depth: 24,
            max_nesting: 256,
            max_nodes: 10_000,
            prompts: PromptConfig {
                choice: "Choose an option".into(),
                sequence: "Provide details".into(),
                literal: "Enter {literal}".into(),
                field: "Please provide {name}".into(),
            },
            template: TemplateConfig {
                marker: "TEMPLATE".into(),
                document_hint: "document".into(),
            },
            endpoint_fallback: "/jobs/{name}".into(),
        }
    }
}

/// Project settings file picked up from the directory `qtree` runs in
pub const PROJECT_FILE: &str = "qtree.yaml";

/// Builds a [`CompilerConfig`] from the embedded defaults plus YAML layers.
///
/// Layers apply in the order they are added; later keys win. The result is
/// checked with [`CompilerConfig::validate`] before it is handed out.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    builder: ConfigBuilder<DefaultState>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            builder: Config::builder().add_source(File::from_str(DEFAULT_YAML, FileFormat::Yaml)),
        }
    }

    /// Add a YAML file. A missing `required` file fails the build; a missing
    /// optional one is skipped.
    pub fn layer(mut self, path: impl AsRef<Path>, required: bool) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Yaml)
            .required(required);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Override one dotted key, e.g. `prompts.field`.
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<CompilerConfig, ConfigError> {
        let config: CompilerConfig = self.builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// The embedded defaults, validated.
pub fn load_defaults() -> Result<CompilerConfig, ConfigError> {
    ConfigLoader::new().build()
}

/// Settings as the `qtree` binary resolves them: defaults, then
/// [`PROJECT_FILE`] in `dir` if it exists, then `explicit` (which must exist).
pub fn discover(dir: &Path, explicit: Option<&Path>) -> Result<CompilerConfig, ConfigError> {
    let mut loader = ConfigLoader::new().layer(dir.join(PROJECT_FILE), false);
    if let Some(path) = explicit {
        loader = loader.layer(path, true);
    }
    loader.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixtures() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
    }

    #[test]
    fn test_embedded_defaults_match_default_impl() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config, CompilerConfig::default());
    }

    #[test]
    fn test_supports_overrides() {
        let config = ConfigLoader::new()
            .set_override("max_depth", 3i64)
            .expect("override to apply")
            .set_override("template.marker", "JOB_TEMPLATE")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.template.marker, "JOB_TEMPLATE");
        assert_eq!(config.prompts.choice, "Choose an option");
    }

    #[test]
    fn test_zero_limits_are_rejected() {
        let err = ConfigLoader::new()
            .set_override("max_nodes", 0i64)
            .expect("override to apply")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("max_nodes must be at least 1"));

        let config = CompilerConfig {
            max_nesting: 0,
            ..CompilerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_required_file_fails() {
        let result = ConfigLoader::new()
            .layer("/definitely/not/here.yaml", true)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_discover_without_project_file_gives_defaults() {
        let config = discover(Path::new("/definitely/not/here"), None).expect("config to build");
        assert_eq!(config, CompilerConfig::default());
    }

    #[test]
    fn test_discover_reads_project_file_then_explicit_file() {
        let dir = fixtures();
        let config = discover(&dir, None).expect("config to build");
        assert_eq!(config.prompts.choice, "Pick one");
        assert_eq!(config.max_nodes, 2000);
        assert_eq!(config.prompts.sequence, "Provide details");

        let explicit = dir.join("strict.yaml");
        let config = discover(&dir, Some(explicit.as_path())).expect("config to build");
        assert_eq!(config.prompts.choice, "Pick one");
        assert_eq!(config.max_nodes, 50);

        assert!(discover(&dir, Some(Path::new("/definitely/not/here.yaml"))).is_err());
    }

    #[test]
    fn test_prompt_substitution() {
        let config = CompilerConfig::default();
        assert_eq!(config.prompts.literal_prompt("TEMPLATE"), "Enter TEMPLATE");
        assert_eq!(config.prompts.field_prompt("creditCard"), "Please provide creditCard");
        assert_eq!(config.endpoint_for("payment"), "/jobs/payment");
    }
}
