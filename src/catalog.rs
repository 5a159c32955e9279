//! Endpoint catalog
//!
//! Grammar files describe parameters, not which endpoint a user needs. The
//! catalog supplies that: a table from REST path to grammar production, plus a
//! small routing questionnaire whose answers pick an endpoint.
//!
//! The built-in catalog (`defaults/catalog.default.yaml`) covers the mail
//! submission API. Other APIs load their own with [`EndpointCatalog::from_yaml`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_CATALOG: &str = include_str!("../defaults/catalog.default.yaml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid catalog: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointEntry {
    pub path: String,
    pub production: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTree {
    pub start: String,
    pub questions: BTreeMap<String, RouteQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteQuestion {
    pub question: String,
    pub options: Vec<RouteOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOption {
    pub value: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Where a routing option leads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget<'a> {
    Question(&'a str),
    Endpoint(&'a str),
}

impl RouteOption {
    /// `None` when the option names neither or both targets; [`EndpointCatalog::validate`] rejects those.
    pub fn target(&self) -> Option<RouteTarget<'_>> {
        match (&self.next, &self.endpoint) {
            (Some(next), None) => Some(RouteTarget::Question(next)),
            (None, Some(endpoint)) => Some(RouteTarget::Endpoint(endpoint)),
            _ => None,
        }
    }
}

impl RouteQuestion {
    pub fn option(&self, value: &str) -> Option<&RouteOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

/// Endpoint table plus routing questionnaire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCatalog {
    pub endpoints: Vec<EndpointEntry>,
    pub routing: RoutingTree,
}

impl EndpointCatalog {
    /// Parse and validate a catalog from YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let catalog: EndpointCatalog = serde_yaml::from_str(yaml)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// The built-in mail submission catalog
    pub fn load_defaults() -> Result<Self, CatalogError> {
        Self::from_yaml(DEFAULT_CATALOG)
    }

    pub fn endpoint(&self, path: &str) -> Option<&EndpointEntry> {
        self.endpoints.iter().find(|e| e.path == path)
    }

    /// Production that describes the endpoint at `path`
    pub fn production_for(&self, path: &str) -> Option<&str> {
        self.endpoint(path).map(|e| e.production.as_str())
    }

    /// Endpoint path served by `production`
    pub fn endpoint_for(&self, production: &str) -> Option<&str> {
        self.endpoints
            .iter()
            .find(|e| e.production == production)
            .map(|e| e.path.as_str())
    }

    pub fn question(&self, id: &str) -> Option<&RouteQuestion> {
        self.routing.questions.get(id)
    }

    /// Check that the routing tree only points at known questions and endpoints.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let start = &self.routing.start;
        if !self.routing.questions.contains_key(start) {
            return Err(CatalogError::Invalid(format!(
                "start question '{start}' is not defined"
            )));
        }

        for (id, question) in &self.routing.questions {
            if question.options.is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "question '{id}' has no options"
                )));
            }
            for option in &question.options {
                match option.target() {
                    None => {
                        return Err(CatalogError::Invalid(format!(
                            "option '{}' of question '{id}' must name exactly one of next/endpoint",
                            option.value
                        )))
                    }
                    Some(RouteTarget::Question(next)) if self.question(next).is_none() => {
                        return Err(CatalogError::Invalid(format!(
                            "option '{}' of question '{id}' leads to unknown question '{next}'",
                            option.value
                        )))
                    }
                    Some(RouteTarget::Endpoint(path)) if self.endpoint(path).is_none() => {
                        return Err(CatalogError::Invalid(format!(
                            "option '{}' of question '{id}' leads to unknown endpoint '{path}'",
                            option.value
                        )))
                    }
                    Some(_) => {}
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_loads() {
        let catalog = EndpointCatalog::load_defaults().unwrap();
        assert_eq!(catalog.endpoints.len(), 9);
        assert_eq!(catalog.routing.start, "initial");
        assert_eq!(
            catalog.production_for("/jobs/single-doc-job-template"),
            Some("submitSingleDocWithTemplateParams")
        );
        assert_eq!(
            catalog.endpoint_for("mergeMultiDocParams"),
            Some("/jobs/multi-doc-merge")
        );
        assert_eq!(catalog.production_for("/jobs/unknown"), None);
    }

    #[test]
    fn test_route_targets() {
        let catalog = EndpointCatalog::load_defaults().unwrap();
        let initial = catalog.question("initial").unwrap();
        assert_eq!(
            initial.option("single").unwrap().target(),
            Some(RouteTarget::Question("single_template"))
        );
        let single = catalog.question("single_template").unwrap();
        assert_eq!(
            single.option("no").unwrap().target(),
            Some(RouteTarget::Endpoint("/jobs/single-doc"))
        );
        assert!(initial.option("bogus").is_none());
    }

    const SMALL: &str = r#"
endpoints:
  - path: /a
    production: aParams
routing:
  start: root
  questions:
    root:
      question: Which?
      options:
        - value: a
          label: A
          endpoint: /a
"#;

    #[test]
    fn test_custom_catalog() {
        let catalog = EndpointCatalog::from_yaml(SMALL).unwrap();
        assert_eq!(catalog.endpoints[0].description, "");
        assert_eq!(catalog.production_for("/a"), Some("aParams"));
    }

    #[test]
    fn test_validation_rejects_dangling_targets() {
        let bad_endpoint = SMALL.replace("endpoint: /a", "endpoint: /b");
        let err = EndpointCatalog::from_yaml(&bad_endpoint).unwrap_err();
        assert!(err.to_string().contains("unknown endpoint '/b'"));

        let bad_start = SMALL.replace("start: root", "start: nowhere");
        assert!(matches!(
            EndpointCatalog::from_yaml(&bad_start),
            Err(CatalogError::Invalid(_))
        ));

        let both = SMALL.replace("endpoint: /a", "endpoint: /a\n          next: root");
        let err = EndpointCatalog::from_yaml(&both).unwrap_err();
        assert!(err.to_string().contains("exactly one"));
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            EndpointCatalog::from_yaml("endpoints: [unclosed"),
            Err(CatalogError::Yaml(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            EndpointCatalog::from_yaml_file("/definitely/not/here.yaml"),
            Err(CatalogError::Io { .. })
        ));
    }
}
