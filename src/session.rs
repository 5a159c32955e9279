//! Wizard sessions
//!
//! A [`WizardSession`] holds everything one user's walk through the wizard
//! accumulates: the routing answers that led to an endpoint, the compiled
//! parameter tree for it, the template option picked and the parameter values
//! entered so far. The catalog is shared read-only between sessions; nothing
//! else is, so any number of sessions can run side by side.
//!
//! The flow has two phases:
//!
//! 1. Routing: [`WizardSession::choose`] answers routing questions until an
//!    option lands on an endpoint. [`WizardSession::back`] undoes one answer.
//! 2. Parameters: [`WizardSession::load_parameters`] compiles the endpoint's
//!    production, after which template options and answers can be recorded.

use crate::catalog::{EndpointCatalog, RouteQuestion, RouteTarget};
use crate::compiler::{CompiledEndpoint, Compiler};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("routing is finished; endpoint '{0}' was already selected")]
    RoutingFinished(String),
    #[error("question '{question}' has no option '{value}'")]
    UnknownOption { question: String, value: String },
    #[error("no endpoint has been selected yet")]
    NoEndpoint,
    #[error("no grammar production is mapped to endpoint '{0}'")]
    NoMapping(String),
    #[error("parameters have not been loaded")]
    NotLoaded,
    #[error("endpoint '{0}' has no template options")]
    NoTemplate(String),
    #[error("template option {index} is out of range ({count} available)")]
    OptionOutOfRange { index: usize, count: usize },
    #[error("a template option must be chosen first")]
    TemplateOptionRequired,
}

/// One routing answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteStep {
    pub question: String,
    pub value: String,
}

/// Result of answering a routing question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Question(String),
    Endpoint(String),
}

#[derive(Debug, Clone)]
pub struct WizardSession {
    catalog: Arc<EndpointCatalog>,
    current: String,
    route: Vec<RouteStep>,
    endpoint: Option<String>,
    compiled: Option<CompiledEndpoint>,
    template_option: Option<usize>,
    answers: BTreeMap<String, String>,
}

impl WizardSession {
    pub fn new(catalog: Arc<EndpointCatalog>) -> Self {
        let current = catalog.routing.start.clone();
        Self {
            catalog,
            current,
            route: Vec::new(),
            endpoint: None,
            compiled: None,
            template_option: None,
            answers: BTreeMap::new(),
        }
    }

    /// The routing question awaiting an answer, or `None` once an endpoint is selected
    pub fn current_question(&self) -> Option<&RouteQuestion> {
        if self.endpoint.is_some() {
            return None;
        }
        self.catalog.question(&self.current)
    }

    /// Answer the current routing question with the option whose value is `value`.
    pub fn choose(&mut self, value: &str) -> Result<Advance, SessionError> {
        if let Some(endpoint) = &self.endpoint {
            return Err(SessionError::RoutingFinished(endpoint.clone()));
        }
        let unknown = || SessionError::UnknownOption {
            question: self.current.clone(),
            value: value.to_string(),
        };
        let option = self
            .catalog
            .question(&self.current)
            .and_then(|q| q.option(value))
            .ok_or_else(unknown)?;
        let advance = match option.target().ok_or_else(unknown)? {
            RouteTarget::Question(next) => Advance::Question(next.to_string()),
            RouteTarget::Endpoint(path) => Advance::Endpoint(path.to_string()),
        };

        tracing::debug!(question = %self.current, value, "routing answer");
        self.route.push(RouteStep {
            question: self.current.clone(),
            value: value.to_string(),
        });
        match &advance {
            Advance::Question(next) => self.current = next.clone(),
            Advance::Endpoint(path) => self.endpoint = Some(path.clone()),
        }
        Ok(advance)
    }

    /// Undo the last routing answer. Returns `false` at the start question.
    ///
    /// Everything collected for the endpoint being left is discarded.
    pub fn back(&mut self) -> bool {
        let Some(last) = self.route.pop() else {
            return false;
        };
        self.current = last.question;
        self.clear_endpoint();
        true
    }

    /// Number of routing answers given so far
    pub fn step(&self) -> usize {
        self.route.len()
    }

    pub fn route(&self) -> &[RouteStep] {
        &self.route
    }

    /// The selected endpoint path, once routing has finished
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Compile the selected endpoint's production. The result is cached.
    pub fn load_parameters(&mut self, compiler: &Compiler<'_>) -> Result<&CompiledEndpoint, SessionError> {
        let endpoint = self.endpoint.as_deref().ok_or(SessionError::NoEndpoint)?;
        if self.compiled.is_none() {
            let compiled = compiler
                .compile_path(endpoint, &self.catalog)
                .ok_or_else(|| SessionError::NoMapping(endpoint.to_string()))?;
            self.compiled = Some(compiled);
        }
        self.compiled.as_ref().ok_or(SessionError::NotLoaded)
    }

    pub fn compiled(&self) -> Option<&CompiledEndpoint> {
        self.compiled.as_ref()
    }

    pub fn choose_template_option(&mut self, index: usize) -> Result<(), SessionError> {
        let compiled = self.compiled.as_ref().ok_or(SessionError::NotLoaded)?;
        let logic = compiled
            .template
            .as_ref()
            .ok_or_else(|| SessionError::NoTemplate(compiled.endpoint.clone()))?;
        if index >= logic.options.len() {
            return Err(SessionError::OptionOutOfRange {
                index,
                count: logic.options.len(),
            });
        }
        self.template_option = Some(index);
        Ok(())
    }

    pub fn template_option(&self) -> Option<usize> {
        self.template_option
    }

    /// Parameters the caller must supply for the loaded endpoint.
    ///
    /// Template endpoints need a template option first. Other endpoints require
    /// every unconditional, non-optional named step of their tree.
    pub fn required_parameters(&self) -> Result<Vec<String>, SessionError> {
        let compiled = self.compiled.as_ref().ok_or(SessionError::NotLoaded)?;
        if let Some(logic) = &compiled.template {
            let index = self
                .template_option
                .ok_or(SessionError::TemplateOptionRequired)?;
            return logic
                .required_parameters(index)
                .ok_or(SessionError::OptionOutOfRange {
                    index,
                    count: logic.options.len(),
                });
        }

        let mut required: Vec<String> = Vec::new();
        for step in compiled.tree.parameter_steps() {
            if step.optional || !step.via.is_empty() {
                continue;
            }
            if let Some(name) = step.name {
                if !required.contains(&name) {
                    required.push(name);
                }
            }
        }
        Ok(required)
    }

    /// Required parameters with no recorded answer yet
    pub fn missing_parameters(&self) -> Result<Vec<String>, SessionError> {
        Ok(self
            .required_parameters()?
            .into_iter()
            .filter(|name| !self.answers.contains_key(name))
            .collect())
    }

    /// Record (or replace) the answer for `name`
    pub fn record_answer(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.answers.insert(name.into(), value.into());
    }

    pub fn answers(&self) -> &BTreeMap<String, String> {
        &self.answers
    }

    /// Start over from the first routing question
    pub fn reset(&mut self) {
        self.current = self.catalog.routing.start.clone();
        self.route.clear();
        self.clear_endpoint();
    }

    fn clear_endpoint(&mut self) {
        self.endpoint = None;
        self.compiled = None;
        self.template_option = None;
        self.answers.clear();
    }
}
