//! Compiler facade
//!
//! Ties the pieces together: looks up a production, expands it into a decision
//! tree, runs the template specializer over it and attaches the endpoint
//! metadata from the grammar's use-case headers.

use crate::catalog::EndpointCatalog;
use crate::config::CompilerConfig;
use crate::grammar::Grammar;
use crate::template::{self, TemplateLogic};
use crate::tree::{DecisionNode, Expander, Truncation};
use serde::Serialize;

/// Everything a UI needs to collect parameters for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledEndpoint {
    pub production: String,
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Question from the use-case header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    pub tree: DecisionNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateLogic>,
    /// References that were cut short while building `tree`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub truncations: Vec<Truncation>,
}

/// Compiles productions of one grammar.
pub struct Compiler<'g> {
    grammar: &'g Grammar,
    config: CompilerConfig,
}

impl<'g> Compiler<'g> {
    pub fn new(grammar: &'g Grammar, config: CompilerConfig) -> Self {
        Self { grammar, config }
    }

    pub fn grammar(&self) -> &'g Grammar {
        self.grammar
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile the production `name`. `None` means the grammar does not define it.
    pub fn compile(&self, name: &str) -> Option<CompiledEndpoint> {
        let production = self.grammar.productions().get(name)?;

        let mut expander = Expander::new(
            self.grammar.productions(),
            self.grammar.questions(),
            &self.config,
        );
        let tree = expander.expand_production(&production.name)?;
        let truncations = expander.take_truncations();
        let template = template::specialize(production, &self.config);

        let use_case = self.grammar.use_case(&production.name);
        let endpoint = use_case
            .map(|u| u.endpoint.clone())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| self.config.endpoint_for(&production.name));

        Some(CompiledEndpoint {
            production: production.name.clone(),
            endpoint,
            description: use_case.map(|u| u.description.clone()),
            question: use_case.and_then(|u| u.question.clone()),
            tree,
            template,
            truncations,
        })
    }

    /// Compile the production mapped to `path`, trying the grammar's own
    /// use-case headers before the catalog.
    pub fn compile_path(&self, path: &str, catalog: &EndpointCatalog) -> Option<CompiledEndpoint> {
        let production = self
            .grammar
            .use_case_for_endpoint(path)
            .map(|u| u.production.as_str())
            .or_else(|| catalog.production_for(path))?;

        let mut compiled = self.compile(production)?;
        compiled.endpoint = path.to_string();
        if compiled.description.is_none() {
            compiled.description = catalog
                .endpoint(path)
                .map(|e| e.description.clone())
                .filter(|d| !d.is_empty());
        }
        Some(compiled)
    }

    /// Compile every production that has a use-case header, in source order.
    pub fn compile_use_cases(&self) -> Vec<CompiledEndpoint> {
        self.grammar
            .use_cases()
            .iter()
            .filter_map(|u| self.compile(&u.production))
            .collect()
    }
}
