//! # qtree
//!
//! Compiles question-annotated EBNF grammars into decision trees that drive
//! step-by-step parameter-collection wizards.
//!
//! Grammar authors document parameters with comment directives:
//!
//! ```text
//! payment = "TEMPLATE" | creditCard ; (* Question: How will payment be handled? *)
//! ```
//!
//! and the compiler turns each production into a tree of choices, sequences
//! and fields, each carrying the question a UI should ask.
//!
//! ## Layout
//!
//! - [`grammar`]: question extraction, production table, expression normalizer
//! - [`tree`]: decision tree model and the expander that builds it
//! - [`template`]: job-template option analysis for marker-literal alternations
//! - [`compiler`]: one-call facade producing a [`CompiledEndpoint`]
//! - [`catalog`]: endpoint-to-production table and routing questionnaire
//! - [`session`]: per-user wizard state
//! - [`config`]: prompt wording, template marker and depth limit
//! - [`formats`]: json, yaml and treeviz renderings
//!
//! ## Example
//!
//! ```text
//! let grammar = Grammar::load("mail_api.ebnf")?;
//! let compiler = Compiler::new(&grammar, config::load_defaults()?);
//! let compiled = compiler.compile("payment").expect("production exists");
//! println!("{}", formats::to_treeviz_str(&compiled));
//! ```

pub mod catalog;
pub mod compiler;
pub mod config;
pub mod formats;
pub mod grammar;
pub mod session;
pub mod template;
pub mod tree;

pub use catalog::EndpointCatalog;
pub use compiler::{CompiledEndpoint, Compiler};
pub use config::CompilerConfig;
pub use grammar::{Grammar, GrammarError};
pub use session::WizardSession;
pub use template::{TemplateLogic, TemplateOption};
pub use tree::{DecisionNode, FieldType, OptionEdge};
