//! Grammar loading
//!
//! A [`Grammar`] is everything recovered from one grammar file: the question
//! annotations, the production table and the use-case headers. It is built once
//! and never mutated afterwards, so any number of compilers or sessions can
//! read from it.
//!
//! # Pipeline
//!
//! 1. [`questions::extract_questions`] scans the raw text line by line
//! 2. [`use_cases::extract_use_cases`] reads the endpoint header blocks
//! 3. [`productions::strip_comments`] removes every comment
//! 4. [`productions::split_productions`] builds the production table
//!
//! Only reading the file can fail. Redefinitions are accepted (the later one
//! wins) and reported as [`Diagnostic`]s.

pub mod expression;
pub mod productions;
pub mod questions;
pub mod use_cases;

pub use expression::{normalize, split_top, strip_wrapping, Expr};
pub use productions::{Production, ProductionTable};
pub use questions::{QuestionAnnotation, QuestionTable};
pub use use_cases::UseCase;

use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a grammar
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("failed to read grammar '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    DuplicateProduction,
    DuplicateQuestion,
}

/// A non-fatal observation about the grammar source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub name: String,
    /// Line of the definition that was replaced
    pub line: usize,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::DuplicateProduction => write!(
                f,
                "production '{}' defined on line {} is redefined later",
                self.name, self.line
            ),
            DiagnosticKind::DuplicateQuestion => write!(
                f,
                "question for '{}' on line {} is replaced by a later directive",
                self.name, self.line
            ),
        }
    }
}

/// Parsed grammar: questions, productions and use-case metadata.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    questions: QuestionTable,
    productions: ProductionTable,
    use_cases: Vec<UseCase>,
    diagnostics: Vec<Diagnostic>,
}

impl Grammar {
    /// Parse grammar text. Never fails; see the module docs.
    pub fn parse(text: &str) -> Self {
        let questions = questions::extract_questions(text);
        let use_cases = use_cases::extract_use_cases(text);
        let productions = productions::split_productions(&productions::strip_comments(text));

        let mut diagnostics = Vec::new();
        for replaced in productions.overridden() {
            tracing::warn!(
                production = %replaced.name,
                line = replaced.line,
                "duplicate production, later definition wins"
            );
            diagnostics.push(Diagnostic {
                kind: DiagnosticKind::DuplicateProduction,
                name: replaced.name.clone(),
                line: replaced.line,
            });
        }
        for replaced in questions.overridden() {
            tracing::warn!(
                parameter = %replaced.parameter,
                line = replaced.line,
                "duplicate question annotation, later directive wins"
            );
            diagnostics.push(Diagnostic {
                kind: DiagnosticKind::DuplicateQuestion,
                name: replaced.parameter.clone(),
                line: replaced.line,
            });
        }

        Self {
            questions,
            productions,
            use_cases,
            diagnostics,
        }
    }

    /// Read and parse a grammar file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GrammarError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| GrammarError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let grammar = Self::parse(&text);
        tracing::info!(
            path = %path.display(),
            productions = grammar.productions.len(),
            questions = grammar.questions.len(),
            use_cases = grammar.use_cases.len(),
            "loaded grammar"
        );
        Ok(grammar)
    }

    pub fn questions(&self) -> &QuestionTable {
        &self.questions
    }

    pub fn productions(&self) -> &ProductionTable {
        &self.productions
    }

    /// Use-case headers in source order
    pub fn use_cases(&self) -> &[UseCase] {
        &self.use_cases
    }

    /// Header for the production `name`, if it has one
    pub fn use_case(&self, name: &str) -> Option<&UseCase> {
        self.use_cases.iter().find(|u| u.production == name)
    }

    /// Header whose endpoint path is `path`
    pub fn use_case_for_endpoint(&self, path: &str) -> Option<&UseCase> {
        self.use_cases.iter().find(|u| u.endpoint == path)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
(*
  Use Case 7: Pay for a job
  Endpoint: /jobs/pay
*)
payment = "TEMPLATE" | creditCard ; (* Question: How will payment be handled? *)
creditCard = cardNumber + [ cvv ] ; (* internal note *)
"#;

    #[test]
    fn test_parse_collects_all_tables() {
        let grammar = Grammar::parse(SOURCE);
        assert_eq!(grammar.productions().len(), 2);
        assert_eq!(grammar.productions().rhs("creditCard"), Some("cardNumber + [ cvv ]"));
        assert_eq!(
            grammar.questions().text("payment"),
            Some("How will payment be handled?")
        );
        assert_eq!(grammar.use_case("payment").unwrap().endpoint, "/jobs/pay");
        assert_eq!(
            grammar.use_case_for_endpoint("/jobs/pay").unwrap().production,
            "payment"
        );
        assert!(grammar.diagnostics().is_empty());
    }

    #[test]
    fn test_duplicates_are_reported() {
        let grammar = Grammar::parse(
            "a = x ; (* Question: One *)\na = y ; (* Question: Two *)\n",
        );
        assert_eq!(grammar.productions().rhs("a"), Some("y"));
        assert_eq!(grammar.questions().text("a"), Some("Two"));
        let kinds: Vec<_> = grammar.diagnostics().iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::DuplicateProduction, DiagnosticKind::DuplicateQuestion]
        );
        assert_eq!(
            grammar.diagnostics()[0].to_string(),
            "production 'a' defined on line 1 is redefined later"
        );
    }

    #[test]
    fn test_load_missing_file_is_fatal() {
        let err = Grammar::load("/definitely/not/here.ebnf").unwrap_err();
        match &err {
            GrammarError::Io { path, .. } => {
                assert_eq!(path, Path::new("/definitely/not/here.ebnf"))
            }
        }
        assert!(err.to_string().contains("/definitely/not/here.ebnf"));
    }
}
