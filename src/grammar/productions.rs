//! Production table construction
//!
//! Splits grammar text into `name = rhs ;` statements. Statements end at a `;`
//! outside quotes, so right-hand sides may span several lines. Comments are
//! removed first with [`strip_comments`]; question directives have already been
//! harvested from the raw text by the question extractor at that point.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

/// `(* ... *)` comments, possibly spanning lines
static COMMENT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\(\*.*?\*\)").unwrap());

/// `name = rhs` inside one statement
static DEFINITION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*)").unwrap());

/// A named grammar rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Production {
    pub name: String,
    /// Right-hand side without the terminating `;`, trimmed
    pub rhs: String,
    /// 1-based line on which the name appears
    pub line: usize,
}

/// Productions keyed by name, remembering declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductionTable {
    by_name: HashMap<String, Production>,
    order: Vec<String>,
    overridden: Vec<Production>,
}

impl ProductionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a production. A redefinition replaces the earlier rule but keeps its
    /// position in declaration order; the replaced rule is remembered.
    pub fn insert(&mut self, production: Production) {
        let name = production.name.clone();
        match self.by_name.insert(name.clone(), production) {
            Some(previous) => self.overridden.push(previous),
            None => self.order.push(name),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Production> {
        self.by_name.get(name.trim())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name.trim())
    }

    /// Right-hand side of `name`, if defined
    pub fn rhs(&self, name: &str) -> Option<&str> {
        self.get(name).map(|p| p.rhs.as_str())
    }

    /// Productions in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Production> {
        self.order.iter().filter_map(|name| self.by_name.get(name))
    }

    /// Production names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Rules replaced by a later definition with the same name
    pub fn overridden(&self) -> &[Production] {
        &self.overridden
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Remove every `(* ... *)` comment, replacing it with the newlines it contained
/// so line numbers computed on the result still match the source.
pub fn strip_comments(text: &str) -> String {
    COMMENT_REGEX
        .replace_all(text, |caps: &regex::Captures| {
            "\n".repeat(caps[0].matches('\n').count())
        })
        .into_owned()
}

/// Build the production table from grammar text that has had its comments removed.
pub fn split_productions(text: &str) -> ProductionTable {
    let mut table = ProductionTable::new();

    for (offset, statement) in statements(text) {
        let Some(caps) = DEFINITION_REGEX.captures(statement) else {
            continue;
        };
        let (Some(name), Some(rhs)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let line = line_of(text, offset + name.start());
        table.insert(Production {
            name: name.as_str().to_string(),
            rhs: rhs.as_str().trim().to_string(),
            line,
        });
    }

    table
}

/// Split `text` at every `;` outside quotes, yielding each statement with its byte offset.
/// Trailing text with no terminator is not a statement.
fn statements(text: &str) -> Vec<(usize, &str)> {
    let mut result = Vec::new();
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, ';') => {
                result.push((start, &text[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }

    result
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}
