//! Tree expansion
//!
//! Turns a production's right-hand side into a [`DecisionNode`] by normalizing
//! one level at a time and recursing into operands:
//!
//! | Expression         | Node                                               |
//! |--------------------|----------------------------------------------------|
//! | `a \| b`           | `Choice`, one option per alternative                |
//! | `a + b`            | `Sequence`, one step per operand                    |
//! | `[ a ]`            | node for `a`, marked optional                       |
//! | `{ a }`            | node for `a`, marked repeatable                     |
//! | `( a )`            | node for `a`                                        |
//! | `"lit"`            | string `Field` prompting "Enter lit"                |
//! | known production   | expansion of its right-hand side                    |
//! | anything else      | `Field` for the identifier                          |
//!
//! Prompts come from the question table. A node expanded from a production
//! inherits the production's question unless the expansion already found a more
//! specific one. Otherwise the configured fallback prompt is used, so prompts
//! are never empty. A non-literal option is labelled with the question
//! registered for its text, if any.
//!
//! Expansion never fails and always terminates. Three limits from
//! [`CompilerConfig`] turn the remaining work into a terminal field and record
//! a [`Truncation`]:
//!
//! - `max_depth`: length of the production reference chain (plus cycles,
//!   which are cut on first re-entry)
//! - `max_nesting`: expansion frames for one tree, so deeply bracketed input
//!   cannot exhaust the stack
//! - `max_nodes`: nodes built for one tree, so productions shared at many
//!   levels cannot grow the tree exponentially

use super::node::DecisionNode;
use super::node::OptionEdge;
use crate::config::CompilerConfig;
use crate::grammar::expression::{is_identifier, literal_value, token_name};
use crate::grammar::{normalize, Expr, ProductionTable, QuestionTable};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TruncationReason {
    /// The production references itself, directly or through others
    Cycle,
    /// The reference chain exceeded `max_depth`
    Depth,
    /// Bracket nesting exceeded `max_nesting`
    Nesting,
    /// The tree reached `max_nodes`
    Budget,
}

impl TruncationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TruncationReason::Cycle => "cycle",
            TruncationReason::Depth => "depth limit",
            TruncationReason::Nesting => "nesting limit",
            TruncationReason::Budget => "node budget",
        }
    }
}

/// A reference or fragment that was not expanded.
///
/// For cycles and depth trips `production` is the reference that was cut. For
/// nesting and budget trips it is the production being expanded at the time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Truncation {
    pub production: String,
    pub reason: TruncationReason,
}

/// A node plus whether its prompt came from a question directive.
struct Expanded {
    node: DecisionNode,
    questioned: bool,
}

/// Expands productions into decision trees.
///
/// One expander serves any number of calls. Limits apply per call; the
/// reference stack is empty between calls, while truncations accumulate until
/// taken.
pub struct Expander<'g> {
    productions: &'g ProductionTable,
    questions: &'g QuestionTable,
    config: &'g CompilerConfig,
    stack: Vec<String>,
    nesting: usize,
    built: usize,
    truncations: Vec<Truncation>,
}

impl<'g> Expander<'g> {
    pub fn new(
        productions: &'g ProductionTable,
        questions: &'g QuestionTable,
        config: &'g CompilerConfig,
    ) -> Self {
        Self {
            productions,
            questions,
            config,
            stack: Vec::new(),
            nesting: 0,
            built: 0,
            truncations: Vec::new(),
        }
    }

    /// Expand the production `name`, or `None` if the grammar does not define it.
    pub fn expand_production(&mut self, name: &str) -> Option<DecisionNode> {
        let name = name.trim();
        if !self.productions.contains(name) {
            return None;
        }
        self.built = 0;
        Some(self.expand(name).node)
    }

    /// Expand an arbitrary expression against the grammar.
    pub fn expand_expression(&mut self, text: &str) -> DecisionNode {
        self.built = 0;
        self.expand(text).node
    }

    pub fn truncations(&self) -> &[Truncation] {
        &self.truncations
    }

    /// Take the truncations recorded so far, leaving the list empty
    pub fn take_truncations(&mut self) -> Vec<Truncation> {
        std::mem::take(&mut self.truncations)
    }

    fn expand(&mut self, text: &str) -> Expanded {
        if self.nesting >= self.config.max_nesting {
            return self.truncate(text, TruncationReason::Nesting);
        }
        if self.built >= self.config.max_nodes {
            return self.truncate(text, TruncationReason::Budget);
        }

        self.nesting += 1;
        let expanded = self.expand_level(text);
        self.nesting -= 1;
        expanded
    }

    fn expand_level(&mut self, text: &str) -> Expanded {
        match normalize(text) {
            Expr::Empty => {
                let node = DecisionNode::sequence(self.config.prompts.sequence.clone(), Vec::new());
                self.counted(node, false)
            }
            Expr::Alternation(alternatives) => self.expand_alternation(text, &alternatives),
            Expr::Sequence(items) => self.expand_sequence(text, &items),
            Expr::Optional(inner) => {
                let mut expanded = self.expand(inner);
                expanded.node.mark_optional();
                expanded
            }
            Expr::Repeat(inner) => {
                let mut expanded = self.expand(inner);
                expanded.node.mark_repeatable();
                expanded
            }
            Expr::Group(inner) => self.expand(inner),
            Expr::Literal(value) => {
                let node = DecisionNode::field(self.config.prompts.literal_prompt(value));
                self.counted(node, false)
            }
            Expr::Identifier(ident) => self.expand_identifier(ident),
        }
    }

    fn expand_alternation(&mut self, text: &str, alternatives: &[&str]) -> Expanded {
        let options = alternatives
            .iter()
            .map(|alt| match literal_value(alt) {
                Some(value) => OptionEdge::literal(value),
                None => {
                    let follow_up = self.expand(alt).node;
                    let label = self.questions.text(alt).unwrap_or(*alt).to_string();
                    OptionEdge::reference(label, follow_up)
                }
            })
            .collect();

        let (prompt, questioned) = self.prompt_for(&[text], &self.config.prompts.choice);
        self.counted(DecisionNode::choice(prompt, options), questioned)
    }

    fn expand_sequence(&mut self, text: &str, items: &[&str]) -> Expanded {
        let steps = items.iter().map(|item| self.expand(item).node).collect();

        let joined = items
            .iter()
            .map(|item| token_name(item))
            .collect::<Vec<_>>()
            .join("+");
        let (prompt, questioned) =
            self.prompt_for(&[joined.as_str(), text], &self.config.prompts.sequence);
        self.counted(DecisionNode::sequence(prompt, steps), questioned)
    }

    fn expand_identifier(&mut self, ident: &str) -> Expanded {
        let productions = self.productions;
        let Some(production) = productions.get(ident) else {
            return self.terminal(ident);
        };

        if self.stack.iter().any(|open| open == ident) {
            return self.truncate(ident, TruncationReason::Cycle);
        }
        if self.stack.len() >= self.config.max_depth {
            return self.truncate(ident, TruncationReason::Depth);
        }

        self.stack.push(ident.to_string());
        let mut expanded = self.expand(&production.rhs);
        self.stack.pop();

        if !expanded.questioned {
            if let Some(question) = self.questions.text(ident) {
                expanded.node.set_prompt(question);
                expanded.questioned = true;
            }
        }
        expanded.node.name_if_unnamed(ident);
        if self.questions.is_optional(ident) {
            expanded.node.mark_optional();
        }
        expanded
    }

    /// A field for text that is not (or will not be) expanded further.
    fn terminal(&mut self, text: &str) -> Expanded {
        let text = text.trim();
        let questioned = self.questions.get(text).is_some();
        let prompt = match self.questions.text(text) {
            Some(question) => question.to_string(),
            None => self.config.prompts.field_prompt(text),
        };

        let mut node = if is_identifier(text) {
            DecisionNode::named_field(text, prompt)
        } else {
            DecisionNode::field(prompt)
        };
        if self.questions.is_optional(text) {
            node.mark_optional();
        }
        self.counted(node, questioned)
    }

    fn truncate(&mut self, text: &str, reason: TruncationReason) -> Expanded {
        let production = match reason {
            TruncationReason::Cycle | TruncationReason::Depth => text.trim().to_string(),
            TruncationReason::Nesting | TruncationReason::Budget => match self.stack.last() {
                Some(open) => open.clone(),
                None => text.trim().to_string(),
            },
        };
        let truncation = Truncation { production, reason };
        if !self.truncations.contains(&truncation) {
            tracing::debug!(
                production = %truncation.production,
                reason = truncation.reason.as_str(),
                references = self.stack.len(),
                nesting = self.nesting,
                nodes = self.built,
                "truncating expansion"
            );
            self.truncations.push(truncation);
        }
        self.terminal(text)
    }

    fn counted(&mut self, node: DecisionNode, questioned: bool) -> Expanded {
        self.built += 1;
        Expanded { node, questioned }
    }

    /// First registered question among `keys`, else `fallback`.
    fn prompt_for(&self, keys: &[&str], fallback: &str) -> (String, bool) {
        keys.iter()
            .find_map(|key| self.questions.text(key))
            .map(|q| (q.to_string(), true))
            .unwrap_or_else(|| (fallback.to_string(), false))
    }
}
