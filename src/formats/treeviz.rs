//! Treeviz formatter for decision trees
//!
//! One line per node, nesting shown with box-drawing connectors and two
//! columns per level:
//!
//! ```text
//! payment -> /jobs/payment
//! ├─ choice: How will payment be handled?
//! │ ├─ literal: TEMPLATE
//! │ └─ option: creditCard
//! │   └─ field: Please provide creditCard <credit_card>
//! └─ template: 2 options
//!   ├─ option: Template provides: creditCard
//!   └─ option: Template provides: job options only (you provide: creditCard)
//! ```
//!
//! Node lines end with `[optional]` and `[repeatable]` when those flags are set.
//! Template options that need a follow-up document question end with
//! `[document choice]`.

use super::registry::{FormatError, Formatter};
use crate::compiler::CompiledEndpoint;
use crate::template::TemplateLogic;
use crate::tree::{DecisionNode, OptionEdge};

const MAX_LABEL: usize = 72;

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

/// A line plus the lines nested under it
struct Entry {
    text: String,
    children: Vec<Entry>,
}

impl Entry {
    fn leaf(text: String) -> Self {
        Self {
            text,
            children: Vec::new(),
        }
    }
}

pub fn to_treeviz_str(compiled: &CompiledEndpoint) -> String {
    let mut roots = vec![node_entry(&compiled.tree)];
    if let Some(logic) = &compiled.template {
        roots.push(template_entry(logic));
    }
    for truncation in &compiled.truncations {
        roots.push(Entry::leaf(format!(
            "truncated: {} ({})",
            truncate(&truncation.production, MAX_LABEL),
            truncation.reason.as_str()
        )));
    }

    let mut result = format!("{} -> {}\n", compiled.production, compiled.endpoint);
    append_entries(&mut result, &roots, "");
    result
}

fn append_entries(result: &mut String, entries: &[Entry], prefix: &str) {
    for (i, entry) in entries.iter().enumerate() {
        let is_last = i == entries.len() - 1;
        let connector = if is_last { "└─" } else { "├─" };
        result.push_str(&format!("{}{} {}\n", prefix, connector, entry.text));

        let new_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
        append_entries(result, &entry.children, &new_prefix);
    }
}

fn node_entry(node: &DecisionNode) -> Entry {
    let label = match node {
        DecisionNode::Field(field) => format!("{} <{}>", field.prompt, field.field_type.as_str()),
        other => other.prompt().to_string(),
    };
    let mut text = format!("{}: {}", node.kind(), truncate(&label, MAX_LABEL));
    if node.is_optional() {
        text.push_str(" [optional]");
    }
    if node.is_repeatable() {
        text.push_str(" [repeatable]");
    }

    let children = match node {
        DecisionNode::Choice(choice) => choice.options.iter().map(option_entry).collect(),
        DecisionNode::Sequence(seq) => seq.steps.iter().map(node_entry).collect(),
        DecisionNode::Field(_) => Vec::new(),
    };
    Entry { text, children }
}

fn option_entry(option: &OptionEdge) -> Entry {
    let label = truncate(&option.label, MAX_LABEL);
    match option.follow_up.as_deref() {
        Some(follow_up) if !option.is_literal() => Entry {
            text: format!("option: {label}"),
            children: vec![node_entry(follow_up)],
        },
        _ => Entry::leaf(format!("literal: {label}")),
    }
}

fn template_entry(logic: &TemplateLogic) -> Entry {
    let mut text = format!("template: {} options", logic.options.len());
    if logic.optional {
        text.push_str(" [optional]");
    }

    let mut children = Vec::new();
    if !logic.always_required.is_empty() {
        children.push(Entry::leaf(format!(
            "required: {}",
            logic.always_required.join(", ")
        )));
    }
    for option in &logic.options {
        let mut line = format!("option: {}", truncate(&option.label(), MAX_LABEL));
        if option.requires_document_choice {
            line.push_str(" [document choice]");
        }
        children.push(Entry::leaf(line));
    }
    Entry { text, children }
}

pub struct TreevizFormatter;

impl Formatter for TreevizFormatter {
    fn name(&self) -> &'static str {
        "treeviz"
    }

    fn render(&self, compiled: &CompiledEndpoint) -> Result<String, FormatError> {
        Ok(to_treeviz_str(compiled))
    }

    fn description(&self) -> &'static str {
        "Tree visualization with one node per line"
    }
}
