//! Decision tree nodes
//!
//! A compiled production is a tree of three node kinds:
//!
//! - [`ChoiceNode`]: pick one of several options (from an alternation)
//! - [`SequenceNode`]: answer every step in order (from a sequence)
//! - [`FieldNode`]: enter one value (from a literal or an unresolved identifier)
//!
//! Any node may additionally be `optional` (it came from `[ ]`) or
//! `repeatable` (it came from `{ }`). Nodes expanded from an identifier carry
//! that identifier as their `name`, which is what a UI keys its answers by.

use serde::{Deserialize, Serialize};

/// One step of a parameter-collection flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DecisionNode {
    Choice(ChoiceNode),
    Sequence(SequenceNode),
    Field(FieldNode),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceNode {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub options: Vec<OptionEdge>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub repeatable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceNode {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub steps: Vec<DecisionNode>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub repeatable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNode {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub repeatable: bool,
}

/// One option of a [`ChoiceNode`].
///
/// Literal options are complete answers. Every other option leads to a follow-up subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEdge {
    pub label: String,
    #[serde(default)]
    pub literal_answer: Option<String>,
    #[serde(default)]
    pub follow_up: Option<Box<DecisionNode>>,
}

impl OptionEdge {
    /// A literal answer with no follow-up
    pub fn literal(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            literal_answer: Some(value),
            follow_up: None,
        }
    }

    /// A non-literal option leading to `follow_up`
    pub fn reference(label: impl Into<String>, follow_up: DecisionNode) -> Self {
        Self {
            label: label.into(),
            literal_answer: None,
            follow_up: Some(Box::new(follow_up)),
        }
    }

    pub fn is_literal(&self) -> bool {
        self.literal_answer.is_some()
    }
}

/// Kind of value a [`FieldNode`] collects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    String,
    Address,
    Email,
    Url,
    Id,
    Number,
    CreditCard,
}

impl FieldType {
    /// Guess the field type from a parameter name.
    pub fn infer(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("address") {
            FieldType::Address
        } else if lower.contains("email") {
            FieldType::Email
        } else if lower.contains("url") {
            FieldType::Url
        } else if lower.contains("credit") && lower.contains("card") {
            FieldType::CreditCard
        } else if lower.ends_with("id") {
            FieldType::Id
        } else if lower.contains("number") || lower.contains("integer") || lower.contains("count") {
            FieldType::Number
        } else {
            FieldType::String
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Address => "address",
            FieldType::Email => "email",
            FieldType::Url => "url",
            FieldType::Id => "id",
            FieldType::Number => "number",
            FieldType::CreditCard => "credit_card",
        }
    }
}

impl DecisionNode {
    /// A string field with no name
    pub fn field(prompt: impl Into<String>) -> Self {
        DecisionNode::Field(FieldNode {
            prompt: prompt.into(),
            name: None,
            field_type: FieldType::String,
            optional: false,
            repeatable: false,
        })
    }

    /// A field for the parameter `name`, typed from the name
    pub fn named_field(name: &str, prompt: impl Into<String>) -> Self {
        DecisionNode::Field(FieldNode {
            prompt: prompt.into(),
            name: Some(name.to_string()),
            field_type: FieldType::infer(name),
            optional: false,
            repeatable: false,
        })
    }

    pub fn choice(prompt: impl Into<String>, options: Vec<OptionEdge>) -> Self {
        DecisionNode::Choice(ChoiceNode {
            prompt: prompt.into(),
            name: None,
            options,
            optional: false,
            repeatable: false,
        })
    }

    pub fn sequence(prompt: impl Into<String>, steps: Vec<DecisionNode>) -> Self {
        DecisionNode::Sequence(SequenceNode {
            prompt: prompt.into(),
            name: None,
            steps,
            optional: false,
            repeatable: false,
        })
    }

    /// "choice", "sequence" or "field"
    pub fn kind(&self) -> &'static str {
        match self {
            DecisionNode::Choice(_) => "choice",
            DecisionNode::Sequence(_) => "sequence",
            DecisionNode::Field(_) => "field",
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            DecisionNode::Choice(n) => &n.prompt,
            DecisionNode::Sequence(n) => &n.prompt,
            DecisionNode::Field(n) => &n.prompt,
        }
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        let prompt = prompt.into();
        match self {
            DecisionNode::Choice(n) => n.prompt = prompt,
            DecisionNode::Sequence(n) => n.prompt = prompt,
            DecisionNode::Field(n) => n.prompt = prompt,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            DecisionNode::Choice(n) => n.name.as_deref(),
            DecisionNode::Sequence(n) => n.name.as_deref(),
            DecisionNode::Field(n) => n.name.as_deref(),
        }
    }

    /// Set the name unless the node already has one; inner names are more specific.
    pub fn name_if_unnamed(&mut self, name: &str) {
        let slot = match self {
            DecisionNode::Choice(n) => &mut n.name,
            DecisionNode::Sequence(n) => &mut n.name,
            DecisionNode::Field(n) => &mut n.name,
        };
        if slot.is_none() {
            *slot = Some(name.to_string());
        }
    }

    pub fn is_optional(&self) -> bool {
        match self {
            DecisionNode::Choice(n) => n.optional,
            DecisionNode::Sequence(n) => n.optional,
            DecisionNode::Field(n) => n.optional,
        }
    }

    pub fn is_repeatable(&self) -> bool {
        match self {
            DecisionNode::Choice(n) => n.repeatable,
            DecisionNode::Sequence(n) => n.repeatable,
            DecisionNode::Field(n) => n.repeatable,
        }
    }

    pub fn mark_optional(&mut self) {
        match self {
            DecisionNode::Choice(n) => n.optional = true,
            DecisionNode::Sequence(n) => n.optional = true,
            DecisionNode::Field(n) => n.optional = true,
        }
    }

    pub fn mark_repeatable(&mut self) {
        match self {
            DecisionNode::Choice(n) => n.repeatable = true,
            DecisionNode::Sequence(n) => n.repeatable = true,
            DecisionNode::Field(n) => n.repeatable = true,
        }
    }

    /// Direct children: sequence steps, or the follow-ups of a choice's options
    pub fn children(&self) -> Vec<&DecisionNode> {
        match self {
            DecisionNode::Choice(n) => n
                .options
                .iter()
                .filter_map(|o| o.follow_up.as_deref())
                .collect(),
            DecisionNode::Sequence(n) => n.steps.iter().collect(),
            DecisionNode::Field(_) => Vec::new(),
        }
    }
}
