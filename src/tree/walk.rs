//! Tree walking helpers
//!
//! Consumers that render a form one control at a time want a flat list rather
//! than a tree. [`DecisionNode::parameter_steps`] produces that list in
//! depth-first order. Each step records the option labels that lead to it so a
//! UI can hide steps belonging to branches the user did not pick.

use super::node::{DecisionNode, FieldNode, FieldType};
use serde::Serialize;

/// One control in a flattened parameter-collection flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterStep {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub prompt: String,
    /// `None` for choice steps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    pub optional: bool,
    pub repeatable: bool,
    /// Option labels for choice steps, empty otherwise
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    /// Option labels picked on the way to this step, outermost first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub via: Vec<String>,
}

impl DecisionNode {
    /// Every field node, depth-first
    pub fn fields(&self) -> Vec<&FieldNode> {
        let mut out = Vec::new();
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node {
                DecisionNode::Field(field) => out.push(field),
                other => pending.extend(other.children().into_iter().rev()),
            }
        }
        out
    }

    /// Total number of nodes, including this one
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children());
        }
        count
    }

    /// Length of the longest path from this node to a leaf, counting nodes
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((node, level)) = pending.pop() {
            deepest = deepest.max(level);
            pending.extend(node.children().into_iter().map(|child| (child, level + 1)));
        }
        deepest
    }

    /// Flatten the tree into choice and field steps.
    ///
    /// Sequences contribute no step of their own, but their `optional` and
    /// `repeatable` flags carry down to every step beneath them.
    pub fn parameter_steps(&self) -> Vec<ParameterStep> {
        let mut steps = Vec::new();
        // Children are pushed in reverse so they pop in tree order.
        let mut pending = vec![(self, Inherited::default(), Vec::new())];
        while let Some((node, inherited, via)) = pending.pop() {
            let flags = inherited.with(node);
            match node {
                DecisionNode::Field(field) => steps.push(ParameterStep {
                    name: field.name.clone(),
                    prompt: field.prompt.clone(),
                    field_type: Some(field.field_type),
                    optional: flags.optional,
                    repeatable: flags.repeatable,
                    choices: Vec::new(),
                    via,
                }),
                DecisionNode::Sequence(seq) => {
                    for step in seq.steps.iter().rev() {
                        pending.push((step, flags, via.clone()));
                    }
                }
                DecisionNode::Choice(choice) => {
                    for option in choice.options.iter().rev() {
                        if let Some(follow_up) = option.follow_up.as_deref() {
                            let mut path = via.clone();
                            path.push(option.label.clone());
                            pending.push((follow_up, flags, path));
                        }
                    }
                    steps.push(ParameterStep {
                        name: choice.name.clone(),
                        prompt: choice.prompt.clone(),
                        field_type: None,
                        optional: flags.optional,
                        repeatable: flags.repeatable,
                        choices: choice.options.iter().map(|o| o.label.clone()).collect(),
                        via,
                    });
                }
            }
        }
        steps
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Inherited {
    optional: bool,
    repeatable: bool,
}

impl Inherited {
    fn with(self, node: &DecisionNode) -> Self {
        Self {
            optional: self.optional || node.is_optional(),
            repeatable: self.repeatable || node.is_repeatable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::node::OptionEdge;

    fn sample() -> DecisionNode {
        let mut tags = DecisionNode::named_field("tags", "Any tags?");
        tags.mark_repeatable();
        let mut details = DecisionNode::sequence("Provide details", vec![tags]);
        details.mark_optional();
        DecisionNode::sequence(
            "Submit",
            vec![
                DecisionNode::choice(
                    "How will payment be handled?",
                    vec![
                        OptionEdge::literal("TEMPLATE"),
                        OptionEdge::reference(
                            "creditCard",
                            DecisionNode::named_field("creditCard", "Card number?"),
                        ),
                    ],
                ),
                details,
            ],
        )
    }

    #[test]
    fn test_counts() {
        let tree = sample();
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.depth(), 3);
        assert_eq!(DecisionNode::field("x").depth(), 1);
        let names: Vec<_> = tree.fields().iter().map(|f| f.name.as_deref()).collect();
        assert_eq!(names, vec![Some("creditCard"), Some("tags")]);
    }

    #[test]
    fn test_parameter_steps() {
        let steps = sample().parameter_steps();
        assert_eq!(steps.len(), 3);

        assert_eq!(steps[0].prompt, "How will payment be handled?");
        assert_eq!(steps[0].field_type, None);
        assert_eq!(steps[0].choices, vec!["TEMPLATE", "creditCard"]);

        assert_eq!(steps[1].name.as_deref(), Some("creditCard"));
        assert_eq!(steps[1].field_type, Some(FieldType::CreditCard));
        assert_eq!(steps[1].via, vec!["creditCard"]);

        assert_eq!(steps[2].name.as_deref(), Some("tags"));
        assert!(steps[2].optional, "optional flag inherited from the sequence");
        assert!(steps[2].repeatable);
        assert!(steps[2].via.is_empty());
    }

    #[test]
    fn test_deep_tree_walks_without_recursion() {
        let levels = 50_000;
        let mut tree = DecisionNode::named_field("leaf", "Leaf?");
        for _ in 0..levels {
            tree = DecisionNode::sequence("Provide details", vec![tree]);
        }
        assert_eq!(tree.node_count(), levels + 1);
        assert_eq!(tree.depth(), levels + 1);
        assert_eq!(tree.fields().len(), 1);
        assert_eq!(tree.parameter_steps().len(), 1);
        // Dismantle level by level so dropping stays shallow too.
        while let DecisionNode::Sequence(mut seq) = tree {
            tree = seq.steps.pop().unwrap_or_else(|| DecisionNode::field("x"));
        }
    }
}
