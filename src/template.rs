//! Template-logic specialization
//!
//! Several endpoints accept a job template that can stand in for some of their
//! parameters. Grammar authors express this with a marker literal alternated
//! with the parameter it replaces:
//!
//! ```text
//! submitSingleDocWithTemplateParams =
//!     ( ( "TEMPLATE" | documentSourceIdentifier ) + { recipientAddressSource }
//!     | ( "TEMPLATE" | { recipientAddressSource } ) + documentSourceIdentifier
//!     | ( documentSourceIdentifier + { recipientAddressSource } )
//!     )
//!     + jobTemplate
//!     + [ paymentDetails ] ;
//! ```
//!
//! [`specialize`] finds the first top-level item of the production that
//! mentions the marker and is an alternation, and turns each of its
//! alternatives into a [`TemplateOption`]. Items without the marker are
//! required whatever option is picked.
//!
//! Bracket nesting is followed only as deep as `max_nesting` allows; anything
//! deeper contributes no parameter names.
//!
//! This is a narrow heuristic for that one convention. Other marker
//! placements are not interpreted and the general decision tree remains the
//! authoritative description of the production.

use crate::config::CompilerConfig;
use crate::grammar::expression::{is_identifier, literal_value, unwrap_layers};
use crate::grammar::{normalize, Expr, Production};
use serde::Serialize;

/// One way of splitting parameters between the template and the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateOption {
    pub supplied_by_template: Vec<String>,
    pub supplied_by_caller: Vec<String>,
    /// The caller sends the document payload, but the template could also
    /// provide it; the UI has to ask which.
    pub requires_document_choice: bool,
}

impl TemplateOption {
    pub fn label(&self) -> String {
        let mut label = if self.supplied_by_template.is_empty() {
            "Template provides: job options only".to_string()
        } else {
            format!("Template provides: {}", self.supplied_by_template.join(", "))
        };
        if !self.supplied_by_caller.is_empty() {
            label.push_str(&format!(
                " (you provide: {})",
                self.supplied_by_caller.join(", ")
            ));
        }
        label
    }
}

/// Template options for one endpoint production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateLogic {
    pub production: String,
    /// The marker alternation sits inside `[ ]`
    pub optional: bool,
    pub options: Vec<TemplateOption>,
    pub always_required: Vec<String>,
}

impl TemplateLogic {
    /// Parameters the caller must send when `option` is chosen, or `None` for an
    /// out-of-range index.
    pub fn required_parameters(&self, option: usize) -> Option<Vec<String>> {
        let option = self.options.get(option)?;
        let mut required = self.always_required.clone();
        extend_unique(&mut required, option.supplied_by_caller.iter().cloned());
        Some(required)
    }
}

/// Derive template logic for `production`, or `None` if it has no marker alternation.
pub fn specialize(production: &Production, config: &CompilerConfig) -> Option<TemplateLogic> {
    let marker = config.template.marker.as_str();
    let limit = config.max_nesting;
    let rhs = production.rhs.as_str();
    if !mentions_marker(rhs, marker) {
        return None;
    }

    let items = match normalize(rhs) {
        Expr::Sequence(items) => items,
        _ => vec![rhs.trim()],
    };

    let mut group: Option<(Vec<&str>, bool)> = None;
    let mut always_required = Vec::new();
    for item in items {
        if !mentions_marker(item, marker) {
            extend_unique(&mut always_required, param_names(item, limit));
            continue;
        }
        if group.is_none() {
            let (inner, optional) = unwrap_layers(item, limit);
            if let Expr::Alternation(alternatives) = normalize(inner) {
                group = Some((alternatives, optional));
            }
        }
    }

    let Some((alternatives, optional)) = group else {
        tracing::debug!(
            production = %production.name,
            "marker literal present but not in a top-level alternation"
        );
        return None;
    };

    let mut options: Vec<TemplateOption> = (0..alternatives.len())
        .map(|index| classify(index, &alternatives, marker, limit))
        .collect();
    flag_document_choices(&mut options, &config.template.document_hint);

    Some(TemplateLogic {
        production: production.name.clone(),
        optional,
        options,
        always_required,
    })
}

fn classify(index: usize, alternatives: &[&str], marker: &str, limit: usize) -> TemplateOption {
    let mut option = TemplateOption::default();

    if is_marker(alternatives[index], marker, limit) {
        // A bare marker means the template supplies whatever the other branches ask for.
        for (_, other) in alternatives.iter().enumerate().filter(|(i, _)| *i != index) {
            if !is_marker(other, marker, limit) {
                extend_unique(&mut option.supplied_by_template, param_names(other, limit));
            }
        }
        return option;
    }

    let (inner, _) = unwrap_layers(alternatives[index], limit);
    let parts = match normalize(inner) {
        Expr::Sequence(parts) => parts,
        _ => vec![inner],
    };
    for part in parts {
        if !mentions_marker(part, marker) {
            extend_unique(&mut option.supplied_by_caller, param_names(part, limit));
            continue;
        }
        let (part_inner, _) = unwrap_layers(part, limit);
        if let Expr::Alternation(branches) = normalize(part_inner) {
            for branch in branches.into_iter().filter(|b| !is_marker(b, marker, limit)) {
                extend_unique(&mut option.supplied_by_template, param_names(branch, limit));
            }
        }
    }
    option
}

/// Set `requires_document_choice` on marker-free options whose document
/// parameter another option lets the template supply.
fn flag_document_choices(options: &mut [TemplateOption], hint: &str) {
    let hint = hint.to_lowercase();
    let template_supplied: Vec<Vec<String>> = options
        .iter()
        .map(|o| o.supplied_by_template.clone())
        .collect();

    for (index, option) in options.iter_mut().enumerate() {
        if !option.supplied_by_template.is_empty() {
            continue;
        }
        option.requires_document_choice = option.supplied_by_caller.iter().any(|param| {
            param.to_lowercase().contains(&hint)
                && template_supplied
                    .iter()
                    .enumerate()
                    .any(|(other, supplied)| other != index && supplied.contains(param))
        });
    }
}

/// Identifiers referenced in `text` within `depth` levels of nesting, in order
/// of appearance.
fn param_names(text: &str, depth: usize) -> Vec<String> {
    if depth == 0 {
        return Vec::new();
    }
    match normalize(text) {
        Expr::Alternation(parts) | Expr::Sequence(parts) => {
            let mut names = Vec::new();
            for part in parts {
                extend_unique(&mut names, param_names(part, depth - 1));
            }
            names
        }
        Expr::Optional(inner) | Expr::Repeat(inner) | Expr::Group(inner) => {
            param_names(inner, depth - 1)
        }
        Expr::Identifier(ident) if is_identifier(ident) => vec![ident.to_string()],
        Expr::Identifier(_) | Expr::Literal(_) | Expr::Empty => Vec::new(),
    }
}

fn is_marker(text: &str, marker: &str, limit: usize) -> bool {
    literal_value(unwrap_layers(text, limit).0) == Some(marker)
}

fn mentions_marker(text: &str, marker: &str) -> bool {
    text.contains(&format!("\"{marker}\"")) || text.contains(&format!("'{marker}'"))
}

fn extend_unique(target: &mut Vec<String>, names: impl IntoIterator<Item = String>) {
    for name in names {
        if !target.contains(&name) {
            target.push(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TemplateConfig;

    fn production(name: &str, rhs: &str) -> Production {
        Production {
            name: name.to_string(),
            rhs: rhs.to_string(),
            line: 1,
        }
    }

    fn logic(rhs: &str) -> Option<TemplateLogic> {
        specialize(&production("endpoint", rhs), &CompilerConfig::default())
    }

    #[test]
    fn test_no_marker_no_logic() {
        assert_eq!(logic("documentId + [ tags ]"), None);
        assert_eq!(logic("\"TEMPLATES\" | x"), None);
    }

    #[test]
    fn test_marker_outside_alternation_is_ignored() {
        assert_eq!(logic("\"TEMPLATE\" + documentId"), None);
    }

    #[test]
    fn test_payment_shape() {
        let logic = logic("\"TEMPLATE\" | creditCard").unwrap();
        assert!(!logic.optional);
        assert!(logic.always_required.is_empty());
        assert_eq!(logic.options.len(), 2);
        assert_eq!(logic.options[0].supplied_by_template, vec!["creditCard"]);
        assert!(logic.options[0].supplied_by_caller.is_empty());
        assert_eq!(logic.options[1].supplied_by_caller, vec!["creditCard"]);
        assert!(logic.options[1].supplied_by_template.is_empty());
        assert_eq!(logic.options[0].label(), "Template provides: creditCard");
        assert_eq!(
            logic.options[1].label(),
            "Template provides: job options only (you provide: creditCard)"
        );
    }

    #[test]
    fn test_single_doc_shape() {
        let rhs = r#"( ( "TEMPLATE" | documentSourceIdentifier ) + { recipientAddressSource }
            | ( "TEMPLATE" | { recipientAddressSource } ) + documentSourceIdentifier
            | ( documentSourceIdentifier + { recipientAddressSource } )
            ) + jobTemplate + [ paymentDetails ]"#;
        let logic = logic(rhs).unwrap();
        assert_eq!(logic.always_required, vec!["jobTemplate", "paymentDetails"]);
        assert_eq!(logic.options.len(), 3);

        let first = &logic.options[0];
        assert_eq!(first.supplied_by_template, vec!["documentSourceIdentifier"]);
        assert_eq!(first.supplied_by_caller, vec!["recipientAddressSource"]);
        assert!(!first.requires_document_choice);

        let second = &logic.options[1];
        assert_eq!(second.supplied_by_template, vec!["recipientAddressSource"]);
        assert_eq!(second.supplied_by_caller, vec!["documentSourceIdentifier"]);
        assert!(!second.requires_document_choice);

        let third = &logic.options[2];
        assert!(third.supplied_by_template.is_empty());
        assert_eq!(
            third.supplied_by_caller,
            vec!["documentSourceIdentifier", "recipientAddressSource"]
        );
        assert!(third.requires_document_choice);

        assert_eq!(
            logic.required_parameters(0).unwrap(),
            vec!["jobTemplate", "paymentDetails", "recipientAddressSource"]
        );
        assert_eq!(logic.required_parameters(3), None);
    }

    #[test]
    fn test_optional_merge_shape() {
        let rhs = r#"documentsToMerge + [ ( "TEMPLATE" | recipientAddressSource ) ] + jobTemplate + [ paymentDetails ]"#;
        let logic = logic(rhs).unwrap();
        assert!(logic.optional);
        assert_eq!(
            logic.always_required,
            vec!["documentsToMerge", "jobTemplate", "paymentDetails"]
        );
        assert_eq!(logic.options[0].supplied_by_template, vec!["recipientAddressSource"]);
        assert_eq!(logic.options[1].supplied_by_caller, vec!["recipientAddressSource"]);
        assert!(!logic.options[1].requires_document_choice);
    }

    #[test]
    fn test_custom_marker() {
        let config = CompilerConfig {
            template: TemplateConfig {
                marker: "FROM_JOB".into(),
                document_hint: "document".into(),
            },
            ..CompilerConfig::default()
        };
        let logic = specialize(&production("p", "'FROM_JOB' | card"), &config).unwrap();
        assert_eq!(logic.options[0].supplied_by_template, vec!["card"]);
    }

    #[test]
    fn test_deeply_nested_parameters_are_bounded() {
        let depth = 10_000;
        let nested = format!("{}deepParam{}", "( ".repeat(depth), " )".repeat(depth));
        let rhs = format!("( \"TEMPLATE\" | card ) + {nested} + jobTemplate");
        let deep = logic(&rhs).unwrap();
        assert_eq!(deep.always_required, vec!["jobTemplate"]);
        assert_eq!(deep.options[0].supplied_by_template, vec!["card"]);

        let shallow = "( \"TEMPLATE\" | card ) + ((( shallowParam )))";
        assert_eq!(logic(shallow).unwrap().always_required, vec!["shallowParam"]);
    }
}
