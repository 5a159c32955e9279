//! Question directive extraction
//!
//! Grammar authors document parameters with comment directives written on the
//! same line as the token they describe:
//!
//! ```text
//! jobTemplate = templateId | templateName ; (* Question: Which template identifies the job? *)
//!     + paymentDetails (* Question (optional): How will the job be paid for? *)
//! ```
//!
//! The parameter name is recovered from the text to the left of the comment by
//! trying these patterns in order, first match wins:
//!
//! 1. `+ name` at the end (sequence operand)
//! 2. `| name` at the end (alternative)
//! 3. `name =` at the start (production definition)
//! 4. `name` at the end (bare trailing identifier)
//!
//! A directive alone on its line documents the production terminated on the
//! closest preceding non-blank line, if that line ended one with `;`. Any other
//! directive whose name cannot be recovered is dropped.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

/// Matches `(* Question: text *)` and `(* Question (optional): text *)`
static DIRECTIVE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\*\s*Question\s*(\(\s*optional\s*\))?\s*:\s*(.*?)\s*\*\)").unwrap()
});

static PRODUCTION_START_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z_]\w*)\s*=").unwrap());

/// Name-recovery patterns, tried in declaration order
static NAME_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("sequence", r"\+\s*(\w+)\s*$"),
        ("alternation", r"\|\s*(\w+)\s*$"),
        ("assignment", r"^(\w+)\s*="),
        ("trailing", r"(\w+)\s*$"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).unwrap()))
    .collect()
});

/// A question attached to one parameter or production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionAnnotation {
    pub parameter: String,
    pub text: String,
    pub optional: bool,
    /// 1-based line of the directive
    pub line: usize,
}

/// Question annotations keyed by parameter name.
///
/// Later annotations for the same name replace earlier ones; the replaced
/// annotations are kept in [`QuestionTable::overridden`] so callers can report them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionTable {
    by_name: BTreeMap<String, QuestionAnnotation>,
    overridden: Vec<QuestionAnnotation>,
}

impl QuestionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an annotation, replacing (and remembering) any previous one for the same name.
    pub fn insert(&mut self, annotation: QuestionAnnotation) {
        if let Some(previous) = self.by_name.insert(annotation.parameter.clone(), annotation) {
            self.overridden.push(previous);
        }
    }

    pub fn get(&self, name: &str) -> Option<&QuestionAnnotation> {
        self.by_name.get(name.trim())
    }

    /// The question text registered for `name`, if any
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).map(|a| a.text.as_str())
    }

    /// Whether the directive for `name` carried the `(optional)` marker
    pub fn is_optional(&self, name: &str) -> bool {
        self.get(name).map(|a| a.optional).unwrap_or(false)
    }

    /// Annotations that were replaced by a later directive for the same name
    pub fn overridden(&self) -> &[QuestionAnnotation] {
        &self.overridden
    }

    /// Iterate annotations sorted by parameter name
    pub fn iter(&self) -> impl Iterator<Item = &QuestionAnnotation> {
        self.by_name.values()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Extract every question directive from raw grammar text.
pub fn extract_questions(text: &str) -> QuestionTable {
    let mut table = QuestionTable::new();
    let mut open_production: Option<String> = None;
    let mut last_terminated: Option<String> = None;

    for (index, line) in text.lines().enumerate() {
        let before_comment = line.split("(*").next().unwrap_or("").trim();

        if let Some(caps) = DIRECTIVE_REGEX.captures(line) {
            let name = if before_comment.is_empty() {
                last_terminated.take()
            } else {
                parameter_name(before_comment).map(str::to_string)
            };

            match name {
                Some(parameter) => table.insert(QuestionAnnotation {
                    parameter,
                    text: caps[2].trim().to_string(),
                    optional: caps.get(1).is_some(),
                    line: index + 1,
                }),
                None => tracing::debug!(line = index + 1, "dropping question directive with no parameter name"),
            }
        }

        if before_comment.is_empty() {
            continue;
        }
        if let Some(caps) = PRODUCTION_START_REGEX.captures(before_comment) {
            open_production = Some(caps[1].to_string());
        }
        last_terminated = if before_comment.ends_with(';') {
            open_production.take()
        } else {
            None
        };
    }

    table
}

/// Recover the parameter name from the text preceding a directive.
pub fn parameter_name(before_comment: &str) -> Option<&str> {
    let before_comment = before_comment.trim();
    NAME_PATTERNS.iter().find_map(|(_, regex)| {
        regex
            .captures(before_comment)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("  + paymentDetails", Some("paymentDetails"))]
    #[case("| creditCard", Some("creditCard"))]
    #[case(r#"format = "pdf" | "docx" ;"#, Some("format"))]
    #[case("documentId", Some("documentId"))]
    #[case("jobTemplate + documentId", Some("documentId"))]
    #[case("address = street", Some("address"))]
    #[case(r#""literal" ;"#, None)]
    #[case("", None)]
    fn test_parameter_name_precedence(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(parameter_name(input), expected);
    }

    #[test]
    fn test_extract_inline_directives() {
        let text = r#"
job =
    jobTemplate (* Question: Which job template? *)
    + paymentDetails (* Question (optional): How will you pay? *)
    ;
"#;
        let table = extract_questions(text);
        assert_eq!(table.len(), 2);
        assert_eq!(table.text("jobTemplate"), Some("Which job template?"));
        let payment = table.get("paymentDetails").unwrap();
        assert_eq!(payment.text, "How will you pay?");
        assert!(payment.optional);
        assert_eq!(payment.line, 4);
        assert!(!table.is_optional("jobTemplate"));
    }

    #[test]
    fn test_extract_definition_line_directive() {
        let table = extract_questions(r#"foo = "x" | "y" ; (* Question: Pick one *)"#);
        assert_eq!(table.text("foo"), Some("Pick one"));
    }

    #[test]
    fn test_directive_on_following_line_documents_terminated_production() {
        let text = "payment = \"TEMPLATE\" | creditCard ;\n(* Question: How will payment be handled? *)\n";
        let table = extract_questions(text);
        assert_eq!(table.text("payment"), Some("How will payment be handled?"));
    }

    #[test]
    fn test_directive_on_following_line_of_unterminated_production_is_dropped() {
        let text = "payment = creditCard\n(* Question: Dangling? *)\n    | check ;\n";
        let table = extract_questions(text);
        assert!(table.is_empty());
    }

    #[test]
    fn test_second_comment_only_directive_is_dropped() {
        let text = "a = b ;\n(* Question: First *)\n(* Question: Second *)\n";
        let table = extract_questions(text);
        assert_eq!(table.len(), 1);
        assert_eq!(table.text("a"), Some("First"));
    }

    #[test]
    fn test_non_question_comments_are_ignored() {
        let table = extract_questions("a = b ; (* just a note *)\n");
        assert!(table.is_empty());
    }

    #[test]
    fn test_duplicate_directive_last_write_wins() {
        let text = "x = a ; (* Question: First *)\nx = b ; (* Question: Second *)\n";
        let table = extract_questions(text);
        assert_eq!(table.text("x"), Some("Second"));
        assert_eq!(table.overridden().len(), 1);
        assert_eq!(table.overridden()[0].text, "First");
        assert_eq!(table.overridden()[0].line, 1);
    }
}
