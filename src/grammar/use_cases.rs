//! Use-case header blocks
//!
//! Endpoint productions are introduced by a block comment naming the use case
//! and the REST endpoint it maps to:
//!
//! ```text
//! (*
//!   Use Case 1: Submit a single document using a job template
//!   Endpoint: /jobs/single-doc-job-template
//!   Question: Will the template provide the document or the recipients?
//! *)
//! submitSingleDocWithTemplateParams = ... ;
//! ```
//!
//! The `Question:` line is optional. A header only counts when the comment is
//! immediately followed by a production definition.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static HEADER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\*\s*Use Case\s+(\d+)\s*:\s*([^\n]*)").unwrap());

static FOLLOWING_PRODUCTION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*=").unwrap());

/// Metadata for one endpoint production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UseCase {
    pub number: u32,
    pub production: String,
    pub description: String,
    pub endpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

/// Find every use-case header in raw grammar text, in source order.
pub fn extract_use_cases(text: &str) -> Vec<UseCase> {
    let mut use_cases = Vec::new();

    for caps in HEADER_REGEX.captures_iter(text) {
        let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let Ok(number) = number.as_str().parse::<u32>() else {
            continue;
        };
        let Some(close) = text[whole.start()..].find("*)").map(|i| whole.start() + i) else {
            continue;
        };
        let header_end = caps.get(2).map(|m| m.end()).unwrap_or(whole.end());
        if close < header_end {
            // Single-line comment such as `(* Use Case 3: note *)`; the close marker
            // was swallowed by the description capture.
            continue;
        }

        let Some(production) = FOLLOWING_PRODUCTION_REGEX
            .captures(&text[close + 2..])
            .map(|c| c[1].to_string())
        else {
            continue;
        };

        let body = &text[header_end..close];
        use_cases.push(UseCase {
            number,
            production,
            description: caps[2].trim().to_string(),
            endpoint: body_field(body, "Endpoint").unwrap_or_default(),
            question: body_field(body, "Question"),
        });
    }

    use_cases
}

/// Value of the first `Key: value` line in a header body.
fn body_field(body: &str, key: &str) -> Option<String> {
    body.lines().find_map(|line| {
        let rest = line.trim().strip_prefix(key)?;
        let value = rest.trim_start().strip_prefix(':')?.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = r#"
(*
  Use Case 1: Submit a single document using a job template
  Endpoint: /jobs/single-doc-job-template
  Question: Will the template provide the document or the recipients?
*)
submitSingleDocWithTemplateParams = jobTemplate + documentSourceIdentifier ;

(*
  Use Case 2: Submit multiple documents
  Endpoint: /jobs/multi-doc
*)
submitMultiDocParams = { documentSourceIdentifier } ;
"#;

    #[test]
    fn test_extract_use_cases() {
        let use_cases = extract_use_cases(HEADER);
        assert_eq!(use_cases.len(), 2);

        let first = &use_cases[0];
        assert_eq!(first.number, 1);
        assert_eq!(first.production, "submitSingleDocWithTemplateParams");
        assert_eq!(first.description, "Submit a single document using a job template");
        assert_eq!(first.endpoint, "/jobs/single-doc-job-template");
        assert_eq!(
            first.question.as_deref(),
            Some("Will the template provide the document or the recipients?")
        );

        let second = &use_cases[1];
        assert_eq!(second.production, "submitMultiDocParams");
        assert_eq!(second.endpoint, "/jobs/multi-doc");
        assert_eq!(second.question, None);
    }

    #[test]
    fn test_header_without_production_is_ignored() {
        let text = "(*\n Use Case 9: Orphan\n Endpoint: /jobs/orphan\n*)\n\n(* unrelated *)\n";
        assert!(extract_use_cases(text).is_empty());
    }

    #[test]
    fn test_single_line_header_is_ignored() {
        let text = "(* Use Case 3: inline note *)\nfoo = bar ;\n";
        assert!(extract_use_cases(text).is_empty());
    }
}
