//! Expression normalization for production right-hand sides
//!
//! The grammar subset understood here is small: identifiers, quoted literals,
//! sequence (`+`), alternation (`|`), optional (`[ ]`), repetition (`{ }`) and
//! grouping (`( )`). Rather than building a full expression AST up front, the
//! normalizer classifies one level of an expression at a time and hands back
//! borrowed slices of the operands. Callers recurse on those slices.
//!
//! ## Classification order
//!
//! 1. top-level alternation (`a | b`)
//! 2. top-level sequence (`a + b`)
//! 3. optional wrapper (`[ a ]`)
//! 4. repeat wrapper (`{ a }`)
//! 5. grouping (`( a )`)
//! 6. quoted literal (`"a"` or `'a'`)
//! 7. anything else is an identifier
//!
//! "Top-level" means outside any bracket nesting and outside quotes. Nothing in
//! this module fails: unbalanced input simply stops matching the structured
//! cases and ends up classified as an identifier.

/// One level of a normalized expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr<'a> {
    /// Nothing but whitespace
    Empty,
    /// Two or more alternatives separated by a top-level `|`
    Alternation(Vec<&'a str>),
    /// Two or more items separated by a top-level `+`
    Sequence(Vec<&'a str>),
    /// Contents of a `[ ... ]` wrapper spanning the whole expression
    Optional(&'a str),
    /// Contents of a `{ ... }` wrapper spanning the whole expression
    Repeat(&'a str),
    /// Contents of a `( ... )` wrapper spanning the whole expression
    Group(&'a str),
    /// A quoted literal, without its quotes
    Literal(&'a str),
    /// A bare terminal. Usually an identifier, but malformed fragments land here too.
    Identifier(&'a str),
}

/// Classify one level of `text`.
pub fn normalize(text: &str) -> Expr<'_> {
    let text = text.trim();
    if text.is_empty() {
        return Expr::Empty;
    }

    let alternatives = split_top(text, '|');
    if alternatives.len() > 1 {
        return Expr::Alternation(alternatives);
    }

    let items = split_top(text, '+');
    if items.len() > 1 {
        return Expr::Sequence(items);
    }

    if let Some(inner) = enclosed_by(text, '[', ']') {
        return Expr::Optional(inner);
    }
    if let Some(inner) = enclosed_by(text, '{', '}') {
        return Expr::Repeat(inner);
    }
    if let Some(inner) = enclosed_by(text, '(', ')') {
        return Expr::Group(inner);
    }

    if let Some(value) = literal_value(text) {
        return Expr::Literal(value);
    }

    Expr::Identifier(text)
}

/// Split `text` on `sep` wherever the bracket depth is zero and we are not inside quotes.
///
/// Parts are trimmed and empty parts are dropped, so `"a | | b"` yields `["a", "b"]`.
/// Unbalanced closing brackets push the depth negative, which disables further splitting.
pub fn split_top(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: isize = 0;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ if ch == sep && depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());

    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

/// Remove one pair of parentheses when they enclose the entire expression.
///
/// `"(a | b)"` becomes `"a | b"`, while `"(a) + (b)"` is returned unchanged
/// because the first `)` closes before the end of the string.
pub fn strip_wrapping(text: &str) -> &str {
    let text = text.trim();
    enclosed_by(text, '(', ')').unwrap_or(text)
}

/// Peel up to `limit` optional, repeat and grouping layers off `text`.
///
/// Returns the innermost text reached and whether any of the peeled layers was
/// optional.
pub fn unwrap_layers(text: &str, limit: usize) -> (&str, bool) {
    let mut current = text.trim();
    let mut optional = false;
    for _ in 0..limit {
        match normalize(current) {
            Expr::Optional(inner) => {
                optional = true;
                current = inner;
            }
            Expr::Repeat(inner) | Expr::Group(inner) => current = inner,
            _ => break,
        }
    }
    (current, optional)
}

/// The value of a quoted literal, or `None` if `text` is not exactly one literal.
pub fn literal_value(text: &str) -> Option<&str> {
    let text = text.trim();
    let quote = text.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    if text.len() < 2 || !text.ends_with(quote) {
        return None;
    }
    let inner = &text[1..text.len() - 1];
    if inner.contains(quote) {
        return None;
    }
    Some(inner)
}

/// Whether `text` is a plain identifier (`[A-Za-z0-9_]+`, not starting with a digit).
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Short display name for one operand, used to build the lookup key of a sequence.
///
/// Wrappers are peeled, alternations are named after their first non-literal
/// branch, nested sequences are joined with `+` and literals lose their quotes.
/// Sequences nested deeper than a few levels keep their source text.
pub fn token_name(part: &str) -> String {
    token_name_within(part, TOKEN_NAME_DEPTH)
}

const TOKEN_NAME_DEPTH: usize = 8;

fn token_name_within(part: &str, depth: usize) -> String {
    let mut part = part.trim();
    if depth == 0 {
        return part.to_string();
    }
    if let Some(inner) = enclosed_by(part, '[', ']') {
        part = inner.trim();
    }
    if let Some(inner) = enclosed_by(part, '{', '}') {
        part = inner.trim();
    }

    let alternatives = split_top(part, '|');
    if alternatives.len() > 1 {
        return alternatives
            .iter()
            .find(|alt| literal_value(alt).is_none())
            .unwrap_or(&part)
            .to_string();
    }

    let items = split_top(part, '+');
    if items.len() > 1 {
        return items
            .iter()
            .map(|item| token_name_within(item, depth - 1))
            .collect::<Vec<_>>()
            .join("+");
    }

    literal_value(part).unwrap_or(part).to_string()
}

/// Return the inside of `text` if it starts with `open`, ends with `close`, and
/// the opening delimiter is matched by that final character.
fn enclosed_by(text: &str, open: char, close: char) -> Option<&str> {
    if !text.starts_with(open) || !text.ends_with(close) || text.len() < 2 {
        return None;
    }

    let last = text.len() - close.len_utf8();
    let mut depth: isize = 0;
    let mut quote: Option<char> = None;
    for (i, ch) in text.char_indices() {
        if let Some(q) = quote {
            if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '"' | '\'' => quote = Some(ch),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    return if i == last && ch == close {
                        Some(text[open.len_utf8()..last].trim())
                    } else {
                        None
                    };
                }
            }
            _ => {}
        }
    }
    None
}
