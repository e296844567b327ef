//! Turning an uploaded SQL script into ordered [`RawStatement`]s.
//!
//! The pipeline is: strip comments, rewrite bcrypt hash literals to the
//! placeholder hash, split on `;`, trim, then drop empty fragments and
//! `USE <database>` statements. Splitting is not quote-aware: a `;` or `--`
//! inside a string literal is treated like any other.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use super::RawStatement;

/// Password hash written in place of imported bcrypt hashes. Seeded accounts
/// use this same value.
pub const PLACEHOLDER_PASSWORD_HASH: &str = "$2b$10$example_hash_admin";

/// `$2a$12$` followed by the 53-character salt and digest.
static BCRYPT_HASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$2a\$12\$[./A-Za-z0-9]{53}").expect("valid regex"));

static USE_STATEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^USE\s+(`[^`]+`|\S+)$").expect("valid regex"));

/// Remove `--` line comments and `/* ... */` block comments.
///
/// Line comments run to the end of the line; the line break itself is kept.
/// A block comment is replaced by the line breaks it contained, or a single
/// space if it had none, so line numbers survive and tokens on either side
/// never fuse. An unterminated `/*` is left in place. Applying this twice
/// gives the same result as applying it once.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while !rest.is_empty() {
        if rest.starts_with("--") {
            rest = match rest.find('\n') {
                Some(newline) => &rest[newline..],
                None => "",
            };
        } else if rest.starts_with("/*") {
            match rest[2..].find("*/") {
                Some(close) => {
                    let comment_len = 2 + close + 2;
                    let newlines = rest[..comment_len].matches('\n').count();
                    if newlines == 0 {
                        out.push(' ');
                    } else {
                        out.extend(std::iter::repeat('\n').take(newlines));
                    }
                    rest = &rest[comment_len..];
                }
                None => {
                    out.push('/');
                    rest = &rest[1..];
                }
            }
        } else {
            let mut chars = rest.chars();
            if let Some(ch) = chars.next() {
                out.push(ch);
            }
            rest = chars.as_str();
        }
    }

    out
}

/// Rewrite every `$2a$12$` bcrypt hash to [`PLACEHOLDER_PASSWORD_HASH`].
pub fn normalize_password_hashes(text: &str) -> String {
    BCRYPT_HASH_RE
        .replace_all(text, NoExpand(PLACEHOLDER_PASSWORD_HASH))
        .into_owned()
}

/// Whether a trimmed statement is `USE <database>`.
pub fn is_use_statement(statement: &str) -> bool {
    USE_STATEMENT_RE.is_match(statement)
}

/// Parse a script into 1-indexed statements in source order.
///
/// Input with no executable statements (empty, only comments, only `USE`)
/// yields an empty list.
pub fn parse_statements(content: &str) -> Vec<RawStatement> {
    let cleaned = normalize_password_hashes(&strip_comments(content));

    let mut statements = Vec::new();
    let mut line = 1;

    for fragment in cleaned.split(';') {
        let text = fragment.trim();
        if !text.is_empty() && !is_use_statement(text) {
            let leading = fragment.len() - fragment.trim_start().len();
            let first = line + fragment[..leading].matches('\n').count();
            let last = first + text.matches('\n').count();
            statements.push(RawStatement {
                index: statements.len() + 1,
                text: text.to_string(),
                line_span: Some((first, last)),
            });
        }
        line += fragment.matches('\n').count();
    }

    tracing::debug!(
        original_len = content.len(),
        cleaned_len = cleaned.len(),
        statements = statements.len(),
        "Parsed SQL script"
    );

    statements
}
