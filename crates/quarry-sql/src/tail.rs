//! Textual helpers for the outermost tail of a statement.
//!
//! These work on SQL text, not on the AST. A scanner tracks parentheses,
//! string literals, quoted identifiers and comments so that only clauses at
//! nesting depth zero are ever touched: a `LIMIT` inside a subquery or CTE is
//! left alone.

use std::sync::LazyLock;

use regex::Regex;

static QUALIFIED_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)?$").expect("static pattern")
});

/// Trim surrounding whitespace and a single trailing `;`.
pub fn strip_statement_terminator(sql: &str) -> &str {
    let trimmed = sql.trim();
    trimmed.strip_suffix(';').unwrap_or(trimmed).trim_end()
}

/// Drop leading `--` and `/* ... */` comments.
pub fn strip_leading_comments(sql: &str) -> &str {
    let mut rest = sql.trim_start();
    loop {
        if let Some(after) = rest.strip_prefix("--") {
            rest = match after.find('\n') {
                Some(idx) => after[idx + 1..].trim_start(),
                None => "",
            };
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = match after.find("*/") {
                Some(idx) => after[idx + 2..].trim_start(),
                // Unterminated comment: nothing executable follows.
                None => "",
            };
        } else {
            return rest;
        }
    }
}

/// Whether the statement, after leading comments, opens with `WITH`.
pub fn starts_with_cte(sql: &str) -> bool {
    let body = strip_leading_comments(sql);
    let word: String = body
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    word.eq_ignore_ascii_case("with")
}

/// Remove the final tail `ORDER BY` and any trailing `LIMIT`, `OFFSET` or
/// `FETCH` clause.
///
/// Only clauses at nesting depth zero are considered.
pub fn strip_final_order_by_and_trailing(sql: &str) -> String {
    let sql = strip_statement_terminator(sql);
    let keywords = top_level_keywords(sql);

    let last_order_by = keywords
        .iter()
        .rev()
        .find(|(_, kw)| *kw == TailKeyword::OrderBy)
        .map(|(pos, _)| *pos);

    let first_pagination = keywords
        .iter()
        .filter(|(pos, _)| last_order_by.is_none_or(|order| *pos > order))
        .find(|(_, kw)| *kw != TailKeyword::OrderBy)
        .map(|(pos, _)| *pos);

    match last_order_by.or(first_pagination) {
        Some(cut) => sql[..cut].trim_end().to_string(),
        None => sql.to_string(),
    }
}

/// Normalise a caller-supplied sort column.
///
/// Accepts `ident` or `alias.ident`, optionally wrapped in double quotes or
/// backticks, and returns the last segment. Anything else is rejected.
pub fn sanitize_sort_by(raw: &str) -> Option<String> {
    let mut candidate = raw.trim();
    if candidate.len() >= 2
        && ((candidate.starts_with('"') && candidate.ends_with('"'))
            || (candidate.starts_with('`') && candidate.ends_with('`')))
    {
        candidate = candidate[1..candidate.len() - 1].trim();
    }

    if !QUALIFIED_IDENTIFIER.is_match(candidate) {
        return None;
    }
    candidate.rsplit('.').next().map(str::to_string)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TailKeyword {
    OrderBy,
    Limit,
    Offset,
    Fetch,
}

/// Byte offsets of tail keywords that sit outside any parentheses, string
/// literal, quoted identifier or comment.
fn top_level_keywords(sql: &str) -> Vec<(usize, TailKeyword)> {
    let bytes = sql.as_bytes();
    let mut found = Vec::new();
    let mut depth: usize = 0;
    let mut i = 0;
    // Previous word at depth zero, to pair ORDER with BY.
    let mut pending_order: Option<usize> = None;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'\'' | b'"' | b'`' => {
                i = skip_quoted(bytes, i, b);
                pending_order = None;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = bytes[i..]
                    .iter()
                    .position(|c| *c == b'\n')
                    .map_or(bytes.len(), |p| i + p + 1);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = sql[i + 2..].find("*/").map_or(bytes.len(), |p| i + 2 + p + 2);
            }
            b'(' => {
                depth += 1;
                pending_order = None;
                i += 1;
            }
            b')' => {
                depth = depth.saturating_sub(1);
                pending_order = None;
                i += 1;
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                if depth > 0 {
                    continue;
                }
                let word = &sql[start..i];
                if word.eq_ignore_ascii_case("order") {
                    pending_order = Some(start);
                    continue;
                }
                if word.eq_ignore_ascii_case("by") {
                    if let Some(order_start) = pending_order.take() {
                        found.push((order_start, TailKeyword::OrderBy));
                    }
                    continue;
                }
                pending_order = None;
                let keyword = if word.eq_ignore_ascii_case("limit") {
                    Some(TailKeyword::Limit)
                } else if word.eq_ignore_ascii_case("offset") {
                    Some(TailKeyword::Offset)
                } else if word.eq_ignore_ascii_case("fetch") {
                    Some(TailKeyword::Fetch)
                } else {
                    None
                };
                if let Some(keyword) = keyword {
                    found.push((start, keyword));
                }
            }
            c if c.is_ascii_whitespace() => i += 1,
            _ => {
                // Consume the whole UTF-8 sequence plus any identifier run
                // glued to it, so `t.limit` or `10e3` never reads as a keyword.
                pending_order = None;
                i += sql[i..].chars().next().map_or(1, char::len_utf8);
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
            }
        }
    }

    found
}

/// Index just past the closing quote; doubled quotes are escapes.
fn skip_quoted(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}
