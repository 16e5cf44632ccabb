//! Quoted-text normalization
//!
//! Turns `>`-quoted email text into flat prose with one sentence per line and
//! a blank line before every configured keyword.

use crate::error::NormalizeError;
use crate::types::Normalized;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, error, warn};

/// Japanese full stop
const FULL_STOP: char = '。';

/// Characters that stay glued to a preceding full stop
const CLOSING_MARKS: [char; 10] = ['」', '』', '）', '】', '}', ']', ')', '>', '"', '\''];

const PARAGRAPH_BREAK: &str = "\n\n";

static QUOTE_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s\x1C-\x1F]*>+").unwrap());

static QUOTE_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s\x1C-\x1F]*>+[\s\x1C-\x1F]?").unwrap());

// `\s` is Unicode-aware, so this covers the ideographic space too
static WHITESPACE_RUN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\u{3000}\x1C-\x1F]+").unwrap());

static BLANK_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Normalize quoted email text.
///
/// Never fails: if the transform cannot be applied the original input comes
/// back inside [`Normalized::Fallback`].
///
/// ```rust
/// use quote_reflow::{Normalized, normalize};
///
/// let raw = "> 件名：会議の件\n> 本日はありがとうございました。よろしくお願いします。";
/// let result = normalize(raw, &["件名"]);
///
/// assert_eq!(
///     result,
///     Normalized::Reflowed(
///         "件名：会議の件\n本日はありがとうございました。\nよろしくお願いします。".into()
///     )
/// );
/// ```
pub fn normalize<S: AsRef<str>>(raw: &str, keywords: &[S]) -> Normalized {
    if trim_space(raw).is_empty() {
        return Normalized::Blank;
    }

    match reflow(raw, keywords) {
        Ok(normalized) => normalized,
        Err(e) => {
            error!("Failed to reflow quoted text: {e}");
            Normalized::Fallback {
                original: raw.to_string(),
                error: e,
            }
        }
    }
}

/// Like [`normalize`], returning only the text
pub fn normalize_text<S: AsRef<str>>(raw: &str, keywords: &[S]) -> String {
    normalize(raw, keywords).into_text()
}

fn reflow<S: AsRef<str>>(raw: &str, keywords: &[S]) -> Result<Normalized, NormalizeError> {
    if let Some(index) = keywords.iter().position(|k| k.as_ref().is_empty()) {
        return Err(NormalizeError::EmptyKeyword { index });
    }

    let quoted: Vec<&str> = split_lines(raw)
        .filter(|line| QUOTE_LINE_REGEX.is_match(line))
        .collect();

    if quoted.is_empty() {
        warn!("No quoted lines (starting with '>') found");
        return Ok(Normalized::Unquoted(trim_space(raw).to_string()));
    }

    let cleaned: Vec<&str> = quoted
        .into_iter()
        .map(strip_quote_marker)
        .filter(|line| !line.is_empty())
        .collect();

    if cleaned.is_empty() {
        debug!("All quoted lines were empty after stripping markers");
        return Ok(Normalized::StrippedEmpty);
    }

    let joined = cleaned.join(" ");
    let sentences = break_after_full_stops(&joined);
    let mut text = WHITESPACE_RUN_REGEX
        .replace_all(&sentences, "\n")
        .into_owned();

    for keyword in keywords {
        let keyword = keyword.as_ref();
        if text.contains(keyword) {
            text = insert_paragraph_breaks(&text, keyword);
        }
    }

    let text = BLANK_RUN_REGEX.replace_all(&text, PARAGRAPH_BREAK);

    debug!(
        "Reflowed {} quoted lines into {} lines",
        cleaned.len(),
        trim_space(&text).lines().count()
    );

    Ok(Normalized::Reflowed(trim_space(&text).to_string()))
}

/// Unicode whitespace plus the C0 separators `\x1C`..=`\x1F`
fn is_space(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\u{1C}'..='\u{1F}')
}

fn trim_space(text: &str) -> &str {
    text.trim_matches(is_space)
}

// A `\r\n` pair yields an extra empty piece, which never matches a quote line.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| {
        matches!(
            c,
            '\n' | '\r'
                | '\u{0B}'
                | '\u{0C}'
                | '\u{1C}'
                | '\u{1D}'
                | '\u{1E}'
                | '\u{85}'
                | '\u{2028}'
                | '\u{2029}'
        )
    })
}

fn strip_quote_marker(line: &str) -> &str {
    trim_space(
        QUOTE_PREFIX_REGEX
            .find(line)
            .map_or(line, |m| &line[m.end()..]),
    )
}

/// Put a line break after every full stop, swallowing the whitespace that
/// follows it, unless the next visible character is a closing mark or the
/// text ends there.
fn break_after_full_stops(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut rest = text;

    while let Some(pos) = rest.find(FULL_STOP) {
        let (head, tail) = rest.split_at(pos + FULL_STOP.len_utf8());
        out.push_str(head);

        let next_visible = tail.trim_start_matches(is_space);
        match next_visible.chars().next() {
            Some(next) if !CLOSING_MARKS.contains(&next) => {
                out.push('\n');
                rest = next_visible;
            }
            _ => rest = tail,
        }
    }

    out.push_str(rest);
    out
}

/// Rebuild `text` with a paragraph break in front of every non-overlapping
/// occurrence of `keyword`, scanning left to right.
fn insert_paragraph_breaks(text: &str, keyword: &str) -> String {
    let mut out = String::with_capacity(text.len() + PARAGRAPH_BREAK.len() * 4);
    let mut rest = text;

    while let Some(pos) = rest.find(keyword) {
        out.push_str(&rest[..pos]);
        out.push_str(PARAGRAPH_BREAK);
        out.push_str(keyword);
        rest = &rest[pos + keyword.len()..];
    }

    out.push_str(rest);
    out
}
