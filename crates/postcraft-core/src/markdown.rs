//! Telegram MarkdownV2 escaping.
//!
//! Models sometimes answer with markdown that is already escaped for
//! Telegram (`\*`, `\.`), and drafts can pass through the escape step more
//! than once when they are regenerated or edited. Both directions are
//! idempotent so backslashes never accumulate.

use std::sync::OnceLock;

use regex::Regex;

/// Characters Telegram MarkdownV2 requires to be escaped.
pub const MARKDOWN_V2_SPECIAL: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

fn escaped_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\\+([_*\[\]()~`>#+\-=|{}.!])").expect("escaped-run regex is valid")
    })
}

fn escape_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\\[\\_*\[\]()~`>#+\-=|{}.!]").expect("escape-marker regex is valid")
    })
}

/// Remove backslash escapes in front of MarkdownV2 special characters.
///
/// Any run of backslashes before a special character collapses to the bare
/// character, so `unescape_markdown(unescape_markdown(s)) == unescape_markdown(s)`.
pub fn unescape_markdown(text: &str) -> String {
    escaped_run().replace_all(text, "$1").into_owned()
}

/// True when `text` already contains an escaped special character or an
/// escaped backslash.
pub fn is_escaped(text: &str) -> bool {
    escape_marker().is_match(text)
}

/// Escape `text` for MarkdownV2.
///
/// Text that already carries escapes is returned unchanged, which makes the
/// operation idempotent.
pub fn escape_markdown(text: &str) -> String {
    if is_escaped(text) {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for c in text.chars() {
        if c == '\\' || MARKDOWN_V2_SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
