//! Parsing of `TONE:` / `POST:` / `REASON:` model responses.

use std::sync::OnceLock;

use postcraft_models::{GeneratedPost, Tone};
use regex::Regex;
use tracing::{debug, warn};

use crate::markdown::unescape_markdown;

/// Tone used when the response names none, or one we don't recognize.
pub const DEFAULT_TONE: Tone = Tone::BehindTheBuild;

/// Line-anchored section marker, tolerant of `##`, `**` and `_` decoration.
fn marker_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^[ \t>#*_]*(tone|post|reason)[ \t*_]*:[ \t*_]*")
            .expect("marker regex is valid")
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Tone,
    Post,
    Reason,
}

impl Section {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "tone" => Some(Self::Tone),
            "post" => Some(Self::Post),
            "reason" => Some(Self::Reason),
            _ => None,
        }
    }
}

/// Split `text` into sections. The first occurrence of each marker wins.
fn sections(text: &str) -> Vec<(Section, &str)> {
    let markers: Vec<(Section, usize, usize)> = marker_pattern()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let section = Section::from_name(caps.get(1)?.as_str())?;
            Some((section, whole.start(), whole.end()))
        })
        .collect();

    let mut out: Vec<(Section, &str)> = Vec::new();
    for (i, (section, _, body_start)) in markers.iter().enumerate() {
        if out.iter().any(|(s, _)| s == section) {
            continue;
        }
        let body_end = markers.get(i + 1).map(|m| m.1).unwrap_or(text.len());
        out.push((*section, text[*body_start..body_end].trim()));
    }
    out
}

fn section<'a>(sections: &[(Section, &'a str)], wanted: Section) -> Option<&'a str> {
    sections.iter().find(|(s, _)| *s == wanted).map(|(_, body)| *body)
}

fn parse_tone(raw: &str) -> Tone {
    let cleaned = raw
        .lines()
        .next()
        .unwrap_or_default()
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '_' | '"' | '\'' | '`'));

    match Tone::from_label(cleaned) {
        Some(tone) => tone,
        None => {
            debug!(tone = cleaned, "Unrecognized tone in response, using default");
            DEFAULT_TONE
        }
    }
}

/// Parse a raw model response into a [`GeneratedPost`].
///
/// Without a `POST:` marker the whole unescaped response becomes the post,
/// the tone falls back to [`DEFAULT_TONE`] and `fallback` is set.
pub fn parse_response(raw: &str) -> GeneratedPost {
    let text = unescape_markdown(raw);
    let found = sections(&text);

    let Some(post) = section(&found, Section::Post) else {
        warn!(len = text.len(), "Response has no POST marker, using raw text");
        return GeneratedPost {
            tone: DEFAULT_TONE,
            post_content: text,
            reason: String::new(),
            fallback: true,
        };
    };

    GeneratedPost {
        tone: section(&found, Section::Tone)
            .map(parse_tone)
            .unwrap_or(DEFAULT_TONE),
        post_content: post.to_string(),
        reason: section(&found, Section::Reason)
            .unwrap_or_default()
            .to_string(),
        fallback: false,
    }
}
