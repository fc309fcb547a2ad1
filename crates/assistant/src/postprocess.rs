//! Cleanup of raw model output before it is shown to the user.
//!
//! Every function here is a pure string transformation.

use regex::Regex;
use std::sync::LazyLock;

/// Shown when deduplication leaves nothing
pub const NEUTRAL_FALLBACK: &str = "Ich verstehe. Wie kann ich weiter helfen?";

/// Shown when the final answer is too short to be useful
pub const NO_ANSWER_FALLBACK: &str =
    "Entschuldigung, ich konnte keine passende Antwort generieren.";

const MIN_REPLY_CHARS: usize = 5;

/// Markers after which the model drifted into another language
const LANGUAGE_SWITCH_MARKERS: [&str; 4] = ["In English:", "Spanish:", "French:", "Italian:"];

static SPECIAL_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<.*?>").expect("valid special token regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Remove an echoed prompt prefix, special tokens like `<|endoftext|>`, and
/// runs of whitespace.
pub fn clean_response(response: &str, prompt: &str) -> String {
    let response = if prompt.is_empty() {
        response
    } else {
        response.strip_prefix(prompt).unwrap_or(response)
    };
    let without_tokens = SPECIAL_TOKEN_RE.replace_all(response, "");
    WHITESPACE_RE
        .replace_all(&without_tokens, " ")
        .trim()
        .to_string()
}

/// Cut the text at the first language-switch marker, if any.
pub fn truncate_at_language_switch(text: &str) -> &str {
    let cut = LANGUAGE_SWITCH_MARKERS
        .iter()
        .filter_map(|marker| text.find(marker))
        .min();
    match cut {
        Some(idx) => text[..idx].trim(),
        None => text.trim(),
    }
}

/// Split on `.`, drop empty and repeated fragments (first occurrence wins),
/// rejoin with `". "` and make sure the result ends in punctuation.
pub fn dedupe_sentences(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for fragment in text.split('.') {
        let fragment = fragment.trim();
        if !fragment.is_empty() && !kept.contains(&fragment) {
            kept.push(fragment);
        }
    }

    if kept.is_empty() {
        return NEUTRAL_FALLBACK.to_string();
    }

    let mut joined = kept.join(". ");
    if !joined.ends_with(['.', '?', '!']) {
        joined.push('.');
    }
    joined
}

/// Full pipeline applied to every generated reply.
pub fn postprocess(raw: &str, prompt: &str) -> String {
    let cleaned = clean_response(raw, prompt);
    let reply = dedupe_sentences(truncate_at_language_switch(&cleaned));
    if reply.chars().count() < MIN_REPLY_CHARS {
        return NO_ANSWER_FALLBACK.to_string();
    }
    reply
}
