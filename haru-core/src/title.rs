//! Title cleanup and the dedup key used for upserts.

use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_PARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(에는|은|는|이|가|을|를|에)(\s+|$)").expect("valid regex"));

static TRAILING_ENDING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(이야|있어|있고|있습니다|예정)\s*$").expect("valid regex"));

static TRAILING_PARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(이|가|은|는|을|를)$").expect("valid regex"));

static KEY_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\s\-_.,!?'"()\[\]{}]+"#).expect("valid regex"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

fn trim_punct(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == ',' || c == '.')
}

/// Clean a raw title fragment left over after date/time tokens were removed.
///
/// Returns None when nothing usable remains.
pub fn normalize_title(raw: &str) -> Option<String> {
    let text = trim_punct(raw);
    let text = LEADING_PARTICLE.replace(text, "");
    let text = TRAILING_ENDING.replace(&text, "");
    let text = text.trim().to_string();
    // A final word of one or two syllables is kept whole ("요가", "오이").
    let last_word = text.split_whitespace().last().unwrap_or_default();
    let text = if last_word.chars().count() > 2 {
        TRAILING_PARTICLE.replace(&text, "").into_owned()
    } else {
        text
    };
    let text = WHITESPACE.replace_all(&text, " ");
    let text = trim_punct(&text);

    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Normalized title for "same schedule" matching regardless of spacing,
/// punctuation or case.
pub fn title_key(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    KEY_NOISE.replace_all(&lowered, "").into_owned()
}
