//! Line tokenization shared by every language.

use std::sync::OnceLock;

use regex::Regex;

fn split_regex() -> &'static Regex {
    static SPLIT: OnceLock<Regex> = OnceLock::new();
    SPLIT.get_or_init(|| {
        Regex::new(r#"[\s,;:*()\[\]{}+=&$!.><#@?/\\|%^~`'"-]+"#).expect("valid regex")
    })
}

/// Split a line into lowercase tokens on whitespace and punctuation.
///
/// # Examples
///
/// ```
/// use stackpulse_extractors::tokenizer::split_tokens;
///
/// let tokens = split_tokens("List<String> xs = new ArrayList<>();");
/// assert_eq!(tokens, vec!["list", "string", "xs", "new", "arraylist"]);
/// ```
pub fn split_tokens(line: &str) -> Vec<String> {
    split_regex()
        .split(line)
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Drop everything up to and including the match of an anchored `marker`.
///
/// `marker` is expected to start with `^` so the whole prefix goes, leaving
/// only the trailing text. Lines without a match are returned unchanged.
pub fn keep_after_marker<'a>(marker: &Regex, line: &'a str) -> &'a str {
    match marker.find(line) {
        Some(m) => &line[m.end()..],
        None => line,
    }
}
