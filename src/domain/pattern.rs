//! Pattern normalization
//!
//! The docs site decorates published patterns with grouped-alternation
//! markers of the form `{{group|label|value}}`. Only `value` is meaningful
//! when deciding whether a pattern changed, so comparisons collapse each
//! marker to its value first.
//!
//! The "friendly" rewrites turn raw registration patterns into something
//! readable before they are published.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static GROUP_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(.+?)\|(.+?)\|(.+?)\}\}").expect("valid marker regex"));

static PARSE_MARK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+¦").expect("valid parse mark regex"));

static ESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\(.)").expect("valid escape regex"));

/// Escaped pairs and `(?` openers are matched first so they are left alone.
static OPTIONAL_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\\.|\(\?|\(([^()?][^()]*)\)\?").expect("valid optional group regex")
});

static OPTIONAL_CHAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\.|\(\?|([^()])\?").expect("valid optional char regex"));

/// Collapses every `{{group|label|value}}` marker to `value`
pub fn normalize(pattern: &str) -> Cow<'_, str> {
    GROUP_MARKER.replace_all(pattern, "$3")
}

/// Compares two patterns after normalization; absent patterns equal empty ones
pub fn equals_patterns(a: Option<&str>, b: Option<&str>) -> bool {
    normalize(a.unwrap_or("")) == normalize(b.unwrap_or(""))
}

/// Strips numeric parse marks (`1¦`) and backslash escapes
///
/// ```text
/// (1¦one|2¦two) of %player%   -> (one|two) of %player%
/// do \function\(%objects%\)   -> do function(%objects%)
/// ```
pub fn friendly(pattern: &str) -> String {
    let unmarked = PARSE_MARK.replace_all(pattern, "");
    ESCAPE.replace_all(&unmarked, "$1").into_owned()
}

/// Rewrites a type's user-input regex into bracket-optional notation
///
/// ```text
/// some ?example(s)?  -> some[ ]example[s]
/// ```
///
/// Escapes such as `\d?` and non-capturing openers such as `(?:` are kept.
pub fn friendly_type_pattern(regex: &str) -> String {
    let groups = bracket_optionals(&OPTIONAL_GROUP, regex);
    bracket_optionals(&OPTIONAL_CHAR, &groups).into_owned()
}

fn bracket_optionals<'a>(regex: &Regex, text: &'a str) -> Cow<'a, str> {
    regex.replace_all(text, |caps: &Captures| match caps.get(1) {
        Some(optional) => format!("[{}]", optional.as_str()),
        None => caps[0].to_string(),
    })
}
