//! Name matching and path utilities.

use std::path::Path;

/// Wildcard pattern matching (supports `*` and `?`).
/// Case-insensitive and anchored: the pattern must cover the whole name, a
/// bare substring never matches.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pat: Vec<char> = pattern.chars().flat_map(char::to_lowercase).collect();
    let txt: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();
    match_inner(&pat, &txt)
}

fn match_inner(pat: &[char], text: &[char]) -> bool {
    match pat.first() {
        None => text.is_empty(),
        Some('*') => {
            if match_inner(&pat[1..], text) {
                return true;
            }
            !text.is_empty() && match_inner(pat, &text[1..])
        }
        Some('?') => !text.is_empty() && match_inner(&pat[1..], &text[1..]),
        Some(&c) => text.first() == Some(&c) && match_inner(&pat[1..], &text[1..]),
    }
}

/// True when `name` matches any of `patterns` (logical OR, order-independent).
/// An empty pattern set matches everything: it means filtering is off, not
/// that nothing matches.
pub fn matches_any_pattern(name: &str, patterns: &[String]) -> bool {
    if patterns.is_empty() {
        return true;
    }
    patterns.iter().any(|p| glob_match(p, name))
}

/// Case-insensitive extension test against the configured source extensions.
pub fn has_source_extension(path: &Path, exts: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    exts.iter().any(|e| e.eq_ignore_ascii_case(ext))
}
