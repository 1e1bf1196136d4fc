use crate::model::ONE_SIZE;
use once_cell::sync::Lazy;
use regex::Regex;

/// Longest numeric range that is still expanded into individual sizes.
pub const MAX_RANGE_LEN: u32 = 30;

static LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:размеры|размера|размер|sizes|size)\b[ \t]*:?[ \t]*([^\r\n]*)")
        .expect("size label pattern")
});
static RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s*-\s*(\d+)$").expect("size range pattern"));
static SINGLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\p{N}]+$").expect("single size pattern"));

/// Extract the size list from a post. Never returns an empty list.
pub fn extract_sizes(text: &str) -> Vec<String> {
    let fragment = LABEL
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty());
    match fragment {
        Some(fragment) => classify(fragment),
        None => vec![ONE_SIZE.to_string()],
    }
}

fn classify(fragment: &str) -> Vec<String> {
    if let Some(caps) = RANGE.captures(fragment) {
        if let Some(sizes) = expand_range(&caps[1], &caps[2]) {
            return sizes;
        }
        return vec![fragment.to_string()];
    }

    if SINGLE.is_match(fragment) {
        return vec![fragment.to_uppercase()];
    }

    if fragment.contains([',', '/']) {
        let sizes: Vec<String> = fragment
            .split([',', '/'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_uppercase)
            .collect();
        if !sizes.is_empty() {
            return sizes;
        }
    }

    vec![fragment.to_string()]
}

/// Expand `start-end` into every integer in between, inclusive. Returns
/// `None` for descending, unparsable or overly long ranges.
fn expand_range(start: &str, end: &str) -> Option<Vec<String>> {
    let start: u32 = start.parse().ok()?;
    let end: u32 = end.parse().ok()?;
    if start > end || end - start >= MAX_RANGE_LEN {
        return None;
    }
    Some((start..=end).map(|n| n.to_string()).collect())
}
