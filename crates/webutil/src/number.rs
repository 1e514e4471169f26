use regex::Regex;
use std::sync::LazyLock;

static GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(\d{3})").expect("grouping pattern"));

/// Insert thousands separators into the integer part: `"1234567.891"` -> `"1,234,567.891"`.
pub fn add_commas(n: &str) -> String {
    let mut parts = n.split('.');
    let mut int = parts.next().unwrap_or_default().to_string();
    let frac = parts.next().map(|f| format!(".{f}")).unwrap_or_default();
    while GROUP_RE.is_match(&int) {
        int = GROUP_RE.replace(&int, "${1},${2}").into_owned();
    }
    int + &frac
}

/// Replace `delete` chars at char offset `index` with `insert`. Out-of-range offsets clamp.
pub fn splice_str(s: &str, index: usize, delete: usize, insert: &str) -> String {
    let mut chars: Vec<char> = s.chars().collect();
    let start = index.min(chars.len());
    let end = start.saturating_add(delete).min(chars.len());
    chars.splice(start..end, insert.chars());
    chars.into_iter().collect()
}
