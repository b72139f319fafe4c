// src/core/sanitize.rs

/// Placeholder the G2B services use for an empty cell.
pub const MISSING_MARKER: &str = "정보없음";

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Whitespace-normalized cell value, or `None` for blanks and the missing marker.
pub fn clean_cell(s: &str) -> Option<String> {
    let v = normalize_ws(s);
    if v.is_empty() || v == MISSING_MARKER { None } else { Some(v) }
}

/// Filesystem-safe stem for an export label. Keeps any alphanumeric script.
pub fn sanitize_label(name: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_us = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() { out.push(ch); last_us = false; }
        else if ch.is_whitespace() { if !last_us { out.push('_'); last_us = true; } }
        else if ch=='-' || ch=='_' { if !(last_us && ch=='_') { out.push(ch); } last_us = ch=='_'; }
    }
    let out = out.trim_matches('_').to_string();
    if out.is_empty() { fallback.to_string() } else { out }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells() {
        assert_eq!(clean_cell("  a \n\t b "), Some(s!("a b")));
        assert_eq!(clean_cell(" 정보없음 "), None);
        assert_eq!(clean_cell("\u{a0}"), None);
    }

    #[test]
    fn labels() {
        assert_eq!(sanitize_label("입찰 공고", "x"), "입찰_공고");
        assert_eq!(sanitize_label("../etc/passwd", "x"), "etcpasswd");
        assert_eq!(sanitize_label("///", "bids"), "bids");
    }
}
