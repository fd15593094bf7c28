use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALNUM_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("non-alnum regex"));

/// Lowercase, ASCII-alphanumeric runs joined by single hyphens. Falls back to
/// `section` when nothing alphanumeric remains.
pub fn slugify(text: &str) -> String {
    let lower = text.trim().to_lowercase();
    let slug = NON_ALNUM_RUN_RE.replace_all(&lower, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug.to_string()
    }
}
