use std::path::Path;

/// Builds a URL-safe slug from free text: diacritics are transliterated,
/// anything outside `[a-z0-9 -]` is dropped, whitespace becomes `-` and
/// hyphen runs collapse.
pub fn slugify(text: &str) -> String {
    let ascii = deunicode::deunicode(text).to_lowercase();

    let mut out = String::with_capacity(ascii.len());
    let mut pending_hyphen = false;
    for ch in ascii.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(ch);
        } else if ch == '-' || ch.is_whitespace() {
            pending_hyphen = true;
        }
    }
    out
}

/// Lowercase ASCII alphanumerics separated by single hyphens.
pub fn is_url_safe(slug: &str) -> bool {
    !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Slug implied by a post's file name (`2024-01-10-hello.md` → `2024-01-10-hello`).
pub fn from_filename(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    Some(stem.to_owned())
}
