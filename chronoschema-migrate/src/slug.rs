//! Filename normalization.

use unicode_normalization::UnicodeNormalization;

/// Convert `value` into a lowercase, hyphen-joined filename fragment.
///
/// Unless `allow_unicode` is set the text is NFKD-decomposed and folded to
/// ASCII, dropping anything that has no ASCII form. Characters other than
/// word characters, whitespace and hyphens are removed, runs of whitespace
/// and hyphens collapse into one hyphen, and leading/trailing hyphens and
/// underscores are trimmed.
pub fn slugify(value: &str, allow_unicode: bool) -> String {
    let normalized: String = if allow_unicode {
        value.nfkc().collect()
    } else {
        value.nfkd().filter(char::is_ascii).collect()
    };

    let mut slug = String::with_capacity(normalized.len());
    let mut pending_separator = false;

    for c in normalized.to_lowercase().chars() {
        if c == '-' || c.is_whitespace() {
            pending_separator = true;
        } else if c.is_alphanumeric() || c == '_' {
            if pending_separator {
                slug.push('-');
                pending_separator = false;
            }
            slug.push(c);
        }
    }

    slug.trim_matches(&['-', '_'][..]).to_string()
}
