//! Heading slugs.

/// Derive a URL-safe id from heading text.
///
/// Lowercases, drops every character outside `[a-z0-9]`, whitespace and `-`,
/// turns whitespace runs into a single `-`, collapses repeated `-`, and trims
/// `-` from both ends. Identical texts always give identical slugs.
pub fn slug(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if c == '-' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
        } else if c.is_ascii_lowercase() || c.is_ascii_digit() {
            out.push(c);
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn punctuation_is_dropped() {
        assert_eq!(slug("Hello, World!"), "hello-world");
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(slug("  multiple   spaces  "), "multiple-spaces");
        assert_eq!(slug("tabs\tand\nnewlines"), "tabs-and-newlines");
    }

    #[test]
    fn empty_and_symbol_only_text() {
        assert_eq!(slug(""), "");
        assert_eq!(slug("!!! ???"), "");
    }

    #[test]
    fn hyphens_collapse_and_trim() {
        assert_eq!(slug("-- Rust -- 2024 --"), "rust-2024");
        assert_eq!(slug("a - b"), "a-b");
    }

    #[test]
    fn non_ascii_letters_are_stripped() {
        assert_eq!(slug("Café Déjà vu"), "caf-dj-vu");
    }

    #[test]
    fn dropped_characters_do_not_split_words() {
        assert_eq!(slug("What's new in v1.2?"), "whats-new-in-v12");
    }
}
