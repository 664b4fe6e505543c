use std::collections::BTreeMap;

use crate::error::AttrError;

/// A tokenized fence info string (the text after the opening backticks).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoString {
    /// Bare words in order of appearance.
    pub words: Vec<String>,
    /// `key=value` pairs. Later keys overwrite earlier ones.
    pub attrs: BTreeMap<String, String>,
}

/// Parse a fence info string into words and attributes.
///
/// Accepted forms:
///   - `rust src/main.rs`
///   - `rust title="my file.rs"`
///   - `{.rust filename=main.rs}` (surrounding braces and a leading dot are stripped)
///
/// Quoted values may contain spaces and `\"` escapes.
pub fn parse_info(input: &str) -> Result<InfoString, AttrError> {
    let trimmed = input.trim();

    let inner = if trimmed.starts_with('{') && trimmed.ends_with('}') && trimmed.len() >= 2 {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    let chars: Vec<char> = inner.chars().collect();
    let len = chars.len();
    let mut pos = 0;
    let mut info = InfoString::default();

    while pos < len {
        while pos < len && chars[pos].is_whitespace() {
            pos += 1;
        }
        if pos >= len {
            break;
        }

        // A word runs until whitespace or `=`.
        let word_start = pos;
        while pos < len && !chars[pos].is_whitespace() && chars[pos] != '=' {
            pos += 1;
        }
        let word: String = chars[word_start..pos].iter().collect();

        if pos < len && chars[pos] == '=' {
            pos += 1;
            if word.is_empty() {
                return Err(AttrError::MissingKey { position: word_start });
            }

            if pos < len && chars[pos] == '"' {
                pos += 1;
                let mut value = String::new();
                while pos < len && chars[pos] != '"' {
                    if chars[pos] == '\\' && pos + 1 < len && matches!(chars[pos + 1], '"' | '\\') {
                        value.push(chars[pos + 1]);
                        pos += 2;
                    } else {
                        value.push(chars[pos]);
                        pos += 1;
                    }
                }
                if pos >= len {
                    return Err(AttrError::UnterminatedQuote { key: word });
                }
                pos += 1; // closing quote
                info.attrs.insert(word, value);
            } else {
                let val_start = pos;
                while pos < len && !chars[pos].is_whitespace() {
                    pos += 1;
                }
                let value: String = chars[val_start..pos].iter().collect();
                info.attrs.insert(word, value);
            }
        } else {
            let word = word.strip_prefix('.').map(str::to_string).unwrap_or(word);
            if !word.is_empty() {
                info.words.push(word);
            }
        }
    }

    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_empty_info() {
        let info = parse_info("").unwrap();
        assert!(info.words.is_empty());
        assert!(info.attrs.is_empty());
    }

    #[test]
    fn parse_bare_words() {
        let info = parse_info("rust src/main.rs").unwrap();
        assert_eq!(info.words, vec!["rust", "src/main.rs"]);
    }

    #[test]
    fn parse_quoted_value() {
        let info = parse_info(r#"rust title="hello world.rs""#).unwrap();
        assert_eq!(info.words, vec!["rust"]);
        assert_eq!(info.attrs["title"], "hello world.rs");
    }

    #[test]
    fn parse_braced_form() {
        let info = parse_info("{.python filename=app.py}").unwrap();
        assert_eq!(info.words, vec!["python"]);
        assert_eq!(info.attrs["filename"], "app.py");
    }

    #[test]
    fn parse_escaped_quote() {
        let info = parse_info(r#"title="say \"hi\"""#).unwrap();
        assert_eq!(info.attrs["title"], r#"say "hi""#);
    }

    #[test]
    fn unterminated_quote_is_an_error() {
        let err = parse_info(r#"rust title="oops"#).unwrap_err();
        assert!(matches!(err, AttrError::UnterminatedQuote { .. }));
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = parse_info("=value").unwrap_err();
        assert!(matches!(err, AttrError::MissingKey { position: 0 }));
    }
}
