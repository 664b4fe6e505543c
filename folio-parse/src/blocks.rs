//! Line classifiers and per-block content helpers.
//!
//! Every classifier takes a line with surrounding whitespace already removed
//! and answers whether that line opens (or continues) a given block type.
//! None of them look at neighbouring lines; grouping is the scanner's job.

use crate::attrs::parse_info;

/// Deepest heading level the parser recognises.
pub const MAX_HEADING_LEVEL: u8 = 3;

/// An open code fence: the fence character and how many of it opened the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fence {
    pub ch: char,
    pub len: usize,
}

/// Language and filename declared on a fence's info string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FenceInfo {
    pub language: Option<String>,
    pub filename: Option<String>,
}

/// `# text`, `## text` or `### text`. Deeper levels and empty text are rejected.
pub fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > usize::from(MAX_HEADING_LEVEL) {
        return None;
    }
    let rest = &line[hashes..];
    if !rest.starts_with([' ', '\t']) {
        return None;
    }
    let text = rest.trim();
    if text.is_empty() {
        return None;
    }
    // hashes <= 3 so the cast is lossless.
    Some((hashes as u8, text))
}

/// Three or more of the same `-`, `*` or `_`, optionally separated by spaces.
pub fn is_divider(line: &str) -> bool {
    let mut marks = line.chars().filter(|c| !c.is_whitespace());
    let Some(first) = marks.next() else {
        return false;
    };
    if !matches!(first, '-' | '*' | '_') {
        return false;
    }
    let mut count = 1;
    for c in marks {
        if c != first {
            return false;
        }
        count += 1;
    }
    count >= 3
}

/// Opening fence: three or more backticks or tildes followed by an info string.
///
/// Returns the fence and the raw info string.
pub fn fence_open(line: &str) -> Option<(Fence, &str)> {
    let ch = line.chars().next().filter(|&c| c == '`' || c == '~')?;
    let len = line.chars().take_while(|&c| c == ch).count();
    if len < 3 {
        return None;
    }
    let info = line[len..].trim();
    // A backtick in a backtick fence's info string means this is inline code.
    if ch == '`' && info.contains('`') {
        return None;
    }
    Some((Fence { ch, len }, info))
}

/// Closing fence for `open`: only the fence character, at least as many as opened.
pub fn is_fence_close(line: &str, open: Fence) -> bool {
    !line.is_empty() && line.chars().all(|c| c == open.ch) && line.chars().count() >= open.len
}

/// Read the language and optional filename from a fence info string.
///
/// Supported spellings: `rust`, `rust main.rs`, `rust:main.rs`,
/// `rust title="main.rs"`, `rust filename=main.rs`, `rust file=main.rs`.
pub fn fence_info(info: &str) -> FenceInfo {
    let parsed = match parse_info(info) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::debug!(error = %err, info, "Falling back to plain fence info words");
            crate::attrs::InfoString {
                words: info.split_whitespace().map(str::to_string).collect(),
                ..Default::default()
            }
        }
    };

    let mut words = parsed.words.into_iter();
    let (language, mut filename) = match words.next() {
        Some(first) => match first.split_once(':') {
            Some((lang, file)) => (non_empty(lang), non_empty(file)),
            None => (Some(first), None),
        },
        None => (None, None),
    };

    if filename.is_none() {
        filename = ["filename", "title", "file"]
            .iter()
            .find_map(|key| parsed.attrs.get(*key))
            .and_then(|v| non_empty(v))
            .or_else(|| words.next());
    }

    FenceInfo { language, filename }
}

/// `- item`, `* item` or `+ item`.
pub fn bullet_item(line: &str) -> Option<&str> {
    let rest = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("+ "))?;
    let item = rest.trim();
    (!item.is_empty()).then_some(item)
}

/// `1. item` or `1) item`.
pub fn ordered_item(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 || digits > 9 {
        return None;
    }
    let rest = &line[digits..];
    let rest = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") "))?;
    let item = rest.trim();
    (!item.is_empty()).then_some(item)
}

/// `> text`. One marker and one following space are stripped.
pub fn quote_line(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('>')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// A line that is exactly one backtick span: `` `code` ``.
pub fn inline_code(line: &str) -> Option<&str> {
    let inner = line.strip_prefix('`')?.strip_suffix('`')?;
    if inner.contains('`') {
        return None;
    }
    let inner = inner.trim();
    (!inner.is_empty()).then_some(inner)
}

/// `![alt](src)` or `![alt](src "title")` on its own. Returns `(src, alt)`.
pub fn image(line: &str) -> Option<(&str, Option<&str>)> {
    let rest = line.strip_prefix("![")?;
    let (alt, target) = rest.split_once("](")?;
    let target = target.strip_suffix(')')?;
    let src = target.split_whitespace().next()?;
    let alt = alt.trim();
    Some((src, (!alt.is_empty()).then_some(alt)))
}

/// Caption text for an image: surrounding emphasis markers removed.
pub fn caption(line: &str) -> Option<String> {
    let is_mark = |c: char| c == '*' || c == '_';
    let text = if line.starts_with(is_mark) && line.ends_with(is_mark) {
        line.trim_matches(is_mark).trim()
    } else {
        line
    };
    (!text.is_empty()).then(|| text.to_string())
}

/// A pipe-delimited table line.
pub fn is_table_row(line: &str) -> bool {
    line.starts_with('|')
}

/// Check whether a line is a table separator (e.g. `|---|:---:|`).
pub fn is_table_separator(line: &str) -> bool {
    line.contains('|')
        && line.contains('-')
        && line
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':') || c.is_whitespace())
}

/// Split a pipe-delimited row into trimmed cell strings, stripping leading and
/// trailing pipes.
pub fn split_pipe_row(line: &str) -> Vec<String> {
    let trimmed = line.trim();
    let inner = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    inner.split('|').map(|c| c.trim().to_string()).collect()
}

/// Pad with empty cells or drop extra cells so the row is exactly `width` wide.
pub fn fit_row(mut cells: Vec<String>, width: usize) -> Vec<String> {
    cells.resize(width, String::new());
    cells
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // -- Headings --------------------------------------------------

    #[test]
    fn heading_levels_one_to_three() {
        assert_eq!(heading("# Title"), Some((1, "Title")));
        assert_eq!(heading("## Section"), Some((2, "Section")));
        assert_eq!(heading("### Sub  "), Some((3, "Sub")));
    }

    #[test]
    fn heading_rejects_level_four_and_missing_space() {
        assert_eq!(heading("#### Too deep"), None);
        assert_eq!(heading("#hashtag"), None);
        assert_eq!(heading("#"), None);
        assert_eq!(heading("##   "), None);
    }

    // -- Dividers --------------------------------------------------

    #[test]
    fn divider_variants() {
        assert!(is_divider("---"));
        assert!(is_divider("*****"));
        assert!(is_divider("_ _ _"));
        assert!(!is_divider("--"));
        assert!(!is_divider("-*-"));
        assert!(!is_divider("**bold**"));
        assert!(!is_divider(""));
    }

    // -- Fences ----------------------------------------------------

    #[test]
    fn fence_open_and_close() {
        let (fence, info) = fence_open("````rust").unwrap();
        assert_eq!(fence, Fence { ch: '`', len: 4 });
        assert_eq!(info, "rust");
        assert!(!is_fence_close("```", fence));
        assert!(is_fence_close("`````", fence));
        assert!(!is_fence_close("~~~~", fence));
    }

    #[test]
    fn tilde_fence() {
        let (fence, info) = fence_open("~~~").unwrap();
        assert_eq!(fence.ch, '~');
        assert_eq!(info, "");
    }

    #[test]
    fn backtick_in_info_is_not_a_fence() {
        assert_eq!(fence_open("```code``` inline"), None);
        assert_eq!(fence_open("``two``"), None);
    }

    #[test]
    fn fence_info_spellings() {
        let plain = fence_info("rust");
        assert_eq!(plain.language.as_deref(), Some("rust"));
        assert_eq!(plain.filename, None);

        let word = fence_info("rust src/main.rs");
        assert_eq!(word.filename.as_deref(), Some("src/main.rs"));

        let colon = fence_info("ts:app.ts");
        assert_eq!(colon.language.as_deref(), Some("ts"));
        assert_eq!(colon.filename.as_deref(), Some("app.ts"));

        let titled = fence_info(r#"python title="my script.py""#);
        assert_eq!(titled.language.as_deref(), Some("python"));
        assert_eq!(titled.filename.as_deref(), Some("my script.py"));

        assert_eq!(fence_info(""), FenceInfo::default());
    }

    #[test]
    fn fence_info_recovers_from_bad_attrs() {
        let info = fence_info(r#"rust title="unterminated"#);
        assert_eq!(info.language.as_deref(), Some("rust"));
        assert_eq!(info.filename.as_deref(), Some(r#"title="unterminated"#));
    }

    // -- Lists and quotes ------------------------------------------

    #[test]
    fn bullet_markers() {
        assert_eq!(bullet_item("- a"), Some("a"));
        assert_eq!(bullet_item("* b"), Some("b"));
        assert_eq!(bullet_item("+  c "), Some("c"));
        assert_eq!(bullet_item("-a"), None);
        assert_eq!(bullet_item("-"), None);
    }

    #[test]
    fn ordered_markers() {
        assert_eq!(ordered_item("1. first"), Some("first"));
        assert_eq!(ordered_item("12) twelfth"), Some("twelfth"));
        assert_eq!(ordered_item("1.no space"), None);
        assert_eq!(ordered_item("v1. nope"), None);
    }

    #[test]
    fn quote_marker() {
        assert_eq!(quote_line("> hi"), Some("hi"));
        assert_eq!(quote_line(">hi"), Some("hi"));
        assert_eq!(quote_line(">> nested"), Some("> nested"));
        assert_eq!(quote_line("hi"), None);
    }

    #[test]
    fn inline_code_line() {
        assert_eq!(inline_code("`cargo build`"), Some("cargo build"));
        assert_eq!(inline_code("`a` and `b`"), None);
        assert_eq!(inline_code("``"), None);
    }

    // -- Images ----------------------------------------------------

    #[test]
    fn image_directive() {
        assert_eq!(image("![A cat](/img/cat.png)"), Some(("/img/cat.png", Some("A cat"))));
        assert_eq!(image("![](/x.png \"Title\")"), Some(("/x.png", None)));
        assert_eq!(image("![alt](/x.png) trailing"), None);
        assert_eq!(image("[link](/x)"), None);
    }

    #[test]
    fn caption_strips_emphasis() {
        assert_eq!(caption("*Figure 1*").as_deref(), Some("Figure 1"));
        assert_eq!(caption("_Sunset_").as_deref(), Some("Sunset"));
        assert_eq!(caption("Plain caption").as_deref(), Some("Plain caption"));
        assert_eq!(caption("**"), None);
    }

    // -- Tables ----------------------------------------------------

    #[test]
    fn table_separator_detection() {
        assert!(is_table_separator("|---|---|"));
        assert!(is_table_separator("| :-- | --: |"));
        assert!(!is_table_separator("---"));
        assert!(!is_table_separator("| a | b |"));
        assert!(!is_table_separator("| | |"));
    }

    #[test]
    fn split_and_fit_rows() {
        let cells = split_pipe_row("| a |  b  | c |");
        assert_eq!(cells, vec!["a", "b", "c"]);
        assert_eq!(fit_row(cells.clone(), 2), vec!["a", "b"]);
        assert_eq!(fit_row(cells, 4), vec!["a", "b", "c", ""]);
    }
}
