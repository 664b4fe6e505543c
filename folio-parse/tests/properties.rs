//! Property-based tests using proptest.
//!
//! These tests verify that the parser is total and deterministic on arbitrary
//! input, and that the table of contents stays in step with the block list.

use folio_parse::{ContentBlock, parse, slug, toc};
use proptest::prelude::*;

/// Lines built from the tokens the parser sniffs for, so generated documents
/// actually exercise fences, tables and lists.
fn markdownish_line() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z ,.!?]{0,30}",
        "#{1,5} [A-Za-z ]{0,20}",
        Just("```".to_string()),
        Just("```rust main.rs".to_string()),
        "[-*+] [a-z]{1,10}",
        "[0-9]{1,2}\\. [a-z]{1,10}",
        "> [a-z ]{0,20}",
        Just("---".to_string()),
        "\\| [a-z]{1,5} \\| [a-z]{1,5} \\|",
        Just("| --- | --- |".to_string()),
        "!\\[[a-z ]{0,8}\\]\\(/[a-z]{1,8}\\.png\\)",
        Just(String::new()),
    ]
}

proptest! {
    /// Any random string fed to the parser should never cause a panic.
    #[test]
    fn any_input_no_panic(input in "\\PC{0,500}") {
        let blocks = parse(&input);
        let _ = blocks.len();
    }

    /// Same input, same blocks.
    #[test]
    fn parse_is_deterministic(lines in prop::collection::vec(markdownish_line(), 0..40)) {
        let input = lines.join("\n");
        prop_assert_eq!(parse(&input), parse(&input));
    }

    /// Every heading block shows up once, in order, in the TOC.
    #[test]
    fn toc_covers_every_heading(lines in prop::collection::vec(markdownish_line(), 0..40)) {
        let blocks = parse(&lines.join("\n"));
        let from_blocks: Vec<(String, u8)> = blocks
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Heading { text, level } => Some((text.clone(), *level)),
                _ => None,
            })
            .collect();
        let from_toc: Vec<(String, u8)> = toc::headings(&blocks)
            .into_iter()
            .map(|h| (h.text, h.level))
            .collect();
        prop_assert_eq!(from_blocks, from_toc);
    }

    /// Blocks never carry blank text and headings never exceed level 3.
    #[test]
    fn blocks_are_well_formed(lines in prop::collection::vec(markdownish_line(), 0..40)) {
        for block in parse(&lines.join("\n")) {
            match block {
                ContentBlock::Paragraph { text } | ContentBlock::Blockquote { text } => {
                    prop_assert!(!text.trim().is_empty());
                    prop_assert_eq!(text.trim(), text.as_str());
                }
                ContentBlock::Heading { level, .. } => prop_assert!((1..=3).contains(&level)),
                ContentBlock::List { items } | ContentBlock::OrderedList { items } => {
                    prop_assert!(!items.is_empty());
                }
                ContentBlock::Table { headers, rows } => {
                    prop_assert!(!rows.is_empty());
                    for row in rows {
                        prop_assert_eq!(row.len(), headers.len());
                    }
                }
                _ => {}
            }
        }
    }

    /// Slugs only ever contain `[a-z0-9-]` with no doubled or edge hyphens.
    #[test]
    fn slug_shape(text in "\\PC{0,60}") {
        let s = slug(&text);
        prop_assert!(s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        prop_assert!(!s.starts_with('-') && !s.ends_with('-'));
        prop_assert!(!s.contains("--"));
        prop_assert_eq!(slug(&s), s.clone());
    }
}
