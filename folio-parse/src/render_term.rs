//! ANSI terminal preview.
//!
//! Produces colored terminal output using the `colored` crate so authors can
//! eyeball how a post was split into blocks. This is not the site renderer.

use colored::Colorize;

use crate::toc::TocGroup;
use crate::types::{ContentBlock, HeadingRef};

/// Render a block sequence as ANSI-colored terminal text.
pub fn to_terminal(blocks: &[ContentBlock]) -> String {
    blocks.iter().map(render_block).collect::<Vec<_>>().join("\n\n")
}

/// Render a flat heading list, indenting by level.
pub fn toc_to_terminal(headings: &[HeadingRef]) -> String {
    headings
        .iter()
        .map(|h| {
            let indent = "  ".repeat(usize::from(h.level.saturating_sub(1)));
            format!("{indent}{} {}", h.text, format!("#{}", h.id).dimmed())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render grouped headings: parents in bold, children beneath them.
pub fn groups_to_terminal(groups: &[TocGroup]) -> String {
    let mut lines = Vec::new();
    for group in groups {
        lines.push(format!(
            "{} {}",
            group.parent.text.bold(),
            format!("#{}", group.parent.id).dimmed()
        ));
        for child in &group.children {
            lines.push(format!("  \u{2514} {} {}", child.text, format!("#{}", child.id).dimmed())); // └
        }
    }
    lines.join("\n")
}

fn render_block(block: &ContentBlock) -> String {
    match block {
        ContentBlock::Paragraph { text } => text.clone(),

        ContentBlock::Heading { text, level } => {
            let marks = "#".repeat(usize::from(*level));
            match level {
                1 => format!("{}", format!("{marks} {text}").bold().underline()),
                2 => format!("{}", format!("{marks} {text}").bold()),
                _ => format!("{}", format!("{marks} {text}").italic()),
            }
        }

        ContentBlock::Code {
            text,
            language,
            filename,
        } => {
            let label: Vec<&str> = [language.as_deref(), filename.as_deref()]
                .into_iter()
                .flatten()
                .collect();
            let label = if label.is_empty() {
                String::new()
            } else {
                format!(" {}", label.join(" \u{00B7} ").dimmed()) // ·
            };
            let border = format!("{}", "\u{2500}\u{2500}\u{2500}".dimmed()); // ───
            let mut lines = vec![format!("{border}{label}")];
            for line in text.lines() {
                lines.push(format!("  {line}"));
            }
            lines.push(border.clone());
            lines.join("\n")
        }

        ContentBlock::InlineCode { text } => format!("{}", format!("`{text}`").cyan()),

        ContentBlock::List { items } => items
            .iter()
            .map(|item| format!("  \u{2022} {item}")) // •
            .collect::<Vec<_>>()
            .join("\n"),

        ContentBlock::OrderedList { items } => items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("  {}. {item}", i + 1))
            .collect::<Vec<_>>()
            .join("\n"),

        ContentBlock::Blockquote { text } => {
            let border = format!("{}", "\u{2502}".dimmed()); // │
            text.lines()
                .map(|l| format!("{border} {}", l.italic()))
                .collect::<Vec<_>>()
                .join("\n")
        }

        ContentBlock::Divider => format!("{}", "\u{2500}".repeat(40).dimmed()),

        ContentBlock::Image { src, alt, caption } => {
            let label = caption.as_deref().or(alt.as_deref()).unwrap_or("Image");
            format!("{}", format!("[Image: {label}] ({src})").dimmed())
        }

        ContentBlock::Table { headers, rows } => render_table(headers, rows),
    }
}

fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    if headers.is_empty() {
        return String::new();
    }

    // Calculate column widths
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let separator: String = widths
        .iter()
        .map(|&w| "\u{2500}".repeat(w + 2)) // ─
        .collect::<Vec<_>>()
        .join("\u{253C}"); // ┼

    let format_row = |cells: &[String]| -> String {
        let cells: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!(" {:width$} ", c, width = w))
            .collect();
        format!("\u{2502}{}\u{2502}", cells.join("\u{2502}"))
    };

    let mut lines = vec![
        format!("{}", format_row(headers).bold()),
        format!("\u{2502}{separator}\u{2502}"),
    ];
    lines.extend(rows.iter().map(|row| format_row(row.as_slice())));
    lines.join("\n")
}

// ------------------------------------------------------------------
// Tests
// ------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use crate::toc::{group_headings, headings};

    #[test]
    fn term_heading_has_color() {
        // Force colors on; the colored crate disables them when stdout is not a tty.
        colored::control::set_override(true);

        let output = to_terminal(&parse("# Title"));
        assert!(
            output.contains("\x1b["),
            "Terminal output should contain ANSI escape codes, got: {output:?}"
        );
        assert!(output.contains("# Title"));

        colored::control::unset_override();
    }

    #[test]
    fn term_lists_use_markers() {
        let output = to_terminal(&parse("- a\n- b\n\n1. x\n2. y"));
        assert!(output.contains("\u{2022} a"), "Should contain bullet"); // •
        assert!(output.contains("2. y"));
    }

    #[test]
    fn term_table_aligns_columns() {
        let output = to_terminal(&parse("| Name | N |\n|---|---|\n| longer name | 1 |"));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].contains(" longer name "));
        assert!(lines[0].contains(" Name        "));
    }

    #[test]
    fn term_code_shows_language_and_filename() {
        let output = to_terminal(&parse("```rust main.rs\nfn main() {}\n```"));
        assert!(output.contains("rust"));
        assert!(output.contains("main.rs"));
        assert!(output.contains("  fn main() {}"));
    }

    #[test]
    fn toc_indents_by_level() {
        let list = headings(&parse("# A\n## B\n### C"));
        let output = toc_to_terminal(&list);
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].starts_with("A "));
        assert!(lines[1].starts_with("  B "));
        assert!(lines[2].starts_with("    C "));
    }

    #[test]
    fn grouped_toc_lists_children() {
        let groups = group_headings(&headings(&parse("## One\n### Sub")));
        let output = groups_to_terminal(&groups);
        assert!(output.contains("One"));
        assert!(output.contains("\u{2514} Sub"));
    }
}
