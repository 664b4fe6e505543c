//! Authoring checks for loaded posts.
//!
//! Checks front matter completeness and the things that would make the table
//! of contents or images misbehave. Returns a list of `Diagnostic` items
//! (non-fatal).

use std::collections::HashMap;

use crate::error::{Diagnostic, Severity};
use crate::toc::headings;
use crate::types::{ContentBlock, Post};

/// Validate a loaded post and return any diagnostics.
///
/// This function never modifies the post. Duplicate heading ids are reported
/// but left as they are: both headings keep the same id.
pub fn validate(post: &Post) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    validate_front_matter(post, &mut diagnostics);
    validate_headings(post, &mut diagnostics);

    for block in &post.content {
        validate_block(block, &mut diagnostics);
    }

    diagnostics
}

fn validate_front_matter(post: &Post, diagnostics: &mut Vec<Diagnostic>) {
    let fm = post.front_matter.as_ref();

    if fm.and_then(|fm| fm.title.as_ref()).is_none() {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message: format!("Missing front matter field: title (using \"{}\")", post.title),
            line: None,
            code: Some("V001".into()),
        });
    }
    if fm.and_then(|fm| fm.date.as_ref()).is_none() {
        diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            message: "Missing front matter field: date".into(),
            line: None,
            code: Some("V002".into()),
        });
    }
}

fn validate_headings(post: &Post, diagnostics: &mut Vec<Diagnostic>) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let list = headings(&post.content);

    for heading in &list {
        if heading.id.is_empty() {
            diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                message: format!(
                    "Heading \"{}\" has no letters or digits and cannot be linked from the table of contents",
                    heading.text
                ),
                line: None,
                code: Some("V005".into()),
            });
            continue;
        }

        let count = seen.entry(heading.id.as_str()).or_default();
        *count += 1;
        if *count == 2 {
            diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                message: format!(
                    "Duplicate heading id '{}': the table of contents can only reach the first one",
                    heading.id
                ),
                line: None,
                code: Some("V003".into()),
            });
        }
    }
}

fn validate_block(block: &ContentBlock, diagnostics: &mut Vec<Diagnostic>) {
    if let ContentBlock::Image { src, alt: None, .. } = block {
        diagnostics.push(Diagnostic {
            severity: Severity::Info,
            message: format!("Image '{src}' has no alt text"),
            line: None,
            code: Some("V004".into()),
        });
    }
}
