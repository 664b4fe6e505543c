//! Post loading: front matter extraction plus block parsing.

use crate::error::{Diagnostic, DocumentError};
use crate::parse::parse;
use crate::types::{ContentBlock, FrontMatter, Post};

/// Category used when a post's front matter does not name one.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Result of loading a post.
#[derive(Debug, Clone)]
pub struct LoadedPost {
    /// The loaded post.
    pub post: Post,
    /// Non-fatal diagnostics collected while loading.
    pub diagnostics: Vec<Diagnostic>,
}

impl Post {
    /// Load a post from its raw source text.
    ///
    /// `id` is the opaque document identifier supplied by the caller. This
    /// function never fails: front matter problems become diagnostics and
    /// the body is parsed regardless.
    pub fn load(id: &str, raw: &str) -> LoadedPost {
        let normalised = raw.replace("\r\n", "\n");
        let lines: Vec<&str> = normalised.split('\n').collect();

        let (front_matter, body_start, error) = match extract_front_matter(&lines) {
            Ok(Some((fm, body_start))) => (Some(fm), body_start, None),
            Ok(None) => (None, 0, None),
            Err((err, body_start)) => (None, body_start, Some(err)),
        };

        let body = lines.get(body_start..).unwrap_or_default().join("\n");
        let content = parse(&body);

        let fm = front_matter.clone().unwrap_or_default();
        let title = fm
            .title
            .filter(|t| !t.trim().is_empty())
            .or_else(|| first_heading(&content))
            .unwrap_or_else(|| {
                tracing::debug!(id, "Post has no title or heading; using its id");
                id.to_string()
            });

        let post = Post {
            id: id.to_string(),
            title,
            category: fm
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            date: fm.date,
            tags: fm.tags.unwrap_or_default(),
            content,
            front_matter,
        };

        LoadedPost {
            post,
            diagnostics: error.into_iter().map(Diagnostic::from).collect(),
        }
    }
}

fn first_heading(content: &[ContentBlock]) -> Option<String> {
    content.iter().find_map(|block| match block {
        ContentBlock::Heading { text, .. } => Some(text.clone()),
        _ => None,
    })
}

/// Try to extract YAML front matter from the beginning of the document.
///
/// Returns `Ok(Some((front_matter, first_body_line)))` when present,
/// `Ok(None)` when the document has none, and on failure the error together
/// with the line the body starts at.
fn extract_front_matter(lines: &[&str]) -> Result<Option<(FrontMatter, usize)>, (DocumentError, usize)> {
    if lines.first().is_none_or(|first| first.trim() != "---") {
        return Ok(None);
    }

    let Some(end_idx) = lines.iter().skip(1).position(|line| line.trim() == "---").map(|i| i + 1) else {
        // No closing `---`: treat the whole thing as body text.
        return Err((DocumentError::UnclosedFrontMatter, 0));
    };

    let yaml_str = lines[1..end_idx].join("\n");
    if yaml_str.trim().is_empty() {
        return Ok(Some((FrontMatter::default(), end_idx + 1)));
    }

    // A body that opens with a `---` divider is not front matter unless the
    // block between the rules is a YAML mapping.
    match serde_yaml::from_str::<serde_yaml::Value>(&yaml_str) {
        Ok(serde_yaml::Value::Mapping(_)) => {}
        Ok(serde_yaml::Value::Null) => return Ok(Some((FrontMatter::default(), end_idx + 1))),
        Ok(_) => {
            tracing::debug!("Leading `---` block is not a mapping; reading it as body text");
            return Ok(None);
        }
        Err(e) => return Err((front_matter_error(&e), end_idx + 1)),
    }

    serde_yaml::from_str::<FrontMatter>(&yaml_str)
        .map(|fm| Some((fm, end_idx + 1)))
        .map_err(|e| (front_matter_error(&e), end_idx + 1))
}

fn front_matter_error(e: &serde_yaml::Error) -> DocumentError {
    DocumentError::FrontMatter {
        message: e.to_string(),
        line: e.location().map_or(1, |loc| loc.line() + 1),
    }
}
