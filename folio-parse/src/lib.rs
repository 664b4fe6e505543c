//! `folio-parse`: content pipeline for the folio blog.
//!
//! Turns raw post text into a flat sequence of typed [`ContentBlock`]s, derives
//! the table of contents from it, and keeps the TOC's active heading in sync
//! with scrolling through [`nav::Navigator`].
//!
//! # Quick start
//!
//! ```
//! let blocks = folio_parse::parse("# Hello\n\n- one\n- two\n");
//! assert_eq!(blocks.len(), 2);
//!
//! let toc = folio_parse::toc::headings(&blocks);
//! assert_eq!(toc[0].id, "hello");
//! ```

pub mod attrs;
pub mod blocks;
pub mod document;
pub mod error;
pub mod nav;
pub mod parse;
#[cfg(feature = "terminal")]
pub mod render_term;
pub mod slug;
pub mod toc;
pub mod types;
pub mod validate;

pub use document::LoadedPost;
pub use error::*;
pub use parse::parse;
pub use slug::slug;
pub use types::*;

impl Post {
    /// Headings of this post as seen by the table of contents.
    pub fn headings(&self) -> Vec<HeadingRef> {
        toc::headings(&self.content)
    }

    /// Index entry for this post.
    pub fn summary(&self) -> PostSummary {
        PostSummary::from(self)
    }

    /// Validate this post and return any diagnostics.
    pub fn validate(&self) -> Vec<Diagnostic> {
        validate::validate(self)
    }

    /// Render this post's blocks as ANSI-colored terminal text.
    #[cfg(feature = "terminal")]
    pub fn to_terminal(&self) -> String {
        render_term::to_terminal(&self.content)
    }
}
