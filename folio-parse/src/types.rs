use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A parsed block of post content.
///
/// The block sequence is flat: no variant carries nested blocks, and the
/// order of the sequence is the order of the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentBlock {
    /// Run of plain text lines joined with single spaces.
    Paragraph { text: String },
    /// Section heading, `level` is always 1, 2 or 3.
    Heading { text: String, level: u8 },
    /// Fenced code region, captured verbatim.
    Code {
        text: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        filename: Option<String>,
    },
    /// A standalone line made of a single backtick span.
    InlineCode { text: String },
    /// Unordered list.
    List { items: Vec<String> },
    /// Numbered list.
    OrderedList { items: Vec<String> },
    /// Quote lines merged with line breaks.
    Blockquote { text: String },
    /// Thematic break.
    Divider,
    /// Standalone image with an optional caption line.
    Image {
        src: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    /// Pipe table. Every row has exactly `headers.len()` cells.
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
}

impl ContentBlock {
    /// Name of the block type as it appears in serialized output.
    pub fn kind(&self) -> &'static str {
        match self {
            ContentBlock::Paragraph { .. } => "paragraph",
            ContentBlock::Heading { .. } => "heading",
            ContentBlock::Code { .. } => "code",
            ContentBlock::InlineCode { .. } => "inline-code",
            ContentBlock::List { .. } => "list",
            ContentBlock::OrderedList { .. } => "ordered-list",
            ContentBlock::Blockquote { .. } => "blockquote",
            ContentBlock::Divider => "divider",
            ContentBlock::Image { .. } => "image",
            ContentBlock::Table { .. } => "table",
        }
    }
}

/// A heading as seen by the table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingRef {
    /// Slug of `text`, also the DOM id of the rendered heading.
    pub id: String,
    pub text: String,
    pub level: u8,
}

/// YAML front matter of a post.
///
/// Known fields are typed; unknown fields are captured in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    /// Any front matter fields not covered by typed fields above.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

/// A loaded blog post: metadata plus its parsed block sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Opaque document identifier supplied by the loader (file stem on disk).
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub content: Vec<ContentBlock>,
    /// Front matter as written, if the post had any.
    #[serde(skip)]
    pub front_matter: Option<FrontMatter>,
}

/// Index entry for a post, without its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            category: post.category.clone(),
            date: post.date.clone(),
            tags: post.tags.clone(),
        }
    }
}
