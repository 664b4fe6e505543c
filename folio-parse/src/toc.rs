//! Table-of-contents derivation from a block sequence.

use serde::{Deserialize, Serialize};

use crate::blocks::MAX_HEADING_LEVEL;
use crate::slug::slug;
use crate::types::{ContentBlock, HeadingRef};

/// Every heading block of level 1 to 3, in document order.
pub fn headings(blocks: &[ContentBlock]) -> Vec<HeadingRef> {
    blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Heading { text, level } if *level <= MAX_HEADING_LEVEL => Some(HeadingRef {
                id: slug(text),
                text: text.clone(),
                level: *level,
            }),
            _ => None,
        })
        .collect()
}

/// A top-level TOC entry and the level-3 headings nested under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocGroup {
    pub parent: HeadingRef,
    pub children: Vec<HeadingRef>,
}

impl TocGroup {
    /// True if `id` is the parent or one of its children.
    pub fn contains(&self, id: &str) -> bool {
        self.parent.id == id || self.children.iter().any(|child| child.id == id)
    }
}

/// Group headings under their nearest preceding level-1 or level-2 heading.
///
/// A level-3 heading with no open group becomes a group of its own.
pub fn group_headings(headings: &[HeadingRef]) -> Vec<TocGroup> {
    let mut groups: Vec<TocGroup> = Vec::new();

    for heading in headings {
        match groups.last_mut() {
            Some(group) if heading.level == MAX_HEADING_LEVEL => {
                group.children.push(heading.clone());
            }
            _ => groups.push(TocGroup {
                parent: heading.clone(),
                children: Vec::new(),
            }),
        }
    }

    groups
}

/// Index of the group holding `active_id`.
///
/// Falls back to the first group when `active_id` is empty or matches
/// nothing; `None` only when there are no groups at all.
pub fn active_group(groups: &[TocGroup], active_id: Option<&str>) -> Option<usize> {
    if groups.is_empty() {
        return None;
    }
    let found = active_id
        .filter(|id| !id.is_empty())
        .and_then(|id| groups.iter().position(|group| group.contains(id)));
    Some(found.unwrap_or(0))
}
