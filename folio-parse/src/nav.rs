//! Scroll-synchronized table-of-contents state.
//!
//! [`Navigator`] keeps track of which heading is "active" while the reader
//! scrolls, and performs jumps to a heading without letting the scroll events
//! produced by the jump itself overwrite the heading that was picked.
//!
//! The navigator never touches a real viewport. Hosts implement
//! [`ScrollContainer`] for their scrollable element and own the settle timer:
//! [`Navigator::jump_to`] hands back a [`SettleTicket`], and the host calls
//! [`Navigator::settle`] with it once the ticket's delay has elapsed.
//!
//! ```
//! use folio_parse::nav::{NavConfig, Navigator, ScrollContainer, ScrollMetrics};
//!
//! struct Page;
//!
//! impl ScrollContainer for Page {
//!     fn metrics(&self) -> ScrollMetrics {
//!         ScrollMetrics { scroll_top: 0.0, scroll_height: 5000.0, client_height: 800.0, top: 0.0 }
//!     }
//!     fn heading_top(&self, id: &str) -> Option<f64> {
//!         match id {
//!             "intro" => Some(20.0),
//!             "details" => Some(1200.0),
//!             _ => None,
//!         }
//!     }
//!     fn scroll_to(&mut self, _offset: f64) {}
//! }
//!
//! let blocks = folio_parse::parse("# Intro\n\nHello.\n\n## Details\n");
//! let mut nav = Navigator::new(&blocks, NavConfig::default());
//! nav.on_scroll(Some(&Page));
//! assert_eq!(nav.active_heading_id(), Some("intro"));
//!
//! let ticket = nav.jump_to("details", Some(&mut Page)).unwrap();
//! assert!(nav.state().is_programmatic_scroll);
//! nav.settle(ticket);
//! assert!(!nav.state().is_programmatic_scroll);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::toc::headings;
use crate::types::{ContentBlock, HeadingRef};

/// Tunable distances (in CSS pixels) and the settle delay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavConfig {
    /// Within this distance of the bottom, the last heading is active.
    pub bottom_threshold: f64,
    /// A heading is "passed" once its top is this close to the container top.
    pub activation_line: f64,
    /// Space left above a heading after a jump.
    pub jump_offset: f64,
    /// How long scroll events are ignored after a jump.
    pub settle_delay_ms: u64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            bottom_threshold: 100.0,
            activation_line: 160.0,
            jump_offset: 80.0,
            settle_delay_ms: 800,
        }
    }
}

impl NavConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Geometry of the scroll container at the time of an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
    /// The container's own top edge, in the same coordinates as
    /// [`ScrollContainer::heading_top`].
    pub top: f64,
}

impl ScrollMetrics {
    fn is_near_bottom(&self, threshold: f64) -> bool {
        self.scroll_top + self.client_height >= self.scroll_height - threshold
    }
}

/// The scrollable element that hosts the rendered post.
pub trait ScrollContainer {
    fn metrics(&self) -> ScrollMetrics;

    /// Top edge of the heading element with this id, or `None` if it is not rendered.
    fn heading_top(&self, id: &str) -> Option<f64>;

    /// Start a smooth scroll to `offset` in the container's own coordinates.
    fn scroll_to(&mut self, offset: f64);
}

/// Observable navigation state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub active_heading_id: Option<String>,
    /// Set between a jump and its settle; scroll events are ignored meanwhile.
    pub is_programmatic_scroll: bool,
}

/// Proof of a pending jump. Only the ticket from the latest jump releases
/// the scroll guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "the scroll guard stays up until the ticket is settled"]
pub struct SettleTicket {
    generation: u64,
    pub delay: Duration,
}

/// Heading list plus active-heading state for one mounted post.
#[derive(Debug, Clone)]
pub struct Navigator {
    headings: Vec<HeadingRef>,
    state: NavigationState,
    config: NavConfig,
    generation: u64,
}

impl Navigator {
    pub fn new(blocks: &[ContentBlock], config: NavConfig) -> Self {
        Self::from_headings(headings(blocks), config)
    }

    pub fn from_headings(headings: Vec<HeadingRef>, config: NavConfig) -> Self {
        Self {
            headings,
            state: NavigationState::default(),
            config,
            generation: 0,
        }
    }

    pub fn headings(&self) -> &[HeadingRef] {
        &self.headings
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn active_heading_id(&self) -> Option<&str> {
        self.state.active_heading_id.as_deref()
    }

    /// Swap in the headings of a newly loaded post.
    ///
    /// Clears the state and invalidates any outstanding [`SettleTicket`].
    pub fn reset(&mut self, blocks: &[ContentBlock]) {
        self.headings = headings(blocks);
        self.state = NavigationState::default();
        self.generation += 1;
    }

    /// Heading that should be active for the container's current position.
    ///
    /// Near the bottom the last heading wins; otherwise the last rendered
    /// heading whose top has passed the activation line, or the first
    /// rendered heading if none has. `None` when no heading is rendered.
    pub fn compute_active<C>(&self, container: &C) -> Option<&HeadingRef>
    where
        C: ScrollContainer + ?Sized,
    {
        let mut rendered = self
            .headings
            .iter()
            .filter_map(|h| container.heading_top(&h.id).map(|top| (h, top)))
            .peekable();

        let (first, _) = *rendered.peek()?;

        let metrics = container.metrics();
        if metrics.is_near_bottom(self.config.bottom_threshold) {
            return self.headings.last();
        }

        let line = metrics.top + self.config.activation_line;
        let passed = rendered.filter(|(_, top)| *top <= line).map(|(h, _)| h).last();
        Some(passed.unwrap_or(first))
    }

    /// React to a scroll event. Returns `true` if the active heading changed.
    ///
    /// Ignored while a jump is settling, when there is no container, or when
    /// no heading is rendered.
    pub fn on_scroll<C>(&mut self, container: Option<&C>) -> bool
    where
        C: ScrollContainer + ?Sized,
    {
        if self.state.is_programmatic_scroll {
            return false;
        }
        let Some(container) = container else {
            tracing::debug!("No scroll container; skipping active heading update");
            return false;
        };
        let Some(next) = self.compute_active(container).map(|h| h.id.clone()) else {
            return false;
        };
        if self.state.active_heading_id.as_deref() == Some(next.as_str()) {
            return false;
        }
        self.state.active_heading_id = Some(next);
        true
    }

    /// Scroll to the heading with `id` and make it active right away.
    ///
    /// The heading's top ends up `jump_offset` below the container top. Until
    /// the returned ticket is passed to [`settle`](Self::settle), scroll events
    /// cannot change the active heading. A later jump supersedes this one.
    ///
    /// Unknown ids, unrendered headings and a missing container are no-ops.
    pub fn jump_to<C>(&mut self, id: &str, container: Option<&mut C>) -> Option<SettleTicket>
    where
        C: ScrollContainer + ?Sized,
    {
        let Some(container) = container else {
            tracing::debug!(id, "No scroll container; ignoring jump");
            return None;
        };
        if !self.headings.iter().any(|h| h.id == id) {
            tracing::debug!(id, "Jump to unknown heading ignored");
            return None;
        }
        let Some(heading_top) = container.heading_top(id) else {
            tracing::debug!(id, "Heading is not rendered; ignoring jump");
            return None;
        };

        self.state.active_heading_id = Some(id.to_string());
        self.state.is_programmatic_scroll = true;
        self.generation += 1;

        let metrics = container.metrics();
        let target = metrics.scroll_top + (heading_top - metrics.top) - self.config.jump_offset;
        container.scroll_to(target);

        Some(SettleTicket {
            generation: self.generation,
            delay: self.config.settle_delay(),
        })
    }

    /// Release the scroll guard if `ticket` belongs to the latest jump.
    ///
    /// Returns `false` for stale tickets, which leave the guard untouched.
    pub fn settle(&mut self, ticket: SettleTicket) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.state.is_programmatic_scroll = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    /// A container whose headings sit at fixed document offsets, so their
    /// viewport position follows `scroll_top` like a real page would.
    struct FakePage {
        top: f64,
        scroll_top: f64,
        client_height: f64,
        scroll_height: f64,
        offsets: HashMap<String, f64>,
        scrolls: Vec<f64>,
    }

    impl FakePage {
        fn new(offsets: &[(&str, f64)]) -> Self {
            Self {
                top: 60.0,
                scroll_top: 0.0,
                client_height: 700.0,
                scroll_height: 4000.0,
                offsets: offsets.iter().map(|(id, y)| (id.to_string(), *y)).collect(),
                scrolls: Vec::new(),
            }
        }

        fn at(mut self, scroll_top: f64) -> Self {
            self.scroll_top = scroll_top;
            self
        }
    }

    impl ScrollContainer for FakePage {
        fn metrics(&self) -> ScrollMetrics {
            ScrollMetrics {
                scroll_top: self.scroll_top,
                scroll_height: self.scroll_height,
                client_height: self.client_height,
                top: self.top,
            }
        }

        fn heading_top(&self, id: &str) -> Option<f64> {
            self.offsets.get(id).map(|y| self.top + y - self.scroll_top)
        }

        fn scroll_to(&mut self, offset: f64) {
            self.scrolls.push(offset);
            self.scroll_top = offset;
        }
    }

    const DOC: &str = "# Intro\n\n## Setup\n\n## Usage\n\n### Flags\n\n## Outro\n";

    fn page() -> FakePage {
        FakePage::new(&[
            ("intro", 0.0),
            ("setup", 900.0),
            ("usage", 1800.0),
            ("flags", 2400.0),
            ("outro", 3000.0),
        ])
    }

    fn navigator() -> Navigator {
        Navigator::new(&parse(DOC), NavConfig::default())
    }

    #[test]
    fn first_heading_is_active_at_top() {
        let mut nav = navigator();
        assert!(nav.on_scroll(Some(&page())));
        assert_eq!(nav.active_heading_id(), Some("intro"));
    }

    #[test]
    fn deepest_passed_heading_wins() {
        let mut nav = navigator();
        // usage sits 1800 - 1700 = 100px below the container top: passed.
        nav.on_scroll(Some(&page().at(1700.0)));
        assert_eq!(nav.active_heading_id(), Some("usage"));
    }

    #[test]
    fn activation_line_is_inclusive() {
        let mut nav = navigator();
        nav.on_scroll(Some(&page().at(900.0 - 160.0)));
        assert_eq!(nav.active_heading_id(), Some("setup"));
        nav.on_scroll(Some(&page().at(900.0 - 161.0)));
        assert_eq!(nav.active_heading_id(), Some("intro"));
    }

    #[test]
    fn bottom_snap_selects_last_heading() {
        let mut nav = navigator();
        // 3200 + 700 >= 4000 - 100, while "outro" is still far below the line.
        let mut bottom = page().at(3200.0);
        bottom.offsets.insert("outro".into(), 3850.0);
        nav.on_scroll(Some(&bottom));
        assert_eq!(nav.active_heading_id(), Some("outro"));
    }

    #[test]
    fn first_rendered_heading_is_the_default() {
        let mut nav = navigator();
        let mut partial = page();
        partial.offsets.remove("intro");
        nav.on_scroll(Some(&partial));
        assert_eq!(nav.active_heading_id(), Some("setup"));
    }

    #[test]
    fn unchanged_active_heading_reports_no_change() {
        let mut nav = navigator();
        assert!(nav.on_scroll(Some(&page())));
        assert!(!nav.on_scroll(Some(&page().at(10.0))));
    }

    #[test]
    fn missing_container_and_empty_headings_are_noops() {
        let mut nav = navigator();
        assert!(!nav.on_scroll::<FakePage>(None));
        assert_eq!(nav.state(), &NavigationState::default());

        let mut empty = Navigator::new(&parse("just text"), NavConfig::default());
        assert!(!empty.on_scroll(Some(&page())));
        assert_eq!(empty.active_heading_id(), None);
        assert_eq!(empty.jump_to("intro", Some(&mut page())), None);
    }

    #[test]
    fn nothing_rendered_is_a_noop() {
        let mut nav = navigator();
        assert!(!nav.on_scroll(Some(&FakePage::new(&[]))));
        assert_eq!(nav.active_heading_id(), None);
    }

    #[test]
    fn jump_offset_uses_container_coordinates() {
        let mut nav = navigator();
        let mut container = page().at(250.0);
        let heading_top = container.heading_top("usage").unwrap();
        let ticket = nav.jump_to("usage", Some(&mut container));

        assert!(ticket.is_some());
        let expected = 250.0 + (heading_top - 60.0) - 80.0;
        assert_eq!(container.scrolls, vec![expected]);
        assert_eq!(expected, 1720.0);
    }

    #[test]
    fn jump_sets_active_heading_before_scroll_settles() {
        let mut nav = navigator();
        let mut container = page();
        let ticket = nav.jump_to("flags", Some(&mut container)).unwrap();
        assert_eq!(ticket.delay, Duration::from_millis(800));
        assert_eq!(
            nav.state(),
            &NavigationState {
                active_heading_id: Some("flags".into()),
                is_programmatic_scroll: true,
            }
        );
    }

    #[test]
    fn scroll_events_during_jump_are_suppressed() {
        let mut nav = navigator();
        nav.on_scroll(Some(&page()));
        let ticket = nav.jump_to("outro", Some(&mut page())).unwrap();

        // Intermediate positions where other headings would qualify.
        for scroll_top in [500.0, 1000.0, 1900.0, 2500.0] {
            assert!(!nav.on_scroll(Some(&page().at(scroll_top))));
            assert_eq!(nav.active_heading_id(), Some("outro"));
        }

        assert!(nav.settle(ticket));
        assert!(nav.on_scroll(Some(&page().at(1000.0))));
        assert_eq!(nav.active_heading_id(), Some("setup"));
    }

    #[test]
    fn newer_jump_replaces_pending_settle() {
        let mut nav = navigator();
        let first = nav.jump_to("setup", Some(&mut page())).unwrap();
        let second = nav.jump_to("usage", Some(&mut page())).unwrap();

        assert!(!nav.settle(first));
        assert!(nav.state().is_programmatic_scroll);
        assert!(nav.settle(second));
        assert!(!nav.state().is_programmatic_scroll);
    }

    #[test]
    fn unknown_or_unrendered_jump_is_a_noop() {
        let mut nav = navigator();
        nav.on_scroll(Some(&page()));
        let before = nav.state().clone();

        let mut container = page();
        assert_eq!(nav.jump_to("nope", Some(&mut container)), None);
        container.offsets.remove("usage");
        assert_eq!(nav.jump_to("usage", Some(&mut container)), None);
        assert_eq!(nav.jump_to::<FakePage>("setup", None), None);

        assert!(container.scrolls.is_empty());
        assert_eq!(nav.state(), &before);
    }

    #[test]
    fn reset_clears_state_and_invalidates_tickets() {
        let mut nav = navigator();
        let ticket = nav.jump_to("setup", Some(&mut page())).unwrap();
        nav.reset(&parse("## Other post"));

        assert_eq!(nav.state(), &NavigationState::default());
        assert_eq!(nav.headings().len(), 1);
        assert!(!nav.settle(ticket));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: NavConfig = serde_json::from_str(r#"{ "activationLine": 120 }"#).unwrap();
        assert_eq!(config.activation_line, 120.0);
        assert_eq!(config.bottom_threshold, 100.0);
        assert_eq!(config.settle_delay(), Duration::from_millis(800));
    }
}
