//! Scroll State - header compaction, hide-on-scroll and the active section
//!
//! This module owns all page-scroll derived state:
//! - `scrolled` flag (header compaction)
//! - header hide/show from scroll direction
//! - which section is currently active for nav highlighting
//! - hero parallax offset

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::Thresholds;
use crate::constants;

/// A page section, fixed at load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Element id, also the nav anchor (`#id`)
    pub id: String,
    /// Document offset of the section's top edge (px)
    pub top: f64,
    /// Section height (px)
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderVisibility {
    Shown,
    Hidden,
}

/// Result of a single scroll event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollUpdate {
    pub scrolled: bool,
    pub header: HeaderVisibility,
    /// Index into the tracker's sections, None only when no sections exist
    pub active_section: Option<usize>,
    /// True if the active section differs from the previous event
    pub section_changed: bool,
}

/// Tracks page scroll position and everything derived from it
#[derive(Debug, Clone)]
pub struct ScrollTracker {
    thresholds: Thresholds,
    /// Sorted by `top`
    sections: Vec<Section>,
    last_offset: f64,
    direction: ScrollDirection,
    scrolled: bool,
    header: HeaderVisibility,
    active: Option<usize>,
}

impl ScrollTracker {
    /// Create a tracker at the top of the page. The first section starts active.
    pub fn new(mut sections: Vec<Section>, thresholds: Thresholds) -> Self {
        sections.sort_by(|a, b| a.top.total_cmp(&b.top));
        let active = if sections.is_empty() { None } else { Some(0) };
        Self {
            thresholds,
            sections,
            last_offset: 0.0,
            direction: ScrollDirection::Down,
            scrolled: false,
            header: HeaderVisibility::Shown,
            active,
        }
    }

    /// Apply a scroll event at `offset`
    pub fn on_scroll(&mut self, offset: f64) -> ScrollUpdate {
        // Overscroll bounce can report negative offsets
        let offset = offset.max(0.0);

        self.scrolled = offset > self.thresholds.scrolled;

        if offset > self.last_offset {
            self.direction = ScrollDirection::Down;
        } else if offset < self.last_offset {
            self.direction = ScrollDirection::Up;
        }

        self.header = if offset > self.thresholds.hide_header && offset > self.last_offset {
            HeaderVisibility::Hidden
        } else {
            HeaderVisibility::Shown
        };
        self.last_offset = offset;

        let active = self.section_at(offset);
        let section_changed = active != self.active;
        self.active = active;

        trace!(offset, scrolled = self.scrolled, header = ?self.header, ?active, "scroll");

        ScrollUpdate {
            scrolled: self.scrolled,
            header: self.header,
            active_section: active,
            section_changed,
        }
    }

    /// Section whose activation range contains `offset`, clamped at the page extremes
    ///
    /// A section's range is `[top - section_offset, top - section_offset + height)`.
    /// Offsets before the first range map to the first section; offsets past
    /// the last range or inside a gap map to the nearest section above.
    pub fn section_at(&self, offset: f64) -> Option<usize> {
        if self.sections.is_empty() {
            return None;
        }

        let start = |s: &Section| s.top - self.thresholds.section_offset;

        if let Some(idx) = self
            .sections
            .iter()
            .position(|s| offset >= start(s) && offset < start(s) + s.height)
        {
            return Some(idx);
        }

        let above = self.sections.iter().rposition(|s| start(s) <= offset);
        Some(above.unwrap_or(0))
    }

    /// Hero background transform for the current offset
    pub fn parallax_offset(&self) -> f64 {
        self.last_offset * self.thresholds.parallax_rate
    }

    pub fn parallax_transform(&self) -> String {
        format!(
            "translate3d(0, {}px, 0) scale({})",
            self.parallax_offset(),
            constants::scroll::PARALLAX_SCALE
        )
    }

    pub fn offset(&self) -> f64 {
        self.last_offset
    }

    pub fn direction(&self) -> ScrollDirection {
        self.direction
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled
    }

    pub fn header(&self) -> HeaderVisibility {
        self.header
    }

    pub fn active_section(&self) -> Option<&Section> {
        self.active.and_then(|idx| self.sections.get(idx))
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn find_section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }
}
