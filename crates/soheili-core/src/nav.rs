//! Navigation links and in-page anchors

use serde::Serialize;
use tracing::debug;

use crate::scroll::Section;

/// A nav link pointing at a section (`#id`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub href: String,
    pub active: bool,
}

impl NavLink {
    /// Section id this link targets, if it is an in-page anchor
    pub fn target(&self) -> Option<&str> {
        anchor_target(&self.href)
    }
}

/// Smooth-scroll request produced by an anchor click
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScrollRequest {
    /// Target document offset (px)
    pub top: f64,
    pub smooth: bool,
}

/// Nav bar links, at most one active at a time
#[derive(Debug, Clone, Default)]
pub struct NavBar {
    links: Vec<NavLink>,
}

impl NavBar {
    /// One link per section, in section order. The first starts active.
    pub fn for_sections(sections: &[Section]) -> Self {
        let links = sections
            .iter()
            .enumerate()
            .map(|(i, s)| NavLink {
                href: format!("#{}", s.id),
                active: i == 0,
            })
            .collect();
        Self { links }
    }

    /// Mark the link for `section_id` active and clear every other link
    pub fn set_active(&mut self, section_id: &str) {
        for link in &mut self.links {
            link.active = link.target() == Some(section_id);
        }
        debug!(section = section_id, "nav link activated");
    }

    pub fn active(&self) -> Option<&NavLink> {
        self.links.iter().find(|l| l.active)
    }

    pub fn links(&self) -> &[NavLink] {
        &self.links
    }
}

/// Section id named by an in-page anchor. `#` alone and external links yield None.
pub fn anchor_target(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Scroll target for an anchor, leaving room for the fixed header
///
/// Unknown anchors resolve to None; the click is then left alone.
pub fn resolve_anchor(href: &str, sections: &[Section], header_height: f64) -> Option<ScrollRequest> {
    let id = anchor_target(href)?;
    let Some(section) = sections.iter().find(|s| s.id == id) else {
        debug!(href, "anchor has no matching section, ignoring");
        return None;
    };
    Some(ScrollRequest {
        top: (section.top - header_height).max(0.0),
        smooth: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections() -> Vec<Section> {
        ["home", "products", "contact"]
            .iter()
            .enumerate()
            .map(|(i, id)| Section {
                id: id.to_string(),
                top: i as f64 * 1000.0,
                height: 1000.0,
            })
            .collect()
    }

    #[test]
    fn test_exactly_one_active_link() {
        let mut nav = NavBar::for_sections(&sections());
        assert_eq!(nav.active().map(|l| l.href.as_str()), Some("#home"));

        nav.set_active("contact");
        let active: Vec<_> = nav.links().iter().filter(|l| l.active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].href, "#contact");
    }

    #[test]
    fn test_anchor_target() {
        assert_eq!(anchor_target("#gallery"), Some("gallery"));
        assert_eq!(anchor_target("#"), None);
        assert_eq!(anchor_target("https://example.com"), None);
    }

    #[test]
    fn test_resolve_anchor_subtracts_header() {
        let req = resolve_anchor("#products", &sections(), 80.0).unwrap();
        assert_eq!(req.top, 920.0);
        assert!(req.smooth);

        // Never scroll above the page
        let req = resolve_anchor("#home", &sections(), 80.0).unwrap();
        assert_eq!(req.top, 0.0);
    }

    #[test]
    fn test_unknown_anchor_is_ignored() {
        assert!(resolve_anchor("#missing", &sections(), 80.0).is_none());
        assert!(resolve_anchor("#", &sections(), 80.0).is_none());
        assert!(resolve_anchor("/catalog.pdf", &sections(), 80.0).is_none());
    }
}
