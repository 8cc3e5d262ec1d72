//! Hover tooltips for `[data-tooltip]` elements

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TooltipSpec {
    /// Owning element id
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub id: String,
    pub text: String,
    pub visible: bool,
}

impl Tooltip {
    pub fn opacity(&self) -> f32 {
        if self.visible {
            1.0
        } else {
            0.0
        }
    }

    pub fn transform(&self) -> &'static str {
        if self.visible {
            "translate(-50%, 0)"
        } else {
            "translate(-50%, 10px)"
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Tooltips {
    items: Vec<Tooltip>,
}

impl Tooltips {
    pub fn new(specs: Vec<TooltipSpec>) -> Self {
        Self {
            items: specs
                .into_iter()
                .map(|s| Tooltip {
                    id: s.id,
                    text: s.text,
                    visible: false,
                })
                .collect(),
        }
    }

    /// mouseenter
    pub fn enter(&mut self, id: &str) -> bool {
        self.set_visible(id, true)
    }

    /// mouseleave
    pub fn leave(&mut self, id: &str) -> bool {
        self.set_visible(id, false)
    }

    fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        match self.items.iter_mut().find(|t| t.id == id) {
            Some(tooltip) => {
                tooltip.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tooltip> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_and_leave() {
        let mut tips = Tooltips::new(vec![TooltipSpec {
            id: "warranty".into(),
            text: "10 year warranty".into(),
        }]);
        assert!(tips.iter().all(|t| !t.visible));

        assert!(tips.enter("warranty"));
        let tip = tips.iter().next().unwrap();
        assert_eq!(tip.opacity(), 1.0);
        assert_eq!(tip.transform(), "translate(-50%, 0)");

        assert!(tips.leave("warranty"));
        assert!(!tips.iter().next().unwrap().visible);
        assert!(!tips.enter("missing"));
    }
}
