//! Scroll-triggered reveal animations and lazy images
//!
//! Both are one-way: once an element is revealed (or an image loaded) it
//! stays that way for the rest of the page's life.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use crate::constants;

/// Element classes that get a staggered entrance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    TrustCard,
    ProductCard,
    AdvantageItem,
    GalleryItem,
    #[default]
    Plain,
}

impl ElementKind {
    pub fn is_staggered(&self) -> bool {
        !matches!(self, ElementKind::Plain)
    }
}

/// Visible window of the document
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Scroll offset (px)
    pub offset: f64,
    /// Viewport height (px)
    pub height: f64,
}

/// Animated element as described by the page
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnimatedSpec {
    pub id: String,
    #[serde(default)]
    pub kind: ElementKind,
    /// Document offset of the element's top edge (px)
    pub top: f64,
    #[serde(default)]
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct AnimatedElement {
    pub id: String,
    pub kind: ElementKind,
    pub top: f64,
    pub height: f64,
    /// Entrance delay hint for staggered kinds
    pub delay: Option<Duration>,
    revealed: bool,
}

impl AnimatedElement {
    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Returns true only on the first reveal
    fn reveal(&mut self) -> bool {
        !std::mem::replace(&mut self.revealed, true)
    }

    fn intersects(&self, viewport: Viewport, bottom_margin: f64) -> bool {
        self.top < viewport.offset + viewport.height - bottom_margin
            && self.top + self.height > viewport.offset
    }
}

/// Delay for the `n`th staggered element: `(n mod 4) * 100ms`
pub fn stagger_delay(stagger_index: usize) -> Duration {
    constants::reveal::STAGGER_STEP * (stagger_index % constants::reveal::STAGGER_SLOTS) as u32
}

/// Tracks which animated elements have been revealed
#[derive(Debug, Clone)]
pub struct RevealTracker {
    elements: Vec<AnimatedElement>,
    bottom_margin: f64,
    /// Deadline of the next geometric sweep (load / debounced resize)
    pending_sweep: Option<Instant>,
}

impl RevealTracker {
    pub fn new(specs: Vec<AnimatedSpec>, bottom_margin: f64) -> Self {
        let mut staggered = 0;
        let elements = specs
            .into_iter()
            .map(|spec| {
                let delay = spec.kind.is_staggered().then(|| {
                    let delay = stagger_delay(staggered);
                    staggered += 1;
                    delay
                });
                AnimatedElement {
                    id: spec.id,
                    kind: spec.kind,
                    top: spec.top,
                    height: spec.height,
                    delay,
                    revealed: false,
                }
            })
            .collect();
        Self {
            elements,
            bottom_margin,
            pending_sweep: None,
        }
    }

    /// Intersection callback for a single element. Unknown ids are ignored.
    pub fn intersect(&mut self, id: &str) -> bool {
        let Some(el) = self.elements.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        let newly = el.reveal();
        if newly {
            debug!(element = id, "revealed");
        }
        newly
    }

    /// Reveal everything intersecting the viewport (bottom margin applied)
    pub fn on_scroll(&mut self, viewport: Viewport) -> usize {
        let margin = self.bottom_margin;
        self.elements
            .iter_mut()
            .filter(|e| e.intersects(viewport, margin))
            .map(|e| e.reveal())
            .filter(|newly| *newly)
            .count()
    }

    /// Reveal everything whose top is above the viewport bottom
    ///
    /// Used after load and resize, where elements already scrolled past must
    /// show up too.
    pub fn sweep(&mut self, viewport: Viewport) -> usize {
        let revealed = self
            .elements
            .iter_mut()
            .filter(|e| e.top - viewport.offset < viewport.height)
            .map(|e| e.reveal())
            .filter(|newly| *newly)
            .count();
        debug!(revealed, "reveal sweep");
        revealed
    }

    /// Page finished loading: sweep once after a short delay
    pub fn on_loaded(&mut self, now: Instant) {
        self.pending_sweep = Some(now + constants::reveal::LOAD_SWEEP_DELAY);
    }

    /// Resize: (re)start the debounce window
    pub fn on_resize(&mut self, now: Instant) {
        self.pending_sweep = Some(now + constants::reveal::RESIZE_DEBOUNCE);
    }

    /// Run the pending sweep if its deadline has passed. Returns the number of
    /// newly revealed elements when a sweep ran.
    pub fn poll(&mut self, now: Instant, viewport: Viewport) -> Option<usize> {
        match self.pending_sweep {
            Some(deadline) if deadline <= now => {
                self.pending_sweep = None;
                Some(self.sweep(viewport))
            }
            _ => None,
        }
    }

    pub fn has_pending_sweep(&self) -> bool {
        self.pending_sweep.is_some()
    }

    pub fn elements(&self) -> &[AnimatedElement] {
        &self.elements
    }

    pub fn revealed(&self) -> impl Iterator<Item = &AnimatedElement> {
        self.elements.iter().filter(|e| e.revealed)
    }

    pub fn is_revealed(&self, id: &str) -> bool {
        self.elements.iter().any(|e| e.id == id && e.revealed)
    }
}

/// Image whose source is deferred until it scrolls into view
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LazyImageSpec {
    pub id: String,
    pub data_src: String,
    pub top: f64,
    #[serde(default)]
    pub height: f64,
}

#[derive(Debug, Clone)]
pub struct LazyImage {
    pub spec: LazyImageSpec,
    /// Set once from `data_src`; the image is unobserved afterwards
    pub src: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LazyImages {
    images: Vec<LazyImage>,
}

impl LazyImages {
    pub fn new(specs: Vec<LazyImageSpec>) -> Self {
        Self {
            images: specs
                .into_iter()
                .map(|spec| LazyImage { spec, src: None })
                .collect(),
        }
    }

    pub fn intersect(&mut self, id: &str) -> bool {
        match self.images.iter_mut().find(|i| i.spec.id == id) {
            Some(img) => Self::load(img),
            None => false,
        }
    }

    pub fn on_scroll(&mut self, viewport: Viewport) -> usize {
        self.images
            .iter_mut()
            .filter(|i| {
                i.spec.top < viewport.offset + viewport.height
                    && i.spec.top + i.spec.height > viewport.offset
            })
            .map(Self::load)
            .filter(|newly| *newly)
            .count()
    }

    fn load(img: &mut LazyImage) -> bool {
        if img.src.is_some() {
            return false;
        }
        debug!(image = %img.spec.id, src = %img.spec.data_src, "lazy image loaded");
        img.src = Some(img.spec.data_src.clone());
        true
    }

    pub fn loaded(&self) -> impl Iterator<Item = &LazyImage> {
        self.images.iter().filter(|i| i.src.is_some())
    }
}
