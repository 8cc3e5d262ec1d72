//! Gallery lightbox
//!
//! Two states, `Closed` and `Open { index }`. Navigation wraps around the
//! gallery in both directions. While open the lightbox holds the
//! [`LockHolder::Lightbox`] scroll-lock claim and a page-wide key listener;
//! both are dropped again on close.
//!
//! Switching images is staged for presentation: the old image fades out for
//! [`constants::lightbox::FADE`] before the new one is shown. The index itself
//! changes immediately, so `index()` never reports a half-way state.

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use crate::constants;
use crate::error::{Result, SiteError};
use crate::scroll_lock::{LockHolder, ScrollLock};

/// A gallery image, fixed at load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub src: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LightboxState {
    #[default]
    Closed,
    Open { index: usize },
}

/// What the image element is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Displaying the item at the current index
    Shown,
    /// Old item `showing` is fading out; swap happens at `until`
    Fading { showing: usize, until: Instant },
}

/// Keys the lightbox reacts to while its listener is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxKey {
    Escape,
    ArrowRight,
    ArrowLeft,
}

impl LightboxKey {
    /// Parse a DOM `KeyboardEvent.key` value
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key {
            "Escape" | "Esc" => Some(Self::Escape),
            "ArrowRight" => Some(Self::ArrowRight),
            "ArrowLeft" => Some(Self::ArrowLeft),
            _ => None,
        }
    }
}

/// Modal image viewer over the gallery
#[derive(Debug, Clone)]
pub struct Lightbox {
    items: Vec<GalleryItem>,
    state: LightboxState,
    stage: Stage,
    key_listener: bool,
}

impl Lightbox {
    pub fn new(items: Vec<GalleryItem>) -> Self {
        Self {
            items,
            state: LightboxState::Closed,
            stage: Stage::Shown,
            key_listener: false,
        }
    }

    /// Open at `index`, from Closed or from another image
    pub fn open(&mut self, index: usize, lock: &mut ScrollLock) -> Result<()> {
        if index >= self.items.len() {
            return Err(SiteError::InvalidGalleryIndex {
                index,
                len: self.items.len(),
            });
        }
        self.state = LightboxState::Open { index };
        self.stage = Stage::Shown;
        lock.acquire(LockHolder::Lightbox);
        if !self.key_listener {
            self.key_listener = true;
            debug!("lightbox key listener registered");
        }
        debug!(index, "lightbox opened");
        Ok(())
    }

    /// Close the lightbox. Returns false if it was already closed.
    pub fn close(&mut self, lock: &mut ScrollLock) -> bool {
        if self.state == LightboxState::Closed {
            return false;
        }
        self.state = LightboxState::Closed;
        self.stage = Stage::Shown;
        lock.release(LockHolder::Lightbox);
        self.key_listener = false;
        debug!("lightbox closed, key listener removed");
        true
    }

    pub fn next(&mut self, now: Instant) -> Option<usize> {
        self.step(1, now)
    }

    pub fn previous(&mut self, now: Instant) -> Option<usize> {
        self.step(-1, now)
    }

    fn step(&mut self, delta: isize, now: Instant) -> Option<usize> {
        let LightboxState::Open { index } = self.state else {
            return None;
        };
        let len = self.items.len() as isize;
        let next = (index as isize + delta).rem_euclid(len) as usize;

        // Keep fading out whatever is on screen, not the index we skipped past
        let showing = match self.stage {
            Stage::Fading { showing, .. } => showing,
            Stage::Shown => index,
        };
        self.state = LightboxState::Open { index: next };
        self.stage = Stage::Fading {
            showing,
            until: now + constants::lightbox::FADE,
        };
        debug!(from = index, to = next, "lightbox navigated");
        Some(next)
    }

    /// Key press while the page has focus. Ignored unless the listener is registered.
    pub fn handle_key(&mut self, key: LightboxKey, now: Instant, lock: &mut ScrollLock) -> bool {
        if !self.key_listener {
            return false;
        }
        match key {
            LightboxKey::Escape => self.close(lock),
            LightboxKey::ArrowRight => self.next(now).is_some(),
            LightboxKey::ArrowLeft => self.previous(now).is_some(),
        }
    }

    /// Click on the dark area around the image
    pub fn on_backdrop_click(&mut self, lock: &mut ScrollLock) -> bool {
        self.close(lock)
    }

    /// Finish a pending fade once its deadline has passed
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.stage {
            Stage::Fading { until, .. } if until <= now => {
                self.stage = Stage::Shown;
                true
            }
            _ => false,
        }
    }

    pub fn state(&self) -> LightboxState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, LightboxState::Open { .. })
    }

    pub fn index(&self) -> Option<usize> {
        match self.state {
            LightboxState::Open { index } => Some(index),
            LightboxState::Closed => None,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn has_key_listener(&self) -> bool {
        self.key_listener
    }

    /// Item currently on screen; lags `index()` while a fade is running
    pub fn displayed(&self) -> Option<&GalleryItem> {
        let index = self.index()?;
        let shown = match self.stage {
            Stage::Fading { showing, .. } => showing,
            Stage::Shown => index,
        };
        self.items.get(shown)
    }

    /// Image opacity for the current stage
    pub fn opacity(&self) -> f32 {
        match self.stage {
            Stage::Fading { .. } => 0.0,
            Stage::Shown => 1.0,
        }
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }
}
