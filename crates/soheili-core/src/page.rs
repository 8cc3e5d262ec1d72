//! Page state and event dispatch
//!
//! `Page` owns every component plus the shared scroll lock. Browser listeners
//! map onto [`PageEvent`]s; each arm below is a thin adapter over the
//! component's own transition functions and never depends on another
//! handler having run first.
//!
//! Event handling never waits. A submit marks the form pending and hands the
//! inquiry to a spawned task; the result is picked up by [`Page::poll`] or
//! [`Page::submission_settled`], so other events keep flowing meanwhile.

use std::sync::Arc;

use chrono::Datelike;
use serde::Deserialize;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::config::PageConfig;
use crate::error::{Result, SiteError};
use crate::inquiry::{InquiryBackend, InquiryHandler, SubmitOutcome};
use crate::lightbox::{Lightbox, LightboxKey};
use crate::menu::MenuController;
use crate::nav::{self, NavBar, ScrollRequest};
use crate::notify::NotificationCenter;
use crate::reveal::{LazyImages, RevealTracker, Viewport};
use crate::scroll::ScrollTracker;
use crate::scroll_lock::ScrollLock;
use crate::tooltip::Tooltips;

/// Everything the browser can tell the page
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageEvent {
    /// DOMContentLoaded
    Loaded,
    Scroll {
        offset: f64,
    },
    Resize {
        viewport_height: f64,
    },
    HamburgerClick,
    /// Click on a link inside the nav menu
    NavClick {
        href: String,
    },
    /// Click on any other in-page anchor
    AnchorClick {
        href: String,
    },
    /// Click anywhere in the document
    DocumentClick {
        #[serde(default)]
        inside_menu: bool,
    },
    GalleryClick {
        index: usize,
    },
    LightboxClose,
    LightboxBackdropClick,
    LightboxContentClick,
    Key {
        key: String,
    },
    /// IntersectionObserver entry for an animated element or lazy image
    Intersect {
        element: String,
    },
    TooltipEnter {
        id: String,
    },
    TooltipLeave {
        id: String,
    },
    FieldInput {
        name: String,
        value: String,
    },
    Submit,
    DismissNotification {
        id: u64,
    },
}

/// Application state for one page
pub struct Page {
    pub(crate) header_height: f64,
    pub(crate) viewport_height: f64,
    pub(crate) scroll: ScrollTracker,
    pub(crate) nav: NavBar,
    pub(crate) menu: MenuController,
    pub(crate) lock: ScrollLock,
    pub(crate) reveal: RevealTracker,
    pub(crate) lazy: LazyImages,
    pub(crate) lightbox: Lightbox,
    pub(crate) tooltips: Tooltips,
    pub(crate) inquiry: InquiryHandler,
    pub(crate) notices: NotificationCenter,
    backend: Arc<dyn InquiryBackend>,
    /// Backend result of the submission in flight
    pending: Option<oneshot::Receiver<Result<()>>>,
    /// Smooth-scroll requested by the most recent event
    pub(crate) scroll_request: Option<ScrollRequest>,
    pub(crate) current_year: Option<i32>,
}

impl Page {
    /// Build a page using the backend named in the config
    pub fn from_config(config: PageConfig) -> Result<Self> {
        config.validate()?;
        let backend = config.backend.build()?;
        Ok(Self::with_backend(config, backend))
    }

    /// Build a page with an explicit inquiry backend
    pub fn with_backend(config: PageConfig, backend: Arc<dyn InquiryBackend>) -> Self {
        let scroll = ScrollTracker::new(config.sections, config.thresholds);
        let nav = NavBar::for_sections(scroll.sections());
        Self {
            header_height: config.header_height,
            viewport_height: config.viewport_height,
            nav,
            scroll,
            menu: MenuController::new(),
            lock: ScrollLock::new(),
            reveal: RevealTracker::new(config.animated, config.thresholds.reveal_margin),
            lazy: LazyImages::new(config.lazy_images),
            lightbox: Lightbox::new(config.gallery),
            tooltips: Tooltips::new(config.tooltips),
            inquiry: InquiryHandler::new(config.form.fields, config.form.submit_label),
            notices: NotificationCenter::new(),
            backend,
            pending: None,
            scroll_request: None,
            current_year: None,
        }
    }

    /// Handle one event at the current time
    pub fn handle(&mut self, event: PageEvent) -> Result<()> {
        self.apply(event, Instant::now())
    }

    /// Handle one event at `now`. Time-driven state is brought up to date first.
    pub fn apply(&mut self, event: PageEvent, now: Instant) -> Result<()> {
        self.scroll_request = None;
        self.poll(now);

        match event {
            PageEvent::Loaded => {
                self.current_year = Some(chrono::Local::now().year());
                self.reveal.on_loaded(now);
            }
            PageEvent::Scroll { offset } => {
                let update = self.scroll.on_scroll(offset);
                if update.section_changed {
                    if let Some(section) = self.scroll.active_section() {
                        self.nav.set_active(&section.id);
                    }
                }
                let viewport = self.viewport();
                self.reveal.on_scroll(viewport);
                self.lazy.on_scroll(viewport);
            }
            PageEvent::Resize { viewport_height } => {
                self.viewport_height = viewport_height.max(0.0);
                self.reveal.on_resize(now);
            }
            PageEvent::HamburgerClick => {
                self.menu.toggle(&mut self.lock);
            }
            PageEvent::NavClick { href } => {
                self.scroll_request = self.resolve(&href);
                self.menu.on_nav_link_click(&mut self.lock);
            }
            PageEvent::AnchorClick { href } => {
                self.scroll_request = self.resolve(&href);
            }
            PageEvent::DocumentClick { inside_menu } => {
                self.menu.on_document_click(inside_menu, &mut self.lock);
            }
            PageEvent::GalleryClick { index } => {
                self.lightbox.open(index, &mut self.lock)?;
            }
            PageEvent::LightboxClose => {
                self.lightbox.close(&mut self.lock);
            }
            PageEvent::LightboxBackdropClick => {
                self.lightbox.on_backdrop_click(&mut self.lock);
            }
            PageEvent::LightboxContentClick => {}
            PageEvent::Key { key } => {
                if let Some(key) = LightboxKey::from_dom_key(&key) {
                    self.lightbox.handle_key(key, now, &mut self.lock);
                }
            }
            PageEvent::Intersect { element } => {
                if !self.reveal.intersect(&element) && !self.lazy.intersect(&element) {
                    debug!(element = %element, "intersection for untracked or settled element");
                }
            }
            PageEvent::TooltipEnter { id } => {
                self.tooltips.enter(&id);
            }
            PageEvent::TooltipLeave { id } => {
                self.tooltips.leave(&id);
            }
            PageEvent::FieldInput { name, value } => {
                if !self.inquiry.form_mut().set(&name, value) {
                    debug!(field = %name, "input for unknown form field");
                }
            }
            PageEvent::Submit => {
                self.start_submission()?;
            }
            PageEvent::DismissNotification { id } => {
                self.notices.dismiss(id);
            }
        }
        Ok(())
    }

    /// Advance time-driven state: fades, scheduled sweeps and a finished submission
    pub fn poll(&mut self, now: Instant) -> Option<SubmitOutcome> {
        self.lightbox.poll(now);
        let viewport = self.viewport();
        self.reveal.poll(now, viewport);

        let rx = self.pending.as_mut()?;
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => Err(submission_lost()),
        };
        Some(self.settle(result))
    }

    /// Wait for the submission in flight and settle it. Returns None at once
    /// when nothing is pending. Safe to cancel: the submission stays pending.
    pub async fn submission_settled(&mut self) -> Option<SubmitOutcome> {
        let rx = self.pending.as_mut()?;
        let result = rx.await.unwrap_or_else(|_| Err(submission_lost()));
        Some(self.settle(result))
    }

    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    fn start_submission(&mut self) -> Result<()> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return Err(SiteError::SubmissionFailed(
                "no async runtime to run the submission".into(),
            ));
        };
        let inquiry = self.inquiry.begin()?;
        let backend = Arc::clone(&self.backend);
        let (tx, rx) = oneshot::channel();
        info!(backend = backend.name(), "submitting inquiry");
        runtime.spawn(async move {
            let result = backend.submit(&inquiry).await;
            // Receiver is gone only if the page was dropped
            let _ = tx.send(result);
        });
        self.pending = Some(rx);
        Ok(())
    }

    fn settle(&mut self, result: Result<()>) -> SubmitOutcome {
        self.pending = None;
        self.inquiry.finish(result, &self.notices)
    }

    fn resolve(&self, href: &str) -> Option<ScrollRequest> {
        nav::resolve_anchor(href, self.scroll.sections(), self.header_height)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            offset: self.scroll.offset(),
            height: self.viewport_height,
        }
    }

    pub fn scroll(&self) -> &ScrollTracker {
        &self.scroll
    }

    pub fn nav(&self) -> &NavBar {
        &self.nav
    }

    pub fn menu(&self) -> &MenuController {
        &self.menu
    }

    pub fn scroll_lock(&self) -> &ScrollLock {
        &self.lock
    }

    pub fn reveal(&self) -> &RevealTracker {
        &self.reveal
    }

    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    pub fn inquiry(&self) -> &InquiryHandler {
        &self.inquiry
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notices
    }

    pub fn scroll_request(&self) -> Option<ScrollRequest> {
        self.scroll_request
    }
}

fn submission_lost() -> SiteError {
    SiteError::SubmissionFailed("submission task ended without a result".into())
}
