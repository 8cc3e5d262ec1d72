//! Soheili Core - interaction layer for the Soheili Wood site
//!
//! This crate models every interactive surface of the page as an explicit
//! state machine, testable without a DOM:
//! - Scroll tracking (header compaction, hide-on-scroll, active section)
//! - Mobile menu and gallery lightbox sharing one body scroll lock
//! - Scroll-triggered reveals, lazy images and tooltips
//! - Inquiry form submission with transient notifications
//!
//! [`Page`] owns the state and dispatches [`PageEvent`]s;
//! [`render::render`] turns it into a [`RenderSnapshot`].

pub mod config;
pub mod constants;
pub mod error;
pub mod inquiry;
pub mod lightbox;
pub mod menu;
pub mod nav;
pub mod notify;
pub mod page;
pub mod render;
pub mod reveal;
pub mod scroll;
pub mod scroll_lock;
pub mod tooltip;


// Re-exports for convenience
pub use config::PageConfig;
pub use error::{Result, SiteError};
pub use inquiry::{InquiryBackend, SubmitOutcome};
pub use page::{Page, PageEvent};
pub use render::{render, RenderSnapshot};
pub use scroll_lock::{LockHolder, ScrollLock};
