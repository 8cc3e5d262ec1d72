//! Interaction constants and configuration defaults
//!
//! Centralized location for thresholds, durations and labels used by the page

use std::time::Duration;

/// Scroll tracking
pub mod scroll {
    /// Offset (px) past which the header switches to its compact style
    pub const SCROLLED_THRESHOLD: f64 = 50.0;

    /// Offset (px) past which scrolling down hides the header
    pub const HIDE_HEADER_THRESHOLD: f64 = 100.0;

    /// Sections become active this many px before their top edge
    pub const SECTION_OFFSET: f64 = 100.0;

    /// Hero background moves at this fraction of the scroll offset
    pub const PARALLAX_RATE: f64 = 0.3;

    /// Scale applied to the hero background so parallax never shows an edge
    pub const PARALLAX_SCALE: f64 = 1.1;
}

/// Layout defaults used when a page description omits them
pub mod layout {
    /// Fixed header height (px), subtracted from anchor scroll targets
    pub const HEADER_HEIGHT: f64 = 80.0;

    /// Viewport height (px) assumed until the first resize event
    pub const VIEWPORT_HEIGHT: f64 = 900.0;
}

/// Reveal animations and lazy images
pub mod reveal {
    use super::*;

    /// Delay step between staggered cards
    pub const STAGGER_STEP: Duration = Duration::from_millis(100);

    /// Staggered cards cycle through this many delay slots
    pub const STAGGER_SLOTS: usize = 4;

    /// Elements must clear the viewport bottom by this many px to count as visible
    pub const BOTTOM_MARGIN: f64 = 100.0;

    /// Sweep delay after the page finishes loading
    pub const LOAD_SWEEP_DELAY: Duration = Duration::from_millis(500);

    /// Quiet period after the last resize before sweeping again
    pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(250);
}

/// Gallery lightbox
pub mod lightbox {
    use super::*;

    /// Image fade-out time before the next image is swapped in
    pub const FADE: Duration = Duration::from_millis(200);
}

/// Transient notifications
pub mod notify {
    use super::*;

    /// Notifications dismiss themselves after this long
    pub const AUTO_DISMISS: Duration = Duration::from_secs(5);

    /// Exit animation length before the element is removed
    pub const LEAVE_ANIMATION: Duration = Duration::from_millis(300);
}

/// Inquiry form
pub mod inquiry {
    use super::*;

    /// Stand-in latency for the simulated backend
    pub const SIMULATED_DELAY: Duration = Duration::from_millis(1500);

    /// Request timeout for the HTTP backend
    pub const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

    /// Submit button label while idle
    pub const SUBMIT_LABEL: &str = "ثبت درخواست";

    /// Submit button label while a submission is pending
    pub const PENDING_LABEL: &str = "در حال ارسال...";

    pub const SUCCESS_MESSAGE: &str =
        "درخواست شما با موفقیت ثبت شد. کارشناسان ما در کمتر از ۲ ساعت با شما تماس خواهند گرفت.";

    pub const ERROR_MESSAGE: &str = "خطا در ارسال فرم. لطفا مجددا تلاش کنید.";

    /// Shown when the backend refuses the inquiry itself; retrying as-is won't help
    pub const REJECTED_MESSAGE: &str = "اطلاعات فرم پذیرفته نشد. لطفا اطلاعات را بررسی کنید.";

    /// Accepted digit count for phone numbers (after stripping separators)
    pub const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 7..=15;
}
