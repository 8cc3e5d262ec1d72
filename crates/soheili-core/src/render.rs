//! Presentation snapshot
//!
//! Pure function of page state: the classes, inline styles and text the DOM
//! layer applies. Nothing here mutates state.

use serde::Serialize;

use crate::nav::ScrollRequest;
use crate::notify::Phase;
use crate::page::Page;
use crate::scroll::HeaderVisibility;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderView {
    pub classes: Vec<&'static str>,
    pub transform: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodyView {
    /// `overflow` style: "hidden" while any surface holds the scroll lock
    pub overflow: &'static str,
    pub classes: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavView {
    pub hamburger_active: bool,
    pub menu_active: bool,
    pub active_link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightboxView {
    pub active: bool,
    pub index: Option<usize>,
    pub image_src: Option<String>,
    pub image_alt: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevealView {
    pub id: String,
    pub transition_delay: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageView {
    pub id: String,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipView {
    pub id: String,
    pub text: String,
    pub opacity: f32,
    pub transform: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationView {
    pub id: u64,
    pub class: &'static str,
    pub icon: &'static str,
    pub message: String,
    pub opacity: f32,
    pub transform: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
    pub submit_label: String,
    pub submit_disabled: bool,
    pub invalid_fields: Vec<String>,
}

/// Everything visible about the page at one instant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub header: HeaderView,
    pub hero_transform: String,
    pub body: BodyView,
    pub nav: NavView,
    pub lightbox: LightboxView,
    pub revealed: Vec<RevealView>,
    pub loaded_images: Vec<ImageView>,
    pub tooltips: Vec<TooltipView>,
    pub notifications: Vec<NotificationView>,
    pub form: FormView,
    pub scroll_request: Option<ScrollRequest>,
    pub current_year: Option<i32>,
}

/// Render the page state
pub fn render(page: &Page) -> RenderSnapshot {
    let scroll = page.scroll();

    let header = HeaderView {
        classes: if scroll.is_scrolled() {
            vec!["scrolled"]
        } else {
            Vec::new()
        },
        transform: match scroll.header() {
            HeaderVisibility::Shown => "translateY(0)",
            HeaderVisibility::Hidden => "translateY(-100%)",
        },
    };

    let menu_open = page.menu().is_open();
    let body = BodyView {
        overflow: if page.scroll_lock().is_locked() {
            "hidden"
        } else {
            ""
        },
        classes: if menu_open { vec!["menu-open"] } else { Vec::new() },
    };

    let nav = NavView {
        hamburger_active: menu_open,
        menu_active: menu_open,
        active_link: page.nav().active().map(|l| l.href.clone()),
    };

    let lightbox = page.lightbox();
    let displayed = lightbox.displayed();
    let lightbox = LightboxView {
        active: lightbox.is_open(),
        index: lightbox.index(),
        image_src: displayed.map(|i| i.src.clone()),
        image_alt: displayed.map(|i| i.title.clone()),
        title: displayed.map(|i| i.title.clone()),
        description: displayed.map(|i| i.description.clone()),
        opacity: lightbox.opacity(),
    };

    let revealed = page
        .reveal()
        .revealed()
        .map(|e| RevealView {
            id: e.id.clone(),
            transition_delay: e.delay.map(|d| format!("{}ms", d.as_millis())),
        })
        .collect();

    let loaded_images = page
        .lazy
        .loaded()
        .filter_map(|img| {
            img.src.as_ref().map(|src| ImageView {
                id: img.spec.id.clone(),
                src: src.clone(),
            })
        })
        .collect();

    let tooltips = page
        .tooltips
        .iter()
        .map(|t| TooltipView {
            id: t.id.clone(),
            text: t.text.clone(),
            opacity: t.opacity(),
            transform: t.transform(),
        })
        .collect();

    let notifications = page
        .notifications()
        .list()
        .into_iter()
        .map(|n| {
            let (opacity, transform) = match n.phase {
                Phase::Visible => (1.0, "translateX(-50%) translateY(0)"),
                Phase::Leaving => (0.0, "translateX(-50%) translateY(-20px)"),
            };
            NotificationView {
                id: n.id,
                class: n.kind.class_name(),
                icon: n.kind.icon(),
                message: n.message,
                opacity,
                transform,
            }
        })
        .collect();

    let control = page.inquiry().control();
    let form = FormView {
        submit_label: control.label().to_string(),
        submit_disabled: control.is_disabled(),
        invalid_fields: page.inquiry().errors().to_vec(),
    };

    RenderSnapshot {
        header,
        hero_transform: scroll.parallax_transform(),
        body,
        nav,
        lightbox,
        revealed,
        loaded_images,
        tooltips,
        notifications,
        form,
        scroll_request: page.scroll_request(),
        current_year: page.current_year,
    }
}
