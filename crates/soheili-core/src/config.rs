//! Page description
//!
//! Everything the interaction layer needs from the markup, loaded from TOML:
//!
//! ```toml
//! header_height = 80
//!
//! [[sections]]
//! id = "home"
//! top = 0
//! height = 900
//!
//! [[gallery]]
//! src = "images/gallery-1.jpg"
//! title = "Walnut dining table"
//! description = "Solid walnut, oil finish"
//!
//! [backend]
//! kind = "http"
//! endpoint = "https://example.com/api/inquiries"
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;
use url::Url;

use crate::constants;
use crate::error::{Result, SiteError};
use crate::inquiry::{default_fields, FieldSpec, HttpBackend, InquiryBackend, SimulatedBackend};
use crate::lightbox::GalleryItem;
use crate::reveal::{AnimatedSpec, LazyImageSpec};
use crate::scroll::Section;
use crate::tooltip::TooltipSpec;

/// Tunable pixel thresholds
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub scrolled: f64,
    pub hide_header: f64,
    pub section_offset: f64,
    pub reveal_margin: f64,
    pub parallax_rate: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            scrolled: constants::scroll::SCROLLED_THRESHOLD,
            hide_header: constants::scroll::HIDE_HEADER_THRESHOLD,
            section_offset: constants::scroll::SECTION_OFFSET,
            reveal_margin: constants::reveal::BOTTOM_MARGIN,
            parallax_rate: constants::scroll::PARALLAX_RATE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub fields: Vec<FieldSpec>,
    pub submit_label: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            fields: default_fields(),
            submit_label: constants::inquiry::SUBMIT_LABEL.to_string(),
        }
    }
}

/// Where the inquiry form posts to
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    Simulated {
        #[serde(default = "default_simulated_delay_ms")]
        delay_ms: u64,
        #[serde(default)]
        fail: bool,
    },
    Http {
        endpoint: String,
        #[serde(default = "default_http_timeout_secs")]
        timeout_secs: u64,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Simulated {
            delay_ms: default_simulated_delay_ms(),
            fail: false,
        }
    }
}

fn default_simulated_delay_ms() -> u64 {
    constants::inquiry::SIMULATED_DELAY.as_millis() as u64
}

fn default_http_timeout_secs() -> u64 {
    constants::inquiry::HTTP_TIMEOUT.as_secs()
}

impl BackendConfig {
    pub fn build(&self) -> Result<Arc<dyn InquiryBackend>> {
        match self {
            BackendConfig::Simulated { delay_ms, fail } => Ok(Arc::new(SimulatedBackend::new(
                Duration::from_millis(*delay_ms),
                *fail,
            ))),
            BackendConfig::Http {
                endpoint,
                timeout_secs,
            } => {
                let url = parse_endpoint(endpoint)?;
                Ok(Arc::new(HttpBackend::new(
                    url,
                    Duration::from_secs(*timeout_secs),
                )?))
            }
        }
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let url = Url::parse(endpoint)
        .map_err(|e| SiteError::Config(format!("invalid backend endpoint '{endpoint}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SiteError::Config(format!(
            "backend endpoint must be http(s), got '{other}'"
        ))),
    }
}

fn default_header_height() -> f64 {
    constants::layout::HEADER_HEIGHT
}

fn default_viewport_height() -> f64 {
    constants::layout::VIEWPORT_HEIGHT
}

/// Full page description
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_header_height")]
    pub header_height: f64,
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub gallery: Vec<GalleryItem>,
    #[serde(default)]
    pub animated: Vec<AnimatedSpec>,
    #[serde(default)]
    pub lazy_images: Vec<LazyImageSpec>,
    #[serde(default)]
    pub tooltips: Vec<TooltipSpec>,
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            header_height: default_header_height(),
            viewport_height: default_viewport_height(),
            thresholds: Thresholds::default(),
            sections: Vec::new(),
            gallery: Vec::new(),
            animated: Vec::new(),
            lazy_images: Vec::new(),
            tooltips: Vec::new(),
            form: FormConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

impl PageConfig {
    /// Load and validate a page description file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            sections = config.sections.len(),
            gallery = config.gallery.len(),
            "loaded page description"
        );
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject descriptions the page could not behave sensibly with
    pub fn validate(&self) -> Result<()> {
        if self.header_height < 0.0 || self.viewport_height <= 0.0 {
            return Err(SiteError::Config(
                "header_height must be >= 0 and viewport_height > 0".into(),
            ));
        }

        let mut seen = HashSet::new();
        for section in &self.sections {
            if section.id.is_empty() {
                return Err(SiteError::Config("section with empty id".into()));
            }
            if section.height < 0.0 {
                return Err(SiteError::Config(format!(
                    "section '{}' has negative height",
                    section.id
                )));
            }
            if !seen.insert(section.id.as_str()) {
                return Err(SiteError::Config(format!(
                    "duplicate section id '{}'",
                    section.id
                )));
            }
        }

        let mut fields = HashSet::new();
        for field in &self.form.fields {
            if !fields.insert(field.name.as_str()) {
                return Err(SiteError::Config(format!(
                    "duplicate form field '{}'",
                    field.name
                )));
            }
        }

        if let BackendConfig::Http { endpoint, .. } = &self.backend {
            parse_endpoint(endpoint)?;
        }
        Ok(())
    }
}
