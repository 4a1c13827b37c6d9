// src/config.rs
//
// Run configuration.
//
// The QR base URL and placement rectangle are the two knobs of the whole
// system. They travel as explicit values into the layout planner and the
// conversion driver, so two runs (or two tests) never share settings.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::AppResult;

/// Default QR rectangle on the poster template: left, top, right, bottom
pub const DEFAULT_QR_PLACEMENT: [f32; 4] = [1400.0, 2415.0, 1540.0, 2555.0];

/// Default QR image side
pub const DEFAULT_QR_SIZE: u32 = 120;

/// Default office renderer binary
pub const DEFAULT_RENDERER_PROGRAM: &str = "soffice";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub stamping: StampingConfig,
    pub renderer: RendererConfig,

    /// Concurrent conversions; `None` uses the available parallelism
    pub jobs: Option<usize>,
}

impl AppConfig {
    pub fn jobs(&self) -> usize {
        self.jobs
            .filter(|jobs| *jobs > 0)
            .or_else(|| std::thread::available_parallelism().ok().map(|n| n.get()))
            .unwrap_or(1)
    }
}

/// QR link and placement settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StampingConfig {
    /// Every poster links to `<base_url>/<output file name>`
    pub base_url: String,

    /// Region on page 1, top-left origin, in the template's units
    pub placement: QrPlacement,

    /// Side of the generated QR image
    pub qr_size: u32,
}

impl Default for StampingConfig {
    fn default() -> Self {
        Self {
            base_url: format!("https://curent.utk.edu/{}SiteVisit", Utc::now().year()),
            placement: QrPlacement::default(),
            qr_size: DEFAULT_QR_SIZE,
        }
    }
}

/// A rectangle measured from the top-left corner of the page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QrPlacement {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl QrPlacement {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }
}

impl Default for QrPlacement {
    fn default() -> Self {
        let [left, top, right, bottom] = DEFAULT_QR_PLACEMENT;
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// External office renderer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub program: PathBuf,

    /// LibreOffice instances sharing one profile must not run concurrently
    pub reentrant: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_RENDERER_PROGRAM),
            reentrant: false,
        }
    }
}

/// Load configuration from a TOML file. A missing file yields defaults.
pub fn load_config(path: &Path) -> AppResult<AppConfig> {
    if !path.exists() {
        log::debug!("No config file at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let contents = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&contents)?;
    Ok(config)
}
