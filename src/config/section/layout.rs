//! `[layout]` section: timing and spacing constants.
//!
//! These values were tuned by eye, not derived. They are exposed so a site
//! can retune them; nothing else depends on their exact magnitude.
//!
//! ```toml
//! [layout]
//! fade_ms = 150
//! sidenote_gap = 0.5
//! label_gap = 16.0
//! resize_debounce_ms = 150
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

const MAX_DELAY_MS: u64 = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSection {
    /// Delay between starting the fade-out and swapping content.
    pub fade_ms: u64,

    /// Gap between stacked sidenotes, as a fraction of the note line-height.
    pub sidenote_gap: f64,

    /// Pixels kept between the subtitle and the navigation menu.
    pub label_gap: f64,

    /// Quiet interval before a resize burst triggers a relayout.
    pub resize_debounce_ms: u64,
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            fade_ms: 150,
            sidenote_gap: 0.5,
            label_gap: 16.0,
            resize_debounce_ms: 150,
        }
    }
}

impl LayoutSection {
    #[inline]
    pub fn fade_delay(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }

    #[inline]
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.fade_ms > MAX_DELAY_MS {
            diag.error_with_hint(
                "layout.fade_ms",
                format!("fade delay of {}ms blocks navigation", self.fade_ms),
                format!("use at most {MAX_DELAY_MS}"),
            );
        }
        if self.resize_debounce_ms > MAX_DELAY_MS {
            diag.error_with_hint(
                "layout.resize_debounce_ms",
                format!("debounce of {}ms delays relayout", self.resize_debounce_ms),
                format!("use at most {MAX_DELAY_MS}"),
            );
        }
        if !(self.sidenote_gap.is_finite() && self.sidenote_gap >= 0.0) {
            diag.error("layout.sidenote_gap", "sidenote gap must be a non-negative number");
        }
        if !(self.label_gap.is_finite() && self.label_gap >= 0.0) {
            diag.error("layout.label_gap", "label gap must be a non-negative number");
        }
    }
}
