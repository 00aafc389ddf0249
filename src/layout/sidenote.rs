//! Sidenote layout resolver.
//!
//! Each rail note is aligned with the text line its reference sits on and
//! pushed down past every note already placed above it. Nothing happens
//! when the rail is hidden; notes then render inline.

use serde::{Deserialize, Serialize};

/// Visibility probe of the rail's first child.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RailProbe {
    pub displayed: bool,
    pub width: f64,
}

impl RailProbe {
    pub const HIDDEN: Self = Self {
        displayed: false,
        width: 0.0,
    };

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.displayed && self.width > 0.0
    }
}

/// Measurements for one in-text reference and the note it points at.
///
/// Offsets are in pixels; `block_top` is relative to the content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceMetrics {
    pub note_id: String,
    /// Reference top, relative to its containing block.
    pub offset_in_block: f64,
    /// Containing block top, relative to the content block.
    pub block_top: f64,
    pub block_line_height: f64,
    pub note_height: f64,
    pub note_line_height: f64,
}

impl ReferenceMetrics {
    /// Line of the containing block the reference sits on.
    ///
    /// Rounded rather than floored: the raised reference glyph must not move
    /// it onto the previous line.
    pub fn line_index(&self) -> f64 {
        if !(self.block_line_height.is_finite() && self.block_line_height > 0.0) {
            return 0.0;
        }
        (self.offset_in_block / self.block_line_height).round().max(0.0)
    }

    pub fn ideal_top(&self) -> f64 {
        self.block_top + self.line_index() * self.block_line_height.max(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SidenoteMeasurements {
    pub rail: RailProbe,
    /// In document order.
    pub references: Vec<ReferenceMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidenotePlacement {
    pub note_id: String,
    pub ideal_top: f64,
    pub resolved_top: f64,
    pub height: f64,
}

impl SidenotePlacement {
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.resolved_top + self.height
    }

    #[inline]
    pub fn was_pushed(&self) -> bool {
        self.resolved_top > self.ideal_top
    }
}

/// Place every rail note.
///
/// `gap_ratio` scales each note's own line-height into the minimum gap
/// above it. Each note is checked against all earlier placements in order,
/// so a push caused by one note is re-checked against the ones after it.
pub fn resolve_sidenotes(measurements: &SidenoteMeasurements, gap_ratio: f64) -> Vec<SidenotePlacement> {
    if !measurements.rail.is_visible() {
        return Vec::new();
    }

    let mut placed: Vec<SidenotePlacement> = Vec::with_capacity(measurements.references.len());
    for reference in &measurements.references {
        let ideal_top = reference.ideal_top();
        let gap = reference.note_line_height.max(0.0) * gap_ratio;

        let mut top = ideal_top;
        for earlier in &placed {
            let floor = earlier.bottom() + gap;
            if top < floor {
                top = floor;
            }
        }

        if top > ideal_top {
            crate::debug!("sidenote"; "{} pushed down {:.1}px", reference.note_id, top - ideal_top);
        }
        placed.push(SidenotePlacement {
            note_id: reference.note_id.clone(),
            ideal_top,
            resolved_top: top,
            height: reference.note_height.max(0.0),
        });
    }
    placed
}
