//! Responsive label resolver.
//!
//! Picks the most detailed subtitle variant that fits beside the navigation
//! menu. When nothing fits, or the menu alone overflows, the region falls
//! back to the shortest variant in a stacked layout.

use serde::{Deserialize, Serialize};

/// Metrics of one header or footer region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelMetrics {
    pub container_width: f64,
    /// Width of one character cell, from an off-screen probe.
    pub char_width: f64,
    /// Rendered menu item widths, measured unstacked.
    pub menu_widths: Vec<f64>,
    /// Gap between adjacent menu items.
    pub menu_gap: f64,
    /// Subtitle variants, most to least detailed.
    pub variants: Vec<String>,
}

impl LabelMetrics {
    pub fn menu_width(&self) -> f64 {
        let items: f64 = self.menu_widths.iter().copied().filter(|w| w.is_finite()).sum();
        let gaps = self.menu_widths.len().saturating_sub(1) as f64 * self.menu_gap.max(0.0);
        items + gaps
    }

    /// Estimated rendered width of variant `idx`.
    pub fn variant_width(&self, idx: usize) -> f64 {
        let cell = if self.char_width.is_finite() { self.char_width.max(0.0) } else { 0.0 };
        self.variants
            .get(idx)
            .map_or(0.0, |v| v.chars().count() as f64 * cell)
    }

    /// Index of the shortest variant; the later one wins ties.
    pub fn shortest(&self) -> Option<usize> {
        (0..self.variants.len()).rev().min_by(|&a, &b| {
            self.variant_width(a)
                .partial_cmp(&self.variant_width(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LabelLayout {
    /// Selected variant, `None` when the region has no variants.
    pub variant: Option<usize>,
    /// Subtitle and menu fall back to the vertical layout.
    pub stacked: bool,
}

impl LabelLayout {
    fn stacked(variant: Option<usize>) -> Self {
        Self {
            variant,
            stacked: true,
        }
    }
}

/// Choose a subtitle variant and layout for one region.
///
/// `gap` is the space kept between the subtitle and the menu.
pub fn resolve_label(metrics: &LabelMetrics, gap: f64) -> LabelLayout {
    let menu = metrics.menu_width();
    if menu > metrics.container_width {
        return LabelLayout::stacked(metrics.shortest());
    }
    if metrics.variants.is_empty() {
        return LabelLayout {
            variant: None,
            stacked: false,
        };
    }

    let fits = (0..metrics.variants.len())
        .find(|&idx| metrics.variant_width(idx) + gap + menu <= metrics.container_width);

    match fits {
        Some(idx) => LabelLayout {
            variant: Some(idx),
            stacked: false,
        },
        None => LabelLayout::stacked(metrics.shortest()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn metrics(container: f64, menu: &[f64], variants: &[&str]) -> LabelMetrics {
        LabelMetrics {
            container_width: container,
            char_width: 10.0,
            menu_widths: menu.to_vec(),
            menu_gap: 8.0,
            variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn test_menu_width_includes_gaps() {
        assert_eq!(metrics(0.0, &[50.0, 60.0, 70.0], &[]).menu_width(), 196.0);
        assert_eq!(metrics(0.0, &[], &[]).menu_width(), 0.0);
    }

    #[test]
    fn test_picks_most_detailed_fit() {
        // menu = 100, gap = 16
        let m = metrics(300.0, &[100.0], &["a".repeat(20).as_str(), "b".repeat(15).as_str(), "c"]);
        assert_eq!(
            resolve_label(&m, 16.0),
            LabelLayout {
                variant: Some(1),
                stacked: false
            }
        );
    }

    #[test]
    fn test_none_fit_falls_back_to_shortest_stacked() {
        let m = metrics(150.0, &[100.0], &["long subtitle", "shorter", "tiny"]);
        assert_eq!(resolve_label(&m, 16.0), LabelLayout::stacked(Some(2)));
    }

    #[test]
    fn test_menu_overflow_is_terminal() {
        let m = metrics(80.0, &[100.0], &["x"]);
        assert_eq!(resolve_label(&m, 0.0), LabelLayout::stacked(Some(0)));
        assert_eq!(resolve_label(&metrics(80.0, &[100.0], &[]), 0.0), LabelLayout::stacked(None));
    }

    #[test]
    fn test_shortest_prefers_last_on_tie() {
        let m = metrics(0.0, &[], &["ab", "cd", "efg"]);
        assert_eq!(m.shortest(), Some(1));
    }

    #[test]
    fn test_no_variants_unstacked() {
        let m = metrics(500.0, &[100.0], &[]);
        assert_eq!(
            resolve_label(&m, 16.0),
            LabelLayout {
                variant: None,
                stacked: false
            }
        );
    }

    proptest! {
        #[test]
        fn prop_selection_respects_width(
            container in 0.0f64..800.0,
            menu in proptest::collection::vec(0.0f64..200.0, 0..4),
            lens in proptest::collection::vec(0usize..60, 0..5),
        ) {
            let variants: Vec<String> = lens.iter().map(|&n| "x".repeat(n)).collect();
            let m = LabelMetrics {
                container_width: container,
                char_width: 7.5,
                menu_widths: menu,
                menu_gap: 12.0,
                variants,
            };
            let layout = resolve_label(&m, 16.0);

            if m.menu_width() > container {
                prop_assert!(layout.stacked);
                prop_assert_eq!(layout.variant, m.shortest());
            } else if !layout.stacked {
                if let Some(idx) = layout.variant {
                    prop_assert!(m.variant_width(idx) + 16.0 + m.menu_width() <= container);
                }
            } else {
                prop_assert_eq!(layout.variant, m.shortest());
            }
        }
    }
}
