//! Page geometry — the fixed page size and the pagination heuristics.
//!
//! All values are CSS pixels at 96 dpi. A4 (210mm × 297mm) renders as
//! 794 × 1122 px, which is what the browser renderer paints each page at.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Defaults
// ────────────────────────────────────────────────────────────────────────────

pub const PAGE_HEIGHT_PX: f64 = 1122.0;
pub const PAGE_WIDTH_PX: f64 = 794.0;
/// Extra gap left below a page boundary when a section is pushed onto the next page.
pub const PAGE_BUFFER_PX: f64 = 48.0;
/// Fraction of the page height a section may occupy and still be pushed whole.
/// Tuned by eye against the template set, not derived.
pub const FIT_THRESHOLD_RATIO: f64 = 0.93;
/// Size of one manual spacing adjustment.
pub const SPACING_STEP_PX: u32 = 50;
/// Longest document a session accepts. Bounds every height the renderer may send.
pub const MAX_PAGES: usize = 100;

// ────────────────────────────────────────────────────────────────────────────
// PageGeometry
// ────────────────────────────────────────────────────────────────────────────

/// Page dimensions and pagination tunables shared by both layout strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_height: f64,
    pub page_width: f64,
    pub buffer: f64,
    pub fit_threshold_ratio: f64,
    pub spacing_step: u32,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

fn default_max_pages() -> usize {
    MAX_PAGES
}

impl Default for PageGeometry {
    fn default() -> Self {
        default_page_geometry()
    }
}

/// Returns the A4 geometry used by every template.
pub fn default_page_geometry() -> PageGeometry {
    PageGeometry {
        page_height: PAGE_HEIGHT_PX,
        page_width: PAGE_WIDTH_PX,
        buffer: PAGE_BUFFER_PX,
        fit_threshold_ratio: FIT_THRESHOLD_RATIO,
        spacing_step: SPACING_STEP_PX,
        max_pages: MAX_PAGES,
    }
}

impl PageGeometry {
    /// Tallest section (px) that is still pushed to the next page instead of split.
    pub fn fit_threshold(&self) -> f64 {
        self.fit_threshold_ratio * self.page_height
    }

    /// The first page boundary strictly below `y`.
    ///
    /// A block starting exactly on a boundary belongs to the page that begins there,
    /// so its page end is one full page further down.
    pub fn next_page_boundary(&self, y: f64) -> f64 {
        ((y / self.page_height).floor() + 1.0) * self.page_height
    }

    /// Zero-based index of the page containing `y`.
    pub fn page_index_at(&self, y: f64) -> usize {
        (y.max(0.0) / self.page_height).floor() as usize
    }

    /// Tallest flowed document (px) a session accepts.
    pub fn max_flowed_height(&self) -> f64 {
        self.max_pages as f64 * self.page_height
    }

    /// `max(1, ceil(flowed_height / page_height))`, clamped to `max_pages`.
    ///
    /// Validated trees stay below the clamp; only accumulated manual overrides can
    /// reach it.
    pub fn page_count(&self, flowed_height: f64) -> usize {
        if flowed_height.is_nan() || flowed_height <= 0.0 {
            return 1;
        }
        let pages = (flowed_height / self.page_height).ceil();
        if pages >= self.max_pages as f64 {
            self.max_pages.max(1)
        } else {
            (pages as usize).max(1)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry_is_a4() {
        let g = default_page_geometry();
        assert_eq!(g.page_height, 1122.0);
        assert_eq!(g.page_width, 794.0);
        assert_eq!(g.buffer, 48.0);
        assert_eq!(g.spacing_step, 50);
        assert!((g.fit_threshold() - 1043.46).abs() < 1e-9);
    }

    #[test]
    fn test_next_page_boundary_is_strictly_after() {
        let g = default_page_geometry();
        assert_eq!(g.next_page_boundary(0.0), 1122.0);
        assert_eq!(g.next_page_boundary(500.0), 1122.0);
        assert_eq!(g.next_page_boundary(1122.0), 2244.0);
        assert_eq!(g.next_page_boundary(1121.5), 1122.0);
    }

    #[test]
    fn test_page_count_never_below_one() {
        let g = default_page_geometry();
        assert_eq!(g.page_count(0.0), 1);
        assert_eq!(g.page_count(1.0), 1);
        assert_eq!(g.page_count(1122.0), 1);
        assert_eq!(g.page_count(1122.5), 2);
        assert_eq!(g.page_count(3.0 * 1122.0), 3);
    }

    #[test]
    fn test_page_count_clamps_huge_and_infinite_heights() {
        let g = default_page_geometry();
        assert_eq!(g.page_count(1e25), MAX_PAGES);
        assert_eq!(g.page_count(f64::INFINITY), MAX_PAGES);
        assert_eq!(g.page_count(f64::NAN), 1);
        assert_eq!(g.page_count(g.max_flowed_height()), MAX_PAGES);
        assert_eq!(g.page_count(g.max_flowed_height() - 1.0), MAX_PAGES);
        assert_eq!(g.page_count(g.max_flowed_height() - 1122.0), MAX_PAGES - 1);
    }

    #[test]
    fn test_page_index_at() {
        let g = default_page_geometry();
        assert_eq!(g.page_index_at(0.0), 0);
        assert_eq!(g.page_index_at(1121.9), 0);
        assert_eq!(g.page_index_at(1122.0), 1);
        assert_eq!(g.page_index_at(-5.0), 0);
    }
}
