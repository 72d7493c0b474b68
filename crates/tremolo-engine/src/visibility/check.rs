use crate::coords::{Rect, Viewport};

/// Returns true if `region` (in viewport coordinates) overlaps the viewport
/// vertically.
///
/// Only the vertical axis is considered: the page scrolls vertically and
/// diagrams always span the page width. Touching edges count as visible.
pub fn is_region_visible(region: Rect, viewport: Viewport) -> bool {
    let r = region.normalized();
    r.origin.y + r.size.y >= 0.0 && r.origin.y <= viewport.height
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Viewport = Viewport::new(800.0, 600.0);

    #[test]
    fn inside_is_visible() {
        assert!(is_region_visible(Rect::new(0.0, 100.0, 800.0, 200.0), VIEW));
    }

    #[test]
    fn partially_above_is_visible() {
        assert!(is_region_visible(Rect::new(0.0, -150.0, 800.0, 200.0), VIEW));
    }

    #[test]
    fn fully_above_is_hidden() {
        assert!(!is_region_visible(Rect::new(0.0, -201.0, 800.0, 200.0), VIEW));
    }

    #[test]
    fn fully_below_is_hidden() {
        assert!(!is_region_visible(Rect::new(0.0, 601.0, 800.0, 200.0), VIEW));
    }

    #[test]
    fn touching_edges_count_as_visible() {
        assert!(is_region_visible(Rect::new(0.0, -200.0, 800.0, 200.0), VIEW));
        assert!(is_region_visible(Rect::new(0.0, 600.0, 800.0, 200.0), VIEW));
    }

    #[test]
    fn horizontal_offset_is_ignored() {
        assert!(is_region_visible(Rect::new(5_000.0, 10.0, 100.0, 100.0), VIEW));
    }
}
