use super::Vec2;

/// Axis-aligned rectangle, top-left origin.
///
/// Page layout and window placement use logical pixels; mesh regions use
/// units normalized to their surface.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Top-left corner.
    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    /// Bottom-right corner.
    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    /// No area (callers normalize first when the size may be negative).
    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Same area with a non-negative size.
    pub fn normalized(self) -> Self {
        let (x, w) = flip(self.origin.x, self.size.x);
        let (y, h) = flip(self.origin.y, self.size.y);
        Rect::new(x, y, w, h)
    }

    #[inline]
    pub fn translated(self, delta: Vec2) -> Self {
        Self::from_origin_size(self.origin + delta, self.size)
    }

    /// Multiplies origin and size, e.g. logical to physical pixels.
    #[inline]
    pub fn scaled(self, factor: f32) -> Self {
        Self::from_origin_size(self.origin * factor, self.size * factor)
    }

    /// Overlap of the two rectangles, `None` unless it has area.
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let (a, b) = (self.normalized(), other.normalized());
        let (a_max, b_max) = (a.max(), b.max());

        let x0 = a.origin.x.max(b.origin.x);
        let y0 = a.origin.y.max(b.origin.y);
        let overlap = Rect::new(x0, y0, a_max.x.min(b_max.x) - x0, a_max.y.min(b_max.y) - y0);

        (!overlap.is_empty()).then_some(overlap)
    }
}

fn flip(start: f32, extent: f32) -> (f32, f32) {
    if extent < 0.0 {
        (start + extent, -extent)
    } else {
        (start, extent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_extents_are_flipped() {
        assert_eq!(
            Rect::new(10.0, 10.0, -4.0, -3.0).normalized(),
            Rect::new(6.0, 7.0, 4.0, 3.0)
        );
        let rect = Rect::new(1.0, 2.0, 10.0, 20.0);
        assert_eq!(rect.normalized(), rect);
    }

    #[test]
    fn diagram_partly_scrolled_off_the_top() {
        let window = Rect::new(0.0, 0.0, 800.0, 600.0);
        let diagram = Rect::new(24.0, 24.0, 752.0, 250.0).translated(Vec2::new(0.0, -100.0));

        assert_eq!(diagram.intersect(window), Some(Rect::new(24.0, 0.0, 752.0, 174.0)));
        assert_eq!(diagram.max(), Vec2::new(776.0, 174.0));
    }

    #[test]
    fn edge_contact_is_not_an_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(a.intersect(Rect::new(10.0, 0.0, 10.0, 10.0)), None);
        assert_eq!(a.intersect(Rect::new(0.0, 40.0, 10.0, 10.0)), None);
        assert!(Rect::new(0.0, 0.0, 0.0, 5.0).is_empty());
    }

    #[test]
    fn scaling_to_physical_pixels() {
        assert_eq!(
            Rect::new(1.0, 2.0, 3.0, 4.0).scaled(2.0),
            Rect::new(2.0, 4.0, 6.0, 8.0)
        );
    }
}
