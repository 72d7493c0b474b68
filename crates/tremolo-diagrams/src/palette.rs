//! Diagram colours, stored as HSV for the shaders' hue interpolation.

/// Hot end of the heat scale.
pub const HOT_HEX: &str = "#ff2e69";
/// Cold end of the heat scale.
pub const COLD_HEX: &str = "#0ffbff";

/// Converts RGB in `[0, 1]` to HSV with hue in `[0, 1)`.
pub fn hsv_from_rgb([r, g, b]: [f32; 3]) -> [f32; 3] {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let d = max - min;
    let s = if max == 0.0 { 0.0 } else { d / max };

    let h = if d == 0.0 {
        0.0
    } else if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    [h / 6.0, s, max]
}

/// Parses `#rrggbb` (the leading `#` is optional).
pub fn rgb_from_hex(hex: &str) -> Option<[f32; 3]> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .ok()
            .map(|v| f32::from(v) / 255.0)
    };
    Some([channel(0)?, channel(2)?, channel(4)?])
}

pub fn hsv_from_hex(hex: &str) -> Option<[f32; 3]> {
    rgb_from_hex(hex).map(hsv_from_rgb)
}

/// HSV of [`HOT_HEX`].
pub fn hot() -> [f32; 3] {
    hsv_from_hex(HOT_HEX).unwrap_or([0.953, 0.82, 1.0])
}

/// HSV of [`COLD_HEX`].
pub fn cold() -> [f32; 3] {
    hsv_from_hex(COLD_HEX).unwrap_or([0.503, 0.941, 1.0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-3)
    }

    #[test]
    fn heat_colours() {
        assert!(close(hot(), [0.9528, 0.8196, 1.0]), "{:?}", hot());
        assert!(close(cold(), [0.5028, 0.9412, 1.0]), "{:?}", cold());
    }

    #[test]
    fn primaries_and_greys() {
        assert!(close(hsv_from_rgb([1.0, 0.0, 0.0]), [0.0, 1.0, 1.0]));
        assert!(close(hsv_from_rgb([0.0, 1.0, 0.0]), [1.0 / 3.0, 1.0, 1.0]));
        assert!(close(hsv_from_rgb([0.0, 0.0, 1.0]), [2.0 / 3.0, 1.0, 1.0]));
        assert!(close(hsv_from_rgb([0.5, 0.5, 0.5]), [0.0, 0.0, 0.5]));
        assert!(close(hsv_from_rgb([0.0, 0.0, 0.0]), [0.0, 0.0, 0.0]));
    }

    #[test]
    fn malformed_hex_is_rejected() {
        assert_eq!(rgb_from_hex("fff"), None);
        assert_eq!(rgb_from_hex("#gg0000"), None);
        assert_eq!(rgb_from_hex("#ff00\u{e9}"), None);
        assert_eq!(rgb_from_hex("00ff00"), Some([0.0, 1.0, 0.0]));
    }
}
