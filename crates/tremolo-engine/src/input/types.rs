/// Logical pixels scrolled per wheel "line".
pub const LINE_SCROLL_PX: f32 = 40.0;

/// Keys the diagram page reacts to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Space,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    PageUp,
    PageDown,
    Home,
    End,
    /// Number row `0`..=`9`.
    Digit(u8),
    Other,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyState {
    Pressed,
    Released,
}

/// Wheel movement; `Line` comes from notched wheels, `Pixel` from touchpads.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum WheelDelta {
    Line { y: f32 },
    Pixel { y: f32 },
}

impl WheelDelta {
    /// Scroll distance in logical pixels, positive when content should move
    /// down the page (wheel towards the user).
    pub fn scroll_px(self) -> f32 {
        match self {
            WheelDelta::Line { y } => -y * LINE_SCROLL_PX,
            WheelDelta::Pixel { y } => -y,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        key: Key,
        state: KeyState,
        repeat: bool,
    },
    Wheel(WheelDelta),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wheel_lines_scale_to_pixels() {
        assert_eq!(WheelDelta::Line { y: -1.0 }.scroll_px(), LINE_SCROLL_PX);
        assert_eq!(WheelDelta::Pixel { y: 12.5 }.scroll_px(), -12.5);
    }
}
