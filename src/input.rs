//! Input edges — turns polled device state into one-shot triggers.
//!
//! The front-end reports what is held down right now; this module remembers
//! the previous frame and fires only on the press, never while held.

use crate::seats::pixel_to_ndc;
use crate::types::Point;

/// Number of purchase keys (`1` through `9`).
pub const DIGIT_KEYS: usize = 9;

/// Raw device state for one frame, as polled by the front-end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    pub mouse_left: bool,
    /// Cursor position in pixels, origin top-left.
    pub cursor: (f32, f32),
    /// Drawable area in pixels.
    pub screen: (f32, f32),
    /// `digits[i]` is the key for `i + 1`.
    pub digits: [bool; DIGIT_KEYS],
    pub start: bool,
}

impl InputSnapshot {
    pub fn cursor_ndc(&self) -> Option<Point> {
        let (w, h) = self.screen;
        if w <= 0.0 || h <= 0.0 {
            return None;
        }
        Some(pixel_to_ndc(self.cursor.0, self.cursor.1, w, h))
    }
}

/// What the user newly asked for this frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Triggers {
    /// Click position in normalized coordinates.
    pub click: Option<Point>,
    /// Size of the block to buy, 1 through 9. Lowest digit wins if several
    /// keys go down on the same frame.
    pub purchase: Option<usize>,
    pub start: bool,
}

impl Triggers {
    pub fn is_empty(&self) -> bool {
        self.click.is_none() && self.purchase.is_none() && !self.start
    }
}

#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    mouse_left: bool,
    digits: [bool; DIGIT_KEYS],
    start: bool,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `now` against the previous frame and remember it for the next.
    pub fn update(&mut self, now: &InputSnapshot) -> Triggers {
        let click = if rising(&mut self.mouse_left, now.mouse_left) {
            now.cursor_ndc()
        } else {
            None
        };

        let mut purchase = None;
        for (i, (prev, held)) in self.digits.iter_mut().zip(now.digits).enumerate() {
            if rising(prev, held) && purchase.is_none() {
                purchase = Some(i + 1);
            }
        }

        let start = rising(&mut self.start, now.start);

        Triggers {
            click,
            purchase,
            start,
        }
    }
}

fn rising(prev: &mut bool, now: bool) -> bool {
    let fired = now && !*prev;
    *prev = now;
    fired
}
