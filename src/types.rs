//! Shared boundary types for the cinema hall simulation.
//!
//! This module defines the two key data contracts:
//! - Input → Core: normalized `Point`s produced from raw pointer positions
//! - Core → Renderer (in-memory): `DrawCommand`s in normalized coordinates

// ---------------------------------------------------------------------------
// Geometry in normalized coordinate space ([-1, 1] on both axes)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

/// Axis-aligned rectangle anchored at its bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// Closed point-in-rect test: points on the edges count as inside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// Linear RGB with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Rgb { r, g, b }
    }

    /// Alpha-composite `self` over `below`.
    pub fn over(self, below: Rgb, alpha: f32) -> Rgb {
        let a = alpha.clamp(0.0, 1.0);
        Rgb {
            r: self.r * a + below.r * (1.0 - a),
            g: self.g * a + below.g * (1.0 - a),
            b: self.b * a + below.b * (1.0 - a),
        }
    }

    pub fn to_bytes(self) -> (u8, u8, u8) {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (q(self.r), q(self.g), q(self.b))
    }
}

// ---------------------------------------------------------------------------
// Seats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeatStatus {
    Free,
    Reserved,
    Sold,
}

impl SeatStatus {
    pub fn is_occupied(self) -> bool {
        matches!(self, SeatStatus::Reserved | SeatStatus::Sold)
    }
}

// ---------------------------------------------------------------------------
// Core → Renderer boundary (in-memory only, never serialized)
// ---------------------------------------------------------------------------

/// Paint order. Later variants paint over earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Screen,
    Door,
    Seat,
    Occupant,
    Overlay,
    Signature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// Fill the covered cells with the command color.
    Solid,
    /// A single figure drawn at the rect's center.
    Figure,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Quad {
        rect: Rect,
        color: Rgb,
        alpha: f32,
        layer: Layer,
        glyph: Glyph,
    },
    Label {
        at: Point,
        text: String,
        color: Rgb,
        alpha: f32,
        layer: Layer,
    },
}

impl DrawCommand {
    pub fn layer(&self) -> Layer {
        match self {
            DrawCommand::Quad { layer, .. } | DrawCommand::Label { layer, .. } => *layer,
        }
    }
}
