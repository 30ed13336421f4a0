//! Auditorium — the per-frame driver tying seats, occupants and session
//! together.
//!
//! One `tick` runs a full frame in a fixed order: input (only while idle),
//! then occupant motion and phase transitions. The renderer reads the result
//! back through `view` or `draw_list`.

use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::debug;

use crate::input::{EdgeDetector, InputSnapshot, Triggers};
use crate::occupants::{ENTRY_POINT, OCCUPANT_SIZE, OccupantSet};
use crate::random::RandomSource;
use crate::seats::{Purchase, SeatGrid};
use crate::session::{Phase, Session};
use crate::types::{DrawCommand, Glyph, Layer, Point, Rect, Rgb, SeatStatus};

// ---------------------------------------------------------------------------
// Scene geometry and palette
// ---------------------------------------------------------------------------

pub const SCREEN_RECT: Rect = Rect::new(-0.6, 0.6, 1.2, 0.3);
pub const DOOR_RECT: Rect = Rect::new(ENTRY_POINT.x, ENTRY_POINT.y, 0.2, 0.3);
pub const OVERLAY_RECT: Rect = Rect::new(-1.0, -1.0, 2.0, 2.0);
pub const SIGNATURE_AT: Point = Point::new(0.5, -0.9);

pub const DOOR_OPEN: Rgb = Rgb::new(0.0, 1.0, 1.0);
pub const DOOR_CLOSED: Rgb = Rgb::new(0.1, 0.1, 0.6);
pub const OVERLAY_COLOR: Rgb = Rgb::new(0.1, 0.1, 0.1);
pub const OVERLAY_ALPHA: f32 = 0.5;
pub const OCCUPANT_COLOR: Rgb = Rgb::new(1.0, 1.0, 1.0);
pub const SIGNATURE_COLOR: Rgb = Rgb::new(1.0, 1.0, 1.0);
pub const SIGNATURE_ALPHA: f32 = 0.8;

pub fn seat_color(status: SeatStatus) -> Rgb {
    match status {
        SeatStatus::Free => Rgb::new(0.2, 0.4, 0.9),
        SeatStatus::Reserved => Rgb::new(0.95, 0.85, 0.1),
        SeatStatus::Sold => Rgb::new(0.85, 0.15, 0.15),
    }
}

// ---------------------------------------------------------------------------
// Core → Renderer snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SeatView {
    pub rect: Rect,
    pub status: SeatStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditoriumView {
    pub phase: Phase,
    pub screen_color: Rgb,
    pub door_open: bool,
    pub overlay: bool,
    pub seats: Vec<SeatView>,
    /// Positions of occupants still in the hall; empty while idle.
    pub occupants: Vec<Point>,
    pub remaining: Option<f32>,
}

// ---------------------------------------------------------------------------
// Auditorium
// ---------------------------------------------------------------------------

pub struct Auditorium {
    seats: SeatGrid,
    occupants: OccupantSet,
    session: Session,
    edges: EdgeDetector,
    rng: Box<dyn RandomSource>,
}

impl Auditorium {
    pub fn new(rng: Box<dyn RandomSource>) -> Self {
        Auditorium {
            seats: SeatGrid::new(),
            occupants: OccupantSet::new(),
            session: Session::new(),
            edges: EdgeDetector::new(),
            rng,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(Box::new(SmallRng::seed_from_u64(seed)))
    }

    pub fn seats(&self) -> &SeatGrid {
        &self.seats
    }

    pub fn occupants(&self) -> &OccupantSet {
        &self.occupants
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase()
    }

    /// Toggle the reservation under `point`. Ignored outside IDLE.
    pub fn toggle_at(&mut self, point: Point) -> Option<usize> {
        if !self.session.accepts_input() {
            return None;
        }
        self.seats.toggle_at(point)
    }

    /// Buy `n` adjacent seats. Ignored outside IDLE.
    pub fn purchase(&mut self, n: usize) -> Option<Purchase> {
        if !self.session.accepts_input() {
            return None;
        }
        self.seats.purchase_contiguous_block(n)
    }

    /// Start the screening. Ignored outside IDLE.
    pub fn start(&mut self) {
        self.session
            .start_projection(&mut self.occupants, &self.seats, self.rng.as_mut());
    }

    /// Run one frame. Returns the triggers detected this frame, whether or
    /// not the current phase let them through.
    pub fn tick(&mut self, dt: f32, input: &InputSnapshot) -> Triggers {
        let triggers = self.edges.update(input);

        if !triggers.is_empty() && !self.session.accepts_input() {
            debug!(phase = self.phase().label(), "input ignored while busy");
        }
        if let Some(point) = triggers.click {
            self.toggle_at(point);
        }
        if let Some(n) = triggers.purchase {
            self.purchase(n);
        }
        if triggers.start {
            self.start();
        }

        self.session.update(
            dt,
            &mut self.occupants,
            &mut self.seats,
            self.rng.as_mut(),
        );

        triggers
    }

    pub fn view(&self) -> AuditoriumView {
        let occupants = if self.phase() == Phase::Idle {
            Vec::new()
        } else {
            self.occupants.visible().map(|p| p.pos).collect()
        };

        AuditoriumView {
            phase: self.phase(),
            screen_color: self.session.screen_color(),
            door_open: self.session.door_open(),
            overlay: self.session.shows_overlay(),
            seats: self
                .seats
                .seats()
                .iter()
                .map(|s| SeatView {
                    rect: s.rect,
                    status: s.status,
                })
                .collect(),
            occupants,
            remaining: self.session.remaining(),
        }
    }

    /// The frame as a list of draw commands, in paint order.
    pub fn draw_list(&self, signature: &str) -> Vec<DrawCommand> {
        let view = self.view();
        let mut ops = Vec::with_capacity(view.seats.len() + view.occupants.len() + 4);

        ops.push(quad(SCREEN_RECT, view.screen_color, Layer::Screen));
        let door = if view.door_open { DOOR_OPEN } else { DOOR_CLOSED };
        ops.push(quad(DOOR_RECT, door, Layer::Door));

        for seat in &view.seats {
            ops.push(quad(seat.rect, seat_color(seat.status), Layer::Seat));
        }

        for pos in &view.occupants {
            ops.push(DrawCommand::Quad {
                rect: Rect::new(pos.x, pos.y, OCCUPANT_SIZE, OCCUPANT_SIZE),
                color: OCCUPANT_COLOR,
                alpha: 1.0,
                layer: Layer::Occupant,
                glyph: Glyph::Figure,
            });
        }

        if view.overlay {
            ops.push(DrawCommand::Quad {
                rect: OVERLAY_RECT,
                color: OVERLAY_COLOR,
                alpha: OVERLAY_ALPHA,
                layer: Layer::Overlay,
                glyph: Glyph::Solid,
            });
        }

        if !signature.is_empty() {
            ops.push(DrawCommand::Label {
                at: SIGNATURE_AT,
                text: signature.to_string(),
                color: SIGNATURE_COLOR,
                alpha: SIGNATURE_ALPHA,
                layer: Layer::Signature,
            });
        }

        ops
    }
}

fn quad(rect: Rect, color: Rgb, layer: Layer) -> DrawCommand {
    DrawCommand::Quad {
        rect,
        color,
        alpha: 1.0,
        layer,
        glyph: Glyph::Solid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click_on(a: &Auditorium, row: usize, col: usize) -> InputSnapshot {
        // 200x200 pixel screen: ndc = px / 100 - 1, py = (1 - ndc) * 100.
        let c = a.seats().get(row, col).unwrap().rect.center();
        InputSnapshot {
            mouse_left: true,
            cursor: ((c.x + 1.0) * 100.0, (1.0 - c.y) * 100.0),
            screen: (200.0, 200.0),
            ..Default::default()
        }
    }

    fn released() -> InputSnapshot {
        InputSnapshot {
            screen: (200.0, 200.0),
            ..Default::default()
        }
    }

    #[test]
    fn click_reserves_seat_through_pixels() {
        let mut a = Auditorium::with_seed(1);
        let input = click_on(&a, 3, 4);
        a.tick(0.01, &input);
        assert_eq!(a.seats().status(3, 4), Some(SeatStatus::Reserved));

        // Holding the button does not toggle it back.
        a.tick(0.01, &input);
        assert_eq!(a.seats().status(3, 4), Some(SeatStatus::Reserved));

        a.tick(0.01, &released());
        a.tick(0.01, &input);
        assert_eq!(a.seats().status(3, 4), Some(SeatStatus::Free));
    }

    #[test]
    fn digit_key_buys_block() {
        let mut a = Auditorium::with_seed(1);
        let mut input = released();
        input.digits[3] = true;
        a.tick(0.01, &input);
        assert_eq!(a.seats().count(SeatStatus::Sold), 4);
    }

    #[test]
    fn input_is_suppressed_while_busy() {
        let mut a = Auditorium::with_seed(1);
        a.purchase(2);
        let mut input = released();
        input.start = true;
        a.tick(0.01, &input);
        assert_eq!(a.phase(), Phase::Entering);

        let click = click_on(&a, 0, 0);
        a.tick(0.01, &click);
        let mut buy = released();
        buy.digits[0] = true;
        a.tick(0.01, &buy);

        assert_eq!(a.seats().status(0, 0), Some(SeatStatus::Free));
        assert_eq!(a.seats().count(SeatStatus::Sold), 2);
        assert_eq!(a.purchase(1), None);
    }

    #[test]
    fn idle_view_has_overlay_and_no_people() {
        let a = Auditorium::with_seed(1);
        let view = a.view();
        assert!(view.overlay);
        assert!(!view.door_open);
        assert!(view.occupants.is_empty());
        assert_eq!(view.remaining, None);

        let ops = a.draw_list("signed");
        assert!(ops.iter().any(|op| op.layer() == Layer::Overlay));
        assert!(
            ops.iter()
                .any(|op| matches!(op, DrawCommand::Label { text, .. } if text == "signed"))
        );
        assert!(ops.contains(&quad(DOOR_RECT, DOOR_CLOSED, Layer::Door)));
    }

    #[test]
    fn entering_view_opens_door_and_shows_people() {
        let mut a = Auditorium::with_seed(9);
        a.purchase(3);
        a.start();
        a.tick(0.01, &released());

        let view = a.view();
        assert_eq!(view.phase, Phase::Entering);
        assert!(view.door_open);
        assert!(!view.overlay);
        assert_eq!(view.occupants.len(), a.occupants().len());

        let ops = a.draw_list("");
        assert!(!ops.iter().any(|op| op.layer() == Layer::Overlay));
        assert!(!ops.iter().any(|op| op.layer() == Layer::Signature));
        assert_eq!(
            ops.iter().filter(|op| op.layer() == Layer::Occupant).count(),
            view.occupants.len()
        );
        assert!(ops.contains(&quad(DOOR_RECT, DOOR_OPEN, Layer::Door)));
    }
}
