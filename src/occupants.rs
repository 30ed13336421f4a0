//! Occupants — the patrons walking between the door and their seats.
//!
//! Each occupant follows a two-leg Manhattan path. Inbound they walk down the
//! side aisle to their row, then along the row to the seat. Outbound they
//! walk back along the row, then up the aisle to the door.

use tracing::debug;

use crate::random::RandomSource;
use crate::seats::SeatGrid;
use crate::types::Point;

/// Where patrons appear and disappear: the door in the top-left corner.
pub const ENTRY_POINT: Point = Point::new(-0.98, 0.6);

/// Walking speed bounds in normalized units per second.
pub const MIN_SPEED: f32 = 0.3;
pub const MAX_SPEED: f32 = 0.6;

/// Drawn size of a single occupant.
pub const OCCUPANT_SIZE: f32 = 0.08;

#[derive(Debug, Clone, PartialEq)]
pub struct Occupant {
    pub pos: Point,
    pub target: Point,
    pub start: Point,
    pub speed: f32,
    pub reached_row: bool,
    pub seated: bool,
    pub exiting: bool,
    pub has_left: bool,
}

impl Occupant {
    pub fn new(start: Point, target: Point, speed: f32) -> Self {
        Occupant {
            pos: start,
            target,
            start,
            speed,
            reached_row: false,
            seated: false,
            exiting: false,
            has_left: false,
        }
    }

    /// Move one step along the current leg. At most one leg completes per call.
    fn step(&mut self, dt: f32) {
        if self.has_left {
            return;
        }
        let step = (self.speed * dt).max(0.0);

        if !self.exiting {
            if self.seated {
                return;
            }
            if !self.reached_row {
                let (y, done) = approach(self.pos.y, self.target.y, step);
                self.pos.y = y;
                self.reached_row = done;
            } else {
                let (x, done) = approach(self.pos.x, self.target.x, step);
                self.pos.x = x;
                self.seated = done;
            }
        } else if self.pos.x != self.start.x {
            let (x, _) = approach(self.pos.x, self.start.x, step);
            self.pos.x = x;
        } else {
            let (y, done) = approach(self.pos.y, self.start.y, step);
            self.pos.y = y;
            self.has_left = done;
        }
    }
}

/// Move `current` toward `target` by at most `step`, landing exactly on the
/// target when it is within reach. Returns the new value and whether the
/// target was reached.
fn approach(current: f32, target: f32, step: f32) -> (f32, bool) {
    let remaining = target - current;
    if remaining.abs() <= step {
        (target, true)
    } else {
        (current + step.copysign(remaining), false)
    }
}

#[derive(Debug, Clone, Default)]
pub struct OccupantSet {
    people: Vec<Occupant>,
}

impl OccupantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current occupants with a fresh audience for the occupied
    /// seats of `grid`.
    ///
    /// Between half (rounded up) and all of the reserved or sold seats are
    /// actually attended. An empty hall spawns nobody.
    pub fn spawn(&mut self, grid: &SeatGrid, rng: &mut dyn RandomSource) {
        self.people.clear();

        let mut occupied = grid.occupied_indices();
        if occupied.is_empty() {
            return;
        }

        let max = occupied.len();
        let min = max.div_ceil(2).max(1);
        let count = rng.pick(min, max);
        rng.shuffle(&mut occupied);

        let seats = grid.seats();
        self.people.extend(occupied.into_iter().take(count).map(|index| {
            let seat = &seats[index].rect;
            let speed = rng.uniform(MIN_SPEED, MAX_SPEED);
            Occupant::new(ENTRY_POINT, Point::new(seat.x, seat.y), speed)
        }));

        debug!(occupied = max, attending = count, "audience spawned");
    }

    pub fn begin_exit(&mut self) {
        for p in &mut self.people {
            p.exiting = true;
            p.seated = false;
            p.reached_row = false;
        }
    }

    pub fn advance(&mut self, dt: f32) {
        for p in &mut self.people {
            p.step(dt);
        }
    }

    pub fn all_seated(&self) -> bool {
        self.people.iter().all(|p| p.seated)
    }

    pub fn all_departed(&self) -> bool {
        self.people.iter().all(|p| p.has_left)
    }

    pub fn clear(&mut self) {
        self.people.clear();
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Occupant> {
        self.people.iter()
    }

    /// Occupants still inside the hall.
    pub fn visible(&self) -> impl Iterator<Item = &Occupant> {
        self.people.iter().filter(|p| !p.has_left)
    }

    #[cfg(test)]
    pub(crate) fn push(&mut self, occupant: Occupant) {
        self.people.push(occupant);
    }
}
