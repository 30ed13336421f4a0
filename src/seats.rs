//! Seat grid — the fixed auditorium layout and reservation rules.
//!
//! Seats are laid out once at startup and never added or removed; only their
//! status changes. Row 0 is the row nearest the screen (top of the canvas),
//! column 0 is the leftmost seat.

use tracing::{debug, warn};

use crate::types::{Point, Rect, SeatStatus};

pub const ROWS: usize = 8;
pub const COLS: usize = 9;

const ORIGIN_X: f32 = -0.5;
const ORIGIN_Y: f32 = 0.3;
const PITCH_X: f32 = 0.13;
const PITCH_Y: f32 = 0.15;
const SEAT_W: f32 = 0.1;
const SEAT_H: f32 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Seat {
    pub rect: Rect,
    pub status: SeatStatus,
}

/// A block of seats bought in one purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Purchase {
    pub row: usize,
    pub first_col: usize,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct SeatGrid {
    seats: Vec<Seat>,
}

impl Default for SeatGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl SeatGrid {
    pub fn new() -> Self {
        let mut seats = Vec::with_capacity(ROWS * COLS);
        for row in 0..ROWS {
            for col in 0..COLS {
                seats.push(Seat {
                    rect: Rect::new(
                        ORIGIN_X + col as f32 * PITCH_X,
                        ORIGIN_Y - row as f32 * PITCH_Y,
                        SEAT_W,
                        SEAT_H,
                    ),
                    status: SeatStatus::Free,
                });
            }
        }
        SeatGrid { seats }
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn index(row: usize, col: usize) -> usize {
        row * COLS + col
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Seat> {
        if row < ROWS && col < COLS {
            self.seats.get(Self::index(row, col))
        } else {
            None
        }
    }

    pub fn status(&self, row: usize, col: usize) -> Option<SeatStatus> {
        self.get(row, col).map(|s| s.status)
    }

    /// Overwrite a seat's status directly. Out-of-range coordinates are ignored.
    pub fn set_status(&mut self, row: usize, col: usize, status: SeatStatus) {
        if row < ROWS && col < COLS {
            self.seats[Self::index(row, col)].status = status;
        }
    }

    pub fn count(&self, status: SeatStatus) -> usize {
        self.seats.iter().filter(|s| s.status == status).count()
    }

    /// Indices of every reserved or sold seat, in grid scan order.
    pub fn occupied_indices(&self) -> Vec<usize> {
        self.seats
            .iter()
            .enumerate()
            .filter(|(_, s)| s.status.is_occupied())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn reset_all_to_free(&mut self) {
        for seat in &mut self.seats {
            seat.status = SeatStatus::Free;
        }
    }

    /// Flip the first seat containing `point` between free and reserved.
    ///
    /// Sold seats are left alone. Returns the index of the seat that was hit,
    /// whether or not its status changed.
    pub fn toggle_at(&mut self, point: Point) -> Option<usize> {
        let (index, seat) = self
            .seats
            .iter_mut()
            .enumerate()
            .find(|(_, s)| s.rect.contains(point))?;

        seat.status = match seat.status {
            SeatStatus::Free => SeatStatus::Reserved,
            SeatStatus::Reserved => SeatStatus::Free,
            SeatStatus::Sold => SeatStatus::Sold,
        };
        debug!(index, status = ?seat.status, "seat toggled");
        Some(index)
    }

    /// Sell `n` adjacent free seats in one row.
    ///
    /// Rows are searched from the back of the hall to the front; within a row
    /// the rightmost possible block wins. Only one block is sold per call.
    pub fn purchase_contiguous_block(&mut self, n: usize) -> Option<Purchase> {
        if n == 0 || n > COLS {
            return None;
        }

        for row in (0..ROWS).rev() {
            for first_col in (0..=COLS - n).rev() {
                let run = (first_col..first_col + n)
                    .all(|col| self.seats[Self::index(row, col)].status == SeatStatus::Free);
                if run {
                    for col in first_col..first_col + n {
                        self.seats[Self::index(row, col)].status = SeatStatus::Sold;
                    }
                    let purchase = Purchase {
                        row,
                        first_col,
                        count: n,
                    };
                    debug!(?purchase, "seats sold");
                    return Some(purchase);
                }
            }
        }

        warn!(requested = n, "not enough contiguous seats");
        None
    }
}

/// Convert a pointer position in pixels (origin top-left, y down) into
/// normalized coordinates (origin center, y up).
pub fn pixel_to_ndc(px: f32, py: f32, screen_width: f32, screen_height: f32) -> Point {
    Point::new(
        2.0 * px / screen_width - 1.0,
        1.0 - 2.0 * py / screen_height,
    )
}
