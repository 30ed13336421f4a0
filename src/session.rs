//! Session — the screening state machine.
//!
//! IDLE → ENTERING → MOVIE → EXITING → IDLE. The session owns the movie
//! timer and the screen color; it drives the occupant set and wipes the seat
//! grid when the hall empties out.

use tracing::info;

use crate::occupants::OccupantSet;
use crate::random::RandomSource;
use crate::seats::SeatGrid;
use crate::types::Rgb;

/// Length of a screening in seconds.
pub const MOVIE_DURATION: f32 = 20.0;

/// The screen picks a new color every this many movie ticks.
pub const FLICKER_INTERVAL: u64 = 20;

/// Screen color whenever no movie is playing.
pub const IDLE_SCREEN: Rgb = Rgb::new(0.9, 0.9, 0.9);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Entering,
    Movie,
    Exiting,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Entering => "entering",
            Phase::Movie => "movie",
            Phase::Exiting => "exiting",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    movie_timer: f32,
    frame_counter: u64,
    screen: Rgb,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Session {
            phase: Phase::Idle,
            movie_timer: 0.0,
            frame_counter: 0,
            screen: IDLE_SCREEN,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn screen_color(&self) -> Rgb {
        self.screen
    }

    pub fn movie_timer(&self) -> f32 {
        self.movie_timer
    }

    /// Seconds left in the current screening, or `None` outside MOVIE.
    pub fn remaining(&self) -> Option<f32> {
        (self.phase == Phase::Movie).then(|| (MOVIE_DURATION - self.movie_timer).max(0.0))
    }

    pub fn door_open(&self) -> bool {
        matches!(self.phase, Phase::Entering | Phase::Exiting)
    }

    pub fn shows_overlay(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn accepts_input(&self) -> bool {
        self.phase == Phase::Idle
    }

    fn reset(&mut self) {
        *self = Session::new();
    }

    fn start_movie(&mut self) {
        self.phase = Phase::Movie;
        self.movie_timer = 0.0;
        self.frame_counter = 0;
    }

    /// Let the audience in. Ignored unless the hall is idle.
    ///
    /// With no reserved or sold seats nobody spawns, so the entrance is
    /// skipped and the movie starts right away.
    pub fn start_projection(
        &mut self,
        occupants: &mut OccupantSet,
        seats: &SeatGrid,
        rng: &mut dyn RandomSource,
    ) {
        if self.phase != Phase::Idle {
            return;
        }

        occupants.spawn(seats, rng);
        if occupants.is_empty() {
            info!("hall is empty, skipping the entrance");
            self.start_movie();
        } else {
            info!(audience = occupants.len(), "screening starts, audience entering");
            self.phase = Phase::Entering;
        }
    }

    /// Advance the session by one tick of `dt` seconds.
    pub fn update(
        &mut self,
        dt: f32,
        occupants: &mut OccupantSet,
        seats: &mut SeatGrid,
        rng: &mut dyn RandomSource,
    ) {
        if matches!(self.phase, Phase::Entering | Phase::Exiting) {
            occupants.advance(dt);
        }

        match self.phase {
            Phase::Idle => {}
            Phase::Entering => {
                if occupants.all_seated() {
                    info!("everyone seated, doors close");
                    self.start_movie();
                }
            }
            Phase::Movie => {
                self.movie_timer += dt;
                self.frame_counter += 1;

                if self.frame_counter % FLICKER_INTERVAL == 0 {
                    self.screen = Rgb::new(
                        rng.uniform(0.0, 1.0),
                        rng.uniform(0.0, 1.0),
                        rng.uniform(0.0, 1.0),
                    );
                }

                if self.movie_timer >= MOVIE_DURATION {
                    self.screen = IDLE_SCREEN;
                    info!("movie over");

                    if occupants.is_empty() {
                        info!("nobody to let out, resetting");
                        seats.reset_all_to_free();
                        self.reset();
                    } else {
                        self.phase = Phase::Exiting;
                        occupants.begin_exit();
                        info!(audience = occupants.len(), "audience leaving");
                    }
                }
            }
            Phase::Exiting => {
                if occupants.all_departed() {
                    occupants.clear();
                    seats.reset_all_to_free();
                    self.reset();
                    info!("hall empty, back to idle");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::types::SeatStatus;

    const DT: f32 = 0.05;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    #[test]
    fn starts_idle_with_neutral_screen() {
        let s = Session::new();
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.screen_color(), IDLE_SCREEN);
        assert!(s.shows_overlay());
        assert!(!s.door_open());
        assert!(s.accepts_input());
        assert_eq!(s.remaining(), None);
    }

    #[test]
    fn start_with_audience_enters() {
        let mut seats = SeatGrid::new();
        seats.set_status(0, 0, SeatStatus::Sold);
        let mut people = OccupantSet::new();
        let mut s = Session::new();

        s.start_projection(&mut people, &seats, &mut rng());
        assert_eq!(s.phase(), Phase::Entering);
        assert_eq!(people.len(), 1);
        assert!(s.door_open());
        assert!(!s.shows_overlay());
        assert!(!s.accepts_input());
    }

    #[test]
    fn start_in_empty_hall_skips_to_movie() {
        let seats = SeatGrid::new();
        let mut people = OccupantSet::new();
        let mut s = Session::new();

        s.start_projection(&mut people, &seats, &mut rng());
        assert_eq!(s.phase(), Phase::Movie);
        assert_eq!(s.movie_timer(), 0.0);
        assert!(!s.door_open());
    }

    #[test]
    fn start_while_busy_is_ignored() {
        let mut seats = SeatGrid::new();
        seats.set_status(2, 2, SeatStatus::Reserved);
        let mut people = OccupantSet::new();
        let mut s = Session::new();
        let mut r = rng();

        s.start_projection(&mut people, &seats, &mut r);
        let before: Vec<_> = people.iter().cloned().collect();
        seats.set_status(3, 3, SeatStatus::Reserved);
        s.start_projection(&mut people, &seats, &mut r);

        assert_eq!(s.phase(), Phase::Entering);
        assert_eq!(people.iter().cloned().collect::<Vec<_>>(), before);
    }

    #[test]
    fn idle_update_does_nothing() {
        let mut seats = SeatGrid::new();
        seats.set_status(0, 0, SeatStatus::Reserved);
        let mut people = OccupantSet::new();
        let mut s = Session::new();

        s.update(1.0, &mut people, &mut seats, &mut rng());
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(seats.status(0, 0), Some(SeatStatus::Reserved));
    }

    #[test]
    fn screen_flickers_every_twenty_ticks_then_resets() {
        let mut seats = SeatGrid::new();
        let mut people = OccupantSet::new();
        let mut s = Session::new();
        let mut r = rng();
        s.start_projection(&mut people, &seats, &mut r);

        let mut changes = 0;
        let mut last = s.screen_color();
        let mut tick = 0u64;
        while s.phase() == Phase::Movie {
            s.update(DT, &mut people, &mut seats, &mut r);
            tick += 1;
            let now = s.screen_color();
            if s.phase() == Phase::Movie {
                if tick % FLICKER_INTERVAL == 0 {
                    assert_ne!(now, last, "tick {tick} should recolor");
                    changes += 1;
                } else {
                    assert_eq!(now, last, "tick {tick} should keep the color");
                }
            }
            last = now;
        }

        // 20s at 0.05s per tick; the last tick ends the movie.
        assert!((399..=401).contains(&tick), "movie lasted {tick} ticks");
        assert_eq!(changes, (tick - 1) / FLICKER_INTERVAL);
        assert_eq!(s.screen_color(), IDLE_SCREEN);
    }

    #[test]
    fn empty_movie_resets_straight_to_idle() {
        let mut seats = SeatGrid::new();
        let mut people = OccupantSet::new();
        let mut s = Session::new();
        let mut r = rng();
        s.start_projection(&mut people, &seats, &mut r);

        let mut phases = vec![s.phase()];
        while s.phase() != Phase::Idle {
            s.update(1.0, &mut people, &mut seats, &mut r);
            phases.push(s.phase());
        }
        assert!(!phases.contains(&Phase::Exiting));
        assert!(!phases.contains(&Phase::Entering));
        assert_eq!(phases.len(), 21);
    }

    #[test]
    fn movie_end_with_audience_begins_exit() {
        let mut seats = SeatGrid::new();
        seats.set_status(1, 1, SeatStatus::Sold);
        let mut people = OccupantSet::new();
        let mut s = Session::new();
        let mut r = rng();

        s.start_projection(&mut people, &seats, &mut r);
        while s.phase() == Phase::Entering {
            s.update(DT, &mut people, &mut seats, &mut r);
        }
        assert_eq!(s.phase(), Phase::Movie);
        assert!(people.all_seated());

        s.update(MOVIE_DURATION, &mut people, &mut seats, &mut r);
        assert_eq!(s.phase(), Phase::Exiting);
        assert_eq!(s.screen_color(), IDLE_SCREEN);
        assert!(people.iter().all(|p| p.exiting && !p.seated));
        // Seats are only wiped once everyone is out.
        assert_eq!(seats.status(1, 1), Some(SeatStatus::Sold));

        while s.phase() == Phase::Exiting {
            s.update(DT, &mut people, &mut seats, &mut r);
        }
        assert_eq!(s.phase(), Phase::Idle);
        assert!(people.is_empty());
        assert_eq!(seats.status(1, 1), Some(SeatStatus::Free));
    }
}
