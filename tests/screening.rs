use std::path::Path;

use cinema_hall::occupants::OccupantSet;
use cinema_hall::scenario::Scenario;
use cinema_hall::seats::{COLS, ROWS, SeatGrid};
use cinema_hall::session::{FLICKER_INTERVAL, IDLE_SCREEN, MOVIE_DURATION, Phase, Session};
use cinema_hall::types::SeatStatus;
use rand::SeedableRng;
use rand::rngs::SmallRng;

const DT: f32 = 1.0 / 75.0;

struct Hall {
    seats: SeatGrid,
    people: OccupantSet,
    session: Session,
    rng: SmallRng,
}

impl Hall {
    fn new(seed: u64) -> Self {
        Hall {
            seats: SeatGrid::new(),
            people: OccupantSet::new(),
            session: Session::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn start(&mut self) {
        self.session
            .start_projection(&mut self.people, &self.seats, &mut self.rng);
    }

    fn tick(&mut self) {
        self.session
            .update(DT, &mut self.people, &mut self.seats, &mut self.rng);
    }

    /// Tick while the phase stays `phase`; returns how many ticks that took.
    fn run_phase(&mut self, phase: Phase, limit: usize) -> usize {
        let mut n = 0;
        while self.session.phase() == phase {
            assert!(n < limit, "stuck in {phase:?}");
            self.tick();
            n += 1;
        }
        n
    }
}

#[test]
fn full_cycle_with_two_sold_seats() {
    for seed in 0..20 {
        let mut hall = Hall::new(seed);
        hall.seats.set_status(0, 0, SeatStatus::Sold);
        hall.seats.set_status(0, 1, SeatStatus::Sold);

        hall.start();
        assert_eq!(hall.session.phase(), Phase::Entering);
        assert!((1..=2).contains(&hall.people.len()));

        hall.run_phase(Phase::Entering, 10_000);
        assert_eq!(hall.session.phase(), Phase::Movie);
        assert!(hall.people.all_seated());

        let movie_ticks = hall.run_phase(Phase::Movie, 10_000);
        let expected = (MOVIE_DURATION / DT) as usize;
        assert!(movie_ticks.abs_diff(expected) <= 2, "movie took {movie_ticks} ticks");
        assert_eq!(hall.session.phase(), Phase::Exiting);
        assert!(hall.people.iter().all(|p| p.exiting));
        assert_eq!(hall.session.screen_color(), IDLE_SCREEN);

        hall.run_phase(Phase::Exiting, 10_000);
        assert_eq!(hall.session.phase(), Phase::Idle);
        assert!(hall.people.is_empty());
        assert_eq!(hall.seats.count(SeatStatus::Free), ROWS * COLS);
    }
}

#[test]
fn empty_room_never_walks() {
    let mut hall = Hall::new(7);
    hall.start();
    assert_eq!(hall.session.phase(), Phase::Movie);
    assert!(hall.people.is_empty());

    let mut phases = Vec::new();
    while hall.session.phase() != Phase::Idle {
        hall.tick();
        phases.push(hall.session.phase());
        assert!(phases.len() < 10_000);
    }
    assert!(!phases.contains(&Phase::Exiting));
    assert!(!phases.contains(&Phase::Entering));
    assert_eq!(hall.session.screen_color(), IDLE_SCREEN);
}

#[test]
fn screen_recolors_only_on_flicker_ticks() {
    let mut hall = Hall::new(3);
    hall.start();

    let mut last = hall.session.screen_color();
    let mut tick = 0u64;
    let mut changes = Vec::new();
    while hall.session.phase() == Phase::Movie {
        hall.tick();
        tick += 1;
        let now = hall.session.screen_color();
        if hall.session.phase() == Phase::Movie && now != last {
            changes.push(tick);
        }
        last = now;
    }

    assert!(!changes.is_empty());
    assert!(changes.iter().all(|t| t % FLICKER_INTERVAL == 0));
    assert_eq!(changes.len() as u64, (tick - 1) / FLICKER_INTERVAL);
}

#[test]
fn seats_stay_booked_until_audience_leaves() {
    let mut hall = Hall::new(11);
    hall.seats.set_status(ROWS - 1, 0, SeatStatus::Reserved);
    hall.start();
    hall.run_phase(Phase::Entering, 10_000);

    // Only the session ever wipes seats, and only on the way back to idle.
    assert_eq!(hall.seats.status(ROWS - 1, 0), Some(SeatStatus::Reserved));
    hall.run_phase(Phase::Movie, 10_000);
    assert_eq!(hall.seats.status(ROWS - 1, 0), Some(SeatStatus::Reserved));
    hall.run_phase(Phase::Exiting, 10_000);
    assert_eq!(hall.seats.status(ROWS - 1, 0), Some(SeatStatus::Free));
}

#[test]
fn demo_scenarios_complete() -> anyhow::Result<()> {
    let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");

    let full = Scenario::load(&demos.join("full_house.json"))?.run();
    assert!(full.completed);
    assert_eq!(full.reserved, 2);
    assert_eq!(full.sold, 4 + COLS + 2);
    assert!(!full.skipped_entering);

    let empty = Scenario::load(&demos.join("empty_room.json"))?.run();
    assert!(empty.completed);
    assert!(empty.skipped_entering && empty.skipped_exiting);
    Ok(())
}
