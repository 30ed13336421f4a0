//! Headless screenings driven by a scripted scenario file.
//!
//! A scenario books seats, starts the projection and ticks the hall at a
//! fixed step until it is idle again, then reports what happened.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auditorium::Auditorium;
use crate::input::InputSnapshot;
use crate::session::Phase;
use crate::types::SeatStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Toggle { row: usize, col: usize },
    Purchase(usize),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_dt")]
    pub dt: f32,
    #[serde(default = "default_max_ticks")]
    pub max_ticks: usize,
    #[serde(default)]
    pub actions: Vec<Action>,
}

fn default_dt() -> f32 {
    1.0 / 75.0
}

fn default_max_ticks() -> usize {
    100_000
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseTicks {
    pub entering: usize,
    pub movie: usize,
    pub exiting: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub reserved: usize,
    pub sold: usize,
    pub audience: usize,
    pub ticks: PhaseTicks,
    pub screen_changes: usize,
    pub skipped_entering: bool,
    pub skipped_exiting: bool,
    pub completed: bool,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let scenario: Scenario = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            bail!("dt must be a positive number of seconds, got {}", self.dt);
        }
        Ok(())
    }

    /// Play the scenario through one full screening.
    pub fn run(&self) -> Report {
        let mut hall = Auditorium::with_seed(self.seed);

        for action in &self.actions {
            match *action {
                Action::Toggle { row, col } => match hall.seats().get(row, col) {
                    Some(seat) => {
                        let center = seat.rect.center();
                        hall.toggle_at(center);
                    }
                    None => warn!(row, col, "no such seat, toggle skipped"),
                },
                Action::Purchase(n) => {
                    hall.purchase(n);
                }
            }
        }

        let reserved = hall.seats().count(SeatStatus::Reserved);
        let sold = hall.seats().count(SeatStatus::Sold);

        hall.start();
        let audience = hall.occupants().len();
        let skipped_entering = hall.phase() == Phase::Movie;

        let idle = InputSnapshot::default();
        let mut ticks = PhaseTicks::default();
        let mut screen_changes = 0;
        let mut saw_exiting = false;
        let mut total = 0;

        while hall.phase() != Phase::Idle && total < self.max_ticks {
            let phase = hall.phase();
            let color = hall.session().screen_color();
            hall.tick(self.dt, &idle);
            total += 1;

            match phase {
                Phase::Entering => ticks.entering += 1,
                Phase::Movie => ticks.movie += 1,
                Phase::Exiting => ticks.exiting += 1,
                Phase::Idle => {}
            }
            saw_exiting |= hall.phase() == Phase::Exiting;
            if hall.phase() == Phase::Movie && hall.session().screen_color() != color {
                screen_changes += 1;
            }
        }

        let completed = hall.phase() == Phase::Idle;
        if completed {
            info!(ticks = total, audience, "scenario finished");
        } else {
            warn!(
                max_ticks = self.max_ticks,
                phase = hall.phase().label(),
                "scenario hit tick limit"
            );
        }

        Report {
            reserved,
            sold,
            audience,
            ticks,
            screen_changes,
            skipped_entering,
            skipped_exiting: !saw_exiting,
            completed,
        }
    }
}
