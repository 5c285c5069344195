//! Race state machine
//!
//! `Idle -> Racing -> Finished`, and `reset()` back to `Idle` from anywhere.
//! The embedding frame loop calls [`RaceController::tick`] once per frame;
//! nothing here blocks or re-enters.

use super::finish_line::FinishLineMarker;
use super::rng::SeededRandom;
use super::state::{RaceEntity, RaceSession, RaceState};
use super::trajectory::{Trajectory, generate_trajectories};
use crate::config::RaceConfig;
use crate::consts::WINNER_FINISH_MARGIN;
use crate::sink::{NullSink, PositionSink};
use crate::test_seam::{DuckSnapshot, TestCommand, TestSeam, TestState};

/// Owns one race: entities, clock, winner, paths and the finish line
#[derive(Debug)]
pub struct RaceController<S: PositionSink = NullSink> {
    config: RaceConfig,
    entities: Vec<RaceEntity>,
    session: RaceSession,
    /// Outcome RNG (winner draw, trajectory shape)
    rng: SeededRandom,
    finish_line: FinishLineMarker,
    sink: S,
    test_seam: Option<TestSeam>,
}

impl<S: PositionSink> RaceController<S> {
    /// Build an idle race. An invalid config is replaced by the defaults,
    /// keeping its seed and policy.
    pub fn new(config: RaceConfig, entities: Vec<RaceEntity>, sink: S) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                log::warn!("Invalid race config ({}), using defaults", e);
                RaceConfig {
                    seed: config.seed,
                    policy: config.policy,
                    ..RaceConfig::default()
                }
            }
        };
        let rng = SeededRandom::new(config.seed);
        let finish_line = config.finish_line_marker();
        let mut controller = Self {
            config,
            entities,
            session: RaceSession::default(),
            rng,
            finish_line,
            sink,
            test_seam: None,
        };
        controller.place_at_start();
        controller
    }

    /// Attach a test seam and publish the initial snapshot
    pub fn with_test_seam(mut self, seam: TestSeam) -> Self {
        self.test_seam = Some(seam);
        self.publish();
        self
    }

    // === Queries ===

    pub fn state(&self) -> RaceState {
        self.session.state
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.session.elapsed_ms
    }

    pub fn remaining_ms(&self) -> f64 {
        (self.config.duration_ms - self.session.elapsed_ms).max(0.0)
    }

    /// Fraction of the race run, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        self.session.elapsed_ms / self.config.duration_ms
    }

    pub fn winner_index(&self) -> Option<usize> {
        self.session.winner_index
    }

    /// The resolved (or forced) winner
    pub fn winner(&self) -> Option<&RaceEntity> {
        self.session.winner_index.and_then(|i| self.entities.get(i))
    }

    pub fn finish_line_x(&self) -> f64 {
        self.finish_line.x
    }

    pub fn finish_line(&self) -> &FinishLineMarker {
        &self.finish_line
    }

    pub fn entities(&self) -> &[RaceEntity] {
        &self.entities
    }

    pub fn trajectory(&self, index: usize) -> Option<&Trajectory> {
        self.session.trajectories.get(index)
    }

    pub fn session(&self) -> &RaceSession {
        &self.session
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Entity indices ordered by current target, leader first
    pub fn standings(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.entities.len()).collect();
        order.sort_by(|&a, &b| {
            self.entities[b]
                .target_x
                .partial_cmp(&self.entities[a].target_x)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        order
    }

    // === Operations ===

    /// Begin the race. No-op unless idle.
    ///
    /// Queued test-seam commands are applied first, so a winner set through
    /// the seam is honoured.
    pub fn start(&mut self) {
        self.pump_test_commands();

        match self.session.state {
            RaceState::Idle => {}
            RaceState::Racing => return,
            RaceState::Finished => {
                log::debug!("start() ignored: race finished, reset first");
                return;
            }
        }

        let count = self.entities.len();
        let winner = match self.session.winner_index {
            Some(forced) => forced,
            None => match self.rng.pick_index(count) {
                Some(drawn) => drawn,
                None => {
                    log::warn!("start() ignored: no racers");
                    return;
                }
            },
        };
        self.session.winner_index = Some(winner);

        for (i, entity) in self.entities.iter_mut().enumerate() {
            entity.snap_to(self.config.start_x);
            self.sink.snap(i, entity);
        }

        self.session.trajectories = generate_trajectories(
            count,
            winner,
            &self.config.track_layout(),
            self.config.policy,
            &mut self.rng,
        );
        self.session.elapsed_ms = 0.0;
        self.finish_line.reset();
        self.session.state = RaceState::Racing;

        log::info!(
            "Race started: {} racers, winner pre-selected: {}",
            count,
            self.entities[winner].name
        );
        self.publish();
    }

    /// Advance the race clock by one frame. No-op unless racing.
    ///
    /// Queued test-seam commands are applied first.
    pub fn tick(&mut self, delta_ms: f64) {
        self.pump_test_commands();

        if self.session.state != RaceState::Racing {
            return;
        }

        // NaN and negative deltas never move the clock backwards
        let delta = if delta_ms > 0.0 { delta_ms } else { 0.0 };
        self.session.elapsed_ms = (self.session.elapsed_ms + delta).min(self.config.duration_ms);

        self.refresh();
        self.publish();
    }

    /// Jump straight to `ms` of race time. No-op unless racing.
    ///
    /// Lands in the same state as ticking up to `ms`.
    pub fn skip_to_time(&mut self, ms: f64) {
        if self.session.state != RaceState::Racing {
            return;
        }

        let target = if ms > 0.0 { ms } else { 0.0 };
        self.session.elapsed_ms = target.min(self.config.duration_ms);
        log::debug!("Skipped to {}ms", self.session.elapsed_ms);

        self.refresh();
        self.publish();
    }

    /// Override the random winner draw. Only honoured while idle; an
    /// out-of-range index is ignored.
    pub fn force_winner(&mut self, index: usize) {
        if self.session.state != RaceState::Idle {
            log::debug!("force_winner({}) ignored while {}", index, self.session.state.as_str());
            return;
        }
        if index >= self.entities.len() {
            log::warn!(
                "force_winner({}) ignored: only {} racers",
                index,
                self.entities.len()
            );
            return;
        }

        self.session.winner_index = Some(index);
        log::info!("Winner forced: {}", self.entities[index].name);
        self.publish();
    }

    /// Back to idle from any state
    pub fn reset(&mut self) {
        self.session.clear();
        self.place_at_start();
        log::info!("Race reset");
        self.publish();
    }

    /// Replace the outcome RNG (fresh races for unseeded sessions)
    pub fn reseed(&mut self, seed: u32) {
        self.config.seed = Some(seed);
        self.rng = SeededRandom::with_seed(seed);
    }

    /// Apply queued test-seam commands now
    pub fn pump_test_commands(&mut self) {
        let Some(seam) = self.test_seam.clone() else {
            return;
        };

        for command in seam.take_commands() {
            match command {
                TestCommand::SkipToTime(ms) => self.skip_to_time(ms),
                TestCommand::SetWinner(index) => match usize::try_from(index) {
                    Ok(index) => self.force_winner(index),
                    Err(_) => log::warn!("set_winner({}) ignored: negative index", index),
                },
            }
        }
    }

    /// Snapshot for test drivers
    pub fn test_state(&self) -> TestState {
        TestState {
            ready: self.test_seam.as_ref().is_some_and(TestSeam::is_ready),
            race_state: self.session.state,
            elapsed_time: self.session.elapsed_ms,
            ducks: self
                .entities
                .iter()
                .map(|e| {
                    let position = e.position();
                    DuckSnapshot {
                        name: e.name.clone(),
                        x: position.x,
                        y: position.y,
                        variant: e.variant.as_str().to_string(),
                    }
                })
                .collect(),
            winner: self.winner().map(|w| w.name.clone()),
            finish_line_x: self.finish_line.x,
        }
    }

    // === Internals ===

    /// Push interpolated targets, move the finish line, check for the end
    fn refresh(&mut self) {
        let elapsed = self.session.elapsed_ms;

        for (i, entity) in self.entities.iter_mut().enumerate() {
            let Some(x) = self
                .session
                .trajectories
                .get(i)
                .and_then(|path| path.position_at(elapsed))
            else {
                continue;
            };
            entity.set_target(x);
            self.sink.set_target(i, entity);
        }

        self.finish_line.update(elapsed);

        if elapsed >= self.config.duration_ms {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.session.state = RaceState::Finished;

        for (i, entity) in self.entities.iter_mut().enumerate() {
            entity.stop();
            self.sink.stop(i, entity);
        }

        let Some(index) = self.session.winner_index else {
            return;
        };
        let Some(winner) = self.entities.get_mut(index) else {
            return;
        };

        // Past the line regardless of interpolation error
        winner.set_target(self.config.finish_x() + WINNER_FINISH_MARGIN);
        self.sink.set_target(index, winner);
        self.sink.race_complete(index, winner);

        log::info!("Race finished: {} wins", winner.name);
    }

    fn place_at_start(&mut self) {
        for (i, entity) in self.entities.iter_mut().enumerate() {
            entity.snap_to(self.config.start_x);
            entity.stop();
            self.sink.snap(i, entity);
            self.sink.stop(i, entity);
        }
        self.finish_line.reset();
    }

    fn publish(&self) {
        if let Some(seam) = &self.test_seam {
            seam.publish(self.test_state());
        }
    }
}
