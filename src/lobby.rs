//! Session restart logic around the race engine
//!
//! A lobby turns a roster into racers (lanes plus cosmetic skins drawn from
//! their own RNG), builds controllers, restarts races and prunes winners
//! between heats.

use thiserror::Error;

use crate::config::RaceConfig;
use crate::consts::MIN_VIABLE_ROSTER;
use crate::roster::Roster;
use crate::sim::{RaceController, RaceEntity, RaceState, SeededRandom, Variant};
use crate::sink::PositionSink;
use crate::test_seam::TestSeam;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LobbyError {
    #[error("roster has {count} racers, need at least {min}")]
    RosterTooSmall { count: usize, min: usize },
    #[error("no finished race to take a winner from")]
    NoWinner,
}

#[derive(Debug, Clone)]
pub struct Lobby {
    /// Config with the session seed resolved
    config: RaceConfig,
    /// Whether the seed was supplied (replays) or drawn from the clock
    fixed_seed: bool,
    roster: Roster,
    heat: u32,
    test_seam: Option<TestSeam>,
}

impl Lobby {
    pub fn new(config: RaceConfig, roster: Roster) -> Self {
        let fixed_seed = config.seed.is_some();
        let seed = config.seed.unwrap_or_else(crate::time_seed);
        log::info!(
            "Lobby created with seed {} ({}), {} racers",
            seed,
            if fixed_seed { "fixed" } else { "clock" },
            roster.len()
        );

        Self {
            config: RaceConfig {
                seed: Some(seed),
                ..config
            },
            fixed_seed,
            roster,
            heat: 1,
            test_seam: None,
        }
    }

    /// Attach a test seam to every controller this lobby builds
    pub fn with_test_seam(mut self, seam: TestSeam) -> Self {
        self.test_seam = Some(seam);
        self
    }

    /// Outcome seed for the current session
    pub fn seed(&self) -> u32 {
        self.config.seed.unwrap_or_default()
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn heat(&self) -> u32 {
        self.heat
    }

    /// Racers for the current roster: evenly spaced lanes, skins from the
    /// cosmetic RNG so they never disturb race outcomes
    pub fn build_entities(&self) -> Vec<RaceEntity> {
        let mut skin_rng = SeededRandom::new(self.config.cosmetic_seed());
        let count = self.roster.len();

        self.roster
            .names()
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let skin = skin_rng.next_int(0, Variant::ALL.len() as i64 - 1) as usize;
                RaceEntity::new(
                    name.clone(),
                    Variant::ALL[skin],
                    self.config.lane_y(i, count),
                    self.config.start_x,
                )
            })
            .collect()
    }

    /// Fresh idle controller for the current roster
    pub fn controller<S: PositionSink>(&self, sink: S) -> RaceController<S> {
        let controller = RaceController::new(self.config.clone(), self.build_entities(), sink);
        match &self.test_seam {
            Some(seam) => controller.with_test_seam(seam.clone()),
            None => controller,
        }
    }

    /// Reset for another race with the same racers. Clock-seeded sessions get
    /// a fresh outcome stream; fixed seeds keep theirs so replays stay exact.
    pub fn restart<S: PositionSink>(&self, controller: &mut RaceController<S>) {
        controller.reset();
        if !self.fixed_seed {
            let seed = crate::time_seed();
            log::info!("Reseeding race with {}", seed);
            controller.reseed(seed);
        }
    }

    /// Drop the finished race's winner and build the next heat. A race that
    /// is still idle or running has no winner yet, even if one is pre-selected.
    pub fn next_heat<S: PositionSink, T: PositionSink>(
        &mut self,
        finished: &RaceController<S>,
        sink: T,
    ) -> Result<RaceController<T>, LobbyError> {
        if finished.state() != RaceState::Finished {
            return Err(LobbyError::NoWinner);
        }
        let winner = finished.winner().ok_or(LobbyError::NoWinner)?;
        let pruned = self.roster.without(&winner.name);
        if pruned.len() < MIN_VIABLE_ROSTER {
            return Err(LobbyError::RosterTooSmall {
                count: pruned.len(),
                min: MIN_VIABLE_ROSTER,
            });
        }

        log::info!(
            "Heat {} won by {}, {} racers remain",
            self.heat,
            winner.name,
            pruned.len()
        );
        self.roster = pruned;
        self.heat += 1;
        Ok(self.controller(sink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::NullSink;

    fn lobby(seed: u32, names: &[&str]) -> Lobby {
        Lobby::new(RaceConfig::seeded(seed), Roster::from_names(names).unwrap())
    }

    #[test]
    fn test_entities_from_roster() {
        let lobby = lobby(42, &["A", "B", "C"]);
        let entities = lobby.build_entities();
        assert_eq!(entities.len(), 3);
        assert_eq!(entities[1].name, "B");
        assert!(entities.iter().all(|e| e.target_x == lobby.config().start_x));
        assert!(entities.windows(2).all(|w| w[0].lane_y < w[1].lane_y));
    }

    #[test]
    fn test_skins_are_deterministic() {
        let a = lobby(42, &["A", "B", "C", "D", "E"]).build_entities();
        let b = lobby(42, &["A", "B", "C", "D", "E"]).build_entities();
        let skins_a: Vec<Variant> = a.iter().map(|e| e.variant).collect();
        let skins_b: Vec<Variant> = b.iter().map(|e| e.variant).collect();
        assert_eq!(skins_a, skins_b);

        // Skins come from seed + 1000
        let mut rng = SeededRandom::with_seed(1042);
        let expected: Vec<Variant> = (0..5)
            .map(|_| Variant::ALL[rng.next_int(0, 4) as usize])
            .collect();
        assert_eq!(skins_a, expected);
    }

    #[test]
    fn test_skins_do_not_touch_outcome() {
        let lobby = lobby(7, &["A", "B", "C", "D", "E"]);
        let mut race = lobby.controller(NullSink);
        race.start();

        let mut outcome = SeededRandom::with_seed(7);
        assert_eq!(race.winner_index(), outcome.pick_index(5));
    }

    #[test]
    fn test_clock_seed_is_resolved() {
        let lobby = Lobby::new(RaceConfig::default(), Roster::default());
        assert!(lobby.config().seed.is_some());
        assert_eq!(lobby.build_entities().len(), 25);
    }

    #[test]
    fn test_restart_with_fixed_seed_is_replayable() {
        let lobby_a = lobby(99, &["A", "B", "C"]);
        let lobby_b = lobby(99, &["A", "B", "C"]);
        let mut a = lobby_a.controller(NullSink);
        let mut b = lobby_b.controller(NullSink);

        for race in [&mut a, &mut b] {
            race.start();
            race.skip_to_time(15_000.0);
        }
        lobby_a.restart(&mut a);
        lobby_b.restart(&mut b);
        assert_eq!(a.state(), RaceState::Idle);

        a.start();
        b.start();
        assert_eq!(a.winner_index(), b.winner_index());
        assert_eq!(a.trajectory(0), b.trajectory(0));
    }

    #[test]
    fn test_next_heat_prunes_winner() {
        let mut lobby = lobby(5, &["A", "B", "C"]);
        let mut race = lobby.controller(NullSink);
        race.force_winner(0);
        race.start();
        race.skip_to_time(15_000.0);

        let next = lobby.next_heat(&race, NullSink).unwrap();
        assert_eq!(lobby.heat(), 2);
        assert_eq!(lobby.roster().names(), ["B", "C"]);
        assert_eq!(next.entities().len(), 2);
        assert_eq!(next.state(), RaceState::Idle);

        let mut last = next;
        last.force_winner(1);
        last.start();
        last.skip_to_time(15_000.0);
        assert_eq!(
            lobby.next_heat(&last, NullSink).unwrap_err(),
            LobbyError::RosterTooSmall { count: 1, min: 2 }
        );
        assert_eq!(lobby.heat(), 2);
    }

    #[test]
    fn test_next_heat_needs_winner() {
        let mut lobby = lobby(5, &["A", "B", "C"]);
        let race = lobby.controller(NullSink);
        assert_eq!(lobby.next_heat(&race, NullSink).unwrap_err(), LobbyError::NoWinner);
    }

    #[test]
    fn test_next_heat_waits_for_finish() {
        let mut lobby = lobby(5, &["A", "B", "C"]);
        let mut race = lobby.controller(NullSink);
        race.force_winner(0);
        assert_eq!(lobby.next_heat(&race, NullSink).unwrap_err(), LobbyError::NoWinner);

        race.start();
        race.tick(100.0);
        assert_eq!(race.state(), RaceState::Racing);
        assert_eq!(lobby.next_heat(&race, NullSink).unwrap_err(), LobbyError::NoWinner);

        assert_eq!(lobby.heat(), 1);
        assert_eq!(lobby.roster().names(), ["A", "B", "C"]);
    }

    #[test]
    fn test_controllers_share_seam() {
        let seam = TestSeam::new();
        let lobby = lobby(42, &["A", "B"]).with_test_seam(seam.clone());
        let _race = lobby.controller(NullSink);
        assert!(seam.is_ready());
        assert_eq!(seam.state().unwrap().ducks.len(), 2);
    }
}
