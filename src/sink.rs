//! Entity position sink
//!
//! The engine only computes target positions. Whatever draws the racers
//! implements [`PositionSink`] and does its own smoothing.

use glam::DVec2;

use crate::sim::RaceEntity;

/// Receives per-racer updates from the race controller
pub trait PositionSink {
    /// New target position for racer `index` (every tick while racing)
    fn set_target(&mut self, index: usize, entity: &RaceEntity);

    /// Racer placed directly at its current target (race start, reset)
    fn snap(&mut self, _index: usize, _entity: &RaceEntity) {}

    /// Stop smoothing toward the target
    fn stop(&mut self, _index: usize, _entity: &RaceEntity) {}

    /// Race over; fires exactly once per race with the winner
    fn race_complete(&mut self, _index: usize, _winner: &RaceEntity) {}
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PositionSink for NullSink {
    fn set_target(&mut self, _index: usize, _entity: &RaceEntity) {}
}

/// What a [`RecordingSink`] saw
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Target { index: usize, x: f64 },
    Snap { index: usize, x: f64 },
    Stop { index: usize },
    RaceComplete { index: usize, name: String },
}

/// Records every call, for tests and replays
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn completions(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SinkEvent::RaceComplete { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Most recent target pushed for racer `index`
    pub fn last_target(&self, index: usize) -> Option<f64> {
        self.events.iter().rev().find_map(|e| match *e {
            SinkEvent::Target { index: i, x } if i == index => Some(x),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl PositionSink for RecordingSink {
    fn set_target(&mut self, index: usize, entity: &RaceEntity) {
        self.events.push(SinkEvent::Target {
            index,
            x: entity.target_x,
        });
    }

    fn snap(&mut self, index: usize, entity: &RaceEntity) {
        self.events.push(SinkEvent::Snap {
            index,
            x: entity.target_x,
        });
    }

    fn stop(&mut self, index: usize, _entity: &RaceEntity) {
        self.events.push(SinkEvent::Stop { index });
    }

    fn race_complete(&mut self, index: usize, winner: &RaceEntity) {
        self.events.push(SinkEvent::RaceComplete {
            index,
            name: winner.name.clone(),
        });
    }
}

/// Catch-up rate (per second) toward the target
pub const CATCH_UP_SPEED: f64 = 5.0;
/// Distance under which a follower snaps onto its target
pub const SNAP_DISTANCE: f64 = 0.5;

/// One smoothed sprite position
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Follower {
    pub position: DVec2,
    pub target: DVec2,
    pub moving: bool,
}

impl Follower {
    /// Frame-rate independent exponential catch-up
    pub fn update(&mut self, delta_ms: f64) {
        if !self.moving {
            return;
        }
        let delta = self.target - self.position;
        if delta.length() > SNAP_DISTANCE {
            self.position += delta * (CATCH_UP_SPEED * (delta_ms / 1000.0));
        } else {
            self.position = self.target;
        }
    }
}

/// Smooths displayed positions toward the engine's targets the way the
/// sprite layer does, for headless runs
#[derive(Debug, Clone, Default)]
pub struct SmoothingSink {
    followers: Vec<Follower>,
    winner: Option<String>,
}

impl SmoothingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn follower(&mut self, index: usize) -> &mut Follower {
        if index >= self.followers.len() {
            self.followers.resize(index + 1, Follower::default());
        }
        &mut self.followers[index]
    }

    /// Advance every follower by one frame
    pub fn update(&mut self, delta_ms: f64) {
        for follower in &mut self.followers {
            follower.update(delta_ms);
        }
    }

    /// Displayed position of racer `index`
    pub fn displayed(&self, index: usize) -> Option<DVec2> {
        self.followers.get(index).map(|f| f.position)
    }

    pub fn displayed_x(&self, index: usize) -> Option<f64> {
        self.displayed(index).map(|p| p.x)
    }

    pub fn followers(&self) -> &[Follower] {
        &self.followers
    }

    /// Winner declared by the last completed race
    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }
}

impl PositionSink for SmoothingSink {
    fn set_target(&mut self, index: usize, entity: &RaceEntity) {
        let follower = self.follower(index);
        follower.target = entity.position();
        follower.moving = true;
    }

    fn snap(&mut self, index: usize, entity: &RaceEntity) {
        let follower = self.follower(index);
        follower.position = entity.position();
        follower.target = entity.position();
    }

    fn stop(&mut self, index: usize, _entity: &RaceEntity) {
        self.follower(index).moving = false;
    }

    fn race_complete(&mut self, _index: usize, winner: &RaceEntity) {
        log::info!("{} wins!", winner.name);
        self.winner = Some(winner.name.clone());
    }
}
