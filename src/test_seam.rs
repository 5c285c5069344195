//! Automated test seam
//!
//! A cloneable handle injected into the race controller at construction.
//! Test drivers read published snapshots and queue control commands; the
//! controller applies queued commands between ticks. Not a production
//! control path.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::sim::RaceState;

/// One racer as seen by a test driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuckSnapshot {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub variant: String,
}

/// Snapshot published after every controller operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestState {
    pub ready: bool,
    pub race_state: RaceState,
    pub elapsed_time: f64,
    pub ducks: Vec<DuckSnapshot>,
    pub winner: Option<String>,
    pub finish_line_x: f64,
}

impl TestState {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Control commands, applied by the controller between ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TestCommand {
    SkipToTime(f64),
    /// Raw external index; negative or out-of-range values are ignored
    SetWinner(i64),
}

#[derive(Debug, Default)]
struct SeamInner {
    snapshot: Option<TestState>,
    commands: VecDeque<TestCommand>,
}

/// Shared handle between a test driver and one race controller
#[derive(Debug, Clone, Default)]
pub struct TestSeam {
    inner: Rc<RefCell<SeamInner>>,
}

impl TestSeam {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the controller has published its first snapshot
    pub fn is_ready(&self) -> bool {
        self.inner.borrow().snapshot.is_some()
    }

    /// Latest published snapshot
    pub fn state(&self) -> Option<TestState> {
        self.inner.borrow().snapshot.clone()
    }

    /// Latest snapshot as JSON (`null` before the first publish)
    pub fn state_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.inner.borrow().snapshot)
    }

    /// Queue a jump to `ms` of race time
    pub fn skip_to_time(&self, ms: f64) {
        self.push(TestCommand::SkipToTime(ms));
    }

    /// Queue a forced winner by index
    pub fn set_winner(&self, index: i64) {
        self.push(TestCommand::SetWinner(index));
    }

    pub fn pending(&self) -> usize {
        self.inner.borrow().commands.len()
    }

    fn push(&self, command: TestCommand) {
        log::debug!("Test seam queued {:?}", command);
        self.inner.borrow_mut().commands.push_back(command);
    }

    /// Controller side: store a fresh snapshot
    pub(crate) fn publish(&self, mut state: TestState) {
        state.ready = true;
        self.inner.borrow_mut().snapshot = Some(state);
    }

    /// Controller side: drain queued commands in order
    pub(crate) fn take_commands(&self) -> Vec<TestCommand> {
        self.inner.borrow_mut().commands.drain(..).collect()
    }
}
