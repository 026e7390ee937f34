use super::LocalState;

/// Holds the old (committed) and current (trial) states of a point
///
/// Models read `old` and produce a new state that the host stores in `current`.
/// The host calls [StateBuffer::commit] after the global step is accepted or
/// [StateBuffer::reset] to discard the trial state (e.g., on cutback).
#[derive(Clone, Debug)]
pub struct StateBuffer {
    /// Holds the state at the beginning of the step
    pub old: LocalState,

    /// Holds the state at the end of the step
    pub current: LocalState,
}

impl StateBuffer {
    /// Allocates a new instance with both states equal to the initial state
    pub fn new(initial: LocalState) -> Self {
        StateBuffer {
            old: initial.clone(),
            current: initial,
        }
    }

    /// Sets the current state
    pub fn set_current(&mut self, state: LocalState) {
        self.current = state;
    }

    /// Accepts the current state (old ← current)
    pub fn commit(&mut self) {
        self.old.mirror(&self.current);
    }

    /// Discards the current state (current ← old)
    pub fn reset(&mut self) {
        self.current.mirror(&self.old);
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
