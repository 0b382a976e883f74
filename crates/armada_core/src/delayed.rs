//! Countdown-gated actions not tied to any sub-entity.

use serde::{Deserialize, Serialize};

use crate::components::EntityId;
use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Deferred one-shot effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DelayedEffect {
    /// Area damage burst around a fixed point.
    Pulse {
        /// Detonation centre.
        origin: Vec2Fixed,
        /// Firing heading, for the effect anchor.
        #[serde(with = "fixed_serde")]
        heading: Fixed,
        /// Detonation radius.
        #[serde(with = "fixed_serde")]
        radius: Fixed,
        /// Damage per affected unit.
        #[serde(with = "fixed_serde")]
        damage: Fixed,
        /// Unit that fired it. May be gone by detonation time.
        source: EntityId,
        /// Team of the unit that fired it.
        team: u8,
    },
}

/// A queued effect and its countdown.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DelayedAction {
    /// Drain passes left before the action runs.
    pub frames_remaining: u32,
    /// What runs.
    pub effect: DelayedEffect,
}

/// Insertion-ordered queue of delayed actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DelayedQueue {
    actions: Vec<DelayedAction>,
}

impl DelayedQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `effect` to run `frames` ticks from the current one.
    ///
    /// An action queued on tick `T` with `frames = n` runs during the drain
    /// of tick `T + n`.
    pub fn push(&mut self, frames: u32, effect: DelayedEffect) {
        self.actions.push(DelayedAction {
            frames_remaining: frames,
            effect,
        });
    }

    /// Remove and return every action whose countdown has elapsed, then
    /// count down the rest. Returned actions keep insertion order.
    pub fn drain_due(&mut self) -> Vec<DelayedEffect> {
        let mut due = Vec::new();
        let mut pending = Vec::with_capacity(self.actions.len());
        for mut action in self.actions.drain(..) {
            if action.frames_remaining == 0 {
                due.push(action.effect);
            } else {
                action.frames_remaining -= 1;
                pending.push(action);
            }
        }
        self.actions = pending;
        due
    }

    /// Number of queued actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Queued actions, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &DelayedAction> {
        self.actions.iter()
    }
}
