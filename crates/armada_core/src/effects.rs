//! Outbound effect triggers, advisory messages and the mutation log.
//!
//! None of these are read back by the engine. A tick fills them and
//! hands them to the caller in [`TickOutput`]; the renderer, audio layer
//! and replication layer decide what to do with them.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::components::EntityId;
use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Renderer-side asset selector for an audio-visual cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EffectId(pub u16);

impl EffectId {
    /// Laser beam between shooter and target.
    pub const LASER: Self = Self(1);
    /// Cannon muzzle flash.
    pub const CANNON_FIRE: Self = Self(2);
    /// Missile leaving its launcher.
    pub const MISSILE_LAUNCH: Self = Self(3);
    /// Missile detonation.
    pub const MISSILE_DETONATION: Self = Self(4);
    /// Mine dropped.
    pub const MINE_DEPLOY: Self = Self(5);
    /// Mine explosion.
    pub const MINE_DETONATION: Self = Self(6);
    /// Mining beam between ship and asteroid.
    pub const MINING_BEAM: Self = Self(7);
    /// Tractor beam latching onto a unit.
    pub const TRACTOR_BEAM: Self = Self(8);
    /// Cloak engaging.
    pub const CLOAK_ON: Self = Self(9);
    /// Cloak dropping.
    pub const CLOAK_OFF: Self = Self(10);
    /// Booster ignition.
    pub const BOOSTER: Self = Self(11);
    /// Energy beam to an ally.
    pub const ENERGY_TRANSFER: Self = Self(12);
    /// Pulse emitter charging.
    pub const PULSE_CHARGE: Self = Self(13);
    /// Pulse detonation.
    pub const PULSE_DETONATION: Self = Self(14);
    /// Projectile end-of-life burst.
    pub const PROJECTILE_BURST: Self = Self(15);
    /// Projectile striking a hull.
    pub const PROJECTILE_HIT: Self = Self(16);
    /// Unit destroyed.
    pub const UNIT_DESTROYED: Self = Self(17);
    /// Collectable picked up.
    pub const PICKUP: Self = Self(18);

    /// Short label for logs and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self.0 {
            1 => "laser",
            2 => "cannon_fire",
            3 => "missile_launch",
            4 => "missile_detonation",
            5 => "mine_deploy",
            6 => "mine_detonation",
            7 => "mining_beam",
            8 => "tractor_beam",
            9 => "cloak_on",
            10 => "cloak_off",
            11 => "booster",
            12 => "energy_transfer",
            13 => "pulse_charge",
            14 => "pulse_detonation",
            15 => "projectile_burst",
            16 => "projectile_hit",
            17 => "unit_destroyed",
            18 => "pickup",
            _ => "unknown",
        }
    }
}

/// Where an effect is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anchor {
    /// Follows a unit.
    Player(EntityId),
    /// Follows an asteroid.
    Asteroid(EntityId),
    /// Follows a projectile, missile or mine.
    Projectile(EntityId),
    /// Fixed pose, captured when the trigger was emitted.
    Absolute {
        /// Position snapshot.
        position: Vec2Fixed,
        /// Heading snapshot.
        #[serde(with = "fixed_serde")]
        heading: Fixed,
        /// Speed snapshot.
        #[serde(with = "fixed_serde")]
        speed: Fixed,
    },
}

impl Anchor {
    /// Absolute anchor at rest.
    #[must_use]
    pub const fn at(position: Vec2Fixed, heading: Fixed) -> Self {
        Anchor::Absolute {
            position,
            heading,
            speed: Fixed::ZERO,
        }
    }
}

/// Declarative description of one audio-visual cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectTrigger {
    /// Asset selector.
    pub effect: EffectId,
    /// Start anchor.
    pub from: Anchor,
    /// Optional end anchor for beams.
    pub to: Option<Anchor>,
}

/// Advisory message for the owning unit's client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlashMessage {
    /// Unit that should see the message.
    pub unit: EntityId,
    /// Message text.
    pub text: String,
}

/// Entities touched during a tick, for trimming replication payloads.
///
/// Not an authority on state; cleared at the start of every tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationLog {
    /// Units whose state changed beyond cooldown counters.
    pub units: BTreeSet<EntityId>,
    /// Asteroids that were mined.
    pub asteroids: BTreeSet<EntityId>,
    /// Mines that deployed, armed or exploded.
    pub mines: BTreeSet<EntityId>,
}

impl MutationLog {
    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty() && self.asteroids.is_empty() && self.mines.is_empty()
    }

    /// Clear every set.
    pub fn clear(&mut self) {
        self.units.clear();
        self.asteroids.clear();
        self.mines.clear();
    }
}

/// Everything a tick produced besides the mutated world.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickOutput {
    /// Frame number the tick ran for.
    pub frame: u64,
    /// Effect triggers, in emission order.
    pub effects: Vec<EffectTrigger>,
    /// Advisory messages, in emission order.
    pub flashes: Vec<FlashMessage>,
    /// Mutation log.
    pub mutated: MutationLog,
    /// Units destroyed and reaped this tick.
    pub destroyed: Vec<EntityId>,
    /// Sub-entities spawned this tick.
    pub spawned: Vec<EntityId>,
}

impl TickOutput {
    /// Empty output for `frame`.
    #[must_use]
    pub fn new(frame: u64) -> Self {
        Self {
            frame,
            ..Self::default()
        }
    }

    /// Queue an effect trigger.
    pub fn trigger(&mut self, effect: EffectId, from: Anchor, to: Option<Anchor>) {
        self.effects.push(EffectTrigger { effect, from, to });
    }

    /// Queue an advisory message for `unit`.
    pub fn flash(&mut self, unit: EntityId, text: impl Into<String>) {
        self.flashes.push(FlashMessage {
            unit,
            text: text.into(),
        });
    }

    /// Effect triggers with the given id.
    pub fn effects_of(&self, effect: EffectId) -> impl Iterator<Item = &EffectTrigger> {
        self.effects.iter().filter(move |t| t.effect == effect)
    }
}
