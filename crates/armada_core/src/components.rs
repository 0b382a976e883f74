//! Runtime entity state.
//!
//! Components are pure data. Units, ballistic sub-entities and field
//! objects reference each other only by [`EntityId`]; references are
//! resolved by registry lookup every tick and may find nothing.

use serde::{Deserialize, Serialize};

use crate::data::{Catalog, UnitDef};
use crate::math::{fixed_serde, rotate_toward, Fixed, Vec2Fixed};

/// Unique identifier for entities.
///
/// Allocated from one counter shared by every registry, so an id is never
/// reused and never names two live entities. Zero means "none".
pub type EntityId = u64;

/// Object a targeted armament is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetRef {
    /// Another unit.
    Unit(EntityId),
    /// An asteroid.
    Asteroid(EntityId),
}

/// External request to fire one slot this tick.
///
/// Written by the input layer, only read by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FireIntent {
    /// Target for targeted armaments; `None` for untargeted ones.
    pub target: Option<TargetRef>,
}

/// Entity latched by a multi-target armament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackedTarget {
    /// Latched unit.
    pub id: EntityId,
    /// Ticks since it was latched.
    pub time: u32,
}

/// Toggle or countdown state of an armament with an ongoing effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activation {
    /// On/off toggle.
    Toggle(bool),
    /// Ticks of effect remaining.
    Countdown(u32),
}

impl Activation {
    /// Whether the effect is currently running.
    #[must_use]
    pub const fn is_active(self) -> bool {
        match self {
            Activation::Toggle(on) => on,
            Activation::Countdown(left) => left > 0,
        }
    }
}

/// Mutable per-slot state, created when an armament is equipped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotState {
    /// Armament index in the catalog.
    pub armament: usize,
    /// Ticks since the last successful fire.
    pub since_fired: u32,
    /// Rounds left, for ammunition armaments.
    pub ammo: Option<u32>,
    /// Ongoing effect state, for toggled or consumable armaments.
    pub active: Option<Activation>,
    /// Latched targets, for multi-target armaments.
    pub targets: Option<Vec<TrackedTarget>>,
}

impl SlotState {
    /// Bare state for an armament with no behaviour-specific fields.
    #[must_use]
    pub const fn bare(armament: usize) -> Self {
        Self {
            armament,
            since_fired: 0,
            ammo: None,
            active: None,
            targets: None,
        }
    }

    /// Whether the toggle or countdown is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some_and(Activation::is_active)
    }
}

/// A live unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: EntityId,
    /// Unit definition index.
    pub def: usize,
    /// Team; units on the same team never damage each other directly.
    pub team: u8,
    /// World position.
    pub position: Vec2Fixed,
    /// Heading in radians.
    #[serde(with = "fixed_serde")]
    pub heading: Fixed,
    /// Forward speed per tick.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
    /// Accumulated knockback velocity, integrated by the movement layer.
    pub velocity: Vec2Fixed,
    /// Collision radius, copied from the definition.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
    /// Current hull points.
    #[serde(with = "fixed_serde")]
    pub health: Fixed,
    /// Current energy.
    #[serde(with = "fixed_serde")]
    pub energy: Fixed,
    /// Mined resources carried.
    #[serde(with = "fixed_serde")]
    pub cargo: Fixed,
    /// Ticks left disabled.
    pub disabled: u32,
    /// Whether a cloak is running.
    pub cloaked: bool,
    /// Destroyed this tick; awaiting removal.
    pub inoperable: bool,
    /// Per-slot state, in loadout order.
    pub slots: Vec<SlotState>,
    /// Per-slot fire intents, in loadout order.
    pub intents: Vec<Option<FireIntent>>,
}

impl Unit {
    /// Whether the unit can act and be targeted.
    #[must_use]
    pub fn is_operable(&self) -> bool {
        !self.inoperable
    }

    /// Whether the unit is disabled this tick.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled > 0
    }

    /// Add energy, capped at the definition maximum.
    pub fn gain_energy(&mut self, amount: Fixed, def: &UnitDef) {
        self.energy = (self.energy + amount).min(def.energy).max(Fixed::ZERO);
    }

    /// Add health, capped at the definition maximum.
    pub fn heal(&mut self, amount: Fixed, def: &UnitDef) {
        self.health = (self.health + amount).min(def.health);
    }

    /// Add an impulse, scaled by the unit's mass, to its knockback velocity.
    pub fn push(&mut self, impulse: Vec2Fixed, def: &UnitDef) {
        self.velocity += impulse.scale(Fixed::ONE / def.mass);
    }

    /// Turn towards a point by at most the hull's turn rate.
    pub fn steer_toward(&mut self, point: Vec2Fixed, def: &UnitDef) {
        let desired = self.position.heading_to(point);
        self.heading = rotate_toward(self.heading, desired, def.turn_rate);
    }

    /// Remaining cargo capacity.
    #[must_use]
    pub fn cargo_free(&self, def: &UnitDef) -> Fixed {
        (def.cargo - self.cargo).max(Fixed::ZERO)
    }

    /// Snapshot of the unit's pose for absolute effect anchors.
    #[must_use]
    pub fn pose(&self) -> (Vec2Fixed, Fixed, Fixed) {
        (self.position, self.heading, self.speed)
    }

    /// Refill every ammunition slot by `rounds`, capped at each magazine.
    pub fn restock(&mut self, rounds: u32, catalog: &Catalog) {
        for slot in &mut self.slots {
            let Some(ammo) = slot.ammo.as_mut() else {
                continue;
            };
            let max = catalog
                .armament(slot.armament)
                .and_then(|a| a.max_ammo)
                .unwrap_or(*ammo);
            *ammo = ammo.saturating_add(rounds).min(max);
        }
    }
}

/// Short-lived projectile fired by a cannon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Projectile {
    /// Unique identifier.
    pub id: EntityId,
    /// Firing unit.
    pub parent: EntityId,
    /// Firing unit's team.
    pub team: u8,
    /// Armament index that fired it.
    pub def: usize,
    /// World position.
    pub position: Vec2Fixed,
    /// Heading in radians.
    #[serde(with = "fixed_serde")]
    pub heading: Fixed,
    /// Speed per tick.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
    /// Collision radius.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
    /// Damage on direct hit.
    #[serde(with = "fixed_serde")]
    pub damage: Fixed,
    /// Ticks before expiry.
    pub frames_left: u32,
}

/// Missile launched by a missile launcher.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Missile {
    /// Unique identifier.
    pub id: EntityId,
    /// Launching unit.
    pub parent: EntityId,
    /// Launching unit's team.
    pub team: u8,
    /// Missile definition index.
    pub def: usize,
    /// World position.
    pub position: Vec2Fixed,
    /// Heading in radians.
    #[serde(with = "fixed_serde")]
    pub heading: Fixed,
    /// Speed per tick.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
    /// Collision radius.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
    /// Homing target, or zero when unguided or the target was lost.
    pub target: EntityId,
    /// Ticks before self-detonation.
    pub frames_left: u32,
}

/// Mine dropped by a mine layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mine {
    /// Unique identifier.
    pub id: EntityId,
    /// Laying unit.
    pub parent: EntityId,
    /// Laying unit's team.
    pub team: u8,
    /// Mine definition index.
    pub def: usize,
    /// World position.
    pub position: Vec2Fixed,
    /// Heading at deployment, kept for effect anchors.
    #[serde(with = "fixed_serde")]
    pub heading: Fixed,
    /// Body radius.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
    /// Ticks until armed. Inert while positive.
    pub deploying: u32,
    /// Armed ticks remaining.
    pub left: u32,
}

impl Mine {
    /// Whether the mine has finished deploying.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deploying == 0
    }
}

/// A minable asteroid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asteroid {
    /// Unique identifier.
    pub id: EntityId,
    /// Asteroid definition index.
    pub def: usize,
    /// World position.
    pub position: Vec2Fixed,
    /// Body radius.
    #[serde(with = "fixed_serde")]
    pub radius: Fixed,
    /// Resources left.
    #[serde(with = "fixed_serde")]
    pub resources: Fixed,
    /// Yield divisor.
    #[serde(with = "fixed_serde")]
    pub difficulty: Fixed,
}

/// A pickup floating in space.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Collectable {
    /// Unique identifier.
    pub id: EntityId,
    /// Collectable definition index.
    pub def: usize,
    /// World position.
    pub position: Vec2Fixed,
    /// Ticks before it disappears.
    pub left: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_states() {
        assert!(Activation::Toggle(true).is_active());
        assert!(!Activation::Toggle(false).is_active());
        assert!(Activation::Countdown(3).is_active());
        assert!(!Activation::Countdown(0).is_active());
    }

    #[test]
    fn test_bare_slot_is_inactive() {
        let slot = SlotState::bare(7);
        assert_eq!(slot.armament, 7);
        assert!(!slot.is_active());
        assert!(slot.ammo.is_none());
    }
}
