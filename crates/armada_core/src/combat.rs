//! Shared damage, disable and impulse resolution.
//!
//! Every site that hurts or shoves a unit (lasers, projectiles, missiles,
//! mines, pulses) goes through [`TickContext`] so that health floors,
//! destruction bookkeeping and the mutation log stay in one place.

use tracing::info;

use crate::components::{EntityId, Unit};
use crate::config::EngineConfig;
use crate::data::Catalog;
use crate::effects::{Anchor, EffectId, TickOutput};
use crate::math::{circles_overlap, Fixed, Vec2Fixed};
use crate::simulation::World;

/// Which units an area query returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affects {
    /// Every operable unit.
    All,
    /// Operable units not on the given team.
    OpposingTo(u8),
}

impl Affects {
    fn includes(self, unit: &Unit) -> bool {
        match self {
            Affects::All => true,
            Affects::OpposingTo(team) => unit.team != team,
        }
    }
}

/// Mutable view of one tick in progress.
pub struct TickContext<'a> {
    /// Definition tables.
    pub catalog: &'a Catalog,
    /// Engine tuning.
    pub config: &'a EngineConfig,
    /// Live state.
    pub world: &'a mut World,
    /// Triggers, advisories and the mutation log for this tick.
    pub out: &'a mut TickOutput,
}

impl TickContext<'_> {
    /// Allocate a fresh entity id.
    pub fn allocate_id(&mut self) -> EntityId {
        self.world.allocate_id()
    }

    /// Subtract `amount` from a unit's health, flooring at zero.
    ///
    /// A unit reaching zero health becomes inoperable for the rest of the
    /// tick and is reaped after the delayed-action phase. Returns `true` if
    /// this call destroyed the unit.
    pub fn damage_unit(&mut self, target: EntityId, amount: Fixed, source: EntityId) -> bool {
        let Some(unit) = self.world.units.get_mut(target) else {
            return false;
        };
        if unit.inoperable {
            return false;
        }

        unit.health = (unit.health - amount).max(Fixed::ZERO);
        self.out.mutated.units.insert(target);

        if unit.health > Fixed::ZERO {
            return false;
        }

        unit.inoperable = true;
        let (position, heading, speed) = unit.pose();
        info!(unit = target, source, "Unit destroyed");
        self.out.trigger(
            EffectId::UNIT_DESTROYED,
            Anchor::Absolute {
                position,
                heading,
                speed,
            },
            None,
        );
        true
    }

    /// Disable a unit for at least `ticks` ticks.
    pub fn disable_unit(&mut self, target: EntityId, ticks: u32) {
        if let Some(unit) = self.world.units.get_mut(target) {
            if unit.inoperable {
                return;
            }
            unit.disabled = unit.disabled.max(ticks);
            self.out.mutated.units.insert(target);
        }
    }

    /// Push a unit with `impulse`, scaled by its mass.
    pub fn push_unit(&mut self, target: EntityId, impulse: Vec2Fixed) {
        let Some(unit) = self.world.units.get_mut(target) else {
            return;
        };
        let Some(def) = self.catalog.unit(unit.def) else {
            return;
        };
        unit.push(impulse, def);
        self.out.mutated.units.insert(target);
    }

    /// Operable units overlapping a circle, in id order.
    ///
    /// O(units) per call; fine at the populations a sector holds.
    #[must_use]
    pub fn units_overlapping_circle(
        &self,
        center: Vec2Fixed,
        radius: Fixed,
        affects: Affects,
    ) -> Vec<EntityId> {
        self.world
            .units
            .iter_sorted()
            .filter(|(_, unit)| unit.is_operable() && affects.includes(unit))
            .filter(|(_, unit)| circles_overlap(center, radius, unit.position, unit.radius))
            .map(|(id, _)| id)
            .collect()
    }

    /// Damage every unit in `targets`.
    pub fn damage_all(&mut self, targets: &[EntityId], amount: Fixed, source: EntityId) {
        for &target in targets {
            self.damage_unit(target, amount, source);
        }
    }
}
