//! Tick driver and world state.
//!
//! [`World`] holds every live entity and is the only mutable state. The
//! [`Simulation`] pairs it with the read-only [`Catalog`] and
//! [`EngineConfig`] and advances it one tick at a time.
//!
//! # Determinism
//!
//! All operations in this module are fully deterministic:
//! - No floating-point math (uses fixed-point via [`Fixed`])
//! - No system randomness
//! - Consistent iteration order (sorted entity IDs)
//! - Same inputs always produce same outputs
//!
//! # Example
//!
//! ```
//! use armada_core::prelude::*;
//!
//! let text = r#"CatalogData(
//!     units: [UnitDef(
//!         name: "Skiff", health: 10.0, speed: 2.0, energy: 5.0, energy_regen: 0.1,
//!         mass: 1.0, radius: 1.0, turn_rate: 0.1, acceleration: 0.5, slots: [Normal],
//!     )],
//!     armaments: [
//!         ArmamentDef(name: "Empty normal slot", slot: Normal, behavior: Empty),
//!         ArmamentDef(name: "Empty utility slot", slot: Utility, behavior: Empty),
//!         ArmamentDef(name: "Empty mine slot", slot: Mine, behavior: Empty),
//!         ArmamentDef(name: "Empty large slot", slot: Large, behavior: Empty),
//!         ArmamentDef(name: "Empty mining slot", slot: Mining, behavior: Empty),
//!     ],
//! )"#;
//! let catalog = Catalog::from_ron_str("inline", text).unwrap();
//! let mut sim = Simulation::new(catalog, EngineConfig::default());
//! let unit = sim.spawn_unit(0, 0, Vec2Fixed::ZERO, Fixed::ZERO).unwrap();
//!
//! let output = sim.tick();
//! assert_eq!(output.frame, 0);
//! assert_eq!(sim.get_tick(), 1);
//! assert!(sim.world().unit(unit).is_some());
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::armament;
use crate::combat::TickContext;
use crate::components::{
    Asteroid, Collectable, EntityId, FireIntent, Mine, Missile, Projectile, TargetRef, Unit,
};
use crate::config::EngineConfig;
use crate::data::{ArmamentBehavior, Catalog};
use crate::delayed::DelayedQueue;
use crate::effects::TickOutput;
use crate::error::{GameError, Result};
use crate::math::{wrap_angle, Fixed, Vec2Fixed};
use crate::ordnance;
use crate::registry::Registry;

/// All live simulation state.
///
/// Every entity id is allocated from one counter, so an id appears in at
/// most one registry and is never reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    /// Ticks advanced so far.
    pub(crate) tick: u64,
    /// Next id to hand out.
    pub(crate) next_id: EntityId,
    pub(crate) units: Registry<Unit>,
    pub(crate) projectiles: Registry<Projectile>,
    pub(crate) missiles: Registry<Missile>,
    pub(crate) mines: Registry<Mine>,
    pub(crate) asteroids: Registry<Asteroid>,
    pub(crate) collectables: Registry<Collectable>,
    pub(crate) delayed: DelayedQueue,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create an empty world at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick: 0,
            next_id: 1,
            units: Registry::new(),
            projectiles: Registry::new(),
            missiles: Registry::new(),
            mines: Registry::new(),
            asteroids: Registry::new(),
            collectables: Registry::new(),
            delayed: DelayedQueue::new(),
        }
    }

    /// Hand out a fresh id. Never returns zero.
    pub(crate) fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    /// Ticks advanced so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Live units.
    #[must_use]
    pub fn units(&self) -> &Registry<Unit> {
        &self.units
    }

    /// Live projectiles.
    #[must_use]
    pub fn projectiles(&self) -> &Registry<Projectile> {
        &self.projectiles
    }

    /// Live missiles.
    #[must_use]
    pub fn missiles(&self) -> &Registry<Missile> {
        &self.missiles
    }

    /// Live mines.
    #[must_use]
    pub fn mines(&self) -> &Registry<Mine> {
        &self.mines
    }

    /// Asteroids.
    #[must_use]
    pub fn asteroids(&self) -> &Registry<Asteroid> {
        &self.asteroids
    }

    /// Collectables.
    #[must_use]
    pub fn collectables(&self) -> &Registry<Collectable> {
        &self.collectables
    }

    /// Pending delayed actions.
    #[must_use]
    pub fn delayed(&self) -> &DelayedQueue {
        &self.delayed
    }

    /// Get a unit by id.
    #[must_use]
    pub fn unit(&self, id: EntityId) -> Option<&Unit> {
        self.units.get(id)
    }

    /// Get a mutable unit by id, for the movement and input layers.
    pub fn unit_mut(&mut self, id: EntityId) -> Option<&mut Unit> {
        self.units.get_mut(id)
    }

    /// Get a mutable mine by id.
    pub fn mine_mut(&mut self, id: EntityId) -> Option<&mut Mine> {
        self.mines.get_mut(id)
    }

    /// Get a mutable asteroid by id.
    pub fn asteroid_mut(&mut self, id: EntityId) -> Option<&mut Asteroid> {
        self.asteroids.get_mut(id)
    }

    /// Request that `slot` fire at `target` on every tick until cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit does not exist or has no such slot.
    pub fn set_fire_intent(
        &mut self,
        unit: EntityId,
        slot: usize,
        target: Option<TargetRef>,
    ) -> Result<()> {
        let intent = self.intent_mut(unit, slot)?;
        *intent = Some(FireIntent { target });
        Ok(())
    }

    /// Withdraw a fire request.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit does not exist or has no such slot.
    pub fn clear_fire_intent(&mut self, unit: EntityId, slot: usize) -> Result<()> {
        let intent = self.intent_mut(unit, slot)?;
        *intent = None;
        Ok(())
    }

    fn intent_mut(&mut self, unit: EntityId, slot: usize) -> Result<&mut Option<FireIntent>> {
        self.units
            .get_mut(unit)
            .ok_or(GameError::EntityNotFound(unit))?
            .intents
            .get_mut(slot)
            .ok_or(GameError::SlotOutOfRange { unit, slot })
    }

    fn insert_collectable(
        &mut self,
        catalog: &Catalog,
        def: usize,
        position: Vec2Fixed,
    ) -> Result<EntityId> {
        let collectable_def = catalog
            .collectable(def)
            .ok_or(GameError::UnknownCollectableDef(def))?;
        let id = self.allocate_id();
        self.collectables.insert(
            id,
            Collectable {
                id,
                def,
                position,
                left: collectable_def.lifetime,
            },
        );
        Ok(id)
    }

    /// Compute a deterministic hash of the world state.
    ///
    /// Used for desync detection between peers and for replays.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.tick.hash(&mut hasher);
        self.next_id.hash(&mut hasher);

        self.units.hash_sorted(&mut hasher);
        self.projectiles.hash_sorted(&mut hasher);
        self.missiles.hash_sorted(&mut hasher);
        self.mines.hash_sorted(&mut hasher);
        self.asteroids.hash_sorted(&mut hasher);
        self.collectables.hash_sorted(&mut hasher);
        self.delayed.hash(&mut hasher);

        hasher.finish()
    }

    /// Serialize world state to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize world: {e}")))
    }

    /// Deserialize world state from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize world: {e}")))
    }
}

/// The combat engine.
///
/// Owns the catalog, the engine config and the world, and advances the
/// world in a fixed phase order.
///
/// # Phase Order
///
/// Each tick runs, in this order:
/// 1. **Slot frames** - regen, cooldown counters, passive drains and heals
/// 2. **Fire resolution** - every slot with a fire intent
/// 3. **Sub-entities** - projectiles, missiles, mines, then collectables
/// 4. **Delayed actions** - countdowns that reached zero
/// 5. **Reaping** - removal of units destroyed during the tick
#[derive(Debug, Clone)]
pub struct Simulation {
    catalog: Catalog,
    config: EngineConfig,
    world: World,
}

impl Simulation {
    /// Create a simulation with an empty world.
    #[must_use]
    pub fn new(catalog: Catalog, config: EngineConfig) -> Self {
        Self {
            catalog,
            config,
            world: World::new(),
        }
    }

    /// Resume from a saved world.
    ///
    /// # Errors
    ///
    /// Returns an error if the world references definitions the catalog
    /// does not have.
    pub fn with_world(catalog: Catalog, config: EngineConfig, world: World) -> Result<Self> {
        for (id, unit) in world.units.iter_sorted() {
            if catalog.unit(unit.def).is_none() {
                return Err(GameError::UnknownUnitDef(unit.def));
            }
            if let Some(slot) = unit.slots.iter().find(|s| catalog.armament(s.armament).is_none()) {
                return Err(GameError::UnknownArmament(slot.armament));
            }
            if unit.intents.len() != unit.slots.len() {
                return Err(GameError::InvalidState(format!(
                    "Unit {id} has {} intents for {} slots",
                    unit.intents.len(),
                    unit.slots.len()
                )));
            }
        }
        Ok(Self {
            catalog,
            config,
            world,
        })
    }

    /// Get the current tick number.
    #[must_use]
    pub const fn get_tick(&self) -> u64 {
        self.world.tick
    }

    /// Definition tables.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Engine tuning.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Live state.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable live state, for the movement and input layers.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Catalog and mutable world together, for movement layers that need
    /// hull stats while they move units.
    pub fn split_mut(&mut self) -> (&Catalog, &mut World) {
        (&self.catalog, &mut self.world)
    }

    /// Spawn a unit with its hull's default loadout, at full health and
    /// energy.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit definition or a loadout armament is
    /// unknown.
    pub fn spawn_unit(
        &mut self,
        def: usize,
        team: u8,
        position: Vec2Fixed,
        heading: Fixed,
    ) -> Result<EntityId> {
        let unit_def = self.catalog.unit(def).ok_or(GameError::UnknownUnitDef(def))?;

        let mut slots = Vec::with_capacity(unit_def.slot_count());
        for slot in 0..unit_def.slot_count() {
            let armament = unit_def
                .default_armament(slot)
                .ok_or(GameError::UnknownUnitDef(def))?;
            let armament_def = self
                .catalog
                .armament(armament)
                .ok_or(GameError::UnknownArmament(armament))?;
            slots.push(armament::equip(armament, armament_def));
        }

        let id = self.world.allocate_id();
        let unit = Unit {
            id,
            def,
            team,
            position,
            heading: wrap_angle(heading),
            speed: Fixed::ZERO,
            velocity: Vec2Fixed::ZERO,
            radius: unit_def.radius,
            health: unit_def.health,
            energy: unit_def.energy,
            cargo: Fixed::ZERO,
            disabled: 0,
            cloaked: false,
            inoperable: false,
            intents: vec![None; slots.len()],
            slots,
        };
        self.world.units.insert(id, unit);
        debug!(unit = id, def = %unit_def.name, team, "Unit spawned");
        Ok(id)
    }

    /// Remove a unit outright, without destruction effects.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit does not exist.
    pub fn despawn_unit(&mut self, id: EntityId) -> Result<Unit> {
        self.world
            .units
            .remove(id)
            .ok_or(GameError::EntityNotFound(id))
    }

    /// Mount `armament` in a unit's slot, replacing whatever was there.
    ///
    /// The slot's state is rebuilt from scratch and its fire intent cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit, slot or armament does not exist, or
    /// the armament does not fit the slot.
    pub fn equip(&mut self, unit_id: EntityId, slot: usize, armament: usize) -> Result<()> {
        let catalog = &self.catalog;
        let def = catalog
            .armament(armament)
            .ok_or(GameError::UnknownArmament(armament))?;
        let unit = self
            .world
            .units
            .get_mut(unit_id)
            .ok_or(GameError::EntityNotFound(unit_id))?;
        let unit_def = catalog
            .unit(unit.def)
            .ok_or(GameError::UnknownUnitDef(unit.def))?;
        let kind = *unit_def.slots.get(slot).ok_or(GameError::SlotOutOfRange {
            unit: unit_id,
            slot,
        })?;
        if def.slot != kind {
            return Err(GameError::IncompatibleSlot {
                armament: def.name.clone(),
                slot: kind.name().to_string(),
            });
        }

        let state = unit.slots.get_mut(slot).ok_or(GameError::SlotOutOfRange {
            unit: unit_id,
            slot,
        })?;
        *state = armament::equip(armament, def);
        if let Some(intent) = unit.intents.get_mut(slot) {
            *intent = None;
        }
        unit.cloaked = unit.slots.iter().any(|s| {
            s.is_active()
                && matches!(
                    catalog.armament(s.armament).map(|d| &d.behavior),
                    Some(ArmamentBehavior::Cloak { .. })
                )
        });
        debug!(unit = unit_id, slot, armament = %def.name, "Armament equipped");
        Ok(())
    }

    /// Place an asteroid with its definition's full resources.
    ///
    /// # Errors
    ///
    /// Returns an error if the asteroid definition is unknown.
    pub fn spawn_asteroid(&mut self, def: usize, position: Vec2Fixed) -> Result<EntityId> {
        let asteroid_def = self
            .catalog
            .asteroid(def)
            .ok_or(GameError::UnknownAsteroidDef(def))?;
        let id = self.world.allocate_id();
        self.world.asteroids.insert(
            id,
            Asteroid {
                id,
                def,
                position,
                radius: asteroid_def.radius,
                resources: asteroid_def.resources,
                difficulty: asteroid_def.difficulty,
            },
        );
        Ok(id)
    }

    /// Place a collectable.
    ///
    /// # Errors
    ///
    /// Returns an error if the collectable definition is unknown.
    pub fn spawn_collectable(&mut self, def: usize, position: Vec2Fixed) -> Result<EntityId> {
        self.world.insert_collectable(&self.catalog, def, position)
    }

    /// Request that a unit's slot fire. See [`World::set_fire_intent`].
    ///
    /// # Errors
    ///
    /// Returns an error if the unit does not exist or has no such slot.
    pub fn set_fire_intent(
        &mut self,
        unit: EntityId,
        slot: usize,
        target: Option<TargetRef>,
    ) -> Result<()> {
        self.world.set_fire_intent(unit, slot, target)
    }

    /// Withdraw a fire request. See [`World::clear_fire_intent`].
    ///
    /// # Errors
    ///
    /// Returns an error if the unit does not exist or has no such slot.
    pub fn clear_fire_intent(&mut self, unit: EntityId, slot: usize) -> Result<()> {
        self.world.clear_fire_intent(unit, slot)
    }

    /// Advance the world by one tick, labelled `frame` in the output.
    ///
    /// Never fails: rejected fires are no-ops or advisories in the
    /// returned [`TickOutput`].
    pub fn advance(&mut self, frame: u64) -> TickOutput {
        let mut out = TickOutput::new(frame);
        let mut ctx = TickContext {
            catalog: &self.catalog,
            config: &self.config,
            world: &mut self.world,
            out: &mut out,
        };

        let unit_ids = ctx.world.units.sorted_ids();

        // 1. Slot frames
        run_slot_frames(&mut ctx, &unit_ids);

        // 2. Fire resolution
        run_fire_resolution(&mut ctx, &unit_ids);

        // 3. Sub-entities
        ordnance::advance_projectiles(&mut ctx);
        ordnance::advance_missiles(&mut ctx);
        ordnance::advance_mines(&mut ctx);
        ordnance::advance_collectables(&mut ctx);

        // 4. Delayed actions
        ordnance::drain_delayed(&mut ctx);

        // 5. Reaping
        reap(&mut ctx);

        self.world.tick += 1;

        #[cfg(feature = "debug-validation")]
        self.assert_invariants();

        #[cfg(debug_assertions)]
        {
            let hash = self.world.state_hash();
            debug!(tick = self.world.tick, state_hash = hash, "World state hash");
        }

        out
    }

    /// Advance one tick using the world's own tick counter as the frame.
    pub fn tick(&mut self) -> TickOutput {
        let frame = self.world.tick;
        self.advance(frame)
    }

    /// Deterministic hash of the world. See [`World::state_hash`].
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        self.world.state_hash()
    }

    #[cfg(feature = "debug-validation")]
    fn assert_invariants(&self) {
        for (id, unit) in self.world.units.iter_sorted() {
            let Some(def) = self.catalog.unit(unit.def) else {
                continue;
            };
            assert!(
                unit.energy >= Fixed::ZERO && unit.energy <= def.energy,
                "unit {id} energy {} outside [0, {}]",
                unit.energy,
                def.energy
            );
            assert!(unit.health >= Fixed::ZERO, "unit {id} health below zero");
            for state in &unit.slots {
                let max = self
                    .catalog
                    .armament(state.armament)
                    .and_then(|a| a.max_ammo)
                    .unwrap_or(0);
                assert!(
                    state.ammo.unwrap_or(0) <= max,
                    "unit {id} ammo above magazine size"
                );
            }
        }
    }
}

/// Phase 1: passive regen, then every slot's frame behaviour in loadout
/// order. Energy gains are capped as they are applied.
fn run_slot_frames(ctx: &mut TickContext<'_>, unit_ids: &[EntityId]) {
    let catalog = ctx.catalog;
    for &id in unit_ids {
        let Some(mut unit) = ctx.world.units.remove(id) else {
            continue;
        };
        if let Some(def) = catalog.unit(unit.def) {
            if unit.is_operable() {
                unit.gain_energy(def.energy_regen, def);
                for slot in 0..unit.slots.len() {
                    if let Some(gain) = armament::frame(ctx, &mut unit, slot) {
                        unit.gain_energy(gain, def);
                    }
                }
            }
        }
        ctx.world.units.insert(id, unit);
    }
}

/// Phase 2: every slot with a fire intent, then the disable countdown.
fn run_fire_resolution(ctx: &mut TickContext<'_>, unit_ids: &[EntityId]) {
    for &id in unit_ids {
        let Some(mut unit) = ctx.world.units.remove(id) else {
            continue;
        };
        for slot in 0..unit.slots.len() {
            if let Some(Some(intent)) = unit.intents.get(slot).copied() {
                armament::fire(ctx, &mut unit, slot, intent);
            }
        }
        unit.disabled = unit.disabled.saturating_sub(1);
        ctx.world.units.insert(id, unit);
    }
}

/// Phase 5: remove units destroyed this tick, dropping wrecks.
fn reap(ctx: &mut TickContext<'_>) {
    let catalog = ctx.catalog;
    let wreck = ctx
        .config
        .wreck_collectable
        .as_deref()
        .and_then(|name| catalog.collectable_index(name));

    for id in ctx.world.units.sorted_ids() {
        if !ctx.world.units.get(id).is_some_and(|u| u.inoperable) {
            continue;
        }
        let Some(unit) = ctx.world.units.remove(id) else {
            continue;
        };
        ctx.out.destroyed.push(id);
        if let Some(def) = wreck {
            if let Ok(wreck_id) = ctx.world.insert_collectable(catalog, def, unit.position) {
                ctx.out.spawned.push(wreck_id);
            }
        }
        debug!(unit = id, "Reaped destroyed unit");
    }
}
