//! Armament dispatch.
//!
//! One closed [`ArmamentBehavior`] enum, three entry points:
//!
//! - [`equip`] builds fresh slot state when an armament is mounted.
//! - [`frame`] runs every tick for every non-empty slot, whether or not it
//!   fires. It may return an energy gain, which the engine adds to the
//!   unit's pool capped at the hull maximum.
//! - [`fire`] runs when the unit has a fire intent on the slot. It checks
//!   every precondition itself; a failed check changes nothing and emits
//!   nothing. A successful fire deducts its resource exactly once and
//!   resets the slot's `since_fired` to zero.
//!
//! The unit being processed is taken out of its registry for the duration
//! of the call, so everything in `ctx.world.units` is some other unit.

use tracing::{debug, trace};

use crate::combat::TickContext;
use crate::components::{
    Activation, EntityId, FireIntent, Mine, Missile, Projectile, SlotState, TargetRef,
    TrackedTarget, Unit,
};
use crate::data::{ArmamentBehavior, ArmamentDef, Usage};
use crate::delayed::DelayedEffect;
use crate::effects::{Anchor, EffectId};
use crate::math::{circles_overlap, Fixed, Vec2Fixed};
use crate::simulation::World;

/// Why a fire request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The unit has been destroyed this tick.
    Inoperable,
    /// The unit is disabled.
    Disabled,
    /// The slot is still reloading.
    Cooldown,
    /// Not enough energy for the cost.
    InsufficientEnergy,
    /// Magazine empty.
    OutOfAmmo,
    /// No target given, or the target is the wrong kind.
    NoTarget,
    /// The target is gone, destroyed, cloaked or on the wrong side.
    InvalidTarget,
    /// The target is beyond reach.
    OutOfRange,
    /// The effect is already running.
    AlreadyActive,
    /// The target is already latched.
    AlreadyTracked,
    /// Every tracking channel is in use.
    TargetsFull,
    /// Mining yield would fall under the minimum.
    BelowMinimumYield,
    /// Empty and passive slots cannot be fired.
    Passive,
    /// A definition the armament references is missing.
    Misconfigured,
}

/// Which side a targeted armament accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Relation {
    Hostile,
    Friendly,
    Any,
}

/// One fire request being resolved.
struct Firing<'d> {
    slot: usize,
    armament: usize,
    def: &'d ArmamentDef,
    intent: FireIntent,
}

/// Fresh slot state for a newly mounted armament.
///
/// The slot starts reloaded and, for ammunition armaments, with a full
/// magazine.
#[must_use]
pub fn equip(armament: usize, def: &ArmamentDef) -> SlotState {
    let mut state = SlotState::bare(armament);
    state.since_fired = def.reload;
    if def.usage == Usage::Ammo {
        state.ammo = Some(def.max_ammo.unwrap_or(0));
    }
    match def.behavior {
        ArmamentBehavior::Cloak { .. } => state.active = Some(Activation::Toggle(false)),
        ArmamentBehavior::Booster { .. } => state.active = Some(Activation::Countdown(0)),
        ArmamentBehavior::Tractor { .. } => state.targets = Some(Vec::new()),
        _ => {}
    }
    state
}

/// Check the shared firing preconditions without changing anything.
///
/// # Errors
///
/// Returns the first unmet precondition.
pub fn ready(unit: &Unit, slot: usize, def: &ArmamentDef) -> Result<(), Rejection> {
    let state = cooled(unit, slot, def)?;
    match def.usage {
        Usage::Energy if unit.energy < def.cost => Err(Rejection::InsufficientEnergy),
        Usage::Ammo if state.ammo.unwrap_or(0) == 0 => Err(Rejection::OutOfAmmo),
        _ => Ok(()),
    }
}

/// The checks of [`ready`] that come before the fire cost.
fn cooled<'u>(
    unit: &'u Unit,
    slot: usize,
    def: &ArmamentDef,
) -> Result<&'u SlotState, Rejection> {
    if !unit.is_operable() {
        return Err(Rejection::Inoperable);
    }
    if unit.is_disabled() {
        return Err(Rejection::Disabled);
    }
    let state = unit.slots.get(slot).ok_or(Rejection::Misconfigured)?;
    if state.since_fired < def.reload {
        return Err(Rejection::Cooldown);
    }
    Ok(state)
}

/// Deduct the fire cost and reset the cooldown.
fn spend(ctx: &mut TickContext<'_>, unit: &mut Unit, slot: usize, def: &ArmamentDef) {
    let Some(state) = unit.slots.get_mut(slot) else {
        return;
    };
    match def.usage {
        Usage::Energy => unit.energy -= def.cost,
        Usage::Ammo => {
            if let Some(ammo) = state.ammo.as_mut() {
                *ammo = ammo.saturating_sub(1);
            }
        }
        Usage::Empty => {}
    }
    state.since_fired = 0;
    ctx.out.mutated.units.insert(unit.id);
}

/// Resolve a unit target for a targeted armament.
fn unit_target(
    world: &World,
    unit: &Unit,
    intent: FireIntent,
    range: Option<Fixed>,
    relation: Relation,
) -> Result<EntityId, Rejection> {
    let Some(TargetRef::Unit(id)) = intent.target else {
        return Err(Rejection::NoTarget);
    };
    if id == unit.id {
        return Err(Rejection::InvalidTarget);
    }
    let target = world.units.get(id).ok_or(Rejection::InvalidTarget)?;
    if !target.is_operable() {
        return Err(Rejection::InvalidTarget);
    }
    let accepted = match relation {
        Relation::Hostile => target.team != unit.team && !target.cloaked,
        Relation::Friendly => target.team == unit.team,
        Relation::Any => target.team == unit.team || !target.cloaked,
    };
    if !accepted {
        return Err(Rejection::InvalidTarget);
    }
    if let Some(range) = range {
        if !circles_overlap(unit.position, range, target.position, target.radius) {
            return Err(Rejection::OutOfRange);
        }
    }
    Ok(id)
}

/// Run the per-tick behaviour of one slot.
///
/// Returns energy produced this tick, if any.
pub(crate) fn frame(ctx: &mut TickContext<'_>, unit: &mut Unit, slot: usize) -> Option<Fixed> {
    let catalog = ctx.catalog;
    let armament = unit.slots.get(slot)?.armament;
    let def = catalog.armament(armament)?;
    if def.is_empty() {
        return None;
    }
    if let Some(state) = unit.slots.get_mut(slot) {
        state.since_fired = state.since_fired.saturating_add(1);
    }

    match &def.behavior {
        ArmamentBehavior::Reactor { output } => Some(*output),
        ArmamentBehavior::Cloak { drain } => {
            cloak_frame(ctx, unit, slot, *drain);
            None
        }
        ArmamentBehavior::HullRepair {
            rate,
            energy_per_point,
        } => {
            repair_frame(ctx, unit, *rate, *energy_per_point);
            None
        }
        ArmamentBehavior::Booster { impulse, .. } => {
            booster_frame(ctx, unit, slot, *impulse);
            None
        }
        ArmamentBehavior::Tractor {
            range,
            strength,
            hold,
            drain,
            ..
        } => {
            tractor_frame(ctx, unit, slot, (*range, *strength, *hold, *drain));
            None
        }
        _ => None,
    }
}

fn cloak_frame(ctx: &mut TickContext<'_>, unit: &mut Unit, slot: usize, drain: Fixed) {
    if !unit.slots.get(slot).is_some_and(SlotState::is_active) {
        return;
    }
    if unit.is_operable() && !unit.is_disabled() && unit.energy >= drain {
        unit.energy -= drain;
        return;
    }

    if let Some(state) = unit.slots.get_mut(slot) {
        state.active = Some(Activation::Toggle(false));
    }
    unit.cloaked = false;
    let text = if unit.is_disabled() {
        "Cloak disrupted"
    } else {
        "Cloak disengaged: energy depleted"
    };
    debug!(unit = unit.id, slot, "{text}");
    ctx.out.flash(unit.id, text);
    ctx.out.trigger(EffectId::CLOAK_OFF, Anchor::Player(unit.id), None);
    ctx.out.mutated.units.insert(unit.id);
}

fn repair_frame(ctx: &mut TickContext<'_>, unit: &mut Unit, rate: Fixed, energy_per_point: Fixed) {
    if !unit.is_operable() || unit.is_disabled() {
        return;
    }
    let Some(unit_def) = ctx.catalog.unit(unit.def) else {
        return;
    };
    let missing = unit_def.health - unit.health;
    if missing <= Fixed::ZERO {
        return;
    }
    let heal = rate.min(missing);
    let cost = heal * energy_per_point;
    if unit.energy < cost {
        return;
    }
    unit.energy -= cost;
    unit.heal(heal, unit_def);
    ctx.out.mutated.units.insert(unit.id);
}

fn booster_frame(ctx: &mut TickContext<'_>, unit: &mut Unit, slot: usize, impulse: Fixed) {
    let Some(unit_def) = ctx.catalog.unit(unit.def) else {
        return;
    };
    let Some(state) = unit.slots.get_mut(slot) else {
        return;
    };
    let Some(Activation::Countdown(left)) = state.active else {
        return;
    };
    if left == 0 {
        return;
    }
    state.active = Some(Activation::Countdown(left - 1));
    let thrust = Vec2Fixed::from_angle(unit.heading, impulse);
    unit.push(thrust, unit_def);
    ctx.out.mutated.units.insert(unit.id);
}

fn tractor_frame(
    ctx: &mut TickContext<'_>,
    unit: &mut Unit,
    slot: usize,
    (range, strength, hold, drain): (Fixed, Fixed, u32, Fixed),
) {
    let Some(targets) = unit.slots.get_mut(slot).and_then(|s| s.targets.take()) else {
        return;
    };
    let had = targets.len();
    let mut kept = Vec::with_capacity(had);

    for mut tracked in targets {
        tracked.time = tracked.time.saturating_add(1);
        if !unit.is_operable() || unit.is_disabled() || tracked.time > hold || unit.energy < drain {
            continue;
        }
        let Some(target) = ctx.world.units.get(tracked.id) else {
            continue;
        };
        if !target.is_operable()
            || !circles_overlap(unit.position, range, target.position, target.radius)
        {
            continue;
        }
        let pull = (unit.position - target.position).normalize().scale(strength);
        unit.energy -= drain;
        ctx.push_unit(tracked.id, pull);
        kept.push(tracked);
    }

    if had > 0 {
        ctx.out.mutated.units.insert(unit.id);
    }
    if let Some(state) = unit.slots.get_mut(slot) {
        state.targets = Some(kept);
    }
}

/// Resolve a fire intent on one slot.
pub(crate) fn fire(ctx: &mut TickContext<'_>, unit: &mut Unit, slot: usize, intent: FireIntent) {
    let catalog = ctx.catalog;
    let Some(armament) = unit.slots.get(slot).map(|s| s.armament) else {
        return;
    };
    let Some(def) = catalog.armament(armament) else {
        return;
    };

    let shot = Firing {
        slot,
        armament,
        def,
        intent,
    };
    let outcome = match &def.behavior {
        ArmamentBehavior::Cannon {
            damage,
            speed,
            radius,
            lifetime,
            ..
        } => fire_cannon(ctx, unit, &shot, *damage, *speed, *radius, *lifetime),
        ArmamentBehavior::Laser { damage, range } => fire_laser(ctx, unit, &shot, *damage, *range),
        ArmamentBehavior::MissileLauncher { missile } => fire_missile(ctx, unit, &shot, *missile),
        ArmamentBehavior::MineLayer { mine } => lay_mine(ctx, unit, &shot, *mine),
        ArmamentBehavior::MiningLaser { output, range } => {
            fire_mining_laser(ctx, unit, &shot, *output, *range)
        }
        ArmamentBehavior::Tractor {
            range, max_targets, ..
        } => fire_tractor(ctx, unit, &shot, *range, *max_targets),
        ArmamentBehavior::Cloak { .. } => toggle_cloak(ctx, unit, &shot),
        ArmamentBehavior::Booster { duration, .. } => fire_booster(ctx, unit, &shot, *duration),
        ArmamentBehavior::EnergyTransfer { amount, range } => {
            transfer_energy(ctx, unit, &shot, *amount, *range)
        }
        ArmamentBehavior::PulseEmitter {
            delay,
            radius,
            damage,
        } => fire_pulse(ctx, unit, &shot, *delay, *radius, *damage),
        ArmamentBehavior::Empty
        | ArmamentBehavior::HullRepair { .. }
        | ArmamentBehavior::Reactor { .. } => Err(Rejection::Passive),
    };

    if let Err(reason) = outcome {
        trace!(
            unit = unit.id,
            slot,
            armament = %def.name,
            behavior = def.behavior.tag(),
            ?reason,
            "Fire rejected"
        );
    }
}

fn fire_cannon(
    ctx: &mut TickContext<'_>,
    unit: &mut Unit,
    shot: &Firing<'_>,
    damage: Fixed,
    speed: Fixed,
    radius: Fixed,
    lifetime: u32,
) -> Result<(), Rejection> {
    ready(unit, shot.slot, shot.def)?;
    spend(ctx, unit, shot.slot, shot.def);

    let id = ctx.allocate_id();
    ctx.world.projectiles.insert(
        id,
        Projectile {
            id,
            parent: unit.id,
            team: unit.team,
            def: shot.armament,
            position: unit.position,
            heading: unit.heading,
            speed,
            radius,
            damage,
            frames_left: lifetime,
        },
    );
    ctx.out.spawned.push(id);
    ctx.out.trigger(
        EffectId::CANNON_FIRE,
        Anchor::Player(unit.id),
        Some(Anchor::Projectile(id)),
    );
    Ok(())
}

fn fire_laser(
    ctx: &mut TickContext<'_>,
    unit: &mut Unit,
    shot: &Firing<'_>,
    damage: Fixed,
    range: Fixed,
) -> Result<(), Rejection> {
    ready(unit, shot.slot, shot.def)?;
    let target = unit_target(ctx.world, unit, shot.intent, Some(range), Relation::Hostile)?;
    spend(ctx, unit, shot.slot, shot.def);

    ctx.damage_unit(target, damage, unit.id);
    ctx.out.trigger(
        EffectId::LASER,
        Anchor::Player(unit.id),
        Some(Anchor::Player(target)),
    );
    Ok(())
}

fn fire_missile(
    ctx: &mut TickContext<'_>,
    unit: &mut Unit,
    shot: &Firing<'_>,
    missile: usize,
) -> Result<(), Rejection> {
    let catalog = ctx.catalog;
    let missile_def = catalog.missile(missile).ok_or(Rejection::Misconfigured)?;
    ready(unit, shot.slot, shot.def)?;
    let target = if missile_def.guided {
        unit_target(ctx.world, unit, shot.intent, None, Relation::Hostile)?
    } else {
        0
    };
    spend(ctx, unit, shot.slot, shot.def);

    let id = ctx.allocate_id();
    ctx.world.missiles.insert(
        id,
        Missile {
            id,
            parent: unit.id,
            team: unit.team,
            def: missile,
            position: unit.position,
            heading: unit.heading,
            speed: missile_def.speed,
            radius: missile_def.radius,
            target,
            frames_left: missile_def.lifetime,
        },
    );
    ctx.out.spawned.push(id);
    ctx.out.trigger(
        EffectId::MISSILE_LAUNCH,
        Anchor::Player(unit.id),
        Some(Anchor::Projectile(id)),
    );
    Ok(())
}

fn lay_mine(
    ctx: &mut TickContext<'_>,
    unit: &mut Unit,
    shot: &Firing<'_>,
    mine: usize,
) -> Result<(), Rejection> {
    let catalog = ctx.catalog;
    let mine_def = catalog.mine(mine).ok_or(Rejection::Misconfigured)?;
    ready(unit, shot.slot, shot.def)?;
    spend(ctx, unit, shot.slot, shot.def);

    let id = ctx.allocate_id();
    ctx.world.mines.insert(
        id,
        Mine {
            id,
            parent: unit.id,
            team: unit.team,
            def: mine,
            position: unit.position,
            heading: unit.heading,
            radius: mine_def.radius,
            deploying: mine_def.deploy_ticks,
            left: mine_def.lifetime,
        },
    );
    ctx.out.spawned.push(id);
    ctx.out.mutated.mines.insert(id);
    ctx.out.trigger(EffectId::MINE_DEPLOY, Anchor::Projectile(id), None);
    Ok(())
}

fn fire_mining_laser(
    ctx: &mut TickContext<'_>,
    unit: &mut Unit,
    shot: &Firing<'_>,
    output: Fixed,
    range: Fixed,
) -> Result<(), Rejection> {
    ready(unit, shot.slot, shot.def)?;
    let Some(TargetRef::Asteroid(asteroid_id)) = shot.intent.target else {
        return Err(Rejection::NoTarget);
    };
    let asteroid = ctx
        .world
        .asteroids
        .get(asteroid_id)
        .ok_or(Rejection::InvalidTarget)?;
    if !circles_overlap(unit.position, range, asteroid.position, asteroid.radius) {
        return Err(Rejection::OutOfRange);
    }
    let unit_def = ctx.catalog.unit(unit.def).ok_or(Rejection::Misconfigured)?;

    let free = unit.cargo_free(unit_def);
    let amount = output
        .checked_div(asteroid.difficulty)
        .unwrap_or(Fixed::ZERO)
        .min(asteroid.resources)
        .min(free);
    let minimum = ctx.config.min_mining_yield;
    if amount < minimum {
        let text = if asteroid.resources < minimum {
            "Asteroid resources depleted"
        } else if free < minimum {
            "Cargo hold full"
        } else {
            "Mining laser too weak for this asteroid"
        };
        debug!(unit = unit.id, asteroid = asteroid_id, %amount, "{text}");
        ctx.out.flash(unit.id, text);
        return Err(Rejection::BelowMinimumYield);
    }

    spend(ctx, unit, shot.slot, shot.def);
    if let Some(asteroid) = ctx.world.asteroids.get_mut(asteroid_id) {
        asteroid.resources -= amount;
    }
    unit.cargo += amount;
    ctx.out.mutated.asteroids.insert(asteroid_id);
    ctx.out.trigger(
        EffectId::MINING_BEAM,
        Anchor::Player(unit.id),
        Some(Anchor::Asteroid(asteroid_id)),
    );
    Ok(())
}

fn fire_tractor(
    ctx: &mut TickContext<'_>,
    unit: &mut Unit,
    shot: &Firing<'_>,
    range: Fixed,
    max_targets: usize,
) -> Result<(), Rejection> {
    ready(unit, shot.slot, shot.def)?;
    let target = unit_target(ctx.world, unit, shot.intent, Some(range), Relation::Any)?;
    let tracked = unit
        .slots
        .get(shot.slot)
        .and_then(|s| s.targets.as_deref())
        .unwrap_or_default();
    if tracked.iter().any(|t| t.id == target) {
        return Err(Rejection::AlreadyTracked);
    }
    if tracked.len() >= max_targets {
        return Err(Rejection::TargetsFull);
    }
    spend(ctx, unit, shot.slot, shot.def);

    if let Some(state) = unit.slots.get_mut(shot.slot) {
        state
            .targets
            .get_or_insert_with(Vec::new)
            .push(TrackedTarget { id: target, time: 0 });
    }
    ctx.out.trigger(
        EffectId::TRACTOR_BEAM,
        Anchor::Player(unit.id),
        Some(Anchor::Player(target)),
    );
    Ok(())
}

fn toggle_cloak(
    ctx: &mut TickContext<'_>,
    unit: &mut Unit,
    shot: &Firing<'_>,
) -> Result<(), Rejection> {
    let active = unit.slots.get(shot.slot).is_some_and(SlotState::is_active);
    if active {
        // Switching off waits out the reload but costs nothing.
        cooled(unit, shot.slot, shot.def)?;
        if let Some(state) = unit.slots.get_mut(shot.slot) {
            state.active = Some(Activation::Toggle(false));
            state.since_fired = 0;
        }
        unit.cloaked = false;
        ctx.out.mutated.units.insert(unit.id);
        ctx.out.trigger(EffectId::CLOAK_OFF, Anchor::Player(unit.id), None);
        return Ok(());
    }

    ready(unit, shot.slot, shot.def)?;
    spend(ctx, unit, shot.slot, shot.def);
    if let Some(state) = unit.slots.get_mut(shot.slot) {
        state.active = Some(Activation::Toggle(true));
    }
    unit.cloaked = true;
    ctx.out.trigger(EffectId::CLOAK_ON, Anchor::Player(unit.id), None);
    Ok(())
}

fn fire_booster(
    ctx: &mut TickContext<'_>,
    unit: &mut Unit,
    shot: &Firing<'_>,
    duration: u32,
) -> Result<(), Rejection> {
    ready(unit, shot.slot, shot.def)?;
    if unit.slots.get(shot.slot).is_some_and(SlotState::is_active) {
        return Err(Rejection::AlreadyActive);
    }
    spend(ctx, unit, shot.slot, shot.def);
    if let Some(state) = unit.slots.get_mut(shot.slot) {
        state.active = Some(Activation::Countdown(duration));
    }
    let (position, heading, speed) = unit.pose();
    ctx.out.trigger(
        EffectId::BOOSTER,
        Anchor::Player(unit.id),
        Some(Anchor::Absolute {
            position,
            heading,
            speed,
        }),
    );
    Ok(())
}

fn transfer_energy(
    ctx: &mut TickContext<'_>,
    unit: &mut Unit,
    shot: &Firing<'_>,
    amount: Fixed,
    range: Fixed,
) -> Result<(), Rejection> {
    ready(unit, shot.slot, shot.def)?;
    let target = unit_target(ctx.world, unit, shot.intent, Some(range), Relation::Friendly)?;
    let cost = if shot.def.usage == Usage::Energy {
        shot.def.cost
    } else {
        Fixed::ZERO
    };
    if unit.energy < cost + amount {
        return Err(Rejection::InsufficientEnergy);
    }
    spend(ctx, unit, shot.slot, shot.def);

    unit.energy -= amount;
    let catalog = ctx.catalog;
    if let Some(receiver) = ctx.world.units.get_mut(target) {
        if let Some(receiver_def) = catalog.unit(receiver.def) {
            receiver.gain_energy(amount, receiver_def);
        }
    }
    ctx.out.mutated.units.insert(target);
    ctx.out.trigger(
        EffectId::ENERGY_TRANSFER,
        Anchor::Player(unit.id),
        Some(Anchor::Player(target)),
    );
    Ok(())
}

fn fire_pulse(
    ctx: &mut TickContext<'_>,
    unit: &mut Unit,
    shot: &Firing<'_>,
    delay: u32,
    radius: Fixed,
    damage: Fixed,
) -> Result<(), Rejection> {
    ready(unit, shot.slot, shot.def)?;
    spend(ctx, unit, shot.slot, shot.def);

    ctx.world.delayed.push(
        delay,
        DelayedEffect::Pulse {
            origin: unit.position,
            heading: unit.heading,
            radius,
            damage,
            source: unit.id,
            team: unit.team,
        },
    );
    ctx.out.trigger(
        EffectId::PULSE_CHARGE,
        Anchor::at(unit.position, unit.heading),
        None,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SlotKind, Targeting};

    fn def(usage: Usage, cost: i32, reload: u32, behavior: ArmamentBehavior) -> ArmamentDef {
        ArmamentDef {
            name: "Test".to_string(),
            slot: SlotKind::Normal,
            usage,
            targeted: Targeting::Untargeted,
            cost: Fixed::from_num(cost),
            tier: 1,
            price: 0,
            max_ammo: (usage == Usage::Ammo).then_some(3),
            reload,
            behavior,
        }
    }

    fn unit_with(slot: SlotState, energy: i32) -> Unit {
        Unit {
            id: 1,
            def: 0,
            team: 0,
            position: Vec2Fixed::ZERO,
            heading: Fixed::ZERO,
            speed: Fixed::ZERO,
            velocity: Vec2Fixed::ZERO,
            radius: Fixed::ONE,
            health: Fixed::from_num(10),
            energy: Fixed::from_num(energy),
            cargo: Fixed::ZERO,
            disabled: 0,
            cloaked: false,
            inoperable: false,
            slots: vec![slot],
            intents: vec![None],
        }
    }

    #[test]
    fn test_equip_starts_reloaded_with_full_magazine() {
        let launcher = def(Usage::Ammo, 0, 12, ArmamentBehavior::MissileLauncher { missile: 0 });
        let state = equip(7, &launcher);
        assert_eq!(state.armament, 7);
        assert_eq!(state.since_fired, 12);
        assert_eq!(state.ammo, Some(3));
        assert!(state.targets.is_none());
    }

    #[test]
    fn test_equip_initialises_behaviour_state() {
        let cloak = def(Usage::Energy, 1, 0, ArmamentBehavior::Cloak { drain: Fixed::ONE });
        assert_eq!(equip(5, &cloak).active, Some(Activation::Toggle(false)));

        let tractor = def(
            Usage::Energy,
            1,
            0,
            ArmamentBehavior::Tractor {
                range: Fixed::ONE,
                strength: Fixed::ONE,
                max_targets: 2,
                hold: 10,
                drain: Fixed::ONE,
            },
        );
        assert_eq!(equip(6, &tractor).targets, Some(Vec::new()));
    }

    #[test]
    fn test_ready_checks_each_precondition() {
        let laser = def(
            Usage::Energy,
            2,
            5,
            ArmamentBehavior::Laser {
                damage: Fixed::ONE,
                range: Fixed::ONE,
            },
        );
        let mut unit = unit_with(equip(5, &laser), 5);
        assert_eq!(ready(&unit, 0, &laser), Ok(()));

        unit.slots[0].since_fired = 4;
        assert_eq!(ready(&unit, 0, &laser), Err(Rejection::Cooldown));
        unit.slots[0].since_fired = 5;

        unit.energy = Fixed::ONE;
        assert_eq!(ready(&unit, 0, &laser), Err(Rejection::InsufficientEnergy));
        unit.energy = Fixed::from_num(5);

        unit.disabled = 1;
        assert_eq!(ready(&unit, 0, &laser), Err(Rejection::Disabled));
        unit.disabled = 0;

        unit.inoperable = true;
        assert_eq!(ready(&unit, 0, &laser), Err(Rejection::Inoperable));
    }

    #[test]
    fn test_ready_rejects_empty_magazine() {
        let launcher = def(Usage::Ammo, 0, 0, ArmamentBehavior::MissileLauncher { missile: 0 });
        let mut state = equip(5, &launcher);
        state.ammo = Some(0);
        let unit = unit_with(state, 0);
        assert_eq!(ready(&unit, 0, &launcher), Err(Rejection::OutOfAmmo));
    }
}
