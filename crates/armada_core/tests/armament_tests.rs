//! Armament behaviour tests.
//!
//! Each test builds a small scene from the shared test catalog, sets fire
//! intents and checks what one or more ticks did to the world and what
//! they reported.

use armada_core::prelude::*;
use armada_test_utils::fixtures::{
    armaments, asteroids, empty_simulation, fixed, fixed_f, pos, spawn, units,
};

fn unit(sim: &Simulation, id: EntityId) -> &Unit {
    sim.world().unit(id).expect("unit is alive")
}

fn fired_by(out: &TickOutput, effect: EffectId, shooter: EntityId) -> usize {
    out.effects_of(effect)
        .filter(|t| t.from == Anchor::Player(shooter))
        .count()
}

// =============================================================================
// Laser: cooldown, spending, targeting
// =============================================================================

#[test]
fn test_laser_fires_on_reload_boundaries() {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    let b = spawn(&mut sim, units::CORVETTE, 1, 50, 0);
    sim.set_fire_intent(a, 0, Some(TargetRef::Unit(b))).unwrap();

    let mut fired_on = Vec::new();
    for _ in 0..9 {
        let out = sim.tick();
        if fired_by(&out, EffectId::LASER, a) > 0 {
            fired_on.push(out.frame);
        }
    }

    // Reload 4: the intent is held, but ticks 1..=3 are cooldown no-ops.
    assert_eq!(fired_on, vec![0, 4, 8]);
    assert_eq!(unit(&sim, b).health, fixed(100 - 9));
}

#[test]
fn test_back_to_back_fire_is_a_no_op() {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    let b = spawn(&mut sim, units::CORVETTE, 1, 50, 0);
    sim.set_fire_intent(a, 0, Some(TargetRef::Unit(b))).unwrap();

    sim.tick();
    let energy_after_shot = unit(&sim, a).energy;
    assert_eq!(energy_after_shot, fixed(10) - fixed_f(0.5));

    let out = sim.tick();
    assert_eq!(fired_by(&out, EffectId::LASER, a), 0);
    assert_eq!(unit(&sim, b).health, fixed(97));
    // Regen and reactor only, capped at the hull maximum.
    assert_eq!(unit(&sim, a).energy, fixed(10));
    assert_eq!(unit(&sim, a).slots[0].since_fired, 1);
}

#[test]
fn test_insufficient_energy_spends_nothing() {
    let mut sim = empty_simulation();
    let drone = spawn(&mut sim, units::DRONE, 0, 0, 0);
    let target = spawn(&mut sim, units::DRONE, 1, 20, 0);
    sim.world_mut().unit_mut(drone).unwrap().energy = fixed_f(0.4);
    sim.set_fire_intent(drone, 0, Some(TargetRef::Unit(target))).unwrap();

    let out = sim.tick();

    assert!(out.effects.is_empty());
    assert!(out.flashes.is_empty());
    assert_eq!(unit(&sim, drone).energy, fixed_f(0.4) + fixed_f(0.02));
    assert_eq!(unit(&sim, target).health, fixed(20));
    // since_fired kept counting from its equip value.
    assert_eq!(unit(&sim, drone).slots[0].since_fired, 5);
}

#[test]
fn test_laser_out_of_range_is_rejected() {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::DRONE, 0, 0, 0);
    let b = spawn(&mut sim, units::DRONE, 1, 200, 0);
    sim.set_fire_intent(a, 0, Some(TargetRef::Unit(b))).unwrap();

    let out = sim.tick();
    assert!(out.effects.is_empty());
    assert_eq!(unit(&sim, a).energy, fixed(4));
}

#[test]
fn test_laser_without_target_is_rejected() {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::DRONE, 0, 0, 0);
    spawn(&mut sim, units::DRONE, 1, 20, 0);
    sim.set_fire_intent(a, 0, None).unwrap();

    let out = sim.tick();
    assert!(out.effects.is_empty());
}

#[test]
fn test_cloaked_unit_cannot_be_targeted() {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    let b = spawn(&mut sim, units::CORVETTE, 1, 50, 0);
    sim.equip(b, 2, armaments::CLOAK).unwrap();
    sim.set_fire_intent(a, 0, Some(TargetRef::Unit(b))).unwrap();
    sim.set_fire_intent(b, 2, None).unwrap();

    // a resolves first, so tick 0's shot lands before the cloak engages.
    let out = sim.tick();
    assert_eq!(out.effects_of(EffectId::CLOAK_ON).count(), 1);
    assert!(unit(&sim, b).cloaked);
    sim.clear_fire_intent(b, 2).unwrap();

    for _ in 1..9 {
        let out = sim.tick();
        assert_eq!(fired_by(&out, EffectId::LASER, a), 0);
    }
    assert_eq!(unit(&sim, b).health, fixed(97));
}

// =============================================================================
// Ammunition
// =============================================================================

#[test]
fn test_autocannon_empties_magazine_without_underflow() {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    spawn(&mut sim, units::FRIGATE, 1, 0, 500);
    sim.set_fire_intent(a, 1, None).unwrap();

    let mut shots = 0;
    for _ in 0..60 {
        let out = sim.tick();
        shots += fired_by(&out, EffectId::CANNON_FIRE, a);
    }

    assert_eq!(shots, 20);
    assert_eq!(unit(&sim, a).slots[1].ammo, Some(0));
}

#[test]
fn test_unguided_missile_with_one_round() {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    spawn(&mut sim, units::CORVETTE, 1, 0, 500);
    sim.equip(a, 1, armaments::ROCKET_POD).unwrap();
    sim.world_mut().unit_mut(a).unwrap().slots[1].ammo = Some(1);
    sim.set_fire_intent(a, 1, None).unwrap();

    let out = sim.tick();
    assert_eq!(out.effects_of(EffectId::MISSILE_LAUNCH).count(), 1);
    let shooter = unit(&sim, a);
    assert_eq!(shooter.slots[1].since_fired, 0);
    assert_eq!(shooter.slots[1].ammo, Some(0));
    assert_eq!(sim.world().missiles().len(), 1);
    let (_, missile) = sim.world().missiles().iter_sorted().next().unwrap();
    assert_eq!(missile.parent, a);
    assert_eq!(missile.target, 0);
    assert_eq!(missile.heading, shooter.heading);
    // Launched from the hull and moved one step on the launch tick.
    assert_eq!(
        missile.position,
        shooter.position + Vec2Fixed::from_angle(shooter.heading, fixed(5))
    );
    assert_eq!(missile.frames_left, 39);

    let mut launches = vec![0];
    let mut detonations = Vec::new();
    for _ in 1..60 {
        let out = sim.tick();
        if out.effects_of(EffectId::MISSILE_LAUNCH).count() > 0 {
            launches.push(out.frame);
        }
        if out.effects_of(EffectId::MISSILE_DETONATION).count() > 0 {
            detonations.push(out.frame);
        }
    }

    assert_eq!(launches, vec![0]);
    // 40-tick lifetime, advanced on its launch tick.
    assert_eq!(detonations, vec![39]);
    assert!(sim.world().missiles().is_empty());
    assert_eq!(unit(&sim, a).slots[1].ammo, Some(0));
}

// =============================================================================
// Mining
// =============================================================================

fn miner_and_rock(asteroid: usize) -> (Simulation, EntityId, EntityId) {
    let mut sim = empty_simulation();
    let miner = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    let rock = sim.spawn_asteroid(asteroid, pos(20, 0)).unwrap();
    sim.set_fire_intent(miner, 4, Some(TargetRef::Asteroid(rock))).unwrap();
    (sim, miner, rock)
}

#[test]
fn test_mining_moves_resources_into_cargo() {
    let (mut sim, miner, rock) = miner_and_rock(asteroids::ROCK);

    let out = sim.tick();

    assert_eq!(out.effects_of(EffectId::MINING_BEAM).count(), 1);
    assert!(out.mutated.asteroids.contains(&rock));
    assert_eq!(unit(&sim, miner).cargo, fixed_f(0.5));
    let asteroid = sim.world().asteroids().get(rock).unwrap();
    assert_eq!(asteroid.resources, fixed(20) - fixed_f(0.5));
}

#[test]
fn test_mining_too_weak_is_rejected_with_advisory() {
    let (mut sim, miner, rock) = miner_and_rock(asteroids::DENSE_ORE);

    let out = sim.tick();

    assert_eq!(out.effects_of(EffectId::MINING_BEAM).count(), 0);
    assert_eq!(out.flashes.len(), 1);
    assert_eq!(out.flashes[0].unit, miner);
    assert_eq!(out.flashes[0].text, "Mining laser too weak for this asteroid");
    assert_eq!(unit(&sim, miner).energy, fixed(10));
    assert_eq!(unit(&sim, miner).cargo, Fixed::ZERO);
    assert_eq!(sim.world().asteroids().get(rock).unwrap().resources, fixed(50));
}

#[test]
fn test_mining_depleted_asteroid() {
    let (mut sim, _, rock) = miner_and_rock(asteroids::ROCK);
    sim.world_mut().asteroid_mut(rock).unwrap().resources = fixed_f(0.05);

    let out = sim.tick();
    assert_eq!(out.flashes[0].text, "Asteroid resources depleted");
    assert_eq!(sim.world().asteroids().get(rock).unwrap().resources, fixed_f(0.05));
}

#[test]
fn test_mining_with_full_hold() {
    let (mut sim, miner, _) = miner_and_rock(asteroids::ROCK);
    sim.world_mut().unit_mut(miner).unwrap().cargo = fixed(10);

    let out = sim.tick();
    assert_eq!(out.flashes[0].text, "Cargo hold full");
    assert_eq!(unit(&sim, miner).cargo, fixed(10));
}

#[test]
fn test_mining_out_of_range_is_silent() {
    let mut sim = empty_simulation();
    let miner = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    let rock = sim.spawn_asteroid(asteroids::ROCK, pos(100, 0)).unwrap();
    sim.set_fire_intent(miner, 4, Some(TargetRef::Asteroid(rock))).unwrap();

    let out = sim.tick();
    assert!(out.effects.is_empty());
    assert!(out.flashes.is_empty());
}

// =============================================================================
// Utility armaments
// =============================================================================

#[test]
fn test_tractor_pulls_then_releases_after_hold() {
    let mut sim = empty_simulation();
    let frigate = spawn(&mut sim, units::FRIGATE, 0, 0, 0);
    let target = spawn(&mut sim, units::CORVETTE, 1, 40, 0);
    sim.set_fire_intent(frigate, 3, Some(TargetRef::Unit(target))).unwrap();

    let out = sim.tick();
    assert_eq!(out.effects_of(EffectId::TRACTOR_BEAM).count(), 1);
    sim.clear_fire_intent(frigate, 3).unwrap();

    sim.tick();
    assert!(unit(&sim, target).velocity.x < Fixed::ZERO);
    assert_eq!(unit(&sim, frigate).slots[3].targets.as_ref().unwrap().len(), 1);

    for _ in 2..22 {
        sim.tick();
    }
    assert!(unit(&sim, frigate).slots[3].targets.as_ref().unwrap().is_empty());
}

#[test]
fn test_tractor_rejects_relatching_same_target() {
    let mut sim = empty_simulation();
    let frigate = spawn(&mut sim, units::FRIGATE, 0, 0, 0);
    let target = spawn(&mut sim, units::CORVETTE, 1, 40, 0);
    sim.set_fire_intent(frigate, 3, Some(TargetRef::Unit(target))).unwrap();

    let mut latches = 0;
    for _ in 0..12 {
        latches += sim.tick().effects_of(EffectId::TRACTOR_BEAM).count();
    }
    assert_eq!(latches, 1);
}

#[test]
fn test_cloak_disengages_when_energy_runs_out() {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    sim.equip(a, 2, armaments::CLOAK).unwrap();
    sim.set_fire_intent(a, 2, None).unwrap();
    sim.tick();
    sim.clear_fire_intent(a, 2).unwrap();
    sim.world_mut().unit_mut(a).unwrap().energy = fixed_f(0.5);

    let mut flash = None;
    for _ in 0..6 {
        let out = sim.tick();
        if let Some(f) = out.flashes.first() {
            assert_eq!(out.effects_of(EffectId::CLOAK_OFF).count(), 1);
            flash = Some(f.text.clone());
            break;
        }
    }

    assert_eq!(flash.as_deref(), Some("Cloak disengaged: energy depleted"));
    assert!(!unit(&sim, a).cloaked);
    assert!(!unit(&sim, a).slots[2].is_active());
}

#[test]
fn test_cloak_disrupted_by_disable() {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    sim.equip(a, 2, armaments::CLOAK).unwrap();
    sim.set_fire_intent(a, 2, None).unwrap();
    sim.tick();
    sim.clear_fire_intent(a, 2).unwrap();
    sim.world_mut().unit_mut(a).unwrap().disabled = 5;

    let out = sim.tick();
    assert_eq!(out.flashes[0].text, "Cloak disrupted");
    assert!(!unit(&sim, a).cloaked);
}

#[test]
fn test_held_cloak_intent_waits_out_the_reload() {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    sim.equip(a, 2, armaments::CLOAK).unwrap();
    sim.set_fire_intent(a, 2, None).unwrap();

    let mut on = Vec::new();
    let mut off = Vec::new();
    for _ in 0..22 {
        let out = sim.tick();
        if out.effects_of(EffectId::CLOAK_ON).count() > 0 {
            on.push(out.frame);
        }
        if out.effects_of(EffectId::CLOAK_OFF).count() > 0 {
            off.push(out.frame);
        }
        if out.frame < 10 {
            assert!(unit(&sim, a).cloaked, "cloak dropped at frame {}", out.frame);
        }
    }

    // Reload 10 gates both directions of the toggle.
    assert_eq!(on, vec![0, 20]);
    assert_eq!(off, vec![10]);
}

#[test]
fn test_disabled_unit_cannot_toggle_cloak() {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    sim.equip(a, 2, armaments::CLOAK).unwrap();
    sim.world_mut().unit_mut(a).unwrap().disabled = 3;
    sim.set_fire_intent(a, 2, None).unwrap();

    let out = sim.tick();
    assert_eq!(out.effects_of(EffectId::CLOAK_ON).count(), 0);
    assert!(!unit(&sim, a).cloaked);
    assert_eq!(unit(&sim, a).energy, fixed(10));
}

#[test]
fn test_cloak_toggle_off_is_free() {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    sim.equip(a, 2, armaments::CLOAK).unwrap();
    sim.set_fire_intent(a, 2, None).unwrap();

    for _ in 0..10 {
        sim.tick();
    }
    assert!(unit(&sim, a).cloaked);
    let before = unit(&sim, a).energy;

    let out = sim.tick();
    assert_eq!(out.frame, 10);
    assert_eq!(out.effects_of(EffectId::CLOAK_OFF).count(), 1);
    assert!(!unit(&sim, a).cloaked);
    assert_eq!(unit(&sim, a).slots[2].since_fired, 0);
    // Regen, then one tick of drain; no toggle cost.
    assert_eq!(unit(&sim, a).energy, before + fixed_f(0.05) - fixed_f(0.2));
}

#[test]
fn test_booster_pushes_for_its_duration() {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    sim.equip(a, 2, armaments::BOOSTER).unwrap();
    sim.set_fire_intent(a, 2, None).unwrap();

    let out = sim.tick();
    assert_eq!(out.effects_of(EffectId::BOOSTER).count(), 1);
    sim.clear_fire_intent(a, 2).unwrap();

    for _ in 0..8 {
        sim.tick();
    }
    let booster = unit(&sim, a);
    // Five pushes of impulse 4 on a mass-10 hull.
    assert!(booster.velocity.x > fixed_f(1.99) && booster.velocity.x < fixed_f(2.01));
    assert_eq!(booster.slots[2].ammo, Some(1));
    assert!(!booster.slots[2].is_active());
}

#[test]
fn test_booster_rejects_while_burning() {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    sim.equip(a, 2, armaments::BOOSTER).unwrap();
    sim.set_fire_intent(a, 2, None).unwrap();

    let mut ignitions = Vec::new();
    for _ in 0..8 {
        let out = sim.tick();
        if out.effects_of(EffectId::BOOSTER).count() > 0 {
            ignitions.push(out.frame);
        }
    }
    // Second charge lights once the first countdown reaches zero.
    assert_eq!(ignitions, vec![0, 5]);
    assert_eq!(unit(&sim, a).slots[2].ammo, Some(0));
}

#[test]
fn test_energy_transfer_to_ally() {
    let mut sim = empty_simulation();
    let giver = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    let ally = spawn(&mut sim, units::CORVETTE, 0, 30, 0);
    sim.equip(giver, 2, armaments::ENERGY_BEAM).unwrap();
    sim.world_mut().unit_mut(ally).unwrap().energy = fixed(5);
    sim.set_fire_intent(giver, 2, Some(TargetRef::Unit(ally))).unwrap();

    let out = sim.tick();

    assert_eq!(out.effects_of(EffectId::ENERGY_TRANSFER).count(), 1);
    assert_eq!(unit(&sim, giver).energy, fixed(10) - fixed_f(0.5) - fixed(2));
    assert_eq!(
        unit(&sim, ally).energy,
        fixed(5) + fixed_f(0.05) + fixed_f(0.5) + fixed(2)
    );
}

#[test]
fn test_energy_transfer_rejects_enemy() {
    let mut sim = empty_simulation();
    let giver = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    let enemy = spawn(&mut sim, units::CORVETTE, 1, 30, 0);
    sim.equip(giver, 2, armaments::ENERGY_BEAM).unwrap();
    sim.set_fire_intent(giver, 2, Some(TargetRef::Unit(enemy))).unwrap();

    let out = sim.tick();
    assert_eq!(out.effects_of(EffectId::ENERGY_TRANSFER).count(), 0);
    assert_eq!(unit(&sim, giver).energy, fixed(10));
}

#[test]
fn test_hull_repair_heals_for_energy() {
    let mut sim = empty_simulation();
    let frigate = spawn(&mut sim, units::FRIGATE, 0, 0, 0);
    sim.world_mut().unit_mut(frigate).unwrap().health = fixed(100);

    sim.tick();

    let repaired = unit(&sim, frigate);
    assert_eq!(repaired.health, fixed(100) + fixed_f(0.5));
    assert_eq!(repaired.energy, fixed(25) - fixed_f(0.5) * fixed_f(0.5));
}

#[test]
fn test_passive_armament_cannot_fire() {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    sim.set_fire_intent(a, 2, None).unwrap();

    let out = sim.tick();
    assert!(out.effects.is_empty());
    assert_eq!(unit(&sim, a).energy, fixed(10));
}

// =============================================================================
// Equipping
// =============================================================================

#[test]
fn test_equip_rejects_wrong_slot_kind() {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::CORVETTE, 0, 0, 0);

    let err = sim.equip(a, 0, armaments::CLOAK).unwrap_err();
    assert!(matches!(err, GameError::IncompatibleSlot { .. }));
    assert!(matches!(
        sim.equip(a, 9, armaments::CLOAK),
        Err(GameError::SlotOutOfRange { slot: 9, .. })
    ));
}

#[test]
fn test_equip_resets_slot_and_intent() {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    sim.set_fire_intent(a, 1, None).unwrap();
    sim.tick();
    assert_eq!(unit(&sim, a).slots[1].ammo, Some(19));

    sim.equip(a, 1, armaments::AUTOCANNON).unwrap();
    let fresh = unit(&sim, a);
    assert_eq!(fresh.slots[1].ammo, Some(20));
    assert_eq!(fresh.slots[1].since_fired, 2);
    assert_eq!(fresh.intents[1], None);
}

#[test]
fn test_equip_empty_sentinel_disarms_slot() {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    let b = spawn(&mut sim, units::CORVETTE, 1, 50, 0);
    sim.equip(a, 0, SlotKind::Normal.empty_armament()).unwrap();
    sim.set_fire_intent(a, 0, Some(TargetRef::Unit(b))).unwrap();

    let out = sim.tick();
    assert!(out.effects.is_empty());
    assert!(out.flashes.is_empty());
    assert_eq!(unit(&sim, a).slots[0].since_fired, 0);
    assert_eq!(unit(&sim, a).energy, fixed(10));
    assert_eq!(unit(&sim, b).health, fixed(100));
}

// =============================================================================
// Idle ticks
// =============================================================================

#[test]
fn test_idle_tick_only_advances_counters_and_regen() {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::DRONE, 0, 10, 20);
    sim.world_mut().unit_mut(a).unwrap().energy = fixed(1);
    let before = unit(&sim, a).clone();

    let out = sim.tick();

    assert!(out.effects.is_empty());
    assert!(out.mutated.is_empty());
    let after = unit(&sim, a);
    assert_eq!(after.position, before.position);
    assert_eq!(after.heading, before.heading);
    assert_eq!(after.velocity, before.velocity);
    assert_eq!(after.health, before.health);
    assert_eq!(after.energy, fixed(1) + fixed_f(0.02));
    assert_eq!(after.slots[0].since_fired, before.slots[0].since_fired + 1);
    assert_eq!(after.slots[0].ammo, before.slots[0].ammo);
}
