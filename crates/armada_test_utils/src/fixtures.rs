//! Test fixtures and helpers.
//!
//! A catalog covering every armament behaviour, with stable indices, and
//! pre-built scenarios for consistent testing.

use armada_core::components::{EntityId, TargetRef};
use armada_core::config::EngineConfig;
use armada_core::data::{
    ArmamentBehavior, ArmamentDef, AsteroidDef, Burst, Catalog, CatalogData, CollectableDef,
    MineDef, MineEffect, MissileDef, MissileEffect, Reward, SlotKind, Targeting, UnitDef, Usage,
};
use armada_core::math::Vec2Fixed;
use armada_core::simulation::Simulation;
use fixed::types::I32F32;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Position helper.
#[must_use]
pub fn pos(x: i32, y: i32) -> Vec2Fixed {
    Vec2Fixed::new(fixed(x), fixed(y))
}

/// Unit definition indices in [`test_catalog`].
pub mod units {
    /// Balanced hull with a laser, autocannon, reactor, mine rack and
    /// mining laser.
    pub const CORVETTE: usize = 0;
    /// Heavy hull with seekers, a pulse emitter, repair and tractor.
    pub const FRIGATE: usize = 1;
    /// Small single-slot hull.
    pub const DRONE: usize = 2;
}

/// Armament indices in [`test_catalog`].
pub mod armaments {
    /// Energy laser, 3 damage, reload 4.
    pub const PULSE_LASER: usize = 5;
    /// Ammo cannon, 4 damage, 20 rounds.
    pub const AUTOCANNON: usize = 6;
    /// Energy cannon whose shells burst at end of life.
    pub const FLAK_CANNON: usize = 7;
    /// Unguided rocket launcher, 4 rounds.
    pub const ROCKET_POD: usize = 8;
    /// Guided missile launcher, 4 rounds.
    pub const SEEKER_RACK: usize = 9;
    /// Guided area-disable launcher.
    pub const ION_LAUNCHER: usize = 10;
    /// Unguided area-impulse launcher.
    pub const CONCUSSION_POD: usize = 11;
    /// Proximity mine layer, 3 mines.
    pub const MINE_RACK: usize = 12;
    /// Stasis mine layer, 2 mines.
    pub const STASIS_RACK: usize = 13;
    /// Mining laser, cost 0.3, yield 0.5.
    pub const MINING_LASER: usize = 14;
    /// Two-target tractor beam.
    pub const TRACTOR_BEAM: usize = 15;
    /// Cloak, 0.2 energy per tick.
    pub const CLOAK: usize = 16;
    /// Hull repair, 0.5 health per tick.
    pub const HULL_REPAIR: usize = 17;
    /// Reactor, 0.5 energy per tick.
    pub const REACTOR: usize = 18;
    /// Booster, two charges.
    pub const BOOSTER: usize = 19;
    /// Energy transfer beam.
    pub const ENERGY_BEAM: usize = 20;
    /// Pulse emitter, detonates 140 ticks after firing.
    pub const PULSE_EMITTER: usize = 21;
}

/// Missile indices in [`test_catalog`].
pub mod missiles {
    /// Unguided direct-damage rocket.
    pub const ROCKET: usize = 0;
    /// Guided direct-damage missile.
    pub const SEEKER: usize = 1;
    /// Guided area disable.
    pub const ION_TORPEDO: usize = 2;
    /// Unguided area impulse.
    pub const CONCUSSION: usize = 3;
}

/// Mine indices in [`test_catalog`].
pub mod mines {
    /// Damage mine.
    pub const PROXIMITY: usize = 0;
    /// Disable mine.
    pub const STASIS: usize = 1;
}

/// Asteroid indices in [`test_catalog`].
pub mod asteroids {
    /// Easy rock, difficulty 1.
    pub const ROCK: usize = 0;
    /// Hard ore, difficulty 8.
    pub const DENSE_ORE: usize = 1;
}

/// Collectable indices in [`test_catalog`].
pub mod collectables {
    /// Restores 5 energy.
    pub const ENERGY_CELL: usize = 0;
    /// Adds 2 cargo.
    pub const SALVAGE: usize = 1;
    /// Adds 5 rounds per ammunition slot.
    pub const AMMO_CRATE: usize = 2;
    /// Restores 20 health.
    pub const REPAIR_KIT: usize = 3;
}

struct Template {
    name: &'static str,
    slot: SlotKind,
    usage: Usage,
    targeted: Targeting,
    cost: f64,
    reload: u32,
    max_ammo: Option<u32>,
}

fn armament(template: Template, behavior: ArmamentBehavior) -> ArmamentDef {
    ArmamentDef {
        name: template.name.to_string(),
        slot: template.slot,
        usage: template.usage,
        targeted: template.targeted,
        cost: fixed_f(template.cost),
        tier: 1,
        price: 100,
        max_ammo: template.max_ammo,
        reload: template.reload,
        behavior,
    }
}

fn energy(name: &'static str, slot: SlotKind, targeted: Targeting, cost: f64, reload: u32) -> Template {
    Template {
        name,
        slot,
        usage: Usage::Energy,
        targeted,
        cost,
        reload,
        max_ammo: None,
    }
}

fn ammo(name: &'static str, slot: SlotKind, targeted: Targeting, rounds: u32, reload: u32) -> Template {
    Template {
        name,
        slot,
        usage: Usage::Ammo,
        targeted,
        cost: 0.0,
        reload,
        max_ammo: Some(rounds),
    }
}

fn passive(name: &'static str) -> Template {
    Template {
        name,
        slot: SlotKind::Utility,
        usage: Usage::Empty,
        targeted: Targeting::Empty,
        cost: 0.0,
        reload: 0,
        max_ammo: None,
    }
}

#[allow(clippy::too_many_lines)]
fn test_armaments() -> Vec<ArmamentDef> {
    use SlotKind::{Large, Mine, Mining, Normal, Utility};
    use Targeting::{Targeted, Untargeted};

    let mut list: Vec<ArmamentDef> = SlotKind::ALL
        .iter()
        .map(|&kind| ArmamentDef::sentinel(kind))
        .collect();

    list.extend([
        armament(
            energy("Pulse Laser", Normal, Targeted, 0.5, 4),
            ArmamentBehavior::Laser {
                damage: fixed(3),
                range: fixed(100),
            },
        ),
        armament(
            ammo("Autocannon", Normal, Untargeted, 20, 2),
            ArmamentBehavior::Cannon {
                damage: fixed(4),
                speed: fixed(6),
                radius: fixed(1),
                lifetime: 30,
                burst: None,
            },
        ),
        armament(
            energy("Flak Cannon", Normal, Untargeted, 1.0, 10),
            ArmamentBehavior::Cannon {
                damage: fixed(2),
                speed: fixed(4),
                radius: fixed(1),
                lifetime: 5,
                burst: Some(Burst {
                    radius: fixed(6),
                    damage: fixed(3),
                }),
            },
        ),
        armament(
            ammo("Rocket Pod", Normal, Untargeted, 4, 8),
            ArmamentBehavior::MissileLauncher {
                missile: missiles::ROCKET,
            },
        ),
        armament(
            ammo("Seeker Rack", Normal, Targeted, 4, 12),
            ArmamentBehavior::MissileLauncher {
                missile: missiles::SEEKER,
            },
        ),
        armament(
            ammo("Ion Launcher", Large, Targeted, 2, 40),
            ArmamentBehavior::MissileLauncher {
                missile: missiles::ION_TORPEDO,
            },
        ),
        armament(
            ammo("Concussion Pod", Normal, Untargeted, 3, 20),
            ArmamentBehavior::MissileLauncher {
                missile: missiles::CONCUSSION,
            },
        ),
        armament(
            ammo("Mine Rack", Mine, Untargeted, 3, 20),
            ArmamentBehavior::MineLayer {
                mine: mines::PROXIMITY,
            },
        ),
        armament(
            ammo("Stasis Rack", Mine, Untargeted, 2, 20),
            ArmamentBehavior::MineLayer { mine: mines::STASIS },
        ),
        armament(
            energy("Mining Laser", Mining, Targeted, 0.3, 1),
            ArmamentBehavior::MiningLaser {
                output: fixed_f(0.5),
                range: fixed(40),
            },
        ),
        armament(
            energy("Tractor Beam", Utility, Targeted, 1.0, 5),
            ArmamentBehavior::Tractor {
                range: fixed(50),
                strength: fixed(2),
                max_targets: 2,
                hold: 20,
                drain: fixed_f(0.1),
            },
        ),
        armament(
            energy("Cloak", Utility, Untargeted, 1.0, 10),
            ArmamentBehavior::Cloak {
                drain: fixed_f(0.2),
            },
        ),
        armament(
            passive("Hull Repair"),
            ArmamentBehavior::HullRepair {
                rate: fixed_f(0.5),
                energy_per_point: fixed_f(0.5),
            },
        ),
        armament(
            passive("Reactor"),
            ArmamentBehavior::Reactor {
                output: fixed_f(0.5),
            },
        ),
        armament(
            ammo("Booster", Utility, Untargeted, 2, 0),
            ArmamentBehavior::Booster {
                impulse: fixed(4),
                duration: 5,
            },
        ),
        armament(
            energy("Energy Beam", Utility, Targeted, 0.5, 10),
            ArmamentBehavior::EnergyTransfer {
                amount: fixed(2),
                range: fixed(60),
            },
        ),
        armament(
            energy("Pulse Emitter", Large, Untargeted, 5.0, 200),
            ArmamentBehavior::PulseEmitter {
                delay: 140,
                radius: fixed(30),
                damage: fixed(20),
            },
        ),
    ]);
    list
}

fn test_units() -> Vec<UnitDef> {
    use armaments as a;
    use SlotKind::{Large, Mine, Mining, Normal, Utility};

    vec![
        UnitDef {
            name: "Corvette".to_string(),
            health: fixed(100),
            speed: fixed(4),
            energy: fixed(10),
            energy_regen: fixed_f(0.05),
            mass: fixed(10),
            radius: fixed(8),
            turn_rate: fixed_f(0.08),
            acceleration: fixed_f(0.2),
            slots: vec![Normal, Normal, Utility, Mine, Mining],
            loadout: vec![
                a::PULSE_LASER,
                a::AUTOCANNON,
                a::REACTOR,
                a::MINE_RACK,
                a::MINING_LASER,
            ],
            hardpoints: Some(2),
            dockable: false,
            cargo: fixed(10),
        },
        UnitDef {
            name: "Frigate".to_string(),
            health: fixed(250),
            speed: fixed(2),
            energy: fixed(25),
            energy_regen: fixed_f(0.1),
            mass: fixed(40),
            radius: fixed(14),
            turn_rate: fixed_f(0.04),
            acceleration: fixed_f(0.1),
            slots: vec![Normal, Large, Utility, Utility],
            loadout: vec![a::SEEKER_RACK, a::PULSE_EMITTER, a::HULL_REPAIR, a::TRACTOR_BEAM],
            hardpoints: Some(3),
            dockable: true,
            cargo: fixed(4),
        },
        UnitDef {
            name: "Drone".to_string(),
            health: fixed(20),
            speed: fixed(6),
            energy: fixed(4),
            energy_regen: fixed_f(0.02),
            mass: fixed(2),
            radius: fixed(3),
            turn_rate: fixed_f(0.15),
            acceleration: fixed_f(0.5),
            slots: vec![Normal],
            loadout: vec![a::PULSE_LASER],
            hardpoints: Some(1),
            dockable: false,
            cargo: fixed(0),
        },
    ]
}

fn test_missiles() -> Vec<MissileDef> {
    vec![
        MissileDef {
            name: "Rocket".to_string(),
            speed: fixed(5),
            turn_rate: fixed(0),
            radius: fixed(1),
            lifetime: 40,
            guided: false,
            blast_radius: fixed(0),
            effect: MissileEffect::Damage { amount: fixed(15) },
        },
        MissileDef {
            name: "Seeker".to_string(),
            speed: fixed(4),
            turn_rate: fixed_f(0.1),
            radius: fixed(1),
            lifetime: 100,
            guided: true,
            blast_radius: fixed(0),
            effect: MissileEffect::Damage { amount: fixed(10) },
        },
        MissileDef {
            name: "Ion Torpedo".to_string(),
            speed: fixed(3),
            turn_rate: fixed_f(0.05),
            radius: fixed(1),
            lifetime: 80,
            guided: true,
            blast_radius: fixed(8),
            effect: MissileEffect::Disable { ticks: 30 },
        },
        MissileDef {
            name: "Concussion Rocket".to_string(),
            speed: fixed(5),
            turn_rate: fixed(0),
            radius: fixed(1),
            lifetime: 20,
            guided: false,
            blast_radius: fixed(10),
            effect: MissileEffect::Impulse {
                strength: fixed(20),
            },
        },
    ]
}

fn test_mines() -> Vec<MineDef> {
    vec![
        MineDef {
            name: "Proximity Mine".to_string(),
            radius: fixed(1),
            deploy_ticks: 10,
            lifetime: 600,
            trigger_radius: fixed(5),
            blast_radius: fixed(10),
            effect: MineEffect::Damage { amount: fixed(30) },
        },
        MineDef {
            name: "Stasis Mine".to_string(),
            radius: fixed(1),
            deploy_ticks: 10,
            lifetime: 600,
            trigger_radius: fixed(5),
            blast_radius: fixed(12),
            effect: MineEffect::Disable { ticks: 40 },
        },
    ]
}

/// Raw tables behind [`test_catalog`], for tests that tweak them.
#[must_use]
pub fn test_catalog_data() -> CatalogData {
    CatalogData {
        units: test_units(),
        armaments: test_armaments(),
        missiles: test_missiles(),
        mines: test_mines(),
        asteroids: vec![
            AsteroidDef {
                name: "Rock".to_string(),
                radius: fixed(10),
                resources: fixed(20),
                difficulty: fixed(1),
            },
            AsteroidDef {
                name: "Dense Ore".to_string(),
                radius: fixed(15),
                resources: fixed(50),
                difficulty: fixed(8),
            },
        ],
        collectables: vec![
            CollectableDef {
                name: "Energy Cell".to_string(),
                radius: fixed(3),
                lifetime: 400,
                reward: Reward::Energy { amount: fixed(5) },
            },
            CollectableDef {
                name: "Salvage".to_string(),
                radius: fixed(3),
                lifetime: 400,
                reward: Reward::Cargo { amount: fixed(2) },
            },
            CollectableDef {
                name: "Ammo Crate".to_string(),
                radius: fixed(3),
                lifetime: 400,
                reward: Reward::Ammo { rounds: 5 },
            },
            CollectableDef {
                name: "Repair Kit".to_string(),
                radius: fixed(3),
                lifetime: 400,
                reward: Reward::Health { amount: fixed(20) },
            },
        ],
    }
}

/// A validated catalog covering every armament behaviour.
///
/// # Panics
///
/// Panics if the fixture tables fail validation.
#[must_use]
pub fn test_catalog() -> Catalog {
    Catalog::new(test_catalog_data()).expect("test catalog is valid")
}

/// An empty simulation over [`test_catalog`] with default config.
#[must_use]
pub fn empty_simulation() -> Simulation {
    Simulation::new(test_catalog(), EngineConfig::default())
}

/// Spawn a unit, panicking on failure.
///
/// # Panics
///
/// Panics if the definition is unknown.
pub fn spawn(sim: &mut Simulation, def: usize, team: u8, x: i32, y: i32) -> EntityId {
    sim.spawn_unit(def, team, pos(x, y), fixed(0))
        .expect("fixture unit spawns")
}

/// Two corvettes 50 units apart, facing each other.
///
/// Returns the simulation and the ids of the team-0 and team-1 units.
#[must_use]
pub fn duel() -> (Simulation, EntityId, EntityId) {
    let mut sim = empty_simulation();
    let a = spawn(&mut sim, units::CORVETTE, 0, 0, 0);
    let b = sim
        .spawn_unit(units::CORVETTE, 1, pos(50, 0), armada_core::math::PI)
        .expect("fixture unit spawns");
    (sim, a, b)
}

/// Symmetric skirmish: `per_side` corvettes per team in two facing lines,
/// an asteroid field between them and every unit firing its laser and
/// cannon at its opposite number.
///
/// # Panics
///
/// Panics if the fixture catalog is inconsistent.
#[must_use]
pub fn skirmish(per_side: usize) -> Simulation {
    let mut sim = empty_simulation();
    let mut left = Vec::with_capacity(per_side);
    let mut right = Vec::with_capacity(per_side);

    for i in 0..per_side {
        let y = i32::try_from(i).unwrap_or(i32::MAX / 40) * 20;
        left.push(spawn(&mut sim, units::CORVETTE, 0, 0, y));
        right.push(
            sim.spawn_unit(units::CORVETTE, 1, pos(60, y), armada_core::math::PI)
                .expect("fixture unit spawns"),
        );
        sim.spawn_asteroid(asteroids::ROCK, pos(30, y + 10))
            .expect("fixture asteroid spawns");
    }

    for (&a, &b) in left.iter().zip(&right) {
        for (shooter, target) in [(a, b), (b, a)] {
            sim.set_fire_intent(shooter, 0, Some(TargetRef::Unit(target)))
                .expect("slot 0 exists");
            sim.set_fire_intent(shooter, 1, None)
                .expect("slot 1 exists");
        }
    }

    tracing::debug!(per_side, "Skirmish scenario ready");
    sim
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_validates() {
        let catalog = test_catalog();
        assert_eq!(catalog.armament_index("Pulse Laser"), Some(armaments::PULSE_LASER));
        assert_eq!(catalog.armament_index("Pulse Emitter"), Some(armaments::PULSE_EMITTER));
        assert_eq!(catalog.missile_index("Concussion Rocket"), Some(missiles::CONCUSSION));
        assert_eq!(catalog.unit_index("Drone"), Some(units::DRONE));
        assert_eq!(catalog.collectable_index("Repair Kit"), Some(collectables::REPAIR_KIT));
        assert_eq!(catalog.asteroid_index("Dense Ore"), Some(asteroids::DENSE_ORE));
        assert_eq!(catalog.mine_index("Stasis Mine"), Some(mines::STASIS));
    }

    #[test]
    fn test_skirmish_spawns_both_sides() {
        let sim = skirmish(3);
        assert_eq!(sim.world().units().len(), 6);
        assert_eq!(sim.world().asteroids().len(), 3);
    }
}
