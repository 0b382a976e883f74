//! Headless skirmish driver.
//!
//! Plays the part of the movement and input layers around the engine:
//! each tick it steers every ordered unit toward its nearest enemy, moves
//! it, refreshes its fire intents from its standing orders, then advances
//! the simulation and tallies what came out.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};

use armada_core::components::{EntityId, TargetRef, Unit};
use armada_core::data::{Catalog, UnitDef};
use armada_core::effects::TickOutput;
use armada_core::math::{is_facing, Fixed, Vec2Fixed};
use armada_core::simulation::{Simulation, World};

use crate::scenario::{OrderTarget, Prepared, SlotOrder};

/// Gap kept between hulls when closing in.
const STANDOFF: i32 = 30;

/// An advisory shown to a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashRecord {
    /// Tick it was raised on.
    pub tick: u64,
    /// Receiving unit.
    pub unit: EntityId,
    /// Message text.
    pub text: String,
}

/// A unit still alive at the end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurvivorReport {
    /// Unit id.
    pub id: EntityId,
    /// Hull name.
    pub hull: String,
    /// Team.
    pub team: u8,
    /// Remaining health.
    pub health: f64,
    /// Remaining energy.
    pub energy: f64,
    /// Cargo carried.
    pub cargo: f64,
}

/// Outcome of a headless run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    /// Ticks actually advanced.
    pub ticks_run: u64,
    /// World hash after the last tick.
    pub state_hash: u64,
    /// Effect triggers emitted, by name.
    pub effects: BTreeMap<&'static str, u64>,
    /// Every advisory, in order.
    pub flashes: Vec<FlashRecord>,
    /// `(tick, unit)` for every destruction.
    pub destroyed: Vec<(u64, EntityId)>,
    /// Units alive at the end, by id.
    pub survivors: Vec<SurvivorReport>,
    /// Last team standing, if the fight was decided.
    pub winner: Option<u8>,
}

impl SimulationReport {
    fn record(&mut self, out: &TickOutput) {
        for trigger in &out.effects {
            *self.effects.entry(trigger.effect.name()).or_default() += 1;
        }
        for flash in &out.flashes {
            self.flashes.push(FlashRecord {
                tick: out.frame,
                unit: flash.unit,
                text: flash.text.clone(),
            });
        }
        for &unit in &out.destroyed {
            self.destroyed.push((out.frame, unit));
        }
    }

    /// Pretty JSON for `--json` output.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Run a prepared scenario until the tick budget runs out or, if it
/// started with more than one team, until only one remains.
#[must_use]
pub fn run(prepared: Prepared) -> SimulationReport {
    let Prepared {
        mut simulation,
        orders,
        ticks,
    } = prepared;
    let mut report = SimulationReport {
        ticks_run: 0,
        state_hash: 0,
        effects: BTreeMap::new(),
        flashes: Vec::new(),
        destroyed: Vec::new(),
        survivors: Vec::new(),
        winner: None,
    };
    let contested = last_team_standing(simulation.world()).is_none();

    for _ in 0..ticks {
        drive(&mut simulation, &orders);
        let out = simulation.tick();
        report.record(&out);
        report.ticks_run += 1;

        if !out.destroyed.is_empty() {
            debug!(tick = out.frame, destroyed = ?out.destroyed, "Casualties");
        }
        if !contested {
            continue;
        }
        if let Some(team) = last_team_standing(simulation.world()) {
            report.winner = Some(team);
            break;
        }
    }

    report.state_hash = simulation.state_hash();
    report.survivors = survivors(&simulation);
    info!(
        ticks = report.ticks_run,
        destroyed = report.destroyed.len(),
        winner = ?report.winner,
        "Simulation finished"
    );
    report
}

/// The one team with units left, once every other team is gone.
fn last_team_standing(world: &World) -> Option<u8> {
    let mut teams = world.units().iter_sorted().map(|(_, unit)| unit.team);
    let first = teams.next()?;
    teams.all(|team| team == first).then_some(first)
}

fn survivors(simulation: &Simulation) -> Vec<SurvivorReport> {
    simulation
        .world()
        .units()
        .iter_sorted()
        .map(|(id, unit)| SurvivorReport {
            id,
            hull: simulation
                .catalog()
                .unit(unit.def)
                .map(|def| def.name.clone())
                .unwrap_or_default(),
            team: unit.team,
            health: unit.health.to_num(),
            energy: unit.energy.to_num(),
            cargo: unit.cargo.to_num(),
        })
        .collect()
}

/// What one unit sees this tick.
#[derive(Debug, Clone, Copy)]
struct Sight {
    enemy: Option<(EntityId, Vec2Fixed, Fixed)>,
    ally: Option<EntityId>,
    asteroid: Option<EntityId>,
}

fn nearest(
    origin: Vec2Fixed,
    candidates: impl Iterator<Item = (EntityId, Vec2Fixed, Fixed)>,
) -> Option<(EntityId, Vec2Fixed, Fixed)> {
    candidates.min_by_key(|&(id, position, _)| (origin.distance_squared(position), id))
}

fn look(world: &World, unit: &Unit) -> Sight {
    let enemies = world
        .units()
        .iter_sorted()
        .filter(|(_, other)| other.team != unit.team && other.is_operable() && !other.cloaked)
        .map(|(id, other)| (id, other.position, other.radius));
    let allies = world
        .units()
        .iter_sorted()
        .filter(|(id, other)| *id != unit.id && other.team == unit.team && other.is_operable())
        .map(|(id, other)| (id, other.position, other.radius));
    let asteroids = world
        .asteroids()
        .iter_sorted()
        .filter(|(_, asteroid)| asteroid.resources > Fixed::ZERO)
        .map(|(id, asteroid)| (id, asteroid.position, asteroid.radius));

    Sight {
        enemy: nearest(unit.position, enemies),
        ally: nearest(unit.position, allies).map(|(id, _, _)| id),
        asteroid: nearest(unit.position, asteroids).map(|(id, _, _)| id),
    }
}

/// Steer, move and refresh intents for every ordered unit.
fn drive(simulation: &mut Simulation, orders: &[(EntityId, Vec<SlotOrder>)]) {
    let (catalog, world) = simulation.split_mut();
    for (id, slot_orders) in orders {
        let Some(unit) = world.unit(*id) else {
            continue;
        };
        let sight = look(world, unit);
        steer(catalog, world, *id, sight);

        let Some(unit) = world.unit(*id) else {
            continue;
        };
        let facing = sight.enemy.is_some_and(|(_, position, radius)| {
            is_facing(unit.position, unit.heading, position, radius)
        });
        for order in slot_orders {
            let intent = match order.target {
                OrderTarget::Untargeted => Some(None),
                OrderTarget::Forward => facing.then_some(None),
                OrderTarget::NearestEnemy => sight.enemy.map(|(e, _, _)| Some(TargetRef::Unit(e))),
                OrderTarget::NearestAlly => sight.ally.map(|a| Some(TargetRef::Unit(a))),
                OrderTarget::NearestAsteroid => {
                    sight.asteroid.map(|a| Some(TargetRef::Asteroid(a)))
                }
            };
            // Slot indices come from the scenario file; a bad one is skipped.
            let _ = match intent {
                Some(target) => world.set_fire_intent(*id, order.slot, target),
                None => world.clear_fire_intent(*id, order.slot),
            };
        }
    }
}

fn steer(catalog: &Catalog, world: &mut World, id: EntityId, sight: Sight) {
    let Some(unit) = world.unit_mut(id) else {
        return;
    };
    if !unit.is_operable() || unit.is_disabled() {
        coast(unit);
        return;
    }
    let Some(def) = catalog.unit(unit.def) else {
        return;
    };

    match sight.enemy {
        Some((_, position, radius)) => {
            unit.steer_toward(position, def);
            let gap = (position - unit.position).length() - radius - unit.radius;
            let closing = gap > def.brake_distance() + Fixed::from_num(STANDOFF);
            throttle(unit, def, closing);
        }
        None => throttle(unit, def, false),
    }
    coast(unit);
}

fn throttle(unit: &mut Unit, def: &UnitDef, accelerate: bool) {
    unit.speed = if accelerate {
        (unit.speed + def.acceleration).min(def.speed)
    } else {
        (unit.speed - def.acceleration).max(Fixed::ZERO)
    };
}

/// Integrate heading speed and knockback, bleeding off a tenth of the
/// knockback each tick.
fn coast(unit: &mut Unit) {
    unit.position += Vec2Fixed::from_angle(unit.heading, unit.speed);
    unit.position += unit.velocity;
    unit.velocity = unit.velocity.scale(Fixed::from_num(9) / 10);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::Scenario;
    use armada_core::config::EngineConfig;
    use armada_test_utils::fixtures::test_catalog;

    fn prepared(ron: &str) -> Prepared {
        Scenario::from_ron_str(ron)
            .unwrap()
            .build(test_catalog(), EngineConfig::default())
            .unwrap()
    }

    #[test]
    fn test_duel_is_decided() {
        let report = run(prepared(
            r#"Scenario(
                name: "Duel",
                ticks: 2000,
                units: [
                    UnitPlacement(unit: "Corvette", team: 0, x: 0.0, y: 0.0,
                        orders: [SlotOrder(slot: 0, target: NearestEnemy)]),
                    UnitPlacement(unit: "Drone", team: 1, x: 60.0, y: 0.0, heading: 3.14159),
                ],
            )"#,
        ));
        assert_eq!(report.winner, Some(0));
        assert_eq!(report.destroyed.len(), 1);
        assert!(report.effects.get("laser").copied().unwrap_or(0) > 0);
        assert_eq!(report.survivors.len(), 1);
        assert!(report.ticks_run < 2000);
    }

    #[test]
    fn test_mining_run_fills_the_hold() {
        // 0.5 a shot fills the 10-unit hold after 20 shots.
        let report = run(prepared(
            r#"Scenario(
                name: "Mining",
                ticks: 30,
                units: [
                    UnitPlacement(unit: "Corvette", team: 0, x: 0.0, y: 0.0,
                        orders: [SlotOrder(slot: 4, target: NearestAsteroid)]),
                ],
                asteroids: [FieldPlacement(name: "Rock", x: 20.0, y: 0.0)],
            )"#,
        ));
        assert_eq!(report.winner, None);
        assert_eq!(report.ticks_run, 30);
        assert_eq!(report.effects.get("mining_beam"), Some(&20));
        assert_eq!(report.flashes.len(), 10);
        assert!(report.flashes.iter().all(|f| f.text == "Cargo hold full"));
        assert!((report.survivors[0].cargo - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let report = run(Scenario::skirmish()
            .build(test_catalog(), EngineConfig::default())
            .map(|mut p| {
                p.ticks = 20;
                p
            })
            .unwrap());
        let json = report.to_json().unwrap();
        assert!(json.contains("\"ticks_run\": 20"));
        assert!(json.contains("\"survivors\""));
    }

    #[test]
    fn test_last_team_standing() {
        let mut sim = armada_test_utils::fixtures::empty_simulation();
        assert_eq!(last_team_standing(sim.world()), None);
        armada_test_utils::fixtures::spawn(&mut sim, 0, 1, 0, 0);
        assert_eq!(last_team_standing(sim.world()), Some(1));
        armada_test_utils::fixtures::spawn(&mut sim, 0, 0, 50, 0);
        assert_eq!(last_team_standing(sim.world()), None);
    }
}
