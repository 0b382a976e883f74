//! Scenario loading for the headless driver.
//!
//! A scenario names hulls, field objects and standing orders by catalog
//! name; [`Scenario::build`] resolves them against a catalog and returns
//! a ready [`Simulation`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use armada_core::components::EntityId;
use armada_core::config::EngineConfig;
use armada_core::data::Catalog;
use armada_core::math::{decimal_serde, Fixed, Vec2Fixed, PI};
use armada_core::simulation::Simulation;

use crate::error::{read_text, ToolError, ToolResult};

fn default_ticks() -> u64 {
    1200
}

/// How the driver picks a slot's target each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderTarget {
    /// Hold the trigger with no target.
    Untargeted,
    /// No target, but only while the nearest enemy is dead ahead.
    Forward,
    /// Nearest visible enemy unit.
    NearestEnemy,
    /// Nearest other unit on the same team.
    NearestAlly,
    /// Nearest asteroid with resources left.
    NearestAsteroid,
}

/// Standing fire order for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotOrder {
    /// Slot index on the unit.
    pub slot: usize,
    /// Target policy.
    pub target: OrderTarget,
}

/// A unit to spawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitPlacement {
    /// Hull name in the catalog.
    pub unit: String,
    /// Team.
    pub team: u8,
    /// X position.
    #[serde(with = "decimal_serde")]
    pub x: Fixed,
    /// Y position.
    #[serde(with = "decimal_serde")]
    pub y: Fixed,
    /// Initial heading in radians.
    #[serde(default, with = "decimal_serde")]
    pub heading: Fixed,
    /// Armaments to mount over the hull's default loadout, as
    /// `(slot, armament name)` pairs.
    #[serde(default)]
    pub equip: Vec<(usize, String)>,
    /// Standing orders.
    #[serde(default)]
    pub orders: Vec<SlotOrder>,
}

/// An asteroid or collectable to place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPlacement {
    /// Definition name in the catalog.
    pub name: String,
    /// X position.
    #[serde(with = "decimal_serde")]
    pub x: Fixed,
    /// Y position.
    #[serde(with = "decimal_serde")]
    pub y: Fixed,
}

/// A complete scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Tick budget.
    #[serde(default = "default_ticks")]
    pub ticks: u64,
    /// Units to spawn, in order.
    pub units: Vec<UnitPlacement>,
    /// Asteroids to place.
    #[serde(default)]
    pub asteroids: Vec<FieldPlacement>,
    /// Collectables to place.
    #[serde(default)]
    pub collectables: Vec<FieldPlacement>,
}

/// A built scenario: the simulation plus each unit's standing orders.
#[derive(Debug)]
pub struct Prepared {
    /// The simulation at tick 0.
    pub simulation: Simulation,
    /// Standing orders per spawned unit.
    pub orders: Vec<(EntityId, Vec<SlotOrder>)>,
    /// Tick budget.
    pub ticks: u64,
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> ToolResult<Self> {
        let contents = read_text(path.as_ref())?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> ToolResult<Self> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// The built-in skirmish: a corvette pair per side with a frigate
    /// anchoring each line and a rock between them.
    ///
    /// Hull and armament names match the shipped catalog.
    #[must_use]
    pub fn skirmish() -> Self {
        let corvette = |team: u8, x: i32, y: i32| UnitPlacement {
            unit: "Corvette".to_string(),
            team,
            x: Fixed::from_num(x),
            y: Fixed::from_num(y),
            heading: if team == 0 { Fixed::ZERO } else { PI },
            equip: Vec::new(),
            orders: vec![
                SlotOrder {
                    slot: 0,
                    target: OrderTarget::NearestEnemy,
                },
                SlotOrder {
                    slot: 1,
                    target: OrderTarget::Forward,
                },
                SlotOrder {
                    slot: 4,
                    target: OrderTarget::NearestAsteroid,
                },
            ],
        };
        let frigate = |team: u8, x: i32| UnitPlacement {
            unit: "Frigate".to_string(),
            team,
            x: Fixed::from_num(x),
            y: Fixed::ZERO,
            heading: if team == 0 { Fixed::ZERO } else { PI },
            equip: Vec::new(),
            orders: vec![
                SlotOrder {
                    slot: 0,
                    target: OrderTarget::NearestEnemy,
                },
                SlotOrder {
                    slot: 1,
                    target: OrderTarget::Forward,
                },
            ],
        };

        Self {
            name: "Standard skirmish".to_string(),
            ticks: default_ticks(),
            units: vec![
                frigate(0, -40),
                corvette(0, 0, -30),
                corvette(0, 0, 30),
                frigate(1, 240),
                corvette(1, 200, -30),
                corvette(1, 200, 30),
            ],
            asteroids: vec![FieldPlacement {
                name: "Rock".to_string(),
                x: Fixed::from_num(100),
                y: Fixed::ZERO,
            }],
            collectables: vec![FieldPlacement {
                name: "Energy Cell".to_string(),
                x: Fixed::from_num(100),
                y: Fixed::from_num(60),
            }],
        }
    }

    /// Resolve names against `catalog` and spawn everything.
    pub fn build(&self, catalog: Catalog, config: EngineConfig) -> ToolResult<Prepared> {
        let mut resolved = Vec::with_capacity(self.units.len());
        for placement in &self.units {
            let def = lookup("unit", &placement.unit, catalog.unit_index(&placement.unit))?;
            let mut equip = Vec::with_capacity(placement.equip.len());
            for (slot, name) in &placement.equip {
                equip.push((*slot, lookup("armament", name, catalog.armament_index(name))?));
            }
            resolved.push((def, equip));
        }
        let asteroids = self
            .asteroids
            .iter()
            .map(|a| lookup("asteroid", &a.name, catalog.asteroid_index(&a.name)))
            .collect::<ToolResult<Vec<_>>>()?;
        let collectables = self
            .collectables
            .iter()
            .map(|c| lookup("collectable", &c.name, catalog.collectable_index(&c.name)))
            .collect::<ToolResult<Vec<_>>>()?;

        let mut simulation = Simulation::new(catalog, config);
        let mut orders = Vec::with_capacity(self.units.len());
        for (placement, (def, equip)) in self.units.iter().zip(resolved) {
            let position = Vec2Fixed::new(placement.x, placement.y);
            let id = simulation.spawn_unit(def, placement.team, position, placement.heading)?;
            for (slot, armament) in equip {
                simulation.equip(id, slot, armament)?;
            }
            orders.push((id, placement.orders.clone()));
        }
        for (placement, def) in self.asteroids.iter().zip(asteroids) {
            simulation.spawn_asteroid(def, Vec2Fixed::new(placement.x, placement.y))?;
        }
        for (placement, def) in self.collectables.iter().zip(collectables) {
            simulation.spawn_collectable(def, Vec2Fixed::new(placement.x, placement.y))?;
        }

        tracing::info!(
            scenario = %self.name,
            units = self.units.len(),
            asteroids = self.asteroids.len(),
            collectables = self.collectables.len(),
            "Scenario built"
        );
        Ok(Prepared {
            simulation,
            orders,
            ticks: self.ticks,
        })
    }
}

fn lookup(kind: &'static str, name: &str, index: Option<usize>) -> ToolResult<usize> {
    index.ok_or_else(|| ToolError::UnknownReference {
        kind,
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"Scenario(
        name: "Mining run",
        ticks: 50,
        units: [
            UnitPlacement(
                unit: "Corvette", team: 0, x: 0.0, y: 0.0,
                orders: [SlotOrder(slot: 4, target: NearestAsteroid)],
            ),
        ],
        asteroids: [FieldPlacement(name: "Rock", x: 20.0, y: 0.0)],
    )"#;

    #[test]
    fn test_parse_scenario() {
        let scenario = Scenario::from_ron_str(SCENARIO).unwrap();
        assert_eq!(scenario.name, "Mining run");
        assert_eq!(scenario.ticks, 50);
        assert_eq!(scenario.units[0].heading, Fixed::ZERO);
        assert_eq!(scenario.units[0].orders[0].target, OrderTarget::NearestAsteroid);
        assert!(scenario.collectables.is_empty());
    }

    #[test]
    fn test_build_against_test_catalog() {
        let catalog = armada_test_utils::fixtures::test_catalog();
        let scenario = Scenario::from_ron_str(SCENARIO).unwrap();
        let prepared = scenario.build(catalog, EngineConfig::default()).unwrap();
        assert_eq!(prepared.orders.len(), 1);
        assert_eq!(prepared.simulation.world().asteroids().len(), 1);
        assert_eq!(prepared.ticks, 50);
    }

    #[test]
    fn test_unknown_name_is_reported() {
        let catalog = armada_test_utils::fixtures::test_catalog();
        let mut scenario = Scenario::from_ron_str(SCENARIO).unwrap();
        scenario.units[0].unit = "Dreadnought".to_string();
        let err = scenario.build(catalog, EngineConfig::default()).unwrap_err();
        assert!(matches!(err, ToolError::UnknownReference { kind: "unit", .. }));
    }

    #[test]
    fn test_builtin_skirmish_fits_test_catalog() {
        // The test catalog shares hull, rock and cell names with the shipped one.
        let catalog = armada_test_utils::fixtures::test_catalog();
        let prepared = Scenario::skirmish()
            .build(catalog, EngineConfig::default())
            .unwrap();
        assert_eq!(prepared.simulation.world().units().len(), 6);
    }
}
