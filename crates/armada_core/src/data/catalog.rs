//! The catalog: every definition table, indexed by position and by name.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::armament_data::{ArmamentBehavior, ArmamentDef, SlotKind, Usage, SENTINEL_COUNT};
use super::field_data::{AsteroidDef, CollectableDef};
use super::ordnance_data::{MineDef, MissileDef};
use super::unit_data::UnitDef;
use crate::error::{GameError, Result};
use crate::math::Fixed;

/// Raw catalog tables as authored in a data file.
///
/// # Example RON
///
/// ```ron
/// CatalogData(
///     units: [...],
///     armaments: [...],
///     missiles: [...],
///     mines: [...],
///     asteroids: [...],
///     collectables: [...],
/// )
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    /// Unit hulls.
    pub units: Vec<UnitDef>,
    /// Armaments; indices 0..=4 must be the empty-slot sentinels.
    pub armaments: Vec<ArmamentDef>,
    /// Missiles referenced by launchers.
    #[serde(default)]
    pub missiles: Vec<MissileDef>,
    /// Mines referenced by mine layers.
    #[serde(default)]
    pub mines: Vec<MineDef>,
    /// Asteroid kinds.
    #[serde(default)]
    pub asteroids: Vec<AsteroidDef>,
    /// Collectable kinds.
    #[serde(default)]
    pub collectables: Vec<CollectableDef>,
}

impl CatalogData {
    /// Validate internal consistency of the tables.
    ///
    /// Checks for:
    /// - Sentinels at armament indices 0..=4 in slot-kind order
    /// - Unique names within each table
    /// - Loadouts that reference valid, slot-compatible armaments
    /// - Launcher and layer references into the missile and mine tables
    /// - Positive radii, masses and difficulties
    ///
    /// Returns a list of validation errors.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (index, kind) in SlotKind::ALL.iter().enumerate() {
            match self.armaments.get(index) {
                Some(def) if def.is_empty() && def.slot == *kind => {}
                Some(def) => errors.push(format!(
                    "Armament {index} ('{}') must be the empty {} sentinel",
                    def.name,
                    kind.name()
                )),
                None => errors.push(format!("Missing empty {} sentinel at {index}", kind.name())),
            }
        }

        check_unique("unit", self.units.iter().map(|d| d.name.as_str()), &mut errors);
        check_unique(
            "armament",
            self.armaments.iter().map(|d| d.name.as_str()),
            &mut errors,
        );
        check_unique("missile", self.missiles.iter().map(|d| d.name.as_str()), &mut errors);
        check_unique("mine", self.mines.iter().map(|d| d.name.as_str()), &mut errors);
        check_unique(
            "asteroid",
            self.asteroids.iter().map(|d| d.name.as_str()),
            &mut errors,
        );
        check_unique(
            "collectable",
            self.collectables.iter().map(|d| d.name.as_str()),
            &mut errors,
        );

        for unit in &self.units {
            if unit.radius <= Fixed::ZERO || unit.mass <= Fixed::ZERO {
                errors.push(format!("Unit '{}' needs positive radius and mass", unit.name));
            }
            if unit.health <= Fixed::ZERO || unit.energy < Fixed::ZERO {
                errors.push(format!("Unit '{}' has invalid health or energy", unit.name));
            }
            if !unit.loadout.is_empty() && unit.loadout.len() != unit.slots.len() {
                errors.push(format!(
                    "Unit '{}' loadout has {} entries for {} slots",
                    unit.name,
                    unit.loadout.len(),
                    unit.slots.len()
                ));
            }
            for (slot, &armament) in unit.loadout.iter().enumerate() {
                let Some(kind) = unit.slots.get(slot) else {
                    continue;
                };
                match self.armaments.get(armament) {
                    Some(def) if def.slot == *kind => {}
                    Some(def) => errors.push(format!(
                        "Unit '{}' slot {slot} is {} but loads '{}' ({})",
                        unit.name,
                        kind.name(),
                        def.name,
                        def.slot.name()
                    )),
                    None => errors.push(format!(
                        "Unit '{}' slot {slot} loads unknown armament {armament}",
                        unit.name
                    )),
                }
            }
        }

        for (index, def) in self.armaments.iter().enumerate().skip(SENTINEL_COUNT) {
            self.validate_armament(def, index, &mut errors);
        }

        for missile in &self.missiles {
            if missile.radius <= Fixed::ZERO || missile.lifetime == 0 {
                errors.push(format!(
                    "Missile '{}' needs positive radius and lifetime",
                    missile.name
                ));
            }
        }

        for mine in &self.mines {
            if mine.radius <= Fixed::ZERO || mine.lifetime == 0 {
                errors.push(format!("Mine '{}' needs positive radius and lifetime", mine.name));
            }
        }

        for asteroid in &self.asteroids {
            if asteroid.difficulty <= Fixed::ZERO {
                errors.push(format!(
                    "Asteroid '{}' needs a positive difficulty",
                    asteroid.name
                ));
            }
        }

        errors
    }

    fn validate_armament(&self, def: &ArmamentDef, index: usize, errors: &mut Vec<String>) {
        if def.is_empty() {
            errors.push(format!(
                "Armament {index} ('{}') is empty outside the sentinel range",
                def.name
            ));
        }
        if def.usage == Usage::Ammo && def.max_ammo.unwrap_or(0) == 0 {
            errors.push(format!("Armament '{}' uses ammo but has no magazine", def.name));
        }
        if def.cost < Fixed::ZERO {
            errors.push(format!("Armament '{}' has a negative cost", def.name));
        }

        match &def.behavior {
            ArmamentBehavior::MissileLauncher { missile } if *missile >= self.missiles.len() => {
                errors.push(format!(
                    "Armament '{}' launches unknown missile {missile}",
                    def.name
                ));
            }
            ArmamentBehavior::MineLayer { mine } if *mine >= self.mines.len() => {
                errors.push(format!("Armament '{}' lays unknown mine {mine}", def.name));
            }
            ArmamentBehavior::Tractor { max_targets: 0, .. } => {
                errors.push(format!("Tractor '{}' needs at least one target", def.name));
            }
            ArmamentBehavior::PulseEmitter { delay: 0, .. } => {
                errors.push(format!("Pulse emitter '{}' needs a delay", def.name));
            }
            ArmamentBehavior::Cannon { lifetime: 0, .. } => {
                errors.push(format!("Cannon '{}' needs a projectile lifetime", def.name));
            }
            _ => {}
        }
    }
}

fn check_unique<'a>(table: &str, names: impl Iterator<Item = &'a str>, errors: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            errors.push(format!("Duplicate {table} name '{name}'"));
        }
    }
}

fn index_names<'a>(names: impl Iterator<Item = &'a str>) -> HashMap<String, usize> {
    names
        .enumerate()
        .map(|(index, name)| (name.to_string(), index))
        .collect()
}

/// Validated, read-only definition tables.
///
/// Built once at startup; indices into it are stable for the lifetime of
/// the process and are the only cross-references the engine uses.
#[derive(Debug, Clone)]
pub struct Catalog {
    data: CatalogData,
    unit_names: HashMap<String, usize>,
    armament_names: HashMap<String, usize>,
    missile_names: HashMap<String, usize>,
    mine_names: HashMap<String, usize>,
    asteroid_names: HashMap<String, usize>,
    collectable_names: HashMap<String, usize>,
}

impl Catalog {
    /// Validate the tables and build the name indices.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CatalogInvalid`] listing every problem found.
    pub fn new(data: CatalogData) -> Result<Self> {
        let errors = data.validate();
        if !errors.is_empty() {
            return Err(GameError::CatalogInvalid(errors));
        }

        let catalog = Self {
            unit_names: index_names(data.units.iter().map(|d| d.name.as_str())),
            armament_names: index_names(data.armaments.iter().map(|d| d.name.as_str())),
            missile_names: index_names(data.missiles.iter().map(|d| d.name.as_str())),
            mine_names: index_names(data.mines.iter().map(|d| d.name.as_str())),
            asteroid_names: index_names(data.asteroids.iter().map(|d| d.name.as_str())),
            collectable_names: index_names(data.collectables.iter().map(|d| d.name.as_str())),
            data,
        };

        tracing::info!(
            units = catalog.data.units.len(),
            armaments = catalog.data.armaments.len(),
            missiles = catalog.data.missiles.len(),
            mines = catalog.data.mines.len(),
            "Catalog loaded"
        );

        Ok(catalog)
    }

    /// Parse and validate a RON catalog.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CatalogParse`] on malformed text and
    /// [`GameError::CatalogInvalid`] on failed validation.
    pub fn from_ron_str(source_name: &str, text: &str) -> Result<Self> {
        let data: CatalogData = ron::from_str(text).map_err(|e| GameError::CatalogParse {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        Self::new(data)
    }

    /// The raw tables.
    #[must_use]
    pub fn data(&self) -> &CatalogData {
        &self.data
    }

    /// Unit definition by index.
    #[must_use]
    pub fn unit(&self, index: usize) -> Option<&UnitDef> {
        self.data.units.get(index)
    }

    /// Armament definition by index.
    #[must_use]
    pub fn armament(&self, index: usize) -> Option<&ArmamentDef> {
        self.data.armaments.get(index)
    }

    /// Missile definition by index.
    #[must_use]
    pub fn missile(&self, index: usize) -> Option<&MissileDef> {
        self.data.missiles.get(index)
    }

    /// Mine definition by index.
    #[must_use]
    pub fn mine(&self, index: usize) -> Option<&MineDef> {
        self.data.mines.get(index)
    }

    /// Asteroid definition by index.
    #[must_use]
    pub fn asteroid(&self, index: usize) -> Option<&AsteroidDef> {
        self.data.asteroids.get(index)
    }

    /// Collectable definition by index.
    #[must_use]
    pub fn collectable(&self, index: usize) -> Option<&CollectableDef> {
        self.data.collectables.get(index)
    }

    /// Unit definition index by name.
    #[must_use]
    pub fn unit_index(&self, name: &str) -> Option<usize> {
        self.unit_names.get(name).copied()
    }

    /// Armament index by name.
    #[must_use]
    pub fn armament_index(&self, name: &str) -> Option<usize> {
        self.armament_names.get(name).copied()
    }

    /// Missile index by name.
    #[must_use]
    pub fn missile_index(&self, name: &str) -> Option<usize> {
        self.missile_names.get(name).copied()
    }

    /// Mine index by name.
    #[must_use]
    pub fn mine_index(&self, name: &str) -> Option<usize> {
        self.mine_names.get(name).copied()
    }

    /// Asteroid definition index by name.
    #[must_use]
    pub fn asteroid_index(&self, name: &str) -> Option<usize> {
        self.asteroid_names.get(name).copied()
    }

    /// Collectable definition index by name.
    #[must_use]
    pub fn collectable_index(&self, name: &str) -> Option<usize> {
        self.collectable_names.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MissileEffect, Targeting};

    fn create_test_catalog_data() -> CatalogData {
        let mut armaments: Vec<ArmamentDef> =
            SlotKind::ALL.iter().map(|k| ArmamentDef::sentinel(*k)).collect();
        armaments.push(ArmamentDef {
            name: "Dart Rack".to_string(),
            slot: SlotKind::Normal,
            usage: Usage::Ammo,
            targeted: Targeting::Untargeted,
            cost: Fixed::ZERO,
            tier: 1,
            price: 100,
            max_ammo: Some(4),
            reload: 20,
            behavior: ArmamentBehavior::MissileLauncher { missile: 0 },
        });

        CatalogData {
            units: vec![UnitDef {
                name: "Corvette".to_string(),
                health: Fixed::from_num(100),
                speed: Fixed::from_num(4),
                energy: Fixed::from_num(10),
                energy_regen: Fixed::from_num(0.02),
                mass: Fixed::from_num(10),
                radius: Fixed::from_num(8),
                turn_rate: Fixed::from_num(0.08),
                acceleration: Fixed::from_num(0.2),
                slots: vec![SlotKind::Normal, SlotKind::Utility],
                loadout: vec![5, 1],
                hardpoints: Some(2),
                dockable: false,
                cargo: Fixed::from_num(4),
            }],
            armaments,
            missiles: vec![MissileDef {
                name: "Dart".to_string(),
                speed: Fixed::from_num(6),
                turn_rate: Fixed::ZERO,
                radius: Fixed::from_num(2),
                lifetime: 60,
                guided: false,
                blast_radius: Fixed::from_num(20),
                effect: MissileEffect::Damage {
                    amount: Fixed::from_num(15),
                },
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_valid_data() {
        let data = create_test_catalog_data();
        let errors = data.validate();
        assert!(errors.is_empty(), "Errors: {:?}", errors);
    }

    #[test]
    fn test_lookup_by_name_and_index() {
        let catalog = Catalog::new(create_test_catalog_data()).unwrap();
        let index = catalog.armament_index("Dart Rack").unwrap();
        assert_eq!(index, 5);
        assert_eq!(catalog.armament(index).unwrap().max_ammo, Some(4));
        assert_eq!(catalog.unit_index("Corvette"), Some(0));
        assert!(catalog.unit_index("Dreadnought").is_none());
    }

    #[test]
    fn test_missing_sentinel_is_fatal() {
        let mut data = create_test_catalog_data();
        data.armaments.swap(0, 5);

        let errors = data.validate();
        assert!(errors.iter().any(|e| e.contains("sentinel")));
        assert!(Catalog::new(data).is_err());
    }

    #[test]
    fn test_incompatible_loadout_is_reported() {
        let mut data = create_test_catalog_data();
        data.units[0].loadout = vec![5, 5];

        let errors = data.validate();
        assert!(errors.iter().any(|e| e.contains("slot 1 is utility")));
    }

    #[test]
    fn test_unknown_missile_reference_is_reported() {
        let mut data = create_test_catalog_data();
        data.missiles.clear();

        let errors = data.validate();
        assert!(errors.iter().any(|e| e.contains("unknown missile")));
    }

    #[test]
    fn test_duplicate_names_are_reported() {
        let mut data = create_test_catalog_data();
        let copy = data.units[0].clone();
        data.units.push(copy);

        let errors = data.validate();
        assert!(errors.iter().any(|e| e.contains("Duplicate unit name")));
    }

    #[test]
    fn test_parse_error_names_source() {
        let err = Catalog::from_ron_str("broken.ron", "CatalogData(").unwrap_err();
        assert!(err.to_string().contains("broken.ron"));
    }
}
