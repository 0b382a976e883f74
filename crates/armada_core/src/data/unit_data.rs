//! Unit hull definitions.

use serde::{Deserialize, Serialize};

use super::armament_data::SlotKind;
use crate::math::{decimal_serde, Fixed};

/// Data-driven unit (ship hull) definition.
///
/// # Example RON
///
/// ```ron
/// UnitDef(
///     name: "Corvette",
///     health: 100.0,
///     speed: 4.0,
///     energy: 10.0,
///     energy_regen: 0.02,
///     mass: 10.0,
///     radius: 8.0,
///     turn_rate: 0.08,
///     acceleration: 0.2,
///     slots: [Normal, Normal, Utility, Mine],
///     loadout: [5, 5, 2, 3],
///     cargo: 4.0,
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitDef {
    /// Unique display name.
    pub name: String,

    /// Maximum hull points.
    #[serde(with = "decimal_serde")]
    pub health: Fixed,

    /// Top speed in world units per tick.
    #[serde(with = "decimal_serde")]
    pub speed: Fixed,

    /// Energy pool maximum.
    #[serde(with = "decimal_serde")]
    pub energy: Fixed,

    /// Passive energy regeneration per tick.
    #[serde(with = "decimal_serde")]
    pub energy_regen: Fixed,

    /// Mass used to scale incoming impulses.
    #[serde(with = "decimal_serde")]
    pub mass: Fixed,

    /// Collision radius.
    #[serde(with = "decimal_serde")]
    pub radius: Fixed,

    /// Maximum heading change per tick, in radians.
    #[serde(with = "decimal_serde")]
    pub turn_rate: Fixed,

    /// Speed change per tick.
    #[serde(with = "decimal_serde")]
    pub acceleration: Fixed,

    /// Ordered equipment bays.
    pub slots: Vec<SlotKind>,

    /// Default armament index per slot. Empty means every slot starts
    /// with its empty sentinel.
    #[serde(default)]
    pub loadout: Vec<usize>,

    /// Number of visible weapon mounts, if the hull has any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardpoints: Option<u8>,

    /// Whether other units can dock with this hull.
    #[serde(default)]
    pub dockable: bool,

    /// Cargo hold capacity for mined resources.
    #[serde(default, with = "decimal_serde")]
    pub cargo: Fixed,
}

impl UnitDef {
    /// Distance needed to stop from top speed: `speed² / (2·acceleration)`.
    #[must_use]
    pub fn brake_distance(&self) -> Fixed {
        if self.acceleration <= Fixed::ZERO {
            return Fixed::MAX;
        }
        self.speed * self.speed / (self.acceleration * 2_i64)
    }

    /// Number of equipment slots.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Armament index a slot starts with.
    #[must_use]
    pub fn default_armament(&self, slot: usize) -> Option<usize> {
        let kind = self.slots.get(slot)?;
        Some(
            self.loadout
                .get(slot)
                .copied()
                .unwrap_or_else(|| kind.empty_armament()),
        )
    }
}
