//! Asteroid and collectable definitions.

use serde::{Deserialize, Serialize};

use crate::math::{decimal_serde, Fixed};

/// Static asteroid template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AsteroidDef {
    /// Unique display name.
    pub name: String,

    /// Body radius.
    #[serde(with = "decimal_serde")]
    pub radius: Fixed,

    /// Starting resource amount.
    #[serde(with = "decimal_serde")]
    pub resources: Fixed,

    /// Yield divisor applied to mining lasers. Must be positive.
    #[serde(with = "decimal_serde")]
    pub difficulty: Fixed,
}

/// What a unit receives when it picks up a collectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reward {
    /// Energy, capped at the unit's maximum.
    Energy {
        /// Amount granted.
        #[serde(with = "decimal_serde")]
        amount: Fixed,
    },
    /// Health, capped at the unit's maximum.
    Health {
        /// Amount granted.
        #[serde(with = "decimal_serde")]
        amount: Fixed,
    },
    /// Rounds added to every ammunition slot, capped at each magazine.
    Ammo {
        /// Rounds per slot.
        rounds: u32,
    },
    /// Resources added to the cargo hold, capped at capacity.
    Cargo {
        /// Amount granted.
        #[serde(with = "decimal_serde")]
        amount: Fixed,
    },
}

/// Static collectable template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectableDef {
    /// Unique display name.
    pub name: String,

    /// Pickup radius.
    #[serde(with = "decimal_serde")]
    pub radius: Fixed,

    /// Ticks before the collectable disappears.
    pub lifetime: u32,

    /// Pickup reward.
    pub reward: Reward,
}
