//! Missile and mine definitions.

use serde::{Deserialize, Serialize};

use crate::math::{decimal_serde, Fixed};

/// What a missile does when it detonates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissileEffect {
    /// Direct damage.
    Damage {
        /// Damage per affected unit.
        #[serde(with = "decimal_serde")]
        amount: Fixed,
    },
    /// Disables affected units for a number of ticks.
    Disable {
        /// Ticks disabled.
        ticks: u32,
    },
    /// Pushes affected units away from the detonation point.
    Impulse {
        /// Impulse magnitude, divided by the target's mass.
        #[serde(with = "decimal_serde")]
        strength: Fixed,
    },
}

/// Static missile template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MissileDef {
    /// Unique display name.
    pub name: String,

    /// Speed per tick.
    #[serde(with = "decimal_serde")]
    pub speed: Fixed,

    /// Maximum heading change per tick while homing, in radians.
    #[serde(with = "decimal_serde")]
    pub turn_rate: Fixed,

    /// Collision radius.
    #[serde(with = "decimal_serde")]
    pub radius: Fixed,

    /// Ticks before the missile detonates on its own.
    pub lifetime: u32,

    /// Whether the launcher needs a target and the missile homes on it.
    #[serde(default)]
    pub guided: bool,

    /// Enlarged radius for area effects. Zero means direct hit only.
    #[serde(default, with = "decimal_serde")]
    pub blast_radius: Fixed,

    /// Detonation effect.
    pub effect: MissileEffect,
}

impl MissileDef {
    /// Whether detonation queries an area instead of the direct target.
    #[must_use]
    pub fn is_area(&self) -> bool {
        self.blast_radius > Fixed::ZERO
    }
}

/// What a mine does when it explodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MineEffect {
    /// Damage to every unit in the blast.
    Damage {
        /// Damage per affected unit.
        #[serde(with = "decimal_serde")]
        amount: Fixed,
    },
    /// Disables every unit in the blast.
    Disable {
        /// Ticks disabled.
        ticks: u32,
    },
}

/// Static mine template.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MineDef {
    /// Unique display name.
    pub name: String,

    /// Body radius.
    #[serde(with = "decimal_serde")]
    pub radius: Fixed,

    /// Ticks spent deploying, during which the mine is inert.
    pub deploy_ticks: u32,

    /// Armed lifetime in ticks.
    pub lifetime: u32,

    /// Proximity trigger radius.
    #[serde(with = "decimal_serde")]
    pub trigger_radius: Fixed,

    /// Explosion radius.
    #[serde(with = "decimal_serde")]
    pub blast_radius: Fixed,

    /// Explosion effect.
    pub effect: MineEffect,
}
