//! Armament definitions: weapons, utilities and mine layers.

use serde::{Deserialize, Serialize};

use crate::math::{decimal_serde, Fixed};

/// Equipment bay kind. An armament only fits a slot of its own kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKind {
    /// Standard weapon bay.
    Normal,
    /// Utility bay (cloaks, reactors, repair systems).
    Utility,
    /// Mine rack.
    Mine,
    /// Heavy weapon bay.
    Large,
    /// Mining equipment bay.
    Mining,
}

impl SlotKind {
    /// Every slot kind, in sentinel order.
    pub const ALL: [SlotKind; 5] = [
        SlotKind::Normal,
        SlotKind::Utility,
        SlotKind::Mine,
        SlotKind::Large,
        SlotKind::Mining,
    ];

    /// Index of the empty-slot sentinel armament for this kind.
    ///
    /// Armament indices 0..=4 are reserved for the five sentinels.
    #[must_use]
    pub const fn empty_armament(self) -> usize {
        match self {
            SlotKind::Normal => 0,
            SlotKind::Utility => 1,
            SlotKind::Mine => 2,
            SlotKind::Large => 3,
            SlotKind::Mining => 4,
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            SlotKind::Normal => "normal",
            SlotKind::Utility => "utility",
            SlotKind::Mine => "mine",
            SlotKind::Large => "large",
            SlotKind::Mining => "mining",
        }
    }
}

/// Number of reserved empty-slot sentinel armaments.
pub const SENTINEL_COUNT: usize = SlotKind::ALL.len();

/// Resource an armament consumes when fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Usage {
    /// Consumes nothing (sentinels, passive systems).
    #[default]
    Empty,
    /// Consumes `cost` energy per fire.
    Energy,
    /// Consumes one round of ammunition per fire.
    Ammo,
}

/// Whether firing needs a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Targeting {
    /// Cannot be fired.
    #[default]
    Empty,
    /// Needs a target object.
    Targeted,
    /// Fires without a target.
    Untargeted,
}

/// Area burst run when a projectile ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Burst {
    /// Burst radius.
    #[serde(with = "decimal_serde")]
    pub radius: Fixed,
    /// Damage dealt to every opposing unit in the radius.
    #[serde(with = "decimal_serde")]
    pub damage: Fixed,
}

/// Closed set of armament behaviours.
///
/// Each variant carries the parameters its equip, frame and fire logic
/// reads; dispatch lives in [`crate::armament`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArmamentBehavior {
    /// Empty slot sentinel. Inert.
    Empty,
    /// Fires a short-lived projectile along the unit heading.
    Cannon {
        /// Damage on direct hit.
        #[serde(with = "decimal_serde")]
        damage: Fixed,
        /// Projectile speed per tick.
        #[serde(with = "decimal_serde")]
        speed: Fixed,
        /// Projectile collision radius.
        #[serde(with = "decimal_serde")]
        radius: Fixed,
        /// Ticks before the projectile expires.
        lifetime: u32,
        /// Optional burst on expiry or hit.
        #[serde(default)]
        burst: Option<Burst>,
    },
    /// Instant direct-damage beam against a unit.
    Laser {
        /// Damage per shot.
        #[serde(with = "decimal_serde")]
        damage: Fixed,
        /// Maximum reach, measured to the target's hull.
        #[serde(with = "decimal_serde")]
        range: Fixed,
    },
    /// Launches a missile from the missile table.
    MissileLauncher {
        /// Missile definition index.
        missile: usize,
    },
    /// Drops a mine from the mine table.
    MineLayer {
        /// Mine definition index.
        mine: usize,
    },
    /// Extracts resources from an asteroid into the cargo hold.
    MiningLaser {
        /// Resources extracted per shot from a difficulty-1 asteroid.
        #[serde(with = "decimal_serde")]
        output: Fixed,
        /// Maximum reach, measured to the asteroid's surface.
        #[serde(with = "decimal_serde")]
        range: Fixed,
    },
    /// Latches onto units and pulls them towards the owner every tick.
    Tractor {
        /// Maximum reach, measured to the target's hull.
        #[serde(with = "decimal_serde")]
        range: Fixed,
        /// Impulse applied to each target per tick.
        #[serde(with = "decimal_serde")]
        strength: Fixed,
        /// Maximum simultaneous targets.
        max_targets: usize,
        /// Ticks a target stays latched.
        hold: u32,
        /// Energy drained per target per tick.
        #[serde(with = "decimal_serde")]
        drain: Fixed,
    },
    /// Toggled cloak with a passive energy drain while active.
    Cloak {
        /// Energy drained per tick while active.
        #[serde(with = "decimal_serde")]
        drain: Fixed,
    },
    /// Passive hull regeneration paid for with energy.
    HullRepair {
        /// Health restored per tick.
        #[serde(with = "decimal_serde")]
        rate: Fixed,
        /// Energy spent per point of health restored.
        #[serde(with = "decimal_serde")]
        energy_per_point: Fixed,
    },
    /// Passive energy generator.
    Reactor {
        /// Energy produced per tick.
        #[serde(with = "decimal_serde")]
        output: Fixed,
    },
    /// Consumable thrust burst along the heading.
    Booster {
        /// Impulse applied per active tick.
        #[serde(with = "decimal_serde")]
        impulse: Fixed,
        /// Ticks the burst lasts.
        duration: u32,
    },
    /// Transfers energy to a friendly unit.
    EnergyTransfer {
        /// Energy moved per shot.
        #[serde(with = "decimal_serde")]
        amount: Fixed,
        /// Maximum reach, measured to the target's hull.
        #[serde(with = "decimal_serde")]
        range: Fixed,
    },
    /// Charges a wide-area pulse that detonates after a delay.
    PulseEmitter {
        /// Ticks between firing and detonation.
        delay: u32,
        /// Detonation radius around the firing position.
        #[serde(with = "decimal_serde")]
        radius: Fixed,
        /// Damage dealt to every opposing unit in the radius.
        #[serde(with = "decimal_serde")]
        damage: Fixed,
    },
}

impl ArmamentBehavior {
    /// Short tag naming the behaviour, for logs and validation messages.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            ArmamentBehavior::Empty => "empty",
            ArmamentBehavior::Cannon { .. } => "cannon",
            ArmamentBehavior::Laser { .. } => "laser",
            ArmamentBehavior::MissileLauncher { .. } => "missile_launcher",
            ArmamentBehavior::MineLayer { .. } => "mine_layer",
            ArmamentBehavior::MiningLaser { .. } => "mining_laser",
            ArmamentBehavior::Tractor { .. } => "tractor",
            ArmamentBehavior::Cloak { .. } => "cloak",
            ArmamentBehavior::HullRepair { .. } => "hull_repair",
            ArmamentBehavior::Reactor { .. } => "reactor",
            ArmamentBehavior::Booster { .. } => "booster",
            ArmamentBehavior::EnergyTransfer { .. } => "energy_transfer",
            ArmamentBehavior::PulseEmitter { .. } => "pulse_emitter",
        }
    }
}

/// Static template for one equippable item.
///
/// # Example RON
///
/// ```ron
/// ArmamentDef(
///     name: "Pulse Laser",
///     slot: Normal,
///     usage: Energy,
///     targeted: Targeted,
///     cost: 0.5,
///     tier: 1,
///     reload: 10,
///     behavior: Laser(damage: 6.0, range: 120.0),
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArmamentDef {
    /// Unique display name.
    pub name: String,

    /// Slot kind this armament fits.
    pub slot: SlotKind,

    /// Resource consumed per fire.
    #[serde(default)]
    pub usage: Usage,

    /// Whether firing needs a target.
    #[serde(default)]
    pub targeted: Targeting,

    /// Energy cost per fire (for [`Usage::Energy`] and toggles).
    #[serde(default, with = "decimal_serde")]
    pub cost: Fixed,

    /// Tech tier (0 for sentinels).
    #[serde(default)]
    pub tier: u8,

    /// Purchase price.
    #[serde(default)]
    pub price: u32,

    /// Magazine size for [`Usage::Ammo`] armaments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ammo: Option<u32>,

    /// Ticks that must elapse after a fire before the next one.
    #[serde(default)]
    pub reload: u32,

    /// Equip, frame and fire behaviour.
    pub behavior: ArmamentBehavior,
}

impl ArmamentDef {
    /// Build an empty-slot sentinel for `slot`.
    #[must_use]
    pub fn sentinel(slot: SlotKind) -> Self {
        Self {
            name: format!("Empty {} slot", slot.name()),
            slot,
            usage: Usage::Empty,
            targeted: Targeting::Empty,
            cost: Fixed::ZERO,
            tier: 0,
            price: 0,
            max_ammo: None,
            reload: 0,
            behavior: ArmamentBehavior::Empty,
        }
    }

    /// Whether this is an inert empty-slot sentinel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.behavior, ArmamentBehavior::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_indices_are_distinct() {
        let mut indices: Vec<usize> = SlotKind::ALL.iter().map(|k| k.empty_armament()).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_sentinel_is_inert() {
        let sentinel = ArmamentDef::sentinel(SlotKind::Mine);
        assert!(sentinel.is_empty());
        assert_eq!(sentinel.usage, Usage::Empty);
        assert_eq!(sentinel.targeted, Targeting::Empty);
        assert_eq!(sentinel.slot, SlotKind::Mine);
        assert_eq!(sentinel.behavior.tag(), "empty");
    }

    #[test]
    fn test_behavior_parses_from_ron() {
        let text = "Laser(damage: 6.0, range: 120.5)";
        let behavior: ArmamentBehavior = ron::from_str(text).unwrap();
        assert_eq!(
            behavior,
            ArmamentBehavior::Laser {
                damage: Fixed::from_num(6),
                range: Fixed::from_num(120.5),
            }
        );
        assert_eq!(behavior.tag(), "laser");
    }
}
