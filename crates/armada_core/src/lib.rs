//! # Armada Core
//!
//! Deterministic armament and combat resolution engine for a real-time
//! space-combat simulation.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math (uses fixed-point)
//!
//! Rendering, audio, networking and unit movement consume what a tick
//! produces (positions, headings, [`effects::EffectTrigger`]s, advisory
//! messages) but contain none of its logic.
//!
//! ## Crate Structure
//!
//! - [`data`] - Definition tables and the validated [`data::Catalog`]
//! - [`components`] - Units, slot state and ballistic sub-entities
//! - [`registry`] - Id-keyed entity storage
//! - [`armament`] - Equip, frame and fire dispatch per armament kind
//! - [`ordnance`] - Projectile, missile, mine and collectable lifecycle
//! - [`combat`] - Shared damage, disable and impulse resolution
//! - [`delayed`] - Countdown-gated actions
//! - [`effects`] - Effect triggers, advisories and the mutation log
//! - [`simulation`] - World state and the tick driver
//! - [`math`] - Fixed-point math and steering geometry

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod armament;
pub mod combat;
pub mod components;
pub mod config;
pub mod data;
pub mod delayed;
pub mod effects;
pub mod error;
pub mod math;
pub mod ordnance;
pub mod registry;
pub mod simulation;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::EngineConfig;
    pub use crate::data::{
        ArmamentBehavior, ArmamentDef, Catalog, CatalogData, SlotKind, Targeting, UnitDef, Usage,
    };
    pub use crate::effects::{Anchor, EffectId, EffectTrigger, FlashMessage, TickOutput};
    pub use crate::error::{GameError, Result};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::simulation::{Simulation, World};
}
