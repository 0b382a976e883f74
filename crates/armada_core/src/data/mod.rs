//! Definition tables.
//!
//! Pure data structures describing every unit hull, armament, missile,
//! mine, asteroid and collectable the engine knows about. All structs are
//! designed to be deserialized from RON files and are immutable once the
//! [`Catalog`] has been built.
//!
//! **Note:** This module contains no IO - it only defines data types and
//! parses text handed to it. Reading files is the caller's job.

mod armament_data;
mod catalog;
mod field_data;
mod ordnance_data;
mod unit_data;

pub use armament_data::{
    ArmamentBehavior, ArmamentDef, Burst, SlotKind, Targeting, Usage, SENTINEL_COUNT,
};
pub use catalog::{Catalog, CatalogData};
pub use field_data::{AsteroidDef, CollectableDef, Reward};
pub use ordnance_data::{MineDef, MineEffect, MissileDef, MissileEffect};
pub use unit_data::UnitDef;
