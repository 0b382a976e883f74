//! Error types for the combat engine.
//!
//! Only setup-time operations return errors. Nothing reachable from
//! [`Simulation::advance`](crate::simulation::Simulation::advance) does: a rejected
//! fire is a silent no-op or an advisory message, never an error.

use thiserror::Error;

use crate::components::EntityId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all engine errors.
#[derive(Debug, Error)]
pub enum GameError {
    /// Catalog text could not be parsed.
    #[error("Failed to parse catalog '{source_name}': {message}")]
    CatalogParse {
        /// File name or other label for the catalog source.
        source_name: String,
        /// Parser error message.
        message: String,
    },

    /// Catalog parsed but failed cross-reference validation.
    #[error("Catalog failed validation: {}", .0.join("; "))]
    CatalogInvalid(Vec<String>),

    /// Engine configuration could not be parsed.
    #[error("Failed to parse engine config: {0}")]
    ConfigParse(String),

    /// Unknown unit definition index.
    #[error("Unknown unit definition index: {0}")]
    UnknownUnitDef(usize),

    /// Unknown armament definition index.
    #[error("Unknown armament index: {0}")]
    UnknownArmament(usize),

    /// Unknown asteroid definition index.
    #[error("Unknown asteroid definition index: {0}")]
    UnknownAsteroidDef(usize),

    /// Unknown collectable definition index.
    #[error("Unknown collectable definition index: {0}")]
    UnknownCollectableDef(usize),

    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// Slot index outside the unit's loadout.
    #[error("Unit {unit} has no slot {slot}")]
    SlotOutOfRange {
        /// Unit whose loadout was indexed.
        unit: EntityId,
        /// Requested slot index.
        slot: usize,
    },

    /// Armament kind does not fit the slot kind.
    #[error("Armament '{armament}' does not fit a {slot} slot")]
    IncompatibleSlot {
        /// Armament name.
        armament: String,
        /// Slot kind name.
        slot: String,
    },

    /// Invalid world state.
    #[error("Invalid world state: {0}")]
    InvalidState(String),
}
