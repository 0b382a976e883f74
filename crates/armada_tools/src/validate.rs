//! Data validation utilities.
//!
//! A data directory holds `catalog.ron` and, optionally, `engine.ron`.
//! Validation parses both, runs the catalog's cross-reference checks and
//! checks the config against the catalog.

use std::path::Path;

use armada_core::config::EngineConfig;
use armada_core::data::Catalog;
use armada_core::error::GameError;

use crate::error::{read_text, ToolResult};

/// Catalog file name inside a data directory.
pub const CATALOG_FILE: &str = "catalog.ron";
/// Engine config file name inside a data directory.
pub const ENGINE_FILE: &str = "engine.ron";

/// Table sizes of a validated data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationSummary {
    /// Hull definitions.
    pub units: usize,
    /// Armament definitions, sentinels included.
    pub armaments: usize,
    /// Missile definitions.
    pub missiles: usize,
    /// Mine definitions.
    pub mines: usize,
    /// Asteroid definitions.
    pub asteroids: usize,
    /// Collectable definitions.
    pub collectables: usize,
}

/// Load and validate the catalog in `dir`.
pub fn load_catalog(dir: &Path) -> ToolResult<Catalog> {
    let path = dir.join(CATALOG_FILE);
    let text = read_text(&path)?;
    Ok(Catalog::from_ron_str(&path.display().to_string(), &text)?)
}

/// Load the engine config in `dir`, falling back to defaults when the
/// file is absent.
pub fn load_config(dir: &Path) -> ToolResult<EngineConfig> {
    let path = dir.join(ENGINE_FILE);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No engine config, using defaults");
        return Ok(EngineConfig::default());
    }
    let text = read_text(&path)?;
    Ok(EngineConfig::from_ron_str(&text)?)
}

/// Check config references that only make sense against a catalog.
pub fn check_config(config: &EngineConfig, catalog: &Catalog) -> ToolResult<()> {
    if let Some(name) = &config.wreck_collectable {
        if catalog.collectable_index(name).is_none() {
            return Err(GameError::ConfigParse(format!(
                "wreck_collectable '{name}' is not in the catalog"
            ))
            .into());
        }
    }
    Ok(())
}

/// Validate all RON data files in a directory.
///
/// # Errors
///
/// Returns an error if any data file is missing, fails to parse or fails
/// validation.
pub fn validate_data_directory(dir: &Path) -> ToolResult<ValidationSummary> {
    let catalog = load_catalog(dir)?;
    let config = load_config(dir)?;
    check_config(&config, &catalog)?;

    let data = catalog.data();
    let summary = ValidationSummary {
        units: data.units.len(),
        armaments: data.armaments.len(),
        missiles: data.missiles.len(),
        mines: data.mines.len(),
        asteroids: data.asteroids.len(),
        collectables: data.collectables.len(),
    };
    tracing::info!(?summary, tick_rate = config.tick_rate, "Data directory valid");
    Ok(summary)
}
