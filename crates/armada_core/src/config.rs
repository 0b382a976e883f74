//! Engine tuning loaded once at startup.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{decimal_serde, Fixed};

/// Ticks per second when no config overrides it.
pub const DEFAULT_TICK_RATE: u32 = 20;

fn default_tick_rate() -> u32 {
    DEFAULT_TICK_RATE
}

fn default_min_mining_yield() -> Fixed {
    Fixed::from_bits(0x1999_999A)
}

/// Engine-wide constants.
///
/// # Example RON
///
/// ```ron
/// EngineConfig(
///     tick_rate: 20,
///     min_mining_yield: 0.1,
///     wreck_collectable: Some("Salvage"),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Simulation ticks per second.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,

    /// Smallest mining yield a shot may extract; below it the shot is
    /// rejected with an advisory.
    #[serde(default = "default_min_mining_yield", with = "decimal_serde")]
    pub min_mining_yield: Fixed,

    /// Collectable dropped where a unit is destroyed.
    #[serde(default)]
    pub wreck_collectable: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            min_mining_yield: default_min_mining_yield(),
            wreck_collectable: None,
        }
    }
}

impl EngineConfig {
    /// Parse a config from RON text.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::ConfigParse`] if the text is not a valid config.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| GameError::ConfigParse(e.to_string()))?;
        if config.tick_rate == 0 {
            return Err(GameError::ConfigParse("tick_rate must be positive".to_string()));
        }
        Ok(config)
    }

    /// Duration of one tick in milliseconds.
    #[must_use]
    pub const fn tick_duration_ms(&self) -> u32 {
        1000 / self.tick_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.tick_rate, 20);
        assert_eq!(config.tick_duration_ms(), 50);
        assert_eq!(config.min_mining_yield, Fixed::from_num(0.1));
        assert!(config.wreck_collectable.is_none());
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = EngineConfig::from_ron_str("(wreck_collectable: Some(\"Salvage\"))").unwrap();
        assert_eq!(config.tick_rate, 20);
        assert_eq!(config.wreck_collectable.as_deref(), Some("Salvage"));
    }

    #[test]
    fn test_zero_tick_rate_rejected() {
        assert!(EngineConfig::from_ron_str("(tick_rate: 0)").is_err());
    }
}
