use serde::{Deserialize, Serialize};

use crate::{ConfigError, core::piece::PieceKind};

use super::piece_factory::SpawnPolicy;

/// Board shape and spawn rules.
///
/// Missing fields take their defaults when deserialized, so `{}` is a valid
/// configuration for an 8×8 board with 5 kinds.
///
/// # Example
///
/// ```
/// use matchfall_engine::{BoardConfig, SpawnPolicy};
///
/// let config: BoardConfig =
///     serde_json::from_str(r#"{ "width": 6, "spawn_policy": "avoid-matches" }"#).unwrap();
/// assert_eq!(config.width, 6);
/// assert_eq!(config.height, 8);
/// assert_eq!(config.spawn_policy, SpawnPolicy::AvoidMatches);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub width: usize,
    pub height: usize,
    pub num_kinds: u8,
    pub spawn_policy: SpawnPolicy,
    /// Cascade rounds a single resolve call may run before it is aborted.
    pub max_cascade_rounds: usize,
}

impl BoardConfig {
    pub const MAX_DIMENSION: usize = 64;
    /// Fewer kinds cannot guarantee a match-free initial fill.
    pub const MIN_KINDS: u8 = 3;

    #[must_use]
    pub const fn new(width: usize, height: usize, num_kinds: u8) -> Self {
        Self {
            width,
            height,
            num_kinds,
            spawn_policy: SpawnPolicy::Uniform,
            max_cascade_rounds: 64,
        }
    }

    #[must_use]
    pub const fn with_spawn_policy(mut self, spawn_policy: SpawnPolicy) -> Self {
        self.spawn_policy = spawn_policy;
        self
    }

    #[must_use]
    pub const fn with_max_cascade_rounds(mut self, max_cascade_rounds: usize) -> Self {
        self.max_cascade_rounds = max_cascade_rounds;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let dimension_range = 1..=Self::MAX_DIMENSION;
        if !dimension_range.contains(&self.width) || !dimension_range.contains(&self.height) {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
                max: Self::MAX_DIMENSION,
            });
        }
        if !(Self::MIN_KINDS..=PieceKind::MAX_KINDS).contains(&self.num_kinds) {
            return Err(ConfigError::InvalidKindCount {
                num_kinds: self.num_kinds,
                min: Self::MIN_KINDS,
                max: PieceKind::MAX_KINDS,
            });
        }
        if self.max_cascade_rounds == 0 {
            return Err(ConfigError::ZeroCascadeLimit);
        }
        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::new(8, 8, 5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(BoardConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_dimensions() {
        for (width, height) in [(0, 5), (5, 0), (65, 5), (5, 65)] {
            let err = BoardConfig::new(width, height, 5).validate().unwrap_err();
            assert!(matches!(err, ConfigError::InvalidDimensions { .. }), "{width}x{height}");
        }
        assert!(BoardConfig::new(1, 64, 5).validate().is_ok());
    }

    #[test]
    fn test_invalid_kind_count() {
        assert!(BoardConfig::new(5, 5, 2).validate().is_err());
        assert!(BoardConfig::new(5, 5, 27).validate().is_err());
        assert!(BoardConfig::new(5, 5, 3).validate().is_ok());
        assert!(BoardConfig::new(5, 5, 26).validate().is_ok());
    }

    #[test]
    fn test_zero_cascade_limit() {
        let err = BoardConfig::default()
            .with_max_cascade_rounds(0)
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroCascadeLimit);
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: BoardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BoardConfig::default());

        let config: BoardConfig =
            serde_json::from_str(r#"{"num_kinds": 6, "max_cascade_rounds": 10}"#).unwrap();
        assert_eq!(config.num_kinds, 6);
        assert_eq!(config.max_cascade_rounds, 10);
        assert_eq!(config.spawn_policy, SpawnPolicy::Uniform);
    }
}
