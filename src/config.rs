use thiserror::Error;

pub const DEFAULT_DIMENSION: usize = 4;
pub const DEFAULT_THRESHOLD: u32 = 2048;

/// Largest accepted winning threshold. Tiles must be able to double it once more.
pub const MAX_THRESHOLD: u32 = 1 << 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("board dimension must be at least 2, got {0}")]
    DimensionTooSmall(usize),

    #[error(
        "winning threshold must be a power of two between 2 and {max}, got {0}",
        max = MAX_THRESHOLD
    )]
    InvalidThreshold(u32),
}

/// Construction inputs of a game. Persisting them between sessions is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    /// Side length of the square board.
    pub dimension: usize,
    /// Smallest tile value that wins the game.
    pub threshold: u32,
    pub initial_highest_score: u64,
}

impl GameConfig {
    pub fn new(dimension: usize, threshold: u32, initial_highest_score: u64) -> Self {
        Self {
            dimension,
            threshold,
            initial_highest_score,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dimension < 2 {
            return Err(ConfigError::DimensionTooSmall(self.dimension));
        }
        if !(2..=MAX_THRESHOLD).contains(&self.threshold) || !self.threshold.is_power_of_two() {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }

        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION, DEFAULT_THRESHOLD, 0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_small_dimension() {
        let config = GameConfig::new(1, 2048, 0);
        assert_eq!(config.validate(), Err(ConfigError::DimensionTooSmall(1)));
    }

    #[test]
    fn test_rejects_bad_threshold() {
        for threshold in [0, 1, 3, 2000, 1 << 31] {
            let config = GameConfig::new(4, threshold, 0);
            assert_eq!(
                config.validate(),
                Err(ConfigError::InvalidThreshold(threshold))
            );
        }

        assert!(GameConfig::new(3, 64, 10).validate().is_ok());
        assert!(GameConfig::new(8, MAX_THRESHOLD, 0).validate().is_ok());
    }

    #[test]
    fn test_error_message() {
        let err = GameConfig::new(0, 2048, 0).validate().unwrap_err();
        assert_eq!(err.to_string(), "board dimension must be at least 2, got 0");
    }
}
