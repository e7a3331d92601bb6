use super::difficulty::DifficultyRate;
use serde::{Deserialize, Serialize};

/// Per-player tuning for computer opponents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotParams {
    pub difficulty: DifficultyRate,
    /// Search depth for the long-sighted strategy (default: 5). Stored for
    /// configuration compatibility; the current long-sighted play does not
    /// search deeper than one reply.
    pub abp_depth: u32,
}

/// Unspecified difficulty falls back to `CHOPSTICKS_BOT_DIFFICULTY`.
impl Default for BotParams {
    fn default() -> Self {
        Self {
            difficulty: DifficultyRate::from_env(),
            abp_depth: 5,
        }
    }
}

impl BotParams {
    pub fn with_difficulty(difficulty: DifficultyRate) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_difficulty_comes_from_environment() {
        let params = BotParams::default();
        assert_eq!(params.difficulty, DifficultyRate::from_env());
        assert_eq!(params.abp_depth, 5);
    }

    #[test]
    fn explicit_difficulty_overrides_environment() {
        let params = BotParams::with_difficulty(DifficultyRate::RANDOM);
        assert_eq!(params.difficulty, DifficultyRate::RANDOM);
        assert_eq!(params.abp_depth, 5);
    }
}
