use super::strategy::Strategy;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// How often a computer player looks ahead instead of guessing.
///
/// `-1` always plays at random, `0` always plays the one-ply heuristic and
/// `1` always takes the long-sighted route. Values in between blend the two
/// neighbouring strategies with a single coin flip per turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRate", into = "f64")]
pub struct DifficultyRate(f64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DifficultyParseError {
    #[error("difficulty {0:?} is neither a number nor a known level")]
    Unrecognised(String),
    #[error("difficulty {0} is outside [-1, 1]")]
    OutOfRange(String),
}

impl DifficultyRate {
    pub const RANDOM: DifficultyRate = DifficultyRate(-1.0);
    pub const SHORT_SIGHTED: DifficultyRate = DifficultyRate(0.0);
    pub const LONG_SIGHTED: DifficultyRate = DifficultyRate(1.0);

    pub fn new(rate: f64) -> Result<Self, DifficultyParseError> {
        if rate.is_finite() && (-1.0..=1.0).contains(&rate) {
            Ok(Self(rate))
        } else {
            Err(DifficultyParseError::OutOfRange(rate.to_string()))
        }
    }

    pub const fn value(self) -> f64 {
        self.0
    }

    /// Picks this turn's strategy. Fractional rates draw exactly one
    /// uniform value from `rng`; whole rates draw nothing.
    pub fn pick_strategy<R: Rng + ?Sized>(self, rng: &mut R) -> Strategy {
        let rate = self.0;
        if rate == 1.0 {
            Strategy::LongSighted
        } else if rate == 0.0 {
            Strategy::ShortSighted
        } else if rate == -1.0 {
            Strategy::Random
        } else if rate > -1.0 && rate < 0.0 {
            let draw: f64 = rng.r#gen();
            if draw <= -rate {
                Strategy::Random
            } else {
                Strategy::ShortSighted
            }
        } else if rate > 0.0 && rate < 1.0 {
            let draw: f64 = rng.r#gen();
            if draw <= rate {
                Strategy::LongSighted
            } else {
                Strategy::ShortSighted
            }
        } else {
            Strategy::Random
        }
    }

    pub fn from_env() -> Self {
        static CACHED: OnceLock<DifficultyRate> = OnceLock::new();
        *CACHED.get_or_init(|| Self::from_reader(|key| std::env::var(key).ok()))
    }

    fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        read("CHOPSTICKS_BOT_DIFFICULTY")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }
}

impl Default for DifficultyRate {
    fn default() -> Self {
        Self::LONG_SIGHTED
    }
}

impl FromStr for DifficultyRate {
    type Err = DifficultyParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "random" => return Ok(Self::RANDOM),
            "easy" | "short" => return Ok(Self::SHORT_SIGHTED),
            "hard" | "long" => return Ok(Self::LONG_SIGHTED),
            _ => {}
        }
        let rate: f64 = trimmed
            .parse()
            .map_err(|_| DifficultyParseError::Unrecognised(trimmed.to_string()))?;
        Self::new(rate)
    }
}

impl fmt::Display for DifficultyRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<DifficultyRate> for f64 {
    fn from(rate: DifficultyRate) -> Self {
        rate.0
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRate {
    Number(f64),
    Name(String),
}

impl TryFrom<RawRate> for DifficultyRate {
    type Error = DifficultyParseError;

    fn try_from(raw: RawRate) -> Result<Self, Self::Error> {
        match raw {
            RawRate::Number(rate) => Self::new(rate),
            RawRate::Name(name) => name.parse(),
        }
    }
}
