mod difficulty;
mod evaluator;
mod params;
mod strategy;

pub use difficulty::{DifficultyParseError, DifficultyRate};
pub use evaluator::{Verdict, evaluate, explain};
pub use params::BotParams;
pub use strategy::{Decision, Strategy, StrategyError};
