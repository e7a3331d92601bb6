pub mod bot;
pub mod policy;

pub use bot::{
    BotParams, DifficultyParseError, DifficultyRate, Strategy, StrategyError, Verdict, evaluate,
    explain,
};
pub use policy::{ComputerPolicy, EvaluationSink, TracingSink};
