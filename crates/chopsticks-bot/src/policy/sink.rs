use crate::bot::Verdict;
use chopsticks_core::model::player::Player;
use tracing::{Level, event};

/// Receives the evaluator's reasoning for each move a computer player makes.
pub trait EvaluationSink: Send {
    fn record(&mut self, player: &Player, verdict: Verdict, explanation: &str);
}

/// Forwards evaluations to `tracing` at DEBUG.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EvaluationSink for TracingSink {
    fn record(&mut self, player: &Player, verdict: Verdict, explanation: &str) {
        event!(
            target: "chopsticks_bot::evaluation",
            Level::DEBUG,
            player = %player.name(),
            verdict = verdict.score(),
            explanation,
            "{} evaluation is {}",
            player.name(),
            verdict
        );
    }
}
