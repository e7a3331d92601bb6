use super::sink::EvaluationSink;
use crate::bot::{BotParams, Decision, StrategyError, explain};
use chopsticks_core::game::policy::{Policy, PolicyContext};
use chopsticks_core::model::moves::Candidate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Level, event};

/// Computer player: blends random and heuristic play according to its
/// difficulty rate, drawing all randomness from its own seeded generator.
pub struct ComputerPolicy {
    params: BotParams,
    rng: StdRng,
    sink: Option<Box<dyn EvaluationSink>>,
    notice: Option<String>,
}

impl ComputerPolicy {
    pub fn new(params: BotParams, seed: u64) -> Self {
        Self {
            params,
            rng: StdRng::seed_from_u64(seed),
            sink: None,
            notice: None,
        }
    }

    /// Also explain every chosen move to `sink`.
    pub fn with_sink(mut self, sink: impl EvaluationSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn params(&self) -> BotParams {
        self.params
    }

    /// Last game-over or elimination notice received, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn decide(&mut self, ctx: &PolicyContext<'_>) -> Result<Decision, StrategyError> {
        let strategy = self.params.difficulty.pick_strategy(&mut self.rng);
        let decision = strategy.choose(ctx.me, &ctx.opponents, &mut self.rng)?;

        if let Some(sink) = self.sink.as_mut() {
            match decision.verdict {
                Some(verdict) => sink.record(ctx.me, verdict, &decision.explanation),
                // Random picks were never searched.
                None => {
                    if let Some(opponent) = ctx.opponent(decision.candidate.opponent) {
                        let (verdict, note) = explain(
                            ctx.me,
                            opponent,
                            decision.candidate.hand_move,
                            &ctx.opponents,
                        )?;
                        sink.record(ctx.me, verdict, &note);
                    }
                }
            }
        }

        log_decision(ctx, &self.params, &decision);
        Ok(decision)
    }
}

impl Policy for ComputerPolicy {
    fn select_move(&mut self, ctx: &PolicyContext<'_>) -> Option<Candidate> {
        match self.decide(ctx) {
            Ok(decision) => Some(decision.candidate),
            Err(err) => {
                event!(
                    target: "chopsticks_bot::decision",
                    Level::WARN,
                    player = %ctx.me.name(),
                    turn = ctx.turn,
                    error = %err,
                    "computer player could not pick a move"
                );
                None
            }
        }
    }

    fn notify_eliminated(&mut self, reason: &str) {
        self.notice = Some(reason.to_string());
    }
}

fn log_decision(ctx: &PolicyContext<'_>, params: &BotParams, decision: &Decision) {
    if !tracing::enabled!(Level::INFO) {
        return;
    }

    let target = ctx
        .opponent(decision.candidate.opponent)
        .map(|p| p.name().to_string())
        .unwrap_or_else(|| decision.candidate.opponent.to_string());
    let verdict = decision
        .verdict
        .map(|v| v.score().to_string())
        .unwrap_or_else(|| "-".to_string());

    event!(
        target: "chopsticks_bot::decision",
        Level::INFO,
        player = %ctx.me.name(),
        turn = ctx.turn,
        difficulty = params.difficulty.value(),
        strategy = decision.strategy.as_str(),
        candidates = decision.candidates,
        opponent = %target,
        chosen = %decision.candidate.hand_move,
        verdict = %verdict,
    );
}
