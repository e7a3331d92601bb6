use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use thiserror::Error;

use crate::config::BenchmarkConfig;
use crate::tournament::{Finish, GameOutcome};

const CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("agent '{0}' appears in results but not in the configuration")]
    UnknownAgent(String),
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Folds per-seat game results into per-agent totals.
pub struct AnalyticsCollector {
    agents: HashMap<String, AgentAccumulator>,
    agent_order: Vec<String>,
    latency_budget_ms: u64,
    games: usize,
    turn_limited: usize,
    total_turns: u64,
}

impl AnalyticsCollector {
    pub fn new(config: &BenchmarkConfig) -> Self {
        let mut agents = HashMap::new();
        let mut order = Vec::new();
        for agent in &config.agents {
            agents.insert(
                agent.name.clone(),
                AgentAccumulator::new(agent.name.clone(), agent.params.difficulty.value()),
            );
            order.push(agent.name.clone());
        }

        Self {
            agents,
            agent_order: order,
            latency_budget_ms: config.metrics.latency_budget_ms,
            games: 0,
            turn_limited: 0,
            total_turns: 0,
        }
    }

    pub fn record_game(&mut self, outcome: &GameOutcome) -> Result<(), AnalyticsError> {
        for seat in &outcome.seat_results {
            let acc = self
                .agents
                .get_mut(&seat.agent_name)
                .ok_or_else(|| AnalyticsError::UnknownAgent(seat.agent_name.clone()))?;
            acc.games += 1;
            match seat.finish {
                Finish::Won => acc.wins += 1,
                Finish::Survived => acc.survived += 1,
                Finish::Eliminated => {}
            }
            acc.eliminations += u64::from(seat.eliminations);
            acc.survival_turns += u64::from(seat.survival_turns);
            acc.total_latency_ms += seat.metrics.total_ms;
            acc.total_decisions += u64::from(seat.metrics.decisions);
        }

        self.games += 1;
        self.total_turns += u64::from(outcome.turns);
        if outcome
            .seat_results
            .iter()
            .all(|seat| seat.finish != Finish::Won)
        {
            self.turn_limited += 1;
        }
        Ok(())
    }

    pub fn finalize(mut self) -> AnalyticsSummary {
        let z = confidence_z();
        let budget = self.latency_budget_ms;
        let agents = self
            .agent_order
            .iter()
            .filter_map(|name| self.agents.remove(name))
            .map(|acc| acc.into_report(z, budget))
            .collect();

        let avg_game_turns = if self.games == 0 {
            0.0
        } else {
            self.total_turns as f64 / self.games as f64
        };

        AnalyticsSummary {
            agents,
            games: self.games,
            turn_limited: self.turn_limited,
            avg_game_turns,
            latency_budget_ms: self.latency_budget_ms,
        }
    }
}

struct AgentAccumulator {
    name: String,
    difficulty: f64,
    games: u64,
    wins: u64,
    survived: u64,
    eliminations: u64,
    survival_turns: u64,
    total_latency_ms: f64,
    total_decisions: u64,
}

impl AgentAccumulator {
    fn new(name: String, difficulty: f64) -> Self {
        Self {
            name,
            difficulty,
            games: 0,
            wins: 0,
            survived: 0,
            eliminations: 0,
            survival_turns: 0,
            total_latency_ms: 0.0,
            total_decisions: 0,
        }
    }

    fn into_report(self, z: f64, latency_budget_ms: u64) -> AgentReport {
        let games = self.games as f64;
        let per_game = |total: u64| if self.games == 0 { 0.0 } else { total as f64 / games };
        let avg_latency = if self.total_decisions == 0 {
            0.0
        } else {
            self.total_latency_ms / self.total_decisions as f64
        };

        AgentReport {
            name: self.name.clone(),
            difficulty: self.difficulty,
            games: self.games,
            wins: self.wins,
            survived: self.survived,
            win_rate: per_game(self.wins),
            ci95: wilson_interval(self.wins, self.games, z),
            avg_survival_turns: per_game(self.survival_turns),
            eliminations_per_game: per_game(self.eliminations),
            average_ms_per_decision: avg_latency,
            over_budget: avg_latency > latency_budget_ms as f64,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentReport {
    pub name: String,
    pub difficulty: f64,
    pub games: u64,
    pub wins: u64,
    pub survived: u64,
    pub win_rate: f64,
    pub ci95: (f64, f64),
    pub avg_survival_turns: f64,
    pub eliminations_per_game: f64,
    pub average_ms_per_decision: f64,
    #[serde(skip)]
    pub over_budget: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyticsSummary {
    pub agents: Vec<AgentReport>,
    pub games: usize,
    pub turn_limited: usize,
    pub avg_game_turns: f64,
    pub latency_budget_ms: u64,
}

impl AnalyticsSummary {
    pub fn write_markdown(&self, path: impl AsRef<Path>) -> Result<(), AnalyticsError> {
        let mut out = String::new();
        out.push_str("# Tournament Summary\n\n");
        let _ = writeln!(
            out,
            "Games: {} ({} hit the turn limit), average length {:.1} turns\n",
            self.games, self.turn_limited, self.avg_game_turns
        );
        let _ = writeln!(
            out,
            "Latency budget: {} ms average per decision\n",
            self.latency_budget_ms
        );
        out.push_str("| Agent | Difficulty | Games | Wins | Win % | 95% CI | Survived | Avg survival turns | Kills/game | Avg ms/decision | Over Budget |\n");
        out.push_str("|-------|------------|-------|------|-------|--------|----------|--------------------|------------|-----------------|-------------|\n");

        for agent in &self.agents {
            let _ = writeln!(
                out,
                "| {name} | {difficulty:+.2} | {games} | {wins} | {win:.1}% | [{ci_low:.1}%, {ci_high:.1}%] | {survived} | {survival:.1} | {kills:.2} | {latency:.3} | {over_budget} |",
                name = agent.name,
                difficulty = agent.difficulty,
                games = agent.games,
                wins = agent.wins,
                win = agent.win_rate * 100.0,
                ci_low = agent.ci95.0 * 100.0,
                ci_high = agent.ci95.1 * 100.0,
                survived = agent.survived,
                survival = agent.avg_survival_turns,
                kills = agent.eliminations_per_game,
                latency = agent.average_ms_per_decision,
                over_budget = if agent.over_budget { "Yes" } else { "No" },
            );
        }

        fs::write(path.as_ref(), out).map_err(|source| AnalyticsError::Io {
            context: "writing summary markdown",
            source,
        })
    }
}

/// Two-sided normal quantile for the configured confidence level.
fn confidence_z() -> f64 {
    Normal::new(0.0, 1.0)
        .map(|normal| normal.inverse_cdf(0.5 + CONFIDENCE_LEVEL / 2.0))
        .unwrap_or(1.96)
}

/// Wilson score interval for `wins` successes out of `trials`.
fn wilson_interval(wins: u64, trials: u64, z: f64) -> (f64, f64) {
    if trials == 0 {
        return (0.0, 0.0);
    }
    let n = trials as f64;
    let p = wins as f64 / n;
    let z2 = z * z;
    let denom = 1.0 + z2 / n;
    let center = (p + z2 / (2.0 * n)) / denom;
    let margin = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denom;
    ((center - margin).max(0.0), (center + margin).min(1.0))
}
