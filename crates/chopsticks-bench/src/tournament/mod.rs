mod permutations;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chopsticks_bot::{BotParams, ComputerPolicy, TracingSink};
use chopsticks_core::game::game_loop::{EndReason, Entrant, GameLoop, GameSummary};
use chopsticks_core::game::match_state::{GameError, MatchState};
use chopsticks_core::game::policy::PresentationHook;
use chopsticks_core::game::serialization::TableSnapshot;
use chopsticks_core::model::player::{PlayerId, PlayerIdAllocator};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::analytics::{AnalyticsCollector, AnalyticsError};
use crate::config::{AgentConfig, BenchmarkConfig, ResolvedOutputs};
use crate::logging::TELEMETRY_FILE;

pub use permutations::SeatPermutations;

const MAX_SEAT_PERMUTATIONS: usize = 24;
const SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Plays every configured game seed under each seat permutation.
pub struct TournamentRunner {
    config: BenchmarkConfig,
    outputs: ResolvedOutputs,
    agents: Vec<AgentBlueprint>,
    seat_permutations: SeatPermutations,
    logging_enabled: bool,
}

pub struct RunSummary {
    pub games_played: usize,
    pub permutations: usize,
    pub rows_written: usize,
    /// Games stopped by the turn limit without a winner.
    pub turn_limited: usize,
    pub jsonl_path: PathBuf,
    pub summary_path: PathBuf,
    pub telemetry_path: Option<PathBuf>,
}

impl TournamentRunner {
    pub fn new(config: BenchmarkConfig, outputs: ResolvedOutputs) -> Result<Self, RunnerError> {
        let agents = AgentBlueprint::from_configs(&config.agents)?;

        if agents.len() < 2 {
            return Err(RunnerError::SeatCount {
                found: agents.len(),
            });
        }

        if config.games.permutations > MAX_SEAT_PERMUTATIONS {
            return Err(RunnerError::PermutationLimit {
                requested: config.games.permutations,
                max: MAX_SEAT_PERMUTATIONS,
            });
        }

        let seat_permutations = SeatPermutations::new(agents.len(), config.games.permutations);

        Ok(Self {
            logging_enabled: config.logging.enable_structured,
            config,
            outputs,
            agents,
            seat_permutations,
        })
    }

    /// Runs the tournament, streaming one JSONL row per seat per game.
    pub fn run(&self) -> Result<RunSummary, RunnerError> {
        ensure_parent(self.outputs.jsonl.parent())?;
        ensure_parent(self.outputs.summary_md.parent())?;

        let mut writer = BufWriter::new(File::create(&self.outputs.jsonl)?);
        let permutations = self.seat_permutations.as_slice();
        let mut rng = StdRng::seed_from_u64(self.config.games.seed.unwrap_or(0));
        let mut rows_written = 0usize;
        let mut turn_limited = 0usize;
        let mut analytics = AnalyticsCollector::new(&self.config);

        for game_index in 0..self.config.games.count {
            let base_seed = rng.next_u64();

            for (perm_index, perm) in permutations.iter().enumerate() {
                let outcome = self.play_game(game_index, perm_index, base_seed, perm)?;
                if outcome.end_reason == EndReason::TurnLimit {
                    turn_limited += 1;
                }
                analytics.record_game(&outcome)?;
                rows_written += write_game_rows(&mut writer, &self.config, &outcome)?;
            }
        }

        writer.flush()?;

        let summary = analytics.finalize();
        summary.write_markdown(&self.outputs.summary_md)?;

        let telemetry_path = self
            .logging_enabled
            .then(|| self.outputs.report_dir().join(TELEMETRY_FILE));

        Ok(RunSummary {
            games_played: self.config.games.count,
            permutations: permutations.len(),
            rows_written,
            turn_limited,
            jsonl_path: self.outputs.jsonl.clone(),
            summary_path: self.outputs.summary_md.clone(),
            telemetry_path,
        })
    }

    fn play_game(
        &self,
        game_index: usize,
        permutation_index: usize,
        base_seed: u64,
        permutation: &[usize],
    ) -> Result<GameOutcome, RunnerError> {
        let mut ids = PlayerIdAllocator::new();
        let mut entrants = Vec::with_capacity(permutation.len());
        let mut seating = Vec::with_capacity(permutation.len());

        for (seat_idx, &agent_idx) in permutation.iter().enumerate() {
            let agent = self
                .agents
                .get(agent_idx)
                .ok_or(RunnerError::InvalidPermutation {
                    index: seat_idx,
                    agent_index: agent_idx,
                })?;
            let player = ids.computer(Some(&agent.name));
            seating.push((player.id(), agent.name.clone()));
            let policy = agent.spawn_policy(base_seed, self.config.logging.evaluation_details);
            entrants.push(Entrant::new(player, policy));
        }

        let hook = TurnLogHook {
            enabled: self.logging_enabled,
            run_id: self.config.run_id.clone(),
            game_index,
            permutation_index,
        };
        let mut game = GameLoop::new(entrants)?
            .with_turn_limit(Some(self.config.games.max_turns))
            .with_hook(hook);
        let summary = game.run()?;
        let board = TableSnapshot::capture(game.state());

        Ok(GameOutcome::assemble(
            format!("G{game_index:05}_P{permutation_index:02}"),
            game_index,
            permutation_index,
            base_seed,
            &seating,
            &summary,
            &board,
        ))
    }
}

fn ensure_parent(path: Option<&Path>) -> Result<(), RunnerError> {
    if let Some(dir) = path.filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn write_game_rows(
    writer: &mut BufWriter<File>,
    config: &BenchmarkConfig,
    outcome: &GameOutcome,
) -> Result<usize, RunnerError> {
    let seating: Vec<String> = outcome
        .seat_results
        .iter()
        .map(|seat| seat.agent_name.clone())
        .collect();

    let mut rows_written = 0usize;
    for seat in &outcome.seat_results {
        let row = GameLogRow {
            run_id: &config.run_id,
            game_id: &outcome.game_id,
            game_index: outcome.game_index,
            permutation_index: outcome.permutation_index,
            game_seed: outcome.game_seed,
            seat: seat.seat,
            agent: &seat.agent_name,
            seating: &seating,
            finish: seat.finish,
            eliminated_by: seat.eliminated_by.as_deref(),
            survival_turns: seat.survival_turns,
            final_hands: seat.final_hands,
            turns: outcome.turns,
            end_reason: end_reason_label(outcome.end_reason),
            decisions: seat.metrics.decisions,
            speed_ms_turn: seat.metrics.avg_ms_per_decision,
        };

        serde_json::to_writer(&mut *writer, &row)?;
        writer.write_all(b"\n")?;
        rows_written += 1;
    }

    Ok(rows_written)
}

fn end_reason_label(reason: EndReason) -> &'static str {
    match reason {
        EndReason::LastPlayerStanding => "last_player_standing",
        EndReason::TurnLimit => "turn_limit",
    }
}

/// Logs each completed turn when structured logging is on.
struct TurnLogHook {
    enabled: bool,
    run_id: String,
    game_index: usize,
    permutation_index: usize,
}

impl PresentationHook for TurnLogHook {
    fn on_turn(&mut self, state: &MatchState, actor: PlayerId, target: PlayerId) {
        if !self.enabled || !tracing::enabled!(Level::INFO) {
            return;
        }
        let (Some(attacker), Some(defender)) = (state.player(actor), state.player(target)) else {
            return;
        };

        event!(
            target: "chopsticks_bench::turn",
            Level::INFO,
            run_id = %self.run_id,
            game_index = self.game_index as u64,
            permutation_index = self.permutation_index as u64,
            turn = state.turn(),
            actor = %attacker.name(),
            actor_hands = %attacker.hands(),
            target = %defender.name(),
            target_hands = %defender.hands(),
            defeated = !state.is_active(target),
            remaining = state.remaining() as u64,
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Finish {
    Won,
    Eliminated,
    /// Still in the game when the turn limit hit.
    Survived,
}

pub struct GameOutcome {
    pub game_id: String,
    pub game_index: usize,
    pub permutation_index: usize,
    pub game_seed: u64,
    pub turns: u32,
    pub end_reason: EndReason,
    pub seat_results: Vec<SeatResult>,
}

pub struct SeatResult {
    pub agent_name: String,
    pub seat: usize,
    pub finish: Finish,
    pub eliminated_by: Option<String>,
    /// Turn of elimination, or the full game length for survivors.
    pub survival_turns: u32,
    /// Number of opponents this seat eliminated.
    pub eliminations: u32,
    pub final_hands: (u8, u8),
    pub metrics: DecisionSummary,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionSummary {
    pub decisions: u32,
    pub avg_ms_per_decision: f64,
    pub total_ms: f64,
}

impl GameOutcome {
    fn assemble(
        game_id: String,
        game_index: usize,
        permutation_index: usize,
        game_seed: u64,
        seating: &[(PlayerId, String)],
        summary: &GameSummary,
        board: &TableSnapshot,
    ) -> Self {
        let agent_of = |id: PlayerId| {
            seating
                .iter()
                .find(|(pid, _)| *pid == id)
                .map(|(_, name)| name.clone())
        };

        let seat_results = seating
            .iter()
            .enumerate()
            .map(|(seat, (id, agent_name))| {
                let elimination = summary.eliminations.iter().find(|e| e.player == *id);
                let finish = match (elimination, summary.winner) {
                    (Some(_), _) => Finish::Eliminated,
                    (None, Some(winner)) if winner == *id => Finish::Won,
                    _ => Finish::Survived,
                };
                let final_hands = board
                    .seats
                    .iter()
                    .find(|s| s.id == *id)
                    .map(|s| (s.left, s.right))
                    .unwrap_or((0, 0));
                let metrics = summary
                    .decisions
                    .iter()
                    .find(|(pid, _)| pid == id)
                    .map(|(_, stats)| DecisionSummary {
                        decisions: stats.decisions,
                        avg_ms_per_decision: stats.avg_ms(),
                        total_ms: stats.thinking.as_secs_f64() * 1000.0,
                    })
                    .unwrap_or_default();

                SeatResult {
                    agent_name: agent_name.clone(),
                    seat,
                    finish,
                    eliminated_by: elimination.and_then(|e| agent_of(e.by)),
                    survival_turns: elimination.map_or(summary.turns, |e| e.turn),
                    eliminations: summary
                        .eliminations
                        .iter()
                        .filter(|e| e.by == *id)
                        .count() as u32,
                    final_hands,
                    metrics,
                }
            })
            .collect();

        Self {
            game_id,
            game_index,
            permutation_index,
            game_seed,
            turns: summary.turns,
            end_reason: summary.end_reason,
            seat_results,
        }
    }
}

#[derive(Serialize)]
struct GameLogRow<'a> {
    run_id: &'a str,
    game_id: &'a str,
    game_index: usize,
    permutation_index: usize,
    game_seed: u64,
    seat: usize,
    agent: &'a str,
    seating: &'a [String],
    finish: Finish,
    #[serde(skip_serializing_if = "Option::is_none")]
    eliminated_by: Option<&'a str>,
    survival_turns: u32,
    final_hands: (u8, u8),
    turns: u32,
    end_reason: &'static str,
    decisions: u32,
    speed_ms_turn: f64,
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{0}")]
    Agent(#[from] AgentError),
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("failed to serialize log row: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
    #[error("game execution failed: {0}")]
    Game(#[from] GameError),
    #[error("a tournament needs at least 2 agents but found {found}")]
    SeatCount { found: usize },
    #[error("requested {requested} seat permutations exceeds maximum of {max}")]
    PermutationLimit { requested: usize, max: usize },
    #[error("permutation index {index} references invalid agent index {agent_index}")]
    InvalidPermutation { index: usize, agent_index: usize },
    #[error("analytics error: {0}")]
    Analytics(#[from] AnalyticsError),
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid computer parameter for agent '{name}': {message}")]
    InvalidParam { name: String, message: String },
}

struct AgentBlueprint {
    name: String,
    params: BotParams,
    seed_salt: u64,
}

impl AgentBlueprint {
    fn from_configs(configs: &[AgentConfig]) -> Result<Vec<Self>, AgentError> {
        configs
            .iter()
            .enumerate()
            .map(|(idx, config)| Self::from_config(idx, config))
            .collect()
    }

    fn from_config(index: usize, config: &AgentConfig) -> Result<Self, AgentError> {
        if config.params.abp_depth == 0 {
            return Err(AgentError::InvalidParam {
                name: config.name.clone(),
                message: "abp_depth must be at least 1".to_string(),
            });
        }

        Ok(Self {
            name: config.name.clone(),
            params: config.params,
            seed_salt: (index as u64 + 1).wrapping_mul(SEED_SALT),
        })
    }

    /// Same agent, same game seed, same random stream in every seat.
    fn spawn_policy(&self, game_seed: u64, evaluation_details: bool) -> ComputerPolicy {
        let policy = ComputerPolicy::new(self.params, game_seed ^ self.seed_salt);
        if evaluation_details {
            policy.with_sink(TracingSink)
        } else {
            policy
        }
    }
}
