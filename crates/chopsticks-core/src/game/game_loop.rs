use crate::game::match_state::{Elimination, GameError, MatchState, TurnOutcome};
use crate::game::policy::{NoopHook, Policy, PolicyContext, PresentationHook};
use crate::model::player::{Player, PlayerId};
use std::time::{Duration, Instant};

/// A player joining the table together with whatever picks its moves.
pub struct Entrant {
    pub player: Player,
    pub policy: Box<dyn Policy>,
}

impl Entrant {
    pub fn new(player: Player, policy: impl Policy + 'static) -> Self {
        Self {
            player,
            policy: Box::new(policy),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    LastPlayerStanding,
    TurnLimit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecisionStats {
    pub decisions: u32,
    pub thinking: Duration,
}

impl DecisionStats {
    fn record(&mut self, elapsed: Duration) {
        self.decisions += 1;
        self.thinking += elapsed;
    }

    pub fn avg_ms(&self) -> f64 {
        if self.decisions == 0 {
            0.0
        } else {
            self.thinking.as_secs_f64() * 1000.0 / f64::from(self.decisions)
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameSummary {
    pub winner: Option<PlayerId>,
    pub eliminations: Vec<Elimination>,
    pub turns: u32,
    pub end_reason: EndReason,
    pub decisions: Vec<(PlayerId, DecisionStats)>,
}

struct Contestant {
    id: PlayerId,
    policy: Box<dyn Policy>,
    stats: DecisionStats,
    notified: bool,
}

impl Contestant {
    fn notify(&mut self, reason: &str) {
        if !self.notified {
            self.notified = true;
            self.policy.notify_eliminated(reason);
        }
    }
}

/// Drives turns until one player is left (or the optional turn limit hits).
pub struct GameLoop {
    state: MatchState,
    contestants: Vec<Contestant>,
    hook: Box<dyn PresentationHook>,
    turn_limit: Option<u32>,
}

impl GameLoop {
    pub fn new(entrants: Vec<Entrant>) -> Result<Self, GameError> {
        let (players, policies): (Vec<Player>, Vec<Box<dyn Policy>>) = entrants
            .into_iter()
            .map(|entrant| (entrant.player, entrant.policy))
            .unzip();
        let ids: Vec<PlayerId> = players.iter().map(Player::id).collect();
        let state = MatchState::new(players)?;

        let mut contestants: Vec<Contestant> = Vec::with_capacity(state.remaining());
        for (id, policy) in ids.into_iter().zip(policies) {
            if state.is_active(id) && !contestants.iter().any(|c| c.id == id) {
                contestants.push(Contestant {
                    id,
                    policy,
                    stats: DecisionStats::default(),
                    notified: false,
                });
            }
        }

        Ok(Self {
            state,
            contestants,
            hook: Box::new(NoopHook),
            turn_limit: None,
        })
    }

    pub fn with_hook(mut self, hook: impl PresentationHook + 'static) -> Self {
        self.hook = Box::new(hook);
        self
    }

    pub fn with_turn_limit(mut self, limit: Option<u32>) -> Self {
        self.turn_limit = limit;
        self
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    fn turn_limit_reached(&self) -> bool {
        self.turn_limit
            .is_some_and(|limit| self.state.turn() >= limit)
    }

    /// Asks the current player for a move and applies it.
    pub fn step(&mut self) -> Result<TurnOutcome, GameError> {
        let actor = self.state.current_player().id();
        let candidate = {
            let ctx = PolicyContext {
                me: self.state.current_player(),
                opponents: self.state.opponents_of(actor),
                turn: self.state.turn() + 1,
            };
            let contestant = self
                .contestants
                .iter_mut()
                .find(|c| c.id == actor)
                .ok_or(GameError::NoMoveSelected(actor))?;
            let start = Instant::now();
            let choice = contestant.policy.select_move(&ctx);
            contestant.stats.record(start.elapsed());
            choice.ok_or(GameError::NoMoveSelected(actor))?
        };

        let outcome = self.state.apply_turn(actor, candidate)?;

        if outcome.defeated {
            let reason = format!(
                "{} was defeated by {}!",
                self.name_of(outcome.target),
                self.name_of(actor)
            );
            if let Some(target) = self.contestants.iter_mut().find(|c| c.id == outcome.target) {
                target.notify(&reason);
            }
        }

        self.hook.on_turn(&self.state, actor, outcome.target);
        Ok(outcome)
    }

    /// Plays the game out and notifies every remaining seat once it ends.
    pub fn run(&mut self) -> Result<GameSummary, GameError> {
        while !self.state.is_over() && !self.turn_limit_reached() {
            self.step()?;
        }

        let end_reason = if self.state.is_over() {
            EndReason::LastPlayerStanding
        } else {
            EndReason::TurnLimit
        };

        let reason = match (end_reason, self.state.winner()) {
            (EndReason::LastPlayerStanding, Some(winner)) => {
                format!("Game over!\n{} has won the game!", self.name_of(winner))
            }
            _ => format!("Game over!\nNo winner after {} turns.", self.state.turn()),
        };
        for contestant in &mut self.contestants {
            if self.state.is_active(contestant.id) {
                contestant.notify(&reason);
            }
        }

        Ok(GameSummary {
            winner: self.state.winner(),
            eliminations: self.state.eliminations().to_vec(),
            turns: self.state.turn(),
            end_reason,
            decisions: self
                .contestants
                .iter()
                .map(|c| (c.id, c.stats))
                .collect(),
        })
    }

    fn name_of(&self, id: PlayerId) -> String {
        self.state
            .player(id)
            .map(|p| p.name().to_string())
            .unwrap_or_else(|| id.to_string())
    }
}
