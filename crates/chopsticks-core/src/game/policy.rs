use crate::game::match_state::MatchState;
use crate::model::moves::{Candidate, enumerate_moves_all_opponents};
use crate::model::player::{Player, PlayerId};

/// What a seat gets to see when it is asked for a move.
pub struct PolicyContext<'a> {
    pub me: &'a Player,
    /// Opponents still in the game, in seat order.
    pub opponents: Vec<&'a Player>,
    pub turn: u32,
}

impl<'a> PolicyContext<'a> {
    pub fn candidates(&self) -> Vec<Candidate> {
        enumerate_moves_all_opponents(self.me, &self.opponents)
    }

    pub fn opponent(&self, id: PlayerId) -> Option<&'a Player> {
        self.opponents.iter().copied().find(|p| p.id() == id)
    }
}

/// Decision-making for a seat: computer strategies, scripted players, or a
/// front end collecting human input.
pub trait Policy: Send {
    /// Pick the opponent, attacking hand and target hand for this turn.
    ///
    /// Returning `None` aborts the game loop.
    fn select_move(&mut self, ctx: &PolicyContext<'_>) -> Option<Candidate>;

    /// Called once when this seat leaves the game, either defeated or as the
    /// winner when the game ends.
    fn notify_eliminated(&mut self, _reason: &str) {}
}

/// Rendering callback run after every completed turn.
pub trait PresentationHook {
    fn on_turn(&mut self, state: &MatchState, actor: PlayerId, target: PlayerId);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHook;

impl PresentationHook for NoopHook {
    fn on_turn(&mut self, _state: &MatchState, _actor: PlayerId, _target: PlayerId) {}
}
