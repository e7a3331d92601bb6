use crate::model::hand::{HandAction, HandSide, Hands};
use crate::model::moves::{HandMove, is_legal};
use crate::model::player::PlayerId;
use thiserror::Error;

/// Reasons a requested move is refused. State is left untouched in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("{action} -> {target} is not a legal move here")]
    IllegalMove { action: HandAction, target: HandSide },
    #[error("player {0} is no longer in the game")]
    StaleOpponent(PlayerId),
    #[error("player {0} is not part of this game")]
    UnknownPlayer(PlayerId),
    #[error("it is {expected}'s turn, not {actual}'s")]
    OutOfTurn {
        expected: PlayerId,
        actual: PlayerId,
    },
    #[error("player {0} cannot tap their own hands")]
    SelfTarget(PlayerId),
}

/// Applies a move without checking it against the move catalog.
///
/// A split replaces the attacker's hands first and then taps with the left
/// hand.
pub fn apply_move(attacker: &mut Hands, defender: &mut Hands, hand_move: HandMove) {
    if hand_move.action == HandAction::Split {
        *attacker = attacker.split();
    }
    let attacking = attacker.value(hand_move.action.tapping_side());
    defender.receive_tap(hand_move.target, attacking);
}

/// Applies a move after confirming it is one of the enumerated legal moves.
///
/// Returns whether the defender is defeated afterwards.
pub fn apply_checked(
    attacker: &mut Hands,
    defender: &mut Hands,
    hand_move: HandMove,
) -> Result<bool, RuleError> {
    if !is_legal(*attacker, *defender, hand_move) {
        return Err(RuleError::IllegalMove {
            action: hand_move.action,
            target: hand_move.target,
        });
    }
    apply_move(attacker, defender, hand_move);
    Ok(defender.is_defeated())
}
