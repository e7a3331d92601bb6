use crate::model::hand::{HandAction, HandSide, Hands};
use crate::model::player::{Player, PlayerId};
use core::fmt;
use serde::{Deserialize, Serialize};

/// The attacking selector paired with the opponent hand it lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandMove {
    pub action: HandAction,
    pub target: HandSide,
}

impl HandMove {
    pub const fn new(action: HandAction, target: HandSide) -> Self {
        Self { action, target }
    }
}

impl fmt::Display for HandMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.action, self.target)
    }
}

/// A complete move choice: who gets tapped, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Candidate {
    pub opponent: PlayerId,
    pub hand_move: HandMove,
}

impl Candidate {
    pub const fn new(opponent: PlayerId, action: HandAction, target: HandSide) -> Self {
        Self {
            opponent,
            hand_move: HandMove::new(action, target),
        }
    }
}

/// Actions available to the owner of `hands`, in `Left, Right, Split` order.
pub fn possible_actions(hands: Hands) -> Vec<HandAction> {
    HandAction::ORDER
        .into_iter()
        .filter(|action| match action {
            HandAction::Left => hands.left() != 0,
            HandAction::Right => hands.right() != 0,
            HandAction::Split => hands.is_split_possible(),
        })
        .collect()
}

/// Every `(action, target)` pair the attacker may play against the defender.
///
/// Targets come from the defender's own possible actions with `Split`
/// filtered out, so an empty hand is never a target.
pub fn enumerate_moves(attacker: Hands, defender: Hands) -> Vec<HandMove> {
    let targets: Vec<HandSide> = possible_actions(defender)
        .into_iter()
        .filter_map(HandAction::as_side)
        .collect();

    let mut moves = Vec::new();
    for action in possible_actions(attacker) {
        for &target in &targets {
            moves.push(HandMove::new(action, target));
        }
    }
    moves
}

pub fn is_legal(attacker: Hands, defender: Hands, hand_move: HandMove) -> bool {
    enumerate_moves(attacker, defender).contains(&hand_move)
}

/// Candidates against every opponent, in the order the opponents are given.
pub fn enumerate_moves_all_opponents(attacker: &Player, opponents: &[&Player]) -> Vec<Candidate> {
    opponents
        .iter()
        .flat_map(|opponent| {
            enumerate_moves(attacker.hands(), opponent.hands())
                .into_iter()
                .map(move |hand_move| Candidate {
                    opponent: opponent.id(),
                    hand_move,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::player::PlayerIdAllocator;

    fn hands(left: u8, right: u8) -> Hands {
        Hands::new(left, right).unwrap()
    }

    #[test]
    fn possible_actions_follow_hand_values() {
        assert_eq!(
            possible_actions(hands(1, 1)),
            vec![HandAction::Left, HandAction::Right]
        );
        assert_eq!(
            possible_actions(hands(0, 4)),
            vec![HandAction::Right, HandAction::Split]
        );
        assert_eq!(
            possible_actions(hands(2, 0)),
            vec![HandAction::Left, HandAction::Split]
        );
        assert_eq!(possible_actions(hands(0, 3)), vec![HandAction::Right]);
        assert!(possible_actions(hands(0, 0)).is_empty());
    }

    #[test]
    fn enumeration_order_is_action_then_target() {
        let moves = enumerate_moves(hands(0, 2), hands(1, 3));
        assert_eq!(
            moves,
            vec![
                HandMove::new(HandAction::Right, HandSide::Left),
                HandMove::new(HandAction::Right, HandSide::Right),
                HandMove::new(HandAction::Split, HandSide::Left),
                HandMove::new(HandAction::Split, HandSide::Right),
            ]
        );
    }

    #[test]
    fn empty_and_split_targets_are_skipped() {
        // Defender could split from (4,0) but split is never a target, and its
        // empty right hand cannot be tapped.
        let moves = enumerate_moves(hands(1, 1), hands(4, 0));
        assert_eq!(
            moves,
            vec![
                HandMove::new(HandAction::Left, HandSide::Left),
                HandMove::new(HandAction::Right, HandSide::Left),
            ]
        );
        assert!(!is_legal(
            hands(1, 1),
            hands(4, 0),
            HandMove::new(HandAction::Left, HandSide::Right)
        ));
    }

    #[test]
    fn all_opponents_are_enumerated_in_roster_order() {
        let mut ids = PlayerIdAllocator::new();
        let me = ids.player(Some("me"));
        let a = Player::with_hands(ids.player(Some("a")).id(), "a", hands(0, 1));
        let b = Player::with_hands(ids.player(Some("b")).id(), "b", hands(2, 0));
        let with_me = Player::with_hands(me.id(), "me", hands(3, 0));

        let all = enumerate_moves_all_opponents(&with_me, &[&b, &a]);
        assert_eq!(
            all,
            vec![
                Candidate::new(b.id(), HandAction::Left, HandSide::Left),
                Candidate::new(a.id(), HandAction::Left, HandSide::Right),
            ]
        );
    }
}
