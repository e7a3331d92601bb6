use crate::model::moves::{Candidate, HandMove};
use crate::model::player::{Player, PlayerId};
use crate::model::rules::{RuleError, apply_checked};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("a game needs at least 2 unique players, got {unique}")]
    InvalidRoster { unique: usize },
    #[error(transparent)]
    Rule(#[from] RuleError),
    #[error("player {0} did not select a move")]
    NoMoveSelected(PlayerId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elimination {
    pub player: PlayerId,
    pub by: PlayerId,
    pub turn: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnOutcome {
    pub actor: PlayerId,
    pub target: PlayerId,
    pub hand_move: HandMove,
    pub defeated: bool,
    /// Seat to act next, `None` once the game is decided.
    pub next: Option<PlayerId>,
}

#[derive(Debug, Clone)]
pub(crate) struct Seat {
    pub(crate) player: Player,
    pub(crate) elimination: Option<Elimination>,
}

impl Seat {
    fn is_active(&self) -> bool {
        self.elimination.is_none()
    }
}

/// The table: seats in fixed turn order plus whose turn it is.
///
/// Seats are never removed. A defeated player keeps its seat with an
/// elimination marker and is skipped by turn rotation from then on.
#[derive(Debug, Clone)]
pub struct MatchState {
    seats: Vec<Seat>,
    current: usize,
    turn: u32,
    eliminations: Vec<Elimination>,
    winner: Option<PlayerId>,
}

impl MatchState {
    /// Seats players in the given order, dropping repeated identities and
    /// players that are already defeated.
    pub fn new(players: Vec<Player>) -> Result<Self, GameError> {
        let mut seats: Vec<Seat> = Vec::with_capacity(players.len());
        for player in players {
            if player.is_defeated() {
                continue;
            }
            let duplicate = seats
                .iter()
                .any(|seat| seat.player.id() == player.id() || seat.player.name() == player.name());
            if !duplicate {
                seats.push(Seat {
                    player,
                    elimination: None,
                });
            }
        }

        if seats.len() < 2 {
            return Err(GameError::InvalidRoster {
                unique: seats.len(),
            });
        }

        Ok(Self {
            seats,
            current: 0,
            turn: 0,
            eliminations: Vec::new(),
            winner: None,
        })
    }

    pub(crate) fn from_parts(seats: Vec<Seat>, current: usize, turn: u32) -> Self {
        let mut eliminations: Vec<Elimination> =
            seats.iter().filter_map(|seat| seat.elimination).collect();
        eliminations.sort_by_key(|e| e.turn);
        let mut state = Self {
            seats,
            current,
            turn,
            eliminations,
            winner: None,
        };
        state.settle_winner();
        state
    }

    pub(crate) fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.remaining() <= 1
    }

    pub fn remaining(&self) -> usize {
        self.seats.iter().filter(|seat| seat.is_active()).count()
    }

    pub fn eliminations(&self) -> &[Elimination] {
        &self.eliminations
    }

    pub fn current_player(&self) -> &Player {
        &self.seats[self.current].player
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.seat_index(id).map(|idx| &self.seats[idx].player)
    }

    pub fn is_active(&self, id: PlayerId) -> bool {
        self.seat_index(id)
            .is_some_and(|idx| self.seats[idx].is_active())
    }

    /// Every seated player, eliminated or not, in seat order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.seats.iter().map(|seat| &seat.player)
    }

    /// Players still in the game, in seat order.
    pub fn active_players(&self) -> Vec<&Player> {
        self.seats
            .iter()
            .filter(|seat| seat.is_active())
            .map(|seat| &seat.player)
            .collect()
    }

    pub fn opponents_of(&self, id: PlayerId) -> Vec<&Player> {
        self.seats
            .iter()
            .filter(|seat| seat.is_active() && seat.player.id() != id)
            .map(|seat| &seat.player)
            .collect()
    }

    /// Plays one turn for `actor`, who must be the current player.
    ///
    /// On any error the table is left exactly as it was.
    pub fn apply_turn(
        &mut self,
        actor: PlayerId,
        candidate: Candidate,
    ) -> Result<TurnOutcome, RuleError> {
        let actor_idx = self
            .seat_index(actor)
            .ok_or(RuleError::UnknownPlayer(actor))?;
        if actor_idx != self.current || !self.seats[actor_idx].is_active() {
            return Err(RuleError::OutOfTurn {
                expected: self.current_player().id(),
                actual: actor,
            });
        }
        if candidate.opponent == actor {
            return Err(RuleError::SelfTarget(actor));
        }
        let target_idx = self
            .seat_index(candidate.opponent)
            .ok_or(RuleError::UnknownPlayer(candidate.opponent))?;
        if !self.seats[target_idx].is_active() {
            return Err(RuleError::StaleOpponent(candidate.opponent));
        }

        let mut attacker = self.seats[actor_idx].player.hands();
        let mut defender = self.seats[target_idx].player.hands();
        let defeated = apply_checked(&mut attacker, &mut defender, candidate.hand_move)?;
        let actor_position = self.active_position(actor_idx);
        *self.seats[actor_idx].player.hands_mut() = attacker;
        *self.seats[target_idx].player.hands_mut() = defender;
        self.turn += 1;

        if defeated {
            let elimination = Elimination {
                player: candidate.opponent,
                by: actor,
                turn: self.turn,
            };
            self.seats[target_idx].elimination = Some(elimination);
            self.eliminations.push(elimination);
        }

        self.current = self.next_turn(actor_position).unwrap_or(actor_idx);
        self.settle_winner();

        Ok(TurnOutcome {
            actor,
            target: candidate.opponent,
            hand_move: candidate.hand_move,
            defeated,
            next: (!self.is_over()).then(|| self.current_player().id()),
        })
    }

    fn seat_index(&self, id: PlayerId) -> Option<usize> {
        self.seats.iter().position(|seat| seat.player.id() == id)
    }

    /// Position of seat `idx` among the active seats, counted in seat order.
    fn active_position(&self, idx: usize) -> usize {
        self.seats[..idx].iter().filter(|seat| seat.is_active()).count()
    }

    /// The active roster index advances by one modulo the roster length as it
    /// stands after this turn's elimination, if any.
    fn next_turn(&self, actor_position: usize) -> Option<usize> {
        let remaining = self.remaining();
        if remaining == 0 {
            return None;
        }
        self.seats
            .iter()
            .enumerate()
            .filter(|(_, seat)| seat.is_active())
            .nth((actor_position + 1) % remaining)
            .map(|(idx, _)| idx)
    }

    fn settle_winner(&mut self) {
        if self.remaining() == 1 {
            self.winner = self
                .seats
                .iter()
                .find(|seat| seat.is_active())
                .map(|seat| seat.player.id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::hand::{HandAction, HandSide, Hands};
    use crate::model::player::PlayerIdAllocator;

    fn table(hands: &[(u8, u8)]) -> (MatchState, Vec<PlayerId>) {
        let mut ids = PlayerIdAllocator::new();
        let players: Vec<Player> = hands
            .iter()
            .map(|&(l, r)| {
                let p = ids.player(None);
                Player::with_hands(p.id(), p.name(), Hands::new(l, r).unwrap())
            })
            .collect();
        let order = players.iter().map(Player::id).collect();
        (MatchState::new(players).unwrap(), order)
    }

    #[test]
    fn rejects_rosters_with_fewer_than_two_unique_players() {
        let mut ids = PlayerIdAllocator::new();
        let solo = ids.player(Some("solo"));
        let err = MatchState::new(vec![solo.clone(), solo]).unwrap_err();
        assert!(matches!(err, GameError::InvalidRoster { unique: 1 }));

        let err = MatchState::new(Vec::new()).unwrap_err();
        assert!(matches!(err, GameError::InvalidRoster { unique: 0 }));
    }

    #[test]
    fn duplicate_names_keep_first_seat() {
        let mut ids = PlayerIdAllocator::new();
        let a = ids.player(Some("Ann"));
        let b = ids.player(Some("Bob"));
        let a2 = ids.player(Some("Ann"));
        let state = MatchState::new(vec![a.clone(), b, a2]).unwrap();
        assert_eq!(state.players().count(), 2);
        assert_eq!(state.current_player().id(), a.id());
    }

    #[test]
    fn rotation_skips_eliminated_seat() {
        // A(1,1) B(4,0) C(1,1): A eliminates B, then C acts, then A again.
        let (mut state, ids) = table(&[(1, 1), (4, 0), (1, 1)]);
        let (a, b, c) = (ids[0], ids[1], ids[2]);

        let outcome = state
            .apply_turn(a, Candidate::new(b, HandAction::Left, HandSide::Left))
            .unwrap();
        assert!(outcome.defeated);
        assert_eq!(outcome.next, Some(c));
        assert!(!state.is_active(b));
        assert_eq!(
            state.active_players().iter().map(|p| p.id()).collect::<Vec<_>>(),
            vec![a, c]
        );

        state
            .apply_turn(c, Candidate::new(a, HandAction::Left, HandSide::Left))
            .unwrap();
        assert_eq!(state.current_player().id(), a);
        assert_eq!(state.turn(), 2);
    }

    #[test]
    fn eliminating_an_earlier_seat_shifts_the_roster_index() {
        // A(1,1) B(4,0) C(1,1). After A and B move, C removes B. The roster
        // shrinks to [A, C] and index 2 wraps to 1, so C acts again.
        let (mut state, ids) = table(&[(1, 1), (4, 0), (1, 1)]);
        let (a, b, c) = (ids[0], ids[1], ids[2]);

        state
            .apply_turn(a, Candidate::new(c, HandAction::Left, HandSide::Left))
            .unwrap();
        state
            .apply_turn(b, Candidate::new(a, HandAction::Left, HandSide::Left))
            .unwrap();
        let outcome = state
            .apply_turn(c, Candidate::new(b, HandAction::Right, HandSide::Left))
            .unwrap();
        assert!(outcome.defeated);
        assert_eq!(outcome.next, Some(c));
        assert_eq!(state.current_player().id(), c);

        state
            .apply_turn(c, Candidate::new(a, HandAction::Right, HandSide::Right))
            .unwrap();
        assert_eq!(state.current_player().id(), a);
    }

    #[test]
    fn rotation_without_elimination_visits_every_seat() {
        let (mut state, ids) = table(&[(1, 1), (1, 1), (1, 1)]);
        for turn in 0..6 {
            let actor = ids[turn % 3];
            assert_eq!(state.current_player().id(), actor);
            let target = ids[(turn + 1) % 3];
            state
                .apply_turn(actor, Candidate::new(target, HandAction::Left, HandSide::Right))
                .unwrap();
        }
    }

    #[test]
    fn out_of_turn_and_stale_targets_are_refused() {
        let (mut state, ids) = table(&[(1, 1), (4, 0), (1, 1)]);
        let (a, b, c) = (ids[0], ids[1], ids[2]);

        let err = state
            .apply_turn(c, Candidate::new(a, HandAction::Left, HandSide::Left))
            .unwrap_err();
        assert_eq!(err, RuleError::OutOfTurn { expected: a, actual: c });

        state
            .apply_turn(a, Candidate::new(b, HandAction::Left, HandSide::Left))
            .unwrap();
        let before = state.clone();
        let err = state
            .apply_turn(c, Candidate::new(b, HandAction::Left, HandSide::Left))
            .unwrap_err();
        assert_eq!(err, RuleError::StaleOpponent(b));
        assert_eq!(state.turn(), before.turn());
        assert_eq!(state.current_player(), before.current_player());
    }

    #[test]
    fn illegal_hand_choice_is_refused_without_side_effects() {
        let (mut state, ids) = table(&[(1, 1), (4, 0)]);
        let err = state
            .apply_turn(ids[0], Candidate::new(ids[1], HandAction::Left, HandSide::Right))
            .unwrap_err();
        assert!(matches!(err, RuleError::IllegalMove { .. }));
        assert_eq!(state.player(ids[1]).unwrap().hands(), Hands::new(4, 0).unwrap());
        assert_eq!(state.turn(), 0);

        let err = state
            .apply_turn(ids[0], Candidate::new(ids[0], HandAction::Left, HandSide::Left))
            .unwrap_err();
        assert_eq!(err, RuleError::SelfTarget(ids[0]));
    }

    #[test]
    fn last_player_standing_wins() {
        let (mut state, ids) = table(&[(1, 1), (4, 0)]);
        let outcome = state
            .apply_turn(ids[0], Candidate::new(ids[1], HandAction::Right, HandSide::Left))
            .unwrap();
        assert!(outcome.defeated);
        assert_eq!(outcome.next, None);
        assert!(state.is_over());
        assert_eq!(state.winner(), Some(ids[0]));
        assert_eq!(
            state.eliminations(),
            &[Elimination {
                player: ids[1],
                by: ids[0],
                turn: 1
            }]
        );
    }
}
