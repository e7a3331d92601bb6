use chopsticks_core::model::moves::{HandMove, enumerate_moves, is_legal};
use chopsticks_core::model::player::Player;
use chopsticks_core::model::rules::{RuleError, apply_move};
use std::fmt;

/// Two-ply outlook of a single move, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i8)]
pub enum Verdict {
    /// Some opponent can defeat me on the very next turn.
    Unsafe = -10,
    Neutral = 0,
    /// The move defeats its target outright.
    Winning = 10,
}

impl Verdict {
    pub const fn score(self) -> i8 {
        self as i8
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.score())
    }
}

/// What a single search found. Carries enough to explain the move afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Finding<'a> {
    Defeats,
    CounteredBy(&'a str),
    Quiet,
}

impl Finding<'_> {
    pub(crate) const fn verdict(self) -> Verdict {
        match self {
            Finding::Defeats => Verdict::Winning,
            Finding::CounteredBy(_) => Verdict::Unsafe,
            Finding::Quiet => Verdict::Neutral,
        }
    }

    pub(crate) fn describe(self, me: &Player, opponent: &Player) -> String {
        match self {
            Finding::Defeats => format!(
                "--> I ({}) have defeated {}, return 10 score",
                me.name(),
                opponent.name()
            ),
            Finding::CounteredBy(name) => format!(
                "--> I ({}) was defeated by {}, return -10 score",
                me.name(),
                name
            ),
            Finding::Quiet => String::new(),
        }
    }
}

pub(crate) fn search<'a>(
    me: &Player,
    opponent: &'a Player,
    hand_move: HandMove,
    opponents: &[&'a Player],
) -> Result<Finding<'a>, RuleError> {
    if opponent.is_defeated() {
        return Err(RuleError::StaleOpponent(opponent.id()));
    }
    if !is_legal(me.hands(), opponent.hands(), hand_move) {
        return Err(RuleError::IllegalMove {
            action: hand_move.action,
            target: hand_move.target,
        });
    }

    let mut my_hands = me.hands();
    let mut target_hands = opponent.hands();
    apply_move(&mut my_hands, &mut target_hands, hand_move);
    if target_hands.is_defeated() {
        return Ok(Finding::Defeats);
    }

    // The struck opponent replies with its updated hands, the rest as they are.
    let next_ply = std::iter::once((opponent.name(), target_hands)).chain(
        opponents
            .iter()
            .copied()
            .filter(|other| other.id() != opponent.id() && !other.is_defeated())
            .map(|other| (other.name(), other.hands())),
    );

    for (name, replier) in next_ply {
        for reply in enumerate_moves(replier, my_hands) {
            let mut their_hands = replier;
            let mut future_me = my_hands;
            apply_move(&mut their_hands, &mut future_me, reply);
            if future_me.is_defeated() {
                return Ok(Finding::CounteredBy(name));
            }
        }
    }

    Ok(Finding::Quiet)
}

/// Scores `hand_move` against `opponent` from `me`'s point of view.
///
/// `opponents` is everyone still in the game except `me`; it may or may not
/// contain `opponent` itself. Nothing passed in is modified.
pub fn evaluate(
    me: &Player,
    opponent: &Player,
    hand_move: HandMove,
    opponents: &[&Player],
) -> Result<Verdict, RuleError> {
    search(me, opponent, hand_move, opponents).map(Finding::verdict)
}

/// Same as [`evaluate`], plus a note on who falls. Neutral moves explain
/// nothing.
pub fn explain(
    me: &Player,
    opponent: &Player,
    hand_move: HandMove,
    opponents: &[&Player],
) -> Result<(Verdict, String), RuleError> {
    let finding = search(me, opponent, hand_move, opponents)?;
    Ok((finding.verdict(), finding.describe(me, opponent)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chopsticks_core::model::hand::{HandAction, HandSide, Hands};
    use chopsticks_core::model::player::PlayerIdAllocator;

    fn seated(ids: &mut PlayerIdAllocator, name: &str, left: u8, right: u8) -> Player {
        let p = ids.player(Some(name));
        Player::with_hands(p.id(), p.name(), Hands::new(left, right).unwrap())
    }

    #[test]
    fn finishing_blow_is_winning() {
        let mut ids = PlayerIdAllocator::new();
        let me = seated(&mut ids, "Ann", 1, 1);
        let opp = seated(&mut ids, "Bob", 4, 0);
        let hand_move = HandMove::new(HandAction::Left, HandSide::Left);

        let verdict = evaluate(&me, &opp, hand_move, &[&opp]).unwrap();
        assert_eq!(verdict, Verdict::Winning);
        assert_eq!(verdict.score(), 10);

        let (_, note) = explain(&me, &opp, hand_move, &[&opp]).unwrap();
        assert_eq!(note, "--> I (Ann) have defeated Bob, return 10 score");
        // Inputs are untouched.
        assert_eq!(opp.hands(), Hands::new(4, 0).unwrap());
        assert_eq!(me.hands(), Hands::STARTING);
    }

    #[test]
    fn exposed_hand_is_unsafe() {
        let mut ids = PlayerIdAllocator::new();
        let me = seated(&mut ids, "Ann", 0, 1);
        let opp = seated(&mut ids, "Bob", 1, 4);
        // Bob goes to (2,4) and can answer with 4 onto my 1.
        let hand_move = HandMove::new(HandAction::Right, HandSide::Left);

        let (verdict, note) = explain(&me, &opp, hand_move, &[&opp]).unwrap();
        assert_eq!(verdict, Verdict::Unsafe);
        assert_eq!(verdict.score(), -10);
        assert_eq!(note, "--> I (Ann) was defeated by Bob, return -10 score");
    }

    #[test]
    fn quiet_move_is_neutral() {
        let mut ids = PlayerIdAllocator::new();
        let me = seated(&mut ids, "Ann", 1, 1);
        let opp = seated(&mut ids, "Bob", 1, 1);
        let hand_move = HandMove::new(HandAction::Left, HandSide::Left);

        let (verdict, note) = explain(&me, &opp, hand_move, &[&opp]).unwrap();
        assert_eq!(verdict, Verdict::Neutral);
        assert!(note.is_empty());
    }

    #[test]
    fn bystanders_get_a_reply_too() {
        let mut ids = PlayerIdAllocator::new();
        let me = seated(&mut ids, "Ann", 0, 1);
        let target = seated(&mut ids, "Bob", 1, 1);
        let bystander = seated(&mut ids, "Cid", 4, 4);
        let hand_move = HandMove::new(HandAction::Right, HandSide::Left);

        assert_eq!(
            evaluate(&me, &target, hand_move, &[&target]).unwrap(),
            Verdict::Neutral
        );
        let (verdict, note) = explain(&me, &target, hand_move, &[&target, &bystander]).unwrap();
        assert_eq!(verdict, Verdict::Unsafe);
        assert!(note.ends_with("was defeated by Cid, return -10 score"));
    }

    #[test]
    fn replies_face_my_hands_after_a_split() {
        let mut ids = PlayerIdAllocator::new();
        let me = seated(&mut ids, "Ann", 0, 2);
        let opp = seated(&mut ids, "Bob", 1, 3);
        // Splitting to (1,1) leaves nothing a single tap can finish.
        let hand_move = HandMove::new(HandAction::Split, HandSide::Left);
        assert_eq!(
            evaluate(&me, &opp, hand_move, &[&opp]).unwrap(),
            Verdict::Neutral
        );
    }

    #[test]
    fn stale_and_illegal_moves_are_errors() {
        let mut ids = PlayerIdAllocator::new();
        let me = seated(&mut ids, "Ann", 1, 1);
        let gone = seated(&mut ids, "Bob", 0, 0);
        let opp = seated(&mut ids, "Cid", 3, 0);

        let err = evaluate(
            &me,
            &gone,
            HandMove::new(HandAction::Left, HandSide::Left),
            &[&gone, &opp],
        )
        .unwrap_err();
        assert_eq!(err, RuleError::StaleOpponent(gone.id()));

        let err = evaluate(
            &me,
            &opp,
            HandMove::new(HandAction::Left, HandSide::Right),
            &[&opp],
        )
        .unwrap_err();
        assert!(matches!(err, RuleError::IllegalMove { .. }));
    }

    #[test]
    fn verdicts_order_ascending() {
        assert!(Verdict::Unsafe < Verdict::Neutral);
        assert!(Verdict::Neutral < Verdict::Winning);
    }
}
