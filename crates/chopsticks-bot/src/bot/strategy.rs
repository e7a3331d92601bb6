use super::evaluator::{Verdict, search};
use chopsticks_core::model::moves::{Candidate, enumerate_moves_all_opponents};
use chopsticks_core::model::player::Player;
use chopsticks_core::model::rules::RuleError;
use rand::Rng;
use rand::seq::SliceRandom;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Random,
    ShortSighted,
    /// Reserved for a deeper search; plays exactly like `ShortSighted`.
    LongSighted,
}

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("no legal move against any opponent")]
    NoCandidates,
    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// A chosen move together with how it was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub candidate: Candidate,
    pub strategy: Strategy,
    /// Heuristic score of the chosen move; `None` for random picks.
    pub verdict: Option<Verdict>,
    /// Note on who falls after the chosen move. Empty for random picks and
    /// neutral moves.
    pub explanation: String,
    pub candidates: usize,
}

impl Strategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Strategy::Random => "random",
            Strategy::ShortSighted => "short_sighted",
            Strategy::LongSighted => "long_sighted",
        }
    }

    /// Chooses a move for `me` among all legal moves against `opponents`.
    pub fn choose<R: Rng + ?Sized>(
        self,
        me: &Player,
        opponents: &[&Player],
        rng: &mut R,
    ) -> Result<Decision, StrategyError> {
        let candidates = enumerate_moves_all_opponents(me, opponents);
        let count = candidates.len();
        let (candidate, verdict, explanation) = match self {
            Strategy::Random => {
                let picked = candidates
                    .choose(rng)
                    .copied()
                    .ok_or(StrategyError::NoCandidates)?;
                (picked, None, String::new())
            }
            Strategy::ShortSighted | Strategy::LongSighted => {
                let (picked, verdict, note) = best_candidate(me, opponents, candidates)?;
                (picked, Some(verdict), note)
            }
        };
        Ok(Decision {
            candidate,
            strategy: self,
            verdict,
            explanation,
            candidates: count,
        })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Highest verdict wins; among equals the one enumerated last. Each
/// candidate is searched once and only the winner's finding is described.
fn best_candidate<'a>(
    me: &Player,
    opponents: &[&'a Player],
    candidates: Vec<Candidate>,
) -> Result<(Candidate, Verdict, String), StrategyError> {
    let mut scored = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let opponent = opponents
            .iter()
            .copied()
            .find(|p| p.id() == candidate.opponent)
            .ok_or(RuleError::UnknownPlayer(candidate.opponent))?;
        let finding = search(me, opponent, candidate.hand_move, opponents)?;
        scored.push((finding.verdict(), candidate, finding, opponent));
    }
    scored.sort_by_key(|(verdict, ..)| *verdict);
    scored
        .pop()
        .map(|(verdict, candidate, finding, opponent)| {
            (candidate, verdict, finding.describe(me, opponent))
        })
        .ok_or(StrategyError::NoCandidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::evaluator::{evaluate, explain};
    use chopsticks_core::model::hand::{HandAction, HandSide, Hands};
    use chopsticks_core::model::player::PlayerIdAllocator;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn seated(ids: &mut PlayerIdAllocator, left: u8, right: u8) -> Player {
        let p = ids.computer(None);
        Player::with_hands(p.id(), p.name(), Hands::new(left, right).unwrap())
    }

    #[test]
    fn short_sighted_takes_the_kill() {
        let mut ids = PlayerIdAllocator::new();
        let me = seated(&mut ids, 1, 1);
        let healthy = seated(&mut ids, 1, 1);
        let weak = seated(&mut ids, 4, 0);
        let mut rng = StdRng::seed_from_u64(0);

        let decision = Strategy::ShortSighted
            .choose(&me, &[&healthy, &weak], &mut rng)
            .unwrap();
        assert_eq!(decision.verdict, Some(Verdict::Winning));
        assert_eq!(decision.candidate.opponent, weak.id());
        assert_eq!(decision.candidates, 4 + 2);
        // Both of my hands win; the later one in enumeration order is kept.
        assert_eq!(
            decision.candidate,
            Candidate::new(weak.id(), HandAction::Right, HandSide::Left)
        );
        let (_, note) = explain(
            &me,
            &weak,
            decision.candidate.hand_move,
            &[&healthy, &weak],
        )
        .unwrap();
        assert_eq!(decision.explanation, note);
        assert!(decision.explanation.contains("have defeated Computer 3"));
    }

    #[test]
    fn short_sighted_is_deterministic_and_maximal() {
        let mut ids = PlayerIdAllocator::new();
        let me = seated(&mut ids, 0, 1);
        let a = seated(&mut ids, 2, 3);
        let b = seated(&mut ids, 1, 4);
        let opponents = [&a, &b];

        let first = Strategy::ShortSighted
            .choose(&me, &opponents, &mut StdRng::seed_from_u64(1))
            .unwrap();
        let second = Strategy::ShortSighted
            .choose(&me, &opponents, &mut StdRng::seed_from_u64(99))
            .unwrap();
        assert_eq!(first, second);

        let best = enumerate_moves_all_opponents(&me, &opponents)
            .into_iter()
            .map(|c| {
                let opp = if c.opponent == a.id() { &a } else { &b };
                evaluate(&me, opp, c.hand_move, &opponents).unwrap()
            })
            .max()
            .unwrap();
        assert_eq!(first.verdict, Some(best));
    }

    #[test]
    fn long_sighted_matches_short_sighted() {
        let mut ids = PlayerIdAllocator::new();
        let me = seated(&mut ids, 2, 3);
        let a = seated(&mut ids, 1, 2);
        let b = seated(&mut ids, 3, 3);
        let mut rng = StdRng::seed_from_u64(5);
        let short = Strategy::ShortSighted.choose(&me, &[&a, &b], &mut rng).unwrap();
        let long = Strategy::LongSighted.choose(&me, &[&a, &b], &mut rng).unwrap();
        assert_eq!(short.candidate, long.candidate);
        assert_eq!(long.strategy, Strategy::LongSighted);
    }

    #[test]
    fn random_picks_a_legal_candidate() {
        let mut ids = PlayerIdAllocator::new();
        let me = seated(&mut ids, 1, 2);
        let a = seated(&mut ids, 3, 0);
        let legal = enumerate_moves_all_opponents(&me, &[&a]);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let decision = Strategy::Random.choose(&me, &[&a], &mut rng).unwrap();
            assert!(legal.contains(&decision.candidate));
            assert_eq!(decision.verdict, None);
            assert!(decision.explanation.is_empty());
        }
    }

    #[test]
    fn no_opponents_means_no_candidates() {
        let mut ids = PlayerIdAllocator::new();
        let me = seated(&mut ids, 1, 1);
        let mut rng = StdRng::seed_from_u64(0);
        for strategy in [Strategy::Random, Strategy::ShortSighted] {
            assert!(matches!(
                strategy.choose(&me, &[], &mut rng),
                Err(StrategyError::NoCandidates)
            ));
        }
    }
}
