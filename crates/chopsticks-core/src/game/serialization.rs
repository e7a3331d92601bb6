use super::match_state::{Elimination, MatchState, Seat};
use crate::model::hand::{HandError, Hands};
use crate::model::player::{Player, PlayerId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeatSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub left: u8,
    pub right: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eliminated_on: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eliminated_by: Option<PlayerId>,
}

/// Board view of a table: every seat's hands plus whose turn it is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableSnapshot {
    pub turn: u32,
    pub current: PlayerId,
    pub seats: Vec<SeatSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<PlayerId>,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("seat {name:?}: {source}")]
    Hands {
        name: String,
        #[source]
        source: HandError,
    },
    #[error("current player {0} is not seated")]
    UnknownCurrent(PlayerId),
    #[error("snapshot needs at least 2 seats")]
    TooFewSeats,
    #[error("seat {name:?} repeats an identity already seated ({id})")]
    DuplicateSeat { id: PlayerId, name: String },
    #[error("seat {0:?} has no fingers left but no elimination record")]
    UnrecordedDefeat(String),
    #[error("seat {0:?} is marked eliminated but still holds fingers")]
    EliminatedWithFingers(String),
    #[error("seat {0:?} has only half of its elimination record")]
    PartialElimination(String),
    #[error("current player {0} has already been eliminated")]
    EliminatedCurrent(PlayerId),
}

impl TableSnapshot {
    pub fn capture(state: &MatchState) -> Self {
        let seats = state
            .seats()
            .iter()
            .map(|seat| SeatSnapshot {
                id: seat.player.id(),
                name: seat.player.name().to_string(),
                left: seat.player.hands().left(),
                right: seat.player.hands().right(),
                eliminated_on: seat.elimination.map(|e| e.turn),
                eliminated_by: seat.elimination.map(|e| e.by),
            })
            .collect();

        TableSnapshot {
            turn: state.turn(),
            current: state.current_player().id(),
            seats,
            winner: state.winner(),
        }
    }

    /// Rebuilds a table, holding the snapshot to the same roster rules a
    /// freshly created game obeys.
    pub fn restore(self) -> Result<MatchState, SnapshotError> {
        if self.seats.len() < 2 {
            return Err(SnapshotError::TooFewSeats);
        }
        let current = self
            .seats
            .iter()
            .position(|seat| seat.id == self.current)
            .ok_or(SnapshotError::UnknownCurrent(self.current))?;

        let mut seats: Vec<Seat> = Vec::with_capacity(self.seats.len());
        for seat in self.seats {
            let duplicate = seats
                .iter()
                .any(|seated| seated.player.id() == seat.id || seated.player.name() == seat.name);
            if duplicate {
                return Err(SnapshotError::DuplicateSeat {
                    id: seat.id,
                    name: seat.name,
                });
            }

            let hands = Hands::new(seat.left, seat.right).map_err(|source| {
                SnapshotError::Hands {
                    name: seat.name.clone(),
                    source,
                }
            })?;
            let elimination = match (seat.eliminated_on, seat.eliminated_by) {
                (Some(turn), Some(by)) => Some(Elimination {
                    player: seat.id,
                    by,
                    turn,
                }),
                (None, None) => None,
                _ => return Err(SnapshotError::PartialElimination(seat.name)),
            };
            match (hands.is_defeated(), elimination.is_some()) {
                (true, false) => return Err(SnapshotError::UnrecordedDefeat(seat.name)),
                (false, true) => return Err(SnapshotError::EliminatedWithFingers(seat.name)),
                _ => {}
            }
            seats.push(Seat {
                player: Player::with_hands(seat.id, seat.name, hands),
                elimination,
            });
        }

        if seats[current].elimination.is_some() {
            return Err(SnapshotError::EliminatedCurrent(self.current));
        }

        Ok(MatchState::from_parts(seats, current, self.turn))
    }

    pub fn to_json(state: &MatchState) -> serde_json::Result<String> {
        let snapshot = Self::capture(state);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
