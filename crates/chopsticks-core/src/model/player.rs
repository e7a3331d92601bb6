use crate::model::hand::Hands;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Stable identity of a player for the lifetime of one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u16);

impl PlayerId {
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    name: String,
    hands: Hands,
}

impl Player {
    /// A fresh player holding one finger on each hand.
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self::with_hands(id, name, Hands::STARTING)
    }

    pub fn with_hands(id: PlayerId, name: impl Into<String>, hands: Hands) -> Self {
        Self {
            id,
            name: name.into(),
            hands,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hands(&self) -> Hands {
        self.hands
    }

    pub fn hands_mut(&mut self) -> &mut Hands {
        &mut self.hands
    }

    pub fn is_defeated(&self) -> bool {
        self.hands.is_defeated()
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.hands)
    }
}

/// Hands out ids and default names while a single game is being set up.
///
/// Human and computer seats are numbered independently, both starting at 1.
#[derive(Debug, Default)]
pub struct PlayerIdAllocator {
    next_id: u16,
    humans: u32,
    computers: u32,
}

impl PlayerIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> PlayerId {
        let id = PlayerId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Allocates a human seat, named `Player N` unless a name is given.
    pub fn player(&mut self, name: Option<&str>) -> Player {
        self.humans += 1;
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("Player {}", self.humans),
        };
        Player::new(self.next_id(), name)
    }

    /// Allocates a computer seat, named `Computer N` unless a name is given.
    pub fn computer(&mut self, name: Option<&str>) -> Player {
        self.computers += 1;
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("Computer {}", self.computers),
        };
        Player::new(self.next_id(), name)
    }

    pub fn allocated(&self) -> usize {
        usize::from(self.next_id)
    }
}
