use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest finger count a single hand can hold.
pub const MAX_FINGERS: u8 = 4;

/// Finger totals wrap around this modulus when a hand is tapped.
pub const FINGER_MODULUS: u8 = 5;

/// Adds the attacking hand into the defending hand, wrapping modulo 5.
///
/// Defined for every `u8` pair; operands are reduced before adding.
pub const fn tap(attacking: u8, defending: u8) -> u8 {
    (attacking % FINGER_MODULUS + defending % FINGER_MODULUS) % FINGER_MODULUS
}

/// One of the two hands that can be tapped directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HandSide {
    Left = 0,
    Right = 1,
}

impl HandSide {
    pub const BOTH: [HandSide; 2] = [HandSide::Left, HandSide::Right];

    pub const fn as_str(self) -> &'static str {
        match self {
            HandSide::Left => "left",
            HandSide::Right => "right",
        }
    }
}

impl fmt::Display for HandSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the acting player does with their own hands.
///
/// `Split` evens out the acting player's fingers and then taps with the left
/// hand, so it never ends a turn on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HandAction {
    Left = 0,
    Right = 1,
    Split = 2,
}

impl HandAction {
    pub const ORDER: [HandAction; 3] = [HandAction::Left, HandAction::Right, HandAction::Split];

    /// The hand that delivers the tap once any split has been resolved.
    pub const fn tapping_side(self) -> HandSide {
        match self {
            HandAction::Left | HandAction::Split => HandSide::Left,
            HandAction::Right => HandSide::Right,
        }
    }

    /// The directly tappable side this action names, if any.
    pub const fn as_side(self) -> Option<HandSide> {
        match self {
            HandAction::Left => Some(HandSide::Left),
            HandAction::Right => Some(HandSide::Right),
            HandAction::Split => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            HandAction::Left => "left",
            HandAction::Right => "right",
            HandAction::Split => "split",
        }
    }
}

impl fmt::Display for HandAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HandError {
    #[error("finger count {value} is outside 0..=4")]
    OutOfRange { value: u8 },
}

/// A player's two finger counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Hands {
    left: u8,
    right: u8,
}

impl Hands {
    pub const STARTING: Hands = Hands { left: 1, right: 1 };

    pub fn new(left: u8, right: u8) -> Result<Self, HandError> {
        for value in [left, right] {
            if value > MAX_FINGERS {
                return Err(HandError::OutOfRange { value });
            }
        }
        Ok(Self { left, right })
    }

    pub const fn left(self) -> u8 {
        self.left
    }

    pub const fn right(self) -> u8 {
        self.right
    }

    pub const fn value(self, side: HandSide) -> u8 {
        match side {
            HandSide::Left => self.left,
            HandSide::Right => self.right,
        }
    }

    pub fn set(&mut self, side: HandSide, value: u8) -> Result<(), HandError> {
        if value > MAX_FINGERS {
            return Err(HandError::OutOfRange { value });
        }
        match side {
            HandSide::Left => self.left = value,
            HandSide::Right => self.right = value,
        }
        Ok(())
    }

    /// Taps `side` of these hands with `attacking` fingers.
    pub fn receive_tap(&mut self, side: HandSide, attacking: u8) {
        let updated = tap(attacking, self.value(side));
        match side {
            HandSide::Left => self.left = updated,
            HandSide::Right => self.right = updated,
        }
    }

    pub const fn is_defeated(self) -> bool {
        self.left == 0 && self.right == 0
    }

    /// True only for `(0,2)`, `(2,0)`, `(0,4)` and `(4,0)`.
    pub const fn is_split_possible(self) -> bool {
        match (self.left, self.right) {
            (0, other) | (other, 0) => other == 2 || other == 4,
            _ => false,
        }
    }

    /// Both hands become the truncated mean of the current total.
    pub const fn split(self) -> Hands {
        let even = (self.left + self.right) / 2;
        Hands {
            left: even,
            right: even,
        }
    }
}

impl Default for Hands {
    fn default() -> Self {
        Self::STARTING
    }
}

impl fmt::Display for Hands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.left, self.right)
    }
}
