//! Pocket table: colors, wheel sequences and the red/black partition.
//!
//! Everything here is constant data or a pure function of it, so it can be
//! read from any thread without coordination.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Red numbers on a roulette wheel.
pub const RED_NUMBERS: [u8; 18] = [1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36];

/// Black numbers on a roulette wheel.
pub const BLACK_NUMBERS: [u8; 18] = [2, 4, 6, 8, 10, 11, 13, 15, 17, 20, 22, 24, 26, 28, 29, 31, 33, 35];

/// Highest ordinary pocket number.
pub const MAX_NUMBER: u8 = 36;

pub const ZERO: Pocket = Pocket::Number(0);
pub const DOUBLE_ZERO: Pocket = Pocket::DoubleZero;

/// Clockwise pocket order of the single-zero wheel.
const EUROPEAN_SEQUENCE: [Pocket; 37] = [
    Pocket::Number(0), Pocket::Number(32), Pocket::Number(15), Pocket::Number(19),
    Pocket::Number(4), Pocket::Number(21), Pocket::Number(2), Pocket::Number(25),
    Pocket::Number(17), Pocket::Number(34), Pocket::Number(6), Pocket::Number(27),
    Pocket::Number(13), Pocket::Number(36), Pocket::Number(11), Pocket::Number(30),
    Pocket::Number(8), Pocket::Number(23), Pocket::Number(10), Pocket::Number(5),
    Pocket::Number(24), Pocket::Number(16), Pocket::Number(33), Pocket::Number(1),
    Pocket::Number(20), Pocket::Number(14), Pocket::Number(31), Pocket::Number(9),
    Pocket::Number(22), Pocket::Number(18), Pocket::Number(29), Pocket::Number(7),
    Pocket::Number(28), Pocket::Number(12), Pocket::Number(35), Pocket::Number(3),
    Pocket::Number(26),
];

/// Clockwise pocket order of the double-zero wheel.
const AMERICAN_SEQUENCE: [Pocket; 38] = [
    Pocket::Number(0), Pocket::Number(28), Pocket::Number(9), Pocket::Number(26),
    Pocket::Number(30), Pocket::Number(11), Pocket::Number(7), Pocket::Number(20),
    Pocket::Number(32), Pocket::Number(17), Pocket::Number(5), Pocket::Number(22),
    Pocket::Number(34), Pocket::Number(15), Pocket::Number(3), Pocket::Number(24),
    Pocket::Number(36), Pocket::Number(13), Pocket::Number(1), Pocket::DoubleZero,
    Pocket::Number(27), Pocket::Number(10), Pocket::Number(25), Pocket::Number(29),
    Pocket::Number(12), Pocket::Number(8), Pocket::Number(19), Pocket::Number(31),
    Pocket::Number(18), Pocket::Number(6), Pocket::Number(21), Pocket::Number(33),
    Pocket::Number(16), Pocket::Number(4), Pocket::Number(23), Pocket::Number(35),
    Pocket::Number(14), Pocket::Number(2),
];

/// One slot on the wheel.
///
/// Double zero is its own variant rather than a reserved integer, so no
/// arithmetic on pocket numbers can ever produce it by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pocket {
    Number(u8),
    DoubleZero,
}

impl Pocket {
    /// Ordinary pocket `0..=36`, `None` outside that range.
    pub fn number(n: u8) -> Option<Self> {
        (n <= MAX_NUMBER).then_some(Pocket::Number(n))
    }

    /// Pocket number for `1..=36`, `None` for either zero.
    pub fn value(self) -> Option<u8> {
        match self {
            Pocket::Number(n) if n > 0 && n <= MAX_NUMBER => Some(n),
            _ => None,
        }
    }

    pub fn is_zero(self) -> bool {
        matches!(self, Pocket::Number(0) | Pocket::DoubleZero)
    }

    pub fn color(self) -> PocketColor {
        color_of(self)
    }
}

impl fmt::Display for Pocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pocket::Number(n) => write!(f, "{}", n),
            Pocket::DoubleZero => write!(f, "00"),
        }
    }
}

/// Pocket color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PocketColor {
    Green,
    Red,
    Black,
}

impl fmt::Display for PocketColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PocketColor::Green => write!(f, "green"),
            PocketColor::Red => write!(f, "red"),
            PocketColor::Black => write!(f, "black"),
        }
    }
}

/// Wheel layout, fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelKind {
    /// Single zero, 37 pockets
    #[default]
    European,
    /// Zero and double zero, 38 pockets
    American,
}

impl WheelKind {
    pub fn pocket_count(self) -> usize {
        self.sequence().len()
    }

    /// Pockets in clockwise wheel order, starting at zero.
    pub fn sequence(self) -> &'static [Pocket] {
        match self {
            WheelKind::European => &EUROPEAN_SEQUENCE,
            WheelKind::American => &AMERICAN_SEQUENCE,
        }
    }

    pub fn pocket_at(self, index: usize) -> Option<Pocket> {
        self.sequence().get(index).copied()
    }

    pub fn contains(self, pocket: Pocket) -> bool {
        match pocket {
            Pocket::Number(n) => n <= MAX_NUMBER,
            Pocket::DoubleZero => self == WheelKind::American,
        }
    }

    /// Angular width of a single pocket in degrees.
    pub fn pocket_arc(self) -> f64 {
        360.0 / self.pocket_count() as f64
    }
}

impl fmt::Display for WheelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WheelKind::European => write!(f, "european"),
            WheelKind::American => write!(f, "american"),
        }
    }
}

/// Check if a number is red.
pub fn is_red(number: u8) -> bool {
    RED_NUMBERS.contains(&number)
}

pub fn color_of(pocket: Pocket) -> PocketColor {
    match pocket {
        Pocket::Number(n) if is_red(n) => PocketColor::Red,
        Pocket::Number(n) if BLACK_NUMBERS.contains(&n) => PocketColor::Black,
        _ => PocketColor::Green,
    }
}

/// Position of `pocket` in the clockwise sequence of `wheel`.
pub fn wheel_index_of(wheel: WheelKind, pocket: Pocket) -> Option<usize> {
    wheel.sequence().iter().position(|p| *p == pocket)
}
