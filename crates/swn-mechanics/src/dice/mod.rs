//! Dice, formulas, and roll evaluation.
//!
//! A formula such as `1d20 + @dex + 2` is parsed into a [`RollSpec`], an
//! immutable list of terms. Evaluating the spec against a [`RollContext`]
//! and a [`DieRoller`] produces a [`RollResult`] with the total, a per-term
//! breakdown, and the face of the primary die.

pub mod formula;
pub mod roll;
pub mod roller;
pub mod spec;

pub use formula::FormulaError;
pub use roll::{DieResult, RollResult, TermResult};
pub use roller::{DieRoller, ScriptedRoller};
pub use spec::{DiceTerm, Keep, RollContext, RollSpec, RollSpecBuilder, Sign, Term, TermKind};

use serde::{Deserialize, Serialize};

/// A polyhedral die type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Die {
    /// Two-sided die (unarmed damage).
    D2,
    /// Four-sided die.
    D4,
    /// Six-sided die.
    D6,
    /// Eight-sided die.
    D8,
    /// Ten-sided die.
    D10,
    /// Twelve-sided die.
    D12,
    /// Twenty-sided die.
    D20,
    /// Percentile die (1-100).
    D100,
    /// A die with a custom number of sides.
    Custom(u32),
}

impl Die {
    /// Returns the number of sides on this die.
    pub fn sides(self) -> u32 {
        match self {
            Self::D2 => 2,
            Self::D4 => 4,
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D10 => 10,
            Self::D12 => 12,
            Self::D20 => 20,
            Self::D100 => 100,
            Self::Custom(n) => n,
        }
    }

    /// The die with the given number of sides, or `None` below two.
    pub fn from_sides(sides: u32) -> Option<Self> {
        match sides {
            0 | 1 => None,
            2 => Some(Self::D2),
            4 => Some(Self::D4),
            6 => Some(Self::D6),
            8 => Some(Self::D8),
            10 => Some(Self::D10),
            12 => Some(Self::D12),
            20 => Some(Self::D20),
            100 => Some(Self::D100),
            n => Some(Self::Custom(n)),
        }
    }
}

impl std::fmt::Display for Die {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.sides())
    }
}
