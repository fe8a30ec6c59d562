//! Error types for the mechanics engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combat::CombatantId;
use crate::dice::FormulaError;

/// A consumable resource an action can run short of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Charges in a weapon's magazine.
    Charges,
    /// A separately carried ammunition item.
    Ammo,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Charges => write!(f, "charges"),
            Self::Ammo => write!(f, "ammo"),
        }
    }
}

/// Errors that can occur during mechanics operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MechError {
    /// A roll formula is malformed or references an unknown variable.
    #[error("formula error: {0}")]
    Formula(#[from] FormulaError),

    /// An action needs more of a consumable than the actor has.
    #[error("insufficient {kind}: have {have}, need {need}")]
    InsufficientResource {
        /// Which resource ran short.
        kind: ResourceKind,
        /// Amount available.
        have: u32,
        /// Amount required.
        need: u32,
    },

    /// A combatant has no resolvable actor.
    #[error("combatant {0} has no actor")]
    MissingActorBinding(CombatantId),

    /// A policy or mode tag was not recognized.
    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    /// The actor does not carry the requested item.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// The item used for an attack is not a weapon.
    #[error("{0} is not a weapon")]
    NotAWeapon(String),

    /// Burst fire was requested from a weapon that cannot fire bursts.
    #[error("{0} cannot fire a burst")]
    BurstNotSupported(String),

    /// The encounter has ended and accepts no further transitions.
    #[error("combat has ended")]
    CombatEnded,

    /// The encounter has not been started yet.
    #[error("combat has not started")]
    CombatNotStarted,

    /// The encounter was already started.
    #[error("combat already started")]
    CombatAlreadyStarted,

    /// No combatant with this id is part of the encounter.
    #[error("combatant not found: {0}")]
    CombatantNotFound(CombatantId),

    /// The turn order is empty.
    #[error("no active combatant")]
    NoActiveCombatant,

    /// Some combatants still need an initiative roll.
    #[error("{0} combatant(s) have not rolled initiative")]
    InitiativePending(usize),
}

/// Convenience result type for mechanics operations.
pub type MechResult<T> = Result<T, MechError>;
