//! The encounter log.

use serde::{Deserialize, Serialize};

use super::CombatantId;
use crate::initiative::{InitiativeRoll, InitiativeValue};

/// Something that happened during an encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CombatEvent {
    /// The encounter began.
    Started {
        /// Round number.
        round: u32,
    },
    /// Initiative values were written as one batch.
    InitiativeRolled {
        /// Round number.
        round: u32,
        /// Values assigned.
        values: Vec<(CombatantId, InitiativeValue)>,
        /// Rolls made.
        rolls: Vec<InitiativeRoll>,
        /// Combatants skipped for lack of an actor.
        skipped: Vec<CombatantId>,
    },
    /// A combatant's turn began.
    TurnStarted {
        /// Round number.
        round: u32,
        /// Whose turn it is.
        combatant: CombatantId,
        /// Their display name.
        name: String,
    },
    /// A round ended.
    RoundEnded {
        /// The round that ended.
        round: u32,
    },
    /// A combatant was marked defeated.
    CombatantDefeated {
        /// Round number.
        round: u32,
        /// Who fell.
        combatant: CombatantId,
        /// Their display name.
        name: String,
    },
    /// The encounter ended.
    Ended {
        /// Final round number.
        round: u32,
    },
}

impl std::fmt::Display for CombatEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Started { round } => write!(f, "[{round}] combat started"),
            Self::InitiativeRolled {
                round,
                values,
                skipped,
                ..
            } => {
                write!(f, "[{round}] initiative rolled for {}", values.len())?;
                if !skipped.is_empty() {
                    write!(f, " ({} skipped)", skipped.len())?;
                }
                Ok(())
            }
            Self::TurnStarted { round, name, .. } => write!(f, "[{round}] {name}'s turn"),
            Self::RoundEnded { round } => write!(f, "[{round}] round ended"),
            Self::CombatantDefeated { round, name, .. } => write!(f, "[{round}] {name} defeated"),
            Self::Ended { round } => write!(f, "[{round}] combat ended"),
        }
    }
}
