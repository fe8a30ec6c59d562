//! Encounter participants.

use std::fmt;

use serde::{Deserialize, Serialize};
use swn_core::ActorId;
use uuid::Uuid;

use crate::initiative::{Disposition, Group, InitiativeValue};

/// Unique identifier for a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatantId(pub Uuid);

impl CombatantId {
    /// Generate a new random combatant ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CombatantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// One participant in an encounter.
///
/// The actor is referenced by ID only; the combatant never owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    /// Stable identifier.
    #[serde(default)]
    pub id: CombatantId,
    /// Display name.
    pub name: String,
    /// The actor this combatant stands for, if bound.
    #[serde(default)]
    pub actor: Option<ActorId>,
    /// Current initiative.
    #[serde(default)]
    pub initiative: InitiativeValue,
    /// Out of the fight.
    #[serde(default)]
    pub defeated: bool,
    /// Explicit group; falls back to the disposition's group.
    #[serde(default)]
    pub group: Option<Group>,
    /// Token disposition.
    #[serde(default)]
    pub disposition: Disposition,
}

impl Combatant {
    /// A combatant bound to an actor.
    pub fn new(name: impl Into<String>, actor: ActorId) -> Self {
        Self {
            actor: Some(actor),
            ..Self::unbound(name)
        }
    }

    /// A combatant with no actor behind it.
    pub fn unbound(name: impl Into<String>) -> Self {
        Self {
            id: CombatantId::new(),
            name: name.into(),
            actor: None,
            initiative: InitiativeValue::Pending,
            defeated: false,
            group: None,
            disposition: Disposition::Unset,
        }
    }

    /// Assign an explicit group.
    pub fn with_group(mut self, group: Group) -> Self {
        self.group = Some(group);
        self
    }

    /// Set the token disposition.
    pub fn with_disposition(mut self, disposition: Disposition) -> Self {
        self.disposition = disposition;
        self
    }

    /// The group this combatant rolls with.
    pub fn effective_group(&self) -> Group {
        self.group.unwrap_or_else(|| self.disposition.into())
    }
}
