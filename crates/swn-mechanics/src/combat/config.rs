//! Encounter configuration.

use serde::{Deserialize, Serialize};

use crate::initiative::{InitiativeMode, RerollPolicy};

/// The switches an encounter runs under.
///
/// Passed by value to [`crate::Combat::new`] and the initiative engine; no
/// other settings are consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Group or individual initiative.
    pub initiative_mode: InitiativeMode,
    /// What happens to initiative at round end.
    pub reroll_policy: RerollPolicy,
    /// Roll hit points for NPCs as they join.
    pub random_hp: bool,
    /// Pass over defeated combatants when advancing turns.
    pub skip_defeated: bool,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            initiative_mode: InitiativeMode::Group,
            reroll_policy: RerollPolicy::Reset,
            random_hp: false,
            skip_defeated: true,
        }
    }
}

impl CombatConfig {
    /// Set the initiative mode.
    pub fn with_initiative_mode(mut self, mode: InitiativeMode) -> Self {
        self.initiative_mode = mode;
        self
    }

    /// Set the round-end policy.
    pub fn with_reroll_policy(mut self, policy: RerollPolicy) -> Self {
        self.reroll_policy = policy;
        self
    }

    /// Toggle random NPC hit points.
    pub fn with_random_hp(mut self, random_hp: bool) -> Self {
        self.random_hp = random_hp;
        self
    }

    /// Toggle skipping defeated combatants.
    pub fn with_skip_defeated(mut self, skip: bool) -> Self {
        self.skip_defeated = skip;
        self
    }
}
