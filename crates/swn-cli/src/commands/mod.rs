pub mod attack;
pub mod check;
pub mod encounter;
pub mod roll;

use std::path::Path;

use clap::ValueEnum;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use swn_core::{Actor, ActorKind, Roster};
use swn_mechanics::{
    Combat, CombatConfig, Combatant, DieRoller, Disposition, Group, InitiativeValue,
    roll_hit_points,
};

/// The kinds of check the `check` command can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CheckKind {
    Skill,
    Save,
    Attribute,
    Morale,
    Instinct,
    Reaction,
}

/// Seeded when asked, otherwise from OS entropy.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// One combatant line in an encounter file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantEntry {
    pub name: String,
    /// Name of the actor this combatant stands for.
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub disposition: Disposition,
    #[serde(default)]
    pub group: Option<Group>,
    #[serde(default)]
    pub defeated: bool,
}

/// An encounter as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncounterFile {
    #[serde(default)]
    pub config: CombatConfig,
    #[serde(default)]
    pub actors: Vec<Actor>,
    /// Omitted: one combatant per actor, NPCs hostile and characters
    /// friendly.
    #[serde(default)]
    pub combatants: Vec<CombatantEntry>,
}

impl EncounterFile {
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read '{}': {e}", path.display()))?;
        let file: Self = serde_json::from_str(&text)
            .map_err(|e| format!("invalid encounter '{}': {e}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            actors = file.actors.len(),
            combatants = file.combatants.len(),
            "loaded encounter"
        );
        Ok(file)
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let text = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, text + "\n")
            .map_err(|e| format!("cannot write '{}': {e}", path.display()))
    }

    /// Move the actors into a roster, rejecting duplicate names.
    pub fn take_roster(&mut self) -> Result<Roster, String> {
        Roster::try_from(std::mem::take(&mut self.actors)).map_err(|e| e.to_string())
    }

    /// Build an inactive encounter from the combatant entries. With
    /// `random_hp` set, NPCs roll their hit points as they join.
    pub fn build_combat<R: DieRoller + ?Sized>(
        &self,
        roster: &mut Roster,
        roller: &mut R,
    ) -> Result<Combat, String> {
        let mut combat = Combat::new(self.config);
        for entry in self.entries(roster) {
            let mut combatant = match &entry.actor {
                Some(actor_name) => {
                    let id = roster
                        .find_id_by_name(actor_name)
                        .ok_or_else(|| format!("unknown actor '{actor_name}' for '{}'", entry.name))?;
                    if self.config.random_hp {
                        let actor = roster
                            .get_mut(id)
                            .ok_or_else(|| format!("actor '{actor_name}' not found"))?;
                        roll_hit_points(actor, roller).map_err(|e| e.to_string())?;
                    }
                    Combatant::new(&entry.name, id)
                }
                None => Combatant::unbound(&entry.name),
            }
            .with_disposition(entry.disposition);
            combatant.group = entry.group;
            combatant.defeated = entry.defeated;
            if entry.defeated {
                combatant.initiative = InitiativeValue::Defeated;
            }
            combat.add_combatant(combatant).map_err(|e| e.to_string())?;
        }
        Ok(combat)
    }

    fn entries(&self, roster: &Roster) -> Vec<CombatantEntry> {
        if !self.combatants.is_empty() {
            return self.combatants.clone();
        }
        roster
            .iter()
            .map(|actor| CombatantEntry {
                name: actor.name.clone(),
                actor: Some(actor.name.clone()),
                disposition: match actor.kind {
                    ActorKind::Npc => Disposition::Hostile,
                    ActorKind::Character => Disposition::Friendly,
                },
                group: None,
                defeated: false,
            })
            .collect()
    }
}

/// Look up an actor by name, with a readable error.
pub fn find_actor<'a>(roster: &'a Roster, name: &str) -> Result<&'a Actor, String> {
    roster
        .find_by_name(name)
        .ok_or_else(|| format!("actor '{name}' not found"))
}
