//! Rolling initiative for a whole encounter at once.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use swn_core::{ActorDirectory, AlertLevel};

use super::{Group, InitiativeMode, InitiativeValue, VIGILANT_OFFSET};
use crate::combat::{CombatConfig, Combatant, CombatantId};
use crate::dice::{DiceTerm, Die, DieRoller, Keep, RollContext, RollResult, RollSpec};

/// One initiative roll and everyone who shares its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeRoll {
    /// Combatants that received this value.
    pub combatants: Vec<CombatantId>,
    /// The group that rolled together, or `None` for an individual roll.
    pub group: Option<Group>,
    /// The evaluated roll, including any vigilant offset.
    pub roll: RollResult,
    /// Vigilant offset included in the total; subtract it for display.
    pub offset: i32,
}

impl InitiativeRoll {
    /// The initiative value this roll assigns.
    pub fn value(&self) -> InitiativeValue {
        InitiativeValue::Rolled(self.roll.total)
    }

    /// The score without the vigilant offset.
    pub fn display_score(&self) -> i32 {
        self.roll.total - self.offset
    }
}

/// The result of rolling initiative for every combatant.
///
/// Nothing is written to the combatants until the batch is applied as a
/// whole with [`crate::Combat::apply_batch`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeBatch {
    /// New values, in combatant order.
    pub updates: Vec<(CombatantId, InitiativeValue)>,
    /// Every roll made.
    pub rolls: Vec<InitiativeRoll>,
    /// Combatants left unchanged because their actor could not be resolved.
    pub skipped: Vec<CombatantId>,
}

impl InitiativeBatch {
    /// The new value for one combatant, if the batch assigns one.
    pub fn value_of(&self, id: CombatantId) -> Option<InitiativeValue> {
        self.updates.iter().find(|(c, _)| *c == id).map(|(_, v)| *v)
    }
}

/// Computes initiative under one configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct InitiativeEngine {
    config: CombatConfig,
}

struct GroupBucket {
    group: Group,
    members: Vec<CombatantId>,
    modifier: i32,
}

impl InitiativeEngine {
    /// Create an engine for a configuration.
    pub fn new(config: CombatConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Roll initiative for every combatant.
    ///
    /// Defeated combatants get [`InitiativeValue::Defeated`]. Combatants
    /// whose actor cannot be resolved are skipped and logged; the rest of
    /// the batch is unaffected.
    pub fn roll_all<D, R>(&self, combatants: &[Combatant], actors: &D, roller: &mut R) -> InitiativeBatch
    where
        D: ActorDirectory + ?Sized,
        R: DieRoller + ?Sized,
    {
        let mut batch = InitiativeBatch::default();
        let mut values: HashMap<CombatantId, InitiativeValue> = HashMap::new();
        let mut groups: BTreeMap<&'static str, GroupBucket> = BTreeMap::new();

        for combatant in combatants {
            if combatant.defeated {
                values.insert(combatant.id, InitiativeValue::Defeated);
                continue;
            }
            let Some(actor) = combatant.actor.and_then(|id| actors.actor(id)) else {
                tracing::warn!(
                    combatant = %combatant.name,
                    id = %combatant.id,
                    "no actor for combatant, skipping initiative"
                );
                batch.skipped.push(combatant.id);
                continue;
            };
            let modifier = actor.initiative_modifier();

            if self.config.initiative_mode == InitiativeMode::Group && !actor.alert.is_alert() {
                let group = combatant.effective_group();
                let bucket = groups.entry(group.label()).or_insert_with(|| GroupBucket {
                    group,
                    members: Vec::new(),
                    modifier,
                });
                bucket.modifier = bucket.modifier.max(modifier);
                bucket.members.push(combatant.id);
                continue;
            }

            let keep_best = self.config.initiative_mode == InitiativeMode::Individual
                && actor.alert.is_alert();
            let offset = if actor.alert == AlertLevel::Vigilant {
                VIGILANT_OFFSET
            } else {
                0
            };
            let dice = if keep_best {
                DiceTerm {
                    count: 2,
                    die: Die::D8,
                    keep: Keep::Highest(1),
                }
            } else {
                DiceTerm::plain(1, Die::D8)
            };
            let spec = RollSpec::builder()
                .dice("initiative", dice)
                .modifier("init", modifier)
                .modifier("vigilant", offset)
                .build();
            match spec.evaluate(&RollContext::new(), roller) {
                Ok(roll) => {
                    values.insert(combatant.id, InitiativeValue::Rolled(roll.total));
                    batch.rolls.push(InitiativeRoll {
                        combatants: vec![combatant.id],
                        group: None,
                        roll,
                        offset,
                    });
                }
                Err(err) => {
                    tracing::warn!(combatant = %combatant.name, %err, "initiative roll failed");
                    batch.skipped.push(combatant.id);
                }
            }
        }

        for bucket in groups.into_values() {
            let spec = RollSpec::builder()
                .dice(bucket.group.label(), DiceTerm::plain(1, Die::D8))
                .modifier("init", bucket.modifier)
                .build();
            match spec.evaluate(&RollContext::new(), roller) {
                Ok(roll) => {
                    for id in &bucket.members {
                        values.insert(*id, InitiativeValue::Rolled(roll.total));
                    }
                    batch.rolls.push(InitiativeRoll {
                        combatants: bucket.members,
                        group: Some(bucket.group),
                        roll,
                        offset: 0,
                    });
                }
                Err(err) => {
                    tracing::warn!(group = %bucket.group, %err, "group initiative roll failed");
                    batch.skipped.extend(bucket.members);
                }
            }
        }

        batch.updates = combatants
            .iter()
            .filter_map(|c| values.get(&c.id).map(|v| (c.id, *v)))
            .collect();
        tracing::debug!(
            mode = %self.config.initiative_mode,
            rolled = batch.rolls.len(),
            skipped = batch.skipped.len(),
            "rolled initiative"
        );
        batch
    }
}
