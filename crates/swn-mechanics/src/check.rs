//! Committing roll specs, and the standard checks built on them.
//!
//! Every check here is a pure function from an actor to a [`RollSpec`];
//! nothing is rolled until the spec is passed to [`commit`]. A caller can
//! show the spec, let the user adjust it, or drop it without any dice
//! being consumed.

use serde::{Deserialize, Serialize};
use swn_core::{Ability, Actor};

use crate::dice::{DiceTerm, Die, DieRoller, RollContext, RollResult, RollSpec};
use crate::error::{MechError, MechResult};
use crate::resolution::{self, ComparisonPolicy, LookupTable, Outcome};

/// Skill rank used when the actor is untrained.
pub const UNTRAINED_SKILL: i32 = -1;

/// An evaluated roll and, if the spec declared a policy, its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// The evaluated roll.
    pub roll: RollResult,
    /// Classified outcome; `None` for plain rolls.
    pub outcome: Option<Outcome>,
}

impl CheckResult {
    /// Returns true if the outcome is a success.
    pub fn is_success(&self) -> bool {
        self.outcome.as_ref().is_some_and(Outcome::is_success)
    }
}

impl std::fmt::Display for CheckResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.outcome {
            Some(outcome) => write!(f, "{}: {outcome}", self.roll),
            None => write!(f, "{}", self.roll),
        }
    }
}

/// Evaluate a spec and classify its total.
///
/// Every validation happens before the first die is rolled: an unknown
/// variable or a comparison without a target consumes no dice.
pub fn commit<R: DieRoller + ?Sized>(
    spec: &RollSpec,
    ctx: &RollContext,
    roller: &mut R,
) -> MechResult<CheckResult> {
    let target = match (&spec.policy, spec.target) {
        (None, _) => None,
        (Some(ComparisonPolicy::TableLookup(_)), target) => Some(target.unwrap_or(0)),
        (Some(policy), None) => {
            return Err(MechError::InvalidPolicy(format!(
                "{} requires a target",
                policy.tag()
            )));
        }
        (Some(_), Some(target)) => Some(target),
    };

    let roll = spec.evaluate(ctx, roller)?;
    let outcome = spec
        .policy
        .as_ref()
        .zip(target)
        .map(|(policy, target)| resolution::resolve(policy, &roll, target));
    Ok(CheckResult { roll, outcome })
}

/// The best of several abilities with its modifier.
pub(crate) fn best_ability(actor: &Actor, abilities: &[Ability]) -> Option<(Ability, i32)> {
    abilities
        .iter()
        .map(|a| (*a, actor.ability_modifier(*a)))
        .max_by_key(|(_, m)| *m)
}

/// A skill check: `2d6 + skill + best ability modifier` against a
/// difficulty. Untrained skills count as -1.
pub fn skill_check(actor: &Actor, skill: &str, abilities: &[Ability], difficulty: i32) -> RollSpec {
    let rank = actor.skill_rank(skill).unwrap_or(UNTRAINED_SKILL);
    let mut builder = RollSpec::builder()
        .dice("skill check", DiceTerm::plain(2, Die::D6))
        .modifier(skill.to_lowercase(), rank);
    if let Some((ability, modifier)) = best_ability(actor, abilities) {
        builder = builder.modifier(ability.short(), modifier);
    }
    builder.compare(ComparisonPolicy::Above, difficulty).build()
}

/// A saving throw: `1d20 + best ability modifier + bonus` against the
/// actor's save target.
pub fn saving_throw(actor: &Actor, abilities: &[Ability], bonus: i32) -> RollSpec {
    let mut builder = RollSpec::builder().dice("save", DiceTerm::plain(1, Die::D20));
    if let Some((ability, modifier)) = best_ability(actor, abilities) {
        builder = builder.modifier(ability.short(), modifier);
    }
    builder
        .modifier("bonus", bonus)
        .compare(ComparisonPolicy::Above, actor.save_target)
        .build()
}

/// A straight attribute check: `1d20` at or under the score. A natural 1
/// always passes and a natural 20 always fails.
pub fn attribute_check(actor: &Actor, ability: Ability) -> RollSpec {
    RollSpec::builder()
        .dice(ability.short(), DiceTerm::plain(1, Die::D20))
        .compare(ComparisonPolicy::Check, actor.abilities.score(ability))
        .build()
}

/// A morale check: `2d6` at or under the actor's morale holds.
pub fn morale_check(actor: &Actor) -> RollSpec {
    RollSpec::builder()
        .dice("morale", DiceTerm::plain(2, Die::D6))
        .compare(ComparisonPolicy::Below, actor.morale)
        .build()
}

/// An instinct check: `1d10` against the instinct score. A failure tells
/// the caller to consult the NPC's instinct table.
pub fn instinct_check(actor: &Actor) -> RollSpec {
    RollSpec::builder()
        .dice("instinct", DiceTerm::plain(1, Die::D10))
        .compare(ComparisonPolicy::Instinct, actor.instinct)
        .build()
}

/// An NPC reaction roll: `2d6 + modifier` read from the reaction table.
pub fn reaction_roll(modifier: i32) -> RollSpec {
    RollSpec::builder()
        .dice("reaction", DiceTerm::plain(2, Die::D6))
        .modifier("cha", modifier)
        .lookup(LookupTable::reaction())
        .build()
}
