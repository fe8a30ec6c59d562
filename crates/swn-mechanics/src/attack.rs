//! Attack resolution.
//!
//! Resolving an attack happens in three steps:
//!
//! 1. [`plan_attack`] builds the attack and damage specs and the resource
//!    cost from the attacker's sheet. Nothing is mutated or rolled.
//! 2. The resource guard checks charges and ammunition. A shortage aborts
//!    here, before any die is rolled.
//! 3. The attack roll is evaluated and compared against the target's
//!    defense, then the damage roll is evaluated. Only once both rolls
//!    succeed are the resources spent.
//!
//! Damage is always rolled and reported. Whether it lands is the caller's
//! business; see [`AttackReport::damage_dealt`] and
//! [`swn_core::Actor::apply_damage`].

use serde::{Deserialize, Serialize};
use swn_core::{Actor, ItemId, Weapon};

use crate::check::best_ability;
use crate::dice::{DiceTerm, Die, DieRoller, RollContext, RollResult, RollSpec};
use crate::error::{MechError, MechResult};
use crate::resolution::{self, ComparisonPolicy, Outcome};
use crate::resource::{self, ActionCost, Reservation};

/// Bonus to hit for a charge attack.
pub const CHARGE_BONUS: i32 = 2;
/// Bonus to hit and damage for burst fire.
pub const BURST_BONUS: i32 = 2;
/// Penalty to hit for an untrained combat skill.
pub const UNSKILLED_PENALTY: i32 = -2;

/// Situational choices for one attack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackOptions {
    /// Defense value the attack roll must meet or beat.
    pub target_defense: i32,
    /// Free-form bonus or penalty to hit.
    #[serde(default)]
    pub situational: i32,
    /// The attacker charges into melee.
    #[serde(default)]
    pub charge: bool,
    /// Fire a burst.
    #[serde(default)]
    pub burst: bool,
}

impl AttackOptions {
    /// Attack against a defense value with no extra options.
    pub fn against(target_defense: i32) -> Self {
        Self {
            target_defense,
            ..Self::default()
        }
    }

    /// Set a situational modifier.
    pub fn with_situational(mut self, modifier: i32) -> Self {
        self.situational = modifier;
        self
    }

    /// Make this a charge attack.
    pub fn with_charge(mut self, charge: bool) -> Self {
        self.charge = charge;
        self
    }

    /// Fire a burst.
    pub fn with_burst(mut self, burst: bool) -> Self {
        self.burst = burst;
        self
    }
}

/// A temporary effect an attack places on the attacker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum AttackEffect {
    /// The attacker's defense drops for a number of rounds.
    DefensePenalty {
        /// Points of defense lost.
        amount: i32,
        /// Rounds the penalty lasts.
        rounds: u32,
    },
}

/// Everything needed to carry out an attack, computed without side effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackPlan {
    /// Weapon item used; `None` for an unarmed strike.
    pub weapon: Option<ItemId>,
    /// Display name of the weapon.
    pub weapon_name: String,
    /// Attack roll, compared `above` against the target's defense.
    pub attack: RollSpec,
    /// Damage roll.
    pub damage: RollSpec,
    /// Resources the attack consumes.
    pub cost: ActionCost,
    /// Effects on the attacker.
    pub effects: Vec<AttackEffect>,
}

/// The result of a resolved attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackReport {
    /// Display name of the weapon.
    pub weapon_name: String,
    /// Evaluated attack roll.
    pub attack: RollResult,
    /// Hit or miss against the target's defense.
    pub outcome: Outcome,
    /// Evaluated damage roll.
    pub damage: RollResult,
    /// Resources the attack spent.
    pub reservation: Reservation,
    /// Effects on the attacker.
    pub effects: Vec<AttackEffect>,
}

impl AttackReport {
    /// Returns true if the attack hit.
    pub fn hit(&self) -> bool {
        self.outcome.is_success()
    }

    /// Damage to apply to the target: the damage total on a hit, never
    /// negative, and zero on a miss.
    pub fn damage_dealt(&self) -> i32 {
        if self.hit() { self.damage.total.max(0) } else { 0 }
    }
}

/// The weapon an unarmed attacker fights with.
fn unarmed() -> Weapon {
    let mut fists = Weapon::melee("1d2");
    fists.skill = "Punch".to_string();
    fists.skill_adds_damage = true;
    fists
}

/// Build the attack and damage specs for an attack.
pub fn plan_attack(
    attacker: &Actor,
    weapon: Option<ItemId>,
    options: &AttackOptions,
) -> MechResult<AttackPlan> {
    let (weapon_name, stats) = match weapon {
        Some(id) => {
            let item = attacker
                .item(id)
                .ok_or_else(|| MechError::ItemNotFound(id.to_string()))?;
            let stats = item
                .weapon()
                .ok_or_else(|| MechError::NotAWeapon(item.name.clone()))?;
            (item.name.clone(), stats.clone())
        }
        None => ("Unarmed".to_string(), unarmed()),
    };

    if options.burst && !stats.burst_capable {
        return Err(MechError::BurstNotSupported(weapon_name));
    }

    let ability = best_ability(attacker, &stats.abilities);
    let skill = attacker.skill_rank(&stats.skill);
    let skill_label = stats.skill.to_lowercase();

    let mut attack = RollSpec::builder().dice("attack", DiceTerm::plain(1, Die::D20));
    if let Some((ability, modifier)) = ability {
        attack = attack.modifier(ability.short(), modifier);
    }
    attack = match skill {
        Some(rank) => attack.modifier(skill_label.as_str(), rank),
        None => attack.modifier("unskilled", UNSKILLED_PENALTY),
    };
    attack = attack
        .modifier("weapon", stats.to_hit)
        .modifier("attack bonus", attacker.attack_bonus)
        .modifier("situational", options.situational);

    let mut effects = Vec::new();
    if options.charge {
        attack = attack.modifier("charge", CHARGE_BONUS);
        effects.push(AttackEffect::DefensePenalty {
            amount: 2,
            rounds: 1,
        });
    }
    if options.burst {
        attack = attack.modifier("burst", BURST_BONUS);
    }
    let attack = attack
        .compare(ComparisonPolicy::Above, options.target_defense)
        .build();

    let mut damage = RollSpec::builder().formula("damage", &stats.damage)?;
    if let Some((ability, modifier)) = ability {
        damage = damage.modifier(ability.short(), modifier);
    }
    damage = damage.modifier("damage bonus", attacker.damage_bonus);
    if stats.skill_adds_damage {
        if let Some(rank) = skill.filter(|r| *r > 0) {
            damage = damage.modifier(skill_label.as_str(), rank);
        }
    }
    if options.burst {
        damage = damage.modifier("burst", BURST_BONUS);
    }

    Ok(AttackPlan {
        weapon,
        weapon_name,
        cost: ActionCost::for_weapon(&stats, options.burst),
        attack,
        damage: damage.build(),
        effects,
    })
}

/// Plan, pay for and roll an attack.
///
/// Resource shortages are reported before any die is rolled. On any error
/// the attacker is left unchanged.
pub fn resolve_attack<R: DieRoller + ?Sized>(
    attacker: &mut Actor,
    weapon: Option<ItemId>,
    options: &AttackOptions,
    roller: &mut R,
) -> MechResult<AttackReport> {
    let plan = plan_attack(attacker, weapon, options)?;
    execute(attacker, plan, roller)
}

/// Roll a previously built plan, then pay for it.
pub fn execute<R: DieRoller + ?Sized>(
    attacker: &mut Actor,
    plan: AttackPlan,
    roller: &mut R,
) -> MechResult<AttackReport> {
    let ctx = RollContext::for_actor(attacker);
    let attack_spec = plan.attack.resolve(&ctx)?;
    let damage_spec = plan.damage.resolve(&ctx)?;

    resource::check(attacker, plan.weapon, &plan.cost)?;

    let attack = attack_spec.evaluate(&ctx, roller)?;
    let outcome = resolution::resolve(
        &ComparisonPolicy::Above,
        &attack,
        plan.attack.target.unwrap_or_default(),
    );
    let damage = damage_spec.evaluate(&ctx, roller)?;

    let reservation = resource::reserve(attacker, plan.weapon, &plan.cost)?;

    tracing::debug!(
        attacker = %attacker.name,
        weapon = %plan.weapon_name,
        total = attack.total,
        hit = outcome.is_success(),
        "attack resolved"
    );

    Ok(AttackReport {
        weapon_name: plan.weapon_name,
        attack,
        outcome,
        damage,
        reservation,
        effects: plan.effects,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::{FormulaError, ScriptedRoller};
    use crate::error::ResourceKind;
    use swn_core::{ActorKind, Charges, Item, ItemKind};

    fn shooter() -> (Actor, ItemId) {
        let mut actor = Actor::new(ActorKind::Character, "Vex");
        actor.abilities.dexterity = 18;
        actor.skills.insert("Shoot".to_string(), 1);
        let mut rifle = Weapon::ranged("1d10", 10);
        rifle.burst_capable = true;
        let item = Item::new("Laser Rifle", ItemKind::Weapon(rifle));
        let id = item.id;
        actor.items.push(item);
        (actor, id)
    }

    #[test]
    fn hit_at_exact_defense() {
        let (mut actor, rifle) = shooter();
        let mut roller = ScriptedRoller::new([11, 6]);
        let report =
            resolve_attack(&mut actor, Some(rifle), &AttackOptions::against(14), &mut roller)
                .unwrap();
        assert_eq!(report.attack.total, 14);
        assert_eq!(
            report.outcome,
            Outcome::Success {
                total: 14,
                target: 14
            }
        );
        insta::assert_snapshot!(
            report.attack.to_string(),
            @"1d20 [11] (attack) + 2 (dex) + 1 (shoot) = 14"
        );
        insta::assert_snapshot!(report.damage.to_string(), @"1d10 [6] (damage) + 2 (dex) = 8");
        assert_eq!(report.damage_dealt(), 8);
        assert_eq!(report.reservation.charges, 1);
    }

    #[test]
    fn miss_still_rolls_damage() {
        let (mut actor, rifle) = shooter();
        let mut roller = ScriptedRoller::new([10, 6]);
        let report =
            resolve_attack(&mut actor, Some(rifle), &AttackOptions::against(14), &mut roller)
                .unwrap();
        assert!(!report.hit());
        assert_eq!(report.damage.total, 8);
        assert_eq!(report.damage_dealt(), 0);
    }

    #[test]
    fn burst_adds_to_hit_and_damage() {
        let (actor, rifle) = shooter();
        let plan = plan_attack(&actor, Some(rifle), &AttackOptions::against(15).with_burst(true))
            .unwrap();
        assert_eq!(plan.cost.charges, 3);
        assert_eq!(plan.attack.to_string(), "1d20 + 2 + 1 + 2");
        assert_eq!(plan.damage.to_string(), "1d10 + 2 + 2");
    }

    #[test]
    fn burst_shortage_rolls_nothing() {
        let (mut actor, rifle) = shooter();
        if let Some(item) = actor.item_mut(rifle) {
            if let Some(c) = item.charges_mut() {
                *c = Charges { value: 2, max: 10 };
            }
        }
        let mut roller = ScriptedRoller::new([20, 10]);
        let err = resolve_attack(
            &mut actor,
            Some(rifle),
            &AttackOptions::against(10).with_burst(true),
            &mut roller,
        )
        .unwrap_err();
        assert_eq!(
            err,
            MechError::InsufficientResource {
                kind: ResourceKind::Charges,
                have: 2,
                need: 3
            }
        );
        assert_eq!(roller.remaining(), 2);
        assert_eq!(actor.item(rifle).and_then(Item::charges).unwrap().value, 2);
    }

    #[test]
    fn overflowing_attack_roll_spends_nothing() {
        let (mut actor, rifle) = shooter();
        let mut roller = ScriptedRoller::new([11, 3]);
        let err = resolve_attack(
            &mut actor,
            Some(rifle),
            &AttackOptions::against(10).with_situational(i32::MAX),
            &mut roller,
        )
        .unwrap_err();
        assert!(matches!(err, MechError::Formula(FormulaError::Overflow)));
        assert_eq!(actor.item(rifle).and_then(Item::charges).unwrap().value, 10);
    }

    #[test]
    fn burst_needs_capable_weapon() {
        let mut actor = Actor::new(ActorKind::Character, "Duelist");
        let sword = Item::new("Monoblade", ItemKind::Weapon(Weapon::melee("1d8")));
        let id = sword.id;
        actor.items.push(sword);
        let err = plan_attack(&actor, Some(id), &AttackOptions::against(10).with_burst(true))
            .unwrap_err();
        assert!(matches!(err, MechError::BurstNotSupported(_)));
    }

    #[test]
    fn unarmed_untrained() {
        let mut actor = Actor::new(ActorKind::Character, "Civilian");
        actor.abilities.strength = 7;
        let plan = plan_attack(&actor, None, &AttackOptions::against(10)).unwrap();
        assert_eq!(plan.weapon_name, "Unarmed");
        assert_eq!(plan.attack.to_string(), "1d20 - 1 - 2");
        assert_eq!(plan.damage.to_string(), "1d2 - 1");
        assert!(plan.cost.is_free());
    }

    #[test]
    fn punch_skill_adds_to_damage() {
        let mut actor = Actor::new(ActorKind::Character, "Boxer");
        actor.skills.insert("Punch".to_string(), 2);
        let plan = plan_attack(&actor, None, &AttackOptions::against(10)).unwrap();
        assert_eq!(plan.damage.to_string(), "1d2 + 2");
    }

    #[test]
    fn charge_penalizes_attacker_defense() {
        let mut actor = Actor::new(ActorKind::Character, "Berserker");
        actor.skills.insert("Stab".to_string(), 0);
        let axe = Item::new("Axe", ItemKind::Weapon(Weapon::melee("1d6")));
        let id = axe.id;
        actor.items.push(axe);
        let options = AttackOptions::against(12).with_charge(true).with_situational(-1);
        let mut roller = ScriptedRoller::new([11, 3]);
        let report = resolve_attack(&mut actor, Some(id), &options, &mut roller).unwrap();
        assert_eq!(report.attack.total, 12);
        assert!(report.hit());
        assert_eq!(
            report.effects,
            vec![AttackEffect::DefensePenalty {
                amount: 2,
                rounds: 1
            }]
        );
        assert!(report.reservation.is_empty());
    }

    #[test]
    fn statblock_npc_uses_skill_bonus_and_attack_bonus() {
        let mut npc = Actor::new(ActorKind::Npc, "Pirate");
        npc.skill_bonus = Some(1);
        npc.attack_bonus = 2;
        npc.damage_bonus = 1;
        let knife = Item::new("Knife", ItemKind::Weapon(Weapon::melee("1d4")));
        let id = knife.id;
        npc.items.push(knife);
        let plan = plan_attack(&npc, Some(id), &AttackOptions::against(13)).unwrap();
        assert_eq!(plan.attack.to_string(), "1d20 + 1 + 2");
        assert_eq!(plan.damage.to_string(), "1d4 + 1");
    }

    #[test]
    fn damage_formula_reads_actor_values() {
        let mut actor = Actor::new(ActorKind::Character, "Brute");
        actor.abilities.strength = 14;
        let maul = Item::new("Maul", ItemKind::Weapon(Weapon::melee("1d8 + @level")));
        let id = maul.id;
        actor.items.push(maul);
        let mut roller = ScriptedRoller::new([2, 5]);
        let report = resolve_attack(&mut actor, Some(id), &AttackOptions::against(20), &mut roller)
            .unwrap();
        assert_eq!(report.damage.total, 7);
        assert_eq!(report.damage.to_string(), "1d8 [5] (damage) + 1 (level) + 1 (str) = 7");
    }

    #[test]
    fn unknown_weapon_item() {
        let actor = Actor::new(ActorKind::Character, "Nobody");
        let err = plan_attack(&actor, Some(ItemId::new()), &AttackOptions::against(10))
            .unwrap_err();
        assert!(matches!(err, MechError::ItemNotFound(_)));
    }

    #[test]
    fn bad_damage_formula_is_reported() {
        let mut actor = Actor::new(ActorKind::Character, "Tinker");
        let gadget = Item::new("Gadget", ItemKind::Weapon(Weapon::melee("1d")));
        let id = gadget.id;
        actor.items.push(gadget);
        let err = plan_attack(&actor, Some(id), &AttackOptions::against(10)).unwrap_err();
        assert!(matches!(err, MechError::Formula(_)));
    }
}
