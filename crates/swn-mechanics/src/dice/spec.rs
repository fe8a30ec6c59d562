//! Roll specifications: the pure half of the roll API.
//!
//! A [`RollSpec`] is built once, from a formula string or programmatically
//! with labelled terms, and never changes afterwards. Evaluating it is the
//! only step that consumes dice.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use swn_core::{Ability, Actor};

use super::formula::{self, FormulaError};
use super::roll::{DieResult, RollResult, TermResult};
use super::roller::DieRoller;
use super::Die;
use crate::resolution::{ComparisonPolicy, LookupTable};

/// Whether a term adds to or subtracts from the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sign {
    /// Added.
    #[default]
    Plus,
    /// Subtracted.
    Minus,
}

/// Which dice of a pool count toward its sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Keep {
    /// Every die.
    #[default]
    All,
    /// The highest N dice.
    Highest(u32),
    /// The lowest N dice.
    Lowest(u32),
}

/// A pool of identical dice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceTerm {
    /// Number of dice rolled.
    pub count: u32,
    /// Die type.
    pub die: Die,
    /// Keep clause.
    pub keep: Keep,
}

impl DiceTerm {
    /// Build a validated dice term.
    pub fn new(count: u32, sides: u32, keep: Keep) -> Result<Self, FormulaError> {
        formula::validate_dice(count, sides, keep)
    }

    /// `count` dice of one type, all kept.
    pub fn plain(count: u32, die: Die) -> Self {
        Self {
            count,
            die,
            keep: Keep::All,
        }
    }

    /// Roll the pool, marking dropped dice. Returns the dice and the sum of
    /// the kept ones.
    fn roll<R: DieRoller + ?Sized>(&self, roller: &mut R) -> (Vec<DieResult>, i64) {
        let mut dice: Vec<DieResult> = (0..self.count)
            .map(|_| DieResult {
                die: self.die,
                value: roller.roll(self.die),
                kept: true,
            })
            .collect();

        let dropped: Vec<usize> = match self.keep {
            Keep::All => Vec::new(),
            Keep::Highest(k) | Keep::Lowest(k) => {
                let mut order: Vec<usize> = (0..dice.len()).collect();
                // Stable sort: among equal faces the earlier die is kept.
                if matches!(self.keep, Keep::Highest(_)) {
                    order.sort_by(|&a, &b| dice[b].value.cmp(&dice[a].value));
                } else {
                    order.sort_by(|&a, &b| dice[a].value.cmp(&dice[b].value));
                }
                order.into_iter().skip(k as usize).collect()
            }
        };
        for i in dropped {
            dice[i].kept = false;
        }

        let sum = dice
            .iter()
            .filter(|d| d.kept)
            .map(|d| i64::from(d.value))
            .sum();
        (dice, sum)
    }
}

impl fmt::Display for DiceTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.die)?;
        match self.keep {
            Keep::All => Ok(()),
            Keep::Highest(k) => write!(f, "kh{k}"),
            Keep::Lowest(k) => write!(f, "kl{k}"),
        }
    }
}

/// What a term evaluates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermKind {
    /// A constant.
    Literal(i32),
    /// A named value resolved against the [`RollContext`].
    Variable(String),
    /// A dice pool.
    Dice(DiceTerm),
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(n) => write!(f, "{n}"),
            Self::Variable(name) => write!(f, "@{name}"),
            Self::Dice(d) => write!(f, "{d}"),
        }
    }
}

/// One signed, optionally labelled term of a formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Added or subtracted.
    pub sign: Sign,
    /// What to evaluate.
    pub kind: TermKind,
    /// Label shown in the breakdown.
    pub label: Option<String>,
}

impl Term {
    /// A constant term. Negative values become subtracted terms.
    pub fn literal(value: i32) -> Self {
        match value.checked_neg() {
            Some(neg) if value < 0 => Self {
                sign: Sign::Minus,
                kind: TermKind::Literal(neg),
                label: None,
            },
            _ => Self {
                sign: Sign::Plus,
                kind: TermKind::Literal(value),
                label: None,
            },
        }
    }

    /// A dice term.
    pub fn dice(dice: DiceTerm) -> Self {
        Self {
            sign: Sign::Plus,
            kind: TermKind::Dice(dice),
            label: None,
        }
    }

    /// A variable term.
    pub fn variable(name: impl Into<String>) -> Self {
        Self {
            sign: Sign::Plus,
            kind: TermKind::Variable(name.into().to_lowercase()),
            label: None,
        }
    }

    /// Attach a breakdown label.
    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn display_label(&self) -> Option<String> {
        match (&self.label, &self.kind) {
            (Some(label), _) => Some(label.clone()),
            (None, TermKind::Variable(name)) => Some(name.clone()),
            _ => None,
        }
    }
}

/// Named values that `@name` variables resolve to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollContext {
    values: HashMap<String, i32>,
}

impl RollContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, builder style. Names are case-insensitive.
    pub fn with(mut self, name: impl AsRef<str>, value: i32) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace a value.
    pub fn insert(&mut self, name: impl AsRef<str>, value: i32) {
        self.values.insert(name.as_ref().to_lowercase(), value);
    }

    /// Look up a value.
    pub fn get(&self, name: &str) -> Option<i32> {
        self.values.get(&name.to_lowercase()).copied()
    }

    /// The roll data of an actor: ability modifiers (`@str` ... `@cha`),
    /// `@level`, `@ab` (attack bonus), `@init`, and one entry per skill by
    /// lowercase name (untrained skills read -1). NPCs with a statblock skill
    /// bonus also expose it as `@skill`.
    pub fn for_actor(actor: &Actor) -> Self {
        let mut ctx = Self::new();
        for ability in Ability::ALL {
            ctx.insert(ability.short(), actor.ability_modifier(ability));
        }
        ctx.insert("level", i32::try_from(actor.level).unwrap_or(i32::MAX));
        ctx.insert("ab", actor.attack_bonus);
        ctx.insert("init", actor.initiative_modifier());
        for (skill, rank) in &actor.skills {
            ctx.insert(skill, (*rank).max(-1));
        }
        if let Some(bonus) = actor.skill_bonus {
            ctx.insert("skill", bonus);
        }
        ctx
    }
}

/// An immutable roll request: terms plus how to read the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollSpec {
    /// Terms in evaluation order.
    pub terms: Vec<Term>,
    /// How the total is classified. `None` for plain rolls such as damage.
    pub policy: Option<ComparisonPolicy>,
    /// Target value for the comparison.
    pub target: Option<i32>,
}

impl RollSpec {
    /// Parse a formula into an unclassified spec.
    pub fn parse(formula: &str) -> Result<Self, FormulaError> {
        Ok(Self {
            terms: formula::parse(formula)?,
            policy: None,
            target: None,
        })
    }

    /// Start building a spec term by term.
    pub fn builder() -> RollSpecBuilder {
        RollSpecBuilder::default()
    }

    /// The first dice term, whose first kept die is the primary die.
    pub fn primary_dice(&self) -> Option<&DiceTerm> {
        self.terms.iter().find_map(|t| match &t.kind {
            TermKind::Dice(d) => Some(d),
            _ => None,
        })
    }

    /// Returns true when no term needs a die.
    pub fn is_constant(&self) -> bool {
        self.primary_dice().is_none()
    }

    /// Substitute every variable with its value from `ctx`, without rolling
    /// anything. The variable name becomes the term's label unless it
    /// already has one.
    pub fn resolve(&self, ctx: &RollContext) -> Result<RollSpec, FormulaError> {
        let terms = self
            .terms
            .iter()
            .map(|term| match &term.kind {
                TermKind::Variable(name) => {
                    let value = ctx
                        .get(name)
                        .ok_or_else(|| FormulaError::UnknownVariable(name.clone()))?;
                    Ok(Term {
                        sign: term.sign,
                        kind: TermKind::Literal(value),
                        label: term.display_label(),
                    })
                }
                _ => Ok(term.clone()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RollSpec {
            terms,
            policy: self.policy.clone(),
            target: self.target,
        })
    }

    /// Evaluate the spec. Variables are resolved before any die is rolled.
    pub fn evaluate<R: DieRoller + ?Sized>(
        &self,
        ctx: &RollContext,
        roller: &mut R,
    ) -> Result<RollResult, FormulaError> {
        let resolved = self.resolve(ctx)?;
        resolved.roll(roller)
    }

    fn roll<R: DieRoller + ?Sized>(&self, roller: &mut R) -> Result<RollResult, FormulaError> {
        let mut total: i32 = 0;
        let mut primary_die = None;
        let mut terms = Vec::with_capacity(self.terms.len());

        for term in &self.terms {
            let (magnitude, dice) = match &term.kind {
                TermKind::Literal(n) => (i64::from(*n), Vec::new()),
                TermKind::Variable(name) => {
                    return Err(FormulaError::UnknownVariable(name.clone()));
                }
                TermKind::Dice(pool) => {
                    let (dice, sum) = pool.roll(roller);
                    if primary_die.is_none() {
                        primary_die = dice.iter().find(|d| d.kept).map(|d| d.value);
                    }
                    (sum, dice)
                }
            };
            let signed = match term.sign {
                Sign::Plus => magnitude,
                Sign::Minus => -magnitude,
            };
            let value = i32::try_from(signed).map_err(|_| FormulaError::Overflow)?;
            total = total.checked_add(value).ok_or(FormulaError::Overflow)?;
            terms.push(TermResult {
                source: term.kind.to_string(),
                label: term.display_label(),
                value,
                dice,
            });
        }

        Ok(RollResult {
            total,
            terms,
            primary_die,
        })
    }
}

impl fmt::Display for RollSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            match (i, term.sign) {
                (0, Sign::Plus) => {}
                (0, Sign::Minus) => write!(f, "-")?,
                (_, Sign::Plus) => write!(f, " + ")?,
                (_, Sign::Minus) => write!(f, " - ")?,
            }
            write!(f, "{}", term.kind)?;
        }
        Ok(())
    }
}

/// Builder for [`RollSpec`].
#[derive(Debug, Clone, Default)]
pub struct RollSpecBuilder {
    terms: Vec<Term>,
    policy: Option<ComparisonPolicy>,
    target: Option<i32>,
}

impl RollSpecBuilder {
    /// Append a term.
    pub fn term(mut self, term: Term) -> Self {
        self.terms.push(term);
        self
    }

    /// Append a labelled dice pool.
    pub fn dice(self, label: impl Into<String>, dice: DiceTerm) -> Self {
        self.term(Term::dice(dice).labelled(label))
    }

    /// Append a labelled constant. Zero-valued modifiers are skipped.
    pub fn modifier(self, label: impl Into<String>, value: i32) -> Self {
        if value == 0 {
            return self;
        }
        self.term(Term::literal(value).labelled(label))
    }

    /// Append a labelled constant even when it is zero.
    pub fn always(self, label: impl Into<String>, value: i32) -> Self {
        self.term(Term::literal(value).labelled(label))
    }

    /// Append every term of a formula, labelling the whole group.
    pub fn formula(mut self, label: &str, source: &str) -> Result<Self, FormulaError> {
        for term in formula::parse(source)? {
            let term = if term.label.is_none() && matches!(term.kind, TermKind::Dice(_)) {
                term.labelled(label)
            } else {
                term
            };
            self.terms.push(term);
        }
        Ok(self)
    }

    /// Compare the total against a target.
    pub fn compare(mut self, policy: ComparisonPolicy, target: i32) -> Self {
        self.policy = Some(policy);
        self.target = Some(target);
        self
    }

    /// Read the total from a table.
    pub fn lookup(mut self, table: LookupTable) -> Self {
        self.policy = Some(ComparisonPolicy::TableLookup(table));
        self.target = None;
        self
    }

    /// Finish the spec.
    pub fn build(self) -> RollSpec {
        RollSpec {
            terms: self.terms,
            policy: self.policy,
            target: self.target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedRoller;
    use proptest::prelude::*;
    use swn_core::ActorKind;

    #[test]
    fn literal_formula_is_deterministic() {
        let spec = RollSpec::parse("3 + 4 - 2").unwrap();
        let mut roller = ScriptedRoller::new([]);
        let result = spec.evaluate(&RollContext::new(), &mut roller).unwrap();
        assert_eq!(result.total, 5);
        assert_eq!(result.primary_die, None);
        assert!(spec.is_constant());
    }

    #[test]
    fn variables_resolve_against_context() {
        let spec = RollSpec::parse("1d20 + @dex + @shoot").unwrap();
        let ctx = RollContext::new().with("dex", 2).with("Shoot", 1);
        let mut roller = ScriptedRoller::new([11]);
        let result = spec.evaluate(&ctx, &mut roller).unwrap();
        assert_eq!(result.total, 14);
        assert_eq!(result.primary_die, Some(11));
        insta::assert_snapshot!(result.to_string(), @"1d20 [11] + 2 (dex) + 1 (shoot) = 14");
    }

    #[test]
    fn unknown_variable_rolls_no_dice() {
        let spec = RollSpec::parse("1d20 + @luck").unwrap();
        let mut roller = ScriptedRoller::new([7]);
        let err = spec.evaluate(&RollContext::new(), &mut roller).unwrap_err();
        assert_eq!(err, FormulaError::UnknownVariable("luck".to_string()));
        assert_eq!(roller.remaining(), 1);
    }

    #[test]
    fn resolve_substitutes_variables() {
        let spec = RollSpec::parse("1d6 - @str").unwrap();
        let resolved = spec.resolve(&RollContext::new().with("str", -1)).unwrap();
        assert_eq!(resolved.terms[1].kind, TermKind::Literal(-1));
        assert_eq!(resolved.terms[1].sign, Sign::Minus);
        assert_eq!(resolved.terms[1].label.as_deref(), Some("str"));

        let mut roller = ScriptedRoller::new([3]);
        let result = resolved.evaluate(&RollContext::new(), &mut roller).unwrap();
        assert_eq!(result.total, 4);
        assert_eq!(result.to_string(), "1d6 [3] + 1 (str) = 4");
    }

    #[test]
    fn keep_highest_drops_low_dice() {
        let spec = RollSpec::parse("4d6kh3").unwrap();
        let mut roller = ScriptedRoller::new([2, 6, 1, 5]);
        let result = spec.evaluate(&RollContext::new(), &mut roller).unwrap();
        assert_eq!(result.total, 13);
        let kept: Vec<bool> = result.dice().map(|d| d.kept).collect();
        assert_eq!(kept, [true, true, false, true]);
        assert_eq!(result.primary_die, Some(2));
    }

    #[test]
    fn keep_highest_one_picks_best_as_primary() {
        let spec = RollSpec::parse("2d8kh1 + 1").unwrap();
        let mut roller = ScriptedRoller::new([3, 7]);
        let result = spec.evaluate(&RollContext::new(), &mut roller).unwrap();
        assert_eq!(result.total, 8);
        assert_eq!(result.primary_die, Some(7));
    }

    #[test]
    fn keep_lowest() {
        let spec = RollSpec::parse("3d6kl1").unwrap();
        let mut roller = ScriptedRoller::new([4, 2, 5]);
        let result = spec.evaluate(&RollContext::new(), &mut roller).unwrap();
        assert_eq!(result.total, 2);
    }

    #[test]
    fn keep_ties_keep_earlier_die() {
        let spec = RollSpec::parse("2d8kh1").unwrap();
        let mut roller = ScriptedRoller::new([4, 4]);
        let result = spec.evaluate(&RollContext::new(), &mut roller).unwrap();
        let kept: Vec<bool> = result.dice().map(|d| d.kept).collect();
        assert_eq!(kept, [true, false]);
    }

    #[test]
    fn negative_dice_term() {
        let spec = RollSpec::parse("10 - 1d6").unwrap();
        let mut roller = ScriptedRoller::new([4]);
        let result = spec.evaluate(&RollContext::new(), &mut roller).unwrap();
        assert_eq!(result.total, 6);
        assert_eq!(result.to_string(), "10 - 1d6 [4] = 6");
    }

    #[test]
    fn builder_labels_and_skips_zero() {
        let spec = RollSpec::builder()
            .dice("attack", DiceTerm::plain(1, Die::D20))
            .modifier("dex", 2)
            .modifier("enchant", 0)
            .modifier("unskilled", -2)
            .compare(ComparisonPolicy::Above, 12)
            .build();
        assert_eq!(spec.terms.len(), 3);
        assert_eq!(spec.to_string(), "1d20 + 2 - 2");
        assert_eq!(spec.target, Some(12));

        let mut roller = ScriptedRoller::new([9]);
        let result = spec.evaluate(&RollContext::new(), &mut roller).unwrap();
        assert_eq!(
            result.to_string(),
            "1d20 [9] (attack) + 2 (dex) - 2 (unskilled) = 9"
        );
    }

    #[test]
    fn builder_formula_labels_dice() {
        let spec = RollSpec::builder()
            .formula("weapon", "1d8")
            .unwrap()
            .modifier("str", 1)
            .build();
        assert_eq!(spec.terms[0].label.as_deref(), Some("weapon"));
        assert!(RollSpec::builder().formula("weapon", "1d").is_err());
    }

    #[test]
    fn actor_context() {
        let mut actor = Actor::new(ActorKind::Character, "Vex");
        actor.abilities.dexterity = 18;
        actor.skills.insert("Shoot".to_string(), 2);
        actor.attack_bonus = 1;
        let ctx = RollContext::for_actor(&actor);
        assert_eq!(ctx.get("dex"), Some(2));
        assert_eq!(ctx.get("str"), Some(0));
        assert_eq!(ctx.get("shoot"), Some(2));
        assert_eq!(ctx.get("ab"), Some(1));
        assert_eq!(ctx.get("init"), Some(2));
        assert_eq!(ctx.get("skill"), None);
    }

    #[test]
    fn overflow_is_reported() {
        let spec = RollSpec::parse("2147483647 + 1").unwrap();
        let mut roller = ScriptedRoller::new([]);
        assert_eq!(
            spec.evaluate(&RollContext::new(), &mut roller),
            Err(FormulaError::Overflow)
        );
    }

    proptest! {
        #[test]
        fn literal_terms_sum_exactly(values in proptest::collection::vec(-1000i32..1000, 1..12)) {
            let mut builder = RollSpec::builder();
            for v in &values {
                builder = builder.always("n", *v);
            }
            let spec = builder.build();
            let mut roller = ScriptedRoller::new([]);
            let result = spec.evaluate(&RollContext::new(), &mut roller).unwrap();
            prop_assert_eq!(result.total, values.iter().sum::<i32>());
        }

        #[test]
        fn dice_stay_in_range(count in 1u32..10, sides in 2u32..30, seed in any::<u64>()) {
            use rand::SeedableRng;
            let spec = RollSpec::builder()
                .dice("pool", DiceTerm::new(count, sides, Keep::All).unwrap())
                .build();
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let result = spec.evaluate(&RollContext::new(), &mut rng).unwrap();
            let count_i = i32::try_from(count).unwrap();
            let sides_i = i32::try_from(sides).unwrap();
            prop_assert!(result.total >= count_i && result.total <= count_i * sides_i);
        }
    }
}
