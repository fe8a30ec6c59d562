//! Dice, checks, attacks and initiative for the SWN combat engine.
//!
//! The crate is organized leaves first:
//!
//! - [`dice`]: formula parsing and evaluation into a [`RollResult`]
//! - [`resolution`]: classifying a total under a [`ComparisonPolicy`]
//! - [`resource`]: the guard that spends charges and ammunition
//! - [`attack`]: attack and damage rolls against a defense value
//! - [`check`]: committing specs, plus skill checks, saves and the like
//! - [`initiative`]: group and individual initiative and turn order
//! - [`combat`]: the encounter lifecycle
//!
//! Every random operation takes a [`DieRoller`], so callers choose between
//! a seeded `StdRng` and a [`ScriptedRoller`].

pub mod attack;
pub mod check;
pub mod combat;
pub mod dice;
pub mod error;
pub mod hit_points;
pub mod initiative;
pub mod resolution;
pub mod resource;

pub use attack::{AttackEffect, AttackOptions, AttackPlan, AttackReport, plan_attack, resolve_attack};
pub use check::{CheckResult, commit};
pub use combat::{Combat, CombatConfig, CombatEvent, CombatPhase, Combatant, CombatantId, TurnAdvance};
pub use dice::{Die, DieRoller, FormulaError, RollContext, RollResult, RollSpec, ScriptedRoller};
pub use error::{MechError, MechResult, ResourceKind};
pub use hit_points::roll_hit_points;
pub use initiative::{
    Disposition, Group, InitiativeBatch, InitiativeEngine, InitiativeMode, InitiativeValue,
    RerollPolicy,
};
pub use resolution::{ComparisonPolicy, LookupTable, Outcome, classify};
pub use resource::{ActionCost, Reservation, reserve};
