//! Initiative values, groups, and turn ordering.
//!
//! Turn order is a total order: initiative value descending, then group
//! label, then combatant name, then the order combatants were added.
//! Defeated combatants sort after everyone, pending ones after everyone
//! who has rolled.

pub mod engine;

pub use engine::{InitiativeBatch, InitiativeEngine, InitiativeRoll};

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::combat::Combatant;
use crate::error::MechError;

/// Added to a vigilant combatant's roll so they act before the normal
/// order. An ordering sentinel, not a real initiative score.
pub const VIGILANT_OFFSET: i32 = 100;

/// A combatant's place in the initiative order.
///
/// Variant order is sort order: `Defeated < Pending < Rolled(_)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum InitiativeValue {
    /// Out of the fight; always acts last.
    Defeated,
    /// Not rolled yet.
    #[default]
    Pending,
    /// A rolled score.
    Rolled(i32),
}

impl InitiativeValue {
    /// The rolled score, if any.
    pub fn score(self) -> Option<i32> {
        match self {
            Self::Rolled(n) => Some(n),
            _ => None,
        }
    }

    /// Returns true if no score has been rolled yet.
    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }
}

impl fmt::Display for InitiativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defeated => write!(f, "defeated"),
            Self::Pending => write!(f, "-"),
            Self::Rolled(n) => write!(f, "{n}"),
        }
    }
}

/// How a token regards the player characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// Enemies.
    Hostile,
    /// Bystanders.
    Neutral,
    /// Allies.
    Friendly,
    /// Not set.
    #[default]
    Unset,
}

/// A color-coded side that rolls one shared initiative in group mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    /// Hostile side.
    Red,
    /// Neutral side.
    Yellow,
    /// Friendly side.
    Green,
    /// Everyone else.
    White,
}

impl Group {
    /// Every group.
    pub const ALL: [Group; 4] = [Self::Red, Self::Yellow, Self::Green, Self::White];

    /// Lowercase label; groups tie-break by it.
    pub fn label(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::White => "white",
        }
    }
}

impl From<Disposition> for Group {
    fn from(disposition: Disposition) -> Self {
        match disposition {
            Disposition::Hostile => Self::Red,
            Disposition::Neutral => Self::Yellow,
            Disposition::Friendly => Self::Green,
            Disposition::Unset => Self::White,
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Group {
    type Err = MechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MechError::InvalidPolicy(format!("unknown group: {s}")))
    }
}

/// Whether sides roll together or everyone rolls alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitiativeMode {
    /// One roll per group.
    #[default]
    Group,
    /// One roll per combatant.
    Individual,
}

impl fmt::Display for InitiativeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group => write!(f, "group"),
            Self::Individual => write!(f, "individual"),
        }
    }
}

impl FromStr for InitiativeMode {
    type Err = MechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "group" => Ok(Self::Group),
            "individual" => Ok(Self::Individual),
            other => Err(MechError::InvalidPolicy(format!("initiative mode {other}"))),
        }
    }
}

/// What happens to initiative when a round ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RerollPolicy {
    /// Clear every value; the next round starts with a fresh roll.
    #[default]
    Reset,
    /// Roll everyone again immediately.
    Reroll,
    /// Keep the current order.
    Keep,
}

impl fmt::Display for RerollPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => write!(f, "reset"),
            Self::Reroll => write!(f, "reroll"),
            Self::Keep => write!(f, "keep"),
        }
    }
}

impl FromStr for RerollPolicy {
    type Err = MechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reset" => Ok(Self::Reset),
            "reroll" => Ok(Self::Reroll),
            "keep" => Ok(Self::Keep),
            other => Err(MechError::InvalidPolicy(format!("reroll policy {other}"))),
        }
    }
}

fn compare(a: &Combatant, b: &Combatant) -> Ordering {
    b.initiative
        .cmp(&a.initiative)
        .then_with(|| a.effective_group().label().cmp(b.effective_group().label()))
        .then_with(|| a.name.cmp(&b.name))
}

/// Indices into `combatants` in turn order.
pub fn turn_order(combatants: &[Combatant]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..combatants.len()).collect();
    // Stable: equal keys keep insertion order.
    order.sort_by(|&a, &b| compare(&combatants[a], &combatants[b]));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn named(name: &str, initiative: InitiativeValue) -> Combatant {
        let mut c = Combatant::unbound(name);
        c.initiative = initiative;
        c
    }

    #[test]
    fn value_ordering() {
        assert!(InitiativeValue::Defeated < InitiativeValue::Pending);
        assert!(InitiativeValue::Pending < InitiativeValue::Rolled(-50));
        assert!(InitiativeValue::Rolled(3) < InitiativeValue::Rolled(4));
    }

    #[test]
    fn descending_with_defeated_last() {
        let combatants = vec![
            named("Slow", InitiativeValue::Rolled(2)),
            named("Down", InitiativeValue::Defeated),
            named("Fast", InitiativeValue::Rolled(9)),
            named("Waiting", InitiativeValue::Pending),
        ];
        assert_eq!(turn_order(&combatants), vec![2, 0, 3, 1]);
    }

    #[test]
    fn ties_break_by_group_then_name_then_insertion() {
        let combatants = vec![
            named("Zed", InitiativeValue::Rolled(5)).with_group(Group::Red),
            named("Amy", InitiativeValue::Rolled(5)).with_group(Group::Red),
            named("Bob", InitiativeValue::Rolled(5)).with_group(Group::Green),
            named("Amy", InitiativeValue::Rolled(5)).with_group(Group::Red),
        ];
        assert_eq!(turn_order(&combatants), vec![2, 1, 3, 0]);
    }

    #[test]
    fn groups_from_disposition() {
        assert_eq!(Group::from(Disposition::Hostile), Group::Red);
        assert_eq!(Group::from(Disposition::Neutral), Group::Yellow);
        assert_eq!(Group::from(Disposition::Friendly), Group::Green);
        assert_eq!(Group::from(Disposition::Unset), Group::White);
    }

    #[test]
    fn policy_tags_parse() {
        assert_eq!("Individual".parse::<InitiativeMode>().unwrap(), InitiativeMode::Individual);
        assert_eq!("keep".parse::<RerollPolicy>().unwrap(), RerollPolicy::Keep);
        assert_eq!("YELLOW".parse::<Group>().unwrap(), Group::Yellow);
        assert!(matches!(
            "sometimes".parse::<RerollPolicy>(),
            Err(MechError::InvalidPolicy(_))
        ));
        assert!("solo".parse::<InitiativeMode>().is_err());
    }

    #[test]
    fn value_serializes_tagged() {
        let json = serde_json::to_string(&InitiativeValue::Rolled(7)).unwrap();
        assert_eq!(json, r#"{"state":"rolled","value":7}"#);
        let back: InitiativeValue = serde_json::from_str(r#"{"state":"defeated"}"#).unwrap();
        assert_eq!(back, InitiativeValue::Defeated);
    }

    proptest! {
        #[test]
        fn defeated_always_sorts_last(
            scores in proptest::collection::vec(-200i32..200, 0..10),
            slot in 0usize..10,
        ) {
            let mut combatants: Vec<Combatant> = scores
                .iter()
                .enumerate()
                .map(|(i, s)| named(&format!("c{i}"), InitiativeValue::Rolled(*s)))
                .collect();
            let slot = slot.min(combatants.len());
            combatants.insert(slot, named("down", InitiativeValue::Defeated));
            let order = turn_order(&combatants);
            prop_assert_eq!(order.last().copied(), Some(slot));
        }
    }
}
