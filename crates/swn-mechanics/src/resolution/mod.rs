//! Outcome classification for evaluated rolls.
//!
//! Each roll declares how its total is read:
//! - **Above**: meet or beat the target (attacks, skill checks, saves)
//! - **Below**: roll at or under the target (morale)
//! - **Check**: d20 at or under an attribute; a natural 1 always succeeds,
//!   a natural 20 never does
//! - **Table lookup**: the highest breakpoint at or below the total
//! - **Instinct**: like Above, but a failure tells the caller to consult
//!   the NPC's instinct table

pub mod table;

pub use table::LookupTable;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dice::RollResult;
use crate::error::{MechError, MechResult};

/// How a roll total is compared against its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", content = "table", rename_all = "kebab-case")]
pub enum ComparisonPolicy {
    /// Success iff `total >= target`.
    Above,
    /// Success iff `total <= target`.
    Below,
    /// Success iff the primary die is 1, or `total <= target` and the
    /// primary die is below 20.
    Check,
    /// Read the text of the highest breakpoint at or below the total.
    TableLookup(LookupTable),
    /// Success iff `total >= target`; failure signals an instinct lookup.
    Instinct,
}

impl ComparisonPolicy {
    /// Parse a policy tag. `table-lookup` requires a table.
    pub fn from_tag(tag: &str, table: Option<LookupTable>) -> MechResult<Self> {
        match tag.trim().to_lowercase().as_str() {
            "above" => Ok(Self::Above),
            "below" => Ok(Self::Below),
            "check" => Ok(Self::Check),
            "instinct" => Ok(Self::Instinct),
            "table-lookup" | "table" => table
                .map(Self::TableLookup)
                .ok_or_else(|| MechError::InvalidPolicy("table-lookup without a table".into())),
            other => Err(MechError::InvalidPolicy(other.to_string())),
        }
    }

    /// The policy's tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Above => "above",
            Self::Below => "below",
            Self::Check => "check",
            Self::TableLookup(_) => "table-lookup",
            Self::Instinct => "instinct",
        }
    }
}

/// The classified result of a roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// The roll met its target.
    Success {
        /// Roll total.
        total: i32,
        /// Target it was compared against.
        target: i32,
    },
    /// The roll missed its target.
    Failure {
        /// Roll total.
        total: i32,
        /// Target it was compared against.
        target: i32,
        /// Whether the caller must consult the instinct table.
        consult_instinct: bool,
    },
    /// A table entry was read.
    Lookup {
        /// Roll total.
        total: i32,
        /// Breakpoint that matched, if any.
        breakpoint: Option<i32>,
        /// Entry text; `None` when the total is below every breakpoint.
        text: Option<String>,
    },
}

impl Outcome {
    /// Returns true for [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The roll total that produced this outcome.
    pub fn total(&self) -> i32 {
        match self {
            Self::Success { total, .. } | Self::Failure { total, .. } | Self::Lookup { total, .. } => {
                *total
            }
        }
    }

    /// Returns true when an instinct check failed and the external
    /// instinct table must be consulted.
    pub fn needs_instinct_lookup(&self) -> bool {
        matches!(
            self,
            Self::Failure {
                consult_instinct: true,
                ..
            }
        )
    }

    /// Text read from a table, if this is a lookup outcome with a match.
    pub fn lookup_text(&self) -> Option<&str> {
        match self {
            Self::Lookup { text, .. } => text.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { total, target } => write!(f, "Success ({total} vs {target})"),
            Self::Failure {
                total,
                target,
                consult_instinct: false,
            } => write!(f, "Failure ({total} vs {target})"),
            Self::Failure {
                total,
                target,
                consult_instinct: true,
            } => write!(f, "Failure ({total} vs {target}), consult instinct table"),
            Self::Lookup {
                text: Some(text), ..
            } => write!(f, "{text}"),
            Self::Lookup { total, .. } => write!(f, "No entry for {total}"),
        }
    }
}

/// Classify a roll total against a target under a policy.
pub fn classify(
    policy: &ComparisonPolicy,
    total: i32,
    primary_die: Option<u32>,
    target: i32,
) -> Outcome {
    let passed = match policy {
        ComparisonPolicy::Above | ComparisonPolicy::Instinct => total >= target,
        ComparisonPolicy::Below => total <= target,
        ComparisonPolicy::Check => {
            primary_die == Some(1) || (total <= target && primary_die.is_none_or(|d| d < 20))
        }
        ComparisonPolicy::TableLookup(table) => {
            let entry = table.lookup(total);
            return Outcome::Lookup {
                total,
                breakpoint: entry.map(|(k, _)| k),
                text: entry.map(|(_, text)| text.to_string()),
            };
        }
    };

    if passed {
        Outcome::Success { total, target }
    } else {
        Outcome::Failure {
            total,
            target,
            consult_instinct: matches!(policy, ComparisonPolicy::Instinct),
        }
    }
}

/// Classify an evaluated roll.
pub fn resolve(policy: &ComparisonPolicy, roll: &RollResult, target: i32) -> Outcome {
    classify(policy, roll.total, roll.primary_die, target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn above_boundary() {
        assert!(classify(&ComparisonPolicy::Above, 14, Some(11), 14).is_success());
        assert!(!classify(&ComparisonPolicy::Above, 13, Some(10), 14).is_success());
    }

    #[test]
    fn below_boundary() {
        assert!(classify(&ComparisonPolicy::Below, 7, None, 7).is_success());
        assert!(!classify(&ComparisonPolicy::Below, 8, None, 7).is_success());
    }

    #[test]
    fn check_natural_one_always_succeeds() {
        let outcome = classify(&ComparisonPolicy::Check, 25, Some(1), 5);
        assert_eq!(
            outcome,
            Outcome::Success {
                total: 25,
                target: 5
            }
        );
    }

    #[test]
    fn check_natural_twenty_fails_at_exact_target() {
        let outcome = classify(&ComparisonPolicy::Check, 20, Some(20), 20);
        assert!(!outcome.is_success());
        assert!(!outcome.needs_instinct_lookup());
    }

    #[test]
    fn check_ordinary_roll_under() {
        assert!(classify(&ComparisonPolicy::Check, 12, Some(12), 12).is_success());
        assert!(!classify(&ComparisonPolicy::Check, 13, Some(13), 12).is_success());
    }

    #[test]
    fn table_lookup_last_match_wins() {
        let table = LookupTable::from_pairs([(1, "A"), (2, "B"), (3, "C")]);
        let policy = ComparisonPolicy::TableLookup(table);
        let hit = classify(&policy, 2, None, 0);
        assert_eq!(hit.lookup_text(), Some("B"));
        assert_eq!(
            hit,
            Outcome::Lookup {
                total: 2,
                breakpoint: Some(2),
                text: Some("B".to_string())
            }
        );
        assert_eq!(classify(&policy, 9, None, 0).lookup_text(), Some("C"));
        let miss = classify(&policy, 0, None, 0);
        assert_eq!(miss.lookup_text(), None);
        assert_eq!(miss.total(), 0);
    }

    #[test]
    fn instinct_failure_signals_lookup() {
        let fail = classify(&ComparisonPolicy::Instinct, 3, Some(3), 5);
        assert!(fail.needs_instinct_lookup());
        assert_eq!(fail.to_string(), "Failure (3 vs 5), consult instinct table");
        let pass = classify(&ComparisonPolicy::Instinct, 5, Some(5), 5);
        assert!(pass.is_success());
    }

    #[test]
    fn policy_tags() {
        assert_eq!(
            ComparisonPolicy::from_tag("Above", None).unwrap(),
            ComparisonPolicy::Above
        );
        assert_eq!(ComparisonPolicy::Check.tag(), "check");
        assert!(matches!(
            ComparisonPolicy::from_tag("sideways", None),
            Err(MechError::InvalidPolicy(_))
        ));
        assert!(matches!(
            ComparisonPolicy::from_tag("table-lookup", None),
            Err(MechError::InvalidPolicy(_))
        ));
        let table = LookupTable::from_pairs([(1, "x")]);
        assert!(matches!(
            ComparisonPolicy::from_tag("table-lookup", Some(table)),
            Ok(ComparisonPolicy::TableLookup(_))
        ));
    }

    #[test]
    fn outcome_display() {
        assert_eq!(
            Outcome::Success {
                total: 14,
                target: 14
            }
            .to_string(),
            "Success (14 vs 14)"
        );
        assert_eq!(
            Outcome::Lookup {
                total: 0,
                breakpoint: None,
                text: None
            }
            .to_string(),
            "No entry for 0"
        );
    }

    proptest! {
        #[test]
        fn above_matches_comparison(total in -50i32..50, target in -50i32..50) {
            let outcome = classify(&ComparisonPolicy::Above, total, None, target);
            prop_assert_eq!(outcome.is_success(), total >= target);
        }

        #[test]
        fn check_with_natural_one_always_succeeds(total in -50i32..100, target in -50i32..50) {
            prop_assert!(classify(&ComparisonPolicy::Check, total, Some(1), target).is_success());
        }

        #[test]
        fn check_with_natural_twenty_never_succeeds(total in -50i32..100, target in -50i32..100) {
            prop_assert!(!classify(&ComparisonPolicy::Check, total, Some(20), target).is_success());
        }
    }
}
