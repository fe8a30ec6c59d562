//! Evaluated rolls and their breakdown.

use serde::{Deserialize, Serialize};

use super::Die;

/// The result of rolling a single die.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieResult {
    /// The type of die that was rolled.
    pub die: Die,
    /// The value rolled (1 to die.sides()).
    pub value: u32,
    /// False when a keep clause dropped this die.
    pub kept: bool,
}

/// One evaluated term of a formula.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermResult {
    /// Source notation of the term (`1d20`, `2`, `@dex`).
    pub source: String,
    /// Display label (`dex`, `skill`, `weapon`), if any.
    pub label: Option<String>,
    /// Signed contribution to the total.
    pub value: i32,
    /// Individual dice, empty for constant terms.
    pub dice: Vec<DieResult>,
}

impl TermResult {
    fn render_magnitude(&self) -> String {
        if self.dice.is_empty() {
            let magnitude = self.value.unsigned_abs().to_string();
            return match &self.label {
                Some(label) => format!("{magnitude} ({label})"),
                None => magnitude,
            };
        }
        let faces: Vec<String> = self
            .dice
            .iter()
            .map(|d| {
                if d.kept {
                    d.value.to_string()
                } else {
                    format!("~{}", d.value)
                }
            })
            .collect();
        match &self.label {
            Some(label) => format!("{} [{}] ({label})", self.source, faces.join(", ")),
            None => format!("{} [{}]", self.source, faces.join(", ")),
        }
    }
}

/// The result of evaluating a roll formula.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    /// Sum of every term.
    pub total: i32,
    /// Per-term breakdown in formula order.
    pub terms: Vec<TermResult>,
    /// Face of the first kept die of the first dice term, used for
    /// natural-1 and natural-20 rules.
    pub primary_die: Option<u32>,
}

impl RollResult {
    /// Every die rolled, kept or not.
    pub fn dice(&self) -> impl Iterator<Item = &DieResult> {
        self.terms.iter().flat_map(|t| t.dice.iter())
    }

    /// Render the terms without the total, e.g. `1d20 [11] + 2 (dex)`.
    pub fn breakdown(&self) -> String {
        let mut out = String::new();
        for (i, term) in self.terms.iter().enumerate() {
            let negative = term.value < 0;
            match (i, negative) {
                (0, false) => {}
                (0, true) => out.push('-'),
                (_, false) => out.push_str(" + "),
                (_, true) => out.push_str(" - "),
            }
            out.push_str(&term.render_magnitude());
        }
        out
    }
}

impl std::fmt::Display for RollResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.breakdown(), self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn die(value: u32, kept: bool) -> DieResult {
        DieResult {
            die: Die::D8,
            value,
            kept,
        }
    }

    fn sample() -> RollResult {
        RollResult {
            total: 9,
            terms: vec![
                TermResult {
                    source: "2d8kh1".to_string(),
                    label: None,
                    value: 7,
                    dice: vec![die(7, true), die(3, false)],
                },
                TermResult {
                    source: "@dex".to_string(),
                    label: Some("dex".to_string()),
                    value: 3,
                    dice: vec![],
                },
                TermResult {
                    source: "1".to_string(),
                    label: None,
                    value: -1,
                    dice: vec![],
                },
            ],
            primary_die: Some(7),
        }
    }

    #[test]
    fn display_marks_dropped_dice() {
        insta::assert_snapshot!(sample().to_string(), @"2d8kh1 [7, ~3] + 3 (dex) - 1 = 9");
    }

    #[test]
    fn dice_iterates_all_terms() {
        assert_eq!(sample().dice().count(), 2);
    }

    #[test]
    fn leading_negative_term() {
        let r = RollResult {
            total: -2,
            terms: vec![TermResult {
                source: "2".to_string(),
                label: Some("penalty".to_string()),
                value: -2,
                dice: vec![],
            }],
            primary_die: None,
        };
        assert_eq!(r.to_string(), "-2 (penalty) = -2");
    }

    #[test]
    fn empty_result() {
        let r = RollResult::default();
        assert_eq!(r.total, 0);
        assert_eq!(r.to_string(), " = 0");
    }
}
