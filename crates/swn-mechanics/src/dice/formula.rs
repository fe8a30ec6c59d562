//! Formula lexing and parsing.
//!
//! Grammar, whitespace-insensitive:
//!
//! ```text
//! formula := sign? term (sign term)*
//! sign    := '+' | '-'
//! term    := dice | number | '@' name
//! dice    := count? ('d' | 'D') sides (('kh' | 'kl' | 'k') keep)?
//! ```

use logos::Logos;

use super::Die;
use super::spec::{DiceTerm, Keep, Sign, Term, TermKind};

/// Largest number of dice a single term may roll.
pub const MAX_DICE: u32 = 100;

/// Why a formula could not be parsed or evaluated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormulaError {
    /// The formula contains no terms.
    #[error("empty formula")]
    Empty,

    /// The lexer hit a character that cannot start any token.
    #[error("unexpected character {found:?} at {position}")]
    UnexpectedCharacter {
        /// Byte offset in the source.
        position: usize,
        /// The offending text.
        found: String,
    },

    /// A token appeared where an operator or term was required.
    #[error("unexpected {found:?} at {position}")]
    UnexpectedToken {
        /// Byte offset in the source.
        position: usize,
        /// The offending token text.
        found: String,
    },

    /// An operator is not followed by a term.
    #[error("expected a term at {position}")]
    MissingTerm {
        /// Byte offset in the source.
        position: usize,
    },

    /// A dice term rolls zero dice or more than [`MAX_DICE`].
    #[error("invalid dice count {0} (must be 1-{MAX_DICE})")]
    InvalidCount(u32),

    /// A die has fewer than two sides.
    #[error("invalid die: d{0}")]
    InvalidDie(u32),

    /// A keep clause keeps zero dice or more dice than are rolled.
    #[error("cannot keep {keep} of {count} dice")]
    InvalidKeep {
        /// Requested number of kept dice.
        keep: u32,
        /// Number of dice rolled.
        count: u32,
    },

    /// A `@name` variable is missing from the roll context.
    #[error("unknown variable @{0}")]
    UnknownVariable(String),

    /// A literal or the running total left the integer range.
    #[error("arithmetic overflow")]
    Overflow,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[regex(r"[0-9]*[dD][0-9]+([kK][hHlL]?[0-9]+)?")]
    Dice,

    #[regex(r"[0-9]+")]
    Number,

    #[regex(r"@[A-Za-z_][A-Za-z0-9_.]*")]
    Variable,
}

/// Parse a formula into an ordered list of terms.
pub fn parse(source: &str) -> Result<Vec<Term>, FormulaError> {
    let mut lexer = RawToken::lexer(source);
    let mut terms = Vec::new();
    let mut pending_sign: Option<(Sign, usize)> = None;
    let mut expect_term = true;

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let slice = lexer.slice();
        let raw = result.map_err(|()| FormulaError::UnexpectedCharacter {
            position: span.start,
            found: slice.to_string(),
        })?;

        match raw {
            RawToken::Plus | RawToken::Minus => {
                let sign = if raw == RawToken::Plus {
                    Sign::Plus
                } else {
                    Sign::Minus
                };
                // A leading sign is allowed; two operators in a row are not.
                if pending_sign.is_some() {
                    return Err(FormulaError::UnexpectedToken {
                        position: span.start,
                        found: slice.to_string(),
                    });
                }
                pending_sign = Some((sign, span.start));
                expect_term = true;
            }
            RawToken::Dice | RawToken::Number | RawToken::Variable => {
                if !expect_term {
                    return Err(FormulaError::UnexpectedToken {
                        position: span.start,
                        found: slice.to_string(),
                    });
                }
                let kind = match raw {
                    RawToken::Dice => TermKind::Dice(parse_dice(slice)?),
                    RawToken::Number => TermKind::Literal(parse_number(slice)?),
                    _ => TermKind::Variable(slice[1..].to_lowercase()),
                };
                let sign = pending_sign.take().map(|(s, _)| s).unwrap_or(Sign::Plus);
                terms.push(Term {
                    sign,
                    kind,
                    label: None,
                });
                expect_term = false;
            }
        }
    }

    if let Some((_, position)) = pending_sign {
        return Err(FormulaError::MissingTerm {
            position: position + 1,
        });
    }
    if terms.is_empty() {
        return Err(FormulaError::Empty);
    }
    Ok(terms)
}

fn parse_number(text: &str) -> Result<i32, FormulaError> {
    text.parse::<i32>().map_err(|_| FormulaError::Overflow)
}

fn parse_unsigned(text: &str) -> Result<u32, FormulaError> {
    text.parse::<u32>().map_err(|_| FormulaError::Overflow)
}

/// Parse `NdS`, `NdSkhK`, `NdSklK` or `NdSkK`.
fn parse_dice(text: &str) -> Result<DiceTerm, FormulaError> {
    let lower = text.to_lowercase();
    let (count_text, rest) = lower.split_once('d').ok_or(FormulaError::UnexpectedToken {
        position: 0,
        found: text.to_string(),
    })?;

    let count = if count_text.is_empty() {
        1
    } else {
        parse_unsigned(count_text)?
    };

    let (sides_text, keep) = match rest.split_once('k') {
        Some((sides, keep_text)) => {
            let (highest, digits) = match keep_text.strip_prefix('l') {
                Some(d) => (false, d),
                None => (true, keep_text.strip_prefix('h').unwrap_or(keep_text)),
            };
            let n = parse_unsigned(digits)?;
            let keep = if highest {
                Keep::Highest(n)
            } else {
                Keep::Lowest(n)
            };
            (sides, keep)
        }
        None => (rest, Keep::All),
    };

    let sides = parse_unsigned(sides_text)?;
    DiceTerm::new(count, sides, keep)
}

/// Validate and build a dice term.
pub(crate) fn validate_dice(count: u32, sides: u32, keep: Keep) -> Result<DiceTerm, FormulaError> {
    if count == 0 || count > MAX_DICE {
        return Err(FormulaError::InvalidCount(count));
    }
    let die = Die::from_sides(sides).ok_or(FormulaError::InvalidDie(sides))?;
    if let Keep::Highest(k) | Keep::Lowest(k) = keep {
        if k == 0 || k > count {
            return Err(FormulaError::InvalidKeep { keep: k, count });
        }
    }
    Ok(DiceTerm { count, die, keep })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(Sign, TermKind)> {
        parse(source)
            .unwrap()
            .into_iter()
            .map(|t| (t.sign, t.kind))
            .collect()
    }

    #[test]
    fn parses_simple_attack() {
        assert_eq!(
            kinds("1d20 + @dex + 2"),
            vec![
                (
                    Sign::Plus,
                    TermKind::Dice(DiceTerm {
                        count: 1,
                        die: Die::D20,
                        keep: Keep::All
                    })
                ),
                (Sign::Plus, TermKind::Variable("dex".to_string())),
                (Sign::Plus, TermKind::Literal(2)),
            ]
        );
    }

    #[test]
    fn count_defaults_to_one() {
        let terms = kinds("d8");
        assert!(matches!(
            terms[0].1,
            TermKind::Dice(DiceTerm { count: 1, die: Die::D8, .. })
        ));
    }

    #[test]
    fn keep_highest_and_lowest() {
        let terms = kinds("4d6kh3 - 2d8kl1 + 2d20k1");
        assert!(matches!(
            terms[0],
            (Sign::Plus, TermKind::Dice(DiceTerm { count: 4, keep: Keep::Highest(3), .. }))
        ));
        assert!(matches!(
            terms[1],
            (Sign::Minus, TermKind::Dice(DiceTerm { count: 2, keep: Keep::Lowest(1), .. }))
        ));
        assert!(matches!(
            terms[2].1,
            TermKind::Dice(DiceTerm { keep: Keep::Highest(1), .. })
        ));
    }

    #[test]
    fn leading_sign_and_no_whitespace() {
        assert_eq!(
            kinds("-1+2d6"),
            vec![
                (Sign::Minus, TermKind::Literal(1)),
                (
                    Sign::Plus,
                    TermKind::Dice(DiceTerm {
                        count: 2,
                        die: Die::D6,
                        keep: Keep::All
                    })
                ),
            ]
        );
    }

    #[test]
    fn variables_are_lowercased() {
        assert_eq!(
            kinds("@Skill.Shoot"),
            vec![(Sign::Plus, TermKind::Variable("skill.shoot".to_string()))]
        );
    }

    #[test]
    fn empty_formula() {
        assert_eq!(parse(""), Err(FormulaError::Empty));
        assert_eq!(parse("   "), Err(FormulaError::Empty));
    }

    #[test]
    fn dangling_operator() {
        assert_eq!(
            parse("1d20 +"),
            Err(FormulaError::MissingTerm { position: 6 })
        );
    }

    #[test]
    fn double_operator() {
        assert!(matches!(
            parse("1d20 + - 2"),
            Err(FormulaError::UnexpectedToken { position: 7, .. })
        ));
    }

    #[test]
    fn adjacent_terms() {
        assert!(matches!(
            parse("1d20 2"),
            Err(FormulaError::UnexpectedToken { position: 5, .. })
        ));
    }

    #[test]
    fn unexpected_character() {
        assert!(matches!(
            parse("1d20 * 2"),
            Err(FormulaError::UnexpectedCharacter { position: 5, .. })
        ));
        assert!(matches!(
            parse("dex"),
            Err(FormulaError::UnexpectedCharacter { .. })
        ));
    }

    #[test]
    fn invalid_dice() {
        assert_eq!(parse("0d6"), Err(FormulaError::InvalidCount(0)));
        assert_eq!(parse("101d6"), Err(FormulaError::InvalidCount(101)));
        assert_eq!(parse("1d1"), Err(FormulaError::InvalidDie(1)));
        assert_eq!(
            parse("2d8kh3"),
            Err(FormulaError::InvalidKeep { keep: 3, count: 2 })
        );
        assert_eq!(
            parse("2d8kh0"),
            Err(FormulaError::InvalidKeep { keep: 0, count: 2 })
        );
    }

    #[test]
    fn literal_overflow() {
        assert_eq!(parse("99999999999"), Err(FormulaError::Overflow));
    }
}
