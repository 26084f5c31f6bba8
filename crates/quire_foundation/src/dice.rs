//! Dice expressions.
//!
//! Supports standard notation: `XdY`, `dY`, `+Z`/`-Z` modifiers, several
//! terms (`2d6+1d4-1`), exploding dice (`1d6x`, reroll and add on the
//! highest face) and a trailing `t` (total), which is accepted and ignored.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind};
use crate::Result;

/// Largest number of dice a single term may roll.
const MAX_DICE: u32 = 1000;

/// Largest number of extra rolls one exploding die may trigger.
const MAX_EXPLOSIONS: u32 = 100;

/// One `XdY` term of a dice expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiceTerm {
    /// Number of dice rolled.
    pub count: u32,
    /// Number of faces per die.
    pub sides: u32,
    /// Whether a die showing its highest face is rolled again and added.
    pub exploding: bool,
    /// Whether this term is subtracted.
    pub negative: bool,
}

/// A parsed dice expression such as `2d6+3`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiceExpr {
    /// The dice terms, in source order.
    pub terms: Vec<DiceTerm>,
    /// Flat modifier added to the total.
    pub modifier: i64,
}

/// The outcome of rolling a [`DiceExpr`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiceRoll {
    /// Every face rolled, including exploded rerolls, in roll order.
    pub faces: Vec<u32>,
    /// Final total including the modifier.
    pub total: i64,
}

impl DiceExpr {
    /// Parses dice notation.
    ///
    /// # Errors
    /// Returns [`ErrorKind::InvalidDice`] if the notation is malformed.
    pub fn parse(notation: &str) -> Result<Self> {
        let invalid = || Error::new(ErrorKind::InvalidDice(notation.to_string()));

        let mut text: String = notation
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        if text.ends_with('t') {
            text.pop();
        }
        if text.is_empty() {
            return Err(invalid());
        }

        let mut terms = Vec::new();
        let mut modifier: i64 = 0;
        let mut negative = false;
        let mut current = String::new();

        for ch in text.chars().chain(std::iter::once('+')) {
            if ch == '+' || ch == '-' {
                if current.is_empty() {
                    // A leading sign, or two signs in a row.
                    if !terms.is_empty() || modifier != 0 || negative || ch == '+' {
                        return Err(invalid());
                    }
                    negative = true;
                    continue;
                }
                Self::push_component(&current, negative, &mut terms, &mut modifier)
                    .ok_or_else(invalid)?;
                current.clear();
                negative = ch == '-';
            } else {
                current.push(ch);
            }
        }

        if terms.is_empty() && modifier == 0 {
            return Err(invalid());
        }

        Ok(Self { terms, modifier })
    }

    fn push_component(
        component: &str,
        negative: bool,
        terms: &mut Vec<DiceTerm>,
        modifier: &mut i64,
    ) -> Option<()> {
        if let Some(d_pos) = component.find('d') {
            let count = &component[..d_pos];
            let mut rest = &component[d_pos + 1..];
            let exploding = rest.ends_with('x');
            if exploding {
                rest = &rest[..rest.len() - 1];
            }
            let count: u32 = if count.is_empty() {
                1
            } else {
                count.parse().ok()?
            };
            let sides: u32 = rest.parse().ok()?;
            if count == 0 || count > MAX_DICE || sides == 0 {
                return None;
            }
            terms.push(DiceTerm {
                count,
                sides,
                exploding,
                negative,
            });
        } else {
            let value: i64 = component.parse().ok()?;
            let value = if negative { value.checked_neg()? } else { value };
            *modifier = modifier.checked_add(value)?;
        }
        Some(())
    }

    /// Rolls the expression with the given random source.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> DiceRoll {
        let mut faces = Vec::new();
        let mut total = self.modifier;
        for term in &self.terms {
            let mut subtotal: i64 = 0;
            for _ in 0..term.count {
                let mut face = rng.gen_range(1..=term.sides);
                faces.push(face);
                subtotal += i64::from(face);
                let mut explosions = 0;
                let explodes = term.exploding && term.sides > 1;
                while explodes && face == term.sides && explosions < MAX_EXPLOSIONS {
                    face = rng.gen_range(1..=term.sides);
                    faces.push(face);
                    subtotal += i64::from(face);
                    explosions += 1;
                }
            }
            total = if term.negative {
                total.saturating_sub(subtotal)
            } else {
                total.saturating_add(subtotal)
            };
        }
        DiceRoll { faces, total }
    }

    /// The smallest total this expression can produce.
    #[must_use]
    pub fn min(&self) -> i64 {
        self.terms.iter().fold(self.modifier, |acc, term| {
            let count = i64::from(term.count);
            if term.negative {
                acc.saturating_sub(count * i64::from(term.sides))
            } else {
                acc.saturating_add(count)
            }
        })
    }
}

impl FromStr for DiceExpr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            if term.negative {
                write!(f, "-")?;
            } else if i > 0 {
                write!(f, "+")?;
            }
            write!(f, "{}d{}", term.count, term.sides)?;
            if term.exploding {
                write!(f, "x")?;
            }
        }
        match self.modifier {
            0 => Ok(()),
            m if m > 0 && !self.terms.is_empty() => write!(f, "+{m}"),
            m => write!(f, "{m}"),
        }
    }
}
