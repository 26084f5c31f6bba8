//! Compass facing of the reader.
//!
//! Facing is world state: a `goto` or `direction` may turn the reader
//! before entering the target room, and the rule library can describe
//! the compass points relative to the current facing.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the four compass points.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Facing {
    /// North (the initial facing).
    #[default]
    North,
    /// East.
    East,
    /// South.
    South,
    /// West.
    West,
}

impl Facing {
    /// All four facings in clockwise order starting at north.
    pub const ALL: [Self; 4] = [Self::North, Self::East, Self::South, Self::West];

    const fn quarter(self) -> usize {
        match self {
            Self::North => 0,
            Self::East => 1,
            Self::South => 2,
            Self::West => 3,
        }
    }

    /// The single-letter code (`n`, `e`, `s`, `w`).
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::North => "n",
            Self::East => "e",
            Self::South => "s",
            Self::West => "w",
        }
    }

    /// The compass name (`north`, `east`, ...).
    #[must_use]
    pub const fn compass(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::East => "east",
            Self::South => "south",
            Self::West => "west",
        }
    }

    /// Number of clockwise quarter turns from `self` to `target`.
    const fn turns_to(self, target: Self) -> usize {
        (4 + target.quarter() - self.quarter()) % 4
    }

    /// Where `target` lies relative to someone facing `self`:
    /// `front`, `right`, `rear` or `left`.
    #[must_use]
    pub const fn relative(self, target: Self) -> &'static str {
        match self.turns_to(target) {
            0 => "front",
            1 => "right",
            2 => "rear",
            _ => "left",
        }
    }

    /// A choice label for heading towards `target` while facing `self`.
    #[must_use]
    pub const fn direction_label(self, target: Self) -> &'static str {
        match self.turns_to(target) {
            0 => "Continue forwards.",
            1 => "Turn right and continue.",
            2 => "Go back.",
            _ => "Turn left and continue.",
        }
    }

    /// The facing directly behind this one.
    #[must_use]
    pub const fn behind(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }
}

impl FromStr for Facing {
    type Err = crate::Error;

    /// Parses a facing from any word starting with n, e, s or w.
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('n') => Ok(Self::North),
            Some('e') => Ok(Self::East),
            Some('s') => Ok(Self::South),
            Some('w') => Ok(Self::West),
            _ => Err(crate::Error::new(crate::ErrorKind::InvalidArgument {
                function: "facing".to_string(),
                message: format!("unknown facing '{s}'"),
            })),
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
