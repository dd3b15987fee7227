//! Face-turn notation for the 3x3x3 cube.

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::VariantArray;

/// Face of the cube that a turn rotates.
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::VariantArray,
)]
pub enum Face {
    /// Up
    U,
    /// Down
    D,
    /// Left
    L,
    /// Right
    R,
    /// Front
    F,
    /// Back
    B,
}

/// Amount that a face is turned.
#[derive(
    Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq, Eq, Hash, strum::VariantArray,
)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    /// Quarter turn clockwise, written without a suffix.
    #[default]
    Identity,
    /// Quarter turn counterclockwise, written with `'`.
    Inverse,
    /// Half turn, written with `2`.
    Double,
}
impl Modifier {
    /// Returns the suffix used to write the modifier after a face.
    pub fn suffix(self) -> &'static str {
        match self {
            Modifier::Identity => "",
            Modifier::Inverse => "'",
            Modifier::Double => "2",
        }
    }

    /// Parses a suffix, returning `None` if it is not a known modifier.
    pub fn from_suffix(s: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|m| m.suffix() == s)
    }
}
impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Single turn of one face, such as `R`, `U'`, or `F2`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Turn {
    /// Face being turned.
    pub face: Face,
    /// Direction and amount of the turn.
    pub modifier: Modifier,
}
impl Turn {
    /// Constructs a turn.
    pub const fn new(face: Face, modifier: Modifier) -> Self {
        Self { face, modifier }
    }
}
impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.face, self.modifier)
    }
}
impl FromStr for Turn {
    type Err = ParseTurnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let face_char = chars.next().ok_or(ParseTurnError::Empty)?;
        let face = face_char
            .to_string()
            .parse()
            .map_err(|_| ParseTurnError::UnknownFace(s.to_owned()))?;
        let suffix = chars.as_str();
        let modifier =
            Modifier::from_suffix(suffix).ok_or_else(|| ParseTurnError::UnknownModifier {
                turn: s.to_owned(),
                suffix: suffix.to_owned(),
            })?;
        Ok(Self { face, modifier })
    }
}

/// Error produced when parsing turn notation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseTurnError {
    /// A turn was expected but the input was empty.
    #[error("empty turn")]
    Empty,
    /// The turn does not start with one of `U D L R F B`.
    #[error("unknown face in turn {0:?}")]
    UnknownFace(String),
    /// The text after the face is not `'` or `2`.
    #[error("unknown modifier {suffix:?} in turn {turn:?}")]
    UnknownModifier {
        /// Whole turn being parsed.
        turn: String,
        /// Unrecognized suffix.
        suffix: String,
    },
}

/// Parses a whitespace-separated sequence of turns.
pub fn parse_turns(s: &str) -> Result<Vec<Turn>, ParseTurnError> {
    s.split_whitespace().map(str::parse).collect()
}

/// Writes a sequence of turns separated by single spaces.
pub fn format_turns(turns: &[Turn]) -> String {
    turns.iter().join(" ")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_turn_display() {
        assert_eq!(Turn::new(Face::R, Modifier::Identity).to_string(), "R");
        assert_eq!(Turn::new(Face::U, Modifier::Inverse).to_string(), "U'");
        assert_eq!(Turn::new(Face::B, Modifier::Double).to_string(), "B2");
    }

    #[test]
    fn test_parse_turns() {
        assert_eq!(
            parse_turns("R U2  F'\tD").unwrap(),
            vec![
                Turn::new(Face::R, Modifier::Identity),
                Turn::new(Face::U, Modifier::Double),
                Turn::new(Face::F, Modifier::Inverse),
                Turn::new(Face::D, Modifier::Identity),
            ],
        );
        assert_eq!(parse_turns("").unwrap(), vec![]);
    }

    #[test]
    fn test_parse_turn_errors() {
        assert_eq!("".parse::<Turn>(), Err(ParseTurnError::Empty));
        assert_eq!(
            "X2".parse::<Turn>(),
            Err(ParseTurnError::UnknownFace("X2".to_owned())),
        );
        assert_eq!(
            "R3".parse::<Turn>(),
            Err(ParseTurnError::UnknownModifier {
                turn: "R3".to_owned(),
                suffix: "3".to_owned(),
            }),
        );
        // lowercase faces are slice/wide moves in other notations
        parse_turns("R u").expect_err("lowercase face");
    }

    #[test]
    fn test_alphabets() {
        assert_eq!(Face::VARIANTS.len(), 6);
        let suffixes = Modifier::VARIANTS.iter().map(|m| m.suffix()).collect_vec();
        assert_eq!(suffixes, ["", "'", "2"]);
    }
}
