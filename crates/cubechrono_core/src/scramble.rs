use std::fmt;

use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use strum::VariantArray;

use crate::notation::{Face, Modifier, ParseTurnError, Turn, format_turns, parse_turns};

/// Number of turns in a scramble.
///
/// **Changing this will break seeded scramble compatibility.**
pub const SCRAMBLE_LENGTH: usize = 20;

/// Puzzle that a scramble is generated for.
///
/// Only [`ScrambleKind::Three`] is known. Any other identifier is carried
/// through unchanged and scrambled using the 3x3x3 face alphabet.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum ScrambleKind {
    /// 3x3x3 cube.
    #[default]
    Three,
    /// Puzzle identifier that is not recognized.
    Other(String),
}
impl ScrambleKind {
    /// Returns the identifier used on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            ScrambleKind::Three => "Three",
            ScrambleKind::Other(s) => s,
        }
    }

    /// Returns whether the kind is a recognized puzzle.
    pub fn is_known(&self) -> bool {
        !matches!(self, ScrambleKind::Other(_))
    }
}
impl From<String> for ScrambleKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Three" => ScrambleKind::Three,
            _ => ScrambleKind::Other(value),
        }
    }
}
impl From<&str> for ScrambleKind {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}
impl From<ScrambleKind> for String {
    fn from(value: ScrambleKind) -> Self {
        match value {
            ScrambleKind::Three => "Three".to_owned(),
            ScrambleKind::Other(s) => s,
        }
    }
}
impl fmt::Display for ScrambleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Twist sequence that scrambles a puzzle.
///
/// On the wire this is `{"kind": ..., "sequence": "R U2 F' ..."}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(into = "ScrambleRepr", try_from = "ScrambleRepr")]
pub struct Scramble {
    /// Puzzle the scramble is for.
    pub kind: ScrambleKind,
    turns: Vec<Turn>,
}
impl Scramble {
    /// Constructs a scramble from a list of turns without checking it.
    pub fn new(kind: ScrambleKind, turns: Vec<Turn>) -> Self {
        Self { kind, turns }
    }

    /// Parses a scramble from its space-separated sequence.
    pub fn from_sequence(kind: ScrambleKind, sequence: &str) -> Result<Self, ParseTurnError> {
        Ok(Self::new(kind, parse_turns(sequence)?))
    }

    /// Returns the turns in the scramble.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Returns the scramble as space-separated notation.
    pub fn sequence(&self) -> String {
        format_turns(&self.turns)
    }

    /// Checks that the scramble has the standard length and never turns the
    /// same face twice in a row.
    pub fn validate(&self) -> Result<(), InvalidScramble> {
        if self.turns.len() != SCRAMBLE_LENGTH {
            return Err(InvalidScramble::WrongLength {
                expected: SCRAMBLE_LENGTH,
                actual: self.turns.len(),
            });
        }
        match self
            .turns
            .windows(2)
            .position(|pair| pair[0].face == pair[1].face)
        {
            Some(index) => Err(InvalidScramble::RepeatedFace {
                index,
                face: self.turns[index].face,
            }),
            None => Ok(()),
        }
    }
}
impl fmt::Display for Scramble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sequence())
    }
}

#[derive(Serialize, Deserialize)]
struct ScrambleRepr {
    kind: ScrambleKind,
    sequence: String,
}
impl From<Scramble> for ScrambleRepr {
    fn from(value: Scramble) -> Self {
        Self {
            sequence: value.sequence(),
            kind: value.kind,
        }
    }
}
impl TryFrom<ScrambleRepr> for Scramble {
    type Error = ParseTurnError;

    fn try_from(value: ScrambleRepr) -> Result<Self, Self::Error> {
        Self::from_sequence(value.kind, &value.sequence)
    }
}

/// Reason that a scramble breaks the scramble invariants.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum InvalidScramble {
    #[error("expected {expected} turns, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("face {face} is turned twice in a row at index {index}")]
    RepeatedFace { index: usize, face: Face },
}

/// Error produced when generating scrambles.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScrambleError {
    /// Request parameters are out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Request for a batch of scrambles.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScrambleRequest {
    /// Puzzle to scramble.
    pub kind: ScrambleKind,
    /// Number of scrambles. Must be positive.
    pub count: i64,
    /// Seed for reproducible output. If `None`, the OS RNG is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}
impl ScrambleRequest {
    /// Constructs an unseeded request.
    pub fn new(kind: impl Into<ScrambleKind>, count: i64) -> Self {
        Self {
            kind: kind.into(),
            count,
            seed: None,
        }
    }

    /// Generates the requested scrambles.
    pub fn generate(&self) -> Result<ScrambleBatch, ScrambleError> {
        match self.seed {
            Some(seed) => generate_seeded(self.kind.clone(), self.count, seed),
            None => generate(self.kind.clone(), self.count),
        }
    }
}

/// Scrambles generated for a single request, all for the same puzzle.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScrambleBatch {
    /// Puzzle the scrambles are for.
    pub kind: ScrambleKind,
    /// Scrambles, in order of generation.
    pub scrambles: Vec<Scramble>,
}
impl ScrambleBatch {
    /// Returns the number of scrambles.
    pub fn len(&self) -> usize {
        self.scrambles.len()
    }
    /// Returns whether the batch is empty, which never happens for a batch
    /// returned by [`generate()`].
    pub fn is_empty(&self) -> bool {
        self.scrambles.is_empty()
    }
}

/// Generates `count` scrambles using the OS random number generator.
pub fn generate(kind: ScrambleKind, count: i64) -> Result<ScrambleBatch, ScrambleError> {
    generate_with_rng(kind, count, &mut rand::rng())
}

/// Generates `count` scrambles deterministically from a seed.
///
/// The same seed, kind, and count always produce the same batch.
pub fn generate_seeded(
    kind: ScrambleKind,
    count: i64,
    seed: u64,
) -> Result<ScrambleBatch, ScrambleError> {
    let mut rng = rand_chacha::ChaCha12Rng::seed_from_u64(seed);
    generate_with_rng(kind, count, &mut rng)
}

/// Generates `count` scrambles using the given random number generator.
///
/// Returns [`ScrambleError::InvalidArgument`] if `count` is not positive.
pub fn generate_with_rng<R: Rng + ?Sized>(
    kind: ScrambleKind,
    count: i64,
    rng: &mut R,
) -> Result<ScrambleBatch, ScrambleError> {
    if count <= 0 {
        return Err(ScrambleError::InvalidArgument(format!(
            "count must be positive, got {count}"
        )));
    }
    let count = usize::try_from(count)
        .map_err(|_| ScrambleError::InvalidArgument(format!("count {count} is too large")))?;

    if !kind.is_known() {
        log::warn!("unknown scramble kind {kind:?}; using 3x3x3 faces");
    }

    let scrambles = (0..count)
        .map(|_| Scramble::new(kind.clone(), random_turns(rng)))
        .collect();

    Ok(ScrambleBatch { kind, scrambles })
}

fn random_turns<R: Rng + ?Sized>(rng: &mut R) -> Vec<Turn> {
    let mut previous_face = None;
    (0..SCRAMBLE_LENGTH)
        .map(|_| {
            let face = random_face_except(rng, previous_face);
            let modifier = Modifier::VARIANTS[rng.random_range(0..Modifier::VARIANTS.len())];
            previous_face = Some(face);
            Turn::new(face, modifier)
        })
        .collect()
}

/// Picks a face uniformly from the faces other than `excluded`.
fn random_face_except<R: Rng + ?Sized>(rng: &mut R, excluded: Option<Face>) -> Face {
    match excluded {
        None => Face::VARIANTS[rng.random_range(0..Face::VARIANTS.len())],
        Some(excluded) => {
            let excluded_index = excluded as usize;
            let i = rng.random_range(0..Face::VARIANTS.len() - 1);
            // skip over the excluded face
            Face::VARIANTS[if i >= excluded_index { i + 1 } else { i }]
        }
    }
}
