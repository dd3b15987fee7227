//! Scramble generation, turn notation, and solve timing for Cube Chrono.
//!
//! The only stateful piece is [`Stopwatch`]. Scramble generation is a pure
//! function of its arguments and a random number generator, so concurrent
//! callers never share any generation state.

pub mod notation;
mod scramble;
mod solve;
pub mod stopwatch;

#[cfg(test)]
mod tests;

pub use notation::{Face, Modifier, ParseTurnError, Turn};
pub use scramble::*;
pub use solve::SolveTime;
pub use stopwatch::{Stopwatch, StopwatchState, TimeDisplay};
