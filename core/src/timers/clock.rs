//! Simulation clock
//!
//! Time only moves when the host reports a finished turn. There is no
//! wall-clock source here: `time` is the sum of every turn length the engine
//! has been told about.

use serde::{Deserialize, Serialize};

/// Accumulated simulation time, in integer milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    time: u64,
    turn_length: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn restore(time: u64, turn_length: u64) -> Self {
        Self { time, turn_length }
    }

    /// Time since the start of the simulation (ms)
    pub fn time(&self) -> u64 {
        self.time
    }

    /// Length of the most recent turn (ms)
    pub fn last_turn_length(&self) -> u64 {
        self.turn_length
    }

    /// Apply one turn. Returns the turn length in milliseconds.
    pub(crate) fn advance(&mut self, turn_length_secs: f64) -> u64 {
        let turn_length = turn_length_ms(turn_length_secs);
        self.turn_length = turn_length;
        self.time = self.time.saturating_add(turn_length);
        turn_length
    }
}

/// Convert a reported turn length to whole milliseconds, rounding to nearest.
///
/// Negative and non-finite lengths count as an empty turn.
pub fn turn_length_ms(turn_length_secs: f64) -> u64 {
    if !turn_length_secs.is_finite() || turn_length_secs < 0.0 {
        tracing::warn!(turn_length_secs, "Ignoring invalid turn length");
        return 0;
    }
    (turn_length_secs * 1000.0).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates_rounded_turns() {
        let mut clock = Clock::new();
        assert_eq!(clock.advance(0.2), 200);
        assert_eq!(clock.advance(0.35), 350);
        assert_eq!(clock.time(), 550);
        assert_eq!(clock.last_turn_length(), 350);
    }

    #[test]
    fn rounds_to_nearest_millisecond() {
        assert_eq!(turn_length_ms(0.0004), 0);
        assert_eq!(turn_length_ms(0.0005), 1);
        assert_eq!(turn_length_ms(0.1234), 123);
        assert_eq!(turn_length_ms(1.9996), 2000);
    }

    #[test]
    fn invalid_turn_lengths_do_not_move_time() {
        let mut clock = Clock::new();
        clock.advance(1.0);
        assert_eq!(clock.advance(-0.5), 0);
        assert_eq!(clock.advance(f64::NAN), 0);
        assert_eq!(clock.advance(f64::INFINITY), 0);
        assert_eq!(clock.time(), 1000);
        assert_eq!(clock.last_turn_length(), 0);
    }
}
