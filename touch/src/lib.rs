#![cfg_attr(not(test), no_std)]

//! Touch-pattern authentication for a pair of capacitive pads.
//!
//! One pad records a sequence of long and short touches, the other confirms
//! it. Everything here is hardware-agnostic: the firmware supplies the
//! channel reads and the millisecond clock, and tests drive the same code
//! with synthetic level sequences.

pub mod auth;
pub mod calibration;
pub mod edge;
pub mod report;
pub mod sequence;

/// Binary classification of a single touch by its duration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Symbol {
    Long,
    Short,
}

impl Symbol {
    /// Classify a touch duration.
    ///
    /// Anything shorter than `long_min_ms` is `Short`, so the band between
    /// `short_max_ms` and `long_min_ms` collapses into `Short`.
    pub fn classify(duration_ms: u32, config: &AuthConfig) -> Self {
        if duration_ms >= config.long_min_ms {
            Symbol::Long
        } else {
            Symbol::Short
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Symbol::Long => "LONG",
            Symbol::Short => "SHORT",
        }
    }
}

/// Timing and threshold policy for the authentication machine
#[derive(Clone, Copy, Debug)]
pub struct AuthConfig {
    /// Touches lasting at least this long are `Long`
    pub long_min_ms: u32,
    /// Nominal upper bound of a short touch. Only reported; classification
    /// uses `long_min_ms` as the single boundary.
    pub short_max_ms: u32,
    /// Maximum idle gap between touches while recording
    pub max_between_touches_ms: u32,
    /// Maximum wait for the validation touch once the sequence is complete
    pub validation_timeout_ms: u32,
    /// Detection threshold as a percentage of the calibrated baseline
    pub threshold_percent: u8,
    /// Ticks are ignored for this long after a wrong-pad warning
    pub wrong_pad_cooldown_ms: u32,
    /// Polling period of the main loop
    pub tick_period_ms: u32,
    /// Delay after sensor start-up before the baseline is sampled
    pub settle_ms: u32,
}

impl AuthConfig {
    const fn default() -> Self {
        Self {
            long_min_ms: 3000,
            short_max_ms: 2000,
            max_between_touches_ms: 10_000,
            validation_timeout_ms: 15_000,
            threshold_percent: 50,
            wrong_pad_cooldown_ms: 1000,
            tick_period_ms: 50,
            settle_ms: 200,
        }
    }
}

pub const DEFAULT_AUTH_CONFIG: AuthConfig = AuthConfig::default();

/// Number of touches in one attempt
pub const PATTERN_LEN: usize = 9;

/// Source of monotonic milliseconds. Wraps at `u32::MAX`.
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// A single capacitive pad as provided by the sensor driver.
///
/// Readings drop when the pad is touched; only their relation to the
/// calibrated threshold matters.
pub trait TouchChannel {
    type Error;

    /// One unfiltered acquisition
    fn read_raw(&mut self) -> Result<u16, Self::Error>;

    /// Current low-pass filtered level
    fn read_filtered(&mut self) -> Result<u16, Self::Error>;

    /// Apply the detection threshold on the driver side
    fn set_threshold(&mut self, threshold: u16) -> Result<(), Self::Error>;
}
