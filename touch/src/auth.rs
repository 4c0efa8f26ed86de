//! The authentication state machine.
//!
//! Each tick samples both pads and runs edge detection. While recording, a
//! stale attempt is expired before the tick's release is recorded; while
//! awaiting validation, a wrong-pad touch or the validation release take
//! precedence over the validation timeout. All state lives
//! in one [`AuthSession`] owned by the machine; an attempt ends with a
//! verdict or a timeout and the session is cleared in place.

use heapless::Vec;

use crate::calibration::CalibrationProfile;
use crate::edge::{EdgeDetector, TouchEvent};
use crate::sequence::{Sequence, Verdict};
use crate::{AuthConfig, Clock, Symbol, TouchChannel, DEFAULT_AUTH_CONFIG};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Recording,
    AwaitingValidation,
}

/// Status produced by a tick, rendered by [`crate::report`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    /// `index` is 1-based
    TouchRecorded {
        index: usize,
        symbol: Symbol,
        duration_ms: u32,
    },
    SequenceComplete,
    /// The recording pad was touched while waiting for validation
    WrongPad,
    Verdict(Verdict),
    InterTouchTimeout,
    ValidationTimeout,
    /// Session cleared after a verdict or a timeout
    Reset,
}

/// Upper bound of notices one tick can produce
pub const MAX_NOTICES: usize = 4;

pub type Notices = Vec<Notice, MAX_NOTICES>;

/// Live state of the current attempt
#[derive(Clone, Debug)]
pub struct AuthSession {
    pub sequence: Sequence,
    pub mode: Mode,
    /// Last accepted touch release, or the moment the sequence completed
    pub last_event_ms: u32,
    /// Set when a wrong-pad warning starts a cooldown
    pub cooldown_from: Option<u32>,
}

impl AuthSession {
    pub fn new() -> Self {
        Self {
            sequence: Sequence::new(),
            mode: Mode::Recording,
            last_event_ms: 0,
            cooldown_from: None,
        }
    }

    fn reset(&mut self) {
        self.sequence.clear();
        self.mode = Mode::Recording;
        self.last_event_ms = 0;
        self.cooldown_from = None;
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AuthStateMachine<'a> {
    pub config: &'a AuthConfig,
    pub recording: EdgeDetector,
    pub validation: EdgeDetector,
    session: AuthSession,
}

impl<'a> AuthStateMachine<'a> {
    pub fn new(
        recording: CalibrationProfile,
        validation: CalibrationProfile,
        config: Option<&'a AuthConfig>,
    ) -> Self {
        Self {
            config: config.unwrap_or(&DEFAULT_AUTH_CONFIG),
            recording: EdgeDetector::new(recording),
            validation: EdgeDetector::new(validation),
            session: AuthSession::new(),
        }
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    pub fn mode(&self) -> Mode {
        self.session.mode
    }

    pub fn sequence(&self) -> &Sequence {
        &self.session.sequence
    }

    /// Read both pads and run one tick
    pub fn poll<K: Clock, C: TouchChannel>(
        &mut self,
        clock: &K,
        recording: &mut C,
        validation: &mut C,
    ) -> Result<Notices, C::Error> {
        let recording_level = recording.read_filtered()?;
        let validation_level = validation.read_filtered()?;
        Ok(self.step(clock.now_ms(), recording_level, validation_level))
    }

    /// Run one tick with the given pad levels
    pub fn step(&mut self, now_ms: u32, recording_level: u16, validation_level: u16) -> Notices {
        let mut notices = Notices::new();

        if let Some(from) = self.session.cooldown_from {
            if now_ms.wrapping_sub(from) < self.config.wrong_pad_cooldown_ms {
                return notices;
            }
            self.session.cooldown_from = None;
        }

        let recording_edge = self.recording.push(recording_level, now_ms);
        let validation_edge = self.validation.push(validation_level, now_ms);
        let elapsed = now_ms.wrapping_sub(self.session.last_event_ms);

        match self.session.mode {
            Mode::Recording => {
                // Expire a stale attempt before this tick's release is recorded
                if !self.session.sequence.is_empty()
                    && elapsed > self.config.max_between_touches_ms
                {
                    self.expire(Notice::InterTouchTimeout, elapsed, &mut notices);
                }
                if let Some(event) = recording_edge {
                    self.record(event, &mut notices);
                }
            }
            Mode::AwaitingValidation => {
                if self.recording.pressed() {
                    // The touch is not consumed; its release is ignored later
                    emit(&mut notices, Notice::WrongPad);
                    self.session.cooldown_from = Some(now_ms);
                } else if validation_edge.is_some() {
                    if let Some(verdict) = self.session.sequence.validate() {
                        log::info!("verdict: approved={}", verdict.approved);
                        emit(&mut notices, Notice::Verdict(verdict));
                    }
                    self.session.reset();
                    emit(&mut notices, Notice::Reset);
                } else if elapsed > self.config.validation_timeout_ms {
                    self.expire(Notice::ValidationTimeout, elapsed, &mut notices);
                }
            }
        }

        notices
    }

    fn expire(&mut self, notice: Notice, elapsed: u32, notices: &mut Notices) {
        log::warn!("{:?} after {} ms", notice, elapsed);
        emit(notices, notice);
        self.session.reset();
        emit(notices, Notice::Reset);
    }

    fn record(&mut self, event: TouchEvent, notices: &mut Notices) {
        let symbol = Symbol::classify(event.duration_ms, self.config);
        if !self.session.sequence.push(symbol) {
            return;
        }

        self.session.last_event_ms = event.end_ms;
        emit(
            notices,
            Notice::TouchRecorded {
                index: self.session.sequence.len(),
                symbol,
                duration_ms: event.duration_ms,
            },
        );

        if self.session.sequence.is_full() {
            // Validation window starts now
            self.session.mode = Mode::AwaitingValidation;
            self.session.last_event_ms = event.end_ms;
            emit(notices, Notice::SequenceComplete);
        }
    }
}

fn emit(notices: &mut Notices, notice: Notice) {
    // A tick never produces more than MAX_NOTICES
    let _ = notices.push(notice);
}
