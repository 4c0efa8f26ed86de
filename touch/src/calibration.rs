use core::fmt;

use crate::{AuthConfig, TouchChannel};

/// Idle level of a pad and the detection threshold derived from it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalibrationProfile {
    pub baseline: u16,
    pub threshold: u16,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationError<E> {
    /// The driver failed to produce a reading
    Read(E),
    /// Baseline read as zero, so no touch could ever fall below the threshold
    NoSignal,
    /// The driver rejected the threshold
    SetThreshold(E),
}

impl<E: fmt::Debug> fmt::Display for CalibrationError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalibrationError::Read(e) => write!(f, "baseline read failed: {:?}", e),
            CalibrationError::NoSignal => f.write_str("baseline is zero"),
            CalibrationError::SetThreshold(e) => write!(f, "threshold rejected: {:?}", e),
        }
    }
}

impl CalibrationProfile {
    /// Build a profile from a known baseline
    pub fn from_baseline(baseline: u16, config: &AuthConfig) -> Self {
        // u32 intermediate, baseline * 100 overflows u16
        let threshold = (baseline as u32 * config.threshold_percent as u32 / 100) as u16;
        Self {
            baseline,
            threshold,
        }
    }

    /// Sample the untouched pad once and program the derived threshold.
    ///
    /// The pad must not be touched while this runs. There are no retries; the
    /// caller decides what a failure means.
    pub fn calibrate<C: TouchChannel>(
        channel: &mut C,
        config: &AuthConfig,
    ) -> Result<Self, CalibrationError<C::Error>> {
        let baseline = channel.read_raw().map_err(CalibrationError::Read)?;
        if baseline == 0 {
            return Err(CalibrationError::NoSignal);
        }

        let profile = Self::from_baseline(baseline, config);
        channel
            .set_threshold(profile.threshold)
            .map_err(CalibrationError::SetThreshold)?;

        log::info!(
            "calibrated: baseline={} threshold={}",
            profile.baseline,
            profile.threshold
        );
        Ok(profile)
    }

    /// True while `level` indicates a touch
    pub fn is_touched(&self, level: u16) -> bool {
        level < self.threshold
    }
}

#[cfg(test)]
pub mod test {
    use super::*;
    use crate::DEFAULT_AUTH_CONFIG;

    struct FixedChannel {
        raw: Result<u16, ()>,
        threshold: Option<u16>,
        reject_threshold: bool,
    }

    impl FixedChannel {
        fn new(raw: Result<u16, ()>) -> Self {
            Self {
                raw,
                threshold: None,
                reject_threshold: false,
            }
        }
    }

    impl TouchChannel for FixedChannel {
        type Error = ();

        fn read_raw(&mut self) -> Result<u16, ()> {
            self.raw
        }

        fn read_filtered(&mut self) -> Result<u16, ()> {
            self.raw
        }

        fn set_threshold(&mut self, threshold: u16) -> Result<(), ()> {
            if self.reject_threshold {
                return Err(());
            }
            self.threshold = Some(threshold);
            Ok(())
        }
    }

    #[test]
    fn threshold_is_half_of_baseline() {
        let mut ch = FixedChannel::new(Ok(1200));
        let profile = CalibrationProfile::calibrate(&mut ch, &DEFAULT_AUTH_CONFIG).unwrap();
        assert_eq!(profile.baseline, 1200);
        assert_eq!(profile.threshold, 600);
        assert_eq!(ch.threshold, Some(600));

        assert!(profile.is_touched(599));
        assert!(!profile.is_touched(600));
    }

    #[test]
    fn large_baseline_does_not_overflow() {
        let profile = CalibrationProfile::from_baseline(u16::MAX, &DEFAULT_AUTH_CONFIG);
        assert_eq!(profile.threshold, u16::MAX / 2);
    }

    #[test]
    fn read_failure_is_reported() {
        let mut ch = FixedChannel::new(Err(()));
        let err = CalibrationProfile::calibrate(&mut ch, &DEFAULT_AUTH_CONFIG).unwrap_err();
        assert_eq!(err, CalibrationError::Read(()));
        assert_eq!(ch.threshold, None);
    }

    #[test]
    fn zero_baseline_is_rejected() {
        let mut ch = FixedChannel::new(Ok(0));
        let err = CalibrationProfile::calibrate(&mut ch, &DEFAULT_AUTH_CONFIG).unwrap_err();
        assert_eq!(err, CalibrationError::NoSignal);
    }

    #[test]
    fn rejected_threshold_is_reported() {
        let mut ch = FixedChannel::new(Ok(800));
        ch.reject_threshold = true;
        let err = CalibrationProfile::calibrate(&mut ch, &DEFAULT_AUTH_CONFIG).unwrap_err();
        assert_eq!(err, CalibrationError::SetThreshold(()));
    }
}
