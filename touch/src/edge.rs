use crate::calibration::CalibrationProfile;

/// A completed press/release pair
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchEvent {
    pub start_ms: u32,
    pub end_ms: u32,
    pub duration_ms: u32,
}

/// Press state of a single pad
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadState {
    Released,
    /// Holds the timestamp the press began
    Pressed(u32),
}

/// Turns a stream of pad levels into press/release edges.
///
/// A single sample below the threshold registers a press and a single sample
/// at or above it registers the release. There is no debounce.
pub struct EdgeDetector {
    pub profile: CalibrationProfile,
    pub state: PadState,
}

impl EdgeDetector {
    pub fn new(profile: CalibrationProfile) -> Self {
        Self {
            profile,
            state: PadState::Released,
        }
    }

    pub fn pressed(&self) -> bool {
        matches!(self.state, PadState::Pressed(_))
    }

    /// Process a new level reading for this pad
    ///
    /// Returns the completed touch when this sample is a release edge.
    pub fn push(&mut self, level: u16, now_ms: u32) -> Option<TouchEvent> {
        let touched = self.profile.is_touched(level);

        match self.state {
            PadState::Released if touched => {
                self.state = PadState::Pressed(now_ms);
                log::debug!("press at {} (level {})", now_ms, level);
                None
            }
            PadState::Pressed(start_ms) if !touched => {
                self.state = PadState::Released;
                let duration_ms = now_ms.wrapping_sub(start_ms);
                log::debug!("release at {} after {} ms", now_ms, duration_ms);
                Some(TouchEvent {
                    start_ms,
                    end_ms: now_ms,
                    duration_ms,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
pub mod test {
    use super::*;

    const BASE: u16 = 1000;

    fn detector() -> EdgeDetector {
        EdgeDetector::new(CalibrationProfile {
            baseline: BASE,
            threshold: BASE / 2,
        })
    }

    #[test]
    fn press_then_release_emits_duration() {
        let mut d = detector();

        assert_eq!(d.push(BASE, 0), None);
        assert!(!d.pressed());

        assert_eq!(d.push(300, 100), None);
        assert!(d.pressed(), "Single sample below threshold must press");

        // Holding produces nothing
        assert_eq!(d.push(310, 150), None);
        assert_eq!(d.push(320, 3000), None);

        let event = d.push(BASE, 3150).expect("Release not detected");
        assert_eq!(event.start_ms, 100);
        assert_eq!(event.end_ms, 3150);
        assert_eq!(event.duration_ms, 3050);
        assert!(!d.pressed());

        assert_eq!(d.push(BASE, 3200), None);
    }

    #[test]
    fn threshold_level_counts_as_released() {
        let mut d = detector();
        d.push(BASE / 2, 0);
        assert!(!d.pressed());

        d.push(BASE / 2 - 1, 50);
        assert!(d.pressed());
        assert!(d.push(BASE / 2, 100).is_some());
    }

    #[test]
    fn duration_survives_clock_wrap() {
        let mut d = detector();
        d.push(0, u32::MAX - 99);
        let event = d.push(BASE, 100).unwrap();
        assert_eq!(event.duration_ms, 200);
    }
}
