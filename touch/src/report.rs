//! Line-oriented rendering of calibration results, banner and tick notices.
//!
//! Every line is terminated with `\r\n` for a serial terminal.

use core::fmt::{self, Write};

use crate::auth::Notice;
use crate::calibration::CalibrationProfile;
use crate::sequence::Verdict;
use crate::{AuthConfig, PATTERN_LEN};

fn line<W: Write>(w: &mut W, args: fmt::Arguments) -> fmt::Result {
    w.write_fmt(args)?;
    w.write_str("\r\n")
}

/// Tenths of a second, rounded, as `d.d`
struct Seconds(u32);

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tenths = (self.0 + 50) / 100;
        write!(f, "{}.{}", tenths / 10, tenths % 10)
    }
}

pub fn write_calibration<W: Write>(
    w: &mut W,
    pad: &str,
    profile: &CalibrationProfile,
) -> fmt::Result {
    line(
        w,
        format_args!(
            "Pad {} calibrated - baseline: {}, threshold: {}",
            pad, profile.baseline, profile.threshold
        ),
    )
}

/// Startup banner with the timing policy and usage instructions
pub fn write_banner<W: Write>(
    w: &mut W,
    config: &AuthConfig,
    recording_pad: &str,
    validation_pad: &str,
) -> fmt::Result {
    line(w, format_args!("-------------------------------------------"))?;
    line(w, format_args!(" TOUCH PATTERN AUTHENTICATION"))?;
    line(w, format_args!("-------------------------------------------"))?;
    line(w, format_args!("Timing:"))?;
    line(w, format_args!("- Short touch: <{} seconds", config.short_max_ms / 1000))?;
    line(w, format_args!("- Long touch: >={} seconds", config.long_min_ms / 1000))?;
    line(
        w,
        format_args!(
            "- Max between touches: {} seconds",
            config.max_between_touches_ms / 1000
        ),
    )?;
    line(
        w,
        format_args!("- Time to validate: {} seconds", config.validation_timeout_ms / 1000),
    )?;
    line(w, format_args!("Instructions:"))?;
    line(w, format_args!("1. Touch {}", recording_pad))?;
    line(w, format_args!("   Sequence: 3 long, 3 short, 3 long"))?;
    line(w, format_args!("2. Then touch {} to validate", validation_pad))?;
    line(w, format_args!("==========================================="))
}

pub fn write_notice<W: Write>(w: &mut W, notice: &Notice, config: &AuthConfig) -> fmt::Result {
    match notice {
        Notice::TouchRecorded {
            index,
            symbol,
            duration_ms,
        } => line(
            w,
            format_args!(
                "Touch {}/{}: {} ({} seconds)",
                index,
                PATTERN_LEN,
                symbol.label(),
                Seconds(*duration_ms)
            ),
        ),
        Notice::SequenceComplete => {
            line(w, format_args!("SEQUENCE COMPLETE"))?;
            line(
                w,
                format_args!(
                    "Touch the validation pad to validate the sequence ({} seconds)",
                    config.validation_timeout_ms / 1000
                ),
            )
        }
        Notice::WrongPad => line(
            w,
            format_args!("Error: touch the validation pad to validate, not the recording pad"),
        ),
        Notice::Verdict(verdict) => write_verdict(w, verdict),
        Notice::InterTouchTimeout => line(
            w,
            format_args!(
                "Time between touches exceeded ({} seconds)",
                config.max_between_touches_ms / 1000
            ),
        ),
        Notice::ValidationTimeout => line(
            w,
            format_args!(
                "Validation time exhausted ({} seconds)",
                config.validation_timeout_ms / 1000
            ),
        ),
        Notice::Reset => line(w, format_args!("Waiting for sequence on the recording pad...")),
    }
}

/// Per-position detail followed by the overall result as the final line
pub fn write_verdict<W: Write>(w: &mut W, verdict: &Verdict) -> fmt::Result {
    line(w, format_args!("=== RESULT ==="))?;
    for i in 0..PATTERN_LEN {
        line(
            w,
            format_args!(
                "Touch {}: {} {}",
                i + 1,
                verdict.entered[i].label(),
                if verdict.per_position[i] { "[OK]" } else { "[X]" }
            ),
        )?;
    }
    if verdict.approved {
        line(w, format_args!("APROBADO"))
    } else {
        line(w, format_args!("NO APROBADO"))
    }
}
