//! Capacitive pads on the STM32 Touch Sensing Controller.
//!
//! Both pads share the one TSC peripheral, so each `TscPad` holds a
//! `RefCell` borrow of the wrapper and runs its own single-group acquisition.

use core::cell::RefCell;

use crate::hal;
use crate::hal::pac;
use crate::hal::rcc::Rcc;
use crate::hal::tsc::Tsc;

use touch::TouchChannel;

/// Group, sampling-capacitor IO and electrode IO of one pad
#[derive(Clone, Copy, Debug)]
pub struct TscSample {
    pub group: u8,
    pub sample: u8,
    pub channel: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PadError {
    /// Acquisition stopped at max count before the sampling cap charged
    MaxCount,
}

pub struct TscWrapper {
    tsc: Tsc,
    max_count: u16,
}

impl TscWrapper {
    pub fn new(tsc: pac::TSC, rcc: &mut Rcc) -> Self {
        let config = hal::tsc::Config {
            clock_prescale: None,
            max_count: Some(hal::tsc::MaxCount::U8191),
            charge_transfer_high: None,
            charge_transfer_low: None,
        };
        Self {
            tsc: Tsc::tsc(tsc, rcc, Some(config)),
            max_count: 8191,
        }
    }

    /// Count reported for a group that hit max count. Reads as "no touch".
    pub fn saturated(&self) -> u16 {
        self.max_count + 1
    }

    /// Run one blocking acquisition on a single group
    ///
    /// Returns None if the group did not complete before max count.
    pub fn acquire(&mut self, s: &TscSample) -> Option<u16> {
        // The HAL does not expose the IO routing registers
        let regs = unsafe { pac::Peripherals::steal().TSC };

        regs.iogcsr.write(|w| unsafe { w.bits(1 << (s.group - 1)) });
        regs.ioscr.write(|w| unsafe { w.bits(1 << ((s.group - 1) * 4 + s.sample - 1)) });
        regs.ioccr.write(|w| unsafe { w.bits(1 << ((s.group - 1) * 4 + s.channel - 1)) });

        // A max count error is visible in the group status below
        self.tsc.acquire().ok();

        let group_status = regs.iogcsr.read().bits() >> 16;
        if group_status & (1 << (s.group - 1)) != 0 {
            Some(self.tsc.read_unchecked(s.group))
        } else {
            None
        }
    }
}

/// One pad with a first order low-pass over its acquisitions
pub struct TscPad<'a> {
    tsc: &'a RefCell<TscWrapper>,
    sample: TscSample,
    filtered: Option<u32>,
    pub threshold: u16,
}

impl<'a> TscPad<'a> {
    pub fn new(tsc: &'a RefCell<TscWrapper>, sample: TscSample) -> Self {
        Self {
            tsc,
            sample,
            filtered: None,
            threshold: 0,
        }
    }
}

impl TouchChannel for TscPad<'_> {
    type Error = PadError;

    fn read_raw(&mut self) -> Result<u16, PadError> {
        self.tsc
            .borrow_mut()
            .acquire(&self.sample)
            .ok_or(PadError::MaxCount)
    }

    fn read_filtered(&mut self) -> Result<u16, PadError> {
        let raw = {
            let mut tsc = self.tsc.borrow_mut();
            let count = tsc.acquire(&self.sample);
            count.unwrap_or(tsc.saturated()) as u32
        };

        // Weight 1/4 on the new sample
        let next = match self.filtered {
            Some(prev) => (prev * 3 + raw) / 4,
            None => raw,
        };
        self.filtered = Some(next);
        log::trace!(
            "G{}: raw={} filtered={} threshold={}",
            self.sample.group,
            raw,
            next,
            self.threshold
        );
        Ok(next as u16)
    }

    fn set_threshold(&mut self, threshold: u16) -> Result<(), PadError> {
        self.threshold = threshold;
        Ok(())
    }
}
