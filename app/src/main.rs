#![no_main]
#![no_std]

use core::cell::RefCell;
use core::sync::atomic::{AtomicU32, Ordering};
use cortex_m_rt::{entry, exception};
use panic_halt as _;

use stm32f0xx_hal as hal;

use touch::auth::AuthStateMachine;
use touch::calibration::CalibrationProfile;
use touch::{report, AuthConfig, Clock, TouchChannel};

use crate::hal::pac;
use crate::hal::pac::interrupt;
use crate::hal::prelude::*;

use pad::{TscPad, TscSample, TscWrapper};

mod pad;
mod serial;

/// Sequence pad: PA0 electrode, PA1 sampling cap
static RECORDING_PAD: TscSample = TscSample { group: 1, sample: 2, channel: 1 };
/// Validation pad: PA4 electrode, PA6 sampling cap
static VALIDATION_PAD: TscSample = TscSample { group: 2, sample: 3, channel: 1 };

static AUTH_CONFIG: AuthConfig = touch::DEFAULT_AUTH_CONFIG;

/// Milliseconds since boot, advanced by SysTick
static TIME: AtomicU32 = AtomicU32::new(0);

struct SysTickClock;

impl Clock for SysTickClock {
    fn now_ms(&self) -> u32 {
        TIME.load(Ordering::Relaxed)
    }
}

fn calibrate_or_halt<C: TouchChannel>(pad: &mut C, name: &str) -> CalibrationProfile
where
    C::Error: core::fmt::Debug,
{
    match CalibrationProfile::calibrate(pad, &AUTH_CONFIG) {
        Ok(profile) => {
            report::write_calibration(&mut serial::uart1::writer(), name, &profile).ok();
            profile
        }
        Err(e) => {
            log::error!("pad {} calibration failed: {}", name, e);
            panic!();
        }
    }
}

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    let mut flash = dp.FLASH;
    let mut rcc = dp.RCC.configure().sysclk(48.mhz()).freeze(&mut flash);
    let gpioa = dp.GPIOA.split(&mut rcc);
    let gpiob = dp.GPIOB.split(&mut rcc);

    // A library requiring a critical section to set a gpio AF register is bad and I just won't.
    let fake_cs = unsafe { cortex_m::interrupt::CriticalSection::new() };

    // Touch pins
    let _rec = gpioa.pa0.into_alternate_af3(&fake_cs);
    let _rec_cap = gpioa.pa1.into_alternate_af3(&fake_cs);
    let _val = gpioa.pa4.into_alternate_af3(&fake_cs);
    let _val_cap = gpioa.pa6.into_alternate_af3(&fake_cs);

    let tx_pin = gpiob.pb6.into_alternate_af0(&fake_cs);
    let rx_pin = gpiob.pb7.into_alternate_af0(&fake_cs);
    let uart = hal::serial::Serial::usart1(dp.USART1, (tx_pin, rx_pin), 115200.bps(), &mut rcc);
    serial::uart1::init(uart, 4);
    serial::logger::init(log::LevelFilter::Info);

    let mut syst = hal::timers::Timer::syst(cp.SYST, 1.khz(), &mut rcc);
    syst.listen(&hal::timers::Event::TimeOut);

    let tsc = RefCell::new(TscWrapper::new(dp.TSC, &mut rcc));
    let mut rec_pad = TscPad::new(&tsc, RECORDING_PAD);
    let mut val_pad = TscPad::new(&tsc, VALIDATION_PAD);

    // Let the electrodes settle and prime the filters before taking a baseline
    let clock = SysTickClock;
    while clock.now_ms() < AUTH_CONFIG.settle_ms {
        rec_pad.read_filtered().ok();
        val_pad.read_filtered().ok();
    }

    let rec_profile = calibrate_or_halt(&mut rec_pad, "PA0");
    let val_profile = calibrate_or_halt(&mut val_pad, "PA4");

    let mut writer = serial::uart1::writer();
    report::write_banner(
        &mut writer,
        &AUTH_CONFIG,
        "PA0 (recording pad)",
        "PA4 (validation pad)",
    )
    .ok();
    report::write_notice(&mut writer, &touch::auth::Notice::Reset, &AUTH_CONFIG).ok();

    let mut machine = AuthStateMachine::new(rec_profile, val_profile, Some(&AUTH_CONFIG));
    let mut last_tick = clock.now_ms();

    loop {
        let time = clock.now_ms();
        if time.wrapping_sub(last_tick) < AUTH_CONFIG.tick_period_ms {
            cortex_m::asm::wfi();
            continue;
        }
        last_tick = last_tick.wrapping_add(AUTH_CONFIG.tick_period_ms);

        match machine.poll(&clock, &mut rec_pad, &mut val_pad) {
            Ok(notices) => {
                for notice in notices.iter() {
                    report::write_notice(&mut writer, notice, &AUTH_CONFIG).ok();
                }
            }
            Err(e) => log::warn!("pad read failed: {:?}", e),
        }
    }
}

#[exception]
fn SysTick() {
    let time = TIME.load(Ordering::Relaxed);
    TIME.store(time.wrapping_add(1), Ordering::Relaxed);
}
