//! Peripheral power sequencing
//!
//! - [`power_on`]: enable the clock and route the SPI signals to the pads
//! - [`power_off`]: hold the block in reset, unroute the pins, gate the clock
//! - [`reset_master`]: cycle the block through reset into master mode

use crate::config::PinmuxConfig;
use crate::error::{Error, Result};
use crate::hal::{ClockControl, Delay};
use crate::regs::{Gcr1, Register, RegisterBlock, GCR0_RESET_RELEASE, PINMUX1_SPI};

/// Settle time between asserting and releasing the block reset
pub const RESET_SETTLE_MS: u32 = 1;

/// Enable the peripheral clock and program the pin multiplexers
///
/// No register is touched if the clock cannot be acquired.
pub fn power_on<R, C>(regs: &mut R, clock: &mut C, pinmux: &PinmuxConfig) -> Result<()>
where
    R: RegisterBlock,
    C: ClockControl,
{
    clock.enable().map_err(|_| {
        log::error!("dvspi: could not acquire the SPI clock");
        Error::DeviceUnavailable
    })?;

    log::debug!(
        "dvspi: clock enabled, pinmux0={:#010x} pinmux1={:#010x}",
        pinmux.pinmux0,
        pinmux.pinmux1
    );
    regs.write(Register::PinMux0, pinmux.pinmux0);
    regs.write(Register::PinMux1, pinmux.pinmux1);
    Ok(())
}

/// Put the block in reset, release its pins and gate the clock
///
/// `clock_held` tells whether a prior [`power_on`] succeeded; the clock is
/// only disabled in that case.
pub fn power_off<R, C>(regs: &mut R, clock: &mut C, clock_held: bool)
where
    R: RegisterBlock,
    C: ClockControl,
{
    regs.write(Register::Gcr0, 0);
    regs.modify(Register::PinMux1, |v| v & !PINMUX1_SPI);
    if clock_held {
        clock.disable();
        log::debug!("dvspi: clock disabled");
    }
}

/// Cycle the block through reset and leave it in master mode
pub fn reset_master<R, D>(regs: &mut R, delay: &mut D)
where
    R: RegisterBlock,
    D: Delay,
{
    regs.write(Register::Gcr0, 0);
    delay.delay_ms(RESET_SETTLE_MS);
    regs.write(Register::Gcr0, GCR0_RESET_RELEASE);
    regs.write(Register::Gcr1, (Gcr1::CLKMOD | Gcr1::MASTER).bits());
    log::debug!("dvspi: master reset complete");
}
