//! Controller and session
//!
//! [`SpiController`] owns everything that outlives a session: the register
//! block, the clock and delay providers, the transfer configuration and the
//! receive FIFO. It is created once, with configuration at its defaults.
//!
//! [`SpiController::open`] powers the block up and returns a [`SpiSession`]
//! holding an exclusive borrow of the controller, so at most one session can
//! exist at a time. Dropping or closing the session powers the block down;
//! configuration is left as it was for the next session.

use crate::command::{self, Command};
use crate::config::{ConfigState, SpiConfig};
use crate::error::Result;
use crate::fifo::RxFifo;
use crate::hal::{ByteSink, ByteSource, ClockControl, Delay};
use crate::lifecycle;
use crate::regs::RegisterBlock;
use crate::transfer::TransferEngine;

/// Long-lived driver state for one SPI block
pub struct SpiController<R, C, D> {
    regs: R,
    clock: C,
    delay: D,
    clock_held: bool,
    state: ConfigState,
    config: SpiConfig,
    rx: RxFifo,
}

impl<R, C, D> SpiController<R, C, D>
where
    R: RegisterBlock,
    C: ClockControl,
    D: Delay,
{
    /// Create a controller with default configuration
    pub fn new(regs: R, clock: C, delay: D) -> Self {
        Self::with_config(regs, clock, delay, SpiConfig::default())
    }

    /// Create a controller with the given driver configuration
    pub fn with_config(regs: R, clock: C, delay: D, config: SpiConfig) -> Self {
        Self {
            regs,
            clock,
            delay,
            clock_held: false,
            state: ConfigState::new(),
            config,
            rx: RxFifo::new(),
        }
    }

    /// Power the block up and start a session
    pub fn open(&mut self) -> Result<SpiSession<'_, R, C, D>> {
        lifecycle::power_on(&mut self.regs, &mut self.clock, &self.config.pinmux)?;
        self.clock_held = true;
        log::debug!("dvspi: session opened ({:?})", self.state);
        Ok(SpiSession { ctrl: self })
    }

    /// Power the block down
    ///
    /// Safe to call at any time; the clock is only released if held.
    pub fn power_off(&mut self) {
        lifecycle::power_off(&mut self.regs, &mut self.clock, self.clock_held);
        self.clock_held = false;
        self.rx.reset();
    }

    /// Whether a session currently holds the clock
    pub fn is_powered(&self) -> bool {
        self.clock_held
    }

    /// Current transfer configuration
    pub fn state(&self) -> &ConfigState {
        &self.state
    }

    /// Driver configuration
    pub fn config(&self) -> &SpiConfig {
        &self.config
    }

    /// Receive FIFO, for producers running outside the session
    pub fn rx_fifo(&self) -> &RxFifo {
        &self.rx
    }

    /// Register block
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Mutable register block
    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }

    /// Clock provider
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Delay provider
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Tear the controller apart, powering the block down first
    pub fn into_parts(mut self) -> (R, C, D) {
        self.power_off();
        (self.regs, self.clock, self.delay)
    }
}

/// An open session on the SPI block
///
/// Read, write and control calls are serialized by `&mut self`.
pub struct SpiSession<'a, R, C, D>
where
    R: RegisterBlock,
    C: ClockControl,
    D: Delay,
{
    ctrl: &'a mut SpiController<R, C, D>,
}

impl<R, C, D> SpiSession<'_, R, C, D>
where
    R: RegisterBlock,
    C: ClockControl,
    D: Delay,
{
    fn engine(&mut self) -> TransferEngine<'_, R> {
        let ctrl = &mut *self.ctrl;
        TransferEngine::new(&mut ctrl.regs, &ctrl.state, &ctrl.config, &ctrl.rx)
    }

    /// Read received data into `sink`
    ///
    /// Produces one word (1 or 2 bytes) in direct mode, or up to `max_bytes`
    /// buffered bytes in buffered mode.
    pub fn read<S: ByteSink>(&mut self, sink: &mut S, max_bytes: usize) -> Result<usize> {
        self.engine().read(sink, max_bytes)
    }

    /// Read received data into the front of `buf`
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<usize> {
        let max_bytes = buf.len();
        let mut sink = buf;
        self.read(&mut sink, max_bytes)
    }

    /// Transmit `data`
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        let mut src = data;
        self.write_from(&mut src, data.len())
    }

    /// Transmit `len` bytes fetched from `src`
    pub fn write_from<S: ByteSource>(&mut self, src: &mut S, len: usize) -> Result<usize> {
        self.engine().write(src, len)
    }

    /// Validate and apply a raw control command
    ///
    /// Returns `0` on success. Invalid tags or arguments are rejected before
    /// any state or register is modified.
    pub fn control(&mut self, tag: u32, arg: u32) -> Result<i32> {
        let cmd = Command::from_raw(tag, arg)?;
        self.execute(cmd);
        Ok(0)
    }

    /// Apply a validated command
    pub fn execute(&mut self, cmd: Command) {
        let ctrl = &mut *self.ctrl;
        command::apply(cmd, &mut ctrl.state, &mut ctrl.regs, &mut ctrl.delay, &ctrl.rx);
    }

    /// Current transfer configuration
    pub fn state(&self) -> &ConfigState {
        &self.ctrl.state
    }

    /// Receive FIFO
    pub fn rx_fifo(&self) -> &RxFifo {
        &self.ctrl.rx
    }

    /// Register block
    pub fn registers(&self) -> &R {
        &self.ctrl.regs
    }

    /// Mutable register block
    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.ctrl.regs
    }

    /// End the session and power the block down
    pub fn close(self) {
        drop(self);
    }
}

impl<R, C, D> Drop for SpiSession<'_, R, C, D>
where
    R: RegisterBlock,
    C: ClockControl,
    D: Delay,
{
    fn drop(&mut self) {
        self.ctrl.power_off();
        log::debug!("dvspi: session closed");
    }
}
