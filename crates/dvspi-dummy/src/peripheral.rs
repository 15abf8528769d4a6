//! Emulated SPI register block
//!
//! Models just enough of the DM644x SPI block to exercise the driver:
//!
//! - A plain register file for every control register
//! - `SPIDAT1` writes shift a word out and queue the response word
//! - `SPIBUF` reads pop the oldest response (RXEMPTY clear) or report
//!   RXEMPTY when nothing is queued; TXFULL can be forced on
//!
//! Every access is recorded so tests can assert on exact register traffic.

#[cfg(feature = "alloc")]
use alloc::collections::VecDeque;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use dvspi_core::regs::{Register, RegisterBlock, SpiBufFlags};

/// What the emulated slave shifts back for each transmitted word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Response {
    /// Echo the low 16 bits of SPIDAT1
    #[default]
    Loopback,
    /// Always answer with this word
    Constant(u16),
    /// Never answer; SPIBUF stays empty after a write
    Silent,
}

/// Behaviour of the emulated peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DummyConfig {
    /// Slave response model
    pub response: Response,
    /// Report TXFULL on every SPIBUF read
    pub tx_full: bool,
}

/// One recorded register access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Register read and the value returned
    Read(Register, u32),
    /// Register write and the value written
    Write(Register, u32),
}

/// Emulated SPI block
#[cfg(feature = "alloc")]
#[derive(Debug)]
pub struct DummySpi {
    config: DummyConfig,
    regs: [u32; Register::COUNT],
    rx: VecDeque<u16>,
    log: Vec<Access>,
}

#[cfg(feature = "alloc")]
impl DummySpi {
    /// Create a peripheral with the given behaviour
    pub fn new(config: DummyConfig) -> Self {
        Self {
            config,
            regs: [0; Register::COUNT],
            rx: VecDeque::new(),
            log: Vec::new(),
        }
    }

    /// Create a loopback peripheral that is always ready
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Force TXFULL on or off
    pub fn set_tx_full(&mut self, tx_full: bool) {
        self.config.tx_full = tx_full;
    }

    /// Change the slave response model
    pub fn set_response(&mut self, response: Response) {
        self.config.response = response;
    }

    /// Queue a received word as if the slave had shifted it in
    pub fn inject_rx(&mut self, word: u16) {
        self.rx.push_back(word);
    }

    /// Number of received words not yet read
    pub fn pending_rx(&self) -> usize {
        self.rx.len()
    }

    /// Discard all received words without logging a read
    pub fn drain_rx(&mut self) {
        self.rx.clear();
    }

    /// Last value written to (or latched in) `reg`
    pub fn value(&self, reg: Register) -> u32 {
        self.regs[reg.index()]
    }

    /// Every recorded access, oldest first
    pub fn log(&self) -> &[Access] {
        &self.log
    }

    /// Forget recorded accesses
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Values written to `reg`, oldest first
    pub fn writes_to(&self, reg: Register) -> Vec<u32> {
        self.log
            .iter()
            .filter_map(|access| match *access {
                Access::Write(r, value) if r == reg => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Number of reads of `reg`
    pub fn reads_of(&self, reg: Register) -> usize {
        self.log
            .iter()
            .filter(|access| matches!(access, Access::Read(r, _) if *r == reg))
            .count()
    }

    /// Whether any register was written
    pub fn any_writes(&self) -> bool {
        self.log.iter().any(|access| matches!(access, Access::Write(..)))
    }

    fn read_spibuf(&mut self) -> u32 {
        let mut flags = SpiBufFlags::empty();
        if self.config.tx_full {
            flags |= SpiBufFlags::TXFULL;
        }
        match self.rx.pop_front() {
            Some(word) => flags.bits() | u32::from(word),
            None => (flags | SpiBufFlags::RXEMPTY).bits(),
        }
    }

    fn shift_out(&mut self, word: u32) {
        match self.config.response {
            Response::Loopback => self.rx.push_back(word as u16),
            Response::Constant(answer) => self.rx.push_back(answer),
            Response::Silent => {}
        }
    }
}

#[cfg(feature = "alloc")]
impl RegisterBlock for DummySpi {
    fn read(&mut self, reg: Register) -> u32 {
        let value = match reg {
            Register::Buf => self.read_spibuf(),
            _ => self.regs[reg.index()],
        };
        log::trace!("dummy: {} -> {:#010x}", reg.name(), value);
        self.log.push(Access::Read(reg, value));
        value
    }

    fn write(&mut self, reg: Register, value: u32) {
        log::trace!("dummy: {} <- {:#010x}", reg.name(), value);
        self.log.push(Access::Write(reg, value));
        self.regs[reg.index()] = value;
        if reg == Register::Dat1 {
            self.shift_out(value);
        }
    }
}

#[cfg(all(test, feature = "alloc"))]
mod tests {
    use super::*;
    use dvspi_core::regs::SpiBuf;

    #[test]
    fn test_spibuf_empty_by_default() {
        let mut spi = DummySpi::new_default();
        let buf = spi.read_buf();
        assert!(buf.rx_empty());
        assert!(!buf.tx_full());
    }

    #[test]
    fn test_loopback_response_consumed_on_read() {
        let mut spi = DummySpi::new_default();
        spi.write(Register::Dat1, 0x0002_0042);
        assert_eq!(spi.pending_rx(), 1);

        let buf = spi.read_buf();
        assert!(!buf.rx_empty());
        assert_eq!(buf.data(), 0x0042);
        assert!(spi.read_buf().rx_empty());
    }

    #[test]
    fn test_constant_and_silent_responses() {
        let mut spi = DummySpi::new(DummyConfig {
            response: Response::Constant(0xA55A),
            tx_full: false,
        });
        spi.write(Register::Dat1, 0x1234);
        assert_eq!(spi.read_buf(), SpiBuf::from_raw(0xA55A));

        spi.set_response(Response::Silent);
        spi.write(Register::Dat1, 0x1234);
        assert_eq!(spi.pending_rx(), 0);
    }

    #[test]
    fn test_drain_rx_discards_without_logging() {
        let mut spi = DummySpi::new_default();
        spi.inject_rx(0x1111);
        spi.inject_rx(0x2222);
        spi.drain_rx();
        assert_eq!(spi.pending_rx(), 0);
        assert!(spi.log().is_empty());
        assert!(spi.read_buf().rx_empty());
    }

    #[test]
    fn test_forced_tx_full() {
        let mut spi = DummySpi::new_default();
        spi.set_tx_full(true);
        assert!(spi.read_buf().tx_full());
    }

    #[test]
    fn test_access_log() {
        let mut spi = DummySpi::new_default();
        spi.write(Register::Fmt0, 7);
        assert_eq!(spi.read(Register::Fmt0), 7);
        assert_eq!(
            spi.log(),
            &[Access::Write(Register::Fmt0, 7), Access::Read(Register::Fmt0, 7)]
        );
        assert_eq!(spi.writes_to(Register::Fmt0), [7]);
        assert_eq!(spi.reads_of(Register::Fmt0), 1);

        spi.clear_log();
        assert!(!spi.any_writes());
        assert_eq!(spi.value(Register::Fmt0), 7);
    }
}
