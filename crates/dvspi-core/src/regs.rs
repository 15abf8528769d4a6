//! DM644x SPI register definitions and typed access
//!
//! Register offsets and bit definitions for the DaVinci SPI block, plus the
//! two system-module pin-mux registers the driver touches when powering the
//! block up and down.
//!
//! # Register Layout
//!
//! - SPI block: global control, pin control, transmit (`SPIDAT1`), receive
//!   plus status (`SPIBUF`), chip-select default and the two data formats
//! - System module: `PINMUX0` / `PINMUX1`
//!
//! `SPIBUF` carries both the received word (low 16 bits) and the status flags
//! (high byte). [`SpiBuf`] wraps a single snapshot of it so the flags and the
//! byte view always come from the same hardware read.

use bitflags::bitflags;

/// Register bank a register lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bank {
    /// SPI peripheral block
    Spi,
    /// System module (pin multiplexing)
    System,
}

/// Registers the driver accesses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// SPI Global Control 0 (reset)
    Gcr0,
    /// SPI Global Control 1 (mode, enable)
    Gcr1,
    /// SPI Pin Control 0 (pin function)
    Pc0,
    /// SPI Data 1 (transmit data plus per-word chip-select control)
    Dat1,
    /// SPI Buffer (received data plus status flags)
    Buf,
    /// SPI Default chip-select
    Def,
    /// SPI Data Format 0
    Fmt0,
    /// SPI Data Format 1
    Fmt1,
    /// Pin multiplexing control 0
    PinMux0,
    /// Pin multiplexing control 1
    PinMux1,
}

impl Register {
    /// Number of registers
    pub const COUNT: usize = 10;

    /// Every register, in offset order within each bank
    pub const ALL: [Register; Register::COUNT] = [
        Register::Gcr0,
        Register::Gcr1,
        Register::Pc0,
        Register::Dat1,
        Register::Buf,
        Register::Def,
        Register::Fmt0,
        Register::Fmt1,
        Register::PinMux0,
        Register::PinMux1,
    ];

    /// Bank this register belongs to
    pub const fn bank(self) -> Bank {
        match self {
            Register::PinMux0 | Register::PinMux1 => Bank::System,
            _ => Bank::Spi,
        }
    }

    /// Byte offset from the start of the register's bank
    pub const fn offset(self) -> usize {
        match self {
            Register::Gcr0 => SPIGCR0,
            Register::Gcr1 => SPIGCR1,
            Register::Pc0 => SPIPC0,
            Register::Dat1 => SPIDAT1,
            Register::Buf => SPIBUF,
            Register::Def => SPIDEF,
            Register::Fmt0 => SPIFMT0,
            Register::Fmt1 => SPIFMT1,
            Register::PinMux0 => PINMUX0,
            Register::PinMux1 => PINMUX1,
        }
    }

    /// Dense index, usable for register-file arrays
    pub const fn index(self) -> usize {
        match self {
            Register::Gcr0 => 0,
            Register::Gcr1 => 1,
            Register::Pc0 => 2,
            Register::Dat1 => 3,
            Register::Buf => 4,
            Register::Def => 5,
            Register::Fmt0 => 6,
            Register::Fmt1 => 7,
            Register::PinMux0 => 8,
            Register::PinMux1 => 9,
        }
    }

    /// Datasheet name
    pub const fn name(self) -> &'static str {
        match self {
            Register::Gcr0 => "SPIGCR0",
            Register::Gcr1 => "SPIGCR1",
            Register::Pc0 => "SPIPC0",
            Register::Dat1 => "SPIDAT1",
            Register::Buf => "SPIBUF",
            Register::Def => "SPIDEF",
            Register::Fmt0 => "SPIFMT0",
            Register::Fmt1 => "SPIFMT1",
            Register::PinMux0 => "PINMUX0",
            Register::PinMux1 => "PINMUX1",
        }
    }
}

// ============================================================================
// Offsets
// ============================================================================

/// SPI Global Control 0
pub const SPIGCR0: usize = 0x00;
/// SPI Global Control 1
pub const SPIGCR1: usize = 0x04;
/// SPI Pin Control 0
pub const SPIPC0: usize = 0x14;
/// SPI Data 1
pub const SPIDAT1: usize = 0x3C;
/// SPI Buffer
pub const SPIBUF: usize = 0x40;
/// SPI Default chip-select
pub const SPIDEF: usize = 0x4C;
/// SPI Data Format 0
pub const SPIFMT0: usize = 0x50;
/// SPI Data Format 1
pub const SPIFMT1: usize = 0x54;

/// System module PINMUX0
pub const PINMUX0: usize = 0x00;
/// System module PINMUX1
pub const PINMUX1: usize = 0x04;

/// Size of the SPI register window
pub const SPI_WINDOW_SIZE: usize = 0x80;
/// Size of the system module window the driver maps
pub const SYSTEM_WINDOW_SIZE: usize = 0x08;

// ============================================================================
// Bit definitions
// ============================================================================

/// SPIGCR0 value taking the block out of reset
pub const GCR0_RESET_RELEASE: u32 = 0x0000_0001;

/// PINMUX1 bit routing the SPI signals to the pads
pub const PINMUX1_SPI: u32 = 0x0000_0100;

bitflags! {
    /// SPIGCR1 control bits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Gcr1: u32 {
        /// Master mode
        const MASTER    = 1 << 0;
        /// Internal clock (SPICLK driven by the block)
        const CLKMOD    = 1 << 1;
        /// Power down
        const POWERDOWN = 1 << 8;
        /// Internal loopback
        const LOOPBACK  = 1 << 16;
        /// Enable transfers
        const SPIEN     = 1 << 24;
    }
}

bitflags! {
    /// SPIBUF status flags (upper byte of the register)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SpiBufFlags: u32 {
        /// Data length error
        const DLENERR   = 1 << 24;
        /// Slave timeout
        const TIMEOUT   = 1 << 25;
        /// Parity error
        const PARITYERR = 1 << 26;
        /// Desynchronization of slave
        const DESYNC    = 1 << 27;
        /// Bit error
        const BITERR    = 1 << 28;
        /// Transmit register full
        const TXFULL    = 1 << 29;
        /// Receive overrun
        const RXOVR     = 1 << 30;
        /// Receive register empty
        const RXEMPTY   = 1 << 31;
    }
}

/// SPIDAT1 chip-select hold bit
pub const DAT1_CSHOLD: u32 = 1 << 28;

/// Bit set on the second write of a 16-bit word to close the frame
pub const FRAME_FINALIZE: u32 = 0x8000;

/// Mask of the received data field in SPIBUF
pub const BUF_RXDATA_MASK: u32 = 0x0000_FFFF;

// ============================================================================
// Typed views
// ============================================================================

/// One snapshot of the SPIBUF register
///
/// Exposes the full 32-bit value, the decoded status flags and the
/// little-endian byte view the transfer engine hands to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiBuf(u32);

impl SpiBuf {
    /// Wrap a raw register value
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Full register value
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Decoded status flags
    pub const fn flags(self) -> SpiBufFlags {
        SpiBufFlags::from_bits_truncate(self.0)
    }

    /// Receive register holds no unread word
    pub const fn rx_empty(self) -> bool {
        self.0 & SpiBufFlags::RXEMPTY.bits() != 0
    }

    /// Transmit register cannot accept another word
    pub const fn tx_full(self) -> bool {
        self.0 & SpiBufFlags::TXFULL.bits() != 0
    }

    /// Received data field
    pub const fn data(self) -> u16 {
        (self.0 & BUF_RXDATA_MASK) as u16
    }

    /// Byte view of the register in little-endian order
    pub const fn bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }
}

/// Register access
///
/// Implementations perform a single volatile access per call. Reads take
/// `&mut self` because reading `SPIBUF` consumes the received word on real
/// hardware and in the emulator.
pub trait RegisterBlock {
    /// Read a 32-bit register
    fn read(&mut self, reg: Register) -> u32;

    /// Write a 32-bit register
    fn write(&mut self, reg: Register, value: u32);

    /// Read-modify-write helper
    fn modify<F>(&mut self, reg: Register, f: F)
    where
        F: FnOnce(u32) -> u32,
        Self: Sized,
    {
        let value = self.read(reg);
        self.write(reg, f(value));
    }

    /// Take a snapshot of SPIBUF
    fn read_buf(&mut self) -> SpiBuf
    where
        Self: Sized,
    {
        SpiBuf::from_raw(self.read(Register::Buf))
    }
}

impl<T: RegisterBlock + ?Sized> RegisterBlock for &mut T {
    fn read(&mut self, reg: Register) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: Register, value: u32) {
        (**self).write(reg, value)
    }
}

// Blanket impl for boxed register blocks so backends can be chosen at runtime
#[cfg(feature = "alloc")]
impl RegisterBlock for alloc::boxed::Box<dyn RegisterBlock + Send> {
    fn read(&mut self, reg: Register) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: Register, value: u32) {
        (**self).write(reg, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spibuf_flags() {
        let empty = SpiBuf::from_raw(0x8000_0000);
        assert!(empty.rx_empty());
        assert!(!empty.tx_full());

        let full = SpiBuf::from_raw(0x2000_1234);
        assert!(!full.rx_empty());
        assert!(full.tx_full());
        assert_eq!(full.flags(), SpiBufFlags::TXFULL);
    }

    #[test]
    fn test_spibuf_byte_view_is_little_endian() {
        let buf = SpiBuf::from_raw(0x0000_BEEF);
        assert_eq!(buf.data(), 0xBEEF);
        assert_eq!(buf.bytes(), [0xEF, 0xBE, 0x00, 0x00]);
    }

    #[test]
    fn test_register_indices_are_dense() {
        for (i, reg) in Register::ALL.iter().enumerate() {
            assert_eq!(reg.index(), i);
        }
    }

    #[test]
    fn test_register_banks() {
        assert_eq!(Register::PinMux1.bank(), Bank::System);
        assert_eq!(Register::PinMux1.offset(), 0x04);
        assert_eq!(Register::Buf.bank(), Bank::Spi);
        assert_eq!(Register::Buf.offset(), 0x40);
    }

    #[test]
    fn test_gcr1_select_value() {
        let gcr1 = Gcr1::SPIEN | Gcr1::CLKMOD | Gcr1::MASTER;
        assert_eq!(gcr1.bits(), 0x0100_0003);
    }
}
