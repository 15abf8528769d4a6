//! Transfer configuration
//!
//! Two kinds of configuration live here:
//!
//! - [`ConfigState`]: word width, active chip and chip-select hold. Mutated by
//!   control commands and read by every transfer.
//! - [`SpiConfig`]: how the driver itself behaves (polling bound, fetch
//!   failure handling, buffered reads, pin-mux values). Fixed when the
//!   controller is built.

use crate::error::{Error, Result};
use crate::regs::DAT1_CSHOLD;

/// SPIFMTn value for 8-bit words (phase 1, prescale 15, char length 8)
pub const SPIFMT_8BIT: u32 = 0x0001_0F08;
/// SPIFMTn value for 16-bit words (phase 1, prescale 15, char length 16)
pub const SPIFMT_16BIT: u32 = 0x0001_0F10;

/// Chip-select number field ORed into every word sent to chip 0
pub const CHIP0_MASK: u32 = 0x0002_0000;
/// Chip-select number field ORed into every word sent to chip 1
pub const CHIP1_MASK: u32 = 0x0001_0000;

/// Word width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataFormat {
    /// 8-bit words
    EightBit,
    /// 16-bit words
    #[default]
    SixteenBit,
}

impl DataFormat {
    /// Bytes produced or consumed per word
    pub const fn word_len(self) -> usize {
        match self {
            DataFormat::EightBit => 1,
            DataFormat::SixteenBit => 2,
        }
    }

    /// Value written to both SPIFMT registers
    pub const fn fmt_register(self) -> u32 {
        match self {
            DataFormat::EightBit => SPIFMT_8BIT,
            DataFormat::SixteenBit => SPIFMT_16BIT,
        }
    }

    /// Mask applied to source data before the chip mask is ORed in
    pub const fn data_mask(self) -> u32 {
        match self {
            DataFormat::EightBit => 0x0000_00FF,
            DataFormat::SixteenBit => 0x0000_FFFF,
        }
    }
}

impl TryFrom<u32> for DataFormat {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(DataFormat::EightBit),
            1 => Ok(DataFormat::SixteenBit),
            _ => Err(Error::InvalidArgument),
        }
    }
}

/// Chip-select line / profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChipSelect {
    /// Chip select 0
    #[default]
    Chip0,
    /// Chip select 1
    Chip1,
}

impl ChipSelect {
    /// Chip-select number bits ORed into outgoing words
    pub const fn mask_bits(self) -> u32 {
        match self {
            ChipSelect::Chip0 => CHIP0_MASK,
            ChipSelect::Chip1 => CHIP1_MASK,
        }
    }

    /// SPIPC0 pattern enabling the data pins and this chip-select pin
    pub const fn pin_profile(self) -> u32 {
        match self {
            ChipSelect::Chip0 => 0x0000_0E01,
            ChipSelect::Chip1 => 0x0000_0E02,
        }
    }

    /// First SPIDAT1 write of the select sequence
    pub const fn framing_value(self) -> u32 {
        match self {
            ChipSelect::Chip0 => 0x0000_0000,
            ChipSelect::Chip1 => 0x0100_0000,
        }
    }

    /// Second SPIDAT1 write of the select sequence
    pub const fn select_value(self) -> u32 {
        self.mask_bits()
    }

    /// SPIDEF value for this chip
    pub const fn default_register(self) -> u32 {
        match self {
            ChipSelect::Chip0 => 0x0000_0001,
            ChipSelect::Chip1 => 0x0000_0002,
        }
    }
}

impl TryFrom<u32> for ChipSelect {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(ChipSelect::Chip0),
            1 => Ok(ChipSelect::Chip1),
            _ => Err(Error::InvalidArgument),
        }
    }
}

/// Chip-select hold between consecutive words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChipSelectHold {
    /// Release chip select after each word
    #[default]
    Off,
    /// Keep chip select asserted across words
    ActiveHold,
}

impl ChipSelectHold {
    /// Hold bit contribution to SPIDAT1 writes
    pub const fn bits(self) -> u32 {
        match self {
            ChipSelectHold::Off => 0,
            ChipSelectHold::ActiveHold => DAT1_CSHOLD,
        }
    }
}

impl TryFrom<u32> for ChipSelectHold {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            0 => Ok(ChipSelectHold::Off),
            1 => Ok(ChipSelectHold::ActiveHold),
            _ => Err(Error::InvalidArgument),
        }
    }
}

/// Bits ORed into every transmitted word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChipMask(u32);

impl ChipMask {
    /// Combine a chip's select bits with a hold mode
    pub const fn new(chip: ChipSelect, hold: ChipSelectHold) -> Self {
        Self(chip.mask_bits() | hold.bits())
    }

    /// Raw mask value
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether the chip-select hold bit is part of the mask
    pub const fn holds(self) -> bool {
        self.0 & DAT1_CSHOLD != 0
    }
}

/// Transfer parameters shared by commands and transfers
///
/// The chip mask is derived from the selected chip and the hold mode that
/// was in force when that chip was selected. Changing the hold mode alone
/// does not alter the mask until the next `SelectChip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConfigState {
    format: DataFormat,
    chip: ChipSelect,
    hold: ChipSelectHold,
    latched_hold: ChipSelectHold,
}

impl ConfigState {
    /// Default state: 16-bit, chip 0, no hold
    pub const fn new() -> Self {
        Self {
            format: DataFormat::SixteenBit,
            chip: ChipSelect::Chip0,
            hold: ChipSelectHold::Off,
            latched_hold: ChipSelectHold::Off,
        }
    }

    /// Current word width
    pub const fn format(&self) -> DataFormat {
        self.format
    }

    /// Currently selected chip
    pub const fn chip(&self) -> ChipSelect {
        self.chip
    }

    /// Hold mode that the next `SelectChip` will apply
    pub const fn hold(&self) -> ChipSelectHold {
        self.hold
    }

    /// Mask ORed into outgoing words
    pub const fn chip_mask(&self) -> ChipMask {
        ChipMask::new(self.chip, self.latched_hold)
    }

    pub(crate) fn set_format(&mut self, format: DataFormat) {
        self.format = format;
    }

    pub(crate) fn set_hold(&mut self, hold: ChipSelectHold) {
        self.hold = hold;
    }

    /// Select `chip` and latch the pending hold mode into the mask
    pub(crate) fn select(&mut self, chip: ChipSelect) {
        self.chip = chip;
        self.latched_hold = self.hold;
    }
}

/// Readiness polling strategy for the write path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPolicy {
    /// Spin until the peripheral is ready, however long that takes
    #[default]
    Unbounded,
    /// Give up with [`Error::Timeout`] after this many status reads
    Bounded {
        /// Maximum number of SPIBUF reads per wait (at least one is always taken)
        max_polls: u32,
    },
}

/// What the write path does when a source byte cannot be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchFailurePolicy {
    /// Drop the word, keep going and still report the full length
    #[default]
    SkipWord,
    /// Fail the write with [`Error::CopyFailure`]
    Abort,
}

/// Where `read` takes its data from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// Single-shot read of the receive register
    #[default]
    Direct,
    /// Drain words captured into the receive FIFO by the write path
    Buffered,
}

/// Values written to the pin-mux registers at power-on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinmuxConfig {
    /// PINMUX0 value
    pub pinmux0: u32,
    /// PINMUX1 value
    pub pinmux1: u32,
}

impl Default for PinmuxConfig {
    fn default() -> Self {
        Self {
            pinmux0: 0x0000_0000,
            pinmux1: crate::regs::PINMUX1_SPI,
        }
    }
}

/// Driver behaviour settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpiConfig {
    /// Readiness polling strategy
    pub poll: PollPolicy,
    /// Source fetch failure handling
    pub fetch_failure: FetchFailurePolicy,
    /// Read data path
    pub read_mode: ReadMode,
    /// Pin-mux values programmed at power-on
    pub pinmux: PinmuxConfig,
}

impl SpiConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the readiness polling strategy
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Set the fetch failure policy
    pub fn with_fetch_failure_policy(mut self, policy: FetchFailurePolicy) -> Self {
        self.fetch_failure = policy;
        self
    }

    /// Set the read data path
    pub fn with_read_mode(mut self, mode: ReadMode) -> Self {
        self.read_mode = mode;
        self
    }

    /// Set the pin-mux values
    pub fn with_pinmux(mut self, pinmux: PinmuxConfig) -> Self {
        self.pinmux = pinmux;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = ConfigState::new();
        assert_eq!(state, ConfigState::default());
        assert_eq!(state.format(), DataFormat::SixteenBit);
        assert_eq!(state.chip(), ChipSelect::Chip0);
        assert_eq!(state.hold(), ChipSelectHold::Off);
        assert_eq!(state.chip_mask().bits(), CHIP0_MASK);
    }

    #[test]
    fn test_chip_round_trip_restores_mask() {
        let mut state = ConfigState::new();
        state.select(ChipSelect::Chip0);
        let original = state.chip_mask();

        state.select(ChipSelect::Chip1);
        assert_eq!(state.chip_mask().bits(), CHIP1_MASK);

        state.select(ChipSelect::Chip0);
        assert_eq!(state.chip_mask(), original);
    }

    #[test]
    fn test_hold_applies_only_on_select() {
        let mut state = ConfigState::new();
        state.set_hold(ChipSelectHold::ActiveHold);
        assert!(!state.chip_mask().holds());

        state.select(ChipSelect::Chip1);
        assert!(state.chip_mask().holds());
        assert_eq!(state.chip_mask().bits(), CHIP1_MASK | DAT1_CSHOLD);

        state.set_hold(ChipSelectHold::Off);
        assert!(state.chip_mask().holds());
        state.select(ChipSelect::Chip1);
        assert!(!state.chip_mask().holds());
    }

    #[test]
    fn test_argument_domains() {
        assert_eq!(DataFormat::try_from(0), Ok(DataFormat::EightBit));
        assert_eq!(DataFormat::try_from(2), Err(Error::InvalidArgument));
        assert_eq!(ChipSelect::try_from(1), Ok(ChipSelect::Chip1));
        assert_eq!(ChipSelect::try_from(2), Err(Error::InvalidArgument));
        assert_eq!(ChipSelectHold::try_from(1), Ok(ChipSelectHold::ActiveHold));
        assert_eq!(ChipSelectHold::try_from(7), Err(Error::InvalidArgument));
    }

    #[test]
    fn test_format_encoding() {
        assert_eq!(DataFormat::EightBit.word_len(), 1);
        assert_eq!(DataFormat::SixteenBit.word_len(), 2);
        assert_eq!(DataFormat::EightBit.fmt_register() & 0x1F, 8);
        assert_eq!(DataFormat::SixteenBit.fmt_register() & 0x1F, 16);
    }
}
