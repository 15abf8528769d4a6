//! Control commands
//!
//! Out-of-band reconfiguration of the controller. A raw `(tag, argument)`
//! pair from the file-operations layer is validated into a [`Command`]
//! before anything is touched; applying a command is a fixed register write
//! sequence with no protocol spanning multiple commands.
//!
//! | Tag | Command                 | Argument                  |
//! |-----|-------------------------|---------------------------|
//! | 0   | `Reset`                 | ignored                   |
//! | 1   | `EnableChipSelectLine`  | chip (0, 1)               |
//! | 2   | `SetDataFormat`         | 0 = 8-bit, 1 = 16-bit     |
//! | 3   | `SetChipSelectHold`     | 0 = off, 1 = active hold  |
//! | 4   | `SelectChip`            | chip (0, 1)               |

use crate::config::{ChipSelect, ChipSelectHold, ConfigState, DataFormat};
use crate::error::{Error, Result};
use crate::fifo::RxFifo;
use crate::hal::Delay;
use crate::lifecycle::reset_master;
use crate::regs::{Gcr1, Register, RegisterBlock};

/// Raw command tags
pub mod tag {
    /// Reset the block into master mode and clear the receive buffer
    pub const RESET: u32 = 0;
    /// Program the pin-control profile for a chip-select line
    pub const ENABLE_CHIP_SELECT_LINE: u32 = 1;
    /// Set the word width
    pub const SET_DATA_FORMAT: u32 = 2;
    /// Set the chip-select hold mode
    pub const SET_CHIP_SELECT_HOLD: u32 = 3;
    /// Select the active chip
    pub const SELECT_CHIP: u32 = 4;
}

/// A validated control command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Reset the block into master mode and clear the receive buffer
    Reset,
    /// Program SPIPC0 for the given chip-select line
    EnableChipSelectLine(ChipSelect),
    /// Set the word width for subsequent transfers
    SetDataFormat(DataFormat),
    /// Set the hold mode picked up by the next `SelectChip`
    SetChipSelectHold(ChipSelectHold),
    /// Make the given chip the target of subsequent transfers
    SelectChip(ChipSelect),
}

impl Command {
    /// Validate a raw `(tag, argument)` pair
    pub fn from_raw(tag: u32, arg: u32) -> Result<Self> {
        match tag {
            tag::RESET => Ok(Command::Reset),
            tag::ENABLE_CHIP_SELECT_LINE => Ok(Command::EnableChipSelectLine(arg.try_into()?)),
            tag::SET_DATA_FORMAT => Ok(Command::SetDataFormat(arg.try_into()?)),
            tag::SET_CHIP_SELECT_HOLD => Ok(Command::SetChipSelectHold(arg.try_into()?)),
            tag::SELECT_CHIP => Ok(Command::SelectChip(arg.try_into()?)),
            _ => Err(Error::InvalidArgument),
        }
    }

    /// Raw tag of this command
    pub const fn tag(&self) -> u32 {
        match self {
            Command::Reset => tag::RESET,
            Command::EnableChipSelectLine(_) => tag::ENABLE_CHIP_SELECT_LINE,
            Command::SetDataFormat(_) => tag::SET_DATA_FORMAT,
            Command::SetChipSelectHold(_) => tag::SET_CHIP_SELECT_HOLD,
            Command::SelectChip(_) => tag::SELECT_CHIP,
        }
    }
}

/// Apply `cmd` to the configuration state and the register block
pub fn apply<R, D>(
    cmd: Command,
    state: &mut ConfigState,
    regs: &mut R,
    delay: &mut D,
    rx: &RxFifo,
) where
    R: RegisterBlock,
    D: Delay,
{
    log::debug!("dvspi: applying {:?}", cmd);
    match cmd {
        Command::Reset => {
            reset_master(regs, delay);
            rx.reset();
        }
        Command::EnableChipSelectLine(chip) => {
            regs.write(Register::Pc0, chip.pin_profile());
        }
        Command::SetDataFormat(format) => {
            state.set_format(format);
            regs.write(Register::Fmt0, format.fmt_register());
            regs.write(Register::Fmt1, format.fmt_register());
        }
        Command::SetChipSelectHold(hold) => {
            state.set_hold(hold);
        }
        Command::SelectChip(chip) => {
            let hold = state.hold().bits();
            regs.write(Register::Dat1, chip.framing_value() | hold);
            regs.write(Register::Dat1, chip.select_value() | hold);
            regs.write(Register::Def, chip.default_register());
            state.select(chip);
            regs.write(Register::Gcr1, (Gcr1::SPIEN | Gcr1::CLKMOD | Gcr1::MASTER).bits());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_valid() {
        assert_eq!(Command::from_raw(0, 0), Ok(Command::Reset));
        assert_eq!(Command::from_raw(0, 99), Ok(Command::Reset));
        assert_eq!(
            Command::from_raw(1, 1),
            Ok(Command::EnableChipSelectLine(ChipSelect::Chip1))
        );
        assert_eq!(
            Command::from_raw(2, 0),
            Ok(Command::SetDataFormat(DataFormat::EightBit))
        );
        assert_eq!(
            Command::from_raw(3, 1),
            Ok(Command::SetChipSelectHold(ChipSelectHold::ActiveHold))
        );
        assert_eq!(Command::from_raw(4, 0), Ok(Command::SelectChip(ChipSelect::Chip0)));
    }

    #[test]
    fn test_from_raw_rejects_unknown_tag() {
        assert_eq!(Command::from_raw(5, 0), Err(Error::InvalidArgument));
        assert_eq!(Command::from_raw(u32::MAX, 0), Err(Error::InvalidArgument));
    }

    #[test]
    fn test_from_raw_rejects_out_of_range_argument() {
        assert_eq!(Command::from_raw(tag::SELECT_CHIP, 2), Err(Error::InvalidArgument));
        assert_eq!(
            Command::from_raw(tag::ENABLE_CHIP_SELECT_LINE, 5),
            Err(Error::InvalidArgument)
        );
        assert_eq!(Command::from_raw(tag::SET_DATA_FORMAT, 16), Err(Error::InvalidArgument));
    }

    #[test]
    fn test_tag_round_trip() {
        for raw in 0..=4 {
            let cmd = Command::from_raw(raw, 0).unwrap();
            assert_eq!(cmd.tag(), raw);
        }
    }
}
