//! dvspi-core - Polling SPI master driver core
//!
//! This crate drives the SPI block found on TI DaVinci DM644x parts as a
//! single-caller byte stream. It is `no_std` compatible; hardware access,
//! clock gating and delays are supplied by the embedding through the traits
//! in [`hal`] and [`regs`].
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable boxed trait objects for registers, clocks and delays
//!
//! # Example
//!
//! ```ignore
//! use dvspi_core::{Command, DataFormat, ChipSelect, SpiController};
//!
//! let mut controller = SpiController::new(regs, clock, delay);
//! let mut session = controller.open()?;
//! session.execute(Command::SetDataFormat(DataFormat::EightBit));
//! session.execute(Command::SelectChip(ChipSelect::Chip0));
//! let written = session.write(&[0x42])?;
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod command;
pub mod config;
pub mod error;
pub mod fifo;
pub mod hal;
pub mod lifecycle;
pub mod regs;
pub mod session;
pub mod transfer;

pub use command::Command;
pub use config::{
    ChipMask, ChipSelect, ChipSelectHold, ConfigState, DataFormat, FetchFailurePolicy, PinmuxConfig,
    PollPolicy, ReadMode, SpiConfig,
};
pub use error::{Error, Result};
pub use fifo::RxFifo;
pub use session::{SpiController, SpiSession};

/// Capacity of the receive buffer and upper bound on a single write
pub const MAX_BUF_SIZE: usize = 1024;
