//! Polling transfer engine
//!
//! Word-oriented read and write against SPIDAT1 / SPIBUF. Every status check
//! is a single SPIBUF snapshot (see [`SpiBuf`]); readiness waits spin on that
//! snapshot according to the configured [`PollPolicy`].
//!
//! # Write sequencing
//!
//! 1. Wait for RXEMPTY so no stale word is pending
//! 2. Per word: skip if TXFULL, otherwise fetch, mask, OR in the chip mask,
//!    write SPIDAT1 and wait until the exchanged word shows up in SPIBUF
//! 3. 16-bit words are written twice; the second write sets
//!    [`FRAME_FINALIZE`] to close the frame

use crate::config::{
    ConfigState, DataFormat, FetchFailurePolicy, PollPolicy, ReadMode, SpiConfig,
};
use crate::error::{Error, Result};
use crate::fifo::{PutOutcome, RxFifo};
use crate::hal::{ByteSink, ByteSource};
use crate::regs::{Register, RegisterBlock, SpiBuf, FRAME_FINALIZE};
use crate::MAX_BUF_SIZE;

/// Transfer engine bound to one register block and configuration snapshot
pub struct TransferEngine<'a, R: RegisterBlock> {
    regs: &'a mut R,
    state: &'a ConfigState,
    config: &'a SpiConfig,
    rx: &'a RxFifo,
}

impl<'a, R: RegisterBlock> TransferEngine<'a, R> {
    /// Bind the engine to its collaborators
    pub fn new(
        regs: &'a mut R,
        state: &'a ConfigState,
        config: &'a SpiConfig,
        rx: &'a RxFifo,
    ) -> Self {
        Self {
            regs,
            state,
            config,
            rx,
        }
    }

    /// Read one word (direct mode) or drain the FIFO (buffered mode)
    ///
    /// `max_bytes` must be non-zero. In direct mode it is only a lower bound
    /// check: the number of bytes produced is fixed by the word width.
    pub fn read<S: ByteSink>(&mut self, sink: &mut S, max_bytes: usize) -> Result<usize> {
        if max_bytes == 0 {
            return Err(Error::InvalidArgument);
        }

        match self.config.read_mode {
            ReadMode::Direct => self.read_direct(sink),
            ReadMode::Buffered => self.read_buffered(sink, max_bytes),
        }
    }

    fn read_direct<S: ByteSink>(&mut self, sink: &mut S) -> Result<usize> {
        let buf = self.regs.read_buf();
        if buf.rx_empty() {
            return Err(Error::NoDataAvailable);
        }

        let count = self.state.format().word_len();
        let bytes = buf.bytes();
        sink.deliver(&bytes[..count]).map_err(|_| Error::CopyFailure)?;
        Ok(count)
    }

    fn read_buffered<S: ByteSink>(&mut self, sink: &mut S, max_bytes: usize) -> Result<usize> {
        let mut staging = [0u8; MAX_BUF_SIZE];
        let want = max_bytes.min(MAX_BUF_SIZE);
        let count = self.rx.get(&mut staging[..want]);
        if count == 0 {
            return Err(Error::NoDataAvailable);
        }
        sink.deliver(&staging[..count]).map_err(|_| Error::CopyFailure)?;
        Ok(count)
    }

    /// Transmit `len` bytes from `src`
    ///
    /// Returns `len` on success. Words skipped because of TXFULL or, under
    /// [`FetchFailurePolicy::SkipWord`], because the source could not supply
    /// them are not reported in the return value.
    pub fn write<S: ByteSource>(&mut self, src: &mut S, len: usize) -> Result<usize> {
        if len == 0 || len > MAX_BUF_SIZE || len > src.len() {
            return Err(Error::InvalidArgument);
        }

        self.poll_until(|buf| buf.rx_empty())?;

        let format = self.state.format();
        let step = format.word_len();
        let mask = self.state.chip_mask().bits();
        let mut dropped = 0usize;

        let mut index = 0;
        while index < len {
            if self.regs.read_buf().tx_full() {
                log::trace!("dvspi: TXFULL at offset {}, word skipped", index);
                dropped += 1;
                index += step;
                continue;
            }

            let mut raw = [0u8; 2];
            let fetched = src.fetch(index, &mut raw[..step]);
            if fetched.is_err() {
                match self.config.fetch_failure {
                    FetchFailurePolicy::SkipWord => {
                        log::trace!("dvspi: source fetch failed at offset {}", index);
                        dropped += 1;
                        index += step;
                        continue;
                    }
                    FetchFailurePolicy::Abort => return Err(Error::CopyFailure),
                }
            }

            let word = (u32::from(u16::from_le_bytes(raw)) & format.data_mask()) | mask;
            self.send_word(format, word)?;
            index += step;
        }

        if dropped > 0 {
            log::warn!("dvspi: {} word(s) of a {} byte write were not sent", dropped, len);
        }
        Ok(len)
    }

    fn send_word(&mut self, format: DataFormat, word: u32) -> Result<()> {
        self.regs.write(Register::Dat1, word);
        log::trace!("dvspi: SPIDAT1 <- {:#010x}", word);
        let mut response = self.wait_until_sent()?;

        if format == DataFormat::SixteenBit {
            let finalize = word | FRAME_FINALIZE;
            self.regs.write(Register::Dat1, finalize);
            log::trace!("dvspi: SPIDAT1 <- {:#010x}", finalize);
            response = self.wait_until_sent()?;
        }

        if self.config.read_mode == ReadMode::Buffered {
            let bytes = response.bytes();
            if self.rx.put(&bytes[..format.word_len()]) == PutOutcome::Reset {
                log::warn!("dvspi: receive FIFO overflowed and was reset");
            }
        }
        Ok(())
    }

    /// Wait until the exchanged word is visible in SPIBUF
    fn wait_until_sent(&mut self) -> Result<SpiBuf> {
        self.poll_until(|buf| !buf.rx_empty())
    }

    fn poll_until<F>(&mut self, ready: F) -> Result<SpiBuf>
    where
        F: Fn(SpiBuf) -> bool,
    {
        match self.config.poll {
            PollPolicy::Unbounded => loop {
                let buf = self.regs.read_buf();
                if ready(buf) {
                    return Ok(buf);
                }
                core::hint::spin_loop();
            },
            PollPolicy::Bounded { max_polls } => {
                // a zero limit still takes one snapshot
                for _ in 0..max_polls.max(1) {
                    let buf = self.regs.read_buf();
                    if ready(buf) {
                        return Ok(buf);
                    }
                    core::hint::spin_loop();
                }
                log::error!("dvspi: peripheral not ready after {} polls", max_polls);
                Err(Error::Timeout)
            }
        }
    }
}
