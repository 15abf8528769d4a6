//! Platform collaborator traits
//!
//! The core never touches clocks, timers or caller memory directly. The
//! embedding provides:
//!
//! - [`ClockControl`] - power-domain / clock gating for the SPI block
//! - [`Delay`] - blocking millisecond delay used by the reset sequence
//! - [`ByteSource`] / [`ByteSink`] - copy-in from and copy-out to the caller
//!
//! Plain slices implement the copy traits, so in-process callers can pass
//! `&[u8]` and `&mut [u8]` straight through.

/// The clock for the SPI block could not be acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockUnavailable;

/// Clock gate for the SPI peripheral
pub trait ClockControl {
    /// Acquire and enable the peripheral clock
    fn enable(&mut self) -> Result<(), ClockUnavailable>;

    /// Disable the peripheral clock
    ///
    /// Only called after a successful [`enable`](Self::enable).
    fn disable(&mut self);
}

/// Blocking delay provider
pub trait Delay {
    /// Block for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

/// A single byte transfer to or from the caller failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyFault;

/// Caller-side data being written to the device
pub trait ByteSource {
    /// Total number of bytes offered by the caller
    fn len(&self) -> usize;

    /// Whether the source holds no bytes
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy `out.len()` bytes starting at `offset` into `out`
    fn fetch(&mut self, offset: usize, out: &mut [u8]) -> Result<(), CopyFault>;
}

/// Caller-side buffer receiving data read from the device
pub trait ByteSink {
    /// Deliver `data` to the caller
    fn deliver(&mut self, data: &[u8]) -> Result<(), CopyFault>;
}

impl ByteSource for &[u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn fetch(&mut self, offset: usize, out: &mut [u8]) -> Result<(), CopyFault> {
        let end = offset.checked_add(out.len()).ok_or(CopyFault)?;
        let src = self.get(offset..end).ok_or(CopyFault)?;
        out.copy_from_slice(src);
        Ok(())
    }
}

/// Delivers into the front of a mutable slice
impl ByteSink for &mut [u8] {
    fn deliver(&mut self, data: &[u8]) -> Result<(), CopyFault> {
        let dst = self.get_mut(..data.len()).ok_or(CopyFault)?;
        dst.copy_from_slice(data);
        Ok(())
    }
}

#[cfg(feature = "alloc")]
impl ByteSink for alloc::vec::Vec<u8> {
    fn deliver(&mut self, data: &[u8]) -> Result<(), CopyFault> {
        self.extend_from_slice(data);
        Ok(())
    }
}

#[cfg(feature = "alloc")]
impl ClockControl for alloc::boxed::Box<dyn ClockControl + Send> {
    fn enable(&mut self) -> Result<(), ClockUnavailable> {
        (**self).enable()
    }

    fn disable(&mut self) {
        (**self).disable()
    }
}

#[cfg(feature = "alloc")]
impl Delay for alloc::boxed::Box<dyn Delay + Send> {
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

/// Delay backed by `std::thread::sleep`
#[cfg(feature = "std")]
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

#[cfg(feature = "std")]
impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source_fetch() {
        let data = [1u8, 2, 3];
        let mut src: &[u8] = &data;
        let mut out = [0u8; 2];
        src.fetch(1, &mut out).unwrap();
        assert_eq!(out, [2, 3]);
        assert_eq!(src.fetch(2, &mut out), Err(CopyFault));
        assert_eq!(ByteSource::len(&src), 3);
    }

    #[test]
    fn test_slice_sink_too_small() {
        let mut storage = [0u8; 1];
        let mut sink: &mut [u8] = &mut storage;
        assert_eq!(sink.deliver(&[0xAA, 0xBB]), Err(CopyFault));
        sink.deliver(&[0xCC]).unwrap();
        assert_eq!(storage, [0xCC]);
    }
}
