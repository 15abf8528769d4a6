//! Physical memory mapping for MMIO access
//!
//! Maps peripheral register windows through /dev/mem. Requires root.
//!
//! # Safety
//!
//! Accessing physical memory is inherently unsafe. The mapping rounds the
//! requested window out to page boundaries and every accessor checks its
//! offset against the requested size in debug builds.

use crate::error::{MmioError, Result};

/// A mapped window of physical memory
#[cfg(target_os = "linux")]
pub struct PhysMap {
    /// Pointer to the first requested byte
    ptr: *mut u8,
    /// Requested window size
    size: usize,
    /// Size of the page-aligned mapping
    map_size: usize,
    /// Physical address (for error reporting and unmapping)
    phys_addr: u64,
}

#[cfg(target_os = "linux")]
impl PhysMap {
    /// Map `size` bytes of physical memory starting at `phys_addr`
    pub fn new(phys_addr: u64, size: usize) -> Result<Self> {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;
        use std::os::unix::io::AsRawFd;

        let map_err = |source| MmioError::MemoryMap {
            address: phys_addr,
            size,
            source,
        };

        // O_SYNC gives an uncached mapping
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open("/dev/mem")
            .map_err(map_err)?;

        let page_mask = page_size() - 1;
        let offset = (phys_addr as usize) & page_mask;
        let aligned_addr = phys_addr & !(page_mask as u64);
        let map_size = (size + offset + page_mask) & !page_mask;

        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                map_size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                aligned_addr as libc::off_t,
            )
        };

        if ptr == libc::MAP_FAILED {
            return Err(map_err(std::io::Error::last_os_error()));
        }

        log::debug!(
            "physmap: mapped {:#x} bytes at {:#010x}",
            map_size,
            aligned_addr
        );

        Ok(Self {
            ptr: unsafe { (ptr as *mut u8).add(offset) },
            size,
            map_size,
            phys_addr,
        })
    }

    /// Read a 32-bit register
    #[inline]
    pub fn read32(&self, offset: usize) -> u32 {
        debug_assert!(offset + 4 <= self.size);
        debug_assert!(offset & 3 == 0, "unaligned 32-bit read");
        unsafe { core::ptr::read_volatile(self.ptr.add(offset) as *const u32) }
    }

    /// Write a 32-bit register
    #[inline]
    pub fn write32(&self, offset: usize, value: u32) {
        debug_assert!(offset + 4 <= self.size);
        debug_assert!(offset & 3 == 0, "unaligned 32-bit write");
        unsafe { core::ptr::write_volatile(self.ptr.add(offset) as *mut u32, value) }
    }

    /// Physical address of the window
    pub fn phys_addr(&self) -> u64 {
        self.phys_addr
    }

    /// Size of the window
    pub fn size(&self) -> usize {
        self.size
    }
}

#[cfg(target_os = "linux")]
fn page_size() -> usize {
    unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
}

#[cfg(target_os = "linux")]
impl Drop for PhysMap {
    fn drop(&mut self) {
        let offset = (self.phys_addr as usize) & (page_size() - 1);
        unsafe {
            let base = self.ptr.sub(offset);
            libc::munmap(base as *mut libc::c_void, self.map_size);
        }
    }
}

// The mapping is plain device memory owned by this value
#[cfg(target_os = "linux")]
unsafe impl Send for PhysMap {}
#[cfg(target_os = "linux")]
unsafe impl Sync for PhysMap {}

/// Stub for platforms without /dev/mem
#[cfg(not(target_os = "linux"))]
pub struct PhysMap {
    _private: (),
}

#[cfg(not(target_os = "linux"))]
impl PhysMap {
    /// Always fails
    pub fn new(_phys_addr: u64, _size: usize) -> Result<Self> {
        Err(MmioError::NotSupported(
            "physical memory mapping is only supported on Linux",
        ))
    }

    /// Unreachable, no instance can exist
    pub fn read32(&self, _offset: usize) -> u32 {
        0
    }

    /// Unreachable, no instance can exist
    pub fn write32(&self, _offset: usize, _value: u32) {}

    /// Unreachable, no instance can exist
    pub fn phys_addr(&self) -> u64 {
        0
    }

    /// Unreachable, no instance can exist
    pub fn size(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore] // Requires root and a DM644x
    fn test_map_spi_window() {
        let map = PhysMap::new(crate::DEFAULT_SPI_BASE, dvspi_core::regs::SPI_WINDOW_SIZE).unwrap();
        assert_eq!(map.phys_addr(), crate::DEFAULT_SPI_BASE);
        assert_eq!(map.size(), dvspi_core::regs::SPI_WINDOW_SIZE);
    }
}
