//! Emulated clock gate and delay

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use dvspi_core::hal::{ClockControl, ClockUnavailable, Delay};

/// Clock gate that counts enable/disable transitions
#[derive(Debug, Clone, Default)]
pub struct DummyClock {
    unavailable: bool,
    enabled: bool,
    enable_calls: u32,
    disable_calls: u32,
}

impl DummyClock {
    /// A clock that can always be acquired
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock whose acquisition always fails
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Whether the clock is currently running
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of successful enables
    pub fn enable_calls(&self) -> u32 {
        self.enable_calls
    }

    /// Number of disables
    pub fn disable_calls(&self) -> u32 {
        self.disable_calls
    }
}

impl ClockControl for DummyClock {
    fn enable(&mut self) -> Result<(), ClockUnavailable> {
        if self.unavailable {
            return Err(ClockUnavailable);
        }
        self.enabled = true;
        self.enable_calls += 1;
        Ok(())
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.disable_calls += 1;
    }
}

/// Delay that returns immediately and remembers what was asked for
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, Default)]
pub struct RecordingDelay {
    requests: Vec<u32>,
}

#[cfg(feature = "alloc")]
impl RecordingDelay {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Every requested delay in milliseconds, oldest first
    pub fn requests(&self) -> &[u32] {
        &self.requests
    }

    /// Sum of all requested delays
    pub fn total_ms(&self) -> u64 {
        self.requests.iter().map(|&ms| u64::from(ms)).sum()
    }
}

#[cfg(feature = "alloc")]
impl Delay for RecordingDelay {
    fn delay_ms(&mut self, ms: u32) {
        self.requests.push(ms);
    }
}
