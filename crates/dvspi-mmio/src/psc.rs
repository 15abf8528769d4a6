//! Power and Sleep Controller clock gating
//!
//! The DM644x gates peripheral clocks through per-module LPSC entries. A
//! state change is requested in MDCTL, kicked off with PTCMD, and complete
//! once PTSTAT reports no transition in progress and MDSTAT shows the new
//! state.

use dvspi_core::hal::{ClockControl, ClockUnavailable};

use crate::error::Result;
use crate::physmap::PhysMap;

/// Power domain transition command
pub const PTCMD: usize = 0x120;
/// Power domain transition status
pub const PTSTAT: usize = 0x128;
/// Module status, one word per LPSC
pub const MDSTAT_BASE: usize = 0x800;
/// Module control, one word per LPSC
pub const MDCTL_BASE: usize = 0xA00;

/// Size of the PSC window
pub const PSC_WINDOW_SIZE: usize = 0x1000;

const STATE_MASK: u32 = 0x1F;
const ALWAYS_ON_DOMAIN: u32 = 1 << 0;
const MAX_POLLS: u32 = 100_000;

/// LPSC module states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ModuleState {
    /// Clock off, module in reset
    SwRstDisable = 0,
    /// Clock on, module in reset
    SyncReset = 1,
    /// Clock off
    Disable = 2,
    /// Clock on
    Enable = 3,
}

/// Clock gate for one LPSC module
pub struct PscClock {
    map: PhysMap,
    lpsc: u32,
}

impl PscClock {
    /// Map the PSC at `base` and control module `lpsc`
    pub fn map(base: u64, lpsc: u32) -> Result<Self> {
        let map = PhysMap::new(base, PSC_WINDOW_SIZE)?;
        Ok(Self { map, lpsc })
    }

    fn mdctl(&self) -> usize {
        MDCTL_BASE + 4 * self.lpsc as usize
    }

    fn mdstat(&self) -> usize {
        MDSTAT_BASE + 4 * self.lpsc as usize
    }

    /// Current state of the module
    pub fn state(&self) -> u32 {
        self.map.read32(self.mdstat()) & STATE_MASK
    }

    fn transition(&mut self, next: ModuleState) -> bool {
        if !self.wait(|psc| psc.map.read32(PTSTAT) & ALWAYS_ON_DOMAIN == 0) {
            return false;
        }

        let mdctl = self.map.read32(self.mdctl());
        self.map
            .write32(self.mdctl(), (mdctl & !STATE_MASK) | next as u32);
        self.map.write32(PTCMD, ALWAYS_ON_DOMAIN);

        self.wait(|psc| psc.map.read32(PTSTAT) & ALWAYS_ON_DOMAIN == 0)
            && self.wait(|psc| psc.state() == next as u32)
    }

    fn wait<F: Fn(&Self) -> bool>(&self, done: F) -> bool {
        for _ in 0..MAX_POLLS {
            if done(self) {
                return true;
            }
            core::hint::spin_loop();
        }
        false
    }
}

impl ClockControl for PscClock {
    fn enable(&mut self) -> core::result::Result<(), ClockUnavailable> {
        if self.transition(ModuleState::Enable) {
            log::debug!("psc: LPSC {} enabled", self.lpsc);
            Ok(())
        } else {
            log::error!("psc: LPSC {} did not reach the enabled state", self.lpsc);
            Err(ClockUnavailable)
        }
    }

    fn disable(&mut self) {
        if self.transition(ModuleState::Disable) {
            log::debug!("psc: LPSC {} disabled", self.lpsc);
        } else {
            log::warn!("psc: LPSC {} did not reach the disabled state", self.lpsc);
        }
    }
}
