//! Memory-mapped SPI and system-module registers

use dvspi_core::regs::{Bank, Register, RegisterBlock, SPI_WINDOW_SIZE, SYSTEM_WINDOW_SIZE};

use crate::error::Result;
use crate::physmap::PhysMap;

/// The two register windows the driver touches
pub struct MmioRegisters {
    spi: PhysMap,
    system: PhysMap,
}

impl MmioRegisters {
    /// Map the SPI block at `spi_base` and the system module at `sys_base`
    pub fn map(spi_base: u64, sys_base: u64) -> Result<Self> {
        let spi = PhysMap::new(spi_base, SPI_WINDOW_SIZE)?;
        let system = PhysMap::new(sys_base, SYSTEM_WINDOW_SIZE)?;
        log::info!(
            "mmio: SPI registers at {:#010x}, system module at {:#010x}",
            spi_base,
            sys_base
        );
        Ok(Self { spi, system })
    }

    fn window(&self, reg: Register) -> &PhysMap {
        match reg.bank() {
            Bank::Spi => &self.spi,
            Bank::System => &self.system,
        }
    }
}

impl RegisterBlock for MmioRegisters {
    fn read(&mut self, reg: Register) -> u32 {
        let value = self.window(reg).read32(reg.offset());
        log::trace!("mmio: {} -> {:#010x}", reg.name(), value);
        value
    }

    fn write(&mut self, reg: Register, value: u32) {
        log::trace!("mmio: {} <- {:#010x}", reg.name(), value);
        self.window(reg).write32(reg.offset(), value);
    }
}
