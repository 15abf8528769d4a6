//! dvspi-mmio - Hardware backend for the DM644x SPI block
//!
//! Maps the SPI block, the system module and the Power and Sleep Controller
//! through /dev/mem and exposes them as the register and clock collaborators
//! the driver core expects.
//!
//! # Example
//!
//! ```ignore
//! use dvspi_core::{hal::StdDelay, SpiController};
//! use dvspi_mmio::{MmioConfig, MmioRegisters, PscClock};
//!
//! let config = MmioConfig::default();
//! let regs = MmioRegisters::map(config.spi_base, config.sys_base)?;
//! let clock = PscClock::map(config.psc_base, config.lpsc)?;
//! let mut controller = SpiController::new(regs, clock, StdDelay);
//! ```

pub mod error;
pub mod physmap;
pub mod psc;
pub mod registers;

pub use error::{MmioError, Result};
pub use physmap::PhysMap;
pub use psc::PscClock;
pub use registers::MmioRegisters;

/// SPI block base address on the DM644x
pub const DEFAULT_SPI_BASE: u64 = 0x01C6_6800;
/// System module base address
pub const DEFAULT_SYS_BASE: u64 = 0x01C4_0000;
/// Power and Sleep Controller base address
pub const DEFAULT_PSC_BASE: u64 = 0x01C4_1000;
/// LPSC module number of the SPI block
pub const DEFAULT_SPI_LPSC: u32 = 36;

/// Where the hardware lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmioConfig {
    /// SPI block base address
    pub spi_base: u64,
    /// System module base address
    pub sys_base: u64,
    /// PSC base address
    pub psc_base: u64,
    /// LPSC module number gating the SPI clock
    pub lpsc: u32,
}

impl Default for MmioConfig {
    fn default() -> Self {
        Self {
            spi_base: DEFAULT_SPI_BASE,
            sys_base: DEFAULT_SYS_BASE,
            psc_base: DEFAULT_PSC_BASE,
            lpsc: DEFAULT_SPI_LPSC,
        }
    }
}

fn parse_address(key: &str, value: &str) -> std::result::Result<u64, String> {
    let hex = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    let addr =
        u64::from_str_radix(hex, 16).map_err(|_| format!("Invalid {} value: {}", key, value))?;
    if addr & 3 != 0 {
        return Err(format!("{} must be 32-bit aligned: {}", key, value));
    }
    Ok(addr)
}

/// Parse backend options from a list of key-value pairs
///
/// - `spi_base=0x01c66800` - SPI block base (hex)
/// - `sys_base=0x01c40000` - system module base (hex)
/// - `psc_base=0x01c41000` - PSC base (hex)
/// - `lpsc=36` - LPSC module number (decimal)
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<MmioConfig, String> {
    let mut config = MmioConfig::default();

    for (key, value) in options {
        match *key {
            "spi_base" => config.spi_base = parse_address(key, value)?,
            "sys_base" => config.sys_base = parse_address(key, value)?,
            "psc_base" => config.psc_base = parse_address(key, value)?,
            "lpsc" => {
                let lpsc: u32 = value
                    .parse()
                    .map_err(|_| format!("Invalid lpsc value: {}", value))?;
                if lpsc > 63 {
                    return Err(format!("Invalid LPSC: {} (must be 0-63)", lpsc));
                }
                config.lpsc = lpsc;
            }
            _ => {
                log::warn!("mmio: Unknown option: {}={}", key, value);
            }
        }
    }

    Ok(config)
}

/// Map the hardware described by `options`
///
/// Returns the register block and clock gate for building a controller.
pub fn open_mmio(options: &[(&str, &str)]) -> Result<(MmioRegisters, PscClock)> {
    let config = parse_options(options).map_err(MmioError::InvalidParameter)?;
    let regs = MmioRegisters::map(config.spi_base, config.sys_base)?;
    let clock = PscClock::map(config.psc_base, config.lpsc)?;
    Ok((regs, clock))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        assert_eq!(parse_options(&[]).unwrap(), MmioConfig::default());
    }

    #[test]
    fn test_parse_overrides() {
        let config = parse_options(&[
            ("spi_base", "0x01c67000"),
            ("sys_base", "01C40000"),
            ("lpsc", "12"),
        ])
        .unwrap();
        assert_eq!(config.spi_base, 0x01C6_7000);
        assert_eq!(config.sys_base, 0x01C4_0000);
        assert_eq!(config.psc_base, DEFAULT_PSC_BASE);
        assert_eq!(config.lpsc, 12);
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(parse_options(&[("spi_base", "zz")]).is_err());
        assert!(parse_options(&[("spi_base", "0x01c66802")]).is_err());
        assert!(parse_options(&[("lpsc", "64")]).is_err());
        assert!(parse_options(&[("lpsc", "-1")]).is_err());
    }
}
