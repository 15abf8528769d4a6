//! dvspi-dummy - Emulated DM644x SPI block for testing
//!
//! This crate provides an in-memory stand-in for the SPI peripheral, its
//! clock gate and the delay provider, so the driver can be exercised without
//! hardware. The emulated block records every register access, which makes
//! it usable as a spy in tests.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod clock;
pub mod peripheral;

pub use clock::DummyClock;
#[cfg(feature = "alloc")]
pub use clock::RecordingDelay;
#[cfg(feature = "alloc")]
pub use peripheral::DummySpi;
pub use peripheral::{Access, DummyConfig, Response};

#[cfg(feature = "alloc")]
use alloc::format;
#[cfg(feature = "alloc")]
use alloc::string::{String, ToString};

/// Parse backend options from a list of key-value pairs
///
/// - `response=loopback|none|0xNNNN` - slave response model (default: loopback)
/// - `txfull=0|1` - force TXFULL on every status read (default: 0)
#[cfg(feature = "alloc")]
pub fn parse_options(options: &[(&str, &str)]) -> Result<DummyConfig, String> {
    let mut config = DummyConfig::default();

    for (key, value) in options {
        match *key {
            "response" => {
                config.response = match *value {
                    "loopback" => Response::Loopback,
                    "none" | "silent" => Response::Silent,
                    word => {
                        let hex = word
                            .strip_prefix("0x")
                            .or_else(|| word.strip_prefix("0X"))
                            .unwrap_or(word);
                        let word = u16::from_str_radix(hex, 16)
                            .map_err(|_| format!("Invalid response value: {}", value))?;
                        Response::Constant(word)
                    }
                };
            }
            "txfull" => {
                config.tx_full = match *value {
                    "0" | "false" => false,
                    "1" | "true" => true,
                    _ => return Err(format!("Invalid txfull value: {}", value)),
                };
            }
            _ => {
                log::warn!("dummy: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.tx_full && config.response == Response::Silent {
        return Err("txfull=1 with response=none leaves nothing to exercise".to_string());
    }

    Ok(config)
}
