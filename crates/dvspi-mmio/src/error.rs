//! Error types for memory-mapped access

use thiserror::Error;

/// Errors raised while setting up register access
#[derive(Debug, Error)]
pub enum MmioError {
    /// Opening or mapping /dev/mem failed
    #[error("Failed to map {size:#x} bytes at {address:#010x}: {source}")]
    MemoryMap {
        address: u64,
        size: usize,
        #[source]
        source: std::io::Error,
    },

    /// Physical mapping is not available on this platform
    #[error("Not supported: {0}")]
    NotSupported(&'static str),

    /// Invalid backend parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for memory-mapped access
pub type Result<T> = std::result::Result<T, MmioError>;
