//! Error types for dvspi-core
//!
//! The error type is `Copy` and `no_std` compatible. Each variant maps onto
//! the negative errno a character-device layer hands back to its caller.

use core::fmt;

/// Core error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The peripheral clock could not be acquired; the session must not proceed
    DeviceUnavailable,
    /// Malformed call: empty or oversized buffer, unknown command or argument
    InvalidArgument,
    /// The receive register holds no unread word; retry later
    NoDataAvailable,
    /// Moving bytes between the caller's buffer and the driver failed
    CopyFailure,
    /// A bounded readiness poll gave up before the peripheral responded
    Timeout,
}

impl Error {
    /// Negative errno value for this error
    pub const fn errno(self) -> i32 {
        match self {
            Self::DeviceUnavailable => -19,
            Self::InvalidArgument => -22,
            Self::NoDataAvailable => -11,
            Self::CopyFailure => -14,
            Self::Timeout => -110,
        }
    }

    /// Whether the caller is expected to simply retry the operation
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::NoDataAvailable)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceUnavailable => write!(f, "SPI clock unavailable"),
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::NoDataAvailable => write!(f, "no received data available"),
            Self::CopyFailure => write!(f, "copy to or from caller buffer failed"),
            Self::Timeout => write!(f, "SPI peripheral did not become ready"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_codes() {
        assert_eq!(Error::DeviceUnavailable.errno(), -19);
        assert_eq!(Error::InvalidArgument.errno(), -22);
        assert_eq!(Error::NoDataAvailable.errno(), -11);
        assert_eq!(Error::CopyFailure.errno(), -14);
        assert_eq!(Error::Timeout.errno(), -110);
    }

    #[test]
    fn test_only_no_data_is_transient() {
        assert!(Error::NoDataAvailable.is_transient());
        assert!(!Error::InvalidArgument.is_transient());
        assert!(!Error::DeviceUnavailable.is_transient());
    }
}
