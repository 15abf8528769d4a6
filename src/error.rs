//! CLI error types

use thiserror::Error;

/// Errors reported by the CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    /// A driver operation failed
    #[error("{op} failed: {source} (errno {})", .source.errno())]
    Driver {
        op: &'static str,
        #[source]
        source: dvspi_core::Error,
    },

    /// Nothing was given to write
    #[error("No data to write")]
    NoData,

    /// Every read attempt found the receive register empty
    #[error("No data received after {0} attempt(s)")]
    NoDataReceived(u32),

    /// Invalid command-line value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Wrap a driver error with the operation that raised it
    pub fn driver(op: &'static str) -> impl FnOnce(dvspi_core::Error) -> Self {
        move |source| Self::Driver { op, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_reports_errno() {
        let err = CliError::driver("write")(dvspi_core::Error::InvalidArgument);
        assert_eq!(err.to_string(), "write failed: invalid argument (errno -22)");
    }
}
