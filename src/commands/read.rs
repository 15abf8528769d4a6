//! Read command implementation

use super::hex_string;
use crate::backends::BoxedSession;
use crate::error::CliError;
use std::path::Path;
use std::time::Duration;

/// Pause between attempts while the receive register is empty
const RETRY_DELAY: Duration = Duration::from_millis(1);

/// Perform `count` reads and print or save the bytes received
pub fn run_read(
    session: &mut BoxedSession<'_>,
    count: usize,
    max_bytes: usize,
    attempts: u32,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if max_bytes == 0 {
        return Err(CliError::InvalidArgument("--max-bytes must be non-zero".into()).into());
    }

    let mut data = Vec::new();
    let mut buf = vec![0u8; max_bytes];

    for i in 0..count {
        let n = read_with_retry(session, &mut buf, attempts)?;
        log::debug!("Read {}: {} byte(s)", i, n);
        data.extend_from_slice(&buf[..n]);
    }

    match output {
        Some(path) => {
            std::fs::write(path, &data)?;
            println!("Wrote {} bytes to {:?}", data.len(), path);
        }
        None => println!("{}", hex_string(&data)),
    }

    Ok(())
}

/// Read once, retrying up to `attempts` times while no data is available
fn read_with_retry(
    session: &mut BoxedSession<'_>,
    buf: &mut [u8],
    attempts: u32,
) -> Result<usize, CliError> {
    let attempts = attempts.max(1);
    for attempt in 1..=attempts {
        match session.read_into(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.is_transient() => {
                log::trace!("No data on attempt {}/{}", attempt, attempts);
                if attempt < attempts {
                    std::thread::sleep(RETRY_DELAY);
                }
            }
            Err(e) => return Err(CliError::driver("read")(e)),
        }
    }
    Err(CliError::NoDataReceived(attempts))
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::backends::open_backend;
    use dvspi_core::{ChipSelect, Command, Error, SpiConfig};

    #[test]
    fn test_read_gives_up_when_empty() {
        let mut controller = open_backend("dummy", SpiConfig::default()).unwrap();
        let mut session = controller.open().unwrap();
        let mut buf = [0u8; 2];
        assert!(matches!(
            read_with_retry(&mut session, &mut buf, 3),
            Err(CliError::NoDataReceived(3))
        ));
    }

    #[test]
    fn test_read_picks_up_select_traffic() {
        // SelectChip writes SPIDAT1 twice, the loopback leaves both words pending
        let mut controller = open_backend("dummy", SpiConfig::default()).unwrap();
        let mut session = controller.open().unwrap();
        session.execute(Command::SelectChip(ChipSelect::Chip1));

        let mut buf = [0u8; 2];
        assert_eq!(read_with_retry(&mut session, &mut buf, 1).unwrap(), 2);
        assert_eq!(read_with_retry(&mut session, &mut buf, 1).unwrap(), 2);
        assert!(read_with_retry(&mut session, &mut buf, 1).is_err());
    }

    #[test]
    fn test_zero_max_bytes_rejected() {
        let mut controller = open_backend("dummy", SpiConfig::default()).unwrap();
        let mut session = controller.open().unwrap();
        assert!(run_read(&mut session, 1, 0, 1, None).is_err());
    }

    #[test]
    fn test_error_is_not_retried() {
        let mut controller = open_backend("dummy", SpiConfig::default()).unwrap();
        let mut session = controller.open().unwrap();
        session.execute(Command::SelectChip(ChipSelect::Chip0));
        let mut buf = [0u8; 1];
        assert!(matches!(
            read_with_retry(&mut session, &mut buf, 5),
            Err(CliError::Driver {
                source: Error::CopyFailure,
                ..
            })
        ));
    }
}
