//! Write command implementation

use super::hex_string;
use crate::backends::BoxedSession;
use crate::error::CliError;
use dvspi_core::{Error, MAX_BUF_SIZE};
use indicatif::{ProgressBar, ProgressStyle};

/// Send `data` in chunks the driver accepts, then optionally read back
pub fn run_write(
    session: &mut BoxedSession<'_>,
    data: &[u8],
    read_back: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if data.is_empty() {
        return Err(CliError::NoData.into());
    }

    let pb = ProgressBar::new(data.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] \
                 {bytes}/{total_bytes} ({bytes_per_sec})",
            )?
            .progress_chars("#>-"),
    );

    let mut sent = 0usize;
    for chunk in data.chunks(MAX_BUF_SIZE) {
        sent += session.write(chunk).map_err(CliError::driver("write"))?;
        pb.set_position(sent as u64);
    }
    pb.finish_with_message("Write complete");

    println!("Wrote {} bytes", sent);

    if read_back {
        let received = drain(session)?;
        if received.is_empty() {
            println!("Nothing received");
        } else {
            println!("Received {} bytes: {}", received.len(), hex_string(&received));
        }
    }

    Ok(())
}

/// Read until the driver reports no data
fn drain(session: &mut BoxedSession<'_>) -> Result<Vec<u8>, CliError> {
    let mut received = Vec::new();
    let mut buf = [0u8; MAX_BUF_SIZE];
    loop {
        match session.read_into(&mut buf) {
            Ok(n) => received.extend_from_slice(&buf[..n]),
            Err(Error::NoDataAvailable) => return Ok(received),
            Err(e) => return Err(CliError::driver("read")(e)),
        }
    }
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::backends::open_backend;
    use dvspi_core::{Command, DataFormat, ReadMode, SpiConfig};

    #[test]
    fn test_write_larger_than_one_call() {
        let mut controller = open_backend("dummy", SpiConfig::default()).unwrap();
        let mut session = controller.open().unwrap();
        session.execute(Command::SetDataFormat(DataFormat::EightBit));
        let data = vec![0x5A; MAX_BUF_SIZE * 2 + 3];
        run_write(&mut session, &data, false).unwrap();
    }

    #[test]
    fn test_write_empty_is_rejected() {
        let mut controller = open_backend("dummy", SpiConfig::default()).unwrap();
        let mut session = controller.open().unwrap();
        assert!(run_write(&mut session, &[], false).is_err());
    }

    #[test]
    fn test_drain_buffered_responses() {
        let config = SpiConfig::new().with_read_mode(ReadMode::Buffered);
        let mut controller = open_backend("dummy", config).unwrap();
        let mut session = controller.open().unwrap();
        session.execute(Command::SetDataFormat(DataFormat::EightBit));
        session.write(&[0x10, 0x20]).unwrap();
        assert_eq!(drain(&mut session).unwrap(), vec![0x10, 0x20]);
    }
}
