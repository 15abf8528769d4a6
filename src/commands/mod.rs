//! CLI command implementations
//!
//! Each command opens a session on the chosen backend, applies the set-up
//! commands from the shared session flags, does its work and lets the
//! session close on drop.

mod control;
mod list;
mod read;
mod write;

pub use control::run_control;
pub use list::list_backends;
pub use read::run_read;
pub use write::run_write;

use crate::backends::{self, BoxedController, BoxedSession};
use crate::cli::SessionArgs;
use crate::error::CliError;

/// Build a controller for the backend and driver behaviour in `args`
pub fn controller(args: &SessionArgs) -> Result<BoxedController, Box<dyn std::error::Error>> {
    backends::open_backend(&args.backend, args.spi_config())
}

/// Open a session and apply the set-up commands from `args`
pub fn open_session<'a>(
    controller: &'a mut BoxedController,
    args: &SessionArgs,
) -> Result<BoxedSession<'a>, CliError> {
    let mut session = controller.open().map_err(CliError::driver("open"))?;
    log::info!("Session opened on {}", args.backend);

    for cmd in args.setup_commands() {
        log::debug!("Set-up: {:?}", cmd);
        session.execute(cmd);
    }

    let state = session.state();
    log::debug!(
        "format={:?} chip={:?} hold={:?} mask={:#010x}",
        state.format(),
        state.chip(),
        state.hold(),
        state.chip_mask().bits()
    );
    Ok(session)
}

/// Power the block down and end the session
pub fn close_session(session: BoxedSession<'_>) {
    session.close();
    log::info!("Session closed");
}

/// Format bytes as space-separated hex
pub fn hex_string(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_string() {
        assert_eq!(hex_string(&[0x01, 0xab, 0xff]), "01 ab ff");
        assert_eq!(hex_string(&[]), "");
    }
}
