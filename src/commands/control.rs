//! Control command implementation

use crate::backends::BoxedSession;
use crate::error::CliError;

/// Issue a raw control command and report the resulting state
pub fn run_control(
    session: &mut BoxedSession<'_>,
    tag: u32,
    arg: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let status = session.control(tag, arg).map_err(CliError::driver("control"))?;

    let state = session.state();
    println!("control({}, {}) = {}", tag, arg, status);
    println!(
        "  format={:?} chip={:?} hold={:?} mask={:#010x}",
        state.format(),
        state.chip(),
        state.hold(),
        state.chip_mask().bits()
    );
    Ok(())
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use crate::backends::open_backend;
    use dvspi_core::{ChipSelect, SpiConfig};

    #[test]
    fn test_control_selects_chip() {
        let mut controller = open_backend("dummy", SpiConfig::default()).unwrap();
        let mut session = controller.open().unwrap();
        run_control(&mut session, 4, 1).unwrap();
        assert_eq!(session.state().chip(), ChipSelect::Chip1);
    }

    #[test]
    fn test_control_rejects_unknown_tag() {
        let mut controller = open_backend("dummy", SpiConfig::default()).unwrap();
        let mut session = controller.open().unwrap();
        let err = run_control(&mut session, 9, 0).unwrap_err();
        assert!(err.to_string().contains("errno -22"));
    }
}
