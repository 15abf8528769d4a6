//! Backend registration and dispatch
//!
//! A backend supplies the register block and clock gate a controller runs
//! on. Backends are feature-gated; the help text and the dispatch table only
//! list what was compiled in.

use dvspi_core::hal::{ClockControl, Delay, StdDelay};
use dvspi_core::regs::RegisterBlock;
use dvspi_core::{SpiConfig, SpiController, SpiSession};

/// Register block chosen at runtime
pub type BoxedRegisters = Box<dyn RegisterBlock + Send>;
/// Clock gate chosen at runtime
pub type BoxedClock = Box<dyn ClockControl + Send>;
/// Delay provider chosen at runtime
pub type BoxedDelay = Box<dyn Delay + Send>;

/// Controller over a runtime-selected backend
pub type BoxedController = SpiController<BoxedRegisters, BoxedClock, BoxedDelay>;
/// Session over a runtime-selected backend
pub type BoxedSession<'a> = SpiSession<'a, BoxedRegisters, BoxedClock, BoxedDelay>;

/// Information about a backend
pub struct BackendInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all backends enabled at compile time
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_backends() -> Vec<BackendInfo> {
    let mut backends = Vec::new();

    #[cfg(feature = "dummy")]
    backends.push(BackendInfo {
        name: "dummy",
        aliases: &["emulator"],
        description: "Emulated SPI block (response=loopback|none|0xNNNN,txfull=0|1)",
    });

    #[cfg(feature = "mmio")]
    backends.push(BackendInfo {
        name: "mmio",
        aliases: &["devmem"],
        description:
            "DM644x hardware via /dev/mem (spi_base=,sys_base=,psc_base=,lpsc=) - requires root",
    });

    backends
}

/// Generate help text listing all available backends
pub fn backend_help() -> String {
    let backends = available_backends();

    if backends.is_empty() {
        return "No backends available (recompile with backend features enabled)".to_string();
    }

    let mut help = String::from("Available backends:\n");
    for b in &backends {
        help.push_str(&format!("  {:8} - {}\n", b.name, b.description));
    }
    help
}

/// Generate a short list of backend names for CLI help
pub fn backend_names_short() -> String {
    let backends = available_backends();
    let names: Vec<&str> = backends.iter().map(|b| b.name).collect();
    names.join(", ")
}

/// Resolve a backend name or alias to its primary name
pub fn find_backend(name: &str) -> Option<&'static str> {
    available_backends()
        .into_iter()
        .find(|b| b.name == name || b.aliases.contains(&name))
        .map(|b| b.name)
}

/// Parse a backend string into name and options
///
/// Format: "name" or "name:option1=value1,option2=value2"
pub fn parse_backend_string(s: &str) -> (&str, Vec<(&str, &str)>) {
    if let Some((name, opts)) = s.split_once(':') {
        let options: Vec<_> = opts
            .split(',')
            .filter_map(|opt| opt.split_once('='))
            .collect();
        (name, options)
    } else {
        (s, Vec::new())
    }
}

/// Build a controller on the backend described by `backend`
#[allow(unused_variables)]
pub fn open_backend(
    backend: &str,
    config: SpiConfig,
) -> Result<BoxedController, Box<dyn std::error::Error>> {
    let (name, options) = parse_backend_string(backend);

    let canonical_name = match find_backend(name) {
        Some(n) => n,
        None => return Err(unknown_backend_error(name)),
    };

    let (regs, clock): (BoxedRegisters, BoxedClock) = match canonical_name {
        #[cfg(feature = "dummy")]
        "dummy" => {
            let dummy = dvspi_dummy::parse_options(&options)
                .map_err(|e| format!("Invalid dummy parameters: {}", e))?;
            log::info!("Using emulated SPI block ({:?})", dummy);
            (
                Box::new(dvspi_dummy::DummySpi::new(dummy)) as BoxedRegisters,
                Box::new(dvspi_dummy::DummyClock::new()) as BoxedClock,
            )
        }

        #[cfg(feature = "mmio")]
        "mmio" => {
            log::info!("Mapping DM644x SPI block...");
            let (regs, clock) = dvspi_mmio::open_mmio(&options).map_err(|e| {
                format!(
                    "Failed to map the SPI block: {}\n\
                     Make sure you are root and running on a DM644x.",
                    e
                )
            })?;
            (Box::new(regs) as BoxedRegisters, Box::new(clock) as BoxedClock)
        }

        _ => return Err(unknown_backend_error(name)),
    };

    let delay: BoxedDelay = Box::new(StdDelay);
    Ok(SpiController::with_config(regs, clock, delay, config))
}

fn unknown_backend_error(name: &str) -> Box<dyn std::error::Error> {
    let mut msg = format!("Unknown backend: {}\n\n", name);
    msg.push_str(&backend_help());
    msg.push_str("\nUse 'dvspi list-backends' for more details");
    msg.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_string() {
        assert_eq!(parse_backend_string("dummy"), ("dummy", vec![]));
        assert_eq!(
            parse_backend_string("dummy:response=none,txfull=0"),
            ("dummy", vec![("response", "none"), ("txfull", "0")])
        );
    }

    #[test]
    fn test_unknown_backend() {
        assert!(find_backend("ch341a").is_none());
        assert!(open_backend("ch341a", SpiConfig::default()).is_err());
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_open_dummy_backend() {
        assert_eq!(find_backend("emulator"), Some("dummy"));

        let mut controller =
            open_backend("dummy:response=0x1234", SpiConfig::default()).unwrap();
        let mut session = controller.open().unwrap();
        session.write(&[0xAA, 0xBB]).unwrap();
        assert!(!session.state().chip_mask().holds());
    }

    #[cfg(feature = "dummy")]
    #[test]
    fn test_open_dummy_with_bad_options() {
        assert!(open_backend("dummy:response=what", SpiConfig::default()).is_err());
    }
}
