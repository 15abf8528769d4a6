//! dvspi - DaVinci DM644x SPI master
//!
//! Drives the SPI block of a DM644x as a single-caller byte stream, either on
//! real hardware through /dev/mem or on an emulated block for testing.
//!
//! # Architecture
//!
//! - `dvspi-core` holds the driver: power sequencing, control commands and
//!   the polling transfer engine, written against register/clock traits
//! - Backends (`dvspi-dummy`, `dvspi-mmio`) implement those traits
//! - This binary picks a backend, opens a session, applies the set-up flags
//!   and runs one command

mod backends;
mod cli;
mod commands;
mod error;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match cli.command {
        Commands::Write {
            session,
            data,
            input,
            read_back,
        } => {
            let bytes = match (data, input) {
                (_, Some(path)) => std::fs::read(&path)?,
                (Some(hex), None) => {
                    cli::parse_hex_bytes(&hex).map_err(error::CliError::InvalidArgument)?
                }
                (None, None) => return Err(error::CliError::NoData.into()),
            };
            let mut controller = commands::controller(&session)?;
            let mut handle = commands::open_session(&mut controller, &session)?;
            let result = commands::run_write(&mut handle, &bytes, read_back);
            commands::close_session(handle);
            result
        }
        Commands::Read {
            session,
            count,
            max_bytes,
            attempts,
            output,
        } => {
            let mut controller = commands::controller(&session)?;
            let mut handle = commands::open_session(&mut controller, &session)?;
            let result =
                commands::run_read(&mut handle, count, max_bytes, attempts, output.as_deref());
            commands::close_session(handle);
            result
        }
        Commands::Control { session, tag, arg } => {
            let mut controller = commands::controller(&session)?;
            let mut handle = commands::open_session(&mut controller, &session)?;
            let result = commands::run_control(&mut handle, tag, arg);
            commands::close_session(handle);
            result
        }
        Commands::ListBackends => {
            commands::list_backends();
            Ok(())
        }
    }
}
