//! CLI argument parsing

use crate::backends;
use clap::{Parser, Subcommand, ValueEnum};
use dvspi_core::{
    ChipSelect, ChipSelectHold, Command, DataFormat, FetchFailurePolicy, PollPolicy, ReadMode,
    SpiConfig,
};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
pub fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a status-poll limit, which must be at least 1
pub fn parse_poll_limit(s: &str) -> Result<u32, String> {
    match parse_hex_u32(s)? {
        0 => Err("Poll limit must be at least 1".to_string()),
        n => Ok(n),
    }
}

/// Parse a byte string such as `"01 02 ff"`, `"0x01,0x02"` or `"0102ff"`
pub fn parse_hex_bytes(s: &str) -> Result<Vec<u8>, String> {
    let mut bytes = Vec::new();

    for token in s.split(|c: char| c.is_whitespace() || c == ',') {
        if token.is_empty() {
            continue;
        }
        let digits = token
            .strip_prefix("0x")
            .or_else(|| token.strip_prefix("0X"))
            .unwrap_or(token);
        if digits.is_empty() || digits.len() % 2 != 0 {
            return Err(format!("Odd number of hex digits in '{}'", token));
        }
        for pair in digits.as_bytes().chunks(2) {
            let pair = std::str::from_utf8(pair)
                .map_err(|_| format!("Invalid hex byte in '{}'", token))?;
            let byte = u8::from_str_radix(pair, 16)
                .map_err(|_| format!("Invalid hex byte '{}' in '{}'", pair, token))?;
            bytes.push(byte);
        }
    }

    Ok(bytes)
}

/// Generate dynamic help text for the backend argument
fn backend_help() -> String {
    format!(
        "Backend to use [available: {}]",
        backends::backend_names_short()
    )
}

#[derive(Parser)]
#[command(name = "dvspi")]
#[command(author, version, about = "DaVinci DM644x SPI master", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Word width as given on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordFormat {
    /// 8-bit words
    #[value(name = "8")]
    Eight,
    /// 16-bit words
    #[value(name = "16")]
    Sixteen,
}

impl From<WordFormat> for DataFormat {
    fn from(format: WordFormat) -> Self {
        match format {
            WordFormat::Eight => DataFormat::EightBit,
            WordFormat::Sixteen => DataFormat::SixteenBit,
        }
    }
}

/// Backend selection, driver behaviour and session set-up shared across commands
#[derive(clap::Args, Debug, Clone)]
pub struct SessionArgs {
    /// Backend to use
    #[arg(short, long, default_value = "dummy", help = backend_help())]
    pub backend: String,

    /// Reset the block into master mode before anything else
    #[arg(long)]
    pub reset: bool,

    /// Program the pin-control profile for the selected chip
    #[arg(long)]
    pub enable_cs: bool,

    /// Word width
    #[arg(long, value_enum)]
    pub format: Option<WordFormat>,

    /// Keep chip select asserted between words
    #[arg(long)]
    pub hold: bool,

    /// Chip select to address (0 or 1)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub chip: Option<u8>,

    /// Give up after this many status polls instead of waiting forever
    #[arg(long, value_parser = parse_poll_limit)]
    pub poll_limit: Option<u32>,

    /// Fail a write when a source byte cannot be fetched instead of skipping the word
    #[arg(long)]
    pub abort_on_fetch_error: bool,

    /// Capture responses during writes and serve reads from the receive FIFO
    #[arg(long)]
    pub buffered: bool,
}

impl SessionArgs {
    /// Driver behaviour selected by the flags
    pub fn spi_config(&self) -> SpiConfig {
        let mut config = SpiConfig::new();
        if let Some(max_polls) = self.poll_limit {
            config = config.with_poll_policy(PollPolicy::Bounded { max_polls });
        }
        if self.abort_on_fetch_error {
            config = config.with_fetch_failure_policy(FetchFailurePolicy::Abort);
        }
        if self.buffered {
            config = config.with_read_mode(ReadMode::Buffered);
        }
        config
    }

    fn chip_select(&self) -> ChipSelect {
        match self.chip {
            Some(1) => ChipSelect::Chip1,
            _ => ChipSelect::Chip0,
        }
    }

    /// Commands to issue right after the session opens, in order
    pub fn setup_commands(&self) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.reset {
            commands.push(Command::Reset);
        }
        if self.enable_cs {
            commands.push(Command::EnableChipSelectLine(self.chip_select()));
        }
        if let Some(format) = self.format {
            commands.push(Command::SetDataFormat(format.into()));
        }
        if self.hold {
            commands.push(Command::SetChipSelectHold(ChipSelectHold::ActiveHold));
        }
        if self.chip.is_some() || self.hold {
            commands.push(Command::SelectChip(self.chip_select()));
        }
        commands
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transmit bytes
    Write {
        #[command(flatten)]
        session: SessionArgs,

        /// Bytes to send, in hex (e.g. "01 02 ff")
        #[arg(required_unless_present = "input", conflicts_with = "input")]
        data: Option<String>,

        /// Send the contents of this file instead
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Afterwards, read back whatever the block captured
        #[arg(long)]
        read_back: bool,
    },

    /// Read received words
    Read {
        #[command(flatten)]
        session: SessionArgs,

        /// Number of reads to perform
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,

        /// Bytes requested per read
        #[arg(long, default_value = "1024")]
        max_bytes: usize,

        /// Attempts per read while no data is available
        #[arg(long, default_value = "1")]
        attempts: u32,

        /// Write the received bytes to this file instead of printing them
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Issue a raw control command
    Control {
        #[command(flatten)]
        session: SessionArgs,

        /// Command tag (0=reset, 1=enable-cs, 2=format, 3=hold, 4=select)
        #[arg(value_parser = parse_hex_u32)]
        tag: u32,

        /// Command argument
        #[arg(value_parser = parse_hex_u32, default_value = "0")]
        arg: u32,
    },

    /// List available backends
    ListBackends,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_hex_u32() {
        assert_eq!(parse_hex_u32("0x10"), Ok(16));
        assert_eq!(parse_hex_u32("10"), Ok(10));
        assert!(parse_hex_u32("0xZZ").is_err());
    }

    #[test]
    fn test_parse_hex_bytes() {
        assert_eq!(parse_hex_bytes("01 02 ff"), Ok(vec![0x01, 0x02, 0xFF]));
        assert_eq!(parse_hex_bytes("0x01,0x02"), Ok(vec![0x01, 0x02]));
        assert_eq!(parse_hex_bytes("0102FF"), Ok(vec![0x01, 0x02, 0xFF]));
        assert_eq!(parse_hex_bytes(""), Ok(vec![]));
        assert!(parse_hex_bytes("123").is_err());
        assert!(parse_hex_bytes("0x").is_err());
        assert!(parse_hex_bytes("zz").is_err());
    }

    fn session_args(args: &[&str]) -> SessionArgs {
        let mut argv = vec!["dvspi", "control"];
        argv.extend_from_slice(args);
        argv.push("0");
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Control { session, .. } => session,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_setup_command_order() {
        let args = session_args(&[
            "--reset",
            "--enable-cs",
            "--format",
            "8",
            "--hold",
            "--chip",
            "1",
        ]);
        assert_eq!(
            args.setup_commands(),
            vec![
                Command::Reset,
                Command::EnableChipSelectLine(ChipSelect::Chip1),
                Command::SetDataFormat(DataFormat::EightBit),
                Command::SetChipSelectHold(ChipSelectHold::ActiveHold),
                Command::SelectChip(ChipSelect::Chip1),
            ]
        );
    }

    #[test]
    fn test_no_setup_by_default() {
        let args = session_args(&[]);
        assert!(args.setup_commands().is_empty());
        assert_eq!(args.spi_config(), SpiConfig::default());
        assert_eq!(args.backend, "dummy");
    }

    #[test]
    fn test_spi_config_flags() {
        let args = session_args(&["--poll-limit", "0x100", "--abort-on-fetch-error", "--buffered"]);
        let config = args.spi_config();
        assert_eq!(config.poll, PollPolicy::Bounded { max_polls: 0x100 });
        assert_eq!(config.fetch_failure, FetchFailurePolicy::Abort);
        assert_eq!(config.read_mode, ReadMode::Buffered);
    }

    #[test]
    fn test_zero_poll_limit_rejected() {
        assert!(parse_poll_limit("0").is_err());
        assert!(parse_poll_limit("0x0").is_err());
        assert_eq!(parse_poll_limit("1"), Ok(1));
        assert!(Cli::try_parse_from(["dvspi", "control", "--poll-limit", "0", "4"]).is_err());

        let args = session_args(&["--poll-limit", "1"]);
        assert_eq!(args.spi_config().poll, PollPolicy::Bounded { max_polls: 1 });
    }

    #[test]
    fn test_chip_out_of_range_rejected() {
        assert!(Cli::try_parse_from(["dvspi", "control", "--chip", "2", "4"]).is_err());
    }
}
