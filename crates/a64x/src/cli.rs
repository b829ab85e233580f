//! CLI definitions and argument types.

use a64x::PluginError;
use clap::{Parser, Subcommand};
use thiserror::Error;

/// Exit code for success.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit code for failure.
pub const EXIT_FAILURE: i32 = 1;

#[derive(Parser)]
#[command(name = "a64x")]
#[command(about = "AArch64 lifting extensions - lift machine code to IL")]
#[command(version)]
pub struct Cli {
    /// Show metrics summary after execution
    #[arg(long, global = true)]
    pub metrics: bool,

    /// Enable verbose output (sets a64x=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lift the instruction at the start of HEX
    Lift {
        /// Little-endian machine code, e.g. "20 04 82 9a"
        #[arg(value_name = "HEX")]
        bytes: String,

        /// Address of the first byte
        #[arg(short, long, default_value = "0", value_parser = parse_address)]
        address: u64,
    },
    /// Lift every instruction in HEX in parallel
    Region {
        /// Little-endian machine code
        #[arg(value_name = "HEX")]
        bytes: String,

        /// Address of the first byte
        #[arg(short, long, default_value = "0", value_parser = parse_address)]
        address: u64,

        /// Number of worker threads (0 = auto)
        #[arg(short = 'j', long, default_value = "0")]
        jobs: usize,
    },
}

/// CLI errors.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("invalid hex byte '{0}'")]
    BadHex(String),
    #[error("odd number of hex digits")]
    OddLength,
    #[error("no input bytes")]
    EmptyInput,
    #[error(transparent)]
    Plugin(#[from] PluginError),
    #[error("thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Parse hex bytes. Whitespace, `_` and a leading `0x` are ignored.
pub fn parse_hex(input: &str) -> Result<Vec<u8>, CliError> {
    let input = input.trim();
    let input = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .unwrap_or(input);
    let digits: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .collect();
    if digits.is_empty() {
        return Err(CliError::EmptyInput);
    }
    if digits.len() % 2 != 0 {
        return Err(CliError::OddLength);
    }
    digits
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).map_err(|_| CliError::BadHex(digits.clone()))?;
            u8::from_str_radix(pair, 16).map_err(|_| CliError::BadHex(pair.to_string()))
        })
        .collect()
}

/// Parse an address as `0x`-prefixed hex or decimal.
pub fn parse_address(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|err| format!("invalid address '{s}': {err}"))
}
