//! CLI argument parsing for memtype

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::iomem::PROC_IOMEM;

/// Output format for the memory type summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "memtype")]
#[command(version)]
#[command(about = "Resolve sampled physical addresses to memory types", long_about = None)]
pub struct Cli {
    /// Physical memory map to classify against
    #[arg(long = "iomem", value_name = "PATH", default_value = PROC_IOMEM)]
    pub iomem: PathBuf,

    /// Output format (text, json or csv)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Classify a single physical address instead of reading samples (repeatable)
    #[arg(short = 'l', long = "lookup", value_name = "ADDR", value_parser = parse_hex_addr)]
    pub lookup: Vec<u64>,

    /// Enable debug logging to stderr
    #[arg(long = "debug")]
    pub debug: bool,

    /// Sample file with one `<event> <hex-phys-addr>` per line (stdin if omitted or `-`)
    #[arg(value_name = "SAMPLES")]
    pub input: Option<PathBuf>,
}

/// Parse a hex physical address, with or without `0x`
fn parse_hex_addr(s: &str) -> Result<u64, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|e| format!("invalid hex address {:?}: {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["memtype"]);
        assert_eq!(cli.iomem, PathBuf::from("/proc/iomem"));
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.lookup.is_empty());
        assert!(!cli.debug);
        assert!(cli.input.is_none());
    }

    #[test]
    fn test_cli_iomem_override() {
        let cli = Cli::parse_from(["memtype", "--iomem", "/tmp/iomem", "samples.txt"]);
        assert_eq!(cli.iomem, PathBuf::from("/tmp/iomem"));
        assert_eq!(cli.input, Some(PathBuf::from("samples.txt")));
    }

    #[test]
    fn test_cli_format_json() {
        let cli = Cli::parse_from(["memtype", "--format", "json"]);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_lookup_repeatable() {
        let cli = Cli::parse_from(["memtype", "-l", "0x1500", "--lookup", "2000"]);
        assert_eq!(cli.lookup, vec![0x1500, 0x2000]);
    }

    #[test]
    fn test_cli_lookup_rejects_bad_hex() {
        assert!(Cli::try_parse_from(["memtype", "--lookup", "0xzz"]).is_err());
    }

    #[test]
    fn test_cli_debug_flag() {
        let cli = Cli::parse_from(["memtype", "--debug"]);
        assert!(cli.debug);
    }
}
