//! Physical memory map parsing for `/proc/iomem`
//!
//! Each line of the map describes one physical address range:
//!
//! ```text
//! 00001000-0009ffff : System RAM
//!   000a0000-000bffff : PCI Bus 0000:00
//! ```
//!
//! Nested entries are indented. Only the range and the label matter here, so
//! indentation is dropped and every entry becomes a flat [`MemoryRegion`].

use regex::Regex;
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Default location of the kernel's physical memory map
pub const PROC_IOMEM: &str = "/proc/iomem";

/// Label used by the kernel for conventional RAM
pub const SYSTEM_RAM: &str = "System RAM";

/// Label used by the kernel for NVDIMM / persistent memory
pub const PERSISTENT_MEMORY: &str = "Persistent Memory";

/// Errors that can occur while loading a memory map
#[derive(Error, Debug)]
pub enum IomemError {
    #[error("Failed to read memory map {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read memory map: {0}")]
    Read(#[from] std::io::Error),
}

/// Result type for memory map operations
pub type Result<T> = std::result::Result<T, IomemError>;

/// One `start-end : label` entry of the memory map
///
/// Both bounds are inclusive, matching what the kernel prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
    pub start: u64,
    pub end: u64,
    pub label: String,
}

impl MemoryRegion {
    pub fn new(start: u64, end: u64, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }

    /// Closed-interval membership
    pub fn contains(&self, addr: u64) -> bool {
        self.start <= addr && addr <= self.end
    }

    /// Parse a single memory map line
    ///
    /// Returns `None` for lines that do not have the `start-end : label`
    /// shape, whose addresses are not valid 64-bit hex, or whose start lies
    /// past the end.
    pub fn parse_line(line: &str) -> Option<Self> {
        let caps = line_regex().captures(line)?;
        let start = u64::from_str_radix(&caps[1], 16).ok()?;
        let end = u64::from_str_radix(&caps[2], 16).ok()?;
        if start > end {
            return None;
        }
        Some(Self::new(start, end, caps[3].trim()))
    }
}

fn line_regex() -> &'static Regex {
    static LINE: OnceLock<Regex> = OnceLock::new();
    LINE.get_or_init(|| {
        Regex::new(r"^\s*([0-9A-Fa-f]+)\s*-\s*([0-9A-Fa-f]+)\s*:(.*)$")
            .expect("iomem line pattern is valid")
    })
}

/// A parsed memory map
#[derive(Debug, Clone, Default)]
pub struct IoMem {
    regions: Vec<MemoryRegion>,
    skipped: usize,
}

impl IoMem {
    /// Parse memory map text, skipping malformed lines
    pub fn parse(text: &str) -> Self {
        let mut iomem = Self::default();
        for (lineno, line) in text.lines().enumerate() {
            iomem.push_line(lineno + 1, line);
        }
        iomem.log_parsed();
        iomem
    }

    /// Parse raw memory map bytes
    ///
    /// Lines that are not valid UTF-8 are decoded lossily, so a corrupt label
    /// never takes the rest of the map down with it.
    pub fn parse_bytes(bytes: &[u8]) -> Self {
        let mut iomem = Self::default();
        for (lineno, line) in bytes.split(|&b| b == b'\n').enumerate() {
            iomem.push_line(lineno + 1, &String::from_utf8_lossy(line));
        }
        iomem.log_parsed();
        iomem
    }

    /// Read and parse a memory map from any buffered reader
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Self> {
        let mut iomem = Self::default();
        let mut buf = Vec::new();
        let mut lineno = 0;
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            lineno += 1;
            iomem.push_line(lineno, &String::from_utf8_lossy(&buf));
        }
        iomem.log_parsed();
        Ok(iomem)
    }

    /// Read and parse a memory map file (usually [`PROC_IOMEM`])
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| IomemError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse_bytes(&bytes))
    }

    fn push_line(&mut self, lineno: usize, line: &str) {
        if line.trim().is_empty() {
            return;
        }
        let line = line.trim_end_matches(&['\n', '\r'][..]);
        match MemoryRegion::parse_line(line) {
            Some(region) => self.regions.push(region),
            None => {
                self.skipped += 1;
                tracing::warn!("Skipping malformed iomem line {}: {:?}", lineno, line);
            }
        }
    }

    fn log_parsed(&self) {
        tracing::debug!(
            "Parsed {} iomem regions ({} lines skipped)",
            self.regions.len(),
            self.skipped
        );
    }

    /// All regions in source order
    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }

    /// Number of non-blank lines that could not be parsed
    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// `(start, end)` pairs of entries labeled exactly `label`, in source order
    pub fn ranges_labeled<'a>(&'a self, label: &'a str) -> impl Iterator<Item = (u64, u64)> + 'a {
        self.regions
            .iter()
            .filter(move |r| r.label == label)
            .map(|r| (r.start, r.end))
    }

    /// First region (in source order) containing `addr`
    pub fn find(&self, addr: u64) -> Option<&MemoryRegion> {
        self.regions.iter().find(|r| r.contains(addr))
    }

    /// True when every entry reads `0-0`
    ///
    /// The kernel zeroes all addresses for readers without CAP_SYS_ADMIN.
    pub fn is_redacted(&self) -> bool {
        !self.regions.is_empty() && self.regions.iter().all(|r| r.start == 0 && r.end == 0)
    }
}
