//! Sampled trace events carrying a physical address
//!
//! Samples usually come from `perf script -F event,phys_addr`, one per line:
//!
//! ```text
//! cpu/mem-loads,ldlat=30/P:         1b2e4f080
//! ```
//!
//! The address is the last whitespace-separated token (hex, optional `0x`);
//! everything before it, minus a trailing `:`, is the event name.

use std::io::BufRead;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing a sample line
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EventParseError {
    #[error("Missing event name in sample line")]
    MissingName,

    #[error("Missing physical address in sample line")]
    MissingAddress,

    #[error("Invalid physical address: {0}")]
    InvalidAddress(String),

    #[error("Sample line is not valid UTF-8")]
    InvalidUtf8,
}

/// A single sampled event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleEvent {
    /// Event name (e.g., "mem-loads")
    pub name: String,
    /// Sampled physical address, 0 when the sample carried none
    pub phys_addr: u64,
}

impl SampleEvent {
    pub fn new(name: impl Into<String>, phys_addr: u64) -> Self {
        Self {
            name: name.into(),
            phys_addr,
        }
    }
}

impl FromStr for SampleEvent {
    type Err = EventParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, addr) = match line.rsplit_once(char::is_whitespace) {
            Some((name, addr)) => (name.trim_end(), addr),
            None if line.is_empty() => return Err(EventParseError::MissingAddress),
            None => return Err(EventParseError::MissingName),
        };

        let name = name.strip_suffix(':').unwrap_or(name).trim();
        if name.is_empty() {
            return Err(EventParseError::MissingName);
        }

        let digits = addr
            .strip_prefix("0x")
            .or_else(|| addr.strip_prefix("0X"))
            .unwrap_or(addr);
        let phys_addr = u64::from_str_radix(digits, 16)
            .map_err(|_| EventParseError::InvalidAddress(addr.to_string()))?;

        Ok(Self::new(name, phys_addr))
    }
}

/// Reads sample lines, skipping comments, blank lines and malformed samples
pub struct SampleReader<R> {
    reader: R,
    buf: Vec<u8>,
    lineno: usize,
    skipped: usize,
}

impl<R: BufRead> SampleReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            lineno: 0,
            skipped: 0,
        }
    }

    /// Number of malformed lines dropped so far
    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }
}

impl<R: BufRead> Iterator for SampleReader<R> {
    type Item = std::io::Result<SampleEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }
            self.lineno += 1;

            let parsed = std::str::from_utf8(&self.buf)
                .map_err(|_| EventParseError::InvalidUtf8)
                .map(str::trim);
            let result = match parsed {
                Ok(trimmed) if trimmed.is_empty() || trimmed.starts_with('#') => continue,
                Ok(trimmed) => trimmed.parse::<SampleEvent>(),
                Err(e) => Err(e),
            };

            match result {
                Ok(event) => return Some(Ok(event)),
                Err(e) => {
                    self.skipped += 1;
                    tracing::warn!("Skipping sample line {}: {}", self.lineno, e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_perf_script_line() {
        let event: SampleEvent = "cpu/mem-loads,ldlat=30/P:         1b2e4f080".parse().unwrap();
        assert_eq!(event.name, "cpu/mem-loads,ldlat=30/P");
        assert_eq!(event.phys_addr, 0x1_b2e4_f080);
    }

    #[test]
    fn test_parse_with_hex_prefix() {
        let event: SampleEvent = "mem-loads 0x1500".parse().unwrap();
        assert_eq!(event, SampleEvent::new("mem-loads", 0x1500));
    }

    #[test]
    fn test_parse_name_with_spaces() {
        let event: SampleEvent = "  mem stores :  0 ".parse().unwrap();
        assert_eq!(event.name, "mem stores");
        assert_eq!(event.phys_addr, 0);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<SampleEvent>(), Err(EventParseError::MissingAddress));
        assert_eq!("1500".parse::<SampleEvent>(), Err(EventParseError::MissingName));
        assert_eq!(": 1500".parse::<SampleEvent>(), Err(EventParseError::MissingName));
        assert_eq!(
            "mem-loads xyz".parse::<SampleEvent>(),
            Err(EventParseError::InvalidAddress("xyz".into()))
        );
    }

    #[test]
    fn test_reader_skips_invalid_utf8_line() {
        let input: &[u8] = b"mem-loads: 1000\nmem-\xff\xfe: 2000\r\nmem-loads: 3000";
        let mut reader = SampleReader::new(Cursor::new(input));
        let events: Vec<_> = reader.by_ref().map(|e| e.unwrap()).collect();
        assert_eq!(
            events,
            vec![SampleEvent::new("mem-loads", 0x1000), SampleEvent::new("mem-loads", 0x3000)]
        );
        assert_eq!(reader.skipped_lines(), 1);
    }

    #[test]
    fn test_reader_skips_comments_and_garbage() {
        let input = "# perf script output\n\nmem-loads: 1000\nbroken\nmem-loads: 2000\n";
        let mut reader = SampleReader::new(Cursor::new(input));
        let events: Vec<_> = reader.by_ref().map(|e| e.unwrap()).collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].phys_addr, 0x2000);
        assert_eq!(reader.skipped_lines(), 1);
    }
}
