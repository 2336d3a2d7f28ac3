//! JSON output format for memory type summaries

use crate::stats::Summary;
use serde::Serialize;

/// Memory map provenance included alongside the tallies
#[derive(Debug, Clone, Serialize)]
pub struct JsonIomemInfo {
    /// Path the memory map was read from
    pub path: String,
    /// Parsed regions
    pub regions: usize,
    /// Malformed lines that were skipped
    pub skipped_lines: usize,
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iomem: Option<JsonIomemInfo>,
    /// Sample lines that could not be parsed
    pub skipped_samples: usize,
    #[serde(flatten)]
    pub summary: Summary,
}

impl JsonOutput {
    pub fn new(summary: Summary) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            iomem: None,
            skipped_samples: 0,
            summary,
        }
    }

    pub fn set_iomem_info(&mut self, info: JsonIomemInfo) {
        self.iomem = Some(info);
    }

    pub fn set_skipped_samples(&mut self, skipped: usize) {
        self.skipped_samples = skipped;
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
