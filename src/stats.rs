//! Memory type tallies and the end-of-session summary table

use crate::classifier::MemoryType;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;

/// Width of the "Memory type" column in the text summary
const LABEL_WIDTH: usize = 40;
/// Width of the count and percentage columns
const NUM_WIDTH: usize = 10;

/// Occurrence count per memory type label
#[derive(Debug, Clone, Default)]
pub struct ClassificationCounts {
    counts: HashMap<String, u64>,
}

/// One row of the summary table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryTypeRow {
    pub memory_type: String,
    pub count: u64,
    pub percentage: f64,
}

impl ClassificationCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one sample of the given memory type
    pub fn record(&mut self, memory_type: &MemoryType) {
        self.record_label(memory_type.label());
    }

    pub fn record_label(&mut self, label: &str) {
        self.add(label, 1);
    }

    fn add(&mut self, label: &str, count: u64) {
        match self.counts.get_mut(label) {
            Some(entry) => *entry += count,
            None => {
                self.counts.insert(label.to_string(), count);
            }
        }
    }

    /// Fold another tally into this one (e.g., per-worker counts)
    pub fn merge(&mut self, other: &ClassificationCounts) {
        for (label, &count) in &other.counts {
            self.add(label, count);
        }
    }

    pub fn get(&self, label: &str) -> u64 {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Total samples across all labels
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct labels
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Rows sorted by count descending, ties broken by label descending
    pub fn rows(&self) -> Vec<MemoryTypeRow> {
        let total = self.total();
        let mut rows: Vec<MemoryTypeRow> = self
            .counts
            .iter()
            .map(|(label, &count)| MemoryTypeRow {
                memory_type: label.clone(),
                count,
                percentage: percentage(count, total),
            })
            .collect();
        rows.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| b.memory_type.cmp(&a.memory_type))
        });
        rows
    }
}

/// `count` as a percentage of `total`, 0 when there is nothing to divide by
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

/// Summary for one event name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub event: String,
    pub total: u64,
    pub rows: Vec<MemoryTypeRow>,
}

impl EventSummary {
    pub fn from_counts(event: impl Into<String>, counts: &ClassificationCounts) -> Self {
        Self {
            event: event.into(),
            total: counts.total(),
            rows: counts.rows(),
        }
    }

    fn write_text(&self, out: &mut String) {
        let _ = writeln!(out, "Event: {}", self.event);
        let _ = writeln!(
            out,
            "{:<LABEL_WIDTH$}  {:>NUM_WIDTH$}  {:>NUM_WIDTH$}",
            "Memory type", "count", "percentage"
        );
        let _ = writeln!(
            out,
            "{:<LABEL_WIDTH$}  {:>NUM_WIDTH$}  {:>NUM_WIDTH$}",
            "-".repeat(LABEL_WIDTH),
            "-".repeat(NUM_WIDTH),
            "-".repeat(NUM_WIDTH)
        );
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{:<LABEL_WIDTH$}  {:>NUM_WIDTH$}  {:>NUM_WIDTH$.1}%",
                row.memory_type, row.count, row.percentage
            );
        }
    }
}

/// End-of-session summary, one table per event name in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub events: Vec<EventSummary>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Render the human-readable summary table
    pub fn to_text(&self) -> String {
        if self.events.is_empty() {
            return "No samples recorded.\n".to_string();
        }

        let mut out = String::new();
        for (i, event) in self.events.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            event.write_text(&mut out);
        }
        out
    }
}
