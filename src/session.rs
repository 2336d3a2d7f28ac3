//! Classification session lifecycle
//!
//! A [`Session`] owns everything that lives for one tracing run: the
//! classifier built from the memory map and the per-event tallies. It is
//! created when tracing begins, fed one sample at a time, and consumed to
//! produce the final [`Summary`].

use crate::classifier::{Classifier, MemoryType};
use crate::event::SampleEvent;
use crate::iomem::{self, IoMem};
use crate::stats::{ClassificationCounts, EventSummary, Summary};
use std::path::Path;

/// Tally for one event name
#[derive(Debug, Clone)]
struct EventTally {
    name: String,
    counts: ClassificationCounts,
}

#[derive(Debug, Clone)]
pub struct Session {
    classifier: Classifier,
    /// Tallies in first-seen event order
    tallies: Vec<EventTally>,
}

impl Session {
    /// Start a session from an already-parsed memory map
    pub fn new(iomem: IoMem) -> Self {
        if iomem.is_redacted() {
            tracing::warn!(
                "Memory map addresses are all zero; run as root to read real physical ranges"
            );
        } else if iomem.is_empty() {
            tracing::warn!("Memory map has no entries; every sample will classify as N/A");
        }

        Self {
            classifier: Classifier::new(iomem),
            tallies: Vec::new(),
        }
    }

    /// Start a session by reading the memory map at `path`
    pub fn begin<P: AsRef<Path>>(path: P) -> iomem::Result<Self> {
        let iomem = IoMem::from_file(path)?;
        Ok(Self::new(iomem))
    }

    /// Classify one sample and count it under its event name
    pub fn process_event(&mut self, event: &SampleEvent) -> MemoryType {
        let memory_type = self.classifier.classify(event.phys_addr);
        self.tally_mut(&event.name).record(&memory_type);
        memory_type
    }

    fn tally_mut(&mut self, name: &str) -> &mut ClassificationCounts {
        let idx = match self.tallies.iter().position(|t| t.name == name) {
            Some(idx) => idx,
            None => {
                if let Some(first) = self.tallies.first() {
                    tracing::debug!("New event {:?} after {:?}, tallied separately", name, first.name);
                }
                self.tallies.push(EventTally {
                    name: name.to_string(),
                    counts: ClassificationCounts::new(),
                });
                self.tallies.len() - 1
            }
        };
        &mut self.tallies[idx].counts
    }

    /// Name of the first event observed in this session
    pub fn event_name(&self) -> Option<&str> {
        self.tallies.first().map(|t| t.name.as_str())
    }

    /// Tally for a given event name
    pub fn counts(&self, event_name: &str) -> Option<&ClassificationCounts> {
        self.tallies
            .iter()
            .find(|t| t.name == event_name)
            .map(|t| &t.counts)
    }

    /// Samples processed across every event
    pub fn total_samples(&self) -> u64 {
        self.tallies.iter().map(|t| t.counts.total()).sum()
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Snapshot of the current tallies
    pub fn report(&self) -> Summary {
        Summary {
            events: self
                .tallies
                .iter()
                .map(|t| EventSummary::from_counts(t.name.clone(), &t.counts))
                .collect(),
        }
    }

    /// Finish the session and produce the final summary
    pub fn end(self) -> Summary {
        tracing::debug!("Session ended after {} samples", self.total_samples());
        self.report()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MAP: &str = "\
00001000-0009ffff : System RAM
000a0000-000bffff : PCI Bus 0000:00
100000000-17fffffff : Persistent Memory
";

    fn session() -> Session {
        Session::new(IoMem::parse(MAP))
    }

    #[test]
    fn test_process_event_counts_labels() {
        let mut s = session();
        assert_eq!(
            s.process_event(&SampleEvent::new("mem-loads", 0x2000)),
            MemoryType::SystemRam
        );
        s.process_event(&SampleEvent::new("mem-loads", 0x3000));
        s.process_event(&SampleEvent::new("mem-loads", 0x1_0000_0000));
        s.process_event(&SampleEvent::new("mem-loads", 0xa0010));
        s.process_event(&SampleEvent::new("mem-loads", 0));

        let counts = s.counts("mem-loads").unwrap();
        assert_eq!(counts.get("System RAM"), 2);
        assert_eq!(counts.get("Persistent Memory"), 1);
        assert_eq!(counts.get("PCI Bus 0000:00"), 1);
        assert_eq!(counts.get("N/A"), 1);
        assert_eq!(s.total_samples(), 5);
    }

    #[test]
    fn test_first_event_name_is_kept() {
        let mut s = session();
        assert!(s.event_name().is_none());
        s.process_event(&SampleEvent::new("mem-loads", 0x2000));
        s.process_event(&SampleEvent::new("mem-stores", 0x2000));
        assert_eq!(s.event_name(), Some("mem-loads"));
    }

    #[test]
    fn test_mixed_events_tallied_separately() {
        let mut s = session();
        s.process_event(&SampleEvent::new("mem-loads", 0x2000));
        s.process_event(&SampleEvent::new("mem-stores", 0));
        s.process_event(&SampleEvent::new("mem-loads", 0x2000));

        let summary = s.end();
        assert_eq!(summary.events.len(), 2);
        assert_eq!(summary.events[0].event, "mem-loads");
        assert_eq!(summary.events[0].total, 2);
        assert_eq!(summary.events[1].event, "mem-stores");
        assert_eq!(summary.events[1].rows[0].memory_type, "N/A");
    }

    #[test]
    fn test_empty_session_report() {
        let summary = session().end();
        assert!(summary.is_empty());
    }

    #[test]
    fn test_begin_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(MAP.as_bytes()).unwrap();
        let s = Session::begin(file.path()).unwrap();
        assert!(s.classifier().is_system_ram(0x1000));
    }

    #[test]
    fn test_begin_missing_file_is_fatal() {
        assert!(Session::begin("/nonexistent/iomem").is_err());
    }
}
