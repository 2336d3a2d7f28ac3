//! Physical address classification
//!
//! System RAM and Persistent Memory get dedicated [`RangeTable`]s since almost
//! every sample lands in one of them. Everything else (reserved ranges,
//! device windows, ACPI tables) is resolved by scanning the full memory map.

use crate::iomem::{IoMem, PERSISTENT_MEMORY, SYSTEM_RAM};
use crate::range_table::RangeTable;
use serde::Serialize;
use std::fmt;

/// Label used for samples without a physical address or outside every region
pub const NOT_AVAILABLE: &str = "N/A";

/// Memory type of a physical address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum MemoryType {
    SystemRam,
    PersistentMemory,
    /// Any other memory map label, trimmed
    Other(String),
    NotAvailable,
}

impl MemoryType {
    /// Map a memory map label onto a memory type
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            SYSTEM_RAM => MemoryType::SystemRam,
            PERSISTENT_MEMORY => MemoryType::PersistentMemory,
            NOT_AVAILABLE => MemoryType::NotAvailable,
            other => MemoryType::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            MemoryType::SystemRam => SYSTEM_RAM,
            MemoryType::PersistentMemory => PERSISTENT_MEMORY,
            MemoryType::Other(label) => label,
            MemoryType::NotAvailable => NOT_AVAILABLE,
        }
    }
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl From<MemoryType> for String {
    fn from(memory_type: MemoryType) -> Self {
        memory_type.label().to_string()
    }
}

/// Resolves physical addresses against a parsed memory map
#[derive(Debug, Clone)]
pub struct Classifier {
    system_ram: RangeTable,
    pmem: RangeTable,
    iomem: IoMem,
}

impl Classifier {
    /// Build the fast-path tables from a memory map
    pub fn new(iomem: IoMem) -> Self {
        let system_ram = RangeTable::from_ranges(iomem.ranges_labeled(SYSTEM_RAM));
        let pmem = RangeTable::from_ranges(iomem.ranges_labeled(PERSISTENT_MEMORY));
        tracing::debug!(
            "Classifier ready: {} System RAM ranges, {} Persistent Memory ranges, {} regions total",
            system_ram.len(),
            pmem.len(),
            iomem.regions().len()
        );
        Self {
            system_ram,
            pmem,
            iomem,
        }
    }

    pub fn is_system_ram(&self, phys_addr: u64) -> bool {
        self.system_ram.contains(phys_addr)
    }

    pub fn is_persistent_mem(&self, phys_addr: u64) -> bool {
        self.pmem.contains(phys_addr)
    }

    /// Classify a physical address
    ///
    /// Address 0 means the sample carried no physical address and is always
    /// `N/A`. Addresses missing from both fast tables fall back to the first
    /// memory map entry that contains them.
    pub fn classify(&self, phys_addr: u64) -> MemoryType {
        if phys_addr == 0 {
            return MemoryType::NotAvailable;
        }
        if self.is_system_ram(phys_addr) {
            return MemoryType::SystemRam;
        }
        if self.is_persistent_mem(phys_addr) {
            return MemoryType::PersistentMemory;
        }

        // Slow path
        match self.iomem.find(phys_addr) {
            Some(region) => {
                tracing::debug!("{:#x} resolved by full scan: {}", phys_addr, region.label);
                MemoryType::from_label(&region.label)
            }
            None => MemoryType::NotAvailable,
        }
    }

    pub fn iomem(&self) -> &IoMem {
        &self.iomem
    }
}
