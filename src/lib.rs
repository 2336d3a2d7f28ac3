//! memtype - resolve sampled physical addresses to memory types
//!
//! Builds fast lookup tables for System RAM and Persistent Memory from the
//! kernel's `/proc/iomem`, classifies physical-address samples from a tracing
//! session, and summarises how often each memory type was hit.

pub mod classifier;
pub mod cli;
pub mod csv_output;
pub mod event;
pub mod iomem;
pub mod json_output;
pub mod range_table;
pub mod session;
pub mod stats;
pub mod syscalls;
pub mod util;

pub use classifier::{Classifier, MemoryType};
pub use event::SampleEvent;
pub use iomem::{IoMem, MemoryRegion};
pub use range_table::RangeTable;
pub use session::Session;
