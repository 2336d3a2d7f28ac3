//! Property-based tests for memory map parsing and classification

use memtype::classifier::{Classifier, MemoryType};
use memtype::iomem::{IoMem, MemoryRegion};
use memtype::range_table::RangeTable;
use memtype::stats::ClassificationCounts;
use proptest::prelude::*;

/// Disjoint, sorted, non-adjacent `(start, end)` ranges above zero
fn disjoint_ranges() -> impl Strategy<Value = Vec<(u64, u64)>> {
    prop::collection::vec((1u64..0x10_0000, 1u64..0x10_0000), 1..12).prop_map(|pairs| {
        let mut next = 0x1000u64;
        pairs
            .into_iter()
            .map(|(gap, len)| {
                let start = next + gap;
                let end = start + len;
                next = end + 1;
                (start, end)
            })
            .collect()
    })
}

fn iomem_text(ranges: &[(u64, u64)], labels: &[&str]) -> String {
    ranges
        .iter()
        .enumerate()
        .map(|(i, (s, e))| format!("{:08x}-{:08x} : {}\n", s, e, labels[i % labels.len()]))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_addresses_inside_system_ram_classify_as_system_ram(
        ranges in disjoint_ranges(),
        pick in any::<prop::sample::Index>(),
        offset in any::<u64>(),
    ) {
        let classifier = Classifier::new(IoMem::parse(&iomem_text(&ranges, &["System RAM"])));
        let (start, end) = ranges[pick.index(ranges.len())];
        let addr = start + offset % (end - start + 1);
        prop_assert_eq!(classifier.classify(addr), MemoryType::SystemRam);
    }

    #[test]
    fn prop_boundaries_are_inclusive(ranges in disjoint_ranges()) {
        let classifier = Classifier::new(IoMem::parse(&iomem_text(&ranges, &["System RAM", "Reserved"])));
        for (i, &(start, end)) in ranges.iter().enumerate() {
            let expected = MemoryType::from_label(if i % 2 == 0 { "System RAM" } else { "Reserved" });
            prop_assert_eq!(classifier.classify(start), expected.clone());
            prop_assert_eq!(classifier.classify(end), expected);
        }
    }

    #[test]
    fn prop_gap_addresses_never_take_a_neighbours_label(ranges in disjoint_ranges()) {
        let classifier = Classifier::new(IoMem::parse(&iomem_text(
            &ranges,
            &["System RAM", "Persistent Memory", "Reserved"],
        )));
        for pair in ranges.windows(2) {
            let (_, prev_end) = pair[0];
            let (next_start, _) = pair[1];
            for addr in [prev_end + 1, next_start - 1] {
                prop_assert_eq!(classifier.classify(addr), MemoryType::NotAvailable);
            }
        }
    }

    #[test]
    fn prop_zero_is_always_not_available(text in "[0-9a-f]{1,8}-[0-9a-f]{1,8} : [A-Za-z ]{1,20}\n") {
        let classifier = Classifier::new(IoMem::parse(&text));
        prop_assert_eq!(classifier.classify(0), MemoryType::NotAvailable);
    }

    #[test]
    fn prop_classify_is_idempotent(ranges in disjoint_ranges(), addr in any::<u64>()) {
        let classifier = Classifier::new(IoMem::parse(&iomem_text(&ranges, &["System RAM", "ACPI Tables"])));
        prop_assert_eq!(classifier.classify(addr), classifier.classify(addr));
    }

    #[test]
    fn prop_range_table_matches_linear_scan(
        ranges in prop::collection::vec((0u64..0x1000, 0u64..0x100), 0..10),
        addr in 0u64..0x1200,
    ) {
        let ranges: Vec<(u64, u64)> = ranges.into_iter().map(|(s, len)| (s, s + len)).collect();
        let table = RangeTable::from_ranges(ranges.iter().copied());
        let expected = ranges.iter().any(|&(s, e)| s <= addr && addr <= e);
        prop_assert_eq!(table.contains(addr), expected);
    }

    #[test]
    fn prop_parser_never_panics(text in "\\PC{0,200}") {
        let iomem = IoMem::parse(&text);
        for region in iomem.regions() {
            prop_assert!(region.start <= region.end);
            prop_assert_eq!(region.label.trim(), region.label.as_str());
        }
    }

    #[test]
    fn prop_parse_line_reads_back_formatted_region(start in any::<u64>(), len in any::<u64>()) {
        let end = start.saturating_add(len);
        let line = format!("{:x}-{:x} : Persistent Memory", start, end);
        let region = MemoryRegion::parse_line(&line).unwrap();
        prop_assert_eq!(region, MemoryRegion::new(start, end, "Persistent Memory"));
    }

    #[test]
    fn prop_rows_sorted_and_percentages_sum_to_100(
        labels in prop::collection::vec("[A-Z][a-z]{0,6}", 1..50),
    ) {
        let mut counts = ClassificationCounts::new();
        for label in &labels {
            counts.record_label(label);
        }
        let rows = counts.rows();
        for pair in rows.windows(2) {
            prop_assert!(
                pair[0].count > pair[1].count
                    || (pair[0].count == pair[1].count && pair[0].memory_type > pair[1].memory_type)
            );
        }
        let sum: f64 = rows.iter().map(|r| r.percentage).sum();
        prop_assert!((sum - 100.0).abs() < 1e-6);
        prop_assert_eq!(counts.total(), labels.len() as u64);
    }
}
