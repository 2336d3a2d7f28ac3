//! Sorted boundary table for O(log n) address membership queries
//!
//! Ranges are flattened into `[start1, end1, start2, end2, ...]`. An address
//! is inside the table iff the number of boundaries `<= addr` is odd: it sits
//! after some start and before that range's end.

/// Flattened, sorted range boundaries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeTable {
    /// Alternating start / exclusive-end boundaries, non-decreasing
    bounds: Vec<u64>,
}

impl RangeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from closed `(start, end)` ranges
    ///
    /// Ranges are sorted by start and strictly overlapping ranges are merged,
    /// so the parity rule holds for any input. Adjacent ranges keep their own
    /// boundaries and produce duplicate values.
    pub fn from_ranges<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        let mut ranges: Vec<(u64, u64)> = ranges
            .into_iter()
            .filter(|(start, end)| start <= end)
            .map(|(start, end)| (start, end.saturating_add(1)))
            .collect();
        ranges.sort_unstable();

        let mut bounds: Vec<u64> = Vec::with_capacity(ranges.len() * 2);
        for (start, end) in ranges {
            match bounds.last_mut() {
                Some(last) if start < *last => {
                    if end > *last {
                        *last = end;
                    }
                }
                _ => {
                    bounds.push(start);
                    bounds.push(end);
                }
            }
        }

        Self { bounds }
    }

    /// Whether `addr` lies inside any range of the table
    pub fn contains(&self, addr: u64) -> bool {
        self.bounds.partition_point(|&b| b <= addr) % 2 == 1
    }

    /// Number of ranges in the table
    pub fn len(&self) -> usize {
        self.bounds.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn boundaries(&self) -> &[u64] {
        &self.bounds
    }
}

impl FromIterator<(u64, u64)> for RangeTable {
    fn from_iter<I: IntoIterator<Item = (u64, u64)>>(iter: I) -> Self {
        Self::from_ranges(iter)
    }
}
