//! Row window arithmetic for head/tail reads and split partitioning

use crate::{PqError, Result};

/// Half-open range `[start, start + len)` of row indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    pub start: u64,
    pub len: u64,
}

impl RowWindow {
    pub fn new(start: u64, len: u64) -> Self {
        Self { start, len }
    }

    /// The first `n` rows of a file with `total` rows
    pub fn head(n: u64, total: u64) -> Self {
        Self::new(0, n.min(total))
    }

    /// The last `n` rows of a file with `total` rows
    pub fn tail(n: u64, total: u64) -> Self {
        let len = n.min(total);
        Self::new(total - len, len)
    }

    /// Every row of a file with `total` rows
    pub fn all(total: u64) -> Self {
        Self::new(0, total)
    }

    /// One past the last row of the window
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Restrict the window to `[0, total)`
    pub fn clamp(&self, total: u64) -> Self {
        let start = self.start.min(total);
        let end = self.end().min(total);
        Self::new(start, end - start)
    }
}

/// Contiguous near-equal windows covering `[0, total_rows)` exactly once
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    rows_per_part: u64,
    windows: Vec<RowWindow>,
}

impl PartitionPlan {
    /// Plan `parts` windows of `ceil(total_rows / parts)` rows each.
    ///
    /// Windows that would start at or past `total_rows` are dropped, so a
    /// plan over fewer rows than `parts` has fewer windows.
    pub fn new(total_rows: u64, parts: u64) -> Result<Self> {
        if parts == 0 {
            return Err(PqError::invalid_argument(
                "number of output files must be at least 1",
            ));
        }

        let rows_per_part = total_rows.div_ceil(parts);
        let mut windows = Vec::new();
        if rows_per_part > 0 {
            let mut start = 0;
            while start < total_rows && (windows.len() as u64) < parts {
                let len = rows_per_part.min(total_rows - start);
                windows.push(RowWindow::new(start, len));
                start += len;
            }
        }

        Ok(Self {
            rows_per_part,
            windows,
        })
    }

    pub fn rows_per_part(&self) -> u64 {
        self.rows_per_part
    }

    pub fn windows(&self) -> &[RowWindow] {
        &self.windows
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn total_rows(&self) -> u64 {
        self.windows.iter().map(|w| w.len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(plan: &PartitionPlan) -> Vec<u64> {
        plan.windows().iter().map(|w| w.len).collect()
    }

    #[test]
    fn test_head_and_tail_clamp() {
        assert_eq!(RowWindow::head(1000, 100), RowWindow::new(0, 100));
        assert_eq!(RowWindow::head(0, 100), RowWindow::new(0, 0));
        assert_eq!(RowWindow::tail(10, 100), RowWindow::new(90, 10));
        assert_eq!(RowWindow::tail(1000, 100), RowWindow::new(0, 100));
        assert_eq!(RowWindow::tail(5, 0), RowWindow::new(0, 0));
    }

    #[test]
    fn test_clamp_never_exceeds_total() {
        assert_eq!(RowWindow::new(95, 10).clamp(100), RowWindow::new(95, 5));
        assert_eq!(RowWindow::new(150, 10).clamp(100), RowWindow::new(100, 0));
        assert_eq!(RowWindow::new(u64::MAX, 10).clamp(100), RowWindow::new(100, 0));
        assert!(RowWindow::new(3, 0).is_empty());
    }

    #[test]
    fn test_hundred_rows_into_three() {
        let plan = PartitionPlan::new(100, 3).unwrap();
        assert_eq!(plan.rows_per_part(), 34);
        assert_eq!(sizes(&plan), vec![34, 33, 33]);
        assert_eq!(plan.windows()[1], RowWindow::new(34, 33));
        assert_eq!(plan.windows()[2], RowWindow::new(67, 33));
    }

    #[test]
    fn test_hundred_rows_into_two() {
        let plan = PartitionPlan::new(100, 2).unwrap();
        assert_eq!(sizes(&plan), vec![50, 50]);
    }

    #[test]
    fn test_more_parts_than_rows_drops_empty_windows() {
        let plan = PartitionPlan::new(3, 5).unwrap();
        assert_eq!(sizes(&plan), vec![1, 1, 1]);
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn test_uneven_tail_can_leave_fewer_parts() {
        // ceil(10 / 4) = 3 → 3, 3, 3, 1
        let plan = PartitionPlan::new(10, 4).unwrap();
        assert_eq!(sizes(&plan), vec![3, 3, 3, 1]);

        // ceil(9 / 6) = 2 → only five windows are needed
        let plan = PartitionPlan::new(9, 6).unwrap();
        assert_eq!(sizes(&plan), vec![2, 2, 2, 2, 1]);
    }

    #[test]
    fn test_windows_are_contiguous_and_cover_everything() {
        for total in [1u64, 7, 64, 1000, 1001] {
            for parts in 1..=12u64 {
                let plan = PartitionPlan::new(total, parts).unwrap();
                assert_eq!(plan.total_rows(), total);
                assert!(plan.len() as u64 <= parts);
                let mut next = 0;
                for window in plan.windows() {
                    assert_eq!(window.start, next);
                    assert!(!window.is_empty());
                    next = window.end();
                }
                assert_eq!(next, total);
            }
        }
    }

    #[test]
    fn test_zero_parts_rejected() {
        assert!(matches!(
            PartitionPlan::new(10, 0),
            Err(PqError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_empty_total_has_no_windows() {
        let plan = PartitionPlan::new(0, 3).unwrap();
        assert!(plan.is_empty());
    }
}
