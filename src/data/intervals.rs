use super::model::{Interval, LabelColumn, LabelKind, Record};

// ---------------------------------------------------------------------------
// Mask → interval extraction
// ---------------------------------------------------------------------------

/// Convert a per-sample activity mask into maximal inclusive runs.
///
/// Single left-to-right scan: an inactive→active transition opens a run at
/// the current index, active→inactive closes it at the previous one, and a
/// run still open at the end closes at the last index. The result is
/// sorted by `start` and no two intervals touch.
pub fn extract(mask: &[bool]) -> Vec<Interval> {
    let mut runs = Vec::new();
    let mut open: Option<usize> = None;

    for (i, &active) in mask.iter().enumerate() {
        match (active, open) {
            (true, None) => open = Some(i),
            (false, Some(start)) => {
                runs.push(Interval::new(start, i - 1));
                open = None;
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        runs.push(Interval::new(start, mask.len() - 1));
    }
    runs
}

/// Indices of every active sample.
pub fn active_indices(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &active)| active.then_some(i))
        .collect()
}

// ---------------------------------------------------------------------------
// Per-record summary
// ---------------------------------------------------------------------------

/// Intervals of one interval-kind label column.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelIntervals {
    pub column: LabelColumn,
    pub intervals: Vec<Interval>,
}

/// Active sample indices of one peak-kind label column.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPeaks {
    pub column: LabelColumn,
    pub indices: Vec<usize>,
}

/// Everything the plot needs to overlay labels on a record.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelSummary {
    pub intervals: Vec<LabelIntervals>,
    pub peaks: Vec<LabelPeaks>,
}

/// Summarise every label column of a record, in [`LabelColumn::ALL`] order.
pub fn summarize(record: &Record) -> LabelSummary {
    let mut summary = LabelSummary::default();
    for column in LabelColumn::ALL {
        let mask = record.mask(column);
        match column.kind() {
            LabelKind::Interval => summary.intervals.push(LabelIntervals {
                column,
                intervals: extract(mask),
            }),
            LabelKind::Peak => summary.peaks.push(LabelPeaks {
                column,
                indices: active_indices(mask),
            }),
        }
    }
    summary
}
