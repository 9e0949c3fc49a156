use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RecordId – the integer identity of one record file
// ---------------------------------------------------------------------------

/// Integer naming one record within a records directory.
///
/// The on-disk name is derived from it (see [`crate::store::naming`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Label columns
// ---------------------------------------------------------------------------

/// Name of the signal column plotted for every record.
pub const SIGNAL_COLUMN: &str = "V5";

/// How a label column is summarised for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// Shaded as contiguous active intervals.
    Interval,
    /// Drawn as individual markers.
    Peak,
}

/// The ECG wave a label belongs to. Interval and peak labels of the same
/// wave share a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Wave {
    P,
    Qrs,
    T,
}

impl Wave {
    pub const ALL: [Wave; 3] = [Wave::P, Wave::Qrs, Wave::T];
}

/// The fixed set of boolean-like label columns a record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LabelColumn {
    PWave,
    PPeak,
    QrsComplex,
    RPeak,
    TWave,
    TPeak,
}

impl LabelColumn {
    /// All label columns, in file/legend order.
    pub const ALL: [LabelColumn; 6] = [
        LabelColumn::PWave,
        LabelColumn::PPeak,
        LabelColumn::QrsComplex,
        LabelColumn::RPeak,
        LabelColumn::TWave,
        LabelColumn::TPeak,
    ];

    /// Header text of the column in a record file.
    pub fn column_name(self) -> &'static str {
        match self {
            LabelColumn::PWave => "P-wave",
            LabelColumn::PPeak => "P-peak",
            LabelColumn::QrsComplex => "QRS-complex",
            LabelColumn::RPeak => "R-peak",
            LabelColumn::TWave => "T-wave",
            LabelColumn::TPeak => "T-peak",
        }
    }

    pub fn kind(self) -> LabelKind {
        match self {
            LabelColumn::PWave | LabelColumn::QrsComplex | LabelColumn::TWave => {
                LabelKind::Interval
            }
            LabelColumn::PPeak | LabelColumn::RPeak | LabelColumn::TPeak => LabelKind::Peak,
        }
    }

    pub fn wave(self) -> Wave {
        match self {
            LabelColumn::PWave | LabelColumn::PPeak => Wave::P,
            LabelColumn::QrsComplex | LabelColumn::RPeak => Wave::Qrs,
            LabelColumn::TWave | LabelColumn::TPeak => Wave::T,
        }
    }
}

impl fmt::Display for LabelColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

// ---------------------------------------------------------------------------
// Record – the projection of one CSV file the reviewer cares about
// ---------------------------------------------------------------------------

/// One loaded record: the signal plus one activity mask per label column.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    /// Signal samples; empty or `nan` cells are NaN.
    pub signal: Vec<f64>,
    /// Label column → per-sample "nonzero" mask, same length as `signal`.
    pub labels: BTreeMap<LabelColumn, Vec<bool>>,
}

impl Record {
    /// The activity mask of a label column (empty if absent).
    pub fn mask(&self, column: LabelColumn) -> &[bool] {
        self.labels.get(&column).map(Vec::as_slice).unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Interval – an inclusive range of active samples
// ---------------------------------------------------------------------------

/// Closed, inclusive `[start, end]` range of sample indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    pub start: usize,
    pub end: usize,
}

impl Interval {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "interval start {start} after end {end}");
        Interval { start, end }
    }
}
