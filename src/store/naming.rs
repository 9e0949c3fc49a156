use std::sync::LazyLock;

use regex::Regex;

use crate::data::model::RecordId;

// ---------------------------------------------------------------------------
// Identifier ↔ file name mapping
// ---------------------------------------------------------------------------

/// Subdirectory of the output path that holds the records.
pub const RECORDS_SUBDIR: &str = "pcb";

/// Subdirectory of the records directory that receives rejected records.
pub const QUARANTINE_SUBDIR: &str = "_rejected";

/// Prefix of the staging namespace used while renumbering.
pub const STAGED_PREFIX: &str = "__tmp__";

/// Renumber progress journal, present only while a renumber is in flight.
pub const JOURNAL_FILE: &str = "__renumber__.json";

/// Zero-padded names are accepted; `007.csv` is record 7.
static RECORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([0-9]+)\.csv$").expect("valid regex"));

static STAGED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^__tmp__([0-9]+)\.csv$").expect("valid regex"));

/// Classification of a directory entry name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryName {
    /// A reviewable record, `<id>.csv`.
    Record(RecordId),
    /// A record parked in the staging namespace, `__tmp__<id>.csv`.
    Staged(RecordId),
}

/// Name a record is stored under.
pub fn record_file_name(id: RecordId) -> String {
    format!("{id}.csv")
}

/// Name a record is parked under during renumbering.
pub fn staged_file_name(id: RecordId) -> String {
    format!("{STAGED_PREFIX}{id}.csv")
}

/// Name used in quarantine when `<id>.csv` is already taken there.
pub fn quarantine_alt_name(id: RecordId, attempt: u32) -> String {
    format!("{id}~{attempt}.csv")
}

/// Classify a file name; `None` for anything the reviewer must not touch.
pub fn parse_entry_name(name: &str) -> Option<EntryName> {
    if let Some(id) = capture_id(&RECORD_RE, name) {
        return Some(EntryName::Record(id));
    }
    capture_id(&STAGED_RE, name).map(EntryName::Staged)
}

fn capture_id(re: &Regex, name: &str) -> Option<RecordId> {
    let digits = re.captures(name)?.get(1)?.as_str();
    // Overflowing digit strings are simply not identifiers.
    digits.parse::<u64>().ok().map(RecordId)
}
