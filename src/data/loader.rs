use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};

use super::model::{LabelColumn, Record, RecordId, SIGNAL_COLUMN};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load one record file.
///
/// CSV layout: a header row, then one row per sample. The signal column
/// (`V5`) and every [`LabelColumn`] must be present; other columns are
/// ignored. Label cells are "active" when nonzero; empty or `nan` cells are
/// inactive.
pub fn load_record(path: &Path, id: RecordId) -> Result<Record> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let position = |name: &str| headers.iter().position(|h| h == name);

    let mut missing = Vec::new();
    let signal_idx = position(SIGNAL_COLUMN);
    if signal_idx.is_none() {
        missing.push(SIGNAL_COLUMN);
    }
    let mut label_idx = Vec::with_capacity(LabelColumn::ALL.len());
    for column in LabelColumn::ALL {
        match position(column.column_name()) {
            Some(idx) => label_idx.push((column, idx)),
            None => missing.push(column.column_name()),
        }
    }
    let Some(signal_idx) = signal_idx.filter(|_| missing.is_empty()) else {
        bail!("Missing columns: {missing:?}");
    };

    let mut signal = Vec::new();
    let mut labels: BTreeMap<LabelColumn, Vec<bool>> = LabelColumn::ALL
        .iter()
        .map(|&c| (c, Vec::new()))
        .collect();

    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("CSV row {row_no}"))?;

        signal.push(parse_signal_cell(
            row.get(signal_idx).unwrap_or(""),
            row_no,
        )?);

        for &(column, idx) in &label_idx {
            let active = parse_label_cell(row.get(idx).unwrap_or(""), row_no, column)?;
            labels.entry(column).or_default().push(active);
        }
    }

    Ok(Record { id, signal, labels })
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

fn is_missing(s: &str) -> bool {
    s.is_empty() || s.eq_ignore_ascii_case("nan")
}

fn parse_signal_cell(s: &str, row: usize) -> Result<f64> {
    let s = s.trim();
    if is_missing(s) {
        return Ok(f64::NAN);
    }
    s.parse::<f64>()
        .with_context(|| format!("Row {row}, {SIGNAL_COLUMN}: '{s}' is not a number"))
}

/// "Nonzero means active"; missing means inactive.
fn parse_label_cell(s: &str, row: usize, column: LabelColumn) -> Result<bool> {
    let s = s.trim();
    if is_missing(s) {
        return Ok(false);
    }
    if s.eq_ignore_ascii_case("true") {
        return Ok(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Ok(false);
    }
    let value = s
        .parse::<f64>()
        .with_context(|| format!("Row {row}, {column}: '{s}' is not a number"))?;
    Ok(value != 0.0)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const HEADER: &str = "V5,P-wave,P-peak,QRS-complex,R-peak,T-wave,T-peak";

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_load_valid_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "1.csv",
            &format!("{HEADER}\n0.5,1,0,0,0,0,0\n0.7,1,1,0,0,0,0\n-0.2,0,0,1,1,0,0\n"),
        );

        let record = load_record(&path, RecordId(1)).unwrap();
        assert_eq!(record.id, RecordId(1));
        assert_eq!(record.signal, vec![0.5, 0.7, -0.2]);
        assert_eq!(record.mask(LabelColumn::PWave), &[true, true, false]);
        assert_eq!(record.mask(LabelColumn::RPeak), &[false, false, true]);
    }

    #[test]
    fn test_missing_values_are_inactive() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "2.csv",
            &format!("{HEADER}\n,,nan,2.5,True,-1,\n"),
        );

        let record = load_record(&path, RecordId(2)).unwrap();
        assert!(record.signal[0].is_nan());
        assert_eq!(record.mask(LabelColumn::PWave), &[false]);
        assert_eq!(record.mask(LabelColumn::PPeak), &[false]);
        assert_eq!(record.mask(LabelColumn::QrsComplex), &[true]);
        assert_eq!(record.mask(LabelColumn::RPeak), &[true]);
        assert_eq!(record.mask(LabelColumn::TWave), &[true]);
        assert_eq!(record.mask(LabelColumn::TPeak), &[false]);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            "3.csv",
            &format!("index,{HEADER},note\n0,1.0,0,0,0,0,0,0,x\n"),
        );

        let record = load_record(&path, RecordId(3)).unwrap();
        assert_eq!(record.signal, vec![1.0]);
    }

    #[test]
    fn test_missing_column_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "4.csv", "V5,P-wave\n1.0,0\n");

        let err = load_record(&path, RecordId(4)).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Missing columns"));
        assert!(msg.contains("QRS-complex"));
    }

    #[test]
    fn test_non_numeric_label_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "5.csv", &format!("{HEADER}\n1.0,yes,0,0,0,0,0\n"));

        let err = load_record(&path, RecordId(5)).unwrap_err();
        assert!(format!("{err:#}").contains("P-wave"));
    }

    #[test]
    fn test_header_only_record_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "6.csv", &format!("{HEADER}\n"));

        let record = load_record(&path, RecordId(6)).unwrap();
        assert!(record.signal.is_empty());
    }
}
