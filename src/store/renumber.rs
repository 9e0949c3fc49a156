//! Gap-free renumbering of the records left in a directory.
//!
//! Survivors `a₁ < a₂ < … < a_N` become `1.csv … N.csv` in two phases:
//!
//! 1. **stage** – every `<aᵢ>.csv` is renamed to `__tmp__<aᵢ>.csv`. The
//!    staged namespace never matches a record name, so nothing in `1..N`
//!    stays occupied and no two files collide.
//! 2. **commit** – staged files are renamed, in ascending `aᵢ`, to `i.csv`.
//!
//! A journal (`__renumber__.json`) records the plan and the current phase so
//! an interrupted run can be told apart from a fresh one and completed by
//! simply running it again. A rename never overwrites an existing file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use super::naming::{record_file_name, staged_file_name, JOURNAL_FILE};
use super::DirListing;
use crate::data::model::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Phase {
    /// Plain record names are all still original identifiers.
    Staging,
    /// Every survivor is staged or already carries its final name.
    Committing,
}

#[derive(Debug, Serialize, Deserialize)]
struct Journal {
    phase: Phase,
    /// Original identifiers, ascending; position `i` becomes `i + 1`.
    order: Vec<RecordId>,
}

/// Outcome of one renumber run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenumberReport {
    /// Number of records now named `1..=count`.
    pub count: usize,
    /// File renames performed by this run.
    pub renamed: usize,
}

/// Renumber the records in `dir` to `1..N`, resuming an interrupted run.
pub fn renumber_dir(dir: &Path) -> Result<RenumberReport> {
    let listing = DirListing::read(dir)?;
    if let Some((id, first, second)) = &listing.duplicate {
        bail!("identifier {id} is claimed by both {first} and {second}");
    }

    let journal_path = dir.join(JOURNAL_FILE);
    let mut renamed = 0;

    let order = match read_journal(&journal_path)? {
        None if listing.staged.is_empty() => {
            let order: Vec<RecordId> = listing.records.keys().copied().collect();
            if order.is_empty() {
                log::info!("Nothing to renumber in {}", dir.display());
                return Ok(RenumberReport { count: 0, renamed: 0 });
            }
            if is_compact(&listing.records) {
                log::info!(
                    "{} record(s) in {} already numbered 1..{}",
                    order.len(),
                    dir.display(),
                    order.len()
                );
                return Ok(RenumberReport {
                    count: order.len(),
                    renamed: 0,
                });
            }
            renamed += stage(dir, &journal_path, order.clone(), &listing)?;
            order
        }
        None if listing.records.is_empty() => {
            log::warn!(
                "Found {} staged file(s) without a journal in {}; committing them in identifier order",
                listing.staged.len(),
                dir.display()
            );
            let order: Vec<RecordId> = listing.staged.keys().copied().collect();
            write_journal(
                &journal_path,
                &Journal {
                    phase: Phase::Committing,
                    order: order.clone(),
                },
            )?;
            order
        }
        None => bail!(
            "{} holds both staged and numbered records but no renumber journal; \
             refusing to guess their order",
            dir.display()
        ),
        Some(journal) if journal.phase == Phase::Staging => {
            log::warn!("Resuming interrupted renumber (staging) in {}", dir.display());
            let mut order: Vec<RecordId> = listing
                .records
                .keys()
                .chain(listing.staged.keys())
                .copied()
                .collect();
            order.sort();
            order.dedup();
            renamed += stage(dir, &journal_path, order.clone(), &listing)?;
            order
        }
        Some(journal) => {
            log::warn!("Resuming interrupted renumber (commit) in {}", dir.display());
            journal.order
        }
    };

    renamed += commit(dir, &order)?;

    fs::remove_file(&journal_path)
        .with_context(|| format!("failed to remove {}", journal_path.display()))?;

    log::info!(
        "Renumbered {} record(s) in {} ({renamed} rename(s))",
        order.len(),
        dir.display()
    );
    Ok(RenumberReport {
        count: order.len(),
        renamed,
    })
}

/// Survivors are exactly `1..=N` already, under their canonical names.
fn is_compact(records: &BTreeMap<RecordId, String>) -> bool {
    records
        .iter()
        .enumerate()
        .all(|(i, (id, name))| id.0 == i as u64 + 1 && *name == record_file_name(*id))
}

/// Phase 1: park every not-yet-staged survivor under its staged name.
fn stage(dir: &Path, journal_path: &Path, order: Vec<RecordId>, listing: &DirListing) -> Result<usize> {
    let mut journal = Journal {
        phase: Phase::Staging,
        order,
    };
    write_journal(journal_path, &journal)?;

    let mut renamed = 0;
    for id in &journal.order {
        let Some(name) = listing.records.get(id) else {
            continue; // staged by an earlier run
        };
        if listing.staged.contains_key(id) {
            bail!(
                "{id} exists both as {name} and as {}",
                staged_file_name(*id)
            );
        }
        rename_no_clobber(&dir.join(name), &dir.join(staged_file_name(*id)))?;
        renamed += 1;
    }

    journal.phase = Phase::Committing;
    write_journal(journal_path, &journal)?;
    Ok(renamed)
}

/// Phase 2: move staged files onto `1..N` in plan order.
fn commit(dir: &Path, order: &[RecordId]) -> Result<usize> {
    let listing = DirListing::read(dir)?;

    let mut renamed = 0;
    for (position, id) in order.iter().enumerate() {
        let target = RecordId(position as u64 + 1);
        match listing.staged.get(id) {
            Some(staged) => {
                rename_no_clobber(&dir.join(staged), &dir.join(record_file_name(target)))?;
                renamed += 1;
            }
            // Committed before the interruption.
            None if listing.records.contains_key(&target) => {}
            None => bail!(
                "{} is missing and {} was never committed",
                staged_file_name(*id),
                record_file_name(target)
            ),
        }
    }
    Ok(renamed)
}

fn rename_no_clobber(from: &Path, to: &Path) -> Result<()> {
    if to.exists() {
        bail!(
            "refusing to rename {} over existing {}",
            from.display(),
            to.display()
        );
    }
    fs::rename(from, to)
        .with_context(|| format!("failed to rename {} to {}", from.display(), to.display()))?;
    log::debug!("{} → {}", from.display(), to.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Journal I/O
// ---------------------------------------------------------------------------

fn read_journal(path: &Path) -> Result<Option<Journal>> {
    if !path.exists() {
        return Ok(None);
    }
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let journal = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(Some(journal))
}

/// Write-then-rename so a crash never leaves a half-written journal.
fn write_journal(path: &Path, journal: &Journal) -> Result<()> {
    let tmp: PathBuf = path.with_extension("json.tmp");
    let text = serde_json::to_string_pretty(journal).context("serializing renumber journal")?;
    fs::write(&tmp, text).with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("failed to replace {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    fn read(dir: &Path, name: &str) -> String {
        fs::read_to_string(dir.join(name)).unwrap()
    }

    /// Every file name in `dir`, sorted.
    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    fn journal(dir: &Path, phase: Phase, order: &[u64]) {
        let journal = Journal {
            phase,
            order: order.iter().copied().map(RecordId).collect(),
        };
        write_journal(&dir.join(JOURNAL_FILE), &journal).unwrap();
    }

    #[test]
    fn test_renumber_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        for id in [2, 5, 7] {
            touch(dir.path(), &format!("{id}.csv"), &format!("was {id}"));
        }

        let report = renumber_dir(dir.path()).unwrap();
        assert_eq!(report, RenumberReport { count: 3, renamed: 6 });
        assert_eq!(names(dir.path()), vec!["1.csv", "2.csv", "3.csv"]);
        assert_eq!(read(dir.path(), "1.csv"), "was 2");
        assert_eq!(read(dir.path(), "2.csv"), "was 5");
        assert_eq!(read(dir.path(), "3.csv"), "was 7");
    }

    #[test]
    fn test_renumber_zero_padded_names() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["001.csv", "002.csv", "010.csv"] {
            touch(dir.path(), name, &format!("was {name}"));
        }

        let report = renumber_dir(dir.path()).unwrap();
        assert_eq!(report, RenumberReport { count: 3, renamed: 6 });
        assert_eq!(names(dir.path()), vec!["1.csv", "2.csv", "3.csv"]);
        assert_eq!(read(dir.path(), "1.csv"), "was 001.csv");
        assert_eq!(read(dir.path(), "2.csv"), "was 002.csv");
        assert_eq!(read(dir.path(), "3.csv"), "was 010.csv");
    }

    #[test]
    fn test_compact_but_padded_names_are_canonicalised() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "01.csv", "one");
        touch(dir.path(), "2.csv", "two");

        let report = renumber_dir(dir.path()).unwrap();
        assert_eq!(report.count, 2);
        assert_eq!(names(dir.path()), vec!["1.csv", "2.csv"]);
        assert_eq!(read(dir.path(), "1.csv"), "one");
    }

    #[test]
    fn test_renumber_overlapping_targets() {
        // 2→1, 3→2, 10→3: each target is a survivor's current name.
        let dir = tempfile::tempdir().unwrap();
        for id in [2, 3, 10] {
            touch(dir.path(), &format!("{id}.csv"), &format!("was {id}"));
        }

        renumber_dir(dir.path()).unwrap();
        assert_eq!(read(dir.path(), "1.csv"), "was 2");
        assert_eq!(read(dir.path(), "2.csv"), "was 3");
        assert_eq!(read(dir.path(), "3.csv"), "was 10");
    }

    #[test]
    fn test_renumber_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("_rejected")).unwrap();

        let report = renumber_dir(dir.path()).unwrap();
        assert_eq!(report.count, 0);
        assert_eq!(names(dir.path()), vec!["_rejected"]);
    }

    #[test]
    fn test_renumber_leaves_other_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "4.csv", "four");
        touch(dir.path(), "notes.txt", "keep me");
        touch(dir.path(), "draft_7.csv", "not an identifier");

        renumber_dir(dir.path()).unwrap();
        assert_eq!(names(dir.path()), vec!["1.csv", "draft_7.csv", "notes.txt"]);
        assert_eq!(read(dir.path(), "notes.txt"), "keep me");
    }

    #[test]
    fn test_renumber_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        for id in [4, 9] {
            touch(dir.path(), &format!("{id}.csv"), &format!("was {id}"));
        }

        renumber_dir(dir.path()).unwrap();
        let second = renumber_dir(dir.path()).unwrap();
        assert_eq!(second, RenumberReport { count: 2, renamed: 0 });
        assert_eq!(read(dir.path(), "1.csv"), "was 4");
        assert_eq!(read(dir.path(), "2.csv"), "was 9");
    }

    #[test]
    fn test_resume_interrupted_staging() {
        // Survivors {3, 6, 8}; the first was staged before the crash.
        let dir = tempfile::tempdir().unwrap();
        journal(dir.path(), Phase::Staging, &[3, 6, 8]);
        touch(dir.path(), "__tmp__3.csv", "was 3");
        touch(dir.path(), "6.csv", "was 6");
        touch(dir.path(), "8.csv", "was 8");

        let report = renumber_dir(dir.path()).unwrap();
        assert_eq!(report.count, 3);
        assert_eq!(names(dir.path()), vec!["1.csv", "2.csv", "3.csv"]);
        assert_eq!(read(dir.path(), "1.csv"), "was 3");
        assert_eq!(read(dir.path(), "2.csv"), "was 6");
        assert_eq!(read(dir.path(), "3.csv"), "was 8");
    }

    #[test]
    fn test_resume_interrupted_commit() {
        // Survivors {4, 5, 9}; 4→1 was committed before the crash.
        let dir = tempfile::tempdir().unwrap();
        journal(dir.path(), Phase::Committing, &[4, 5, 9]);
        touch(dir.path(), "1.csv", "was 4");
        touch(dir.path(), "__tmp__5.csv", "was 5");
        touch(dir.path(), "__tmp__9.csv", "was 9");

        let report = renumber_dir(dir.path()).unwrap();
        assert_eq!(report, RenumberReport { count: 3, renamed: 2 });
        assert_eq!(names(dir.path()), vec!["1.csv", "2.csv", "3.csv"]);
        assert_eq!(read(dir.path(), "1.csv"), "was 4");
        assert_eq!(read(dir.path(), "2.csv"), "was 5");
        assert_eq!(read(dir.path(), "3.csv"), "was 9");
    }

    #[test]
    fn test_resume_commit_with_small_staged_identifier() {
        // 1.csv is the committed final of 0, not the original 1.
        let dir = tempfile::tempdir().unwrap();
        journal(dir.path(), Phase::Committing, &[0, 1]);
        touch(dir.path(), "1.csv", "was 0");
        touch(dir.path(), "__tmp__1.csv", "was 1");

        renumber_dir(dir.path()).unwrap();
        assert_eq!(read(dir.path(), "1.csv"), "was 0");
        assert_eq!(read(dir.path(), "2.csv"), "was 1");
    }

    #[test]
    fn test_orphan_staged_files_are_committed() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "__tmp__12.csv", "was 12");
        touch(dir.path(), "__tmp__3.csv", "was 3");

        let report = renumber_dir(dir.path()).unwrap();
        assert_eq!(report.count, 2);
        assert_eq!(names(dir.path()), vec!["1.csv", "2.csv"]);
        assert_eq!(read(dir.path(), "1.csv"), "was 3");
        assert_eq!(read(dir.path(), "2.csv"), "was 12");
    }

    #[test]
    fn test_unjournaled_mix_is_refused_untouched() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "1.csv", "one");
        touch(dir.path(), "__tmp__5.csv", "five");

        assert!(renumber_dir(dir.path()).is_err());
        assert_eq!(names(dir.path()), vec!["1.csv", "__tmp__5.csv"]);
    }

    #[test]
    fn test_commit_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        // Journal says 7 goes to 1, but a stray 1.csv appeared meanwhile.
        journal(dir.path(), Phase::Committing, &[7]);
        touch(dir.path(), "__tmp__7.csv", "was 7");
        touch(dir.path(), "1.csv", "stray");

        assert!(renumber_dir(dir.path()).is_err());
        assert_eq!(read(dir.path(), "1.csv"), "stray");
        assert_eq!(read(dir.path(), "__tmp__7.csv"), "was 7");
    }

    #[test]
    fn test_missing_committed_record_is_error() {
        let dir = tempfile::tempdir().unwrap();
        journal(dir.path(), Phase::Committing, &[2, 8]);
        touch(dir.path(), "__tmp__8.csv", "was 8");

        assert!(renumber_dir(dir.path()).is_err());
        assert!(dir.path().join(JOURNAL_FILE).exists());
    }
}
