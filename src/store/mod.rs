//! Record storage: listing, loading, quarantine and renumbering.
//!
//! Layout of a records directory:
//! ```text
//!  <output_path>/pcb/
//!     1.csv  2.csv  5.csv ...      records, named by identifier
//!     _rejected/                   quarantined records (created lazily)
//!     __tmp__<id>.csv              staged names, only during renumber
//!     __renumber__.json            renumber journal, only during renumber
//! ```
pub mod naming;
pub mod renumber;

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result as AnyResult};

use crate::data::loader::load_record;
use crate::data::model::{Record, RecordId};
use crate::error::{Result, ReviewError};
use naming::{EntryName, JOURNAL_FILE, QUARANTINE_SUBDIR, RECORDS_SUBDIR};

// ---------------------------------------------------------------------------
// RecordStore – what a review session needs from storage
// ---------------------------------------------------------------------------

/// Storage backend of one review session. The records directory (or
/// namespace) is bound when the store is created.
pub trait RecordStore {
    /// Where the records live, for messages.
    fn location(&self) -> PathBuf;

    /// Identifiers of every record, numerically ascending.
    fn list_candidates(&self) -> Result<Vec<RecordId>>;

    /// Load one record's content.
    fn load(&self, id: RecordId) -> Result<Record>;

    /// Move a record out of the review set without deleting it.
    fn quarantine(&mut self, id: RecordId) -> Result<()>;

    /// Reassign the surviving identifiers to `1..N`, keeping their order.
    /// Safe to re-run after an interrupted attempt.
    fn renumber(&mut self) -> Result<usize>;
}

// ---------------------------------------------------------------------------
// DirStore – records as files in a flat directory
// ---------------------------------------------------------------------------

/// A [`RecordStore`] over a directory of `<id>.csv` files.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Store over an explicit records directory.
    pub fn new(records_dir: impl Into<PathBuf>) -> Self {
        DirStore {
            dir: records_dir.into(),
        }
    }

    /// Store over `<output_path>/pcb`.
    pub fn for_output_path(output_path: &Path) -> Self {
        Self::new(output_path.join(RECORDS_SUBDIR))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn quarantine_dir(&self) -> PathBuf {
        self.dir.join(QUARANTINE_SUBDIR)
    }

    /// Actual path of a record; falls back to a scan for non-canonical
    /// names (`4.CSV`, `004.csv`).
    fn resolve(&self, id: RecordId) -> AnyResult<PathBuf> {
        let canonical = self.dir.join(naming::record_file_name(id));
        if canonical.is_file() {
            return Ok(canonical);
        }
        let listing = DirListing::read(&self.dir)?;
        let name = listing
            .records
            .get(&id)
            .with_context(|| format!("{} does not exist", canonical.display()))?;
        Ok(self.dir.join(name))
    }
}

impl RecordStore for DirStore {
    fn location(&self) -> PathBuf {
        self.dir.clone()
    }

    fn list_candidates(&self) -> Result<Vec<RecordId>> {
        if !self.dir.is_dir() {
            return Err(ReviewError::DirectoryNotFound(self.dir.clone()));
        }
        let mut listing = DirListing::read(&self.dir).map_err(ReviewError::Listing)?;
        if let Some((id, first, second)) = listing.duplicate {
            return Err(ReviewError::DuplicateIdentifier { id, first, second });
        }
        // Staged records are invisible to review; finish the old run first.
        if !listing.staged.is_empty() || self.dir.join(JOURNAL_FILE).exists() {
            log::warn!(
                "Completing an interrupted renumber in {} ({} staged file(s))",
                self.dir.display(),
                listing.staged.len()
            );
            renumber::renumber_dir(&self.dir).map_err(ReviewError::Renumber)?;
            listing = DirListing::read(&self.dir).map_err(ReviewError::Listing)?;
        }
        Ok(listing.records.into_keys().collect())
    }

    fn load(&self, id: RecordId) -> Result<Record> {
        self.resolve(id)
            .and_then(|path| load_record(&path, id))
            .map_err(|cause| ReviewError::RecordRead { id, cause })
    }

    fn quarantine(&mut self, id: RecordId) -> Result<()> {
        let quarantine = || -> AnyResult<PathBuf> {
            let src = self.resolve(id)?;
            let dest_dir = self.quarantine_dir();
            fs::create_dir_all(&dest_dir)
                .with_context(|| format!("failed to create {}", dest_dir.display()))?;
            let dest = free_quarantine_path(&dest_dir, &src, id)?;
            move_file(&src, &dest)?;
            Ok(dest)
        };
        match quarantine() {
            Ok(dest) => {
                log::info!("Rejected {id}.csv → {}", dest.display());
                Ok(())
            }
            Err(cause) => Err(ReviewError::Quarantine { id, cause }),
        }
    }

    fn renumber(&mut self) -> Result<usize> {
        renumber::renumber_dir(&self.dir)
            .map(|report| report.count)
            .map_err(ReviewError::Renumber)
    }
}

// ---------------------------------------------------------------------------
// Directory scan
// ---------------------------------------------------------------------------

/// Entries of a records directory the reviewer cares about.
#[derive(Debug, Default)]
pub(crate) struct DirListing {
    /// Identifier → actual file name.
    pub records: BTreeMap<RecordId, String>,
    pub staged: BTreeMap<RecordId, String>,
    /// First identifier found under two names.
    pub duplicate: Option<(RecordId, String, String)>,
}

impl DirListing {
    pub fn read(dir: &Path) -> AnyResult<Self> {
        let mut listing = DirListing::default();
        let entries =
            fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;

        for entry in entries {
            let entry = entry.with_context(|| format!("failed to read {}", dir.display()))?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            // Non-UTF-8 names cannot match the patterns.
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let (map, id) = match naming::parse_entry_name(&name) {
                Some(EntryName::Record(id)) => (&mut listing.records, id),
                Some(EntryName::Staged(id)) => (&mut listing.staged, id),
                None => continue,
            };
            if let Some(previous) = map.insert(id, name.clone()) {
                if listing.duplicate.is_none() {
                    let (first, second) = if previous < name {
                        (previous, name)
                    } else {
                        (name, previous)
                    };
                    listing.duplicate = Some((id, first, second));
                }
            }
        }
        Ok(listing)
    }
}

// ---------------------------------------------------------------------------
// File moves
// ---------------------------------------------------------------------------

/// `dest_dir/<original name>`, or `<id>~<k>.csv` if that is taken.
fn free_quarantine_path(dest_dir: &Path, src: &Path, id: RecordId) -> AnyResult<PathBuf> {
    let file_name = src
        .file_name()
        .with_context(|| format!("{} has no file name", src.display()))?;
    let dest = dest_dir.join(file_name);
    if !dest.exists() {
        return Ok(dest);
    }
    (1..=u32::MAX)
        .map(|k| dest_dir.join(naming::quarantine_alt_name(id, k)))
        .find(|p| !p.exists())
        .context("no free name left in quarantine")
}

/// Rename, falling back to copy + delete across devices.
fn move_file(from: &Path, to: &Path) -> AnyResult<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err)
            if matches!(
                rename_err.kind(),
                ErrorKind::CrossesDevices | ErrorKind::PermissionDenied
            ) =>
        {
            log::warn!(
                "Atomic move of {} failed ({rename_err}); copying instead",
                from.display()
            );
            copy_then_remove(from, to)
        }
        Err(rename_err) => Err(rename_err)
            .with_context(|| format!("failed to move {} to {}", from.display(), to.display())),
    }
}

/// Copy `from` to `to`, then delete `from`. If the delete fails the copy is
/// removed again so only the original remains.
fn copy_then_remove(from: &Path, to: &Path) -> AnyResult<()> {
    fs::copy(from, to)
        .with_context(|| format!("failed to copy {} to {}", from.display(), to.display()))?;
    if let Err(remove_err) = fs::remove_file(from) {
        if let Err(e) = fs::remove_file(to) {
            log::warn!(
                "Could not roll back copy {} ({e}); {} is now present twice",
                to.display(),
                from.display()
            );
        }
        return Err(remove_err).with_context(|| format!("failed to remove {}", from.display()));
    }
    Ok(())
}
