//! File relocation.
//!
//! A relocation is a move that never replaces an existing file. Within one
//! filesystem the document is hard-linked under its new name and the old
//! name removed; otherwise it is streamed into a freshly created file and the
//! source removed. Both steps fail with `AlreadyExists` instead of
//! overwriting, so a name taken by a concurrent move is detected at the
//! moment of the move, not before it. Destination name collisions follow
//! [`ConflictPolicy`].

use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Numbered candidates tried before falling back to a UUID suffix
const MAX_NUMBERED_CANDIDATES: usize = 1000;

/// Policy for handling destination conflicts during relocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ConflictPolicy {
    /// Generate unique name (_1, _2, etc.) and proceed
    #[default]
    #[value(name = "rename")]
    AutoRename,
    /// Leave the document where it is
    Skip,
    /// Report the collision as a relocation failure
    Fail,
}

/// Outcome of a single relocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocationOutcome {
    Moved(PathBuf),
    /// Moved under a generated name because the original was taken
    MovedWithRename(PathBuf),
    /// Destination existed and the policy said skip
    Skipped(PathBuf),
}

#[derive(Debug, Error)]
pub enum RelocationError {
    #[error("source not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error("source has no file name: {}", .0.display())]
    NoFileName(PathBuf),

    #[error("destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("failed to move {} to {}: {source}", from.display(), to.display())]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Move `source` into `dest_dir`, keeping its file name
pub fn relocate(
    source: &Path,
    dest_dir: &Path,
    policy: ConflictPolicy,
) -> Result<RelocationOutcome, RelocationError> {
    let file_name = source
        .file_name()
        .ok_or_else(|| RelocationError::NoFileName(source.to_path_buf()))?;
    let destination = dest_dir.join(file_name);

    if !source.exists() {
        return Err(RelocationError::SourceMissing(source.to_path_buf()));
    }

    if !dest_dir.is_dir() {
        fs::create_dir_all(dest_dir).map_err(|e| io_error(source, dest_dir, e))?;
    }

    match move_no_clobber(source, &destination) {
        Ok(()) => return Ok(RelocationOutcome::Moved(destination)),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
        Err(e) => return Err(io_error(source, &destination, e)),
    }

    // Destination exists - apply conflict policy
    match policy {
        ConflictPolicy::Skip => Ok(RelocationOutcome::Skipped(destination)),
        ConflictPolicy::Fail => Err(RelocationError::DestinationExists(destination)),
        ConflictPolicy::AutoRename => {
            for candidate in unique_candidates(&destination) {
                match move_no_clobber(source, &candidate) {
                    Ok(()) => return Ok(RelocationOutcome::MovedWithRename(candidate)),
                    // Taken since the last check, possibly by another worker
                    Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                    Err(e) => return Err(io_error(source, &candidate, e)),
                }
            }
            Err(RelocationError::DestinationExists(destination))
        }
    }
}

/// Candidate names `stem_1.ext` .. `stem_1000.ext`, then one UUID-suffixed name
fn unique_candidates(original: &Path) -> impl Iterator<Item = PathBuf> {
    let parent = original.parent().unwrap_or(Path::new(".")).to_path_buf();
    let stem = original
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());
    let ext = original
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let numbered = {
        let (parent, stem, ext) = (parent.clone(), stem.clone(), ext.clone());
        (1..=MAX_NUMBERED_CANDIDATES)
            .map(move |counter| parent.join(format!("{}_{}{}", stem, counter, ext)))
    };
    let fallback = std::iter::once_with(move || {
        parent.join(format!("{}_{}{}", stem, uuid::Uuid::new_v4(), ext))
    });

    numbered.chain(fallback)
}

/// Move `source` to `destination`, failing with `AlreadyExists` rather than
/// replacing a file that is already there
fn move_no_clobber(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::hard_link(source, destination) {
        Ok(()) => {
            if let Err(e) = fs::remove_file(source) {
                // Do not leave the document in two places
                let _ = fs::remove_file(destination);
                return Err(e);
            }
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(e),
        Err(link_err) => {
            tracing::debug!(
                error = %link_err,
                source = %source.display(),
                "[Relocate] Hard link failed, falling back to copy and remove"
            );
            copy_no_clobber(source, destination)?;
            if let Err(e) = fs::remove_file(source) {
                let _ = fs::remove_file(destination);
                return Err(e);
            }
            Ok(())
        }
    }
}

/// Stream `source` into a newly created `destination`
fn copy_no_clobber(source: &Path, destination: &Path) -> io::Result<()> {
    let mut reader = File::open(source)?;
    let mut writer = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)?;

    let copied = io::copy(&mut reader, &mut writer).and_then(|_| writer.sync_all());
    if let Err(e) = copied {
        // Only remove what this call created
        drop(writer);
        let _ = fs::remove_file(destination);
        return Err(e);
    }
    Ok(())
}

fn io_error(from: &Path, to: &Path, source: io::Error) -> RelocationError {
    RelocationError::Io {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_relocate_moves_file() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("doc.pdf");
        let dest_dir = dir.path().join("Programming/Python");
        fs::write(&source, "test content").unwrap();

        let outcome = relocate(&source, &dest_dir, ConflictPolicy::default()).unwrap();

        assert_eq!(outcome, RelocationOutcome::Moved(dest_dir.join("doc.pdf")));
        assert!(!source.exists());
        assert_eq!(fs::read_to_string(dest_dir.join("doc.pdf")).unwrap(), "test content");
    }

    #[test]
    fn test_relocate_auto_rename() {
        let dir = tempdir().unwrap();
        let dest_dir = dir.path().join("Others");
        fs::create_dir_all(&dest_dir).unwrap();
        fs::write(dest_dir.join("doc.pdf"), "old").unwrap();
        fs::write(dest_dir.join("doc_1.pdf"), "older").unwrap();

        let source = dir.path().join("doc.pdf");
        fs::write(&source, "new").unwrap();

        let outcome = relocate(&source, &dest_dir, ConflictPolicy::AutoRename).unwrap();

        assert_eq!(
            outcome,
            RelocationOutcome::MovedWithRename(dest_dir.join("doc_2.pdf"))
        );
        assert!(!source.exists());
        assert_eq!(fs::read_to_string(dest_dir.join("doc.pdf")).unwrap(), "old");
        assert_eq!(fs::read_to_string(dest_dir.join("doc_2.pdf")).unwrap(), "new");
    }

    #[test]
    fn test_relocate_skip_leaves_source() {
        let dir = tempdir().unwrap();
        let dest_dir = dir.path().join("Others");
        fs::create_dir_all(&dest_dir).unwrap();
        fs::write(dest_dir.join("doc.pdf"), "old").unwrap();

        let source = dir.path().join("doc.pdf");
        fs::write(&source, "new").unwrap();

        let outcome = relocate(&source, &dest_dir, ConflictPolicy::Skip).unwrap();

        assert_eq!(outcome, RelocationOutcome::Skipped(dest_dir.join("doc.pdf")));
        assert!(source.exists());
        assert_eq!(fs::read_to_string(dest_dir.join("doc.pdf")).unwrap(), "old");
    }

    #[test]
    fn test_relocate_fail_policy() {
        let dir = tempdir().unwrap();
        let dest_dir = dir.path().join("Others");
        fs::create_dir_all(&dest_dir).unwrap();
        fs::write(dest_dir.join("doc.pdf"), "old").unwrap();

        let source = dir.path().join("doc.pdf");
        fs::write(&source, "new").unwrap();

        let result = relocate(&source, &dest_dir, ConflictPolicy::Fail);
        assert!(matches!(result, Err(RelocationError::DestinationExists(_))));
        assert!(source.exists());
    }

    #[test]
    fn test_relocate_missing_source() {
        let dir = tempdir().unwrap();
        let result = relocate(
            &dir.path().join("gone.pdf"),
            &dir.path().join("Others"),
            ConflictPolicy::default(),
        );
        assert!(matches!(result, Err(RelocationError::SourceMissing(_))));
    }

    #[test]
    fn test_unique_candidates() {
        let dir = tempdir().unwrap();
        let mut candidates = unique_candidates(&dir.path().join("doc.pdf"));
        assert_eq!(candidates.next(), Some(dir.path().join("doc_1.pdf")));
        assert_eq!(candidates.next(), Some(dir.path().join("doc_2.pdf")));

        let mut candidates = unique_candidates(&dir.path().join("README"));
        assert_eq!(candidates.next(), Some(dir.path().join("README_1")));

        let all: Vec<PathBuf> = unique_candidates(&dir.path().join("doc.pdf")).collect();
        assert_eq!(all.len(), MAX_NUMBERED_CANDIDATES + 1);
        assert!(all[MAX_NUMBERED_CANDIDATES]
            .extension()
            .is_some_and(|e| e == "pdf"));
    }

    #[test]
    fn test_move_never_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("doc.pdf");
        let destination = dir.path().join("taken.pdf");
        fs::write(&source, "new").unwrap();
        fs::write(&destination, "existing").unwrap();

        let err = move_no_clobber(&source, &destination).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&source).unwrap(), "new");
        assert_eq!(fs::read_to_string(&destination).unwrap(), "existing");
    }

    #[test]
    fn test_copy_never_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("doc.pdf");
        let destination = dir.path().join("taken.pdf");
        fs::write(&source, "new").unwrap();
        fs::write(&destination, "existing").unwrap();

        let err = copy_no_clobber(&source, &destination).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(&destination).unwrap(), "existing");
    }

    #[test]
    fn test_copy_streams_content() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("doc.pdf");
        let destination = dir.path().join("copy.pdf");
        fs::write(&source, "content").unwrap();

        copy_no_clobber(&source, &destination).unwrap();

        assert_eq!(fs::read_to_string(&destination).unwrap(), "content");
        assert!(source.exists());
    }

    #[test]
    fn test_rename_candidate_taken_by_concurrent_move() {
        let dir = tempdir().unwrap();
        let dest_dir = dir.path().join("Others");
        fs::create_dir_all(&dest_dir).unwrap();
        fs::write(dest_dir.join("doc.pdf"), "earlier run").unwrap();

        let doc_a = dir.path().join("doc.pdf");
        let doc_b = dir.path().join("doc_1.pdf");
        fs::write(&doc_a, "A").unwrap();
        fs::write(&doc_b, "B").unwrap();

        // Worker A settles on doc_1.pdf as its new name
        let candidate = unique_candidates(&dest_dir.join("doc.pdf")).next().unwrap();
        assert_eq!(candidate, dest_dir.join("doc_1.pdf"));

        // Worker B moves its own doc_1.pdf in first
        let moved_b = relocate(&doc_b, &dest_dir, ConflictPolicy::AutoRename).unwrap();
        assert_eq!(moved_b, RelocationOutcome::Moved(dest_dir.join("doc_1.pdf")));

        // A's stale candidate is refused instead of overwriting B
        let err = move_no_clobber(&doc_a, &candidate).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(fs::read_to_string(dest_dir.join("doc_1.pdf")).unwrap(), "B");

        let moved_a = relocate(&doc_a, &dest_dir, ConflictPolicy::AutoRename).unwrap();
        assert_eq!(
            moved_a,
            RelocationOutcome::MovedWithRename(dest_dir.join("doc_2.pdf"))
        );

        assert_eq!(fs::read_dir(&dest_dir).unwrap().count(), 3);
        assert_eq!(fs::read_to_string(dest_dir.join("doc.pdf")).unwrap(), "earlier run");
        assert_eq!(fs::read_to_string(dest_dir.join("doc_1.pdf")).unwrap(), "B");
        assert_eq!(fs::read_to_string(dest_dir.join("doc_2.pdf")).unwrap(), "A");
    }
}
