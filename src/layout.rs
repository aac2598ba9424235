//! Destination layout under the sort root.
//!
//! `root/<category>/<subcategory>/` for every taxonomy pair plus
//! `root/Others/`. Setup is idempotent and must complete before any
//! document is dispatched.

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Result, SortError};
use crate::taxonomy::{Taxonomy, OTHERS};

/// Check that the root exists and is a directory
pub fn validate_root(root: &Path) -> Result<()> {
    if !root.exists() {
        return Err(SortError::InvalidRoot {
            path: root.to_path_buf(),
            reason: "path does not exist".to_string(),
        });
    }
    if !root.is_dir() {
        return Err(SortError::InvalidRoot {
            path: root.to_path_buf(),
            reason: "path is not a directory".to_string(),
        });
    }
    Ok(())
}

/// Create every destination directory; existing ones are left untouched
pub fn create_directories(root: &Path, taxonomy: &Taxonomy) -> Result<Vec<PathBuf>> {
    let mut created = Vec::with_capacity(taxonomy.pair_count() + 1);

    let dirs = taxonomy
        .pairs()
        .map(|(category, sub)| root.join(&category.name).join(&sub.name))
        .chain(std::iter::once(root.join(OTHERS)));

    for dir in dirs {
        fs::create_dir_all(&dir).map_err(|source| SortError::Io {
            path: dir.clone(),
            source,
        })?;
        created.push(dir);
    }

    tracing::debug!(directories = created.len(), "[Layout] Destination layout ready");
    Ok(created)
}

/// Case-insensitive extension match; `ext` is given without the dot
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Documents directly inside `root` with the given extension, sorted by path.
///
/// Subdirectories (including already-sorted folders) are never entered.
pub fn discover_documents(root: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
    {
        let entry = entry.map_err(|e| SortError::Io {
            path: root.to_path_buf(),
            source: e.into(),
        })?;

        if entry.file_type().is_file() && has_extension(entry.path(), ext) {
            documents.push(entry.into_path());
        }
    }

    documents.sort();
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn taxonomy() -> Taxonomy {
        Taxonomy::from_json_str(
            r#"{"Programming": {"Python": ["python"], "Java": ["java"]}, "Math": {"Calculus": ["integral"]}}"#,
        )
        .unwrap()
    }

    fn dir_set(root: &Path) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = WalkDir::new(root)
            .min_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .map(|e| e.into_path())
            .collect();
        dirs.sort();
        dirs
    }

    #[test]
    fn test_create_directories() {
        let dir = TempDir::new().unwrap();
        let created = create_directories(dir.path(), &taxonomy()).unwrap();

        assert_eq!(created.len(), 4);
        assert!(dir.path().join("Programming/Python").is_dir());
        assert!(dir.path().join("Programming/Java").is_dir());
        assert!(dir.path().join("Math/Calculus").is_dir());
        assert!(dir.path().join("Others").is_dir());
    }

    #[test]
    fn test_create_directories_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let tax = taxonomy();

        create_directories(dir.path(), &tax).unwrap();
        let first = dir_set(dir.path());

        create_directories(dir.path(), &tax).unwrap();
        let second = dir_set(dir.path());

        assert_eq!(first, second);
        // Programming, Programming/Python, Programming/Java, Math, Math/Calculus, Others
        assert_eq!(second.len(), 6);
    }

    #[test]
    fn test_empty_taxonomy_still_creates_others() {
        let dir = TempDir::new().unwrap();
        create_directories(dir.path(), &Taxonomy::default()).unwrap();
        assert_eq!(dir_set(dir.path()), vec![dir.path().join("Others")]);
    }

    #[test]
    fn test_validate_root() {
        let dir = TempDir::new().unwrap();
        assert!(validate_root(dir.path()).is_ok());

        let missing = dir.path().join("missing");
        assert!(matches!(
            validate_root(&missing),
            Err(SortError::InvalidRoot { .. })
        ));

        let file = dir.path().join("file.pdf");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            validate_root(&file),
            Err(SortError::InvalidRoot { .. })
        ));
    }

    #[test]
    fn test_discover_documents_top_level_only() {
        let dir = TempDir::new().unwrap();
        create_directories(dir.path(), &taxonomy()).unwrap();

        fs::write(dir.path().join("b.pdf"), b"x").unwrap();
        fs::write(dir.path().join("a.PDF"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("Others/old.pdf"), b"x").unwrap();
        fs::create_dir(dir.path().join("folder.pdf")).unwrap();

        let docs = discover_documents(dir.path(), "pdf").unwrap();
        assert_eq!(docs, vec![dir.path().join("a.PDF"), dir.path().join("b.pdf")]);
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("x/report.pdf"), "pdf"));
        assert!(has_extension(Path::new("x/report.Pdf"), "pdf"));
        assert!(!has_extension(Path::new("x/report.pdf.bak"), "pdf"));
        assert!(!has_extension(Path::new("x/pdf"), "pdf"));
    }
}
