//! Corpus discovery: find `.ann` files under a root and pair each with its `.txt`.
//!
//! Keys are file stems and must be unique across the scanned tree.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Error;

/// Extension of annotation files.
const ANNOTATION_EXT: &str = "ann";
/// Extension of the paired raw text files.
const TEXT_EXT: &str = "txt";

/// One discovered annotation/text file pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPaths {
    /// Path to the `.ann` file.
    pub annotations: PathBuf,
    /// Document key: the annotation file stem.
    pub key: String,
    /// Annotation path relative to the corpus root, used in the cache.
    pub relative: PathBuf,
    /// Path to the paired `.txt` file. Not checked for existence here.
    pub text: PathBuf,
}

/// Find annotation files directly under `root`, or anywhere beneath it when
/// `recursive` is set. Applies the config's include/exclude filters.
/// Results are sorted by path so discovery is deterministic.
///
/// # Errors
///
/// Returns `Error::Io` if a directory cannot be read, or
/// `Error::KeyCollision` if two annotation files share a stem.
pub fn scan(root: &Path, recursive: bool, config: &Config) -> Result<Vec<DocumentPaths>, Error> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut by_key: BTreeMap<String, DocumentPaths> = BTreeMap::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| return ext != ANNOTATION_EXT) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        if !config.should_scan(&relative.to_string_lossy()) {
            continue;
        }

        let Some(key) = path.file_stem().map(|s| return s.to_string_lossy().into_owned()) else {
            continue;
        };
        let paths = DocumentPaths {
            annotations: path.to_path_buf(),
            key: key.clone(),
            relative,
            text: path.with_extension(TEXT_EXT),
        };

        if let Some(existing) = by_key.get(&key) {
            let (first, second) = ordered(existing.annotations.clone(), paths.annotations);
            return Err(Error::KeyCollision { first, key, second });
        }
        by_key.insert(key, paths);
    }

    let mut found: Vec<DocumentPaths> = by_key.into_values().collect();
    found.sort_by(|a, b| return a.annotations.cmp(&b.annotations));
    return Ok(found);
}

fn ordered(a: PathBuf, b: PathBuf) -> (PathBuf, PathBuf) {
    return if a <= b { (a, b) } else { (b, a) };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
    }

    fn keys(found: &[DocumentPaths]) -> Vec<&str> {
        found.iter().map(|d| d.key.as_str()).collect()
    }

    #[test]
    fn flat_scan_ignores_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.ann");
        touch(dir.path(), "a.ann");
        touch(dir.path(), "a.txt");
        touch(dir.path(), "notes.md");
        touch(dir.path(), "sub/c.ann");

        let found = scan(dir.path(), false, &Config::default()).unwrap();
        assert_eq!(keys(&found), vec!["a", "b"]);
        assert_eq!(found[0].text, dir.path().join("a.txt"));
        assert_eq!(found[0].relative, PathBuf::from("a.ann"));
    }

    #[test]
    fn recursive_scan_descends() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.ann");
        touch(dir.path(), "sub/deeper/c.ann");

        let found = scan(dir.path(), true, &Config::default()).unwrap();
        assert_eq!(keys(&found), vec!["a", "c"]);
        assert_eq!(found[1].relative, Path::new("sub").join("deeper").join("c.ann"));
    }

    #[test]
    fn same_stem_in_two_directories_collides() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "x/doc1.ann");
        touch(dir.path(), "y/doc1.ann");

        let err = scan(dir.path(), true, &Config::default()).unwrap_err();
        let Error::KeyCollision { key, first, second } = err else {
            panic!("expected collision, got {err:?}");
        };
        assert_eq!(key, "doc1");
        assert_eq!(first, dir.path().join("x/doc1.ann"));
        assert_eq!(second, dir.path().join("y/doc1.ann"));
    }

    #[test]
    fn config_filters_apply() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "train/a.ann");
        touch(dir.path(), "test/b.ann");

        let config = Config::parse("include = [\"train/\"]").unwrap();
        let found = scan(dir.path(), true, &config).unwrap();
        assert_eq!(keys(&found), vec!["a"]);
    }
}
