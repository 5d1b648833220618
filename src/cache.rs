//! Corpus snapshot persistence: whole-file write, whole-file read, discard on error.
//!
//! The snapshot holds only what a corpus owns: keys, raw texts, and resolved
//! graphs, plus a fingerprint per document so stale entries are never reused.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::graph::AnnotationGraph;
use crate::types::Fingerprint;

/// File name of the snapshot inside the corpus root.
pub const CACHE_FILE_NAME: &str = "model.cache";

/// Bumped whenever the snapshot layout changes. Older snapshots are discarded.
const SNAPSHOT_VERSION: u32 = 2;

/// One document as stored in the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedDocument {
    /// Digest binding `graph` to `fingerprint`; see [`crate::hasher::graph_digest`].
    pub digest: Fingerprint,
    /// Fingerprint of the annotation and text files the graph was built from.
    pub fingerprint: Fingerprint,
    /// The resolved graph.
    pub graph: AnnotationGraph,
    /// Document key.
    pub key: String,
    /// Annotation file path relative to the corpus root.
    pub source: PathBuf,
    /// Raw document text.
    pub text: String,
}

/// The snapshot as a whole. Documents are sorted by source path and unique.
/// Constructed only via `Snapshot::new()` or `Snapshot::parse()`, both of
/// which enforce that ordering.
#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// Cached documents, sorted by `source`.
    pub documents: Vec<CachedDocument>,
    /// Layout version the snapshot was written with.
    pub version: u32,
}

impl Snapshot {
    /// Index the cached documents by source path.
    pub fn into_lookup(self) -> HashMap<PathBuf, CachedDocument> {
        return self
            .documents
            .into_iter()
            .map(|d| return (d.source.clone(), d))
            .collect();
    }

    /// Create a snapshot from unsorted documents. Sorts and deduplicates by source.
    pub fn new(mut documents: Vec<CachedDocument>) -> Self {
        documents.sort_by(|a, b| return a.source.cmp(&b.source));
        documents.dedup_by(|a, b| return a.source == b.source);
        return Self {
            documents,
            version: SNAPSHOT_VERSION,
        };
    }

    /// Parse a snapshot from its serialized form.
    ///
    /// # Errors
    ///
    /// Returns `Error::CacheCorrupt` if the content is not a snapshot, was
    /// written by another layout version, or is out of order.
    pub fn parse(path: &Path, content: &str) -> Result<Self, Error> {
        let snapshot: Self = serde_json::from_str(content).map_err(|e| return corrupt(path, e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(corrupt(
                path,
                format!("snapshot version {} (expected {SNAPSHOT_VERSION})", snapshot.version),
            ));
        }
        enforce_snapshot_ordering(path, &snapshot.documents)?;
        return Ok(snapshot);
    }

    /// Read and parse a snapshot from disk.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileNotFound` if there is no snapshot, `Error::Io` for
    /// other read failures, or `Error::CacheCorrupt` if it cannot be parsed.
    pub fn read(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::FileNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(path, &content);
    }

    /// Write the snapshot to disk, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails,
    /// or `Error::Io` if the file cannot be written.
    pub fn write(&self, path: &Path) -> Result<(), Error> {
        let content = serde_json::to_string(self)?;
        std::fs::write(path, content)?;
        return Ok(());
    }
}

fn corrupt(path: &Path, reason: String) -> Error {
    return Error::CacheCorrupt {
        path: path.to_path_buf(),
        reason,
    };
}

/// Validate that snapshot documents are strictly sorted by source.
///
/// # Errors
///
/// Returns `Error::CacheCorrupt` if any adjacent pair is out of order.
fn enforce_snapshot_ordering(path: &Path, documents: &[CachedDocument]) -> Result<(), Error> {
    for window in documents.windows(2) {
        let (Some(first), Some(second)) = (window.first(), window.get(1)) else {
            continue;
        };
        if first.source >= second.source {
            return Err(corrupt(
                path,
                format!(
                    "documents not sorted: {} >= {}",
                    first.source.display(),
                    second.source.display()
                ),
            ));
        }
    }
    return Ok(());
}
