/// Crate-level error types for standoff corpus loading and export.
use std::path::PathBuf;

/// All errors carry enough context to produce a useful diagnostic without a
/// debugger. Each variant names the file, annotation id, or reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-wide error type re-exported from the library root")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A cached snapshot exists but cannot be used. Recovered by a full rebuild.
    #[error("cache corrupt: {}: {reason}", path.display())]
    CacheCorrupt {
        /// Path to the snapshot file.
        path: PathBuf,
        /// Description of the corruption.
        reason: String,
    },

    /// A record's span lies outside the text, or its declared surface text
    /// disagrees with the text at that span.
    #[error("inconsistent annotation `{id}`: {reason}")]
    Consistency {
        /// Id of the offending record.
        id: String,
        /// What disagreed with the raw text.
        reason: String,
    },

    /// Events reference each other in a loop.
    #[error("cyclic event reference: {}", cycle.join(" -> "))]
    CyclicReference {
        /// Event ids forming the cycle, first id repeated at the end.
        cycle: Vec<String>,
    },

    /// A record references an id that no record in the document declares.
    #[error("dangling reference: `{referencing}` points at missing `{missing}`")]
    DanglingReference {
        /// The id that could not be found.
        missing: String,
        /// Id of the record holding the reference.
        referencing: String,
    },

    /// An error inside one document, tagged with the annotation file it came from.
    #[error("{}: {source}", path.display())]
    Document {
        /// Annotation file that failed to load.
        path: PathBuf,
        /// The underlying parse or resolution error.
        source: Box<Error>,
    },

    /// The same annotation id is declared twice within one document.
    #[error("duplicate id `{id}` on line {line}")]
    DuplicateId {
        /// The repeated id.
        id: String,
        /// One-based line number of the second declaration.
        line: usize,
    },

    /// A file the corpus needs does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization or deserialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// Two discovered annotation files share a stem and so the same document key.
    #[error("document key `{key}` is claimed by both {} and {}", first.display(), second.display())]
    KeyCollision {
        /// First path claiming the key, in sorted discovery order.
        first: PathBuf,
        /// The shared document key.
        key: String,
        /// Second path claiming the key.
        second: PathBuf,
    },

    /// The corpus root is missing or not a directory.
    #[error("not a directory: {}", path.display())]
    NotADirectory {
        /// Path that was expected to be a directory.
        path: PathBuf,
    },

    /// An annotation line could not be parsed.
    #[error("parse error on line {line}: {reason}")]
    Parse {
        /// One-based line number within the annotation file.
        line: usize,
        /// Description of what was malformed.
        reason: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// The file watcher could not be set up.
    #[error("watch failed: {reason}")]
    Watch {
        /// Description of the watcher failure.
        reason: String,
    },

    /// A reference resolves to a record of a kind that cannot appear in that position.
    #[error("`{referencing}` expects {expected} at `{target}`, found {found}")]
    WrongReferenceKind {
        /// Kind of record the position allows.
        expected: &'static str,
        /// Kind of record actually found.
        found: &'static str,
        /// Id of the record holding the reference.
        referencing: String,
        /// The referenced id.
        target: String,
    },
}

impl Error {
    /// Strip any `Document` wrapping and return the innermost error.
    pub fn root_cause(&self) -> &Self {
        return match self {
            Self::Document { source, .. } => source.root_cause(),
            other => other,
        };
    }
}
