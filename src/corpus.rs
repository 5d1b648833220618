//! The corpus: every annotated document under one root directory.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::cache::{CACHE_FILE_NAME, CachedDocument, Snapshot};
use crate::config::Config;
use crate::document::AnnotatedDocument;
use crate::error::Error;
use crate::hasher;
use crate::resolver;
use crate::scanner::{self, DocumentPaths};
use crate::types::Fingerprint;

/// How a corpus is discovered and built.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Filters and label mapping from `.standoff.toml`.
    pub config: Config,
    /// Worker threads for parse and resolve. `0` and `1` both mean sequential.
    pub jobs: usize,
    /// Descend into subdirectories of the root.
    pub recursive: bool,
    /// Reuse and refresh the snapshot at `<root>/model.cache`.
    pub use_cache: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        return Self {
            config: Config::default(),
            jobs: 1,
            recursive: false,
            use_cache: false,
        };
    }
}

/// All documents of one corpus, keyed by annotation file stem.
#[derive(Debug)]
pub struct Corpus {
    /// Snapshot location, set when the corpus was loaded with the cache enabled.
    cache_path: Option<PathBuf>,
    /// Documents by key.
    documents: BTreeMap<String, AnnotatedDocument>,
    /// The directory the corpus was loaded from.
    root: PathBuf,
}

/// A document built by one pipeline run, plus what the snapshot needs.
struct Built {
    /// The loaded document.
    document: AnnotatedDocument,
    /// Fingerprint of the files it was built from.
    fingerprint: Fingerprint,
    /// Restored from the snapshot rather than parsed.
    from_cache: bool,
}

/// Snapshot entries available to this load.
#[derive(Default)]
struct CacheLookup {
    /// Cached documents by annotation path relative to the root.
    entries: HashMap<PathBuf, CachedDocument>,
    /// Where the snapshot was read from.
    path: PathBuf,
}

impl Corpus {
    /// Load every document pair under `root` with default options.
    ///
    /// # Errors
    ///
    /// See [`Corpus::load_with`].
    pub fn load(root: &Path, recursive: bool, use_cache: bool) -> Result<Self, Error> {
        let options = LoadOptions {
            recursive,
            use_cache,
            ..LoadOptions::default()
        };
        return Self::load_with(root, &options);
    }

    /// Discover, parse, and resolve every document pair under `root`.
    ///
    /// Any document failing to load fails the whole load. A missing or
    /// unusable cache is logged and rebuilt, never reported as an error.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotADirectory` if `root` is not a directory,
    /// `Error::KeyCollision` if two annotation files share a stem,
    /// `Error::Io` if discovery fails, or `Error::Document` wrapping the
    /// first failing document's parse, resolution, or read error.
    pub fn load_with(root: &Path, options: &LoadOptions) -> Result<Self, Error> {
        if !root.is_dir() {
            return Err(Error::NotADirectory { path: root.to_path_buf() });
        }

        let discovered = scanner::scan(root, options.recursive, &options.config)?;
        let cache_path = options.use_cache.then(|| return root.join(CACHE_FILE_NAME));
        let cached = cache_path.as_deref().map(read_snapshot).unwrap_or_default();

        let built = build_all(&discovered, &cached, options.jobs)?;

        let reused = built.iter().filter(|b| return b.1.from_cache).count();
        let mut documents = BTreeMap::new();
        let mut snapshot_entries = Vec::with_capacity(built.len());
        for (paths, result) in built {
            if cache_path.is_some() {
                snapshot_entries.push(CachedDocument {
                    digest: hasher::graph_digest(&result.fingerprint, result.document.graph()),
                    fingerprint: result.fingerprint,
                    graph: result.document.graph().clone(),
                    key: paths.key.clone(),
                    source: paths.relative.clone(),
                    text: result.document.text().to_string(),
                });
            }
            documents.insert(paths.key.clone(), result.document);
        }

        if let Some(path) = &cache_path {
            let unchanged = reused == documents.len() && cached.entries.len() == documents.len();
            if unchanged {
                debug!("event=cache_fresh path={}", path.display());
            } else {
                write_snapshot(path, snapshot_entries);
            }
        }

        info!(
            "event=corpus_loaded root={} documents={} from_cache={reused}",
            root.display(),
            documents.len()
        );

        return Ok(Self {
            cache_path,
            documents,
            root: root.to_path_buf(),
        });
    }

    /// Read-only view of every document by key.
    pub const fn documents(&self) -> &BTreeMap<String, AnnotatedDocument> {
        return &self.documents;
    }

    /// Document with the given key, if loaded.
    pub fn get(&self, key: &str) -> Option<&AnnotatedDocument> {
        return self.documents.get(key);
    }

    /// Number of loaded documents.
    pub fn len(&self) -> usize {
        return self.documents.len();
    }

    /// Whether the corpus holds no documents.
    pub fn is_empty(&self) -> bool {
        return self.documents.is_empty();
    }

    /// Directory the corpus was loaded from.
    pub fn root(&self) -> &Path {
        return &self.root;
    }

    /// Where the snapshot lives, if the corpus was loaded with the cache on.
    pub fn cache_path(&self) -> Option<&Path> {
        return self.cache_path.as_deref();
    }

    /// Export every document to `<folder>/<key>.json`, creating `folder` if needed.
    /// Returns the written paths in key order.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the folder cannot be created or a file cannot be
    /// written, or `Error::Json` if serialization fails.
    pub fn export_all(&self, folder: &Path) -> Result<Vec<PathBuf>, Error> {
        std::fs::create_dir_all(folder)?;
        let mut written = Vec::with_capacity(self.documents.len());
        for (key, document) in &self.documents {
            let path = folder.join(format!("{key}.json"));
            document.export(&path)?;
            written.push(path);
        }
        info!("event=corpus_exported folder={} documents={}", folder.display(), written.len());
        return Ok(written);
    }
}

/// Read the snapshot, logging and discarding it on any failure.
fn read_snapshot(path: &Path) -> CacheLookup {
    let entries = match Snapshot::read(path) {
        Ok(snapshot) => {
            info!("event=cache_loaded path={} documents={}", path.display(), snapshot.documents.len());
            snapshot.into_lookup()
        },
        Err(Error::FileNotFound { .. }) => {
            info!("event=cache_miss path={}, building new cache", path.display());
            HashMap::new()
        },
        Err(e) => {
            warn!("event=cache_discarded path={} reason={e}", path.display());
            HashMap::new()
        },
    };
    return CacheLookup {
        entries,
        path: path.to_path_buf(),
    };
}

/// Persist a fresh snapshot. Failures are logged, never returned.
fn write_snapshot(path: &Path, entries: Vec<CachedDocument>) {
    let count = entries.len();
    match Snapshot::new(entries).write(path) {
        Ok(()) => info!("event=cache_written path={} documents={count}", path.display()),
        Err(e) => warn!("event=cache_write_failed path={} reason={e}", path.display()),
    }
}

/// Run the per-document pipeline over every discovered pair.
/// Results come back in discovery order; on failure the first failing pair
/// in that order is reported, whatever order the workers finished in.
///
/// # Errors
///
/// Returns `Error::Document` for the first failing pair.
fn build_all<'a>(
    discovered: &'a [DocumentPaths],
    cached: &CacheLookup,
    jobs: usize,
) -> Result<Vec<(&'a DocumentPaths, Built)>, Error> {
    let results: Vec<Result<Built, Error>> = if jobs <= 1 || discovered.len() <= 1 {
        let mut results = Vec::with_capacity(discovered.len());
        for paths in discovered {
            let result = build_document(paths, cached);
            let failed = result.is_err();
            results.push(result);
            if failed {
                break;
            }
        }
        results
    } else {
        build_parallel(discovered, cached, jobs)
    };

    let mut built = Vec::with_capacity(results.len());
    for (paths, result) in discovered.iter().zip(results) {
        let document = result.map_err(|e| {
            return Error::Document {
                path: paths.annotations.clone(),
                source: Box::new(e),
            };
        })?;
        built.push((paths, document));
    }
    return Ok(built);
}

/// Fan the pipeline out over scoped worker threads fed by a channel.
/// Each worker only touches its own document; results are gathered here.
fn build_parallel(
    discovered: &[DocumentPaths],
    cached: &CacheLookup,
    jobs: usize,
) -> Vec<Result<Built, Error>> {
    let (work_tx, work_rx) = crossbeam_channel::unbounded::<(usize, &DocumentPaths)>();
    let (done_tx, done_rx) = crossbeam_channel::unbounded::<(usize, Result<Built, Error>)>();
    for item in discovered.iter().enumerate() {
        let _ = work_tx.send(item);
    }
    drop(work_tx);

    let mut slots: Vec<Option<Result<Built, Error>>> = Vec::new();
    slots.resize_with(discovered.len(), || return None);

    std::thread::scope(|scope| {
        for _ in 0..jobs.min(discovered.len()) {
            let work_rx = work_rx.clone();
            let done_tx = done_tx.clone();
            scope.spawn(move || {
                for (position, paths) in work_rx {
                    let result = build_document(paths, cached);
                    let _ = done_tx.send((position, result));
                }
            });
        }
        drop(done_tx);

        for (position, result) in done_rx {
            if let Some(slot) = slots.get_mut(position) {
                *slot = Some(result);
            }
        }
    });

    // Keep the prefix up to and including the first failure.
    let mut results = Vec::with_capacity(slots.len());
    for slot in slots {
        let Some(result) = slot else {
            break;
        };
        let failed = result.is_err();
        results.push(result);
        if failed {
            break;
        }
    }
    return results;
}

/// Read one pair, then reuse its cached graph if the fingerprint still
/// matches and the graph checks out, or parse and resolve it from scratch.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if either file is missing, `Error::Io` if
/// either is unreadable or not UTF-8, or any parse or resolution error.
fn build_document(paths: &DocumentPaths, cached: &CacheLookup) -> Result<Built, Error> {
    let annotations = read_file(&paths.annotations)?;
    let text = read_file(&paths.text)?;
    let fingerprint = hasher::fingerprint(annotations.as_bytes(), text.as_bytes());

    if let Some(entry) = cached.entries.get(&paths.relative)
        && entry.fingerprint == fingerprint
    {
        match check_cached(entry, paths, &text, &cached.path) {
            Ok(()) => {
                debug!("event=document_cached key={}", paths.key);
                return Ok(Built {
                    document: AnnotatedDocument::new(paths.key.clone(), text, entry.graph.clone()),
                    fingerprint,
                    from_cache: true,
                });
            },
            Err(e) => warn!("event=cache_entry_discarded key={} reason={e}", paths.key),
        }
    }

    debug!("event=document_parse key={} path={}", paths.key, paths.annotations.display());
    let document = AnnotatedDocument::from_standoff(paths.key.clone(), &annotations, text)?;
    return Ok(Built {
        document,
        fingerprint,
        from_cache: false,
    });
}

/// Make sure a cached entry with a matching fingerprint is exactly what parsing
/// the files would produce: same key and text, a graph bound to the
/// fingerprint by its digest, and a graph that passes resolver checks.
///
/// # Errors
///
/// Returns `Error::CacheCorrupt` naming the first check that failed.
fn check_cached(entry: &CachedDocument, paths: &DocumentPaths, text: &str, snapshot: &Path) -> Result<(), Error> {
    let corrupt = |reason: String| {
        return Error::CacheCorrupt {
            path: snapshot.to_path_buf(),
            reason: format!("{}: {reason}", paths.relative.display()),
        };
    };
    if entry.key != paths.key {
        return Err(corrupt(format!("cached key `{}` differs", entry.key)));
    }
    if entry.text != text {
        return Err(corrupt("cached text differs".to_string()));
    }
    resolver::verify(&entry.graph, text).map_err(|e| return corrupt(e.to_string()))?;
    if entry.digest != hasher::graph_digest(&entry.fingerprint, &entry.graph) {
        return Err(corrupt("graph digest mismatch".to_string()));
    }
    return Ok(());
}

/// # Errors
///
/// Returns `Error::FileNotFound` for a missing file, or `Error::Io` otherwise.
fn read_file(path: &Path) -> Result<String, Error> {
    return match std::fs::read_to_string(path) {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::FileNotFound { path: path.to_path_buf() }),
        Err(e) => Err(Error::Io(e)),
        Ok(content) => Ok(content),
    };
}
