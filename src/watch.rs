//! File watcher: loads the corpus on startup, then reloads on document changes.

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use log::{debug, info};
use notify::{RecursiveMode, Watcher as _};

use crate::cache::CACHE_FILE_NAME;
use crate::commands::{self, CorpusArgs};
use crate::config::CONFIG_FILE_NAME;
use crate::diagnostics;
use crate::error;

/// Debounce delay between filesystem events and reload.
const DEBOUNCE_MS: u64 = 100;

/// Whether a changed path can affect the loaded corpus.
/// The snapshot itself is excluded so a cached reload does not retrigger.
fn is_relevant(path: &Path) -> bool {
    if path.file_name().is_some_and(|name| return name == CACHE_FILE_NAME) {
        return false;
    }
    if path.file_name().is_some_and(|name| return name == CONFIG_FILE_NAME) {
        return true;
    }
    return path
        .extension()
        .is_some_and(|ext| return ext == "ann" || ext == "txt");
}

/// Create a filesystem watcher that sends a tick for every relevant change.
///
/// # Errors
///
/// Returns `Error::Watch` if the watcher cannot be created.
fn create_watcher(tx: crossbeam_channel::Sender<()>) -> Result<notify::RecommendedWatcher, error::Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_) | notify::EventKind::Modify(_) | notify::EventKind::Remove(_)
            )
            && event.paths.iter().any(|p| return is_relevant(p))
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return error::Error::Watch {
            reason: format!("watcher setup failed: {e}"),
        };
    });
}

/// Entry point for the watch command.
///
/// Loads the corpus once, then watches the root and reloads on changes to
/// annotation, text, or config files. Load failures are reported and the
/// watch continues.
///
/// # Errors
///
/// Returns `Error::NotADirectory` if the root is not a directory, or
/// `Error::Watch` if the watcher cannot be set up.
pub fn run(args: &CorpusArgs) -> Result<ExitCode, error::Error> {
    if !args.root.is_dir() {
        return Err(error::Error::NotADirectory { path: args.root.clone() });
    }

    eprintln!("watch: initial load");
    let mut last_code = run_load(args);

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx)?;
    let mode = if args.recursive {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    watcher.watch(&args.root, mode).map_err(|e| {
        return error::Error::Watch {
            reason: format!("cannot watch {}: {e}", args.root.display()),
        };
    })?;

    info!("event=watch_start root={} recursive={}", args.root.display(), args.recursive);
    eprintln!("watch: monitoring {}, press Ctrl+C to stop", args.root.display());

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        debug!("event=watch_change root={}", args.root.display());
        eprintln!("watch: change detected, reloading...");
        last_code = run_load(args);
    }

    return Ok(last_code);
}

/// Load once and print the result. Returns the exit code of the load.
fn run_load(args: &CorpusArgs) -> ExitCode {
    return match commands::load(args) {
        Ok((corpus, _)) => {
            commands::print_summary(&corpus);
            ExitCode::SUCCESS
        },
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_corpus_files_are_relevant() {
        assert!(is_relevant(Path::new("corpus/doc1.ann")));
        assert!(is_relevant(Path::new("corpus/doc1.txt")));
        assert!(is_relevant(Path::new("corpus/.standoff.toml")));
        assert!(!is_relevant(Path::new("corpus/model.cache")));
        assert!(!is_relevant(Path::new("corpus/README.md")));
    }
}
