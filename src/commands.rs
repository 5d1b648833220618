//! CLI commands for standoff: check, export, sentences.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use serde::Serialize;

use crate::config::Config;
use crate::corpus::{Corpus, LoadOptions};
use crate::error;

/// Arguments shared by every command that loads a corpus.
#[derive(clap::Args, Debug, Clone)]
pub struct CorpusArgs {
    /// Reuse and refresh `<root>/model.cache`
    #[arg(long)]
    pub cache: bool,
    /// Worker threads for parsing (overrides `jobs` in `.standoff.toml`)
    #[arg(long, short)]
    pub jobs: Option<usize>,
    /// Descend into subdirectories of the root
    #[arg(long, short)]
    pub recursive: bool,
    /// Corpus root directory
    pub root: PathBuf,
}

/// One line of `sentences` output: a sentence with `[start, end, label]` spans.
#[derive(Serialize)]
struct SentenceLine<'a> {
    /// Sentence-relative spans.
    entities: Vec<(usize, usize, &'a str)>,
    /// Key of the document the sentence came from.
    key: &'a str,
    /// Sentence text.
    text: &'a str,
}

impl CorpusArgs {
    /// Load `.standoff.toml` and turn the flags into load options.
    /// Flags win over the config file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` or `Error::TomlDe` if the config file exists but
    /// cannot be read or parsed.
    pub fn options(&self) -> Result<LoadOptions, error::Error> {
        let config = Config::load(&self.root)?;
        let jobs = self.jobs.or(config.jobs()).unwrap_or(1);
        return Ok(LoadOptions {
            config,
            jobs,
            recursive: self.recursive,
            use_cache: self.cache,
        });
    }
}

/// Load the corpus with the options the flags describe.
///
/// # Errors
///
/// Returns config errors or any corpus load error.
pub fn load(args: &CorpusArgs) -> Result<(Corpus, LoadOptions), error::Error> {
    let options = args.options()?;
    let corpus = Corpus::load_with(&args.root, &options)?;
    return Ok((corpus, options));
}

/// Load and validate every document, then print a per-document summary.
///
/// # Errors
///
/// Returns the first load error.
pub fn check(args: &CorpusArgs) -> Result<ExitCode, error::Error> {
    let (corpus, _) = load(args)?;
    print_summary(&corpus);
    return Ok(ExitCode::SUCCESS);
}

/// Print one line per document and a total.
pub fn print_summary(corpus: &Corpus) {
    for (key, document) in corpus.documents() {
        let graph = document.graph();
        println!(
            "OK      {key}  ({} entities, {} relations, {} events, {} attributes)",
            graph.entities().len(),
            graph.relations().len(),
            graph.events().len(),
            graph.attributes().len()
        );
    }
    println!();
    println!("{} documents loaded from {}", corpus.len(), corpus.root().display());
}

/// Load the corpus and export every document to `<out>/<key>.json`.
///
/// # Errors
///
/// Returns load errors, or I/O and JSON errors while writing.
pub fn export(args: &CorpusArgs, out: &Path) -> Result<ExitCode, error::Error> {
    let (corpus, _) = load(args)?;
    let written = corpus.export_all(out)?;
    println!("Exported {} documents to {}", written.len(), out.display());
    return Ok(ExitCode::SUCCESS);
}

/// Load the corpus and print every annotated sentence as one JSON line,
/// with labels mapped through `[labels]` in `.standoff.toml`.
///
/// # Errors
///
/// Returns load errors, or I/O and JSON errors while writing to stdout.
pub fn sentences(args: &CorpusArgs) -> Result<ExitCode, error::Error> {
    let (corpus, options) = load(args)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for (key, document) in corpus.documents() {
        for sentence in document.annotated_sentences(options.config.labels()) {
            let line = SentenceLine {
                entities: sentence
                    .entities
                    .iter()
                    .map(|span| return (span.start, span.end, span.label.as_str()))
                    .collect(),
                key,
                text: &sentence.text,
            };
            serde_json::to_writer(&mut out, &line)?;
            writeln!(out)?;
        }
    }

    out.flush()?;
    return Ok(ExitCode::SUCCESS);
}
