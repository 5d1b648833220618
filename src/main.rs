use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use standoff::commands::{self, CorpusArgs};
use standoff::{diagnostics, logging, watch};

#[derive(Parser)]
#[command(name = "standoff", version, about = "Load, validate, and export standoff-annotated corpora")]
struct Cli {
    /// Command to run
    #[command(subcommand)]
    command: Commands,
    /// Log debug events to stderr (`RUST_LOG` takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every document and report per-document counts
    Check {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
    /// Export every document to `<out>/<key>.json`
    Export {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Output folder, created if missing
        out: PathBuf,
    },
    /// Print annotated sentences as JSON lines for NER training
    Sentences {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
    /// Load once, then reload whenever annotation or text files change
    Watch {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _logger = match logging::init(cli.verbose) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("warning: {e}");
            None
        },
    };

    let result = match &cli.command {
        Commands::Check { corpus } => commands::check(corpus),
        Commands::Export { corpus, out } => commands::export(corpus, out),
        Commands::Sentences { corpus } => commands::sentences(corpus),
        Commands::Watch { corpus } => watch::run(corpus),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}
