//! Load, validate, and export corpora of standoff-annotated documents.
//!
//! A corpus is a directory of `<key>.ann` annotation files, each paired with a
//! `<key>.txt` raw text file. Annotations point into the text by character
//! offset and into each other by id; loading resolves both and rejects any
//! document whose annotations disagree with its text.

pub mod cache;
pub mod commands;
pub mod config;
pub mod corpus;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod export;
pub mod graph;
pub mod hasher;
pub mod logging;
pub mod record;
pub mod resolver;
pub mod scanner;
pub mod segment;
pub mod types;
pub mod watch;

pub use corpus::{Corpus, LoadOptions};
pub use document::AnnotatedDocument;
pub use error::Error;
pub use graph::AnnotationGraph;
