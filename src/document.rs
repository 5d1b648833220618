//! One document: raw text, resolved annotations, and word segmentation.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use crate::error::Error;
use crate::export::ExportedDocument;
use crate::graph::{AnnotationGraph, Entity, EntityIndex};
use crate::record;
use crate::resolver;
use crate::segment::{self, Sentence, Word};
use crate::types::{CharIndex, Span};

/// A document's text together with its resolved annotation graph.
///
/// Segmentation and the word-to-entity association are derived from
/// `text` and `graph` at construction and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedDocument {
    /// Resolved annotations.
    graph: AnnotationGraph,
    /// Char-offset index over `text`.
    index: CharIndex,
    /// Document key, the annotation file stem.
    key: String,
    /// Derived sentences with per-word entity associations.
    sentences: Vec<Sentence>,
    /// Raw text, the source of truth for every offset.
    text: String,
}

/// A sentence with annotated spans, shaped for NER training input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainingSentence {
    /// `(start, end, label)` spans relative to the sentence start.
    pub entities: Vec<TrainingSpan>,
    /// Raw text of the sentence.
    pub text: String,
}

/// One labelled span inside a [`TrainingSentence`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainingSpan {
    /// Exclusive end, in chars from the sentence start.
    pub end: usize,
    /// Mapped entity label.
    pub label: String,
    /// Start, in chars from the sentence start.
    pub start: usize,
}

impl AnnotatedDocument {
    /// Build a document from an already-resolved graph.
    pub fn new(key: impl Into<String>, text: String, graph: AnnotationGraph) -> Self {
        let index = CharIndex::new(&text);
        let mut sentences = segment::segment(&text, &index);
        attach_entities(&mut sentences, &graph);
        return Self {
            graph,
            index,
            key: key.into(),
            sentences,
            text,
        };
    }

    /// Parse and resolve standoff annotation content against `text`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` for a malformed line, or any resolution error.
    pub fn from_standoff(key: impl Into<String>, annotations: &str, text: String) -> Result<Self, Error> {
        let records = record::parse_annotations(annotations)?;
        let graph = resolver::resolve(&records, &text)?;
        return Ok(Self::new(key, text, graph));
    }

    /// Document key, the annotation file stem.
    pub fn key(&self) -> &str {
        return &self.key;
    }

    /// Raw document text.
    pub fn text(&self) -> &str {
        return &self.text;
    }

    /// The resolved annotations.
    pub fn graph(&self) -> &AnnotationGraph {
        return &self.graph;
    }

    /// Sentences in text order, words annotated with their entities.
    pub fn sentences(&self) -> &[Sentence] {
        return &self.sentences;
    }

    /// All words in text order.
    pub fn words(&self) -> impl Iterator<Item = &Word> {
        return self.sentences.iter().flat_map(|s| return s.words.iter());
    }

    /// Entities overlapping a word.
    pub fn entities_at<'a>(&'a self, word: &'a Word) -> impl Iterator<Item = &'a Entity> {
        return word.annotations.iter().filter_map(|idx| return self.graph.entity(*idx));
    }

    /// Text covered by a char span, or `None` if the span runs past the text.
    pub fn slice(&self, span: Span) -> Option<&str> {
        return self.index.slice(&self.text, span);
    }

    /// Sentences containing at least one annotated word, with their entity
    /// fragments as sentence-relative spans. Labels are mapped through
    /// `labels`; unmapped labels pass through.
    pub fn annotated_sentences(&self, labels: &BTreeMap<String, String>) -> Vec<TrainingSentence> {
        let mut out = Vec::new();
        for sentence in &self.sentences {
            let mut seen: Vec<EntityIndex> = Vec::new();
            for idx in sentence.words.iter().flat_map(|w| return w.annotations.iter()) {
                if !seen.contains(idx) {
                    seen.push(*idx);
                }
            }
            if seen.is_empty() {
                continue;
            }

            let mut entities: Vec<TrainingSpan> = Vec::new();
            for entity in seen.iter().filter_map(|idx| return self.graph.entity(*idx)) {
                let label = labels.get(&entity.label).unwrap_or(&entity.label);
                for span in entity.spans.iter().filter(|s| return s.overlaps(&sentence.span)) {
                    let clipped = TrainingSpan {
                        end: span.end.min(sentence.span.end).saturating_sub(sentence.span.start),
                        label: label.clone(),
                        start: span.start.max(sentence.span.start).saturating_sub(sentence.span.start),
                    };
                    if !entities.contains(&clipped) {
                        entities.push(clipped);
                    }
                }
            }

            out.push(TrainingSentence {
                entities,
                text: self.slice(sentence.span).unwrap_or_default().to_string(),
            });
        }
        return out;
    }

    /// Write the document's export form as pretty JSON to `path`.
    /// The parent directory must already exist.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails or `Error::Io` if the file
    /// cannot be written.
    pub fn export(&self, path: &Path) -> Result<(), Error> {
        let exported = ExportedDocument::from_document(self);
        let content = serde_json::to_string_pretty(&exported)?;
        std::fs::write(path, content)?;
        return Ok(());
    }

    /// Rebuild a document from a file written by [`AnnotatedDocument::export`].
    /// The exported graph is re-resolved against the exported text, so a
    /// hand-edited export is validated like an annotation file: ids must
    /// carry their kind's marker and span lists must be non-empty, ascending,
    /// and disjoint.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileNotFound` or `Error::Io` if the file cannot be read,
    /// `Error::Json` if it is not an export, or any resolution error.
    pub fn import(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::FileNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        let exported: ExportedDocument = serde_json::from_str(&content)?;
        let graph = resolver::resolve(&exported.to_records(), &exported.text)?;
        return Ok(Self::new(exported.key, exported.text, graph));
    }
}

/// Record on every word the entities whose spans overlap it.
fn attach_entities(sentences: &mut [Sentence], graph: &AnnotationGraph) {
    let mut words: Vec<&mut Word> = sentences.iter_mut().flat_map(|s| return s.words.iter_mut()).collect();

    for (position, entity) in graph.entities().iter().enumerate() {
        let idx = EntityIndex(position);
        for span in &entity.spans {
            let first = words.partition_point(|w| return w.span.end <= span.start);
            for word in words.iter_mut().skip(first) {
                if word.span.start >= span.end {
                    break;
                }
                if word.annotations.last() != Some(&idx) {
                    word.annotations.push(idx);
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    const TEXT: &str = "Alice works at Acme Corp. Bob left.";
    const ANN: &str = "T1\tPerson 0 5\tAlice\nT2\tOrganization 15 24\tAcme Corp\nT3\tPerson 26 29\tBob\nR1\tWorksFor Arg1:T1 Arg2:T2\n";

    fn doc() -> AnnotatedDocument {
        AnnotatedDocument::from_standoff("d1", ANN, TEXT.to_string()).unwrap()
    }

    #[test]
    fn words_carry_overlapping_entities() {
        let doc = doc();
        let tagged: Vec<(&str, Vec<&str>)> = doc
            .words()
            .map(|w| (w.text.as_str(), doc.entities_at(w).map(|e| e.id.as_str()).collect::<Vec<_>>()))
            .filter(|(_, ids)| !ids.is_empty())
            .collect();
        assert_eq!(
            tagged,
            vec![("Alice", vec!["T1"]), ("Acme", vec!["T2"]), ("Corp", vec!["T2"]), ("Bob", vec!["T3"])]
        );
    }

    #[test]
    fn partial_overlap_attaches_to_word() {
        let doc = AnnotatedDocument::from_standoff("d", "T1\tX 3 5\tce\n", "Alice".to_string()).unwrap();
        let word = doc.words().next().unwrap();
        assert_eq!(word.annotations, vec![EntityIndex(0)]);
    }

    #[test]
    fn annotated_sentences_are_sentence_relative_and_mapped() {
        let mut labels = BTreeMap::new();
        labels.insert("Organization".to_string(), "ORG".to_string());
        let sentences = doc().annotated_sentences(&labels);

        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].text, "Alice works at Acme Corp.");
        assert_eq!(
            sentences[0].entities,
            vec![
                TrainingSpan { end: 5, label: "Person".to_string(), start: 0 },
                TrainingSpan { end: 24, label: "ORG".to_string(), start: 15 },
            ]
        );
        assert_eq!(sentences[1].text, "Bob left.");
        assert_eq!(sentences[1].entities, vec![TrainingSpan { end: 3, label: "Person".to_string(), start: 0 }]);
    }

    #[test]
    fn sentences_without_annotations_are_skipped() {
        let doc = AnnotatedDocument::from_standoff("d", "T1\tX 0 3\tOne\n", "One. Two.".to_string()).unwrap();
        assert_eq!(doc.annotated_sentences(&BTreeMap::new()).len(), 1);
    }

    #[test]
    fn export_then_import_rebuilds_the_same_document() {
        let ann = "T1\tMISC 0 5;15 19\tAliceAcme\nT2\tOrganization 15 24\tAcme Corp\nE1\tHire:T2 Who:T1\nE2\tCause:T1 Arg:E1\nA1\tNegation E2\nM1\tSpeculation R1 Low\nR1\tWorksFor Arg1:T1 Arg2:T2\n";
        let original = AnnotatedDocument::from_standoff("d1", ann, TEXT.to_string()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d1.json");
        original.export(&path).unwrap();
        let restored = AnnotatedDocument::import(&path).unwrap();

        assert_eq!(restored.key(), "d1");
        assert_eq!(restored.graph().to_standoff(), original.graph().to_standoff());
        assert_eq!(restored.sentences(), original.sentences());
    }

    #[test]
    fn export_contains_structure_and_graph() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d1.json");
        doc().export(&path).unwrap();

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["key"], "d1");
        assert_eq!(json["entities"][1]["text"], "Acme Corp");
        assert_eq!(json["relations"][0]["arguments"][1]["target"], "T2");
        assert_eq!(json["sentences"][0]["words"][0]["annotations"][0], "T1");
    }

    /// Export `doc()`, apply `edit` to the JSON, and import the result.
    fn import_edited(edit: impl FnOnce(&mut serde_json::Value)) -> Result<AnnotatedDocument, Error> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d1.json");
        doc().export(&path).unwrap();
        let mut json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        edit(&mut json);
        std::fs::write(&path, json.to_string()).unwrap();
        AnnotatedDocument::import(&path)
    }

    #[test]
    fn import_rejects_invalid_span_lists() {
        let invalid = [
            serde_json::json!([]),
            serde_json::json!([{ "end": 2, "start": 2 }]),
            serde_json::json!([{ "end": 3, "start": 0 }, { "end": 5, "start": 1 }]),
            serde_json::json!([{ "end": 5, "start": 3 }, { "end": 2, "start": 0 }]),
        ];
        for spans in invalid {
            let err = import_edited(|json| json["entities"][0]["spans"] = spans.clone()).unwrap_err();
            let Error::Consistency { id, .. } = &err else {
                panic!("expected consistency error for {spans}, got {err:?}");
            };
            assert_eq!(id, "T1");
        }
    }

    #[test]
    fn import_rejects_an_id_with_the_wrong_marker() {
        let err = import_edited(|json| json["entities"][2]["id"] = "R5".into()).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "{err:?}");
    }

    #[test]
    fn import_of_missing_file_is_file_not_found() {
        let err = AnnotatedDocument::import(Path::new("/nonexistent/d.json")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }), "{err:?}");
    }
}
