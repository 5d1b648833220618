//! Sentence and word segmentation over raw document text.
//!
//! Boundaries follow Unicode text segmentation (UAX #29). Whitespace-only
//! segments are dropped, so every character belongs to at most one word.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation as _;

use crate::graph::EntityIndex;
use crate::types::{CharIndex, Span};

/// One word of a sentence and the entities overlapping it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Entities with at least one span overlapping this word, in arena order.
    pub annotations: Vec<EntityIndex>,
    /// Character span of the word.
    pub span: Span,
    /// The word's text.
    pub text: String,
}

/// An ordered run of words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    /// From the first word's start to the last word's end.
    pub span: Span,
    /// Words in text order.
    pub words: Vec<Word>,
}

/// Split `text` into sentences of words. Sentences without words are dropped.
pub fn segment(text: &str, index: &CharIndex) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    for (sentence_byte, sentence) in text.split_sentence_bound_indices() {
        let words: Vec<Word> = sentence
            .split_word_bound_indices()
            .filter(|(_, piece)| return !piece.chars().all(char::is_whitespace))
            .filter_map(|(word_byte, piece)| {
                let start = index.char_offset(sentence_byte.saturating_add(word_byte))?;
                let end = start.saturating_add(piece.chars().count());
                return Some(Word {
                    annotations: Vec::new(),
                    span: Span::new(start, end),
                    text: piece.to_string(),
                });
            })
            .collect();

        let (Some(first), Some(last)) = (words.first(), words.last()) else {
            continue;
        };
        let span = Span::new(first.span.start, last.span.end);
        sentences.push(Sentence { span, words });
    }
    return sentences;
}
