//! Tree-shaped JSON export of one annotated document.
//!
//! References are written as annotation ids rather than arena indices, so an
//! exported file reads on its own and rebuilds into the same graph.

use serde::{Deserialize, Serialize};

use crate::document::AnnotatedDocument;
use crate::graph::AnnotationGraph;
use crate::record::{Record, RecordKind, RoleRef};
use crate::segment::Sentence;
use crate::types::Span;

/// One exported document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedDocument {
    /// Attributes with their target id.
    pub attributes: Vec<ExportedAttribute>,
    /// Entities with every fragment and their surface text.
    pub entities: Vec<ExportedEntity>,
    /// Events with trigger and argument ids.
    pub events: Vec<ExportedEvent>,
    /// Document key, the annotation file stem.
    pub key: String,
    /// Relations with argument ids.
    pub relations: Vec<ExportedRelation>,
    /// Sentence and word structure.
    pub sentences: Vec<ExportedSentence>,
    /// The raw document text all offsets point into.
    pub text: String,
}

/// One sentence and its words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedSentence {
    /// Char span of the sentence in the document text.
    pub span: Span,
    /// Words in text order.
    pub words: Vec<ExportedWord>,
}

/// One word of a sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedWord {
    /// Ids of entities overlapping the word.
    pub annotations: Vec<String>,
    /// Char span of the word in the document text.
    pub span: Span,
    /// The word's text.
    pub text: String,
}

/// One entity with all of its fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedEntity {
    /// Annotation id, `T` followed by digits.
    pub id: String,
    /// Entity type.
    pub label: String,
    /// Fragments, ascending and disjoint.
    pub spans: Vec<Span>,
    /// Surface text of the fragments, concatenated.
    pub text: String,
}

/// A role-labelled reference to another annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedArgument {
    /// Argument role, such as `Arg1`.
    pub role: String,
    /// Id of the referenced annotation.
    pub target: String,
}

/// One relation between entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedRelation {
    /// Entity arguments in record order.
    pub arguments: Vec<ExportedArgument>,
    /// Annotation id, `R` followed by digits.
    pub id: String,
    /// Relation type.
    pub label: String,
}

/// One event with its trigger entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedEvent {
    /// Entity or event arguments in record order.
    pub arguments: Vec<ExportedArgument>,
    /// Annotation id, `E` followed by digits.
    pub id: String,
    /// Event type.
    pub label: String,
    /// Id of the trigger entity.
    pub trigger: String,
}

/// One attribute on an entity, relation, or event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedAttribute {
    /// Annotation id, `A` or `M` followed by digits.
    pub id: String,
    /// Attribute name.
    pub label: String,
    /// Id of the annotated node.
    pub target: String,
    /// Value for multi-valued attributes; absent for flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ExportedDocument {
    /// Flatten a document into its exported form.
    pub fn from_document(document: &AnnotatedDocument) -> Self {
        let graph = document.graph();
        return Self {
            attributes: graph
                .attributes()
                .iter()
                .map(|a| {
                    return ExportedAttribute {
                        id: a.id.clone(),
                        label: a.label.clone(),
                        target: graph.attribute_target_id(a.target).to_string(),
                        value: a.value.clone(),
                    };
                })
                .collect(),
            entities: graph
                .entities()
                .iter()
                .map(|e| {
                    return ExportedEntity {
                        id: e.id.clone(),
                        label: e.label.clone(),
                        spans: e.spans.clone(),
                        text: e.text.clone(),
                    };
                })
                .collect(),
            events: graph
                .events()
                .iter()
                .map(|e| {
                    return ExportedEvent {
                        arguments: e
                            .arguments
                            .iter()
                            .map(|a| {
                                return ExportedArgument {
                                    role: a.role.clone(),
                                    target: graph.argument_target_id(a.target).to_string(),
                                };
                            })
                            .collect(),
                        id: e.id.clone(),
                        label: e.label.clone(),
                        trigger: graph.entity_id(e.trigger).to_string(),
                    };
                })
                .collect(),
            key: document.key().to_string(),
            relations: graph
                .relations()
                .iter()
                .map(|r| {
                    return ExportedRelation {
                        arguments: r
                            .arguments
                            .iter()
                            .map(|a| {
                                return ExportedArgument {
                                    role: a.role.clone(),
                                    target: graph.entity_id(a.entity).to_string(),
                                };
                            })
                            .collect(),
                        id: r.id.clone(),
                        label: r.label.clone(),
                    };
                })
                .collect(),
            sentences: document
                .sentences()
                .iter()
                .map(|s| return export_sentence(s, graph))
                .collect(),
            text: document.text().to_string(),
        };
    }

    /// Turn the exported graph back into unresolved records, numbered in
    /// export order, ready for the resolver.
    pub fn to_records(&self) -> Vec<Record> {
        let entities = self.entities.iter().map(|e| {
            return (
                e.id.clone(),
                RecordKind::Entity {
                    label: e.label.clone(),
                    spans: e.spans.clone(),
                    surface: Some(e.text.clone()),
                },
            );
        });
        let relations = self.relations.iter().map(|r| {
            return (
                r.id.clone(),
                RecordKind::Relation {
                    arguments: role_refs(&r.arguments),
                    label: r.label.clone(),
                },
            );
        });
        let events = self.events.iter().map(|e| {
            return (
                e.id.clone(),
                RecordKind::Event {
                    arguments: role_refs(&e.arguments),
                    label: e.label.clone(),
                    trigger: e.trigger.clone(),
                },
            );
        });
        let attributes = self.attributes.iter().map(|a| {
            return (
                a.id.clone(),
                RecordKind::Attribute {
                    label: a.label.clone(),
                    target: a.target.clone(),
                    value: a.value.clone(),
                },
            );
        });

        return entities
            .chain(relations)
            .chain(events)
            .chain(attributes)
            .enumerate()
            .map(|(idx, (id, kind))| {
                return Record {
                    id,
                    kind,
                    line: idx.saturating_add(1),
                };
            })
            .collect();
    }
}

fn export_sentence(sentence: &Sentence, graph: &AnnotationGraph) -> ExportedSentence {
    return ExportedSentence {
        span: sentence.span,
        words: sentence
            .words
            .iter()
            .map(|w| {
                return ExportedWord {
                    annotations: w
                        .annotations
                        .iter()
                        .map(|idx| return graph.entity_id(*idx).to_string())
                        .collect(),
                    span: w.span,
                    text: w.text.clone(),
                };
            })
            .collect(),
    };
}

fn role_refs(arguments: &[ExportedArgument]) -> Vec<RoleRef> {
    return arguments
        .iter()
        .map(|a| {
            return RoleRef {
                role: a.role.clone(),
                target: a.target.clone(),
            };
        })
        .collect();
}
