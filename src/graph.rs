//! The resolved, immutable annotation graph of one document.
//!
//! Nodes live in per-kind arenas. Cross references are typed indices into
//! those arenas, never pointers, so the graph serializes as plain data.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::types::Span;

/// Position of an entity in [`AnnotationGraph::entities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityIndex(pub usize);

/// Position of an event in [`AnnotationGraph::events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventIndex(pub usize);

/// Position of a relation in [`AnnotationGraph::relations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationIndex(pub usize);

/// Position of an attribute in [`AnnotationGraph::attributes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttributeIndex(pub usize);

/// Any node of the graph, addressed by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRef {
    /// An attribute node.
    Attribute(AttributeIndex),
    /// An entity node.
    Entity(EntityIndex),
    /// An event node.
    Event(EventIndex),
    /// A relation node.
    Relation(RelationIndex),
}

impl NodeRef {
    /// Kind name used in diagnostics.
    pub const fn kind_name(self) -> &'static str {
        return match self {
            Self::Attribute(_) => "attribute",
            Self::Entity(_) => "entity",
            Self::Event(_) => "event",
            Self::Relation(_) => "relation",
        };
    }
}

/// A typed text span, possibly discontinuous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Annotation id, e.g. `T1`.
    pub id: String,
    /// Entity type label.
    pub label: String,
    /// One or more fragments in ascending order.
    pub spans: Vec<Span>,
    /// The raw text covered by `spans`, concatenated in span order.
    pub text: String,
}

/// A typed link between entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Role arguments in declaration order.
    pub arguments: Vec<RelationArgument>,
    /// Annotation id, e.g. `R1`.
    pub id: String,
    /// Relation type label.
    pub label: String,
}

/// One `role:entity` argument of a relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationArgument {
    /// The referenced entity.
    pub entity: EntityIndex,
    /// Role name.
    pub role: String,
}

/// A trigger entity plus role arguments, which may be nested events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Role arguments in declaration order.
    pub arguments: Vec<EventArgument>,
    /// Annotation id, e.g. `E1`.
    pub id: String,
    /// Event type label.
    pub label: String,
    /// The trigger entity.
    pub trigger: EntityIndex,
}

/// One `role:target` argument of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventArgument {
    /// Role name.
    pub role: String,
    /// The referenced entity or event.
    pub target: ArgumentTarget,
}

/// What an event argument may point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArgumentTarget {
    /// An entity argument.
    Entity(EntityIndex),
    /// A nested event argument.
    Event(EventIndex),
}

/// A flag or key/value modifier. Always a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Annotation id, e.g. `A1`.
    pub id: String,
    /// Attribute type label.
    pub label: String,
    /// The annotated node.
    pub target: AttributeTarget,
    /// Optional value token.
    pub value: Option<String>,
}

/// What an attribute may annotate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeTarget {
    /// Attribute on an entity.
    Entity(EntityIndex),
    /// Attribute on an event.
    Event(EventIndex),
    /// Attribute on a relation.
    Relation(RelationIndex),
}

/// Fully linked annotations of one document.
///
/// Built only by the resolver (or deserialized from a snapshot the resolver
/// produced), so every index is in bounds and event references are acyclic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationGraph {
    /// Attribute arena.
    pub(crate) attributes: Vec<Attribute>,
    /// Entity arena.
    pub(crate) entities: Vec<Entity>,
    /// Event arena.
    pub(crate) events: Vec<Event>,
    /// Id to node lookup.
    pub(crate) ids: BTreeMap<String, NodeRef>,
    /// Relation arena.
    pub(crate) relations: Vec<Relation>,
}

impl AnnotationGraph {
    /// Annotation id an event argument points at.
    pub fn argument_target_id(&self, target: ArgumentTarget) -> &str {
        return match target {
            ArgumentTarget::Entity(index) => self.entity_id(index),
            ArgumentTarget::Event(index) => self.event_id(index),
        };
    }

    /// Annotation id an attribute points at.
    pub fn attribute_target_id(&self, target: AttributeTarget) -> &str {
        return match target {
            AttributeTarget::Entity(index) => self.entity_id(index),
            AttributeTarget::Event(index) => self.event_id(index),
            AttributeTarget::Relation(index) => self.relation_id(index),
        };
    }

    /// Attribute arena, in record order.
    pub fn attributes(&self) -> &[Attribute] {
        return &self.attributes;
    }

    /// Attributes attached to the node with the given id.
    pub fn attributes_of(&self, id: &str) -> Vec<&Attribute> {
        return self
            .attributes
            .iter()
            .filter(|a| return self.attribute_target_id(a.target) == id)
            .collect();
    }

    /// Entity arena, in record order.
    pub fn entities(&self) -> &[Entity] {
        return &self.entities;
    }

    /// Entity at an arena index.
    pub fn entity(&self, index: EntityIndex) -> Option<&Entity> {
        return self.entities.get(index.0);
    }

    /// Look up an entity by annotation id.
    pub fn entity_by_id(&self, id: &str) -> Option<&Entity> {
        return match self.get(id)? {
            NodeRef::Entity(index) => self.entity(index),
            _ => None,
        };
    }

    /// Annotation id of an entity index. Empty if out of bounds.
    pub fn entity_id(&self, index: EntityIndex) -> &str {
        return self.entity(index).map_or("", |e| return e.id.as_str());
    }

    /// Event at an arena index.
    pub fn event(&self, index: EventIndex) -> Option<&Event> {
        return self.events.get(index.0);
    }

    /// Annotation id of an event index. Empty if out of bounds.
    pub fn event_id(&self, index: EventIndex) -> &str {
        return self.event(index).map_or("", |e| return e.id.as_str());
    }

    /// Event arena, in record order.
    pub fn events(&self) -> &[Event] {
        return &self.events;
    }

    /// Look up any node by its annotation id.
    pub fn get(&self, id: &str) -> Option<NodeRef> {
        return self.ids.get(id).copied();
    }

    /// Whether the graph holds no nodes.
    pub fn is_empty(&self) -> bool {
        return self.ids.is_empty();
    }

    /// Total number of nodes across all arenas.
    pub fn len(&self) -> usize {
        return self.ids.len();
    }

    /// Relation at an arena index.
    pub fn relation(&self, index: RelationIndex) -> Option<&Relation> {
        return self.relations.get(index.0);
    }

    /// Annotation id of a relation index. Empty if out of bounds.
    pub fn relation_id(&self, index: RelationIndex) -> &str {
        return self.relation(index).map_or("", |r| return r.id.as_str());
    }

    /// Relation arena, in record order.
    pub fn relations(&self) -> &[Relation] {
        return &self.relations;
    }

    /// Serialize back to standoff lines, one record per line.
    ///
    /// Entities come first, then relations, events, and attributes, each in
    /// arena order. Discontinuous entities write their concatenated surface
    /// text. Notes are not part of the graph and are not written.
    pub fn to_standoff(&self) -> String {
        let mut out = String::new();
        for entity in &self.entities {
            let offsets = entity
                .spans
                .iter()
                .map(|s| return format!("{} {}", s.start, s.end))
                .collect::<Vec<_>>()
                .join(";");
            let _ = writeln!(out, "{}\t{} {offsets}\t{}", entity.id, entity.label, entity.text);
        }
        for relation in &self.relations {
            let args = relation
                .arguments
                .iter()
                .map(|a| return format!("{}:{}", a.role, self.entity_id(a.entity)))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = writeln!(out, "{}\t{} {args}", relation.id, relation.label);
        }
        for event in &self.events {
            let _ = write!(out, "{}\t{}:{}", event.id, event.label, self.entity_id(event.trigger));
            for argument in &event.arguments {
                let _ = write!(out, " {}:{}", argument.role, self.argument_target_id(argument.target));
            }
            out.push('\n');
        }
        for attribute in &self.attributes {
            let target = self.attribute_target_id(attribute.target);
            let _ = match &attribute.value {
                Some(value) => writeln!(out, "{}\t{} {target} {value}", attribute.id, attribute.label),
                None => writeln!(out, "{}\t{} {target}", attribute.id, attribute.label),
            };
        }
        return out;
    }
}
