//! Links parsed records into an [`AnnotationGraph`].
//!
//! Pass one assigns every record an arena slot keyed by id, so references may
//! point forward or backward in the file. Pass two builds each arena in file
//! order, validating spans against the raw text and every reference against
//! the slot table. A final pass rejects cycles among nested events.

use std::collections::{BTreeMap, HashSet};

use crate::error::Error;
use crate::graph::{
    AnnotationGraph, ArgumentTarget, Attribute, AttributeIndex, AttributeTarget, Entity,
    EntityIndex, Event, EventArgument, EventIndex, NodeRef, Relation, RelationArgument,
    RelationIndex,
};
use crate::record::{Record, RecordKind, RoleRef};
use crate::types::{CharIndex, Span};

/// Resolve one document's records against its raw text.
///
/// Resolution is all-or-nothing: the first problem found aborts it.
///
/// # Errors
///
/// Returns `Error::DuplicateId` if an id repeats, `Error::Consistency` if a
/// span falls outside `text` or its surface text disagrees,
/// `Error::DanglingReference` for a missing id, `Error::WrongReferenceKind`
/// for a reference to the wrong kind of record, or `Error::CyclicReference`
/// if events reference each other in a loop.
pub fn resolve(records: &[Record], text: &str) -> Result<AnnotationGraph, Error> {
    let ids = assign_slots(records)?;
    let index = CharIndex::new(text);

    let mut graph = AnnotationGraph::default();
    for record in records {
        if let RecordKind::Entity { label, spans, surface } = &record.kind {
            let entity = build_entity(&record.id, label, spans, surface.as_deref(), text, &index)?;
            graph.entities.push(entity);
        }
    }
    for record in records {
        if let RecordKind::Relation { label, arguments } = &record.kind {
            graph.relations.push(build_relation(&ids, &record.id, label, arguments)?);
        }
    }
    for record in records {
        if let RecordKind::Event { label, trigger, arguments } = &record.kind {
            graph.events.push(build_event(&ids, &record.id, label, trigger, arguments)?);
        }
    }
    for record in records {
        if let RecordKind::Attribute { label, target, value } = &record.kind {
            graph.attributes.push(build_attribute(&ids, &record.id, label, target, value.as_ref())?);
        }
    }

    reject_event_cycles(&graph.events)?;
    graph.ids = ids;
    return Ok(graph);
}

/// Check a graph that did not come straight from [`resolve`], such as one
/// restored from a snapshot, against `text` and the rules `resolve` enforces.
///
/// # Errors
///
/// Returns `Error::Consistency` for an invalid fragment list, entity text that
/// no longer matches its spans, or an id table out of step with the arenas;
/// `Error::DanglingReference` for an index past the end of its arena; or
/// `Error::CyclicReference` if events reference each other in a loop.
pub fn verify(graph: &AnnotationGraph, text: &str) -> Result<(), Error> {
    let index = CharIndex::new(text);
    for (position, entity) in graph.entities.iter().enumerate() {
        expect_slot(graph, &entity.id, NodeRef::Entity(EntityIndex(position)))?;
        let rebuilt = build_entity(&entity.id, &entity.label, &entity.spans, None, text, &index)?;
        if rebuilt.text != entity.text {
            return Err(inconsistent(
                &entity.id,
                format!("recorded text {:?} does not match {:?} at its offsets", entity.text, rebuilt.text),
            ));
        }
    }

    for (position, relation) in graph.relations.iter().enumerate() {
        expect_slot(graph, &relation.id, NodeRef::Relation(RelationIndex(position)))?;
        if relation.arguments.len() < 2 {
            return Err(inconsistent(&relation.id, "relation needs at least two arguments".to_string()));
        }
        for argument in &relation.arguments {
            expect_node(graph, &relation.id, NodeRef::Entity(argument.entity))?;
        }
    }

    for (position, event) in graph.events.iter().enumerate() {
        expect_slot(graph, &event.id, NodeRef::Event(EventIndex(position)))?;
        expect_node(graph, &event.id, NodeRef::Entity(event.trigger))?;
        for argument in &event.arguments {
            let node = match argument.target {
                ArgumentTarget::Entity(entity) => NodeRef::Entity(entity),
                ArgumentTarget::Event(nested) => NodeRef::Event(nested),
            };
            expect_node(graph, &event.id, node)?;
        }
    }

    for (position, attribute) in graph.attributes.iter().enumerate() {
        expect_slot(graph, &attribute.id, NodeRef::Attribute(AttributeIndex(position)))?;
        let node = match attribute.target {
            AttributeTarget::Entity(entity) => NodeRef::Entity(entity),
            AttributeTarget::Event(event) => NodeRef::Event(event),
            AttributeTarget::Relation(relation) => NodeRef::Relation(relation),
        };
        expect_node(graph, &attribute.id, node)?;
    }

    for (id, node) in &graph.ids {
        if node_id(graph, *node) != Some(id.as_str()) {
            return Err(inconsistent(id, "id table points at a different node".to_string()));
        }
    }

    return reject_event_cycles(&graph.events);
}

/// Id of the node an index points at, if it is in bounds.
fn node_id(graph: &AnnotationGraph, node: NodeRef) -> Option<&str> {
    return match node {
        NodeRef::Attribute(index) => graph.attributes.get(index.0).map(|a| return a.id.as_str()),
        NodeRef::Entity(index) => graph.entity(index).map(|e| return e.id.as_str()),
        NodeRef::Event(index) => graph.event(index).map(|e| return e.id.as_str()),
        NodeRef::Relation(index) => graph.relation(index).map(|r| return r.id.as_str()),
    };
}

/// # Errors
///
/// Returns `Error::DanglingReference` if `node` is past the end of its arena.
fn expect_node(graph: &AnnotationGraph, referencing: &str, node: NodeRef) -> Result<(), Error> {
    if node_id(graph, node).is_some() {
        return Ok(());
    }
    let position = match node {
        NodeRef::Attribute(AttributeIndex(n))
        | NodeRef::Entity(EntityIndex(n))
        | NodeRef::Event(EventIndex(n))
        | NodeRef::Relation(RelationIndex(n)) => n,
    };
    return Err(Error::DanglingReference {
        missing: format!("{} #{position}", node.kind_name()),
        referencing: referencing.to_string(),
    });
}

/// # Errors
///
/// Returns `Error::Consistency` if the id table does not map `id` to `node`.
fn expect_slot(graph: &AnnotationGraph, id: &str, node: NodeRef) -> Result<(), Error> {
    if graph.ids.get(id) == Some(&node) {
        return Ok(());
    }
    return Err(inconsistent(id, "missing from the id table".to_string()));
}

/// Give every graph record an arena slot in file order. Notes only take part
/// in the duplicate check.
///
/// # Errors
///
/// Returns `Error::Parse` if an id's marker does not match its record kind,
/// or `Error::DuplicateId` on the second declaration of an id.
fn assign_slots(records: &[Record]) -> Result<BTreeMap<String, NodeRef>, Error> {
    let mut ids = BTreeMap::new();
    let mut notes: HashSet<&str> = HashSet::new();
    let (mut attributes, mut entities, mut events, mut relations) = (0_usize, 0_usize, 0_usize, 0_usize);

    for record in records {
        if !record.kind.accepts_id(&record.id) {
            return Err(Error::Parse {
                line: record.line,
                reason: format!("id `{}` does not name {} record", record.id, record.kind.name()),
            });
        }
        let slot = match record.kind {
            RecordKind::Attribute { .. } => NodeRef::Attribute(AttributeIndex(next_slot(&mut attributes))),
            RecordKind::Entity { .. } => NodeRef::Entity(EntityIndex(next_slot(&mut entities))),
            RecordKind::Event { .. } => NodeRef::Event(EventIndex(next_slot(&mut events))),
            RecordKind::Relation { .. } => NodeRef::Relation(RelationIndex(next_slot(&mut relations))),
            RecordKind::Note { .. } => {
                if !notes.insert(record.id.as_str()) {
                    return Err(duplicate(record));
                }
                continue;
            },
        };
        if ids.insert(record.id.clone(), slot).is_some() {
            return Err(duplicate(record));
        }
    }
    return Ok(ids);
}

/// Return the current counter value and advance it.
fn next_slot(counter: &mut usize) -> usize {
    let slot = *counter;
    *counter = counter.saturating_add(1);
    return slot;
}

fn duplicate(record: &Record) -> Error {
    return Error::DuplicateId {
        id: record.id.clone(),
        line: record.line,
    };
}

/// Validate spans and surface text, then materialize the entity.
///
/// # Errors
///
/// Returns `Error::Consistency` if the fragment list is empty, unordered, or
/// overlapping, a span runs past the text, or the declared surface text
/// matches neither the concatenated nor the space-joined fragments.
fn build_entity(
    id: &str,
    label: &str,
    spans: &[Span],
    surface: Option<&str>,
    text: &str,
    index: &CharIndex,
) -> Result<Entity, Error> {
    Span::validate_list(spans).map_err(|reason| return inconsistent(id, reason))?;

    let mut fragments: Vec<&str> = Vec::with_capacity(spans.len());
    for span in spans {
        let Some(fragment) = index.slice(text, *span) else {
            return Err(Error::Consistency {
                id: id.to_string(),
                reason: format!(
                    "span {}-{} exceeds text length {}",
                    span.start,
                    span.end,
                    index.char_len()
                ),
            });
        };
        fragments.push(fragment);
    }

    let covered = fragments.concat();
    if let Some(declared) = surface
        && declared != covered
        && declared != fragments.join(" ")
    {
        return Err(Error::Consistency {
            id: id.to_string(),
            reason: format!("declared text {declared:?} does not match {covered:?} at its offsets"),
        });
    }

    return Ok(Entity {
        id: id.to_string(),
        label: label.to_string(),
        spans: spans.to_vec(),
        text: covered,
    });
}

/// # Errors
///
/// Returns `Error::Consistency` for fewer than two arguments, or
/// `Error::DanglingReference` or `Error::WrongReferenceKind` for a bad argument.
fn build_relation(
    ids: &BTreeMap<String, NodeRef>,
    id: &str,
    label: &str,
    arguments: &[RoleRef],
) -> Result<Relation, Error> {
    if arguments.len() < 2 {
        return Err(inconsistent(id, "relation needs at least two arguments".to_string()));
    }
    let mut resolved = Vec::with_capacity(arguments.len());
    for argument in arguments {
        let node = lookup(ids, id, &argument.target)?;
        let NodeRef::Entity(entity) = node else {
            return Err(wrong_kind(id, &argument.target, "entity", node));
        };
        resolved.push(RelationArgument {
            entity,
            role: argument.role.clone(),
        });
    }
    return Ok(Relation {
        arguments: resolved,
        id: id.to_string(),
        label: label.to_string(),
    });
}

/// # Errors
///
/// Returns `Error::DanglingReference` or `Error::WrongReferenceKind` for a bad
/// trigger or argument.
fn build_event(
    ids: &BTreeMap<String, NodeRef>,
    id: &str,
    label: &str,
    trigger: &str,
    arguments: &[RoleRef],
) -> Result<Event, Error> {
    let trigger_node = lookup(ids, id, trigger)?;
    let NodeRef::Entity(trigger_entity) = trigger_node else {
        return Err(wrong_kind(id, trigger, "entity", trigger_node));
    };

    let mut resolved = Vec::with_capacity(arguments.len());
    for argument in arguments {
        let target = match lookup(ids, id, &argument.target)? {
            NodeRef::Entity(entity) => ArgumentTarget::Entity(entity),
            NodeRef::Event(event) => ArgumentTarget::Event(event),
            other => return Err(wrong_kind(id, &argument.target, "entity or event", other)),
        };
        resolved.push(EventArgument {
            role: argument.role.clone(),
            target,
        });
    }

    return Ok(Event {
        arguments: resolved,
        id: id.to_string(),
        label: label.to_string(),
        trigger: trigger_entity,
    });
}

/// # Errors
///
/// Returns `Error::DanglingReference` or `Error::WrongReferenceKind` for a bad target.
fn build_attribute(
    ids: &BTreeMap<String, NodeRef>,
    id: &str,
    label: &str,
    target: &str,
    value: Option<&String>,
) -> Result<Attribute, Error> {
    let resolved = match lookup(ids, id, target)? {
        NodeRef::Entity(entity) => AttributeTarget::Entity(entity),
        NodeRef::Event(event) => AttributeTarget::Event(event),
        NodeRef::Relation(relation) => AttributeTarget::Relation(relation),
        other @ NodeRef::Attribute(_) => {
            return Err(wrong_kind(id, target, "entity, relation, or event", other));
        },
    };
    return Ok(Attribute {
        id: id.to_string(),
        label: label.to_string(),
        target: resolved,
        value: value.cloned(),
    });
}

/// # Errors
///
/// Returns `Error::DanglingReference` if `target` has no slot.
fn lookup(ids: &BTreeMap<String, NodeRef>, referencing: &str, target: &str) -> Result<NodeRef, Error> {
    return ids.get(target).copied().ok_or_else(|| {
        return Error::DanglingReference {
            missing: target.to_string(),
            referencing: referencing.to_string(),
        };
    });
}

fn inconsistent(id: &str, reason: String) -> Error {
    return Error::Consistency {
        id: id.to_string(),
        reason,
    };
}

fn wrong_kind(referencing: &str, target: &str, expected: &'static str, found: NodeRef) -> Error {
    return Error::WrongReferenceKind {
        expected,
        found: found.kind_name(),
        referencing: referencing.to_string(),
        target: target.to_string(),
    };
}

/// Visit state for the cycle search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// Fully explored, no cycle through it.
    Done,
    /// On the current search path.
    OnPath,
    /// Not reached yet.
    Unvisited,
}

/// Depth-first colouring over event-to-event arguments.
///
/// # Errors
///
/// Returns `Error::CyclicReference` listing the event ids on the first cycle found.
fn reject_event_cycles(events: &[Event]) -> Result<(), Error> {
    let mut marks = vec![Mark::Unvisited; events.len()];

    for root in 0..events.len() {
        if marks.get(root) != Some(&Mark::Unvisited) {
            continue;
        }
        set_mark(&mut marks, root, Mark::OnPath);
        // Each frame holds an event and the position of its next argument to visit.
        let mut path: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(frame) = path.last_mut() {
            let node = frame.0;
            let next = events
                .get(node)
                .and_then(|e| return e.arguments.get(frame.1))
                .map(|a| return a.target);
            frame.1 = frame.1.saturating_add(1);

            match next {
                None => {
                    set_mark(&mut marks, node, Mark::Done);
                    path.pop();
                },
                Some(ArgumentTarget::Entity(_)) => {},
                Some(ArgumentTarget::Event(EventIndex(child))) => match marks.get(child) {
                    Some(Mark::Unvisited) => {
                        set_mark(&mut marks, child, Mark::OnPath);
                        path.push((child, 0));
                    },
                    Some(Mark::OnPath) => return Err(cycle_error(events, &path, child)),
                    Some(Mark::Done) | None => {},
                },
            }
        }
    }
    return Ok(());
}

fn set_mark(marks: &mut [Mark], index: usize, mark: Mark) {
    if let Some(slot) = marks.get_mut(index) {
        *slot = mark;
    }
}

/// Build the cycle error from the search path, starting at the revisited event.
fn cycle_error(events: &[Event], path: &[(usize, usize)], revisited: usize) -> Error {
    let start = path.iter().position(|(node, _)| return *node == revisited).unwrap_or(0);
    let id_of = |node: usize| return events.get(node).map(|e| return e.id.clone()).unwrap_or_default();
    let mut cycle: Vec<String> = path.iter().skip(start).map(|(node, _)| return id_of(*node)).collect();
    cycle.push(id_of(revisited));
    return Error::CyclicReference { cycle };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc)]
mod tests {
    use super::*;
    use crate::record::parse_annotations;

    fn resolve_str(ann: &str, text: &str) -> Result<AnnotationGraph, Error> {
        let records = parse_annotations(ann).unwrap();
        resolve(&records, text)
    }

    #[test]
    fn discontinuous_entity_concatenates_fragments() {
        let graph = resolve_str("T1\tMISC 0 3;8 11\tfoobaz\n", "foo bar baz").unwrap();
        let entity = graph.entity_by_id("T1").unwrap();
        assert_eq!(entity.spans, vec![Span::new(0, 3), Span::new(8, 11)]);
        assert_eq!(entity.text, "foobaz");
    }

    #[test]
    fn space_joined_surface_text_is_accepted() {
        let graph = resolve_str("T1\tMISC 0 3;8 11\tfoo baz\n", "foo bar baz").unwrap();
        assert_eq!(graph.entity_by_id("T1").unwrap().text, "foobaz");
    }

    #[test]
    fn surface_mismatch_is_a_consistency_error() {
        let err = resolve_str("T1\tPerson 0 3\tbar\n", "foo bar").unwrap_err();
        assert!(matches!(err, Error::Consistency { ref id, .. } if id == "T1"), "{err:?}");
    }

    #[test]
    fn span_past_end_of_text_is_a_consistency_error() {
        let err = resolve_str("T1\tPerson 4 12\n", "foo bar").unwrap_err();
        let Error::Consistency { reason, .. } = err else {
            panic!("expected consistency error, got {err:?}");
        };
        assert!(reason.contains("exceeds text length 7"), "{reason}");
    }

    #[test]
    fn offsets_count_characters_not_bytes() {
        let graph = resolve_str("T1\tCity 10 16\tZürich\n", "I live in Zürich.").unwrap();
        assert_eq!(graph.entity_by_id("T1").unwrap().text, "Zürich");
    }

    #[test]
    fn dangling_relation_argument_names_both_ids() {
        let ann = "T1\tPerson 0 3\tfoo\nR1\tWorksFor Arg1:T1 Arg2:T99\n";
        let err = resolve_str(ann, "foo bar").unwrap_err();
        let Error::DanglingReference { missing, referencing } = err else {
            panic!("expected dangling reference, got {err:?}");
        };
        assert_eq!(missing, "T99");
        assert_eq!(referencing, "R1");
    }

    #[test]
    fn forward_references_resolve() {
        let ann = "E1\tAttack:T1 Target:E2\nA1\tNegated E2\nE2\tDie:T2 Victim:T1\nT1\tAttack 0 3\tfoo\nT2\tDie 4 7\tbar\n";
        let graph = resolve_str(ann, "foo bar").unwrap();
        assert_eq!(graph.events().len(), 2);
        let outer = &graph.events()[0];
        assert_eq!(graph.entity_id(outer.trigger), "T1");
        assert_eq!(graph.argument_target_id(outer.arguments[0].target), "E2");
        assert_eq!(graph.attributes_of("E2").len(), 1);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let err = resolve_str("T1\tA 0 1\tf\nT1\tB 1 2\to\n", "foo").unwrap_err();
        assert!(matches!(err, Error::DuplicateId { ref id, line: 2 } if id == "T1"), "{err:?}");
    }

    #[test]
    fn duplicate_note_id_is_rejected() {
        let err = resolve_str("T1\tA 0 1\tf\n#1\tNote T1\ta\n#1\tNote T1\tb\n", "foo").unwrap_err();
        assert!(matches!(err, Error::DuplicateId { line: 3, .. }), "{err:?}");
    }

    #[test]
    fn notes_are_excluded_from_graph() {
        let graph = resolve_str("T1\tA 0 1\tf\n#1\tAnnotatorNotes T404\thmm\n", "foo").unwrap();
        assert_eq!(graph.len(), 1);
        assert!(graph.get("#1").is_none());
    }

    #[test]
    fn event_cycle_is_rejected() {
        let ann = "T1\tFoo 0 3\tfoo\nE1\tFoo:T1 Arg:E2\nE2\tFoo:T1 Arg:E1\n";
        let err = resolve_str(ann, "foo").unwrap_err();
        let Error::CyclicReference { cycle } = err else {
            panic!("expected cycle, got {err:?}");
        };
        assert_eq!(cycle, vec!["E1", "E2", "E1"]);
    }

    #[test]
    fn self_referencing_event_is_a_cycle() {
        let err = resolve_str("T1\tFoo 0 3\tfoo\nE1\tFoo:T1 Arg:E1\n", "foo").unwrap_err();
        assert!(matches!(err, Error::CyclicReference { .. }), "{err:?}");
    }

    #[test]
    fn shared_nested_event_is_not_a_cycle() {
        let ann = "T1\tFoo 0 3\tfoo\nE1\tFoo:T1 A:E3 B:E2\nE2\tFoo:T1 A:E3\nE3\tFoo:T1\n";
        assert!(resolve_str(ann, "foo").is_ok());
    }

    #[test]
    fn relation_to_event_is_wrong_kind() {
        let ann = "T1\tFoo 0 3\tfoo\nE1\tFoo:T1\nR1\tRel Arg1:T1 Arg2:E1\n";
        let err = resolve_str(ann, "foo").unwrap_err();
        assert!(
            matches!(err, Error::WrongReferenceKind { expected: "entity", found: "event", .. }),
            "{err:?}"
        );
    }

    #[test]
    fn attribute_on_attribute_is_wrong_kind() {
        let ann = "T1\tFoo 0 3\tfoo\nA1\tFlag T1\nA2\tFlag A1\n";
        let err = resolve_str(ann, "foo").unwrap_err();
        assert!(matches!(err, Error::WrongReferenceKind { found: "attribute", .. }), "{err:?}");
    }

    #[test]
    fn to_standoff_reproduces_graph_lines() {
        let ann = "T1\tMISC 0 3;8 11\tfoobaz\nT2\tPerson 4 7\tbar\nR1\tNear Arg1:T1 Arg2:T2\nE1\tMeet:T2 Who:T1\nA1\tNegation E1\nM2\tLevel T1 High\n";
        let graph = resolve_str(ann, "foo bar baz").unwrap();
        assert_eq!(graph.to_standoff(), ann);
    }

    fn entity_record(id: &str, spans: Vec<Span>) -> Record {
        Record {
            id: id.to_string(),
            kind: RecordKind::Entity {
                label: "X".to_string(),
                spans,
                surface: None,
            },
            line: 1,
        }
    }

    #[test]
    fn unparsed_records_get_the_same_span_checks() {
        for spans in [vec![], vec![Span::new(2, 2)], vec![Span::new(0, 3), Span::new(1, 4)]] {
            let err = resolve(&[entity_record("T1", spans.clone())], "foo bar").unwrap_err();
            assert!(matches!(err, Error::Consistency { ref id, .. } if id == "T1"), "{spans:?}: {err:?}");
        }
    }

    #[test]
    fn id_marker_must_match_record_kind() {
        let err = resolve(&[entity_record("R1", vec![Span::new(0, 3)])], "foo").unwrap_err();
        let Error::Parse { reason, .. } = err else {
            panic!("expected parse error, got {err:?}");
        };
        assert!(reason.contains("does not name entity record"), "{reason}");
    }

    #[test]
    fn unparsed_single_argument_relation_is_rejected() {
        let records = vec![
            entity_record("T1", vec![Span::new(0, 3)]),
            Record {
                id: "R1".to_string(),
                kind: RecordKind::Relation {
                    arguments: vec![RoleRef {
                        role: "Arg1".to_string(),
                        target: "T1".to_string(),
                    }],
                    label: "Rel".to_string(),
                },
                line: 2,
            },
        ];
        let err = resolve(&records, "foo").unwrap_err();
        assert!(matches!(err, Error::Consistency { ref id, .. } if id == "R1"), "{err:?}");
    }

    const FULL: &str = "T1\tFoo 0 3\tfoo\nT2\tBar 4 7\tbar\nR1\tRel Arg1:T1 Arg2:T2\nE1\tEv:T1 A:T2\nE2\tEv:T2 B:E1\nA1\tFlag E2\n";

    #[test]
    fn verify_accepts_a_resolved_graph() {
        let graph = resolve_str(FULL, "foo bar").unwrap();
        verify(&graph, "foo bar").unwrap();
    }

    #[test]
    fn verify_rejects_out_of_range_indices() {
        let mut graph = resolve_str(FULL, "foo bar").unwrap();
        graph.relations[0].arguments[1].entity = EntityIndex(99);
        let err = verify(&graph, "foo bar").unwrap_err();
        let Error::DanglingReference { missing, referencing } = err else {
            panic!("expected dangling reference, got {err:?}");
        };
        assert_eq!(missing, "entity #99");
        assert_eq!(referencing, "R1");
    }

    #[test]
    fn verify_rejects_text_that_no_longer_matches() {
        let graph = resolve_str(FULL, "foo bar").unwrap();
        let err = verify(&graph, "fox bar").unwrap_err();
        assert!(matches!(err, Error::Consistency { ref id, .. } if id == "T1"), "{err:?}");
    }

    #[test]
    fn verify_rejects_a_stale_id_table() {
        let mut graph = resolve_str(FULL, "foo bar").unwrap();
        graph.ids.insert("T9".to_string(), NodeRef::Entity(EntityIndex(0)));
        let err = verify(&graph, "foo bar").unwrap_err();
        assert!(matches!(err, Error::Consistency { ref id, .. } if id == "T9"), "{err:?}");
    }

    #[test]
    fn verify_rejects_event_cycles() {
        let mut graph = resolve_str(FULL, "foo bar").unwrap();
        graph.events[0].arguments.push(EventArgument {
            role: "C".to_string(),
            target: ArgumentTarget::Event(EventIndex(1)),
        });
        let err = verify(&graph, "foo bar").unwrap_err();
        assert!(matches!(err, Error::CyclicReference { .. }), "{err:?}");
    }
}
