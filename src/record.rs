//! Line-level parser for standoff annotation files.
//!
//! Each non-blank line becomes one unresolved [`Record`]. Parsing never looks
//! at other lines; references stay as string ids until the resolver links them.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;
use crate::types::Span;

/// Annotation ids: one marker character followed by digits.
static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used, reason = "hardcoded pattern is a compile-time invariant")]
    return Regex::new(r"^[TREAM#][0-9]+$").expect("valid regex");
});

/// One parsed annotation line, references still unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Annotation id such as `T3` or `E1`.
    pub id: String,
    /// What the line declares.
    pub kind: RecordKind,
    /// One-based line number in the annotation file.
    pub line: usize,
}

/// The typed payload of a record, one variant per line marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKind {
    /// `A`/`M` lines: a flag or key/value attached to another annotation.
    Attribute {
        /// Attribute type label.
        label: String,
        /// Id of the annotated record.
        target: String,
        /// Optional value token.
        value: Option<String>,
    },
    /// `T` lines: a typed, possibly discontinuous text span.
    Entity {
        /// Entity type label.
        label: String,
        /// Fragments in ascending, non-overlapping order.
        spans: Vec<Span>,
        /// Surface text as written in the file, checked later against the raw text.
        surface: Option<String>,
    },
    /// `E` lines: a trigger plus role arguments.
    Event {
        /// Role arguments in file order.
        arguments: Vec<RoleRef>,
        /// Event type label, taken from the trigger token.
        label: String,
        /// Id of the trigger entity.
        trigger: String,
    },
    /// `#` lines: free-text comments. Parsed, never linked.
    Note {
        /// Note type label.
        label: String,
        /// Id of the annotated record.
        target: String,
        /// Comment body.
        text: String,
    },
    /// `R` lines: a typed link between entities.
    Relation {
        /// Role arguments in file order.
        arguments: Vec<RoleRef>,
        /// Relation type label.
        label: String,
    },
}

impl RecordKind {
    /// Whether `id` is well formed and its marker character declares this kind.
    pub fn accepts_id(&self, id: &str) -> bool {
        if !ID_PATTERN.is_match(id) {
            return false;
        }
        return match (self, id.chars().next()) {
            (Self::Attribute { .. }, Some('A' | 'M'))
            | (Self::Entity { .. }, Some('T'))
            | (Self::Event { .. }, Some('E'))
            | (Self::Note { .. }, Some('#'))
            | (Self::Relation { .. }, Some('R')) => true,
            _ => false,
        };
    }

    /// Human-readable kind name used in diagnostics.
    pub const fn name(&self) -> &'static str {
        return match self {
            Self::Attribute { .. } => "attribute",
            Self::Entity { .. } => "entity",
            Self::Event { .. } => "event",
            Self::Note { .. } => "note",
            Self::Relation { .. } => "relation",
        };
    }
}

/// A `role:id` token from a relation or event line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRef {
    /// Role name such as `Arg1` or `Theme`.
    pub role: String,
    /// Referenced annotation id.
    pub target: String,
}

/// Parse a whole annotation file. Blank lines are skipped.
///
/// # Errors
///
/// Returns the first `Error::Parse` encountered, carrying its line number.
pub fn parse_annotations(content: &str) -> Result<Vec<Record>, Error> {
    let mut records = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        let line_number = idx.saturating_add(1);
        records.push(parse_line(raw, line_number)?);
    }
    return Ok(records);
}

/// Parse one annotation line into a typed, unresolved record.
///
/// # Errors
///
/// Returns `Error::Parse` if the marker is unknown, a required field is missing,
/// or a span list is malformed.
pub fn parse_line(line: &str, line_number: usize) -> Result<Record, Error> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let fail = |reason: String| return Error::Parse { line: line_number, reason };

    let mut fields = line.splitn(3, '\t');
    let id = fields.next().unwrap_or_default().trim();
    let Some(body) = fields.next() else {
        return Err(fail(format!("missing tab after id `{id}`")));
    };
    let trailing = fields.next();

    if !ID_PATTERN.is_match(id) {
        return Err(fail(format!("unrecognized annotation id `{id}`")));
    }

    let kind = match id.chars().next() {
        Some('A' | 'M') => parse_attribute(body).map_err(fail)?,
        Some('E') => parse_event(body).map_err(fail)?,
        Some('R') => parse_relation(body).map_err(fail)?,
        Some('T') => parse_entity(body, trailing).map_err(fail)?,
        Some('#') => parse_note(body, trailing).map_err(fail)?,
        _ => return Err(fail(format!("no recognizable marker in `{id}`"))),
    };

    return Ok(Record {
        id: id.to_string(),
        kind,
        line: line_number,
    });
}

/// `<Type> <target> [<value>]`
fn parse_attribute(body: &str) -> Result<RecordKind, String> {
    let mut tokens = body.split_whitespace();
    let label = tokens.next().ok_or("attribute is missing its type")?;
    let target = tokens.next().ok_or("attribute is missing its target")?;
    let value = tokens.next().map(String::from);
    if let Some(extra) = tokens.next() {
        return Err(format!("unexpected token `{extra}` after attribute value"));
    }
    return Ok(RecordKind::Attribute {
        label: label.to_string(),
        target: target.to_string(),
        value,
    });
}

/// `<Type> <start> <end>[;<start> <end>...]` followed by an optional surface text field.
fn parse_entity(body: &str, surface: Option<&str>) -> Result<RecordKind, String> {
    let Some((label, offsets)) = body.trim().split_once(' ') else {
        return Err("entity is missing its offsets".to_string());
    };
    let spans = parse_span_list(offsets)?;
    return Ok(RecordKind::Entity {
        label: label.to_string(),
        spans,
        surface: surface.map(String::from),
    });
}

/// `<Type>:<trigger> [<role>:<id> ...]`
fn parse_event(body: &str) -> Result<RecordKind, String> {
    let mut tokens = body.split_whitespace();
    let head = tokens.next().ok_or("event is missing its trigger")?;
    let trigger = parse_role_ref(head)?;
    let arguments = tokens.map(parse_role_ref).collect::<Result<Vec<_>, _>>()?;
    return Ok(RecordKind::Event {
        arguments,
        label: trigger.role,
        trigger: trigger.target,
    });
}

/// `<Type> <target>` followed by the free-text field.
fn parse_note(body: &str, text: Option<&str>) -> Result<RecordKind, String> {
    let mut tokens = body.split_whitespace();
    let label = tokens.next().ok_or("note is missing its type")?;
    let target = tokens.next().ok_or("note is missing its target")?;
    return Ok(RecordKind::Note {
        label: label.to_string(),
        target: target.to_string(),
        text: text.unwrap_or_default().to_string(),
    });
}

/// `<Type> <role>:<id> <role>:<id> [...]`
fn parse_relation(body: &str) -> Result<RecordKind, String> {
    let mut tokens = body.split_whitespace();
    let label = tokens.next().ok_or("relation is missing its type")?;
    let arguments = tokens.map(parse_role_ref).collect::<Result<Vec<_>, _>>()?;
    if arguments.len() < 2 {
        return Err(format!("relation `{label}` needs at least two arguments"));
    }
    return Ok(RecordKind::Relation {
        arguments,
        label: label.to_string(),
    });
}

/// Split a `role:id` token.
fn parse_role_ref(token: &str) -> Result<RoleRef, String> {
    return match token.split_once(':') {
        Some((role, target)) if !role.is_empty() && !target.is_empty() => Ok(RoleRef {
            role: role.to_string(),
            target: target.to_string(),
        }),
        _ => Err(format!("expected `role:id`, found `{token}`")),
    };
}

/// Parse `;`-separated `start end` pairs. Fragments must ascend without overlapping.
fn parse_span_list(offsets: &str) -> Result<Vec<Span>, String> {
    let spans = offsets.split(';').map(parse_span).collect::<Result<Vec<_>, _>>()?;
    Span::validate_list(&spans)?;
    return Ok(spans);
}

/// Parse one `start end` pair.
fn parse_span(fragment: &str) -> Result<Span, String> {
    let mut numbers = fragment.split_whitespace();
    let (Some(start), Some(end), None) = (numbers.next(), numbers.next(), numbers.next()) else {
        return Err(format!("expected `start end`, found `{}`", fragment.trim()));
    };
    let start: usize = start.parse().map_err(|_err| return format!("bad offset `{start}`"))?;
    let end: usize = end.parse().map_err(|_err| return format!("bad offset `{end}`"))?;
    return Ok(Span::new(start, end));
}
