use std::fmt::Write as _;
use std::path::Path;

use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// A `Document` error is rendered as its underlying error with a
/// `## Document` section naming the annotation file.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::Document { path, source } => {
            let mut out = render_error(source);
            let _ = write!(out, "\n## Document\n\n`{}`\n", path.display());
            out
        },
        Error::CyclicReference { cycle } => render_cyclic_reference(cycle),
        Error::DanglingReference { missing, referencing } => render_dangling_reference(missing, referencing),
        Error::KeyCollision { first, key, second } => render_key_collision(first, key, second),
        Error::WrongReferenceKind {
            expected,
            found,
            referencing,
            target,
        } => render_wrong_reference_kind(expected, found, referencing, target),
        _ => render_generic(e),
    };
}

fn render_generic(e: &Error) -> String {
    return match e {
        Error::CacheCorrupt { path, reason } => format!("\
# Error: Cache Corrupt

`{}`: {reason}

## Fix

Delete the cache file; it is rebuilt on the next cached load.
", path.display()),

        Error::Consistency { id, reason } => format!("\
# Error: Inconsistent Annotation

Annotation `{id}` does not match the text: {reason}
"),

        Error::DuplicateId { id, line } => format!("\
# Error: Duplicate Id

`{id}` is declared again on line {line}.
"),

        Error::FileNotFound { path } => format!("\
# Error: File Not Found

`{}` does not exist.
", path.display()),

        Error::NotADirectory { path } => format!("\
# Error: Not A Directory

`{}` is not a corpus directory.
", path.display()),

        Error::Parse { line, reason } => format!("\
# Error: Parse Failed

Line {line}: {reason}
"),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),
        Error::Json(e) => format!("\
# Error: JSON

{e}
"),
        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}

## Fix

Check `.standoff.toml` at the corpus root.
"),
        Error::Watch { reason } => format!("\
# Error: Watch Failed

{reason}
"),
        // Handled in render_error.
        _ => format!("\
# Error

{e}
"),
    };
}

fn render_cyclic_reference(cycle: &[String]) -> String {
    let mut out = "\
# Error: Cyclic Event Reference

Events refer to each other in a loop:

"
    .to_string();
    let _ = writeln!(out, "    {}", cycle.join(" -> "));
    return out;
}

fn render_dangling_reference(missing: &str, referencing: &str) -> String {
    return format!("\
# Error: Dangling Reference

`{referencing}` refers to `{missing}`, which no annotation in the document declares.
");
}

fn render_key_collision(first: &Path, key: &str, second: &Path) -> String {
    return format!("\
# Error: Document Key Collision

Both annotation files map to document key `{key}`:

- `{}`
- `{}`

## Fix

Rename one of the files, or exclude one directory in `.standoff.toml`.
", first.display(), second.display());
}

fn render_wrong_reference_kind(expected: &str, found: &str, referencing: &str, target: &str) -> String {
    return format!("\
# Error: Wrong Reference Kind

`{referencing}` refers to `{target}`, which is {found}; expected {expected}.
");
}
