//! Content fingerprints for cache validation.

use sha2::{Digest as _, Sha256};

use crate::graph::AnnotationGraph;
use crate::types::Fingerprint;

/// Fingerprint a document from its annotation and text bytes.
///
/// The annotation length is hashed first so that moving bytes between the two
/// files always changes the digest.
pub fn fingerprint(annotations: &[u8], text: &[u8]) -> Fingerprint {
    let annotations_len = u64::try_from(annotations.len()).unwrap_or(u64::MAX);
    let mut hasher = Sha256::new();
    hasher.update(annotations_len.to_le_bytes());
    hasher.update(annotations);
    hasher.update(text);
    let digest = hasher.finalize();
    return Fingerprint(format!("{digest:x}"));
}

/// Bind a resolved graph to the fingerprint of the files it was built from.
/// Any edit to the graph's labels, spans, or links changes the digest.
pub fn graph_digest(source: &Fingerprint, graph: &AnnotationGraph) -> Fingerprint {
    return fingerprint(source.0.as_bytes(), graph.to_standoff().as_bytes());
}

#[cfg(test)]
mod tests {
    use super::{fingerprint, graph_digest};
    use crate::record::parse_annotations;
    use crate::resolver::resolve;

    #[test]
    fn is_lowercase_hex_sha256() {
        let fp = fingerprint(b"T1\tA 0 1\tx\n", b"x");
        assert_eq!(fp.0.len(), 64);
        assert!(fp.0.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn boundary_between_files_matters() {
        assert_ne!(fingerprint(b"ab", b"c"), fingerprint(b"a", b"bc"));
    }

    #[test]
    fn stable_for_same_input() {
        assert_eq!(fingerprint(b"ann", b"text"), fingerprint(b"ann", b"text"));
    }

    #[test]
    fn graph_digest_tracks_graph_content() {
        let source = fingerprint(b"ann", b"foo");
        let graph = resolve(&parse_annotations("T1\tA 0 3\tfoo\n").unwrap(), "foo").unwrap();
        let relabelled = resolve(&parse_annotations("T1\tB 0 3\tfoo\n").unwrap(), "foo").unwrap();
        assert_eq!(graph_digest(&source, &graph), graph_digest(&source, &graph.clone()));
        assert_ne!(graph_digest(&source, &graph), graph_digest(&source, &relabelled));
    }
}
