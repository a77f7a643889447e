//! Property-based tests for chunking and attribute expressions.
//!
//! These tests verify invariants that hold for any document:
//! - Filters: never add rows, never touch membership
//! - Windows: `ceil(n / size)` windows of `size` atoms (last may be short)
//! - Matches: a word-aligned match stringifies back to the matched text
//! - Overlap: `frac` in `[0, 1]`, `bool` iff `count > 0`
//! - Merge: counts add up, ids are the union
//! - Alignment: enriched attributes stay aligned with chunk ids

use proptest::prelude::*;
use tessera::{
    Attr, ChunkOverlap, Chunks, Corpus, FixedSizeChunk, Membership, OverlapAgg,
    RegexMatchChunk, SimpleStringify, Table, Threshold, TopK, Value,
};

// =============================================================================
// Test Generators
// =============================================================================

/// Lowercase words, each line holding 1..=4 of them.
fn arbitrary_lines() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(
        prop::collection::vec(prop::string::string_regex("[a-z]{1,5}").unwrap(), 1..=4),
        1..12,
    )
}

/// Build a one-document corpus with `document` and `line` chunks.
///
/// Atom and chunk ids are prefixed with `doc` so corpora can be merged.
fn corpus_from_lines(doc: &str, lines: &[Vec<String>]) -> Corpus {
    let words: Vec<&String> = lines.iter().flatten().collect();
    let atom_id = |i: usize| format!("{doc}/w{i}");

    let atoms = Table::from_columns([
        ("id", (0..words.len()).map(|i| Value::from(atom_id(i))).collect()),
        ("ordinal", (1..=words.len() as i64).map(Value::Int).collect()),
        ("text", words.iter().map(|w| Value::from(w.as_str())).collect()),
    ])
    .unwrap();
    let corpus = Corpus::new(atoms).unwrap();

    let document = Chunks::new(
        &corpus,
        Table::from_columns([("id", vec![Value::from(doc)])]).unwrap(),
        (0..words.len())
            .map(|i| Membership::new(doc, atom_id(i)))
            .collect(),
    )
    .unwrap();
    corpus.set_chunk("document", document).unwrap();

    let mut line_ids = Vec::new();
    let mut widths = Vec::new();
    let mut members = Vec::new();
    let mut next = 0;
    for (l, line) in lines.iter().enumerate() {
        let id = format!("{doc}/l{l}");
        for _ in line {
            members.push(Membership::new(id.as_str(), atom_id(next)));
            next += 1;
        }
        widths.push(Value::Int(line.iter().map(|w| w.len() as i64).sum()));
        line_ids.push(Value::from(id));
    }
    let line_chunks = Chunks::new(
        &corpus,
        Table::from_columns([("id", line_ids), ("width", widths)]).unwrap(),
        members,
    )
    .unwrap();
    corpus.set_chunk("line", line_chunks).unwrap();
    corpus
}

fn stringify(chunks: &Chunks<'_>) -> Vec<String> {
    chunks
        .select(&[], &[("t", Attr::Expr(&SimpleStringify::default()))])
        .unwrap()
        .column("t")
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_owned())
        .collect()
}

// =============================================================================
// Filters
// =============================================================================

proptest! {
    #[test]
    fn filters_never_add_rows(lines in arbitrary_lines(), threshold in 0_i64..20, k in 0_usize..20) {
        let corpus = corpus_from_lines("d", &lines);
        let chunks = corpus.chunk("line").unwrap();

        let thresholded = chunks.filter(&[&Threshold::new("width", ">=", threshold).unwrap()]).unwrap();
        prop_assert!(thresholded.len() <= chunks.len());
        prop_assert_eq!(thresholded.chunk_atoms(), chunks.chunk_atoms());

        let top = chunks.filter(&[&TopK::new("width", k)]).unwrap();
        prop_assert_eq!(top.len(), k.min(chunks.len()));
        for id in top.ids() {
            prop_assert!(chunks.ids().contains(id));
        }
    }
}

// =============================================================================
// Fixed-size windows
// =============================================================================

proptest! {
    #[test]
    fn fixed_windows_partition_document(lines in arbitrary_lines(), size in 1_usize..8) {
        let corpus = corpus_from_lines("d", &lines);
        let n = corpus.len();

        let windows = corpus.chunk(FixedSizeChunk::new("document", size).unwrap()).unwrap();
        prop_assert_eq!(windows.len(), n.div_ceil(size));
        prop_assert_eq!(windows.chunk_atoms().len(), n);

        let joined = stringify(&windows).join(" ");
        let document = stringify(&corpus.chunk("document").unwrap()).remove(0);
        prop_assert_eq!(joined, document);
    }

    #[test]
    fn fixed_windows_never_cross_lines(lines in arbitrary_lines(), size in 1_usize..4) {
        let corpus = corpus_from_lines("d", &lines);
        let windows = corpus.chunk(FixedSizeChunk::new("line", size).unwrap()).unwrap();

        let expected: usize = lines.iter().map(|l| l.len().div_ceil(size)).sum();
        prop_assert_eq!(windows.len(), expected);
    }
}

// =============================================================================
// Regex matches
// =============================================================================

proptest! {
    #[test]
    fn word_aligned_match_round_trips(lines in arbitrary_lines(), a in 0_usize..100, len in 1_usize..4) {
        let words: Vec<&String> = lines.iter().flatten().collect();
        let start = a % words.len();
        let end = (start + len).min(words.len());
        let phrase = words[start..end].iter().map(|w| w.as_str()).collect::<Vec<_>>().join(" ");

        let corpus = corpus_from_lines("d", &lines);
        let pattern = format!(r"\b{}\b", regex::escape(&phrase));
        let matches = corpus.chunk(RegexMatchChunk::new("document", &pattern).unwrap()).unwrap();

        prop_assert!(!matches.is_empty());
        for text in stringify(&matches) {
            prop_assert_eq!(&text, &phrase);
        }
    }
}

// =============================================================================
// Overlap
// =============================================================================

proptest! {
    #[test]
    fn overlap_aggregations_agree(lines in arbitrary_lines(), size in 1_usize..6, offset in 0_i64..3) {
        let corpus = corpus_from_lines("d", &lines);
        let lines = corpus.chunk("line").unwrap();
        let evaluate = |agg| {
            let windows = FixedSizeChunk::new("document", size).unwrap().with_offset(offset).unwrap();
            lines
                .select(&[], &[("o", Attr::Expr(&ChunkOverlap::new(windows, agg)))])
                .unwrap()
                .column("o")
                .unwrap()
                .to_vec()
        };

        let bools = evaluate(OverlapAgg::Bool);
        let counts = evaluate(OverlapAgg::Count);
        let fracs = evaluate(OverlapAgg::Frac);

        for ((b, c), f) in bools.iter().zip(&counts).zip(&fracs) {
            let (b, c, f) = (b.as_bool().unwrap(), c.as_int().unwrap(), f.as_float().unwrap());
            prop_assert_eq!(b, c > 0);
            prop_assert!((0.0..=1.0).contains(&f));
            prop_assert_eq!(f > 0.0, b);
        }
    }
}

// =============================================================================
// Merge and alignment
// =============================================================================

proptest! {
    #[test]
    fn merge_adds_counts(a in arbitrary_lines(), b in arbitrary_lines()) {
        let left = corpus_from_lines("a", &a);
        let right = corpus_from_lines("b", &b);
        let merged = Corpus::merge([&left, &right]).unwrap();

        prop_assert_eq!(merged.len(), left.len() + right.len());
        for name in ["document", "line"] {
            let (l, r) = (left.chunk(name).unwrap(), right.chunk(name).unwrap());
            let m = merged.chunk(name).unwrap();
            prop_assert_eq!(m.len(), l.len() + r.len());
            prop_assert_eq!(m.chunk_atoms().len(), l.chunk_atoms().len() + r.chunk_atoms().len());
            let expected: Vec<_> = l.ids().iter().chain(r.ids()).cloned().collect();
            prop_assert_eq!(m.ids(), expected.as_slice());
        }
    }

    #[test]
    fn enrich_keeps_alignment(lines in arbitrary_lines()) {
        let corpus = corpus_from_lines("d", &lines);
        let chunks = corpus.chunk("line").unwrap();
        // reversed row order must carry through enrich and select
        let order: Vec<usize> = (0..chunks.len()).rev().collect();
        let enriched = chunks
            .take(&order)
            .enrich(&[("text", &SimpleStringify::default())])
            .unwrap();

        let res = enriched.select(&["id", "text"], &[]).unwrap();
        for (id, text) in res.column("id").unwrap().iter().zip(res.column("text").unwrap()) {
            let l: usize = id.as_str().unwrap().trim_start_matches("d/l").parse().unwrap();
            prop_assert_eq!(text.as_str().unwrap(), lines[l].join(" "));
        }
    }
}
