//! Materializing chunks as strings.
//!
//! Both stringifiers join each chunk's member atom `text` in ordinal order.
//! They differ in what goes between two adjacent atoms:
//!
//! ```text
//! atoms:      The (quick) | [brown] fox jumps! || Over the | <lazy> dog
//!                     line^          paragraph^^      line^
//!
//! SimpleStringify("?"):
//!   The?(quick)?[brown]?fox?jumps!?Over?the?<lazy>?dog
//!
//! ChunkDelimitedStringify([("paragraph", "¶"), ("line", "•")], "?"):
//!   The?(quick)•[brown]?fox?jumps!¶Over?the•<lazy>?dog
//! ```
//!
//! Atoms with a null `text` are left out. A chunk without atoms becomes
//! the empty string.

use std::collections::HashMap;

use tracing::debug;

use crate::{AttrExpr, ChunkSource, Chunks, Id, Result, Value};

/// Member atoms of every chunk as `(atom id, text)`, in ordinal order.
fn texts_by_ordinal<'a>(chunks: &Chunks<'a>) -> Result<Vec<Vec<(&'a Id, &'a str)>>> {
    let corpus = chunks.corpus();
    let text = corpus.atom_column("text")?;
    let rows = chunks.members_by_ordinal()?;

    Ok(rows
        .into_iter()
        .map(|atoms| {
            atoms
                .into_iter()
                .filter_map(|(row, _)| text[row].as_str().map(|t| (corpus.atom_id(row), t)))
                .collect()
        })
        .collect())
}

/// Join each chunk's atom texts, in ordinal order, with one delimiter.
///
/// ```rust
/// use tessera::SimpleStringify;
///
/// let spaced = SimpleStringify::default(); // " "
/// let packed = SimpleStringify::new("");
/// ```
#[derive(Debug, Clone)]
pub struct SimpleStringify {
    delimiter: String,
}

impl SimpleStringify {
    /// Join atoms with `delimiter`.
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
        }
    }
}

impl Default for SimpleStringify {
    fn default() -> Self {
        Self::new(" ")
    }
}

impl AttrExpr for SimpleStringify {
    fn evaluate(&self, chunks: &Chunks<'_>) -> Result<Vec<Value>> {
        Ok(texts_by_ordinal(chunks)?
            .into_iter()
            .map(|atoms| {
                let texts: Vec<&str> = atoms.into_iter().map(|(_, t)| t).collect();
                Value::Str(texts.join(self.delimiter.as_str()))
            })
            .collect())
    }
}

/// Join atom texts with delimiters chosen by which chunk boundaries lie
/// between adjacent atoms.
///
/// For each pair of ordinal-adjacent atoms, `chunk_delimiters` is scanned in
/// order and the first collection whose chunk differs between the two atoms
/// supplies the delimiter. If no listed boundary is crossed, the atom
/// delimiter is used. Precedence is purely positional: put the coarser
/// chunking first if it should win.
///
/// An atom that belongs to no chunk of a listed collection never marks a
/// boundary for it. An atom in several chunks of one collection is
/// attributed to the first of them by row order.
#[derive(Debug, Clone)]
pub struct ChunkDelimitedStringify {
    chunk_delimiters: Vec<(ChunkSource, String)>,
    atom_delimiter: String,
}

impl ChunkDelimitedStringify {
    /// Delimit by the given `(chunks, delimiter)` pairs, joining other atoms
    /// with a single space.
    pub fn new<C, D>(chunk_delimiters: impl IntoIterator<Item = (C, D)>) -> Self
    where
        C: Into<ChunkSource>,
        D: Into<String>,
    {
        Self {
            chunk_delimiters: chunk_delimiters
                .into_iter()
                .map(|(c, d)| (c.into(), d.into()))
                .collect(),
            atom_delimiter: " ".to_owned(),
        }
    }

    /// Set the delimiter used when no chunk boundary is crossed.
    #[must_use]
    pub fn with_atom_delimiter(self, atom_delimiter: impl Into<String>) -> Self {
        Self {
            atom_delimiter: atom_delimiter.into(),
            ..self
        }
    }
}

/// Map every atom to the first chunk (by row order) containing it.
fn chunk_of_atom(chunks: &Chunks<'_>) -> HashMap<Id, Id> {
    let mut owner = HashMap::new();
    for (chunk, atoms) in chunks.ids().iter().zip(chunks.members()) {
        for atom in atoms {
            owner.entry(atom.clone()).or_insert_with(|| chunk.clone());
        }
    }
    owner
}

impl AttrExpr for ChunkDelimitedStringify {
    fn evaluate(&self, chunks: &Chunks<'_>) -> Result<Vec<Value>> {
        let rows = texts_by_ordinal(chunks)?;

        let corpus = chunks.corpus();
        let owners = self
            .chunk_delimiters
            .iter()
            .map(|(source, delimiter)| -> Result<_> {
                Ok((chunk_of_atom(&corpus.chunk(source)?), delimiter.as_str()))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            chunks = chunks.len(),
            delimiters = owners.len(),
            "chunk-delimited stringify"
        );

        Ok(rows
            .into_iter()
            .map(|atoms| {
                let mut out = String::new();
                for (i, (atom, text)) in atoms.iter().enumerate() {
                    out.push_str(text);
                    let Some((next, _)) = atoms.get(i + 1) else {
                        break;
                    };
                    let delimiter = owners
                        .iter()
                        .find(|(owner, _)| match (owner.get(*atom), owner.get(*next)) {
                            (Some(a), Some(b)) => a != b,
                            _ => false,
                        })
                        .map_or(self.atom_delimiter.as_str(), |&(_, d)| d);
                    out.push_str(delimiter);
                }
                Value::Str(out)
            })
            .collect())
    }
}
