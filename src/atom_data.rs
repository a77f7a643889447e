//! Gathering atom attributes per chunk.

use crate::{AttrExpr, Chunks, Result, Value};

/// Collect an atom attribute for every member atom of each chunk.
///
/// Produces one [`Value::List`] per chunk, e.g. the OCR confidence of every
/// word on a line, or the document id of every atom in a window.
///
/// ## Ordering
///
/// The order of values inside a list is not guaranteed to follow `ordinal`.
/// Sort explicitly (or use a stringifier) when order matters.
#[derive(Debug, Clone)]
pub struct AtomData {
    attr: String,
}

impl AtomData {
    /// Gather the atom attribute `attr`.
    pub fn new(attr: impl Into<String>) -> Self {
        Self { attr: attr.into() }
    }
}

impl AttrExpr for AtomData {
    fn evaluate(&self, chunks: &Chunks<'_>) -> Result<Vec<Value>> {
        let corpus = chunks.corpus();
        let column = corpus.atom_column(&self.attr)?;

        Ok(chunks
            .members()
            .into_iter()
            .map(|atoms| {
                Value::List(
                    atoms
                        .into_iter()
                        .filter_map(|id| corpus.atom_row(id))
                        .map(|row| column[row].clone())
                        .collect(),
                )
            })
            .collect())
    }
}
