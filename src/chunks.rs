//! The Chunks type: a chunk table plus chunk/atom membership.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::{AttrExpr, ChunkFilter, Corpus, Error, Id, Result, Table, Value};

/// One row of the normalized chunk/atom relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Membership {
    /// Chunk id.
    pub chunk: Id,
    /// Atom id.
    pub atom: Id,
}

impl Membership {
    /// Create a membership row.
    pub fn new(chunk: impl Into<Id>, atom: impl Into<Id>) -> Self {
        Self {
            chunk: chunk.into(),
            atom: atom.into(),
        }
    }
}

/// A column to materialize in [`Chunks::select`].
#[derive(Clone, Copy)]
pub enum Attr<'a> {
    /// An existing chunk attribute, possibly under a new name.
    Column(&'a str),
    /// An attribute expression evaluated on the fly.
    Expr(&'a dyn AttrExpr),
}

/// Lifetime-free contents of a chunk collection, as stored in the registry.
#[derive(Clone)]
pub(crate) struct ChunkData {
    table: Arc<Table>,
    ids: Arc<[Id]>,
    chunk_atoms: Arc<[Membership]>,
}

impl ChunkData {
    pub(crate) fn concat(parts: &[&ChunkData]) -> Self {
        Self {
            table: Arc::new(Table::concat(parts.iter().map(|p| p.table.as_ref()))),
            ids: parts.iter().flat_map(|p| p.ids.iter().cloned()).collect(),
            chunk_atoms: parts
                .iter()
                .flat_map(|p| p.chunk_atoms.iter().cloned())
                .collect(),
        }
    }
}

/// A collection of chunks of the documents in a [`Corpus`].
///
/// Each chunk is a row of [`table`](Chunks::table) (required `id` column,
/// any other attributes) and owns the atoms listed for it in
/// [`chunk_atoms`](Chunks::chunk_atoms). Chunks may overlap, may be empty,
/// and an atom may appear in any number of chunks.
///
/// `Chunks` is an immutable value. [`enrich`](Chunks::enrich) and
/// [`filter`](Chunks::filter) return new collections sharing the unchanged
/// tables. Row order is significant: attribute expressions return one value
/// per row, in row order.
///
/// ## Logical membership
///
/// Filters drop rows from the chunk table but leave `chunk_atoms` alone, so
/// it may list chunks that are no longer present. Operators only consider
/// membership rows whose chunk is still in the table.
#[derive(Clone)]
pub struct Chunks<'c> {
    corpus: &'c Corpus,
    data: ChunkData,
}

impl<'c> Chunks<'c> {
    /// Create a chunk collection belonging to `corpus`.
    ///
    /// Chunk ids must be unique. `chunk_atoms` rows naming a chunk that is
    /// not in `table`, or an atom that is not in the corpus, are accepted and
    /// ignored by every operator, the same way rows of filtered-out chunks
    /// are.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if `table` has no `id` column,
    /// [`Error::ColumnType`] if an id is neither an integer nor a string, or
    /// [`Error::DuplicateId`] if an id appears twice.
    pub fn new(corpus: &'c Corpus, table: Table, chunk_atoms: Vec<Membership>) -> Result<Self> {
        let ids = table
            .require("chunks", "id")?
            .iter()
            .map(|v| Id::from_value(v, "id"))
            .collect::<Result<Arc<[Id]>>>()?;

        let mut seen = HashSet::with_capacity(ids.len());
        if let Some(dup) = ids.iter().find(|id| !seen.insert(*id)) {
            return Err(Error::DuplicateId(dup.to_string()));
        }

        Ok(Self {
            corpus,
            data: ChunkData {
                table: Arc::new(table),
                ids,
                chunk_atoms: chunk_atoms.into(),
            },
        })
    }

    pub(crate) fn from_data(corpus: &'c Corpus, data: ChunkData) -> Self {
        Self { corpus, data }
    }

    pub(crate) fn into_data(self) -> ChunkData {
        self.data
    }

    /// The corpus these chunks belong to.
    #[must_use]
    pub fn corpus(&self) -> &'c Corpus {
        self.corpus
    }

    /// Number of chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.ids.len()
    }

    /// Whether there are no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.ids.is_empty()
    }

    /// The chunk attribute table.
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.data.table
    }

    /// Chunk ids, in row order.
    #[must_use]
    pub fn ids(&self) -> &[Id] {
        &self.data.ids
    }

    /// The chunk/atom membership table.
    #[must_use]
    pub fn chunk_atoms(&self) -> &[Membership] {
        &self.data.chunk_atoms
    }

    /// Add attribute columns computed by expressions.
    ///
    /// Expressions are evaluated against `self`, not against each other's
    /// output. A name that already exists replaces that column.
    ///
    /// # Errors
    ///
    /// Propagates expression errors, and returns [`Error::LengthMismatch`] if
    /// an expression does not return one value per chunk.
    pub fn enrich(&self, exprs: &[(&str, &dyn AttrExpr)]) -> Result<Self> {
        let mut table = self.table().clone();
        for (name, expr) in exprs {
            table = table.with_column(*name, self.evaluate(name, *expr)?)?;
        }
        Ok(Self {
            corpus: self.corpus,
            data: ChunkData {
                table: Arc::new(table),
                ..self.data.clone()
            },
        })
    }

    /// Apply filters sequentially, in the order given.
    ///
    /// # Errors
    ///
    /// Propagates the first filter error.
    pub fn filter(&self, filters: &[&dyn ChunkFilter]) -> Result<Self> {
        let mut chunks = self.clone();
        for filter in filters {
            chunks = filter.apply(&chunks)?;
        }
        Ok(chunks)
    }

    /// Materialize attributes into a table.
    ///
    /// `attrs` are existing chunk attributes copied under their own names;
    /// `exprs` are `(output name, source)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] for a missing attribute and propagates
    /// expression errors.
    pub fn select(&self, attrs: &[&str], exprs: &[(&str, Attr<'_>)]) -> Result<Table> {
        let mut table = Table::new();
        for name in attrs {
            let values = self.table().require("chunks", name)?;
            table = table.with_column(*name, values.to_vec())?;
        }
        for (name, attr) in exprs {
            let values = match attr {
                Attr::Column(column) => self.table().require("chunks", column)?.to_vec(),
                Attr::Expr(expr) => self.evaluate(name, *expr)?,
            };
            table = table.with_column(*name, values)?;
        }
        Ok(table)
    }

    /// Keep the rows at `indices`, in that order. Membership is unchanged.
    ///
    /// This is the primitive custom [`ChunkFilter`]s are built on.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    #[must_use]
    pub fn take(&self, indices: &[usize]) -> Self {
        Self {
            corpus: self.corpus,
            data: ChunkData {
                table: Arc::new(self.table().take(indices)),
                ids: indices.iter().map(|&i| self.data.ids[i].clone()).collect(),
                chunk_atoms: Arc::clone(&self.data.chunk_atoms),
            },
        }
    }

    /// Member atom ids of every row, in row order.
    ///
    /// Within a row, atoms keep their `chunk_atoms` order.
    pub(crate) fn members(&self) -> Vec<Vec<&Id>> {
        let mut by_chunk: HashMap<&Id, Vec<&Id>> = HashMap::with_capacity(self.len());
        for id in self.ids() {
            by_chunk.entry(id).or_default();
        }
        for m in self.chunk_atoms() {
            if let Some(atoms) = by_chunk.get_mut(&m.chunk) {
                atoms.push(&m.atom);
            }
        }
        self.ids()
            .iter()
            .map(|id| by_chunk.get(id).cloned().unwrap_or_default())
            .collect()
    }

    /// Member atoms of every row as `(atom row, ordinal)`, sorted by ordinal.
    ///
    /// Atoms missing from the corpus atom table are skipped.
    ///
    /// # Errors
    ///
    /// [`Error::Schema`] if the atoms have no `ordinal` column,
    /// [`Error::ColumnType`] if a member's ordinal is not an integer.
    pub(crate) fn members_by_ordinal(&self) -> Result<Vec<Vec<(usize, i64)>>> {
        let ordinals = self.corpus.atom_column("ordinal")?;
        self.members()
            .into_iter()
            .map(|atoms| {
                let mut rows = atoms
                    .into_iter()
                    .filter_map(|id| self.corpus.atom_row(id))
                    .map(|row| ordinal(&ordinals[row]).map(|o| (row, o)))
                    .collect::<Result<Vec<_>>>()?;
                rows.sort_by_key(|&(_, o)| o);
                Ok(rows)
            })
            .collect()
    }

    fn evaluate(&self, name: &str, expr: &dyn AttrExpr) -> Result<Vec<Value>> {
        let values = expr.evaluate(self)?;
        if values.len() != self.len() {
            return Err(Error::LengthMismatch {
                column: name.to_owned(),
                expected: self.len(),
                found: values.len(),
            });
        }
        Ok(values)
    }
}

fn ordinal(value: &Value) -> Result<i64> {
    value.as_int().ok_or_else(|| Error::ColumnType {
        column: "ordinal".to_owned(),
        expected: "int",
        found: value.type_name(),
    })
}

impl fmt::Debug for Chunks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunks")
            .field("len", &self.len())
            .field("columns", &self.table().column_names().collect::<Vec<_>>())
            .field("chunk_atoms", &self.chunk_atoms().len())
            .finish()
    }
}
