//! The corpus: an atom store plus a registry of named chunk collections.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::chunks::ChunkData;
use crate::{ChunkExpr, Chunks, Error, Id, Result, Table, Value};

/// What to resolve in [`Corpus::chunk`]: a registered name or an expression.
///
/// Strings convert to [`ChunkSource::Named`]; the built-in chunk expressions
/// convert to [`ChunkSource::Expr`]. Any other [`ChunkExpr`] can be wrapped
/// with [`ChunkSource::expr`].
#[derive(Clone)]
pub enum ChunkSource {
    /// A collection registered with [`Corpus::set_chunk`].
    Named(String),
    /// An expression evaluated on demand.
    Expr(Arc<dyn ChunkExpr>),
}

impl ChunkSource {
    /// Wrap a chunk expression.
    pub fn expr(expr: impl ChunkExpr + 'static) -> Self {
        Self::Expr(Arc::new(expr))
    }
}

impl fmt::Debug for ChunkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Expr(_) => f.write_str("Expr(..)"),
        }
    }
}

impl From<&str> for ChunkSource {
    fn from(name: &str) -> Self {
        Self::Named(name.to_owned())
    }
}

impl From<String> for ChunkSource {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<&ChunkSource> for ChunkSource {
    fn from(source: &ChunkSource) -> Self {
        source.clone()
    }
}

/// A container for document(s) broken down into atoms, plus named chunkings
/// of those atoms.
///
/// A corpus is created from its atom table; chunk collections are registered
/// afterwards, because [`Chunks`] borrow the corpus they belong to.
///
/// ```rust
/// use tessera::{Chunks, Corpus, Membership, Table, Value};
///
/// let atoms = Table::from_columns([
///     ("id", vec![Value::from("w1"), Value::from("w2")]),
///     ("ordinal", vec![Value::Int(1), Value::Int(2)]),
///     ("text", vec![Value::from("hello"), Value::from("world")]),
/// ])
/// .unwrap();
/// let corpus = Corpus::new(atoms).unwrap();
///
/// let doc = Chunks::new(
///     &corpus,
///     Table::from_columns([("id", vec![Value::from("doc")])]).unwrap(),
///     vec![Membership::new("doc", "w1"), Membership::new("doc", "w2")],
/// )
/// .unwrap();
/// corpus.set_chunk("document", doc).unwrap();
///
/// assert_eq!(corpus.chunk("document").unwrap().len(), 1);
/// ```
///
/// ## Registry writes
///
/// [`set_chunk`](Corpus::set_chunk) takes `&self`; the registry sits behind
/// an [`RwLock`], so writers are serialized and readers always see a whole
/// collection. Everything else about a corpus is immutable.
pub struct Corpus {
    atoms: Table,
    atom_ids: Vec<Id>,
    atom_index: HashMap<Id, usize>,
    registry: RwLock<HashMap<String, ChunkData>>,
}

impl Corpus {
    /// Create a corpus over an atom table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the table has no `id` column, or
    /// [`Error::ColumnType`] if an id is neither an integer nor a string.
    pub fn new(atoms: Table) -> Result<Self> {
        let atom_ids = atoms
            .require("atoms", "id")?
            .iter()
            .map(|v| Id::from_value(v, "id"))
            .collect::<Result<Vec<_>>>()?;

        let mut atom_index = HashMap::with_capacity(atom_ids.len());
        for (row, id) in atom_ids.iter().enumerate() {
            atom_index.entry(id.clone()).or_insert(row);
        }

        Ok(Self {
            atoms,
            atom_ids,
            atom_index,
            registry: RwLock::new(HashMap::new()),
        })
    }

    /// The atom table.
    #[must_use]
    pub fn atoms(&self) -> &Table {
        &self.atoms
    }

    /// Number of atoms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.atoms.num_rows()
    }

    /// Whether the corpus has no atoms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    /// Names of registered chunk collections, sorted.
    #[must_use]
    pub fn chunk_names(&self) -> Vec<String> {
        let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = registry.keys().cloned().collect();
        names.sort();
        names
    }

    /// Access a registered chunk collection, or evaluate a chunk expression
    /// into a fresh, unregistered one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown name, or whatever the
    /// expression fails with.
    pub fn chunk(&self, source: impl Into<ChunkSource>) -> Result<Chunks<'_>> {
        match source.into() {
            ChunkSource::Named(name) => {
                let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
                registry
                    .get(&name)
                    .map(|data| Chunks::from_data(self, data.clone()))
                    .ok_or(Error::NotFound(name))
            }
            ChunkSource::Expr(expr) => expr.chunk(self),
        }
    }

    /// Register a chunk collection under `name`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdentityMismatch`] unless `chunks` was built against
    /// this exact corpus instance. Structurally equal corpora do not count.
    pub fn set_chunk(&self, name: impl Into<String>, chunks: Chunks<'_>) -> Result<()> {
        let name = name.into();
        if !std::ptr::eq(chunks.corpus(), self) {
            return Err(Error::IdentityMismatch(name));
        }

        debug!(name = %name, chunks = chunks.len(), "registering chunks");
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        registry.insert(name, chunks.into_data());
        Ok(())
    }

    /// Combine several corpora into one.
    ///
    /// Atom tables are concatenated. Every chunk name present in any input
    /// becomes one collection whose tables concatenate that name's tables
    /// across the inputs that have it.
    ///
    /// ## Warning
    ///
    /// Nothing is deduplicated or checked for collisions. If atom or chunk ids
    /// are not unique across the inputs (e.g. by embedding a document id in
    /// every id), the merged corpus cannot tell the sources apart.
    ///
    /// # Errors
    ///
    /// Propagates atom table validation errors from [`Corpus::new`].
    pub fn merge<'a>(corpora: impl IntoIterator<Item = &'a Corpus>) -> Result<Self> {
        let corpora: Vec<&Corpus> = corpora.into_iter().collect();
        let merged = Self::new(Table::concat(corpora.iter().map(|c| &c.atoms)))?;

        // One guard at a time: the same corpus may appear more than once.
        let snapshots: Vec<HashMap<String, ChunkData>> = corpora
            .iter()
            .map(|c| {
                c.registry
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone()
            })
            .collect();
        let names: BTreeSet<&String> = snapshots.iter().flat_map(|r| r.keys()).collect();

        let mut registry = HashMap::with_capacity(names.len());
        for name in names {
            let parts: Vec<&ChunkData> = snapshots.iter().filter_map(|r| r.get(name)).collect();
            registry.insert(name.clone(), ChunkData::concat(&parts));
        }

        debug!(
            corpora = corpora.len(),
            atoms = merged.len(),
            collections = registry.len(),
            "merged corpora"
        );
        *merged.registry.write().unwrap_or_else(PoisonError::into_inner) = registry;
        Ok(merged)
    }

    pub(crate) fn atom_id(&self, row: usize) -> &Id {
        &self.atom_ids[row]
    }

    pub(crate) fn atom_row(&self, id: &Id) -> Option<usize> {
        self.atom_index.get(id).copied()
    }

    pub(crate) fn atom_column(&self, name: &str) -> Result<&[Value]> {
        self.atoms.require("atoms", name)
    }
}

impl fmt::Debug for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Corpus")
            .field("atoms", &self.len())
            .field("chunks", &self.chunk_names())
            .finish()
    }
}
