//! # tessera
//!
//! A document model for retrieval pipelines: documents as atoms, plus any
//! number of named, overlapping chunkings of those atoms.
//!
//! ## The Model
//!
//! An **atom** is an indivisible element: a token, an OCR word, a byte. The
//! atom table is fixed when the [`Corpus`] is created and needs only an `id`
//! column; most operators also want `ordinal` (reading order) and `text`.
//!
//! A **chunk** is a grouping of atoms: a line, a page, a sentence, a sliding
//! window, a regex match. A [`Chunks`] collection is a chunk table (one row
//! per chunk, `id` plus attributes) and a membership table of
//! `(chunk, atom)` pairs. Chunkings overlap freely:
//!
//! ```text
//! atoms:     The (quick) [brown] fox jumps! Over the <lazy> dog
//! line:      |-----1-----|-----------2-----------|----3---|---4----|
//! paragraph: |-------------------1---------------|-------2---------|
//! regex:                                          |------m------|
//! ```
//!
//! ## Three Operator Families
//!
//! | Trait | Signature | Built-ins |
//! |-------|-----------|-----------|
//! | [`ChunkExpr`] | `Corpus -> Chunks` | [`FixedSizeChunk`], [`RegexMatchChunk`] |
//! | [`AttrExpr`] | `Chunks -> one value per chunk` | [`AtomData`], [`RegexCount`], [`ChunkOverlap`], [`SimpleStringify`], [`ChunkDelimitedStringify`], [`Scored`] |
//! | [`ChunkFilter`] | `Chunks -> Chunks` | [`TopK`], [`Threshold`], [`EqualTo`] |
//!
//! A pipeline resolves chunks, enriches them, filters, and materializes:
//!
//! ```rust
//! use tessera::{Attr, Chunks, Corpus, Membership, SimpleStringify, Table, Threshold, Value};
//!
//! let words = ["The", "quick", "brown", "fox"];
//! let atoms = Table::from_columns([
//!     ("id", (0..4).map(Value::Int).collect()),
//!     ("ordinal", (0..4).map(Value::Int).collect()),
//!     ("text", words.iter().map(|w| Value::from(*w)).collect()),
//! ])
//! .unwrap();
//! let corpus = Corpus::new(atoms).unwrap();
//!
//! let lines = Chunks::new(
//!     &corpus,
//!     Table::from_columns([
//!         ("id", vec![Value::from("l1"), Value::from("l2")]),
//!         ("width", vec![Value::Int(90), Value::Int(140)]),
//!     ])
//!     .unwrap(),
//!     vec![
//!         Membership::new("l1", 0),
//!         Membership::new("l1", 1),
//!         Membership::new("l2", 2),
//!         Membership::new("l2", 3),
//!     ],
//! )
//! .unwrap();
//! corpus.set_chunk("line", lines).unwrap();
//!
//! let wide = corpus
//!     .chunk("line")
//!     .unwrap()
//!     .filter(&[&Threshold::new("width", ">", 100).unwrap()])
//!     .unwrap()
//!     .select(&[], &[("text", Attr::Expr(&SimpleStringify::default()))])
//!     .unwrap();
//!
//! assert_eq!(wide.column("text").unwrap(), &[Value::from("brown fox")]);
//! ```
//!
//! ## Determinism
//!
//! Every operator is a pure function of its inputs. Derived chunk ids are
//! content-addressed (see [`content_id`]), and attribute expressions re-key
//! their results by chunk id, so outputs never depend on internal join or
//! grouping order.

mod atom_data;
mod chunks;
mod corpus;
mod error;
mod filter;
mod fixed;
mod hash;
mod overlap;
mod regex_count;
mod regex_match;
mod score;
mod stringify;
mod table;
mod value;

pub use atom_data::AtomData;
pub use chunks::{Attr, Chunks, Membership};
pub use corpus::{ChunkSource, Corpus};
pub use error::{Error, Result};
pub use filter::{Direction, EqualTo, Threshold, TopK};
pub use fixed::{Closed, FixedSizeChunk};
pub use hash::content_id;
pub use overlap::{ChunkOverlap, OverlapAgg};
pub use regex_count::{RegexCount, RegexFlags};
pub use regex_match::RegexMatchChunk;
pub use score::{Scored, Scorer};
pub use stringify::{ChunkDelimitedStringify, SimpleStringify};
pub use table::Table;
pub use value::{Id, Value};

/// An expression that derives a chunk collection from a corpus.
///
/// Usually passed to [`Corpus::chunk`] through [`ChunkSource`]. Expressions
/// may resolve other collections from the same corpus.
///
/// ```rust
/// use tessera::{ChunkExpr, Chunks, Corpus, Result, Table, Value};
///
/// /// One empty chunk, for testing.
/// struct Nothing;
///
/// impl ChunkExpr for Nothing {
///     fn chunk<'c>(&self, corpus: &'c Corpus) -> Result<Chunks<'c>> {
///         let table = Table::from_columns([("id", vec![Value::from("none")])])?;
///         Chunks::new(corpus, table, vec![])
///     }
/// }
/// ```
pub trait ChunkExpr: Send + Sync {
    /// Build the chunk collection.
    ///
    /// # Errors
    ///
    /// Schema, configuration, or resolution failures; nothing is returned
    /// partially built.
    fn chunk<'c>(&self, corpus: &'c Corpus) -> Result<Chunks<'c>>;
}

/// An expression computing one value per chunk.
///
/// The returned vector must have exactly `chunks.len()` values, aligned with
/// the current row order of `chunks`.
pub trait AttrExpr: Send + Sync {
    /// Compute the values.
    ///
    /// # Errors
    ///
    /// Schema or configuration failures.
    fn evaluate(&self, chunks: &Chunks<'_>) -> Result<Vec<Value>>;
}

/// A filter selecting (and possibly reordering) rows of a chunk collection.
///
/// Filters never add rows and never touch membership; see [`Chunks::take`].
pub trait ChunkFilter: Send + Sync {
    /// Apply the filter.
    ///
    /// # Errors
    ///
    /// Schema or type failures reading the filtered attribute.
    fn apply<'c>(&self, chunks: &Chunks<'c>) -> Result<Chunks<'c>>;
}
