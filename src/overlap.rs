//! How much chunks overlap with another chunking.
//!
//! ```text
//! chunk_a (lines):   |--line 3--|--line 4--|
//! atoms:              Over  the  <lazy> dog
//! chunk_b (match):   |-----------------|
//!
//! line 3: bool=true  count=2  frac=1.0
//! line 4: bool=true  count=1  frac=0.5
//! ```

use std::collections::HashSet;
use std::str::FromStr;

use tracing::debug;

use crate::{AttrExpr, ChunkSource, Chunks, Error, Id, Result, Value};

/// How overlap is reported per chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapAgg {
    /// Whether any member atom overlaps ([`Value::Bool`]).
    Bool,
    /// Number of overlapping member atoms ([`Value::Int`]).
    Count,
    /// Fraction of member atoms that overlap ([`Value::Float`]); `0.0` for
    /// an empty chunk.
    Frac,
}

impl OverlapAgg {
    const VALID: &'static [&'static str] = &["bool", "count", "frac"];
}

impl FromStr for OverlapAgg {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bool" => Ok(OverlapAgg::Bool),
            "count" => Ok(OverlapAgg::Count),
            "frac" => Ok(OverlapAgg::Frac),
            other => Err(Error::InvalidOption {
                option: "overlap aggregation",
                value: other.to_owned(),
                valid: Self::VALID,
            }),
        }
    }
}

/// Measure each chunk's atom overlap with a second chunk collection.
///
/// `chunk_b` is resolved from the same corpus as the chunks being measured,
/// so it can be a registered name or a chunk expression. An atom overlaps if
/// it belongs to any chunk of `chunk_b`. Each distinct member atom is counted
/// once, however many `chunk_b` chunks contain it.
#[derive(Debug, Clone)]
pub struct ChunkOverlap {
    chunk_b: ChunkSource,
    agg: OverlapAgg,
}

impl ChunkOverlap {
    /// Compare against `chunk_b`, reporting per `agg`.
    pub fn new(chunk_b: impl Into<ChunkSource>, agg: OverlapAgg) -> Self {
        Self {
            chunk_b: chunk_b.into(),
            agg,
        }
    }
}

impl AttrExpr for ChunkOverlap {
    fn evaluate(&self, chunks: &Chunks<'_>) -> Result<Vec<Value>> {
        let chunk_b = chunks.corpus().chunk(&self.chunk_b)?;
        let members_b = chunk_b.members();
        let covered: HashSet<&Id> = members_b.iter().flatten().copied().collect();

        debug!(
            chunks = chunks.len(),
            chunk_b = chunk_b.len(),
            covered = covered.len(),
            "chunk overlap"
        );

        Ok(chunks
            .members()
            .into_iter()
            .map(|atoms| {
                let atoms: HashSet<&Id> = atoms.into_iter().collect();
                let hits = atoms.iter().filter(|a| covered.contains(*a)).count();
                match self.agg {
                    OverlapAgg::Bool => Value::Bool(hits > 0),
                    OverlapAgg::Count => Value::Int(i64::try_from(hits).unwrap_or(i64::MAX)),
                    OverlapAgg::Frac if atoms.is_empty() => Value::Float(0.0),
                    OverlapAgg::Frac => Value::Float(hits as f64 / atoms.len() as f64),
                }
            })
            .collect())
    }
}
