//! Fixed-size windows of atoms, bounded by an existing chunking.
//!
//! Windows slide along the ordinal axis of each bounding chunk (a document,
//! a page, a line...) independently, so no window ever crosses a boundary.
//!
//! ## How It Works
//!
//! ```text
//! size = 4, offset = -1  (step = size + offset = 3)
//!
//! ordinals:  1  2  3  4  5  6  7  8  9
//! window 0: [1  2  3  4)                   start = 1 (first ordinal)
//! window 1:          [4  5  6  7)          start = 4
//! window 2:                   [7  8  9     start = 7, may be short
//! ```
//!
//! A negative `offset` overlaps windows, a positive one leaves gaps between
//! them. Windows are positioned by ordinal value, not by atom count, so
//! gaps in the ordinals produce smaller (or no) windows. Empty windows are
//! never emitted.
//!
//! ## Window Edges
//!
//! A window spans `start..start + size`. [`Closed`] decides which edges are
//! inclusive:
//!
//! | Closed | Interval |
//! |--------|----------|
//! | `Left` (default) | `[start, end)` |
//! | `Right` | `(start, end]` |
//! | `Both` | `[start, end]` |
//! | `None` | `(start, end)` |
//!
//! Note that `Right` and `None` exclude the atom a window starts on.

use std::str::FromStr;

use tracing::debug;

use crate::{content_id, ChunkExpr, ChunkSource, Chunks, Corpus, Error, Membership, Result, Table, Value};

/// Which edges of a window are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Closed {
    /// `[start, end)`
    #[default]
    Left,
    /// `(start, end]`
    Right,
    /// `[start, end]`
    Both,
    /// `(start, end)`
    None,
}

impl Closed {
    const VALID: &'static [&'static str] = &["left", "right", "both", "none"];

    fn contains(self, start: i64, end: i64, x: i64) -> bool {
        match self {
            Closed::Left => start <= x && x < end,
            Closed::Right => start < x && x <= end,
            Closed::Both => start <= x && x <= end,
            Closed::None => start < x && x < end,
        }
    }
}

impl FromStr for Closed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "left" => Ok(Closed::Left),
            "right" => Ok(Closed::Right),
            "both" => Ok(Closed::Both),
            "none" => Ok(Closed::None),
            other => Err(Error::InvalidOption {
                option: "closed",
                value: other.to_owned(),
                valid: Self::VALID,
            }),
        }
    }
}

/// Fixed-size windowing of atoms within bounding chunks.
///
/// Each output chunk's id is [`content_id`] of the bounding chunk id and the
/// window start ordinal, so identical inputs always give identical ids.
/// Output rows are ordered by bounding chunk (in the bounding collection's
/// row order), then by window start, and carry two provenance columns:
/// `bound` (bounding chunk id) and `start` (window start ordinal).
///
/// ## Example
///
/// ```rust
/// use tessera::{Chunks, Corpus, FixedSizeChunk, Membership, Table, Value};
///
/// let atoms = Table::from_columns([
///     ("id", (0..10).map(Value::Int).collect()),
///     ("ordinal", (0..10).map(Value::Int).collect()),
/// ])
/// .unwrap();
/// let corpus = Corpus::new(atoms).unwrap();
/// let doc = Chunks::new(
///     &corpus,
///     Table::from_columns([("id", vec![Value::from("doc")])]).unwrap(),
///     (0..10).map(|i| Membership::new("doc", i)).collect(),
/// )
/// .unwrap();
/// corpus.set_chunk("document", doc).unwrap();
///
/// // 10 atoms in windows of 4: ceil(10 / 4) = 3 chunks
/// let windows = corpus.chunk(FixedSizeChunk::new("document", 4).unwrap()).unwrap();
/// assert_eq!(windows.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunk {
    constrain_to: ChunkSource,
    size: usize,
    offset: i64,
    closed: Closed,
}

impl FixedSizeChunk {
    /// Create a disjoint, left-closed windowing.
    ///
    /// # Arguments
    ///
    /// * `constrain_to` - Chunks bounding the windows (name or expression)
    /// * `size` - Window width along the ordinal axis
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChunkSize`] if `size == 0`.
    pub fn new(constrain_to: impl Into<ChunkSource>, size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidChunkSize(size));
        }
        Ok(Self {
            constrain_to: constrain_to.into(),
            size,
            offset: 0,
            closed: Closed::default(),
        })
    }

    /// Set the distance from the end of one window to the start of the next.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStep`] unless `size + offset > 0`.
    pub fn with_offset(self, offset: i64) -> Result<Self> {
        let chunker = Self { offset, ..self };
        if chunker.step() <= 0 {
            return Err(Error::InvalidStep {
                size: chunker.size,
                offset,
            });
        }
        Ok(chunker)
    }

    /// Set which window edges are inclusive.
    #[must_use]
    pub fn with_closed(self, closed: Closed) -> Self {
        Self { closed, ..self }
    }

    fn width(&self) -> i64 {
        i64::try_from(self.size).unwrap_or(i64::MAX)
    }

    /// Distance between consecutive window starts.
    fn step(&self) -> i64 {
        self.width().saturating_add(self.offset)
    }

    /// Windows over one bounding chunk's atoms, sorted by ordinal.
    ///
    /// Returns `(window start, atom rows)` for every non-empty window.
    fn windows(&self, atoms: &[(usize, i64)]) -> Vec<(i64, Vec<usize>)> {
        let (Some(&(_, first)), Some(&(_, last))) = (atoms.first(), atoms.last()) else {
            return vec![];
        };

        let width = self.width();
        let step = self.step();
        let mut windows = Vec::new();
        let mut lo = 0;
        let mut start = first;

        while start <= last {
            let end = start.saturating_add(width);

            // Starts only grow, so atoms before `start` are done for good.
            while lo < atoms.len() && atoms[lo].1 < start {
                lo += 1;
            }

            let rows: Vec<usize> = atoms[lo..]
                .iter()
                .take_while(|&&(_, o)| o <= end)
                .filter(|&&(_, o)| self.closed.contains(start, end, o))
                .map(|&(row, _)| row)
                .collect();

            if rows.is_empty() {
                // Jump over windows that end before the next atom.
                if let Some(&(_, next)) = atoms.get(lo) {
                    let gap = next.saturating_sub(end);
                    if gap > step {
                        start = start.saturating_add((gap / step) * step);
                        continue;
                    }
                }
            } else {
                windows.push((start, rows));
            }

            start = match start.checked_add(step) {
                Some(next) => next,
                None => break,
            };
        }

        windows
    }
}

impl ChunkExpr for FixedSizeChunk {
    fn chunk<'c>(&self, corpus: &'c Corpus) -> Result<Chunks<'c>> {
        corpus.atom_column("ordinal")?;

        let bounds = corpus.chunk(&self.constrain_to)?;
        let groups = bounds.members_by_ordinal()?;

        let mut ids = Vec::new();
        let mut bound_col = Vec::new();
        let mut start_col = Vec::new();
        let mut chunk_atoms = Vec::new();

        for (bound, atoms) in bounds.ids().iter().zip(&groups) {
            let bound = Value::from(bound);
            for (start, rows) in self.windows(atoms) {
                let id = content_id(&[bound.clone(), Value::Int(start)]);
                chunk_atoms.extend(
                    rows.into_iter()
                        .map(|row| Membership::new(id.clone(), corpus.atom_id(row).clone())),
                );
                ids.push(Value::from(id));
                bound_col.push(bound.clone());
                start_col.push(Value::Int(start));
            }
        }

        debug!(
            bounds = bounds.len(),
            chunks = ids.len(),
            size = self.size,
            step = self.step(),
            "fixed-size chunking"
        );

        let table = Table::from_columns([("id", ids), ("bound", bound_col), ("start", start_col)])?;
        Chunks::new(corpus, table, chunk_atoms)
    }
}

impl From<FixedSizeChunk> for ChunkSource {
    fn from(expr: FixedSizeChunk) -> Self {
        ChunkSource::expr(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atoms(ordinals: &[i64]) -> Vec<(usize, i64)> {
        ordinals.iter().enumerate().map(|(i, &o)| (i, o)).collect()
    }

    fn starts(chunker: &FixedSizeChunk, ordinals: &[i64]) -> Vec<(i64, usize)> {
        chunker
            .windows(&atoms(ordinals))
            .into_iter()
            .map(|(s, rows)| (s, rows.len()))
            .collect()
    }

    #[test]
    fn test_disjoint_windows() {
        let chunker = FixedSizeChunk::new("doc", 3).unwrap();
        assert_eq!(
            starts(&chunker, &[1, 2, 3, 4, 5, 6, 7]),
            [(1, 3), (4, 3), (7, 1)]
        );
    }

    #[test]
    fn test_overlap() {
        // 18 atoms, size 8, step 6: windows at 1, 7, 13
        let chunker = FixedSizeChunk::new("doc", 8).unwrap().with_offset(-2).unwrap();
        let ordinals: Vec<i64> = (1..=18).collect();
        assert_eq!(starts(&chunker, &ordinals), [(1, 8), (7, 8), (13, 6)]);
    }

    #[test]
    fn test_gaps() {
        let chunker = FixedSizeChunk::new("doc", 2).unwrap().with_offset(1).unwrap();
        assert_eq!(starts(&chunker, &[0, 1, 2, 3, 4, 5]), [(0, 2), (3, 2)]);
    }

    #[test]
    fn test_closed_modes() {
        let ordinals = [0, 1, 2, 3, 4];
        let base = FixedSizeChunk::new("doc", 2).unwrap();
        assert_eq!(starts(&base, &ordinals), [(0, 2), (2, 2), (4, 1)]);
        assert_eq!(
            starts(&base.clone().with_closed(Closed::Both), &ordinals),
            [(0, 3), (2, 3), (4, 1)]
        );
        assert_eq!(
            starts(&base.clone().with_closed(Closed::Right), &ordinals),
            [(0, 2), (2, 2)]
        );
        assert_eq!(
            starts(&base.with_closed(Closed::None), &ordinals),
            [(0, 1), (2, 1)]
        );
    }

    #[test]
    fn test_sparse_ordinals_skip_empty_windows() {
        let chunker = FixedSizeChunk::new("doc", 1).unwrap();
        assert_eq!(
            starts(&chunker, &[0, 1_000_000_000_000]),
            [(0, 1), (1_000_000_000_000, 1)]
        );
    }

    #[test]
    fn test_empty_group() {
        let chunker = FixedSizeChunk::new("doc", 4).unwrap();
        assert!(chunker.windows(&[]).is_empty());
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            FixedSizeChunk::new("doc", 0),
            Err(Error::InvalidChunkSize(0))
        ));
        assert!(matches!(
            FixedSizeChunk::new("doc", 3).unwrap().with_offset(-3),
            Err(Error::InvalidStep { size: 3, offset: -3 })
        ));
    }

    #[test]
    fn test_parse_closed() {
        assert_eq!("both".parse::<Closed>().unwrap(), Closed::Both);
        let err = "middle".parse::<Closed>().unwrap_err();
        assert!(err.to_string().contains("left, right, both, none"));
    }
}
