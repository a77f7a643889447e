//! Filters selecting chunk rows by attribute.
//!
//! | Filter | Keeps | Order |
//! |--------|-------|-------|
//! | [`TopK`] | `k` best rows by an attribute | ranked |
//! | [`Threshold`] | rows whose attribute passes a comparison | original |
//! | [`EqualTo`] | rows whose attribute is one of a set of values | original |
//!
//! Filters only reorder or drop rows of the chunk table. Membership is left
//! untouched, so a filtered collection still lists the dropped chunks' atoms
//! in `chunk_atoms`; every operator ignores them.
//!
//! Null (and NaN) cells never pass a comparison and rank last.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::{ChunkFilter, Chunks, Error, Result, Value};

/// Whether a cell takes part in comparisons at all.
fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Float(x) => x.is_nan(),
        _ => false,
    }
}

/// Compare two present cells, or fail on incompatible types.
fn compare(column: &str, a: &Value, b: &Value) -> Result<Ordering> {
    a.compare(b).ok_or_else(|| Error::ColumnType {
        column: column.to_owned(),
        expected: a.type_name(),
        found: b.type_name(),
    })
}

/// Keep the `k` rows with the largest (or, reversed, smallest) attribute.
///
/// The sort is stable: ties keep their original row order. Output rows are
/// in ranked order. With `k` larger than the collection every row is kept.
///
/// ```rust
/// use tessera::TopK;
///
/// let widest = TopK::new("width", 2);
/// let narrowest = TopK::new("width", 2).with_reverse(true);
/// ```
#[derive(Debug, Clone)]
pub struct TopK {
    attr: String,
    k: usize,
    reverse: bool,
}

impl TopK {
    /// Keep the `k` largest values of `attr`.
    pub fn new(attr: impl Into<String>, k: usize) -> Self {
        Self {
            attr: attr.into(),
            k,
            reverse: false,
        }
    }

    /// Rank ascending instead.
    #[must_use]
    pub fn with_reverse(self, reverse: bool) -> Self {
        Self { reverse, ..self }
    }
}

impl ChunkFilter for TopK {
    fn apply<'c>(&self, chunks: &Chunks<'c>) -> Result<Chunks<'c>> {
        let column = chunks.table().require("chunks", &self.attr)?;

        let (mut present, missing): (Vec<usize>, Vec<usize>) =
            (0..column.len()).partition(|&i| !is_missing(&column[i]));

        // Validate before sorting; sort_by cannot return errors.
        if let Some(&first) = present.first() {
            for &i in &present[1..] {
                compare(&self.attr, &column[first], &column[i])?;
            }
        }
        present.sort_by(|&a, &b| {
            let ordering = column[a].compare(&column[b]).unwrap_or(Ordering::Equal);
            if self.reverse {
                ordering
            } else {
                ordering.reverse()
            }
        });

        let mut ranked = present;
        ranked.extend(missing);
        ranked.truncate(self.k);

        debug!(attr = %self.attr, k = self.k, kept = ranked.len(), "top-k filter");
        Ok(chunks.take(&ranked))
    }
}

/// Comparison used by [`Threshold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
}

impl Direction {
    const VALID: &'static [&'static str] = &[">", ">=", "<", "<="];

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Direction::Gt => ordering == Ordering::Greater,
            Direction::Ge => ordering != Ordering::Less,
            Direction::Lt => ordering == Ordering::Less,
            Direction::Le => ordering != Ordering::Greater,
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            ">" => Ok(Direction::Gt),
            ">=" => Ok(Direction::Ge),
            "<" => Ok(Direction::Lt),
            "<=" => Ok(Direction::Le),
            other => Err(Error::InvalidOption {
                option: "threshold direction",
                value: other.to_owned(),
                valid: Self::VALID,
            }),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Gt => ">",
            Direction::Ge => ">=",
            Direction::Lt => "<",
            Direction::Le => "<=",
        })
    }
}

/// Keep rows whose attribute compares against a fixed value in the given
/// direction, e.g. `width > 110`.
#[derive(Debug, Clone)]
pub struct Threshold {
    attr: String,
    direction: Direction,
    value: Value,
}

impl Threshold {
    /// Parse `direction` from `">"`, `">="`, `"<"`, or `"<="`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] for any other direction string.
    pub fn new(attr: impl Into<String>, direction: &str, value: impl Into<Value>) -> Result<Self> {
        Ok(Self::with_direction(attr, direction.parse()?, value))
    }

    /// Build from an already-parsed [`Direction`].
    pub fn with_direction(
        attr: impl Into<String>,
        direction: Direction,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            attr: attr.into(),
            direction,
            value: value.into(),
        }
    }
}

impl ChunkFilter for Threshold {
    fn apply<'c>(&self, chunks: &Chunks<'c>) -> Result<Chunks<'c>> {
        let column = chunks.table().require("chunks", &self.attr)?;

        let mut keep = Vec::new();
        if !is_missing(&self.value) {
            for (i, cell) in column.iter().enumerate() {
                if is_missing(cell) {
                    continue;
                }
                if self.direction.accepts(compare(&self.attr, cell, &self.value)?) {
                    keep.push(i);
                }
            }
        }

        debug!(
            attr = %self.attr,
            direction = %self.direction,
            value = %self.value,
            kept = keep.len(),
            "threshold filter"
        );
        Ok(chunks.take(&keep))
    }
}

/// Keep rows whose attribute equals any of the given values.
///
/// Integers and floats compare numerically, so `80` matches `80.0`.
#[derive(Debug, Clone)]
pub struct EqualTo {
    attr: String,
    values: Vec<Value>,
}

impl EqualTo {
    /// Match `attr` against `values`.
    pub fn new<V: Into<Value>>(attr: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            attr: attr.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl ChunkFilter for EqualTo {
    fn apply<'c>(&self, chunks: &Chunks<'c>) -> Result<Chunks<'c>> {
        let column = chunks.table().require("chunks", &self.attr)?;

        let keep: Vec<usize> = column
            .iter()
            .enumerate()
            .filter(|(_, cell)| {
                !is_missing(cell) && self.values.iter().any(|v| cell.loosely_equals(v))
            })
            .map(|(i, _)| i)
            .collect();

        debug!(attr = %self.attr, values = self.values.len(), kept = keep.len(), "equal-to filter");
        Ok(chunks.take(&keep))
    }
}
