//! The Table type: named columns of equal length.
//!
//! Both the atom store and every chunk collection are tables. Only the few
//! relational primitives the operators need live here: column lookup, row
//! gather (`take`), stable sort, and concatenation.

use serde::Serialize;

use crate::{Error, Result, Value};

/// An in-memory columnar table.
///
/// Column order is insertion order. Every column has [`Table::num_rows`]
/// values.
///
/// ```rust
/// use tessera::{Table, Value};
///
/// let table = Table::from_columns([
///     ("id", vec![Value::from("a"), Value::from("b")]),
///     ("width", vec![Value::from(110), Value::from(200)]),
/// ])
/// .unwrap();
///
/// assert_eq!(table.num_rows(), 2);
/// assert_eq!(table.column("width").unwrap()[1], Value::Int(200));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Vec<Value>>,
    rows: usize,
}

impl Table {
    /// An empty table with no columns.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, values)` pairs.
    ///
    /// A repeated name replaces the earlier column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if the columns differ in length.
    pub fn from_columns<I, S>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<Value>)>,
        S: Into<String>,
    {
        let mut columns = columns.into_iter();
        let Some((name, values)) = columns.next() else {
            return Ok(Self::new());
        };
        let mut table = Self {
            rows: values.len(),
            names: vec![name.into()],
            columns: vec![values],
        };
        for (name, values) in columns {
            table = table.with_column(name, values)?;
        }
        Ok(table)
    }

    /// Number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Whether a column exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// A column's values, if it exists.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.position(name).map(|i| self.columns[i].as_slice())
    }

    /// A column's values, or [`Error::Schema`] naming `table` as the owner.
    pub(crate) fn require(&self, table: &'static str, name: &str) -> Result<&[Value]> {
        self.column(name).ok_or_else(|| Error::schema(table, name))
    }

    /// Return a copy with `values` appended as column `name`.
    ///
    /// An existing column with the same name is replaced in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] unless `values` has one value per row.
    /// A table without columns accepts any length.
    pub fn with_column(&self, name: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        let name = name.into();
        if !self.names.is_empty() && values.len() != self.rows {
            return Err(Error::LengthMismatch {
                column: name,
                expected: self.rows,
                found: values.len(),
            });
        }

        let mut table = self.clone();
        table.rows = values.len();
        match table.position(&name) {
            Some(i) => table.columns[i] = values,
            None => {
                table.names.push(name);
                table.columns.push(values);
            }
        }
        Ok(table)
    }

    /// Project onto the given columns, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if a column is missing.
    pub fn select(&self, names: &[&str]) -> Result<Self> {
        let mut table = Self {
            rows: self.rows,
            ..Self::default()
        };
        for name in names {
            let values = self.require("selected", name)?;
            table.names.push((*name).to_owned());
            table.columns.push(values.to_vec());
        }
        Ok(table)
    }

    /// Gather rows by index, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of bounds.
    #[must_use]
    pub fn take(&self, indices: &[usize]) -> Self {
        Self {
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|col| indices.iter().map(|&i| col[i].clone()).collect())
                .collect(),
            rows: indices.len(),
        }
    }

    /// Stable ascending sort by one column; nulls and incomparable values last.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the column is missing.
    pub fn sort_by(&self, name: &str) -> Result<Self> {
        let key = self.require("sorted", name)?;
        let mut order: Vec<usize> = (0..self.rows).collect();
        order.sort_by(|&a, &b| match (key[a].is_null(), key[b].is_null()) {
            (false, true) => std::cmp::Ordering::Less,
            (true, false) => std::cmp::Ordering::Greater,
            _ => key[a]
                .compare(&key[b])
                .unwrap_or(std::cmp::Ordering::Equal),
        });
        Ok(self.take(&order))
    }

    /// Concatenate tables row-wise.
    ///
    /// The result has the union of all column names (first-seen order);
    /// tables missing a column contribute nulls for it.
    #[must_use]
    pub fn concat<'a>(tables: impl IntoIterator<Item = &'a Table>) -> Self {
        let tables: Vec<&Table> = tables.into_iter().collect();
        let mut names: Vec<String> = Vec::new();
        for table in &tables {
            for name in &table.names {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
        }

        let rows = tables.iter().map(|t| t.rows).sum();
        let columns = names
            .iter()
            .map(|name| {
                let mut values = Vec::with_capacity(rows);
                for table in &tables {
                    match table.column(name) {
                        Some(col) => values.extend_from_slice(col),
                        None => values.extend(std::iter::repeat(Value::Null).take(table.rows)),
                    }
                }
                values
            })
            .collect();

        Self {
            names,
            columns,
            rows,
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}
