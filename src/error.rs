//! Error types for tessera.

/// Errors that can occur while building or querying a corpus.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required column is missing from a table.
    #[error("{table} table is missing required column `{column}`")]
    Schema {
        /// Which table was inspected (`atoms`, `chunks`, ...).
        table: &'static str,
        /// The missing column.
        column: String,
    },

    /// No chunk collection is registered under this name.
    #[error("no chunks named `{0}` in corpus")]
    NotFound(String),

    /// A chunk id appears on more than one row of a chunk table.
    #[error("duplicate chunk id `{0}`")]
    DuplicateId(String),

    /// Chunks were registered against a corpus they were not built from.
    #[error("chunks `{0}` belong to a different corpus instance")]
    IdentityMismatch(String),

    /// An option string did not name a known variant.
    #[error("invalid {option} `{value}`; expected one of: {}", valid.join(", "))]
    InvalidOption {
        /// The option being parsed.
        option: &'static str,
        /// What the caller passed.
        value: String,
        /// Accepted spellings.
        valid: &'static [&'static str],
    },

    /// A regex pattern failed to compile.
    #[error("invalid regex pattern `{pattern}`: {source}")]
    Regex {
        /// The offending pattern.
        pattern: String,
        /// Compiler diagnostic.
        #[source]
        source: regex::Error,
    },

    /// Invalid chunk size (must be > 0).
    #[error("invalid chunk size: {0} (must be > 0)")]
    InvalidChunkSize(usize),

    /// Window step `size + offset` does not advance.
    #[error("window step size {size} + offset {offset} must be > 0")]
    InvalidStep {
        /// The window size.
        size: usize,
        /// The offset between windows.
        offset: i64,
    },

    /// A column holds values of the wrong type for the requested operation.
    #[error("column `{column}`: expected {expected}, found {found}")]
    ColumnType {
        /// The column being read.
        column: String,
        /// What the operation needs.
        expected: &'static str,
        /// What was actually there.
        found: &'static str,
    },

    /// A column or attribute result does not line up with its table.
    #[error("column `{column}` has {found} values, expected {expected}")]
    LengthMismatch {
        /// The column being added.
        column: String,
        /// Row count of the table.
        expected: usize,
        /// Values supplied.
        found: usize,
    },
}

impl Error {
    pub(crate) fn schema(table: &'static str, column: impl Into<String>) -> Self {
        Self::Schema {
            table,
            column: column.into(),
        }
    }
}

/// Result type for tessera operations.
pub type Result<T> = std::result::Result<T, Error>;
