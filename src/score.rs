//! Plugging external relevance scorers into a pipeline.
//!
//! A scorer ranks strings against a query: BM25, TF-IDF, a cross-encoder
//! behind an HTTP call. This crate does not ship one. [`Scored`] turns any
//! [`Scorer`] into an attribute expression so its output can feed
//! [`TopK`](crate::TopK) or [`Threshold`](crate::Threshold):
//!
//! ```text
//! Chunks ── stringifier ──> ["The quick..", "Over the.."] ── scorer(query) ──> [0.2, 1.7]
//! ```

use tracing::debug;

use crate::{AttrExpr, Chunks, Error, Result, Value};

/// Scores a batch of documents against a query.
///
/// Any `Fn(&[String], &str) -> Vec<f64>` is a scorer.
pub trait Scorer: Send + Sync {
    /// One score per document, in order.
    ///
    /// # Errors
    ///
    /// Implementation-defined.
    fn score(&self, documents: &[String], query: &str) -> Result<Vec<f64>>;
}

impl<F> Scorer for F
where
    F: Fn(&[String], &str) -> Vec<f64> + Send + Sync,
{
    fn score(&self, documents: &[String], query: &str) -> Result<Vec<f64>> {
        Ok(self(documents, query))
    }
}

/// Score each chunk's string form against a fixed query.
///
/// ```rust
/// use tessera::{Scored, SimpleStringify};
///
/// // Scores documents by how often they contain the query.
/// let occurrences = |docs: &[String], query: &str| -> Vec<f64> {
///     docs.iter().map(|d| d.matches(query).count() as f64).collect()
/// };
/// let scored = Scored::new(SimpleStringify::default(), occurrences, "fox");
/// ```
///
/// Null strings are scored as empty documents.
pub struct Scored<S> {
    stringifier: Box<dyn AttrExpr>,
    scorer: S,
    query: String,
}

impl<S: Scorer> Scored<S> {
    /// Score the output of `stringifier` with `scorer` against `query`.
    pub fn new(
        stringifier: impl AttrExpr + 'static,
        scorer: S,
        query: impl Into<String>,
    ) -> Self {
        Self {
            stringifier: Box::new(stringifier),
            scorer,
            query: query.into(),
        }
    }
}

impl<S: Scorer> AttrExpr for Scored<S> {
    fn evaluate(&self, chunks: &Chunks<'_>) -> Result<Vec<Value>> {
        let documents = self
            .stringifier
            .evaluate(chunks)?
            .into_iter()
            .map(|v| match v {
                Value::Str(s) => Ok(s),
                Value::Null => Ok(String::new()),
                other => Err(Error::ColumnType {
                    column: "stringifier output".to_owned(),
                    expected: "string",
                    found: other.type_name(),
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        let scores = self.scorer.score(&documents, &self.query)?;
        if scores.len() != documents.len() {
            return Err(Error::LengthMismatch {
                column: "scores".to_owned(),
                expected: documents.len(),
                found: scores.len(),
            });
        }

        debug!(documents = documents.len(), query = %self.query, "scored chunks");
        Ok(scores.into_iter().map(Value::Float).collect())
    }
}
