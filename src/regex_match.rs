//! Chunks from regex matches over the text of bounding chunks.
//!
//! ## How It Works
//!
//! Each bounding chunk's atoms are joined in ordinal order with a single
//! space, and every atom remembers where its text starts in that string:
//!
//! ```text
//! atoms:   "Over"  "the"  "<lazy>"  "dog"
//! string:  "Over the <lazy> dog"
//! starts:   0     5   9        16
//!
//! pattern "the <lazy>" matches [5, 15)
//! members: atoms starting in [5, 15]  ->  "the", "<lazy>"
//! ```
//!
//! The upper bound is inclusive, so an atom starting exactly where a match
//! ends (possible when the match swallows the trailing spacer) is included.
//! A match that covers no atom start, e.g. one inside a single word, yields
//! no chunk.

use regex::Regex;
use tracing::debug;

use crate::{content_id, ChunkExpr, ChunkSource, Chunks, Corpus, Error, Membership, Result, Table, Value};

/// Separator placed between atom texts when building the search string.
const SPACER: &str = " ";

/// One chunk per non-overlapping regex match within each bounding chunk.
///
/// Chunk ids are [`content_id`] of `(bounding id, match start, match end)`.
/// Output rows follow the bounding collection's row order, then match
/// order, with provenance columns `bound`, `start`, and `end` (byte offsets
/// into the search string).
#[derive(Debug, Clone)]
pub struct RegexMatchChunk {
    constrain_to: ChunkSource,
    regex: Regex,
}

impl RegexMatchChunk {
    /// Compile `pattern` for matching within `constrain_to` chunks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Regex`] if the pattern does not compile.
    pub fn new(constrain_to: impl Into<ChunkSource>, pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| Error::Regex {
            pattern: pattern.to_owned(),
            source,
        })?;
        Ok(Self {
            constrain_to: constrain_to.into(),
            regex,
        })
    }

    /// The pattern being matched.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

/// Join texts with [`SPACER`], returning the string and each text's offset.
fn search_string<'a>(texts: impl IntoIterator<Item = &'a str>) -> (String, Vec<usize>) {
    let mut haystack = String::new();
    let mut starts = Vec::new();
    for (i, text) in texts.into_iter().enumerate() {
        if i > 0 {
            haystack.push_str(SPACER);
        }
        starts.push(haystack.len());
        haystack.push_str(text);
    }
    (haystack, starts)
}

impl ChunkExpr for RegexMatchChunk {
    fn chunk<'c>(&self, corpus: &'c Corpus) -> Result<Chunks<'c>> {
        corpus.atom_column("ordinal")?;
        let text = corpus.atom_column("text")?;

        let bounds = corpus.chunk(&self.constrain_to)?;
        let groups = bounds.members_by_ordinal()?;

        let mut ids = Vec::new();
        let mut bound_col = Vec::new();
        let mut start_col = Vec::new();
        let mut end_col = Vec::new();
        let mut chunk_atoms = Vec::new();

        for (bound, atoms) in bounds.ids().iter().zip(&groups) {
            let (haystack, offsets) =
                search_string(atoms.iter().map(|&(row, _)| text[row].as_str().unwrap_or("")));
            let bound = Value::from(bound);

            for m in self.regex.find_iter(&haystack) {
                let (start, end) = (m.start(), m.end());
                let members: Vec<usize> = atoms
                    .iter()
                    .zip(&offsets)
                    .filter(|&(_, &offset)| start <= offset && offset <= end)
                    .map(|(&(row, _), _)| row)
                    .collect();
                if members.is_empty() {
                    continue;
                }

                let (start, end) = (offset_value(start), offset_value(end));
                let id = content_id(&[bound.clone(), start.clone(), end.clone()]);
                chunk_atoms.extend(
                    members
                        .into_iter()
                        .map(|row| Membership::new(id.clone(), corpus.atom_id(row).clone())),
                );
                ids.push(Value::from(id));
                bound_col.push(bound.clone());
                start_col.push(start);
                end_col.push(end);
            }
        }

        debug!(
            pattern = self.regex.as_str(),
            bounds = bounds.len(),
            chunks = ids.len(),
            "regex-match chunking"
        );

        let table = Table::from_columns([
            ("id", ids),
            ("bound", bound_col),
            ("start", start_col),
            ("end", end_col),
        ])?;
        Chunks::new(corpus, table, chunk_atoms)
    }
}

fn offset_value(offset: usize) -> Value {
    Value::Int(i64::try_from(offset).unwrap_or(i64::MAX))
}

impl From<RegexMatchChunk> for ChunkSource {
    fn from(expr: RegexMatchChunk) -> Self {
        ChunkSource::expr(expr)
    }
}
