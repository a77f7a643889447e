//! Counting regex matches in stringified chunks.

use std::ops::{BitOr, BitOrAssign};

use regex::{Regex, RegexBuilder};

use crate::{AttrExpr, Chunks, Error, Result, Value};

/// Named regex modifiers, combined with `|`.
///
/// ```rust
/// use tessera::RegexFlags;
///
/// let flags = RegexFlags::CASE_INSENSITIVE | RegexFlags::MULTI_LINE;
/// assert!(flags.contains(RegexFlags::MULTI_LINE));
/// assert!(!flags.contains(RegexFlags::ASCII));
/// ```
///
/// Inline flags in the pattern (`(?i)`, `(?m)`, ...) work as well and take
/// precedence inside their group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RegexFlags(u8);

impl RegexFlags {
    /// No modifiers.
    pub const NONE: Self = Self(0);
    /// Letters match regardless of case.
    pub const CASE_INSENSITIVE: Self = Self(1);
    /// `^` and `$` match at line boundaries.
    pub const MULTI_LINE: Self = Self(1 << 1);
    /// `.` also matches `\n`.
    pub const DOT_MATCHES_NEW_LINE: Self = Self(1 << 2);
    /// Whitespace in the pattern is ignored and `#` starts a comment.
    pub const IGNORE_WHITESPACE: Self = Self(1 << 3);
    /// Character classes such as `\w` and `\d` are ASCII-only.
    pub const ASCII: Self = Self(1 << 4);

    /// Whether every flag in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no flag is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn build(self, pattern: &str) -> Result<Regex> {
        RegexBuilder::new(pattern)
            .case_insensitive(self.contains(Self::CASE_INSENSITIVE))
            .multi_line(self.contains(Self::MULTI_LINE))
            .dot_matches_new_line(self.contains(Self::DOT_MATCHES_NEW_LINE))
            .ignore_whitespace(self.contains(Self::IGNORE_WHITESPACE))
            .unicode(!self.contains(Self::ASCII))
            .build()
            .map_err(|source| Error::Regex {
                pattern: pattern.to_owned(),
                source,
            })
    }
}

impl BitOr for RegexFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for RegexFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Count non-overlapping regex matches in each chunk's string form.
///
/// The stringifier is any [`AttrExpr`] returning one string per chunk,
/// typically a [`SimpleStringify`](crate::SimpleStringify). Null strings
/// count zero matches.
pub struct RegexCount {
    stringifier: Box<dyn AttrExpr>,
    regex: Regex,
}

impl RegexCount {
    /// Count matches of `pattern`, compiled with `flags`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Regex`] if the pattern does not compile.
    pub fn new(
        stringifier: impl AttrExpr + 'static,
        pattern: &str,
        flags: RegexFlags,
    ) -> Result<Self> {
        Ok(Self {
            stringifier: Box::new(stringifier),
            regex: flags.build(pattern)?,
        })
    }
}

impl AttrExpr for RegexCount {
    fn evaluate(&self, chunks: &Chunks<'_>) -> Result<Vec<Value>> {
        self.stringifier
            .evaluate(chunks)?
            .iter()
            .map(|s| match s {
                Value::Str(s) => {
                    let n = self.regex.find_iter(s).count();
                    Ok(Value::Int(i64::try_from(n).unwrap_or(i64::MAX)))
                }
                Value::Null => Ok(Value::Int(0)),
                other => Err(Error::ColumnType {
                    column: "stringifier output".to_owned(),
                    expected: "string",
                    found: other.type_name(),
                }),
            })
            .collect()
    }
}
