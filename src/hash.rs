//! Content-addressed ids for derived chunks.
//!
//! Chunk expressions never draw random ids. A derived chunk's id is a hash
//! of the fields that identify it (the bounding chunk id plus a positional
//! key), so running the same expression over the same corpus always yields
//! the same ids. That is what makes overlap comparisons between separately
//! computed collections, and caching by expression, work.
//!
//! The key is encoded canonically (type tag, fixed-width little-endian
//! numbers, length-prefixed strings) before hashing, so `("ab", "c")` and
//! `("a", "bc")` cannot collide by concatenation. SHA-256 is truncated to
//! 64 bits and rendered as 16 hex characters.

use sha2::{Digest, Sha256};

use crate::{Id, Value};

/// Derive a deterministic chunk id from an ordered key.
///
/// ```rust
/// use tessera::{content_id, Value};
///
/// let a = content_id(&[Value::from("page-1"), Value::Int(40)]);
/// let b = content_id(&[Value::from("page-1"), Value::Int(40)]);
/// assert_eq!(a, b);
/// assert_ne!(a, content_id(&[Value::from("page-1"), Value::Int(41)]));
/// ```
#[must_use]
pub fn content_id(key: &[Value]) -> Id {
    let mut hasher = Sha256::new();
    for field in key {
        encode(&mut hasher, field);
    }
    let digest = hasher.finalize();
    let hex: String = digest[..8].iter().map(|b| format!("{b:02x}")).collect();
    Id::Str(hex)
}

fn encode(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Null => hasher.update([0u8]),
        Value::Bool(b) => hasher.update([1u8, u8::from(*b)]),
        Value::Int(i) => {
            hasher.update([2u8]);
            hasher.update(i.to_le_bytes());
        }
        Value::Float(x) => {
            hasher.update([3u8]);
            hasher.update(x.to_bits().to_le_bytes());
        }
        Value::Str(s) => {
            hasher.update([4u8]);
            hasher.update((s.len() as u64).to_le_bytes());
            hasher.update(s.as_bytes());
        }
        Value::List(items) => {
            hasher.update([5u8]);
            hasher.update((items.len() as u64).to_le_bytes());
            for item in items {
                encode(hasher, item);
            }
        }
    }
}
