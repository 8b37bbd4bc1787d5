//! Byte View Module
//!
//! Immutable byte value stored in and returned from the cache.

use std::fmt;

use bytes::Bytes;

/// Returns the number of bytes a value occupies in a bounded store.
pub trait ByteSize {
    /// Size in bytes counted against the store capacity.
    fn byte_size(&self) -> usize;
}

impl ByteSize for String {
    fn byte_size(&self) -> usize {
        self.len()
    }
}

impl ByteSize for Vec<u8> {
    fn byte_size(&self) -> usize {
        self.len()
    }
}

// == Byte View ==
/// An immutable view over cached bytes.
///
/// The bytes are never mutated after construction. Borrowed input is copied
/// on the way in and the owned accessors hand out fresh copies, so callers
/// can never alias the cached buffer. Clones share the same immutable buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteView {
    b: Bytes,
}

impl ByteView {
    // == Constructor ==
    /// Creates a view holding a copy of `bytes`.
    pub fn new(bytes: &[u8]) -> Self {
        Self {
            b: Bytes::copy_from_slice(bytes),
        }
    }

    /// Returns the length of the value in bytes.
    pub fn len(&self) -> usize {
        self.b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    /// Returns a copy of the data as a byte vector.
    pub fn byte_slice(&self) -> Vec<u8> {
        self.b.to_vec()
    }

    /// Returns the data as a string, replacing invalid UTF-8 sequences.
    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.b).into_owned()
    }
}

impl ByteSize for ByteView {
    fn byte_size(&self) -> usize {
        self.len()
    }
}

impl From<Vec<u8>> for ByteView {
    /// Takes ownership of `bytes`; no other handle to them can exist.
    fn from(bytes: Vec<u8>) -> Self {
        Self { b: Bytes::from(bytes) }
    }
}

impl From<&str> for ByteView {
    fn from(s: &str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl From<String> for ByteView {
    fn from(s: String) -> Self {
        Self::from(s.into_bytes())
    }
}

impl fmt::Display for ByteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.b))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_copies_input() {
        let mut source = b"630".to_vec();
        let view = ByteView::new(&source);

        source[0] = b'9';

        assert_eq!(view.byte_slice(), b"630".to_vec());
    }

    #[test]
    fn test_byte_slice_returns_fresh_copy() {
        let view = ByteView::from("hello");

        let mut copy = view.byte_slice();
        copy.clear();

        assert_eq!(view.len(), 5);
        assert_eq!(view.as_string(), "hello");
    }

    #[test]
    fn test_views_with_equal_bytes_are_equal() {
        assert_eq!(ByteView::from("abc"), ByteView::new(b"abc"));
        assert_ne!(ByteView::from("abc"), ByteView::from("abd"));
    }

    #[test]
    fn test_empty_view() {
        let view = ByteView::default();
        assert!(view.is_empty());
        assert_eq!(view.byte_size(), 0);
    }

    #[test]
    fn test_display_is_lossy_utf8() {
        let view = ByteView::from(vec![b'o', b'k', 0xff]);
        assert_eq!(view.to_string(), "ok\u{fffd}");
    }
}
