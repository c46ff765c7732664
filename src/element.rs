//! Conversion between deque elements and their stored bytes.
//!
//! Each element occupies exactly one store value, so the contract stays in
//! control of the representation:
//!
//! * [Element] fixes how a value becomes bytes and comes back.
//!
//! * [String] elements are stored as their UTF-8 bytes, unchanged.
//!
//! * Richer element types can implement [Element] with [candid::encode_one]
//!   and [candid::decode_one].
use crate::deque::DequeError;

/// A value that can be written to the store and read back losslessly.
pub trait Element: Sized {
    /// Serialize the element for storage.
    fn encode(&self) -> Result<Vec<u8>, DequeError>;

    /// Reconstruct an element from stored bytes.
    fn decode(bytes: Vec<u8>) -> Result<Self, DequeError>;
}

impl Element for String {
    fn encode(&self) -> Result<Vec<u8>, DequeError> {
        Ok(self.as_bytes().to_vec())
    }

    fn decode(bytes: Vec<u8>) -> Result<Self, DequeError> {
        Ok(String::from_utf8(bytes)?)
    }
}
