//! Key encoding trait.

use crate::CoreError;

/// A trait for types that can be appended to a join key.
pub trait KeyEncoder {
    /// Encode this value into a fresh key.
    ///
    /// # Errors
    ///
    /// Returns an error if the value has no key encoding.
    fn encode_key(&self) -> Result<Vec<u8>, CoreError> {
        let mut buf = Vec::new();
        self.encode_key_to(&mut buf)?;
        Ok(buf)
    }

    /// Append the key encoding of this value to `buf`.
    ///
    /// On error, `buf` may hold a partial encoding; callers that keep the
    /// buffer must truncate it back themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if the value has no key encoding.
    fn encode_key_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError>;
}
