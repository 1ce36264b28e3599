use std::fmt::{Debug, Error, Formatter};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secure buffer implementation.
///
/// Holds secret key material. On destruction, its content is **always** set to
/// `0` before being released, and its `Debug` output never shows the bytes.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Buffer {
    inner: Vec<u8>,
}

impl Buffer {
    /// Create a new zero-filled buffer of the specified size.
    ///
    /// # Examples
    ///
    /// ```
    /// # use wincrypt_blob::buffer::Buffer;
    /// let buf = Buffer::new(76);
    /// assert_eq!(76, buf.len());
    /// ```
    pub fn new(size: usize) -> Self {
        Buffer {
            inner: vec![0; size],
        }
    }

    pub fn from_slice(data: &[u8]) -> Self {
        Buffer {
            inner: data.to_vec(),
        }
    }

    /// Copies `data` in reverse byte order.
    pub fn reversed(data: &[u8]) -> Self {
        Buffer {
            inner: data.iter().rev().copied().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        self.inner.as_slice()
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(inner: Vec<u8>) -> Self {
        Buffer { inner }
    }
}

impl AsRef<[u8]> for Buffer {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl Zeroize for Buffer {
    fn zeroize(&mut self) {
        self.inner.zeroize();
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl ZeroizeOnDrop for Buffer {}

impl Debug for Buffer {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "Buffer([REDACTED; {}])", self.inner.len())
    }
}
