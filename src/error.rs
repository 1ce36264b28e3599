//! Error types
//!
//! Every component of this library is a pure transform over a byte buffer, so
//! errors are surfaced unchanged to the caller. A malformed blob always yields
//! one of these values, never a plausible-looking key.

use crate::layout::Field;

/// Failure to parse a blob from its wire layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A blob type, version, algorithm id or RSA magic was not recognized, or
    /// did not match the expected blob kind.
    #[error("invalid magic value")]
    InvalidMagic,
    /// The buffer ended before the computed field layout did.
    #[error("truncated input: needed {needed} bytes, got {available}")]
    TruncatedInput { needed: usize, available: usize },
    /// The algorithm id is recognized but is not valid for this blob kind, or
    /// the key bit length cannot be laid out.
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,
    /// Bytes remained after the last field of the computed layout.
    #[error("{extra} unexpected trailing bytes")]
    TrailingData { extra: usize },
}

/// Failure to serialize a parsed key back into its wire layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("field {field:?} is {actual} bytes, layout requires {expected}")]
    FieldLength {
        field: Field,
        expected: usize,
        actual: usize,
    },
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,
    #[error("encrypted key data is empty")]
    EmptyPayload,
    /// The header names a different blob type than the value being encoded.
    #[error("header blob type does not match the key")]
    BlobTypeMismatch,
}

/// Failure to recover a session key from a `SIMPLEBLOB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UnwrapError {
    /// The RSA primitive could not run: the private key fields do not form a
    /// usable key, or the ciphertext does not fit the modulus.
    #[error("RSA decryption failed")]
    DecryptionFailed,
    /// PKCS#1 v1.5 padding did not validate. Usually a wrong private key.
    #[error("invalid PKCS#1 padding")]
    PaddingInvalid,
    /// The recovered key is not the size the blob's algorithm id declares.
    #[error("session key is {actual} bytes, algorithm requires {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    /// The blob's session algorithm cannot be instantiated as a session key.
    #[error("unsupported session algorithm")]
    UnsupportedAlgorithm,
}

/// Failure to wrap a session key into a `SIMPLEBLOB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum WrapError {
    #[error("RSA encryption failed")]
    EncryptionFailed,
    #[error("session key is {actual} bytes, algorithm requires {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("unsupported session algorithm")]
    UnsupportedAlgorithm,
}

/// Failure to convert between blob fields and `rsa` crate keys or DER.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// A key component does not fit the fixed width its field has.
    #[error("{field:?} does not fit in {width} bytes")]
    ComponentTooLarge { field: Field, width: usize },
    /// The public exponent does not fit the 32-bit blob field.
    #[error("public exponent does not fit in 32 bits")]
    ExponentTooLarge,
    /// The key has no CRT parameters or does not have exactly two primes.
    #[error("key is missing CRT components")]
    MissingComponents,
    /// The components do not describe a consistent RSA key.
    #[error("inconsistent RSA key: {0}")]
    Inconsistent(&'static str),
    /// The `rsa` crate rejected the components.
    #[error("RSA key error: {0}")]
    Rsa(String),
    #[error("DER error: {0}")]
    Der(String),
}

/// Failure to use an unwrapped session key with AES-CBC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CipherError {
    #[error("key or IV has an invalid length")]
    InvalidLength,
    /// Wrong key, or ciphertext not produced under the zero IV convention.
    #[error("invalid PKCS#7 padding")]
    PaddingInvalid,
}

/// Umbrella error for callers that do not need to tell components apart.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Unwrap(#[from] UnwrapError),
    #[error(transparent)]
    Wrap(#[from] WrapError),
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Cipher(#[from] CipherError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn umbrella_conversion() {
        fn fails() -> Result<()> {
            Err(DecodeError::InvalidMagic)?
        }

        assert_eq!(fails(), Err(Error::Decode(DecodeError::InvalidMagic)));
        assert_eq!(
            Error::from(UnwrapError::LengthMismatch {
                expected: 32,
                actual: 16
            })
            .to_string(),
            "session key is 16 bytes, algorithm requires 32"
        );
    }
}
