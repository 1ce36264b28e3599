//! Portable codec for CryptoAPI ("WinCrypt") key blobs.
//!
//! Parses and serializes `PUBLICKEYBLOB`, `PRIVATEKEYBLOB` and `SIMPLEBLOB`
//! without calling into Windows, and unwraps the RSA-encrypted session key a
//! `SIMPLEBLOB` carries. Every operation is a pure function over a byte
//! buffer, so values can be decoded on any number of threads at once.

use doc_comment::doctest;

pub mod buffer;
pub mod codec;
pub mod consts;
pub mod error;
pub use error::{
    CipherError, DecodeError, EncodeError, Error, KeyError, Result, UnwrapError, WrapError,
};
pub mod header;
pub mod layout;
pub mod rsa_blob;
pub mod session;
pub mod simple_blob;
#[cfg(feature = "block-cipher")]
pub mod symmetric;

pub use codec::{decode, encode, BlobKind, ParsedKey};
pub use session::{unwrap, wrap, SessionKey};

// Compile and test the README
doctest!("../README.md");
