//! Blob codec entry points.
//!
//! [`decode`] dispatches on the blob kind, either supplied by the caller or
//! read from the `bType` byte of the header, and [`encode`] is its inverse.
//!
//! ```
//! use wincrypt_blob::codec::{decode, encode, BlobKind, ParsedKey};
//! use wincrypt_blob::DecodeError;
//!
//! let wire = [
//!     0x01, 0x02, 0x00, 0x00, 0x10, 0x66, 0x00, 0x00, // SIMPLEBLOB, CALG_AES_256
//!     0x00, 0xA4, 0x00, 0x00, // CALG_RSA_KEYX
//!     0x11, 0x22, 0x33,
//! ];
//! let parsed = decode(None, &wire).unwrap();
//! assert_eq!(parsed.kind(), BlobKind::Simple);
//! assert_eq!(*encode(&parsed).unwrap(), wire);
//!
//! assert_eq!(decode(Some(BlobKind::PublicKey), &wire), Err(DecodeError::InvalidMagic));
//! ```

use crate::error::{DecodeError, EncodeError};
use crate::header::{BlobHeader, BlobType};
use crate::rsa_blob::{PrivateKeyBlob, PublicKeyBlob};
use crate::simple_blob::SimpleBlob;
use zeroize::Zeroizing;

/// The blob kinds this codec understands.
pub type BlobKind = BlobType;

/// Result of decoding any supported blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedKey {
    Public(PublicKeyBlob),
    Private(PrivateKeyBlob),
    Simple(SimpleBlob),
}

impl ParsedKey {
    pub fn kind(&self) -> BlobKind {
        match self {
            ParsedKey::Public(_) => BlobKind::PublicKey,
            ParsedKey::Private(_) => BlobKind::PrivateKey,
            ParsedKey::Simple(_) => BlobKind::Simple,
        }
    }

    pub fn header(&self) -> &BlobHeader {
        match self {
            ParsedKey::Public(blob) => &blob.header,
            ParsedKey::Private(blob) => &blob.header,
            ParsedKey::Simple(blob) => &blob.header,
        }
    }
}

impl From<PublicKeyBlob> for ParsedKey {
    fn from(blob: PublicKeyBlob) -> Self {
        ParsedKey::Public(blob)
    }
}

impl From<PrivateKeyBlob> for ParsedKey {
    fn from(blob: PrivateKeyBlob) -> Self {
        ParsedKey::Private(blob)
    }
}

impl From<SimpleBlob> for ParsedKey {
    fn from(blob: SimpleBlob) -> Self {
        ParsedKey::Simple(blob)
    }
}

/// Parses a blob. When `kind` is `None` it is inferred from the header; when
/// given, a header of any other kind fails with [`DecodeError::InvalidMagic`].
pub fn decode(kind: Option<BlobKind>, bytes: &[u8]) -> Result<ParsedKey, DecodeError> {
    let header = BlobHeader::decode(bytes)?;
    if let Some(kind) = kind {
        if kind != header.blob_type {
            return Err(DecodeError::InvalidMagic);
        }
    }

    match header.blob_type {
        BlobKind::PublicKey => PublicKeyBlob::decode(bytes).map(ParsedKey::Public),
        BlobKind::PrivateKey => PrivateKeyBlob::decode(bytes).map(ParsedKey::Private),
        BlobKind::Simple => SimpleBlob::decode(bytes).map(ParsedKey::Simple),
    }
}

/// Serializes any supported blob. The bytes are zeroed when dropped, since
/// they may hold a private key.
pub fn encode(key: &ParsedKey) -> Result<Zeroizing<Vec<u8>>, EncodeError> {
    match key {
        ParsedKey::Public(blob) => blob.encode().map(Zeroizing::new),
        ParsedKey::Private(blob) => blob.encode(),
        ParsedKey::Simple(blob) => blob.encode().map(Zeroizing::new),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::AlgId;
    use crate::rsa_blob::tests::test_key;
    use crate::rsa_blob::RsaPrivateKeyFields;

    #[test]
    fn all_ones_type_fails_for_every_kind() {
        let mut bytes = vec![0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0xA4, 0x00, 0x00];
        bytes.extend_from_slice(&[0u8; 64]);
        for kind in [
            None,
            Some(BlobKind::PublicKey),
            Some(BlobKind::PrivateKey),
            Some(BlobKind::Simple),
        ] {
            assert_eq!(decode(kind, &bytes), Err(DecodeError::InvalidMagic));
        }
        assert_eq!(PublicKeyBlob::decode(&bytes), Err(DecodeError::InvalidMagic));
        assert_eq!(PrivateKeyBlob::decode(&bytes), Err(DecodeError::InvalidMagic));
        assert_eq!(SimpleBlob::decode(&bytes), Err(DecodeError::InvalidMagic));
    }

    #[test]
    fn infers_kind() {
        let fields = RsaPrivateKeyFields::from_rsa_private_key(test_key()).unwrap();
        let private = PrivateKeyBlob::new(AlgId::RsaKeyx, fields);
        let public = private.public_blob();

        for parsed in [ParsedKey::from(private), ParsedKey::from(public)] {
            let wire = encode(&parsed).unwrap();
            let decoded = decode(None, &wire).unwrap();
            assert_eq!(decoded.kind(), parsed.kind());
            assert_eq!(decode(Some(parsed.kind()), &wire).unwrap(), parsed);
            assert_eq!(decoded, parsed);
        }
    }

    #[test]
    fn empty_input() {
        assert_eq!(
            decode(None, &[]),
            Err(DecodeError::TruncatedInput {
                needed: 8,
                available: 0
            })
        );
    }
}
