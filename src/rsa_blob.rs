//! RSA key blobs
//!
//! `PUBLICKEYBLOB` and `PRIVATEKEYBLOB` share the same prefix: a
//! [`BlobHeader`], an `RSAPUBKEY` (`"RSA1"`/`"RSA2"` magic, bit length and
//! public exponent) and the modulus. A private blob continues with the CRT
//! parameters and the private exponent. Every multi-byte value is stored
//! little-endian; the structures in this module hold them big-endian, which is
//! what PKCS #1 and most other libraries expect.
//!
//! # Example
//! ```
//! use wincrypt_blob::rsa_blob::PublicKeyBlob;
//!
//! let mut wire = vec![0x06, 0x02, 0x00, 0x00, 0x00, 0xA4, 0x00, 0x00];
//! wire.extend_from_slice(b"RSA1");
//! wire.extend_from_slice(&32u32.to_le_bytes());
//! wire.extend_from_slice(&65537u32.to_le_bytes());
//! wire.extend_from_slice(&[0x01, 0x02, 0x03, 0x84]);
//!
//! let blob = PublicKeyBlob::decode(&wire).unwrap();
//! assert_eq!(blob.key.modulus, [0x84, 0x03, 0x02, 0x01]);
//! assert_eq!(blob.key.public_exponent, 65537);
//! assert_eq!(blob.encode().unwrap(), wire);
//! ```

use crate::buffer::Buffer;
use crate::consts::*;
use crate::error::{DecodeError, EncodeError, KeyError};
use crate::header::{read_u32_le, AlgId, BlobHeader, BlobType};
use crate::layout::{Field, FieldSpan, KeyKind, Layout};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

/// Public half of an RSA key, normalized to big-endian.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsaPublicKeyFields {
    pub bit_length: u32,
    pub public_exponent: u32,
    /// `bit_length / 8` bytes, big-endian.
    pub modulus: Vec<u8>,
}

/// Full RSA private key, normalized to big-endian.
///
/// `prime1`, `prime2`, `exponent1`, `exponent2` and `coefficient` are
/// `bit_length / 16` bytes; `modulus` and `private_exponent` are
/// `bit_length / 8` bytes. Secret fields are zeroed when dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RsaPrivateKeyFields {
    pub bit_length: u32,
    pub public_exponent: u32,
    pub modulus: Vec<u8>,
    pub prime1: Buffer,
    pub prime2: Buffer,
    pub exponent1: Buffer,
    pub exponent2: Buffer,
    pub coefficient: Buffer,
    pub private_exponent: Buffer,
}

/// Parsed `PUBLICKEYBLOB`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKeyBlob {
    pub header: BlobHeader,
    pub key: RsaPublicKeyFields,
}

/// Parsed `PRIVATEKEYBLOB`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivateKeyBlob {
    pub header: BlobHeader,
    pub key: RsaPrivateKeyFields,
}

/// Prefix shared by both RSA key blobs, validated against the layout.
struct RsaPrefix {
    header: BlobHeader,
    bit_length: u32,
    public_exponent: u32,
    layout: Layout,
}

fn decode_prefix(bytes: &[u8], kind: KeyKind) -> Result<RsaPrefix, DecodeError> {
    let (blob_type, magic) = match kind {
        KeyKind::Public => (BlobType::PublicKey, RSA1_MAGIC),
        KeyKind::Private => (BlobType::PrivateKey, RSA2_MAGIC),
    };

    let header = BlobHeader::decode(bytes)?;
    if header.blob_type != blob_type {
        return Err(DecodeError::InvalidMagic);
    }
    if !header.alg_id.is_rsa() {
        return Err(DecodeError::UnsupportedAlgorithm);
    }

    let prefix_len = BLOB_HEADER_LEN + RSA_PUBKEY_LEN;
    if bytes.len() < prefix_len {
        return Err(DecodeError::TruncatedInput {
            needed: prefix_len,
            available: bytes.len(),
        });
    }
    if read_u32_le(&bytes[8..12]) != magic {
        return Err(DecodeError::InvalidMagic);
    }
    let bit_length = read_u32_le(&bytes[12..16]);
    let public_exponent = read_u32_le(&bytes[16..20]);

    let layout = Layout::new(kind, bit_length)?;
    if bytes.len() < layout.total_len() {
        return Err(DecodeError::TruncatedInput {
            needed: layout.total_len(),
            available: bytes.len(),
        });
    }
    if bytes.len() > layout.total_len() {
        return Err(DecodeError::TrailingData {
            extra: bytes.len() - layout.total_len(),
        });
    }

    Ok(RsaPrefix {
        header,
        bit_length,
        public_exponent,
        layout,
    })
}

fn encode_prefix(
    header: &BlobHeader,
    expected_type: BlobType,
    magic: u32,
    bit_length: u32,
    public_exponent: u32,
    layout: &Layout,
) -> Result<Vec<u8>, EncodeError> {
    if header.blob_type != expected_type {
        return Err(EncodeError::BlobTypeMismatch);
    }
    if !header.alg_id.is_rsa() {
        return Err(EncodeError::UnsupportedAlgorithm);
    }

    let mut out = Vec::with_capacity(layout.total_len());
    out.extend_from_slice(&header.encode());
    out.extend_from_slice(&magic.to_le_bytes());
    out.extend_from_slice(&bit_length.to_le_bytes());
    out.extend_from_slice(&public_exponent.to_le_bytes());
    Ok(out)
}

/// Appends `value` in wire (little-endian) order after checking its length.
fn put_field(out: &mut Vec<u8>, span: &FieldSpan, value: &[u8]) -> Result<(), EncodeError> {
    if value.len() != span.len {
        return Err(EncodeError::FieldLength {
            field: span.field,
            expected: span.len,
            actual: value.len(),
        });
    }
    debug_assert_eq!(out.len(), span.offset);
    out.extend(value.iter().rev());
    Ok(())
}

fn layout_for_encode(kind: KeyKind, bit_length: u32) -> Result<Layout, EncodeError> {
    Layout::new(kind, bit_length).map_err(|_| EncodeError::UnsupportedAlgorithm)
}

impl PublicKeyBlob {
    pub fn new(alg_id: AlgId, key: RsaPublicKeyFields) -> Self {
        PublicKeyBlob {
            header: BlobHeader::new(BlobType::PublicKey, alg_id),
            key,
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let prefix = decode_prefix(bytes, KeyKind::Public)?;
        let modulus = match prefix.layout.spans() {
            [modulus] => bytes[modulus.range()].iter().rev().copied().collect(),
            _ => return Err(DecodeError::UnsupportedAlgorithm),
        };

        tracing::debug!(bit_length = prefix.bit_length, "decoded PUBLICKEYBLOB");
        Ok(PublicKeyBlob {
            header: prefix.header,
            key: RsaPublicKeyFields {
                bit_length: prefix.bit_length,
                public_exponent: prefix.public_exponent,
                modulus,
            },
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let key = &self.key;
        let layout = layout_for_encode(KeyKind::Public, key.bit_length)?;
        let mut out = encode_prefix(
            &self.header,
            BlobType::PublicKey,
            RSA1_MAGIC,
            key.bit_length,
            key.public_exponent,
            &layout,
        )?;
        match layout.spans() {
            [modulus] => put_field(&mut out, modulus, &key.modulus)?,
            _ => return Err(EncodeError::UnsupportedAlgorithm),
        }
        Ok(out)
    }
}

impl PrivateKeyBlob {
    pub fn new(alg_id: AlgId, key: RsaPrivateKeyFields) -> Self {
        PrivateKeyBlob {
            header: BlobHeader::new(BlobType::PrivateKey, alg_id),
            key,
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let prefix = decode_prefix(bytes, KeyKind::Private)?;
        let read = |span: &FieldSpan| Buffer::reversed(&bytes[span.range()]);

        let key = match prefix.layout.spans() {
            [modulus, prime1, prime2, exponent1, exponent2, coefficient, private_exponent] => {
                RsaPrivateKeyFields {
                    bit_length: prefix.bit_length,
                    public_exponent: prefix.public_exponent,
                    modulus: bytes[modulus.range()].iter().rev().copied().collect(),
                    prime1: read(prime1),
                    prime2: read(prime2),
                    exponent1: read(exponent1),
                    exponent2: read(exponent2),
                    coefficient: read(coefficient),
                    private_exponent: read(private_exponent),
                }
            }
            _ => return Err(DecodeError::UnsupportedAlgorithm),
        };

        tracing::debug!(bit_length = prefix.bit_length, "decoded PRIVATEKEYBLOB");
        Ok(PrivateKeyBlob {
            header: prefix.header,
            key,
        })
    }

    /// Serializes the key. The returned bytes hold the private key and are
    /// zeroed when dropped.
    pub fn encode(&self) -> Result<Zeroizing<Vec<u8>>, EncodeError> {
        let key = &self.key;
        let layout = layout_for_encode(KeyKind::Private, key.bit_length)?;
        let mut out = Zeroizing::new(encode_prefix(
            &self.header,
            BlobType::PrivateKey,
            RSA2_MAGIC,
            key.bit_length,
            key.public_exponent,
            &layout,
        )?);
        match layout.spans() {
            [modulus, prime1, prime2, exponent1, exponent2, coefficient, private_exponent] => {
                put_field(&mut out, modulus, &key.modulus)?;
                put_field(&mut out, prime1, key.prime1.as_slice())?;
                put_field(&mut out, prime2, key.prime2.as_slice())?;
                put_field(&mut out, exponent1, key.exponent1.as_slice())?;
                put_field(&mut out, exponent2, key.exponent2.as_slice())?;
                put_field(&mut out, coefficient, key.coefficient.as_slice())?;
                put_field(&mut out, private_exponent, key.private_exponent.as_slice())?;
            }
            _ => return Err(EncodeError::UnsupportedAlgorithm),
        }
        Ok(out)
    }

    /// The matching `PUBLICKEYBLOB`, with the same algorithm id.
    pub fn public_blob(&self) -> PublicKeyBlob {
        PublicKeyBlob::new(self.header.alg_id, self.key.to_public())
    }
}

// Conversions to and from `rsa` crate keys

/// Left-pads a big-endian integer to `width` bytes.
fn to_fixed_width(
    value: &BigUint,
    field: Field,
    width: usize,
) -> Result<Zeroizing<Vec<u8>>, KeyError> {
    let bytes = Zeroizing::new(value.to_bytes_be());
    if bytes.len() > width {
        return Err(KeyError::ComponentTooLarge { field, width });
    }
    let mut out = Zeroizing::new(vec![0u8; width]);
    out[width - bytes.len()..].copy_from_slice(&bytes);
    Ok(out)
}

fn exponent_to_u32(e: &BigUint) -> Result<u32, KeyError> {
    let bytes = e.to_bytes_be();
    if bytes.len() > 4 {
        return Err(KeyError::ExponentTooLarge);
    }
    Ok(bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b)))
}

fn bit_length_of(size: usize) -> Result<u32, KeyError> {
    let bit_length = u32::try_from(size * 8)
        .map_err(|_| KeyError::Inconsistent("modulus is too large"))?;
    if bit_length == 0 || bit_length % 16 != 0 {
        return Err(KeyError::Inconsistent("bit length is not a multiple of 16"));
    }
    Ok(bit_length)
}

fn map_rsa_error(err: rsa::Error) -> KeyError {
    tracing::debug!(rsa_error = ?err, "rsa rejected key");
    KeyError::Rsa(err.to_string())
}

fn map_der_error(err: impl std::fmt::Display) -> KeyError {
    KeyError::Der(err.to_string())
}

impl RsaPublicKeyFields {
    /// Builds an `rsa` key from the fields. Moduli up to [`MAX_BIT_LENGTH`]
    /// bits are accepted, not only the 4096 the `rsa` crate allows by default.
    pub fn to_rsa_public_key(&self) -> Result<RsaPublicKey, KeyError> {
        RsaPublicKey::new_with_max_size(
            BigUint::from_bytes_be(&self.modulus),
            BigUint::from(self.public_exponent),
            MAX_BIT_LENGTH as usize,
        )
        .map_err(map_rsa_error)
    }

    pub fn from_rsa_public_key(key: &RsaPublicKey) -> Result<Self, KeyError> {
        let bit_length = bit_length_of(key.size())?;
        let modulus = to_fixed_width(key.n(), Field::Modulus, key.size())?;
        Ok(RsaPublicKeyFields {
            bit_length,
            public_exponent: exponent_to_u32(key.e())?,
            modulus: modulus.to_vec(),
        })
    }

    /// PKCS #1 `RSAPublicKey` DER encoding.
    pub fn to_pkcs1_der(&self) -> Result<Vec<u8>, KeyError> {
        use rsa::pkcs1::EncodeRsaPublicKey;

        let doc = self.to_rsa_public_key()?.to_pkcs1_der().map_err(map_der_error)?;
        Ok(doc.as_bytes().to_vec())
    }

    /// X.509 `SubjectPublicKeyInfo` DER encoding.
    pub fn to_public_key_der(&self) -> Result<Vec<u8>, KeyError> {
        use rsa::pkcs8::EncodePublicKey;

        let doc = self
            .to_rsa_public_key()?
            .to_public_key_der()
            .map_err(map_der_error)?;
        Ok(doc.as_bytes().to_vec())
    }

    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self, KeyError> {
        let asn1 = rsa::pkcs1::RsaPublicKey::try_from(der).map_err(map_der_error)?;
        let key = RsaPublicKey::new_with_max_size(
            BigUint::from_bytes_be(asn1.modulus.as_bytes()),
            BigUint::from_bytes_be(asn1.public_exponent.as_bytes()),
            MAX_BIT_LENGTH as usize,
        )
        .map_err(map_rsa_error)?;
        Self::from_rsa_public_key(&key)
    }
}

impl RsaPrivateKeyFields {
    pub fn to_public(&self) -> RsaPublicKeyFields {
        RsaPublicKeyFields {
            bit_length: self.bit_length,
            public_exponent: self.public_exponent,
            modulus: self.modulus.clone(),
        }
    }

    /// Builds an `rsa` key from the fields. The key is validated, so fields
    /// that do not describe one RSA key are rejected here.
    pub fn to_rsa_private_key(&self) -> Result<RsaPrivateKey, KeyError> {
        let one = BigUint::from(1u32);
        let p = BigUint::from_bytes_be(self.prime1.as_slice());
        let q = BigUint::from_bytes_be(self.prime2.as_slice());
        if p <= one || q <= one {
            return Err(KeyError::Inconsistent("primes must be greater than one"));
        }

        let key = RsaPrivateKey::from_components(
            BigUint::from_bytes_be(&self.modulus),
            BigUint::from(self.public_exponent),
            BigUint::from_bytes_be(self.private_exponent.as_slice()),
            vec![p, q],
        )
        .map_err(map_rsa_error)?;
        key.validate().map_err(map_rsa_error)?;
        Ok(key)
    }

    pub fn from_rsa_private_key(key: &RsaPrivateKey) -> Result<Self, KeyError> {
        let (p, q) = match key.primes() {
            [p, q] => (p, q),
            _ => return Err(KeyError::MissingComponents),
        };
        let dp = key.dp().ok_or(KeyError::MissingComponents)?;
        let dq = key.dq().ok_or(KeyError::MissingComponents)?;
        let qinv = key.crt_coefficient().ok_or(KeyError::MissingComponents)?;

        let full = key.size();
        let half = full / 2;
        let secret = |value: &BigUint, field| -> Result<Buffer, KeyError> {
            Ok(Buffer::from_slice(&to_fixed_width(value, field, width_of(field, full, half))?))
        };

        Ok(RsaPrivateKeyFields {
            bit_length: bit_length_of(full)?,
            public_exponent: exponent_to_u32(key.e())?,
            modulus: to_fixed_width(key.n(), Field::Modulus, full)?.to_vec(),
            prime1: secret(p, Field::Prime1)?,
            prime2: secret(q, Field::Prime2)?,
            exponent1: secret(dp, Field::Exponent1)?,
            exponent2: secret(dq, Field::Exponent2)?,
            coefficient: secret(&qinv, Field::Coefficient)?,
            private_exponent: secret(key.d(), Field::PrivateExponent)?,
        })
    }

    /// Checks that the fields describe one RSA key: `modulus = prime1 *
    /// prime2`, the modulus has exactly `bit_length` bits and the CRT values
    /// agree with the primes and private exponent.
    ///
    /// Decoding never runs this check.
    pub fn check_consistency(&self) -> Result<(), KeyError> {
        let one = BigUint::from(1u32);
        let n = BigUint::from_bytes_be(&self.modulus);
        let p = BigUint::from_bytes_be(self.prime1.as_slice());
        let q = BigUint::from_bytes_be(self.prime2.as_slice());
        let d = BigUint::from_bytes_be(self.private_exponent.as_slice());

        if p <= one || q <= one {
            return Err(KeyError::Inconsistent("primes must be greater than one"));
        }
        if &p * &q != n {
            return Err(KeyError::Inconsistent("modulus is not prime1 * prime2"));
        }
        if n.bits() != self.bit_length as usize {
            return Err(KeyError::Inconsistent("modulus does not have bit_length bits"));
        }
        if &d % (&p - &one) != BigUint::from_bytes_be(self.exponent1.as_slice()) {
            return Err(KeyError::Inconsistent("exponent1 is not d mod (prime1 - 1)"));
        }
        if &d % (&q - &one) != BigUint::from_bytes_be(self.exponent2.as_slice()) {
            return Err(KeyError::Inconsistent("exponent2 is not d mod (prime2 - 1)"));
        }
        let coefficient = BigUint::from_bytes_be(self.coefficient.as_slice());
        if (&coefficient * &q) % &p != one {
            return Err(KeyError::Inconsistent("coefficient is not prime2^-1 mod prime1"));
        }
        Ok(())
    }

    /// PKCS #1 `RSAPrivateKey` DER encoding.
    pub fn to_pkcs1_der(&self) -> Result<Zeroizing<Vec<u8>>, KeyError> {
        use rsa::pkcs1::EncodeRsaPrivateKey;

        let doc = self.to_rsa_private_key()?.to_pkcs1_der().map_err(map_der_error)?;
        Ok(Zeroizing::new(doc.as_bytes().to_vec()))
    }

    /// PKCS #8 `PrivateKeyInfo` DER encoding.
    pub fn to_pkcs8_der(&self) -> Result<Zeroizing<Vec<u8>>, KeyError> {
        use rsa::pkcs8::EncodePrivateKey;

        let doc = self.to_rsa_private_key()?.to_pkcs8_der().map_err(map_der_error)?;
        Ok(Zeroizing::new(doc.as_bytes().to_vec()))
    }

    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self, KeyError> {
        use rsa::pkcs1::DecodeRsaPrivateKey;

        let key = RsaPrivateKey::from_pkcs1_der(der).map_err(map_der_error)?;
        Self::from_rsa_private_key(&key)
    }
}

fn width_of(field: Field, full: usize, half: usize) -> usize {
    match field {
        Field::Modulus | Field::PrivateExponent => full,
        _ => half,
    }
}
