//! Blob header
//!
//! Every CryptoAPI key blob starts with the same 8-byte `BLOBHEADER`:
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 1 | `bType` |
//! | 1 | 1 | `bVersion` |
//! | 2 | 2 | `reserved`, must be zero |
//! | 4 | 4 | `aiKeyAlg` (little-endian) |

use crate::consts::*;
use crate::error::DecodeError;
use std::convert::TryFrom;

/// Type of a key blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlobType {
    PublicKey,
    PrivateKey,
    Simple,
}

impl BlobType {
    pub fn as_value(&self) -> u8 {
        match self {
            BlobType::PublicKey => PUBLICKEYBLOB,
            BlobType::PrivateKey => PRIVATEKEYBLOB,
            BlobType::Simple => SIMPLEBLOB,
        }
    }
}

impl TryFrom<u8> for BlobType {
    type Error = u8;

    fn try_from(value: u8) -> Result<BlobType, Self::Error> {
        match value {
            PUBLICKEYBLOB => Ok(BlobType::PublicKey),
            PRIVATEKEYBLOB => Ok(BlobType::PrivateKey),
            SIMPLEBLOB => Ok(BlobType::Simple),
            val => Err(val),
        }
    }
}

/// CryptoAPI algorithm identifiers (`ALG_ID`) recognized in blob headers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlgId {
    /// RSA key exchange. Standard: PKCS #1 v1.5.
    RsaKeyx,
    /// RSA signature. Standard: PKCS #1 v1.5.
    RsaSign,
    Des,
    Rc2,
    TripleDes,
    /// Standard: FIPS 197.
    Aes128,
    /// Standard: FIPS 197.
    Aes192,
    /// Standard: FIPS 197.
    Aes256,
    Rc4,
}

impl AlgId {
    pub fn as_value(&self) -> u32 {
        match self {
            AlgId::RsaKeyx => CALG_RSA_KEYX,
            AlgId::RsaSign => CALG_RSA_SIGN,
            AlgId::Des => CALG_DES,
            AlgId::Rc2 => CALG_RC2,
            AlgId::TripleDes => CALG_3DES,
            AlgId::Aes128 => CALG_AES_128,
            AlgId::Aes192 => CALG_AES_192,
            AlgId::Aes256 => CALG_AES_256,
            AlgId::Rc4 => CALG_RC4,
        }
    }

    /// Whether this id may appear in the header of an RSA key blob.
    pub fn is_rsa(&self) -> bool {
        matches!(self, AlgId::RsaKeyx | AlgId::RsaSign)
    }

    /// Key length in bytes of an AES session algorithm.
    pub fn aes_key_len(&self) -> Option<usize> {
        match self {
            AlgId::Aes128 => Some(16),
            AlgId::Aes192 => Some(24),
            AlgId::Aes256 => Some(32),
            _ => None,
        }
    }
}

impl TryFrom<u32> for AlgId {
    type Error = u32;

    fn try_from(value: u32) -> Result<AlgId, Self::Error> {
        match value {
            CALG_RSA_KEYX => Ok(AlgId::RsaKeyx),
            CALG_RSA_SIGN => Ok(AlgId::RsaSign),
            CALG_DES => Ok(AlgId::Des),
            CALG_RC2 => Ok(AlgId::Rc2),
            CALG_3DES => Ok(AlgId::TripleDes),
            CALG_AES_128 => Ok(AlgId::Aes128),
            CALG_AES_192 => Ok(AlgId::Aes192),
            CALG_AES_256 => Ok(AlgId::Aes256),
            CALG_RC4 => Ok(AlgId::Rc4),
            val => Err(val),
        }
    }
}

/// Parsed `BLOBHEADER`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlobHeader {
    pub blob_type: BlobType,
    pub alg_id: AlgId,
}

impl BlobHeader {
    pub fn new(blob_type: BlobType, alg_id: AlgId) -> Self {
        BlobHeader {
            blob_type,
            alg_id,
        }
    }

    /// Reads the first [`BLOB_HEADER_LEN`] bytes of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let header = bytes
            .get(..BLOB_HEADER_LEN)
            .ok_or(DecodeError::TruncatedInput {
                needed: BLOB_HEADER_LEN,
                available: bytes.len(),
            })?;

        let blob_type = BlobType::try_from(header[0]).map_err(|_| DecodeError::InvalidMagic)?;
        if header[1] != CUR_BLOB_VERSION || header[2..4] != [0, 0] {
            return Err(DecodeError::InvalidMagic);
        }
        let alg_id = AlgId::try_from(read_u32_le(&header[4..8]))
            .map_err(|_| DecodeError::InvalidMagic)?;

        Ok(BlobHeader { blob_type, alg_id })
    }

    pub fn encode(&self) -> [u8; BLOB_HEADER_LEN] {
        let mut out = [0u8; BLOB_HEADER_LEN];
        out[0] = self.blob_type.as_value();
        out[1] = CUR_BLOB_VERSION;
        out[4..8].copy_from_slice(&self.alg_id.as_value().to_le_bytes());
        out
    }
}

/// Reads a little-endian `DWORD` from a 4-byte slice.
pub(crate) fn read_u32_le(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(buf)
}

#[cfg(windows)]
impl From<&BlobHeader> for winapi::um::wincrypt::BLOBHEADER {
    fn from(header: &BlobHeader) -> Self {
        winapi::um::wincrypt::BLOBHEADER {
            bType: header.blob_type.as_value() as _,
            bVersion: CUR_BLOB_VERSION as _,
            reserved: 0,
            aiKeyAlg: header.alg_id.as_value() as _,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_public_rsa_header() {
        let header = BlobHeader::decode(&[0x06, 0x02, 0x00, 0x00, 0x00, 0xA4, 0x00, 0x00]).unwrap();
        assert_eq!(header, BlobHeader::new(BlobType::PublicKey, AlgId::RsaKeyx));
    }

    #[test]
    fn decode_simple_aes_header() {
        let header = BlobHeader::decode(&[0x01, 0x02, 0x00, 0x00, 0x0E, 0x66, 0x00, 0x00]).unwrap();
        assert_eq!(header.blob_type, BlobType::Simple);
        assert_eq!(header.alg_id, AlgId::Aes128);
    }

    #[test]
    fn unknown_type_is_invalid_magic() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0xA4, 0x00, 0x00];
        assert_eq!(BlobHeader::decode(&bytes), Err(DecodeError::InvalidMagic));
    }

    #[test]
    fn wrong_version_is_invalid_magic() {
        let bytes = [0x06, 0x03, 0x00, 0x00, 0x00, 0xA4, 0x00, 0x00];
        assert_eq!(BlobHeader::decode(&bytes), Err(DecodeError::InvalidMagic));
    }

    #[test]
    fn unknown_alg_id_is_invalid_magic() {
        let bytes = [0x06, 0x02, 0x00, 0x00, 0xFF, 0xFF, 0x00, 0x00];
        assert_eq!(BlobHeader::decode(&bytes), Err(DecodeError::InvalidMagic));
    }

    #[test]
    fn short_header() {
        assert_eq!(
            BlobHeader::decode(&[0x06, 0x02, 0x00]),
            Err(DecodeError::TruncatedInput {
                needed: 8,
                available: 3
            })
        );
    }

    #[test]
    fn nonzero_reserved_is_invalid_magic() {
        let bytes = [0x07, 0x02, 0x34, 0x12, 0x00, 0x24, 0x00, 0x00];
        assert_eq!(BlobHeader::decode(&bytes), Err(DecodeError::InvalidMagic));

        let bytes = [0x07, 0x02, 0x00, 0x00, 0x00, 0x24, 0x00, 0x00];
        let header = BlobHeader::decode(&bytes).unwrap();
        assert_eq!(header.alg_id, AlgId::RsaSign);
        assert_eq!(header.encode(), bytes);
    }

    #[cfg(windows)]
    #[test]
    fn into_wincrypt_header() {
        let header = BlobHeader::new(BlobType::Simple, AlgId::Aes256);
        let raw = winapi::um::wincrypt::BLOBHEADER::from(&header);
        assert_eq!(raw.bType as u8, SIMPLEBLOB);
        assert_eq!(raw.aiKeyAlg as u32, CALG_AES_256);
    }
}
