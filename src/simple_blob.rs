//! `SIMPLEBLOB`: a session key encrypted under an RSA key-exchange key.
//!
//! | Offset | Size | Field |
//! |---|---|---|
//! | 0 | 8 | [`BlobHeader`], `aiKeyAlg` names the session algorithm |
//! | 8 | 4 | `ALG_ID` of the wrapping key (`CALG_RSA_KEYX`) |
//! | 12 | rest | PKCS #1 v1.5 ciphertext, byte-reversed as a whole |
//!
//! The ciphertext is reversed as a single buffer, unlike the per-field
//! reversal of RSA key blobs. This module stores it exactly as found on the
//! wire; [`crate::session`] reverses it before decryption.

use crate::consts::SIMPLE_BLOB_PAYLOAD_OFFSET;
use crate::error::{DecodeError, EncodeError};
use crate::header::{read_u32_le, AlgId, BlobHeader, BlobType};
use std::convert::TryFrom;

/// Parsed `SIMPLEBLOB`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimpleBlob {
    pub header: BlobHeader,
    pub wrapping_alg_id: AlgId,
    /// Encrypted session key in wire (reversed) byte order.
    pub encrypted_key_data: Vec<u8>,
}

impl SimpleBlob {
    pub fn new(session_alg: AlgId, encrypted_key_data: Vec<u8>) -> Self {
        SimpleBlob {
            header: BlobHeader::new(BlobType::Simple, session_alg),
            wrapping_alg_id: AlgId::RsaKeyx,
            encrypted_key_data,
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let header = BlobHeader::decode(bytes)?;
        if header.blob_type != BlobType::Simple {
            return Err(DecodeError::InvalidMagic);
        }
        if header.alg_id.aes_key_len().is_none() {
            return Err(DecodeError::UnsupportedAlgorithm);
        }

        if bytes.len() < SIMPLE_BLOB_PAYLOAD_OFFSET {
            return Err(DecodeError::TruncatedInput {
                needed: SIMPLE_BLOB_PAYLOAD_OFFSET,
                available: bytes.len(),
            });
        }
        let wrapping_alg_id = AlgId::try_from(read_u32_le(&bytes[8..12]))
            .map_err(|_| DecodeError::InvalidMagic)?;
        if wrapping_alg_id != AlgId::RsaKeyx {
            return Err(DecodeError::UnsupportedAlgorithm);
        }

        let encrypted_key_data = &bytes[SIMPLE_BLOB_PAYLOAD_OFFSET..];
        if encrypted_key_data.is_empty() {
            return Err(DecodeError::TruncatedInput {
                needed: SIMPLE_BLOB_PAYLOAD_OFFSET + 1,
                available: bytes.len(),
            });
        }

        tracing::debug!(
            session_alg = ?header.alg_id,
            payload_len = encrypted_key_data.len(),
            "decoded SIMPLEBLOB"
        );
        Ok(SimpleBlob {
            header,
            wrapping_alg_id,
            encrypted_key_data: encrypted_key_data.to_vec(),
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        if self.header.blob_type != BlobType::Simple {
            return Err(EncodeError::BlobTypeMismatch);
        }
        if self.header.alg_id.aes_key_len().is_none() || self.wrapping_alg_id != AlgId::RsaKeyx {
            return Err(EncodeError::UnsupportedAlgorithm);
        }
        if self.encrypted_key_data.is_empty() {
            return Err(EncodeError::EmptyPayload);
        }

        let mut out =
            Vec::with_capacity(SIMPLE_BLOB_PAYLOAD_OFFSET + self.encrypted_key_data.len());
        out.extend_from_slice(&self.header.encode());
        out.extend_from_slice(&self.wrapping_alg_id.as_value().to_le_bytes());
        out.extend_from_slice(&self.encrypted_key_data);
        Ok(out)
    }

    /// Ciphertext in the order an RSA decryption primitive expects.
    pub fn ciphertext(&self) -> Vec<u8> {
        self.encrypted_key_data.iter().rev().copied().collect()
    }
}
