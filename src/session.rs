//! Session key unwrapping
//!
//! A `SIMPLEBLOB` carries an AES session key encrypted with RSA PKCS #1 v1.5
//! under a key-exchange key. CryptoAPI stores that ciphertext byte-reversed
//! and always instantiates the imported key in CBC mode with an all-zero IV.
//!
//! [`SessionKey`] holds plaintext key material. Its bytes are zeroed when it
//! is dropped, on every exit path, but copies the caller makes (for example
//! by handing the bytes to another library) are the caller's to clear.
//!
//! # Example
//! ```
//! use wincrypt_blob::rsa_blob::RsaPrivateKeyFields;
//! use wincrypt_blob::session::{unwrap, wrap, SessionAlgorithm};
//! use wincrypt_blob::consts::ZERO_IV;
//!
//! # let key = rsa::RsaPrivateKey::new(&mut rand::thread_rng(), 1024).unwrap();
//! let private = RsaPrivateKeyFields::from_rsa_private_key(&key).unwrap();
//! let public = private.to_public();
//!
//! let mut rng = rand::thread_rng();
//! let blob = wrap(SessionAlgorithm::Aes128, &[0u8; 16], &public, &mut rng).unwrap();
//! let session = unwrap(&blob, &private).unwrap();
//! assert_eq!(session.key_bytes(), &[0u8; 16]);
//! assert_eq!(session.initialization_vector(), &ZERO_IV);
//! ```

use crate::buffer::Buffer;
use crate::consts::ZERO_IV;
use crate::error::{UnwrapError, WrapError};
use crate::header::AlgId;
use crate::rsa_blob::{RsaPrivateKeyFields, RsaPublicKeyFields};
use crate::simple_blob::SimpleBlob;
use rand_core::{CryptoRng, RngCore};
use rsa::traits::PublicKeyParts;
use rsa::Pkcs1v15Encrypt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Symmetric algorithms a `SIMPLEBLOB` can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionAlgorithm {
    Aes128,
    Aes192,
    Aes256,
}

impl SessionAlgorithm {
    pub fn from_alg_id(alg_id: AlgId) -> Option<Self> {
        match alg_id {
            AlgId::Aes128 => Some(Self::Aes128),
            AlgId::Aes192 => Some(Self::Aes192),
            AlgId::Aes256 => Some(Self::Aes256),
            _ => None,
        }
    }

    pub fn alg_id(&self) -> AlgId {
        match self {
            Self::Aes128 => AlgId::Aes128,
            Self::Aes192 => AlgId::Aes192,
            Self::Aes256 => AlgId::Aes256,
        }
    }

    /// Key size in bytes.
    pub fn key_len(&self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes192 => 24,
            Self::Aes256 => 32,
        }
    }
}

/// Symmetric algorithm chaining modes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainingMode {
    /// Cipher Block Chaining
    ///
    /// Standard: SP800-38A
    Cbc,
}

/// Plaintext session key recovered from a `SIMPLEBLOB`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionKey {
    algorithm: SessionAlgorithm,
    key: Buffer,
}

impl SessionKey {
    pub(crate) fn new(algorithm: SessionAlgorithm, key: Buffer) -> Self {
        debug_assert_eq!(key.len(), algorithm.key_len());
        SessionKey { algorithm, key }
    }

    pub fn algorithm(&self) -> SessionAlgorithm {
        self.algorithm
    }

    pub fn key_bytes(&self) -> &[u8] {
        self.key.as_slice()
    }

    /// Always [`ChainingMode::Cbc`].
    pub fn chaining_mode(&self) -> ChainingMode {
        ChainingMode::Cbc
    }

    /// Always 16 zero bytes, whatever the key size.
    pub fn initialization_vector(&self) -> &'static [u8; 16] {
        &ZERO_IV
    }
}

impl Zeroize for SessionKey {
    fn zeroize(&mut self) {
        self.key.zeroize();
    }
}

// `Buffer` clears itself on drop.
impl ZeroizeOnDrop for SessionKey {}

/// Recovers the session key from `blob` with the private half of the
/// key-exchange key that wrapped it.
///
/// A private key that does not match the wrapping public key is only
/// detected by the decryption itself and almost always yields
/// [`UnwrapError::PaddingInvalid`].
pub fn unwrap(
    blob: &SimpleBlob,
    private_key: &RsaPrivateKeyFields,
) -> Result<SessionKey, UnwrapError> {
    let algorithm = SessionAlgorithm::from_alg_id(blob.header.alg_id)
        .ok_or(UnwrapError::UnsupportedAlgorithm)?;
    if blob.wrapping_alg_id != AlgId::RsaKeyx {
        return Err(UnwrapError::UnsupportedAlgorithm);
    }

    let key = private_key
        .to_rsa_private_key()
        .map_err(|_| UnwrapError::DecryptionFailed)?;

    let ciphertext = blob.ciphertext();
    if ciphertext.len() != key.size() {
        tracing::debug!(
            ciphertext_len = ciphertext.len(),
            modulus_len = key.size(),
            "ciphertext does not match modulus"
        );
        return Err(UnwrapError::DecryptionFailed);
    }

    let plaintext = key
        .decrypt(Pkcs1v15Encrypt, &ciphertext)
        .map(Zeroizing::new)
        .map_err(|rsa_error| match rsa_error {
            rsa::Error::Decryption => UnwrapError::PaddingInvalid,
            rsa_error => {
                tracing::debug!(?rsa_error, "RSA decryption failed");
                UnwrapError::DecryptionFailed
            }
        })?;

    if plaintext.len() != algorithm.key_len() {
        return Err(UnwrapError::LengthMismatch {
            expected: algorithm.key_len(),
            actual: plaintext.len(),
        });
    }

    tracing::debug!(?algorithm, "unwrapped session key");
    Ok(SessionKey::new(algorithm, Buffer::from_slice(&plaintext)))
}

/// Encrypts `key_bytes` under `public_key` and packs it as a `SIMPLEBLOB`,
/// the inverse of [`unwrap`].
pub fn wrap<R: CryptoRng + RngCore>(
    algorithm: SessionAlgorithm,
    key_bytes: &[u8],
    public_key: &RsaPublicKeyFields,
    rng: &mut R,
) -> Result<SimpleBlob, WrapError> {
    if key_bytes.len() != algorithm.key_len() {
        return Err(WrapError::LengthMismatch {
            expected: algorithm.key_len(),
            actual: key_bytes.len(),
        });
    }

    let key = public_key
        .to_rsa_public_key()
        .map_err(|_| WrapError::EncryptionFailed)?;
    let mut encrypted = key
        .encrypt(rng, Pkcs1v15Encrypt, key_bytes)
        .map_err(|rsa_error| {
            tracing::debug!(?rsa_error, "RSA encryption failed");
            WrapError::EncryptionFailed
        })?;
    encrypted.reverse();

    Ok(SimpleBlob::new(algorithm.alg_id(), encrypted))
}

/// Wraps an already unwrapped key again, e.g. under a different key-exchange
/// key.
pub fn rewrap<R: CryptoRng + RngCore>(
    session_key: &SessionKey,
    public_key: &RsaPublicKeyFields,
    rng: &mut R,
) -> Result<SimpleBlob, WrapError> {
    wrap(session_key.algorithm(), session_key.key_bytes(), public_key, rng)
}
