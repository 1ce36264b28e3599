//! Symmetric encryption with an unwrapped session key
//!
//! CryptoAPI uses every imported AES session key in CBC chaining mode, with
//! an all-zero initialization vector and PKCS #7 (PKCS #5) padding. Data
//! produced by such a key only decrypts under exactly the same convention.
//!
//! Requires the `block-cipher` feature.
//!
//! ```
//! use wincrypt_blob::rsa_blob::RsaPrivateKeyFields;
//! use wincrypt_blob::session::{unwrap, wrap, SessionAlgorithm};
//!
//! const DATA: &[u8] = b"This is a test.";
//!
//! # let key = rsa::RsaPrivateKey::new(&mut rand::thread_rng(), 1024).unwrap();
//! let private = RsaPrivateKeyFields::from_rsa_private_key(&key).unwrap();
//! let public = private.to_public();
//! let mut rng = rand::thread_rng();
//! let blob = wrap(SessionAlgorithm::Aes256, &[7u8; 32], &public, &mut rng).unwrap();
//! let session = unwrap(&blob, &private).unwrap();
//!
//! let ciphertext = session.encrypt_cbc(DATA).unwrap();
//! assert_eq!(ciphertext.len(), 16);
//! assert_eq!(session.decrypt_cbc(&ciphertext).unwrap(), DATA);
//! ```

use crate::error::CipherError;
use crate::session::{SessionAlgorithm, SessionKey};
use cipher::block_padding::Pkcs7;
use cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

macro_rules! cbc_encrypt {
    ($aes: ty, $key: expr, $iv: expr, $data: expr) => {
        cbc::Encryptor::<$aes>::new_from_slices($key, $iv)
            .map(|enc| enc.encrypt_padded_vec_mut::<Pkcs7>($data))
            .map_err(|_| CipherError::InvalidLength)
    };
}

macro_rules! cbc_decrypt {
    ($aes: ty, $key: expr, $iv: expr, $data: expr) => {
        cbc::Decryptor::<$aes>::new_from_slices($key, $iv)
            .map_err(|_| CipherError::InvalidLength)?
            .decrypt_padded_vec_mut::<Pkcs7>($data)
            .map_err(|_| CipherError::PaddingInvalid)
    };
}

impl SessionKey {
    /// Encrypts `data` the way CryptoAPI's `CryptEncrypt` does for this key:
    /// AES-CBC, zero IV, PKCS #7 padding (a full block is added when `data`
    /// is already block-aligned).
    pub fn encrypt_cbc(&self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        let (key, iv) = (self.key_bytes(), &self.initialization_vector()[..]);
        match self.algorithm() {
            SessionAlgorithm::Aes128 => cbc_encrypt!(aes::Aes128, key, iv, data),
            SessionAlgorithm::Aes192 => cbc_encrypt!(aes::Aes192, key, iv, data),
            SessionAlgorithm::Aes256 => cbc_encrypt!(aes::Aes256, key, iv, data),
        }
    }

    /// Inverse of [`SessionKey::encrypt_cbc`].
    pub fn decrypt_cbc(&self, data: &[u8]) -> Result<Vec<u8>, CipherError> {
        let (key, iv) = (self.key_bytes(), &self.initialization_vector()[..]);
        match self.algorithm() {
            SessionAlgorithm::Aes128 => cbc_decrypt!(aes::Aes128, key, iv, data),
            SessionAlgorithm::Aes192 => cbc_decrypt!(aes::Aes192, key, iv, data),
            SessionAlgorithm::Aes256 => cbc_decrypt!(aes::Aes256, key, iv, data),
        }
    }
}
