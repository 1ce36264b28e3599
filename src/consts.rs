//! Wire constants
//!
//! Every fixed value of the CryptoAPI blob format lives here so that the
//! parsing code never carries a bare literal. Names follow `wincrypt.h`.

/// `bType` of an RSA public key blob.
pub const PUBLICKEYBLOB: u8 = 0x06;
/// `bType` of an RSA private key blob.
pub const PRIVATEKEYBLOB: u8 = 0x07;
/// `bType` of an RSA-wrapped session key blob.
pub const SIMPLEBLOB: u8 = 0x01;
/// `bVersion` of every blob this library understands.
pub const CUR_BLOB_VERSION: u8 = 0x02;

pub const CALG_RSA_SIGN: u32 = 0x0000_2400;
pub const CALG_RSA_KEYX: u32 = 0x0000_A400;
pub const CALG_DES: u32 = 0x0000_6601;
pub const CALG_RC2: u32 = 0x0000_6602;
pub const CALG_3DES: u32 = 0x0000_6603;
pub const CALG_AES_128: u32 = 0x0000_660E;
pub const CALG_AES_192: u32 = 0x0000_660F;
pub const CALG_AES_256: u32 = 0x0000_6610;
pub const CALG_RC4: u32 = 0x0000_6801;

/// Largest RSA modulus the Microsoft enhanced providers accept, in bits.
pub const MAX_BIT_LENGTH: u32 = 16384;

/// `"RSA1"` read as a little-endian `DWORD`.
pub const RSA1_MAGIC: u32 = 0x3141_5352;
/// `"RSA2"` read as a little-endian `DWORD`.
pub const RSA2_MAGIC: u32 = 0x3241_5352;

/// Size of `BLOBHEADER` (`PUBLICKEYSTRUC`).
pub const BLOB_HEADER_LEN: usize = 8;
/// Size of `RSAPUBKEY`: magic, bit length and public exponent.
pub const RSA_PUBKEY_LEN: usize = 12;
/// Offset of the encrypted key data inside a `SIMPLEBLOB`.
pub const SIMPLE_BLOB_PAYLOAD_OFFSET: usize = BLOB_HEADER_LEN + 4;

/// Initialization vector CryptoAPI assigns to every imported AES session key.
/// It is not carried in the blob.
pub const ZERO_IV: [u8; 16] = [0u8; 16];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magics_spell_ascii() {
        assert_eq!(&RSA1_MAGIC.to_le_bytes(), b"RSA1");
        assert_eq!(&RSA2_MAGIC.to_le_bytes(), b"RSA2");
    }

    #[test]
    fn header_tags_match_wire_examples() {
        assert_eq!([PUBLICKEYBLOB, CUR_BLOB_VERSION], [0x06, 0x02]);
        assert_eq!([PRIVATEKEYBLOB, CUR_BLOB_VERSION], [0x07, 0x02]);
        assert_eq!([SIMPLEBLOB, CUR_BLOB_VERSION], [0x01, 0x02]);
        assert_eq!(CALG_RSA_KEYX.to_le_bytes(), [0x00, 0xA4, 0x00, 0x00]);
        assert_eq!(CALG_AES_128.to_le_bytes(), [0x0E, 0x66, 0x00, 0x00]);
    }

    #[cfg(windows)]
    #[test]
    fn agrees_with_wincrypt_h() {
        use winapi::um::wincrypt;

        assert_eq!(PUBLICKEYBLOB as u32, wincrypt::PUBLICKEYBLOB as u32);
        assert_eq!(PRIVATEKEYBLOB as u32, wincrypt::PRIVATEKEYBLOB as u32);
        assert_eq!(SIMPLEBLOB as u32, wincrypt::SIMPLEBLOB as u32);
        assert_eq!(CUR_BLOB_VERSION as u32, wincrypt::CUR_BLOB_VERSION as u32);
        assert_eq!(CALG_RSA_SIGN, wincrypt::CALG_RSA_SIGN as u32);
        assert_eq!(CALG_RSA_KEYX, wincrypt::CALG_RSA_KEYX as u32);
        assert_eq!(CALG_DES, wincrypt::CALG_DES as u32);
        assert_eq!(CALG_RC2, wincrypt::CALG_RC2 as u32);
        assert_eq!(CALG_3DES, wincrypt::CALG_3DES as u32);
        assert_eq!(CALG_AES_128, wincrypt::CALG_AES_128 as u32);
        assert_eq!(CALG_AES_192, wincrypt::CALG_AES_192 as u32);
        assert_eq!(CALG_AES_256, wincrypt::CALG_AES_256 as u32);
        assert_eq!(CALG_RC4, wincrypt::CALG_RC4 as u32);
        assert_eq!(
            BLOB_HEADER_LEN,
            std::mem::size_of::<wincrypt::BLOBHEADER>()
        );
        assert_eq!(RSA_PUBKEY_LEN, std::mem::size_of::<wincrypt::RSAPUBKEY>());
    }
}
