//! PNR encryption for the partner status API.
//!
//! The partner expects the PNR as base64 AES-128-CBC ciphertext with PKCS#7
//! padding, using a fixed key and IV. The key is part of the partner's public
//! contract and protects nothing; it must not be reused for anything else.

use aes::Aes128;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use thiserror::Error;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;

const PARTNER_KEY: [u8; 16] = *b"8080808080808080";
const PARTNER_IV: [u8; 16] = *b"8080808080808080";

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("ciphertext has invalid padding")]
    Padding,

    #[error("plaintext is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encrypts `pnr` for the partner API. Deterministic: the same input always
/// produces the same ciphertext.
pub fn encrypt(pnr: &str) -> String {
    let ciphertext = Aes128CbcEnc::new(&PARTNER_KEY.into(), &PARTNER_IV.into())
        .encrypt_padded_vec_mut::<Pkcs7>(pnr.as_bytes());

    BASE64.encode(ciphertext)
}

/// Inverse of [`encrypt`].
pub fn decrypt(encoded: &str) -> Result<String, CryptoError> {
    let ciphertext = BASE64.decode(encoded)?;
    let plaintext = Aes128CbcDec::new(&PARTNER_KEY.into(), &PARTNER_IV.into())
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| CryptoError::Padding)?;

    Ok(String::from_utf8(plaintext)?)
}
