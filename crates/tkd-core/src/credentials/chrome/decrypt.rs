//! Chrome cookie value decryption (os_crypt v10/v11, AES-128-CBC).

use aes::Aes128;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
use sha2::Digest;

type Aes128CbcDec = cbc::Decryptor<Aes128>;

const SALT: &[u8] = b"saltysalt";
const IV: [u8; 16] = [b' '; 16];
pub(crate) const KEY_LEN: usize = 16;

/// Meta version from which plaintexts carry a SHA-256(host_key) prefix.
const HOST_DIGEST_MIN_VERSION: i64 = 24;
const HOST_DIGEST_LEN: usize = 32;

/// PBKDF2-HMAC-SHA1 key derivation used by Chrome's os_crypt.
pub(crate) fn derive_key(password: &str, iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<sha1::Sha1>(password.as_bytes(), SALT, iterations, &mut key);
    key
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum DecryptError {
    #[error("bad key/iv length")]
    KeyIv,
    #[error("bad padding (wrong key?)")]
    Padding,
}

/// Decrypts one `encrypted_value` blob.
///
/// Blobs without a `v10`/`v11` prefix are returned as-is (older unencrypted rows).
pub(crate) fn decrypt_value(
    encrypted: &[u8],
    key: &[u8; KEY_LEN],
    db_version: i64,
    host_key: &str,
) -> Result<String, DecryptError> {
    if encrypted.is_empty() {
        return Ok(String::new());
    }
    let ciphertext = match encrypted.get(..3) {
        Some(b"v10") | Some(b"v11") => &encrypted[3..],
        _ => return Ok(String::from_utf8_lossy(encrypted).into_owned()),
    };

    let cipher = Aes128CbcDec::new_from_slices(key, &IV).map_err(|_| DecryptError::KeyIv)?;
    let mut buf = ciphertext.to_vec();
    let plain = cipher
        .decrypt_padded_mut::<Pkcs7>(&mut buf)
        .map_err(|_| DecryptError::Padding)?;

    let value = if db_version >= HOST_DIGEST_MIN_VERSION && plain.len() >= HOST_DIGEST_LEN {
        let digest = sha2::Sha256::digest(host_key.as_bytes());
        if plain[..HOST_DIGEST_LEN] != digest[..] {
            tracing::debug!(host_key, "cookie digest prefix does not match host; stripping anyway");
        }
        &plain[HOST_DIGEST_LEN..]
    } else {
        plain
    };
    Ok(String::from_utf8_lossy(value).into_owned())
}
