//! SHA-256 hashing helpers shared by request signing and url signing.
//!
//! # Usage
//!
//! ```ignore
//! use crate::utils::hash;
//!
//! let digest = hash::sha256_hex(b"payload");      // -> "239f59ed..."
//! let mac = hash::hmac_sha256_hex(b"key", b"msg"); // -> hex string
//! ```

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Lowercase hex SHA-256 of `data`.
#[inline]
pub fn sha256_hex<T: AsRef<[u8]> + ?Sized>(data: &T) -> String {
    hex::encode(Sha256::digest(data.as_ref()))
}

/// Raw HMAC-SHA256 of `data` under `key`.
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

/// Lowercase hex HMAC-SHA256 of `data` under `key`.
#[inline]
pub fn hmac_sha256_hex(key: &[u8], data: &[u8]) -> String {
    hex::encode(hmac_sha256(key, data))
}
