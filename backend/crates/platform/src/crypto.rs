//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use hmac::digest::generic_array::GenericArray;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use rand::{RngCore, rngs::OsRng};
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// SHA-256 block size; HMAC zero-pads shorter keys to this length
const HMAC_BLOCK_LEN: usize = 64;

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Generate a fixed-size secret key, zeroized when dropped
pub fn random_key<const N: usize>() -> Zeroizing<[u8; N]> {
    let mut key = Zeroizing::new([0u8; N]);
    OsRng.fill_bytes(key.as_mut());
    key
}

/// Encode bytes as URL-safe base64 without padding (cookie-safe)
pub fn to_base64_url(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode URL-safe base64 without padding
pub fn from_base64_url(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::URL_SAFE_NO_PAD.decode(s)
}

/// Encode bytes as standard base64
pub fn to_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Decode standard base64
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

fn keyed_hmac<const N: usize>(key: &[u8; N]) -> HmacSha256 {
    const { assert!(N <= HMAC_BLOCK_LEN) };
    let mut block = Zeroizing::new([0u8; HMAC_BLOCK_LEN]);
    block[..N].copy_from_slice(key);
    <HmacSha256 as KeyInit>::new(GenericArray::from_slice(block.as_slice()))
}

/// Compute HMAC-SHA256 over the concatenation of `parts`
pub fn hmac_sha256<const N: usize>(key: &[u8; N], parts: &[&[u8]]) -> [u8; 32] {
    let mut mac = keyed_hmac(key);
    for part in parts {
        mac.update(part);
    }
    mac.finalize().into_bytes().into()
}

/// Verify an HMAC-SHA256 tag in constant time
pub fn verify_hmac_sha256<const N: usize>(key: &[u8; N], parts: &[&[u8]], tag: &[u8]) -> bool {
    let mut mac = keyed_hmac(key);
    for part in parts {
        mac.update(part);
    }
    mac.verify_slice(tag).is_ok()
}

/// Constant-time comparison to prevent timing attacks
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
