//! Digest helpers shared by the address codec and the message hasher.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Single SHA256.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let digest = Sha256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Double SHA256 as used by Bitcoin-style signed messages.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    out
}

/// HASH160: RIPEMD160(SHA256(data)), the witness program of a P2WPKH key.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let sha = sha256(data);
    let digest = Ripemd160::digest(sha);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest);
    out
}
