//! Recoverable-signature verification for claims.
//!
//! A claim signature is 65 bytes hex-encoded: a one-byte recovery tag `v`
//! followed by `r` and `s`. The tag admits only compressed keys (`31..=34`
//! standard, `39..=42` segwit-flavored); `s` must be low-S per BIP-62. The
//! signer's public key is recovered from the claim digest, the address is
//! rederived from it, and the result must match the claimed address.

use std::sync::OnceLock;

use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{All, Message, Secp256k1, SecretKey};

use crate::address;
use crate::error::ClaimError;
use crate::message::claim_digest;

/// secp256k1 group order, big-endian.
const CURVE_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36,
    0x41, 0x41,
];

/// Half the group order, big-endian. Low-S requires `s <= n/2`.
const CURVE_ORDER_HALF: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B,
    0x20, 0xA0,
];

/// Successful verification output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaim {
    pub recovered_pubkey_hex: String,
    pub derived_address: String,
}

fn secp() -> &'static Secp256k1<All> {
    static CTX: OnceLock<Secp256k1<All>> = OnceLock::new();
    CTX.get_or_init(Secp256k1::new)
}

fn scalar_in_range(bytes: &[u8]) -> bool {
    bytes.iter().any(|b| *b != 0) && bytes < &CURVE_ORDER[..]
}

/// Parse a 65-byte recoverable signature from hex with an optional `0x`
/// prefix, mapping the recovery tag and enforcing scalar ranges and low-S.
fn parse_signature(sig_hex: &str) -> Result<RecoverableSignature, ClaimError> {
    let stripped = sig_hex
        .strip_prefix("0x")
        .or_else(|| sig_hex.strip_prefix("0X"))
        .unwrap_or(sig_hex);

    if stripped.len() != 130 {
        return Err(ClaimError::BadSignature(format!(
            "signature must be 130 hex characters, got {}",
            stripped.len()
        )));
    }
    let bytes = hex::decode(stripped)
        .map_err(|_| ClaimError::BadSignature("signature is not valid hex".to_string()))?;

    let v = bytes[0];
    let recovery_index = match v {
        27..=30 => {
            return Err(ClaimError::BadSignature(
                "uncompressed keys are not supported".to_string(),
            ))
        }
        31..=34 => v - 31,
        39..=42 => v - 39,
        _ => {
            return Err(ClaimError::BadSignature(format!(
                "invalid recovery tag {v}"
            )))
        }
    };

    let r = &bytes[1..33];
    let s = &bytes[33..65];
    if !scalar_in_range(r) {
        return Err(ClaimError::BadSignature("r is out of range".to_string()));
    }
    if !scalar_in_range(s) {
        return Err(ClaimError::BadSignature("s is out of range".to_string()));
    }
    if s > &CURVE_ORDER_HALF[..] {
        return Err(ClaimError::BadSignature(
            "non-canonical signature: s is not low-S".to_string(),
        ));
    }

    let recovery_id = RecoveryId::from_i32(i32::from(recovery_index))
        .map_err(|_| ClaimError::BadSignature(format!("invalid recovery tag {v}")))?;
    RecoverableSignature::from_compact(&bytes[1..65], recovery_id)
        .map_err(|e| ClaimError::BadSignature(e.to_string()))
}

/// Verify a claim signature against the claimed address.
///
/// Recovers the public key from the claim digest, rederives the address, and
/// requires case-insensitive equality with `addr`. A standard ECDSA verify of
/// the recovered key runs as defense-in-depth.
pub fn verify_claim(
    hrp: &str,
    addr: &str,
    destination_id: &str,
    amount: u64,
    sig_hex: &str,
) -> Result<VerifiedClaim, ClaimError> {
    let signature = parse_signature(sig_hex)?;

    let digest = claim_digest(addr, destination_id, amount)
        .map_err(|e| ClaimError::Internal(e.to_string()))?;
    let message = Message::from_digest_slice(&digest)
        .map_err(|e| ClaimError::Internal(e.to_string()))?;

    let pubkey = secp()
        .recover_ecdsa(&message, &signature)
        .map_err(|_| ClaimError::BadSignature("public key recovery failed".to_string()))?;
    let compressed = pubkey.serialize();

    let derived_address = address::from_pubkey(hrp, &compressed)
        .map_err(|e| ClaimError::Internal(e.to_string()))?;
    if !derived_address.eq_ignore_ascii_case(addr) {
        return Err(ClaimError::AddressMismatch {
            derived: derived_address,
            claimed: addr.to_lowercase(),
        });
    }

    secp()
        .verify_ecdsa(&message, &signature.to_standard(), &pubkey)
        .map_err(|_| ClaimError::MathCheckFailed)?;

    Ok(VerifiedClaim {
        recovered_pubkey_hex: hex::encode(compressed),
        derived_address,
    })
}

/// Deterministic signer used for fixtures and tests.
///
/// Produces a canonical low-S signature over the claim digest and emits the
/// compressed-key recovery tag `v = 31 + k`.
pub fn sign_claim(
    secret: &SecretKey,
    addr: &str,
    destination_id: &str,
    amount: u64,
) -> Result<String, ClaimError> {
    let digest = claim_digest(addr, destination_id, amount)
        .map_err(|e| ClaimError::Internal(e.to_string()))?;
    let message = Message::from_digest_slice(&digest)
        .map_err(|e| ClaimError::Internal(e.to_string()))?;

    let signature = secp().sign_ecdsa_recoverable(&message, secret);
    let (recovery_id, compact) = signature.serialize_compact();

    let mut out = [0u8; 65];
    out[0] = 31 + recovery_id.to_i32() as u8;
    out[1..].copy_from_slice(&compact);
    Ok(hex::encode(out))
}
