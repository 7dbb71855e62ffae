//! Bech32 P2WPKH address codec for the source chain.
//!
//! Addresses are bech32 (not bech32m), witness version 0, with a 20-byte
//! witness program and a configurable human-readable prefix. The canonical
//! form is lowercase; mixed-case input is accepted whenever its lowercased
//! form is valid.

use bech32::segwit::{self, VERSION_0};
use bech32::Hrp;
use thiserror::Error;

use crate::hash::hash160;

/// Default human-readable prefix of L1 addresses.
pub const DEFAULT_HRP: &str = "alpha";

/// Minimum length of an encoded address.
const MIN_ADDRESS_LEN: usize = 14;
/// Maximum length of an encoded address.
const MAX_ADDRESS_LEN: usize = 74;

/// The bech32 data alphabet.
const CHARSET: &str = "qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Address codec failures. All operations signal one of these reasons.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("address must start with {0}1")]
    WrongPrefix(String),

    #[error("address length {0} is out of range")]
    BadLength(usize),

    #[error("address contains invalid character {0:?}")]
    BadCharacter(char),

    #[error("bech32 decode failed: {0}")]
    Bech32(String),

    #[error("wrong address prefix {actual}, expected {expected}")]
    WrongHrp { expected: String, actual: String },

    #[error("unsupported witness version {0}")]
    BadWitnessVersion(u8),

    #[error("witness program must be 20 bytes, got {0}")]
    BadProgramLength(usize),

    #[error("public key must be 33 compressed bytes, got {0}")]
    BadPubkeyLength(usize),
}

/// Decoded form of a valid address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAddress {
    pub witness_version: u8,
    pub pubkey_hash: [u8; 20],
}

/// Validate an address and return its canonical (lowercase) form.
pub fn validate(hrp: &str, addr: &str) -> Result<String, AddressError> {
    let normalized = addr.to_lowercase();
    decode(hrp, &normalized)?;
    Ok(normalized)
}

/// Decode an address into its witness version and 20-byte pubkey hash.
pub fn decode(hrp: &str, addr: &str) -> Result<DecodedAddress, AddressError> {
    let lower = addr.to_lowercase();
    let prefix = format!("{hrp}1");

    if !lower.starts_with(&prefix) {
        return Err(AddressError::WrongPrefix(hrp.to_string()));
    }
    if lower.len() < MIN_ADDRESS_LEN || lower.len() > MAX_ADDRESS_LEN {
        return Err(AddressError::BadLength(lower.len()));
    }
    if let Some(bad) = lower[prefix.len()..].chars().find(|c| !CHARSET.contains(*c)) {
        return Err(AddressError::BadCharacter(bad));
    }

    let (decoded_hrp, version, program) =
        segwit::decode(&lower).map_err(|e| AddressError::Bech32(e.to_string()))?;
    if decoded_hrp.to_string() != hrp {
        return Err(AddressError::WrongHrp {
            expected: hrp.to_string(),
            actual: decoded_hrp.to_string(),
        });
    }
    if version != VERSION_0 {
        return Err(AddressError::BadWitnessVersion(version.to_u8()));
    }
    if program.len() != 20 {
        return Err(AddressError::BadProgramLength(program.len()));
    }

    let mut pubkey_hash = [0u8; 20];
    pubkey_hash.copy_from_slice(&program);
    Ok(DecodedAddress {
        witness_version: 0,
        pubkey_hash,
    })
}

/// Encode a 20-byte pubkey hash as a witness-version-0 address.
pub fn encode(hrp: &str, pubkey_hash: &[u8; 20]) -> Result<String, AddressError> {
    let hrp = Hrp::parse(hrp).map_err(|e| AddressError::Bech32(e.to_string()))?;
    segwit::encode(hrp, VERSION_0, pubkey_hash).map_err(|e| AddressError::Bech32(e.to_string()))
}

/// Derive the address of a compressed secp256k1 public key.
pub fn from_pubkey(hrp: &str, pubkey: &[u8]) -> Result<String, AddressError> {
    if pubkey.len() != 33 {
        return Err(AddressError::BadPubkeyLength(pubkey.len()));
    }
    encode(hrp, &hash160(pubkey))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(hash: [u8; 20]) -> [u8; 20] {
        let addr = encode(DEFAULT_HRP, &hash).expect("encode");
        decode(DEFAULT_HRP, &addr).expect("decode").pubkey_hash
    }

    #[test]
    fn encode_decode_roundtrip() {
        assert_eq!(roundtrip([0u8; 20]), [0u8; 20]);
        assert_eq!(roundtrip([0xFF; 20]), [0xFF; 20]);
        let mut mixed = [0u8; 20];
        for (i, byte) in mixed.iter_mut().enumerate() {
            *byte = i as u8 * 13;
        }
        assert_eq!(roundtrip(mixed), mixed);
    }

    #[test]
    fn uppercase_input_normalizes_to_lowercase() {
        let addr = encode(DEFAULT_HRP, &[7u8; 20]).unwrap();
        let upper = addr.to_uppercase();
        assert_eq!(validate(DEFAULT_HRP, &upper).unwrap(), addr);
    }

    #[test]
    fn rejects_wrong_prefix() {
        let err = validate(DEFAULT_HRP, "beta1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqq").unwrap_err();
        assert_eq!(err, AddressError::WrongPrefix(DEFAULT_HRP.to_string()));
    }

    #[test]
    fn rejects_bad_length() {
        let err = validate(DEFAULT_HRP, "alpha1qqq").unwrap_err();
        assert!(matches!(err, AddressError::BadLength(_)));
    }

    #[test]
    fn rejects_invalid_charset() {
        // 'b' is not in the bech32 alphabet.
        let err = validate(DEFAULT_HRP, "alpha1bqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqq").unwrap_err();
        assert_eq!(err, AddressError::BadCharacter('b'));
    }

    #[test]
    fn rejects_corrupted_checksum() {
        let addr = encode(DEFAULT_HRP, &[7u8; 20]).unwrap();
        let mut chars: Vec<char> = addr.chars().collect();
        let last = *chars.last().unwrap();
        let replacement = if last == 'q' { 'p' } else { 'q' };
        *chars.last_mut().unwrap() = replacement;
        let corrupted: String = chars.into_iter().collect();
        assert!(matches!(
            validate(DEFAULT_HRP, &corrupted).unwrap_err(),
            AddressError::Bech32(_)
        ));
    }

    #[test]
    fn rejects_wrong_program_length() {
        // A 32-byte program (P2WSH shape) is not a P2WPKH address.
        let hrp = Hrp::parse(DEFAULT_HRP).unwrap();
        let addr = segwit::encode(hrp, VERSION_0, &[1u8; 32]).unwrap();
        assert_eq!(
            validate(DEFAULT_HRP, &addr).unwrap_err(),
            AddressError::BadProgramLength(32)
        );
    }

    #[test]
    fn from_pubkey_requires_compressed_key() {
        assert_eq!(
            from_pubkey(DEFAULT_HRP, &[0u8; 65]).unwrap_err(),
            AddressError::BadPubkeyLength(65)
        );
    }

    #[test]
    fn from_pubkey_is_hash160_of_key() {
        let pubkey = [2u8; 33];
        let addr = from_pubkey(DEFAULT_HRP, &pubkey).unwrap();
        let decoded = decode(DEFAULT_HRP, &addr).unwrap();
        assert_eq!(decoded.pubkey_hash, hash160(&pubkey));
        assert_eq!(decoded.witness_version, 0);
    }
}
