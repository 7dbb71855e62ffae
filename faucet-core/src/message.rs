//! Prefixed claim-message hashing.
//!
//! The canonical claim message is `"<addr>:<destination_id>:<amount>"` with
//! the amount in its natural decimal form. Its digest is the Bitcoin-style
//! signed-message construction: CompactSize-prefixed magic and message,
//! double-SHA256.

use thiserror::Error;

use crate::hash::sha256d;

/// Magic prefix of signed claim messages.
pub const SIGNED_MESSAGE_MAGIC: &str = "Alpha Signed Message:\n";

/// Message hashing failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    #[error("message too large for compact-size encoding")]
    Oversize,
}

/// Build the canonical claim message.
pub fn claim_message(addr: &str, destination_id: &str, amount: u64) -> String {
    format!("{addr}:{destination_id}:{amount}")
}

/// Append a Bitcoin CompactSize varint. Values above u32::MAX are rejected.
fn write_compact_size(out: &mut Vec<u8>, n: u64) -> Result<(), MessageError> {
    if n < 0xFD {
        out.push(n as u8);
    } else if n <= 0xFFFF {
        out.push(0xFD);
        out.extend_from_slice(&(n as u16).to_le_bytes());
    } else if n <= 0xFFFF_FFFF {
        out.push(0xFE);
        out.extend_from_slice(&(n as u32).to_le_bytes());
    } else {
        return Err(MessageError::Oversize);
    }
    Ok(())
}

/// Hash an arbitrary message with the signed-message construction:
/// `SHA256d(varint(|magic|) ‖ magic ‖ varint(|message|) ‖ message)`.
pub fn signed_message_hash(message: &[u8]) -> Result<[u8; 32], MessageError> {
    let magic = SIGNED_MESSAGE_MAGIC.as_bytes();
    let mut buf = Vec::with_capacity(2 + magic.len() + 9 + message.len());
    write_compact_size(&mut buf, magic.len() as u64)?;
    buf.extend_from_slice(magic);
    write_compact_size(&mut buf, message.len() as u64)?;
    buf.extend_from_slice(message);
    Ok(sha256d(&buf))
}

/// Digest of the canonical claim message for `(addr, destination_id, amount)`.
pub fn claim_digest(
    addr: &str,
    destination_id: &str,
    amount: u64,
) -> Result<[u8; 32], MessageError> {
    signed_message_hash(claim_message(addr, destination_id, amount).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_layout() {
        assert_eq!(
            claim_message("alpha1abc", "0xDEAD", 150_000_000),
            "alpha1abc:0xDEAD:150000000"
        );
    }

    #[test]
    fn compact_size_encodings() {
        let mut buf = Vec::new();
        write_compact_size(&mut buf, 0xFC).unwrap();
        assert_eq!(buf, vec![0xFC]);

        buf.clear();
        write_compact_size(&mut buf, 0xFD).unwrap();
        assert_eq!(buf, vec![0xFD, 0xFD, 0x00]);

        buf.clear();
        write_compact_size(&mut buf, 0x1_0000).unwrap();
        assert_eq!(buf, vec![0xFE, 0x00, 0x00, 0x01, 0x00]);

        buf.clear();
        assert_eq!(
            write_compact_size(&mut buf, u64::from(u32::MAX) + 1),
            Err(MessageError::Oversize)
        );
    }

    #[test]
    fn digest_is_deterministic() {
        let a = claim_digest("alpha1abc", "0xDEAD", 42).unwrap();
        let b = claim_digest("alpha1abc", "0xDEAD", 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn digest_differs_for_any_field_change() {
        let base = claim_digest("alpha1abc", "0xDEAD", 42).unwrap();
        assert_ne!(base, claim_digest("alpha1abd", "0xDEAD", 42).unwrap());
        assert_ne!(base, claim_digest("alpha1abc", "0xDEAE", 42).unwrap());
        assert_ne!(base, claim_digest("alpha1abc", "0xDEAD", 43).unwrap());
    }

    #[test]
    fn digest_is_double_sha256_of_prefixed_encoding() {
        let message = b"alpha1abc:0xDEAD:42";
        let magic = SIGNED_MESSAGE_MAGIC.as_bytes();
        let mut expected = Vec::new();
        expected.push(magic.len() as u8);
        expected.extend_from_slice(magic);
        expected.push(message.len() as u8);
        expected.extend_from_slice(message);
        assert_eq!(
            signed_message_hash(message).unwrap(),
            crate::hash::sha256d(&expected)
        );
    }
}
