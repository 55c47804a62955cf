use crate::error::{GraphError, Result};
use std::fmt;
use std::str::FromStr;

/// Number of bytes in a commit id (160 bits)
pub const ID_BYTES: usize = 20;
/// Number of hex digits in a rendered commit id
pub const ID_HEX_LEN: usize = ID_BYTES * 2;

/// A 160-bit commit hash, stored big-endian so ordering is numeric
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CommitId([u8; ID_BYTES]);

impl CommitId {
    /// Build an id from a small integer (fixtures use sequential ids)
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; ID_BYTES];
        bytes[ID_BYTES - 8..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Parse 1 to 40 hex digits, left-padding shorter input with zeros
    pub fn from_hex(text: &str) -> Result<Self> {
        let invalid = || GraphError::InvalidId {
            text: text.to_string(),
        };
        if text.is_empty() || text.len() > ID_HEX_LEN {
            return Err(invalid());
        }

        let mut bytes = [0u8; ID_BYTES];
        let offset = ID_HEX_LEN - text.len();
        for (i, ch) in text.bytes().enumerate() {
            let nibble = hex_value(ch).ok_or_else(invalid)?;
            let pos = offset + i;
            if pos % 2 == 0 {
                bytes[pos / 2] |= nibble << 4;
            } else {
                bytes[pos / 2] |= nibble;
            }
        }
        Ok(Self(bytes))
    }

    /// The id as a sequence of 40 nibbles, most significant first
    pub fn nibbles(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().flat_map(|byte| [byte >> 4, byte & 0x0f])
    }
}

/// Value of a single hex digit, either case
pub(crate) fn hex_value(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}

impl FromStr for CommitId {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommitId({})", self)
    }
}

impl From<git2::Oid> for CommitId {
    fn from(oid: git2::Oid) -> Self {
        let mut bytes = [0u8; ID_BYTES];
        bytes.copy_from_slice(oid.as_bytes());
        Self(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_length_hex() {
        let text = "356a192b7913b04c54574d18c28d46e6395428ab";
        let id = CommitId::from_hex(text).unwrap();
        assert_eq!(id.to_string(), text);
    }

    #[test]
    fn test_short_hex_is_left_padded() {
        let id = CommitId::from_hex("7").unwrap();
        assert_eq!(id, CommitId::from_u64(7));
        assert_eq!(id.to_string(), format!("{:0>40}", "7"));

        let odd = CommitId::from_hex("abc").unwrap();
        assert_eq!(odd, CommitId::from_u64(0xabc));
    }

    #[test]
    fn test_uppercase_is_accepted() {
        let upper = CommitId::from_hex("1B6453892473A467D07372D45EB05ABC2031647A").unwrap();
        assert_eq!(upper.to_string(), "1b6453892473a467d07372d45eb05abc2031647a");
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(CommitId::from_hex(""), Err(GraphError::InvalidId { .. })));
        assert!(matches!(CommitId::from_hex("xyz"), Err(GraphError::InvalidId { .. })));
        let too_long = "0".repeat(ID_HEX_LEN + 1);
        assert!(CommitId::from_hex(&too_long).is_err());
    }

    #[test]
    fn test_ordering_is_numeric() {
        assert!(CommitId::from_u64(2) < CommitId::from_u64(10));
        assert!(CommitId::from_hex("ff").unwrap() < CommitId::from_hex("100").unwrap());
    }

    #[test]
    fn test_nibbles() {
        let id = CommitId::from_hex("1b6453892473a467d07372d45eb05abc2031647a").unwrap();
        let first: Vec<u8> = id.nibbles().take(4).collect();
        assert_eq!(first, vec![0x1, 0xb, 0x6, 0x4]);
        assert_eq!(id.nibbles().count(), ID_HEX_LEN);
    }

    #[test]
    fn test_from_oid() {
        let oid = git2::Oid::from_str("356a192b7913b04c54574d18c28d46e6395428ab").unwrap();
        assert_eq!(CommitId::from(oid).to_string(), oid.to_string());
    }
}
