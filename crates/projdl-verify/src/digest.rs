use std::fmt;
use std::str::FromStr;

use crate::VerifyError;

/// A SHA-256 digest parsed from (or rendered as) 64 hex characters.
///
/// Parsing is case-insensitive; rendering is always lowercase.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Digest([u8; 32]);

impl Sha256Digest {
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        <[u8; 32]>::try_from(bytes).ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; 32] { &self.0 }

    pub fn to_hex(&self) -> String { hex::encode(self.0) }
}

impl FromStr for Sha256Digest {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() != 64 {
            return Err(VerifyError::MalformedDigest(s.to_string()));
        }
        let mut out = [0u8; 32];
        hex::decode_to_slice(trimmed, &mut out)
            .map_err(|_| VerifyError::MalformedDigest(s.to_string()))?;
        Ok(Self(out))
    }
}

impl fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.to_hex()) }
}

impl fmt::Debug for Sha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256Digest({})", self.to_hex())
    }
}
