//! # Core Entities
//!
//! Fixed-width byte values exchanged between service nodes.
//!
//! ## Widths
//!
//! | Type | Bytes | Contents |
//! |------|-------|----------|
//! | [`Address`] | 20 | Ethereum-style recipient address |
//! | [`BlsPublicKey`] | 96 | BLS12-381 G2 point, compressed |
//! | [`BlsSignature`] | 48 | BLS12-381 G1 point, compressed |
//! | [`NodePubkey`] | 32 | Non-BLS node identity key |

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha3::{Digest, Keccak256};
use std::fmt;

use crate::errors::ParseError;

pub use primitive_types::U256;

/// A 32-byte Keccak-256 digest.
pub type Hash = [u8; 32];

/// A value with a fixed byte width.
///
/// Implemented by every primitive in this module so request decoding can be
/// written once for all of them.
pub trait FixedBytes: Sized {
    /// Exact width in bytes.
    const LEN: usize;

    /// Raw bytes of the value.
    fn as_bytes(&self) -> &[u8];

    /// Build from a slice of exactly [`Self::LEN`] bytes.
    fn from_slice(bytes: &[u8]) -> Result<Self, ParseError>;

    /// Build from hex, with or without a `0x`/`0X` prefix.
    fn from_hex(s: &str) -> Result<Self, ParseError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != 2 * Self::LEN {
            return Err(ParseError::InvalidLength {
                expected: Self::LEN,
                actual: digits.len() / 2,
            });
        }
        let bytes = hex::decode(digits).map_err(|e| ParseError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Lowercase `0x`-prefixed hex.
    fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.as_bytes()))
    }

    /// Returns true if every byte is zero.
    fn is_null(&self) -> bool {
        self.as_bytes().iter().all(|&b| b == 0)
    }
}

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[serde_as]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name {
            #[serde_as(as = "Bytes")]
            pub bytes: [u8; $len],
        }

        impl $name {
            /// Wrap an exact-width array.
            pub const fn new(bytes: [u8; $len]) -> Self {
                Self { bytes }
            }

            /// The all-zero value.
            pub const fn null() -> Self {
                Self { bytes: [0u8; $len] }
            }
        }

        impl FixedBytes for $name {
            const LEN: usize = $len;

            fn as_bytes(&self) -> &[u8] {
                &self.bytes
            }

            fn from_slice(bytes: &[u8]) -> Result<Self, ParseError> {
                let bytes: [u8; $len] =
                    bytes.try_into().map_err(|_| ParseError::InvalidLength {
                        expected: $len,
                        actual: bytes.len(),
                    })?;
                Ok(Self { bytes })
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::null()
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.bytes
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self { bytes }
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }
    };
}

fixed_bytes!(
    /// Ethereum-style 20-byte address.
    Address,
    20
);

fixed_bytes!(
    /// BLS12-381 public key (G2 point, 96 bytes compressed).
    BlsPublicKey,
    96
);

fixed_bytes!(
    /// BLS12-381 signature (G1 point, 48 bytes compressed).
    BlsSignature,
    48
);

fixed_bytes!(
    /// Non-BLS identity key of a service node (32 bytes).
    NodePubkey,
    32
);

impl BlsSignature {
    /// Compressed encoding of the G1 point at infinity.
    ///
    /// This is the aggregate of zero signatures.
    pub const IDENTITY: Self = {
        let mut bytes = [0u8; 48];
        bytes[0] = 0xc0;
        Self { bytes }
    };

    /// Returns true if this is the point at infinity.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Addresses display with the EIP-55 mixed-case checksum.
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lower = hex::encode(self.bytes);
        let checksum = Keccak256::digest(lower.as_bytes());

        f.write_str("0x")?;
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                checksum[i / 2] >> 4
            } else {
                checksum[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                write!(f, "{}", c.to_ascii_uppercase())?;
            } else {
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for BlsPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Display for BlsSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Display for NodePubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Node identities are conventionally shown without a prefix.
        f.write_str(&hex::encode(self.bytes))
    }
}
