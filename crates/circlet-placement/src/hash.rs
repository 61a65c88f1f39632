//! Hash functions mapping keys onto ring slots.

use std::fmt;

use circlet_types::Slot;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use sha2::Digest;

use crate::error::PlacementError;

/// Largest exponent accepted by [`parse_modulus`] in `2^N` form.
const MAX_MODULUS_BITS: u32 = 4096;

/// Deterministic map from an arbitrary byte key to a slot in `[0, M)`.
///
/// Implementations must be pure: no random seed and no process-local
/// state, so the same key lands on the same slot across restarts.
pub trait HashFunction: Send + Sync + fmt::Debug {
    /// Compute the slot for `key`.
    fn slot(&self, key: &[u8]) -> Slot;

    /// The ring size `M`.
    fn modulus(&self) -> &BigUint;
}

/// The digest used by [`DigestHasher`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256.
    #[default]
    Sha256,
    /// BLAKE3 with the default 256-bit output.
    Blake3,
}

impl HashAlgorithm {
    fn digest(self, key: &[u8]) -> [u8; 32] {
        match self {
            Self::Sha256 => {
                let mut out = [0u8; 32];
                out.copy_from_slice(&sha2::Sha256::digest(key));
                out
            }
            Self::Blake3 => blake3::hash(key).into(),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha256 => f.write_str("sha256"),
            Self::Blake3 => f.write_str("blake3"),
        }
    }
}

/// Cryptographic-digest hash function.
///
/// The 256-bit digest is read as a big-endian unsigned integer and reduced
/// modulo `M` without any narrowing.
#[derive(Debug, Clone)]
pub struct DigestHasher {
    algorithm: HashAlgorithm,
    modulus: BigUint,
}

impl DigestHasher {
    /// Create a hasher with an explicit ring size. `modulus` must be positive.
    pub fn new(algorithm: HashAlgorithm, modulus: BigUint) -> Result<Self, PlacementError> {
        if modulus == BigUint::ZERO {
            return Err(PlacementError::InvalidConfig(
                "ring modulus must be a positive integer".to_string(),
            ));
        }
        Ok(Self { algorithm, modulus })
    }

    /// Create a hasher whose ring covers the full 256-bit digest range.
    pub fn full_range(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            modulus: BigUint::from(1u8) << 256u32,
        }
    }

    /// The digest this hasher uses.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}

impl HashFunction for DigestHasher {
    fn slot(&self, key: &[u8]) -> Slot {
        let digest = self.algorithm.digest(key);
        Slot::from(BigUint::from_bytes_be(&digest) % &self.modulus)
    }

    fn modulus(&self) -> &BigUint {
        &self.modulus
    }
}

/// Parse a ring size from configuration.
///
/// Accepts a decimal integer (`"1000"`) or a power of two (`"2^256"`).
pub fn parse_modulus(s: &str) -> Result<BigUint, PlacementError> {
    let s = s.trim();
    let modulus = if let Some(exp) = s.strip_prefix("2^") {
        let exp: u32 = exp
            .trim()
            .parse()
            .map_err(|_| PlacementError::InvalidConfig(format!("bad exponent in modulus {s:?}")))?;
        if exp > MAX_MODULUS_BITS {
            return Err(PlacementError::InvalidConfig(format!(
                "modulus 2^{exp} exceeds 2^{MAX_MODULUS_BITS}"
            )));
        }
        BigUint::from(1u8) << exp
    } else {
        s.parse::<BigUint>()
            .map_err(|_| PlacementError::InvalidConfig(format!("bad modulus {s:?}")))?
    };

    if modulus == BigUint::ZERO {
        return Err(PlacementError::InvalidConfig(
            "ring modulus must be a positive integer".to_string(),
        ));
    }
    Ok(modulus)
}
