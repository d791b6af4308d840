//! Digest functions the generator hashes accepted tokens with
//!
//! The generator never hashes on its own; it is handed a [`Hasher`]. Two
//! 256-bit digests are provided (SHA-256 and BLAKE3), both returned as
//! lowercase hex, plus an identity hasher that exposes the raw token.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Turns a payload into a hex digest string
pub trait Hasher: Send + Sync {
    fn hash(&self, input: &[u8]) -> Result<String>;
}

/// Hex-encoded SHA-256 of `data`.
///
/// Text is hashed as its UTF-8 bytes.
pub fn sha256_hex(data: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(data.as_ref()))
}

/// Hex-encoded BLAKE3-256 of `data`
pub fn blake3_hex(data: impl AsRef<[u8]>) -> String {
    blake3::hash(data.as_ref()).to_hex().to_string()
}

/// SHA-256, 64 hex characters
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Hasher for Sha256Hasher {
    fn hash(&self, input: &[u8]) -> Result<String> {
        Ok(sha256_hex(input))
    }
}

/// BLAKE3, 64 hex characters
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

impl Hasher for Blake3Hasher {
    fn hash(&self, input: &[u8]) -> Result<String> {
        Ok(blake3_hex(input))
    }
}

/// Returns the payload itself as text. Lets tests see the token that would
/// otherwise be hashed.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityHasher;

impl Hasher for IdentityHasher {
    fn hash(&self, input: &[u8]) -> Result<String> {
        Ok(String::from_utf8_lossy(input).into_owned())
    }
}

impl<F> Hasher for F
where
    F: Fn(&[u8]) -> Result<String> + Send + Sync,
{
    fn hash(&self, input: &[u8]) -> Result<String> {
        self(input)
    }
}

/// Digest algorithm selectable at runtime (config file, CLI flag)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestAlgorithm {
    #[default]
    Sha256,
    Blake3,
}

impl DigestAlgorithm {
    /// Digest size in bytes
    pub fn output_size(&self) -> usize {
        match self {
            DigestAlgorithm::Sha256 => crate::params::SHA256_SIZE,
            DigestAlgorithm::Blake3 => crate::params::BLAKE3_SIZE,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DigestAlgorithm::Sha256 => "sha256",
            DigestAlgorithm::Blake3 => "blake3",
        }
    }

    /// Hex digest of `data` with this algorithm
    pub fn digest_hex(&self, data: impl AsRef<[u8]>) -> String {
        match self {
            DigestAlgorithm::Sha256 => sha256_hex(data),
            DigestAlgorithm::Blake3 => blake3_hex(data),
        }
    }
}

impl Hasher for DigestAlgorithm {
    fn hash(&self, input: &[u8]) -> Result<String> {
        Ok(self.digest_hex(input))
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(DigestAlgorithm::Sha256),
            "blake3" => Ok(DigestAlgorithm::Blake3),
            other => Err(Error::InvalidConfig(format!(
                "unknown digest algorithm '{}' (expected sha256 or blake3)",
                other
            ))),
        }
    }
}
