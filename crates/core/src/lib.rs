//! # uniqhash core
//!
//! Hashes that never repeat within a sliding time window.
//!
//! Each call draws a token made of the current millisecond timestamp and a
//! random decimal suffix, rejects it if the same generator issued it within
//! the window, and hashes the accepted token.
//!
//! ## Token Format
//!
//! ```text
//! token = millis || suffix
//!         ^^^^^^    ^^^^^^
//!         decimal   decimal in [0, random_bound), no separator
//! ```
//!
//! ## Example
//!
//! ```rust
//! use uniqhash_core::{DIGEST_HEX_LEN, UniqueHashGenerator, sha256_hex};
//!
//! let generator = UniqueHashGenerator::new();
//!
//! let a = generator.generate().unwrap();
//! let b = generator.generate().unwrap();
//! assert_ne!(a, b);
//! assert_eq!(a.len(), DIGEST_HEX_LEN);
//!
//! // The plain wrapper is available on its own
//! let digest = sha256_hex("Hello, world!");
//! assert_eq!(digest.len(), DIGEST_HEX_LEN);
//! ```
//!
//! ## Deterministic Use
//!
//! Clock, entropy and hasher are all pluggable:
//!
//! ```rust
//! use uniqhash_core::{GeneratorConfig, IdentityHasher, ManualClock, Result, UniqueHashGenerator};
//!
//! let clock = ManualClock::new(1_700_000_000_000);
//! let generator = UniqueHashGenerator::from_parts(
//!     GeneratorConfig::default(),
//!     IdentityHasher,
//!     clock.clone(),
//!     |_bound: u32| -> Result<u32> { Ok(42) },
//! )
//! .unwrap();
//!
//! assert_eq!(generator.generate().unwrap(), "170000000000042");
//! ```

mod clock;
mod entropy;
mod error;
mod generator;
mod hasher;
mod params;
mod recency;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entropy::{Entropy, OsEntropy};
pub use error::{BoxError, Error, Result};
pub use generator::{GeneratorConfig, UniqueHashGenerator};
pub use hasher::{
    Blake3Hasher, DigestAlgorithm, Hasher, IdentityHasher, Sha256Hasher, blake3_hex, sha256_hex,
};
pub use params::*;
pub use recency::RecencySet;
