//! Generator defaults
//!
//! Values the generator falls back to when no configuration is supplied.

/// How long an issued token stays protected from reuse (60 s)
pub const DEFAULT_WINDOW_MS: u64 = 60_000;

/// Exclusive upper bound of the random token suffix
pub const DEFAULT_RANDOM_BOUND: u32 = 10_000;

/// Retry cap applied by the default configuration
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10_000;

/// SHA-256 output size in bytes
pub const SHA256_SIZE: usize = 32;

/// BLAKE3 output size in bytes
pub const BLAKE3_SIZE: usize = 32;

/// Length of a hex-encoded 256-bit digest
pub const DIGEST_HEX_LEN: usize = 64;
