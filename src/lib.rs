//! uniqhash Tools Library
//!
//! Unique hash generation with collision avoidance, plus the pieces needed
//! to run it in a long-lived process.
//!
//! # Overview
//!
//! Every generated hash is derived from a `millis || random suffix` token
//! that the same generator has not issued within the recency window
//! (60 seconds by default).
//!
//! # Features
//!
//! - **Per-instance uniqueness**: no repeated token within the window
//! - **Pluggable digest**: SHA-256 (default) or BLAKE3, hex encoded
//! - **JSON configuration**: window, suffix range, retry cap, algorithm
//! - **Background sweeper**: tokio task releasing expired tokens while idle
//!
//! # Example
//!
//! ```rust
//! use uniqhash::UniqueHashGenerator;
//!
//! let generator = UniqueHashGenerator::new();
//! let hash = generator.generate().unwrap();
//! assert_eq!(hash.len(), 64);
//! ```

// Re-export the core algorithm
pub use uniqhash_core as algorithm;

pub mod config;
pub mod sweeper;

// Convenience re-exports
pub use algorithm::{sha256_hex, DigestAlgorithm, Error, GeneratorConfig, UniqueHashGenerator};
pub use config::AppConfig;
pub use sweeper::spawn_sweeper;
