//! Unique hash generation with collision avoidance
//!
//! A token is the current millisecond timestamp followed by a random decimal
//! suffix (`"{millis}{suffix}"`). A token is only accepted if this generator
//! has not issued it within the configured window; otherwise the timestamp is
//! re-read and the suffix redrawn. The accepted token is then hashed.
//!
//! Uniqueness is scoped to one generator instance. Two generators never share
//! a recency set, so share one generator (e.g. behind an `Arc`) when hashes
//! must be unique across callers.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::entropy::{Entropy, OsEntropy};
use crate::error::{Error, Result};
use crate::hasher::{Hasher, Sha256Hasher};
use crate::params::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RANDOM_BOUND, DEFAULT_WINDOW_MS};
use crate::recency::RecencySet;

/// Generator tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// How long an issued token is protected from reuse, in milliseconds
    pub window_ms: u64,
    /// Random suffix is drawn from `[0, random_bound)`
    pub random_bound: u32,
    /// Give up with `ExhaustedEntropy` after this many candidates.
    /// `None` retries until a fresh token is found.
    pub max_attempts: Option<u32>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            random_bound: DEFAULT_RANDOM_BOUND,
            max_attempts: Some(DEFAULT_MAX_ATTEMPTS),
        }
    }
}

impl GeneratorConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_ms == 0 {
            return Err(Error::InvalidConfig("window_ms must be positive".into()));
        }
        if self.random_bound == 0 {
            return Err(Error::InvalidConfig(
                "random_bound must be at least 1".into(),
            ));
        }
        if self.max_attempts == Some(0) {
            return Err(Error::InvalidConfig(
                "max_attempts must be at least 1 (use none to disable the cap)".into(),
            ));
        }
        Ok(())
    }
}

/// Everything the check-then-insert sequence touches
struct State<R> {
    recent: RecencySet,
    entropy: R,
}

/// Produces hashes that never repeat within the recency window
pub struct UniqueHashGenerator<H = Sha256Hasher, C = SystemClock, R = OsEntropy> {
    config: GeneratorConfig,
    hasher: H,
    clock: C,
    state: Mutex<State<R>>,
}

impl UniqueHashGenerator {
    /// SHA-256 generator with the system clock, OS entropy and default config
    pub fn new() -> Self {
        Self::assemble(
            GeneratorConfig::default(),
            Sha256Hasher,
            SystemClock::new(),
            OsEntropy,
        )
    }

    /// SHA-256 generator with a custom configuration
    pub fn with_config(config: GeneratorConfig) -> Result<Self> {
        Self::from_parts(config, Sha256Hasher, SystemClock::new(), OsEntropy)
    }
}

impl Default for UniqueHashGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Hasher, C: Clock, R: Entropy> UniqueHashGenerator<H, C, R> {
    /// Assemble a generator from explicit collaborators
    pub fn from_parts(config: GeneratorConfig, hasher: H, clock: C, entropy: R) -> Result<Self> {
        config.validate()?;
        Ok(Self::assemble(config, hasher, clock, entropy))
    }

    // Caller guarantees `config` is valid
    fn assemble(config: GeneratorConfig, hasher: H, clock: C, entropy: R) -> Self {
        Self {
            state: Mutex::new(State {
                recent: RecencySet::new(config.window()),
                entropy,
            }),
            config,
            hasher,
            clock,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Produce a hash whose underlying token is unique within the window
    pub fn generate(&self) -> Result<String> {
        let token = self.issue_token()?;
        self.hasher.hash(token.as_bytes())
    }

    /// Accept and record a fresh token without hashing it
    pub fn issue_token(&self) -> Result<String> {
        let mut state = self.lock_state();
        let mut attempts: u32 = 0;

        loop {
            attempts = attempts.saturating_add(1);

            let now = self.clock.now_millis()?;
            let suffix = state.entropy.draw_below(self.config.random_bound)?;
            let token = format!("{}{}", now, suffix);

            if state.recent.claim(&token, now) {
                if attempts > 1 {
                    debug!("accepted token after {} attempts", attempts);
                }
                return Ok(token);
            }
            trace!("candidate {} is still fresh, redrawing", token);

            if let Some(max) = self.config.max_attempts {
                if attempts >= max {
                    warn!(
                        "gave up after {} attempts ({} held tokens, bound {})",
                        attempts,
                        state.recent.len(),
                        self.config.random_bound
                    );
                    return Err(Error::ExhaustedEntropy { attempts });
                }
            }
        }
    }

    /// Whether `token` was issued by this generator and is still protected
    pub fn is_fresh(&self, token: &str) -> Result<bool> {
        let now = self.clock.now_millis()?;
        Ok(self.lock_state().recent.contains_at(token, now))
    }

    /// Drop expired tokens; returns how many were removed
    pub fn purge_expired(&self) -> Result<usize> {
        let now = self.clock.now_millis()?;
        Ok(self.lock_state().recent.purge_expired(now))
    }

    /// Tokens currently held, including expired ones awaiting a purge
    pub fn held_count(&self) -> usize {
        self.lock_state().recent.len()
    }

    /// Earliest instant (ms) at which a held token expires
    pub fn next_expiry(&self) -> Option<u64> {
        self.lock_state().recent.next_expiry()
    }

    // A panic while holding the lock cannot leave the set half-updated, so a
    // poisoned lock is still usable.
    fn lock_state(&self) -> MutexGuard<'_, State<R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
