//! Random suffix sources

use crate::error::{Error, Result};

/// Source of bounded random integers for token suffixes
pub trait Entropy: Send {
    /// Draw uniformly from `[0, bound)`. A bound of 0 or 1 always yields 0.
    fn draw_below(&mut self, bound: u32) -> Result<u32>;
}

/// Operating system randomness via `getrandom`
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl Entropy for OsEntropy {
    fn draw_below(&mut self, bound: u32) -> Result<u32> {
        if bound <= 1 {
            return Ok(0);
        }

        // Reject the tail of the u32 range so that `% bound` stays uniform
        let limit = u32::MAX - (u32::MAX % bound);
        loop {
            let mut buf = [0u8; 4];
            getrandom::getrandom(&mut buf).map_err(|e| Error::Entropy(e.to_string()))?;
            let value = u32::from_le_bytes(buf);
            if value < limit {
                return Ok(value % bound);
            }
        }
    }
}

impl<F> Entropy for F
where
    F: FnMut(u32) -> Result<u32> + Send,
{
    fn draw_below(&mut self, bound: u32) -> Result<u32> {
        self(bound)
    }
}
