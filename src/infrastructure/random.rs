//! Random bytes provider.
//!
//! Used for temp-file names and mutation correlation ids. Injected so tests
//! can use a seeded source.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::fmt;
use std::sync::Mutex;

/// Source of random bytes.
pub trait RandomSource: Send + Sync + fmt::Debug {
    fn fill_bytes(&self, dest: &mut [u8]);
}

/// Thread-local OS-seeded generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        rand::thread_rng().fill_bytes(dest);
    }
}

/// Deterministic generator for reproducible runs.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn fill_bytes(&self, dest: &mut [u8]) {
        match self.rng.lock() {
            Ok(mut rng) => rng.fill_bytes(dest),
            Err(poisoned) => poisoned.into_inner().fill_bytes(dest),
        }
    }
}

/// Lowercase hex string of `bytes` random bytes.
#[must_use]
pub fn hex_token(source: &dyn RandomSource, bytes: usize) -> String {
    use std::fmt::Write as _;

    let mut buf = vec![0_u8; bytes];
    source.fill_bytes(&mut buf);
    buf.iter().fold(String::with_capacity(bytes * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_token_has_two_chars_per_byte() {
        let token = hex_token(&ThreadRandom, 6);
        assert_eq!(token.len(), 12);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn seeded_sources_repeat() {
        let a = SeededRandom::new(7);
        let b = SeededRandom::new(7);
        assert_eq!(hex_token(&a, 8), hex_token(&b, 8));
    }
}
