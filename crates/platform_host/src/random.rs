//! Randomness host-service contracts.

use std::cell::Cell;

/// Host source of uniformly random bytes.
pub trait RandomSource {
    /// Fills `buf` with random bytes.
    ///
    /// # Errors
    ///
    /// Returns an error when the host cannot produce randomness.
    fn fill_bytes(&self, buf: &mut [u8]) -> Result<(), String>;
}

/// Returns a uniformly distributed index below `bound` using rejection sampling.
///
/// # Errors
///
/// Returns an error when `bound` is zero or the source fails.
pub fn random_index(source: &dyn RandomSource, bound: usize) -> Result<usize, String> {
    let bound = u32::try_from(bound).map_err(|_| "bound too large".to_string())?;
    if bound == 0 {
        return Err("empty range".to_string());
    }
    let zone = u32::MAX - (u32::MAX % bound);
    loop {
        let mut buf = [0u8; 4];
        source.fill_bytes(&mut buf)?;
        let value = u32::from_le_bytes(buf);
        if value < zone {
            return Ok((value % bound) as usize);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy, Default)]
/// Operating-system randomness through `rand`.
pub struct OsRandomSource;

#[cfg(not(target_arch = "wasm32"))]
impl RandomSource for OsRandomSource {
    fn fill_bytes(&self, buf: &mut [u8]) -> Result<(), String> {
        use rand::RngCore;
        rand::rng().fill_bytes(buf);
        Ok(())
    }
}

#[derive(Debug, Default)]
/// Deterministic byte counter for tests.
pub struct SequenceRandomSource {
    next: Cell<u8>,
}

impl RandomSource for SequenceRandomSource {
    fn fill_bytes(&self, buf: &mut [u8]) -> Result<(), String> {
        for byte in buf {
            *byte = self.next.get();
            self.next.set(self.next.get().wrapping_add(1));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_index_stays_in_bounds() {
        let source = SequenceRandomSource::default();
        for _ in 0..64 {
            assert!(random_index(&source, 7).expect("index") < 7);
        }
        assert!(random_index(&source, 0).is_err());
    }
}
