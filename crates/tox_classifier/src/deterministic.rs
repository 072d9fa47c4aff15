//! Deterministic helpers for reproducible training
//!
//! Split selection must not depend on iteration order of hash maps or on
//! platform randomness. Ties in information gain are resolved by a seeded
//! hash of the candidate, so the same seed always yields the same tree.

/// 64-bit avalanche hash over a small slice of integers
pub fn mix64(values: &[u64], seed: u64) -> u64 {
    const PRIME1: u64 = 0x9E37_79B1_85EB_CA87;
    const PRIME2: u64 = 0xC2B2_AE3D_27D4_EB4F;
    const PRIME3: u64 = 0x1656_67B1_9E37_79F9;
    const PRIME5: u64 = 0x85EB_CA77_C2B2_AE63;

    let mut h = seed.wrapping_add(PRIME5);
    for &v in values {
        h = h.wrapping_add(v.wrapping_mul(PRIME3));
        h = h.rotate_left(17).wrapping_mul(PRIME2);
    }

    h ^= h >> 33;
    h = h.wrapping_mul(PRIME1);
    h ^= h >> 29;
    h = h.wrapping_mul(PRIME2);
    h ^= h >> 32;
    h
}

/// Total order over split candidates with equal gain; smaller wins.
///
/// Compares the seeded rank first, then feature and threshold so distinct
/// candidates never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SplitTieBreaker {
    pub rank: u64,
    pub feature: u32,
    pub threshold: u32,
}

impl SplitTieBreaker {
    pub fn new(seed: u64, feature: u32, threshold: u32, node_id: u64) -> Self {
        Self {
            rank: mix64(&[feature as u64, threshold as u64, node_id], seed),
            feature,
            threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix64_determinism() {
        let data = [4, 5, 0];
        assert_eq!(mix64(&data, 42), mix64(&data, 42));
    }

    #[test]
    fn test_mix64_depends_on_seed_and_order() {
        assert_ne!(mix64(&[4, 5, 0], 42), mix64(&[4, 5, 0], 43));
        assert_ne!(mix64(&[4, 5, 0], 42), mix64(&[5, 4, 0], 42));
    }

    #[test]
    fn test_tie_breaker_ordering() {
        let a = SplitTieBreaker::new(42, 4, 5, 0);
        let b = SplitTieBreaker::new(42, 4, 5, 0);
        let c = SplitTieBreaker::new(42, 19, 1, 0);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a < c, a.rank < c.rank);
    }
}
