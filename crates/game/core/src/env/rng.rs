//! Seeded randomness for crit rolls, reward variance, fractional item drops
//! and minion stat rolls.
//!
//! Oracles are stateless: a value is a pure function of its seed. Engines
//! derive one seed per draw with [`compute_seed`], so replaying the same
//! operations from the same base seed reproduces the same rewards and
//! battles.

/// Source of seeded random values. Equal seeds must give equal values.
pub trait RngOracle: Send + Sync {
    /// Raw 32-bit draw for `seed`.
    fn next_u32(&self, seed: u64) -> u32;

    /// Uniform value in `[0, 1)`.
    fn unit_f64(&self, seed: u64) -> f64 {
        self.next_u32(seed) as f64 / (u32::MAX as f64 + 1.0)
    }

    /// Uniform value in `[low, high)`; returns `low` for an empty range.
    fn uniform(&self, seed: u64, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        low + (high - low) * self.unit_f64(seed)
    }

    /// Integer in `[min, max]`.
    fn range(&self, seed: u64, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        let range = max - min + 1;
        min + (self.next_u32(seed) % range)
    }
}

/// One PCG-XSH-RR step per draw: the seed is the 64-bit state, the output
/// is 32 bits. See <https://www.pcg-random.org/>.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;

    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        let state = Self::pcg_step(seed);
        Self::pcg_output(state)
    }
}

/// Oracle that always yields the same unit value.
///
/// Handy for pinning crit rolls and reward variance in tests and previews.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedRng(pub f64);

impl RngOracle for FixedRng {
    fn next_u32(&self, _seed: u64) -> u32 {
        (self.0.clamp(0.0, 1.0) * u32::MAX as f64) as u32
    }

    fn unit_f64(&self, _seed: u64) -> f64 {
        self.0.clamp(0.0, 0.999_999_999)
    }
}

/// Mixes engine state into the seed for one draw.
///
/// * `base_seed` - Seed fixed when the engine was created
/// * `nonce` - Operation sequence number (increments each draw batch)
/// * `actor` - Slot or source index performing the operation
/// * `context` - Distinguishes several rolls within one operation
pub fn compute_seed(base_seed: u64, nonce: u64, actor: u32, context: u32) -> u64 {
    let mut hash = base_seed;

    hash ^= nonce.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (actor as u64).wrapping_mul(0x517cc1b727220a95);
    hash ^= (context as u64).wrapping_mul(0x85ebca6b);

    // fmix64
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
