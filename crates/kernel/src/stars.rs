use glam::Vec3;

/// Deterministic splitmix64 generator. Small, fast, and reproducible across
/// platforms, which keeps the backdrop identical from run to run.
#[derive(Debug, Clone)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)`, built from the top 24 bits.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }
}

/// Backdrop of stars scattered in a spherical shell around the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Starfield {
    positions: Vec<Vec3>,
}

impl Starfield {
    pub const SEED: u64 = 0x5eed_57a2;
    pub const INNER_RADIUS: f32 = 200.0;
    pub const OUTER_RADIUS: f32 = 600.0;

    /// Scatter `count` stars with the fixed seed.
    pub fn generate(count: usize) -> Self {
        Self::with_seed(count, Self::SEED)
    }

    pub fn with_seed(count: usize, seed: u64) -> Self {
        let mut rng = SplitMix64::new(seed);
        let positions = (0..count)
            .map(|_| {
                // Uniform direction: z uniform in [-1, 1], longitude uniform.
                let z = rng.range(-1.0, 1.0);
                let theta = rng.range(0.0, std::f32::consts::TAU);
                let ring = (1.0 - z * z).sqrt();
                let dir = Vec3::new(ring * theta.cos(), ring * theta.sin(), z);
                dir * rng.range(Self::INNER_RADIUS, Self::OUTER_RADIUS)
            })
            .collect();
        tracing::debug!(count, seed, "starfield generated");
        Self { positions }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = SplitMix64::new(42);
        let mut b = SplitMix64::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SplitMix64::new(1);
        let mut b = SplitMix64::new(2);
        assert_ne!(a.next_u64(), b.next_u64());
    }

    #[test]
    fn unit_floats_stay_in_range() {
        let mut rng = SplitMix64::new(7);
        for _ in 0..10_000 {
            let f = rng.next_f32();
            assert!((0.0..1.0).contains(&f));
        }
    }

    #[test]
    fn stars_lie_in_shell() {
        let stars = Starfield::generate(500);
        assert_eq!(stars.len(), 500);
        for p in stars.positions() {
            let r = p.length();
            assert!(r >= Starfield::INNER_RADIUS - 1e-2, "{r}");
            assert!(r <= Starfield::OUTER_RADIUS + 1e-2, "{r}");
        }
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(Starfield::generate(64), Starfield::generate(64));
        assert_ne!(Starfield::with_seed(64, 1), Starfield::with_seed(64, 2));
        assert!(Starfield::generate(0).is_empty());
    }
}
