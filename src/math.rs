use std::f32::consts::TAU;

use rand::rngs::SmallRng;
use rand::{Rng as _, SeedableRng};

/// Per-axis share of a diagonal unit vector.
pub const DIAGONAL: f32 = std::f32::consts::FRAC_1_SQRT_2;

/// Move `val` toward `target` by at most `amount`, never overshooting.
pub fn appr(val: f32, target: f32, amount: f32) -> f32 {
    if val > target {
        (val - amount).max(target)
    } else {
        (val + amount).min(target)
    }
}

/// -1, 0 or 1. Unlike `f32::signum`, zero maps to zero.
pub fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Sine over turns (1.0 = full circle), y-down screen convention.
pub fn turn_sin(turns: f32) -> f32 {
    -(turns * TAU).sin()
}

/// Cosine over turns (1.0 = full circle).
pub fn turn_cos(turns: f32) -> f32 {
    (turns * TAU).cos()
}

/// Seeded generator so a given seed replays the same room.
pub struct Rng(SmallRng);

impl Rng {
    pub fn new(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    /// Integer in `0..x`. Non-positive bounds yield 0.
    pub fn rndi(&mut self, x: i32) -> i32 {
        if x <= 0 {
            return 0;
        }
        self.0.gen_range(0..x)
    }

    /// Float in `[0, x)` quantised to hundredths.
    pub fn rnd(&mut self, x: f32) -> f32 {
        let v = (x * 100.0) as i32;
        if v <= 0 {
            return 0.0;
        }
        self.0.gen_range(0..v) as f32 / 100.0
    }

    /// Coin flip.
    pub fn maybe(&mut self) -> bool {
        self.rndi(2) < 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appr_clamps_at_target() {
        assert_eq!(appr(0.0, 1.0, 0.6), 0.6);
        assert_eq!(appr(0.6, 1.0, 0.6), 1.0);
        assert_eq!(appr(-3.0, -2.0, 1.5), -2.0);
        assert_eq!(appr(5.0, 2.0, 1.5), 3.5);
    }

    #[test]
    fn sign_of_zero_is_zero() {
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.1), -1.0);
        assert_eq!(sign(7.0), 1.0);
    }

    #[test]
    fn turn_trig_quarters() {
        assert!(turn_sin(0.0).abs() < 1e-6);
        assert!((turn_sin(0.25) + 1.0).abs() < 1e-6);
        assert!((turn_cos(0.5) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn rng_is_deterministic_per_seed() {
        let mut a = Rng::new(7);
        let mut b = Rng::new(7);
        for _ in 0..32 {
            assert_eq!(a.rndi(128), b.rndi(128));
        }
        let v = a.rnd(0.2);
        assert!((0.0..0.2).contains(&v));
        assert_eq!(a.rndi(0), 0);
        assert_eq!(a.rnd(0.0), 0.0);
    }
}
