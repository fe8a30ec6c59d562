//! Sources of die faces.

use std::collections::VecDeque;

use rand::Rng;
use rand::rngs::StdRng;

use super::Die;

/// Something that can produce a face for a die.
///
/// Production code rolls with a seeded or entropy-backed [`StdRng`]; tests
/// and replays use [`ScriptedRoller`] to pin exact faces.
pub trait DieRoller {
    /// Roll one die, returning a value in `1..=die.sides()`.
    fn roll(&mut self, die: Die) -> u32;
}

impl DieRoller for StdRng {
    fn roll(&mut self, die: Die) -> u32 {
        self.random_range(1..=die.sides())
    }
}

/// Replays a fixed sequence of faces, clamped to each die's range.
///
/// When the script runs out, every further die shows `fallback`.
#[derive(Debug, Clone)]
pub struct ScriptedRoller {
    faces: VecDeque<u32>,
    fallback: u32,
}

impl ScriptedRoller {
    /// Replay `faces` in order, then roll 1s.
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
            fallback: 1,
        }
    }

    /// Every die shows the same face.
    pub fn always(face: u32) -> Self {
        Self {
            faces: VecDeque::new(),
            fallback: face,
        }
    }

    /// Number of scripted faces not yet consumed.
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl DieRoller for ScriptedRoller {
    fn roll(&mut self, die: Die) -> u32 {
        let face = self.faces.pop_front().unwrap_or(self.fallback);
        face.clamp(1, die.sides())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn std_rng_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let v = rng.roll(Die::D8);
            assert!((1..=8).contains(&v));
        }
    }

    #[test]
    fn std_rng_deterministic_with_seed() {
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..10 {
            assert_eq!(a.roll(Die::D20), b.roll(Die::D20));
        }
    }

    #[test]
    fn scripted_replays_then_falls_back() {
        let mut r = ScriptedRoller::new([5, 3]);
        assert_eq!(r.roll(Die::D8), 5);
        assert_eq!(r.remaining(), 1);
        assert_eq!(r.roll(Die::D8), 3);
        assert_eq!(r.roll(Die::D8), 1);
    }

    #[test]
    fn scripted_clamps_to_die() {
        let mut r = ScriptedRoller::new([20, 0]);
        assert_eq!(r.roll(Die::D6), 6);
        assert_eq!(r.roll(Die::D6), 1);
        let mut always = ScriptedRoller::always(4);
        assert_eq!(always.roll(Die::D20), 4);
        assert_eq!(always.roll(Die::D2), 2);
    }
}
