//! Dice and local random choices.
//!
//! Seeded ChaCha8 so a session can be replayed from its seed. Faces can be
//! loaded ahead of time; loaded faces are rolled before the generator is
//! consulted.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Number of faces on the die.
pub const DICE_FACES: u8 = 6;

/// A loaded face that is not on the die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("die face {0} is outside 1..=6")]
pub struct InvalidFace(pub u8);

#[derive(Clone, Debug)]
pub struct Dice {
    rng: ChaCha8Rng,
    loaded: VecDeque<u8>,
}

impl Dice {
    /// Dice with a fixed seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            loaded: VecDeque::new(),
        }
    }

    /// Dice seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
            loaded: VecDeque::new(),
        }
    }

    /// Queue faces to be rolled next, in order.
    ///
    /// All or nothing: if any face is outside 1..=6 none are queued.
    pub fn load(&mut self, faces: impl IntoIterator<Item = u8>) -> Result<(), InvalidFace> {
        let faces: Vec<u8> = faces.into_iter().collect();
        if let Some(&bad) = faces.iter().find(|f| !(1..=DICE_FACES).contains(*f)) {
            return Err(InvalidFace(bad));
        }
        self.loaded.extend(faces);
        Ok(())
    }

    /// Faces still queued.
    pub fn loaded(&self) -> usize {
        self.loaded.len()
    }

    /// Roll one die, uniform over 1..=6.
    pub fn roll(&mut self) -> u8 {
        match self.loaded.pop_front() {
            Some(face) => face,
            None => self.rng.gen_range(1..=DICE_FACES),
        }
    }

    /// Pick one element uniformly.
    pub fn choose<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        items.choose(&mut self.rng).copied()
    }

    /// Shuffle in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    /// Uniform integer in `range`.
    pub fn gen_range(&mut self, range: std::ops::Range<u32>) -> u32 {
        self.rng.gen_range(range)
    }

    /// Random boolean with probability 0.5.
    pub fn coin(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }

    /// Random 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.rng.gen()
    }
}

impl Default for Dice {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolls_in_range() {
        let mut dice = Dice::new(7);
        for _ in 0..500 {
            let face = dice.roll();
            assert!((1..=6).contains(&face));
        }
    }

    #[test]
    fn test_every_face_appears() {
        let mut dice = Dice::new(42);
        let mut seen = [false; 6];
        for _ in 0..200 {
            seen[usize::from(dice.roll() - 1)] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn test_determinism() {
        let mut a = Dice::new(99);
        let mut b = Dice::new(99);
        let seq_a: Vec<u8> = (0..20).map(|_| a.roll()).collect();
        let seq_b: Vec<u8> = (0..20).map(|_| b.roll()).collect();
        assert_eq!(seq_a, seq_b);
    }

    #[test]
    fn test_loaded_faces_come_first() {
        let mut dice = Dice::new(1);
        dice.load([6, 2, 1]).unwrap();
        assert_eq!(dice.loaded(), 3);
        assert_eq!(dice.roll(), 6);
        assert_eq!(dice.roll(), 2);
        assert_eq!(dice.roll(), 1);
        assert_eq!(dice.loaded(), 0);
    }

    #[test]
    fn test_load_rejects_faces_off_the_die() {
        let mut dice = Dice::new(1);
        assert_eq!(dice.load([6, 9, 2]), Err(InvalidFace(9)));
        assert_eq!(dice.load([0]), Err(InvalidFace(0)));
        assert_eq!(dice.loaded(), 0);
        assert_eq!(InvalidFace(7).to_string(), "die face 7 is outside 1..=6");
    }

    #[test]
    fn test_choose() {
        let mut dice = Dice::new(3);
        let choices = [3, 4, 5];
        for _ in 0..20 {
            assert!(choices.contains(&dice.choose(&choices).unwrap()));
        }
        let empty: [u32; 0] = [];
        assert_eq!(dice.choose(&empty), None);
    }
}
