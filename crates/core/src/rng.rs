//! RNG module - 7-bag piece randomizer
//!
//! Each bag is a shuffled permutation of all seven kinds. Pieces are drawn in
//! bag order and a fresh bag is shuffled when the current one runs out, so no
//! kind waits longer than 12 draws between appearances.
//!
//! Shuffling uses a small LCG so that a seed fully determines the sequence.

use std::collections::VecDeque;

use arrayvec::ArrayVec;

use crate::types::PieceKind;

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce a degenerate first draw
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        // High bits of an LCG are far better distributed than low bits.
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }

    /// Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// 7-bag piece generator
#[derive(Debug, Clone)]
pub struct PieceQueue {
    /// Remaining pieces of the current bag, next draw last
    bag: ArrayVec<PieceKind, 7>,
    /// Pieces forced ahead of the bag (tests, replays)
    script: VecDeque<PieceKind>,
    rng: SimpleRng,
    bags_dealt: u64,
}

impl PieceQueue {
    pub fn new(seed: u32) -> Self {
        Self {
            bag: ArrayVec::new(),
            script: VecDeque::new(),
            rng: SimpleRng::new(seed),
            bags_dealt: 0,
        }
    }

    /// Queue that deals `script` first, then falls back to seeded bags
    pub fn scripted(seed: u32, script: impl IntoIterator<Item = PieceKind>) -> Self {
        let mut queue = Self::new(seed);
        queue.script.extend(script);
        queue
    }

    fn refill_bag(&mut self) {
        let mut bag: ArrayVec<PieceKind, 7> = PieceKind::ALL.into_iter().collect();
        self.rng.shuffle(&mut bag);
        // Stored reversed so `pop` yields the shuffled order.
        bag.reverse();
        self.bag = bag;
        self.bags_dealt += 1;
    }

    pub fn draw(&mut self) -> PieceKind {
        if let Some(kind) = self.script.pop_front() {
            return kind;
        }
        if self.bag.is_empty() {
            self.refill_bag();
        }
        // A refilled bag always holds seven pieces.
        self.bag.pop().unwrap_or(PieceKind::I)
    }

    /// Upcoming pieces without consuming them
    pub fn preview(&self, count: usize) -> Vec<PieceKind> {
        let mut ahead = self.clone();
        (0..count).map(|_| ahead.draw()).collect()
    }

    /// Pieces left before the current bag is exhausted
    pub fn remaining_in_bag(&self) -> usize {
        self.bag.len()
    }

    pub fn bags_dealt(&self) -> u64 {
        self.bags_dealt
    }

    /// Current RNG state (restarting from it continues the same sequence)
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

impl Default for PieceQueue {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);
        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn next_range_stays_in_range() {
        let mut rng = SimpleRng::new(7);
        for max in 1..20 {
            for _ in 0..50 {
                assert!(rng.next_range(max) < max);
            }
        }
    }

    #[test]
    fn every_bag_is_a_permutation() {
        let mut queue = PieceQueue::new(99);
        for _ in 0..20 {
            let mut bag: Vec<PieceKind> = (0..7).map(|_| queue.draw()).collect();
            bag.sort();
            assert_eq!(bag, PieceKind::ALL.to_vec());
        }
        assert_eq!(queue.bags_dealt(), 20);
    }

    #[test]
    fn preview_matches_draws_across_bag_boundary() {
        let mut queue = PieceQueue::new(4242);
        for _ in 0..5 {
            queue.draw();
        }
        let preview = queue.preview(5);
        let drawn: Vec<PieceKind> = (0..5).map(|_| queue.draw()).collect();
        assert_eq!(preview, drawn);
    }

    #[test]
    fn script_is_dealt_before_bags() {
        let mut queue = PieceQueue::scripted(1, [PieceKind::I, PieceKind::I, PieceKind::O]);
        assert_eq!(queue.draw(), PieceKind::I);
        assert_eq!(queue.draw(), PieceKind::I);
        assert_eq!(queue.draw(), PieceKind::O);
        assert_eq!(queue.bags_dealt(), 0);
        queue.draw();
        assert_eq!(queue.bags_dealt(), 1);
        assert_eq!(queue.remaining_in_bag(), 6);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = PieceQueue::new(31337);
        let mut b = PieceQueue::new(31337);
        for _ in 0..50 {
            assert_eq!(a.draw(), b.draw());
        }
    }
}
