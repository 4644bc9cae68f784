//! Procedural pipe field
//!
//! Pipes sit every [`PIPE_SPACING`] world units starting at x = 0. Each slot
//! has a vertical gap offset; the field is a finite cyclic buffer so the
//! course is conceptually infinite.

use glam::Vec2;
use rand::Rng;

use super::geometry::Rect;
use crate::consts::PIPE_SPACING;
use crate::tuning::Tuning;

/// Largest |gap| a pipe can have
pub const MAX_GAP_OFFSET: f32 = 2.0;

/// Draw `count` gap offsets uniformly from [-2.0, 2.0)
pub fn generate_gaps<R: Rng>(rng: &mut R, count: usize) -> Vec<f32> {
    (0..count)
        .map(|_| {
            let unit: f32 = rng.random(); // [0, 1)
            (unit - 0.5) * (2.0 * MAX_GAP_OFFSET)
        })
        .collect()
}

/// Top and bottom pipe of one slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipePair {
    pub index: u64,
    pub top: Rect,
    pub bottom: Rect,
}

impl PipePair {
    /// Does a circle overlap either pipe?
    pub fn hits_circle(&self, center: Vec2, radius: f32) -> bool {
        self.top.intersects_circle(center, radius) || self.bottom.intersects_circle(center, radius)
    }
}

/// Cyclic sequence of gap offsets, one per pipe slot
#[derive(Debug, Clone, PartialEq)]
pub struct PipeField {
    gaps: Vec<f32>,
}

impl PipeField {
    /// Field with every gap centered (used before the first reset)
    pub fn zeroed(count: usize) -> Self {
        Self {
            gaps: vec![0.0; count.max(1)],
        }
    }

    pub fn generate<R: Rng>(rng: &mut R, count: usize) -> Self {
        Self {
            gaps: generate_gaps(rng, count.max(1)),
        }
    }

    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn gaps(&self) -> &[f32] {
        &self.gaps
    }

    /// Gap offset for a pipe slot; indices wrap around the field
    #[inline]
    pub fn gap(&self, index: u64) -> f32 {
        self.gaps[(index % self.gaps.len() as u64) as usize]
    }

    /// Slot whose pipe a bird at world `x` is closest to
    ///
    /// The quotient is clamped at zero so x in [-4, -2) maps to slot 0 exactly
    /// as a truncating conversion would.
    #[inline]
    pub fn pipe_index_at(x: f32) -> u64 {
        ((x + PIPE_SPACING / 2.0) / PIPE_SPACING).max(0.0).floor() as u64
    }

    /// World x of a pipe slot
    #[inline]
    pub fn pipe_x(index: u64) -> f32 {
        index as f32 * PIPE_SPACING
    }

    /// Collision rectangles for a pipe slot
    pub fn pipe_pair(&self, index: u64, tuning: &Tuning) -> PipePair {
        let gap = self.gap(index);
        let x = Self::pipe_x(index);
        let size = Vec2::new(tuning.pipe_width, tuning.pipe_height);
        PipePair {
            index,
            top: Rect::new(Vec2::new(x, gap + tuning.gap_half_height), size),
            bottom: Rect::new(Vec2::new(x, gap - tuning.gap_half_height), size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::NUM_PIPES;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_generate_length_and_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        let gaps = generate_gaps(&mut rng, NUM_PIPES);
        assert_eq!(gaps.len(), NUM_PIPES);
        assert!(gaps.iter().all(|g| (-MAX_GAP_OFFSET..=MAX_GAP_OFFSET).contains(g)));
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = PipeField::generate(&mut Pcg32::seed_from_u64(42), NUM_PIPES);
        let b = PipeField::generate(&mut Pcg32::seed_from_u64(42), NUM_PIPES);
        let c = PipeField::generate(&mut Pcg32::seed_from_u64(43), NUM_PIPES);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_pipe_index_boundaries() {
        assert_eq!(PipeField::pipe_index_at(-4.0), 0);
        assert_eq!(PipeField::pipe_index_at(-2.5), 0);
        assert_eq!(PipeField::pipe_index_at(-2.0), 0);
        assert_eq!(PipeField::pipe_index_at(1.99), 0);
        assert_eq!(PipeField::pipe_index_at(2.0), 1);
        assert_eq!(PipeField::pipe_index_at(5.9), 1);
        assert_eq!(PipeField::pipe_index_at(6.0), 2);
    }

    #[test]
    fn test_pipe_pair_geometry() {
        let tuning = Tuning::default();
        let field = PipeField::zeroed(4);
        let pair = field.pipe_pair(3, &tuning);
        assert_eq!(pair.top.center, Vec2::new(12.0, tuning.gap_half_height));
        assert_eq!(pair.bottom.center, Vec2::new(12.0, -tuning.gap_half_height));
        // Bird centered in the gap is clear, bird at a pipe edge is not
        assert!(!pair.hits_circle(Vec2::new(12.0, 0.0), 0.3));
        assert!(pair.hits_circle(Vec2::new(12.0, 0.9), 0.3));
    }

    proptest! {
        #[test]
        fn prop_gap_lookup_wraps(seed in any::<u64>(), index in 0u64..1_000_000) {
            let field = PipeField::generate(&mut Pcg32::seed_from_u64(seed), NUM_PIPES);
            prop_assert_eq!(field.gap(index), field.gap(index + NUM_PIPES as u64));
        }

        #[test]
        fn prop_gaps_in_range(seed in any::<u64>()) {
            let field = PipeField::generate(&mut Pcg32::seed_from_u64(seed), 64);
            prop_assert!(field.gaps().iter().all(|g| g.abs() <= MAX_GAP_OFFSET));
        }

        #[test]
        fn prop_pipe_index_matches_floor(x in 0.0f32..10_000.0) {
            let expected = ((x + 2.0) / 4.0).floor() as u64;
            prop_assert_eq!(PipeField::pipe_index_at(x), expected);
        }
    }
}
