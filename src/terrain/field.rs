//! Per-frame height-field compositor.

use glam::Vec2;
use rayon::prelude::*;

use crate::grid::Grid;
use crate::params::TerrainParams;
use crate::random::RandomSource;
use crate::ripple::{RippleEngine, WaveEvent, WaveFront};

/// Terrain altitude grid plus the per-frame change of every cell.
///
/// Both grids are fully rewritten by [`HeightField::composite`]; the only
/// state carried between frames is the previous height used for the delta.
#[derive(Debug, Clone)]
pub struct HeightField {
    size: usize,
    base_height: f32,
    noise_level: f32,
    /// Fixed per-cell noise in `[0, 1)`
    noise: Grid<f32>,
    heights: Grid<f32>,
    deltas: Grid<f32>,
}

impl HeightField {
    /// Create a field with fresh uniform noise
    pub fn new(params: &TerrainParams, rng: &mut impl RandomSource) -> Self {
        let noise = Grid::from_fn(params.size, |_, _| rng.uniform());
        Self::with_noise(params, noise)
    }

    /// Create a field around an existing noise grid
    pub fn with_noise(params: &TerrainParams, noise: Grid<f32>) -> Self {
        let size = noise.size();
        let heights = Grid::from_fn(size, |x, z| {
            params.base_height + noise[(x, z)] * params.noise_level
        });
        Self {
            size,
            base_height: params.base_height,
            noise_level: params.noise_level,
            noise,
            heights,
            deltas: Grid::new(size, 0.0),
        }
    }

    /// Field whose last composite moved every cell from `previous` to `current`
    #[cfg(test)]
    pub(crate) fn from_frames(previous: Grid<f32>, current: Grid<f32>) -> Self {
        let size = current.size();
        let deltas = Grid::from_fn(size, |x, z| current[(x, z)] - previous[(x, z)]);
        Self {
            size,
            base_height: 0.0,
            noise_level: 0.0,
            noise: Grid::new(size, 0.0),
            heights: current,
            deltas,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn heights(&self) -> &Grid<f32> {
        &self.heights
    }

    pub fn deltas(&self) -> &Grid<f32> {
        &self.deltas
    }

    pub fn noise(&self) -> &Grid<f32> {
        &self.noise
    }

    /// Current altitude; panics outside the grid
    pub fn height(&self, x: usize, z: usize) -> f32 {
        self.heights[(x, z)]
    }

    /// Altitude change over the last frame; panics outside the grid
    pub fn delta(&self, x: usize, z: usize) -> f32 {
        self.deltas[(x, z)]
    }

    /// Previous frame's altitude
    pub fn last_height(&self, x: usize, z: usize) -> f32 {
        self.height(x, z) - self.delta(x, z)
    }

    /// Undisturbed altitude of a cell
    pub fn base_at(&self, x: usize, z: usize) -> f32 {
        self.base_height + self.noise[(x, z)] * self.noise_level
    }

    /// `(min, max)` altitude over the grid
    pub fn height_range(&self) -> (f32, f32) {
        self.heights
            .as_slice()
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| {
                (lo.min(h), hi.max(h))
            })
    }

    /// Recompute every cell from the engine's live ripples
    pub fn composite(&mut self, engine: &RippleEngine, now: f32) {
        self.composite_events(engine.events(), now, engine.speed());
    }

    /// Recompute every cell as base noise plus the sum of `events`.
    ///
    /// Rows are processed in parallel; each cell only reads the frozen
    /// wave fronts, so the result is independent of scheduling.
    pub fn composite_events<'a>(
        &mut self,
        events: impl IntoIterator<Item = &'a WaveEvent>,
        now: f32,
        speed: f32,
    ) {
        let fronts: Vec<WaveFront<'a>> = events.into_iter().map(|e| e.front(now, speed)).collect();
        let size = self.size;
        let base_height = self.base_height;
        let noise_level = self.noise_level;
        let Self {
            noise,
            heights,
            deltas,
            ..
        } = self;

        heights
            .as_mut_slice()
            .par_chunks_mut(size)
            .zip(deltas.as_mut_slice().par_chunks_mut(size))
            .zip(noise.as_slice().par_chunks(size))
            .enumerate()
            .for_each(|(z, ((height_row, delta_row), noise_row))| {
                for x in 0..size {
                    let point = Vec2::new(x as f32, z as f32);
                    let mut height = base_height + noise_row[x] * noise_level;

                    for front in &fronts {
                        let distance_sq = point.distance_squared(front.origin);
                        if !front.may_reach(distance_sq) {
                            continue;
                        }
                        height += front.contribution(distance_sq.sqrt());
                    }

                    delta_row[x] = height - height_row[x];
                    height_row[x] = height;
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded_rng;
    use crate::ripple::Channel;

    fn flat_params(size: usize) -> TerrainParams {
        TerrainParams {
            size,
            base_height: 0.0,
            noise_level: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_initial_heights_are_base_plus_noise() {
        let params = TerrainParams {
            size: 8,
            base_height: 1.0,
            noise_level: 0.5,
            ..Default::default()
        };
        let field = HeightField::new(&params, &mut seeded_rng(Some(1)));
        for (x, z, &h) in field.heights().iter_cells() {
            let noise = field.noise()[(x, z)];
            assert!((0.0..1.0).contains(&noise));
            assert_eq!(h, 1.0 + noise * 0.5);
            assert_eq!(field.delta(x, z), 0.0);
        }
    }

    #[test]
    fn test_composite_is_deterministic() {
        let params = TerrainParams {
            size: 32,
            ..Default::default()
        };
        let noise = {
            let mut rng = seeded_rng(Some(11));
            Grid::from_fn(32, |_, _| rng.uniform())
        };
        let events = vec![
            WaveEvent::pulse(Vec2::new(10.0, 12.0), 0.0, 2.0, 4.0, Channel::Up),
            WaveEvent::pulse(Vec2::new(20.0, 5.0), 0.3, 1.0, 6.0, Channel::Down),
        ];

        let mut a = HeightField::with_noise(&params, noise.clone());
        let mut b = HeightField::with_noise(&params, noise);
        a.composite_events(&events, 1.2, 5.0);
        b.composite_events(&events, 1.2, 5.0);
        assert_eq!(a.heights(), b.heights());

        // Re-running on the same input reproduces the grid with zero delta
        a.composite_events(&events, 1.2, 5.0);
        assert_eq!(a.heights(), b.heights());
        assert!(a.deltas().as_slice().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_composite_matches_direct_sum() {
        let mut field = HeightField::with_noise(&flat_params(24), Grid::new(24, 0.0));
        let events = vec![
            WaveEvent::pulse(Vec2::new(12.0, 12.0), 0.0, 2.0, 4.0, Channel::Up),
            WaveEvent::pulse(Vec2::new(3.0, 20.0), 0.5, 1.5, 3.0, Channel::Up),
        ];
        field.composite_events(&events, 1.5, 5.0);
        for (x, z, &h) in field.heights().iter_cells() {
            let p = Vec2::new(x as f32, z as f32);
            let expected: f32 = events
                .iter()
                .map(|e| e.contribution(p.distance(e.origin), 1.5, 5.0))
                .sum();
            assert!((h - expected).abs() < 1e-4, "cell ({x}, {z})");
        }
    }

    #[test]
    fn test_deltas_track_previous_frame() {
        let mut field = HeightField::with_noise(&flat_params(16), Grid::new(16, 0.0));
        let events = vec![WaveEvent::pulse(Vec2::new(8.0, 8.0), 0.0, 2.0, 4.0, Channel::Up)];
        field.composite_events(&events, 0.5, 5.0);
        let before = field.heights().clone();
        field.composite_events(&events, 0.6, 5.0);
        for (x, z, &h) in field.heights().iter_cells() {
            assert!((field.delta(x, z) - (h - before[(x, z)])).abs() < 1e-6);
            assert!((field.last_height(x, z) - before[(x, z)]).abs() < 1e-5);
        }
    }

    #[test]
    fn test_up_down_pair_cancels() {
        let mut field = HeightField::with_noise(&flat_params(16), Grid::new(16, 0.0));
        let events = vec![
            WaveEvent::pulse(Vec2::new(8.0, 8.0), 0.0, 2.0, 4.0, Channel::Up),
            WaveEvent::pulse(Vec2::new(8.0, 8.0), 0.0, 2.0, 4.0, Channel::Down),
        ];
        field.composite_events(&events, 0.7, 5.0);
        assert!(field.heights().as_slice().iter().all(|h| h.abs() < 1e-6));
    }

    #[test]
    fn test_composite_covers_last_row_and_column() {
        let size = 8;
        let mut field = HeightField::with_noise(&flat_params(size), Grid::new(size, 0.0));
        // Crest (quarter phase) sits on the far corner at distance 7√2
        let d = 7.0 * std::f32::consts::SQRT_2;
        let now = (d + 1.0) / 5.0;
        let events = vec![WaveEvent::pulse(Vec2::ZERO, 0.0, 1.0, 4.0, Channel::Up)];
        field.composite_events(&events, now, 5.0);
        assert!((field.height(size - 1, size - 1) - 1.0).abs() < 1e-4);
    }
}
