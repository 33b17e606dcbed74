//! Synthesis of the output fibers from a batch of guide strands.

pub mod params;

use std::ops::{Index, IndexMut};

use glam::Vec3;
use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::info;

use crate::error::Result;
use crate::geometry::safe_ratio;
use crate::strands::StrandBatch;

pub use params::{OffsetRandom, RandomizationParams};

/// Destination fiber collection owned by the host.
pub trait FiberSink {
    /// Drops every previous fiber and prepares `fiber_count` fibers.
    fn reset(&mut self, fiber_count: usize, hair_steps: usize);
    fn set_vertex(&mut self, fiber: usize, step: usize, position: Vec3);
    fn set_root(&mut self, fiber: usize, position: Vec3);
}

/// Vertex positions of every fiber, fiber after fiber.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FiberBuffer {
    hair_steps: usize,
    positions: Vec<Vec3>,
    roots: Vec<Vec3>,
}

impl Index<(usize, usize)> for FiberBuffer {
    type Output = Vec3;

    fn index(&self, (fiber, step): (usize, usize)) -> &Self::Output {
        &self.positions[fiber * self.hair_steps + step]
    }
}

impl IndexMut<(usize, usize)> for FiberBuffer {
    fn index_mut(&mut self, (fiber, step): (usize, usize)) -> &mut Self::Output {
        &mut self.positions[fiber * self.hair_steps + step]
    }
}

impl FiberBuffer {
    pub fn new(fiber_count: usize, hair_steps: usize) -> Self {
        Self {
            hair_steps,
            positions: vec![Vec3::ZERO; fiber_count * hair_steps],
            roots: vec![Vec3::ZERO; fiber_count],
        }
    }

    pub fn hair_steps(&self) -> usize {
        self.hair_steps
    }
    pub fn fiber_count(&self) -> usize {
        self.roots.len()
    }
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }
    pub fn root(&self, fiber: usize) -> Vec3 {
        self.roots[fiber]
    }

    pub fn fiber(&self, fiber: usize) -> &[Vec3] {
        &self.positions[fiber * self.hair_steps..(fiber + 1) * self.hair_steps]
    }

    pub fn fibers(&self) -> impl ExactSizeIterator<Item = &[Vec3]> + '_ {
        (0..self.fiber_count()).map(|i| self.fiber(i))
    }

    /// Copies the finished fibers into the host collection.
    pub fn publish_into(&self, sink: &mut impl FiberSink) {
        sink.reset(self.fiber_count(), self.hair_steps);
        for (i, fiber) in self.fibers().enumerate() {
            for (step, &p) in fiber.iter().enumerate() {
                sink.set_vertex(i, step, p);
            }
            sink.set_root(i, self.roots[i]);
        }
    }
}

impl FiberSink for FiberBuffer {
    fn reset(&mut self, fiber_count: usize, hair_steps: usize) {
        *self = FiberBuffer::new(fiber_count, hair_steps);
    }
    fn set_vertex(&mut self, fiber: usize, step: usize, position: Vec3) {
        self[(fiber, step)] = position;
    }
    fn set_root(&mut self, fiber: usize, position: Vec3) {
        self.roots[fiber] = position;
    }
}

fn centred<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen::<f32>() - 0.5
}

/// Seeds a fresh generator and synthesizes every fiber of `batch`.
pub fn synthesize(batch: &StrandBatch, params: &RandomizationParams, seed: u64) -> Result<FiberBuffer> {
    let mut rng = StdRng::seed_from_u64(seed);
    synthesize_with(batch, params, &mut rng)
}

/// Synthesizes the fibers of every strand, in order.
///
/// Fiber `k` of a strand with `n` fibers is shifted across the ribbon by
/// `tangent * ((k + 0.5) / n - 0.5)`, then perturbed along the normalized
/// tangent and normal. Shortened fibers are resampled on a contracted arc
/// length domain, so they keep all their vertices.
///
/// The generator is drawn in a fixed order, which makes the output a pure
/// function of the batch, the parameters and the generator state:
/// root tangent, root normal, tip tangent and tip normal (unless coupled to
/// the root), length factor, then tangent and normal for every vertex.
pub fn synthesize_with<R: Rng + ?Sized>(
    batch: &StrandBatch,
    params: &RandomizationParams,
    rng: &mut R,
) -> Result<FiberBuffer> {
    params.validate()?;
    let (tangent, normal) = (&params.tangent, &params.normal);
    let mut buffer = FiberBuffer::new(batch.total_fibers(), batch.hair_steps());

    let mut fiber = 0;
    for strand in batch.spawn_specs() {
        let total_length = strand.path.total_length();
        for k in 0..strand.fiber_count {
            let tangent_root = centred(rng);
            let normal_root = centred(rng);
            let tangent_tip = if tangent.couple_tip_to_root {
                tangent_root
            } else {
                centred(rng)
            };
            let normal_tip = if normal.couple_tip_to_root {
                normal_root
            } else {
                centred(rng)
            };
            let length_factor = 1. - rng.gen::<f32>() * params.length_random;
            let lateral = (k as f32 + 0.5) / strand.fiber_count as f32 - 0.5;

            for (v, step) in strand.path.steps().iter().enumerate() {
                let length_param = step.arc_length * length_factor;
                let fraction = safe_ratio(length_param, 0., total_length);
                let sample = strand.path.resample(length_param);

                let tangent_offset = tangent_root * tangent.at_root
                    + centred(rng) * tangent.uniform
                    + tangent_tip * tangent.towards_tip * fraction;
                let normal_offset = normal_root * normal.at_root
                    + centred(rng) * normal.uniform
                    + normal_tip * normal.towards_tip * fraction;

                let position = sample.position
                    + sample.tangent * lateral
                    + sample.tangent.normalize_or_zero() * tangent_offset
                    + sample.normal.normalize_or_zero() * normal_offset;
                buffer.set_vertex(fiber, v, position);
                if v == 0 {
                    buffer.set_root(fiber, position);
                }
            }
            fiber += 1;
        }
    }

    info!(
        fibers = buffer.fiber_count(),
        hair_steps = buffer.hair_steps(),
        "synthesized fibers"
    );
    Ok(buffer)
}
