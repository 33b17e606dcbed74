//! Guide strands: arc-length keyed steps built from walked edge pairs.

pub mod extract;
pub mod resample;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{HairError, Result};
use crate::geometry::midpoint;

pub use extract::{extract_strands, ExtractConfig, NormalMode};
pub use resample::{lower_bound, resample, resample_uniform, Sample};

/// Strands need at least two faces, i.e. three crossed edges.
pub const MIN_STRAND_STEPS: usize = 3;

pub const DEFAULT_MAX_FIBERS: usize = 10000;

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub arc_length: f32,
    pub position: Vec3,
    /// Unnormalized, its length is the local ribbon width.
    pub tangent: Vec3,
    pub normal: Vec3,
}

impl Step {
    /// The step crossing the edge `side_a - side_b`, before its arc length is known.
    pub fn across(side_a: Vec3, side_b: Vec3, normal: Vec3) -> Self {
        Self {
            arc_length: 0.,
            position: midpoint(side_a, side_b),
            tangent: side_b - side_a,
            normal,
        }
    }
}

/// Fills in the cumulative arc length of consecutive steps, starting at 0.
pub fn accumulate_arc_length(steps: &mut [Step]) {
    let mut length = 0.;
    let mut previous: Option<Vec3> = None;
    for step in steps.iter_mut() {
        if let Some(p) = previous {
            length += (step.position - p).length();
        }
        step.arc_length = length;
        previous = Some(step.position);
    }
}

/// A borrowed view on the steps of one strand.
#[derive(Copy, Clone, Debug)]
pub struct StrandPath<'a> {
    steps: &'a [Step],
}

impl<'a> StrandPath<'a> {
    pub fn new(steps: &'a [Step]) -> Self {
        Self { steps }
    }
    pub fn steps(&self) -> &'a [Step] {
        self.steps
    }
    pub fn len(&self) -> usize {
        self.steps.len()
    }
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
    pub fn total_length(&self) -> f32 {
        self.steps.last().map(|s| s.arc_length).unwrap_or(0.)
    }
    pub fn resample(&self, arc_length: f32) -> Sample {
        resample(*self, arc_length)
    }
}

#[derive(Copy, Clone, Debug)]
pub struct StrandSpawnSpec<'a> {
    pub path: StrandPath<'a>,
    pub fiber_count: usize,
}

/// All strands of one generation pass, stored in one flat step buffer.
/// Strand `i` owns `steps[i * hair_steps..(i + 1) * hair_steps]`.
#[derive(Clone, Debug, Default)]
pub struct StrandBatch {
    hair_steps: usize,
    steps: Vec<Step>,
    fiber_counts: Vec<usize>,
}

impl StrandBatch {
    /// Validates and packs a list of `(steps, fiber_count)` strands.
    pub fn from_paths(
        paths: impl IntoIterator<Item = (Vec<Step>, usize)>,
        max_fibers: usize,
    ) -> Result<Self> {
        let mut builder = BatchBuilder::default();
        for (steps, fiber_count) in paths {
            builder.push(&steps, fiber_count)?;
        }
        builder.finish(max_fibers)
    }

    pub fn hair_steps(&self) -> usize {
        self.hair_steps
    }
    pub fn strand_count(&self) -> usize {
        self.fiber_counts.len()
    }
    pub fn total_fibers(&self) -> usize {
        self.fiber_counts.iter().fold(0, |total: usize, &n| total.saturating_add(n))
    }

    pub fn path(&self, strand: usize) -> StrandPath<'_> {
        let start = strand * self.hair_steps;
        StrandPath::new(&self.steps[start..start + self.hair_steps])
    }

    pub fn spawn_specs(&self) -> impl ExactSizeIterator<Item = StrandSpawnSpec<'_>> + '_ {
        self.fiber_counts
            .iter()
            .enumerate()
            .map(|(i, &fiber_count)| StrandSpawnSpec {
                path: self.path(i),
                fiber_count,
            })
    }
}

/// Accumulates strands and enforces the batch rules before anything is
/// handed to the synthesizer.
#[derive(Default)]
pub(crate) struct BatchBuilder {
    batch: StrandBatch,
}

impl BatchBuilder {
    pub(crate) fn push(&mut self, steps: &[Step], fiber_count: usize) -> Result<()> {
        if self.batch.fiber_counts.is_empty() {
            self.batch.hair_steps = steps.len();
        } else if self.batch.hair_steps != steps.len() {
            warn!(
                expected = self.batch.hair_steps,
                found = steps.len(),
                "strands have a different number of vertices"
            );
            return Err(HairError::InconsistentStrandLength {
                expected: self.batch.hair_steps,
                found: steps.len(),
            });
        }
        self.batch.steps.extend_from_slice(steps);
        self.batch.fiber_counts.push(fiber_count.max(1));
        Ok(())
    }

    pub(crate) fn finish(self, max_fibers: usize) -> Result<StrandBatch> {
        let batch = self.batch;
        if batch.fiber_counts.is_empty() {
            warn!("could not find any marked edges");
            return Err(HairError::NoMarkedGeometryFound);
        }
        if batch.hair_steps < MIN_STRAND_STEPS {
            warn!(steps = batch.hair_steps, "strands are too short");
            return Err(HairError::StrandTooShort {
                steps: batch.hair_steps,
            });
        }
        let requested = batch.total_fibers();
        if requested > max_fibers {
            warn!(requested, max_fibers, "too many fibers requested");
            return Err(HairError::FiberCountExceeded {
                requested,
                limit: max_fibers,
            });
        }
        Ok(batch)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn straight_steps(n: usize) -> Vec<Step> {
        let mut steps: Vec<Step> = (0..n)
            .map(|i| Step::across(Vec3::new(-0.5, i as f32, 0.), Vec3::new(0.5, i as f32, 0.), Vec3::Z))
            .collect();
        accumulate_arc_length(&mut steps);
        steps
    }

    #[test]
    fn arc_length_accumulates_distances() {
        let steps = straight_steps(4);
        let lengths: Vec<f32> = steps.iter().map(|s| s.arc_length).collect();
        assert_eq!(lengths, [0., 1., 2., 3.]);
        assert_eq!(steps[2].tangent, Vec3::X);
        assert_eq!(steps[2].position, Vec3::new(0., 2., 0.));
    }

    #[test]
    fn batch_is_laid_out_flat() {
        let batch = StrandBatch::from_paths(
            [(straight_steps(4), 2), (straight_steps(4), 0)],
            DEFAULT_MAX_FIBERS,
        )
        .unwrap();
        assert_eq!(batch.hair_steps(), 4);
        assert_eq!(batch.strand_count(), 2);
        // fiber counts are floored to 1
        assert_eq!(batch.total_fibers(), 3);
        let counts: Vec<usize> = batch.spawn_specs().map(|s| s.fiber_count).collect();
        assert_eq!(counts, [2, 1]);
        assert_eq!(batch.path(1).total_length(), 3.);
    }

    #[test]
    fn mismatched_strands_are_rejected() {
        let result = StrandBatch::from_paths(
            [(straight_steps(4), 1), (straight_steps(5), 1)],
            DEFAULT_MAX_FIBERS,
        );
        assert_eq!(
            result.unwrap_err(),
            HairError::InconsistentStrandLength {
                expected: 4,
                found: 5
            }
        );
    }

    #[test]
    fn short_and_empty_batches_are_rejected() {
        let short = StrandBatch::from_paths([(straight_steps(2), 1)], DEFAULT_MAX_FIBERS);
        assert_eq!(short.unwrap_err(), HairError::StrandTooShort { steps: 2 });
        let empty = StrandBatch::from_paths(Vec::<(Vec<Step>, usize)>::new(), DEFAULT_MAX_FIBERS);
        assert_eq!(empty.unwrap_err(), HairError::NoMarkedGeometryFound);
    }

    #[test]
    fn huge_fiber_counts_do_not_overflow() {
        let result = StrandBatch::from_paths(
            [(straight_steps(3), usize::MAX), (straight_steps(3), usize::MAX)],
            DEFAULT_MAX_FIBERS,
        );
        assert_eq!(
            result.unwrap_err(),
            HairError::FiberCountExceeded {
                requested: usize::MAX,
                limit: 10000
            }
        );
    }

    #[test]
    fn fiber_ceiling_is_enforced() {
        let result = StrandBatch::from_paths(
            [(straight_steps(3), 5000), (straight_steps(3), 5001)],
            DEFAULT_MAX_FIBERS,
        );
        assert_eq!(
            result.unwrap_err(),
            HairError::FiberCountExceeded {
                requested: 10001,
                limit: 10000
            }
        );
    }
}
