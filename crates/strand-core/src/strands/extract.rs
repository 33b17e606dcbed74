use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{accumulate_arc_length, BatchBuilder, Step, StrandBatch, DEFAULT_MAX_FIBERS};
use crate::error::{HairError, Result};
use crate::geometry::SpaceTransform;
use crate::mesh::{walk_marked_loops, EdgePair, PolyMesh};
use crate::source::SourceShape;

/// Which normal is stored in the steps of a strand.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalMode {
    /// Normal of the face the crossed edge was reached from.
    #[default]
    Face,
    /// Sum of the normals of the two crossed vertices.
    Vertex,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Average distance between two fibers of a strand.
    pub spacing: f32,
    pub max_fibers: usize,
    pub normal_mode: NormalMode,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            spacing: 1.,
            max_fibers: DEFAULT_MAX_FIBERS,
            normal_mode: NormalMode::Face,
        }
    }
}

impl ExtractConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.spacing.is_finite() && self.spacing > 0.) {
            return Err(HairError::InvalidParameter {
                name: "spacing",
                reason: format!("must be a positive length, got {}", self.spacing),
            });
        }
        Ok(())
    }
}

/// Converts walked edge pairs into steps, in destination space.
pub fn build_steps(
    mesh: &PolyMesh,
    pairs: &[EdgePair],
    transform: &SpaceTransform,
    normal_mode: NormalMode,
) -> Vec<Step> {
    let mut steps: Vec<Step> = pairs
        .iter()
        .map(|pair| {
            let normal = match normal_mode {
                NormalMode::Face => mesh.face(pair.face).normal,
                NormalMode::Vertex => {
                    mesh.vertex_normal(pair.side_a) + mesh.vertex_normal(pair.side_b)
                }
            };
            Step::across(
                transform.point(mesh.position(pair.side_a)),
                transform.point(mesh.position(pair.side_b)),
                transform.normal(normal).normalize_or_zero(),
            )
        })
        .collect();
    accumulate_arc_length(&mut steps);
    steps
}

/// `round(width / spacing)`, capped just above `max_fibers` so absurd
/// spacings still reach the fiber ceiling check.
fn fiber_count(width: f32, spacing: f32, max_fibers: usize) -> usize {
    let wanted = (width / spacing).round();
    if wanted > max_fibers as f32 {
        max_fibers.saturating_add(1)
    } else {
        wanted as usize
    }
}

/// Finds every marked strand of `sources` and packs them in one batch.
///
/// The number of fibers of a strand is the width of its root edge divided
/// by `spacing`, rounded and at least 1.
pub fn extract_strands(sources: &[SourceShape], config: &ExtractConfig) -> Result<StrandBatch> {
    config.validate()?;
    if sources.is_empty() {
        warn!("no source shape selected");
        return Err(HairError::NoSourceSelected);
    }

    let mut builder = BatchBuilder::default();
    for (source_id, source) in sources.iter().enumerate() {
        let marked = source.to_marked_mesh()?;
        let walked = walk_marked_loops(&marked.mesh);
        debug!(source_id, kind = source.kind(), strands = walked.len(), "walked source");
        for pairs in walked {
            let steps = build_steps(&marked.mesh, &pairs, &marked.transform, config.normal_mode);
            let width = steps[0].tangent.length();
            let fiber_count = fiber_count(width, config.spacing, config.max_fibers);
            builder.push(&steps, fiber_count)?;
        }
    }

    let batch = builder.finish(config.max_fibers)?;
    info!(
        strands = batch.strand_count(),
        hair_steps = batch.hair_steps(),
        fibers = batch.total_fibers(),
        "extracted strands"
    );
    Ok(batch)
}
