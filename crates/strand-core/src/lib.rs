pub mod convert;
pub mod error;
pub mod fibers;
pub mod geometry;
pub mod mesh;
pub mod source;
pub mod strands;

pub use convert::PolylineMesh;
pub use error::{HairError, Result};
pub use fibers::{synthesize, synthesize_with, FiberBuffer, FiberSink, OffsetRandom, RandomizationParams};
pub use mesh::PolyMesh;
pub use source::{CurveSource, MeshSource, SourceShape, SurfaceSource};
pub use strands::{
    extract_strands, lower_bound, resample, ExtractConfig, NormalMode, Sample, Step, StrandBatch,
    StrandPath, StrandSpawnSpec,
};

pub trait VisualDebug {
    type Flags;
    #[cfg(feature = "bevy")]
    fn debug(&self, gizmos: &mut bevy_gizmos::prelude::Gizmos, debug_flags: Self::Flags);
}

/// One stage of the generation: built from the previous stage, a read only
/// configuration and a mutable builder (the random generator, if any).
/// A failing stage leaves nothing behind.
pub trait HairPipelinePhase: Sized {
    type Previous;
    type Config;
    type Builder;
    fn generate_from(prev: Self::Previous, config: &Self::Config, builder: &mut Self::Builder) -> Result<Self>;
}

pub trait Grow {
    fn grow<Next>(self, config: &Next::Config, builder: &mut Next::Builder) -> Result<Next>
    where
        Next: HairPipelinePhase<Previous = Self>;
}

impl<T> Grow for T {
    fn grow<Next>(self, config: &Next::Config, builder: &mut Next::Builder) -> Result<Next>
    where
        Next: HairPipelinePhase<Previous = T>,
    {
        Next::generate_from(self, config, builder)
    }
}

/// Guides together with the fibers synthesized from them.
#[derive(Clone, Debug)]
pub struct Groom {
    pub guides: StrandBatch,
    pub fibers: FiberBuffer,
}

impl HairPipelinePhase for StrandBatch {
    type Previous = Vec<SourceShape>;
    type Config = ExtractConfig;
    type Builder = ();
    fn generate_from(prev: Self::Previous, config: &Self::Config, _: &mut Self::Builder) -> Result<Self> {
        extract_strands(&prev, config)
    }
}

impl HairPipelinePhase for Groom {
    type Previous = StrandBatch;
    type Config = RandomizationParams;
    type Builder = rand::rngs::StdRng;
    fn generate_from(prev: Self::Previous, config: &Self::Config, rng: &mut Self::Builder) -> Result<Self> {
        let fibers = synthesize_with(&prev, config, rng)?;
        Ok(Groom { guides: prev, fibers })
    }
}

#[cfg(feature = "bevy")]
mod debug_draw {
    use bevy_color::Color;
    use bevy_gizmos::prelude::Gizmos;

    use super::{FiberBuffer, StrandBatch, VisualDebug};

    impl VisualDebug for FiberBuffer {
        type Flags = bool;
        fn debug(&self, gizmos: &mut Gizmos, debug_flags: bool) {
            if debug_flags {
                let n = self.fiber_count().max(1) as f32;
                for (i, fiber) in self.fibers().enumerate() {
                    let a = i as f32 / n;
                    let color = Color::srgb(0.9, 0.6 + 0.3 * a, 0.3 + 0.2 * a);
                    gizmos.linestrip(fiber.iter().copied(), color);
                }
            }
        }
    }

    impl VisualDebug for StrandBatch {
        type Flags = bool;
        fn debug(&self, gizmos: &mut Gizmos, debug_flags: bool) {
            if debug_flags {
                for strand in self.spawn_specs() {
                    let steps = strand.path.steps();
                    gizmos.linestrip(steps.iter().map(|s| s.position), Color::srgb(0.1, 0.8, 0.3));
                    for s in steps {
                        gizmos.line(s.position - 0.5 * s.tangent, s.position + 0.5 * s.tangent, Color::srgb(0.2, 0.3, 0.9));
                    }
                }
            }
        }
    }
}
