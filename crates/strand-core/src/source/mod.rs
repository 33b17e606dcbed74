//! Conversion of every kind of source shape into a marked polygon mesh.
//!
//! Native meshes are used as they are. Curves and surfaces are tessellated
//! into quad grids whose first ring of edges is marked, so the loop walker
//! handles all kinds the same way.

pub mod curve;
pub mod surface;

use std::borrow::Cow;

use glam::{Mat4, Vec3};

use crate::error::Result;
use crate::geometry::SpaceTransform;
use crate::mesh::PolyMesh;

/// Upper bound of every tessellation resolution, curves and surfaces alike.
pub const MAX_RESOLUTION: u32 = 1024;

pub use curve::{ControlPoint, CurveSource, HandleType, Spline, SplineKind};
pub use surface::SurfaceSource;

#[derive(Clone, Debug)]
pub struct MeshSource {
    pub mesh: PolyMesh,
    /// Object to destination space.
    pub transform: Mat4,
}

impl MeshSource {
    pub fn new(mesh: PolyMesh) -> Self {
        Self {
            mesh,
            transform: Mat4::IDENTITY,
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }
}

#[derive(Clone, Debug)]
pub enum SourceShape {
    Mesh(MeshSource),
    Curve(CurveSource),
    Surface(SurfaceSource),
}

/// A mesh with marked boundary edges, ready to be walked. Meshes generated
/// from curves and surfaces only live for the extraction pass.
pub struct MarkedMesh<'a> {
    pub mesh: Cow<'a, PolyMesh>,
    pub transform: SpaceTransform,
}

impl SourceShape {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceShape::Mesh(_) => "mesh",
            SourceShape::Curve(_) => "curve",
            SourceShape::Surface(_) => "surface",
        }
    }

    pub fn to_marked_mesh(&self) -> Result<MarkedMesh<'_>> {
        Ok(match self {
            SourceShape::Mesh(source) => MarkedMesh {
                mesh: Cow::Borrowed(&source.mesh),
                transform: SpaceTransform::new(source.transform),
            },
            SourceShape::Curve(curve) => MarkedMesh {
                mesh: Cow::Owned(curve.tessellate()?),
                transform: SpaceTransform::new(curve.transform),
            },
            SourceShape::Surface(surface) => MarkedMesh {
                mesh: Cow::Owned(surface.tessellate()?),
                transform: SpaceTransform::new(surface.transform),
            },
        })
    }
}

/// Collects quad grids given as rings of equally many points. The faces
/// between ring `r` and ring `r + 1` are `[r.j, r.j+1, (r+1).j+1, (r+1).j]`
/// and every edge of ring 0 is a seam, so each column becomes a strand
/// running across the rings.
#[derive(Default)]
pub(crate) struct GridBuilder {
    positions: Vec<Vec3>,
    faces: Vec<[u32; 4]>,
    seams: Vec<(u32, u32)>,
}

impl GridBuilder {
    pub(crate) fn add_grid(&mut self, rings: &[Vec<Vec3>]) {
        let Some(width) = rings.first().map(Vec::len) else {
            return;
        };
        debug_assert!(rings.iter().all(|r| r.len() == width));
        let offset = self.positions.len() as u32;
        let w = width as u32;
        for ring in rings {
            self.positions.extend_from_slice(ring);
        }
        for r in 0..rings.len().saturating_sub(1) as u32 {
            for j in 0..w.saturating_sub(1) {
                let a = offset + r * w + j;
                let b = offset + (r + 1) * w + j;
                self.faces.push([a, a + 1, b + 1, b]);
            }
        }
        for j in 0..w.saturating_sub(1) {
            self.seams.push((offset + j, offset + j + 1));
        }
    }

    pub(crate) fn build(self) -> Result<PolyMesh> {
        let mut mesh = PolyMesh::new(self.positions, self.faces)?;
        for (a, b) in self.seams {
            mesh.set_seam(a, b, true);
        }
        Ok(mesh)
    }
}
