//! A small scene with one source of every kind. All of them produce strands
//! of `DEMO_STEPS` steps, so they can be extracted together.

use bevy::math::{Mat4, Vec3};
use strand_core::source::{ControlPoint, Spline, SplineKind};
use strand_core::{CurveSource, MeshSource, PolyMesh, Result, SourceShape, SurfaceSource};

pub const DEMO_STEPS: usize = 9;

/// A wavy quad strip two faces wide, marked along its bottom row.
pub fn scalp_strip() -> Result<PolyMesh> {
    let (rows, columns) = (DEMO_STEPS as u32, 3);
    let positions: Vec<Vec3> = (0..rows)
        .flat_map(|r| {
            let z = 0.5 * r as f32;
            (0..columns).map(move |j| Vec3::new(0.25 * j as f32 + 0.2 * z.sin(), 0., z))
        })
        .collect();
    let faces: Vec<[u32; 4]> = (0..rows - 1)
        .flat_map(|r| {
            (0..columns - 1).map(move |j| {
                let a = r * columns + j;
                let b = a + columns;
                [a, a + 1, b + 1, b]
            })
        })
        .collect();
    let mut mesh = PolyMesh::new(positions, faces)?;
    for j in 0..columns - 1 {
        mesh.set_seam(j, j + 1, true);
    }
    Ok(mesh)
}

pub fn beveled_lock() -> CurveSource {
    CurveSource {
        splines: vec![Spline {
            kind: SplineKind::Bezier,
            points: vec![
                ControlPoint::auto(Vec3::ZERO),
                ControlPoint::auto(Vec3::new(0.6, 0., 2.)),
                ControlPoint::auto(Vec3::new(0., 0.3, 4.)),
            ],
            resolution: Some(4),
            cyclic: false,
        }],
        extrude: 0.2,
        bevel_depth: 0.15,
        bevel_resolution: 1,
        ..Default::default()
    }
}

pub fn swept_patch() -> SurfaceSource {
    let points = (0..3)
        .flat_map(|v| {
            (0..3).map(move |u| {
                let bulge = if u == 1 { 0.4 } else { 0. };
                Vec3::new(0.6 * u as f32, bulge + 0.2 * v as f32, 2. * v as f32)
            })
        })
        .collect();
    let mut surface = SurfaceSource::new(points, 3, 3);
    surface.weights = Some(vec![1., 2., 1., 1., 2., 1., 1., 1., 1.]);
    surface.resolution_u = 4;
    surface.resolution_v = (DEMO_STEPS - 1) as u32;
    surface
}

pub fn demo_sources() -> Result<Vec<SourceShape>> {
    Ok(vec![
        SourceShape::Mesh(
            MeshSource::new(scalp_strip()?).with_transform(Mat4::from_translation(Vec3::new(-3., 0., 0.))),
        ),
        SourceShape::Curve(beveled_lock()),
        SourceShape::Surface(SurfaceSource {
            transform: Mat4::from_translation(Vec3::new(3., 0., 0.)),
            ..swept_patch()
        }),
    ])
}
