use approx::assert_relative_eq;
use glam::{Mat4, Vec3};
use rand::{rngs::StdRng, SeedableRng};

use strand_core::source::{ControlPoint, Spline, SplineKind};
use strand_core::{
    extract_strands, synthesize, CurveSource, ExtractConfig, FiberBuffer, Groom, Grow, HairError,
    MeshSource, OffsetRandom, PolyMesh, RandomizationParams, SourceShape, StrandBatch, SurfaceSource,
};

/// A quad strip whose center line runs through `centers`, `width` wide along x.
/// The first edge is marked.
fn strip_through(centers: &[Vec3], width: f32) -> PolyMesh {
    let half = Vec3::new(0.5 * width, 0., 0.);
    let positions: Vec<Vec3> = centers.iter().flat_map(|&c| [c - half, c + half]).collect();
    let faces: Vec<[u32; 4]> = (0..centers.len() as u32 - 1)
        .map(|i| [2 * i, 2 * i + 1, 2 * i + 3, 2 * i + 2])
        .collect();
    let mut mesh = PolyMesh::new(positions, faces).unwrap();
    mesh.set_seam(0, 1, true);
    mesh
}

fn bent_centers(n: usize, x: f32) -> Vec<Vec3> {
    (0..n)
        .map(|i| {
            let t = i as f32;
            Vec3::new(x + (0.3 * t).sin(), t, 0.1 * t * t)
        })
        .collect()
}

fn noisy_params() -> RandomizationParams {
    RandomizationParams {
        tangent: OffsetRandom {
            at_root: 0.1,
            uniform: 0.02,
            towards_tip: 0.2,
            couple_tip_to_root: false,
        },
        normal: OffsetRandom {
            at_root: 0.05,
            uniform: 0.01,
            towards_tip: 0.3,
            couple_tip_to_root: true,
        },
        length_random: 0.2,
    }
}

#[test]
fn single_fiber_reproduces_the_guide_center_line() {
    let centers = bent_centers(5, 0.);
    let sources = vec![SourceShape::Mesh(MeshSource::new(strip_through(&centers, 0.4)))];
    let config = ExtractConfig {
        spacing: 10.,
        ..Default::default()
    };
    let batch = extract_strands(&sources, &config).unwrap();
    assert_eq!(batch.hair_steps(), 5);
    assert_eq!(batch.total_fibers(), 1);

    let fibers = synthesize(&batch, &RandomizationParams::default(), 0).unwrap();
    for (v, center) in centers.iter().enumerate() {
        assert_relative_eq!(fibers[(0, v)].distance(*center), 0., epsilon = 1e-5);
    }
    assert_eq!(fibers.root(0), fibers[(0, 0)]);
}

#[test]
fn inconsistent_strands_produce_nothing() {
    let sources = vec![
        SourceShape::Mesh(MeshSource::new(strip_through(&bent_centers(4, 0.), 1.))),
        SourceShape::Mesh(MeshSource::new(strip_through(&bent_centers(5, 3.), 1.))),
    ];
    let mut destination = FiberBuffer::new(2, 4);
    let before = destination.clone();
    let result = sources
        .grow::<StrandBatch>(&ExtractConfig::default(), &mut ())
        .and_then(|batch| batch.grow::<Groom>(&RandomizationParams::default(), &mut StdRng::seed_from_u64(0)));
    match result {
        Ok(groom) => groom.fibers.publish_into(&mut destination),
        Err(e) => assert_eq!(e, HairError::InconsistentStrandLength { expected: 4, found: 5 }),
    }
    assert_eq!(destination, before);
}

#[test]
fn fiber_ceiling_counts_every_strand() {
    // 1.0 / 0.0002 = 5000 fibers for the first strip, 5001 for the second
    let sources = vec![
        SourceShape::Mesh(MeshSource::new(strip_through(&bent_centers(3, 0.), 1.))),
        SourceShape::Mesh(MeshSource::new(strip_through(&bent_centers(3, 3.), 1.0002))),
    ];
    let config = ExtractConfig {
        spacing: 0.0002,
        ..Default::default()
    };
    assert_eq!(
        extract_strands(&sources, &config).unwrap_err(),
        HairError::FiberCountExceeded {
            requested: 10001,
            limit: 10000
        }
    );
}

#[test]
fn generation_is_deterministic() {
    let sources = vec![SourceShape::Mesh(MeshSource::new(strip_through(&bent_centers(6, 0.), 2.)))];
    let config = ExtractConfig {
        spacing: 0.1,
        ..Default::default()
    };
    let batch = extract_strands(&sources, &config).unwrap();
    assert_eq!(batch.total_fibers(), 20);
    let a = synthesize(&batch, &noisy_params(), 9).unwrap();
    let b = synthesize(&batch, &noisy_params(), 9).unwrap();
    assert_eq!(a, b);
    let c = synthesize(&batch, &noisy_params(), 10).unwrap();
    assert_ne!(a, c);
}

#[test]
fn curves_and_surfaces_share_one_batch() {
    let curve = CurveSource {
        splines: vec![Spline {
            kind: SplineKind::Poly,
            points: (0..4).map(|i| ControlPoint::auto(Vec3::new(5., i as f32, 0.))).collect(),
            resolution: None,
            cyclic: false,
        }],
        extrude: 0.5,
        transform: Mat4::from_translation(Vec3::new(0., 0., 1.)),
        ..Default::default()
    };
    let grid: Vec<Vec3> = (0..4)
        .flat_map(|v| (0..2).map(move |u| Vec3::new(u as f32, v as f32, 0.)))
        .collect();
    let mut surface = SurfaceSource::new(grid, 2, 4);
    surface.resolution_u = 2;
    surface.resolution_v = 3;

    let sources = vec![SourceShape::Curve(curve), SourceShape::Surface(surface)];
    let config = ExtractConfig {
        spacing: 0.25,
        ..Default::default()
    };
    let groom: Groom = sources
        .grow::<StrandBatch>(&config, &mut ())
        .and_then(|batch| batch.grow::<Groom>(&noisy_params(), &mut StdRng::seed_from_u64(1)))
        .unwrap();

    assert_eq!(groom.guides.hair_steps(), 4);
    assert_eq!(groom.guides.strand_count(), 3);
    // curve ribbon is 1.0 wide, both surface columns are 0.5 wide
    let counts: Vec<usize> = groom.guides.spawn_specs().map(|s| s.fiber_count).collect();
    assert_eq!(counts, [4, 2, 2]);
    assert_eq!(groom.fibers.fiber_count(), 8);
    assert_relative_eq!(groom.guides.path(0).steps()[0].position.z, 1.);
}
