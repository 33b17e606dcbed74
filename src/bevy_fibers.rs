use bevy::asset::RenderAssetUsages;
use bevy::prelude::Mesh;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use strand_core::{Groom, HairPipelinePhase, PolylineMesh};

/// Line list mesh of every fiber, shaded from dark roots to light tips.
pub struct BevyLines(pub Mesh);

impl HairPipelinePhase for BevyLines {
    type Previous = Groom;
    type Config = ();
    type Builder = ();
    fn generate_from(prev: Self::Previous, _: &Self::Config, _: &mut Self::Builder) -> strand_core::Result<Self> {
        let steps = prev.fibers.hair_steps().max(2);
        let colors: Vec<[f32; 4]> = (0..prev.fibers.positions().len())
            .map(|i| {
                let t = (i % steps) as f32 / (steps - 1) as f32;
                [0.25 + 0.6 * t, 0.15 + 0.45 * t, 0.05 + 0.25 * t, 1.]
            })
            .collect();
        let mut mesh = polyline_mesh(&prev.fibers.to_polylines());
        mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colors);
        Ok(BevyLines(mesh))
    }
}

pub fn polyline_mesh(lines: &PolylineMesh) -> Mesh {
    let indices: Vec<u32> = lines.edges.iter().flatten().copied().collect();
    Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, lines.vertices.clone())
        .with_inserted_indices(Indices::U32(indices))
}
