//! Conversions between strands or fibers and plain poly line meshes.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::error::{HairError, Result};
use crate::fibers::FiberBuffer;
use crate::strands::{accumulate_arc_length, resample_uniform, Step, StrandBatch, StrandPath};

/// Vertices joined by edges, without faces.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolylineMesh {
    pub vertices: Vec<Vec3>,
    pub edges: Vec<[u32; 2]>,
}

impl PolylineMesh {
    /// One open chain per item, in order.
    pub fn from_chains<'a>(chains: impl IntoIterator<Item = &'a [Vec3]>) -> Self {
        let mut mesh = PolylineMesh::default();
        for chain in chains {
            let offset = mesh.vertices.len() as u32;
            mesh.vertices.extend_from_slice(chain);
            for i in 1..chain.len() as u32 {
                mesh.edges.push([offset + i - 1, offset + i]);
            }
        }
        mesh
    }

    /// Vertex chains, each read from its lowest index end.
    pub fn chains(&self) -> Result<Vec<Vec<u32>>> {
        let n = self.vertices.len();
        let mut neighbours = vec![SmallVec::<[u32; 2]>::new(); n];
        for &[a, b] in &self.edges {
            if a as usize >= n || b as usize >= n {
                return Err(HairError::InvalidMesh(format!(
                    "edge {a}-{b} is out of range, the mesh has {n} vertices"
                )));
            }
            if a == b {
                return Err(HairError::InvalidMesh(format!("edge {a}-{b} is degenerate")));
            }
            neighbours[a as usize].push(b);
            neighbours[b as usize].push(a);
        }
        if let Some(v) = neighbours.iter().position(|x| x.len() > 2) {
            return Err(HairError::InvalidMesh(format!(
                "vertex {v} joins {} edges, poly lines cannot branch",
                neighbours[v].len()
            )));
        }

        let mut visited = vec![false; n];
        let mut chains = Vec::new();
        for start in 0..n {
            if visited[start] || neighbours[start].len() != 1 {
                continue;
            }
            let mut chain = vec![start as u32];
            visited[start] = true;
            let mut previous = start as u32;
            let mut current = neighbours[start][0];
            loop {
                chain.push(current);
                visited[current as usize] = true;
                match neighbours[current as usize].iter().find(|&&x| x != previous) {
                    Some(&next) => {
                        previous = current;
                        current = next;
                    }
                    None => break,
                }
            }
            chains.push(chain);
        }
        if let Some(v) = (0..n).find(|&v| !visited[v] && !neighbours[v].is_empty()) {
            return Err(HairError::InvalidMesh(format!(
                "vertex {v} lies on a closed poly line"
            )));
        }
        Ok(chains)
    }

    /// Turns every chain into a guide strand of `hair_steps` evenly spaced
    /// steps with a single fiber. The strands carry no ribbon width.
    pub fn to_strand_batch(&self, hair_steps: usize, max_fibers: usize) -> Result<StrandBatch> {
        let chains = self.chains()?;
        debug!(chains = chains.len(), hair_steps, "converting poly lines to strands");
        let paths = chains.into_iter().map(|chain| {
            let mut steps: Vec<Step> = chain
                .iter()
                .map(|&v| Step {
                    position: self.vertices[v as usize],
                    ..Default::default()
                })
                .collect();
            accumulate_arc_length(&mut steps);
            (resample_uniform(StrandPath::new(&steps), hair_steps), 1)
        });
        StrandBatch::from_paths(paths, max_fibers)
    }
}

impl FiberBuffer {
    pub fn to_polylines(&self) -> PolylineMesh {
        PolylineMesh::from_chains(self.fibers())
    }
}

impl StrandBatch {
    /// The center lines of the guides.
    pub fn to_polylines(&self) -> PolylineMesh {
        let centers: Vec<Vec<Vec3>> = (0..self.strand_count())
            .map(|i| self.path(i).steps().iter().map(|s| s.position).collect())
            .collect();
        PolylineMesh::from_chains(centers.iter().map(Vec::as_slice))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fibers::{synthesize, RandomizationParams};
    use crate::strands::DEFAULT_MAX_FIBERS;
    use approx::assert_relative_eq;

    #[test]
    fn chains_start_at_lowest_end() {
        let mesh = PolylineMesh {
            vertices: vec![Vec3::ZERO; 5],
            edges: vec![[3, 1], [1, 4], [0, 2]],
        };
        assert_eq!(mesh.chains().unwrap(), vec![vec![0, 2], vec![3, 1, 4]]);
    }

    #[test]
    fn rejects_branches_and_loops() {
        let branch = PolylineMesh {
            vertices: vec![Vec3::ZERO; 4],
            edges: vec![[0, 1], [1, 2], [1, 3]],
        };
        assert!(matches!(branch.chains(), Err(HairError::InvalidMesh(_))));
        let cycle = PolylineMesh {
            vertices: vec![Vec3::ZERO; 3],
            edges: vec![[0, 1], [1, 2], [2, 0]],
        };
        assert!(matches!(cycle.chains(), Err(HairError::InvalidMesh(_))));
    }

    #[test]
    fn fibers_survive_a_round_trip() {
        let mut path: Vec<Step> = (0..5)
            .map(|i| Step::across(Vec3::new(0., 0., i as f32), Vec3::new(1., 0., i as f32), Vec3::Y))
            .collect();
        accumulate_arc_length(&mut path);
        let batch = StrandBatch::from_paths([(path, 3)], DEFAULT_MAX_FIBERS).unwrap();
        let fibers = synthesize(&batch, &RandomizationParams::default(), 1).unwrap();

        let polylines = fibers.to_polylines();
        assert_eq!(polylines.vertices.len(), 15);
        assert_eq!(polylines.edges.len(), 12);

        let back = polylines.to_strand_batch(5, DEFAULT_MAX_FIBERS).unwrap();
        assert_eq!(back.strand_count(), 3);
        assert_eq!(back.total_fibers(), 3);
        for k in 0..3 {
            for (v, step) in back.path(k).steps().iter().enumerate() {
                assert_relative_eq!(step.position.distance(fibers[(k, v)]), 0., epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn guides_become_center_lines() {
        let mut path: Vec<Step> = (0..3)
            .map(|i| Step::across(Vec3::new(0., i as f32, 0.), Vec3::new(2., i as f32, 0.), Vec3::Z))
            .collect();
        accumulate_arc_length(&mut path);
        let batch = StrandBatch::from_paths([(path, 1)], DEFAULT_MAX_FIBERS).unwrap();
        let lines = batch.to_polylines();
        assert_eq!(lines.vertices[2], Vec3::new(1., 2., 0.));
        assert_eq!(lines.edges, vec![[0, 1], [1, 2]]);
    }
}
