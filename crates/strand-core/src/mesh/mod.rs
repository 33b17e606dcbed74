//! Polygon mesh with face-corner loops, the representation every source
//! shape is converted to before strands are walked.
//!
//! Each face of `n` corners owns `n` consecutive loops. Loop `i` of a face
//! sits on corner `i` and runs along the edge towards corner `i + 1`, so
//! `loop_next` never leaves the face. Edges are undirected and keep the
//! list of loops running along them: one loop for a boundary edge, two for
//! a manifold interior edge.

pub mod walker;

use std::collections::HashMap;

use glam::Vec3;
use smallvec::SmallVec;

use crate::error::{HairError, Result};

pub use walker::{walk_marked_loops, EdgePair};

#[derive(Copy, Clone, Debug)]
pub struct Face {
    pub first_loop: u32,
    pub len: u32,
    pub normal: Vec3,
}

#[derive(Copy, Clone, Debug)]
pub struct Loop {
    pub vert: u32,
    pub edge: u32,
    pub face: u32,
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub verts: [u32; 2],
    pub seam: bool,
    pub loops: SmallVec<[u32; 2]>,
}

#[derive(Clone, Debug, Default)]
pub struct PolyMesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    faces: Vec<Face>,
    loops: Vec<Loop>,
    edges: Vec<Edge>,
    edge_lookup: HashMap<(u32, u32), u32>,
}

fn edge_key(a: u32, b: u32) -> (u32, u32) {
    (a.min(b), a.max(b))
}

/// Newell's method, robust for non planar polygons.
fn polygon_normal(corners: impl Iterator<Item = Vec3> + Clone) -> Vec3 {
    let mut normal = Vec3::ZERO;
    let next = corners.clone().cycle().skip(1);
    for (a, b) in corners.zip(next) {
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

impl PolyMesh {
    pub fn new<F>(positions: Vec<Vec3>, faces: impl IntoIterator<Item = F>) -> Result<Self>
    where
        F: AsRef<[u32]>,
    {
        let mut mesh = PolyMesh {
            normals: vec![Vec3::ZERO; positions.len()],
            positions,
            ..Default::default()
        };
        for (face_id, corners) in faces.into_iter().enumerate() {
            mesh.add_face(face_id, corners.as_ref())?;
        }
        for n in mesh.normals.iter_mut() {
            *n = n.normalize_or_zero();
        }
        Ok(mesh)
    }

    fn add_face(&mut self, face_id: usize, corners: &[u32]) -> Result<()> {
        let n = corners.len();
        if n < 3 {
            return Err(HairError::InvalidMesh(format!(
                "face {face_id} has {n} corners, at least 3 are required"
            )));
        }
        for (i, &v) in corners.iter().enumerate() {
            if v as usize >= self.positions.len() {
                return Err(HairError::InvalidMesh(format!(
                    "face {face_id} references vertex {v}, the mesh has {} vertices",
                    self.positions.len()
                )));
            }
            if corners[..i].contains(&v) {
                return Err(HairError::InvalidMesh(format!(
                    "face {face_id} uses vertex {v} twice"
                )));
            }
        }

        let face = self.faces.len() as u32;
        let first_loop = self.loops.len() as u32;
        for i in 0..n {
            let (a, b) = (corners[i], corners[(i + 1) % n]);
            let loop_id = self.loops.len() as u32;
            let edge = self.edge_between_or_insert(a, b);
            self.edges[edge as usize].loops.push(loop_id);
            self.loops.push(Loop { vert: a, edge, face });
        }

        // area weighted: Newell's normal has the polygon area as magnitude
        let normal = polygon_normal(corners.iter().map(|&v| self.positions[v as usize]));
        for &v in corners {
            self.normals[v as usize] += normal;
        }
        self.faces.push(Face {
            first_loop,
            len: n as u32,
            normal: normal.normalize_or_zero(),
        });
        Ok(())
    }

    fn edge_between_or_insert(&mut self, a: u32, b: u32) -> u32 {
        let next_id = self.edges.len() as u32;
        let id = *self.edge_lookup.entry(edge_key(a, b)).or_insert(next_id);
        if id == next_id {
            self.edges.push(Edge {
                verts: [a, b],
                seam: false,
                loops: SmallVec::new(),
            });
        }
        id
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
    pub fn position(&self, v: u32) -> Vec3 {
        self.positions[v as usize]
    }
    pub fn vertex_normal(&self, v: u32) -> Vec3 {
        self.normals[v as usize]
    }
    pub fn face(&self, f: u32) -> &Face {
        &self.faces[f as usize]
    }
    pub fn edge(&self, e: u32) -> &Edge {
        &self.edges[e as usize]
    }
    pub fn get_loop(&self, l: u32) -> &Loop {
        &self.loops[l as usize]
    }

    pub fn edge_between(&self, a: u32, b: u32) -> Option<u32> {
        self.edge_lookup.get(&edge_key(a, b)).copied()
    }

    /// Marks the edge `a - b` as a seam. Returns `false` if there is no such edge.
    pub fn set_seam(&mut self, a: u32, b: u32, seam: bool) -> bool {
        match self.edge_between(a, b) {
            Some(e) => {
                self.edges[e as usize].seam = seam;
                true
            }
            None => false,
        }
    }

    pub fn is_seam(&self, e: u32) -> bool {
        self.edges[e as usize].seam
    }

    pub fn edge_link_count(&self, e: u32) -> usize {
        self.edges[e as usize].loops.len()
    }

    pub fn loop_next(&self, l: u32) -> u32 {
        let face = &self.faces[self.loops[l as usize].face as usize];
        let local = l - face.first_loop;
        face.first_loop + (local + 1) % face.len
    }

    /// The vertex of `e` which is not `v`.
    pub fn other_vert(&self, e: u32, v: u32) -> u32 {
        let [a, b] = self.edges[e as usize].verts;
        if a == v {
            b
        } else {
            a
        }
    }

    /// The loop on the other side of the edge of `l`, if that edge is
    /// shared by exactly two faces.
    pub fn other_link_loop(&self, l: u32) -> Option<u32> {
        match self.edges[self.loops[l as usize].edge as usize].loops.as_slice() {
            &[a, b] if a == l => Some(b),
            &[a, b] if b == l => Some(a),
            _ => None,
        }
    }

    pub fn seam_edges(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.edges.len() as u32).filter(|&e| self.edges[e as usize].seam)
    }
}
