use std::collections::HashSet;

use tracing::{debug, warn};

use super::PolyMesh;

/// The two ends of one edge crossed by a strand, and the face it was
/// reached from. `side_a` vertices of consecutive pairs lie on the same
/// side of the ribbon.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EdgePair {
    pub side_a: u32,
    pub side_b: u32,
    pub face: u32,
}

/// Walks every marked boundary edge across its quad strip.
///
/// A walk starts on a seam edge with a single linking face, jumps to the
/// opposite edge of the face (`next.next`), crosses it into the neighbour
/// face and repeats until it reaches an edge which is not shared by exactly
/// two faces.
///
/// Every marked boundary edge roots its own strand, whatever the order of
/// the faces: a strip marked at both ends yields one strand from each end.
/// A walk reaching an edge it already crossed stops there.
pub fn walk_marked_loops(mesh: &PolyMesh) -> Vec<Vec<EdgePair>> {
    let mut strands = Vec::new();

    for root_edge in mesh.seam_edges() {
        if mesh.edge_link_count(root_edge) != 1 {
            continue;
        }
        let mut crossed = HashSet::from([root_edge]);

        let mut current = mesh.edge(root_edge).loops[0];
        let corner = *mesh.get_loop(current);
        let mut pairs = vec![EdgePair {
            side_a: mesh.other_vert(corner.edge, corner.vert),
            side_b: corner.vert,
            face: corner.face,
        }];

        loop {
            current = mesh.loop_next(mesh.loop_next(current));
            let corner = *mesh.get_loop(current);
            if !crossed.insert(corner.edge) {
                warn!(root_edge, "strand loops back onto itself, stopping");
                break;
            }
            pairs.push(EdgePair {
                side_a: corner.vert,
                side_b: mesh.other_vert(corner.edge, corner.vert),
                face: corner.face,
            });
            match mesh.other_link_loop(current) {
                Some(next) => current = next,
                None => break,
            }
        }

        debug!(root_edge, steps = pairs.len(), "walked marked strand");
        strands.push(pairs);
    }
    strands
}
