use glam::{Mat4, Vec3};

use super::{GridBuilder, MAX_RESOLUTION};
use crate::error::{HairError, Result};
use crate::mesh::PolyMesh;

pub const MIN_ORDER: u32 = 2;
pub const MAX_ORDER: u32 = 6;

/// A rational tensor product B-spline surface with clamped uniform knots.
/// Control points are stored row by row, `u` varying fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceSource {
    pub points: Vec<Vec3>,
    pub weights: Option<Vec<f32>>,
    pub count_u: u32,
    pub count_v: u32,
    pub order_u: u32,
    pub order_v: u32,
    pub resolution_u: u32,
    pub resolution_v: u32,
    pub transform: Mat4,
}

impl SurfaceSource {
    pub fn new(points: Vec<Vec3>, count_u: u32, count_v: u32) -> Self {
        Self {
            points,
            weights: None,
            count_u,
            count_v,
            order_u: count_u.clamp(MIN_ORDER, 4),
            order_v: count_v.clamp(MIN_ORDER, 4),
            resolution_u: 4,
            resolution_v: 4,
            transform: Mat4::IDENTITY,
        }
    }

    fn validate(&self) -> Result<()> {
        let fail = |reason: String| Err(HairError::UnsupportedSourceShape(reason));
        for (name, count, order, resolution) in [
            ("u", self.count_u, self.order_u, self.resolution_u),
            ("v", self.count_v, self.order_v, self.resolution_v),
        ] {
            if !(MIN_ORDER..=MAX_ORDER).contains(&order) {
                return fail(format!("surface order {name} must be in {MIN_ORDER}..={MAX_ORDER}, got {order}"));
            }
            if count < order {
                return fail(format!("surface has {count} points in {name}, order {order} needs more"));
            }
            if !(1..=MAX_RESOLUTION).contains(&resolution) {
                return fail(format!(
                    "surface resolution {name} must be in 1..={MAX_RESOLUTION}, got {resolution}"
                ));
            }
        }
        let expected = self.count_u as u64 * self.count_v as u64;
        if self.points.len() as u64 != expected {
            return fail(format!("surface has {} control points, expected {expected}", self.points.len()));
        }
        if let Some(weights) = &self.weights {
            if weights.len() as u64 != expected || weights.iter().any(|&w| !(w > 0.)) {
                return fail("surface weights must be positive, one per control point".into());
            }
        }
        Ok(())
    }

    fn weight(&self, i: usize) -> f32 {
        self.weights.as_ref().map(|w| w[i]).unwrap_or(1.)
    }

    /// Samples the surface on a grid and marks the `v = 0` boundary, so
    /// strands run along `v`.
    pub fn tessellate(&self) -> Result<PolyMesh> {
        self.validate()?;
        let basis_u = sampled_basis(self.count_u, self.order_u, self.resolution_u);
        let basis_v = sampled_basis(self.count_v, self.order_v, self.resolution_v);
        let nu = self.count_u as usize;

        let rings: Vec<Vec<Vec3>> = basis_v
            .iter()
            .map(|bv| {
                basis_u
                    .iter()
                    .map(|bu| {
                        let mut sum = Vec3::ZERO;
                        let mut total_weight = 0.;
                        for (j, &wv) in bv.iter().enumerate().filter(|(_, &w)| w != 0.) {
                            for (i, &wu) in bu.iter().enumerate().filter(|(_, &w)| w != 0.) {
                                let id = j * nu + i;
                                let w = wu * wv * self.weight(id);
                                sum += w * self.points[id];
                                total_weight += w;
                            }
                        }
                        if total_weight > 0. {
                            sum / total_weight
                        } else {
                            sum
                        }
                    })
                    .collect()
            })
            .collect();

        let mut grid = GridBuilder::default();
        grid.add_grid(&rings);
        grid.build()
    }
}

/// Clamped uniform knot vector of `count + order` knots.
fn clamped_knots(count: u32, order: u32) -> Vec<f32> {
    let segments = count - order + 1;
    (0..count + order)
        .map(|i| i.saturating_sub(order - 1).min(segments) as f32)
        .collect()
}

/// Cox-de Boor basis of every control point at `t`.
fn basis(knots: &[f32], count: usize, order: usize, t: f32) -> Vec<f32> {
    let end = knots[count];
    let mut n: Vec<f32> = (0..count + order - 1)
        .map(|i| {
            let inside = knots[i] <= t && t < knots[i + 1];
            // the end of the domain belongs to the last non empty span
            let at_end = t >= end && knots[i] < knots[i + 1] && knots[i + 1] == end;
            if inside || at_end {
                1.
            } else {
                0.
            }
        })
        .collect();
    for k in 2..=order {
        for i in 0..count + order - k {
            let left = knots[i + k - 1] - knots[i];
            let right = knots[i + k] - knots[i + 1];
            let mut value = 0.;
            if left > 0. {
                value += (t - knots[i]) / left * n[i];
            }
            if right > 0. {
                value += (knots[i + k] - t) / right * n[i + 1];
            }
            n[i] = value;
        }
    }
    n.truncate(count);
    n
}

/// Basis values at `resolution * segments + 1` evenly spaced parameters.
fn sampled_basis(count: u32, order: u32, resolution: u32) -> Vec<Vec<f32>> {
    let knots = clamped_knots(count, order);
    let segments = (count - order + 1) as usize;
    let samples = resolution as usize * segments + 1;
    (0..samples)
        .map(|s| {
            let t = segments as f32 * s as f32 / (samples - 1) as f32;
            basis(&knots, count as usize, order as usize, t)
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mesh::walk_marked_loops;
    use approx::assert_relative_eq;

    fn plane(count_u: u32, count_v: u32) -> SurfaceSource {
        let points = (0..count_v)
            .flat_map(|v| (0..count_u).map(move |u| Vec3::new(u as f32, v as f32, 0.)))
            .collect();
        SurfaceSource::new(points, count_u, count_v)
    }

    #[test]
    fn knots_are_clamped() {
        assert_eq!(clamped_knots(5, 3), [0., 0., 0., 1., 2., 3., 3., 3.]);
    }

    #[test]
    fn basis_is_a_partition_of_unity() {
        let knots = clamped_knots(6, 4);
        for s in 0..=30 {
            let t = 3. * s as f32 / 30.;
            let b = basis(&knots, 6, 4, t);
            assert_eq!(b.len(), 6);
            assert_relative_eq!(b.iter().sum::<f32>(), 1., epsilon = 1e-5);
        }
        let end = basis(&knots, 6, 4, 3.);
        assert_relative_eq!(end[5], 1., epsilon = 1e-6);
    }

    #[test]
    fn surface_interpolates_corners() {
        let mut surface = plane(4, 5);
        surface.resolution_u = 2;
        surface.resolution_v = 3;
        let mesh = surface.tessellate().unwrap();
        // one segment in u, two in v
        assert_eq!(mesh.vertex_count(), 3 * 7);
        assert_relative_eq!(mesh.position(0).distance(Vec3::ZERO), 0.);
        assert_relative_eq!(mesh.position(20).distance(Vec3::new(3., 4., 0.)), 0., epsilon = 1e-5);

        let strands = walk_marked_loops(&mesh);
        assert_eq!(strands.len(), 2);
        assert!(strands.iter().all(|s| s.len() == 7));
    }

    #[test]
    fn weights_pull_towards_control_points() {
        let mut surface = plane(3, 3);
        surface.order_u = 3;
        surface.order_v = 3;
        surface.resolution_u = 2;
        surface.resolution_v = 2;
        surface.points[4].z = 1.;
        let plain = surface.tessellate().unwrap();
        let mut weights = vec![1.; 9];
        weights[4] = 4.;
        surface.weights = Some(weights);
        let weighted = surface.tessellate().unwrap();
        // center sample of the 3x3 grid
        assert!(weighted.position(4).z > plain.position(4).z);
    }

    #[test]
    fn rejects_bad_surfaces() {
        let mut surface = plane(3, 3);
        surface.order_u = 4;
        assert!(matches!(surface.tessellate(), Err(HairError::UnsupportedSourceShape(_))));

        let mut surface = plane(3, 3);
        surface.resolution_v = 0;
        assert!(matches!(surface.tessellate(), Err(HairError::UnsupportedSourceShape(_))));

        let mut surface = plane(3, 3);
        surface.points.pop();
        assert!(matches!(surface.tessellate(), Err(HairError::UnsupportedSourceShape(_))));
    }

    #[test]
    fn huge_resolutions_are_rejected() {
        let mut surface = plane(2, 2);
        surface.resolution_u = u32::MAX;
        assert!(matches!(surface.tessellate(), Err(HairError::UnsupportedSourceShape(_))));

        let mut surface = plane(2, 2);
        surface.resolution_v = MAX_RESOLUTION + 1;
        assert!(matches!(surface.tessellate(), Err(HairError::UnsupportedSourceShape(_))));
    }
}
