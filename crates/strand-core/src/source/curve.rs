use glam::{Mat4, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::{GridBuilder, MAX_RESOLUTION};
use crate::error::{HairError, Result};
use crate::mesh::PolyMesh;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandleType {
    Free,
    Aligned,
    #[default]
    Auto,
    /// Corner handle, pointing at the neighbouring control point.
    Vector,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplineKind {
    Poly,
    #[default]
    Bezier,
    Nurbs,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub co: Vec3,
    pub handle_left: Vec3,
    pub handle_right: Vec3,
    pub left_type: HandleType,
    pub right_type: HandleType,
}

impl ControlPoint {
    /// A point whose handles are computed from its neighbours.
    pub fn auto(co: Vec3) -> Self {
        Self {
            co,
            handle_left: co,
            handle_right: co,
            left_type: HandleType::Auto,
            right_type: HandleType::Auto,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Spline {
    pub kind: SplineKind,
    pub points: Vec<ControlPoint>,
    /// Samples per segment, `None` uses the resolution of the curve.
    pub resolution: Option<u32>,
    pub cyclic: bool,
}

/// A curve object with a cross section given by `extrude` and an optional
/// round bevel.
#[derive(Clone, Debug, PartialEq)]
pub struct CurveSource {
    pub splines: Vec<Spline>,
    pub resolution: u32,
    pub extrude: f32,
    pub bevel_depth: f32,
    pub bevel_resolution: u32,
    pub transform: Mat4,
}

impl Default for CurveSource {
    fn default() -> Self {
        Self {
            splines: Vec::new(),
            resolution: 12,
            extrude: 0.,
            bevel_depth: 0.,
            bevel_resolution: 0,
            transform: Mat4::IDENTITY,
        }
    }
}

fn unsupported(reason: impl Into<String>) -> HairError {
    HairError::UnsupportedSourceShape(reason.into())
}

fn cubic_bezier(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let s = 1. - t;
    s * s * s * p0 + 3. * s * s * t * p1 + 3. * s * t * t * p2 + t * t * t * p3
}

impl CurveSource {
    /// Cross section in the `(side, up)` plane of the curve frame: a half
    /// stadium of radius `bevel_depth` stretched by `extrude`, or a straight
    /// segment when there is no bevel.
    pub fn profile(&self) -> Result<Vec<Vec2>> {
        let (e, b) = (self.extrude, self.bevel_depth);
        if !(e >= 0. && b >= 0.) || !(e.is_finite() && b.is_finite()) {
            return Err(unsupported(format!(
                "extrude ({e}) and bevel depth ({b}) must be non negative"
            )));
        }
        if e == 0. && b == 0. {
            return Err(unsupported("curve has no extrusion nor bevel"));
        }
        if b == 0. {
            return Ok(vec![Vec2::new(0., -e), Vec2::new(0., e)]);
        }

        if self.bevel_resolution > MAX_RESOLUTION {
            return Err(unsupported(format!(
                "bevel resolution must be at most {MAX_RESOLUTION}, got {}",
                self.bevel_resolution
            )));
        }
        let quarter = self.bevel_resolution + 1;
        let mut profile = Vec::with_capacity(2 * quarter as usize + 2);
        let arc = |center: f32, angle: f32| Vec2::new(b * angle.cos(), center + b * angle.sin());
        for k in 0..=quarter {
            let angle = -std::f32::consts::FRAC_PI_2 * (1. - k as f32 / quarter as f32);
            profile.push(arc(-e, angle));
        }
        let first_upper = if e > 0. { 0 } else { 1 };
        for k in first_upper..=quarter {
            let angle = std::f32::consts::FRAC_PI_2 * k as f32 / quarter as f32;
            profile.push(arc(e, angle));
        }
        Ok(profile)
    }

    /// Points along the center line of a spline.
    pub fn center_line(&self, spline: &Spline) -> Result<Vec<Vec3>> {
        let n = spline.points.len();
        if n < 2 {
            return Err(unsupported(format!("spline has {n} points, at least 2 are required")));
        }
        let resolution = spline.resolution.unwrap_or(self.resolution);
        if !(1..=MAX_RESOLUTION).contains(&resolution) {
            return Err(unsupported(format!(
                "curve resolution must be in 1..={MAX_RESOLUTION}, got {resolution}"
            )));
        }

        match spline.kind {
            SplineKind::Nurbs => Err(unsupported("nurbs curve splines are not supported")),
            SplineKind::Poly => {
                let mut line: Vec<Vec3> = spline.points.iter().map(|p| p.co).collect();
                if spline.cyclic {
                    line.push(line[0]);
                }
                Ok(line)
            }
            SplineKind::Bezier => {
                let has_corner = spline.points.iter().any(|p| {
                    p.left_type == HandleType::Vector || p.right_type == HandleType::Vector
                });
                if has_corner {
                    return Err(unsupported("vector handles make corners in the ribbon"));
                }
                let points = resolve_handles(&spline.points, spline.cyclic);
                let segments = if spline.cyclic { n } else { n - 1 };
                let mut line = Vec::with_capacity(segments * resolution as usize + 1);
                for i in 0..segments {
                    let (a, b) = (&points[i], &points[(i + 1) % n]);
                    for s in 0..resolution {
                        let t = s as f32 / resolution as f32;
                        line.push(cubic_bezier(a.co, a.handle_right, b.handle_left, b.co, t));
                    }
                }
                line.push(points[segments % n].co);
                Ok(line)
            }
        }
    }

    /// Tessellates every spline into a ribbon mesh whose root cross section
    /// is marked. Each segment of the profile becomes one strand.
    pub fn tessellate(&self) -> Result<PolyMesh> {
        if self.splines.is_empty() {
            return Err(unsupported("curve has no spline"));
        }
        let profile = self.profile()?;
        let mut grid = GridBuilder::default();
        for spline in &self.splines {
            let line = self.center_line(spline)?;
            let rings: Vec<Vec<Vec3>> = frames(&line)
                .into_iter()
                .zip(&line)
                .map(|((side, up), &center)| {
                    profile
                        .iter()
                        .map(|p| center + side * p.x + up * p.y)
                        .collect()
                })
                .collect();
            grid.add_grid(&rings);
        }
        grid.build()
    }
}

/// Replaces `Auto` handles by handles a third of the way to the
/// neighbours, along the direction joining them.
fn resolve_handles(points: &[ControlPoint], cyclic: bool) -> Vec<ControlPoint> {
    let n = points.len();
    let neighbour = |i: usize, offset: isize| -> Option<Vec3> {
        let j = i as isize + offset;
        if (0..n as isize).contains(&j) {
            Some(points[j as usize].co)
        } else if cyclic {
            Some(points[j.rem_euclid(n as isize) as usize].co)
        } else {
            None
        }
    };
    (0..n)
        .map(|i| {
            let mut p = points[i];
            let prev = neighbour(i, -1);
            let next = neighbour(i, 1);
            let direction = (next.unwrap_or(p.co) - prev.unwrap_or(p.co)).normalize_or_zero();
            if p.left_type == HandleType::Auto {
                let reach = prev.map(|q| (p.co - q).length()).unwrap_or(0.);
                p.handle_left = p.co - direction * reach / 3.;
            }
            if p.right_type == HandleType::Auto {
                let reach = next.map(|q| (q - p.co).length()).unwrap_or(0.);
                p.handle_right = p.co + direction * reach / 3.;
            }
            p
        })
        .collect()
}

/// Parallel transported `(side, up)` frames along a poly line.
fn frames(line: &[Vec3]) -> Vec<(Vec3, Vec3)> {
    let n = line.len();
    let mut tangents = Vec::with_capacity(n);
    for i in 0..n {
        let a = line[i.saturating_sub(1)];
        let b = line[(i + 1).min(n - 1)];
        let t = (b - a).normalize_or_zero();
        tangents.push(if t == Vec3::ZERO {
            tangents.last().copied().unwrap_or(Vec3::Y)
        } else {
            t
        });
    }

    let mut up = if tangents[0].dot(Vec3::Z).abs() < 0.999 {
        Vec3::Z
    } else {
        Vec3::X
    };
    let mut result = Vec::with_capacity(n);
    let mut previous = tangents[0];
    for &t in &tangents {
        up = Quat::from_rotation_arc(previous, t) * up;
        up = (up - up.dot(t) * t).normalize_or_zero();
        result.push((t.cross(up), up));
        previous = t;
    }
    result
}
