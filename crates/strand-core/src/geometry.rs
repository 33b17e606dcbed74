use glam::{Mat3, Mat4, Vec3};

/// `(value - start) / (end - start)`, or 0 when the interval collapses.
pub fn safe_ratio(value: f32, start: f32, end: f32) -> f32 {
    let span = end - start;
    if span > 0. {
        (value - start) / span
    } else {
        0.
    }
}

/// Linear interpolation which returns `a` unchanged for `t == 0`
/// and `b` unchanged for `t == 1`.
pub fn lerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    if t <= 0. {
        a
    } else if t >= 1. {
        b
    } else {
        a + (b - a) * t
    }
}

pub fn midpoint(a: Vec3, b: Vec3) -> Vec3 {
    0.5 * (a + b)
}

/// Object to destination space for positions, directions and normals.
#[derive(Copy, Clone, Debug)]
pub struct SpaceTransform {
    matrix: Mat4,
    normal_matrix: Mat3,
}

impl SpaceTransform {
    pub fn new(matrix: Mat4) -> Self {
        let linear = Mat3::from_mat4(matrix);
        let normal_matrix = if linear.determinant().abs() > f32::EPSILON {
            linear.inverse().transpose()
        } else {
            linear
        };
        Self { matrix, normal_matrix }
    }

    pub fn point(&self, p: Vec3) -> Vec3 {
        self.matrix.transform_point3(p)
    }

    pub fn normal(&self, n: Vec3) -> Vec3 {
        self.normal_matrix * n
    }
}

impl Default for SpaceTransform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ratio_of_collapsed_interval_is_zero() {
        assert_eq!(safe_ratio(1., 1., 1.), 0.);
        assert_eq!(safe_ratio(2., 1., 3.), 0.5);
    }

    #[test]
    fn lerp_ends_are_exact() {
        let a = Vec3::new(0.1, 0.2, 0.3);
        let b = Vec3::new(7.7, -3.3, 1.9);
        assert_eq!(lerp(a, b, 0.), a);
        assert_eq!(lerp(a, b, 1.), b);
    }

    #[test]
    fn normals_follow_inverse_transpose() {
        let t = SpaceTransform::new(Mat4::from_scale(Vec3::new(2., 1., 1.)));
        let n = t.normal(Vec3::new(1., 1., 0.));
        assert_eq!(n, Vec3::new(0.5, 1., 0.));
        assert_eq!(t.point(Vec3::ONE), Vec3::new(2., 1., 1.));
    }
}
