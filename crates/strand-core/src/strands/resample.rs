use glam::Vec3;

use super::{accumulate_arc_length, Step, StrandPath};
use crate::geometry::{lerp, safe_ratio};

/// Attributes of a strand at an arbitrary arc length.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Sample {
    pub position: Vec3,
    pub tangent: Vec3,
    pub normal: Vec3,
}

impl From<&Step> for Sample {
    fn from(step: &Step) -> Self {
        Self {
            position: step.position,
            tangent: step.tangent,
            normal: step.normal,
        }
    }
}

/// Index of the first key which is not less than `target`.
pub fn lower_bound(keys: &[f32], target: f32) -> usize {
    keys.partition_point(|&k| k < target)
}

/// Linear interpolation of the step attributes at `arc_length`.
///
/// Nothing is extrapolated: targets at or before the root give the first
/// step, targets past the tip give the last one.
pub fn resample(path: StrandPath<'_>, arc_length: f32) -> Sample {
    let steps = path.steps();
    let Some(last) = steps.last() else {
        return Sample::default();
    };
    let i = steps.partition_point(|s| s.arc_length < arc_length);
    if i == 0 {
        return Sample::from(&steps[0]);
    }
    if i == steps.len() {
        return Sample::from(last);
    }
    let (a, b) = (&steps[i - 1], &steps[i]);
    let t = safe_ratio(arc_length, a.arc_length, b.arc_length);
    Sample {
        position: lerp(a.position, b.position, t),
        tangent: lerp(a.tangent, b.tangent, t),
        normal: lerp(a.normal, b.normal, t),
    }
}

/// `count` steps spread evenly along the arc length of `path`.
pub fn resample_uniform(path: StrandPath<'_>, count: usize) -> Vec<Step> {
    let total = path.total_length();
    let mut steps: Vec<Step> = (0..count)
        .map(|i| {
            let target = if count > 1 {
                total * i as f32 / (count - 1) as f32
            } else {
                0.
            };
            let sample = resample(path, target);
            Step {
                arc_length: 0.,
                position: sample.position,
                tangent: sample.tangent,
                normal: sample.normal,
            }
        })
        .collect();
    accumulate_arc_length(&mut steps);
    steps
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn line(lengths: &[f32]) -> Vec<Step> {
        lengths
            .iter()
            .map(|&l| Step {
                arc_length: l,
                position: Vec3::new(0., 0., l),
                tangent: Vec3::X * (1. + l),
                normal: Vec3::Y,
            })
            .collect()
    }

    #[test]
    fn lower_bound_on_degenerate_interval() {
        let keys = [0., 1., 1., 3.];
        assert_eq!(lower_bound(&keys, 1.), 1);
        assert_eq!(lower_bound(&keys, 0.), 0);
        assert_eq!(lower_bound(&keys, 2.), 3);
        assert_eq!(lower_bound(&keys, 4.), 4);
    }

    #[test]
    fn degenerate_interval_does_not_divide_by_zero() {
        let steps = line(&[0., 1., 1., 3.]);
        let sample = resample(StrandPath::new(&steps), 1.);
        assert_eq!(sample.position, Vec3::new(0., 0., 1.));
        assert!(sample.tangent.is_finite());
    }

    #[test]
    fn collapsed_first_interval_falls_back_to_root() {
        let mut steps = line(&[0., 0., 2.]);
        steps[1].position = Vec3::new(5., 5., 5.);
        let path = StrandPath::new(&steps);
        assert_eq!(resample(path, 0.), Sample::from(&steps[0]));
    }

    #[test]
    fn ends_are_exact() {
        let steps = line(&[0., 0.5, 1.25, 3.]);
        let path = StrandPath::new(&steps);
        assert_eq!(resample(path, 0.), Sample::from(&steps[0]));
        assert_eq!(resample(path, 3.), Sample::from(&steps[3]));
        assert_eq!(resample(path, 10.), Sample::from(&steps[3]));
        assert_eq!(resample(path, -1.), Sample::from(&steps[0]));
    }

    #[test]
    fn straight_path_is_monotonic() {
        let steps = line(&[0., 0.5, 1.25, 3.]);
        let path = StrandPath::new(&steps);
        let mut previous = f32::NEG_INFINITY;
        for i in 0..=60 {
            let target = 3. * i as f32 / 60.;
            let z = resample(path, target).position.z;
            assert!(z >= previous);
            assert_relative_eq!(z, target, epsilon = 1e-5);
            previous = z;
        }
    }

    #[test]
    fn interpolates_all_attributes() {
        let steps = line(&[0., 2.]);
        let sample = resample(StrandPath::new(&steps), 0.5);
        assert_relative_eq!(sample.tangent.x, 1.5);
        assert_eq!(sample.normal, Vec3::Y);
    }

    #[test]
    fn uniform_resampling_keeps_ends() {
        let steps = line(&[0., 0.1, 0.2, 3.]);
        let uniform = resample_uniform(StrandPath::new(&steps), 7);
        assert_eq!(uniform.len(), 7);
        assert_eq!(uniform[0].position, steps[0].position);
        assert_relative_eq!(uniform[6].position.z, 3.);
        for (i, s) in uniform.iter().enumerate() {
            assert_relative_eq!(s.arc_length, 0.5 * i as f32, epsilon = 1e-5);
        }
    }
}
