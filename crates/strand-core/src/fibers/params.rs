use serde::{Deserialize, Serialize};

use crate::error::{HairError, Result};

/// Amplitudes of the random offset along one direction. Every draw is
/// centred, so an amplitude `a` moves a fiber by at most `a / 2`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffsetRandom {
    /// Constant for a whole fiber.
    pub at_root: f32,
    /// Drawn again for every vertex.
    pub uniform: f32,
    /// Grows with the arc length fraction, zero at the root.
    pub towards_tip: f32,
    /// Reuse the root draw for the tip instead of drawing a new value.
    pub couple_tip_to_root: bool,
}

impl OffsetRandom {
    fn validate(&self, name: &'static str) -> Result<()> {
        let amplitudes = [self.at_root, self.uniform, self.towards_tip];
        if amplitudes.iter().any(|a| !(a.is_finite() && *a >= 0.)) {
            return Err(HairError::InvalidParameter {
                name,
                reason: format!("amplitudes must be non negative, got {amplitudes:?}"),
            });
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomizationParams {
    /// Offset across the ribbon.
    pub tangent: OffsetRandom,
    /// Offset away from the surface.
    pub normal: OffsetRandom,
    /// Fibers are shortened by up to this fraction of the guide length.
    pub length_random: f32,
}

impl RandomizationParams {
    pub fn validate(&self) -> Result<()> {
        self.tangent.validate("tangent_random")?;
        self.normal.validate("normal_random")?;
        if !(0. ..=1.).contains(&self.length_random) {
            return Err(HairError::InvalidParameter {
                name: "length_random",
                reason: format!("must be in [0, 1], got {}", self.length_random),
            });
        }
        Ok(())
    }
}
