use crate::cache::key::TransformKey;
use crate::foundation::core::{Affine, Vec2};

/// Which point of a layer's pixel patch sits at the transform position.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Top-left corner.
    TopLeft,
    /// Middle of the top edge.
    TopCenter,
    /// Top-right corner.
    TopRight,
    /// Middle of the left edge.
    CenterLeft,
    /// Center of the patch.
    #[default]
    Center,
    /// Middle of the right edge.
    CenterRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Middle of the bottom edge.
    BottomCenter,
    /// Bottom-right corner.
    BottomRight,
}

impl Origin {
    /// Point of a `width x height` patch this origin designates, in patch pixels.
    pub fn point(self, width: f64, height: f64) -> Vec2 {
        let (fx, fy) = match self {
            Self::TopLeft => (0.0, 0.0),
            Self::TopCenter => (0.5, 0.0),
            Self::TopRight => (1.0, 0.0),
            Self::CenterLeft => (0.0, 0.5),
            Self::Center => (0.5, 0.5),
            Self::CenterRight => (1.0, 0.5),
            Self::BottomLeft => (0.0, 1.0),
            Self::BottomCenter => (0.5, 1.0),
            Self::BottomRight => (1.0, 1.0),
        };
        Vec2::new(width * fx, height * fy)
    }
}

/// Placement of a layer patch on the composition frame.
///
/// `position` is in full-resolution composition pixels. The patch point selected by the
/// component's [`Origin`], shifted by `anchor_point`, lands on `position`; scale and rotation
/// pivot around that same point.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Transform {
    /// Target position in composition pixels.
    pub position: Vec2,
    /// Per-axis scale, `(1, 1)` by default.
    pub scale: Vec2,
    /// Clockwise rotation in degrees (y points down).
    pub rotation: f64,
    /// Opacity multiplier in `[0, 1]`.
    pub opacity: f64,
    /// Pivot offset from the origin point, in patch pixels.
    pub anchor_point: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: Vec2::new(1.0, 1.0),
            rotation: 0.0,
            opacity: 1.0,
            anchor_point: Vec2::ZERO,
        }
    }
}

impl Transform {
    /// Default transform placed at `position`.
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Opacity clamped into `[0, 1]`; non-finite values count as fully transparent.
    pub fn effective_opacity(&self) -> f64 {
        if self.opacity.is_finite() {
            self.opacity.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Map patch pixel coordinates to accumulator coordinates at `preview_level`.
    ///
    /// Canonical order: `S(1/L) * T(position) * R(rot) * S(scale) * T(-pivot)`.
    pub fn layer_to_canvas(
        &self,
        patch_width: u32,
        patch_height: u32,
        origin: Origin,
        preview_level: u32,
    ) -> Affine {
        let pivot =
            origin.point(f64::from(patch_width), f64::from(patch_height)) + self.anchor_point;
        let level = f64::from(preview_level.max(1));

        Affine::scale(1.0 / level)
            * Affine::translate(self.position)
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale_non_uniform(self.scale.x, self.scale.y)
            * Affine::translate(-pivot)
    }

    /// Cache identity of this transform.
    pub fn key(&self) -> TransformKey {
        TransformKey([
            canonical_bits(self.position.x),
            canonical_bits(self.position.y),
            canonical_bits(self.scale.x),
            canonical_bits(self.scale.y),
            canonical_bits(self.rotation),
            canonical_bits(self.opacity),
            canonical_bits(self.anchor_point.x),
            canonical_bits(self.anchor_point.y),
        ])
    }
}

// -0.0 and 0.0 place pixels identically.
fn canonical_bits(v: f64) -> u64 {
    if v == 0.0 { 0 } else { v.to_bits() }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/transform.rs"]
mod tests;
