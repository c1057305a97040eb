use std::str::FromStr;

use crate::foundation::error::{StratumError, StratumResult};
use crate::foundation::math::{mul_div255_u8, unit_to_u8};

/// A premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Pixel-combine formula used when a component is blended onto the accumulator.
///
/// Every mode composites with Porter-Duff source-over coverage
/// (`out_a = sa + da * (1 - sa)`); the mode only changes how colour is mixed where both source
/// and destination have coverage. A fully transparent source pixel never changes the destination.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Source over destination.
    #[default]
    Normal,
    /// `s * d`
    Multiply,
    /// `s + d - s * d`
    Screen,
    /// Hard light with source and destination swapped.
    Overlay,
    /// `min(s, d)`
    Darken,
    /// `max(s, d)`
    Lighten,
    /// `d / (1 - s)`
    ColorDodge,
    /// `1 - (1 - d) / s`
    ColorBurn,
    /// Multiply or screen depending on the source.
    HardLight,
    /// W3C soft light.
    SoftLight,
    /// `|d - s|`
    Difference,
    /// `d + s - 2 * d * s`
    Exclusion,
    /// Linear dodge, `min(1, s + d)`.
    Add,
    /// `max(0, d - s)`
    Subtract,
}

impl FromStr for BlendMode {
    type Err = StratumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "normal" => Self::Normal,
            "multiply" => Self::Multiply,
            "screen" => Self::Screen,
            "overlay" => Self::Overlay,
            "darken" => Self::Darken,
            "lighten" => Self::Lighten,
            "color_dodge" => Self::ColorDodge,
            "color_burn" => Self::ColorBurn,
            "hard_light" => Self::HardLight,
            "soft_light" => Self::SoftLight,
            "difference" => Self::Difference,
            "exclusion" => Self::Exclusion,
            "add" | "linear_dodge" => Self::Add,
            "subtract" => Self::Subtract,
            other => {
                return Err(StratumError::validation(format!(
                    "unknown blending mode '{other}'"
                )));
            }
        };
        Ok(mode)
    }
}

/// Source-over for a single premultiplied pixel.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = src[3];
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }
    let inv = 255u16 - u16::from(sa);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = src[i].saturating_add(mul_div255_u8(u16::from(dst[i]), inv));
    }
    out
}

/// Blend `src` onto `dst` in place. Both buffers are premultiplied RGBA8 of equal length.
pub fn composite_in_place(dst: &mut [u8], src: &[u8], mode: BlendMode) -> StratumResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(StratumError::evaluation(
            "composite_in_place expects equal-length rgba8 buffers",
        ));
    }

    // Mode dispatch happens once per call; each arm monomorphizes its own kernel.
    match mode {
        BlendMode::Normal => {
            for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
                let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
                d.copy_from_slice(&out);
            }
        }
        BlendMode::Multiply => blend_separable(dst, src, |s, d| s * d),
        BlendMode::Screen => blend_separable(dst, src, |s, d| s + d - s * d),
        BlendMode::Overlay => blend_separable(dst, src, |s, d| hard_light(d, s)),
        BlendMode::Darken => blend_separable(dst, src, |s, d| s.min(d)),
        BlendMode::Lighten => blend_separable(dst, src, |s, d| s.max(d)),
        BlendMode::ColorDodge => blend_separable(dst, src, |s, d| {
            if d <= 0.0 {
                0.0
            } else if s >= 1.0 {
                1.0
            } else {
                (d / (1.0 - s)).min(1.0)
            }
        }),
        BlendMode::ColorBurn => blend_separable(dst, src, |s, d| {
            if d >= 1.0 {
                1.0
            } else if s <= 0.0 {
                0.0
            } else {
                1.0 - ((1.0 - d) / s).min(1.0)
            }
        }),
        BlendMode::HardLight => blend_separable(dst, src, hard_light),
        BlendMode::SoftLight => blend_separable(dst, src, |s, d| {
            if s <= 0.5 {
                d - (1.0 - 2.0 * s) * d * (1.0 - d)
            } else {
                let g = if d <= 0.25 {
                    ((16.0 * d - 12.0) * d + 4.0) * d
                } else {
                    d.sqrt()
                };
                d + (2.0 * s - 1.0) * (g - d)
            }
        }),
        BlendMode::Difference => blend_separable(dst, src, |s, d| (d - s).abs()),
        BlendMode::Exclusion => blend_separable(dst, src, |s, d| d + s - 2.0 * d * s),
        BlendMode::Add => blend_separable(dst, src, |s, d| (s + d).min(1.0)),
        BlendMode::Subtract => blend_separable(dst, src, |s, d| (d - s).max(0.0)),
    }
    Ok(())
}

fn hard_light(s: f32, d: f32) -> f32 {
    if s <= 0.5 {
        2.0 * s * d
    } else {
        1.0 - 2.0 * (1.0 - s) * (1.0 - d)
    }
}

#[inline(always)]
fn blend_separable<F>(dst: &mut [u8], src: &[u8], blend_fn: F)
where
    F: Fn(f32, f32) -> f32,
{
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        // out_p = sp * (1 - da) + dp * (1 - sa) + B(sc, dc) * sa * da
        let sa = f32::from(s[3]) / 255.0;
        let da = f32::from(d[3]) / 255.0;
        let out_a = (sa + da * (1.0 - sa)).clamp(0.0, 1.0);

        for c in 0..3 {
            let sp = f32::from(s[c]) / 255.0;
            let dp = f32::from(d[c]) / 255.0;
            let sc = (sp / sa).clamp(0.0, 1.0);
            let dc = if da > 0.0 {
                (dp / da).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let b = blend_fn(sc, dc).clamp(0.0, 1.0);
            let out = sp * (1.0 - da) + dp * (1.0 - sa) + b * sa * da;
            d[c] = unit_to_u8(out.min(out_a));
        }
        d[3] = unit_to_u8(out_a);
    }
}

/// Multiply every premultiplied channel of `src` by the alpha of the matching `matte` pixel.
///
/// The matte contributes coverage only, never colour.
pub fn apply_alpha_matte(src: &mut [u8], matte: &[u8]) -> StratumResult<()> {
    if src.len() != matte.len() || !src.len().is_multiple_of(4) {
        return Err(StratumError::evaluation(
            "apply_alpha_matte expects equal-length rgba8 buffers",
        ));
    }
    for (s, m) in src.chunks_exact_mut(4).zip(matte.chunks_exact(4)) {
        let w = u16::from(m[3]);
        if w == 255 {
            continue;
        }
        for c in s.iter_mut() {
            *c = mul_div255_u8(u16::from(*c), w);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/compose/blend.rs"]
mod tests;
