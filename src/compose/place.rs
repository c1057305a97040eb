use rayon::prelude::*;

use crate::foundation::core::{Affine, Point, Rect};
use crate::foundation::error::StratumResult;
use crate::render::frame::FrameRGBA;

/// Rasterize `patch` into `canvas` through `layer_to_canvas`, scaled by `opacity`.
///
/// `canvas` is expected to be transparent: covered pixels are overwritten, not blended. Every
/// canvas pixel center is mapped back into patch space and sampled bilinearly, so pixels outside
/// the patch fade to transparent. Integer translations at full opacity take an exact copy path.
pub(crate) fn place_patch(
    canvas: &mut FrameRGBA,
    patch: &FrameRGBA,
    layer_to_canvas: Affine,
    opacity: f64,
) -> StratumResult<()> {
    canvas.check_len()?;
    patch.check_len()?;
    if canvas.width == 0 || canvas.height == 0 || patch.width == 0 || patch.height == 0 {
        return Ok(());
    }
    if opacity <= 0.0 {
        return Ok(());
    }
    let det = layer_to_canvas.determinant();
    if !det.is_finite() || det.abs() < 1e-12 {
        return Ok(());
    }

    if opacity >= 1.0
        && let Some((dx, dy)) = integer_translation(layer_to_canvas)
    {
        copy_translated(canvas, patch, dx, dy);
        return Ok(());
    }

    let bounds = layer_to_canvas.transform_rect_bbox(Rect::new(
        0.0,
        0.0,
        f64::from(patch.width),
        f64::from(patch.height),
    ));
    let x0 = bounds.x0.floor().max(0.0) as usize;
    let y0 = bounds.y0.floor().max(0.0) as usize;
    let x1 = (bounds.x1.ceil().min(f64::from(canvas.width))).max(0.0) as usize;
    let y1 = (bounds.y1.ceil().min(f64::from(canvas.height))).max(0.0) as usize;
    if x0 >= x1 || y0 >= y1 {
        return Ok(());
    }

    let inverse = layer_to_canvas.inverse();
    let row_bytes = (canvas.width as usize) * 4;
    let opacity = opacity.min(1.0) as f32;

    canvas
        .data
        .par_chunks_exact_mut(row_bytes)
        .enumerate()
        .skip(y0)
        .take(y1 - y0)
        .for_each(|(y, row)| {
            for x in x0..x1 {
                let p = inverse * Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let s = sample_bilinear(patch, p.x - 0.5, p.y - 0.5);
                if s[3] <= 0.0 {
                    continue;
                }
                let idx = x * 4;
                for c in 0..4 {
                    row[idx + c] = (s[c] * opacity).round().clamp(0.0, 255.0) as u8;
                }
            }
        });
    Ok(())
}

fn integer_translation(a: Affine) -> Option<(i64, i64)> {
    let [m00, m10, m01, m11, tx, ty] = a.as_coeffs();
    if m00 != 1.0 || m10 != 0.0 || m01 != 0.0 || m11 != 1.0 {
        return None;
    }
    if tx.fract() != 0.0 || ty.fract() != 0.0 {
        return None;
    }
    // Larger offsets take the bounding-box path, which clips them away.
    let limit = f64::from(i32::MAX);
    if tx.abs() > limit || ty.abs() > limit {
        return None;
    }
    Some((tx as i64, ty as i64))
}

fn copy_translated(canvas: &mut FrameRGBA, patch: &FrameRGBA, dx: i64, dy: i64) {
    let cw = i64::from(canvas.width);
    let ch = i64::from(canvas.height);
    let x_start = dx.max(0);
    let x_end = (dx + i64::from(patch.width)).min(cw);
    let y_start = dy.max(0);
    let y_end = (dy + i64::from(patch.height)).min(ch);
    if x_start >= x_end || y_start >= y_end {
        return;
    }

    let span = ((x_end - x_start) as usize) * 4;
    for y in y_start..y_end {
        let src_y = (y - dy) as usize;
        let src_x = (x_start - dx) as usize;
        let src_idx = (src_y * patch.width as usize + src_x) * 4;
        let dst_idx = ((y as usize) * canvas.width as usize + x_start as usize) * 4;
        canvas.data[dst_idx..dst_idx + span].copy_from_slice(&patch.data[src_idx..src_idx + span]);
    }
}

fn sample_bilinear(patch: &FrameRGBA, x: f64, y: f64) -> [f32; 4] {
    let fx0 = x.floor();
    let fy0 = y.floor();
    let tx = (x - fx0) as f32;
    let ty = (y - fy0) as f32;
    let ix = fx0 as i64;
    let iy = fy0 as i64;

    let taps = [
        (0i64, 0i64, (1.0 - tx) * (1.0 - ty)),
        (1, 0, tx * (1.0 - ty)),
        (0, 1, (1.0 - tx) * ty),
        (1, 1, tx * ty),
    ];
    let mut acc = [0f32; 4];
    for (ox, oy, w) in taps {
        if w <= 0.0 {
            continue;
        }
        if let Some(px) = patch.pixel(ix + ox, iy + oy) {
            for c in 0..4 {
                acc[c] += w * f32::from(px[c]);
            }
        }
    }
    acc
}

#[cfg(test)]
#[path = "../../tests/unit/compose/place.rs"]
mod tests;
