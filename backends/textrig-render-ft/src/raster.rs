//! Grayscale mask-stack rasterization through FreeType.

use freetype::face::LoadFlag;

use textrig_core::{MaskStack, Result};
use textrig_shape_hb::ShapedText;

use crate::FontFace;

/// Rendered glyph bitmap positioned on the pixel grid.
struct GlyphRaster {
    cluster: usize,
    px: i32,
    py: i32,
    left: i32,
    top: i32,
    width: usize,
    rows: usize,
    pixels: Vec<u8>,
}

/// Round a 26.6 fixed-point value to whole pixels.
fn pixel(v: i32) -> i32 {
    ((v + 32) & !63) >> 6
}

/// Rounded division by 255, exact for inputs of the form `a * b + 128`
/// with `a`, `b` in 0..=255.
fn div255(v: u32) -> u32 {
    ((v >> 8) + v) >> 8
}

/// Rasterize shaped text into a `(1 + clusters, height, width)` stack.
///
/// Channel 0 is ink on a 255 background; each cluster's channel holds 1
/// wherever that cluster deposited any coverage. The frame spans the union
/// of glyph bitmaps, the origin, and the rounded total advance, so an
/// all-whitespace shaping yields a frame with no rows.
pub fn render_mask_stack(face: &FontFace, shaped: &ShapedText, size: u32) -> Result<MaskStack> {
    face.set_pixel_size(size)?;

    let mut x_min = 0i32;
    let mut x_max = 0i32;
    let mut y_min = 0i32;
    let mut y_max = 0i32;
    let mut pen_x = 0i32;
    let mut rasters: Vec<GlyphRaster> = Vec::new();

    let ft_face = face.ft_face();
    for (cluster_idx, cluster) in shaped.clusters().iter().enumerate() {
        for &glyph_idx in &cluster.glyphs {
            let glyph = shaped.glyphs()[glyph_idx];
            let px = pixel(pen_x + glyph.x_offset);
            let py = pixel(glyph.y_offset);
            pen_x += glyph.x_advance;
            x_max = x_max.max(pixel(pen_x));

            if let Err(e) = ft_face.load_glyph(glyph.id, LoadFlag::RENDER) {
                log::warn!("failed to render glyph {}: {e:?}", glyph.id);
                continue;
            }
            let slot = ft_face.glyph();
            let bitmap = slot.bitmap();
            let width = bitmap.width() as usize;
            let rows = bitmap.rows() as usize;
            if width == 0 || rows == 0 {
                continue;
            }

            // Tightly pack the bitmap, dropping the row padding.
            let buffer = bitmap.buffer();
            let pitch = bitmap.pitch().unsigned_abs() as usize;
            let mut pixels = Vec::with_capacity(width * rows);
            for y in 0..rows {
                pixels.extend_from_slice(&buffer[y * pitch..y * pitch + width]);
            }

            let left = slot.bitmap_left();
            let top = slot.bitmap_top();
            x_min = x_min.min(px + left);
            x_max = x_max.max(px + left + width as i32);
            y_min = y_min.min(py + top - rows as i32);
            y_max = y_max.max(py + top);

            rasters.push(GlyphRaster {
                cluster: cluster_idx,
                px,
                py,
                left,
                top,
                width,
                rows,
                pixels,
            });
        }
    }

    let height = (y_max - y_min).max(0) as usize;
    let width = (x_max - x_min).max(0) as usize;
    log::debug!(
        "freetype raster: {} glyphs into {}x{} frame, {} clusters",
        rasters.len(),
        width,
        height,
        shaped.cluster_count()
    );

    let mut stack = MaskStack::new(1 + shaped.cluster_count(), height, width);
    stack.fill_channel(0, 255);

    for raster in &rasters {
        let pos_x = -x_min + raster.px + raster.left;
        let pos_y = y_max - raster.py - raster.top;
        for row in 0..raster.rows {
            for col in 0..raster.width {
                let alpha = raster.pixels[row * raster.width + col];
                if alpha == 0 {
                    continue;
                }
                let gy = pos_y + row as i32;
                let gx = pos_x + col as i32;
                if gy < 0 || gy >= height as i32 || gx < 0 || gx >= width as i32 {
                    continue;
                }
                let (gy, gx) = (gy as usize, gx as usize);
                stack.set(1 + raster.cluster, gy, gx, 1);
                let current = u32::from(stack.get(0, gy, gx));
                let blended = div255(current * (255 - u32::from(alpha)) + 128);
                stack.set(0, gy, gx, blended as u8);
            }
        }
    }

    Ok(stack)
}
