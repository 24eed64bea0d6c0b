//! tiny-skia rendering backend for Textrig
//!
//! Rasterizes FreeType glyph outlines with tiny-skia's antialiased path
//! filler: black fills on a white canvas, channel 0 taken from the red
//! channel of the composite. Cluster masks re-render each cluster's paths
//! alone and binarize the result.

use freetype::face::LoadFlag;
use freetype::outline::Curve;
use kurbo::{BezPath, Rect, Shape};
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};

use textrig_core::{MaskStack, Result, TextrigError};
use textrig_render_ft::FontFace;
use textrig_shape_hb::ShapedText;

/// Rasterize shaped text into a `(1 + clusters, height, width)` stack.
///
/// The canvas is the floor/ceil of the union of glyph path bounding boxes;
/// when nothing has a visible outline the stack comes back with zero rows
/// and columns.
pub fn render_mask_stack(face: &FontFace, shaped: &ShapedText, size: u32) -> Result<MaskStack> {
    face.set_pixel_size(size)?;

    let glyph_paths = collect_glyph_paths(face, shaped);

    let mut bounds: Option<Rect> = None;
    for (_, bez) in &glyph_paths {
        if bez.elements().is_empty() {
            continue;
        }
        let bb = bez.bounding_box();
        bounds = Some(match bounds {
            Some(r) => r.union(bb),
            None => bb,
        });
    }

    let cluster_count = shaped.cluster_count();
    let Some(bounds) = bounds else {
        log::debug!("skia raster: no visible outlines, returning empty frame");
        return Ok(MaskStack::new(1 + cluster_count, 0, 0));
    };

    let left = bounds.x0.floor();
    let top = bounds.y0.floor();
    let width = (bounds.x1.ceil() - left) as usize;
    let height = (bounds.y1.ceil() - top) as usize;
    if width == 0 || height == 0 {
        return Ok(MaskStack::new(1 + cluster_count, 0, 0));
    }
    log::debug!(
        "skia raster: {} paths into {}x{} frame, {} clusters",
        glyph_paths.len(),
        width,
        height,
        cluster_count
    );

    // Translate kurbo's path format into tiny-skia's native format.
    let mut skia_paths: Vec<(usize, tiny_skia::Path)> = Vec::with_capacity(glyph_paths.len());
    for (cluster, bez) in &glyph_paths {
        if bez.elements().is_empty() {
            continue;
        }
        let mut builder = PathBuilder::new();
        for element in bez.elements() {
            match *element {
                kurbo::PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
                kurbo::PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
                kurbo::PathEl::QuadTo(ctrl, end) => {
                    builder.quad_to(ctrl.x as f32, ctrl.y as f32, end.x as f32, end.y as f32)
                }
                kurbo::PathEl::CurveTo(c1, c2, end) => builder.cubic_to(
                    c1.x as f32,
                    c1.y as f32,
                    c2.x as f32,
                    c2.y as f32,
                    end.x as f32,
                    end.y as f32,
                ),
                kurbo::PathEl::ClosePath => builder.close(),
            }
        }
        let path = builder
            .finish()
            .ok_or_else(|| TextrigError::Render("path building failed".into()))?;
        skia_paths.push((*cluster, path));
    }

    let mut pixmap = Pixmap::new(width as u32, height as u32)
        .ok_or_else(|| TextrigError::Render("pixmap creation failed".into()))?;
    let paint = Paint {
        anti_alias: true,
        ..Default::default()
    };
    let transform = Transform::from_translate(-left as f32, -top as f32);

    let mut stack = MaskStack::new(1 + cluster_count, height, width);

    // Full rendering: every path on one white canvas.
    pixmap.fill(tiny_skia::Color::WHITE);
    for (_, path) in &skia_paths {
        pixmap.fill_path(path, &paint, FillRule::Winding, transform, None);
    }
    let data = pixmap.data();
    for (i, px) in stack.channel_mut(0).iter_mut().enumerate() {
        *px = data[i * 4];
    }

    // One isolated rendering per cluster, binarized.
    for cluster_idx in 0..cluster_count {
        pixmap.fill(tiny_skia::Color::WHITE);
        for (cluster, path) in &skia_paths {
            if *cluster == cluster_idx {
                pixmap.fill_path(path, &paint, FillRule::Winding, transform, None);
            }
        }
        let data = pixmap.data();
        for (i, px) in stack.channel_mut(1 + cluster_idx).iter_mut().enumerate() {
            *px = u8::from(data[i * 4] < 255);
        }
    }

    Ok(stack)
}

/// One positioned kurbo path per glyph, tagged with its cluster index.
/// Coordinates are pixels with y growing downward and the baseline at 0.
fn collect_glyph_paths(face: &FontFace, shaped: &ShapedText) -> Vec<(usize, BezPath)> {
    let ft_face = face.ft_face();
    let mut paths = Vec::new();
    let mut pen_x = 0f64;

    for (cluster_idx, cluster) in shaped.clusters().iter().enumerate() {
        for &glyph_idx in &cluster.glyphs {
            let glyph = shaped.glyphs()[glyph_idx];
            let origin_x = pen_x + f64::from(glyph.x_offset) / 64.0;
            let origin_y = -f64::from(glyph.y_offset) / 64.0;
            pen_x += f64::from(glyph.x_advance) / 64.0;

            let mut bez = BezPath::new();
            if let Err(e) = ft_face.load_glyph(glyph.id, LoadFlag::DEFAULT | LoadFlag::NO_BITMAP) {
                log::warn!("failed to load glyph {}: {e:?}", glyph.id);
                paths.push((cluster_idx, bez));
                continue;
            }
            if let Some(outline) = ft_face.glyph().outline() {
                let at = |v: &freetype::Vector| {
                    kurbo::Point::new(
                        v.x as f64 / 64.0 + origin_x,
                        -(v.y as f64) / 64.0 + origin_y,
                    )
                };
                for contour in outline.contours_iter() {
                    bez.move_to(at(contour.start()));
                    for curve in contour {
                        match curve {
                            Curve::Line(to) => bez.line_to(at(&to)),
                            Curve::Bezier2(ctrl, to) => bez.quad_to(at(&ctrl), at(&to)),
                            Curve::Bezier3(ctrl1, ctrl2, to) => {
                                bez.curve_to(at(&ctrl1), at(&ctrl2), at(&to));
                            }
                        }
                    }
                    bez.close_path();
                }
            }
            paths.push((cluster_idx, bez));
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use textrig_shape_hb::shape;

    const FONT_PATHS: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    ];

    fn system_font() -> Option<Vec<u8>> {
        FONT_PATHS.iter().find_map(|p| std::fs::read(p).ok())
    }

    #[test]
    fn stack_has_one_channel_per_cluster_plus_image() {
        let Some(data) = system_font() else {
            return;
        };
        let face = FontFace::from_bytes(&data).unwrap();
        let shaped = shape(&data, "Hi", 48).unwrap();
        let stack = render_mask_stack(&face, &shaped, 48).unwrap();

        assert_eq!(stack.channels(), 1 + shaped.cluster_count());
        assert!(stack.height() > 0);
        assert!(stack.width() > 0);
        assert!(stack.channel(0).iter().any(|&v| v != 255));
    }

    #[test]
    fn cluster_masks_union_covers_the_ink() {
        let Some(data) = system_font() else {
            return;
        };
        let face = FontFace::from_bytes(&data).unwrap();
        let shaped = shape(&data, "ab", 32).unwrap();
        let stack = render_mask_stack(&face, &shaped, 32).unwrap();

        for row in 0..stack.height() {
            for col in 0..stack.width() {
                if stack.get(0, row, col) < 255 {
                    let covered =
                        (1..stack.channels()).any(|c| stack.get(c, row, col) == 1);
                    assert!(covered, "ink at ({row}, {col}) outside every mask");
                }
            }
        }
    }

    #[test]
    fn masks_are_binary() {
        let Some(data) = system_font() else {
            return;
        };
        let face = FontFace::from_bytes(&data).unwrap();
        let shaped = shape(&data, "x", 24).unwrap();
        let stack = render_mask_stack(&face, &shaped, 24).unwrap();

        for c in 1..stack.channels() {
            assert!(stack.channel(c).iter().all(|&v| v <= 1));
            assert!(stack.channel(c).iter().any(|&v| v == 1));
        }
    }

    #[test]
    fn whitespace_only_text_yields_empty_frame() {
        let Some(data) = system_font() else {
            return;
        };
        let face = FontFace::from_bytes(&data).unwrap();
        let shaped = shape(&data, " ", 32).unwrap();
        let stack = render_mask_stack(&face, &shaped, 32).unwrap();

        assert_eq!(stack.channels(), 1 + shaped.cluster_count());
        assert_eq!((stack.height(), stack.width()), (0, 0));
    }
}
