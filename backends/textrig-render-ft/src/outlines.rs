// this_file: backends/textrig-render-ft/src/outlines.rs

//! Glyph outline extraction into [`OutlinePath`] values.

use freetype::face::LoadFlag;
use freetype::outline::Curve;
use freetype::Vector;

use textrig_core::{ClusterPaths, OutlinePath, Point, Result};
use textrig_shape_hb::ShapedText;

use crate::FontFace;

/// Extract one outline path per cluster, in font units with y growing
/// downward.
///
/// `shaped` must have been shaped at design scale. Within each cluster the
/// pen starts at zero, so every path sits at its cluster's own origin; the
/// returned advances give the width of each cluster except the last.
/// Whitespace clusters produce empty paths.
pub fn cluster_paths(face: &FontFace, shaped: &ShapedText) -> Result<ClusterPaths> {
    face.set_design_size()?;

    let ft_face = face.ft_face();
    let cluster_count = shaped.cluster_count();
    let mut result = ClusterPaths::default();

    for (cluster_idx, cluster) in shaped.clusters().iter().enumerate() {
        let mut path = OutlinePath::new();
        let mut pen_x = 0i32;
        for &glyph_idx in &cluster.glyphs {
            let glyph = shaped.glyphs()[glyph_idx];
            if let Err(e) = ft_face.load_glyph(glyph.id, LoadFlag::NO_HINTING | LoadFlag::NO_BITMAP)
            {
                log::warn!("failed to load glyph {} outline: {e:?}", glyph.id);
                pen_x += glyph.x_advance;
                continue;
            }
            let off_x = (pen_x + glyph.x_offset) as f32;
            let off_y = glyph.y_offset as f32;
            if let Some(outline) = ft_face.glyph().outline() {
                let at = |v: &Vector| {
                    Point::new(
                        (v.x as f32 + off_x) / 64.0,
                        (-(v.y as f32) - off_y) / 64.0,
                    )
                };
                for contour in outline.contours_iter() {
                    path.move_to(at(contour.start()));
                    for curve in contour {
                        match curve {
                            Curve::Line(to) => path.line_to(at(&to)),
                            Curve::Bezier2(ctrl, to) => path.quad_to(at(&ctrl), at(&to)),
                            Curve::Bezier3(ctrl1, ctrl2, to) => {
                                path.curve_to(at(&ctrl1), at(&ctrl2), at(&to));
                            }
                        }
                    }
                }
            }
            pen_x += glyph.x_advance;
        }
        if cluster_idx + 1 < cluster_count {
            result.advances.push(pen_x as f32 / 64.0);
        }
        result.paths.push(path);
    }

    log::debug!(
        "extracted {} cluster paths, {} advances",
        result.paths.len(),
        result.advances.len()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::system_font;
    use textrig_core::PathCommand;
    use textrig_shape_hb::shape_design;

    #[test]
    fn one_path_per_cluster_with_advances_between() {
        let Some(data) = system_font() else {
            return;
        };
        let face = FontFace::from_bytes(&data).unwrap();
        let shaped = shape_design(&data, "Hi").unwrap();
        let extracted = cluster_paths(&face, &shaped).unwrap();

        assert_eq!(extracted.paths.len(), shaped.cluster_count());
        assert_eq!(extracted.advances.len(), shaped.cluster_count() - 1);
        assert!(extracted.advances.iter().all(|&a| a > 0.0));
    }

    #[test]
    fn extracted_paths_sit_above_the_baseline() {
        let Some(data) = system_font() else {
            return;
        };
        let face = FontFace::from_bytes(&data).unwrap();
        let shaped = shape_design(&data, "H").unwrap();
        let extracted = cluster_paths(&face, &shaped).unwrap();

        let path = &extracted.paths[0];
        assert!(!path.is_empty());
        assert!(matches!(path.commands()[0], PathCommand::MoveTo(_)));
        // y is flipped downward, so cap-height ink is negative.
        assert!(path.lowest().unwrap().y < 0.0);
        assert!(path.to_svg().starts_with("M "));
    }

    #[test]
    fn whitespace_cluster_has_an_empty_path() {
        let Some(data) = system_font() else {
            return;
        };
        let face = FontFace::from_bytes(&data).unwrap();
        let shaped = shape_design(&data, "a b").unwrap();
        let extracted = cluster_paths(&face, &shaped).unwrap();

        assert_eq!(extracted.paths.len(), 3);
        assert!(extracted.paths[1].is_empty());
        assert!(!extracted.paths[0].is_empty());
        assert!(!extracted.paths[2].is_empty());
    }

    #[test]
    fn contours_close_back_to_their_start() {
        let Some(data) = system_font() else {
            return;
        };
        let face = FontFace::from_bytes(&data).unwrap();
        let shaped = shape_design(&data, "o").unwrap();
        let extracted = cluster_paths(&face, &shaped).unwrap();

        let mut contour_start = None;
        let mut last_target = None;
        for cmd in extracted.paths[0].commands() {
            if let PathCommand::MoveTo(p) = cmd {
                if let (Some(start), Some(end)) = (contour_start, last_target) {
                    assert_eq!(start, end);
                }
                contour_start = Some(*p);
            }
            last_target = cmd.target();
        }
        assert_eq!(contour_start.unwrap(), last_target.unwrap());
    }

    #[test]
    fn cubic_lift_makes_paths_reorderable() {
        let Some(data) = system_font() else {
            return;
        };
        let face = FontFace::from_bytes(&data).unwrap();
        let shaped = shape_design(&data, "B").unwrap();
        let mut path = cluster_paths(&face, &shaped).unwrap().paths.remove(0);

        path.to_cubic();
        path.reorder().unwrap();
        assert!(matches!(path.commands()[0], PathCommand::MoveTo(_)));
    }
}
