//! HarfBuzz shaping backend for Textrig
//!
//! Shapes a text string against raw font bytes and groups the resulting
//! glyphs into clusters. Two scales are offered: pixel scale (glyph
//! positions in 26.6 fixed point relative to the requested pixel size) for
//! rasterization, and design scale (one font unit per unit) for outline
//! extraction and cluster-string derivation.

use std::collections::BTreeMap;

use harfbuzz_rs::{Face, Font as HbFont, UnicodeBuffer};

use textrig_core::Result;

/// One shaped glyph. Offsets and advance are 26.6 fixed point at the scale
/// the shaping ran at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapedGlyph {
    pub id: u32,
    pub cluster: u32,
    pub x_offset: i32,
    pub y_offset: i32,
    pub x_advance: i32,
}

/// Glyphs belonging to one cluster, in buffer order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Byte offset of the cluster's first character in the source text.
    pub start: u32,
    /// Indices into [`ShapedText::glyphs`].
    pub glyphs: Vec<usize>,
}

/// Result of shaping one text string with one font.
#[derive(Debug, Clone, Default)]
pub struct ShapedText {
    text: String,
    glyphs: Vec<ShapedGlyph>,
    clusters: Vec<Cluster>,
}

impl ShapedText {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn glyphs(&self) -> &[ShapedGlyph] {
        &self.glyphs
    }

    /// Clusters sorted ascending by their byte offset.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Per-cluster substrings of the source text, in cluster order.
    ///
    /// Each cluster spans from its byte offset to the next cluster's (the
    /// end of the text for the last one). Offsets come from HarfBuzz and
    /// always lie on character boundaries.
    pub fn cluster_strings(&self) -> Vec<String> {
        let mut strings = Vec::with_capacity(self.clusters.len());
        for (i, cluster) in self.clusters.iter().enumerate() {
            let start = cluster.start as usize;
            let end = match self.clusters.get(i + 1) {
                Some(next) => next.start as usize,
                None => self.text.len(),
            };
            strings.push(self.text[start..end].to_string());
        }
        strings
    }
}

/// Shape `text` at pixel scale: positions are 26.6 fixed point where 64
/// units equal one pixel of the requested size.
pub fn shape(font_data: &[u8], text: &str, size: u32) -> Result<ShapedText> {
    shape_with_scale(font_data, text, (size * 64) as i32)
}

/// Shape `text` at design scale: positions divided by 64 are font units.
pub fn shape_design(font_data: &[u8], text: &str) -> Result<ShapedText> {
    let face = Face::from_bytes(font_data, 0);
    let upem = face.upem();
    shape_with_scale(font_data, text, (upem * 64) as i32)
}

fn shape_with_scale(font_data: &[u8], text: &str, scale: i32) -> Result<ShapedText> {
    if text.is_empty() {
        return Ok(ShapedText::default());
    }

    let face = Face::from_bytes(font_data, 0);
    let mut hb_font = HbFont::new(face);
    hb_font.set_scale(scale, scale);

    let buffer = UnicodeBuffer::new()
        .add_str(text)
        .guess_segment_properties();
    let output = harfbuzz_rs::shape(&hb_font, buffer, &[]);

    let positions = output.get_glyph_positions();
    let infos = output.get_glyph_infos();

    let mut glyphs = Vec::with_capacity(infos.len());
    for (info, pos) in infos.iter().zip(positions.iter()) {
        glyphs.push(ShapedGlyph {
            id: info.codepoint,
            cluster: info.cluster,
            x_offset: pos.x_offset,
            y_offset: pos.y_offset,
            x_advance: pos.x_advance,
        });
    }

    // Group glyph indices by cluster, ascending by byte offset.
    let mut by_cluster: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (i, glyph) in glyphs.iter().enumerate() {
        by_cluster.entry(glyph.cluster).or_default().push(i);
    }
    let clusters = by_cluster
        .into_iter()
        .map(|(start, indices)| Cluster {
            start,
            glyphs: indices,
        })
        .collect();

    log::debug!(
        "shaped {} chars into {} glyphs at scale {}",
        text.chars().count(),
        glyphs.len(),
        scale
    );

    Ok(ShapedText {
        text: text.to_string(),
        glyphs,
        clusters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn empty_text_shapes_to_nothing() {
        let shaped = shape(&[], "", 16).unwrap();
        assert!(shaped.is_empty());
        assert_eq!(shaped.cluster_count(), 0);
        assert!(shaped.cluster_strings().is_empty());
    }

    #[test]
    fn cluster_strings_partition_the_text() {
        let Some(font_data) = system_font() else {
            return;
        };
        let shaped = shape(&font_data, "Hello", 32).unwrap();
        assert!(!shaped.is_empty());

        let strings = shaped.cluster_strings();
        assert_eq!(strings.concat(), "Hello");
        assert_eq!(strings.len(), shaped.cluster_count());

        // Latin text with no combining marks: one cluster per character.
        assert_eq!(strings.len(), 5);
    }

    #[test]
    fn clusters_are_sorted_and_cover_all_glyphs() {
        let Some(font_data) = system_font() else {
            return;
        };
        let shaped = shape(&font_data, "abc", 16).unwrap();

        let starts: Vec<u32> = shaped.clusters().iter().map(|c| c.start).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);

        let glyph_count: usize = shaped.clusters().iter().map(|c| c.glyphs.len()).sum();
        assert_eq!(glyph_count, shaped.glyphs().len());
    }

    #[test]
    fn design_scale_advances_track_units_per_em() {
        let Some(font_data) = system_font() else {
            return;
        };
        let design = shape_design(&font_data, "n").unwrap();
        let pixels = shape(&font_data, "n", 100).unwrap();
        let design_adv = design.glyphs()[0].x_advance as f64;
        let pixel_adv = pixels.glyphs()[0].x_advance as f64;

        let face = Face::from_bytes(&font_data, 0);
        let expected = face.upem() as f64 / 100.0;
        let ratio = design_adv / pixel_adv;
        assert!(
            (ratio - expected).abs() / expected < 0.02,
            "ratio {ratio} vs upem/size {expected}"
        );
    }

    #[test]
    fn multibyte_cluster_offsets_stay_on_char_boundaries() {
        let Some(font_data) = system_font() else {
            return;
        };
        let text = "aßc";
        let shaped = shape(&font_data, text, 16).unwrap();
        assert_eq!(shaped.cluster_strings().concat(), text);
    }
}
