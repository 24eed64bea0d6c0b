//! FreeType rendering backend for Textrig
//!
//! Owns the FreeType face handle shared by the native rasterizers and
//! extracts glyph data in two forms: antialiased bitmaps composited into a
//! [`textrig_core::MaskStack`] (see [`render_mask_stack`]) and outline
//! paths in font units (see [`cluster_paths`]).

use std::rc::Rc;

use freetype::Library;

use textrig_core::{Result, TextrigError};

mod outlines;
mod raster;

pub use outlines::cluster_paths;
pub use raster::render_mask_stack;

/// A font loaded into FreeType from memory.
///
/// Holds the library handle alongside the face so the face never outlives
/// it. Not `Send`: FreeType faces are single-threaded.
pub struct FontFace {
    _library: Library,
    face: freetype::Face,
    units_per_em: u16,
}

impl FontFace {
    /// Parse a font from raw bytes. Fails on data FreeType cannot open.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let library = Library::init()
            .map_err(|e| TextrigError::Render(format!("FreeType initialization failed: {e:?}")))?;
        let font_data: Rc<Vec<u8>> = Rc::new(data.to_vec());
        let face = library
            .new_memory_face(font_data, 0)
            .map_err(|e| TextrigError::FontLoad(format!("font data not parseable: {e:?}")))?;
        let units_per_em = face.raw().units_per_EM;
        Ok(Self {
            _library: library,
            face,
            units_per_em,
        })
    }

    pub fn units_per_em(&self) -> u32 {
        u32::from(self.units_per_em)
    }

    /// Scale the face to a pixel size.
    pub fn set_pixel_size(&self, size: u32) -> Result<()> {
        self.face
            .set_pixel_sizes(0, size)
            .map_err(|e| TextrigError::Render(format!("FreeType size setting failed: {e:?}")))
    }

    /// Scale the face so one font unit maps to one outline unit.
    pub fn set_design_size(&self) -> Result<()> {
        self.face
            .set_char_size(0, (self.units_per_em as isize) * 64, 0, 0)
            .map_err(|e| TextrigError::Render(format!("FreeType size setting failed: {e:?}")))
    }

    /// The underlying FreeType face.
    pub fn ft_face(&self) -> &freetype::Face {
        &self.face
    }
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("units_per_em", &self.units_per_em)
            .field("family", &self.face.family_name())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    pub const FONT_PATHS: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    ];

    pub fn system_font() -> Option<Vec<u8>> {
        FONT_PATHS.iter().find_map(|p| std::fs::read(p).ok())
    }
}
