//! Textrig: comparable raster renderings of text across backends
//!
//! Renders one text string through FreeType, tiny-skia, headless Chromium
//! or headless Firefox and returns every result in one common form, a
//! [`MaskStack`]: channel 0 holds the full grayscale rendering and each
//! further channel holds the binary mask of one text cluster, all cropped
//! uniformly to the bounds of the rendered ink. The shared frame makes the
//! backends directly comparable, pixel for pixel and cluster for cluster.
//!
//! # Example
//!
//! ```no_run
//! use textrig::{RenderMode, Renderer};
//!
//! # fn main() -> textrig::Result<()> {
//! let mut renderer = Renderer::new();
//! renderer.set_font("fonts/DejaVuSans.ttf")?;
//! renderer.set_text("Hello");
//!
//! let stack = renderer.render_text(48, RenderMode::Freetype)?;
//! assert_eq!(stack.channels(), 1 + 5);
//! # Ok(())
//! # }
//! ```
//!
//! Browser modes need a live session; `web_scope` releases it on every
//! exit path:
//!
//! ```no_run
//! # use textrig::{RenderMode, Renderer};
//! # fn main() -> textrig::Result<()> {
//! # let mut renderer = Renderer::new();
//! let stack = renderer.web_scope(|r| r.render_text(48, RenderMode::Chromium))?;
//! # Ok(())
//! # }
//! ```

mod renderer;

pub use renderer::Renderer;

pub use textrig_core::{
    make_preview_url, make_preview_url_with, Bitmap, BrowserEngine, ClusterPaths, MaskStack,
    OutlinePath, PathCommand, Point, PreviewOptions, RenderMode, Result, TextrigError,
};
pub use textrig_render_web::{WebConfig, WebSession};
pub use textrig_shape_hb::{shape, shape_design, ShapedText};

/// Common imports for typical usage
pub mod prelude {
    pub use crate::renderer::Renderer;
    pub use textrig_core::{
        make_preview_url, MaskStack, OutlinePath, RenderMode, Result, TextrigError,
    };
    pub use textrig_render_web::WebConfig;
}
