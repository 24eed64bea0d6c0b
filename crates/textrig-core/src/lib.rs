//! Textrig Core: shared vocabulary for multi-backend text rendering
//!
//! Every backend in the workspace speaks in the types defined here: a
//! [`MaskStack`] carrying the rendered image plus one binary mask per text
//! cluster, an [`OutlinePath`] of glyph outline segments, and the
//! [`RenderMode`] selector naming which backend produced the pixels.
//!
//! ## The Mask Stack
//!
//! A rendering is a 3-D grid indexed `(channel, row, column)`. Channel 0 is
//! the full grayscale image; channels 1..N are per-cluster binary masks in
//! cluster order, sharing the frame of channel 0. Trimming crops all
//! channels uniformly to channel 0's content bounds and refuses to crop an
//! image with no content at all.
//!
//! ## Path Operations
//!
//! Glyph outlines extracted from a font arrive as [`OutlinePath`] values.
//! The operations mirror what a path-editing pipeline needs: SVG
//! stringification, absolute-to-relative conversion, quadratic-to-cubic
//! lifting, point transforms, and subpath normalization (`reorder`).
//!
//! ```rust
//! use textrig_core::path::{OutlinePath, Point};
//!
//! let mut path = OutlinePath::new();
//! path.move_to(Point::new(0.0, 0.0));
//! path.line_to(Point::new(10.0, 0.0));
//! assert_eq!(path.to_svg(), "M 0 0 L 10 0");
//!
//! let rel = path.as_rel()?;
//! assert_eq!(rel.to_svg(), "m 0 0 l 10 0");
//! # Ok::<(), textrig_core::TextrigError>(())
//! ```

pub mod error;
pub mod modes;
pub mod path;
pub mod preview;
pub mod stack;

pub use error::{Result, TextrigError};
pub use modes::{BrowserEngine, RenderMode};
pub use path::{ClusterPaths, OutlinePath, PathCommand, Point};
pub use preview::{make_preview_url, make_preview_url_with, PreviewOptions};
pub use stack::{Bitmap, MaskStack};
