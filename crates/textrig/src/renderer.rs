// this_file: crates/textrig/src/renderer.rs

use std::path::Path;

use textrig_core::{BrowserEngine, ClusterPaths, MaskStack, RenderMode, Result, TextrigError};
use textrig_render_ft::FontFace;
use textrig_render_web::{WebConfig, WebSession};
use textrig_shape_hb::{shape, shape_design};

/// Main entry point: owns the active font and text plus any live browser
/// sessions, and renders the text through the backend selected per call.
pub struct Renderer {
    font_path: Option<String>,
    font_data: Vec<u8>,
    face: Option<FontFace>,
    text: String,
    chromium: Option<WebSession>,
    firefox: Option<WebSession>,
    web_config: WebConfig,
}

impl Renderer {
    pub fn new() -> Self {
        Self::with_web_config(WebConfig::default())
    }

    /// A renderer with custom browser-session settings.
    pub fn with_web_config(web_config: WebConfig) -> Self {
        Self {
            font_path: None,
            font_data: Vec::new(),
            face: None,
            text: String::new(),
            chromium: None,
            firefox: None,
            web_config,
        }
    }

    /// Load a font file and make it the active font.
    ///
    /// The path is stored canonicalized with forward slashes so browser
    /// sessions can hand the same file to the page as a `file://` URL.
    pub fn set_font(&mut self, font_path: impl AsRef<Path>) -> Result<()> {
        let path = font_path.as_ref();
        let data =
            std::fs::read(path).map_err(|_| TextrigError::FontLoad(path.display().to_string()))?;
        let face = FontFace::from_bytes(&data)?;
        let canonical = path
            .canonicalize()
            .map_err(|_| TextrigError::FontLoad(path.display().to_string()))?;

        self.font_path = Some(canonical.to_string_lossy().replace('\\', "/"));
        self.font_data = data;
        self.face = Some(face);
        log::debug!("active font: {}", self.font_path.as_deref().unwrap_or(""));
        Ok(())
    }

    /// Set the text all subsequent rendering operates on.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Canonical path of the active font, if one is loaded.
    pub fn font_path(&self) -> Option<&str> {
        self.font_path.as_deref()
    }

    /// Per-cluster substrings of the active text, in cluster order.
    pub fn cluster_strings(&self) -> Result<Vec<String>> {
        self.face()?;
        Ok(shape_design(&self.font_data, &self.text)?.cluster_strings())
    }

    /// Per-cluster outline paths plus the advances separating consecutive
    /// clusters, in font units.
    pub fn text_paths(&self) -> Result<ClusterPaths> {
        let face = self.face()?;
        let shaped = shape_design(&self.font_data, &self.text)?;
        textrig_render_ft::cluster_paths(face, &shaped)
    }

    /// Launch one browser session per supported engine.
    ///
    /// Sessions stay alive until [`Renderer::end_web`], the end of a
    /// [`Renderer::web_scope`] call, or drop.
    pub fn start_web(&mut self) -> Result<()> {
        self.chromium = Some(WebSession::launch(
            BrowserEngine::Chromium,
            &self.web_config,
        )?);
        match WebSession::launch(BrowserEngine::Firefox, &self.web_config) {
            Ok(session) => {
                self.firefox = Some(session);
                Ok(())
            }
            Err(e) => {
                self.end_web();
                Err(e)
            }
        }
    }

    /// Close every live browser session. Safe to call when none are open.
    pub fn end_web(&mut self) {
        let had_sessions = self.chromium.is_some() || self.firefox.is_some();
        self.chromium = None;
        self.firefox = None;
        if had_sessions {
            log::info!("browser sessions closed");
        }
    }

    /// Run `f` with browser sessions live, closing them on every exit path.
    pub fn web_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.start_web()?;
        let result = f(self);
        self.end_web();
        result
    }

    /// Render the active text at `size` through `mode` and crop the result
    /// to content bounds.
    ///
    /// Channel 0 of the returned stack is the full grayscale rendering and
    /// channels 1..N are per-cluster binary masks, all sharing the cropped
    /// frame. Text that leaves no ink on the canvas (for example whitespace
    /// only) fails with [`TextrigError::EmptyForeground`].
    pub fn render_text(&self, size: u32, mode: RenderMode) -> Result<MaskStack> {
        let stack = match mode {
            RenderMode::Freetype => {
                let face = self.face()?;
                let shaped = shape(&self.font_data, &self.text, size)?;
                textrig_render_ft::render_mask_stack(face, &shaped, size)?
            }
            RenderMode::Skia => {
                let face = self.face()?;
                let shaped = shape(&self.font_data, &self.text, size)?;
                textrig_render_skia::render_mask_stack(face, &shaped, size)?
            }
            RenderMode::Chromium => self.web_render(size, BrowserEngine::Chromium)?,
            RenderMode::Firefox => self.web_render(size, BrowserEngine::Firefox)?,
        };
        stack.trim(true)
    }

    fn web_render(&self, size: u32, engine: BrowserEngine) -> Result<MaskStack> {
        let session =
            self.web_session(engine)
                .ok_or_else(|| TextrigError::SessionNotStarted {
                    engine: engine.as_str().to_string(),
                })?;
        let font_path = self.font_path.as_deref().ok_or(TextrigError::FontNotSet)?;
        let strings = self.cluster_strings()?;
        session.render(font_path, size, &strings)
    }

    fn web_session(&self, engine: BrowserEngine) -> Option<&WebSession> {
        match engine {
            BrowserEngine::Chromium => self.chromium.as_ref(),
            BrowserEngine::Firefox => self.firefox.as_ref(),
        }
    }

    fn face(&self) -> Result<&FontFace> {
        self.face.as_ref().ok_or(TextrigError::FontNotSet)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        self.end_web();
    }
}
