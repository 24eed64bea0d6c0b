//! Browser rendering backend for Textrig
//!
//! Drives headless Chromium or Firefox over the DevTools protocol. The
//! browser does its own layout: a scratch page gets one span per cluster
//! string, the containing div is screenshotted for the grayscale image, and
//! each span is isolated by toggling opacity to produce the cluster masks.
//! Opacity keeps hidden spans in the layout, so glyph positions never move
//! between captures.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::browser::tab::element::Element;
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use image::GrayImage;

use textrig_core::{BrowserEngine, MaskStack, Result, TextrigError};

const FIREFOX_PATHS: &[&str] = &[
    "/usr/bin/firefox",
    "/usr/local/bin/firefox",
    "/snap/bin/firefox",
    "/Applications/Firefox.app/Contents/MacOS/firefox",
];

/// Replaces the page's div with a fresh one holding one span per string.
/// Resolves once the font is loaded, so a following screenshot sees the
/// final glyphs rather than a fallback face.
const ADD_SPANS: &str = r#"([fontPath, fontName, size, strings]) => {
    document.querySelector('div').remove();

    const div = document.createElement('div');
    div.style.display = 'inline-block';
    div.style.fontSize = `${size}px`;

    const font = new FontFace(fontName, `url(file:///${fontPath})`);

    return font.load().then(() => {
        document.fonts.add(font);
        div.style.fontFamily = fontName;

        for (const str of strings) {
            const span = document.createElement('span');
            span.textContent = str;
            div.appendChild(span);
        }
        document.body.appendChild(div);
    });
}"#;

const HIDE_SPANS: &str =
    "(() => { document.querySelectorAll('span').forEach(span => { span.style.opacity = 0; }); })()";

const SHOW_SPAN: &str = "function() { this.style.opacity = 1; }";
const HIDE_SPAN: &str = "function() { this.style.opacity = 0; }";

/// Each render registers the font under a fresh family name so the page
/// never resolves text against a previously loaded font.
static FONT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Launch settings shared by both browser engines.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Scratch page loaded into every session before rendering.
    pub base_page: PathBuf,
    /// Browser window size, large enough that long strings never wrap.
    pub viewport: (u32, u32),
    /// Chromium binary override. `None` uses the system default.
    pub chromium_path: Option<PathBuf>,
    /// Firefox binary. `None` probes common install locations.
    pub firefox_path: Option<PathBuf>,
    /// How long the driver keeps an idle browser process alive.
    pub idle_timeout: Duration,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            base_page: PathBuf::from("base.html"),
            viewport: (10_000, 10_000),
            chromium_path: None,
            firefox_path: None,
            idle_timeout: Duration::from_secs(300),
        }
    }
}

/// One live browser plus the tab all rendering goes through.
///
/// Dropping the session shuts the browser process down.
pub struct WebSession {
    engine: BrowserEngine,
    tab: Arc<Tab>,
    _browser: Browser,
}

impl std::fmt::Debug for WebSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebSession")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl WebSession {
    /// Launch `engine` and navigate it to the scratch page.
    ///
    /// Fails with [`TextrigError::MissingResource`] when the scratch page
    /// does not exist on disk.
    pub fn launch(engine: BrowserEngine, config: &WebConfig) -> Result<Self> {
        if !config.base_page.is_file() {
            return Err(TextrigError::MissingResource(
                config.base_page.display().to_string(),
            ));
        }
        let page = config.base_page.canonicalize()?;
        let page_url = url::Url::from_file_path(&page).map_err(|()| {
            TextrigError::browser(engine.as_str(), "scratch page path is not absolute")
        })?;

        let binary = browser_binary(engine, config)?;
        let options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some(config.viewport))
            .idle_browser_timeout(config.idle_timeout)
            .path(binary)
            .build()
            .map_err(|e| TextrigError::browser(engine.as_str(), e.to_string()))?;

        log::info!("launching {engine} session");
        let browser = Browser::new(options)
            .map_err(|e| TextrigError::browser(engine.as_str(), e.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|e| TextrigError::browser(engine.as_str(), e.to_string()))?;
        tab.navigate_to(page_url.as_str())
            .map_err(|e| TextrigError::browser(engine.as_str(), e.to_string()))?;
        tab.wait_until_navigated()
            .map_err(|e| TextrigError::browser(engine.as_str(), e.to_string()))?;

        Ok(Self {
            engine,
            tab,
            _browser: browser,
        })
    }

    pub fn engine(&self) -> BrowserEngine {
        self.engine
    }

    /// Render `strings` side by side and return the mask stack.
    ///
    /// `font_path` must be an absolute, forward-slashed path to the font
    /// file; the page loads it through a `FontFace` registered under a
    /// session-unique family name.
    pub fn render(&self, font_path: &str, size: u32, strings: &[String]) -> Result<MaskStack> {
        // The script prepends file:///, so strip the leading slash here to
        // keep the URL at exactly three.
        let font_arg = font_path.trim_start_matches('/');
        let font_name = format!("font-{}", FONT_SEQ.fetch_add(1, Ordering::Relaxed));
        let script = build_add_spans_script(font_arg, &font_name, size, strings);

        log::debug!(
            "{} render: {} strings at {size}px",
            self.engine,
            strings.len()
        );
        self.eval(&script, true)?;

        let div = self
            .tab
            .find_element("div")
            .map_err(|e| self.browser_err(e))?;
        let image = self.screenshot_gray(&div)?;
        let (width, height) = (image.width() as usize, image.height() as usize);

        let mut stack = MaskStack::new(1 + strings.len(), height, width);
        stack.channel_mut(0).copy_from_slice(image.as_raw());

        self.eval(HIDE_SPANS, false)?;
        let spans = self
            .tab
            .find_elements("span")
            .map_err(|e| self.browser_err(e))?;
        if spans.len() != strings.len() {
            return Err(TextrigError::Render(format!(
                "expected {} spans on the page, found {}",
                strings.len(),
                spans.len()
            )));
        }

        for (i, span) in spans.iter().enumerate() {
            span.call_js_fn(SHOW_SPAN, Vec::new(), false)
                .map_err(|e| self.browser_err(e))?;
            let mask = self.screenshot_gray(&div)?;
            if (mask.width(), mask.height()) != (image.width(), image.height()) {
                return Err(TextrigError::Render(format!(
                    "cluster screenshot is {}x{}, expected {}x{}",
                    mask.width(),
                    mask.height(),
                    image.width(),
                    image.height()
                )));
            }
            let channel = stack.channel_mut(1 + i);
            for (px, out) in mask.as_raw().iter().zip(channel.iter_mut()) {
                *out = u8::from(*px != 255);
            }
            span.call_js_fn(HIDE_SPAN, Vec::new(), false)
                .map_err(|e| self.browser_err(e))?;
        }

        Ok(stack)
    }

    fn eval(&self, script: &str, await_promise: bool) -> Result<()> {
        self.tab
            .evaluate(script, await_promise)
            .map_err(|e| self.browser_err(e))?;
        Ok(())
    }

    fn screenshot_gray(&self, element: &Element<'_>) -> Result<GrayImage> {
        let png = element
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png)
            .map_err(|e| self.browser_err(e))?;
        let decoded = image::load_from_memory(&png)
            .map_err(|e| TextrigError::Render(format!("screenshot decode failed: {e}")))?;
        Ok(decoded.into_luma8())
    }

    fn browser_err(&self, e: impl std::fmt::Display) -> TextrigError {
        TextrigError::browser(self.engine.as_str(), e.to_string())
    }
}

impl Drop for WebSession {
    fn drop(&mut self) {
        log::debug!("closing {} session", self.engine);
    }
}

/// Resolve the binary to launch for `engine`, honoring config overrides.
fn browser_binary(engine: BrowserEngine, config: &WebConfig) -> Result<Option<PathBuf>> {
    match engine {
        BrowserEngine::Chromium => Ok(config.chromium_path.clone()),
        BrowserEngine::Firefox => {
            if let Some(path) = &config.firefox_path {
                return Ok(Some(path.clone()));
            }
            FIREFOX_PATHS
                .iter()
                .map(Path::new)
                .find(|p| p.is_file())
                .map(|p| Some(p.to_path_buf()))
                .ok_or_else(|| {
                    TextrigError::browser(
                        engine.as_str(),
                        "firefox binary not found, set WebConfig::firefox_path",
                    )
                })
        }
    }
}

fn build_add_spans_script(
    font_path: &str,
    font_name: &str,
    size: u32,
    strings: &[String],
) -> String {
    let args = serde_json::json!([font_path, font_name, size, strings]);
    format!("({ADD_SPANS})({args})")
}
