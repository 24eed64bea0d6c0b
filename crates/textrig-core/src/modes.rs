// this_file: crates/textrig-core/src/modes.rs

//! Rendering backend selectors.

use std::fmt;
use std::str::FromStr;

use crate::TextrigError;

/// Rendering backend. The set is closed: two native rasterizers and two
/// browser engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMode {
    Freetype,
    Skia,
    Chromium,
    Firefox,
}

impl RenderMode {
    pub const ALL: [RenderMode; 4] = [
        RenderMode::Freetype,
        RenderMode::Skia,
        RenderMode::Chromium,
        RenderMode::Firefox,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::Freetype => "freetype",
            RenderMode::Skia => "skia",
            RenderMode::Chromium => "chromium",
            RenderMode::Firefox => "firefox",
        }
    }

    /// The browser engine behind this mode, if it is a browser mode.
    pub fn browser_engine(&self) -> Option<BrowserEngine> {
        match self {
            RenderMode::Chromium => Some(BrowserEngine::Chromium),
            RenderMode::Firefox => Some(BrowserEngine::Firefox),
            RenderMode::Freetype | RenderMode::Skia => None,
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = TextrigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "freetype" => Ok(RenderMode::Freetype),
            "skia" => Ok(RenderMode::Skia),
            "chromium" => Ok(RenderMode::Chromium),
            "firefox" => Ok(RenderMode::Firefox),
            other => Err(TextrigError::InvalidMode(other.to_string())),
        }
    }
}

/// Headless browser engine used by the web rendering backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BrowserEngine {
    Chromium,
    Firefox,
}

impl BrowserEngine {
    pub const ALL: [BrowserEngine; 2] = [BrowserEngine::Chromium, BrowserEngine::Firefox];

    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserEngine::Chromium => "chromium",
            BrowserEngine::Firefox => "firefox",
        }
    }
}

impl fmt::Display for BrowserEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
