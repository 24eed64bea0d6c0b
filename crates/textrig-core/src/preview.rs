// this_file: crates/textrig-core/src/preview.rs

//! Preview-image URL construction for the remote rendering service.
//!
//! Only the URL is built; nothing here performs a network request. The
//! query-parameter names and their order are fixed by the service.

/// Optional parameters of [`make_preview_url_with`].
#[derive(Debug, Clone)]
pub struct PreviewOptions {
    pub width: u32,
    pub spacing: i32,
    pub fg_color: String,
    pub bg_color: String,
    pub scale: u32,
    pub lang: String,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            width: 4000,
            spacing: 0,
            fg_color: "000000".into(),
            bg_color: "FFFFFF".into(),
            scale: 1,
            lang: "en".into(),
        }
    }
}

/// Preview URL for `text` rendered in the font identified by `ident`,
/// with default layout options.
pub fn make_preview_url(ident: &str, text: &str, size: u32) -> String {
    make_preview_url_with(ident, text, size, &PreviewOptions::default())
}

/// Preview URL with explicit layout options.
pub fn make_preview_url_with(ident: &str, text: &str, size: u32, opts: &PreviewOptions) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(text.as_bytes()).collect();
    format!(
        "https://sig.monotype.com/render/105/font/{ident}?rt={text}&rs={size}&w={width}&fg={fg}&bg={bg}&t=o&sc={scale}&userLang={lang}&render_mode=new&tr={spacing}",
        ident = ident,
        text = encoded,
        size = size,
        width = opts.width,
        fg = opts.fg_color,
        bg = opts.bg_color,
        scale = opts.scale,
        lang = opts.lang,
        spacing = opts.spacing,
    )
}
