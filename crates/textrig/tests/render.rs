//! Integration tests for the Renderer facade

use textrig::{RenderMode, Renderer, TextrigError, WebConfig};

const FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
];

fn font_path() -> Option<&'static str> {
    FONT_PATHS
        .iter()
        .copied()
        .find(|p| std::path::Path::new(p).is_file())
}

#[test]
fn unknown_mode_strings_are_value_errors() {
    let err = "svg".parse::<RenderMode>().unwrap_err();
    assert!(matches!(err, TextrigError::InvalidMode(_)));
    assert_eq!(err.to_string(), "Invalid render mode: svg");
}

#[test]
fn operations_without_a_font_fail() {
    let renderer = Renderer::new();
    assert!(matches!(
        renderer.cluster_strings(),
        Err(TextrigError::FontNotSet)
    ));
    assert!(matches!(
        renderer.render_text(32, RenderMode::Freetype),
        Err(TextrigError::FontNotSet)
    ));
}

#[test]
fn set_font_rejects_a_missing_file() {
    let mut renderer = Renderer::new();
    let err = renderer.set_font("no/such/font.ttf").unwrap_err();
    assert!(matches!(err, TextrigError::FontLoad(_)));
    assert!(err.to_string().contains("no/such/font.ttf"));
}

#[test]
fn native_modes_produce_cropped_cluster_stacks() -> anyhow::Result<()> {
    let Some(path) = font_path() else {
        return Ok(());
    };
    let mut renderer = Renderer::new();
    renderer.set_font(path)?;
    renderer.set_text("Hi!");
    let clusters = renderer.cluster_strings()?.len();

    for mode in [RenderMode::Freetype, RenderMode::Skia] {
        let stack = renderer.render_text(48, mode)?;
        assert_eq!(stack.channels(), 1 + clusters, "{mode} channel count");
        assert!(stack.height() > 0);
        assert!(stack.width() > 0);

        // A cropped frame touches ink on all four edges.
        let last_row = stack.height() - 1;
        let last_col = stack.width() - 1;
        assert!((0..stack.width()).any(|c| stack.get(0, 0, c) != 255));
        assert!((0..stack.width()).any(|c| stack.get(0, last_row, c) != 255));
        assert!((0..stack.height()).any(|r| stack.get(0, r, 0) != 255));
        assert!((0..stack.height()).any(|r| stack.get(0, r, last_col) != 255));
    }
    Ok(())
}

#[test]
fn whitespace_only_text_fails_to_crop() -> anyhow::Result<()> {
    let Some(path) = font_path() else {
        return Ok(());
    };
    let mut renderer = Renderer::new();
    renderer.set_font(path)?;
    renderer.set_text("   ");
    let err = renderer.render_text(32, RenderMode::Freetype).unwrap_err();
    assert!(matches!(err, TextrigError::EmptyForeground));
    Ok(())
}

#[test]
fn browser_mode_without_session_is_an_error() -> anyhow::Result<()> {
    let Some(path) = font_path() else {
        return Ok(());
    };
    let mut renderer = Renderer::new();
    renderer.set_font(path)?;
    renderer.set_text("Hi");
    let err = renderer.render_text(32, RenderMode::Chromium).unwrap_err();
    assert!(matches!(err, TextrigError::SessionNotStarted { .. }));
    assert!(err.to_string().contains("chromium"));
    Ok(())
}

#[test]
fn start_web_requires_the_base_page() {
    let config = WebConfig {
        base_page: "missing-base-page.html".into(),
        ..WebConfig::default()
    };
    let mut renderer = Renderer::with_web_config(config);
    let err = renderer.start_web().unwrap_err();
    assert!(matches!(err, TextrigError::MissingResource(_)));
}

#[test]
fn text_paths_returns_one_path_per_cluster() -> anyhow::Result<()> {
    let Some(path) = font_path() else {
        return Ok(());
    };
    let mut renderer = Renderer::new();
    renderer.set_font(path)?;
    renderer.set_text("ab");
    let paths = renderer.text_paths()?;
    assert_eq!(paths.paths.len(), 2);
    assert_eq!(paths.advances.len(), 1);
    assert!(paths.advances[0] > 0.0);
    assert!(!paths.paths[0].is_empty());
    Ok(())
}

#[test]
fn web_scope_renders_and_releases_sessions() -> anyhow::Result<()> {
    // Needs system browsers, so skip in CI or when launching fails.
    if std::env::var("CI").is_ok() {
        return Ok(());
    }
    let Some(path) = font_path() else {
        return Ok(());
    };
    let base_page = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../base.html");
    let config = WebConfig {
        base_page,
        ..WebConfig::default()
    };
    let mut renderer = Renderer::with_web_config(config);
    renderer.set_font(path)?;
    renderer.set_text("Hi");

    let rendered = renderer.web_scope(|r| r.render_text(48, RenderMode::Chromium));
    let stack = match rendered {
        Ok(stack) => stack,
        Err(TextrigError::Browser { .. }) => {
            eprintln!("skipping: no usable browser on this machine");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    assert_eq!(stack.channels(), 3);
    assert!(stack.height() > 0);
    assert!(stack.width() > 0);
    Ok(())
}
