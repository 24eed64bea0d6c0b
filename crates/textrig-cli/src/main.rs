//! Textrig CLI - render text through any backend to PNG files

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use textrig::{MaskStack, RenderMode, Renderer};

/// Simple command-line arguments
#[derive(Debug)]
struct Args {
    /// Text to render
    text: String,
    /// Font file path
    font: PathBuf,
    /// Rendering size in pixels
    size: u32,
    /// Rendering backend
    mode: RenderMode,
    /// Output PNG path; cluster masks land next to it
    output: PathBuf,
}

impl Args {
    fn parse() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();

        if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
            usage(&args[0]);
            std::process::exit(1);
        }
        if args[1] == "--list-modes" {
            for mode in RenderMode::ALL {
                println!("{mode}");
            }
            std::process::exit(0);
        }

        let text = args[1].clone();
        let mut font = None;
        let mut size = 48u32;
        let mut mode = RenderMode::Freetype;
        let mut output = PathBuf::from("render.png");

        let mut i = 2;
        while i < args.len() {
            match args[i].as_str() {
                "--font" | "-f" => {
                    if i + 1 < args.len() {
                        font = Some(PathBuf::from(&args[i + 1]));
                        i += 2;
                    } else {
                        bail!("--font requires an argument");
                    }
                }
                "--size" | "-s" => {
                    if i + 1 < args.len() {
                        size = args[i + 1].parse().context("Invalid size value")?;
                        i += 2;
                    } else {
                        bail!("--size requires an argument");
                    }
                }
                "--mode" | "-m" => {
                    if i + 1 < args.len() {
                        mode = args[i + 1].parse()?;
                        i += 2;
                    } else {
                        bail!("--mode requires an argument");
                    }
                }
                "--output" | "-o" => {
                    if i + 1 < args.len() {
                        output = PathBuf::from(&args[i + 1]);
                        i += 2;
                    } else {
                        bail!("--output requires an argument");
                    }
                }
                _ => bail!("Unknown option: {}", args[i]),
            }
        }

        let Some(font) = font else {
            bail!("--font is required");
        };

        Ok(Args {
            text,
            font,
            size,
            mode,
            output,
        })
    }
}

fn usage(program: &str) {
    eprintln!("Usage: {program} <text> --font <file> [options]");
    eprintln!("Options:");
    eprintln!("  -f, --font <file>    Font file to render with (required)");
    eprintln!("  -s, --size <px>      Rendering size in pixels (default: 48)");
    eprintln!("  -m, --mode <mode>    freetype, skia, chromium or firefox (default: freetype)");
    eprintln!("  -o, --output <file>  Output PNG (default: render.png); masks written alongside");
    eprintln!("      --list-modes     Print the supported modes and exit");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  {program} \"Hello World\" --font DejaVuSans.ttf --size 64 --mode skia");
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse()?;

    println!(
        "Rendering \"{}\" at {}px via {}",
        args.text, args.size, args.mode
    );

    let mut renderer = Renderer::new();
    renderer.set_font(&args.font)?;
    renderer.set_text(args.text.as_str());

    let stack = if args.mode.browser_engine().is_some() {
        renderer.web_scope(|r| r.render_text(args.size, args.mode))?
    } else {
        renderer.render_text(args.size, args.mode)?
    };

    println!(
        "Rendered {} channels at {}x{} pixels",
        stack.channels(),
        stack.width(),
        stack.height()
    );

    write_channel_png(&args.output, &stack, 0, 1)?;
    println!("✓ Image written to {}", args.output.display());

    for channel in 1..stack.channels() {
        let path = mask_path(&args.output, channel);
        write_channel_png(&path, &stack, channel, 255)?;
        println!("✓ Mask {channel} written to {}", path.display());
    }

    Ok(())
}

/// Write one channel as an 8-bit grayscale PNG. Mask channels store 0/1, so
/// they pass `scale` = 255 to come out black on white.
fn write_channel_png(path: &Path, stack: &MaskStack, channel: usize, scale: u8) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, stack.width() as u32, stack.height() as u32);
    encoder.set_color(png::ColorType::Grayscale);
    encoder.set_depth(png::BitDepth::Eight);
    let mut png_writer = encoder.write_header()?;

    let data: Vec<u8> = stack
        .channel(channel)
        .iter()
        .map(|&v| v.saturating_mul(scale))
        .collect();
    png_writer.write_image_data(&data)?;
    Ok(())
}

fn mask_path(output: &Path, channel: usize) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("render");
    output.with_file_name(format!("{stem}.mask{channel}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_paths_land_next_to_the_output() {
        let path = mask_path(Path::new("out/hello.png"), 2);
        assert_eq!(path, Path::new("out/hello.mask2.png"));

        let path = mask_path(Path::new("render.png"), 1);
        assert_eq!(path, Path::new("render.mask1.png"));
    }
}
