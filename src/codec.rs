use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[cfg(feature = "heic")]
pub const OPEN_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "heic", "heif"];
#[cfg(not(feature = "heic"))]
pub const OPEN_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Whether the HEIC backend was compiled in (`--features heic`).
pub const HEIC_SUPPORTED: bool = cfg!(feature = "heic");
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormatKind {
    Png,
    Jpeg,
    Heic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveFormat {
    /// Deflate level 6.
    Png,
    Jpeg { quality: u8 },
    Heic,
}

/// Pick the encoder for a save path. Unrecognised extensions are written as
/// PNG with `.png` appended to the chosen name.
pub fn resolve_target(path: &Path) -> (PathBuf, FormatKind) {
    match extension(path).as_deref() {
        Some("png") => (path.to_path_buf(), FormatKind::Png),
        Some("jpg") | Some("jpeg") => (path.to_path_buf(), FormatKind::Jpeg),
        Some("heic") | Some("heif") => (path.to_path_buf(), FormatKind::Heic),
        _ => {
            let mut name = path.as_os_str().to_os_string();
            name.push(".png");
            (PathBuf::from(name), FormatKind::Png)
        }
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

pub fn decode(path: &Path) -> Result<RgbaImage> {
    if matches!(extension(path).as_deref(), Some("heic") | Some("heif")) {
        return heif::decode(path);
    }
    let reader = ImageReader::open(path)
        .with_context(|| format!("open {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("read {}", path.display()))?;
    let image = reader
        .decode()
        .with_context(|| format!("decode {}", path.display()))?;
    Ok(image.to_rgba8())
}

pub fn encode(image: &RgbaImage, path: &Path, format: SaveFormat) -> Result<()> {
    match format {
        SaveFormat::Png => {
            let mut writer = create(path)?;
            let encoder = PngEncoder::new_with_quality(
                &mut writer,
                CompressionType::Default,
                FilterType::Adaptive,
            );
            encoder
                .write_image(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    ExtendedColorType::Rgba8,
                )
                .with_context(|| format!("encode {}", path.display()))?;
            finish(writer, path)
        }
        SaveFormat::Jpeg { quality } => {
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let mut writer = create(path)?;
            let encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
            encoder
                .write_image(
                    rgb.as_raw(),
                    rgb.width(),
                    rgb.height(),
                    ExtendedColorType::Rgb8,
                )
                .with_context(|| format!("encode {}", path.display()))?;
            finish(writer, path)
        }
        SaveFormat::Heic => heif::encode(image, path),
    }
}

#[cfg(feature = "heic")]
mod heif {
    use anyhow::{Context, Result};
    use image::RgbaImage;
    use libheif_rs::{
        Channel, ColorSpace, CompressionFormat, EncoderQuality, HeifContext, Image, LibHeif,
        RgbChroma,
    };
    use std::path::Path;

    const QUALITY: u8 = 90;
    const RGBA_BYTES: usize = 4;

    fn utf8(path: &Path) -> Result<&str> {
        path.to_str()
            .with_context(|| format!("path is not valid UTF-8: {}", path.display()))
    }

    pub fn decode(path: &Path) -> Result<RgbaImage> {
        let lib = LibHeif::new();
        let ctx = HeifContext::read_from_file(utf8(path)?)
            .with_context(|| format!("open {}", path.display()))?;
        let handle = ctx
            .primary_image_handle()
            .with_context(|| format!("read {}", path.display()))?;
        let decoded = lib
            .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgba), None)
            .with_context(|| format!("decode {}", path.display()))?;

        let planes = decoded.planes();
        let plane = planes
            .interleaved
            .with_context(|| format!("decode {}: no interleaved plane", path.display()))?;
        let row = plane.width as usize * RGBA_BYTES;
        let mut pixels = Vec::with_capacity(row * plane.height as usize);
        for y in 0..plane.height as usize {
            let start = y * plane.stride;
            pixels.extend_from_slice(&plane.data[start..start + row]);
        }
        RgbaImage::from_raw(plane.width, plane.height, pixels)
            .with_context(|| format!("decode {}: short pixel buffer", path.display()))
    }

    pub fn encode(image: &RgbaImage, path: &Path) -> Result<()> {
        let (width, height) = image.dimensions();
        let mut frame = Image::new(width, height, ColorSpace::Rgb(RgbChroma::Rgba))?;
        frame.create_plane(Channel::Interleaved, width, height, 8)?;
        {
            let planes = frame.planes_mut();
            let plane = planes.interleaved.context("no interleaved plane to fill")?;
            let row = width as usize * RGBA_BYTES;
            for (y, src) in image.as_raw().chunks_exact(row).enumerate() {
                let start = y * plane.stride;
                plane.data[start..start + row].copy_from_slice(src);
            }
        }

        let lib = LibHeif::new();
        let mut ctx = HeifContext::new()?;
        let mut encoder = lib.encoder_for_format(CompressionFormat::Hevc)?;
        encoder.set_quality(EncoderQuality::Lossy(QUALITY))?;
        ctx.encode_image(&frame, &mut encoder, None)
            .with_context(|| format!("encode {}", path.display()))?;
        ctx.write_to_file(utf8(path)?)
            .with_context(|| format!("write {}", path.display()))
    }
}

#[cfg(not(feature = "heic"))]
mod heif {
    use anyhow::{bail, Result};
    use image::RgbaImage;
    use std::path::Path;

    pub fn decode(path: &Path) -> Result<RgbaImage> {
        bail!("HEIC support is not built in (reading {})", path.display())
    }

    pub fn encode(_image: &RgbaImage, path: &Path) -> Result<()> {
        bail!("HEIC support is not built in (writing {})", path.display())
    }
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn finish(mut writer: BufWriter<File>, path: &Path) -> Result<()> {
    writer
        .flush()
        .with_context(|| format!("write {}", path.display()))
}
