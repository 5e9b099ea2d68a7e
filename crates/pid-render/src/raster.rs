//! PNG conversion of a diagram.
//!
//! The diagram is loaded and sanitized first; `resvg` only ever sees the
//! static markup emitted from the validated scene. Output size is the
//! declared view box (or 1920×1080 when the document has none) times the
//! supersampling factor, on an opaque background.

use crate::markup::render_static;
use pid_core::{Scene, load_scene};

/// Logical size used when a document declares no view box.
pub const FALLBACK_SIZE: (f64, f64) = (1920.0, 1080.0);

/// Longest pixmap side we are willing to allocate.
pub const MAX_DIMENSION: u32 = 16_384;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("diagram contains nothing to render")]
    EmptyScene,
    #[error("failed to parse SVG")]
    SvgParse,
    #[error("raster size {width}x{height} exceeds the {MAX_DIMENSION}px limit")]
    TooLarge { width: u32, height: u32 },
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("invalid scale factor {0}")]
    InvalidScale(f32),
}

pub type Result<T> = std::result::Result<T, RasterError>;

#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub scale: f32,
    /// CSS-style color (`white`, `#rrggbb`, ...). `None` leaves it transparent.
    pub background: Option<String>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            background: Some("white".to_string()),
        }
    }
}

/// An encoded PNG and its pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Sanitize and rasterize an SVG string.
pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    scene_to_png(&load_scene(svg), options)
}

/// Rasterize an already-loaded scene.
pub fn scene_to_png(scene: &Scene, options: &RasterOptions) -> Result<Vec<u8>> {
    rasterize(scene, options).map(|image| image.png)
}

/// Rasterize a scene, keeping the pixel dimensions alongside the bytes.
pub fn rasterize(scene: &Scene, options: &RasterOptions) -> Result<RasterImage> {
    let pixmap = scene_to_pixmap(scene, options)?;
    let png = pixmap.encode_png().map_err(|_| RasterError::PngEncode)?;
    Ok(RasterImage {
        width: pixmap.width(),
        height: pixmap.height(),
        png,
    })
}

fn scene_to_pixmap(scene: &Scene, options: &RasterOptions) -> Result<tiny_skia::Pixmap> {
    if scene.is_empty() {
        return Err(RasterError::EmptyScene);
    }
    let scale = options.scale;
    if !(scale.is_finite() && scale > 0.0) {
        return Err(RasterError::InvalidScale(scale));
    }

    let (width, height) = if scene.view_box_declared {
        (scene.view_box.width, scene.view_box.height)
    } else {
        FALLBACK_SIZE
    };
    let width_px = (width * f64::from(scale)).ceil().max(1.0);
    let height_px = (height * f64::from(scale)).ceil().max(1.0);
    if width_px > f64::from(MAX_DIMENSION) || height_px > f64::from(MAX_DIMENSION) {
        return Err(RasterError::TooLarge {
            width: width_px.min(f64::from(u32::MAX)) as u32,
            height: height_px.min(f64::from(u32::MAX)) as u32,
        });
    }

    let markup = render_static(scene, Some((width, height)));
    let mut opt = usvg::Options::default();
    #[cfg(feature = "system-fonts")]
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "Arial".to_string();
    let tree = usvg::Tree::from_str(&markup, &opt).map_err(|e| {
        log::warn!("usvg rejected sanitized markup: {e}");
        RasterError::SvgParse
    })?;

    let mut pixmap = tiny_skia::Pixmap::new(width_px as u32, height_px as u32)
        .ok_or(RasterError::PixmapAlloc)?;
    if let Some(color) = options.background.as_deref().and_then(parse_color) {
        pixmap.fill(color);
    }
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    log::debug!("rasterized diagram to {}x{}", pixmap.width(), pixmap.height());
    Ok(pixmap)
}

/// Parse `white`, `black`, `transparent` or a 3/4/6/8-digit hex color.
pub fn parse_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => return Some(tiny_skia::Color::WHITE),
        "black" => return Some(tiny_skia::Color::BLACK),
        _ => {}
    }

    let hex = s.strip_prefix('#')?;
    let nibble = |c: u8| (c as char).to_digit(16).map(|v| v as u8);
    let bytes = hex.as_bytes();
    let channels: Vec<u8> = match bytes.len() {
        3 | 4 => bytes
            .iter()
            .map(|&c| nibble(c).map(|v| (v << 4) | v))
            .collect::<Option<_>>()?,
        6 | 8 => bytes
            .chunks_exact(2)
            .map(|p| Some((nibble(p[0])? << 4) | nibble(p[1])?))
            .collect::<Option<_>>()?,
        _ => return None,
    };
    let alpha = channels.get(3).copied().unwrap_or(255);
    Some(tiny_skia::Color::from_rgba8(
        channels[0],
        channels[1],
        channels[2],
        alpha,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

    #[test]
    fn png_has_signature_and_supersampled_size() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 20"><rect width="10" height="10" fill="black"/></svg>"#;
        let scene = load_scene(svg);
        let pixmap = scene_to_pixmap(&scene, &RasterOptions::default()).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (20, 40));
        // Lower half stays the white background.
        let bottom = pixmap.pixel(10, 35).unwrap();
        assert_eq!((bottom.red(), bottom.green(), bottom.blue()), (255, 255, 255));

        let bytes = svg_to_png(svg, &RasterOptions::default()).unwrap();
        assert!(bytes.starts_with(PNG_SIGNATURE));

        let image = rasterize(&scene, &RasterOptions::default()).unwrap();
        assert_eq!((image.width, image.height), (20, 40));
    }

    #[test]
    fn missing_view_box_uses_fallback_size() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><rect width="10" height="10"/></svg>"#;
        let options = RasterOptions {
            scale: 0.5,
            ..RasterOptions::default()
        };
        let pixmap = scene_to_pixmap(&load_scene(svg), &options).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (960, 540));
    }

    #[test]
    fn empty_and_oversized_scenes_fail() {
        assert!(matches!(
            svg_to_png("<svg", &RasterOptions::default()),
            Err(RasterError::EmptyScene)
        ));
        let huge = r#"<svg viewBox="0 0 100000 10"><rect width="1" height="1"/></svg>"#;
        assert!(matches!(
            svg_to_png(huge, &RasterOptions::default()),
            Err(RasterError::TooLarge { .. })
        ));
    }

    #[test]
    fn bad_scale_is_rejected() {
        let svg = r#"<svg viewBox="0 0 10 10"><rect width="1" height="1"/></svg>"#;
        let options = RasterOptions {
            scale: 0.0,
            background: None,
        };
        assert!(matches!(
            svg_to_png(svg, &options),
            Err(RasterError::InvalidScale(_))
        ));
    }

    #[test]
    fn colors() {
        assert_eq!(parse_color("#fff"), Some(tiny_skia::Color::WHITE));
        assert_eq!(
            parse_color("#00000080").map(|c| c.alpha() < 0.6),
            Some(true)
        );
        assert_eq!(parse_color("chartreuse"), None);
        assert_eq!(parse_color("#12345"), None);
    }
}
