use super::{EncodeError, QrEncoder, QrImage, QrOptions};
use async_trait::async_trait;
use base64::prelude::*;
use image::{ImageFormat, Rgba, RgbaImage};
use qrcode::{Color, QrCode};
use std::io::Cursor;
use std::sync::Arc;

/// Pixels per module when the requested width cannot hold the symbol.
const FALLBACK_SCALE: f64 = 4.0;

/// Renders PNG data URIs.
#[derive(Clone, Default)]
pub struct PngQrEncoder;

impl PngQrEncoder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {})
    }
}

#[async_trait]
impl QrEncoder for PngQrEncoder {
    async fn encode(&self, text: &str, options: &QrOptions) -> Result<QrImage, EncodeError> {
        let image = render_png(text, options)?;
        tracing::debug!(
            intent = %itqr_core::parsing::intent_fingerprint(text),
            size_px = image.size_px,
            "QR code rendered"
        );
        Ok(image)
    }
}

pub fn render_png(text: &str, options: &QrOptions) -> Result<QrImage, EncodeError> {
    if text.is_empty() {
        return Err(EncodeError::EmptyInput);
    }
    let dark = parse_hex_color(&options.dark)?;
    let light = parse_hex_color(&options.light)?;

    let code = QrCode::with_error_correction_level(text.as_bytes(), options.ec_level.into())?;
    let bitmap = rasterize(&code, options.width, options.margin, dark, light);

    let mut bytes = Vec::new();
    bitmap
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| EncodeError::Image(e.to_string()))?;

    Ok(QrImage {
        data_uri: format!("data:image/png;base64,{}", BASE64_STANDARD.encode(&bytes)),
        size_px: bitmap.width(),
    })
}

fn rasterize(code: &QrCode, width: u32, margin: u32, dark: Rgba<u8>, light: Rgba<u8>) -> RgbaImage {
    let modules = code.width();
    let colors = code.to_colors();
    let total = modules as u32 + margin * 2;

    let scale = if width >= total {
        f64::from(width) / f64::from(total)
    } else {
        FALLBACK_SCALE
    };
    let size = (f64::from(total) * scale).floor() as u32;
    let scaled_margin = f64::from(margin) * scale;
    let inner_end = f64::from(size) - scaled_margin;

    RgbaImage::from_fn(size, size, |x, y| {
        let (px, py) = (f64::from(x), f64::from(y));
        if px < scaled_margin || py < scaled_margin || px >= inner_end || py >= inner_end {
            return light;
        }
        let col = (((px - scaled_margin) / scale).floor() as usize).min(modules - 1);
        let row = (((py - scaled_margin) / scale).floor() as usize).min(modules - 1);
        match colors[row * modules + col] {
            Color::Dark => dark,
            Color::Light => light,
        }
    })
}

/// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
fn parse_hex_color(value: &str) -> Result<Rgba<u8>, EncodeError> {
    let invalid = || EncodeError::InvalidColor(value.to_string());
    let hex = value.strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let expanded: String = match hex.len() {
        3 | 4 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => hex.to_string(),
        _ => return Err(invalid()),
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).map_err(|_| invalid());
    let alpha = if expanded.len() == 8 { channel(6)? } else { 0xff };
    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}
