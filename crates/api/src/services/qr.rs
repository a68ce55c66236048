//! QR image rendering for entry passes.
//!
//! Renders the signed pass JSON into a PNG QR image and wraps it in a
//! `data:` URL so it can be embedded inline in the pass email.

use base64::Engine;
use image::Luma;
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;
use thiserror::Error;

/// Rendered image edge length in pixels.
const IMAGE_SIZE_PX: u32 = 300;

#[derive(Debug, Error)]
pub enum QrRenderError {
    #[error("QR encoding failed: {0}")]
    Encode(String),

    #[error("PNG encoding failed: {0}")]
    Png(String),
}

/// Renders `data` as a PNG QR image returned as a `data:image/png;base64,`
/// URL.
///
/// Error correction level M, black modules on a white quiet zone, at least
/// 300x300 pixels.
pub fn render_data_url(data: &str) -> Result<String, QrRenderError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
        .map_err(|e| QrRenderError::Encode(e.to_string()))?;

    let img = code
        .render::<Luma<u8>>()
        .min_dimensions(IMAGE_SIZE_PX, IMAGE_SIZE_PX)
        .quiet_zone(true)
        .build();

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| QrRenderError::Png(e.to_string()))?;

    Ok(format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(&png)
    ))
}
