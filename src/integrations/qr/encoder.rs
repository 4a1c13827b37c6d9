// src/integrations/qr/encoder.rs
//
// QR Encoder - `qrcode` rendered through the `image` crate

use image::imageops::{self, FilterType};
use image::Luma;
use qrcode::QrCode;

use crate::integrations::{IntegrationError, IntegrationResult, QrEncoder};

/// A square 8-bit grayscale image, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrImage {
    pub side: u32,
    pub pixels: Vec<u8>,
}

impl QrImage {
    pub fn new(side: u32, pixels: Vec<u8>) -> IntegrationResult<Self> {
        let expected = (side as usize) * (side as usize);
        if side == 0 || pixels.len() != expected {
            return Err(IntegrationError::QrEncoding(format!(
                "{} pixels do not fill a {}x{} image",
                pixels.len(),
                side,
                side
            )));
        }
        Ok(Self { side, pixels })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QrCodeEncoder;

impl QrEncoder for QrCodeEncoder {
    fn encode(&self, link: &str, side: u32) -> IntegrationResult<QrImage> {
        if side == 0 {
            return Err(IntegrationError::QrEncoding("image side must be positive".to_string()));
        }

        let code = QrCode::new(link.as_bytes())
            .map_err(|e| IntegrationError::QrEncoding(e.to_string()))?;

        let rendered = code
            .render::<Luma<u8>>()
            .quiet_zone(true)
            .max_dimensions(side, side)
            .build();

        // Module sizes are whole pixels; nearest-neighbour keeps edges sharp
        let exact = imageops::resize(&rendered, side, side, FilterType::Nearest);

        QrImage::new(side, exact.into_raw())
    }
}
