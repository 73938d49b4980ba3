//! Encode text into QR code symbols and draw them to a canvas provided by the `image` crate.
//!
//! ```rust
//! use qrencode_image::{QrCode, QrCodeEcc};
//!
//! let qr = QrCode::encode_text("otpauth://totp/Example:alice?secret=JBSWY3DPEHPK3PXP", QrCodeEcc::Quartile).unwrap();
//! let png = qrencode_image::render_png(&qr, 8).unwrap();
//! assert_eq!(&png[1..4], b"PNG");
//! ```
use image::{ImageEncoder, Luma};

pub use image;

mod ecc;
mod error;
mod mask;
mod reed_solomon;
mod segment;
mod symbol;
mod tables;

pub use ecc::QrCodeEcc;
pub use error::QrError;
pub use segment::{BitBuffer, Mode, Segment};
pub use symbol::{QrCode, QUIET_ZONE};
pub use tables::Version;

/// Pixels per module used when no scale is given.
pub const DEFAULT_SCALE: u32 = 8;

/// Side of the drawn image in pixels, quiet zone included.
fn image_size(qr: &QrCode, scale: u32) -> Result<u32, QrError> {
    if scale < 1 {
        return Err(QrError::InvalidScale(scale));
    }
    (qr.size() as u32 + 2 * QUIET_ZONE)
        .checked_mul(scale)
        .ok_or(QrError::InvalidScale(scale))
}

/// Draw a QR code to an image buffer.
///
/// Every module becomes a `scale`×`scale` square, black for dark and white for light,
/// and a white quiet zone of [`QUIET_ZONE`] modules surrounds the symbol,
/// as some QR code readers don't work without it.
///
/// # Errors
///
/// [`QrError::InvalidScale`] when `scale` is 0 or the image side would overflow.
pub fn draw_canvas(
    qr: &QrCode,
    scale: u32,
) -> Result<image::ImageBuffer<Luma<u8>, Vec<u8>>, QrError> {
    let image_size = image_size(qr, scale)?;
    let mut canvas = image::GrayImage::from_pixel(image_size, image_size, Luma([255]));

    let size = qr.size() as u32;
    for y_qr in 0..size {
        for x_qr in 0..size {
            if !qr.get_module(x_qr as i32, y_qr as i32) {
                continue;
            }
            let x_start = (x_qr + QUIET_ZONE) * scale;
            let y_start = (y_qr + QUIET_ZONE) * scale;
            for y_img in y_start..y_start + scale {
                for x_img in x_start..x_start + scale {
                    canvas.put_pixel(x_img, y_img, Luma([0]));
                }
            }
        }
    }
    Ok(canvas)
}

/// Encode a QR code as an 8-bit grayscale PNG.
///
/// # Errors
///
/// [`QrError::InvalidScale`] for a zero or oversized `scale`, and [`QrError::Png`]
/// if the `image` encoder fails, which shouldn't happen for a well formed canvas.
pub fn render_png(qr: &QrCode, scale: u32) -> Result<Vec<u8>, QrError> {
    let canvas = draw_canvas(qr, scale)?;
    let (width, height) = canvas.dimensions();

    let mut vec = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut vec);
    encoder
        .write_image(canvas.as_raw(), width, height, image::ColorType::L8)
        .map_err(|err| QrError::Png(err.to_string()))?;
    tracing::debug!(width, bytes = vec.len(), "rendered QR code to PNG");
    Ok(vec)
}

/// Draw text to a PNG QR code.
///
/// # Errors
///
/// [`QrError::DataTooLarge`] when the text doesn't fit in a version 40 symbol at `ecc`,
/// plus the errors of [`render_png`].
pub fn draw_png(text: &str, ecc: QrCodeEcc, scale: u32) -> Result<Vec<u8>, QrError> {
    let qr = QrCode::encode_text(text, ecc)?;
    render_png(&qr, scale)
}

/// Draw text to a Base64-encoded PNG QR code.
///
/// # Errors
///
/// Same as [`draw_png`].
#[cfg(feature = "base64")]
pub fn draw_base64(text: &str, ecc: QrCodeEcc, scale: u32) -> Result<String, QrError> {
    use base64::{engine::general_purpose, Engine as _};
    draw_png(text, ecc, scale).map(|vec| general_purpose::STANDARD.encode(vec))
}
