/// Different ways encoding or drawing a QR code can fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrError {
    /// The payload does not fit in a version 40 symbol at the requested error correction level.
    DataTooLarge {
        /// Bits the payload needs, headers included.
        needed_bits: usize,
        /// Data bits a version 40 symbol holds at the requested level.
        capacity_bits: usize,
    },
    /// Module scale must be at least 1 pixel, and small enough for the image side to fit in a `u32`.
    InvalidScale(u32),
    /// The PNG encoder rejected the canvas.
    Png(String),
}

impl std::error::Error for QrError {}

impl std::fmt::Display for QrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QrError::DataTooLarge {
                needed_bits,
                capacity_bits,
            } => write!(
                f,
                "Data too large for a QR code: {} bits needed, at most {} bits available",
                needed_bits, capacity_bits
            ),
            QrError::InvalidScale(scale) => {
                write!(f, "Module scale must be a positive pixel count, not {}", scale)
            }
            QrError::Png(err) => write!(f, "Could not encode QR code as PNG: {}", err),
        }
    }
}
