use core::fmt;
use core::str::FromStr;

/// Error correction level of a QR code.
///
/// The percentages are the share of codewords that can be damaged while the symbol stays readable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QrCodeEcc {
    /// ~7%
    Low,
    /// ~15%
    Medium,
    /// ~25%
    Quartile,
    /// ~30%
    High,
}

impl Default for QrCodeEcc {
    /// Quartile is what authenticator enrollment codes are usually printed with.
    fn default() -> Self {
        QrCodeEcc::Quartile
    }
}

impl QrCodeEcc {
    /// All four levels, from the lowest to the highest redundancy.
    pub const ALL: [QrCodeEcc; 4] = [
        QrCodeEcc::Low,
        QrCodeEcc::Medium,
        QrCodeEcc::Quartile,
        QrCodeEcc::High,
    ];

    /// Row of this level in the block tables.
    pub(crate) fn ordinal(self) -> usize {
        match self {
            QrCodeEcc::Low => 0,
            QrCodeEcc::Medium => 1,
            QrCodeEcc::Quartile => 2,
            QrCodeEcc::High => 3,
        }
    }

    /// The two bits stored in the format information.
    pub(crate) fn format_bits(self) -> u32 {
        match self {
            QrCodeEcc::Low => 1,
            QrCodeEcc::Medium => 0,
            QrCodeEcc::Quartile => 3,
            QrCodeEcc::High => 2,
        }
    }
}

impl fmt::Display for QrCodeEcc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QrCodeEcc::Low => f.write_str("L"),
            QrCodeEcc::Medium => f.write_str("M"),
            QrCodeEcc::Quartile => f.write_str("Q"),
            QrCodeEcc::High => f.write_str("H"),
        }
    }
}

impl FromStr for QrCodeEcc {
    type Err = String;

    /// Accepts the one-letter names (`L`, `M`, `Q`, `H`) and the long ones, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "L" | "LOW" => Ok(QrCodeEcc::Low),
            "M" | "MEDIUM" => Ok(QrCodeEcc::Medium),
            "Q" | "QUARTILE" => Ok(QrCodeEcc::Quartile),
            "H" | "HIGH" => Ok(QrCodeEcc::High),
            _ => Err(format!(
                "Error correction level can only be L, M, Q or H, not \"{}\"",
                s
            )),
        }
    }
}
