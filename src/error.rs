#[cfg(feature = "qr")]
use qrencode_image::QrError;

use crate::SecretParseError;

/// Everything that can go wrong computing a code or a provisioning URI for one account.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TotpError {
    /// The shared secret is not usable base32.
    InvalidSecretFormat(String),
    /// Time step and number of digits must both be positive.
    InvalidParameters { digits: usize, step: u64 },
    /// A provisioning URI needs an account name.
    MissingAccount,
    #[cfg(feature = "qr")]
    /// Encoding or drawing the QR code failed.
    Qr(QrError),
}

impl std::error::Error for TotpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "qr")]
            TotpError::Qr(e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for TotpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TotpError::InvalidSecretFormat(reason) => write!(
                f,
                "Secret is not a valid base32 string: {}",
                reason
            ),
            TotpError::InvalidParameters { digits, step } => write!(
                f,
                "Digits must be between 1 and {} and step must be positive, got {} digits and a {} second step",
                crate::MAX_DIGITS,
                digits,
                step,
            ),
            TotpError::MissingAccount => write!(
                f,
                "An account name is required to build a provisioning URI"
            ),
            #[cfg(feature = "qr")]
            TotpError::Qr(e) => write!(
                f,
                "Could not render QR code: {}",
                e
            ),
        }
    }
}

impl From<SecretParseError> for TotpError {
    fn from(e: SecretParseError) -> Self {
        TotpError::InvalidSecretFormat(e.to_string())
    }
}

#[cfg(feature = "qr")]
impl From<QrError> for TotpError {
    fn from(e: QrError) -> Self {
        TotpError::Qr(e)
    }
}
