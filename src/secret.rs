//! Representation of a secret either a "raw" \[u8\] or "base 32" encoded String
//!
//! # Examples
//!
//! - Create a TOTP from a "raw" secret
//! ```
//! use totp_issuer::{Secret, TOTP};
//!
//! let secret = [
//!     0x70, 0x6c, 0x61, 0x69, 0x6e, 0x2d, 0x73, 0x74, 0x72, 0x69, 0x6e, 0x67, 0x2d, 0x73, 0x65,
//!     0x63, 0x72, 0x65, 0x74, 0x2d, 0x31, 0x32, 0x33,
//! ];
//! let secret_raw = Secret::Raw(secret.to_vec());
//! let totp_raw = TOTP::new(6, 30, secret_raw.to_bytes().unwrap()).unwrap();
//!
//! println!("code from raw secret:\t{}", totp_raw.generate_current().unwrap());
//! ```
//!
//! - Create a TOTP from a base32 encoded secret, as stored in an issuer file
//! ```
//! use totp_issuer::{Secret, TOTP};
//!
//! let secret_b32 = Secret::Encoded(String::from(" gezdgnbvgy3tqojq== "));
//! let totp_b32 = TOTP::new(6, 30, secret_b32.to_bytes().unwrap()).unwrap();
//!
//! assert_eq!(totp_b32.generate(1111111109), "343526");
//! ```

use base32::{self, Alphabet};

use constant_time_eq::constant_time_eq;

/// Different ways secret parsing failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretParseError {
    /// Invalid base32 input.
    ParseBase32,
    /// A character outside `A-Z2-7`, once case and trailing padding are normalized.
    InvalidCharacter(char),
    /// The secret decodes to zero bytes.
    Empty,
}

impl std::error::Error for SecretParseError {}

impl std::fmt::Display for SecretParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretParseError::ParseBase32 => write!(f, "Could not decode base32 secret."),
            SecretParseError::InvalidCharacter(c) => {
                write!(f, "Character {:?} is not in the base32 alphabet", c)
            }
            SecretParseError::Empty => write!(f, "Secret is empty"),
        }
    }
}

/// Decode base32 text into key bytes.
///
/// Surrounding whitespace is ignored, letters may be in either case and the
/// trailing `=` padding may be present or not. Bits of a trailing partial
/// byte are dropped, so `"AB"` decodes to one byte.
///
/// # Errors
///
/// [`SecretParseError`] when a character is outside the base32 alphabet,
/// or when nothing is left to decode.
pub fn decode(text: &str) -> Result<Vec<u8>, SecretParseError> {
    let normalized = text.trim().to_ascii_uppercase();
    let unpadded = normalized.trim_end_matches('=');
    if let Some(c) = unpadded
        .chars()
        .find(|c| !matches!(c, 'A'..='Z' | '2'..='7'))
    {
        return Err(SecretParseError::InvalidCharacter(c));
    }
    let bytes = base32::decode(Alphabet::Rfc4648 { padding: false }, unpadded)
        .ok_or(SecretParseError::ParseBase32)?;
    if bytes.is_empty() {
        return Err(SecretParseError::Empty);
    }
    Ok(bytes)
}

/// Canonical upper case, unpadded base32 text of `bytes`.
pub fn encode(bytes: &[u8]) -> String {
    base32::encode(Alphabet::Rfc4648 { padding: false }, bytes)
}

/// Shared secret between the authenticator and this tool to generate tokens from.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "zeroize", derive(zeroize::Zeroize, zeroize::ZeroizeOnDrop))]
pub enum Secret {
    /// Non-encoded "raw" secret.
    Raw(Vec<u8>),
    /// Base32 encoded secret.
    Encoded(String),
}

impl PartialEq for Secret {
    /// Will check that to_bytes() returns the same.
    /// One secret can be Raw, and the other Encoded.
    /// A secret that fails to decode is equal to nothing.
    fn eq(&self, other: &Self) -> bool {
        match (self.to_bytes(), other.to_bytes()) {
            (Ok(a), Ok(b)) => constant_time_eq(&a, &b),
            _ => false,
        }
    }
}

impl Secret {
    /// Get the inner String value as a Vec of bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SecretParseError> {
        match self {
            Secret::Raw(s) => Ok(s.to_vec()),
            Secret::Encoded(s) => decode(s),
        }
    }

    /// Try to transform a `Secret::Encoded` into a `Secret::Raw`
    pub fn to_raw(&self) -> Result<Self, SecretParseError> {
        match self {
            Secret::Raw(_) => Ok(self.clone()),
            Secret::Encoded(s) => decode(s).map(Secret::Raw),
        }
    }

    /// Try to transforms a `Secret::Raw` into a `Secret::Encoded`.
    pub fn to_encoded(&self) -> Self {
        match self {
            Secret::Raw(s) => Secret::Encoded(encode(s)),
            Secret::Encoded(_) => self.clone(),
        }
    }

    /// The text that goes in a provisioning URI: the encoded secret exactly as
    /// given, or the unpadded base32 of a raw one.
    pub fn to_base32(&self) -> String {
        match self {
            Secret::Raw(s) => encode(s),
            Secret::Encoded(s) => s.clone(),
        }
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Secret::Raw(bytes) => {
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            Secret::Encoded(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, Secret, SecretParseError};

    const BASE32: &str = "OBWGC2LOFVZXI4TJNZTS243FMNZGK5BNGEZDG";
    const BYTES: [u8; 23] = [
        0x70, 0x6c, 0x61, 0x69, 0x6e, 0x2d, 0x73, 0x74, 0x72, 0x69, 0x6e, 0x67, 0x2d, 0x73, 0x65,
        0x63, 0x72, 0x65, 0x74, 0x2d, 0x31, 0x32, 0x33,
    ];
    const BYTES_DISPLAY: &str = "706c61696e2d737472696e672d7365637265742d313233";

    #[test]
    fn secret_display() {
        let base32_str = String::from(BASE32);
        let secret_raw = Secret::Raw(BYTES.to_vec());
        let secret_base32 = Secret::Encoded(base32_str);
        assert_eq!(secret_raw.to_string(), BYTES_DISPLAY.to_string());
        assert_eq!(secret_base32.to_string(), BASE32.to_string());
    }

    #[test]
    fn secret_convert_base32_raw() {
        let base32_str = String::from(BASE32);
        let secret_raw = Secret::Raw(BYTES.to_vec());
        let secret_base32 = Secret::Encoded(base32_str);

        assert_eq!(&secret_raw.to_encoded(), &secret_base32);
        assert_eq!(&secret_raw.to_raw().unwrap(), &secret_raw);

        assert_eq!(&secret_base32.to_raw().unwrap(), &secret_raw);
        assert_eq!(&secret_base32.to_encoded(), &secret_base32);
    }

    #[test]
    fn secret_as_bytes() {
        assert_eq!(
            Secret::Raw(BYTES.to_vec()).to_bytes().unwrap(),
            BYTES.to_vec()
        );
        assert_eq!(
            Secret::Encoded(BASE32.to_string()).to_bytes().unwrap(),
            BYTES.to_vec()
        );
    }

    #[test]
    fn decode_tolerates_case_padding_and_whitespace() {
        assert_eq!(decode("GEZDGNBVGY3TQOJQ").unwrap(), b"1234567890".to_vec());
        assert_eq!(decode("gezdgnbvgy3tqojq").unwrap(), b"1234567890".to_vec());
        assert_eq!(decode("MZXW6===").unwrap(), b"foo".to_vec());
        assert_eq!(decode("MZXW6").unwrap(), b"foo".to_vec());
        assert_eq!(decode("\tmzxw6===\n").unwrap(), b"foo".to_vec());
    }

    #[test]
    fn decode_round_trips_through_encode() {
        for text in ["GEZDGNBVGY3TQOJQ", "JBSWY3DPEHPK3PXP", "mzxw6===", "MFRGG", BASE32] {
            let bytes = decode(text).unwrap();
            assert_eq!(decode(&encode(&bytes)).unwrap(), bytes);
        }
    }

    #[test]
    fn decode_drops_trailing_partial_bits() {
        // Two or three characters carry 10 or 15 bits: one whole byte, the rest is ignored.
        assert_eq!(decode("AB").unwrap(), vec![0x00]);
        assert_eq!(decode("ABC").unwrap(), vec![0x00]);
        assert_eq!(decode("MZ").unwrap(), vec![0x66]);
        // A lone character is less than a byte.
        assert_eq!(decode("M"), Err(SecretParseError::Empty));
    }

    #[test]
    fn decode_rejects_bad_input() {
        assert_eq!(decode(""), Err(SecretParseError::Empty));
        assert_eq!(decode("   "), Err(SecretParseError::Empty));
        assert_eq!(decode("===="), Err(SecretParseError::Empty));
        assert_eq!(
            decode("not-base32!"),
            Err(SecretParseError::InvalidCharacter('-'))
        );
        assert_eq!(
            decode("MZ=XW6"),
            Err(SecretParseError::InvalidCharacter('='))
        );
        // 0, 1 and 8 are not in the alphabet.
        assert_eq!(
            decode("GEZDGNBVGY3TQOJ1"),
            Err(SecretParseError::InvalidCharacter('1'))
        );
    }

    #[test]
    fn secret_from_string() {
        let raw: Secret = Secret::Raw("TestSecretSuperSecret".as_bytes().to_vec());
        let encoded: Secret = Secret::Encoded("KRSXG5CTMVRXEZLUKN2XAZLSKNSWG4TFOQ".to_string());
        assert_eq!(raw.to_encoded(), encoded);
        assert_eq!(raw, encoded.to_raw().unwrap());
    }

    #[test]
    fn to_base32_keeps_encoded_text() {
        let encoded = Secret::Encoded("jbswy3dpehpk3pxp".to_string());
        assert_eq!(encoded.to_base32(), "jbswy3dpehpk3pxp");
        let raw = Secret::Raw(b"foo".to_vec());
        assert_eq!(raw.to_base32(), "MZXW6");
    }

    #[test]
    fn undecodable_secret_equals_nothing() {
        let bad = Secret::Encoded("!!".to_string());
        assert_ne!(bad, bad.clone());
    }
}
