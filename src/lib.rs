//! This library computes the 2FA codes of accounts whose TOTP secrets are kept locally, one file per issuer, and builds the provisioning URIs (and their QR codes) used to enroll those accounts in an authenticator app.
//!
//! Codes follow [rfc-6238](https://tools.ietf.org/html/rfc6238) with HMAC-SHA1, which is what every authenticator app supports.
//!
//! # Examples
//!
//! ```rust
//! use totp_issuer::{Secret, TOTP};
//!
//! let secret = Secret::Encoded("GEZDGNBVGY3TQOJQ".to_string());
//! let totp = TOTP::new(6, 30, secret.to_bytes().unwrap()).unwrap();
//! assert_eq!(totp.generate(1111111109), "343526");
//! let token = totp.generate_current().unwrap();
//! println!("{}", token);
//! ```
//!
//! ```rust
//! # #[cfg(feature = "qr")] {
//! use totp_issuer::{QrCodeEcc, TOTP};
//!
//! let totp = TOTP::new(6, 30, "TestSecretSuperSecret").unwrap();
//! let url = totp.get_url("constantoine@github.com", "Github").unwrap();
//! println!("{}", url);
//! let png = totp.get_qr_png("constantoine@github.com", "Github", QrCodeEcc::Quartile, 8).unwrap();
//! assert_eq!(&png[1..4], b"PNG");
//! # }
//! ```

mod error;
pub mod otpauth;
pub mod secret;
pub mod store;

pub use error::TotpError;
pub use otpauth::provisioning_uri;
pub use secret::{Secret, SecretParseError};

#[cfg(feature = "qr")]
pub use qrencode_image::{self, QrCodeEcc};

use constant_time_eq::constant_time_eq;

use core::fmt;

use hmac::Mac;
use std::time::{SystemTime, SystemTimeError, UNIX_EPOCH};

type HmacSha1 = hmac::Hmac<sha1::Sha1>;

/// Longest code a 31 bits truncated HMAC can fill.
pub const MAX_DIGITS: usize = 10;

/// Code length used when none is configured.
pub const DEFAULT_DIGITS: usize = 6;

/// Step duration in seconds used when none is configured.
pub const DEFAULT_STEP: u64 = 30;

fn system_time() -> Result<u64, SystemTimeError> {
    let t = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    Ok(t)
}

/// TOTP holds informations as to how to generate an auth code. Its [secret](struct.TOTP.html#structfield.secret) field is sensitive data, treat it accordingly
#[derive(Debug, Clone)]
pub struct TOTP<T = Vec<u8>> {
    /// The number of digits composing the auth code. Per [rfc-4226](https://tools.ietf.org/html/rfc4226#section-5.3), this is usually 6, sometimes 8
    ///
    /// Must stay between 1 and [`MAX_DIGITS`], as checked by [`TOTP::new`].
    pub digits: usize,
    /// Duration in seconds of a step. The recommended value per [rfc-6238](https://tools.ietf.org/html/rfc6238#section-5.2) is 30 seconds
    ///
    /// Must stay positive, as checked by [`TOTP::new`]: code generation divides by it.
    pub step: u64,
    /// non-encoded value
    pub secret: T,
}

impl<T: AsRef<[u8]>> PartialEq for TOTP<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.digits != other.digits {
            return false;
        }
        if self.step != other.step {
            return false;
        }
        constant_time_eq(self.secret.as_ref(), other.secret.as_ref())
    }
}

impl<T> fmt::Display for TOTP<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "digits: {}; step: {}; alg: SHA1", self.digits, self.step)
    }
}

impl<T: AsRef<[u8]>> TOTP<T> {
    /// Will create a new instance of TOTP with given parameters.
    ///
    /// # Description
    /// * `secret`: expect a non-encoded value, to pass in base32 string use `Secret::Encoded(String)`
    ///
    /// ```rust
    /// use totp_issuer::{Secret, TOTP};
    /// let secret = Secret::Encoded("OBWGC2LOFVZXI4TJNZTS243FMNZGK5BNGEZDG".to_string());
    /// let totp = TOTP::new(6, 30, secret.to_bytes().unwrap()).unwrap();
    /// ```
    /// * `digits`: MUST be between 1 & [`MAX_DIGITS`]
    /// * `step`: MUST be positive
    /// * `secret`: MUST NOT be empty
    ///
    /// # Errors
    ///
    /// [`TotpError::InvalidParameters`] for out of range digits or step,
    /// [`TotpError::InvalidSecretFormat`] for an empty secret.
    pub fn new(digits: usize, step: u64, secret: T) -> Result<TOTP<T>, TotpError> {
        if digits == 0 || digits > MAX_DIGITS || step == 0 {
            return Err(TotpError::InvalidParameters { digits, step });
        }
        if secret.as_ref().is_empty() {
            return Err(SecretParseError::Empty.into());
        }
        Ok(TOTP {
            digits,
            step,
            secret,
        })
    }

    /// Will create a new instance of TOTP with 6 digits and a 30 seconds step
    ///
    /// # Errors
    ///
    /// Same as [`TOTP::new`].
    pub fn with_defaults(secret: T) -> Result<TOTP<T>, TotpError> {
        TOTP::new(DEFAULT_DIGITS, DEFAULT_STEP, secret)
    }

    /// Index of the step the given timestamp falls in
    pub fn counter(&self, time: u64) -> u64 {
        time / self.step
    }

    /// Will sign the given counter
    pub fn sign(&self, counter: u64) -> Vec<u8> {
        let mut mac = HmacSha1::new_from_slice(self.secret.as_ref())
            .expect("HMAC can take a key of any size");
        mac.update(&counter.to_be_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    /// Will generate a token for the given counter
    pub fn generate_counter(&self, counter: u64) -> String {
        let result: &[u8] = &self.sign(counter);
        let offset = (result[result.len() - 1] & 15) as usize;
        let result = u32::from_be_bytes([
            result[offset],
            result[offset + 1],
            result[offset + 2],
            result[offset + 3],
        ]) & 0x7fff_ffff;
        format!(
            "{1:00$}",
            self.digits,
            u64::from(result) % 10_u64.pow(self.digits as u32)
        )
    }

    /// Will generate a token given the provided timestamp in seconds
    pub fn generate(&self, time: u64) -> String {
        self.generate_counter(self.counter(time))
    }

    /// Will generate the token `offset` steps away from the one of the provided timestamp.
    /// Steps before the epoch clamp to the first one.
    pub fn generate_offset(&self, time: u64, offset: i64) -> String {
        self.generate_counter(self.counter(time).saturating_add_signed(offset))
    }

    /// Returns the timestamp of the first second for the next step
    /// given the provided timestamp in seconds
    pub fn next_step(&self, time: u64) -> u64 {
        let step = time / self.step;

        (step + 1) * self.step
    }

    /// Returns the timestamp of the first second of the next step
    /// According to system time
    pub fn next_step_current(&self) -> Result<u64, SystemTimeError> {
        let t = system_time()?;
        Ok(self.next_step(t))
    }

    /// Give the ttl (in seconds) of the token for the provided timestamp
    pub fn ttl_at(&self, time: u64) -> u64 {
        self.step - (time % self.step)
    }

    /// Give the ttl (in seconds) of the current token
    pub fn ttl(&self) -> Result<u64, SystemTimeError> {
        let t = system_time()?;
        Ok(self.ttl_at(t))
    }

    /// Generate a token from the current system time
    pub fn generate_current(&self) -> Result<String, SystemTimeError> {
        let t = system_time()?;
        Ok(self.generate(t))
    }

    /// Will return the base32 representation of the secret, which might be useful when users want to manually add the secret to their authenticator
    pub fn get_secret_base32(&self) -> String {
        secret::encode(self.secret.as_ref())
    }

    /// Will generate a standard URL used to automatically add TOTP auths. Usually used with qr codes
    ///
    /// Label and issuer will be URL-encoded if needed be
    /// Secret will be base 32'd without padding, as per RFC.
    ///
    /// # Errors
    ///
    /// [`TotpError::MissingAccount`] when `account` is empty.
    pub fn get_url(&self, account: &str, issuer: &str) -> Result<String, TotpError> {
        provisioning_uri(
            &Secret::Encoded(self.get_secret_base32()),
            account,
            issuer,
        )
    }

    /// Will return a qrcode to automatically add a TOTP, as PNG bytes. Needs feature `qr` to be enabled!
    ///
    /// # Errors
    ///
    /// [`TotpError::MissingAccount`] when `account` is empty, [`TotpError::Qr`] when the URL
    /// doesn't fit in a QR code or `scale` is 0.
    #[cfg(feature = "qr")]
    pub fn get_qr_png(
        &self,
        account: &str,
        issuer: &str,
        ecc: QrCodeEcc,
        scale: u32,
    ) -> Result<Vec<u8>, TotpError> {
        let url = self.get_url(account, issuer)?;
        Ok(qrencode_image::draw_png(&url, ecc, scale)?)
    }

    /// Will return a qrcode to automatically add a TOTP as a base64 string. Needs feature `qr` to be enabled!
    /// Result will be in the form of a string containing a base64-encoded png, which you can embed in HTML without needing
    /// To store the png as a file.
    ///
    /// # Errors
    ///
    /// Same as [`TOTP::get_qr_png`].
    #[cfg(feature = "qr")]
    pub fn get_qr_base64(
        &self,
        account: &str,
        issuer: &str,
        ecc: QrCodeEcc,
        scale: u32,
    ) -> Result<String, TotpError> {
        let url = self.get_url(account, issuer)?;
        Ok(qrencode_image::draw_base64(&url, ecc, scale)?)
    }
}

/// Compute the code of `key` at the unix timestamp `time`.
///
/// ```rust
/// let code = totp_issuer::code(b"1234567890", 1111111109, 30, 6).unwrap();
/// assert_eq!(code, "343526");
/// ```
///
/// # Errors
///
/// Same as [`TOTP::new`].
pub fn code(key: &[u8], time: u64, step: u64, digits: usize) -> Result<String, TotpError> {
    Ok(TOTP::new(digits, step, key)?.generate(time))
}
