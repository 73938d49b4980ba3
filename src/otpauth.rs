//! Provisioning URIs in the `otpauth://` format understood by authenticator apps.
//!
//! ```rust
//! use totp_issuer::{provisioning_uri, Secret};
//!
//! let secret = Secret::Encoded("JBSWY3DPEHPK3PXP".to_string());
//! let uri = provisioning_uri(&secret, "alice@example.com", "Example").unwrap();
//! assert_eq!(
//!     uri,
//!     "otpauth://totp/Example:alice%40example.com?secret=JBSWY3DPEHPK3PXP&issuer=Example"
//! );
//! ```

use crate::{Secret, TotpError};

/// Build the `otpauth://totp/` URI enrolling `account` of `issuer`.
///
/// Issuer, account and secret are percent-encoded, every byte outside
/// `A-Z a-z 0-9 - _ . ~` included. An encoded secret is used as given, a raw
/// one is base32'd without padding. Without issuer, the label is the account
/// alone and no `issuer` parameter is added.
///
/// # Errors
///
/// [`TotpError::MissingAccount`] when `account` is empty.
pub fn provisioning_uri(secret: &Secret, account: &str, issuer: &str) -> Result<String, TotpError> {
    if account.is_empty() {
        return Err(TotpError::MissingAccount);
    }
    let secret = secret.to_base32();
    let secret = urlencoding::encode(&secret);
    let account_name = urlencoding::encode(account);

    let uri = if issuer.is_empty() {
        format!("otpauth://totp/{}?secret={}", account_name, secret)
    } else {
        let issuer = urlencoding::encode(issuer);
        format!(
            "otpauth://totp/{0}:{1}?secret={2}&issuer={0}",
            issuer, account_name, secret
        )
    };
    tracing::debug!(account, issuer, len = uri.len(), "built provisioning URI");
    Ok(uri)
}
