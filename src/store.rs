//! Issuer files: one `<account> <base32 secret>` pair per line, stored as
//! `<home>/<issuer>.txt`.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::Secret;

/// One line of an issuer file.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub name: String,
    pub secret: Secret,
}

/// Path of the file holding the accounts of `issuer`.
pub fn issuer_file(home: &Path, issuer: &str) -> PathBuf {
    home.join(format!("{}.txt", issuer))
}

/// Parse the accounts of an issuer file.
///
/// Fields are separated by any amount of whitespace. Blank lines and lines
/// starting with `#` are skipped. A line with a single field is skipped with a
/// warning; fields after the second are ignored.
///
/// # Errors
///
/// The first read error of `reader`.
pub fn parse_accounts<R: BufRead>(reader: R) -> io::Result<Vec<Account>> {
    let mut accounts = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (name, secret) = match (fields.next(), fields.next()) {
            (Some(name), Some(secret)) => (name, secret),
            _ => {
                tracing::warn!(line = line_number, "skipping line without a secret");
                continue;
            }
        };
        let extra = fields.count();
        if extra > 0 {
            tracing::debug!(line = line_number, extra, "ignoring fields after the secret");
        }

        accounts.push(Account {
            name: name.to_string(),
            secret: Secret::Encoded(secret.to_string()),
        });
    }
    Ok(accounts)
}

/// Open and parse `<home>/<issuer>.txt`.
///
/// # Errors
///
/// The error of opening or reading the file.
pub fn read_accounts(home: &Path, issuer: &str) -> io::Result<Vec<Account>> {
    let path = issuer_file(home, issuer);
    tracing::debug!(path = %path.display(), "reading issuer file");
    let file = File::open(&path)?;
    parse_accounts(BufReader::new(file))
}

/// File name of the QR code image of `account`, `<issuer>-<account>.png`.
///
/// Characters that are unsafe in a file name become `_`.
pub fn png_file_name(issuer: &str, account: &str) -> String {
    let sanitize = |s: &str| -> String {
        s.chars()
            .map(|c| {
                if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '@' | '+') {
                    c
                } else {
                    '_'
                }
            })
            .collect()
    };
    format!("{}-{}.png", sanitize(issuer), sanitize(account))
}
