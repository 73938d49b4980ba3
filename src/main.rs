//! `totp <issuer>`: print the current code of every account stored in
//! `$TOTP_HOME/<issuer>.txt`, or render their provisioning QR codes with `--qr`.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use totp_issuer::qrencode_image;
use totp_issuer::store::{self, Account};
use totp_issuer::{
    provisioning_uri, QrCodeEcc, TotpError, DEFAULT_DIGITS, DEFAULT_STEP, MAX_DIGITS, TOTP,
};

#[derive(Parser, Debug)]
#[command(
    name = "totp",
    author,
    version,
    about = "calculate TOTP for given issuer",
    long_about = "Calculate the TOTP codes of every account of an issuer.\n\nAccounts are read from <home>/<issuer>.txt, one \"<account> <base32 secret>\" pair per line."
)]
struct Args {
    /// Issuer whose accounts are read from `<home>/<issuer>.txt`
    issuer: String,

    /// Render provisioning QR codes instead of printing codes
    #[arg(long)]
    qr: bool,

    /// Directory the QR code images are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Print QR codes as base64 PNG data URIs instead of writing files
    #[arg(long, requires = "qr")]
    base64: bool,

    /// QR code error correction level: L, M, Q or H
    #[arg(long, default_value_t = QrCodeEcc::Quartile)]
    ecc: QrCodeEcc,

    /// Pixels per QR code module
    #[arg(long, default_value_t = qrencode_image::DEFAULT_SCALE, value_parser = clap::value_parser!(u32).range(1..))]
    scale: u32,

    /// Number of digits of the codes
    #[arg(long, default_value_t = DEFAULT_DIGITS as u8, value_parser = clap::value_parser!(u8).range(1..=MAX_DIGITS as i64))]
    digits: u8,

    /// Duration of a code in seconds
    #[arg(long, default_value_t = DEFAULT_STEP, value_parser = clap::value_parser!(u64).range(1..))]
    step: u64,

    /// Directory holding the issuer files [default: ~/.totp]
    #[arg(long, env = "TOTP_HOME")]
    home: Option<PathBuf>,

    /// Debug logging, and print the URI behind each QR code
    #[arg(long)]
    debug: bool,
}

/// Everything one run needs, resolved from the command line and environment.
#[derive(Debug, Clone)]
struct TotpConfig {
    issuer: String,
    home: PathBuf,
    qr: bool,
    out_dir: PathBuf,
    base64: bool,
    ecc: QrCodeEcc,
    scale: u32,
    digits: usize,
    step: u64,
    debug: bool,
}

impl TotpConfig {
    fn from_args(args: Args) -> Result<Self> {
        let home = match args.home {
            Some(home) => home,
            None => dirs::home_dir()
                .context("could not find the home directory, set TOTP_HOME")?
                .join(".totp"),
        };
        Ok(TotpConfig {
            issuer: args.issuer,
            home,
            qr: args.qr,
            out_dir: args.out_dir,
            base64: args.base64,
            ecc: args.ecc,
            scale: args.scale,
            digits: usize::from(args.digits),
            step: args.step,
            debug: args.debug,
        })
    }
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn show_code<W: Write>(config: &TotpConfig, account: &Account, out: &mut W) -> Result<()> {
    let key = account.secret.to_bytes().map_err(TotpError::from)?;
    let totp = TOTP::new(config.digits, config.step, key)?;
    let code = totp
        .generate_current()
        .context("system clock is set before 1970")?;
    writeln!(out, "{}", code)?;
    Ok(())
}

fn show_qr<W: Write>(config: &TotpConfig, account: &Account, out: &mut W) -> Result<()> {
    account.secret.to_bytes().map_err(TotpError::from)?;
    let uri = provisioning_uri(&account.secret, &account.name, &config.issuer)?;
    if config.debug {
        writeln!(out, "QR encoded : {}", uri)?;
    }

    if config.base64 {
        let encoded = qrencode_image::draw_base64(&uri, config.ecc, config.scale)
            .map_err(TotpError::from)?;
        writeln!(out, "data:image/png;base64,{}", encoded)?;
        return Ok(());
    }

    let png = qrencode_image::draw_png(&uri, config.ecc, config.scale).map_err(TotpError::from)?;
    let path = config
        .out_dir
        .join(store::png_file_name(&config.issuer, &account.name));
    fs::write(&path, png).with_context(|| format!("could not write `{}`", path.display()))?;
    writeln!(out, "QR code    : {}", path.display())?;
    Ok(())
}

/// Handle every account of the issuer, returning how many failed.
fn run<W: Write>(config: &TotpConfig, out: &mut W) -> Result<usize> {
    let accounts = store::read_accounts(&config.home, &config.issuer).with_context(|| {
        format!(
            "could not read accounts of `{}` from `{}`",
            config.issuer,
            store::issuer_file(&config.home, &config.issuer).display()
        )
    })?;
    if accounts.is_empty() {
        tracing::warn!(issuer = %config.issuer, "no accounts found");
    }

    if config.qr && !config.base64 {
        fs::create_dir_all(&config.out_dir).with_context(|| {
            format!("could not create directory `{}`", config.out_dir.display())
        })?;
    }

    let mut failed = 0;
    for account in &accounts {
        writeln!(out)?;
        writeln!(out, "account    : {}", account.name)?;
        let result = if config.qr {
            show_qr(config, account, out)
        } else {
            show_code(config, account, out)
        };
        if let Err(err) = result {
            failed += 1;
            tracing::error!(account = %account.name, "{:#}", err);
        }
    }
    Ok(failed)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.debug);

    let result = TotpConfig::from_args(args).and_then(|config| {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        run(&config, &mut out)
    });
    match result {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            tracing::error!(failed, "some accounts could not be handled");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
