use clap::{ArgAction, Parser};
use std::convert::Infallible;
use std::path::PathBuf;

/// Let's Encrypt production directory
pub const LETSENCRYPT_PRODUCTION: &str = "https://acme-v02.api.letsencrypt.org/directory";

/// Booleans in the environment are only true when set to exactly `true`,
/// anything else (`yes`, `1`, `True`) counts as false.
fn env_flag(s: &str) -> Result<bool, Infallible> {
    Ok(s == "true")
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Domains to keep a certificate for, separated by spaces. Each
    /// domain gets its own certificate.
    #[clap(long, env = "DOMAINS", value_delimiter = ' ', num_args = 1..)]
    pub domains: Vec<String>,

    /// Contact address for the ACME account
    #[clap(long, env = "EMAIL")]
    pub email: Option<String>,

    /// Write the certificate chain followed by the private key into
    /// a single <domain>.pem instead of a separate <domain>.key
    #[clap(
        long,
        env = "MERGE_KEY_WITH_CERTIFICATE",
        action = ArgAction::Set,
        value_parser = env_flag,
        default_value = "false",
        default_missing_value = "true",
        num_args = 0..=1,
    )]
    pub merge_key_with_certificate: bool,

    /// Make sure dhparams.pem exists in the output directory,
    /// generating it can take minutes
    #[clap(
        long,
        env = "DH_PARAMETERS",
        action = ArgAction::Set,
        value_parser = env_flag,
        default_value = "false",
        default_missing_value = "true",
        num_args = 0..=1,
    )]
    pub dh_parameters: bool,

    /// Renew certificates even if they are not due yet
    #[clap(
        long,
        env = "FORCE_RENEWAL",
        action = ArgAction::Set,
        value_parser = env_flag,
        default_value = "false",
        default_missing_value = "true",
        num_args = 0..=1,
    )]
    pub force: bool,

    /// Directory where certbot keeps the live certificates
    #[clap(long, env = "CERT_DIR", default_value = "/etc/letsencrypt/live")]
    pub cert_dir: PathBuf,

    /// Directory the certificates and keys are published to
    #[clap(long, env = "CERT_COPY_DIR", default_value = "/certs")]
    pub cert_copy_dir: PathBuf,

    /// ACME directory certbot should talk to
    #[clap(long, env = "ACME_SERVER", default_value = LETSENCRYPT_PRODUCTION)]
    pub acme_server: String,

    /// Renew once a certificate expires within this many days
    #[clap(long, env = "RENEWAL_DAYS", default_value_t = 28)]
    pub renewal_days: u32,

    /// Certbot executable
    #[clap(long, env = "CERTBOT_BIN", default_value = "certbot")]
    pub certbot: PathBuf,

    /// OpenSSL executable
    #[clap(long, env = "OPENSSL_BIN", default_value = "openssl")]
    pub openssl: PathBuf,

    /// Verbose tracing and source locations in error reports
    #[clap(
        long,
        env = "CERTSYNC_DEBUG",
        action = ArgAction::Set,
        value_parser = env_flag,
        default_value = "false",
        default_missing_value = "true",
        num_args = 0..=1,
    )]
    pub debug: bool,
}
