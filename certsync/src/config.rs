use std::path::{Path, PathBuf};

use color_eyre::{eyre, Help};

mod args;
pub mod paths;

pub use args::{RunArgs, LETSENCRYPT_PRODUCTION};
pub use paths::DomainPaths;

pub const RENEWAL_DAYS: u32 = 28;

#[derive(Debug, Clone)]
pub struct Config {
    pub domains: Vec<String>,
    pub email: String,
    pub merge_key_with_certificate: bool,
    pub dh_parameters: bool,
    pub force: bool,
    pub cert_dir: PathBuf,
    pub cert_copy_dir: PathBuf,
    pub acme_server: String,
    pub renewal_days: u32,
    pub certbot: PathBuf,
    pub openssl: PathBuf,
}

impl TryFrom<RunArgs> for Config {
    type Error = eyre::Report;

    fn try_from(args: RunArgs) -> Result<Self, Self::Error> {
        // consecutive spaces in DOMAINS give empty entries
        let domains: Vec<String> = args
            .domains
            .into_iter()
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty())
            .collect();
        if domains.is_empty() {
            return Err(eyre::eyre!("No domains configured"))
                .suggestion("Set DOMAINS to a space separated list of domains");
        }
        for domain in &domains {
            paths::check_domain(domain)?;
        }

        paths::check_cert_dir(&args.cert_dir)?;

        let email = args
            .email
            .map(|e| e.trim().to_owned())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| eyre::eyre!("No contact email configured"))
            .suggestion("Set EMAIL, the certificate authority needs it to register an account")?;

        if args.acme_server.trim().is_empty() {
            return Err(eyre::eyre!("ACME server can not be empty"))
                .with_note(|| format!("the default is: {LETSENCRYPT_PRODUCTION}"));
        }

        Ok(Config {
            domains,
            email,
            merge_key_with_certificate: args.merge_key_with_certificate,
            dh_parameters: args.dh_parameters,
            force: args.force,
            cert_dir: args.cert_dir,
            cert_copy_dir: args.cert_copy_dir,
            acme_server: args.acme_server,
            renewal_days: args.renewal_days,
            certbot: args.certbot,
            openssl: args.openssl,
        })
    }
}

impl Config {
    /// certbot's `--config-dir`, certificates end up in `<config dir>/live`
    #[must_use]
    pub fn certbot_config_dir(&self) -> &Path {
        self.cert_dir.parent().unwrap_or(&self.cert_dir)
    }

    /// certbot live dir at `dir/live`, output at `dir/certs`
    #[must_use]
    pub fn test(dir: &Path) -> Self {
        Config {
            domains: vec!["testdomain.org".into()],
            email: "test@testdomain.org".into(),
            merge_key_with_certificate: false,
            dh_parameters: false,
            force: false,
            cert_dir: dir.join("live"),
            cert_copy_dir: dir.join("certs"),
            acme_server: LETSENCRYPT_PRODUCTION.into(),
            renewal_days: RENEWAL_DAYS,
            certbot: PathBuf::from("certbot"),
            openssl: PathBuf::from("openssl"),
        }
    }
}
