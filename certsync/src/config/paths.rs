use color_eyre::{eyre, Help};
use std::path::{Component, Path, PathBuf};
use tracing::instrument;

use super::Config;

/// Everything certsync reads or writes for a single domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainPaths {
    /// certbot's full chain, signed certificate first
    pub cert: PathBuf,
    /// certbot's private key
    pub key: PathBuf,
    /// published certificate, or certificate and key when merging
    pub cert_copy: PathBuf,
    /// published key, unused when merging
    pub key_copy: PathBuf,
}

impl DomainPaths {
    #[instrument(level = "debug", skip(config), ret)]
    pub fn new(config: &Config, domain: &str) -> Self {
        let live = config.cert_dir.join(domain);
        Self {
            cert: live.join("fullchain.pem"),
            key: live.join("privkey.pem"),
            cert_copy: config.cert_copy_dir.join(format!("{domain}.pem")),
            key_copy: config.cert_copy_dir.join(format!("{domain}.key")),
        }
    }
}

#[must_use]
pub fn dh_params(cert_copy_dir: &Path) -> PathBuf {
    cert_copy_dir.join("dhparams.pem")
}

/// certbot only takes the directory above `live` (`--config-dir`), so the
/// configured live directory has to be named `live`.
pub(super) fn check_cert_dir(cert_dir: &Path) -> eyre::Result<()> {
    let named_live = cert_dir.file_name().is_some_and(|name| name == "live");
    if !named_live || cert_dir.parent().is_none() {
        return Err(eyre::eyre!("Invalid certbot live directory: {}", cert_dir.display()))
            .with_note(|| "certbot keeps certificates in <config dir>/live")
            .suggestion("Point CERT_DIR at the live directory, for example /etc/letsencrypt/live");
    }
    Ok(())
}

/// A domain ends up as a directory name under the certbot live dir and
/// as a file name in the output dir. It must stay exactly that.
pub(super) fn check_domain(domain: &str) -> eyre::Result<()> {
    let mut components = Path::new(domain).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );

    if !single_normal || domain.starts_with('.') || domain.contains('\\') {
        return Err(eyre::eyre!("Invalid domain: {domain:?}"))
            .with_note(|| "domains can not contain path separators or start with a dot")
            .suggestion("Separate domains in DOMAINS with single spaces");
    }
    Ok(())
}
