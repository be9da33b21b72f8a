use std::ffi::OsString;
use std::io::Write;

use color_eyre::eyre;
use color_eyre::Help;
use tracing::{debug, instrument};

use crate::advise::warning;
use crate::config::Config;
use crate::{cmd, IndentedOut, ACME};

/// Asks certbot for a certificate for a single domain. Certbot answers the
/// http-01 challenge itself (standalone) and does not touch any web server.
pub(crate) fn certonly_args(config: &Config, domain: &str) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "certonly",
        "--non-interactive",
        "--standalone",
        "--preferred-challenges",
        "http-01",
        "--agree-tos",
        "--renew-by-default",
        "--server",
        config.acme_server.as_str(),
        "--email",
        config.email.as_str(),
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    // certbot writes to <config dir>/live/<domain>, which is where we read
    args.push("--config-dir".into());
    args.push(config.certbot_config_dir().into());
    args.push("-d".into());
    args.push(domain.into());
    args
}

pub struct Certbot;

impl ACME for Certbot {
    #[instrument(level = "debug", skip(self, config, stdout))]
    fn renew<W: Write>(&self, config: &Config, domain: &str, stdout: &mut W) -> eyre::Result<()> {
        let output = cmd::output(&config.certbot, &certonly_args(config, domain))?;
        if output.status.success() {
            debug!("certbot issued a certificate for {domain}");
            return Ok(());
        }

        warning!(stdout, "certbot failed for {domain}:")?;
        let mut stdout = IndentedOut::new(stdout);
        stdout.write_all(&output.stdout)?;
        stdout.write_all(&output.stderr)?;
        stdout.flush()?;

        Err(eyre::eyre!("certbot could not get a certificate"))
            .with_note(|| format!("exit status: {}", output.status))
            .with_note(|| format!("domain: {domain}"))
            .suggestion(
                "Standalone mode needs port 80 to be free and reachable from the internet \
                for the domain",
            )
    }
}
