#![allow(clippy::missing_errors_doc)]

use std::io::Write;
use std::path::Path;

use color_eyre::eyre::{self, Context};
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::instrument;

pub mod advise;
mod cmd;
pub mod config;
pub mod dhparams;
pub mod expiry;
pub mod publish;
pub mod renew;
pub mod toolkit;

use advise::info;
pub use config::Config;
use config::DomainPaths;

/// during integration testing we do not want to run certbot, by passing
/// the ACME implementation we can test the rest of the renewal.
pub trait ACME {
    /// Must leave `fullchain.pem` and `privkey.pem` for `domain` in the
    /// configured certbot live directory when returning `Ok`.
    fn renew<W: Write>(&self, config: &Config, domain: &str, stdout: &mut W) -> eyre::Result<()>;
}

/// The crypto operations certsync needs, normally provided by openssl.
pub trait Toolkit {
    /// Expiry moment of the first certificate in the file
    fn not_after(&self, cert: &Path) -> eyre::Result<OffsetDateTime>;
    fn generate_dh_params(&self, out: &Path, bits: u32) -> eyre::Result<()>;
}

/// Provisions DH parameters if configured, then renews and publishes every
/// domain that needs it. Returns the renewed domains.
pub fn run(
    config: &Config,
    toolkit: &impl Toolkit,
    acme_impl: &impl ACME,
    stdout: &mut impl Write,
) -> eyre::Result<Vec<String>> {
    if config.dh_parameters {
        dhparams::ensure_dh_params(config, toolkit, stdout)
            .wrap_err("Could not provide DH parameters")?;
    }
    renew_domains(config, toolkit, acme_impl, stdout)
}

/// Stops at the first domain that fails, domains before it stay published.
#[instrument(level = "debug", skip_all, fields(domains = ?config.domains))]
pub fn renew_domains(
    config: &Config,
    toolkit: &impl Toolkit,
    acme_impl: &impl ACME,
    stdout: &mut impl Write,
) -> eyre::Result<Vec<String>> {
    let started = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let format = format_description!("[day].[month].[year repr:last_two] [hour]:[minute]");
    writeln!(stdout, "=== {}: Renewing Domains ===", started.format(&format)?)?;

    let mut renewed = Vec::new();
    for domain in &config.domains {
        let paths = DomainPaths::new(config, domain);
        writeln!(stdout, "Checking {domain}...")?;

        let advice = advise::given_existing(config, &paths, toolkit, OffsetDateTime::now_utc())
            .wrap_err_with(|| format!("Could not determine if {domain} needs renewal"))?;
        advice.report(stdout)?;
        if !advice.should_renew() {
            continue;
        }

        info!(stdout, "Running certbot for {domain}")?;
        stdout.flush()?;
        acme_impl
            .renew(config, domain, stdout)
            .wrap_err_with(|| format!("Could not renew certificate for {domain}"))?;
        publish::on_disk(config, &paths, stdout)
            .wrap_err_with(|| format!("Could not publish certificate for {domain}"))?;
        renewed.push(domain.clone());
    }

    if renewed.is_empty() {
        writeln!(stdout, "No need to regenerate anything.")?;
    }
    Ok(renewed)
}

struct IndentedOut<'a> {
    out: &'a mut dyn Write,
    need_leading_tab: bool,
}

impl<'a> IndentedOut<'a> {
    fn new(out: &'a mut dyn Write) -> Self {
        Self {
            out,
            need_leading_tab: true,
        }
    }
}

impl Write for IndentedOut<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        // callers hand over whole process output with write_all, so a
        // buffer never ends inside a multi-byte character
        let text = String::from_utf8_lossy(buf);

        if self.need_leading_tab {
            self.out.write_all(b"\t")?;
        }

        // a trailing line end is not followed by a tab, the next write
        // might be the last of the output
        let indented = if let Some(without_last) = text.strip_suffix('\n') {
            self.need_leading_tab = true;
            without_last.replace('\n', "\n\t") + "\n"
        } else {
            self.need_leading_tab = false;
            text.replace('\n', "\n\t")
        };
        self.out.write_all(indented.as_bytes())?;

        // callers compare against the length they passed in
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }
}
