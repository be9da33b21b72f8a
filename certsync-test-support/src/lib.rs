use std::cell::{Cell, RefCell};
use std::fs;
use std::io::Write;
use std::path::Path;

use certsync::config::DomainPaths;
use certsync::{Config, Toolkit, ACME};
use color_eyre::eyre::{self, Context};
use tempfile::TempDir;
use time::OffsetDateTime;
use x509_parser::pem::Pem;

pub mod gen_cert;

/// Reads expiry straight from the certificate, as openssl would
#[derive(Default)]
pub struct TestToolkit {
    pub dh_generations: Cell<usize>,
    pub expiry_queries: Cell<usize>,
}

impl Toolkit for TestToolkit {
    fn not_after(&self, cert: &Path) -> eyre::Result<OffsetDateTime> {
        self.expiry_queries.set(self.expiry_queries.get() + 1);
        let bytes = fs::read(cert).wrap_err("could not read certificate")?;
        let pem = Pem::iter_from_buffer(&bytes)
            .next()
            .ok_or_else(|| eyre::eyre!("no pem in certificate file"))??;
        let cert = pem.parse_x509()?;
        Ok(cert.validity().not_after.to_datetime())
    }

    fn generate_dh_params(&self, out: &Path, bits: u32) -> eyre::Result<()> {
        self.dh_generations.set(self.dh_generations.get() + 1);
        let params = format!(
            "-----BEGIN DH PARAMETERS-----\nnot really {bits} bits\n-----END DH PARAMETERS-----\n"
        );
        fs::write(out, params).wrap_err("could not write dh params")
    }
}

/// Stands in for certbot: writes a freshly generated certificate to the
/// live directory, or fails for one chosen domain.
pub struct TestAcme {
    cert_expires: OffsetDateTime,
    fail_for: Option<String>,
    pub attempts: RefCell<Vec<String>>,
}

impl TestAcme {
    #[must_use]
    pub fn new(cert_expires: OffsetDateTime) -> Self {
        Self {
            cert_expires,
            fail_for: None,
            attempts: RefCell::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn failing_for(mut self, domain: &str) -> Self {
        self.fail_for = Some(domain.to_owned());
        self
    }

    pub fn attempts(&self) -> Vec<String> {
        self.attempts.borrow().clone()
    }
}

impl ACME for TestAcme {
    fn renew<W: Write>(&self, config: &Config, domain: &str, stdout: &mut W) -> eyre::Result<()> {
        self.attempts.borrow_mut().push(domain.to_owned());
        if self.fail_for.as_deref() == Some(domain) {
            writeln!(stdout, "TestAcme, refusing to sign for {domain}")?;
            eyre::bail!("certbot could not get a certificate");
        }

        writeln!(stdout, "TestAcme, not signing certificate")?;
        gen_cert::place_live(config, domain, self.cert_expires);
        Ok(())
    }
}

/// Config pointing into a fresh temporary directory
#[must_use]
pub fn test_config(domains: &[&str]) -> (TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::test(dir.path());
    config.domains = domains.iter().map(ToString::to_string).collect();
    (dir, config)
}

#[must_use]
pub fn paths(config: &Config, domain: &str) -> DomainPaths {
    DomainPaths::new(config, domain)
}

pub struct TestPrinter;

impl Write for TestPrinter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let string = String::from_utf8_lossy(buf);
        print!("{string}");
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn setup_color_eyre() {
    use std::sync::Once;
    static COLOR_EYRE_SETUP: Once = Once::new();
    COLOR_EYRE_SETUP.call_once(|| color_eyre::install().unwrap());
}

pub fn setup_tracing() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::filter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = filter::EnvFilter::builder()
        .parse("certsync=debug,info")
        .unwrap();

    let fmt = fmt::layer()
        .pretty()
        .with_line_number(true)
        .with_test_writer();

    let _ignore_err = tracing_subscriber::registry()
        .with(filter)
        .with(fmt)
        .with(ErrorLayer::default())
        .try_init();
}
