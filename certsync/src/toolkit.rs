use std::ffi::OsString;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{self, Context};
use color_eyre::{Help, SectionExt};
use time::OffsetDateTime;
use tracing::instrument;

use crate::{cmd, expiry, Config, Toolkit};

/// [`Toolkit`] backed by the `openssl` command line tool
#[derive(Debug, Clone)]
pub struct OpenSsl {
    program: PathBuf,
}

impl OpenSsl {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            program: config.openssl.clone(),
        }
    }
}

pub(crate) fn dates_args(cert: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["x509".into(), "-noout".into(), "-in".into()];
    args.push(cert.into());
    args.push("-dates".into());
    args
}

pub(crate) fn dhparam_args(out: &Path, bits: u32) -> Vec<OsString> {
    vec!["dhparam".into(), "-out".into(), out.into(), bits.to_string().into()]
}

impl Toolkit for OpenSsl {
    #[instrument(level = "debug", skip(self), ret)]
    fn not_after(&self, cert: &Path) -> eyre::Result<OffsetDateTime> {
        let output = cmd::output(&self.program, &dates_args(cert))?;
        cmd::check_status(&self.program, &output)
            .wrap_err("Could not read certificate dates")
            .with_note(|| format!("certificate: {}", cert.display()))?;

        let dates = String::from_utf8_lossy(&output.stdout).into_owned();
        expiry::parse_not_after(&dates)
            .wrap_err("Unexpected output reading certificate expiry")
            .with_note(|| format!("certificate: {}", cert.display()))
            .with_section(|| dates.header("Openssl output:"))
    }

    #[instrument(level = "debug", skip(self))]
    fn generate_dh_params(&self, out: &Path, bits: u32) -> eyre::Result<()> {
        let output = cmd::output(&self.program, &dhparam_args(out, bits))?;
        cmd::check_status(&self.program, &output).wrap_err("Could not generate DH parameters")
    }
}
