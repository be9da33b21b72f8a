use std::fs;
use std::io::Write;

use color_eyre::eyre::{self, Context};
use color_eyre::Help;
use tracing::{debug, instrument};

use crate::config::{paths, Config};
use crate::Toolkit;

pub const DH_BITS: u32 = 2048;

/// Generates `dhparams.pem` in the output directory unless it is already
/// there. Returns whether parameters were generated.
#[instrument(level = "debug", skip_all)]
pub fn ensure_dh_params(
    config: &Config,
    toolkit: &impl Toolkit,
    stdout: &mut impl Write,
) -> eyre::Result<bool> {
    let path = paths::dh_params(&config.cert_copy_dir);
    let exists = path
        .try_exists()
        .wrap_err("Could not check for existing DH parameters")
        .with_note(|| format!("path: {}", path.display()))?;
    if exists {
        debug!("DH parameters present at {}", path.display());
        return Ok(false);
    }

    writeln!(
        stdout,
        "Generating DH parameters, {DH_BITS} bit long safe prime. This will take a while."
    )?;
    stdout.flush()?;
    fs::create_dir_all(&config.cert_copy_dir)
        .wrap_err("Could not create output directory")
        .with_note(|| format!("path: {}", config.cert_copy_dir.display()))?;
    toolkit.generate_dh_params(&path, DH_BITS)?;

    let len = fs::metadata(&path)
        .wrap_err("DH parameter generation did not create a file")
        .with_note(|| format!("path: {}", path.display()))?
        .len();
    if len == 0 {
        // an empty file would make the next run skip generation
        fs::remove_file(&path).wrap_err("Could not remove empty DH parameter file")?;
        return Err(eyre::eyre!("DH parameter generation produced an empty file"))
            .with_note(|| format!("path: {}", path.display()));
    }

    Ok(true)
}
