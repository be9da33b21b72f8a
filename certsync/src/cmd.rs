use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Output};

use color_eyre::eyre::{self, Context};
use color_eyre::{Help, SectionExt};
use tracing::{debug, instrument};

/// Runs `program` without a shell, waits for it and captures its output.
/// Does not look at the exit status, see [`check_status`].
#[instrument(level = "debug")]
pub(crate) fn output(program: &Path, args: &[OsString]) -> eyre::Result<Output> {
    let output = Command::new(program)
        .args(args)
        .output()
        .wrap_err_with(|| format!("Could not run {}", program.display()))
        .suggestion("Check if it is installed and in PATH")?;
    debug!(status = %output.status, "command finished");
    Ok(output)
}

pub(crate) fn check_status(program: &Path, output: &Output) -> eyre::Result<()> {
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    Err(eyre::eyre!("{} returned an error", program.display()))
        .with_note(|| format!("exit status: {}", output.status))
        .with_section(|| stderr.header("Stderr:"))
}
