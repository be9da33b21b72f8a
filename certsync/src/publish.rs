use std::fs;
use std::io::{self, Write};
use std::path::Path;

use color_eyre::eyre::{self, Context};
use color_eyre::Help;
use tracing::instrument;

use crate::config::{Config, DomainPaths};

#[derive(Debug)]
enum Operation<'a> {
    Append(&'a Path),
    Create(&'a Path),
}

/// Copies the content of `source` byte for byte
#[instrument(level = "debug")]
fn write_from(source: &Path, operation: Operation) -> eyre::Result<()> {
    let bytes = fs::read(source)
        .wrap_err("Could not read certbot output")
        .with_note(|| format!("path: {}", source.display()))?;

    let (file, path) = match operation {
        Operation::Append(path) => (fs::OpenOptions::new().append(true).open(path), path),
        Operation::Create(path) => (fs::File::create(path), path),
    };
    file.and_then(|mut file| file.write_all(&bytes))
        .wrap_err("Could not write published file")
        .with_note(|| format!("path: {}", path.display()))
}

/// Publishes certbots certificate and key for one domain to the output
/// directory. The full chain is written first, when merging the private
/// key follows it directly in the same file.
#[instrument(level = "debug", skip(config, stdout))]
pub fn on_disk(config: &Config, paths: &DomainPaths, stdout: &mut impl Write) -> eyre::Result<()> {
    use Operation::{Append, Create};

    fs::create_dir_all(&config.cert_copy_dir)
        .wrap_err("Could not create output directory")
        .with_note(|| format!("path: {}", config.cert_copy_dir.display()))?;

    if config.merge_key_with_certificate {
        write_from(&paths.cert, Create(&paths.cert_copy))?;
        write_from(&paths.key, Append(&paths.cert_copy))?;
    } else {
        write_from(&paths.key, Create(&paths.key_copy))?;
        write_from(&paths.cert, Create(&paths.cert_copy))?;
    }

    print_status(stdout, config, paths)?;
    Ok(())
}

fn print_status(stdout: &mut impl Write, config: &Config, paths: &DomainPaths) -> io::Result<()> {
    let DomainPaths {
        cert_copy,
        key_copy,
        ..
    } = paths;

    if config.merge_key_with_certificate {
        writeln!(
            stdout,
            "created a single pem file:
    - {}
    containing in order from top to bottom:
        - certificate chain
        - private key",
            cert_copy.display()
        )
    } else {
        writeln!(
            stdout,
            "created two files:
    - {}
    containing the certificate chain
    - {}
    containing the private key",
            cert_copy.display(),
            key_copy.display()
        )
    }
}
