use std::io::Write;

use color_eyre::eyre::{self, Context};
use time::{Duration, OffsetDateTime};
use tracing::instrument;

use crate::config::{Config, DomainPaths};
use crate::Toolkit;

macro_rules! warning {
    ($stream:expr, $($arg:tt)*) => {
        writeln!($stream, "{}", owo_colors::OwoColorize::yellow(&format_args!($($arg)*)))
    };
}

macro_rules! info {
    ($stream:expr, $($arg:tt)*) => {
        writeln!($stream, "{}", owo_colors::OwoColorize::green(&format_args!($($arg)*)))
    };
}
pub(crate) use info;
pub(crate) use warning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    /// certbot has no certificate for this domain yet
    NoCert,
    /// renewal requested regardless of expiry
    Forced,
    /// expires within the renewal window (or already did)
    Due { expires_in: Duration },
    Current { expires_in: Duration },
}

impl Advice {
    #[must_use]
    pub fn should_renew(&self) -> bool {
        !matches!(self, Advice::Current { .. })
    }

    pub(crate) fn report(&self, stdout: &mut impl Write) -> std::io::Result<()> {
        match self {
            Advice::NoCert => info!(stdout, "No existing certificate"),
            Advice::Forced => info!(stdout, "Renewal forced"),
            Advice::Due { expires_in } if expires_in.is_negative() => warning!(
                stdout,
                "Certificate expired {} days, {} hours ago",
                -expires_in.whole_days(),
                -expires_in.whole_hours() % 24
            ),
            Advice::Due { expires_in } => info!(
                stdout,
                "Certificate expires soon: {} days, {} hours",
                expires_in.whole_days(),
                expires_in.whole_hours() % 24
            ),
            Advice::Current { expires_in } => writeln!(
                stdout,
                "Certificate not yet due for renewal, expires in: {} days",
                expires_in.whole_days()
            ),
        }
    }
}

/// Whole days are counted, a certificate expiring in 28 days and
/// 23 hours is within a 28 day window.
#[must_use]
pub fn within_window(expires_in: Duration, renewal_days: u32) -> bool {
    expires_in.whole_days() <= i64::from(renewal_days)
}

#[instrument(level = "debug", skip(config, toolkit), ret)]
pub fn given_existing(
    config: &Config,
    paths: &DomainPaths,
    toolkit: &impl Toolkit,
    now: OffsetDateTime,
) -> eyre::Result<Advice> {
    if config.force {
        return Ok(Advice::Forced);
    }

    let exists = paths
        .cert
        .try_exists()
        .wrap_err("Could not check for existing certificate")?;
    if !exists {
        return Ok(Advice::NoCert);
    }

    let expires_in = toolkit.not_after(&paths.cert)? - now;
    if within_window(expires_in, config.renewal_days) {
        Ok(Advice::Due { expires_in })
    } else {
        Ok(Advice::Current { expires_in })
    }
}
