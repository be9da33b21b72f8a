use clap::Parser;
use color_eyre::eyre;

use certsync::config::RunArgs;
use certsync::renew::Certbot;
use certsync::toolkit::OpenSsl;
use certsync::Config;

#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about = "Renew certbot certificates that are due and publish them to a shared directory",
    long_about = "Checks the certificate of every domain, asks certbot for a new one \
                  when it expires within the renewal window and copies certificate and key \
                  to the output directory. Every option can be set through the environment, \
                  meant to be run periodically by a timer or cron."
)]
struct Cli {
    #[clap(flatten)]
    run: RunArgs,
}

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    let debug = cli.run.debug;
    color_eyre::config::HookBuilder::default()
        .display_env_section(debug)
        .display_location_section(debug)
        .install()?;
    setup_tracing(debug);

    let config = Config::try_from(cli.run)?;
    let toolkit = OpenSsl::new(&config);
    let mut stdout = std::io::stdout();
    certsync::run(&config, &toolkit, &Certbot, &mut stdout)?;
    Ok(())
}

#[allow(clippy::missing_panics_doc)]
pub fn setup_tracing(debug: bool) {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::filter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = if debug {
        "certsync=debug,warn"
    } else {
        "certsync=warn"
    };

    let filter = filter::EnvFilter::builder().parse(filter).unwrap();

    let fmt = fmt::layer()
        .pretty()
        .with_line_number(true)
        .with_writer(std::io::stderr);

    let _ignore_err = tracing_subscriber::registry()
        .with(filter)
        .with(fmt)
        .with(ErrorLayer::default())
        .try_init();
}
