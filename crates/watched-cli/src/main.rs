use std::path::PathBuf;
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use commands::fetch;
use watched_config::Config;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "serializd-watched")]
#[command(about = "Print your Serializd watch history as a JSON array")]
#[command(version)]
struct Cli {
    /// Serializd account email
    email: String,

    /// Serializd account password
    password: String,

    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress all diagnostics except errors
    #[arg(short, long)]
    quiet: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the array on a single line instead of pretty-printing it
    #[arg(long, action = ArgAction::SetTrue)]
    compact: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                // Usage errors go to stderr and exit 1, not clap's default 2
                let _ = e.print();
                std::process::exit(1);
            }
        },
    };

    let (config, config_error) = match Config::load(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    if let Err(e) = logging::init_logging(cli.verbose, cli.quiet, &config.logging) {
        eprintln!("Failed to set up log file ({}), logging to stderr only", e);
        logging::init_stderr_logging(cli.verbose, cli.quiet, &config.logging);
    }

    if let Some(e) = config_error {
        tracing::warn!("Failed to load configuration, using defaults: {:#}", e);
    }

    let items = fetch::run_fetch(&cli.email, &cli.password, &config);

    let format = if cli.compact {
        output::OutputFormat::Json
    } else {
        output::OutputFormat::JsonPretty
    };
    output::Output::new(format).items(&items)?;

    Ok(())
}
