mod cli;
mod commands;
mod config;
mod error;
mod output;
mod script;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::config::{Config, ConfigError, LogFormat, LogSection};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // The config picks the log format, so load it before tracing starts
    let path = config::active_config_path(&cli.global);
    let loaded = config::load_config(&path);
    let log = loaded.as_ref().map(|cfg| cfg.log.clone()).unwrap_or_default();
    init_tracing(cli.global.verbose, &log);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli, loaded).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8, log: &LogSection) {
    let directive = match verbosity {
        0 => log.filter.as_deref().unwrap_or("warn"),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directive))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match log.format {
        LogFormat::Pretty => builder.with_target(false).init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn run(cli: Cli, loaded: Result<Config, ConfigError>) -> Result<(), CliError> {
    match cli.command {
        // Config commands report on the file even when it does not load
        Command::Config(args) => commands::config_cmd::handle(&args, &cli.global, loaded),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "wifiwatch", &mut std::io::stdout());
            Ok(())
        }

        // Everything else runs against a valid config
        cmd => {
            let cfg = loaded?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &cfg, &cli.global).await
        }
    }
}
