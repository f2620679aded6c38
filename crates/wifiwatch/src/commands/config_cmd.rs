//! Config subcommand handlers.

use dialoguer::Input;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config, ConfigError};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn render_config(cfg: &Config, format: &OutputFormat) -> Result<String, CliError> {
    let toml_str = toml::to_string_pretty(cfg).map_err(ConfigError::from)?;
    output::render_single(
        format,
        cfg,
        |_| toml_str.trim_end().to_owned(),
        |_| toml_str.trim_end().to_owned(),
    )
}

/// Ask for the values worth changing; everything else keeps its default.
fn prompt_config() -> Result<Config, CliError> {
    let mut cfg = Config::default();

    cfg.signal.levels = Input::new()
        .with_prompt("Signal levels")
        .default(cfg.signal.levels)
        .validate_with(|levels: &u32| {
            if *levels == 0 {
                Err("must be at least 1")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(prompt_err)?;

    cfg.affinity.thread_name = Input::new()
        .with_prompt("Affinity thread name")
        .default(cfg.affinity.thread_name.clone())
        .interact_text()
        .map_err(prompt_err)?;

    Ok(cfg)
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(
    args: &ConfigArgs,
    global: &GlobalOpts,
    loaded: Result<Config, ConfigError>,
) -> Result<(), CliError> {
    let path = config::active_config_path(global);

    match &args.command {
        ConfigCommand::Show => {
            let cfg = loaded?;
            let out = render_config(&cfg, &global.output)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !*force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }

            let cfg = if global.yes {
                Config::default()
            } else {
                eprintln!("wifiwatch configuration");
                eprintln!("   Config path: {}\n", path.display());
                prompt_config()?
            };
            cfg.validate()?;
            config::save_config(&cfg, &path)?;

            if !global.quiet {
                eprintln!("   ✓ Wrote {}", path.display());
            }
            Ok(())
        }
    }
}
