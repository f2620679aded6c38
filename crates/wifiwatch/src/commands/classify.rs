//! Signal classification command handler.

use std::fmt::Write as _;

use serde::Serialize;

use wifiwatch_core::{SignalLevel, classify};

use crate::cli::{ClassifyArgs, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct Classification {
    rssi: i32,
    levels: u32,
    level: u32,
    /// Only for the default five-level scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<SignalLevel>,
}

fn classify_with(rssi: i32, levels: u32) -> Result<Classification, CliError> {
    if levels == 0 {
        return Err(CliError::Validation {
            field: "levels".into(),
            reason: "must be at least 1".into(),
        });
    }
    let level = classify(rssi, levels);
    let label = (levels == SignalLevel::COUNT).then(|| SignalLevel::from_level(level));
    Ok(Classification {
        rssi,
        levels,
        level,
        label,
    })
}

fn summary_line(c: &Classification, color: bool) -> String {
    let mut line = format!("{} dBm -> level {} of 0..={}", c.rssi, c.level, c.levels - 1);
    if let Some(label) = c.label {
        let _ = write!(line, " ({})", output::paint_level(label, color));
    }
    line
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: &ClassifyArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let levels = args.levels.unwrap_or(cfg.signal.levels);
    let result = classify_with(args.rssi, levels)?;
    let color = output::should_color(&global.color);

    let out = output::render_single(
        &global.output,
        &result,
        |c| summary_line(c, color),
        |c| c.level.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
