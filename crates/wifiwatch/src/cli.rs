//! Clap derive structures for the `wifiwatch` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wifiwatch -- WiFi state as observable event streams
#[derive(Debug, Parser)]
#[command(
    name = "wifiwatch",
    version,
    about = "Inspect and replay WiFi state streams",
    long_about = "Classify signal strength, print the WiFi state tables, and replay\n\
        scripted host notifications through the reactive WiFi streams.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the config file (defaults to the platform config dir)
    #[arg(long, env = "WIFIWATCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "WIFIWATCH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Classify an RSSI reading into a signal level
    #[command(alias = "c")]
    Classify(ClassifyArgs),

    /// Print a state mapping table
    States(StatesArgs),

    /// Replay a notification script through the WiFi streams
    #[command(alias = "r")]
    Replay(ReplayArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Classify ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Received signal strength in dBm (e.g. -67)
    #[arg(allow_negative_numbers = true)]
    pub rssi: i32,

    /// Number of levels to classify into (defaults to `signal.levels`)
    #[arg(long, short = 'l')]
    pub levels: Option<u32>,
}

// ── States ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatesArgs {
    /// Which table to print
    #[arg(value_enum)]
    pub table: StateTable,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StateTable {
    /// Supplicant phases with codes and tokens
    Supplicant,
    /// Radio on/off states with platform codes
    Connection,
    /// Named signal levels with their lowest RSSI
    Signal,
}

// ── Replay ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// TOML script describing the radio and the notifications to deliver
    pub script: PathBuf,

    /// Streams to subscribe (repeatable; defaults to all)
    #[arg(long = "stream", short = 's', value_enum)]
    pub streams: Vec<StreamKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StreamKind {
    /// Scan results
    AccessPoints,
    /// Classified signal level
    SignalLevel,
    /// Supplicant phase
    SupplicantState,
    /// Connection snapshot on completion
    ConnectionInfo,
    /// Radio on/off state
    ConnectionState,
    /// Supplicant connectivity flag
    WifiOnOff,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a new config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
