// crates/roidota-cli/src/main.rs
// ============================================================================
// Module: Roidota CLI Entry Point
// Description: Command dispatcher for the broker and offline manifest tools.
// Purpose: Run the broker runtime and validate manifests and configuration.
// Dependencies: clap, roidota-config, roidota-core, thiserror, tokio
// ============================================================================

//! ## Overview
//! `roidota serve` runs the firmware resolution broker. The `manifest` and
//! `config` subcommands work offline: they read files, validate them with the
//! same rules the broker applies, and report the result on stdout or stderr.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub(crate) mod logging;
pub(crate) mod runtime;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use roidota_config::RoidotaConfig;
use roidota_core::DeviceId;
use roidota_core::read_manifest_file;
use thiserror::Error;

use crate::logging::init_logging;
use crate::runtime::run_broker;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "roidota", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the firmware resolution broker.
    Serve(ConfigArgs),
    /// Offline manifest utilities.
    Manifest {
        /// Selected manifest subcommand.
        #[command(subcommand)]
        command: ManifestCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Shared configuration path argument.
#[derive(clap::Args, Debug)]
struct ConfigArgs {
    /// Config file path (overrides `ROIDOTA_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Manifest subcommands.
#[derive(Subcommand, Debug)]
enum ManifestCommand {
    /// Validate a manifest file and print its normalized form.
    Check {
        /// Manifest file path.
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Print the firmware reference mapped to a device.
    Resolve {
        /// Manifest file path.
        #[arg(value_name = "PATH")]
        path: PathBuf,
        /// Device identifier to look up.
        #[arg(value_name = "DEVICE_ID")]
        device_id: String,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate configuration.
    Check(ConfigArgs),
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => command_serve(&args).await,
        Commands::Manifest {
            command,
        } => match command {
            ManifestCommand::Check {
                path,
            } => command_manifest_check(&path),
            ManifestCommand::Resolve {
                path,
                device_id,
            } => command_manifest_resolve(&path, device_id),
        },
        Commands::Config {
            command: ConfigCommand::Check(args),
        } => command_config_check(&args),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args)?;
    init_logging(&config.logging.filter).map_err(|err| CliError::new(err.to_string()))?;
    run_broker(config).await.map_err(|err| CliError::new(format!("broker failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `manifest check` command.
fn command_manifest_check(path: &Path) -> CliResult<ExitCode> {
    let manifest = read_manifest_file(path).map_err(|err| CliError::new(err.to_string()))?;
    let rendered = manifest
        .to_pretty_json()
        .map_err(|err| CliError::new(format!("manifest render failed: {err}")))?;
    write_stdout_line(&rendered)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `manifest resolve` command.
fn command_manifest_resolve(path: &Path, device_id: String) -> CliResult<ExitCode> {
    let device = DeviceId::parse(device_id)
        .map_err(|err| CliError::new(format!("invalid device id: {err}")))?;
    let manifest = read_manifest_file(path).map_err(|err| CliError::new(err.to_string()))?;
    match manifest.get(&device) {
        Some(firmware) => {
            write_stdout_line(firmware.as_str())?;
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(emit_error(&format!("no firmware mapped for {device}"))),
    }
}

/// Executes the `config check` command.
fn command_config_check(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args)?;
    write_stdout_line(&format!(
        "config ok: manifest={} mqtt={}:{} request={} http={}",
        config.manifest.path.display(),
        config.mqtt.host,
        config.mqtt.port,
        config.topics.request,
        config.http.bind
    ))?;
    Ok(ExitCode::SUCCESS)
}

/// Loads configuration from the command arguments.
fn load_config(args: &ConfigArgs) -> CliResult<RoidotaConfig> {
    RoidotaConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
        .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
