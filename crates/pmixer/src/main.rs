//! pmixer - PulseAudio volume control from the shell.
//!
//! Adjusts the volume or toggles the mute flag of the default sink, one
//! command per invocation. Intended for volume key bindings.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::ConfigSource;
use pmixer_core::Command;
use pmixer_pulse::{ClientSettings, NativeBackend, PulseError, Report};

/// PulseAudio volume control from the shell.
#[derive(Parser, Debug)]
#[command(name = "pmixer", version, about)]
struct Args {
    /// Command to run: inc, dec, mute or status
    #[arg(value_parser = parse_command)]
    command: Command,

    /// Enable detailed output
    #[arg(short, long)]
    verbose: bool,

    /// Server to connect to instead of the default
    #[arg(short, long, env = "PULSE_SERVER")]
    server: Option<String>,

    /// Configuration file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn parse_command(s: &str) -> Result<Command, String> {
    Command::from_str(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (config, source) = config::load_config(args.config.as_deref())?;

    // Initialize logging
    let level = if args.verbose { "debug" } else { config.general.log_level.as_str() };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("pmixer={level}").parse()?)
                .add_directive(format!("pmixer_pulse={level}").parse()?)
                .add_directive(format!("pmixer_core={level}").parse()?),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), command = %args.command, "Starting pmixer");
    match &source {
        ConfigSource::File(path) => info!(config_path = ?path, "Configuration loaded"),
        ConfigSource::Defaults(path) => {
            info!(config_path = ?path, "Config file not found, using defaults");
        }
    }

    let settings = ClientSettings {
        server: args.server.or(config.server.address),
        limits: config.volume.limits()?,
        warn_on_rejection: config.mutation.warn_on_rejection,
    };

    let backend = NativeBackend::new(&config.general.client_name)
        .context("Failed to set up PulseAudio client")?;

    // The error is reported once, by the anyhow chain returned from main.
    let report = pmixer_pulse::run(backend, &settings, args.command).map_err(|e| {
        let stage = failure_stage(&e);
        anyhow::Error::new(e).context(stage)
    })?;

    if args.command == Command::Status {
        print_status(&report);
    }
    Ok(())
}

/// The step of the run that `error` ended.
fn failure_stage(error: &PulseError) -> &'static str {
    match error {
        PulseError::ConnectionFailed(_) | PulseError::MainLoopError(_) => {
            "Can't connect to PulseAudio"
        }
        e if e.is_resolution() => "Can't get default sink",
        _ => "Command failed",
    }
}

fn print_status(report: &Report) {
    let device = &report.snapshot;
    println!(
        "{} {} {} {}",
        device.index,
        device.name,
        device.volume.average(),
        if device.muted { "muted" } else { "unmuted" }
    );
}
