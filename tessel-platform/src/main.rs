// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! A simple front-end for loading a hardware description and printing the
//! resulting topology.
//!
//! For example, run using:
//!   cargo run --bin tessel-platform -- --description
//! tessel-platform/demos/npu.yaml --stdout-level debug
//!
//! Options can also be set in a TOML file passed with `--conf-file` or through
//! `TESSEL_` environment variables (e.g. `TESSEL_STRICT_DATATYPES=true`).
//! Command-line options take precedence over both.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use simplelog::{ConfigBuilder, SimpleLogger};
use tessel_platform::Platform;
use tessel_resources::kernel::DatatypePolicy;

/// Command-line arguments.
#[derive(Parser, Serialize)]
#[command(about = "Build an accelerator topology from a hardware description")]
struct Cli {
    /// Hardware description file (YAML or JSON).
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<PathBuf>,

    /// Level of log message to display.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    stdout_level: Option<log::Level>,

    /// Reject kernels with partially specified datatypes.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    #[serde(skip_serializing_if = "Option::is_none")]
    strict_datatypes: Option<bool>,

    /// Only print the summary, not the full tree.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    #[serde(skip_serializing_if = "Option::is_none")]
    summary_only: Option<bool>,

    /// Additional TOML configuration file.
    #[arg(long)]
    #[serde(skip)]
    conf_file: Option<PathBuf>,
}

/// Settings after merging defaults, configuration file, environment and
/// command line.
#[derive(Debug, Deserialize, Serialize)]
struct Settings {
    description: PathBuf,
    stdout_level: log::Level,
    strict_datatypes: bool,
    summary_only: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            description: PathBuf::from("platform.yaml"),
            stdout_level: log::Level::Info,
            strict_datatypes: false,
            summary_only: false,
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut config = Figment::new().merge(Serialized::defaults(Settings::default()));
    if let Some(conf_file) = &cli.conf_file {
        config = config.merge(Toml::file(conf_file));
    }
    let settings = config
        .merge(Env::prefixed("TESSEL_"))
        .merge(Serialized::defaults(cli))
        .extract()?;
    Ok(settings)
}

fn setup_logging(level: log::Level) -> Result<()> {
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_location_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    SimpleLogger::init(level.to_level_filter(), config)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    setup_logging(settings.stdout_level)?;

    let policy = settings.strict_datatypes.then_some(DatatypePolicy::Strict);
    let platform = Platform::from_file_with_policy(&settings.description, policy)?;

    if settings.summary_only {
        println!("{}", platform.summary());
    } else {
        println!("Loaded platform:");
        println!("{platform}");
    }
    Ok(())
}
