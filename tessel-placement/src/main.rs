// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Write the tile placement of every herd of a program as JSON.
//!
//! For example, run using:
//!   cargo run --bin herds-to-json -- --program
//! tessel-placement/demos/forward.yaml --output herds.json
//!
//! Diagnostics go to stderr so that the JSON can be written to stdout with
//! `--output -`. Options can also be set in a TOML file passed with
//! `--conf-file` or through `TESSEL_` environment variables.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use log::{LevelFilter, info};
use serde::{Deserialize, Serialize};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use tessel_placement::types::PartialOutput;
use tessel_placement::{Program, write_document, write_fragment};

#[derive(Parser, Serialize)]
#[command(about = "Expand the herds of a program into tile coordinates")]
struct Cli {
    /// Program description file (YAML or JSON).
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    program: Option<PathBuf>,

    /// Output file, `-` for stdout.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<PathBuf>,

    /// Write nothing if any herd cannot be placed.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    #[serde(skip_serializing_if = "Option::is_none")]
    suppress_partial: Option<bool>,

    /// Only write the herd entries and closing brackets.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    #[serde(skip_serializing_if = "Option::is_none")]
    fragment_only: Option<bool>,

    /// Level of log message to display.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    stdout_level: Option<log::Level>,

    /// Additional TOML configuration file.
    #[arg(long)]
    #[serde(skip)]
    conf_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize)]
struct Settings {
    program: PathBuf,
    output: PathBuf,
    suppress_partial: bool,
    fragment_only: bool,
    stdout_level: log::Level,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("program.yaml"),
            output: PathBuf::from("-"),
            suppress_partial: false,
            fragment_only: false,
            stdout_level: log::Level::Warn,
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
    TermLogger::init(
        level.to_level_filter(),
        config,
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;
    Ok(())
}

fn open_output(output: &Path) -> Result<Box<dyn Write>> {
    if output.as_os_str() == "-" {
        return Ok(Box::new(std::io::stdout().lock()));
    }
    let file = File::create(output)
        .with_context(|| format!("Unable to create {}", output.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;
    setup_logging(settings.stdout_level)?;

    let program = Program::from_file(&settings.program)
        .with_context(|| format!("Unable to load {}", settings.program.display()))?;

    let policy = if settings.suppress_partial {
        PartialOutput::Suppress
    } else {
        PartialOutput::EmitValid
    };

    let mut out = open_output(&settings.output)?;
    let result = if settings.fragment_only {
        write_fragment(&program, &mut out, policy)
    } else {
        write_document(&program, &mut out, policy)
    };
    out.flush()?;

    let written = result?;
    info!("{written} herds written");
    Ok(())
}
