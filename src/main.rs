//! smilog - Convert nvidia-smi capture logs to a spreadsheet
//!
//! Usage:
//!   smilog nvidia_smi.log                      # writes gpu_metrics.xlsx
//!   smilog nvidia_smi.log -o burn.xlsx         # custom output path
//!   smilog nvidia_smi.log --sheet burn-in -v   # custom sheet, info logging

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::Level;

use smilog::convert::{convert, ConvertOptions, Outcome};
use smilog::settings::UserSettings;

/// Parse an nvidia-smi log into an Excel sheet for any number of GPUs.
#[derive(Parser)]
#[command(name = "smilog", version, about)]
struct Args {
    /// Path to the capture log (e.g. nvidia_smi.log)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output .xlsx file [default: from settings, else gpu_metrics.xlsx]
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Sheet name [default: from settings, else metrics]
    #[arg(long, value_name = "NAME")]
    sheet: Option<String>,

    /// Maximum column width in characters [default: from settings, else 60]
    #[arg(long, value_name = "CHARS")]
    max_width: Option<usize>,

    /// Remember --output, --sheet and --max-width as defaults once the run succeeds
    #[arg(long)]
    save_defaults: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// Merge flags over persisted settings
    fn into_options(self, settings: UserSettings) -> ConvertOptions {
        ConvertOptions {
            input: self.input,
            output: self.output.unwrap_or(settings.output),
            sheet: self.sheet.unwrap_or(settings.sheet),
            max_column_width: self.max_width.unwrap_or(settings.max_column_width),
            wrap_text: settings.wrap_text,
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args, settings_path: Option<&Path>) -> anyhow::Result<Outcome> {
    let save_defaults = args.save_defaults;
    let settings = settings_path
        .map(UserSettings::load_from)
        .unwrap_or_default();
    let options = args.into_options(settings.clone());

    let outcome =
        convert(&options).with_context(|| format!("Failed to convert {:?}", options.input))?;

    if save_defaults {
        let path = settings_path.context("Could not determine config directory")?;
        let updated = UserSettings {
            output: options.output,
            sheet: options.sheet,
            max_column_width: options.max_column_width,
            ..settings
        };
        updated
            .save_to(path)
            .map_err(anyhow::Error::msg)
            .context("Failed to save settings")?;
        tracing::info!("Saved defaults to {:?}", path);
    }

    Ok(outcome)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args, UserSettings::get_settings_path().as_deref()) {
        Ok(Outcome::Saved { rows, path }) => {
            println!("Saved {} rows to {}", rows, path.display());
            ExitCode::SUCCESS
        }
        Ok(Outcome::NoDataParsed) => {
            println!("No data parsed.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
