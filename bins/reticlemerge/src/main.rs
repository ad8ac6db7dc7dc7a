use anyhow::Context;
use arcstr::ArcStr;
use clap::{ArgAction, Parser as ClapParser, ValueEnum};
use reticle::barcode::Barcode;
use reticle::compose::{ComposeOptions, compose, load, save, with_gds_extension};
use reticle::config::FacilityConfig;
use reticle::hierarchy::top_cells;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::prompt::Prompter;

mod prompt;
#[cfg(test)]
mod tests;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    println!("template file: {:?}", &args.template);
    println!("design file: {:?}", &args.design);
    let stdin = io::stdin().lock();
    let stdout = io::stdout();
    let out = reticlemerge(args, &mut Prompter::new(stdin, stdout))?;
    println!("output: {:?}", &out);
    println!("Merge complete.");

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// The coordinate scale a design is drawn at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scale {
    /// Wafer coordinates, magnified onto the reticle.
    Wafer,
    /// Reticle coordinates, placed as drawn.
    Reticle,
}

/// Arguments to [`reticlemerge`].
///
/// Decisions left unspecified are asked for interactively.
#[derive(ClapParser)]
#[command(
    version,
    about,
    long_about = "Merge a chip design into a reticle template, adding a barcode and date label"
)]
pub struct Args {
    /// The reticle template layout.
    template: PathBuf,
    /// The design layout to place in the template.
    design: PathBuf,
    /// The path where the merged layout should be saved.
    ///
    /// A `.gds` extension is appended if missing.
    /// If the file already exists, it will be overwritten.
    #[arg(short, long, default_value = "merged.gds")]
    out: PathBuf,
    /// The scale the design is drawn at.
    #[arg(short, long, value_enum)]
    scale: Option<Scale>,
    /// Mirror the design for the maskless aligner.
    #[arg(long, overrides_with = "no_mirror")]
    mirror: bool,
    /// Do not mirror the design.
    #[arg(long, overrides_with = "mirror")]
    no_mirror: bool,
    /// The barcode label, 1 to 12 Code 39 characters.
    #[arg(short, long, conflicts_with = "no_barcode")]
    barcode: Option<String>,
    /// Skip the barcode and date labels.
    #[arg(long)]
    no_barcode: bool,
    /// The design cell to place, if the design has several top cells.
    #[arg(long)]
    design_cell: Option<String>,
    /// A TOML file overriding the facility defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Write a JSON summary of the merge to this path.
    #[arg(long)]
    report: Option<PathBuf>,
    /// Increase logging verbosity.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn mirror(&self) -> Option<bool> {
        if self.mirror {
            Some(true)
        } else if self.no_mirror {
            Some(false)
        } else {
            None
        }
    }
}

/// Merge the design into the template and save the result.
///
/// Returns the path of the saved layout.
pub fn reticlemerge<R: BufRead, W: Write>(
    args: Args,
    prompter: &mut Prompter<R, W>,
) -> anyhow::Result<PathBuf> {
    let config = match args.config {
        Some(ref path) => FacilityConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {:?}.", path))?,
        None => FacilityConfig::default(),
    };

    let template = load(&args.template)
        .with_context(|| format!("Failed to read template {:?}.", &args.template))?;
    let design = load(&args.design)
        .with_context(|| format!("Failed to read design {:?}.", &args.design))?;

    let design_cell = match args.design_cell {
        Some(ref name) => Some(ArcStr::from(name.as_str())),
        None => {
            let tops = top_cells(&design, &config);
            if tops.len() > 1 {
                Some(prompter.ask_design_cell(&tops)?)
            } else {
                None
            }
        }
    };

    let wafer_scale = match args.scale {
        Some(scale) => scale == Scale::Wafer,
        None => prompter.ask_wafer_scale()?,
    };

    let barcode = match args.barcode {
        Some(ref label) => Some(
            Barcode::new(label).with_context(|| format!("Invalid barcode {:?}.", label))?,
        ),
        None if args.no_barcode => None,
        None => Some(prompter.ask_barcode()?),
    };

    let mirror_for_tool = match args.mirror() {
        Some(mirror) => mirror,
        None => prompter.ask_mirror()?,
    };

    let opts = ComposeOptions {
        wafer_scale,
        mirror_for_tool,
        barcode,
        design_cell,
        date: None,
    };
    let composition = compose(&template, &design, &opts, &config)
        .with_context(|| "Failed to merge design into template.")?;

    let out = with_gds_extension(args.out);
    save(&composition.library, &out)
        .with_context(|| format!("Failed to write merged layout to {:?}.", &out))?;

    if let Some(path) = args.report {
        let json = composition
            .report
            .to_json()
            .with_context(|| "Failed to serialize merge report.")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write merge report to {:?}.", path))?;
    }

    Ok(out)
}
