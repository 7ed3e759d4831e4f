use chrono::{Local, TimeZone};
use clap::Args;
use std::fmt::Display;
use std::path::PathBuf;
use workout_core::{export_workouts, write_artifact, Config};

use super::{open_source, RangeArgs, Zone};

#[derive(Args)]
pub struct ExportArgs {
    /// Health app export.xml, or a JSON array of workout records
    #[arg(long, short)]
    input: PathBuf,
    #[command(flatten)]
    range: RangeArgs,
    /// Directory for the CSV file (defaults to the configured export dir)
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Print the CSV instead of writing a file
    #[arg(long)]
    stdout: bool,
}

pub fn run(args: ExportArgs, utc_offset: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    match Zone::resolve(utc_offset, &config)? {
        Zone::Local => export(args, &config, &Local),
        Zone::Fixed(offset) => export(args, &config, &offset),
    }
}

fn export<Tz>(args: ExportArgs, config: &Config, tz: &Tz) -> Result<(), Box<dyn std::error::Error>>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let range = args.range.resolve(tz)?;
    let source = open_source(&args.input);

    let runtime = tokio::runtime::Runtime::new()?;
    let export = runtime.block_on(export_workouts(source, range, tz))?;

    if args.stdout {
        println!("{}", export.csv);
        return Ok(());
    }

    let dir = match args.out_dir {
        Some(dir) => dir,
        None => config.export_dir()?,
    };
    let path = write_artifact(&dir, &export.file_name(), &export.csv)?;
    tracing::info!(rows = export.row_count, "export finished");
    println!("{}", path.display());
    Ok(())
}
