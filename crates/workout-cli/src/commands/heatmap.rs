use chrono::{Local, TimeZone};
use clap::Args;
use std::path::PathBuf;
use workout_core::{build_heatmap, render_html, write_artifact, Config, Orientation};

use super::{open_source, RangeArgs, Zone};

#[derive(Args)]
pub struct HeatmapArgs {
    /// Health app export.xml, or a JSON array of workout records
    #[arg(long, short)]
    input: PathBuf,
    #[command(flatten)]
    range: RangeArgs,
    /// portrait (month rows) or landscape (week columns)
    #[arg(long)]
    orientation: Option<Orientation>,
    /// Print per-year statistics and the day index as JSON
    #[arg(long)]
    json: bool,
    /// Write the HTML document to this file instead of stdout
    #[arg(long, short)]
    out: Option<PathBuf>,
}

pub fn run(args: HeatmapArgs, utc_offset: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    match Zone::resolve(utc_offset, &config)? {
        Zone::Local => heatmap(args, &config, &Local),
        Zone::Fixed(offset) => heatmap(args, &config, &offset),
    }
}

fn heatmap<Tz: TimeZone>(
    args: HeatmapArgs,
    config: &Config,
    tz: &Tz,
) -> Result<(), Box<dyn std::error::Error>> {
    let range = args.range.resolve(tz)?;
    let source = open_source(&args.input);
    let index = build_heatmap(source.as_ref(), range.as_ref(), &config.level_map()?, tz)?;
    let legend = config.legend()?;

    if args.json {
        let years: Vec<_> = index
            .summaries()
            .into_iter()
            .map(|summary| {
                serde_json::json!({
                    "legend": legend.entries(summary.year, &summary.legend_counts),
                    "summary": summary,
                })
            })
            .collect();
        let report = serde_json::json!({ "years": years, "days": index });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let orientation = args.orientation.unwrap_or(config.heatmap.orientation);
    let html = render_html(&index, &legend, orientation, tz, &config.heatmap.title);
    match args.out {
        Some(out) => {
            let dir = out.parent().map(PathBuf::from).unwrap_or_default();
            let name = out
                .file_name()
                .ok_or_else(|| format!("not a file path: {}", out.display()))?
                .to_string_lossy()
                .into_owned();
            let path = write_artifact(&dir, &name, &html)?;
            println!("{}", path.display());
        }
        None => print!("{html}"),
    }
    Ok(())
}
