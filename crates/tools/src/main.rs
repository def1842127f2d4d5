use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use cellulose::{Field, GeneratedMap, MapConfig, RoomKind, generate_cave, generate_map};
use clap::{Parser, ValueEnum};
use env_logger::{Builder, Env};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    /// Walls, floor and void as text
    Ascii,
    /// Wall layer only
    Walls,
    /// Full map with rooms, hallways and report
    Json,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// TOML map configuration; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    grid_width: Option<usize>,
    #[arg(long)]
    grid_height: Option<usize>,
    #[arg(long)]
    tiles_per_cell: Option<usize>,
    #[arg(short, long, value_enum, default_value_t = Format::Ascii)]
    format: Format,
    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Carve one WxH cave with the large-room profile instead of a room grid
    #[arg(long, value_parser = parse_size)]
    cave: Option<(usize, usize)>,
    /// Save the effective configuration as TOML
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn parse_size(raw: &str) -> Result<(usize, usize), String> {
    let (width, height) =
        raw.split_once(['x', 'X']).ok_or_else(|| format!("expected WxH, got {raw:?}"))?;
    let parse = |part: &str| part.trim().parse::<usize>().map_err(|err| format!("{part:?}: {err}"));
    Ok((parse(width)?, parse(height)?))
}

fn load_config(args: &Args) -> Result<MapConfig> {
    let mut config = match &args.config {
        Some(path) => MapConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => MapConfig::default(),
    };
    if let Some(width) = args.grid_width {
        config.grid_width = width;
    }
    if let Some(height) = args.grid_height {
        config.grid_height = height;
    }
    if let Some(tiles) = args.tiles_per_cell {
        config.tiles_per_cell = tiles;
    }
    Ok(config)
}

fn walls_text(walls: &Field) -> String {
    let mut out = walls.to_ascii_rows('#', ' ').join("\n");
    out.push('\n');
    out
}

fn render_map(map: &GeneratedMap, format: Format) -> Result<String> {
    Ok(match format {
        Format::Ascii => map.render_ascii(),
        Format::Walls => walls_text(&map.walls),
        Format::Json => serde_json::to_string_pretty(map).context("Failed to serialize map")?,
    })
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let rendered = if let Some((width, height)) = args.cave {
        let profile = RoomKind::Large.default_profile();
        let cave = generate_cave(width, height, &profile, args.seed)
            .with_context(|| format!("Failed to carve {width}x{height} cave"))?;
        match args.format {
            Format::Ascii => cave.render_ascii(),
            Format::Walls => walls_text(&cave.walls),
            Format::Json => serde_json::to_string_pretty(&cave).context("Failed to serialize cave")?,
        }
    } else {
        let config = load_config(&args)?;
        if let Some(path) = &args.write_config {
            config
                .write_atomic(path)
                .with_context(|| format!("Failed to write config: {}", path.display()))?;
        }
        let map = generate_map(config, args.seed).context("Map generation failed")?;
        let report = &map.report;
        log::info!(
            "halt {:?}, {} rooms, {} missing doors, {} shortfalls",
            report.halt,
            map.rooms.len(),
            report.missing_doors.len(),
            report.shortfalls.len()
        );
        render_map(&map, args.format)?
    };

    match &args.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write output: {}", path.display()))?,
        None => print!("{rendered}"),
    }
    Ok(())
}
