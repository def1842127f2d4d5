use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use cellulose::{GeneratedMap, MapConfig, PlacementHalt, generate_map};
use clap::Parser;
use env_logger::{Builder, Env};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short = 'n', long, default_value_t = 100)]
    count: u64,
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Default)]
struct Totals {
    maps: u64,
    rooms: usize,
    coverage: f64,
    missing_doors: usize,
    shortfalls: usize,
    connected: u64,
    coverage_reached: u64,
    too_many_failures: u64,
    no_frontier: u64,
}

impl Totals {
    fn record(&mut self, map: &GeneratedMap) {
        let report = &map.report;
        self.maps += 1;
        self.rooms += map.rooms.len();
        self.coverage += report.coverage;
        self.missing_doors += report.missing_doors.len();
        self.shortfalls += report.shortfalls.len();
        if report.components <= 1 {
            self.connected += 1;
        }
        match report.halt {
            PlacementHalt::CoverageReached => self.coverage_reached += 1,
            PlacementHalt::TooManyFailures => self.too_many_failures += 1,
            PlacementHalt::NoFrontier => self.no_frontier += 1,
        }
    }
}

fn check_invariants(map: &GeneratedMap) -> Result<()> {
    for wall in map.wall_tiles() {
        ensure!(!map.field.is_open(wall), "seed {}: wall on open tile {wall:?}", map.seed);
    }
    for (index, room) in map.rooms.iter().enumerate() {
        for other in &map.rooms[index + 1..] {
            ensure!(
                !room.footprint.intersects(&other.footprint),
                "seed {}: overlapping rooms at {:?} and {:?}",
                map.seed,
                room.footprint.origin,
                other.footprint.origin
            );
        }
    }
    for hallway in &map.hallways {
        ensure!(
            map.field.is_open(hallway.origin) && map.field.is_open(hallway.destination),
            "seed {}: hallway {:?} -> {:?} ends on a closed tile",
            map.seed,
            hallway.from,
            hallway.to
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    Builder::from_env(Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => MapConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => MapConfig::default(),
    };

    println!("Sweeping {} seeds starting at {}...", args.count, args.seed);
    let mut totals = Totals::default();
    for seed in args.seed..args.seed.saturating_add(args.count) {
        let map = generate_map(config.clone(), seed)
            .with_context(|| format!("Generation failed on seed {seed}"))?;
        check_invariants(&map)?;
        totals.record(&map);
    }

    let maps = totals.maps.max(1) as f64;
    println!("Maps: {}", totals.maps);
    println!("Rooms per map: {:.2}", totals.rooms as f64 / maps);
    println!("Mean coverage: {:.3}", totals.coverage / maps);
    println!("Missing doors: {}", totals.missing_doors);
    println!("Carve shortfalls: {}", totals.shortfalls);
    println!("Fully connected: {}/{}", totals.connected, totals.maps);
    println!(
        "Halts: coverage {}, failures {}, no frontier {}",
        totals.coverage_reached, totals.too_many_failures, totals.no_frontier
    );
    Ok(())
}
