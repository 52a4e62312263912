use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Parser, ValueEnum};
use log::{error, info, LevelFilter};

use cellindex::analysis::validation::{self, ConsistencyError, NeighborStats};
use cellindex::core::domain::CellCount;
use cellindex::engine::search::NeighborSearch;
use cellindex::interface::input::{self, InputSpec};
use cellindex::interface::output::{self, RunReport};
use cellindex::solvers::{BruteForce, CellIndexMethod, Execution};

// --- CLI Definitions ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Cell Index Method: neighbor search for disk-shaped particles", long_about = None)]
struct Args {
    /// Input file (text layout, or JSON when the extension is .json)
    #[arg(short, long, default_value = "input.txt")]
    input: PathBuf,

    /// Output file, `-` for stdout
    #[arg(short, long, default_value = "output.txt")]
    output: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// RNG seed for particle placement; omitted means nondeterministic
    #[arg(short, long)]
    seed: Option<u64>,

    /// Override the cell count per side
    #[arg(long, conflicts_with = "auto_cells")]
    cells: Option<usize>,

    /// Override the cell count with ceil(L / r_c)
    #[arg(long)]
    auto_cells: bool,

    /// Override the interaction radius
    #[arg(long)]
    radius: Option<f64>,

    /// Override periodic boundaries (true/false)
    #[arg(long)]
    periodic: Option<bool>,

    /// Cross-check the grid result against the brute-force search
    #[arg(long)]
    validate: bool,

    /// Run the grid search on the rayon thread pool
    #[arg(long)]
    parallel: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// --- Initialization Helpers ---

fn setup_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }
    builder.init();
}

fn apply_overrides(spec: &mut InputSpec, args: &Args) {
    if let Some(m) = args.cells {
        spec.cell_count = CellCount::Fixed(m);
    }
    if args.auto_cells {
        spec.cell_count = CellCount::Auto;
    }
    if let Some(r) = args.radius {
        spec.interaction_radius = r;
    }
    if let Some(p) = args.periodic {
        spec.periodic = p;
    }
}

fn open_output(target: &str) -> Result<Box<dyn Write>> {
    if target == "-" {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    let file = File::create(target).with_context(|| format!("Failed to create output file {}", target))?;
    Ok(Box::new(BufWriter::new(file)))
}

// --- Main ---

fn main() -> Result<()> {
    // 1. Parsing
    let args = Args::parse();
    setup_logging(args.verbose);

    // 2. Input
    let mut spec = InputSpec::from_path(&args.input)?;
    apply_overrides(&mut spec, &args);
    info!(
        "Loaded {} particles, L={}, r_c={}, cells={:?}, periodic={}",
        spec.particle_count(),
        spec.side_length,
        spec.interaction_radius,
        spec.cell_count,
        spec.periodic
    );

    // 3. Placement
    let mut rng = input::seeded_rng(args.seed);
    let plane = Arc::new(input::place_randomly(&spec, &mut rng)?);

    // 4. Search (all configuration errors surface here, before any work)
    let config = spec.grid_config()?;
    let execution = if args.parallel { Execution::Parallel } else { Execution::Sequential };
    let cim = CellIndexMethod::new(plane.clone(), config)
        .context("Invalid Cell Index Method configuration")?
        .with_execution(execution);

    let started_at = Local::now();
    info!("{}: Starting {} execution", started_at, cim.name());
    let clock = Instant::now();
    let neighbors = cim.execute();
    let elapsed_ms = clock.elapsed().as_secs_f64() * 1e3;
    let finished_at = Local::now();
    info!("{}: Finished {} execution", finished_at, cim.name());
    info!("Execution time: {:.3} ms", elapsed_ms);

    // 5. Optional oracle check
    if args.validate {
        let brute = BruteForce::new(plane.clone(), config.interaction_radius, config.periodic)?;
        let oracle = brute.execute();
        match validation::ensure_consistent(&neighbors, &oracle) {
            Ok(()) => info!("{} agrees with {}", cim.name(), brute.name()),
            Err(ConsistencyError::Mismatch(diffs)) => {
                error!("{}", validation::describe(&plane, &diffs));
                bail!("{} disagrees with {} for {} particle(s)", cim.name(), brute.name(), diffs.len());
            }
        }
    }

    let stats = NeighborStats::from_map(&neighbors);
    info!(
        "{} pairs, mean {:.2} neighbors, max {}, {} isolated",
        stats.pairs, stats.mean_neighbors, stats.max_neighbors, stats.isolated
    );

    // 6. Export
    let writer = open_output(&args.output)?;
    match args.format {
        Format::Text => output::write_text(writer, &plane, &neighbors)?,
        Format::Json => {
            let report = RunReport {
                started_at,
                finished_at,
                elapsed_ms,
                method: cim.name().to_string(),
                side_length: plane.side_length(),
                cell_count: cim.geometry().cell_count(),
                config,
                validated: args.validate,
                stats,
                particles: RunReport::particle_reports(&plane, &neighbors),
            };
            output::write_json(writer, &report)?;
        }
    }
    if args.output != "-" {
        info!("Results written to {}", args.output);
    }

    Ok(())
}
