mod combine;
mod config;
mod error;
mod genetic;
mod io;
mod optimizer;
mod parcel;
mod pareto;
mod rank;
mod scoring;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::combine::GeneratorParams;
use crate::genetic::{GaConfig, GaResult, GeneticOptimizer};
use crate::optimizer::{run_exhaustive, OptimizationResult};

const VERSION: &str = "1.2.0";
const SCHEMA_VERSION: &str = "1.0.0";

#[derive(Parser, Debug)]
#[command(name = "landassembly")]
#[command(version)]
#[command(about = "Multi-parcel land assembly combination optimizer")]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output path for the CSV result table
    #[arg(short, long, global = true)]
    out: Option<String>,

    /// Run mode when no subcommand is given: "exhaustive" or "genetic"
    #[arg(short, long, default_value = "exhaustive")]
    mode: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Exhaustively enumerate, score and rank parcel combinations
    Optimize {
        /// Number of ranked combinations to keep
        #[arg(long, default_value = "10")]
        top: usize,
        /// Generate a JSON result bundle next to the CSV
        #[arg(long)]
        json: bool,
    },
    /// Heuristic search for large parcel sets via a genetic algorithm
    Genetic {
        /// Population size (overrides [genetic] in the config)
        #[arg(long)]
        pop_size: Option<usize>,
        /// Number of generations
        #[arg(long)]
        generations: Option<usize>,
        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,
        /// Generate a JSON result bundle next to the CSV
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file
    Validate,
    /// Print version information
    Version,
}

// ============================================================================
// JSON Output Structures
// ============================================================================

#[derive(Serialize)]
struct Manifest {
    schema_version: String,
    tool_version: String,
    timestamp_utc: String,
    platform: String,
    config_hash: String,
    config_snapshot: config::Root,
}

#[derive(Serialize)]
struct ResultBundle {
    manifest: Manifest,
    result: OptimizationResult,
    wall_time_ms: f64,
}

#[derive(Serialize)]
struct GeneticBundle {
    manifest: Manifest,
    config: GaConfig,
    result: GaResult,
    wall_time_ms: f64,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn compute_hash(data: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let mut hasher = DefaultHasher::new();
    data.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

fn get_timestamp() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let days_since_epoch = now / 86400;
    let secs_today = now % 86400;

    let mut year = 1970u64;
    let mut remaining_days = days_since_epoch;
    loop {
        let leap = year % 4 == 0 && (year % 100 != 0 || year % 400 == 0);
        let days_in_year = if leap { 366 } else { 365 };
        if remaining_days < days_in_year {
            break;
        }
        remaining_days -= days_in_year;
        year += 1;
    }
    let month_days = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let mut month = 1u64;
    for &days in &month_days {
        let leap = year % 4 == 0 && (year % 100 != 0 || year % 400 == 0);
        let d = if month == 2 && leap { 29 } else { days };
        if remaining_days < d {
            break;
        }
        remaining_days -= d;
        month += 1;
    }

    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        remaining_days + 1,
        secs_today / 3600,
        (secs_today % 3600) / 60,
        secs_today % 60
    )
}

fn create_manifest(cfg: &config::Root, cfg_text: &str) -> Manifest {
    Manifest {
        schema_version: SCHEMA_VERSION.to_string(),
        tool_version: VERSION.to_string(),
        timestamp_utc: get_timestamp(),
        platform: std::env::consts::OS.to_string(),
        config_hash: compute_hash(cfg_text),
        config_snapshot: cfg.clone(),
    }
}

fn generator_params(cfg: &config::Root) -> GeneratorParams {
    GeneratorParams {
        target_area_min: cfg.search.target_area_min,
        target_area_max: cfg.search.target_area_max,
        max_parcels_in_combo: cfg.search.max_parcels_in_combination,
        max_combinations: cfg.search.max_combinations,
        distance_threshold_km: cfg.search.distance_threshold_km,
    }
}

fn load_config(path: &str) -> Result<(config::Root, String)> {
    let cfg_text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path))?;
    let cfg: config::Root =
        toml::from_str(&cfg_text).with_context(|| format!("failed to parse config: {}", path))?;
    cfg.validate_file()?;
    Ok((cfg, cfg_text))
}

// ============================================================================
// Run Modes
// ============================================================================

fn run_optimize(
    cfg: &config::Root,
    cfg_text: &str,
    out_path: &str,
    top: usize,
    json_output: bool,
) -> Result<()> {
    let parcels = cfg.to_parcels();
    let params = generator_params(cfg);

    let start = Instant::now();
    let result = run_exhaustive(&parcels, &params, cfg.score_weights(), top)?;
    let wall_time_ms = start.elapsed().as_secs_f64() * 1000.0;

    let mut w = io::CsvWriter::create(out_path)?;
    w.write_header()?;
    for c in &result.top_combinations {
        w.write_row(c)?;
    }
    w.flush()?;

    eprintln!(
        "[landassembly] evaluated {} combinations from {} parcels in {:.1}ms",
        result.total_combinations_evaluated, result.total_parcels, wall_time_ms
    );
    eprintln!(
        "[landassembly] pareto-optimal: {}/{} ({:.1}%), avg score {:.2}, best {:.2}",
        result.pareto_optimal_count,
        result.total_combinations_evaluated,
        result.summary.pareto_ratio * 100.0,
        result.summary.average_score,
        result.summary.best_score
    );

    match &result.optimal_combination {
        Some(best) => eprintln!(
            "[landassembly] best: {} area={:.0}sqm far={:.0}% cost={:.2}eok score={:.2}",
            best.combination.id,
            best.combination.total_area,
            best.combination.combined_far,
            best.combination.total_cost,
            best.score.total_score
        ),
        None => {
            if let Some(msg) = &result.message {
                eprintln!("[landassembly] {}", msg);
            }
        }
    }
    eprintln!("[landassembly] CSV: {}", out_path);

    if json_output {
        let json_path = out_path.replace(".csv", ".json");
        let bundle = ResultBundle {
            manifest: create_manifest(cfg, cfg_text),
            result,
            wall_time_ms,
        };
        fs::write(&json_path, serde_json::to_string_pretty(&bundle)?)?;
        eprintln!("[landassembly] JSON bundle: {}", json_path);
    }

    Ok(())
}

fn run_genetic(
    cfg: &config::Root,
    cfg_text: &str,
    out_path: &str,
    pop_size: Option<usize>,
    generations: Option<usize>,
    seed: Option<u64>,
    json_output: bool,
) -> Result<()> {
    let parcels = cfg.to_parcels();

    let mut ga_config = cfg
        .genetic
        .as_ref()
        .map(|g| g.to_ga_config())
        .unwrap_or_default();
    if let Some(p) = pop_size {
        ga_config.pop_size = p;
    }
    if let Some(g) = generations {
        ga_config.generations = g;
    }
    if let Some(s) = seed {
        ga_config.seed = s;
    }

    eprintln!(
        "[landassembly] genetic search over {} parcels: pop={} gens={} seed={}",
        parcels.len(),
        ga_config.pop_size,
        ga_config.generations,
        ga_config.seed
    );

    let start = Instant::now();
    let opt = GeneticOptimizer::new(
        &parcels,
        cfg.search.target_area_min,
        cfg.search.target_area_max,
        ga_config.clone(),
    )?;
    let result = opt.run();
    let wall_time_ms = start.elapsed().as_secs_f64() * 1000.0;

    let mut w = io::CsvWriter::create(out_path)?;
    w.write_ga_header()?;
    for (i, sol) in result.solutions.iter().enumerate() {
        w.write_ga_row(i + 1, sol)?;
    }
    w.flush()?;

    let best_fitness = result
        .best_fitness_history
        .last()
        .copied()
        .unwrap_or_default();
    eprintln!(
        "[landassembly] {} generations run, best fitness {:.2}, {} distinct solutions in {:.1}ms",
        result.generations_run,
        best_fitness,
        result.solutions.len(),
        wall_time_ms
    );
    if let Some(best) = result.solutions.first() {
        eprintln!(
            "[landassembly] best: {} parcels, area={:.0}sqm far={:.0}% cost={:.2}eok",
            best.parcel_ids.len(),
            best.total_area,
            best.estimated_far,
            best.estimated_cost
        );
    }
    eprintln!("[landassembly] CSV: {}", out_path);

    if json_output {
        let json_path = out_path.replace(".csv", ".json");
        let bundle = GeneticBundle {
            manifest: create_manifest(cfg, cfg_text),
            config: ga_config,
            result,
            wall_time_ms,
        };
        fs::write(&json_path, serde_json::to_string_pretty(&bundle)?)?;
        eprintln!("[landassembly] JSON bundle: {}", json_path);
    }

    Ok(())
}

fn validate_config(cfg_path: &str) -> Result<()> {
    let (cfg, _) = load_config(cfg_path)?;

    eprintln!("[landassembly] config valid: {}", cfg_path);
    eprintln!("  project: {} v{}", cfg.project.name, cfg.project.version);
    eprintln!("  parcels: {}", cfg.parcels.len());
    eprintln!(
        "  search: area=[{}, {}]sqm, combo<={}, cap={}, distance<={}km",
        cfg.search.target_area_min,
        cfg.search.target_area_max,
        cfg.search.max_parcels_in_combination,
        cfg.search.max_combinations,
        cfg.search.distance_threshold_km
    );

    let w = cfg.score_weights();
    eprintln!(
        "  weights: area={} far={} cost={} shape={} synergy={}",
        w.area, w.far, w.cost, w.shape, w.synergy
    );

    if let Some(g) = &cfg.genetic {
        eprintln!(
            "  genetic: pop={} gens={} pc={} pm={} seed={}",
            g.pop_size, g.generations, g.crossover_prob, g.mutation_prob, g.seed
        );
    }

    Ok(())
}

fn print_version() {
    eprintln!("landassembly - Multi-parcel land assembly combination optimizer");
    eprintln!();
    eprintln!("  Tool Version:    {}", VERSION);
    eprintln!("  Schema Version:  {}", SCHEMA_VERSION);
    eprintln!("  Platform:        {}", std::env::consts::OS);
    eprintln!();
    eprintln!("Exhaustive path:");
    eprintln!("  - Subset enumeration under area/adjacency constraints");
    eprintln!("  - Five-dimension scoring: area, FAR, cost, shape, synergy");
    eprintln!("  - Pareto-dominance annotation with explainability");
    eprintln!();
    eprintln!("Genetic path:");
    eprintln!("  - Parcel-selection bitstring chromosomes");
    eprintln!("  - Tournament selection, single-point crossover, elitism");
    eprintln!("  - Seedable for reproducible runs");
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Commands::Version) => {
            print_version();
            Ok(())
        }
        Some(Commands::Validate) => {
            let cfg_path = args.config.context("--config required for validate")?;
            validate_config(&cfg_path)
        }
        Some(Commands::Optimize { top, json }) => {
            let cfg_path = args.config.context("--config required")?;
            let out_path = args
                .out
                .unwrap_or_else(|| "results/combinations.csv".to_string());
            let (cfg, cfg_text) = load_config(&cfg_path)?;

            eprintln!(
                "[landassembly] {} v{}",
                cfg.project.name, cfg.project.version
            );
            run_optimize(&cfg, &cfg_text, &out_path, top, json)
        }
        Some(Commands::Genetic {
            pop_size,
            generations,
            seed,
            json,
        }) => {
            let cfg_path = args.config.context("--config required")?;
            let out_path = args
                .out
                .unwrap_or_else(|| "results/ga_solutions.csv".to_string());
            let (cfg, cfg_text) = load_config(&cfg_path)?;

            eprintln!(
                "[landassembly] {} v{}",
                cfg.project.name, cfg.project.version
            );
            run_genetic(&cfg, &cfg_text, &out_path, pop_size, generations, seed, json)
        }
        None => {
            let cfg_path = args.config.context("--config required")?;
            let out_path = args.out.context("--out required")?;
            let (cfg, cfg_text) = load_config(&cfg_path)?;

            eprintln!(
                "[landassembly] {} v{}",
                cfg.project.name, cfg.project.version
            );

            match args.mode.as_str() {
                "exhaustive" => run_optimize(&cfg, &cfg_text, &out_path, 10, false),
                "genetic" => run_genetic(&cfg, &cfg_text, &out_path, None, None, None, false),
                _ => anyhow::bail!(
                    "unknown mode: {} (use 'exhaustive' or 'genetic')",
                    args.mode
                ),
            }
        }
    }
}
