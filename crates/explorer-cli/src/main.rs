//! `explorer` – command-line entry point.
//!
//! 1. Parses `--model`, `--furniture_db` and `--mode`, plus the optional
//!    session flags.
//! 2. Loads `~/.explorer/config.toml` (or `--config`), with `EXPLORER_*`
//!    environment overrides.
//! 3. Ingests the building model and loads the furniture catalog.
//! 4. Runs the selected mode against simulated devices until **Ctrl-C** or
//!    the tick budget runs out.

mod config;
mod session;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Parser, ValueEnum};
use colored::Colorize;
use explorer_hal::ScriptedVoice;
use explorer_perception::ingestion::ModelIngestion;
use explorer_perception::{Catalog, DetectionMapper};
use explorer_types::Mode;
use tracing::{info, warn};

/// Exit code for configuration errors.
const EXIT_CONFIG: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Human,
    Robot,
}

impl From<ModeArg> for Mode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Human => Mode::Human,
            ModeArg::Robot => Mode::Robot,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "explorer", version, about = "Indoor exploration for AR glasses and wheeled robots")]
struct Args {
    /// Path to the 3D building model (OBJ or IFC).
    #[arg(long)]
    model: PathBuf,

    /// Path to the furniture/object catalog (JSON).
    #[arg(long = "furniture_db", alias = "furniture-db")]
    furniture_db: PathBuf,

    /// Run mode.
    #[arg(long, value_enum, default_value_t = ModeArg::Human)]
    mode: ModeArg,

    /// Config file (default: ~/.explorer/config.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Robot-mode destination as `x,y`.
    #[arg(long, value_parser = parse_goal, allow_hyphen_values = true)]
    goal: Option<(f32, f32)>,

    /// Stop after this many ticks.
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Voice command script for human mode, one command per line.
    #[arg(long)]
    voice_script: Option<PathBuf>,
}

fn parse_goal(s: &str) -> Result<(f32, f32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got '{s}'"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x '{x}': {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y '{y}': {e}"))?;
    if !(x.is_finite() && y.is_finite()) {
        return Err(format!("goal must be finite, got '{s}'"));
    }
    Ok((x, y))
}

fn main() -> ExitCode {
    let args = Args::parse();
    let _tracing = explorer_runtime::telemetry::init_tracing("explorer");

    print_banner();

    // ── Configuration ─────────────────────────────────────────────────────
    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let cfg = match config::load(&config_path) {
        Ok((cfg, true)) => {
            println!("  Config loaded from {}", config_path.display().to_string().bold());
            cfg
        }
        Ok((cfg, false)) => {
            println!("  {}", "No config file found; using defaults.".dimmed());
            cfg
        }
        Err(e) => {
            eprintln!("{}: {}", "Config error".red(), e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    if let Err(e) = cfg.validate() {
        eprintln!("{}: {}", "Config error".red(), e);
        return ExitCode::from(EXIT_CONFIG);
    }
    let mapper = match DetectionMapper::new(cfg.mapper.clone()) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}: {}", "Config error".red(), e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    // ── Building model & catalog ──────────────────────────────────────────
    let model = ModelIngestion::new().load_model(&args.model);
    if model.is_empty() {
        println!("  {} {}", "Building model unavailable:".yellow(), args.model.display());
    } else {
        println!(
            "  Building model {} ({} named part(s))",
            args.model.display().to_string().bold(),
            model.objects.len()
        );
    }
    let catalog = Catalog::load_or_empty(&args.furniture_db);
    println!("  Catalog: {} known object type(s)", catalog.len());

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – stopping …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; stop with --max-ticks instead");
    }

    // ── Mode dispatch ─────────────────────────────────────────────────────
    let mode = Mode::from(args.mode);
    info!(%mode, "Starting session");
    println!("\n  Running in {} mode. Press Ctrl-C to exit.\n", mode.to_string().to_uppercase().bold());

    let result = match mode {
        Mode::Robot => {
            session::run_robot(&cfg, catalog, mapper, args.goal, &shutdown, args.max_ticks)
                .map(|outcome| session::print_robot_outcome(&outcome))
        }
        Mode::Human => {
            let voice = match args.voice_script.as_deref().map(ScriptedVoice::from_file).transpose() {
                Ok(v) => v.unwrap_or_default(),
                Err(e) => {
                    eprintln!("{}: {}", "Config error".red(), e);
                    return ExitCode::from(EXIT_CONFIG);
                }
            };
            session::run_human(&cfg, catalog, mapper, voice, &shutdown, args.max_ticks)
                .map(|ticks| println!("\n  Human mode ended after {ticks} step(s)."))
        }
    };
    if let Err(e) = result {
        eprintln!("{}: {}", "Config error".red(), e);
        return ExitCode::from(EXIT_CONFIG);
    }

    println!("  {}", "✓ Exiting explorer.".green());
    ExitCode::SUCCESS
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("  {} {}", "explorer".bold().cyan(), format!("v{}", env!("CARGO_PKG_VERSION")).dimmed());
    println!("  Indoor perception and navigation for AR glasses and robots");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn required_paths_and_default_mode() {
        let args = Args::try_parse_from(["explorer", "--model", "b.obj", "--furniture_db", "db.json"]).unwrap();
        assert_eq!(args.mode, ModeArg::Human);
        assert_eq!(args.furniture_db, PathBuf::from("db.json"));
        assert!(args.goal.is_none());
    }

    #[test]
    fn missing_model_is_a_usage_error() {
        assert!(Args::try_parse_from(["explorer", "--furniture_db", "db.json"]).is_err());
    }

    #[test]
    fn unknown_mode_is_rejected() {
        let res = Args::try_parse_from([
            "explorer", "--model", "b.obj", "--furniture_db", "db.json", "--mode", "drone",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn dashed_alias_and_goal() {
        let args = Args::try_parse_from([
            "explorer", "--model", "b.obj", "--furniture-db", "db.json", "--mode", "robot", "--goal", "-1.5, 2",
        ])
        .unwrap();
        assert_eq!(Mode::from(args.mode), Mode::Robot);
        assert_eq!(args.goal, Some((-1.5, 2.0)));
    }

    #[test]
    fn parse_goal_rejects_garbage() {
        assert!(parse_goal("3").is_err());
        assert!(parse_goal("a,b").is_err());
        assert!(parse_goal("inf,0").is_err());
        assert_eq!(parse_goal("5,0"), Ok((5.0, 0.0)));
    }
}
