//! `wayfarer-cli` – Wayfarer Command Line Interface
//!
//! Runs one navigation mission end to end on the simulated hardware.  It:
//!
//! 1. Loads `~/.wayfarer/config.toml` (or the path given as the first
//!    argument), writing a default file on first run.
//! 2. Wires the simulated scanner, drive base, camera, and classifier from
//!    the `[sim]` section.
//! 3. Intercepts **Ctrl-C** to trigger the emergency stop, which halts the
//!    drive base immediately and aborts the mission before its next motion
//!    command.
//! 4. Prints the planned map and a summary, or the full report as JSON when
//!    `WAYFARER_REPORT=json`.
//!
//! # Exit codes
//!
//! | Code | Meaning |
//! |---|---|
//! | 0 | Goal reached |
//! | 1 | Fatal fault (hardware, actuation mismatch, contract violation) |
//! | 2 | No path to the goal |
//! | 3 | Invalid configuration |
//! | 130 | Operator interrupt |

mod config;

use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

use wayfarer_hal::sim::{RecordingSleeper, SimCamera, SimClassifier, SimDriveBase, SimRangeScanner};
use wayfarer_hal::{Sleeper, ThreadSleeper};
use wayfarer_runtime::{Mission, MissionHardware, init_tracing};
use wayfarer_types::{MissionOutcome, MissionReport, NavError};

const EXIT_FAULT: u8 = 1;
const EXIT_NO_PATH: u8 = 2;
const EXIT_CONFIG: u8 = 3;
const EXIT_INTERRUPTED: u8 = 130;

fn main() -> ExitCode {
    let _telemetry = init_tracing("wayfarer");
    let json_report = std::env::var("WAYFARER_REPORT").as_deref() == Ok("json");

    if !json_report {
        print_banner();
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let explicit_path = std::env::args_os().nth(1).map(PathBuf::from);
    let path = explicit_path.clone().unwrap_or_else(config::config_path);
    if explicit_path.is_none() && !path.exists() {
        match config::save_to(&config::Config::default(), &path) {
            Ok(()) => info!(path = %path.display(), "wrote default configuration"),
            Err(e) => warn!(error = %e, "could not write default configuration"),
        }
    }
    let cfg = match config::load_or_default(&path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}: {}", "Config error".red(), e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };
    info!(path = %path.display(), "configuration loaded");

    // ── Mission ───────────────────────────────────────────────────────────
    let mission = match Mission::new(cfg.mission.clone(), sim_hardware(&cfg)) {
        Ok(mission) => mission,
        Err(e) => {
            eprintln!("{}: {}", "Config error".red(), e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = interrupted.clone();
    let estop = mission.emergency_stop();
    if let Err(e) = ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("{}", "⚠  Ctrl-C received – emergency stop".yellow().bold());
        interrupted_clone.store(true, Ordering::SeqCst);
        estop.trigger();
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; emergency stop on Ctrl-C will not be available");
    }

    let result = mission.run();

    match &result {
        Ok(report) if json_report => match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{json}"),
            Err(e) => error!(error = %e, "failed to serialize mission report"),
        },
        Ok(report) => print_report(report),
        Err(e) => {
            error!(error = %e, fatal = e.is_fatal(), "mission aborted");
            eprintln!("{}: {}", "Mission aborted".red().bold(), e);
        }
    }

    let code = exit_code(&result, interrupted.load(Ordering::SeqCst));
    ExitCode::from(code)
}

// ─────────────────────────────────────────────────────────────────────────────
// Simulated hardware
// ─────────────────────────────────────────────────────────────────────────────

fn sim_hardware(cfg: &config::Config) -> MissionHardware {
    let scanner = cfg
        .sim
        .readings
        .iter()
        .fold(SimRangeScanner::new(), |s, r| s.with_reading(r.angle, r.distance));

    let label = cfg.mission.perception.hazard_label.clone();
    let classifier = match cfg.sim.hazard_frame {
        Some(frame) => SimClassifier::new(label).with_hit_on(frame),
        None => SimClassifier::new(label),
    };

    let sleeper: Arc<dyn Sleeper> = if cfg.sim.realtime {
        Arc::new(ThreadSleeper)
    } else {
        Arc::new(RecordingSleeper::new())
    };

    MissionHardware {
        scanner: Box::new(scanner),
        drive: Arc::new(SimDriveBase::new()),
        camera: Box::new(SimCamera::new("sim_camera")),
        classifier: Box::new(classifier),
        sleeper,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

fn exit_code(result: &Result<MissionReport, NavError>, interrupted: bool) -> u8 {
    if interrupted {
        return EXIT_INTERRUPTED;
    }
    match result {
        Ok(report) => match report.outcome {
            MissionOutcome::Completed => 0,
            MissionOutcome::NoPath => EXIT_NO_PATH,
        },
        Err(NavError::EmergencyStopped) => EXIT_INTERRUPTED,
        Err(NavError::Config(_)) => EXIT_CONFIG,
        Err(_) => EXIT_FAULT,
    }
}

fn print_report(report: &MissionReport) {
    println!();
    for row in &report.map {
        let line: Vec<String> = row.split(' ').map(colour_glyph).collect();
        println!("  {}", line.join(" "));
    }
    println!();

    match report.outcome {
        MissionOutcome::Completed => println!(
            "  {} reached {} from {}",
            "✓".green().bold(),
            report.goal.to_string().bold(),
            report.start
        ),
        MissionOutcome::NoPath => println!(
            "  {} no path from {} to {}",
            "✗".yellow().bold(),
            report.start,
            report.goal.to_string().bold()
        ),
    }
    println!(
        "  {} walls · {} moves · {} turns · {} hazard pauses",
        report.walls, report.moves, report.turns, report.hazard_pauses
    );
    println!("  mission {}", report.mission_id.to_string().dimmed());
    println!();
}

fn colour_glyph(glyph: &str) -> String {
    match glyph {
        "#" => glyph.red().bold().to_string(),
        "A" | "Z" => glyph.cyan().bold().to_string(),
        "@" => glyph.green().to_string(),
        "." => glyph.dimmed().to_string(),
        _ => glyph.yellow().to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#" _      __            ___         "#.bold().cyan());
    println!("{}", r#"| | /| / /__ ___ __ _/ _/__ _____ "#.bold().cyan());
    println!("{}", r#"| |/ |/ / _ `/ // / _/ _ `/ __/ -_)"#.bold().cyan());
    println!("{}", r#"|__/|__/\_,_/\_, /_/ \_,_/_/  \__/ "#.bold().cyan());
    println!("{}", r#"            /___/                  "#.bold().cyan());
    println!();
    println!("  {} {}",
        "Wayfarer".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Grid navigation with hazard-aware driving");
    println!();
}
