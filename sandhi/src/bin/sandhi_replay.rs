//! Replay a recorded sensor trace through the tablet-mode controller.
//!
//! Prints every mode transition with its trace timestamp, then a summary of
//! the run.
//!
//! # Usage
//!
//! ```bash
//! sandhi-replay --trace fold.jsonl
//! sandhi-replay --trace fold.jsonl --config sandhi.toml --json
//! RUST_LOG=debug sandhi-replay -t fold.jsonl --lid-closed
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use sandhi::config::SandhiConfig;
use sandhi::core::types::{LidState, SwitchStates, TabletSwitch, UiMode};
use sandhi::io::{ReplaySummary, Replayer, TraceReader};
use sandhi::metrics::LogMetrics;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Auto,
    Clamshell,
    Tablet,
}

impl From<ModeArg> for UiMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Auto => UiMode::Auto,
            ModeArg::Clamshell => UiMode::Clamshell,
            ModeArg::Tablet => UiMode::Tablet,
        }
    }
}

#[derive(Parser)]
#[command(name = "sandhi-replay")]
#[command(about = "Replay an accelerometer trace through the tablet-mode controller")]
struct Args {
    /// Input trace (JSON lines)
    #[arg(short, long)]
    trace: PathBuf,

    /// TOML configuration file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured UI mode
    #[arg(long, value_enum)]
    ui_mode: Option<ModeArg>,

    /// Start with the lid switch reporting closed
    #[arg(long)]
    lid_closed: bool,

    /// Start with the hardware tablet switch on
    #[arg(long)]
    tablet_switch: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> sandhi::Result<()> {
    let mut config = match &args.config {
        Some(path) => SandhiConfig::from_file(path)?,
        None => SandhiConfig::default(),
    };
    if let Some(mode) = args.ui_mode {
        config.mode.ui_mode = mode.into();
    }

    // RUST_LOG overrides the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.logging.level.as_str()),
    )
    .init();

    log::info!("Replaying {}", args.trace.display());

    let switch_states = SwitchStates {
        lid: if args.lid_closed {
            LidState::Closed
        } else {
            LidState::Open
        },
        tablet_mode: TabletSwitch::from(args.tablet_switch),
    };

    let mut replayer = Replayer::with_sink(config.controller_config(), Some(Box::new(LogMetrics)));
    replayer.start(Some(switch_states));

    for event in TraceReader::open(&args.trace)? {
        replayer.apply(&event?);
    }

    let summary = replayer.finish();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &ReplaySummary) {
    println!("Transitions");
    println!("===========");
    if summary.transitions.is_empty() {
        println!("  (none)");
    }
    for transition in &summary.transitions {
        println!(
            "  {:>10.3} s  {}",
            transition.t_ms as f64 / 1000.0,
            transition.state.label()
        );
    }
    println!();

    println!("Summary");
    println!("=======");
    println!(
        "  Events: {} ({} accelerometer, {} out of order)",
        summary.events, summary.accelerometer_updates, summary.out_of_order_events
    );
    println!("  Final state: {}", summary.final_state.label());
    match summary.final_lid_angle {
        Some(angle) => println!("  Final lid angle: {:.1}°", angle),
        None => println!("  Final lid angle: unknown"),
    }
    println!("  Input blocking changes: {}", summary.blocking_changes);
    if !summary.lid_angle_samples.is_empty() {
        println!("  Lid angle samples: {:?}", summary.lid_angle_samples);
    }
    for (action, count) in &summary.actions {
        println!("  {}: {}", action, count);
    }

    let usage = &summary.usage;
    println!(
        "  Usage: {:.1} min tablet, {:.1} min clamshell",
        usage.active.as_secs_f64() / 60.0,
        usage.inactive.as_secs_f64() / 60.0
    );
    if let Some(pct) = usage.active_percentage {
        println!("  Tablet share: {}%", pct);
    }
}
