//! SixtyPical Run - Evaluates a program and prints its final state
//!
//! This binary loads a program from its JSON encoding, runs it from `main`
//! with the reference evaluator, and prints every storage cell afterwards.

use clap::Parser;
use sixtypical_ast::Program;
use sixtypical_eval::{Context, EvalConfig, Evaluator, StepBudget};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "sixtypical-run")]
#[command(about = "Evaluate a SixtyPical program and print the final machine state")]
struct Cli {
    /// Path to a program in JSON form
    program: PathBuf,

    /// Maximum number of nested routine calls
    #[arg(long, default_value_t = sixtypical_eval::config::DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,

    /// Stop after this many instructions (0 = no limit)
    #[arg(long, default_value = "0")]
    max_steps: u64,

    /// Print the final state as a JSON object
    #[arg(long)]
    json: bool,
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sixtypical_run=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    info!("Loading program from: {}", cli.program.display());

    let program = match Program::load(&cli.program) {
        Ok(p) => p,
        Err(e) => {
            error!("Failed to load program: {}", e);
            std::process::exit(1);
        }
    };

    let config = EvalConfig::default().with_max_call_depth(cli.max_call_depth);
    let result = if cli.max_steps > 0 {
        Evaluator::with_config(config)
            .with_observer(StepBudget::new(cli.max_steps))
            .eval_program(&program)
    } else {
        Evaluator::with_config(config).eval_program(&program)
    };

    let ctx = match result {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Evaluation failed: {}", e);
            std::process::exit(1);
        }
    };

    info!("Program finished");
    if let Err(e) = print_state(&ctx, cli.json) {
        error!("Failed to write state: {}", e);
        std::process::exit(1);
    }
}

fn print_state(ctx: &Context<'_>, json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(&ctx.snapshot())?);
    } else {
        println!("{ctx}");
    }
    Ok(())
}
