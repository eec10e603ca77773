/*
cargo run --release --bin score_rewards -- \
    --input  c_assess_inf/data/rollouts_val.jsonl \
    --output c_assess_inf/output/rollouts_val_scored.json

legacy weight table:
cargo run --release --bin score_rewards -- \
    --input  c_assess_inf/data/rollouts_val.jsonl \
    --output c_assess_inf/output/rollouts_val_scored_legacy.json \
    --profile legacy
*/

use anyhow::{bail, Result};
use c_assess_inf::{
    logging::init_logging,
    records::{read_json_or_jsonl, Rollout, ScoredRollout},
    stats::{by_answer_type, print_report},
    Profile, RewardConfig,
};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use simplelog::LevelFilter;
use std::{
    fs::{create_dir_all, File},
    io::BufWriter,
    path::PathBuf,
};

// CLI
#[derive(Parser, Debug)]
#[command(version, about = "Score model rollouts with the format + accuracy + non-repeat reward")]
struct Cli {
    // JSON array or JSONL of {id?, predict, ground_truth|solution}
    #[arg(short, long)]
    input: PathBuf,

    // Per-rollout reward breakdowns
    #[arg(short, long)]
    output: PathBuf,

    // Built-in weight table
    #[arg(long, value_enum, default_value_t = Profile::Calibrated)]
    profile: Profile,

    // JSON reward config; overrides --profile
    #[arg(long, value_name = "PATH")]
    weights: Option<PathBuf>,

    // Also log why each zero-accuracy rollout failed
    #[arg(long)]
    verbose: bool,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let log_path = init_logging(&cli.log_dir, "score_rewards", level)?;

    let cfg = RewardConfig::resolve(cli.profile, cli.weights.as_deref())?;
    info!("reward config: {cfg:?}");

    let rollouts: Vec<Rollout> = read_json_or_jsonl(&cli.input)?;
    if rollouts.is_empty() {
        bail!("no rollouts in {}", cli.input.display());
    }
    info!("loaded {} rollouts from {:?}", rollouts.len(), cli.input);

    let bar = ProgressBar::new(rollouts.len() as u64);
    bar.set_style(ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
    )?);

    let mut scored: Vec<ScoredRollout> = Vec::with_capacity(rollouts.len());
    for rollout in &rollouts {
        let row = rollout.score(&cfg);
        if row.answer_type == "invalid" {
            warn!("rollout {} has an unusable ground truth", row.id);
        }
        scored.push(row);
        bar.inc(1);
    }
    bar.finish_with_message("done");

    if let Some(parent) = cli.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    serde_json::to_writer_pretty(BufWriter::new(File::create(&cli.output)?), &scored)?;
    info!("wrote {} scored rollouts to {:?}", scored.len(), cli.output);

    println!("\n=== Reward summary ===");
    print_report(&by_answer_type(&scored));
    println!("\nOutput JSON : {:?}", cli.output);
    println!("Log file    : {:?}", log_path);
    Ok(())
}
