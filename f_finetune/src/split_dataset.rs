/*
cargo run --release --bin split_dataset -- \
    --input      qa_dataset_subset.json \
    --output-dir data/ad_quality_qa_split

quick look with 100 items per class and the full judge prompt:
cargo run --release --bin split_dataset -- \
    --input qa_dataset_subset.json \
    --output-dir data/ad_quality_qa_debug \
    --debug --with-prompt
*/

use anyhow::{bail, Context, Result};
use c_assess_inf::logging::init_logging;
use clap::Parser;
use f_finetune::{
    materialize::{materialize_split, MaterializeOptions},
    split::{plan_splits, print_counts, QaItem, Split, SplitRatio},
};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use simplelog::LevelFilter;
use std::{fs::File, io::BufReader, path::PathBuf};

#[derive(Parser, Debug)]
#[command(version, about = "Stratified train/val/test split and on-disk training records")]
struct Cli {
    // QA subset JSON
    #[arg(short, long, default_value = "qa_dataset.json")]
    input: PathBuf,

    // One directory per split is created below this
    #[arg(short, long, default_value = "data/ad_quality_qa_split")]
    output_dir: PathBuf,

    // train:val:test
    #[arg(short, long, default_value = "8:1:1")]
    ratio: SplitRatio,

    // Shuffle seed, reused for every (question_type, answer) group
    #[arg(long, default_value_t = 2025)]
    split_seed: u64,

    // Square side the images are resized to
    #[arg(long, default_value_t = 768)]
    resize: u32,

    // Sample at most --debug-n items per group
    #[arg(long)]
    debug: bool,

    #[arg(long, default_value_t = 100)]
    debug_n: usize,

    // Put the full judge prompt in `problem` instead of the bare question
    #[arg(long)]
    with_prompt: bool,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_path = init_logging(&cli.log_dir, "split_dataset", LevelFilter::Info)?;
    info!("Input file: {:?}", cli.input);
    info!("Ratio {} seed {} resize {}", cli.ratio, cli.split_seed, cli.resize);

    if cli.resize == 0 {
        bail!("--resize must be positive");
    }

    let file = File::open(&cli.input)
        .with_context(|| format!("failed to open {}", cli.input.display()))?;
    let items: Vec<QaItem> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("{} is not an array of QA items", cli.input.display()))?;
    info!("Loaded {} QA items", items.len());

    let debug_n = cli.debug.then_some(cli.debug_n);
    let plan = plan_splits(items, cli.ratio, cli.split_seed, debug_n);

    let opts = MaterializeOptions {
        out_dir: cli.output_dir.clone(),
        resize: cli.resize,
        with_prompt: cli.with_prompt,
    };

    for split in Split::ALL {
        let items = plan.items(split);
        if items.is_empty() {
            warn!("split={split} has no items, skipping");
            continue;
        }

        let bar = ProgressBar::new(items.len() as u64);
        bar.set_style(ProgressStyle::with_template(
            "{msg:>5} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
        )?);
        bar.set_message(split.as_str());

        let report = materialize_split(split, items, &opts, &bar)?;
        bar.finish();
        println!(
            "{split}: {} records ({} missing images, {} unreadable) → {:?}",
            report.written,
            report.missing,
            report.unreadable,
            cli.output_dir.join(split.as_str())
        );
    }

    print_counts(&plan.counts);
    println!("Log file: {:?}", log_path);
    Ok(())
}
