/*
cargo run --release --bin build_subset -- \
    --json      a_data/qa_dataset.json \
    --out-root  ./dataset \
    --per-class 2000 \
    --out-json  qa_dataset_subset.json
*/

use a_data::subset::{build_subset, load_items, ALLOWED_ANS, ALLOWED_QT};
use anyhow::Result;
use chrono::Local;
use clap::Parser;
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::{
    fs::{self, File},
    io::BufWriter,
    path::PathBuf,
};

#[derive(Parser, Debug)]
#[command(version, about = "Build ads/aes subset and copy images by answer buckets")]
struct Cli {
    // QA dataset JSON (array of items)
    #[arg(long)]
    json: PathBuf,

    // Output dataset root folder
    #[arg(long, default_value = "./dataset")]
    out_root: PathBuf,

    // Max samples per (question_type, answer)
    #[arg(long, default_value_t = 2000)]
    per_class: usize,

    #[arg(long, default_value = "qa_dataset_subset.json")]
    out_json: PathBuf,

    // Random seed for sampling
    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    fs::create_dir_all(&cli.log_dir)?;
    let log_path = cli
        .log_dir
        .join(format!("build_subset_{}.log", Local::now().format("%Y%m%d_%H%M%S")));
    WriteLogger::init(LevelFilter::Info, ConfigBuilder::new().build(), File::create(&log_path)?)?;

    let data = load_items(&cli.json)?;
    let json_path = cli.json.canonicalize()?;
    info!("Loaded {} items from {:?}", data.len(), json_path);

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let report = build_subset(data, &json_path, &cli.out_root, cli.per_class, &mut rng)?;

    for b in &report.buckets {
        println!(
            "[OK] ({}, {}) chose {} / available {} → {}",
            b.question_type,
            b.answer,
            b.chosen,
            b.available,
            b.dir.display()
        );
    }

    if let Some(parent) = cli.out_json.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    serde_json::to_writer_pretty(BufWriter::new(File::create(&cli.out_json)?), &report.records)?;
    let out_json = cli.out_json.canonicalize()?;
    info!("Wrote {} records → {:?}", report.records.len(), out_json);

    println!("\n===== Summary =====");
    println!("Input JSON: {}", json_path.display());
    println!("Output root: {}", cli.out_root.display());
    println!("Output JSON: {}  (records: {})", out_json.display(), report.records.len());
    println!("Skipped (question_type not in {:?}): {}", ALLOWED_QT, report.skipped_qt);
    println!("Skipped (answer not in {:?}): {}", ALLOWED_ANS, report.skipped_ans);
    println!("Missing/Unreadable images: {}", report.missing_img);
    println!("Copy failures: {}", report.copy_fail);
    println!("Log file: {}", log_path.display());
    Ok(())
}
