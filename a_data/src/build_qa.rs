/*
cargo run --release --bin build_qa -- \
    --input-dir a_data/step1 \
    --out-file  a_data/qa_dataset.json
*/

use a_data::qa::build_qa_from_dir;
use anyhow::{bail, Result};
use chrono::Local;
use clap::Parser;
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, TermLogger, TerminalMode, WriteLogger,
};
use std::{
    fs::{create_dir_all, File},
    io::BufWriter,
    path::PathBuf,
};

// CLI parameters
#[derive(Parser, Debug)]
#[command(version, about = "Build one aes and one ads question per annotated ad image")]
struct Cli {
    // Directory of per-image annotation JSONs
    #[arg(long, default_value = "step1")]
    input_dir: PathBuf,

    #[arg(long = "out-file", value_name = "PATH", default_value = "qa_dataset.json")]
    out_file: PathBuf,

    // Seed for the question template choice
    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    create_dir_all(&cli.log_dir)?;
    let log_path = cli
        .log_dir
        .join(format!("build_qa_{}.log", Local::now().format("%Y%m%d_%H%M%S")));
    CombinedLogger::init(vec![
        WriteLogger::new(LevelFilter::Info, ConfigBuilder::new().build(), File::create(&log_path)?),
        TermLogger::new(
            LevelFilter::Warn,
            ConfigBuilder::new().build(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
    ])?;
    info!("Starting QA generation from {:?}", cli.input_dir);

    if !cli.input_dir.is_dir() {
        bail!("{} is not a directory", cli.input_dir.display());
    }

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let built = build_qa_from_dir(&cli.input_dir, &mut rng)?;

    if let Some(parent) = cli.out_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    serde_json::to_writer_pretty(BufWriter::new(File::create(&cli.out_file)?), &built.items)?;
    info!("Wrote {} QA items → {:?}", built.items.len(), cli.out_file);

    println!("\n=== QA summary ===");
    println!("Annotations read   : {}", built.files_read);
    println!("Annotations skipped: {}", built.files_skipped);
    println!("QA items           : {}", built.items.len());
    println!("Output JSON        : {:?}", cli.out_file);
    println!("Log file           : {:?}", log_path);
    Ok(())
}
