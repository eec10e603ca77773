/*
cargo run --release --bin summarise_rewards -- \
    c_assess_inf/output/rollouts_val_scored.json \
    c_assess_inf/output/rollouts_val_scored_legacy.json

whole directory:
cargo run --release --bin summarise_rewards -- c_assess_inf/output
*/

use anyhow::{bail, Context, Result};
use c_assess_inf::{
    records::{read_json_or_jsonl, ScoredRollout},
    stats::{by_answer_type, print_report},
};
use clap::Parser;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Summarise score_rewards output files")]
struct Cli {
    /// Scored JSON files, or directories of them
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut files: Vec<PathBuf> = Vec::new();
    for path in &cli.paths {
        if path.is_dir() {
            files.extend(json_files(path)?);
        } else {
            files.push(path.clone());
        }
    }
    if files.is_empty() {
        bail!("no JSON files found");
    }

    let mut all: Vec<ScoredRollout> = Vec::new();
    for file in &files {
        let rows: Vec<ScoredRollout> = read_json_or_jsonl(file)?;

        println!("\n================== {} ==================", file.display());
        print_report(&by_answer_type(&rows));
        all.extend(rows);
    }

    if files.len() > 1 {
        println!("\n================== ALL FILES ({}) ==================", files.len());
        print_report(&by_answer_type(&all));
    }
    Ok(())
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Reading {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file()
            && path.extension().and_then(|s| s.to_str()) == Some("json")
        {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}
