use anyhow::{Context, Result};
use c_assess_inf::prompt::user_prompt;
use image::{imageops::FilterType, GenericImageView};
use indicatif::ProgressBar;
use log::{error, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::{
    fs::{self, File},
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::split::{QaItem, Split};

pub const DATA_FILE: &str = "data.jsonl";

#[derive(Debug, Clone)]
pub struct MaterializeOptions {
    pub out_dir: PathBuf,
    /// side of the square the images are resized to
    pub resize: u32,
    /// wrap each question in the judge's output-format prompt
    pub with_prompt: bool,
}

/// One line of `<split>/data.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub id: String,
    pub problem: String,
    /// ground truth for the reward: `{"answer": ..., "answer_type": ...}`
    pub solution: String,
    /// resized image, relative to the split directory
    pub image: String,
    pub img_height: u32,
    pub img_width: u32,
    pub resized_height: u32,
    pub resized_width: u32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MaterializeReport {
    pub written: usize,
    pub missing: usize,
    pub unreadable: usize,
}

pub fn solution_json(item: &QaItem) -> Result<String> {
    let solution = json!({
        "answer": item.answer,
        "answer_type": item.question_type,
    });
    Ok(serde_json::to_string(&solution)?)
}

fn id_text(id: &Value) -> String {
    match id {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn file_safe(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// Resizes the images of one split and writes `<out>/<split>/data.jsonl`
/// plus `<out>/<split>/images/`. Items whose image is missing or unreadable
/// are logged and left out.
pub fn materialize_split(
    split: Split,
    items: &[QaItem],
    opts: &MaterializeOptions,
    bar: &ProgressBar,
) -> Result<MaterializeReport> {
    let split_dir = opts.out_dir.join(split.as_str());
    let image_dir = split_dir.join("images");
    fs::create_dir_all(&image_dir)
        .with_context(|| format!("creating {}", image_dir.display()))?;
    let mut out = BufWriter::new(File::create(split_dir.join(DATA_FILE))?);

    let mut report = MaterializeReport::default();
    for (n, item) in items.iter().enumerate() {
        bar.inc(1);

        let Some(src) = item.image_location().filter(|p| Path::new(p).is_file()) else {
            error!("image not found: {:?}", item.image_location());
            report.missing += 1;
            continue;
        };
        let img = match image::open(src) {
            Ok(img) => img,
            Err(e) => {
                error!("failed to read {src}: {e}");
                report.unreadable += 1;
                continue;
            }
        };
        let (width, height) = img.dimensions();
        let resized = img.resize_exact(opts.resize, opts.resize, FilterType::Triangle);

        let id = id_text(&item.id);
        let file_name = format!("{n:06}_{}.png", file_safe(&id));
        let dest = image_dir.join(&file_name);
        resized
            .save(&dest)
            .with_context(|| format!("writing {}", dest.display()))?;

        let question = item.question_text();
        let record = TrainingRecord {
            id,
            problem: if opts.with_prompt { user_prompt(&question) } else { question },
            solution: solution_json(item)?,
            image: format!("images/{file_name}"),
            img_height: height,
            img_width: width,
            resized_height: opts.resize,
            resized_width: opts.resize,
        };
        serde_json::to_writer(&mut out, &record)?;
        out.write_all(b"\n")?;
        report.written += 1;
    }
    out.flush()?;

    info!(
        "{split}: wrote {} records to {:?} ({} missing, {} unreadable)",
        report.written, split_dir, report.missing, report.unreadable
    );
    Ok(report)
}

/// Reads back the records of one materialized split directory.
pub fn read_split(split_dir: &Path) -> Result<Vec<TrainingRecord>> {
    let path = split_dir.join(DATA_FILE);
    let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
    BufReader::new(file)
        .lines()
        .filter(|line| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
        .map(|line| -> Result<TrainingRecord> { Ok(serde_json::from_str(&line?)?) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solution_carries_answer_and_type() {
        let item: QaItem = serde_json::from_value(json!({
            "id": 3, "question": "q", "answer": "Good", "question_type": "aes"
        }))
        .unwrap();
        let sol: Value = serde_json::from_str(&solution_json(&item).unwrap()).unwrap();
        assert_eq!(sol, json!({"answer": "Good", "answer_type": "aes"}));

        let bare: QaItem = serde_json::from_value(json!({"id": 4})).unwrap();
        let sol: Value = serde_json::from_str(&solution_json(&bare).unwrap()).unwrap();
        assert_eq!(sol, json!({"answer": null, "answer_type": null}));
    }

    #[test]
    fn ids_become_safe_file_names() {
        assert_eq!(file_safe("ad/7 v2.jpg"), "ad_7_v2_jpg");
        assert_eq!(id_text(&json!(12)), "12");
        assert_eq!(id_text(&Value::Null), "");
    }
}
