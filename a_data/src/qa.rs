use anyhow::{Context, Result};
use log::{info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fs, path::Path};

pub const AES_QUESTIONS: [&str; 8] = [
    "What is the overall aesthetic quality of this advertisement image?",
    "How visually appealing does this advertisement look?",
    "What is your evaluation of the ad’s artistic quality?",
    "How attractive is the color composition and visual balance of this ad?",
    "How professional does the visual quality of the ad appear?",
    "What is the level of creativity and artistic design in this advertisement?",
    "How would you rate the visual clarity and sharpness of this ad?",
    "What is the overall impression of this ad’s visual aesthetics?",
];

pub const ADS_QUESTIONS: [&str; 8] = [
    "What is the overall advertising effectiveness of this image?",
    "How clear is the promotional purpose of this advertisement?",
    "What is your evaluation of the ad’s core message delivery?",
    "How effective are the textual and visual elements in conveying the brand?",
    "What is the clarity level of the product’s key selling point in this ad?",
    "How well does this advertisement connect with its intended audience?",
    "What is the degree of relevance between the ad’s visuals and the product/service?",
    "How would you rate the overall persuasiveness of this advertisement?",
];

/// One annotated image as produced by the labelling step.
#[derive(Debug, Clone, Deserialize)]
pub struct Annotation {
    pub id: Value,
    pub image_id: Value,
    pub file_path: String,
    pub aes_score: Value,
    pub ads_score: Value,
}

/// A single question about an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaItem {
    pub id: Value,
    pub image_id: Value,
    pub file_path: String,
    pub question: String,
    pub answer: Value,
    pub question_type: String,
}

fn pick<'a, R: Rng>(templates: &[&'a str], rng: &mut R) -> &'a str {
    templates[rng.gen_range(0..templates.len())]
}

/// The aes and the ads question for one annotation, in that order.
pub fn items_for<R: Rng>(ann: &Annotation, rng: &mut R) -> [QaItem; 2] {
    let item = |question: &str, answer: &Value, question_type: &str| QaItem {
        id: ann.id.clone(),
        image_id: ann.image_id.clone(),
        file_path: ann.file_path.clone(),
        question: question.to_string(),
        answer: answer.clone(),
        question_type: question_type.to_string(),
    };
    let aes = pick(&AES_QUESTIONS, rng);
    let ads = pick(&ADS_QUESTIONS, rng);
    [item(aes, &ann.aes_score, "aes"), item(ads, &ann.ads_score, "ads")]
}

#[derive(Debug, Default)]
pub struct QaBuild {
    pub items: Vec<QaItem>,
    pub files_read: usize,
    pub files_skipped: usize,
}

/// Builds QA items from every `*.json` annotation in `dir`, in file-name order.
/// Files that do not parse as an annotation are logged and skipped.
pub fn build_qa_from_dir<R: Rng>(dir: &Path, rng: &mut R) -> Result<QaBuild> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Reading {}", dir.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut out = QaBuild::default();
    for path in paths {
        let parsed = fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|raw| serde_json::from_str::<Annotation>(&raw).map_err(Into::into));
        match parsed {
            Ok(ann) => {
                out.items.extend(items_for(&ann, rng));
                out.files_read += 1;
            }
            Err(e) => {
                warn!("skipping {}: {e}", path.display());
                out.files_skipped += 1;
            }
        }
    }
    info!(
        "built {} QA items from {} annotations ({} skipped)",
        out.items.len(),
        out.files_read,
        out.files_skipped
    );
    Ok(out)
}
