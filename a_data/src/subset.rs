use anyhow::{bail, Context, Result};
use log::{info, warn};
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};
use std::{
    collections::HashMap,
    env, fs,
    path::{Path, PathBuf},
};

use crate::{truthy, value_text};

/// Question types kept in the subset, in output order.
pub const ALLOWED_QT: [&str; 2] = ["ads", "aes"];
/// Accepted grades, in output order.
pub const ALLOWED_ANS: [&str; 5] = ["Poor", "Bad", "Fair", "Good", "Excellent"];

/// Reads the QA JSON, which must be an array of items.
pub fn load_items(path: &Path) -> Result<Vec<Value>> {
    if !path.is_file() {
        bail!("JSON not found: {}", path.display());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    match serde_json::from_str::<Value>(&raw)
        .with_context(|| format!("parsing {}", path.display()))?
    {
        Value::Array(items) => Ok(items),
        _ => bail!("Input JSON should be a list of QA items."),
    }
}

/// First of `keys` present in `item`, tolerating alternate spellings.
pub fn get_key<'a>(item: &'a JsonMap<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| item.get(*k))
}

/// Finds a readable image for `fp`: as given, then relative to the QA JSON's
/// directory, then relative to the working directory.
pub fn resolve_image_path(fp: &str, json_path: &Path) -> Option<PathBuf> {
    if fp.is_empty() {
        return None;
    }
    let given = PathBuf::from(fp);
    if given.is_file() {
        return Some(given);
    }
    let candidates = [
        json_path.parent().map(|dir| dir.join(fp)),
        env::current_dir().ok().map(|cwd| cwd.join(fp)),
    ];
    candidates
        .into_iter()
        .flatten()
        .find(|p| p.is_file())
        .map(|p| p.canonicalize().unwrap_or(p))
}

/// `<dir>/<tag><ext>`, or `<dir>/<tag>_<n><ext>` for the first free `n`.
pub fn destination_path(dir: &Path, tag: &str, ext: &str) -> PathBuf {
    let mut dst = dir.join(format!("{tag}{ext}"));
    let mut n = 1;
    while dst.exists() {
        dst = dir.join(format!("{tag}_{n}{ext}"));
        n += 1;
    }
    dst
}

/// One record of the subset JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsetRecord {
    pub id: Value,
    pub image_id: Value,
    pub question: Value,
    pub answer: String,
    pub question_type: String,
    /// absolute path of the copied image
    pub file_path: String,
}

#[derive(Debug, Clone)]
pub struct Candidate {
    pub item: JsonMap<String, Value>,
    pub src: PathBuf,
}

pub type BucketKey = (String, String);

/// Items that passed the filters, bucketed by (question_type, answer).
#[derive(Debug, Default)]
pub struct Buckets {
    pub buckets: HashMap<BucketKey, Vec<Candidate>>,
    pub skipped_qt: usize,
    pub skipped_ans: usize,
    pub missing_img: usize,
}

pub fn bucket_items(data: Vec<Value>, json_path: &Path) -> Buckets {
    let mut out = Buckets::default();
    for value in data {
        let item = match value {
            Value::Object(map) => map,
            other => {
                warn!("skipping non-object item {other}");
                out.skipped_qt += 1;
                continue;
            }
        };

        let qt = get_key(&item, &["question_type", "quetion_type"])
            .map(value_text)
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        if !ALLOWED_QT.contains(&qt.as_str()) {
            out.skipped_qt += 1;
            continue;
        }

        let ans = match get_key(&item, &["answer"]) {
            Some(Value::String(s)) if ALLOWED_ANS.contains(&s.as_str()) => s.clone(),
            _ => {
                out.skipped_ans += 1;
                continue;
            }
        };

        let src = get_key(&item, &["file_path"])
            .and_then(Value::as_str)
            .and_then(|fp| resolve_image_path(fp, json_path));
        let Some(src) = src else {
            out.missing_img += 1;
            continue;
        };

        out.buckets
            .entry((qt, ans))
            .or_default()
            .push(Candidate { item, src });
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct BucketReport {
    pub question_type: String,
    pub answer: String,
    pub chosen: usize,
    pub available: usize,
    pub dir: PathBuf,
}

#[derive(Debug, Default)]
pub struct SubsetReport {
    pub records: Vec<SubsetRecord>,
    pub buckets: Vec<BucketReport>,
    pub skipped_qt: usize,
    pub skipped_ans: usize,
    pub missing_img: usize,
    pub copy_fail: usize,
}

/// Filters and buckets `data`, then copies the sampled images.
pub fn build_subset<R: Rng>(
    data: Vec<Value>,
    json_path: &Path,
    out_root: &Path,
    per_class: usize,
    rng: &mut R,
) -> Result<SubsetReport> {
    copy_buckets(bucket_items(data, json_path), out_root, per_class, rng)
}

/// Shuffles each bucket, keeps at most `per_class` items and copies their
/// images to `<out_root>/<qt>/<answer>/`. Failed copies are counted, not fatal.
pub fn copy_buckets<R: Rng>(
    buckets: Buckets,
    out_root: &Path,
    per_class: usize,
    rng: &mut R,
) -> Result<SubsetReport> {
    let Buckets {
        mut buckets,
        skipped_qt,
        skipped_ans,
        missing_img,
    } = buckets;

    fs::create_dir_all(out_root)
        .with_context(|| format!("creating {}", out_root.display()))?;
    let out_root = out_root.canonicalize()?;

    let mut report = SubsetReport {
        skipped_qt,
        skipped_ans,
        missing_img,
        ..SubsetReport::default()
    };

    for qt in ALLOWED_QT {
        for ans in ALLOWED_ANS {
            let key = (qt.to_string(), ans.to_string());
            let mut pairs = buckets.remove(&key).unwrap_or_default();
            if pairs.is_empty() {
                warn!("no items for ({qt}, {ans})");
                continue;
            }

            pairs.shuffle(rng);
            let available = pairs.len();
            pairs.truncate(per_class);

            let dst_dir = out_root.join(qt).join(ans);
            fs::create_dir_all(&dst_dir)
                .with_context(|| format!("creating {}", dst_dir.display()))?;

            for Candidate { item, src } in &pairs {
                let name_tag = ["image_id", "id"]
                    .iter()
                    .filter_map(|k| item.get(*k))
                    .find(|v| truthy(v))
                    .map(value_text)
                    .unwrap_or_else(|| {
                        src.file_stem()
                            .map(|s| s.to_string_lossy().into_owned())
                            .unwrap_or_default()
                    });
                let ext = src
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy()))
                    .unwrap_or_default();
                let dst = destination_path(&dst_dir, &name_tag, &ext);

                if let Err(e) = fs::copy(src, &dst) {
                    warn!("copy {} -> {} failed: {e}", src.display(), dst.display());
                    report.copy_fail += 1;
                    continue;
                }

                report.records.push(SubsetRecord {
                    id: item.get("id").cloned().unwrap_or(Value::Null),
                    image_id: item.get("image_id").cloned().unwrap_or(Value::Null),
                    question: get_key(item, &["question", "quetion"])
                        .cloned()
                        .unwrap_or(Value::Null),
                    answer: ans.to_string(),
                    question_type: qt.to_string(),
                    file_path: dst.to_string_lossy().into_owned(),
                });
            }

            info!(
                "({qt}, {ans}) chose {} / available {} -> {}",
                pairs.len(),
                available,
                dst_dir.display()
            );
            report.buckets.push(BucketReport {
                question_type: qt.to_string(),
                answer: ans.to_string(),
                chosen: pairs.len(),
                available,
                dir: dst_dir,
            });
        }
    }
    Ok(report)
}
