use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{borrow::Cow, fs, path::Path};

use crate::{answer::GroundTruth, config::RewardConfig, reward::RewardBreakdown};

/// One model rollout to score.
#[derive(Debug, Clone, Deserialize)]
pub struct Rollout {
    #[serde(default)]
    pub id: Value,
    #[serde(alias = "prediction", alias = "response")]
    pub predict: String,
    // string as written by split_dataset, or the object itself
    #[serde(alias = "solution")]
    pub ground_truth: Value,
}

impl Rollout {
    pub fn ground_truth_text(&self) -> Cow<'_, str> {
        match &self.ground_truth {
            Value::String(s) => Cow::Borrowed(s),
            other => Cow::Owned(other.to_string()),
        }
    }

    pub fn score(&self, cfg: &RewardConfig) -> ScoredRollout {
        let gt = self.ground_truth_text();
        let answer_type = GroundTruth::parse(&gt)
            .map(|t| t.answer_type.to_string())
            .unwrap_or_else(|_| "invalid".to_string());
        ScoredRollout {
            id: self.id.clone(),
            answer_type,
            reward: RewardBreakdown::compute(&self.predict, &gt, cfg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRollout {
    pub id: Value,
    pub answer_type: String,
    #[serde(flatten)]
    pub reward: RewardBreakdown,
}

/// Reads a JSON array, or JSON lines when the file does not start with '['.
pub fn read_json_or_jsonl<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    if raw.trim_start().starts_with('[') {
        return serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()));
    }
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("parsing {} line {}", path.display(), n + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_solution_string_or_object() {
        let as_string: Rollout = serde_json::from_value(json!({
            "id": "7",
            "response": "<think>ok</think><answer>[{\"answer\":\"Good\",\"answer_type\":\"ads\"}]</answer>",
            "solution": "{\"answer\": \"Good\", \"answer_type\": \"ads\"}"
        }))
        .unwrap();
        let as_object: Rollout = serde_json::from_value(json!({
            "predict": as_string.predict.clone(),
            "ground_truth": {"answer": "Good", "answer_type": "ads"}
        }))
        .unwrap();

        let cfg = RewardConfig::calibrated();
        let a = as_string.score(&cfg);
        let b = as_object.score(&cfg);
        assert_eq!(a.answer_type, "ads");
        assert_eq!(a.reward, b.reward);
        assert!((a.reward.total - 2.469).abs() < 1e-9);
        assert_eq!(b.id, Value::Null);
    }

    #[test]
    fn unparsable_ground_truth_is_labelled_invalid() {
        let r: Rollout =
            serde_json::from_value(json!({"predict": "x", "ground_truth": "oops"})).unwrap();
        let scored = r.score(&RewardConfig::default());
        assert_eq!(scored.answer_type, "invalid");
        assert_eq!(scored.reward.accuracy, 0.0);
    }

    #[test]
    fn reads_both_array_and_lines() {
        let dir = tempfile::tempdir().unwrap();
        let arr = dir.path().join("a.json");
        let lines = dir.path().join("b.jsonl");
        fs::write(&arr, r#"[{"predict":"p","ground_truth":"g"}]"#).unwrap();
        fs::write(
            &lines,
            "{\"predict\":\"p\",\"ground_truth\":\"g\"}\n\n{\"predict\":\"q\",\"ground_truth\":\"g\"}\n",
        )
        .unwrap();
        assert_eq!(read_json_or_jsonl::<Rollout>(&arr).unwrap().len(), 1);
        let rows = read_json_or_jsonl::<Rollout>(&lines).unwrap();
        assert_eq!(rows[1].predict, "q");
    }
}
