use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::answer::{AnswerType, Grade};

/// Reward paid for a correct grade, per grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GradeWeights {
    pub bad: f64,
    pub poor: f64,
    pub fair: f64,
    pub good: f64,
    pub excellent: f64,
}

impl GradeWeights {
    pub fn get(&self, grade: Grade) -> f64 {
        match grade {
            Grade::Bad => self.bad,
            Grade::Poor => self.poor,
            Grade::Fair => self.fair,
            Grade::Good => self.good,
            Grade::Excellent => self.excellent,
        }
    }
}

/// Multiplier applied to each answer type's raw accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskWeights {
    pub single: f64,
    pub multi: f64,
    pub quality_score: f64,
    pub ads: f64,
    pub aes: f64,
}

impl TaskWeights {
    pub fn get(&self, answer_type: AnswerType) -> f64 {
        match answer_type {
            AnswerType::Single => self.single,
            AnswerType::Multi => self.multi,
            AnswerType::QualityScore => self.quality_score,
            AnswerType::Ads => self.ads,
            AnswerType::Aes => self.aes,
        }
    }
}

/// Built-in weight tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    /// class-frequency grade weights, answer_type must agree with the ground truth
    Calibrated,
    /// first weight table, answer_type not checked
    Legacy,
}

impl Profile {
    pub fn config(self) -> RewardConfig {
        match self {
            Profile::Calibrated => RewardConfig::calibrated(),
            Profile::Legacy => RewardConfig::legacy(),
        }
    }
}

/// Everything that shapes the scalar reward. Missing fields in a JSON file
/// fall back to the calibrated profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub task_weights: TaskWeights,
    pub aes_weights: GradeWeights,
    pub ads_weights: GradeWeights,
    /// zero accuracy unless the predicted answer_type equals the ground truth's
    pub require_answer_type_match: bool,
    /// width of the gaussian around the true quality score
    pub quality_sigma: f64,
    /// F-beta weight for multi-label answers
    pub multi_beta: f64,
    /// number of repeated sentences that zeroes the non-repeat reward
    pub repeat_limit: usize,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self::calibrated()
    }
}

impl RewardConfig {
    pub fn calibrated() -> Self {
        Self {
            task_weights: TaskWeights {
                single: 0.058,
                multi: 0.382,
                quality_score: 0.28,
                ads: 1.0,
                aes: 1.0,
            },
            aes_weights: GradeWeights {
                bad: 0.4102,
                poor: 0.02810,
                fair: 0.00614,
                good: 0.1546,
                excellent: 0.4009,
            },
            ads_weights: GradeWeights {
                bad: 0.3911,
                poor: 0.1216,
                fair: 0.0183,
                good: 0.4690,
                excellent: 1.0,
            },
            require_answer_type_match: true,
            quality_sigma: 6.0,
            multi_beta: 0.7,
            repeat_limit: 2,
        }
    }

    pub fn legacy() -> Self {
        Self {
            task_weights: TaskWeights {
                single: 0.058,
                multi: 0.382,
                quality_score: 0.28,
                ads: 0.28,
                aes: 0.28,
            },
            aes_weights: GradeWeights {
                bad: 0.13330,
                poor: 0.00911,
                fair: 0.00200,
                good: 0.03361,
                excellent: 0.08797,
            },
            ads_weights: GradeWeights {
                bad: 0.04102,
                poor: 0.01277,
                fair: 0.00192,
                good: 0.04947,
                excellent: 0.89482,
            },
            require_answer_type_match: false,
            ..Self::calibrated()
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("bad reward config {}", path.display()))
    }

    /// `--weights` file when given, otherwise the named profile.
    pub fn resolve(profile: Profile, weights: Option<&Path>) -> Result<Self> {
        match weights {
            Some(path) => Self::from_path(path),
            None => Ok(profile.config()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_differ_in_agreement_check() {
        assert!(RewardConfig::calibrated().require_answer_type_match);
        assert!(!RewardConfig::legacy().require_answer_type_match);
        assert_eq!(RewardConfig::legacy().quality_sigma, 6.0);
        assert_eq!(RewardConfig::default(), Profile::Calibrated.config());
    }

    #[test]
    fn partial_json_keeps_calibrated_defaults() {
        let cfg: RewardConfig =
            serde_json::from_str(r#"{"quality_sigma": 3.0, "require_answer_type_match": false}"#)
                .unwrap();
        assert_eq!(cfg.quality_sigma, 3.0);
        assert!(!cfg.require_answer_type_match);
        assert_eq!(cfg.ads_weights.get(Grade::Excellent), 1.0);
    }

    #[test]
    fn grade_tables_use_label_keys() {
        let cfg: RewardConfig = serde_json::from_str(
            r#"{"aes_weights": {"Bad": 1, "Poor": 2, "Fair": 3, "Good": 4, "Excellent": 5}}"#,
        )
        .unwrap();
        assert_eq!(cfg.aes_weights.get(Grade::Fair), 3.0);
        assert_eq!(cfg.ads_weights, RewardConfig::calibrated().ads_weights);
    }

    #[test]
    fn weights_file_overrides_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weights.json");
        fs::write(&path, r#"{"multi_beta": 1.0}"#).unwrap();
        let cfg = RewardConfig::resolve(Profile::Legacy, Some(&path)).unwrap();
        assert_eq!(cfg.multi_beta, 1.0);
        assert!(cfg.require_answer_type_match);

        let cfg = RewardConfig::resolve(Profile::Legacy, None).unwrap();
        assert_eq!(cfg, RewardConfig::legacy());
    }
}
