use serde::{Deserialize, Serialize};

use crate::{
    accuracy::accuracy_reward, config::RewardConfig, format::format_reward,
    repeat::non_repeat_reward,
};

/// The three sub-rewards of one rollout and their sum.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RewardBreakdown {
    pub format: f64,
    pub accuracy: f64,
    pub non_repeat: f64,
    pub total: f64,
}

impl RewardBreakdown {
    pub fn compute(predict: &str, ground_truth: &str, cfg: &RewardConfig) -> Self {
        let format = format_reward(predict);
        let accuracy = accuracy_reward(predict, ground_truth, cfg);
        let non_repeat = non_repeat_reward(predict, cfg.repeat_limit);
        Self {
            format,
            accuracy,
            non_repeat,
            total: format + accuracy + non_repeat,
        }
    }
}

/// Scalar training signal: format + accuracy + non-repeat.
pub fn compute_score(predict: &str, ground_truth: &str, cfg: &RewardConfig) -> f64 {
    RewardBreakdown::compute(predict, ground_truth, cfg).total
}
