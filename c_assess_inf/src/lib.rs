//! Reward scoring for the ad-image quality judge.
//!
//! A rollout is scored as `format + accuracy + non_repeat`:
//! - `format` checks the strict `<think>…</think><answer>…</answer>` layout,
//! - `accuracy` validates the answer block against the ground-truth answer type,
//! - `non_repeat` zeroes out degenerate, looping generations.

pub mod accuracy;
pub mod answer;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod prompt;
pub mod records;
pub mod repeat;
pub mod reward;
pub mod stats;

pub use accuracy::accuracy_reward;
pub use config::{Profile, RewardConfig};
pub use error::{RewardError, RewardResult};
pub use format::format_reward;
pub use repeat::non_repeat_reward;
pub use reward::{compute_score, RewardBreakdown};
