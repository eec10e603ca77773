use thiserror::Error;

use crate::answer::AnswerType;

pub type RewardResult<T> = std::result::Result<T, RewardError>;

/// Every way a rollout can fail validation. All of them score 0 accuracy.
#[derive(Debug, Error)]
pub enum RewardError {
    #[error("ground truth is not valid JSON: {0}")]
    GroundTruthJson(#[source] serde_json::Error),

    #[error("ground truth must be a JSON object")]
    GroundTruthShape,

    #[error("ground truth has no answer_type")]
    MissingAnswerType,

    #[error("unknown answer_type {0:?}")]
    UnknownAnswerType(String),

    #[error("no <answer> block in prediction")]
    MissingAnswerBlock,

    #[error("answer block is not valid JSON: {0}")]
    AnswerJson(#[source] serde_json::Error),

    #[error("answer block must be a non-empty JSON array")]
    EmptyAnswerList,

    #[error("first answer entry must be a JSON object")]
    AnswerShape,

    #[error("predicted answer_type {predicted:?} does not match {expected}")]
    AnswerTypeMismatch {
        predicted: String,
        expected: AnswerType,
    },

    #[error("field {field} has unexpected value {value}")]
    FieldType { field: &'static str, value: String },

    #[error("field {field} is not numeric: {value}")]
    NotNumeric { field: &'static str, value: String },
}
