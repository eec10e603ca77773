use log::debug;
use serde_json::Value;
use std::collections::HashSet;

use crate::{
    answer::{as_number, capitalize, label_text, AnswerType, Grade, GroundTruth, Prediction},
    config::{GradeWeights, RewardConfig},
    error::{RewardError, RewardResult},
    format::extract_answer,
};

// keeps the ratios finite on empty sets
const EPS: f64 = 1e-6;

/// Weighted task accuracy of a prediction. Anything that fails validation scores 0.
pub fn accuracy_reward(predict: &str, ground_truth: &str, cfg: &RewardConfig) -> f64 {
    match try_accuracy_reward(predict, ground_truth, cfg) {
        Ok(reward) => reward,
        Err(e) => {
            debug!("accuracy 0: {e}");
            0.0
        }
    }
}

/// Same as [`accuracy_reward`] but reports why a rollout scored nothing.
pub fn try_accuracy_reward(
    predict: &str,
    ground_truth: &str,
    cfg: &RewardConfig,
) -> RewardResult<f64> {
    let truth = GroundTruth::parse(ground_truth)?;
    let block = extract_answer(predict).ok_or(RewardError::MissingAnswerBlock)?;
    let pred = Prediction::parse(block)?;

    if cfg.require_answer_type_match {
        let predicted = pred.answer_type()?;
        if predicted != truth.answer_type.as_str() {
            return Err(RewardError::AnswerTypeMismatch {
                predicted,
                expected: truth.answer_type,
            });
        }
    }

    let raw = match truth.answer_type {
        AnswerType::Single => single_accuracy(&truth.answer, &pred)?,
        AnswerType::Multi => multi_accuracy(&truth.answer, &pred, cfg.multi_beta)?,
        AnswerType::QualityScore => quality_accuracy(&truth.answer, &pred, cfg.quality_sigma)?,
        AnswerType::Ads => grade_accuracy(&truth.answer, &pred, &cfg.ads_weights),
        AnswerType::Aes => grade_accuracy(&truth.answer, &pred, &cfg.aes_weights),
    };
    Ok(raw * cfg.task_weights.get(truth.answer_type))
}

/// `1 - 2|p - y|`, where `p` is the stated confidence that the answer is "yes".
/// Without a confidence the predicted answer itself counts as 0 or 1.
pub fn single_accuracy(truth: &Value, pred: &Prediction) -> RewardResult<f64> {
    let y = if label_text(truth).to_lowercase() == "yes" { 1.0 } else { 0.0 };
    let p = match pred.confidence() {
        Some(c) => as_number(c, "confidence")?,
        None => {
            let said = pred.answer().map(label_text).unwrap_or_default();
            if said.to_lowercase() == "yes" {
                1.0
            } else {
                0.0
            }
        }
    };
    Ok(1.0 - 2.0 * (p - y).abs())
}

/// Blend of F-beta and Jaccard over case-folded label sets.
/// A bare string answer is one label, not a set of its characters.
pub fn multi_accuracy(truth: &Value, pred: &Prediction, beta: f64) -> RewardResult<f64> {
    let gold = label_set(Some(truth), "answer")?;
    let guess = label_set(pred.answer(), "answer")?;

    let tp = gold.intersection(&guess).count() as f64;
    let fp = guess.difference(&gold).count() as f64;
    let fn_ = gold.difference(&guess).count() as f64;
    if tp + fp + fn_ == 0.0 {
        return Ok(1.0);
    }

    let precision = tp / (tp + fp + EPS);
    let recall = tp / (tp + fn_ + EPS);
    let b2 = beta * beta;
    let f_beta = (1.0 + b2) * precision * recall / (b2 * precision + recall + EPS);
    let jaccard = tp / (tp + fp + fn_ + EPS);
    Ok(0.5 * f_beta + 0.5 * jaccard)
}

/// Gaussian kernel around the true score. A missing prediction counts as 0.
pub fn quality_accuracy(truth: &Value, pred: &Prediction, sigma: f64) -> RewardResult<f64> {
    let s = as_number(truth, "answer")?;
    let s_hat = match pred.answer() {
        Some(v) => as_number(v, "answer")?,
        None => 0.0,
    };
    Ok((-(s - s_hat).powi(2) / (2.0 * sigma * sigma)).exp())
}

/// Class weight of the true grade on an exact (capitalised) match, else 0.
pub fn grade_accuracy(truth: &Value, pred: &Prediction, weights: &GradeWeights) -> f64 {
    let guess = capitalize(&pred.answer().map(label_text).unwrap_or_default());
    let truth = capitalize(&label_text(truth));
    if guess != truth {
        return 0.0;
    }
    Grade::from_label(&truth).map_or(0.0, |g| weights.get(g))
}

fn label_set(v: Option<&Value>, field: &'static str) -> RewardResult<HashSet<String>> {
    match v {
        None => Ok(HashSet::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.to_lowercase()),
                other => Err(RewardError::FieldType {
                    field,
                    value: other.to_string(),
                }),
            })
            .collect(),
        // a lone label is a one-element set
        Some(Value::String(s)) => Ok(HashSet::from([s.to_lowercase()])),
        Some(other) => Err(RewardError::FieldType {
            field,
            value: other.to_string(),
        }),
    }
}
