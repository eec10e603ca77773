use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};
use std::{fmt, str::FromStr};

use crate::error::{RewardError, RewardResult};

/// Answer schemas a question can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    /// yes/no with an optional confidence
    Single,
    /// set of labels
    Multi,
    /// continuous score
    QualityScore,
    /// advertising effectiveness grade
    Ads,
    /// aesthetic quality grade
    Aes,
}

impl AnswerType {
    pub const ALL: [AnswerType; 5] = [
        AnswerType::Single,
        AnswerType::Multi,
        AnswerType::QualityScore,
        AnswerType::Ads,
        AnswerType::Aes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AnswerType::Single => "single",
            AnswerType::Multi => "multi",
            AnswerType::QualityScore => "quality_score",
            AnswerType::Ads => "ads",
            AnswerType::Aes => "aes",
        }
    }
}

impl fmt::Display for AnswerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerType {
    type Err = RewardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        AnswerType::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or(RewardError::UnknownAnswerType(s.to_string()))
    }
}

/// Five-way ordinal grade used by the `ads` and `aes` questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    Bad,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl Grade {
    pub const ALL: [Grade; 5] = [
        Grade::Bad,
        Grade::Poor,
        Grade::Fair,
        Grade::Good,
        Grade::Excellent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Bad => "Bad",
            Grade::Poor => "Poor",
            Grade::Fair => "Fair",
            Grade::Good => "Good",
            Grade::Excellent => "Excellent",
        }
    }

    /// Canonical spelling only; callers capitalise first.
    pub fn from_label(label: &str) -> Option<Grade> {
        Grade::ALL.into_iter().find(|g| g.as_str() == label)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First character upper-cased, the rest lower-cased ("gOOD" -> "Good").
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Text form of a JSON value as the dataset writes it: strings bare, the rest as JSON.
pub fn label_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

/// Finite numeric value of a number, a numeric string, or a bool.
/// "nan" and "inf" strings are rejected.
pub fn as_number(v: &Value, field: &'static str) -> RewardResult<f64> {
    let not_numeric = || RewardError::NotNumeric {
        field,
        value: v.to_string(),
    };
    let n = match v {
        Value::Number(n) => n.as_f64().ok_or_else(not_numeric)?,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| not_numeric())?,
        Value::Bool(b) => if *b { 1.0 } else { 0.0 },
        _ => return Err(not_numeric()),
    };
    if n.is_finite() {
        Ok(n)
    } else {
        Err(not_numeric())
    }
}

/// Ground-truth record: `{"answer_type": ..., "answer": ...}`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroundTruth {
    pub answer_type: AnswerType,
    pub answer: Value,
}

impl GroundTruth {
    pub fn parse(raw: &str) -> RewardResult<Self> {
        let value: Value = serde_json::from_str(raw).map_err(RewardError::GroundTruthJson)?;
        let obj = value.as_object().ok_or(RewardError::GroundTruthShape)?;
        let answer_type = match obj.get("answer_type") {
            Some(Value::String(s)) => s.parse()?,
            Some(other) => {
                return Err(RewardError::FieldType {
                    field: "answer_type",
                    value: other.to_string(),
                })
            }
            None => return Err(RewardError::MissingAnswerType),
        };
        Ok(Self {
            answer_type,
            answer: obj.get("answer").cloned().unwrap_or(Value::Null),
        })
    }
}

/// First entry of the model's answer list.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    fields: JsonMap<String, Value>,
}

impl Prediction {
    /// Parses the inner text of an `<answer>` block.
    pub fn parse(block: &str) -> RewardResult<Self> {
        let value: Value = serde_json::from_str(block).map_err(RewardError::AnswerJson)?;
        let first = match value {
            Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
            _ => return Err(RewardError::EmptyAnswerList),
        };
        match first {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(RewardError::AnswerShape),
        }
    }

    pub fn answer(&self) -> Option<&Value> {
        self.fields.get("answer")
    }

    /// `None` for an absent or null confidence.
    pub fn confidence(&self) -> Option<&Value> {
        self.fields.get("confidence").filter(|v| !v.is_null())
    }

    /// Lower-cased `answer_type`, empty when the model left it out.
    pub fn answer_type(&self) -> RewardResult<String> {
        match self.fields.get("answer_type") {
            None => Ok(String::new()),
            Some(Value::String(s)) => Ok(s.to_lowercase()),
            Some(other) => Err(RewardError::FieldType {
                field: "answer_type",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn answer_type_is_case_insensitive() {
        assert_eq!("ADS".parse::<AnswerType>().unwrap(), AnswerType::Ads);
        assert_eq!("Quality_Score".parse::<AnswerType>().unwrap(), AnswerType::QualityScore);
        assert!(matches!(
            "ranking".parse::<AnswerType>(),
            Err(RewardError::UnknownAnswerType(_))
        ));
    }

    #[test]
    fn capitalize_matches_label_normalisation() {
        assert_eq!(capitalize("excellent"), "Excellent");
        assert_eq!(capitalize("gOOD"), "Good");
        assert_eq!(capitalize(""), "");
        assert_eq!(Grade::from_label(&capitalize("FAIR")), Some(Grade::Fair));
        assert_eq!(Grade::from_label("fair"), None);
    }

    #[test]
    fn label_text_keeps_strings_bare() {
        assert_eq!(label_text(&json!("Yes")), "Yes");
        assert_eq!(label_text(&json!(78)), "78");
        assert_eq!(label_text(&json!(true)), "True");
    }

    #[test]
    fn as_number_accepts_numeric_strings() {
        assert_eq!(as_number(&json!(" 65.5 "), "answer").unwrap(), 65.5);
        assert_eq!(as_number(&json!(78), "answer").unwrap(), 78.0);
        assert!(as_number(&json!("high"), "answer").is_err());
        assert!(as_number(&json!([1]), "answer").is_err());
    }

    #[test]
    fn as_number_rejects_non_finite_strings() {
        for raw in ["nan", "NaN", "inf", "-inf", "infinity"] {
            assert!(matches!(
                as_number(&json!(raw), "confidence"),
                Err(RewardError::NotNumeric { field: "confidence", .. })
            ));
        }
    }

    #[test]
    fn ground_truth_requires_object_with_type() {
        let gt = GroundTruth::parse(r#"{"answer_type":"AES","answer":"Good"}"#).unwrap();
        assert_eq!(gt.answer_type, AnswerType::Aes);
        assert_eq!(gt.answer, json!("Good"));

        assert!(matches!(GroundTruth::parse("[]"), Err(RewardError::GroundTruthShape)));
        assert!(matches!(
            GroundTruth::parse(r#"{"answer":"Good"}"#),
            Err(RewardError::MissingAnswerType)
        ));
        assert!(matches!(
            GroundTruth::parse("not json"),
            Err(RewardError::GroundTruthJson(_))
        ));
    }

    #[test]
    fn prediction_takes_first_object() {
        let p = Prediction::parse(r#"[{"answer":"Poor","confidence":null,"answer_type":"Aes"},{"answer":"Good"}]"#)
            .unwrap();
        assert_eq!(p.answer(), Some(&json!("Poor")));
        assert_eq!(p.confidence(), None);
        assert_eq!(p.answer_type().unwrap(), "aes");

        assert!(matches!(Prediction::parse("[]"), Err(RewardError::EmptyAnswerList)));
        assert!(matches!(Prediction::parse(r#"{"answer":1}"#), Err(RewardError::EmptyAnswerList)));
        assert!(matches!(Prediction::parse(r#"["Good"]"#), Err(RewardError::AnswerShape)));
    }
}
