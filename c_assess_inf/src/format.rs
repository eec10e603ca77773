use once_cell::sync::Lazy;
use regex::Regex;

// whole string: think block, optional whitespace, answer block, nothing else
static FORMAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A<think>.*?</think>\s*<answer>.*?</answer>\z").expect("format regex")
});

static ANSWER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<answer>\s*(.*?)\s*</answer>").expect("answer regex"));

/// 1.0 when the prediction is exactly one think block followed by one answer block.
pub fn format_reward(predict: &str) -> f64 {
    if FORMAT_RE.is_match(predict) {
        1.0
    } else {
        0.0
    }
}

/// Inner text of the first `<answer>` block, surrounding whitespace stripped.
pub fn extract_answer(predict: &str) -> Option<&str> {
    ANSWER_RE
        .captures(predict)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}
