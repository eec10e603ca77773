use std::collections::HashSet;

/// 0.0 once `limit` sentences (split on '.') have already appeared earlier in
/// the prediction, 1.0 otherwise.
pub fn non_repeat_reward(predict: &str, limit: usize) -> f64 {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut repeats = 0usize;
    for sentence in predict.split('.').map(str::trim).filter(|s| !s.is_empty()) {
        if !seen.insert(sentence) {
            repeats += 1;
            if repeats >= limit {
                return 0.0;
            }
        }
    }
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_sentences_pass() {
        assert_eq!(non_repeat_reward("The logo is clear. The slogan is short.", 2), 1.0);
        assert_eq!(non_repeat_reward("", 2), 1.0);
    }

    #[test]
    fn one_repeat_is_tolerated() {
        assert_eq!(non_repeat_reward("Nice ad. Nice ad. Good colors.", 2), 1.0);
    }

    #[test]
    fn second_repeat_zeroes_reward() {
        assert_eq!(non_repeat_reward("Nice ad. Nice ad.   Nice ad.", 2), 0.0);
        assert_eq!(non_repeat_reward("A. B. A. B.", 2), 0.0);
    }

    #[test]
    fn comparison_is_after_trimming() {
        assert_eq!(non_repeat_reward("Blurry.  Blurry .\nBlurry", 2), 0.0);
    }
}
