use anyhow::{bail, Result};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value};
use std::{collections::HashMap, fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A QA item from the subset JSON. Unknown keys, including the misspelt
/// `quetion`, are carried through in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaItem {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub question: Value,
    #[serde(default)]
    pub answer: Value,
    #[serde(default)]
    pub question_type: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<Split>,
    #[serde(flatten)]
    pub extra: JsonMap<String, Value>,
}

fn text_or(v: &Value, default: &str) -> String {
    match v {
        Value::Null => default.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl QaItem {
    /// `question`, falling back to `quetion`; empty when neither is set.
    pub fn question_text(&self) -> String {
        let q = match &self.question {
            Value::Null => self.extra.get("quetion").unwrap_or(&Value::Null),
            q => q,
        };
        text_or(q, "")
    }

    /// First non-empty of `path`, `image_path`, `file_path`.
    pub fn image_location(&self) -> Option<&str> {
        [&self.path, &self.image_path, &self.file_path]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|p| !p.is_empty())
    }

    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            question_type: text_or(&self.question_type, "unknown"),
            answer: text_or(&self.answer, "unknown"),
        }
    }
}

/// Stratification class: question type and answer grade.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub question_type: String,
    pub answer: String,
}

/// Relative split sizes, written `train:val:test`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitRatio {
    pub train: usize,
    pub val: usize,
    pub test: usize,
}

impl Default for SplitRatio {
    fn default() -> Self {
        Self { train: 8, val: 1, test: 1 }
    }
}

impl SplitRatio {
    fn sum(&self) -> usize {
        self.train + self.val + self.test
    }
}

impl FromStr for SplitRatio {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<usize> = s
            .split(':')
            .map(|p| p.trim().parse::<usize>())
            .collect::<std::result::Result<_, _>>()?;
        let [train, val, test] = parts[..] else {
            bail!("ratio must look like 8:1:1, got {s:?}");
        };
        let ratio = Self { train, val, test };
        if ratio.sum() == 0 {
            bail!("ratio {s:?} sums to zero");
        }
        Ok(ratio)
    }
}

impl fmt::Display for SplitRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.train, self.val, self.test)
    }
}

/// Shuffles with a fresh RNG seeded by `seed`, then cuts floor-sized train
/// and val parts; the remainder is test.
pub fn split_by_ratio<T>(mut items: Vec<T>, ratio: SplitRatio, seed: u64) -> [Vec<T>; 3] {
    items.shuffle(&mut StdRng::seed_from_u64(seed));
    let n = items.len();
    let n_train = n * ratio.train / ratio.sum();
    let n_val = n * ratio.val / ratio.sum();
    let test = items.split_off(n_train + n_val);
    let val = items.split_off(n_train);
    [items, val, test]
}

/// Groups in first-seen order.
pub fn group_items(items: Vec<QaItem>) -> Vec<(GroupKey, Vec<QaItem>)> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<(GroupKey, Vec<QaItem>)> = Vec::new();
    for item in items {
        let key = item.group_key();
        match index.get(&key) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![item]));
            }
        }
    }
    groups
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitCounts {
    pub train: usize,
    pub val: usize,
    pub test: usize,
}

impl SplitCounts {
    pub fn total(&self) -> usize {
        self.train + self.val + self.test
    }

    fn add(&mut self, split: Split, n: usize) {
        match split {
            Split::Train => self.train += n,
            Split::Val => self.val += n,
            Split::Test => self.test += n,
        }
    }
}

#[derive(Debug, Default)]
pub struct SplitPlan {
    pub train: Vec<QaItem>,
    pub val: Vec<QaItem>,
    pub test: Vec<QaItem>,
    /// per group, in first-seen order
    pub counts: Vec<(GroupKey, SplitCounts)>,
}

impl SplitPlan {
    pub fn items(&self, split: Split) -> &[QaItem] {
        match split {
            Split::Train => &self.train,
            Split::Val => &self.val,
            Split::Test => &self.test,
        }
    }

    fn items_mut(&mut self, split: Split) -> &mut Vec<QaItem> {
        match split {
            Split::Train => &mut self.train,
            Split::Val => &mut self.val,
            Split::Test => &mut self.test,
        }
    }
}

/// Splits every (question_type, answer) group by `ratio`. With `debug_n`,
/// larger groups are first sampled down to `debug_n` items.
pub fn plan_splits(
    items: Vec<QaItem>,
    ratio: SplitRatio,
    seed: u64,
    debug_n: Option<usize>,
) -> SplitPlan {
    let mut plan = SplitPlan::default();
    let mut sampler = StdRng::seed_from_u64(seed);

    for (key, mut group) in group_items(items) {
        if let Some(n) = debug_n {
            if group.len() > n {
                group = group.choose_multiple(&mut sampler, n).cloned().collect();
            }
        }

        let mut counts = SplitCounts::default();
        for (split, part) in Split::ALL.into_iter().zip(split_by_ratio(group, ratio, seed)) {
            counts.add(split, part.len());
            plan.items_mut(split).extend(part.into_iter().map(|mut item| {
                item.split = Some(split);
                item
            }));
        }
        plan.counts.push((key, counts));
    }
    plan
}

pub fn print_counts(counts: &[(GroupKey, SplitCounts)]) {
    println!("\n=== train/val/test counts per question_type + answer ===");
    println!(
        "{:<14} {:<10} {:>6} {:>6} {:>6} {:>6}",
        "question_type", "answer", "train", "val", "test", "total"
    );
    for (key, c) in counts {
        println!(
            "{:<14} {:<10} {:>6} {:>6} {:>6} {:>6}",
            key.question_type,
            key.answer,
            c.train,
            c.val,
            c.test,
            c.total()
        );
    }
    println!("=========================================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: usize, qt: &str, answer: &str) -> QaItem {
        serde_json::from_value(json!({
            "id": id,
            "question": "How visually appealing does this advertisement look?",
            "answer": answer,
            "question_type": qt,
            "file_path": format!("/data/{id}.jpg"),
        }))
        .unwrap()
    }

    #[test]
    fn ratio_parses_and_rejects_garbage() {
        assert_eq!("8:1:1".parse::<SplitRatio>().unwrap(), SplitRatio::default());
        assert_eq!(
            " 7 : 2 : 1 ".parse::<SplitRatio>().unwrap(),
            SplitRatio { train: 7, val: 2, test: 1 }
        );
        assert!("8:2".parse::<SplitRatio>().is_err());
        assert!("a:b:c".parse::<SplitRatio>().is_err());
        assert!("0:0:0".parse::<SplitRatio>().is_err());
    }

    #[test]
    fn floor_sizes_leave_remainder_in_test() {
        let [train, val, test] = split_by_ratio((0..15).collect::<Vec<_>>(), SplitRatio::default(), 2025);
        assert_eq!((train.len(), val.len(), test.len()), (12, 1, 2));

        let [train, val, test] = split_by_ratio(vec![1, 2, 3], SplitRatio::default(), 2025);
        assert_eq!((train.len(), val.len(), test.len()), (2, 0, 1));
    }

    #[test]
    fn split_is_a_reproducible_partition() {
        let a = split_by_ratio((0..100).collect::<Vec<_>>(), SplitRatio::default(), 9);
        let b = split_by_ratio((0..100).collect::<Vec<_>>(), SplitRatio::default(), 9);
        assert_eq!(a, b);

        let mut all: Vec<i32> = a.concat();
        all.sort();
        assert_eq!(all, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let groups = group_items(vec![
            item(1, "aes", "Good"),
            item(2, "ads", "Bad"),
            item(3, "aes", "Good"),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0.question_type, "aes");
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0.answer, "Bad");
    }

    #[test]
    fn missing_fields_group_as_unknown() {
        let bare: QaItem = serde_json::from_value(json!({"id": 1})).unwrap();
        let key = bare.group_key();
        assert_eq!(key.question_type, "unknown");
        assert_eq!(key.answer, "unknown");
    }

    #[test]
    fn plan_tags_and_counts_every_item() {
        let mut items: Vec<QaItem> = (0..20).map(|i| item(i, "aes", "Good")).collect();
        items.extend((20..30).map(|i| item(i, "ads", "Poor")));
        let plan = plan_splits(items, SplitRatio::default(), 2025, None);

        assert_eq!(plan.counts[0].1, SplitCounts { train: 16, val: 2, test: 2 });
        assert_eq!(plan.counts[1].1, SplitCounts { train: 8, val: 1, test: 1 });
        assert_eq!(plan.train.len(), 24);
        for split in Split::ALL {
            assert!(plan.items(split).iter().all(|i| i.split == Some(split)));
        }
    }

    #[test]
    fn debug_mode_caps_each_group() {
        let items: Vec<QaItem> = (0..50).map(|i| item(i, "aes", "Fair")).collect();
        let plan = plan_splits(items, SplitRatio::default(), 1, Some(10));
        assert_eq!(plan.counts[0].1.total(), 10);
    }

    #[test]
    fn image_location_skips_empty_fields() {
        let it: QaItem = serde_json::from_value(json!({
            "path": "", "image_path": "/img/a.png", "file_path": "/img/b.png"
        }))
        .unwrap();
        assert_eq!(it.image_location(), Some("/img/a.png"));
    }

    #[test]
    fn misspelt_question_key_is_accepted() {
        let it: QaItem =
            serde_json::from_value(json!({"quetion": "How clear is it?", "extra_field": 1})).unwrap();
        assert_eq!(it.question_text(), "How clear is it?");
        assert_eq!(it.extra.get("extra_field"), Some(&json!(1)));
    }

    #[test]
    fn both_question_spellings_prefer_the_correct_one() {
        let raw = r#"[{"question":"q","quetion":"old q","answer":"Good","question_type":"aes"}]"#;
        let items: Vec<QaItem> = serde_json::from_str(raw).unwrap();
        assert_eq!(items[0].question_text(), "q");
        assert_eq!(items[0].extra.get("quetion"), Some(&json!("old q")));
    }

    #[test]
    fn non_string_question_type_still_groups() {
        let raw = r#"[{"question":"q","answer":3,"question_type":5}]"#;
        let items: Vec<QaItem> = serde_json::from_str(raw).unwrap();
        let key = items[0].group_key();
        assert_eq!(key.question_type, "5");
        assert_eq!(key.answer, "3");
    }
}
