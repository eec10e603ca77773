use std::collections::BTreeMap;

use crate::{records::ScoredRollout, reward::RewardBreakdown};

/// Running min / max / mean of one reward component.
#[derive(Clone, Debug)]
pub struct ComponentAgg {
    pub min: f64,
    pub max: f64,
    sum: f64,
    count: u64,
}

impl Default for ComponentAgg {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
            count: 0,
        }
    }
}

impl ComponentAgg {
    pub fn update(&mut self, v: f64) {
        self.min = self.min.min(v);
        self.max = self.max.max(v);
        self.sum += v;
        self.count += 1;
    }

    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Aggregates over a group of scored rollouts.
#[derive(Clone, Debug, Default)]
pub struct RewardStats {
    pub count: usize,
    pub format: ComponentAgg,
    pub accuracy: ComponentAgg,
    pub non_repeat: ComponentAgg,
    pub total: ComponentAgg,
    /// rollouts with a full format reward
    pub well_formed: usize,
    /// rollouts with positive accuracy
    pub rewarded: usize,
}

impl RewardStats {
    pub fn update(&mut self, r: &RewardBreakdown) {
        self.count += 1;
        self.format.update(r.format);
        self.accuracy.update(r.accuracy);
        self.non_repeat.update(r.non_repeat);
        self.total.update(r.total);
        if r.format >= 1.0 {
            self.well_formed += 1;
        }
        if r.accuracy > 0.0 {
            self.rewarded += 1;
        }
    }

    pub fn format_rate(&self) -> f64 {
        ratio(self.well_formed, self.count)
    }

    pub fn hit_rate(&self) -> f64 {
        ratio(self.rewarded, self.count)
    }
}

fn ratio(n: usize, d: usize) -> f64 {
    if d == 0 {
        0.0
    } else {
        n as f64 / d as f64
    }
}

/// Stats keyed by answer type, plus an "all" row.
pub fn by_answer_type<'a, I>(rows: I) -> BTreeMap<String, RewardStats>
where
    I: IntoIterator<Item = &'a ScoredRollout>,
{
    let mut out: BTreeMap<String, RewardStats> = BTreeMap::new();
    for row in rows {
        out.entry(row.answer_type.clone()).or_default().update(&row.reward);
        out.entry("all".to_string()).or_default().update(&row.reward);
    }
    out
}

pub fn print_report(stats: &BTreeMap<String, RewardStats>) {
    println!(
        "{:<14} {:>7} {:>8} {:>9} {:>10} {:>8} {:>8} {:>8} {:>8} {:>8}",
        "answer_type",
        "count",
        "format",
        "accuracy",
        "non_repeat",
        "total",
        "min",
        "max",
        "fmt_ok%",
        "hit%"
    );
    println!(
        "{:-<14} {:->7} {:->8} {:->9} {:->10} {:->8} {:->8} {:->8} {:->8} {:->8}",
        "", "", "", "", "", "", "", "", "", ""
    );
    for (name, s) in stats {
        println!(
            "{:<14} {:>7} {:>8.3} {:>9.5} {:>10.3} {:>8.4} {:>8.4} {:>8.4} {:>7.1}% {:>7.1}%",
            name,
            s.count,
            s.format.avg(),
            s.accuracy.avg(),
            s.non_repeat.avg(),
            s.total.avg(),
            s.total.min,
            s.total.max,
            s.format_rate() * 100.0,
            s.hit_rate() * 100.0
        );
    }
}
