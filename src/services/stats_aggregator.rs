use crate::models::analysis_types::{round_to, AnalysisResult, Verdict};
use std::collections::{HashMap, VecDeque};

const RECENT_CAPACITY: usize = 10;

/// Running totals over every completed analysis of the session.
#[derive(Debug, Clone, Default)]
pub struct StatsAggregator {
    count: u64,
    sum_confidence: f64,
    sum_processing_time: f64,
    verdicts: HashMap<Verdict, u64>,
    recent: VecDeque<AnalysisResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub count: u64,
    pub mean_confidence_percent: f64,
    pub mean_processing_time: f64,
    /// Share of results judged full, in whole percent.
    pub full_share_percent: f64,
    pub full: u64,
    pub empty: u64,
    /// Newest first.
    pub recent: Vec<AnalysisResult>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, result: &AnalysisResult) {
        self.count += 1;
        self.sum_confidence += result.confidence();
        self.sum_processing_time += result.processing_time();
        *self.verdicts.entry(result.verdict()).or_insert(0) += 1;

        self.recent.push_front(result.clone());
        self.recent.truncate(RECENT_CAPACITY);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn verdict_count(&self, verdict: Verdict) -> u64 {
        self.verdicts.get(&verdict).copied().unwrap_or(0)
    }

    /// Means over everything folded so far; `None` before the first fold.
    pub fn snapshot(&self) -> Option<StatsSnapshot> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        let full = self.verdict_count(Verdict::Full);

        Some(StatsSnapshot {
            count: self.count,
            mean_confidence_percent: round_to(self.sum_confidence / n * 100.0, 1),
            mean_processing_time: round_to(self.sum_processing_time / n, 2),
            full_share_percent: round_to(full as f64 / n * 100.0, 0),
            full,
            empty: self.verdict_count(Verdict::Empty),
            recent: self.recent.iter().cloned().collect(),
        })
    }
}
