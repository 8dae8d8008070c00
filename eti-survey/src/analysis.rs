//! Summary statistics over collected observations.
//!
//! Undefined elasticities stay visible as a count rather than silently
//! shrinking the sample. Statistics are computed in `f64`; exact decimal
//! arithmetic matters for the tax math upstream, not for describing a
//! distribution of estimates.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::pknf::LabObservation;

/// Distribution summary of a sequence of elasticity estimates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Total observations, defined or not.
    pub n: usize,
    /// Observations whose elasticity was undefined.
    pub undefined: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation; `None` with fewer than two defined values.
    pub std_dev: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Summarizes implied elasticities, counting undefined ones separately.
pub fn summarize_eti<I>(values: I) -> SummaryStats
where
    I: IntoIterator<Item = Option<Decimal>>,
{
    let mut defined: Vec<f64> = Vec::new();
    let mut undefined = 0usize;

    for value in values {
        match value.and_then(|v| v.to_f64()) {
            Some(v) => defined.push(v),
            None => undefined += 1,
        }
    }

    let n = defined.len() + undefined;
    if defined.is_empty() {
        return SummaryStats {
            n,
            undefined,
            mean: None,
            std_dev: None,
            min: None,
            max: None,
        };
    }

    let count = defined.len() as f64;
    let mean = defined.iter().sum::<f64>() / count;
    let std_dev = if defined.len() >= 2 {
        let variance =
            defined.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1.0);
        Some(variance.sqrt())
    } else {
        None
    };

    SummaryStats {
        n,
        undefined,
        mean: Some(mean),
        std_dev,
        min: defined.iter().copied().reduce(f64::min),
        max: defined.iter().copied().reduce(f64::max),
    }
}

/// Mean implied elasticity keyed by an arbitrary grouping value; undefined
/// observations are skipped per group.
pub fn mean_eti_by_group<K, I>(pairs: I) -> BTreeMap<K, f64>
where
    K: Ord,
    I: IntoIterator<Item = (K, Option<Decimal>)>,
{
    let mut sums: BTreeMap<K, (f64, usize)> = BTreeMap::new();

    for (key, value) in pairs {
        let Some(v) = value.and_then(|v| v.to_f64()) else {
            continue;
        };
        let entry = sums.entry(key).or_insert((0.0, 0));
        entry.0 += v;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect()
}

/// Share of rounds bunched exactly at the schedule threshold, before and
/// after the reform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BunchingSummary {
    /// Share of pre-reform rounds with income exactly at the threshold,
    /// `None` when no pre-reform round had a parseable decision.
    pub pre_reform_share: Option<f64>,
    pub post_reform_share: Option<f64>,
}

/// The headline diagnostic of the lab design: how often subjects choose an
/// income exactly at the notch threshold. Rounds without a parsed decision
/// are excluded from the denominator.
pub fn bunching_rate(observations: &[LabObservation], threshold: Decimal) -> BunchingSummary {
    let share = |post: bool| {
        let mut total = 0usize;
        let mut bunched = 0usize;
        for row in observations {
            if row.post_reform != post {
                continue;
            }
            let Some(income) = row.income else {
                continue;
            };
            total += 1;
            if income == threshold {
                bunched += 1;
            }
        }
        (total > 0).then(|| bunched as f64 / total as f64)
    };

    BunchingSummary {
        pre_reform_share: share(false),
        post_reform_share: share(true),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn lab_row(post_reform: bool, income: Option<Decimal>) -> LabObservation {
        LabObservation {
            timestamp: Utc::now(),
            treatment: "Prog,Prog".to_string(),
            subject_id: 0,
            round: if post_reform { 9 } else { 1 },
            regime: "progressive".to_string(),
            post_reform,
            labor_endowment: 20,
            raw_response: String::new(),
            labor_supply: income.map(|_| 20),
            income,
            tax: None,
            after_tax_income: None,
        }
    }

    // =========================================================================
    // summarize_eti tests
    // =========================================================================

    #[test]
    fn summarize_counts_undefined_separately() {
        let stats = summarize_eti(vec![Some(dec!(0.4)), None, Some(dec!(0.8)), None]);

        assert_eq!(stats.n, 4);
        assert_eq!(stats.undefined, 2);
        assert!((stats.mean.unwrap() - 0.6).abs() < 1e-12);
        assert_eq!(stats.min, Some(0.4));
        assert_eq!(stats.max, Some(0.8));
    }

    #[test]
    fn summarize_of_nothing_is_all_empty() {
        let stats = summarize_eti(Vec::<Option<Decimal>>::new());

        assert_eq!(stats.n, 0);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.std_dev, None);
    }

    #[test]
    fn single_value_has_no_std_dev() {
        let stats = summarize_eti(vec![Some(dec!(0.5))]);

        assert_eq!(stats.mean, Some(0.5));
        assert_eq!(stats.std_dev, None);
    }

    #[test]
    fn std_dev_is_the_sample_deviation() {
        let stats = summarize_eti(vec![Some(dec!(0.2)), Some(dec!(0.4)), Some(dec!(0.6))]);

        // Sample variance of [0.2, 0.4, 0.6] is 0.04.
        let std_dev = stats.std_dev.unwrap();
        assert!((std_dev - 0.2).abs() < 1e-12);
    }

    // =========================================================================
    // mean_eti_by_group tests
    // =========================================================================

    #[test]
    fn group_means_skip_undefined_rows() {
        let pairs = vec![
            ("increase", Some(dec!(0.4))),
            ("increase", Some(dec!(0.8))),
            ("increase", None),
            ("decrease", Some(dec!(0.2))),
        ];

        let means = mean_eti_by_group(pairs);

        assert!((means["increase"] - 0.6).abs() < 1e-12);
        assert!((means["decrease"] - 0.2).abs() < 1e-12);
    }

    #[test]
    fn groups_with_only_undefined_rows_are_absent() {
        let pairs = vec![("a", None), ("b", Some(dec!(1.0)))];

        let means = mean_eti_by_group(pairs);

        assert_eq!(means.len(), 1);
        assert!(means.contains_key("b"));
    }

    // =========================================================================
    // bunching_rate tests
    // =========================================================================

    #[test]
    fn bunching_shares_split_pre_and_post_reform() {
        let rows = vec![
            lab_row(false, Some(dec!(400))),
            lab_row(false, Some(dec!(400))),
            lab_row(false, Some(dec!(280))),
            lab_row(false, None),
            lab_row(true, Some(dec!(400))),
            lab_row(true, Some(dec!(480))),
        ];

        let summary = bunching_rate(&rows, dec!(400));

        // Pre: 2 of 3 parsed rounds at the threshold; the unparsed round is
        // excluded from the denominator.
        assert_eq!(summary.pre_reform_share, Some(2.0 / 3.0));
        assert_eq!(summary.post_reform_share, Some(0.5));
    }

    #[test]
    fn empty_sides_report_none() {
        let rows = vec![lab_row(false, Some(dec!(400)))];

        let summary = bunching_rate(&rows, dec!(400));

        assert_eq!(summary.pre_reform_share, Some(1.0));
        assert_eq!(summary.post_reform_share, None);
    }
}
