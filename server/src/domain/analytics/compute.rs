//! Metric computers
//!
//! Pure transforms from zero-filled aggregates to metric results. Numeric
//! edge cases resolve to fixed sentinels: a growth rate with no previous
//! value is `None`, and a ratio or average over zero is `0`.

use std::collections::HashMap;

use super::registry::{Computer, Operand};
use super::types::{
    AveragePoint, CountPoint, DistributionItem, GrowthPoint, MetricResult, RankingItem,
    RatioPoint, RawAggregate,
};
use crate::core::constants::DEFAULT_TOP_LIMIT;
use crate::data::types::RankBy;

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percent change between consecutive counts
///
/// `None` for the first entry and wherever the previous count is zero.
pub fn growth_rate(counts: &[i64]) -> Vec<Option<f64>> {
    let mut rates = Vec::with_capacity(counts.len());
    let mut prev: Option<i64> = None;
    for &count in counts {
        rates.push(match prev {
            Some(p) if p != 0 => Some((count - p) as f64 / p as f64 * 100.0),
            _ => None,
        });
        prev = Some(count);
    }
    rates
}

/// `part / whole` as a percentage rounded to 2 decimals; `0` when `whole` is `0`
pub fn ratio(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        round2(part / whole * 100.0)
    }
}

/// `sum / count` rounded to 2 decimals; `0` when `count` is `0`
pub fn average(sum: f64, count: f64) -> f64 {
    if count == 0.0 {
        0.0
    } else {
        round2(sum / count)
    }
}

/// Highest values first, ties by ascending id, truncated to `limit`
/// (default 10)
pub fn top_n(mut items: Vec<RankingItem>, limit: Option<u32>) -> Vec<RankingItem> {
    items.sort_by(|a, b| b.value.total_cmp(&a.value).then(a.id.cmp(&b.id)));
    items.truncate(limit.unwrap_or(DEFAULT_TOP_LIMIT) as usize);
    items
}

/// Share of each category in the total; all zero when the total is zero
///
/// Shares are apportioned in hundredths of a percent by largest remainder,
/// so the 2-decimal values always sum to exactly 100.
pub fn distribution(items: Vec<(String, Option<String>, i64)>) -> (i64, Vec<DistributionItem>) {
    let total: i64 = items.iter().map(|(_, _, count)| count).sum();
    let shares = apportion(&items.iter().map(|(_, _, count)| *count).collect::<Vec<_>>(), total);
    let items = items
        .into_iter()
        .zip(shares)
        .map(|((key, label, count), hundredths)| DistributionItem {
            key,
            label,
            count,
            pct: hundredths as f64 / 100.0,
        })
        .collect();
    (total, items)
}

/// Split 100.00% (10_000 hundredths) across `counts`
fn apportion(counts: &[i64], total: i64) -> Vec<i64> {
    const WHOLE: i128 = 10_000;
    if total <= 0 {
        return vec![0; counts.len()];
    }
    let total = total as i128;
    let mut shares: Vec<i64> = Vec::with_capacity(counts.len());
    let mut remainders: Vec<(i128, usize)> = Vec::with_capacity(counts.len());
    for (idx, count) in counts.iter().enumerate() {
        let scaled = (*count).max(0) as i128 * WHOLE;
        shares.push((scaled / total) as i64);
        remainders.push((scaled % total, idx));
    }

    let assigned: i64 = shares.iter().sum();
    let leftover = (WHOLE as i64 - assigned).max(0) as usize;
    // Largest remainder first, earlier keys win ties
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for &(_, idx) in remainders.iter().take(leftover) {
        shares[idx] += 1;
    }
    shares
}

fn operand(raw: &RawAggregate, op: Operand) -> f64 {
    match op {
        Operand::Count => raw.count as f64,
        Operand::Total => raw.sum.unwrap_or(0.0),
    }
}

/// Run a computer over the aggregates of one metric
pub fn compute(computer: Computer, raws: &[RawAggregate], limit: u32) -> MetricResult {
    match computer {
        Computer::CountSeries => MetricResult::CountSeries {
            points: raws
                .iter()
                .map(|r| CountPoint {
                    start: r.bucket.start,
                    end: r.bucket.end,
                    count: r.count,
                })
                .collect(),
        },
        Computer::Growth => {
            let counts: Vec<i64> = raws.iter().map(|r| r.count).collect();
            MetricResult::GrowthRateSeries {
                points: raws
                    .iter()
                    .zip(growth_rate(&counts))
                    .map(|(r, rate)| GrowthPoint {
                        start: r.bucket.start,
                        end: r.bucket.end,
                        count: r.count,
                        rate,
                    })
                    .collect(),
            }
        }
        Computer::Ratio { part, whole } => MetricResult::RatioSeries {
            points: raws
                .iter()
                .map(|r| {
                    let (part, whole) = (operand(r, part), operand(r, whole));
                    RatioPoint {
                        start: r.bucket.start,
                        end: r.bucket.end,
                        part,
                        whole,
                        ratio: ratio(part, whole).clamp(0.0, 100.0),
                    }
                })
                .collect(),
        },
        Computer::Average {
            numerator,
            denominator,
        } => MetricResult::AverageSeries {
            points: raws
                .iter()
                .map(|r| {
                    let (num, den) = (operand(r, numerator), operand(r, denominator));
                    AveragePoint {
                        start: r.bucket.start,
                        end: r.bucket.end,
                        numerator: num,
                        denominator: den,
                        average: average(num, den),
                    }
                })
                .collect(),
        },
        Computer::Ranking { by } => {
            let items = raws
                .iter()
                .filter_map(|r| {
                    let key = r.group_key.as_deref()?;
                    let Ok(id) = key.parse::<i64>() else {
                        tracing::warn!(group_key = key, "Skipping non-numeric ranking key");
                        return None;
                    };
                    let value = match by {
                        RankBy::Count => r.count as f64,
                        RankBy::Total => r.sum.unwrap_or(0.0),
                    };
                    Some(RankingItem {
                        id,
                        label: r.label.clone(),
                        value,
                    })
                })
                .collect();
            MetricResult::RankingList {
                limit,
                items: top_n(items, Some(limit)),
            }
        }
        Computer::Distribution => {
            // Sum per key across buckets, keeping first-seen key order
            let mut order: Vec<(String, Option<String>)> = Vec::new();
            let mut counts: HashMap<String, i64> = HashMap::new();
            for r in raws {
                let Some(key) = &r.group_key else { continue };
                if !counts.contains_key(key) {
                    order.push((key.clone(), r.label.clone()));
                }
                *counts.entry(key.clone()).or_insert(0) += r.count;
            }
            let items = order
                .into_iter()
                .map(|(key, label)| {
                    let count = counts.get(&key).copied().unwrap_or(0);
                    (key, label, count)
                })
                .collect();
            let (total, items) = distribution(items);
            MetricResult::DistributionList { total, items }
        }
    }
}
