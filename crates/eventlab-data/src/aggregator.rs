//! Revenue aggregation over cleaned event rows.
//!
//! All views follow the same group-and-aggregate pattern: rows are bucketed
//! by a key in first-appearance order, reduced, then stably sorted so that
//! ties keep the order in which their key was first seen.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use eventlab_core::models::{
    AggregationResults, CleanedRow, CountryRevenue, DeviceRevenue, EventType, EventTypeCount,
};

// ── RevenueAggregator ─────────────────────────────────────────────────────────

/// Stateless helper that derives display aggregations from cleaned rows.
pub struct RevenueAggregator;

impl RevenueAggregator {
    /// Revenue by country (highest first) and ARPU.
    ///
    /// Returns an empty country list and an ARPU of `0.0` for empty input.
    pub fn aggregate(rows: &[CleanedRow]) -> AggregationResults {
        AggregationResults {
            revenue_by_country: Self::revenue_by_country(rows),
            arpu: Self::arpu(rows),
        }
    }

    /// Sum revenue per country, sorted by total descending.
    pub fn revenue_by_country(rows: &[CleanedRow]) -> Vec<CountryRevenue> {
        let mut totals = rollup(rows, |r| r.country.clone(), |r| r.revenue);
        sort_descending(&mut totals, |(_, total)| *total);
        totals
            .into_iter()
            .map(|(country, total_revenue)| CountryRevenue {
                country,
                total_revenue,
            })
            .collect()
    }

    /// Total revenue divided by the number of distinct users.
    ///
    /// Returns `0.0` when there are no users.
    pub fn arpu(rows: &[CleanedRow]) -> f64 {
        let users: HashSet<&str> = rows.iter().map(|r| r.user_id.as_str()).collect();
        if users.is_empty() {
            return 0.0;
        }
        Self::total_revenue(rows) / users.len() as f64
    }

    pub fn total_revenue(rows: &[CleanedRow]) -> f64 {
        rows.iter().map(|r| r.revenue).sum()
    }

    /// Number of distinct user ids.
    pub fn unique_users(rows: &[CleanedRow]) -> usize {
        rows.iter()
            .map(|r| r.user_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Sum revenue per device, sorted by total descending.
    pub fn revenue_by_device(rows: &[CleanedRow]) -> Vec<DeviceRevenue> {
        let mut totals = rollup(rows, |r| r.device.clone(), |r| r.revenue);
        sort_descending(&mut totals, |(_, total)| *total);
        totals
            .into_iter()
            .map(|(device, total_revenue)| DeviceRevenue {
                device,
                total_revenue,
            })
            .collect()
    }

    /// Count rows per event type, most frequent first.
    pub fn event_type_counts(rows: &[CleanedRow]) -> Vec<EventTypeCount> {
        let mut counts: Vec<(EventType, u64)> = rollup(rows, |r| r.event_type.clone(), |_| 1u64);
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
            .into_iter()
            .map(|(event_type, count)| EventTypeCount { event_type, count })
            .collect()
    }
}

// ── Private ───────────────────────────────────────────────────────────────────

/// Group `rows` by `key_fn` and sum `value_fn` per group.
///
/// Groups are returned in the order their key first appears.
fn rollup<K, V>(
    rows: &[CleanedRow],
    key_fn: impl Fn(&CleanedRow) -> K,
    value_fn: impl Fn(&CleanedRow) -> V,
) -> Vec<(K, V)>
where
    K: Eq + Hash + Clone,
    V: std::ops::AddAssign + Default,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, V)> = Vec::new();

    for row in rows {
        let key = key_fn(row);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, V::default()));
            groups.len() - 1
        });
        groups[slot].1 += value_fn(row);
    }

    groups
}

/// Stable sort, largest value first.
fn sort_descending<T>(items: &mut [T], value: impl Fn(&T) -> f64) {
    items.sort_by(|a, b| value(b).total_cmp(&value(a)));
}

// ── Tests ─────────────────────────────────────────────────────────────────────
