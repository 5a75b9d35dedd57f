//! Day-bucketed activity aggregation.
//!
//! Turns an unordered collection of event instants into a per-day count table
//! and a gap-free, zero-filled day axis that a line or stacked area chart can
//! consume directly. Every calendar day is a UTC date; truncation and stepping
//! both use `NaiveDate` arithmetic, so the axis never skips or repeats a day.

use allv_core::types::Post;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Anything with an occurrence instant.
pub trait Event {
    fn occurred_at(&self) -> DateTime<Utc>;
}

impl Event for DateTime<Utc> {
    fn occurred_at(&self) -> DateTime<Utc> {
        *self
    }
}

impl Event for Post {
    fn occurred_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl<E: Event + ?Sized> Event for &E {
    fn occurred_at(&self) -> DateTime<Utc> {
        (**self).occurred_at()
    }
}

/// UTC calendar date of an instant.
pub fn day_key(at: DateTime<Utc>) -> NaiveDate {
    at.date_naive()
}

/// Today's date in UTC.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// A single (day, count) bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub day: NaiveDate,
    pub count: u64,
}

/// Parallel day axis and counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub categories: Vec<NaiveDate>,
    pub data: Vec<u64>,
}

impl DailyActivity {
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Never true for aggregator output.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.data.iter().sum()
    }

    /// Axis labels as `YYYY-MM-DD` strings.
    pub fn labels(&self) -> Vec<String> {
        self.categories.iter().map(|d| d.to_string()).collect()
    }

    pub fn day_counts(&self) -> Vec<DayCount> {
        self.categories
            .iter()
            .zip(&self.data)
            .map(|(&day, &count)| DayCount { day, count })
            .collect()
    }
}

/// One named series aligned to a shared axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesData {
    /// Stable grouping key (e.g. author id).
    pub key: String,
    /// Display name; defaults to the key.
    pub name: String,
    pub data: Vec<u64>,
}

impl SeriesData {
    pub fn total(&self) -> u64 {
        self.data.iter().sum()
    }
}

/// Several series over one continuous day axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesActivity {
    pub categories: Vec<NaiveDate>,
    pub series: Vec<SeriesData>,
}

impl SeriesActivity {
    /// Replace series display names using a key -> label lookup. Keys without
    /// a label keep their current name.
    pub fn with_labels(mut self, labels: &HashMap<String, String>) -> Self {
        for s in &mut self.series {
            if let Some(label) = labels.get(&s.key) {
                s.name = label.clone();
            }
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&SeriesData> {
        self.series.iter().find(|s| s.key == key)
    }

    /// Per-day sum across all series.
    pub fn totals(&self) -> Vec<u64> {
        let mut totals = vec![0; self.categories.len()];
        for s in &self.series {
            for (slot, value) in totals.iter_mut().zip(&s.data) {
                *slot += value;
            }
        }
        totals
    }

    /// Collapse all series into a single daily activity.
    pub fn combined(&self) -> DailyActivity {
        DailyActivity {
            categories: self.categories.clone(),
            data: self.totals(),
        }
    }
}

/// Count events per UTC day.
pub fn count_by_day<I>(events: I) -> BTreeMap<NaiveDate, u64>
where
    I: IntoIterator,
    I::Item: Event,
{
    let mut counts = BTreeMap::new();
    for event in events {
        *counts.entry(day_key(event.occurred_at())).or_insert(0) += 1;
    }
    counts
}

/// Every day from `start` to `end` inclusive. Empty when `start > end`.
pub fn day_axis(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut days = Vec::new();
    let mut current = Some(start);
    while let Some(day) = current {
        if day > end {
            break;
        }
        days.push(day);
        current = day.succ_opt();
    }
    days
}

/// Axis spanning the observed days, or `[fallback]` when nothing was observed.
fn axis_or_fallback<'a, I>(days: I, fallback: NaiveDate) -> Vec<NaiveDate>
where
    I: IntoIterator<Item = &'a NaiveDate>,
{
    let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
    for &day in days {
        bounds = Some(match bounds {
            Some((min, max)) => (min.min(day), max.max(day)),
            None => (day, day),
        });
    }
    match bounds {
        Some((min, max)) => day_axis(min, max),
        None => vec![fallback],
    }
}

fn fill(counts: &BTreeMap<NaiveDate, u64>, fallback: NaiveDate) -> DailyActivity {
    let categories = axis_or_fallback(counts.keys(), fallback);
    let data = categories
        .iter()
        .map(|day| counts.get(day).copied().unwrap_or(0))
        .collect();
    DailyActivity { categories, data }
}

/// Aggregate events into a contiguous daily histogram.
///
/// Empty input yields a single bucket for today (UTC) with a count of zero.
pub fn aggregate_daily<I>(events: I) -> DailyActivity
where
    I: IntoIterator,
    I::Item: Event,
{
    aggregate_daily_at(events, today())
}

/// Like [`aggregate_daily`], with an explicit fallback day for empty input.
pub fn aggregate_daily_at<I>(events: I, fallback: NaiveDate) -> DailyActivity
where
    I: IntoIterator,
    I::Item: Event,
{
    let counts = count_by_day(events);
    let activity = fill(&counts, fallback);
    tracing::debug!(
        days = activity.len(),
        events = activity.total(),
        "Aggregated daily activity"
    );
    activity
}

/// Aggregate keyed events into one series per key over a shared axis.
///
/// The axis covers the union of all events, and every series is zero-filled to
/// its full length. Series are ordered by key.
pub fn aggregate_daily_by_series<I, E, K>(events: I) -> SeriesActivity
where
    I: IntoIterator<Item = (E, K)>,
    E: Event,
    K: Into<String>,
{
    aggregate_daily_by_series_at(events, today())
}

/// Like [`aggregate_daily_by_series`], with an explicit fallback day.
pub fn aggregate_daily_by_series_at<I, E, K>(events: I, fallback: NaiveDate) -> SeriesActivity
where
    I: IntoIterator<Item = (E, K)>,
    E: Event,
    K: Into<String>,
{
    let mut per_series: BTreeMap<String, BTreeMap<NaiveDate, u64>> = BTreeMap::new();
    let mut all_days: BTreeSet<NaiveDate> = BTreeSet::new();

    for (event, key) in events {
        let day = day_key(event.occurred_at());
        all_days.insert(day);
        *per_series
            .entry(key.into())
            .or_default()
            .entry(day)
            .or_insert(0) += 1;
    }

    let categories = axis_or_fallback(&all_days, fallback);
    let series = per_series
        .into_iter()
        .map(|(key, counts)| SeriesData {
            name: key.clone(),
            data: categories
                .iter()
                .map(|day| counts.get(day).copied().unwrap_or(0))
                .collect(),
            key,
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        days = categories.len(),
        series = series.len(),
        "Aggregated daily activity by series"
    );
    SeriesActivity { categories, series }
}

// ── Loosely typed rows ──────────────────────────────────────────────────

/// A pre-grouped `{ day, count }` row from an external source. Either field
/// may be missing or of the wrong type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayRow {
    #[serde(default)]
    pub day: Option<String>,
    #[serde(default)]
    pub count: serde_json::Value,
}

/// Normalize a loosely typed count. Absent, null, non-numeric, negative, NaN
/// and infinite values all become 0; fractional values truncate.
pub fn coerce_count(value: &serde_json::Value) -> u64 {
    use serde_json::Value;

    fn from_f64(f: f64) -> u64 {
        if f.is_finite() && f > 0.0 {
            f.trunc() as u64
        } else {
            0
        }
    }

    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|_| 0))
            .unwrap_or_else(|| n.as_f64().map(from_f64).unwrap_or(0)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(from_f64))
                .unwrap_or(0)
        }
        Value::Bool(true) => 1,
        _ => 0,
    }
}

/// Parse a `YYYY-MM-DD` prefix (an ISO-8601 timestamp is accepted).
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let prefix = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Rebuild a contiguous daily activity from pre-grouped rows. Rows without a
/// usable day are dropped; repeated days are summed.
pub fn rows_to_activity(rows: &[DayRow], fallback: NaiveDate) -> DailyActivity {
    let mut counts: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    let mut dropped = 0usize;
    for row in rows {
        match row.day.as_deref().and_then(parse_day) {
            Some(day) => *counts.entry(day).or_insert(0) += coerce_count(&row.count),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        tracing::debug!(dropped, "Dropped rows without a valid day");
    }
    fill(&counts, fallback)
}
