//! Chart payloads: the `categories` + `series` shape a charting surface takes.

use crate::aggregations::{DailyActivity, SeriesActivity};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_TICKS: usize = 8;

/// A named numeric array aligned to the chart's categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub name: String,
    pub data: Vec<u64>,
}

/// Single-series line chart of posts per day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostsOverTime {
    pub categories: Vec<NaiveDate>,
    pub series: Vec<ChartSeries>,
    pub tick_amount: usize,
    pub y_max: u64,
}

impl PostsOverTime {
    pub fn from_activity(activity: &DailyActivity, max_ticks: usize) -> Self {
        let y_max = activity.data.iter().copied().max().unwrap_or(0).max(1);
        Self {
            categories: activity.categories.clone(),
            series: vec![ChartSeries {
                key: None,
                name: "Posts".into(),
                data: activity.data.clone(),
            }],
            tick_amount: max_ticks.min(activity.categories.len()),
            y_max,
        }
    }
}

/// Stacked area chart with one series per author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackedActivity {
    pub categories: Vec<NaiveDate>,
    pub series: Vec<ChartSeries>,
    pub tick_amount: usize,
    /// Tallest stacked column, at least 1.
    pub y_max: u64,
}

impl StackedActivity {
    pub fn from_series(activity: &SeriesActivity, max_ticks: usize) -> Self {
        let len = activity.categories.len();
        let series: Vec<ChartSeries> = activity
            .series
            .iter()
            .map(|s| ChartSeries {
                key: Some(s.key.clone()),
                name: s.name.clone(),
                data: fit_to_len(&s.data, len),
            })
            .collect();

        let mut stacked = vec![0u64; len];
        for s in &series {
            for (slot, value) in stacked.iter_mut().zip(&s.data) {
                *slot += value;
            }
        }

        Self {
            categories: activity.categories.clone(),
            series,
            tick_amount: max_ticks.min(len),
            y_max: stacked.into_iter().max().unwrap_or(0).max(1),
        }
    }
}

/// Right-pad with zeros (or truncate) so `data` matches the axis length.
fn fit_to_len(data: &[u64], len: usize) -> Vec<u64> {
    let mut out: Vec<u64> = data.iter().copied().take(len).collect();
    out.resize(len, 0);
    out
}
