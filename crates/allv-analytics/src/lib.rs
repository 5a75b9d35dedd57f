//! Post activity analytics.
//!
//! Buckets post timestamps into contiguous per-day histograms (optionally one
//! series per author), shapes them into chart payloads, and renders markdown
//! reports.

pub mod aggregations;
pub mod charts;
pub mod reports;

pub use aggregations::{
    aggregate_daily, aggregate_daily_at, aggregate_daily_by_series, aggregate_daily_by_series_at,
    DailyActivity, DayCount, Event, SeriesActivity, SeriesData,
};
pub use charts::{PostsOverTime, StackedActivity};
pub use reports::ReportGenerator;
