//! Markdown report generation from aggregated post activity.

use crate::aggregations::{DailyActivity, SeriesActivity};

/// Report generator for creating markdown summaries.
pub struct ReportGenerator;

impl ReportGenerator {
    /// Generate a full activity report.
    pub fn activity_report(daily: &DailyActivity, by_author: &SeriesActivity) -> String {
        let mut report = String::new();

        report.push_str("# Post Activity Report\n\n");
        if let (Some(first), Some(last)) = (daily.categories.first(), daily.categories.last()) {
            report.push_str(&format!(
                "**{} - {}**\n\n",
                first.format("%B %d, %Y"),
                last.format("%B %d, %Y")
            ));
        }

        // Overview.
        let total = daily.total();
        let active_days = daily.data.iter().filter(|&&c| c > 0).count();

        report.push_str("## Overview\n\n");
        report.push_str(&format!("- **Posts:** {}\n", total));
        report.push_str(&format!(
            "- **Active Days:** {} / {}\n",
            active_days,
            daily.len()
        ));
        if let Some((day, count)) = busiest_day(daily) {
            report.push_str(&format!(
                "- **Busiest Day:** {} ({} posts)\n",
                day, count
            ));
        }
        report.push('\n');

        // Daily breakdown table.
        report.push_str("## Daily Breakdown\n\n");
        report.push_str("| Day | Posts |\n");
        report.push_str("|-----|-------|\n");
        for (day, count) in daily.categories.iter().zip(&daily.data) {
            report.push_str(&format!("| {} | {} |\n", day, count));
        }
        report.push('\n');

        // Authors.
        let mut authors: Vec<(&str, u64)> = by_author
            .series
            .iter()
            .map(|s| (s.name.as_str(), s.total()))
            .collect();
        authors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        if !authors.is_empty() {
            report.push_str("## Authors\n\n");
            for (i, (name, count)) in authors.iter().enumerate() {
                report.push_str(&format!("{}. {} - {} posts\n", i + 1, name, count));
            }
            report.push('\n');
        }

        report
    }

    /// Generate a compact summary suitable for terminal output.
    pub fn text_summary(daily: &DailyActivity) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "  Posts: {} across {} days\n",
            daily.total(),
            daily.len()
        ));
        match busiest_day(daily) {
            Some((day, count)) => {
                output.push_str(&format!("  Busiest day: {} ({})\n", day, count));
            }
            None => output.push_str("  No posts yet\n"),
        }

        output
    }
}

/// Earliest day with the highest non-zero count.
fn busiest_day(daily: &DailyActivity) -> Option<(chrono::NaiveDate, u64)> {
    daily
        .categories
        .iter()
        .zip(&daily.data)
        .filter(|(_, count)| **count > 0)
        .fold(None, |best, (&day, &count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((day, count)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregations::{aggregate_daily_at, aggregate_daily_by_series_at};
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use std::collections::HashMap;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, d, h, 0, 0).unwrap()
    }

    fn fallback() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
    }

    #[test]
    fn test_activity_report_structure() {
        let events = vec![
            (at(1, 9), "u1"),
            (at(1, 10), "u2"),
            (at(3, 9), "u1"),
            (at(3, 12), "u1"),
        ];
        let daily = aggregate_daily_at(events.iter().map(|(t, _)| *t), fallback());
        let labels = HashMap::from([
            ("u1".to_string(), "Alex Chen".to_string()),
            ("u2".to_string(), "Priya Singh".to_string()),
        ]);
        let by_author = aggregate_daily_by_series_at(events, fallback()).with_labels(&labels);

        let report = ReportGenerator::activity_report(&daily, &by_author);
        assert!(report.contains("# Post Activity Report"));
        assert!(report.contains("**September 01, 2025 - September 03, 2025**"));
        assert!(report.contains("- **Posts:** 4"));
        assert!(report.contains("- **Active Days:** 2 / 3"));
        assert!(report.contains("- **Busiest Day:** 2025-09-01 (2 posts)"));
        assert!(report.contains("| 2025-09-02 | 0 |"));
        assert!(report.contains("1. Alex Chen - 3 posts"));
        assert!(report.contains("2. Priya Singh - 1 posts"));
    }

    #[test]
    fn test_empty_report() {
        let daily = aggregate_daily_at(Vec::<DateTime<Utc>>::new(), fallback());
        let by_author =
            aggregate_daily_by_series_at(Vec::<(DateTime<Utc>, String)>::new(), fallback());

        let report = ReportGenerator::activity_report(&daily, &by_author);
        assert!(report.contains("- **Posts:** 0"));
        assert!(report.contains("| 2030-01-01 | 0 |"));
        assert!(!report.contains("## Authors"));
        assert!(!report.contains("Busiest Day"));
    }

    #[test]
    fn test_text_summary() {
        let daily = aggregate_daily_at([at(5, 1), at(7, 1), at(7, 2)], fallback());
        let summary = ReportGenerator::text_summary(&daily);
        assert!(summary.contains("Posts: 3 across 3 days"));
        assert!(summary.contains("Busiest day: 2025-09-07 (2)"));

        let empty = aggregate_daily_at(Vec::<DateTime<Utc>>::new(), fallback());
        assert!(ReportGenerator::text_summary(&empty).contains("No posts yet"));
    }
}
