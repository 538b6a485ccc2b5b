//! Yearly "wrapped" summary.
//!
//! Statistics are computed synchronously from the records handed in; the
//! caller is responsible for passing only the records of the target year.
//! The narrative is the one suspending step and degrades to
//! [`FALLBACK_SUMMARY`] on any generator failure.

use chrono::{Datelike, Month, NaiveDate};
use std::collections::{BTreeMap, HashMap};

use crate::{
    models::{SummaryData, TopMonth, WatchRecord, YearlyStats},
    services::{narrator, providers::TextGenerator},
};

/// Shown in place of the narrative when generation fails
pub const FALLBACK_SUMMARY: &str =
    "Sorry, there was an error generating your summary. Please try again.";

/// Computes the offline statistics for a set of records
pub fn compute_stats(records: &[WatchRecord]) -> YearlyStats {
    let max_rating = max_rating(records);
    let month_counts = month_counts(records);

    YearlyStats {
        total_movies: records.len(),
        avg_rating: average_rating(records),
        max_rating,
        top_rated_movies: records
            .iter()
            .filter(|r| r.rating.value() == max_rating)
            .cloned()
            .collect(),
        top_month: top_month(&month_counts),
        monthly_breakdown: monthly_breakdown(&month_counts),
        genre_distribution: genre_distribution(records),
        max_streak: longest_streak(records.iter().map(|r| r.watched_date)),
    }
}

/// Computes statistics and the narrative for `year`
///
/// Never fails: a generator error is logged and replaced by
/// [`FALLBACK_SUMMARY`].
pub async fn compute_summary(
    records: &[WatchRecord],
    year: i32,
    generator: &dyn TextGenerator,
) -> SummaryData {
    let stats = compute_stats(records);

    tracing::info!(
        year,
        total_movies = stats.total_movies,
        max_streak = stats.max_streak,
        "Yearly statistics computed"
    );

    let summary_text = match narrator::narrate(generator, records, &stats, year).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, year, "Summary generation failed, using fallback text");
            FALLBACK_SUMMARY.to_string()
        }
    };

    SummaryData {
        year,
        stats,
        summary_text,
    }
}

fn average_rating(records: &[WatchRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    let sum: u32 = records.iter().map(|r| u32::from(r.rating.value())).sum();
    f64::from(sum) / records.len() as f64
}

fn max_rating(records: &[WatchRecord]) -> u8 {
    records.iter().map(|r| r.rating.value()).max().unwrap_or(0)
}

/// Record count per calendar month, January first
fn month_counts(records: &[WatchRecord]) -> [usize; 12] {
    let mut counts = [0usize; 12];
    for record in records {
        counts[record.watched_date.month0() as usize] += 1;
    }
    counts
}

/// Busiest calendar month; ties go to the earliest month of the year
fn top_month(counts: &[usize; 12]) -> TopMonth {
    let mut best: Option<(usize, usize)> = None;
    for (index, &count) in counts.iter().enumerate() {
        if count > 0 && best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((index, count));
        }
    }

    match best {
        Some((index, count)) => TopMonth {
            month: month_name(index),
            count,
        },
        None => TopMonth::default(),
    }
}

/// Months with at least one record, keyed by month name
fn monthly_breakdown(counts: &[usize; 12]) -> BTreeMap<String, usize> {
    counts
        .iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .map(|(index, &count)| (month_name(index), count))
        .collect()
}

fn month_name(month0: usize) -> String {
    u8::try_from(month0 + 1)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .unwrap_or_default()
}

/// Share of each genre among all genre tags, rounded to one decimal
fn genre_distribution(records: &[WatchRecord]) -> BTreeMap<String, f64> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for genre in records.iter().flat_map(|r| r.genres.iter()) {
        *counts.entry(genre.as_str()).or_default() += 1;
    }

    let total: usize = counts.values().sum();
    if total == 0 {
        return BTreeMap::new();
    }

    counts
        .into_iter()
        .map(|(genre, count)| {
            let pct = 100.0 * count as f64 / total as f64;
            (genre.to_string(), (pct * 10.0).round() / 10.0)
        })
        .collect()
}

/// Longest run of watch dates exactly one day apart
///
/// Dates are sorted first. A repeated date (a gap of 0 days) ends the current
/// run, so `[Jan 1, Jan 2, Jan 2, Jan 3]` yields 2, not 3.
fn longest_streak(dates: impl IntoIterator<Item = NaiveDate>) -> usize {
    let mut dates: Vec<NaiveDate> = dates.into_iter().collect();
    if dates.is_empty() {
        return 0;
    }
    dates.sort_unstable();

    let mut max_streak = 0;
    let mut current = 1;
    for pair in dates.windows(2) {
        if (pair[1] - pair[0]).num_days() == 1 {
            current += 1;
        } else {
            max_streak = max_streak.max(current);
            current = 1;
        }
    }

    max_streak.max(current)
}
