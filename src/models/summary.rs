use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::WatchRecord;

/// Calendar month with the most watch records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopMonth {
    /// English month name, empty when there were no records
    pub month: String,
    pub count: usize,
}

/// Offline statistics for one year of watch records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyStats {
    pub total_movies: usize,
    pub avg_rating: f64,
    pub max_rating: u8,
    pub top_rated_movies: Vec<WatchRecord>,
    pub top_month: TopMonth,
    /// Month name to record count, months without records left out
    pub monthly_breakdown: BTreeMap<String, usize>,
    /// Genre label to share of all genre tags, in percent with one decimal
    pub genre_distribution: BTreeMap<String, f64>,
    pub max_streak: usize,
}

/// Yearly "wrapped" summary: statistics plus a generated narrative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryData {
    pub year: i32,
    #[serde(flatten)]
    pub stats: YearlyStats,
    pub summary_text: String,
}
