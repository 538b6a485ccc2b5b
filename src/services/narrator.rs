//! Narrative text for the yearly summary.
//!
//! Prompt construction is a pure function of the records and statistics; the
//! only I/O is the single call to the injected [`TextGenerator`].

use crate::{
    error::AppResult,
    models::{WatchRecord, YearlyStats},
    services::providers::TextGenerator,
};

/// Records beyond this many are counted but not listed in the prompt
pub const PROMPT_RECORD_LIMIT: usize = 10;

/// Builds the generation prompt for one year of watching
pub fn build_prompt(records: &[WatchRecord], stats: &YearlyStats, year: i32) -> String {
    let movies: Vec<String> = records
        .iter()
        .take(PROMPT_RECORD_LIMIT)
        .map(|record| {
            format!(
                "- {} ({}/5 stars) - {} - Overview: {}",
                record.title,
                record.rating,
                record.comments.as_deref().unwrap_or("No comments"),
                record.overview
            )
        })
        .collect();
    let top_titles: Vec<&str> = stats
        .top_rated_movies
        .iter()
        .map(|r| r.title.as_str())
        .collect();
    let genres: Vec<String> = stats
        .genre_distribution
        .iter()
        .map(|(genre, pct)| format!("{} {}%", genre, pct))
        .collect();

    format!(
        "Write a short, engaging paragraph (max 5 sentences) summarizing this person's {year} movie watching year. \
         You can be playful, personal, or creative. Use the following data:

Movies watched ({total} total):
{movies}

Summary data:
- Average rating: {avg:.1}
- Highest rated movie(s): {top_titles} ({max_rating} stars)
- Peak viewing month: {month} with {month_count} movies
- Longest movie streak: {streak} days
- Genre breakdown: {genres}

Keep the summary concise and fun, as if you're chatting with a friend.
Try not to repeat the summary data above verbatim, but use it to give catchy feedback to the user.
",
        year = year,
        total = records.len(),
        movies = movies.join("\n"),
        avg = stats.avg_rating,
        top_titles = top_titles.join(", "),
        max_rating = stats.max_rating,
        month = stats.top_month.month,
        month_count = stats.top_month.count,
        streak = stats.max_streak,
        genres = genres.join(", "),
    )
}

/// Asks the generator for the narrative paragraph
///
/// Errors are returned as-is; the caller decides on a fallback.
pub async fn narrate(
    generator: &dyn TextGenerator,
    records: &[WatchRecord],
    stats: &YearlyStats,
    year: i32,
) -> AppResult<String> {
    let prompt = build_prompt(records, stats, year);
    tracing::debug!(year, prompt_chars = prompt.len(), "Requesting yearly narrative");
    generator.generate(&prompt).await
}
