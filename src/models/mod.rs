pub mod metadata;
pub mod summary;
pub mod user;
pub mod watch_record;

pub use metadata::{Genre, MovieSearchResult, TmdbGenreList, TmdbMovie, TmdbSearchResponse};
pub use summary::{SummaryData, TopMonth, YearlyStats};
pub use user::{SupabaseUser, User};
pub use watch_record::{NewWatchRecord, Rating, WatchRecord};
