use serde::{Deserialize, Serialize};

/// A movie returned by the metadata search, used to prefill a new record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieSearchResult {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

/// Genre label known to the metadata service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Raw movie entry from TMDB `/3/search/movie`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
}

impl From<TmdbMovie> for MovieSearchResult {
    fn from(movie: TmdbMovie) -> Self {
        Self {
            id: movie.id,
            title: movie.title,
            overview: movie.overview.unwrap_or_default(),
            poster_path: movie.poster_path,
            // TMDB sends "" for unknown release dates
            release_date: movie.release_date.filter(|d| !d.is_empty()),
            genre_ids: movie.genre_ids,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}
