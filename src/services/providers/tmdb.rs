/// TMDB (The Movie Database) metadata provider
///
/// Search: `/3/search/movie?query=...`
/// Genres: `/3/genre/movie/list`
///
/// Both are authenticated with the v3 API key as a query parameter and cached
/// in Redis.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Genre, MovieSearchResult, TmdbGenreList, TmdbSearchResponse},
    services::providers::MetadataProvider,
};
use reqwest::Client as HttpClient;

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const GENRE_CACHE_TTL: u64 = 86400; // 1 day

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);
        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieSearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::MovieSearch(query.to_string()),
            SEARCH_CACHE_TTL,
            async move {
                let response: TmdbSearchResponse = self
                    .get_json("/3/search/movie", &[("query", query)])
                    .await?;
                let results: Vec<MovieSearchResult> = response
                    .results
                    .into_iter()
                    .map(MovieSearchResult::from)
                    .collect();

                tracing::info!(
                    query = %query,
                    results = results.len(),
                    provider = "tmdb",
                    "Movie search completed"
                );

                Ok::<_, AppError>(results)
            }
        )
    }

    async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        cached!(self.cache, CacheKey::GenreList, GENRE_CACHE_TTL, async move {
            let list: TmdbGenreList = self.get_json("/3/genre/movie/list", &[]).await?;

            tracing::info!(
                genres = list.genres.len(),
                provider = "tmdb",
                "Genre list fetched"
            );

            Ok::<_, AppError>(list.genres)
        })
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
