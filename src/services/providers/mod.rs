/// External collaborators behind pluggable traits
///
/// Each trait hides one third-party HTTP API (movie metadata, text
/// generation, identity) so handlers and the summary pipeline can run
/// against fakes in tests.
use crate::{
    error::AppResult,
    models::{Genre, MovieSearchResult, User},
};

pub mod gemini;
pub mod supabase;
pub mod tmdb;

pub use gemini::GeminiGenerator;
pub use supabase::SupabaseAuth;
pub use tmdb::TmdbProvider;

/// Movie metadata source used when logging a new record
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Search movies by title
    async fn search_movies(&self, query: &str) -> AppResult<Vec<MovieSearchResult>>;

    /// All genre labels known to the provider
    async fn list_genres(&self) -> AppResult<Vec<Genre>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Free-text generation capability
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a completion for `prompt`
    async fn generate(&self, prompt: &str) -> AppResult<String>;
}

/// Identity provider holding user accounts and sessions
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves an access token to its user, `None` when the token is not valid
    async fn current_user(&self, access_token: &str) -> AppResult<Option<User>>;

    /// URL the browser is sent to for signing in with an OAuth provider
    fn sign_in_url(&self, provider: &str) -> AppResult<String>;

    /// Revokes the session behind `access_token`
    async fn sign_out(&self, access_token: &str) -> AppResult<()>;
}

/// Spawns a throwaway HTTP server standing in for a third-party API
#[cfg(test)]
pub(crate) async fn spawn_upstream(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
