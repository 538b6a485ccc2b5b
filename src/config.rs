use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL database connection URL. Records are kept in memory when unset.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// TMDB API key
    pub tmdb_api_key: String,

    /// TMDB API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Gemini API key
    pub gemini_api_key: String,

    /// Gemini API base URL
    #[serde(default = "default_gemini_api_url")]
    pub gemini_api_url: String,

    /// Gemini model used for yearly summaries
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Supabase project URL (auth endpoints live under /auth/v1)
    pub supabase_url: String,

    /// Supabase anonymous (public) API key
    pub supabase_anon_key: String,

    /// Where the identity provider sends the browser after sign-in
    #[serde(default)]
    pub auth_redirect_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org".to_string()
}

fn default_gemini_api_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    /// Socket address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required_vars() -> Vec<(String, String)> {
        vec![
            ("TMDB_API_KEY".to_string(), "tmdb".to_string()),
            ("GEMINI_API_KEY".to_string(), "gemini".to_string()),
            ("SUPABASE_URL".to_string(), "https://proj.supabase.co".to_string()),
            ("SUPABASE_ANON_KEY".to_string(), "anon".to_string()),
        ]
    }

    #[test]
    fn test_defaults_applied() {
        let config: Config = envy::from_iter(required_vars()).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.redis_url, "redis://localhost:6379");
        assert_eq!(config.tmdb_api_url, "https://api.themoviedb.org");
        assert_eq!(config.gemini_model, "gemini-2.5-flash");
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_missing_required_key() {
        let vars = required_vars()
            .into_iter()
            .filter(|(k, _)| k != "GEMINI_API_KEY");
        assert!(envy::from_iter::<_, Config>(vars).is_err());
    }

    #[test]
    fn test_overrides() {
        let mut vars = required_vars();
        vars.push(("PORT".to_string(), "8080".to_string()));
        vars.push((
            "DATABASE_URL".to_string(),
            "postgres://localhost/journal".to_string(),
        ));
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/journal")
        );
    }
}
