/// Supabase Auth (GoTrue) identity provider
///
/// - `GET  /auth/v1/user`      resolves an access token to its user
/// - `GET  /auth/v1/authorize` starts an OAuth sign-in in the browser
/// - `POST /auth/v1/logout`    revokes the session
use crate::{
    error::{AppError, AppResult},
    models::{SupabaseUser, User},
    services::providers::IdentityProvider,
};
use reqwest::{Client as HttpClient, StatusCode, Url};

#[derive(Clone)]
pub struct SupabaseAuth {
    http_client: HttpClient,
    project_url: String,
    anon_key: String,
    redirect_url: Option<String>,
}

impl SupabaseAuth {
    pub fn new(project_url: String, anon_key: String, redirect_url: Option<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            project_url: project_url.trim_end_matches('/').to_string(),
            anon_key,
            redirect_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.project_url, path)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for SupabaseAuth {
    async fn current_user(&self, access_token: &str) -> AppResult<Option<User>> {
        let response = self
            .http_client
            .get(self.endpoint("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::debug!("Access token rejected by identity provider");
                Ok(None)
            }
            status if status.is_success() => {
                let user: SupabaseUser = response.json().await?;
                Ok(Some(user.into()))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AppError::ExternalApi(format!(
                    "Supabase auth returned status {}: {}",
                    status, body
                )))
            }
        }
    }

    fn sign_in_url(&self, provider: &str) -> AppResult<String> {
        let provider = provider.trim();
        if provider.is_empty() || !provider.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(AppError::InvalidInput(format!(
                "Unsupported sign-in provider: {:?}",
                provider
            )));
        }

        let mut params = vec![("provider", provider)];
        if let Some(redirect) = &self.redirect_url {
            params.push(("redirect_to", redirect.as_str()));
        }

        let url = Url::parse_with_params(&self.endpoint("authorize"), &params)
            .map_err(|e| AppError::Internal(format!("Invalid auth URL: {}", e)))?;

        Ok(url.to_string())
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.endpoint("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        // An already-expired token is as good as signed out
        if response.status().is_success() || response.status() == StatusCode::UNAUTHORIZED {
            return Ok(());
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::ExternalApi(format!(
            "Supabase logout returned status {}: {}",
            status, body
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::spawn_upstream;
    use axum::{
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};

    const USER_ID: &str = "7f1c5c1e-2a43-4c53-9a8e-3f4e0f7a1b2c";

    fn bearer(headers: &HeaderMap) -> Option<&str> {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }

    async fn user(headers: HeaderMap) -> (StatusCode, Json<Value>) {
        if headers.get("apikey").is_none() {
            return (StatusCode::BAD_REQUEST, Json(json!({"msg": "no api key"})));
        }
        match bearer(&headers) {
            Some("good-token") => (
                StatusCode::OK,
                Json(json!({"id": USER_ID, "email": "ana@example.com", "user_metadata": {"name": "Ana"}})),
            ),
            _ => (StatusCode::UNAUTHORIZED, Json(json!({"msg": "invalid JWT"}))),
        }
    }

    async fn logout() -> StatusCode {
        StatusCode::NO_CONTENT
    }

    async fn create_test_auth() -> SupabaseAuth {
        let url = spawn_upstream(
            Router::new()
                .route("/auth/v1/user", get(user))
                .route("/auth/v1/logout", post(logout)),
        )
        .await;
        SupabaseAuth::new(url, "anon".to_string(), Some("http://localhost:3000/".to_string()))
    }

    #[tokio::test]
    async fn test_current_user_valid_token() {
        let auth = create_test_auth().await;
        let user = auth.current_user("good-token").await.unwrap().unwrap();
        assert_eq!(user.id.to_string(), USER_ID);
        assert_eq!(user.display_name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_current_user_invalid_token_is_none() {
        let auth = create_test_auth().await;
        assert_eq!(auth.current_user("expired").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sign_out() {
        let auth = create_test_auth().await;
        auth.sign_out("good-token").await.unwrap();
    }

    #[test]
    fn test_sign_in_url() {
        let auth = SupabaseAuth::new(
            "https://proj.supabase.co/".to_string(),
            "anon".to_string(),
            Some("http://localhost:3000/".to_string()),
        );
        let url = auth.sign_in_url("google").unwrap();
        assert_eq!(
            url,
            "https://proj.supabase.co/auth/v1/authorize?provider=google&redirect_to=http%3A%2F%2Flocalhost%3A3000%2F"
        );
    }

    #[test]
    fn test_sign_in_url_rejects_odd_provider() {
        let auth = SupabaseAuth::new("https://proj.supabase.co".into(), "anon".into(), None);
        assert!(auth.sign_in_url("").is_err());
        assert!(auth.sign_in_url("google&evil=1").is_err());
    }
}
