use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Signed-in user as reported by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

// ============================================================================
// Supabase Auth API Types
// ============================================================================

/// Raw `/auth/v1/user` response
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: SupabaseUserMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupabaseUserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl From<SupabaseUser> for User {
    fn from(user: SupabaseUser) -> Self {
        let metadata = user.user_metadata;
        Self {
            id: user.id,
            email: user.email,
            display_name: metadata.full_name.or(metadata.name),
            avatar_url: metadata.avatar_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supabase_user_prefers_full_name() {
        let raw = r#"{
            "id": "7f1c5c1e-2a43-4c53-9a8e-3f4e0f7a1b2c",
            "email": "ana@example.com",
            "user_metadata": {"full_name": "Ana Lima", "name": "ana", "avatar_url": "https://img/a.png"}
        }"#;
        let user: User = serde_json::from_str::<SupabaseUser>(raw).unwrap().into();
        assert_eq!(user.display_name.as_deref(), Some("Ana Lima"));
        assert_eq!(user.avatar_url.as_deref(), Some("https://img/a.png"));
    }

    #[test]
    fn test_supabase_user_without_metadata() {
        let raw = r#"{"id": "7f1c5c1e-2a43-4c53-9a8e-3f4e0f7a1b2c"}"#;
        let user: User = serde_json::from_str::<SupabaseUser>(raw).unwrap().into();
        assert_eq!(user.email, None);
        assert_eq!(user.display_name, None);
    }
}
