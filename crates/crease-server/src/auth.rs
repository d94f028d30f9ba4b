use std::collections::HashSet;
use std::fmt;

use async_trait::async_trait;
use axum::http::{header, HeaderMap};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Viewer,
    Scorer,
}

#[derive(Clone, Debug)]
pub struct Identity {
    pub name: String,
    pub role: Role,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            name: "anonymous".into(),
            role: Role::Viewer,
        }
    }

    pub fn scorer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: Role::Scorer,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Credentials {
    Bearer(String),
    Anonymous,
}

impl Credentials {
    /// Read `Authorization: Bearer <token>`; anything else is anonymous.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| Self::Bearer(token.trim().to_string()))
            .unwrap_or(Self::Anonymous)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Read,
    Score,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Score => write!(f, "score"),
        }
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity>;
    async fn authorize(&self, identity: &Identity, action: &Action) -> ServerResult<bool>;
}

/// Static bearer tokens for the scorer role.
pub struct TokenAuth {
    scorer_tokens: HashSet<String>,
    allow_anonymous_read: bool,
}

impl TokenAuth {
    pub fn new(tokens: impl IntoIterator<Item = String>, allow_anonymous_read: bool) -> Self {
        Self {
            scorer_tokens: tokens.into_iter().collect(),
            allow_anonymous_read,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.scorer_tokens.iter().cloned(), config.allow_anonymous_read)
    }
}

#[async_trait]
impl AuthProvider for TokenAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity> {
        match credentials {
            Credentials::Bearer(token) if self.scorer_tokens.contains(token) => {
                let prefix: String = token.chars().take(4).collect();
                Ok(Identity::scorer(format!("scorer:{prefix}")))
            }
            Credentials::Bearer(_) => Err(ServerError::Unauthenticated("unknown token".into())),
            Credentials::Anonymous => Ok(Identity::anonymous()),
        }
    }

    async fn authorize(&self, identity: &Identity, action: &Action) -> ServerResult<bool> {
        Ok(match (identity.role, action) {
            (Role::Scorer, _) => true,
            (Role::Viewer, Action::Read) => self.allow_anonymous_read,
            (Role::Viewer, Action::Score) => false,
        })
    }
}

/// Grants every action. For local use and tests.
pub struct AllowAllAuth;

#[async_trait]
impl AuthProvider for AllowAllAuth {
    async fn authenticate(&self, _credentials: &Credentials) -> ServerResult<Identity> {
        Ok(Identity::scorer("local"))
    }

    async fn authorize(&self, _identity: &Identity, _action: &Action) -> ServerResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn credentials_from_authorization_header() {
        let mut headers = HeaderMap::new();
        assert!(matches!(Credentials::from_headers(&headers), Credentials::Anonymous));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert!(matches!(
            Credentials::from_headers(&headers),
            Credentials::Bearer(token) if token == "abc123"
        ));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic Zm9v"));
        assert!(matches!(Credentials::from_headers(&headers), Credentials::Anonymous));
    }

    #[tokio::test]
    async fn token_auth_roles() {
        let auth = TokenAuth::new(["s3cret".to_string()], true);

        let scorer = auth
            .authenticate(&Credentials::Bearer("s3cret".into()))
            .await
            .unwrap();
        assert_eq!(scorer.role, Role::Scorer);
        assert!(auth.authorize(&scorer, &Action::Score).await.unwrap());

        let viewer = auth.authenticate(&Credentials::Anonymous).await.unwrap();
        assert!(auth.authorize(&viewer, &Action::Read).await.unwrap());
        assert!(!auth.authorize(&viewer, &Action::Score).await.unwrap());

        let err = auth
            .authenticate(&Credentials::Bearer("guess".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn private_reads() {
        let auth = TokenAuth::new(Vec::new(), false);
        let viewer = auth.authenticate(&Credentials::Anonymous).await.unwrap();
        assert!(!auth.authorize(&viewer, &Action::Read).await.unwrap());
    }

    #[tokio::test]
    async fn allow_all_auth() {
        let auth = AllowAllAuth;
        let id = auth.authenticate(&Credentials::Anonymous).await.unwrap();
        assert!(auth.authorize(&id, &Action::Score).await.unwrap());
    }

    #[test]
    fn action_display() {
        assert_eq!(Action::Score.to_string(), "score");
    }
}
