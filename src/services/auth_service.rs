use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::auth::password::verify_password;
use crate::auth::{Claims, TokenIssuer};
use crate::database::models::{CreateUser, PublicUser};
use crate::services::user_service::UserService;
use crate::services::ServiceError;

pub const INVALID_ACCESS_TOKEN: &str = "Invalid access token";
pub const SESSION_MISMATCH: &str = "Invalid token or logged out";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub user: PublicUser,
    pub token: String,
    pub refresh_token: String,
}

/// Sign-up, login and per-request token checks.
#[derive(Clone)]
pub struct AuthService {
    users: UserService,
    tokens: TokenIssuer,
    verify_session: bool,
}

impl AuthService {
    pub fn new(users: UserService, tokens: TokenIssuer, verify_session: bool) -> Self {
        Self { users, tokens, verify_session }
    }

    pub async fn signup(&self, payload: CreateUser) -> Result<PublicUser, ServiceError> {
        self.users.create(payload).await
    }

    /// Issue a fresh token pair and make it the user's only valid session.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, ServiceError> {
        let Some(mut user) = self.users.find_by_email(&request.email).await? else {
            return Err(ServiceError::InvalidCredentials("Email not found, please check again!".to_string()));
        };
        if !verify_password(&request.password, &user.password)? {
            return Err(ServiceError::InvalidCredentials("Invalid password".to_string()));
        }

        let pair = self.tokens.issue_pair(&user.user_id, &user.email)?;
        self.users.store_session(&user.user_id, &pair).await?;
        info!("User {} logged in", user.user_id);

        user.token = Some(pair.token.clone());
        user.refresh_token = Some(pair.refresh_token.clone());
        Ok(LoginResponse {
            user: PublicUser::from(user),
            token: pair.token,
            refresh_token: pair.refresh_token,
        })
    }

    /// Verify a bearer token, and when enabled that it is the stored session.
    pub async fn authenticate(&self, token: &str) -> Result<Claims, ServiceError> {
        let claims = self.tokens.decode(token).map_err(|e| {
            debug!("Rejected bearer token: {}", e);
            ServiceError::Unauthorized(INVALID_ACCESS_TOKEN.to_string())
        })?;

        if self.verify_session {
            let user = match self.users.find_user(&claims.user_id).await {
                Ok(user) => user,
                Err(ServiceError::NotFound(_)) => {
                    return Err(ServiceError::Unauthorized(SESSION_MISMATCH.to_string()));
                }
                Err(other) => return Err(other),
            };
            let current = user.token.as_deref() == Some(token) || user.refresh_token.as_deref() == Some(token);
            if !current {
                return Err(ServiceError::Unauthorized(SESSION_MISMATCH.to_string()));
            }
        }
        Ok(claims)
    }

    pub async fn me(&self, user_id: &str) -> Result<PublicUser, ServiceError> {
        self.users.get_by_id(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FilterConfig, SecurityConfig};
    use crate::database::memory::MemoryStore;
    use std::sync::Arc;

    fn service(verify_session: bool) -> AuthService {
        let users = UserService::new(
            Arc::new(MemoryStore::new()),
            FilterConfig { restrict_fields: true, max_limit: Some(200) },
        );
        let security = SecurityConfig {
            jwt_secret: "test-secret".into(),
            access_token_hours: 24,
            refresh_token_days: 7,
            verify_session,
            enable_cors: false,
        };
        AuthService::new(users, TokenIssuer::new(&security).unwrap(), verify_session)
    }

    async fn registered(svc: &AuthService) -> PublicUser {
        svc.signup(CreateUser {
            first_name: "Al".into(),
            email: "al@example.com".into(),
            password: "pw".into(),
            ..Default::default()
        })
        .await
        .unwrap()
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest { email: email.into(), password: password.into() }
    }

    #[tokio::test]
    async fn login_errors() {
        let svc = service(true);
        registered(&svc).await;

        let err = svc.login(login("nobody@example.com", "pw")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials(m) if m == "Email not found, please check again!"));

        let err = svc.login(login("al@example.com", "wrong")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials(m) if m == "Invalid password"));
    }

    #[tokio::test]
    async fn newer_login_supersedes_older_session() {
        let svc = service(true);
        let user = registered(&svc).await;

        let first = svc.login(login("al@example.com", "pw")).await.unwrap();
        let claims = svc.authenticate(&first.token).await.unwrap();
        assert_eq!(claims.user_id, user.user_id);
        assert!(svc.authenticate(&first.refresh_token).await.is_ok());

        let second = svc.login(login("al@example.com", "pw")).await.unwrap();
        assert!(svc.authenticate(&second.token).await.is_ok());
        let err = svc.authenticate(&first.token).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(m) if m == "Invalid token or logged out"));
    }

    #[tokio::test]
    async fn stateless_mode_only_checks_signature() {
        let svc = service(false);
        registered(&svc).await;
        let first = svc.login(login("al@example.com", "pw")).await.unwrap();
        svc.login(login("al@example.com", "pw")).await.unwrap();
        assert!(svc.authenticate(&first.token).await.is_ok());

        let err = svc.authenticate("garbage").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(m) if m == "Invalid access token"));
    }

    #[tokio::test]
    async fn me_hides_password() {
        let svc = service(true);
        let user = registered(&svc).await;
        let me = svc.me(&user.user_id).await.unwrap();
        let json = serde_json::to_value(&me).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "al@example.com");
    }
}
