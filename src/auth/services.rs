use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{info, warn};

use crate::auth::dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::{CredentialStore, NewUser};
use crate::error::{with_store_timeout, AppError};

/// Composes hasher, credential store and token service into the
/// registration and login flows.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, keys: JwtKeys) -> Self {
        Self { store, keys }
    }

    /// Hashes the password, persists the user with role `"user"` and
    /// orchestrator-stamped timestamps, then issues a token.
    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse, AppError> {
        let password_hash = hash_password(&req.password)?;
        let now = OffsetDateTime::now_utc();
        let new_user = NewUser {
            username: req.username.clone(),
            email: req.email.clone(),
            password_hash,
            role: "user".into(),
            created_at: now,
            updated_at: now,
        };

        let user = with_store_timeout(self.store.insert(&new_user)).await?;
        let token = self.keys.sign(user.id)?;

        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(AuthResponse {
            token,
            user: PublicUser::from(user),
        })
    }

    /// Unknown email and wrong password collapse to the same
    /// [`AppError::InvalidCredentials`]; callers cannot tell whether the
    /// email exists.
    pub async fn login(&self, req: &LoginRequest) -> Result<String, AppError> {
        let user = with_store_timeout(self.store.find_by_email(&req.email))
            .await?
            .ok_or_else(|| {
                warn!(email = %req.email, "login unknown email");
                AppError::InvalidCredentials
            })?;

        if !verify_password(&req.password, &user.password_hash)? {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.keys.sign(user.id)?;
        info!(user_id = %user.id, "user logged in");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::auth::repo::memory::MemoryCredentialStore;
    use crate::auth::repo::User;
    use crate::config::JwtConfig;
    use async_trait::async_trait;

    fn make_keys() -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: "test-secret".into(),
            ttl_seconds: 3600,
        })
    }

    fn make_service() -> (AuthService, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::default());
        let service = AuthService::new(store.clone(), make_keys());
        (service, store)
    }

    fn register_req(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: "hunter22".into(),
        }
    }

    #[tokio::test]
    async fn register_then_login_succeeds() {
        let (service, _) = make_service();
        let resp = service
            .register(&register_req("alice", "alice@example.com"))
            .await
            .expect("register");
        assert_eq!(resp.user.role, "user");
        assert!(!resp.token.is_empty());

        let token = service
            .login(&LoginRequest {
                email: "alice@example.com".into(),
                password: "hunter22".into(),
            })
            .await
            .expect("login");
        let claims = make_keys().verify(&token).expect("verify");
        assert_eq!(claims.sub, resp.user.id);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_and_inserts_nothing() {
        let (service, store) = make_service();
        service
            .register(&register_req("alice", "alice@example.com"))
            .await
            .expect("first register");

        let err = service
            .register(&register_req("alice2", "alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEmail));
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let (service, _) = make_service();
        service
            .register(&register_req("alice", "alice@example.com"))
            .await
            .expect("first register");

        let err = service
            .register(&register_req("alice", "alice2@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername));
    }

    #[tokio::test]
    async fn unknown_email_and_wrong_password_look_the_same() {
        let (service, _) = make_service();
        service
            .register(&register_req("alice", "alice@example.com"))
            .await
            .expect("register");

        let unknown = service
            .login(&LoginRequest {
                email: "nobody@example.com".into(),
                password: "hunter22".into(),
            })
            .await
            .unwrap_err();
        let mismatch = service
            .login(&LoginRequest {
                email: "alice@example.com".into(),
                password: "wrong-password".into(),
            })
            .await
            .unwrap_err();

        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert!(matches!(mismatch, AppError::InvalidCredentials));
    }

    struct SlowStore;

    #[async_trait]
    impl CredentialStore for SlowStore {
        async fn insert(&self, _user: &NewUser) -> Result<User, AppError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            unreachable!("insert should have been cancelled by the timeout")
        }

        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, AppError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            unreachable!("lookup should have been cancelled by the timeout")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_store_surfaces_as_timeout() {
        let service = AuthService::new(Arc::new(SlowStore), make_keys());
        let err = service
            .login(&LoginRequest {
                email: "alice@example.com".into(),
                password: "hunter22".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Timeout));
    }
}
