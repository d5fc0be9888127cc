//! Сервис аутентификации: регистрация, вход, выпуск и проверка токенов.
//!
//! Учётные данные лежат в коллекции `accounts` под нормализованным email,
//! поэтому повторная регистрация превращается в `AlreadyExists` хранилища.
//! Профиль пользователя - отдельный документ в `users` под uid; он пишется
//! первым, аккаунт вторым.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::config::AuthConfig;
use crate::models::{Account, UserProfile};
use crate::store::{self, Collection, DocumentStore, StoreError};

/// Аутентифицированный пользователь запроса.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub gender: Option<String>,
    pub region: Option<String>,
    pub district: Option<String>,
    pub favorite_theater: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: AuthUser,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("email address is already in use")]
    EmailInUse,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    InvalidToken,

    /// Текст ошибки бэкенда как есть
    #[error("{0}")]
    Backend(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Backend(err.to_string())
    }
}

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn DocumentStore>,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn DocumentStore>, config: AuthConfig) -> Self {
        Self { store, config }
    }

    pub async fn sign_up(&self, req: SignUpRequest) -> Result<AuthSession, AuthError> {
        req.validate().map_err(|e| AuthError::Validation(validation_message(&e)))?;

        let email = normalize_email(&req.email);
        let uid = Uuid::new_v4().to_string();
        let password_hash = self.hash_password(req.password.clone()).await?;

        // Сначала профиль: без аккаунта он ни на что не ссылается, а аккаунт
        // под email - точка фиксации регистрации
        let profile = json!({
            "name": req.name.trim(),
            "email": email,
            "phone": req.phone,
            "birthDate": req.birth_date,
            "gender": req.gender,
            "region": req.region,
            "district": req.district,
            "favoriteTheater": req.favorite_theater,
        });
        if let Err(e) = self.store.create(Collection::Users, &uid, profile, Some("createdAt")).await {
            error!("Failed to write profile for {}: {}", uid, e);
            return Err(e.into());
        }

        let account = Account { uid: uid.clone(), email: email.clone(), password_hash };
        let account_doc = serde_json::to_value(&account).map_err(|e| AuthError::Backend(e.to_string()))?;
        match self.store.create(Collection::Accounts, &email, account_doc, Some("createdAt")).await {
            Ok(_) => {}
            Err(StoreError::AlreadyExists { .. }) => {
                warn!("Sign-up rejected: {} already registered (profile {} left unreferenced)", email, uid);
                return Err(AuthError::EmailInUse);
            }
            Err(e) => return Err(e.into()),
        }

        info!("User {} signed up", uid);
        let user = AuthUser { uid, email };
        let token = self.issue_token(&user)?;
        Ok(AuthSession { token, user })
    }

    pub async fn sign_in(&self, req: SignInRequest) -> Result<AuthSession, AuthError> {
        let user = self.verify_credentials(&req.email, &req.password).await?;
        let token = self.issue_token(&user)?;
        Ok(AuthSession { token, user })
    }

    /// Проверка email + пароля без выпуска токена (Basic auth).
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let email = normalize_email(email);
        let account: Account = store::fetch(self.store.as_ref(), Collection::Accounts, &email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password = password.to_string();
        let hash = account.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AuthError::Backend(e.to_string()))?
            .map_err(|e| AuthError::Backend(e.to_string()))?;

        if !valid {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(AuthUser { uid: account.uid, email: account.email })
    }

    pub fn issue_token(&self, user: &AuthUser) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.uid.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.token_ttl_hours)).timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::Backend(e.to_string()))
    }

    pub fn verify_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AuthError::InvalidToken)?;
        Ok(AuthUser { uid: data.claims.sub, email: data.claims.email })
    }

    pub async fn profile(&self, uid: &str) -> Result<Option<UserProfile>, AuthError> {
        Ok(store::fetch(self.store.as_ref(), Collection::Users, uid).await?)
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let cost = self.config.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AuthError::Backend(e.to_string()))?
            .map_err(|e| AuthError::Backend(e.to_string()))
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Document, Filter, MemoryStore, StoreResult};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Обёртка над MemoryStore, которая отказывает в записи профилей.
    struct FailingProfiles {
        inner: MemoryStore,
        fail: AtomicBool,
    }

    #[async_trait]
    impl DocumentStore for FailingProfiles {
        async fn get(&self, collection: Collection, id: &str) -> StoreResult<Option<Document>> {
            self.inner.get(collection, id).await
        }

        async fn query(&self, collection: Collection, filters: &[Filter]) -> StoreResult<Vec<Document>> {
            self.inner.query(collection, filters).await
        }

        async fn create(
            &self,
            collection: Collection,
            id: &str,
            data: Value,
            server_timestamp: Option<&'static str>,
        ) -> StoreResult<Document> {
            if collection == Collection::Users && self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("users down".to_string()));
            }
            self.inner.create(collection, id, data, server_timestamp).await
        }

        async fn increment(
            &self,
            collection: Collection,
            id: &str,
            field: &'static str,
            by: i64,
        ) -> StoreResult<i64> {
            self.inner.increment(collection, id, field, by).await
        }
    }

    fn test_auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: 1,
            bcrypt_cost: 4,
        }
    }

    fn service() -> AuthService {
        AuthService::new(Arc::new(MemoryStore::new()), test_auth_config())
    }

    fn sign_up_request(email: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.to_string(),
            password: "secret123".to_string(),
            name: "Minh Anh".to_string(),
            phone: Some("0900000000".to_string()),
            birth_date: None,
            gender: None,
            region: Some("Hanoi".to_string()),
            district: None,
            favorite_theater: None,
        }
    }

    #[tokio::test]
    async fn sign_up_then_sign_in() {
        let auth = service();
        let session = auth.sign_up(sign_up_request("Viewer@Example.com")).await.unwrap();
        assert_eq!(session.user.email, "viewer@example.com");

        let signed_in = auth
            .sign_in(SignInRequest {
                email: "viewer@example.com ".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(signed_in.user, session.user);
        assert_eq!(auth.verify_token(&signed_in.token).unwrap(), session.user);

        let profile = auth.profile(&session.user.uid).await.unwrap().unwrap();
        assert_eq!(profile.name, "Minh Anh");
        assert!(profile.created_at.is_some());
    }

    #[tokio::test]
    async fn duplicate_email_is_mapped() {
        let auth = service();
        auth.sign_up(sign_up_request("a@example.com")).await.unwrap();
        let err = auth.sign_up(sign_up_request("A@example.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::EmailInUse));
        assert_eq!(err.to_string(), "email address is already in use");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email() {
        let auth = service();
        auth.sign_up(sign_up_request("b@example.com")).await.unwrap();

        let wrong = auth
            .sign_in(SignInRequest { email: "b@example.com".into(), password: "nope".into() })
            .await
            .unwrap_err();
        assert!(matches!(wrong, AuthError::InvalidCredentials));

        let unknown = auth
            .sign_in(SignInRequest { email: "c@example.com".into(), password: "secret123".into() })
            .await
            .unwrap_err();
        assert!(matches!(unknown, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn invalid_sign_up_input() {
        let auth = service();
        let mut req = sign_up_request("not-an-email");
        req.password = "123".to_string();
        let err = auth.sign_up(req).await.unwrap_err();
        match err {
            AuthError::Validation(msg) => {
                assert!(msg.contains("invalid email address"));
                assert!(msg.contains("password must be at least 6 characters"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_profile_write_leaves_email_free() {
        let store = Arc::new(FailingProfiles {
            inner: MemoryStore::new(),
            fail: AtomicBool::new(true),
        });
        let auth = AuthService::new(store.clone(), test_auth_config());

        let err = auth.sign_up(sign_up_request("d@example.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::Backend(ref msg) if msg.contains("users down")));
        assert_eq!(store.inner.count(Collection::Accounts).await, 0);

        let sign_in = auth
            .sign_in(SignInRequest { email: "d@example.com".into(), password: "secret123".into() })
            .await
            .unwrap_err();
        assert!(matches!(sign_in, AuthError::InvalidCredentials));

        // Бэкенд ожил: тот же email регистрируется, профиль на месте
        store.fail.store(false, Ordering::SeqCst);
        let session = auth.sign_up(sign_up_request("d@example.com")).await.unwrap();
        let profile = auth.profile(&session.user.uid).await.unwrap();
        assert!(profile.is_some());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let auth = service();
        let user = AuthUser { uid: "u1".into(), email: "u1@example.com".into() };
        let token = auth.issue_token(&user).unwrap();
        assert!(auth.verify_token(&format!("{token}x")).is_err());
        assert!(matches!(auth.verify_token("garbage"), Err(AuthError::InvalidToken)));
    }
}
