use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use argon2::{
    password_hash::{Error as PasswordHashError, PasswordHash, PasswordVerifier, SaltString},
    Argon2, PasswordHasher,
};
use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use taxdesk_core::users::{normalize_email, NewUser, RegisterUser};

use crate::api::ApiJson;
use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::main_lib::AppState;
use crate::models::{Credentials, RegisterResponse, TokenResponse};

pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

#[derive(Debug)]
pub enum AuthError {
    Unauthorized,
    InvalidCredentials,
    Internal(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
    iat: usize,
}

/// Identity of the caller, inserted into request extensions by [`require_jwt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

impl AuthManager {
    pub fn new(jwt_secret: &[u8], token_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret),
            decoding_key: DecodingKey::from_secret(jwt_secret),
            validation,
            token_ttl,
        }
    }

    pub fn issue_token(&self, user_id: &str) -> Result<String, AuthError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| AuthError::Internal("System clock is before UNIX_EPOCH".into()))?;
        let exp = now + self.token_ttl;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.as_secs() as usize,
            exp: exp.as_secs() as usize,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Returns the user id carried by a valid token.
    pub fn validate_token(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|err| {
            match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature
                | jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm
                | jsonwebtoken::errors::ErrorKind::Base64(_)
                | jsonwebtoken::errors::ErrorKind::Json(_)
                | jsonwebtoken::errors::ErrorKind::Utf8(_)
                | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_) => {
                    AuthError::Unauthorized
                }
                other => AuthError::Internal(format!("Failed to validate token: {other:?}")),
            }
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::Unauthorized);
        }
        Ok(data.claims.sub)
    }

    pub fn expires_in(&self) -> Duration {
        self.token_ttl
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AuthError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid email or password".to_string(),
            ),
            AuthError::Internal(msg) => {
                tracing::error!("Authentication failure: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message,
        });
        (status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized => ApiError::Unauthorized("Unauthorized".into()),
            AuthError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".into())
            }
            AuthError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

pub fn decode_secret_key(raw: &str) -> anyhow::Result<Vec<u8>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        anyhow::bail!("JWT secret cannot be empty");
    }
    let decoded = match BASE64.decode(trimmed) {
        Ok(bytes) => bytes,
        Err(_) if trimmed.len() == 32 => trimmed.as_bytes().to_vec(),
        Err(_) => {
            anyhow::bail!("JWT secret must be base64 encoded or a 32-byte ASCII string")
        }
    };

    if decoded.len() != 32 {
        anyhow::bail!("JWT secret must decode to exactly 32 bytes");
    }

    Ok(decoded)
}

async fn hash_password(password: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ApiError::Internal(format!("Failed to hash password: {e}")))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Password hashing task failed: {e}")))?
}

async fn verify_password(password: String, password_hash: String) -> Result<(), AuthError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&password_hash)
            .map_err(|e| AuthError::Internal(format!("Stored password hash is invalid: {e}")))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|err| match err {
                PasswordHashError::Password => AuthError::InvalidCredentials,
                other => AuthError::Internal(format!("Password verification failed: {other}")),
            })
    })
    .await
    .map_err(|e| AuthError::Internal(format!("Password verification task failed: {e}")))?
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = Credentials,
    responses(
        (status = 201, body = RegisterResponse),
        (status = 400, body = ErrorBody),
        (status = 409, body = ErrorBody)
    )
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<Credentials>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let registration = RegisterUser::from(payload);
    let email = registration.validate()?;
    let password_hash = hash_password(registration.password).await?;

    let user = state
        .user_repository
        .create_with_profile(NewUser {
            email,
            password_hash,
        })
        .await?;
    tracing::info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.id,
            email: user.email,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = Credentials,
    responses((status = 200, body = TokenResponse), (status = 401, body = ErrorBody))
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<Credentials>,
) -> Result<Json<TokenResponse>, AuthError> {
    let email = normalize_email(&payload.email).map_err(|_| AuthError::InvalidCredentials)?;
    let user = state
        .user_repository
        .find_by_email(&email)
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .ok_or(AuthError::InvalidCredentials)?;

    verify_password(payload.password, user.password_hash).await?;
    let token = state.auth.issue_token(&user.id)?;
    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "Bearer".to_string(),
        expires_in: state.auth.expires_in().as_secs(),
    }))
}

pub async fn require_jwt(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or(AuthError::Unauthorized)?;

    let mut parts = header.splitn(2, ' ');
    let (Some(scheme), Some(token)) = (parts.next(), parts.next()) else {
        return Err(AuthError::Unauthorized);
    };

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::Unauthorized);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::Unauthorized);
    }

    let user_id = state.auth.validate_token(token)?;
    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(ttl: Duration) -> AuthManager {
        AuthManager::new(&[7u8; 32], ttl)
    }

    #[test]
    fn token_round_trips_user_id() {
        let auth = manager(Duration::from_secs(60));
        let token = auth.issue_token("user-1").unwrap();
        assert_eq!(auth.validate_token(&token).unwrap(), "user-1");
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let token = AuthManager::new(&[1u8; 32], Duration::from_secs(60))
            .issue_token("user-1")
            .unwrap();
        assert!(matches!(
            manager(Duration::from_secs(60)).validate_token(&token),
            Err(AuthError::Unauthorized)
        ));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            manager(Duration::from_secs(60)).validate_token("not.a.jwt"),
            Err(AuthError::Unauthorized)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = manager(Duration::from_secs(60));
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as usize;
        let claims = Claims {
            sub: "user-1".into(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&[7u8; 32]),
        )
        .unwrap();
        assert!(matches!(
            auth.validate_token(&token),
            Err(AuthError::Unauthorized)
        ));
    }

    #[test]
    fn secret_key_must_be_32_bytes() {
        assert!(decode_secret_key(&BASE64.encode([0u8; 32])).is_ok());
        assert!(decode_secret_key("0123456789abcdef0123456789abcde!").is_ok());
        assert!(decode_secret_key(&BASE64.encode([0u8; 16])).is_err());
        assert!(decode_secret_key("  ").is_err());
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let hash = hash_password("correct horse".into()).await.unwrap();
        assert!(verify_password("correct horse".into(), hash.clone())
            .await
            .is_ok());
        assert!(matches!(
            verify_password("wrong horse".into(), hash).await,
            Err(AuthError::InvalidCredentials)
        ));
    }
}
