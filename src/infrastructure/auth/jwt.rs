//! JWT Service
//!
//! HS256 签名的 access / refresh token；refresh token 只携带 user_id 与 tenant_code。
//! `token_type` 声明区分两种令牌，各自的校验只接受对应类型

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::JwtConfig;

/// JWT 错误
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to generate token: {0}")]
    Encode(String),

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Expected {expected:?} token, got {actual:?}")]
    WrongType { expected: TokenKind, actual: TokenKind },
}

/// 令牌类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// 令牌声明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub role_id: i64,
    pub tenant_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_location: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
    pub token_type: TokenKind,

    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
    pub iss: String,
    pub sub: String,
}

fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// 签发 access token 所需的用户信息
#[derive(Debug, Clone, Default)]
pub struct AccessTokenRequest {
    pub user_id: i64,
    pub name: String,
    pub role_id: i64,
    pub tenant_code: String,
    pub permissions: Vec<String>,
    pub id_location: Option<i64>,
}

/// 登录 / 刷新响应
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub refresh_token: String,
    pub token_type: String,
    /// 剩余有效秒数
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
}

/// JWT 服务
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            access_ttl: Duration::seconds(config.access_ttl_secs),
            refresh_ttl: Duration::seconds(config.refresh_ttl_secs),
        }
    }

    fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::Encode(e.to_string()))
    }

    fn registered(
        &self,
        kind: TokenKind,
        user_id: i64,
        tenant_code: &str,
        ttl: Duration,
    ) -> Claims {
        let now = Utc::now();
        Claims {
            user_id,
            name: String::new(),
            role_id: 0,
            tenant_code: tenant_code.to_string(),
            id_location: None,
            permissions: Vec::new(),
            token_type: kind,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            iss: self.issuer.clone(),
            sub: user_id.to_string(),
        }
    }

    /// 签发 access token，返回令牌与过期时间
    pub fn generate_access_token(
        &self,
        request: AccessTokenRequest,
    ) -> Result<(String, DateTime<Utc>), JwtError> {
        let expires_at = Utc::now() + self.access_ttl;
        let claims = Claims {
            name: request.name,
            role_id: request.role_id,
            id_location: request.id_location,
            permissions: request.permissions,
            exp: expires_at.timestamp(),
            ..self.registered(
                TokenKind::Access,
                request.user_id,
                &request.tenant_code,
                self.access_ttl,
            )
        };

        let token = self.sign(&claims)?;
        Ok((token, expires_at))
    }

    /// 签发 refresh token
    pub fn generate_refresh_token(&self, user_id: i64, tenant_code: &str) -> Result<String, JwtError> {
        let claims = self.registered(TokenKind::Refresh, user_id, tenant_code, self.refresh_ttl);
        self.sign(&claims)
    }

    /// 校验签名、过期、生效时间、签发者与令牌类型
    fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims, JwtError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| JwtError::Invalid(e.to_string()))?;

        if claims.token_type != expected {
            return Err(JwtError::WrongType {
                expected,
                actual: claims.token_type,
            });
        }
        Ok(claims)
    }

    /// 校验 access token
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate(token, TokenKind::Access)
    }

    /// 校验 refresh token
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate(token, TokenKind::Refresh)
    }

    pub fn token_response(
        &self,
        access_token: String,
        refresh_token: String,
        expires_at: DateTime<Utc>,
    ) -> TokenResponse {
        TokenResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: (expires_at - Utc::now()).num_seconds().max(0),
            expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".to_string(),
            issuer: "pos-mojosoft".to_string(),
            ..Default::default()
        }
    }

    fn request() -> AccessTokenRequest {
        AccessTokenRequest {
            user_id: 42,
            name: "Dewi".to_string(),
            role_id: 2,
            tenant_code: "alana".to_string(),
            permissions: vec!["sales_order.read".to_string()],
            id_location: Some(3),
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = JwtService::new(&config());
        let (token, expires_at) = service.generate_access_token(request()).unwrap();

        let claims = service.validate_access_token(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.tenant_code, "alana");
        assert_eq!(claims.id_location, Some(3));
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.exp, expires_at.timestamp());
    }

    #[test]
    fn test_refresh_token_carries_only_identity() {
        let service = JwtService::new(&config());
        let token = service.generate_refresh_token(42, "alana").unwrap();

        let claims = service.validate_refresh_token(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.tenant_code, "alana");
        assert!(claims.permissions.is_empty());
        assert!(claims.name.is_empty());
        assert_eq!(claims.token_type, TokenKind::Refresh);
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let service = JwtService::new(&config());
        let (access, _) = service.generate_access_token(request()).unwrap();
        let refresh = service.generate_refresh_token(42, "alana").unwrap();

        assert!(matches!(
            service.validate_access_token(&refresh),
            Err(JwtError::WrongType { expected: TokenKind::Access, .. })
        ));
        assert!(matches!(
            service.validate_refresh_token(&access),
            Err(JwtError::WrongType { expected: TokenKind::Refresh, .. })
        ));
    }

    #[test]
    fn test_rejects_wrong_secret_and_issuer() {
        let service = JwtService::new(&config());
        let (token, _) = service.generate_access_token(request()).unwrap();

        let other_secret = JwtService::new(&JwtConfig {
            secret: "another-secret".to_string(),
            ..config()
        });
        assert!(other_secret.validate_access_token(&token).is_err());

        let other_issuer = JwtService::new(&JwtConfig {
            issuer: "someone-else".to_string(),
            ..config()
        });
        assert!(other_issuer.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_rejects_expired_token() {
        let service = JwtService::new(&JwtConfig {
            access_ttl_secs: -3600,
            ..config()
        });
        let (token, _) = service.generate_access_token(request()).unwrap();

        assert!(service.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_token_response() {
        let service = JwtService::new(&config());
        let (access, expires_at) = service.generate_access_token(request()).unwrap();
        let refresh = service.generate_refresh_token(42, "alana").unwrap();

        let response = service.token_response(access, refresh, expires_at);
        assert_eq!(response.token_type, "Bearer");
        assert!(response.expires_in > 0 && response.expires_in <= 900);
    }
}
