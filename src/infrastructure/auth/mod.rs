//! Authentication - JWT 签发与校验

mod jwt;

pub use jwt::{AccessTokenRequest, Claims, JwtError, JwtService, TokenKind, TokenResponse};
