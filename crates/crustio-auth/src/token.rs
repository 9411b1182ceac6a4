use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const JWT_HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("signature does not match")]
    SignatureDoesNotMatch,
    #[error("token expired")]
    Expired,
    #[error("invalid claims: {0}")]
    InvalidClaims(String),
}

pub type Result<T> = std::result::Result<T, TokenError>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleClaim {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<RoleClaim>,
    pub iat: i64,
    pub exp: i64,
}

/// Mints and verifies HS256 JWTs with a single shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Vec<u8>,
    ttl_seconds: i64,
}

impl TokenCodec {
    pub fn new(secret: impl Into<Vec<u8>>, ttl_seconds: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_seconds,
        }
    }

    pub fn issue(
        &self,
        user_id: &str,
        name: &str,
        email: &str,
        roles: Vec<RoleClaim>,
    ) -> Result<String> {
        let issued_at = crustio_common::time::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            roles,
            iat: issued_at,
            exp: issued_at + self.ttl_seconds,
        };
        self.encode(&claims)
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let expected = self.sign(header, payload);
        if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
            return Err(TokenError::SignatureDoesNotMatch);
        }

        let payload = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&payload)
            .map_err(|err| TokenError::InvalidClaims(err.to_string()))?;

        if claims.exp <= crustio_common::time::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn encode(&self, claims: &Claims) -> Result<String> {
        let payload = serde_json::to_vec(claims)
            .map_err(|err| TokenError::InvalidClaims(err.to_string()))?;
        let header = URL_SAFE_NO_PAD.encode(JWT_HEADER.as_bytes());
        let payload = URL_SAFE_NO_PAD.encode(payload);
        let signature = self.sign(&header, &payload);
        Ok(format!("{header}.{payload}.{signature}"))
    }

    fn sign(&self, header: &str, payload: &str) -> String {
        URL_SAFE_NO_PAD.encode(hmac_sha256(
            &self.secret,
            format!("{header}.{payload}").as_bytes(),
        ))
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = match HmacSha256::new_from_slice(key) {
        Ok(mac) => mac,
        Err(_) => return Vec::new(),
    };
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let mut diff = a.len() ^ b.len();
    let max_len = a.len().max(b.len());

    for i in 0..max_len {
        let left = *a.get(i).unwrap_or(&0);
        let right = *b.get(i).unwrap_or(&0);
        diff |= usize::from(left ^ right);
    }

    diff == 0
}
