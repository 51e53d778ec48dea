//! HS256-style bearer tokens: base64url `header.payload.signature` with an
//! HMAC-SHA256 signature and `{sub, email, exp}` claims.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{ Duration, Utc };
use hmac::{ Hmac, Mac };
use serde::{ Serialize, Deserialize };
use sha2::Sha256;

use crate::auth::AuthError;
use crate::models::user::User;

type HmacSha256 = Hmac<Sha256>;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub email: String,
    /// Expiry as a unix timestamp in seconds.
    pub exp: i64,
}

pub struct TokenService {
    secret: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: impl Into<String>, ttl_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    fn sign(&self, signing_input: &str) -> Vec<u8> {
        // HMAC accepts keys of any length, this cannot fail.
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes()).unwrap();
        mac.update(signing_input.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    pub fn issue(&self, user: &User) -> String {
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        // Claims are plain strings and an integer, serialization cannot fail.
        let payload = serde_json::to_string(&claims).unwrap();

        let head = URL_SAFE_NO_PAD.encode(HEADER);
        let body = URL_SAFE_NO_PAD.encode(payload);
        let signing_input = format!("{}.{}", head, body);
        let sig = URL_SAFE_NO_PAD.encode(self.sign(&signing_input));

        format!("{}.{}", signing_input, sig)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut parts = token.split('.');
        let (head, body, sig) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(b), Some(s), None) => (h, b, s),
            _ => return Err(AuthError::MalformedToken),
        };

        let sig_bytes = URL_SAFE_NO_PAD
            .decode(sig)
            .map_err(|_| AuthError::MalformedToken)?;

        let signing_input = format!("{}.{}", head, body);
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes()).unwrap();
        mac.update(signing_input.as_bytes());
        mac.verify_slice(&sig_bytes).map_err(|_| AuthError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| AuthError::MalformedToken)?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| AuthError::MalformedToken)?;

        if claims.exp < Utc::now().timestamp() {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }
}
