//! Mocked authentication: an injected user repository plus HMAC-signed
//! session tokens. Demo-grade by design; passwords are stored as unsalted
//! SHA-256 digests and the default signing secret is a development constant.

pub mod token;

use async_trait::async_trait;
use sha2::{ Digest, Sha256 };
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::user::User;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("User already exists")]
    UserExists,
    #[error("Password must be at least {0} characters")]
    WeakPassword(usize),
    #[error("Malformed token")]
    MalformedToken,
    #[error("Invalid token signature")]
    BadSignature,
    #[error("Token expired")]
    Expired,
}

/// Storage-agnostic user repository, so handlers never touch global state.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Option<User>;

    async fn insert(&self, user: User, password: &str) -> Result<User, AuthError>;

    async fn verify_password(&self, email: &str, password: &str) -> Result<User, AuthError>;
}

fn digest_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

struct Inner {
    users: Vec<User>,
    passwords: HashMap<String, String>,
}

/// In-memory store seeded with the demo accounts.
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        let mut inner = Inner {
            users: Vec::new(),
            passwords: HashMap::new(),
        };

        for (id, email, name, password) in [
            ("demo-user-1", "demo@zerocode.com", "Demo User", "demo123"),
            ("user-2", "test@example.com", "Test User", "password123"),
        ] {
            inner.users.push(User::seeded(id, email, name));
            inner.passwords.insert(email.to_string(), digest_password(password));
        }

        Self {
            inner: Mutex::new(inner),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Option<User> {
        let inner = self.inner.lock().await;
        inner.users.iter().find(|u| u.email == email).cloned()
    }

    async fn insert(&self, user: User, password: &str) -> Result<User, AuthError> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword(MIN_PASSWORD_LEN));
        }
        let mut inner = self.inner.lock().await;
        if inner.users.iter().any(|u| u.email == user.email) {
            return Err(AuthError::UserExists);
        }
        inner.passwords.insert(user.email.clone(), digest_password(password));
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn verify_password(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let inner = self.inner.lock().await;
        // Same error for unknown user and wrong password; nothing leaks.
        let user = inner
            .users
            .iter()
            .find(|u| u.email == email)
            .ok_or(AuthError::InvalidCredentials)?;
        let stored = inner
            .passwords
            .get(email)
            .ok_or(AuthError::InvalidCredentials)?;
        if *stored == digest_password(password) {
            Ok(user.clone())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}
