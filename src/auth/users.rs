//! Configured chat users allowed to log in.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::auth::UserRole;

/// User account from the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfiguredUser {
    pub id: String,
    pub username: String,
    /// Password hash (SHA256 hex).
    pub password_hash: String,
    #[serde(default = "default_role")]
    pub role: UserRole,
}

fn default_role() -> UserRole {
    UserRole::User
}

impl ConfiguredUser {
    /// Verify a password against the stored hash.
    pub fn verify_password(&self, password: &str) -> bool {
        let Ok(expected) = hex::decode(self.password_hash.trim()) else {
            tracing::warn!(user_id = %self.id, "Stored password hash is not valid hex");
            return false;
        };
        let actual = Sha256::digest(password.as_bytes());
        actual.as_slice().ct_eq(&expected).into()
    }
}

pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// In-memory user store keyed by username. Read-only after startup.
#[derive(Clone)]
pub struct UserStore {
    users: Arc<HashMap<String, ConfiguredUser>>,
}

impl UserStore {
    pub fn new(users: Vec<ConfiguredUser>) -> Self {
        let users = users
            .into_iter()
            .map(|u| (u.username.clone(), u))
            .collect();
        Self {
            users: Arc::new(users),
        }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn find_by_username(&self, username: &str) -> Option<&ConfiguredUser> {
        self.users.get(username)
    }

    /// Authenticate a user with username and password.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&ConfiguredUser> {
        self.find_by_username(username)
            .filter(|user| user.verify_password(password))
    }
}
