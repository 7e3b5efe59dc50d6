use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

pub type UserId = u64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserError {
    #[error("Username cannot be empty")]
    EmptyUsername,

    #[error("Username {0:?} is already taken")]
    DuplicateUsername(String),
}

/// Salted SHA-256 password digest
#[derive(Clone, PartialEq, Eq)]
struct PasswordHash {
    salt: String,
    digest: [u8; 32],
}

impl PasswordHash {
    fn new(password: &str) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        let digest = Self::digest(&salt, password);
        Self { salt, digest }
    }

    fn digest(salt: &str, password: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(b":");
        hasher.update(password.as_bytes());
        hasher.finalize().into()
    }

    fn verify(&self, password: &str) -> bool {
        let candidate = Self::digest(&self.salt, password);
        // constant time over the full digest
        candidate
            .iter()
            .zip(self.digest.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha256${}${}", self.salt, hex::encode(self.digest))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    password: PasswordHash,
}

impl User {
    pub fn check_password(&self, password: &str) -> bool {
        self.password.verify(password)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

/// Known users, immutable once the server is running
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user. Ids are handed out in registration order from 1.
    pub fn add(&mut self, username: &str, password: &str) -> Result<UserId, UserError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(UserError::EmptyUsername);
        }
        if self.find(username).is_some() {
            return Err(UserError::DuplicateUsername(username.to_string()));
        }

        let id = self.users.len() as UserId + 1;
        self.users.push(User {
            id,
            username: username.to_string(),
            password: PasswordHash::new(password),
        });
        Ok(id)
    }

    pub fn get(&self, id: UserId) -> Option<&User> {
        id.checked_sub(1)
            .and_then(|idx| self.users.get(idx as usize))
    }

    pub fn find(&self, username: &str) -> Option<&User> {
        self.users.iter().find(|u| u.username == username)
    }

    /// Look up a user by credentials
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&User> {
        self.find(username).filter(|u| u.check_password(password))
    }

    pub fn username_of(&self, id: UserId) -> Option<&str> {
        self.get(id).map(|u| u.username.as_str())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
