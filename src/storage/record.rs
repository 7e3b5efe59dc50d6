use crate::auth::UserId;
use crate::storage::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest name a cookie stand may carry, in characters
pub const NAME_MAX_LEN: usize = 256;

/// A reviewed cookie stand as held by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieStand {
    pub id: u64,
    pub name: String,
    pub rating: i32,
    pub description: String,
    pub reviewer: UserId,
}

impl fmt::Display for CookieStand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Fields supplied when creating or replacing a cookie stand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCookieStand {
    pub reviewer: UserId,
    pub name: String,
    pub description: String,
    pub rating: i32,
}

impl NewCookieStand {
    /// New record with the default rating
    pub fn new(reviewer: UserId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            reviewer,
            name: name.into(),
            description: description.into(),
            rating: 0,
        }
    }

    pub fn with_rating(mut self, rating: i32) -> Self {
        self.rating = rating;
        self
    }

    /// Validate required fields
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.name.trim().is_empty() {
            return Err(StoreError::Validation("Name cannot be empty".to_string()));
        }
        if self.name.chars().count() > NAME_MAX_LEN {
            return Err(StoreError::Validation(format!(
                "Name cannot be longer than {} characters",
                NAME_MAX_LEN
            )));
        }
        if self.description.trim().is_empty() {
            return Err(StoreError::Validation(
                "Description cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn into_record(self, id: u64) -> CookieStand {
        CookieStand {
            id,
            name: self.name,
            rating: self.rating,
            description: self.description,
            reviewer: self.reviewer,
        }
    }
}
