//! Page view-models. Each struct is the whole context one template sees.

use crate::auth::{UserDirectory, UserId};
use crate::storage::CookieStand;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewerView {
    pub id: UserId,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieStandView {
    pub id: u64,
    pub name: String,
    pub rating: i32,
    pub description: String,
    pub reviewer: ReviewerView,
}

impl CookieStandView {
    pub fn new(record: CookieStand, users: &UserDirectory) -> Self {
        let username = users
            .username_of(record.reviewer)
            .unwrap_or("unknown")
            .to_string();
        Self {
            id: record.id,
            name: record.name,
            rating: record.rating,
            description: record.description,
            reviewer: ReviewerView {
                id: record.reviewer,
                username,
            },
        }
    }
}

/// Context of `cookie_stands/thing_list.html`
#[derive(Debug, Clone)]
pub struct CookieStandListPage {
    pub object_list: Vec<CookieStandView>,
}

impl CookieStandListPage {
    pub fn new(records: Vec<CookieStand>, users: &UserDirectory) -> Self {
        Self {
            object_list: records
                .into_iter()
                .map(|r| CookieStandView::new(r, users))
                .collect(),
        }
    }
}

/// Context of `cookie_stands/thing_detail.html`
#[derive(Debug, Clone)]
pub struct CookieStandDetailPage {
    pub cookie_stand: CookieStandView,
}

/// Context of `registration/login.html`
#[derive(Debug, Clone, Default)]
pub struct LoginPage {
    pub next: String,
    pub username: String,
    pub error: Option<String>,
}
