pub mod extract;
pub mod sessions;
pub mod users;

pub use extract::{CurrentUser, LoginRequired, SESSION_COOKIE, session_token, wants_json};
pub use sessions::SessionStore;
pub use users::{User, UserDirectory, UserError, UserId};
