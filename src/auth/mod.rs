//! User accounts, session tokens and the bearer token guard for protected routes.

mod email;
mod log_in;
mod middleware;
mod password;
mod profile;
mod register_user;
mod token;
mod user;

pub use email::Email;
pub use log_in::post_log_in;
pub use middleware::auth_guard;
pub use password::{PasswordHash, ValidatedPassword};
pub use profile::{get_profile, post_refresh_token};
pub use register_user::register_user;
pub use token::{Claims, Identity, SessionKeys, TokenError, issue_token, verify_token};
pub use user::{User, UserID, create_user_table};
