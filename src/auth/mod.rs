mod cookie;
mod log_in;
mod log_out;
mod me;
mod middleware;
mod password;
mod register;
mod session_state;
mod token;
mod user;

pub use cookie::{DEFAULT_COOKIE_DURATION, invalidate_auth_cookie, set_auth_cookie};
pub use log_in::post_log_in;
pub use log_out::post_log_out;
pub use me::get_current_user;
pub use middleware::{AuthState, auth_guard};
pub use password::{PasswordHash, ValidatedPassword};
pub use register::register_user;
pub use session_state::SessionState;
pub(crate) use token::Token;
pub use user::{NewUser, User, UserID, create_user, create_user_table, get_user_by_email, get_user_by_id};

#[cfg(test)]
pub use cookie::COOKIE_TOKEN;
