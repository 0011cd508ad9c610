mod auth_session;

pub use auth_session::{AuthSession, auth_error_message};
