//! Password sign-in against the hosted auth service and the on-disk session
//! that keeps a user signed in between runs.

mod auth_client;
mod manager;
mod session_storage;

pub use auth_client::AuthClient;
pub use auth_client::LoginError;
pub use manager::REFRESH_SKEW_SECS;
pub use manager::SessionManager;
pub use session_storage::SESSION_FILE;
pub use session_storage::SessionStorage;
pub use session_storage::StorageError;
