//! Root of the `taskpad-core` library.

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output goes through the CLI or the tracing stack.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod config;
pub mod dashboard;
pub mod default_client;
pub mod embedding;
pub mod error;
pub mod functions;
pub mod models;
pub mod object_store;
pub mod profile;
pub mod rest;
pub mod services;
pub mod session;
pub mod subtasks;
pub mod tasks;

pub use config::BackendConfig;
pub use config::Config;
pub use config::ConfigError;
pub use config::ConfigLoader;
pub use dashboard::Dashboard;
pub use dashboard::SearchState;
pub use error::Result;
pub use error::TaskpadError;
pub use functions::Augmentation;
pub use models::Priority;
pub use models::Profile;
pub use models::SearchResult;
pub use models::Session;
pub use models::Subtask;
pub use models::Task;
pub use models::TaskStatus;
pub use models::User;
pub use services::Services;
pub use session::GateDecision;
pub use session::Route;
pub use session::SessionGate;
pub use session::SessionProvider;
pub use subtasks::SubtaskRepository;
pub use tasks::TaskRepository;
