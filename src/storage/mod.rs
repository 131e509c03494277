//! # Storage Layer
//!
//! Repository adapters and project configuration.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Topics | JSONL (one JSON per line) | `.forum/topics.jsonl` |
//! | Answers | JSONL | `.forum/answers.jsonl` |
//! | Users | JSONL | `.forum/users.jsonl` |
//! | Courses | JSONL | `.forum/courses.jsonl` |
//! | Config | TOML | `.forum/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`JsonlStore`] uses file locking (`fs2`) for concurrent access
//! - Rewrites are atomic (temp file + rename)
//! - Nothing above a single file write is isolated; two processes editing
//!   the same topic race, last write wins
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point for accessing a forum project
//! - [`JsonlStore`] - Read/write one record type as JSONL
//! - [`MemoryStore`] - In-memory repositories for tests and embedding
//! - [`Config`] - Project and global configuration

mod jsonl;
mod memory;
mod config;
mod project;

pub use jsonl::{JsonlStore, Record};
pub use memory::MemoryStore;
pub use config::{AnswersConfig, Config, ConfigError, GlobalConfig, ProjectConfig, TopicsConfig};
pub use project::{Project, ProjectError};
