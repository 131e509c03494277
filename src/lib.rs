//! Forum CLI - course discussion topics with answers and accepted solutions
//!
//! Topics move through a small lifecycle (open, closed, deleted). Every
//! request that creates or edits a topic or answer passes through a chain
//! of business rules before anything is written.

pub mod domain;
pub mod error;
pub mod validation;
pub mod service;
pub mod storage;
pub mod cli;

pub use domain::{Answer, AnswerId, Topic, TopicId, TopicPolicy, TopicState};
pub use error::{ForumError, ForumResult};
pub use service::{ForumService, Repositories};
