//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Project management | `init`, `compact` |
//! | User | Forum members | `user add`, `user disable` |
//! | Course | Where topics are filed | `course add`, `course list` |
//! | Topic | Topic lifecycle | `topic new`, `topic close`, `topic delete` |
//! | Answer | Replies and solutions | `answer add`, `answer edit --solution true` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Exit Codes
//!
//! `0` on success, `2` when a business rule refuses the request, `1` for
//! anything else (missing project, unreadable files).
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output, including which rule
//! rejected a request:
//! ```bash
//! forum --verbose answer add t-1 "Try Y" --user u-2
//! ```

mod app;
mod output;
mod user;
mod course;
mod topic;
mod answer;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
