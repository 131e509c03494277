//! Project management
//!
//! Handles project initialization and provides access to stores.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{Config, JsonlStore};
use crate::domain::{Answer, Course, Topic, User};
use crate::service::{ForumService, Repositories};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a forum project. Run 'forum init' first.")]
    NotInProject,
}

/// A forum project rooted at a directory containing `.forum/`
pub struct Project {
    root: PathBuf,
    config: Config,
    topics: JsonlStore<Topic>,
    answers: JsonlStore<Answer>,
    users: JsonlStore<User>,
    courses: JsonlStore<Course>,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let forum_dir = root.join(".forum");

        if !forum_dir.is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self {
            topics: JsonlStore::for_project(&root),
            answers: JsonlStore::for_project(&root),
            users: JsonlStore::for_project(&root),
            courses: JsonlStore::for_project(&root),
            root,
            config,
        })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let forum_dir = root.join(".forum");

        fs::create_dir_all(&forum_dir).with_context(|| {
            format!("Failed to create .forum directory: {}", forum_dir.display())
        })?;

        // Create default config
        let config_path = forum_dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# Forum configuration

[topics]
# Allow closed topics to be reopened
allow_reopen = false

[answers]
# Accept plain answers on closed topics (solutions are always refused)
accept_on_closed_topics = true
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .forum directory path
    pub fn forum_dir(&self) -> PathBuf {
        self.root.join(".forum")
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn topic_store(&self) -> &JsonlStore<Topic> {
        &self.topics
    }

    pub fn answer_store(&self) -> &JsonlStore<Answer> {
        &self.answers
    }

    pub fn user_store(&self) -> &JsonlStore<User> {
        &self.users
    }

    pub fn course_store(&self) -> &JsonlStore<Course> {
        &self.courses
    }

    /// Returns a service over this project's stores and policy
    pub fn service(&self) -> ForumService<'_> {
        ForumService::new(
            Repositories {
                topics: &self.topics,
                answers: &self.answers,
                users: &self.users,
                courses: &self.courses,
            },
            self.config.project.policy(),
        )
    }

    /// Compacts every store, returning the number of records kept
    pub fn compact(&self) -> Result<usize> {
        Ok(self.topics.compact()?
            + self.answers.compact()?
            + self.users.compact()?
            + self.courses.compact()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.forum_dir().is_dir());
        assert!(project.forum_dir().join("config.toml").is_file());
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Project::init(dir.path()).unwrap();
        Project::init(dir.path()).unwrap(); // Should not fail

        assert!(dir.path().join(".forum").is_dir());
    }

    #[test]
    fn default_config_matches_default_policy() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert_eq!(
            project.config().project.policy(),
            crate::domain::TopicPolicy::default()
        );
    }

    #[test]
    fn open_non_project_fails() {
        let dir = TempDir::new().unwrap();
        let result = Project::open(dir.path());

        assert!(result.is_err());
    }

    #[test]
    fn stores_are_accessible() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.topic_store().path().ends_with("topics.jsonl"));
        assert!(project.answer_store().path().ends_with("answers.jsonl"));
        assert!(project.user_store().path().ends_with("users.jsonl"));
        assert!(project.course_store().path().ends_with("courses.jsonl"));
    }
}
