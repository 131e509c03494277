//! Users and courses
//!
//! Both are opaque to the topic lifecycle: it only asks whether a user
//! exists and is enabled, and whether a course exists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{require_text, ValidationError};
use super::id::{CourseId, UserId};

/// A registered forum user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Registers an enabled user
    pub fn new(id: UserId, username: impl Into<String>) -> Result<Self, ValidationError> {
        let username = username.into();
        require_text("username", &username)?;

        Ok(Self {
            id,
            username,
            enabled: true,
            created_at: Utc::now(),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// Course category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Programming,
    Frontend,
    Backend,
    DataScience,
    Devops,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Programming => write!(f, "programming"),
            Category::Frontend => write!(f, "frontend"),
            Category::Backend => write!(f, "backend"),
            Category::DataScience => write!(f, "data_science"),
            Category::Devops => write!(f, "devops"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "programming" => Ok(Category::Programming),
            "frontend" => Ok(Category::Frontend),
            "backend" => Ok(Category::Backend),
            "data_science" | "data-science" | "datascience" => Ok(Category::DataScience),
            "devops" => Ok(Category::Devops),
            _ => Err(format!("Unknown course category: {}", s)),
        }
    }
}

/// A course topics are filed under
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    #[serde(default)]
    pub category: Category,
    pub active: bool,
}

impl Course {
    pub fn new(
        id: CourseId,
        name: impl Into<String>,
        category: Category,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        require_text("name", &name)?;

        Ok(Self {
            id,
            name,
            category,
            active: true,
        })
    }
}
