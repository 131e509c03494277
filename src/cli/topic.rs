//! Topic CLI commands

use anyhow::Result;
use chrono::Datelike;
use clap::Subcommand;

use super::output::Output;
use crate::domain::{CourseId, NewTopic, Topic, TopicId, TopicState, TopicUpdate, UserId};
use crate::storage::{Config, Project};

#[derive(Subcommand)]
pub enum TopicCommands {
    /// Open a new topic
    ///
    /// Example:
    ///   forum topic new "Why does X fail" --message "It fails on every run" --course c-1
    New {
        /// Topic title
        title: String,

        /// Topic body
        #[arg(long, short)]
        message: String,

        /// Course the topic is filed under
        #[arg(long, short)]
        course: CourseId,

        /// Year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,

        /// Author (falls back to `user` in the global config)
        #[arg(long, short, env = "FORUM_USER")]
        user: Option<UserId>,
    },

    /// List topics
    List {
        /// Only show topics in this state
        #[arg(long, short)]
        state: Option<TopicState>,

        /// Include deleted topics
        #[arg(long)]
        all: bool,
    },

    /// Show a topic with its answers
    Show {
        /// Topic ID
        id: TopicId,
    },

    /// Edit a topic's title, message or course
    Edit {
        /// Topic ID
        id: TopicId,

        #[arg(long, short)]
        title: Option<String>,

        #[arg(long, short)]
        message: Option<String>,

        #[arg(long, short)]
        course: Option<CourseId>,
    },

    /// Close a topic; it stops accepting solutions
    Close {
        /// Topic ID
        id: TopicId,
    },

    /// Reopen a closed topic (requires `allow_reopen`)
    Reopen {
        /// Topic ID
        id: TopicId,
    },

    /// Soft-delete a topic
    Delete {
        /// Topic ID
        id: TopicId,
    },
}

pub fn run(cmd: TopicCommands, output: &Output, config: &Config) -> Result<()> {
    match cmd {
        TopicCommands::New {
            title,
            message,
            course,
            year,
            user,
        } => {
            let request = NewTopic {
                title,
                message,
                year: year.unwrap_or_else(|| chrono::Utc::now().year()),
                user_id: resolve_user(user, config)?,
                course_id: course,
            };
            new_topic(output, request)
        }
        TopicCommands::List { state, all } => list_topics(output, state, all),
        TopicCommands::Show { id } => show_topic(output, id),
        TopicCommands::Edit {
            id,
            title,
            message,
            course,
        } => {
            let update = TopicUpdate {
                title,
                message,
                course_id: course,
            };
            edit_topic(output, id, update)
        }
        TopicCommands::Close { id } => change_state(output, id, TopicState::Closed),
        TopicCommands::Reopen { id } => change_state(output, id, TopicState::Open),
        TopicCommands::Delete { id } => change_state(output, id, TopicState::Deleted),
    }
}

/// Picks the acting user from `--user`/`FORUM_USER` or the global config
pub(super) fn resolve_user(flag: Option<UserId>, config: &Config) -> Result<UserId> {
    flag.or(config.global.user)
        .ok_or_else(|| anyhow::anyhow!("No user given. Pass --user or set FORUM_USER."))
}

fn new_topic(output: &Output, request: NewTopic) -> Result<()> {
    let project = Project::open_current()?;
    output.verbose_ctx(
        "topic",
        &format!("Opening topic as {} in {}", request.user_id, request.course_id),
    );
    let topic = project.service().create_topic(request)?;

    if output.is_json() {
        output.data(&topic);
    } else {
        output.success(&format!("Created topic: {} - {}", topic.id, topic.title));
    }

    Ok(())
}

fn list_topics(output: &Output, state: Option<TopicState>, all: bool) -> Result<()> {
    let project = Project::open_current()?;
    let topics: Vec<Topic> = project
        .service()
        .topics()?
        .into_iter()
        .filter(|t| match state {
            Some(state) => t.state == state,
            None => all || !t.is_deleted(),
        })
        .collect();

    if output.is_json() {
        output.data(&topics);
    } else if topics.is_empty() {
        println!("No topics");
    } else {
        println!("{:<10} {:<10} {:<8} TITLE", "ID", "STATE", "COURSE");
        println!("{}", "-".repeat(60));

        for topic in &topics {
            println!(
                "{:<10} {:<10} {:<8} {}",
                topic.id.to_string(),
                topic.state.to_string(),
                topic.course_id.to_string(),
                topic.title
            );
        }
    }

    Ok(())
}

fn show_topic(output: &Output, id: TopicId) -> Result<()> {
    let project = Project::open_current()?;
    let service = project.service();
    let topic = service.topic(id)?;
    let answers = service.answers_for(id)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "topic": topic,
            "answers": answers,
        }));
        return Ok(());
    }

    println!("Topic: {}", topic.id);
    println!("Title: {}", topic.title);
    println!("State: {}", topic.state);
    println!("Course: {}", topic.course_id);
    println!("Author: {}", topic.user_id);
    println!("Year: {}", topic.year);
    println!("Created: {}", topic.created_at.format("%Y-%m-%d %H:%M"));
    println!("Updated: {}", topic.updated_at.format("%Y-%m-%d %H:%M"));
    println!();
    println!("{}", topic.message);

    let live: Vec<_> = answers.iter().filter(|a| !a.is_deleted).collect();
    if !live.is_empty() {
        println!();
        println!("Answers ({}):", live.len());
        for answer in live {
            let marker = if answer.is_solution { " [solution]" } else { "" };
            println!("  {} by {}{}", answer.id, answer.user_id, marker);
            println!("    {}", answer.message);
        }
    }

    Ok(())
}

fn edit_topic(output: &Output, id: TopicId, update: TopicUpdate) -> Result<()> {
    let project = Project::open_current()?;
    if update.is_empty() {
        output.verbose_ctx("topic", "No fields given; only the timestamp moves");
    }
    let topic = project.service().update_topic(id, update)?;

    if output.is_json() {
        output.data(&topic);
    } else {
        output.success(&format!("Updated topic: {}", topic.id));
    }

    Ok(())
}

fn change_state(output: &Output, id: TopicId, state: TopicState) -> Result<()> {
    let project = Project::open_current()?;
    let topic = project.service().change_topic_state(id, state)?;

    if output.is_json() {
        output.data(&topic);
    } else {
        output.success(&format!("Topic {} is now {}", topic.id, topic.state));
    }

    Ok(())
}
