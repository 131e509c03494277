//! Answer CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use super::topic::resolve_user;
use crate::domain::{AnswerId, AnswerUpdate, NewAnswer, TopicId, UserId};
use crate::storage::{Config, Project};

#[derive(Subcommand)]
pub enum AnswerCommands {
    /// Post an answer to a topic
    ///
    /// Example:
    ///   forum answer add t-1 "Try Y" --user u-2
    Add {
        /// Topic ID
        topic: TopicId,

        /// Answer text
        message: String,

        /// Author (falls back to `user` in the global config)
        #[arg(long, short, env = "FORUM_USER")]
        user: Option<UserId>,
    },

    /// Edit an answer or mark it as the solution
    Edit {
        /// Answer ID
        id: AnswerId,

        #[arg(long, short)]
        message: Option<String>,

        /// Mark (true) or unmark (false) as the topic's solution
        #[arg(long, short)]
        solution: Option<bool>,
    },

    /// Soft-delete an answer
    Delete {
        /// Answer ID
        id: AnswerId,
    },
}

pub fn run(cmd: AnswerCommands, output: &Output, config: &Config) -> Result<()> {
    match cmd {
        AnswerCommands::Add {
            topic,
            message,
            user,
        } => {
            let request = NewAnswer {
                message,
                user_id: resolve_user(user, config)?,
                topic_id: topic,
            };
            add_answer(output, request)
        }
        AnswerCommands::Edit {
            id,
            message,
            solution,
        } => {
            let update = AnswerUpdate {
                message,
                is_solution: solution,
            };
            edit_answer(output, id, update)
        }
        AnswerCommands::Delete { id } => delete_answer(output, id),
    }
}

fn add_answer(output: &Output, request: NewAnswer) -> Result<()> {
    let project = Project::open_current()?;
    output.verbose_ctx(
        "answer",
        &format!("Posting to {} as {}", request.topic_id, request.user_id),
    );
    let answer = project.service().create_answer(request)?;

    if output.is_json() {
        output.data(&answer);
    } else {
        output.success(&format!(
            "Created answer: {} on {}",
            answer.id, answer.topic_id
        ));
    }

    Ok(())
}

fn edit_answer(output: &Output, id: AnswerId, update: AnswerUpdate) -> Result<()> {
    let project = Project::open_current()?;
    let answer = project.service().update_answer(id, update)?;

    if output.is_json() {
        output.data(&answer);
    } else if answer.is_solution {
        output.success(&format!("Updated answer: {} (solution)", answer.id));
    } else {
        output.success(&format!("Updated answer: {}", answer.id));
    }

    Ok(())
}

fn delete_answer(output: &Output, id: AnswerId) -> Result<()> {
    let project = Project::open_current()?;
    let answer = project.service().delete_answer(id)?;

    if output.is_json() {
        output.data(&answer);
    } else {
        output.success(&format!("Deleted answer: {}", answer.id));
    }

    Ok(())
}
