//! User CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::UserId;
use crate::storage::Project;

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a user
    Add {
        /// Username
        username: String,
    },

    /// List users
    List,

    /// Allow a user to post
    Enable {
        /// User ID
        id: UserId,
    },

    /// Stop a user from posting
    Disable {
        /// User ID
        id: UserId,
    },
}

pub fn run(cmd: UserCommands, output: &Output) -> Result<()> {
    match cmd {
        UserCommands::Add { username } => add_user(output, &username),
        UserCommands::List => list_users(output),
        UserCommands::Enable { id } => set_enabled(output, id, true),
        UserCommands::Disable { id } => set_enabled(output, id, false),
    }
}

fn add_user(output: &Output, username: &str) -> Result<()> {
    let project = Project::open_current()?;
    let user = project.service().register_user(username)?;

    if output.is_json() {
        output.data(&user);
    } else {
        output.success(&format!("Created user: {} - {}", user.id, user.username));
    }

    Ok(())
}

fn list_users(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let users = project.service().users()?;

    if output.is_json() {
        output.data(&users);
    } else if users.is_empty() {
        println!("No users");
    } else {
        println!("{:<10} {:<10} USERNAME", "ID", "ENABLED");
        println!("{}", "-".repeat(40));

        for user in &users {
            let enabled = if user.enabled { "yes" } else { "no" };
            println!("{:<10} {:<10} {}", user.id.to_string(), enabled, user.username);
        }
    }

    Ok(())
}

fn set_enabled(output: &Output, id: UserId, enabled: bool) -> Result<()> {
    let project = Project::open_current()?;
    let user = project.service().set_user_enabled(id, enabled)?;
    output.verbose_ctx("user", &format!("{} enabled={}", user.id, user.enabled));

    if output.is_json() {
        output.data(&user);
    } else {
        let verb = if enabled { "Enabled" } else { "Disabled" };
        output.success(&format!("{} user: {}", verb, user.id));
    }

    Ok(())
}
