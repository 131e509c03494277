//! Main CLI application structure

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{answer, course, topic, user};
use crate::error::ForumError;
use crate::storage::{Config, Project};

/// Exit code for requests refused by a business rule
const REJECTED: u8 = 2;

#[derive(Parser)]
#[command(name = "forum")]
#[command(author, version, about = "Course discussion forum with topics and answers")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new forum project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Manage users
    #[command(subcommand)]
    User(user::UserCommands),

    /// Manage courses
    #[command(subcommand)]
    Course(course::CourseCommands),

    /// Manage topics
    #[command(subcommand)]
    Topic(topic::TopicCommands),

    /// Manage answers
    #[command(subcommand)]
    Answer(answer::AnswerCommands),

    /// Rewrite the data files, dropping superseded lines
    Compact,
}

/// Main entry point for the CLI
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load()?;
    let format = cli.format.unwrap_or(config.global.default_format);
    let output = Output::new(format, cli.verbose);

    let result = match cli.command {
        Commands::Init { path } => init(&output, &path),
        Commands::User(cmd) => user::run(cmd, &output),
        Commands::Course(cmd) => course::run(cmd, &output),
        Commands::Topic(cmd) => topic::run(cmd, &output, &config),
        Commands::Answer(cmd) => answer::run(cmd, &output, &config),
        Commands::Compact => compact(&output),
    };

    match result {
        Ok(()) => {
            output.verbose_ctx("forum", "Command completed successfully");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => match err.downcast_ref::<ForumError>() {
            Some(forum_err) if forum_err.is_rejection() => {
                output.rejection(&forum_err.to_string());
                Ok(ExitCode::from(REJECTED))
            }
            _ => Err(err),
        },
    }
}

/// Installs the stderr log subscriber; `RUST_LOG` overrides the level
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    // A second init (e.g. in-process tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn init(output: &Output, path: &str) -> Result<()> {
    output.verbose_ctx("init", &format!("Initializing project at: {}", path));
    let project = Project::init(path)?;
    output.verbose_ctx(
        "init",
        &format!("Created .forum directory at: {}", project.forum_dir().display()),
    );
    output.success(&format!(
        "Initialized forum project at {}",
        project.root().display()
    ));
    Ok(())
}

fn compact(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let kept = project.compact()?;
    output.success(&format!("Compacted data files ({} records kept)", kept));
    Ok(())
}
