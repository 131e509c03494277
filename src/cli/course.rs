//! Course CLI commands

use anyhow::Result;
use clap::Subcommand;

use super::output::Output;
use crate::domain::Category;
use crate::storage::Project;

#[derive(Subcommand)]
pub enum CourseCommands {
    /// Register a course
    Add {
        /// Course name
        name: String,

        /// Category (programming, frontend, backend, data_science, devops)
        #[arg(long, short, default_value = "programming")]
        category: Category,
    },

    /// List courses
    List,
}

pub fn run(cmd: CourseCommands, output: &Output) -> Result<()> {
    match cmd {
        CourseCommands::Add { name, category } => add_course(output, &name, category),
        CourseCommands::List => list_courses(output),
    }
}

fn add_course(output: &Output, name: &str, category: Category) -> Result<()> {
    let project = Project::open_current()?;
    let course = project.service().register_course(name, category)?;

    if output.is_json() {
        output.data(&course);
    } else {
        output.success(&format!("Created course: {} - {}", course.id, course.name));
    }

    Ok(())
}

fn list_courses(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let courses = project.service().courses()?;

    if output.is_json() {
        output.data(&courses);
    } else if courses.is_empty() {
        println!("No courses");
    } else {
        println!("{:<10} {:<14} NAME", "ID", "CATEGORY");
        println!("{}", "-".repeat(50));

        for course in &courses {
            println!(
                "{:<10} {:<14} {}",
                course.id.to_string(),
                course.category.to_string(),
                course.name
            );
        }
    }

    Ok(())
}
