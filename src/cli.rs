//! Command-line interface implementation for prjtpl.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use std::path::PathBuf;

/// Which files the initial commit of a new repository contains.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GitMode {
    /// Everything in the project directory
    All,
    /// Only the files written from the template
    Project,
}

/// Command-line arguments structure for prjtpl.
#[derive(Parser, Debug)]
#[command(author, version, about = "prjtpl: deploy a new project from a template tree", long_about = None)]
pub struct Args {
    /// Template config file; its directory is the template root
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Directory where the project will be created
    #[arg(value_name = "PROJECT_DIR")]
    pub project_dir: PathBuf,

    /// Initialize a git repository and commit all or only project files
    #[arg(short, long, value_enum, value_name = "MODE")]
    pub git: Option<GitMode>,

    /// Deploy into an existing project directory
    #[arg(short, long)]
    pub force: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 if required arguments are missing
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if e.kind() == ErrorKind::MissingRequiredArgument {
                let _ = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help();
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
