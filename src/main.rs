//! prjtpl's main application entry point.
//! Reads the template config, feeds the substitutions to the engine,
//! deploys the template and optionally initializes a git repository.

use std::path::{absolute, PathBuf};

use prjtpl::{
    cli::{get_args, Args},
    config::{echo_handler, marker, read_config, resolve_entries},
    engine::{ensure_output_dir, Engine},
    error::{default_error_handler, Error, Result},
    prompt::DialoguerPrompter,
    vcs::init_repository,
};

/// Main application entry point.
fn main() {
    let args = get_args();

    // Logger configuration
    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Trace
        } else {
            log::LevelFilter::Info
        })
        .init();

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Resolves the config file, template root and project root
/// 2. Reads the config and asks for interactive values
/// 3. Registers substitutions and the config echo handler
/// 4. Deploys the template
/// 5. Initializes a git repository if requested
fn run(args: Args) -> Result<()> {
    let config_path = absolute(&args.config)?;
    let project_root = ensure_output_dir(absolute(&args.project_dir)?, args.force)?;
    let template_root: PathBuf = config_path
        .parent()
        .ok_or_else(|| {
            Error::ConfigError(format!("'{}' has no parent directory", config_path.display()))
        })?
        .to_path_buf();

    let mut engine = Engine::new(template_root, project_root.clone());

    println!("Reading config from {}", config_path.display());
    let entries = read_config(&config_path)?;
    let prompt = DialoguerPrompter::new();
    for (name, value) in resolve_entries(entries, &prompt, |name| std::env::var(name).ok())? {
        engine.add_substitution(marker(&name), value);
    }

    engine.add_handler(echo_handler(config_path.clone()));

    println!("Deploying template...");
    engine.process()?;
    println!("Template deployed to {}.", project_root.display());

    if let Some(mode) = args.git {
        println!("Initializing git repository...");
        init_repository(&project_root, mode, engine.generated())?;
    }

    Ok(())
}
