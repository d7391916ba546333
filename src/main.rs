//! Stencil's main application entry point and orchestration logic.
//! Handles command-line argument parsing and coordinates the template copy.

use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::io::IsTerminal;
use std::path::Path;

use stencil::{
    cli::{get_args, Args},
    config::get_config,
    error::{default_error_handler, Error, Result},
    logger::init_logger,
    repo::Repo,
    report::{format_variables, print_report},
    variables::create_registry,
    writer::{copy_project, prepare_output_dir},
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

fn highlight(path: &Path, colored: bool) -> String {
    if colored {
        format!("\x1b[0;36m{}\x1b[m", path.display())
    } else {
        path.display().to_string()
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Loads the template configuration
/// 2. Prepares the output directory and its repository
/// 3. Completes the variables (git identity, configuration defaults)
/// 4. Copies the template and prints the report
/// 5. Warns about variables the template used but nobody set
fn run(args: Args) -> Result<()> {
    let template_root = args.template.clone();
    if !template_root.is_dir() {
        return Err(Error::TemplateDoesNotExistsError { template_dir: template_root.display().to_string() });
    }

    let (config, config_file) = get_config(&template_root)?;
    let output_root = prepare_output_dir(args.output_dir(), args.force)?;
    let repo = if args.no_git { None } else { Some(Repo::init(&output_root)?) };

    let mut vars = args.variables();
    let is_unset = |vars: &IndexMap<String, Option<String>>, key: &str| vars.get(key).map_or(true, Option::is_none);
    if let Some(repo) = &repo {
        if is_unset(&vars, "APP_AUTHOR") {
            vars.insert("APP_AUTHOR".to_string(), repo.user_name());
        }
        if is_unset(&vars, "APP_AUTHOR_EMAIL") {
            vars.insert("APP_AUTHOR_EMAIL".to_string(), repo.user_email());
        }
    }
    for (key, value) in &config.variables {
        if is_unset(&vars, key) {
            vars.insert(key.clone(), Some(value.clone()));
        }
    }

    let colored = std::io::stdout().is_terminal();
    println!("Creating {} from {}", highlight(&output_root, colored), highlight(&template_root, colored));
    let lines = format_variables(&vars, colored);
    if !lines.is_empty() {
        println!("Using:\n{}", lines.join("\n"));
    }
    println!();

    let registry = create_registry(&vars, &config.reflect);
    let root_excludes: Vec<String> = config_file.iter().map(|file| format!("/{file}")).collect();
    let mut missing = BTreeSet::new();
    let copied = copy_project(&template_root, &output_root, repo.as_ref(), registry, &root_excludes, &mut |name: &str| {
        missing.insert(name.to_string());
    });

    if let Ok(summary) = &copied {
        print_report(&summary.files);
    }

    // reported whether or not the copy succeeded
    if !missing.is_empty() {
        let names: Vec<String> = missing.iter().map(|name| format!("  - {name}")).collect();
        log::warn!("Some used variables were not set:\n{}", names.join("\n"));
    }

    copied.map(|_| ())
}
