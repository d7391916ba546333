//! Command-line interface implementation for Stencil.
//! Provides argument parsing and help text formatting using clap.

use crate::constants::DEFAULT_NAME;
use crate::placeholder::is_variable_name;
use clap::{error::ErrorKind, CommandFactory, Parser};
use indexmap::IndexMap;
use std::path::PathBuf;

/// Command-line arguments structure for Stencil.
#[derive(Parser, Debug)]
#[command(author, version, about = "Stencil: create a new repository from a template directory", long_about = None)]
pub struct Args {
    /// Directory to copy the project from
    #[arg(short, long, value_name = "DIR")]
    pub template: PathBuf,

    /// Value of @APP_NAME@
    #[arg(short, long, value_name = "VAL", default_value = DEFAULT_NAME)]
    pub name: String,

    /// Value of @APP_PREFIX@; defaults to APP_NAME upper cased, with dashes replaced
    /// by underscores (e.g. UNKNOWN_PROJECT)
    #[arg(short, long, value_name = "VAL")]
    pub prefix: Option<String>,

    /// Value of @APP_DESCRIPTION@
    #[arg(short, long, value_name = "VAL")]
    pub description: Option<String>,

    /// Directory to put the new project in; defaults to APP_NAME
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Additional variable, e.g. --var LICENSE=MIT (may be repeated)
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_variable)]
    pub vars: Vec<(String, String)>,

    /// Replace the output directory if it already exists
    #[arg(short, long)]
    pub force: bool,

    /// Do not initialize a git repository in the output directory
    #[arg(long)]
    pub no_git: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Output directory, the project name unless given explicitly.
    pub fn output_dir(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| PathBuf::from(&self.name))
    }

    /// Variables set from the command line, in display order.
    ///
    /// `APP_DESCRIPTION` is present but unset when no description was given.
    pub fn variables(&self) -> IndexMap<String, Option<String>> {
        let prefix = self.prefix.clone().unwrap_or_else(|| default_prefix(&self.name));

        let mut vars = IndexMap::new();
        vars.insert("APP_NAME".to_string(), Some(self.name.clone()));
        vars.insert("APP_PREFIX".to_string(), Some(prefix));
        vars.insert("APP_DESCRIPTION".to_string(), self.description.clone());
        for (key, value) in &self.vars {
            vars.insert(key.clone(), Some(value.clone()));
        }
        vars
    }
}

/// `my-project` becomes `MY_PROJECT`.
pub fn default_prefix(name: &str) -> String {
    name.to_uppercase().replace('-', "_")
}

fn parse_variable(arg: &str) -> Result<(String, String), String> {
    let (key, value) = arg.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got '{arg}'"))?;
    if !is_variable_name(key) {
        return Err(format!("'{key}' is not a valid variable name (letters, digits and '_' only)"));
    }
    Ok((key.to_string(), value.to_string()))
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefix() {
        assert_eq!(default_prefix("unknown-project"), "UNKNOWN_PROJECT");
        assert_eq!(default_prefix("libfoo"), "LIBFOO");
    }

    #[test]
    fn test_parse_variable() {
        assert_eq!(parse_variable("LICENSE=MIT"), Ok(("LICENSE".to_string(), "MIT".to_string())));
        assert_eq!(parse_variable("EMPTY="), Ok(("EMPTY".to_string(), String::new())));
        assert_eq!(parse_variable("EQ=a=b"), Ok(("EQ".to_string(), "a=b".to_string())));
        assert!(parse_variable("NO_VALUE").is_err());
        assert!(parse_variable("BAD-KEY=1").is_err());
    }
}
