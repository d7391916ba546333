//! Stencil creates new repositories from a template directory.
//! It copies the template tree while honoring the `.gitignore` files found in it,
//! substitutes `@NAME@` placeholders, keeps symlinks and executable bits, and stages
//! the result in a freshly initialized git repository.

/// Command-line interface module for the Stencil application
pub mod cli;

/// Configuration handling for Stencil templates
/// Supports JSON and YAML formats (stencil.json, stencil.yml, stencil.yaml)
pub mod config;

/// Common constants
pub mod constants;

/// Error types and handling for the Stencil application
pub mod error;

/// Ignore rules: pattern compilation and exclusion decisions
pub mod ignore;

pub mod logger;

/// `/`-separated path helpers
pub mod path;

/// `@NAME@` placeholder tokenizer
pub mod placeholder;

/// Git repository access
pub mod repo;

/// `ls -l`-style report of the generated files
pub mod report;

/// Template entry types
pub mod template;

/// Variable resolution
pub mod variables;

/// Template tree traversal
pub mod walker;

/// Output tree materialization
pub mod writer;
