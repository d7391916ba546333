//! Common constants used throughout the Stencil application.

/// Name of the ignore files honored inside templates
pub const IGNORE_FILE: &str = ".gitignore";

/// Rule implicitly applied at the template root so VCS metadata is never copied
pub const VCS_METADATA_RULE: &str = ".git/";

/// Supported configuration file names
pub const CONFIG_FILES: [&str; 3] = ["stencil.json", "stencil.yml", "stencil.yaml"];

/// Byte opening and closing a placeholder
pub const MARKER: u8 = b'@';

/// Project name used when none is given
pub const DEFAULT_NAME: &str = "unknown-project";

pub const QUOTABLE_PREFIX: &str = "QUOTABLE_";
pub const QUOTED_PREFIX: &str = "QUOTED_";

/// Placeholders under this prefix are written to the output unchanged
pub const REFLECT_PREFIX: &str = "PROJECT_";

/// Used when `LS_COLORS` is not set
pub const FALLBACK_LS_COLORS: &str = "rs=0:ln=01;36:ex=01;32";
