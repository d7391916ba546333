//! `ls -l`-style listing of the generated files.

use crate::constants::FALLBACK_LS_COLORS;
use crate::path::{dirname_posix, join_posix};
use crate::variables::quote_string;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::io::IsTerminal;
use std::path::Path;

/// One line of the final report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedFile {
    pub filename: String,
    pub permissions: u32,
    pub size: u64,
    pub size_label: String,
    pub link: Option<String>,
}

impl ReportedFile {
    pub fn new(filename: String, permissions: u32, size: u64, link: Option<String>) -> Self {
        Self { filename, permissions, size, size_label: size_label(size), link }
    }

    pub fn is_executable(&self) -> bool {
        self.permissions & 0o111 != 0
    }
}

/// Human readable size with at most one decimal, e.g. `512`, `1.5K`, `2M`.
pub fn size_label(size: u64) -> String {
    let mut suffix = "";
    let mut tenths = size.saturating_mul(10);
    for next in ["K", "M", "G"] {
        if tenths <= 10240 {
            break;
        }
        suffix = next;
        tenths /= 1024;
    }

    let (whole, rem) = (tenths / 10, tenths % 10);
    if rem == 0 {
        format!("{whole}{suffix}")
    } else {
        format!("{whole}.{rem}{suffix}")
    }
}

/// Renders the lower nine permission bits as `rwxr-xr-x`.
pub fn permission_string(permissions: u32) -> String {
    [6, 3, 0]
        .iter()
        .map(|shift| {
            let bits = (permissions >> shift) & 7;
            format!(
                "{}{}{}",
                if bits & 4 != 0 { 'r' } else { '-' },
                if bits & 2 != 0 { 'w' } else { '-' },
                if bits & 1 != 0 { 'x' } else { '-' }
            )
        })
        .collect()
}

/// Colors parsed from an `LS_COLORS` specification.
#[derive(Debug, Clone, Default)]
pub struct LsColors {
    categories: HashMap<String, String>,
    extensions: HashMap<String, String>,
}

impl LsColors {
    pub fn parse(spec: &str) -> Self {
        let mut colors = Self::default();
        for (name, color) in spec.split(':').filter_map(|item| item.split_once('=')) {
            match name.strip_prefix('*') {
                Some(extension) => colors.extensions.insert(extension.to_string(), color.to_string()),
                None => colors.categories.insert(name.to_string(), color.to_string()),
            };
        }
        colors
    }

    pub fn from_env() -> Self {
        match std::env::var("LS_COLORS") {
            Ok(spec) => Self::parse(&spec),
            Err(_) => Self::parse(FALLBACK_LS_COLORS),
        }
    }

    fn category(&self, name: &str) -> Option<&str> {
        self.categories.get(name).map(String::as_str)
    }

    fn extension(&self, filename: &str) -> Option<&str> {
        let extension = Path::new(filename).extension()?;
        self.extensions.get(&format!(".{}", extension.to_string_lossy())).map(String::as_str)
    }

    /// Links first, then executables, then extensions, then plain files.
    fn color_for(&self, file: &ReportedFile) -> Option<&str> {
        let link = file.link.as_ref().and_then(|_| self.category("ln"));
        let exec = if file.is_executable() { self.category("ex") } else { None };
        link.or(exec).or_else(|| self.extension(&file.filename)).or_else(|| self.category("fi"))
    }
}

fn paint(text: &str, color: Option<&str>) -> String {
    format!("\x1b[{}m{}\x1b[m", color.unwrap_or(""), text)
}

/// Formats `files` sorted by name, one `ls -l`-like line each.
///
/// Without `colors` the lines carry no escape sequences.
pub fn format_report(files: &[ReportedFile], colors: Option<&LsColors>) -> Vec<String> {
    let mut files: Vec<&ReportedFile> = files.iter().collect();
    files.sort_by(|a, b| a.filename.cmp(&b.filename));

    let by_name: HashMap<&str, Option<&str>> = match colors {
        Some(colors) => files.iter().map(|file| (file.filename.as_str(), colors.color_for(file))).collect(),
        None => HashMap::new(),
    };
    let name = |filename: &str, shown: &str| match colors {
        Some(_) => paint(shown, by_name.get(filename).copied().flatten()),
        None => shown.to_string(),
    };

    let width = files.iter().map(|file| file.size_label.len()).max().unwrap_or(0);
    files
        .iter()
        .map(|file| {
            let file_type = if file.link.is_some() { 'l' } else { '-' };
            let linked = match &file.link {
                Some(link) => {
                    let target = join_posix(dirname_posix(&file.filename), link);
                    format!(" -> {}", name(&target, link))
                }
                None => String::new(),
            };
            format!(
                "{}{} {:>width$} {}{}",
                file_type,
                permission_string(file.permissions),
                file.size_label,
                name(&file.filename, &file.filename),
                linked,
            )
        })
        .collect()
}

/// Prints the report, colored when stdout is a terminal.
pub fn print_report(files: &[ReportedFile]) {
    let colors = std::io::stdout().is_terminal().then(LsColors::from_env);
    for line in format_report(files, colors.as_ref()) {
        println!("{line}");
    }
}

/// Lines listing the variables in use, e.g. `  @APP_NAME@: "widget"`; unset ones are skipped.
pub fn format_variables(vars: &IndexMap<String, Option<String>>, colored: bool) -> Vec<String> {
    vars.iter()
        .filter_map(|(key, value)| value.as_ref().map(|value| (key, value)))
        .map(|(key, value)| {
            let key = format!("@{key}@");
            let value = format!("\"{}\"", quote_string(value));
            if colored {
                format!("  {}: {}", paint(&key, Some("0;33")), paint(&value, Some("0;32")))
            } else {
                format!("  {key}: {value}")
            }
        })
        .collect()
}
