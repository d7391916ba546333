//! File and directory ignore pattern handling for templates.
//! This module reads the `.gitignore` files found inside a template and decides which
//! template entries are copied, following the subset of git's ignore semantics that
//! project templates rely on: basename patterns, slash-scoped patterns, anchored
//! patterns and negations.

use crate::constants::VCS_METADATA_RULE;
use crate::error::{Error, Result};
use crate::path::{scope_prefix, template_path};
use globset::{GlobBuilder, GlobMatcher};
use log::debug;
use std::fs;
use std::path::Path;

/// How a compiled pattern lines up with the path it is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Leading-slash pattern, matched against `/` + the scope-relative path.
    Anchored,
    /// Pattern with an inner `/`, matched against the scope-relative path.
    Bounded,
    /// Pattern without an inner `/`, matched against the basename only.
    Unanchored,
}

/// A single compiled ignore pattern.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    matcher: GlobMatcher,
    scope: Scope,
}

impl IgnoreRule {
    /// Compiles one ignore-file line.
    ///
    /// The line must already be trimmed, stripped of comments and of the `!` marking a
    /// negation. A trailing `/` does not take part in matching.
    pub fn compile(line: &str) -> std::result::Result<Self, globset::Error> {
        let last = line.chars().last().map_or(0, char::len_utf8);
        let is_relative = line[..line.len() - last].contains('/');
        let scope = match (is_relative, line.starts_with('/')) {
            (true, true) => Scope::Anchored,
            (true, false) => Scope::Bounded,
            (false, _) => Scope::Unanchored,
        };

        let pattern = line.trim_end_matches('/');
        let matcher = GlobBuilder::new(pattern)
            .literal_separator(true)
            .backslash_escape(true)
            .build()?
            .compile_matcher();

        Ok(Self { matcher, scope })
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Tests the rule against a scope-relative path and each of its ancestors, so a
    /// rule naming a directory also covers everything beneath it.
    pub fn matches(&self, path: &str) -> bool {
        let mut level = path;
        loop {
            if self.matches_level(level) {
                return true;
            }
            match level.rfind('/') {
                Some(index) => level = &level[..index],
                None => return false,
            }
        }
    }

    fn matches_level(&self, level: &str) -> bool {
        match self.scope {
            Scope::Unanchored => {
                let basename = level.rsplit('/').next().unwrap_or(level);
                self.matcher.is_match(basename)
            }
            Scope::Bounded => self.matcher.is_match(level),
            Scope::Anchored => self.matcher.is_match(format!("/{level}")),
        }
    }
}

/// Rules declared by one ignore file, applying under `prefix`.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    prefix: String,
    excludes: Vec<IgnoreRule>,
    includes: Vec<IgnoreRule>,
}

impl RuleSet {
    /// Parses the content of an ignore file declared in directory `prefix`.
    ///
    /// `ignore_file` only names the source in error messages.
    pub fn parse(prefix: &str, content: &str, ignore_file: &str) -> Result<Self> {
        let mut rules = Self { prefix: scope_prefix(prefix), ..Self::default() };

        for line in content.lines().map(strip_comment).filter(|line| !line.is_empty()) {
            let (pattern, negated) = match line.strip_prefix('!') {
                Some(pattern) => (pattern, true),
                None => (line, false),
            };
            let rule = IgnoreRule::compile(pattern).map_err(|source| Error::PatternError {
                pattern: line.to_string(),
                ignore_file: ignore_file.to_string(),
                source,
            })?;
            if negated {
                rules.includes.push(rule);
            } else {
                rules.excludes.push(rule);
            }
        }

        Ok(rules)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_empty(&self) -> bool {
        self.excludes.is_empty() && self.includes.is_empty()
    }

    /// Returns `path` relative to this scope, or `None` when the scope does not apply.
    fn relative<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.strip_prefix(self.prefix.as_str())
    }
}

/// Removes everything from the first unescaped `#` and trims the rest.
fn strip_comment(line: &str) -> &str {
    let mut escaped = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '\\' => escaped = !escaped,
            '#' if !escaped => return line[..index].trim(),
            _ => escaped = false,
        }
    }
    line.trim()
}

/// Decides whether root-relative `path` is excluded by `rule_sets`.
///
/// Rule sets are evaluated in discovery order. A set only applies when its prefix is a
/// path prefix of `path`. Once excluded, a path stays excluded unless an include rule of
/// the same or a later (more specific) set matches it.
pub fn is_excluded(path: &str, rule_sets: &[RuleSet]) -> bool {
    let mut excluded = false;

    for rules in rule_sets {
        let Some(relative) = rules.relative(path) else {
            continue;
        };

        if !excluded {
            excluded = rules.excludes.iter().any(|rule| rule.matches(relative));
        }
        if excluded && rules.includes.iter().any(|rule| rule.matches(relative)) {
            excluded = false;
        }
    }

    excluded
}

/// Reads the ignore file at `ignore_path` inside `template_root`.
///
/// Returns the parsed rules, scoped to the file's directory, and the raw file content.
pub fn load_ignore_file<P: AsRef<Path>, Q: AsRef<Path>>(
    template_root: P,
    ignore_path: Q,
) -> Result<(RuleSet, Vec<u8>)> {
    let template_root = template_root.as_ref();
    let ignore_path = ignore_path.as_ref();

    let content = fs::read(ignore_path).map_err(|e| Error::file(ignore_path, e))?;
    let dirname = match ignore_path.parent() {
        Some(parent) => template_path(template_root, parent)?,
        None => String::new(),
    };
    let ignore_file = template_path(template_root, ignore_path)?;
    let rules = RuleSet::parse(&dirname, &String::from_utf8_lossy(&content), &ignore_file)?;

    debug!(
        "Loaded {} exclude and {} include rules from '{}'",
        rules.excludes.len(),
        rules.includes.len(),
        ignore_file
    );

    Ok((rules, content))
}

/// Rule sets collected during a single traversal of a template.
#[derive(Debug)]
pub struct Exclusions {
    rule_sets: Vec<RuleSet>,
}

impl Exclusions {
    /// Starts with the root rules: VCS metadata plus `root_excludes`
    /// (for example `/external/json` for a submodule).
    pub fn new<S: AsRef<str>>(root_excludes: &[S]) -> Result<Self> {
        let mut root = RuleSet::default();
        let patterns = std::iter::once(VCS_METADATA_RULE).chain(root_excludes.iter().map(AsRef::as_ref));
        for pattern in patterns {
            let rule = IgnoreRule::compile(pattern).map_err(|source| Error::PatternError {
                pattern: pattern.to_string(),
                ignore_file: "<root>".to_string(),
                source,
            })?;
            root.excludes.push(rule);
        }

        Ok(Self { rule_sets: vec![root] })
    }

    /// Appends the rules of a newly discovered ignore file.
    pub fn push(&mut self, rules: RuleSet) {
        if !rules.is_empty() {
            self.rule_sets.push(rules);
        }
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        is_excluded(path, &self.rule_sets)
    }

    /// An excluded directory can be skipped unless a negation loaded so far could
    /// bring back something beneath it.
    pub fn can_skip_dir(&self, dirname: &str) -> bool {
        if !self.is_excluded(dirname) {
            return false;
        }
        let inside = scope_prefix(dirname);
        !self
            .rule_sets
            .iter()
            .any(|rules| !rules.includes.is_empty() && inside.starts_with(rules.prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_matches(pattern: &str, filename: &str) -> bool {
        IgnoreRule::compile(pattern).unwrap().matches(filename)
    }

    #[test]
    fn test_compile_scope() {
        assert_eq!(IgnoreRule::compile("*.pyc").unwrap().scope(), Scope::Unanchored);
        assert_eq!(IgnoreRule::compile("build/").unwrap().scope(), Scope::Unanchored);
        assert_eq!(IgnoreRule::compile("dir/subdir").unwrap().scope(), Scope::Bounded);
        assert_eq!(IgnoreRule::compile("/external/json").unwrap().scope(), Scope::Anchored);
        assert_eq!(IgnoreRule::compile("/build").unwrap().scope(), Scope::Anchored);
    }

    #[test]
    fn test_compile_rejects_malformed_glob() {
        assert!(IgnoreRule::compile("[abc").is_err());
    }

    #[test]
    fn test_matches() {
        assert!(rule_matches("/external/submodule", "external/submodule/src/main.cpp"));
        assert!(rule_matches("dir/subdir", "dir/subdir/src/main.cpp"));
        assert!(rule_matches("*.ext", "dir1/dir2/dir3.ext2/main.ext"));
        assert!(rule_matches("*.ext", "dir1/dir2/dir3.ext/main.ext2"));
        assert!(rule_matches("build/", "build/a.out"));

        assert!(!rule_matches("/external/submodule", "external/submodules/src/main.cpp"));
        assert!(!rule_matches("dir/subdir", "another-dir/dir/subdir/src/main.cpp"));
        assert!(!rule_matches("*.ext", "dir1/dir2/dir3.ext2/main.ext2"));
        assert!(!rule_matches("*.pyc", "tools/tool-name/tool.py"));
    }

    #[test]
    fn test_strip_comment() {
        assert_eq!(strip_comment("  *.pyc  # bytecode"), "*.pyc");
        assert_eq!(strip_comment("# full line"), "");
        assert_eq!(strip_comment(r"issue\#1"), r"issue\#1");
    }

    #[test]
    fn test_generated_root_rules() {
        let exclusions = Exclusions::new(&["/external/json", "/external/libarch"]).unwrap();

        for accepted in ["gits/config", ".gits/config", "external/CMakeLists.txt", "side/external/json/CMakeLists.txt"] {
            assert!(!exclusions.is_excluded(accepted), "{accepted} should not be excluded");
        }
        for rejected in [
            ".git/config",
            "external/json/CMakeLists.txt",
            "external/json/conanfile.txt",
            "external/libarch/include/arch/base/archive.hh",
            "external/libarch/README.md",
        ] {
            assert!(exclusions.is_excluded(rejected), "{rejected} should be excluded");
        }
    }

    #[test]
    fn test_nested_scope() {
        let rules = RuleSet::parse("tools", "*.pyc\n", "tools/.gitignore").unwrap();
        let rule_sets = [rules];

        assert!(is_excluded("tools/tool-name/tool.pyc", &rule_sets));
        assert!(!is_excluded("tools/tool-name/tool.py", &rule_sets));
        assert!(!is_excluded("app/code-gen.pyc", &rule_sets));
        assert!(!is_excluded("toolsets/code-gen.pyc", &rule_sets));
    }

    #[test]
    fn test_negation() {
        let content = "\nbuild/\ndist/\n!build/version.h\n*.pyc\n*.exe\n*.obj\n";
        let rule_sets = [RuleSet::parse("project", content, "project/.gitignore").unwrap()];

        assert!(!is_excluded("build/a.exe", &rule_sets));
        assert!(!is_excluded("build/version.h", &rule_sets));
        assert!(!is_excluded("project/build/version.h", &rule_sets));
        assert!(is_excluded("project/build/a.out", &rule_sets));
        assert!(is_excluded("project/a.exe", &rule_sets));
    }

    #[test]
    fn test_negation_at_root() {
        let rule_sets = [RuleSet::parse("", "build/\n!build/version.h\n", ".gitignore").unwrap()];

        assert!(is_excluded("build/a.exe", &rule_sets));
        assert!(!is_excluded("build/version.h", &rule_sets));
    }

    #[test]
    fn test_inner_scope_overrides_outer() {
        let rule_sets = [
            RuleSet::parse("", "*.log\n", ".gitignore").unwrap(),
            RuleSet::parse("logs", "!keep.log\n", "logs/.gitignore").unwrap(),
        ];

        assert!(is_excluded("app/run.log", &rule_sets));
        assert!(is_excluded("logs/run.log", &rule_sets));
        assert!(!is_excluded("logs/keep.log", &rule_sets));
        assert!(is_excluded("app/keep.log", &rule_sets));
    }

    #[test]
    fn test_pattern_error_names_source() {
        let err = RuleSet::parse("", "ok\n[broken\n", "sub/.gitignore").unwrap_err();
        match err {
            Error::PatternError { pattern, ignore_file, .. } => {
                assert_eq!(pattern, "[broken");
                assert_eq!(ignore_file, "sub/.gitignore");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_can_skip_dir() {
        let mut exclusions = Exclusions::new::<&str>(&[]).unwrap();
        assert!(exclusions.can_skip_dir(".git"));
        assert!(!exclusions.can_skip_dir("src"));

        exclusions.push(RuleSet::parse("", "build/\n!build/version.h\n", ".gitignore").unwrap());
        assert!(!exclusions.can_skip_dir("build"));

        exclusions.push(RuleSet::parse("", "", "empty/.gitignore").unwrap());
        assert_eq!(exclusions.rule_sets.len(), 2);
    }
}
