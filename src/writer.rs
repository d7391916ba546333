//! Materializes a template into the output directory.
//! Writes files with their placeholders resolved, recreates symlinks, restores
//! executable bits and stages everything in the destination repository.

use crate::error::{Error, Result};
use crate::path::posix_path;
use crate::placeholder::expand;
use crate::repo::Repo;
use crate::report::ReportedFile;
use crate::template::TemplateEntry;
use crate::variables::Registry;
use crate::walker::read_templates;
use log::debug;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of a copy.
#[derive(Debug, Default)]
pub struct CopySummary {
    /// Every file and symlink written
    pub files: Vec<ReportedFile>,
}

/// Writes template entries below `output_root`.
pub struct TemplateWriter<'a> {
    output_root: PathBuf,
    repo: Option<&'a Repo>,
    execs: HashSet<String>,
    registry: Registry,
    symlinks: Vec<(String, String)>,
    files_to_add: Vec<String>,
    exec_files_to_add: Vec<String>,
    reported: Vec<ReportedFile>,
    on_unresolved: &'a mut dyn FnMut(&str),
}

impl<'a> TemplateWriter<'a> {
    /// `execs` lists the template-relative files to mark executable. When `repo` is
    /// given, written files are staged in it; `output_root` must then be its work directory.
    ///
    /// `on_unresolved` is called with the name of every placeholder that has no value, as
    /// soon as it is met, so names seen before a failure are not lost.
    pub fn new<P: AsRef<Path>>(
        output_root: P,
        repo: Option<&'a Repo>,
        execs: HashSet<String>,
        registry: Registry,
        on_unresolved: &'a mut dyn FnMut(&str),
    ) -> Self {
        Self {
            output_root: output_root.as_ref().to_path_buf(),
            repo,
            execs,
            registry,
            symlinks: Vec::new(),
            files_to_add: Vec::new(),
            exec_files_to_add: Vec::new(),
            reported: Vec::new(),
            on_unresolved,
        }
    }

    /// Copies every entry of `template_root` that survives the ignore rules.
    ///
    /// Symlinks are created once all regular files exist, then executable bits are set
    /// and the files are staged.
    pub fn copy_templates<P: AsRef<Path>, S: AsRef<str>>(
        mut self,
        template_root: P,
        root_excludes: &[S],
    ) -> Result<CopySummary> {
        read_templates(template_root, root_excludes, |entry| self.on_template(entry))?;

        for (filename, target) in std::mem::take(&mut self.symlinks) {
            self.link_file(&filename, &target)?;
        }

        self.set_executable_bits()?;

        if let Some(repo) = self.repo {
            repo.add(&self.files_to_add, false)?;
            repo.add(&self.exec_files_to_add, true)?;
        }

        Ok(CopySummary { files: self.reported })
    }

    fn on_template(&mut self, entry: TemplateEntry) -> Result<()> {
        let is_exec = self.execs.contains(entry.filename());
        let staged = if is_exec { &mut self.exec_files_to_add } else { &mut self.files_to_add };
        staged.push(entry.filename().to_string());

        match entry {
            TemplateEntry::Symlink { filename, target } => self.symlinks.push((filename, target)),
            TemplateEntry::File { filename, content } => {
                self.write_file(&filename, &content)?;
                self.report(&filename, is_exec, content.len(), None);
            }
            TemplateEntry::Variable { filename, chunks } => {
                let content = expand(&chunks, |name| self.value(name));
                self.write_file(&filename, &content)?;
                self.report(&filename, is_exec, content.len(), None);
            }
        }

        Ok(())
    }

    /// Value of `name`, or an empty string reported as unresolved.
    fn value(&mut self, name: &str) -> String {
        match self.registry.resolve(name) {
            Some(value) => value,
            None => {
                debug!("Unresolved variable '{name}'");
                (self.on_unresolved)(name);
                String::new()
            }
        }
    }

    fn output_path(&self, filename: &str) -> Result<PathBuf> {
        let path = self.output_root.join(filename);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::file(parent, e))?;
        }
        Ok(path)
    }

    fn write_file(&self, filename: &str, content: &[u8]) -> Result<()> {
        let path = self.output_path(filename)?;
        debug!("Writing file: {}", path.display());
        fs::write(&path, content).map_err(|e| Error::file(&path, e))
    }

    fn link_file(&mut self, filename: &str, target: &str) -> Result<()> {
        let path = self.output_path(filename)?;
        debug!("Linking file: {} -> {}", path.display(), target);
        create_symlink(target, &path).map_err(|e| Error::file(&path, e))?;

        let is_exec = self.execs.contains(filename);
        self.report(filename, is_exec, target.len(), Some(target.to_string()));
        Ok(())
    }

    #[cfg(unix)]
    fn set_executable_bits(&self) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        for filename in &self.exec_files_to_add {
            let path = self.output_root.join(filename);
            let metadata = fs::symlink_metadata(&path).map_err(|e| Error::file(&path, e))?;
            if metadata.file_type().is_file() {
                fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                    .map_err(|e| Error::file(&path, e))?;
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn set_executable_bits(&self) -> Result<()> {
        Ok(())
    }

    fn report(&mut self, filename: &str, is_exec: bool, size: usize, link: Option<String>) {
        let permissions = if is_exec { 0o755 } else { 0o644 };
        let shown = posix_path(self.output_root.join(filename));
        self.reported.push(ReportedFile::new(shown, permissions, size as u64, link));
    }
}

#[cfg(unix)]
fn create_symlink(target: &str, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink(target: &str, link: &Path) -> std::io::Result<()> {
    let resolved = link.parent().map(|parent| parent.join(target)).unwrap_or_else(|| PathBuf::from(target));
    if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

/// Ensures the output directory exists, is empty and is safe to write to.
///
/// # Errors
/// * `Error::OutputDirectoryExistsError` if the directory exists and `force` is false
pub fn prepare_output_dir<P: AsRef<Path>>(output_dir: P, force: bool) -> Result<PathBuf> {
    let output_dir = output_dir.as_ref();
    if let Ok(metadata) = fs::symlink_metadata(output_dir) {
        if !force {
            return Err(Error::OutputDirectoryExistsError { output_dir: output_dir.display().to_string() });
        }
        debug!("Removing existing '{}'", output_dir.display());
        let removed = if metadata.is_dir() { fs::remove_dir_all(output_dir) } else { fs::remove_file(output_dir) };
        removed.map_err(|e| Error::file(output_dir, e))?;
    }

    fs::create_dir_all(output_dir).map_err(|e| Error::file(output_dir, e))?;
    Ok(output_dir.to_path_buf())
}

/// Copies `template_root` into `output_root`.
///
/// When the template lives in a git repository, its index decides which files are
/// executable and which directories are submodules (never copied). `root_excludes`
/// adds rules applied from the template root. `on_unresolved` receives the name of each
/// placeholder without a value, also when the copy later fails.
pub fn copy_project<P, Q, S>(
    template_root: P,
    output_root: Q,
    repo: Option<&Repo>,
    registry: Registry,
    root_excludes: &[S],
    on_unresolved: &mut dyn FnMut(&str),
) -> Result<CopySummary>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    S: AsRef<str>,
{
    let template_root = template_root.as_ref();
    let mut excludes: Vec<String> = root_excludes.iter().map(|s| s.as_ref().to_string()).collect();
    let mut execs = HashSet::new();

    match Repo::discover(template_root) {
        Some(source) => {
            execs.extend(source.executable_files(template_root)?);
            excludes.extend(source.submodules(template_root)?.into_iter().map(|dir| format!("/{dir}")));
        }
        None => debug!("Template '{}' is not tracked by git", template_root.display()),
    }

    TemplateWriter::new(output_root, repo, execs, registry, on_unresolved).copy_templates(template_root, &excludes)
}
