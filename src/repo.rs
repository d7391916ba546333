//! Git repository access for Stencil.
//! The template repository tells which files are executable and which directories are
//! submodules; the destination repository receives the generated files.

use crate::error::{Error, Result};
use crate::path::posix_path;
use git2::{IndexEntry, Repository};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

pub const MODE_FILE: u32 = 0o100644;
pub const MODE_EXECUTABLE: u32 = 0o100755;
pub const MODE_SUBMODULE: u32 = 0o160000;

/// A non-bare git repository.
pub struct Repo {
    repo: Repository,
    workdir: PathBuf,
}

impl std::fmt::Debug for Repo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repo").field("workdir", &self.workdir).finish()
    }
}

impl Repo {
    fn from_repository(repo: Repository) -> Result<Self> {
        let workdir = repo
            .workdir()
            .ok_or_else(|| Error::Git2Error(git2::Error::from_str("bare repositories are not supported")))?;
        let workdir = fs::canonicalize(workdir).map_err(|e| Error::file(workdir, e))?;
        Ok(Self { repo, workdir })
    }

    /// Creates a new repository in `path`.
    pub fn init<P: AsRef<Path>>(path: P) -> Result<Self> {
        debug!("Initializing repository in '{}'.", path.as_ref().display());
        Self::from_repository(Repository::init(path)?)
    }

    /// Opens the repository containing `path`, if there is one.
    pub fn discover<P: AsRef<Path>>(path: P) -> Option<Self> {
        let path = path.as_ref();
        match Repository::discover(path) {
            Ok(repo) => match Self::from_repository(repo) {
                Ok(repo) => Some(repo),
                Err(e) => {
                    debug!("Ignoring repository found for '{}': {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                debug!("No repository found for '{}': {}", path.display(), e.message());
                None
            }
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Paths of index entries with `mode`, relative to `cwd`.
    ///
    /// Entries outside `cwd` are left out.
    fn files_with_mode(&self, cwd: &Path, mode: u32) -> Result<Vec<String>> {
        let cwd = fs::canonicalize(cwd).map_err(|e| Error::file(cwd, e))?;
        let index = self.repo.index()?;

        Ok(index
            .iter()
            .filter(|entry| entry.mode == mode)
            .filter_map(|entry| {
                let name = String::from_utf8_lossy(&entry.path).into_owned();
                let full = self.workdir.join(&name);
                full.strip_prefix(&cwd).ok().map(posix_path)
            })
            .filter(|name| !name.is_empty())
            .collect())
    }

    pub fn executable_files<P: AsRef<Path>>(&self, cwd: P) -> Result<Vec<String>> {
        self.files_with_mode(cwd.as_ref(), MODE_EXECUTABLE)
    }

    pub fn submodules<P: AsRef<Path>>(&self, cwd: P) -> Result<Vec<String>> {
        self.files_with_mode(cwd.as_ref(), MODE_SUBMODULE)
    }

    /// Stages `paths` (relative to the work directory).
    ///
    /// With `executable`, regular files are recorded with mode `100755` whatever their
    /// permissions on disk are.
    pub fn add<S: AsRef<str>>(&self, paths: &[S], executable: bool) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let mut index = self.repo.index()?;
        for path in paths {
            let path = Path::new(path.as_ref());
            index.add_path(path)?;
            if executable {
                if let Some(entry) = index.get_path(path, 0) {
                    if entry.mode == MODE_FILE {
                        index.add(&IndexEntry { mode: MODE_EXECUTABLE, ..entry })?;
                    }
                }
            }
            debug!("Staged '{}'", path.display());
        }
        index.write()?;
        Ok(())
    }

    fn config_string(&self, key: &str) -> Option<String> {
        self.repo.config().ok()?.get_string(key).ok().filter(|value| !value.is_empty())
    }

    pub fn user_name(&self) -> Option<String> {
        self.config_string("user.name")
    }

    pub fn user_email(&self) -> Option<String> {
        self.config_string("user.email")
    }
}
