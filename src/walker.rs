//! Template tree traversal.
//! Walks a template directory, filters it through the ignore rules discovered on the
//! way and hands every surviving entry to a callback.

use crate::constants::IGNORE_FILE;
use crate::error::{Error, Result};
use crate::ignore::{load_ignore_file, Exclusions};
use crate::path::{posix_path, relative_to, template_path};
use crate::template::{read_template, TemplateEntry};
use log::debug;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Walks `template_root` and calls `on_template` for each entry to copy.
///
/// `root_excludes` are extra rules applied from the template root, on top of the
/// implicit `.git/` rule. A directory's `.gitignore` is loaded when the directory is
/// entered, before any of its children are tested, and is itself passed on verbatim.
/// Entries are visited in file name order.
pub fn read_templates<P, S, F>(template_root: P, root_excludes: &[S], mut on_template: F) -> Result<()>
where
    P: AsRef<Path>,
    S: AsRef<str>,
    F: FnMut(TemplateEntry) -> Result<()>,
{
    let template_root = template_root.as_ref();
    let root = fs::canonicalize(template_root).map_err(|e| Error::file(template_root, e))?;
    let mut exclusions = Exclusions::new(root_excludes)?;
    let mut entries = WalkDir::new(&root).sort_by_file_name().into_iter();

    while let Some(entry) = entries.next() {
        let entry = entry?;
        let path = entry.path();
        let filename = template_path(&root, path)?;

        if entry.file_type().is_dir() {
            if entry.depth() > 0 && exclusions.can_skip_dir(&filename) {
                debug!("Skipping directory '{filename}'");
                entries.skip_current_dir();
                continue;
            }

            let ignore_path = path.join(IGNORE_FILE);
            if ignore_path.is_file() {
                let ignore_name = template_path(&root, &ignore_path)?;
                if exclusions.is_excluded(&ignore_name) {
                    debug!("Skipping '{ignore_name}'");
                } else {
                    let (rules, content) = load_ignore_file(&root, &ignore_path)?;
                    exclusions.push(rules);
                    on_template(TemplateEntry::File { filename: ignore_name, content })?;
                }
            }
            continue;
        }

        // already handled together with its directory
        if entry.file_name() == IGNORE_FILE && path.is_file() {
            continue;
        }

        if exclusions.is_excluded(&filename) {
            debug!("Skipping '{filename}'");
            continue;
        }

        if entry.path_is_symlink() {
            let target = fs::read_link(path).map_err(|e| Error::file(path, e))?;
            let target = link_target(&root, path, &target);
            debug!("Found symlink '{filename}' -> '{target}'");
            on_template(TemplateEntry::Symlink { filename, target })?;
            continue;
        }

        on_template(read_template(path, filename)?)?;
    }

    Ok(())
}

/// Absolute targets pointing inside the template are made relative to the link, so the
/// copy points into the new tree instead of back into the template.
fn link_target(root: &Path, link: &Path, target: &Path) -> String {
    match link.parent() {
        Some(parent) if target.is_absolute() && target.starts_with(root) => {
            posix_path(relative_to(parent, target))
        }
        _ => posix_path(target),
    }
}
