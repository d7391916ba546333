//! Template entries produced by the walker and consumed by the writer.

use crate::error::{Error, Result};
use crate::placeholder::{tokenize, Chunk, Content};
use std::fs;
use std::path::Path;

/// One surviving entry of the template tree.
///
/// `filename` is relative to the template root and uses `/` separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateEntry {
    /// Symbolic link, recreated with the same (relative) target.
    Symlink { filename: String, target: String },
    /// File copied byte for byte.
    File { filename: String, content: Vec<u8> },
    /// File containing placeholders.
    Variable { filename: String, chunks: Vec<Chunk> },
}

impl TemplateEntry {
    pub fn filename(&self) -> &str {
        match self {
            TemplateEntry::Symlink { filename, .. }
            | TemplateEntry::File { filename, .. }
            | TemplateEntry::Variable { filename, .. } => filename,
        }
    }
}

/// Reads the file at `path` and classifies it by its content.
pub fn read_template<P: AsRef<Path>>(path: P, filename: String) -> Result<TemplateEntry> {
    let path = path.as_ref();
    let content = fs::read(path).map_err(|e| Error::file(path, e))?;
    Ok(match tokenize(content) {
        Content::Literal(content) => TemplateEntry::File { filename, content },
        Content::Chunks(chunks) => TemplateEntry::Variable { filename, chunks },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_template() {
        let temp_dir = TempDir::new().unwrap();
        let plain = temp_dir.path().join("plain.txt");
        let variable = temp_dir.path().join("CMakeLists.txt");
        fs::write(&plain, "no placeholders @ here\n").unwrap();
        fs::write(&variable, "project(@APP_NAME@)\n").unwrap();

        match read_template(&plain, "plain.txt".to_string()).unwrap() {
            TemplateEntry::File { filename, content } => {
                assert_eq!(filename, "plain.txt");
                assert_eq!(content, b"no placeholders @ here\n");
            }
            other => panic!("expected a plain file, got {other:?}"),
        }

        let entry = read_template(&variable, "CMakeLists.txt".to_string()).unwrap();
        assert_eq!(entry.filename(), "CMakeLists.txt");
        assert!(matches!(entry, TemplateEntry::Variable { ref chunks, .. } if chunks.len() == 2));
    }

    #[test]
    fn test_read_missing_template() {
        let err = read_template("/definitely/not/here", "here".to_string()).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here"));
    }
}
