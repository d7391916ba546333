//! `@NAME@` placeholder scanning.
//! File content is split into literal chunks and variable names once, at read time,
//! so writing the output never has to scan the bytes again.

use crate::constants::MARKER;

/// Literal bytes followed by an optional variable reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub literal: Vec<u8>,
    pub variable: Option<String>,
}

/// Result of scanning a template file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// No placeholder: the bytes are copied as they are.
    Literal(Vec<u8>),
    /// At least one placeholder; the last chunk never carries a variable.
    Chunks(Vec<Chunk>),
}

/// Returns true for bytes allowed in a placeholder name.
pub fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

/// Returns true when `name` can appear between two markers.
pub fn is_variable_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(is_name_byte)
}

fn find_marker(content: &[u8], from: usize) -> Option<usize> {
    content[from..].iter().position(|&byte| byte == MARKER).map(|pos| pos + from)
}

/// Splits `content` on `@NAME@` placeholders.
///
/// Every span between two successive markers is tested. A span that is empty or contains
/// anything besides letters, digits and `_` is plain text. Either way the closing marker
/// is tried as the next opening one, so `@A@B@` names both `A` and `B`.
/// Content without any valid placeholder comes back untouched as [`Content::Literal`].
pub fn tokenize(content: Vec<u8>) -> Content {
    let Some(mut open) = find_marker(&content, 0) else {
        return Content::Literal(content);
    };

    let mut chunks = Vec::new();
    let mut chunk_start = 0;

    loop {
        let name_start = open + 1;
        let Some(close) = find_marker(&content, name_start) else {
            break;
        };

        let span = &content[name_start..close];
        if span.is_empty() || !span.iter().all(|&byte| is_name_byte(byte)) {
            open = close;
            continue;
        }

        // a reused closing marker leaves no literal before the next name
        chunks.push(Chunk {
            literal: content[chunk_start.min(open)..open].to_vec(),
            variable: Some(String::from_utf8_lossy(span).into_owned()),
        });
        chunk_start = close + 1;
        open = close;
    }

    if chunks.is_empty() {
        return Content::Literal(content);
    }

    chunks.push(Chunk { literal: content[chunk_start..].to_vec(), variable: None });
    Content::Chunks(chunks)
}

/// Rebuilds file content, asking `resolve` for the value of every placeholder.
pub fn expand<F>(chunks: &[Chunk], mut resolve: F) -> Vec<u8>
where
    F: FnMut(&str) -> String,
{
    let mut output = Vec::new();
    for chunk in chunks {
        output.extend_from_slice(&chunk.literal);
        if let Some(name) = &chunk.variable {
            output.extend_from_slice(resolve(name).as_bytes());
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(literal: &str, variable: Option<&str>) -> Chunk {
        Chunk { literal: literal.as_bytes().to_vec(), variable: variable.map(str::to_string) }
    }

    #[test]
    fn test_no_marker_is_literal() {
        let content = b"int main() { return 0; }\n".to_vec();
        assert_eq!(tokenize(content.clone()), Content::Literal(content));
    }

    #[test]
    fn test_stray_markers_are_literal() {
        for text in ["mail me at user@example.com", "@@", "a @ b @ c", "@only one", "@ @NAME", "x@-@y"] {
            let content = text.as_bytes().to_vec();
            assert_eq!(tokenize(content.clone()), Content::Literal(content), "{text}");
        }
    }

    #[test]
    fn test_single_placeholder() {
        let Content::Chunks(chunks) = tokenize(b"project(@APP_NAME@)\n".to_vec()) else {
            panic!("expected chunks");
        };
        assert_eq!(chunks, vec![chunk("project(", Some("APP_NAME")), chunk(")\n", None)]);
        assert_eq!(expand(&chunks, |_| "v".to_string()), b"project(v)\n");
    }

    #[test]
    fn test_invalid_span_reuses_closing_marker() {
        let Content::Chunks(chunks) = tokenize(b"user@example.com wrote @YEAR@".to_vec()) else {
            panic!("expected chunks");
        };
        assert_eq!(chunks, vec![chunk("user@example.com wrote ", Some("YEAR")), chunk("", None)]);
    }

    #[test]
    fn test_adjacent_placeholders() {
        let Content::Chunks(chunks) = tokenize(b"@A@@B@ and @C@x@D@".to_vec()) else {
            panic!("expected chunks");
        };
        assert_eq!(
            chunks,
            vec![
                chunk("", Some("A")),
                chunk("", Some("B")),
                chunk(" and ", Some("C")),
                chunk("", Some("x")),
                chunk("", Some("D")),
                chunk("", None),
            ]
        );
        let output = expand(&chunks, |name| name.to_lowercase());
        assert_eq!(output, b"ab and cxd");
    }

    #[test]
    fn test_closing_marker_opens_next_name() {
        let Content::Chunks(chunks) = tokenize(b"@A@B@".to_vec()) else {
            panic!("expected chunks");
        };
        let mut names = Vec::new();
        let output = expand(&chunks, |name| {
            names.push(name.to_string());
            name.to_lowercase()
        });
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(output, b"ab");
    }

    #[test]
    fn test_text_between_names_stays_literal() {
        let Content::Chunks(chunks) = tokenize(b"@A@ x @B@;".to_vec()) else {
            panic!("expected chunks");
        };
        assert_eq!(chunks, vec![chunk("", Some("A")), chunk(" x ", Some("B")), chunk(";", None)]);
    }

    #[test]
    fn test_non_utf8_literal_bytes() {
        let content = vec![0xff, b'@', b'N', b'@', 0xfe];
        let Content::Chunks(chunks) = tokenize(content) else {
            panic!("expected chunks");
        };
        assert_eq!(expand(&chunks, |_| String::new()), vec![0xff, 0xfe]);
    }

    #[test]
    fn test_is_variable_name() {
        assert!(is_variable_name("APP_NAME"));
        assert!(is_variable_name("v2"));
        assert!(!is_variable_name(""));
        assert!(!is_variable_name("APP-NAME"));
    }
}
