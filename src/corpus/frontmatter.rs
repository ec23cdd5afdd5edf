//! Front-matter splitting and deserialization.
//!
//! Content files open with a YAML block between `---` fences, followed by
//! the markdown body:
//!
//! ```text
//! ---
//! title: The Curb Cut Effect
//! tags: [accessibility]
//! ---
//! Body text...
//! ```

use super::error::CorpusError;
use serde::de::DeserializeOwned;
use std::path::Path;

/// A file split into raw front matter and body.
#[derive(Debug, PartialEq, Eq)]
pub struct RawDocument<'a> {
    pub front_matter: &'a str,
    pub body: &'a str,
}

/// Split a content file into its front-matter block and markdown body.
///
/// The opening fence must be the first non-empty line. A missing or
/// unterminated fence is a contract violation: every corpus file carries
/// front matter.
pub fn split_document<'a>(path: &Path, raw: &'a str) -> Result<RawDocument<'a>, CorpusError> {
    let trimmed = raw.trim_start_matches('\u{feff}');
    let rest = trimmed.trim_start();
    let Some(rest) = rest.strip_prefix("---") else {
        return Err(CorpusError::MissingFrontMatter(path.to_path_buf()));
    };
    // Fence must be a full line
    let rest = match rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) {
        Some(r) => r,
        None => return Err(CorpusError::MissingFrontMatter(path.to_path_buf())),
    };

    // Closing fence: a line that is exactly `---`
    for (idx, line) in line_spans(rest) {
        if line.trim_end() == "---" {
            let front_matter = &rest[..idx];
            let body_start = idx + line.len();
            let body = rest[body_start..].trim_start_matches(['\r', '\n']);
            return Ok(RawDocument { front_matter, body });
        }
    }
    Err(CorpusError::MissingFrontMatter(path.to_path_buf()))
}

/// Deserialize a file's front matter into `T` and return it with the body.
pub fn parse_document<T: DeserializeOwned>(
    path: &Path,
    raw: &str,
) -> Result<(T, String), CorpusError> {
    let doc = split_document(path, raw)?;
    let meta: T = serde_yaml::from_str(doc.front_matter)
        .map_err(|e| CorpusError::FrontMatter(path.to_path_buf(), e))?;
    Ok((meta, doc.body.to_owned()))
}

/// Iterate over lines with their byte offsets, newline included.
fn line_spans(s: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    std::iter::from_fn(move || {
        if offset >= s.len() {
            return None;
        }
        let rest = &s[offset..];
        let len = rest.find('\n').map_or(rest.len(), |i| i + 1);
        let item = (offset, &rest[..len]);
        offset += len;
        Some(item)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::types::Essay;
    use std::path::PathBuf;

    fn path() -> PathBuf {
        PathBuf::from("essays/test.md")
    }

    #[test]
    fn test_split_basic() {
        let raw = "---\ntitle: Hello\n---\nBody here.\n";
        let doc = split_document(&path(), raw).unwrap();
        assert_eq!(doc.front_matter, "title: Hello\n");
        assert_eq!(doc.body, "Body here.\n");
    }

    #[test]
    fn test_split_crlf() {
        let raw = "---\r\ntitle: Hello\r\n---\r\nBody.\r\n";
        let doc = split_document(&path(), raw).unwrap();
        assert_eq!(doc.front_matter, "title: Hello\r\n");
        assert_eq!(doc.body, "Body.\r\n");
    }

    #[test]
    fn test_split_empty_body() {
        let raw = "---\ntitle: Hello\n---\n";
        let doc = split_document(&path(), raw).unwrap();
        assert_eq!(doc.body, "");
    }

    #[test]
    fn test_split_missing_fence() {
        let raw = "title: Hello\nBody.";
        assert!(matches!(
            split_document(&path(), raw),
            Err(CorpusError::MissingFrontMatter(_))
        ));
    }

    #[test]
    fn test_split_unterminated_fence() {
        let raw = "---\ntitle: Hello\nBody without closing fence.";
        assert!(matches!(
            split_document(&path(), raw),
            Err(CorpusError::MissingFrontMatter(_))
        ));
    }

    #[test]
    fn test_split_dashes_inside_body() {
        let raw = "---\ntitle: Hello\n---\nText\n---\nMore text.";
        let doc = split_document(&path(), raw).unwrap();
        // Only the first closing fence terminates the front matter
        assert!(doc.body.contains("More text."));
        assert!(doc.body.starts_with("Text"));
    }

    #[test]
    fn test_split_bom() {
        let raw = "\u{feff}---\ntitle: Hello\n---\nBody.";
        let doc = split_document(&path(), raw).unwrap();
        assert_eq!(doc.front_matter, "title: Hello\n");
    }

    #[test]
    fn test_parse_document_essay() {
        let raw = "---\ntitle: Hello\ntags: [a, b]\n---\nThe body.";
        let (essay, body) = parse_document::<Essay>(&path(), raw).unwrap();
        assert_eq!(essay.title, "Hello");
        assert_eq!(essay.tags, vec!["a", "b"]);
        assert_eq!(body, "The body.");
    }

    #[test]
    fn test_parse_document_bad_yaml() {
        let raw = "---\ntitle: [unclosed\n---\nBody.";
        let err = parse_document::<Essay>(&path(), raw).unwrap_err();
        assert!(matches!(err, CorpusError::FrontMatter(..)));
    }
}
