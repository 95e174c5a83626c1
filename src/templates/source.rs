//! Fragment block parsing.
//!
//! A template source file is a sequence of fragment blocks. A block starts
//! with a marker line of the form
//!
//! ```text
//! {# fragment http-get #}
//! ```
//!
//! and its body runs to the next marker or the end of the file. Text before
//! the first marker is ignored, which leaves room for file-level comments.

use std::path::Path;

use crate::templates::BuildError;

/// One named fragment as it appeared in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentDef {
    pub name: String,
    pub body: String,
}

/// Split a source file into its fragment blocks, in file order.
pub fn parse_fragments(source: &str, path: &Path) -> Result<Vec<FragmentDef>, BuildError> {
    let mut fragments: Vec<FragmentDef> = Vec::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in source.lines() {
        match marker_name(line, path)? {
            Some(name) => {
                if let Some((done, body)) = current.take() {
                    fragments.push(FragmentDef {
                        name: done,
                        body: body.join("\n"),
                    });
                }
                current = Some((name, Vec::new()));
            }
            None => {
                if let Some((_, body)) = current.as_mut() {
                    body.push(line);
                }
            }
        }
    }

    if let Some((name, body)) = current {
        fragments.push(FragmentDef {
            name,
            body: body.join("\n"),
        });
    }

    Ok(fragments)
}

/// Returns the fragment name if `line` is a marker line, `None` for ordinary
/// content, and an error for a malformed marker.
fn marker_name(line: &str, path: &Path) -> Result<Option<String>, BuildError> {
    let trimmed = line.trim();
    let inner = match trimmed
        .strip_prefix("{#")
        .and_then(|s| s.strip_suffix("#}"))
    {
        Some(inner) => inner.trim(),
        None => return Ok(None),
    };

    let Some(rest) = inner.strip_prefix("fragment") else {
        // an ordinary tera comment line, not a marker
        return Ok(None);
    };
    if !rest.starts_with(char::is_whitespace) {
        return Ok(None);
    }

    let name = rest.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(BuildError::InvalidHeader {
            path: path.to_path_buf(),
            header: trimmed.to_string(),
        });
    }
    Ok(Some(name.to_string()))
}
