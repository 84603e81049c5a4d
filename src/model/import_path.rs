use std::path::{Path, PathBuf};

use super::ParseError;

/// Location of a package inside a source tree: `<source_root>/src/<import path>`.
pub fn package_source(source_root: &Path, import_path: &str) -> PathBuf {
    let mut result = source_root.join("src");
    for segment in import_path.split('/').filter(|s| !s.is_empty()) {
        result.push(segment);
    }
    result
}

/// The import path followed by each of its strict prefixes, longest first.
///
/// A path without any `/` yields only itself: a single segment is a valid
/// repository root.
pub fn import_path_ancestors(import_path: &str) -> impl Iterator<Item = &str> {
    let trimmed = import_path.trim_matches('/');
    let mut next = Some(trimmed).filter(|s| !s.is_empty());
    std::iter::from_fn(move || {
        let current = next?;
        next = current.rfind('/').map(|index| &current[..index]);
        Some(current)
    })
}

pub(crate) fn validate_import_path(import_path: &str) -> Result<(), ParseError> {
    let invalid = |reason: &str| {
        Err(ParseError::InvalidImportPath(
            import_path.to_owned(),
            reason.to_owned(),
        ))
    };
    if import_path.starts_with('/') {
        return invalid("must be relative");
    }
    if import_path.contains('\\') {
        return invalid("must use `/` as separator");
    }
    if import_path.split('/').any(|s| s == "." || s == "..") {
        return invalid("must not contain `.` or `..` segments");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn ancestors_longest_first() {
        let ancestors: Vec<&str> = import_path_ancestors("golang.org/x/tools/go/vcs").collect();
        assert_eq!(
            ancestors,
            vec![
                "golang.org/x/tools/go/vcs",
                "golang.org/x/tools/go",
                "golang.org/x/tools",
                "golang.org/x",
                "golang.org",
            ]
        );
    }

    #[test]
    fn ancestors_single_segment() {
        let ancestors: Vec<&str> = import_path_ancestors("camlistore.org").collect();
        assert_eq!(ancestors, vec!["camlistore.org"]);
    }

    #[test]
    fn ancestors_empty() {
        assert_eq!(import_path_ancestors("").count(), 0);
        assert_eq!(import_path_ancestors("/").count(), 0);
    }

    #[test]
    fn source_layout() {
        assert_eq!(
            package_source(Path::new("/go"), "example.org/pkg/child"),
            PathBuf::from("/go/src/example.org/pkg/child")
        );
    }

    #[test]
    fn parent_segments_rejected() {
        assert!(validate_import_path("example.org/../etc").is_err());
        assert!(validate_import_path("github.com/./x").is_err());
        assert!(validate_import_path("github.com/.github/x").is_ok());
        assert!(validate_import_path("/abs").is_err());
        assert!(validate_import_path("example.org").is_ok());
    }
}
