//! Path helpers for script-reference rewriting

use std::path::Path;

/// Express `to` relative to the directory `from`, using forward slashes
/// regardless of host platform. Returns `None` when no relative path exists
/// (e.g. mixing relative and absolute inputs).
pub fn relative_script_path(from: &Path, to: &Path) -> Option<String> {
    pathdiff::diff_paths(to, from).map(|p| p.display().to_string().replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_sibling_directory() {
        let target_dir = PathBuf::from("/work/dist");
        let chunk = PathBuf::from("/work/dist/js/foo.js");

        assert_eq!(
            relative_script_path(&target_dir, &chunk),
            Some("js/foo.js".to_string())
        );
    }

    #[test]
    fn test_parent_directory_traversal() {
        let target_dir = PathBuf::from("/work/dist/html");
        let chunk = PathBuf::from("/work/dist/js/foo.js");

        assert_eq!(
            relative_script_path(&target_dir, &chunk),
            Some("../js/foo.js".to_string())
        );
    }

    #[test]
    fn test_mixed_anchors_have_no_relative_form() {
        assert_eq!(
            relative_script_path(Path::new("/abs/html"), Path::new("js/foo.js")),
            None
        );
    }
}
