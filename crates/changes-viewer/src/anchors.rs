//! Stable anchors for file containers and their content regions.
//!
//! The rendering layer uses these as list keys and as scroll targets, so they
//! must be a pure function of the file's path pair.

/// Joins the old and new path. Four colons never occur inside a git path.
pub const PATH_SEPARATOR: &str = "::::";

pub const CONTAINER_PREFIX: &str = "container-";
pub const CONTENT_PREFIX: &str = "content-";

/// The two identifiers derived for one file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileAnchors {
    /// Addresses the whole file block (header plus content).
    pub container_id: String,
    /// Addresses the diff content region inside the block.
    pub content_id: String,
}

/// Derive the container and content anchors for a path pair.
///
/// Empty and missing paths are skipped when building the combined key; when
/// both are absent the key is empty and the anchors are just the prefixes.
pub fn derive_anchors(old_path: Option<&str>, new_path: Option<&str>) -> FileAnchors {
    let key = combined_key(old_path, new_path);
    FileAnchors {
        container_id: format!("{CONTAINER_PREFIX}{key}"),
        content_id: format!("{CONTENT_PREFIX}{key}"),
    }
}

fn combined_key(old_path: Option<&str>, new_path: Option<&str>) -> String {
    [old_path, new_path]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_pair_same_anchors() {
        let first = derive_anchors(Some("src/lib.rs"), Some("src/lib.rs"));
        let second = derive_anchors(Some("src/lib.rs"), Some("src/lib.rs"));
        assert_eq!(first, second);
        assert_eq!(first.container_id, "container-src/lib.rs::::src/lib.rs");
        assert_eq!(first.content_id, "content-src/lib.rs::::src/lib.rs");
    }

    #[test]
    fn test_container_and_content_never_collide() {
        let anchors = derive_anchors(Some("a"), Some("b"));
        assert_ne!(anchors.container_id, anchors.content_id);
    }

    #[test]
    fn test_distinct_pairs_distinct_anchors() {
        let pairs = [
            (Some("a/b"), Some("c")),
            (Some("a"), Some("b/c")),
            (Some("a:b"), Some("c")),
            (Some("a"), Some(":b:c")),
            (None, Some("a")),
            (Some("a"), Some("a")),
            (Some("old.rs"), Some("new.rs")),
            (Some("new.rs"), Some("old.rs")),
        ];

        let mut seen = std::collections::HashSet::new();
        for (old, new) in pairs {
            assert!(
                seen.insert(derive_anchors(old, new)),
                "collision for {:?} / {:?}",
                old,
                new
            );
        }
    }

    #[test]
    fn test_missing_and_empty_sides_are_skipped() {
        assert_eq!(
            derive_anchors(None, Some("added.rs")),
            derive_anchors(Some(""), Some("added.rs"))
        );
        assert_eq!(derive_anchors(Some("gone.rs"), None).content_id, "content-gone.rs");
    }

    #[test]
    fn test_degenerate_pair_is_deterministic() {
        let anchors = derive_anchors(None, None);
        assert_eq!(anchors.container_id, "container-");
        assert_eq!(anchors.content_id, "content-");
        assert_eq!(anchors, derive_anchors(Some(""), Some("")));
    }
}
