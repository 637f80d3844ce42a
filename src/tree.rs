use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;
use crate::types::TreeNode;

/// Never listed in the tree.
pub const RESERVED_FILENAME: &str = "index.json";

pub fn build_tree(root: &Path) -> io::Result<Vec<TreeNode>> {
    walk(root, "")
}

fn walk(dir: &Path, rel: &str) -> io::Result<Vec<TreeNode>> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    let mut nodes = Vec::with_capacity(entries.len());
    for entry in entries {
        // a lossy name could not be fetched back through the file endpoint
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                warn!(dir = %dir.display(), name = ?raw, "skipping entry with non UTF-8 name");
                continue;
            }
        };
        if name == RESERVED_FILENAME {
            continue;
        }
        let child_rel = if rel.is_empty() { name.clone() } else { format!("{rel}/{name}") };
        if entry.file_type()?.is_dir() {
            let children = walk(&entry.path(), &child_rel)?;
            nodes.push(TreeNode::Folder { name, children });
        } else {
            nodes.push(TreeNode::File { name, path: child_rel });
        }
    }
    Ok(nodes)
}

/// Descends through `folder_path` (slash separated) and returns the children of
/// the deepest folder found. Unknown segments stop the descent.
pub fn scope<'a>(nodes: &'a [TreeNode], folder_path: &str) -> &'a [TreeNode] {
    let mut current = nodes;
    for segment in folder_path.split('/').filter(|s| !s.is_empty()) {
        let found = current.iter().find_map(|n| match n {
            TreeNode::Folder { name, children } if name == segment => Some(children.as_slice()),
            _ => None,
        });
        match found {
            Some(children) => current = children,
            None => break,
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn count_files(nodes: &[TreeNode]) -> usize {
        nodes
            .iter()
            .map(|n| match n {
                TreeNode::Folder { children, .. } => count_files(children),
                TreeNode::File { .. } => 1,
            })
            .sum()
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("users/archive")).expect("mkdir");
        fs::write(dir.path().join("index.json"), "{}").expect("write");
        fs::write(dir.path().join("settings.json"), "{}").expect("write");
        fs::write(dir.path().join("users/profile.json"), "{}").expect("write");
        fs::write(dir.path().join("users/index.json"), "{}").expect("write");
        fs::write(dir.path().join("users/archive/old.json"), "[]").expect("write");
        dir
    }

    #[test]
    fn builds_nested_tree_without_reserved_files() {
        let dir = fixture();
        let tree = build_tree(dir.path()).expect("tree");
        assert_eq!(
            tree,
            vec![
                TreeNode::File { name: "settings.json".into(), path: "settings.json".into() },
                TreeNode::Folder {
                    name: "users".into(),
                    children: vec![
                        TreeNode::Folder {
                            name: "archive".into(),
                            children: vec![TreeNode::File {
                                name: "old.json".into(),
                                path: "users/archive/old.json".into(),
                            }],
                        },
                        TreeNode::File {
                            name: "profile.json".into(),
                            path: "users/profile.json".into(),
                        },
                    ],
                },
            ]
        );
    }

    #[test]
    fn leaf_count_matches_files_on_disk() {
        let dir = tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("a/b")).expect("mkdir");
        for rel in ["x.json", "a/y.json", "a/b/z.json", "a/b/w.txt"] {
            fs::write(dir.path().join(rel), "{}").expect("write");
        }
        let tree = build_tree(dir.path()).expect("tree");
        assert_eq!(count_files(&tree), 4);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempdir().expect("tempdir");
        assert!(build_tree(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn tree_serializes_with_type_tags() {
        let node = TreeNode::Folder {
            name: "users".into(),
            children: vec![TreeNode::File { name: "a.json".into(), path: "users/a.json".into() }],
        };
        assert_eq!(
            serde_json::to_value(&node).expect("json"),
            serde_json::json!({
                "type": "folder",
                "name": "users",
                "children": [{ "type": "file", "name": "a.json", "path": "users/a.json" }]
            })
        );
    }

    #[test]
    fn scope_stops_at_deepest_existing_folder() {
        let dir = fixture();
        let tree = build_tree(dir.path()).expect("tree");
        assert_eq!(scope(&tree, "").len(), 2);
        assert_eq!(scope(&tree, "users").len(), 2);
        assert_eq!(scope(&tree, "users/archive")[0].name(), "old.json");
        assert_eq!(scope(&tree, "users/missing/deeper").len(), 2);
        assert_eq!(scope(&tree, "settings.json").len(), 2);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_names_are_left_out() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join(OsStr::from_bytes(b"bad\xffname.json")), "{}").expect("write");
        fs::write(dir.path().join("good.json"), "{}").expect("write");
        let tree = build_tree(dir.path()).expect("tree");
        assert_eq!(
            tree,
            vec![TreeNode::File { name: "good.json".into(), path: "good.json".into() }]
        );
    }
}
