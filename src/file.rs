use std::{fs::File, io::BufReader, path::{Component, Path, PathBuf}};
use serde_json::Value;
use crate::error::{Result, ViewerError};
use crate::tree::build_tree;
use crate::types::TreeNode;

/// Where searches get their tree and documents from.
pub trait FileSource {
    fn tree(&self) -> Result<Vec<TreeNode>>;
    fn load(&self, path: &str) -> Result<Value>;
}

/// Read-only view over the directory of JSON files being browsed.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Joins a client-supplied relative path onto the root. Anything that could
    /// leave the root (absolute paths, `..`, drive prefixes) is rejected.
    pub fn resolve(&self, rel: &str) -> Result<PathBuf> {
        resolve_under(&self.root, rel)
    }

    pub fn read_json(&self, rel: &str) -> Result<Value> {
        let path = self.resolve(rel)?;
        let f = File::open(&path).map_err(|source| ViewerError::Read {
            path: rel.to_string(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(f)).map_err(|source| ViewerError::Parse {
            path: rel.to_string(),
            source,
        })
    }

    pub fn tree(&self) -> Result<Vec<TreeNode>> {
        build_tree(&self.root).map_err(ViewerError::Tree)
    }
}

impl FileSource for Storage {
    fn tree(&self) -> Result<Vec<TreeNode>> {
        Storage::tree(self)
    }

    fn load(&self, path: &str) -> Result<Value> {
        self.read_json(path)
    }
}

pub(crate) fn resolve_under(root: &Path, rel: &str) -> Result<PathBuf> {
    let rel_path = Path::new(rel);
    let mut joined = root.to_path_buf();
    let mut depth = 0usize;
    for component in rel_path.components() {
        match component {
            Component::Normal(part) => {
                joined.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ViewerError::OutsideRoot(rel.to_string()));
            }
        }
    }
    if depth == 0 {
        return Err(ViewerError::OutsideRoot(rel.to_string()));
    }
    Ok(joined)
}
