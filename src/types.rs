use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Folder {
        name: String,
        children: Vec<TreeNode>,
    },
    File {
        name: String,
        path: String, // root-relative, always '/'-separated
    },
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Folder { name, .. } | TreeNode::File { name, .. } => name,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, TreeNode::Folder { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKind {
    File,
    Folder,
    FileKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub kind: MatchKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>, // absent for folders
    pub keys: Vec<String>,    // dotted paths, only for file-key matches
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonNode {
    pub key: Option<String>,    // object key, or index for array items
    pub value_type: String,     // "object" | "array" | "string" | "number" | "boolean" | "null"
    pub class: String,          // css class used by the front-end
    pub preview: String,        // "{Object}", "[Array(3)]", "\"text\"", ...
    pub has_children: bool,
    pub child_count: usize,
    pub expanded: bool,
    pub children: Vec<JsonNode>,
}
