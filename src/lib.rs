// Module declarations
mod config;
mod error;
mod file;
mod node;
mod routes;
mod search;
mod state;
mod tree;
mod types;

pub use config::Config;
pub use error::{Result, ViewerError};
pub use file::{FileSource, Storage};
pub use node::{get_by_path, select_paths, set_by_path, JsonView};
pub use routes::build_router;
pub use search::{filter_document, find_matching_keys, search_folder, MatchOptions, Matcher};
pub use state::AppState;
pub use tree::{build_tree, scope, RESERVED_FILENAME};
pub use types::{JsonNode, MatchKind, SearchResult, TreeNode};
