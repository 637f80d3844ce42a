use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ViewerError {
    #[error("path escapes storage root: {0}")]
    OutsideRoot(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to build folder tree: {0}")]
    Tree(#[source] std::io::Error),
    #[error("could not load {0}")]
    Page(String),
    #[error("static asset not found: {0}")]
    Asset(String),
    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ViewerError>;

impl IntoResponse for ViewerError {
    fn into_response(self) -> Response {
        // Read, parse and containment failures look the same to clients.
        match &self {
            ViewerError::OutsideRoot(_) | ViewerError::Read { .. } | ViewerError::Parse { .. } => {
                warn!(error = %self, "file request failed");
                (StatusCode::NOT_FOUND, "File not found or invalid JSON").into_response()
            }
            ViewerError::Tree(_) => {
                error!(error = %self, "error building folder tree");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to build folder tree." })),
                )
                    .into_response()
            }
            ViewerError::Page(name) => {
                error!(error = %self, "could not load page");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Could not load {name}"),
                )
                    .into_response()
            }
            ViewerError::Asset(_) => {
                warn!(error = %self, "static asset request failed");
                (StatusCode::NOT_FOUND, "Not found").into_response()
            }
            ViewerError::Join(_) => {
                error!(error = %self, "blocking task failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal error." })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_errors_collapse_to_not_found() {
        let err = ViewerError::OutsideRoot("../etc/passwd".into());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);

        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ViewerError::Parse { path: "a.json".into(), source: parse };
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn tree_errors_are_server_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ViewerError::Tree(io);
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
