use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, Request};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tokio::task::spawn_blocking;
use tracing::Instrument;
use crate::error::{Result, ViewerError};
use crate::file::resolve_under;
use crate::node::{select_paths, JsonView};
use crate::search::{filter_document, search_folder, Matcher, MatchOptions};
use crate::state::AppState;
use crate::tree::scope;
use crate::types::{SearchResult, TreeNode};

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/tree", get(api_tree))
        .route("/file/*path", get(api_file))
        .route("/view/*path", get(api_view))
        .route("/filter/*path", get(api_filter))
        .route("/extract/*path", get(api_extract))
        .route("/search", get(api_search));

    Router::new()
        .route("/", get(index_html))
        .route("/static/*path", get(static_asset))
        .nest("/api", api)
        .layer(middleware::from_fn(trace_requests))
        .with_state(state)
}

async fn trace_requests(request: Request<Body>, next: Next) -> Response {
    let span = tracing::info_span!(
        "http.request",
        method = %request.method(),
        route = %request.uri().path(),
    );
    let response = next.run(request).instrument(span.clone()).await;
    span.in_scope(|| tracing::debug!(status = response.status().as_u16(), "request finished"));
    response
}

// Filesystem work runs on the blocking pool.
async fn load_json(state: &AppState, rel: String) -> Result<Value> {
    let storage = state.storage.clone();
    spawn_blocking(move || storage.read_json(&rel)).await?
}

async fn api_tree(State(state): State<AppState>) -> Result<Json<Vec<TreeNode>>> {
    let storage = state.storage.clone();
    let tree = spawn_blocking(move || storage.tree()).await??;
    Ok(Json(tree))
}

async fn api_file(State(state): State<AppState>, Path(rel): Path<String>) -> Result<Json<Value>> {
    Ok(Json(load_json(&state, rel).await?))
}

async fn api_view(State(state): State<AppState>, Path(rel): Path<String>) -> Result<Response> {
    let doc = load_json(&state, rel).await?;
    Ok(document_response(doc, true))
}

#[derive(Deserialize)]
struct FilterParams {
    #[serde(default)]
    q: String,
    #[serde(default)]
    values: bool,
    #[serde(default)]
    keys: String,
    #[serde(default)]
    view: bool,
}

// Raw document, or its preview model when `view` is set.
fn document_response(doc: Value, view: bool) -> Response {
    if view {
        Json(JsonView::build(&doc)).into_response()
    } else {
        Json(doc).into_response()
    }
}

// Comma separated dotted paths; blanks are dropped.
fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

// What the client has on display: the whole file, or only the given paths.
fn displayed(doc: Value, keys: &str) -> Value {
    let keys = split_keys(keys);
    if keys.is_empty() {
        doc
    } else {
        select_paths(&doc, &keys)
    }
}

/// Key filter over the displayed document (the extracted paths when `keys` is
/// set). An empty query returns that document as is.
async fn api_filter(
    State(state): State<AppState>,
    Path(rel): Path<String>,
    Query(params): Query<FilterParams>,
) -> Result<Response> {
    let doc = displayed(load_json(&state, rel).await?, &params.keys);
    let filtered = filter_document(&doc, &Matcher::substring(&params.q), params.values);
    Ok(document_response(filtered.unwrap_or(doc), params.view))
}

#[derive(Deserialize)]
struct ExtractParams {
    #[serde(default)]
    keys: String,
    #[serde(default)]
    view: bool,
}

async fn api_extract(
    State(state): State<AppState>,
    Path(rel): Path<String>,
    Query(params): Query<ExtractParams>,
) -> Result<Response> {
    let doc = load_json(&state, rel).await?;
    Ok(document_response(displayed(doc, &params.keys), params.view))
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    folder: String,
    #[serde(default)]
    q: String,
    #[serde(default)]
    case_sensitive: bool,
    #[serde(default)]
    whole_word: bool,
    #[serde(default)]
    regex: bool,
}

async fn api_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchResult>>> {
    let SearchParams { folder, q, case_sensitive, whole_word, regex } = params;
    let matcher = Matcher::new(&q, MatchOptions { case_sensitive, whole_word, regex });
    let storage = state.storage.clone();
    let scoped = folder.clone();
    let results = spawn_blocking(move || -> Result<Vec<SearchResult>> {
        let tree = storage.tree()?;
        Ok(search_folder(storage.as_ref(), scope(&tree, &scoped), &matcher))
    })
    .await??;
    tracing::debug!(%folder, hits = results.len(), "search finished");
    Ok(Json(results))
}

async fn index_html(State(state): State<AppState>) -> Result<Html<String>> {
    let path = state.public_dir.join("index.html");
    tokio::fs::read_to_string(&path)
        .await
        .map(Html)
        .map_err(|_| ViewerError::Page("index.html".into()))
}

async fn static_asset(State(state): State<AppState>, Path(rel): Path<String>) -> Result<Response> {
    let path = resolve_under(&state.public_dir, &rel).map_err(|_| ViewerError::Asset(rel.clone()))?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ViewerError::Asset(rel.clone()))?;
    Ok(([(header::CONTENT_TYPE, content_type(&rel))], bytes).into_response())
}

fn content_type(path: &str) -> &'static str {
    match path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase()).as_deref() {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("ico") => "image/x-icon",
        _ => "application/octet-stream",
    }
}
