use std::borrow::Cow;
use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use tracing::debug;
use crate::file::FileSource;
use crate::types::{MatchKind, SearchResult, TreeNode};

#[derive(Debug, Clone, Copy, Default)]
pub struct MatchOptions {
    pub case_sensitive: bool,
    pub whole_word: bool,
    pub regex: bool,
}

/// Query compiled once per search. Default options give a case-insensitive
/// substring match.
#[derive(Debug, Clone)]
pub struct Matcher {
    query: String,
    re: Option<Regex>,
    case_sensitive: bool,
    whole_word: bool,
}

impl Matcher {
    pub fn new(query: &str, options: MatchOptions) -> Self {
        // an invalid pattern falls back to plain substring matching
        let re = if options.regex && !query.is_empty() {
            RegexBuilder::new(query)
                .case_insensitive(!options.case_sensitive)
                .build()
                .ok()
        } else {
            None
        };
        Self {
            query: if options.case_sensitive { query.to_string() } else { query.to_lowercase() },
            re,
            case_sensitive: options.case_sensitive,
            whole_word: options.whole_word,
        }
    }

    pub fn substring(query: &str) -> Self {
        Self::new(query, MatchOptions::default())
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    pub fn matches(&self, text: &str) -> bool {
        if let Some(re) = &self.re {
            return re.is_match(text);
        }
        let text: Cow<'_, str> = if self.case_sensitive {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(text.to_lowercase())
        };
        text_matches(&text, &self.query, self.whole_word)
    }
}

// text and query are already case-normalized here
fn text_matches(text: &str, query: &str, whole_word: bool) -> bool {
    if whole_word {
        text.split(|c: char| !c.is_alphanumeric()).any(|word| word == query)
    } else {
        text.contains(query)
    }
}

/// Filters the loaded document by key, and by serialized value when
/// `include_values` is set. Objects keep matching entries; arrays keep the
/// items that have at least one matching entry. Returns `None` for an empty query.
pub fn filter_document(doc: &Value, matcher: &Matcher, include_values: bool) -> Option<Value> {
    if matcher.is_empty() {
        return None;
    }
    let entry_matches = |key: &str, value: &Value| {
        matcher.matches(key)
            || (include_values
                && serde_json::to_string(value).is_ok_and(|s| matcher.matches(&s)))
    };

    let filtered = match doc {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, v)| entry_matches(k.as_str(), *v))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .filter(|item| match item {
                    Value::Object(m) => m.iter().any(|(k, v)| entry_matches(k.as_str(), v)),
                    Value::Array(a) => a
                        .iter()
                        .enumerate()
                        .any(|(i, v)| entry_matches(i.to_string().as_str(), v)),
                    _ => false,
                })
                .cloned()
                .collect(),
        ),
        _ => Value::Object(Map::new()),
    };
    Some(filtered)
}

/// Dotted paths of every key, at any depth, that the matcher accepts. Array
/// items are addressed by index. Keys containing '.' cannot be expressed as a
/// dotted path, so they and their subtrees are skipped.
pub fn find_matching_keys(value: &Value, matcher: &Matcher) -> Vec<String> {
    let mut out = Vec::new();
    collect_keys(value, None, matcher, &mut out);
    out
}

// `prefix` is `None` only at the document root; an empty key still gets its dot.
fn collect_keys(value: &Value, prefix: Option<&str>, matcher: &Matcher, out: &mut Vec<String>) {
    let mut visit = |key: &str, child: &Value| {
        if key.contains('.') {
            return;
        }
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.to_string(),
        };
        if matcher.matches(key) {
            out.push(path.clone());
        }
        collect_keys(child, Some(path.as_str()), matcher, out);
    };
    match value {
        Value::Object(map) => map.iter().for_each(|(k, v)| visit(k.as_str(), v)),
        Value::Array(items) => items.iter().enumerate().for_each(|(i, v)| visit(i.to_string().as_str(), v)),
        _ => {}
    }
}

enum Step<'a> {
    Hit(SearchResult),
    Scan { name: &'a str, path: &'a str },
}

/// Walks `nodes` in tree order matching names, then loads every file and
/// matches its keys. Files are loaded in parallel; result order still follows
/// the traversal. Unreadable files are skipped.
pub fn search_folder<S>(source: &S, nodes: &[TreeNode], matcher: &Matcher) -> Vec<SearchResult>
where
    S: FileSource + Sync + ?Sized,
{
    if matcher.is_empty() {
        return Vec::new();
    }
    let mut steps = Vec::new();
    plan(nodes, matcher, &mut steps);

    steps
        .into_par_iter()
        .filter_map(|step| match step {
            Step::Hit(result) => Some(result),
            Step::Scan { name, path } => match source.load(path) {
                Ok(doc) => {
                    let keys = find_matching_keys(&doc, matcher);
                    (!keys.is_empty()).then(|| SearchResult {
                        kind: MatchKind::FileKey,
                        name: name.to_string(),
                        path: Some(path.to_string()),
                        keys,
                    })
                }
                Err(e) => {
                    debug!(path, error = %e, "skipping file during search");
                    None
                }
            },
        })
        .collect()
}

fn plan<'a>(nodes: &'a [TreeNode], matcher: &Matcher, steps: &mut Vec<Step<'a>>) {
    for node in nodes {
        if matcher.matches(node.name()) {
            steps.push(Step::Hit(match node {
                TreeNode::Folder { name, .. } => SearchResult {
                    kind: MatchKind::Folder,
                    name: name.clone(),
                    path: None,
                    keys: Vec::new(),
                },
                TreeNode::File { name, path } => SearchResult {
                    kind: MatchKind::File,
                    name: name.clone(),
                    path: Some(path.clone()),
                    keys: Vec::new(),
                },
            }));
        }
        match node {
            TreeNode::Folder { children, .. } => plan(children, matcher, steps),
            TreeNode::File { name, path } => steps.push(Step::Scan { name, path }),
        }
    }
}
