use serde::Serialize;
use serde_json::{Map, Value};
use crate::types::JsonNode;

/// Collapsible preview of a JSON document. Only objects and arrays can be
/// shown as a tree; anything else renders as an "Invalid JSON" notice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JsonView {
    Tree { nodes: Vec<JsonNode> },
    Invalid,
}

impl JsonView {
    pub fn build(root: &Value) -> Self {
        match root {
            Value::Object(map) => JsonView::Tree {
                nodes: map.iter().map(|(k, v)| to_node(k.clone(), v, 0)).collect(),
            },
            Value::Array(arr) => JsonView::Tree {
                nodes: arr
                    .iter()
                    .enumerate()
                    .map(|(i, v)| to_node(i.to_string(), v, 0))
                    .collect(),
            },
            _ => JsonView::Invalid,
        }
    }
}

// Top-level containers start open, everything deeper starts collapsed.
fn to_node(key: String, v: &Value, depth: usize) -> JsonNode {
    let (value_type, class, preview) = describe(v);
    let children: Vec<JsonNode> = match v {
        Value::Object(m) => m.iter().map(|(k, c)| to_node(k.clone(), c, depth + 1)).collect(),
        Value::Array(a) => a
            .iter()
            .enumerate()
            .map(|(i, c)| to_node(i.to_string(), c, depth + 1))
            .collect(),
        _ => Vec::new(),
    };
    let has_children = !children.is_empty();
    JsonNode {
        key: Some(key),
        value_type: value_type.into(),
        class: class.into(),
        preview,
        has_children,
        child_count: children.len(),
        expanded: has_children && depth == 0,
        children,
    }
}

fn describe(v: &Value) -> (&'static str, &'static str, String) {
    match v {
        Value::Object(_) => ("object", "json-object-title", "{Object}".into()),
        Value::Array(a) => ("array", "json-array-title", format!("[Array({})]", a.len())),
        Value::String(s) => ("string", "json-value-string", format!("\"{s}\"")),
        Value::Number(n) => ("number", "json-value-number", n.to_string()),
        Value::Bool(b) => ("boolean", "json-value-boolean", b.to_string()),
        Value::Null => ("null", "json-value-null", "null".into()),
    }
}

pub fn get_by_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |acc, k| match acc {
        Value::Object(m) => m.get(k),
        Value::Array(a) => k.parse::<usize>().ok().and_then(|i| a.get(i)),
        _ => None,
    })
}

/// Sets `value` at a dotted path, creating intermediate objects as needed.
/// Paths running through a scalar are ignored.
pub fn set_by_path(target: &mut Value, path: &str, value: Value) {
    let keys: Vec<&str> = path.split('.').collect();
    set_in(target, &keys, value);
}

fn set_in(target: &mut Value, keys: &[&str], value: Value) {
    let Some((first, rest)) = keys.split_first() else { return };
    let slot = match target {
        Value::Object(map) => {
            if rest.is_empty() {
                map.insert((*first).to_string(), value);
                return;
            }
            map.entry((*first).to_string())
                .or_insert_with(|| Value::Object(Map::new()))
        }
        Value::Array(items) => match first.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
            Some(slot) if !rest.is_empty() => slot,
            Some(slot) => {
                *slot = value;
                return;
            }
            None => return,
        },
        _ => return,
    };
    set_in(slot, rest, value);
}

/// Minimal object holding only the given dotted paths of `doc`.
/// Paths that do not resolve are left out.
pub fn select_paths(doc: &Value, paths: &[String]) -> Value {
    let mut out = Value::Object(Map::new());
    for path in paths {
        if let Some(v) = get_by_path(doc, path) {
            set_by_path(&mut out, path, v.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_containers_start_collapsed() {
        let view = JsonView::build(&json!({
            "user": { "profile": { "age": 3 } },
            "tags": ["a"],
            "empty": {}
        }));
        let JsonView::Tree { nodes } = view else { panic!("object root should build a tree") };
        assert_eq!(nodes.len(), 3);
        assert!(nodes[0].expanded);
        assert!(!nodes[0].children[0].expanded);
        assert_eq!(nodes[1].preview, "[Array(1)]");
        assert_eq!(nodes[1].children[0].key.as_deref(), Some("0"));
        assert_eq!(nodes[1].children[0].class, "json-value-string");
        assert_eq!(nodes[1].children[0].preview, "\"a\"");
        assert!(!nodes[2].has_children);
        assert!(!nodes[2].expanded);
    }

    #[test]
    fn scalar_root_is_invalid() {
        assert_eq!(JsonView::build(&json!(42)), JsonView::Invalid);
        assert_eq!(JsonView::build(&Value::Null), JsonView::Invalid);
        assert_eq!(JsonView::build(&json!({})), JsonView::Tree { nodes: vec![] });
    }

    #[test]
    fn dotted_paths_resolve_through_arrays() {
        let doc = json!({ "items": [{ "id": 7 }], "meta": { "owner": "x" } });
        assert_eq!(get_by_path(&doc, "items.0.id"), Some(&json!(7)));
        assert_eq!(get_by_path(&doc, "meta.owner"), Some(&json!("x")));
        assert_eq!(get_by_path(&doc, "meta.missing"), None);
        assert_eq!(get_by_path(&doc, "meta.owner.deeper"), None);
    }

    #[test]
    fn select_paths_builds_minimal_object() {
        let doc = json!({
            "user_id": 5,
            "name": "x",
            "profile": { "user_name": "y", "age": 2 },
            "items": [{ "user": 1, "other": 2 }]
        });
        let keys = vec![
            "user_id".to_string(),
            "profile.user_name".to_string(),
            "items.0.user".to_string(),
            "nowhere".to_string(),
        ];
        assert_eq!(
            select_paths(&doc, &keys),
            json!({
                "user_id": 5,
                "profile": { "user_name": "y" },
                "items": { "0": { "user": 1 } }
            })
        );
    }
}
