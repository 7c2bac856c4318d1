//! The bookmarks document: a JSON object whose `roots` member holds three
//! named trees of nodes (`bookmark_bar`, `other`, `synced`). Every node
//! carries `id`, `name` and `type`; folders carry a `children` array.
//!
//! Mutation happens on the raw `serde_json::Value` tree so fields we do not
//! model (`guid`, `meta_info`, the file checksum, ...) survive a rewrite
//! byte-for-byte within each untouched node.

use crate::{Error, Result};
use heliumctl_core::time;
use serde::Serialize;
use serde_json::Value;

/// Root container keys, in the order Chromium defines them.
pub const ROOT_KEYS: [(&str, &str); 3] = [
    ("bookmark_bar", "Bookmarks Bar"),
    ("other", "Other Bookmarks"),
    ("synced", "Synced Bookmarks"),
];

/// One bookmark or folder, flattened out of the tree for listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookmarkItem {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub is_folder: bool,
    /// Microseconds since the Chromium epoch; 0 when absent.
    pub date_added: i64,
    /// `"Bookmarks Bar > Work > Docs"` style location.
    pub folder_path: String,
}

impl BookmarkItem {
    pub fn date_added_utc(&self) -> chrono::DateTime<chrono::Utc> {
        time::from_chromium_micros(self.date_added)
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self
                .url
                .as_deref()
                .is_some_and(|url| url.to_lowercase().contains(&query))
            || self.folder_path.to_lowercase().contains(&query)
    }
}

pub fn parse(content: &str) -> Result<Value> {
    let doc: Value = serde_json::from_str(content)?;
    if !doc.is_object() {
        return Err(Error::Parse(serde::de::Error::custom(
            "bookmarks document is not a JSON object",
        )));
    }
    Ok(doc)
}

/// Flatten the three root trees into listing order, depth first.
pub fn flatten(doc: &Value) -> Vec<BookmarkItem> {
    let mut items = Vec::new();
    let Some(roots) = doc.get("roots").and_then(Value::as_object) else {
        return items;
    };

    for (key, label) in ROOT_KEYS {
        if let Some(children) = roots
            .get(key)
            .and_then(|root| root.get("children"))
            .and_then(Value::as_array)
        {
            for child in children {
                flatten_node(child, label, &mut items);
            }
        }
    }
    items
}

fn flatten_node(node: &Value, path: &str, out: &mut Vec<BookmarkItem>) {
    let id = node.get("id").and_then(Value::as_str).unwrap_or_default();
    let name = node.get("name").and_then(Value::as_str).unwrap_or_default();
    let date_added = node
        .get("date_added")
        .and_then(|v| v.as_i64().or_else(|| v.as_str()?.parse().ok()))
        .unwrap_or(0);

    match node.get("type").and_then(Value::as_str) {
        Some("folder") => {
            let folder_path = format!("{path} > {name}");
            out.push(BookmarkItem {
                id: id.to_string(),
                name: name.to_string(),
                url: None,
                is_folder: true,
                date_added,
                folder_path: folder_path.clone(),
            });
            if let Some(children) = node.get("children").and_then(Value::as_array) {
                for child in children {
                    flatten_node(child, &folder_path, out);
                }
            }
        }
        Some("url") => {
            let url = node.get("url").and_then(Value::as_str);
            out.push(BookmarkItem {
                id: id.to_string(),
                name: if name.is_empty() {
                    url.unwrap_or("Untitled").to_string()
                } else {
                    name.to_string()
                },
                url: url.map(str::to_string),
                is_folder: false,
                date_added,
                folder_path: path.to_string(),
            });
        }
        _ => {}
    }
}

/// Splice the node with `id` out of whichever root tree contains it.
/// Returns whether a node was removed.
pub fn remove_by_id(doc: &mut Value, id: &str) -> bool {
    let Some(roots) = doc.get_mut("roots").and_then(Value::as_object_mut) else {
        return false;
    };
    for (key, _) in ROOT_KEYS {
        if let Some(root) = roots.get_mut(key)
            && remove_from_node(root, id)
        {
            return true;
        }
    }
    false
}

fn remove_from_node(node: &mut Value, id: &str) -> bool {
    let Some(children) = node.get_mut("children").and_then(Value::as_array_mut) else {
        return false;
    };

    if let Some(index) = children
        .iter()
        .position(|child| child.get("id").and_then(Value::as_str) == Some(id))
    {
        children.remove(index);
        return true;
    }

    children.iter_mut().any(|child| remove_from_node(child, id))
}

/// Whether any root tree still contains a node with `id`.
pub fn contains_id(doc: &Value, id: &str) -> bool {
    let Some(roots) = doc.get("roots").and_then(Value::as_object) else {
        return false;
    };
    ROOT_KEYS
        .iter()
        .filter_map(|(key, _)| roots.get(*key))
        .any(|root| node_contains(root, id))
}

fn node_contains(node: &Value, id: &str) -> bool {
    if node.get("id").and_then(Value::as_str) == Some(id) {
        return true;
    }
    node.get("children")
        .and_then(Value::as_array)
        .is_some_and(|children| children.iter().any(|child| node_contains(child, id)))
}
