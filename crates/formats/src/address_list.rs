//! Address list documents.
//!
//! Two shapes are accepted:
//! - a flat array of entries: `[{"address": "...", "videoUrl": "..."}, ...]`
//! - entries grouped by category: `{"Regional": [{"address": "..."}], ...}`
//!
//! Both normalize to a flat `Vec<AddressEntry>`. Grouped documents are
//! flattened in ascending category order, entries within a category keep
//! their document order.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use proximity::{KEY_ADDRESS, KEY_CATEGORY};
use serde::Serialize;
use serde_json::{Map, Value};

/// One address to geocode, with the display metadata that travels with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressEntry {
    pub address: String,
    pub category: Option<String>,
    /// String-valued fields other than `address` and `category`
    /// (`thumbnailUrl`, `videoUrl`, ...).
    pub metadata: BTreeMap<String, String>,
}

impl AddressEntry {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            category: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Full marker metadata: the extra fields plus `address` and `category`.
    pub fn marker_metadata(&self) -> BTreeMap<String, String> {
        let mut out = self.metadata.clone();
        out.insert(KEY_ADDRESS.to_string(), self.address.clone());
        if let Some(category) = &self.category {
            out.insert(KEY_CATEGORY.to_string(), category.clone());
        }
        out
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AddressListError {
    #[error("address list is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected address list shape: {0}")]
    Shape(String),
    #[error("failed to read address list {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub fn parse_address_list(text: &str) -> Result<Vec<AddressEntry>, AddressListError> {
    let doc: Value = serde_json::from_str(text)?;
    normalize_address_list(doc)
}

pub fn load_address_list(path: impl AsRef<Path>) -> Result<Vec<AddressEntry>, AddressListError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| AddressListError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_address_list(&text)
}

pub fn normalize_address_list(doc: Value) -> Result<Vec<AddressEntry>, AddressListError> {
    let mut out = Vec::new();
    match doc {
        Value::Array(items) => {
            for (i, item) in items.into_iter().enumerate() {
                push_entry(&mut out, item, None, i)?;
            }
        }
        Value::Object(groups) => {
            for (category, items) in groups {
                let Value::Array(items) = items else {
                    return Err(AddressListError::Shape(format!(
                        "category {category:?} must map to an array of entries"
                    )));
                };
                for (i, item) in items.into_iter().enumerate() {
                    push_entry(&mut out, item, Some(&category), i)?;
                }
            }
        }
        other => {
            return Err(AddressListError::Shape(format!(
                "expected an array or an object of arrays, got {}",
                json_kind(&other)
            )));
        }
    }
    Ok(out)
}

fn push_entry(
    out: &mut Vec<AddressEntry>,
    item: Value,
    group: Option<&str>,
    index: usize,
) -> Result<(), AddressListError> {
    let fields = match item {
        Value::Object(fields) => fields,
        other => {
            return Err(AddressListError::Shape(format!(
                "entry {index}{} must be an object, got {}",
                group.map(|g| format!(" in {g:?}")).unwrap_or_default(),
                json_kind(&other)
            )));
        }
    };

    match entry_from_fields(fields, group) {
        Some(entry) => out.push(entry),
        None => tracing::warn!(index, ?group, "skipping entry without an address"),
    }
    Ok(())
}

fn entry_from_fields(fields: Map<String, Value>, group: Option<&str>) -> Option<AddressEntry> {
    let mut address = None;
    let mut category = group.map(str::to_string);
    let mut metadata = BTreeMap::new();

    for (key, value) in fields {
        let Value::String(value) = value else {
            continue;
        };
        match key.as_str() {
            KEY_ADDRESS => address = Some(value),
            // The group key wins over an inline category.
            KEY_CATEGORY if group.is_some() => {}
            KEY_CATEGORY => category = Some(value),
            _ => {
                metadata.insert(key, value);
            }
        }
    }

    let address = address?.trim().to_string();
    if address.is_empty() {
        return None;
    }
    Some(AddressEntry {
        address,
        category,
        metadata,
    })
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
