//! # Payload Encoding
//!
//! Workflow inputs are trees of JSON values that may contain binary sources
//! (open files, in-memory buffers, streams). Before a request is sent the tree
//! is walked and every [`ReadableSource`] leaf is replaced by an inline file
//! reference:
//!
//! ```json
//! {"type": "file", "data": "data:<mime>;base64,<bytes>", "name": "<basename>", "mime": "<mime>"}
//! ```
//!
//! Lists keep their order and length, maps keep every key in insertion order,
//! and all other values pass through untouched. Read failures are returned
//! unchanged.
//!
//! ```rust
//! use simstudio::encoding::{encode, FileInput, InputMap, InputValue};
//! use std::io::Cursor;
//!
//! let inputs = InputMap::new()
//!     .with("instructions", "Analyze this document")
//!     .with(
//!         "documents",
//!         vec![InputValue::from(FileInput::new(Cursor::new(b"%PDF".to_vec())).with_name("a.pdf"))],
//!     );
//! let body = encode(&InputValue::Map(inputs)).unwrap();
//! assert_eq!(body["documents"][0]["name"], "a.pdf");
//! ```

pub mod source;

pub use source::{FileInput, ReadableSource, StreamInput};

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::sync::Arc;

/// Inline file payload produced from a [`ReadableSource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    /// Always `"file"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `data:<mime>;base64,<payload>` URI.
    pub data: String,
    pub name: String,
    pub mime: String,
}

impl FileReference {
    pub fn from_bytes(bytes: &[u8], name: Option<&str>, mime: Option<&str>) -> Self {
        let mime = mime
            .filter(|m| !m.is_empty())
            .unwrap_or(source::DEFAULT_CONTENT_TYPE)
            .to_string();
        let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self {
            kind: "file".to_string(),
            data: format!("data:{};base64,{}", mime, payload),
            name: source::display_name(name),
            mime,
        }
    }

    /// Read `src` to the end, restoring its cursor when it can seek.
    pub fn from_source(src: &dyn ReadableSource) -> io::Result<Self> {
        let start = src.tell()?;
        let bytes = src.read_remaining()?;
        if let Some(pos) = start {
            src.seek_to(pos)?;
        }
        Ok(Self::from_bytes(
            &bytes,
            src.name().as_deref(),
            src.content_type().as_deref(),
        ))
    }

    pub fn into_value(self) -> serde_json::Value {
        serde_json::json!({
            "type": self.kind,
            "data": self.data,
            "name": self.name,
            "mime": self.mime,
        })
    }
}

/// A node of a workflow input tree.
#[derive(Clone)]
pub enum InputValue {
    /// Any JSON value, including already-structured objects. Never rewritten.
    Json(serde_json::Value),
    /// Binary source replaced by a [`FileReference`] when encoded.
    File(Arc<dyn ReadableSource>),
    List(Vec<InputValue>),
    Map(InputMap),
}

impl InputValue {
    /// Wrap a shared source; the caller may keep its own `Arc` to reuse it.
    pub fn file(source: Arc<dyn ReadableSource>) -> Self {
        InputValue::File(source)
    }

    pub fn null() -> Self {
        InputValue::Json(serde_json::Value::Null)
    }
}

impl fmt::Debug for InputValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputValue::Json(v) => f.debug_tuple("Json").field(v).finish(),
            InputValue::File(src) => f
                .debug_struct("File")
                .field("name", &src.name())
                .field("content_type", &src.content_type())
                .finish(),
            InputValue::List(items) => f.debug_tuple("List").field(items).finish(),
            InputValue::Map(map) => f.debug_tuple("Map").field(map).finish(),
        }
    }
}

impl From<serde_json::Value> for InputValue {
    fn from(v: serde_json::Value) -> Self {
        InputValue::Json(v)
    }
}

impl From<&str> for InputValue {
    fn from(v: &str) -> Self {
        InputValue::Json(v.into())
    }
}

impl From<String> for InputValue {
    fn from(v: String) -> Self {
        InputValue::Json(v.into())
    }
}

impl From<bool> for InputValue {
    fn from(v: bool) -> Self {
        InputValue::Json(v.into())
    }
}

impl From<i64> for InputValue {
    fn from(v: i64) -> Self {
        InputValue::Json(v.into())
    }
}

impl From<i32> for InputValue {
    fn from(v: i32) -> Self {
        InputValue::Json(v.into())
    }
}

impl From<u64> for InputValue {
    fn from(v: u64) -> Self {
        InputValue::Json(v.into())
    }
}

impl From<f64> for InputValue {
    fn from(v: f64) -> Self {
        InputValue::Json(v.into())
    }
}

impl<T: Into<InputValue>> From<Vec<T>> for InputValue {
    fn from(items: Vec<T>) -> Self {
        InputValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<InputMap> for InputValue {
    fn from(map: InputMap) -> Self {
        InputValue::Map(map)
    }
}

impl From<Arc<dyn ReadableSource>> for InputValue {
    fn from(src: Arc<dyn ReadableSource>) -> Self {
        InputValue::File(src)
    }
}

impl<R: io::Read + io::Seek + Send + 'static> From<FileInput<R>> for InputValue {
    fn from(src: FileInput<R>) -> Self {
        InputValue::File(Arc::new(src))
    }
}

impl<R: io::Read + Send + 'static> From<StreamInput<R>> for InputValue {
    fn from(src: StreamInput<R>) -> Self {
        InputValue::File(Arc::new(src))
    }
}

/// Keyed inputs in insertion order. Inserting an existing key replaces its
/// value in place.
#[derive(Debug, Clone, Default)]
pub struct InputMap {
    entries: Vec<(String, InputValue)>,
}

impl InputMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<InputValue>) -> Option<InputValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&InputValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<InputValue>> FromIterator<(K, V)> for InputMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = InputMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for InputMap {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter().collect()
    }
}

/// Encode an input tree into the JSON sent on the wire.
pub fn encode(value: &InputValue) -> io::Result<serde_json::Value> {
    match value {
        InputValue::Json(v) => Ok(v.clone()),
        InputValue::File(src) => Ok(FileReference::from_source(src.as_ref())?.into_value()),
        InputValue::List(items) => items
            .iter()
            .map(encode)
            .collect::<io::Result<Vec<_>>>()
            .map(serde_json::Value::Array),
        InputValue::Map(map) => encode_map(map).map(serde_json::Value::Object),
    }
}

/// Encode keyed inputs, keeping key order.
pub fn encode_map(map: &InputMap) -> io::Result<serde_json::Map<String, serde_json::Value>> {
    let mut out = serde_json::Map::with_capacity(map.len());
    for (k, v) in map.iter() {
        out.insert(k.to_string(), encode(v)?);
    }
    Ok(out)
}
