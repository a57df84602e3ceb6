//! The capability every cacheable type implements
//!
//! A cached object is stored as a JSON object (a map of string keys to
//! untyped values). Types opt in by describing how to render themselves as
//! such a map and how to rebuild themselves from one.

use serde_json::{Map, Value};

/// Untyped JSON object as stored in a cache entry
pub type JsonSource = Map<String, Value>;

/// A type that can be written to and rebuilt from a JSON object
///
/// Reconstruction is fallible: `from_json` returns `None` when required fields
/// are missing or malformed, never a partially built value.
///
/// # Example
///
/// ```
/// use jsoncache::{JsonOriginatedObject, JsonSource};
/// use serde_json::json;
///
/// struct Station {
///     name: String,
/// }
///
/// impl JsonOriginatedObject for Station {
///     fn json(&self) -> JsonSource {
///         let mut map = JsonSource::new();
///         map.insert("name".to_string(), json!(self.name));
///         map
///     }
///
///     fn from_json(json: JsonSource) -> Option<Self> {
///         let name = json.get("name")?.as_str()?.to_string();
///         Some(Station { name })
///     }
/// }
/// ```
pub trait JsonOriginatedObject: Sized {
    /// Renders the object as a JSON object
    fn json(&self) -> JsonSource;

    /// Rebuilds the object, or `None` if `json` does not describe one
    fn from_json(json: JsonSource) -> Option<Self>;
}

/// Raw JSON objects pass through unchanged.
impl JsonOriginatedObject for JsonSource {
    fn json(&self) -> JsonSource {
        self.clone()
    }

    fn from_json(json: JsonSource) -> Option<Self> {
        Some(json)
    }
}
