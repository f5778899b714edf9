//! Shape-tolerant accessors over untyped YAML documents.
//!
//! Exported resources are held as generic [`serde_yaml::Value`] trees with no
//! fixed schema. Every helper here returns `None` when the document does not
//! have the expected shape (missing key, scalar where a mapping was expected,
//! and so on) so that callers skip the field instead of failing the pass.

use serde_yaml::Value;

/// String value at `doc[key]`.
pub fn get_str<'a>(doc: &'a Value, key: &str) -> Option<&'a str> {
    doc.get(key)?.as_str()
}

/// Sequence at `doc[key]`.
pub fn get_seq<'a>(doc: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    doc.get(key)?.as_sequence()
}

/// Mapping at `doc[key]`.
pub fn get_map<'a>(doc: &'a Value, key: &str) -> Option<&'a serde_yaml::Mapping> {
    doc.get(key)?.as_mapping()
}

/// The `spec` mapping of a resource document.
pub fn spec(doc: &Value) -> Option<&Value> {
    doc.get("spec")
}

/// The value of `metadata.labels[key]`, if it is a string.
pub fn label_value<'a>(doc: &'a Value, key: &str) -> Option<&'a str> {
    doc.get("metadata")?.get("labels")?.get(key)?.as_str()
}

/// The value of `metadata.annotations[key]`.
pub fn annotation<'a>(doc: &'a Value, key: &str) -> Option<&'a Value> {
    doc.get("metadata")?.get("annotations")?.get(key)
}

/// The `metadata.ownerReferences` list.
pub fn owner_references(doc: &Value) -> Option<&Vec<Value>> {
    doc.get("metadata")?.get("ownerReferences")?.as_sequence()
}
