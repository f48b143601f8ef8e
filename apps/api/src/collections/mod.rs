// Read-only JSON dumps of the reference collections.

pub mod handlers;

use serde_json::Value;

/// MongoDB's internal identifier; never leaves the service.
pub const INTERNAL_ID: &str = "_id";

pub fn strip_internal_id(mut document: Value) -> Value {
    if let Some(fields) = document.as_object_mut() {
        fields.remove(INTERNAL_ID);
    }
    document
}

pub fn strip_internal_ids(documents: Vec<Value>) -> Vec<Value> {
    documents.into_iter().map(strip_internal_id).collect()
}
