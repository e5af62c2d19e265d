/// The JSON-like tree exchanged at the wire boundary.
///
/// Object documents keep their keys in insertion order.
pub type Document = serde_json::Value;

/// An object-shaped document.
pub type DocumentMap = serde_json::Map<String, Document>;

/// Type discriminator key.
pub const CLASS_KEY: &str = "class";
/// Surrogate identity key.
pub const ID_KEY: &str = "_id";
/// Opaque concurrency token key, echoed verbatim.
pub const VERSION_KEY: &str = "_version";

pub fn is_reserved_key(key: &str) -> bool {
    matches!(key, CLASS_KEY | ID_KEY | VERSION_KEY)
}

/// Short name of a document's JSON shape, for error messages.
pub fn shape_of(document: &Document) -> &'static str {
    match document {
        Document::Null => "null",
        Document::Bool(_) => "boolean",
        Document::Number(_) => "number",
        Document::String(_) => "string",
        Document::Array(_) => "list",
        Document::Object(_) => "object",
    }
}
