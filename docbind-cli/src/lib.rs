//! Building blocks for the `docbind` command.

use anyhow::{Context, Result, bail};
use docbind_binder::{
    BinderConfig, DetachedResolver, DocumentBinder, FetchPlan, identity_to_token,
};
use docbind_model::{Document, MetadataProvider, SchemaRegistry};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Reads a JSON array of class schemas.
pub fn load_schemas(path: &Path) -> Result<SchemaRegistry> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schemas from {}", path.display()))?;
    let registry = SchemaRegistry::from_json(&json)
        .with_context(|| format!("invalid schemas in {}", path.display()))?;
    info!("Loaded {} schemas from {:?}", registry.len(), path);
    Ok(registry)
}

/// Configuration file values with command-line overrides applied.
pub fn resolve_config(
    path: &Path,
    max_depth: Option<usize>,
    unbounded_depth: bool,
    cycle_guard: bool,
) -> BinderConfig {
    let mut config = BinderConfig::load_from(path);
    if let Some(max_depth) = max_depth {
        config.max_depth = Some(max_depth);
    }
    if unbounded_depth {
        config.max_depth = None;
    }
    config.cycle_guard |= cycle_guard;
    config
}

pub fn build_binder(registry: SchemaRegistry, config: BinderConfig) -> DocumentBinder {
    DocumentBinder::new(Arc::new(registry)).with_config(config)
}

/// Decodes a document detached and encodes it again, restricted to `fields`
/// when given. A list document is normalized element by element.
pub fn normalize(
    binder: &DocumentBinder,
    document: &Document,
    type_name: &str,
    fields: &[String],
) -> Result<Document> {
    let mut plan = FetchPlan::all();
    if !fields.is_empty() {
        let schema = binder
            .provider()
            .schema_for(type_name)
            .with_context(|| format!("unknown type '{type_name}'"))?;
        let names: Vec<&str> = fields.iter().map(String::as_str).collect();
        plan = plan.with_field_names(&schema, &names)?;
    }

    let documents = match document {
        Document::Array(items) => items.as_slice(),
        single => std::slice::from_ref(single),
    };
    let mut instances = Vec::with_capacity(documents.len());
    for (index, document) in documents.iter().enumerate() {
        let instance = binder
            .decode_instance(document, type_name, &DetachedResolver)
            .with_context(|| format!("document {index} does not decode as '{type_name}'"))?;
        debug!(index, type_name = instance.type_name(), "Decoded document");
        instances.push(instance);
    }

    if document.is_array() {
        Ok(binder.encode_all(&instances, &plan)?)
    } else {
        match instances.first() {
            Some(instance) => Ok(binder.encode(instance, &plan)?),
            None => bail!("nothing to normalize"),
        }
    }
}

/// Parses an identity token and describes the identity it names.
pub fn describe_token(binder: &DocumentBinder, type_name: &str, token: &str) -> Result<Document> {
    let identity = binder.identity_from_token(type_name, token)?;
    Ok(json!({
        "identity": serde_json::to_value(&identity)?,
        "token": identity_to_token(&identity),
        "display": identity.to_string(),
    }))
}
