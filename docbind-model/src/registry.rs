//! Schema lookup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::{ClassSchema, Error, Instance, Result};

/// Source of per-type schemas.
///
/// Types must be resolvable both by logical name (a discriminator or a
/// declared field type) and from a live instance.
pub trait MetadataProvider: Send + Sync {
    fn schema_for(&self, type_name: &str) -> Option<Arc<ClassSchema>>;

    fn schema_of(&self, instance: &Instance) -> Option<Arc<ClassSchema>> {
        self.schema_for(instance.type_name())
    }

    /// Whether `type_name` is a modeled type.
    fn is_modeled(&self, type_name: &str) -> bool {
        self.schema_for(type_name).is_some()
    }
}

/// In-memory [`MetadataProvider`].
///
/// Built once and then shared read-only; schemas are looked up by their full
/// type name or by their optional entity name.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<ClassSchema>>,
    aliases: HashMap<String, String>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and registers a schema.
    pub fn register(&mut self, schema: ClassSchema) -> Result<Arc<ClassSchema>> {
        schema.validate()?;
        if self.schemas.contains_key(&schema.type_name) {
            return Err(Error::DuplicateType(schema.type_name));
        }
        if let Some(alias) = &schema.entity_name {
            if self.aliases.contains_key(alias) || self.schemas.contains_key(alias) {
                return Err(Error::DuplicateType(alias.clone()));
            }
            self.aliases.insert(alias.clone(), schema.type_name.clone());
        }
        let schema = Arc::new(schema);
        self.schemas
            .insert(schema.type_name.clone(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Builder-style registration.
    pub fn with(mut self, schema: ClassSchema) -> Result<Self> {
        self.register(schema)?;
        Ok(self)
    }

    /// Loads a JSON array of schemas.
    pub fn from_json(json: &str) -> Result<Self> {
        let schemas: Vec<ClassSchema> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for schema in schemas {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl MetadataProvider for SchemaRegistry {
    fn schema_for(&self, type_name: &str) -> Option<Arc<ClassSchema>> {
        self.schemas
            .get(type_name)
            .or_else(|| {
                self.aliases
                    .get(type_name)
                    .and_then(|full| self.schemas.get(full))
            })
            .cloned()
    }
}
