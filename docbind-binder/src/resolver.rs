use docbind_model::{Identity, InstanceRef, Record};

use crate::error::BindResult;

/// Finds and tracks managed objects on behalf of the decoder.
///
/// The resolver owns persistence, transactions and identity generation; the
/// binder only asks it questions. Any blocking happens inside these calls.
pub trait ObjectResolver {
    /// Looks up a managed instance. `Ok(None)` is a normal miss, not an error.
    fn find(&self, identity: &Identity) -> BindResult<Option<InstanceRef>>;

    /// Records that the decoder overwrote `position` on a managed instance.
    fn mark_dirty(&self, instance: &InstanceRef, position: usize);

    /// Creates an empty value of an unmodeled type for generic construction.
    /// Returns `None` when the type cannot be constructed.
    fn materialize_new(&self, type_name: &str) -> Option<Record>;
}

/// A resolver with no backing store.
///
/// Nothing is ever found, so every decoded object is detached; unmodeled
/// types are constructed as open records.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedResolver;

impl ObjectResolver for DetachedResolver {
    fn find(&self, _identity: &Identity) -> BindResult<Option<InstanceRef>> {
        Ok(None)
    }

    fn mark_dirty(&self, _instance: &InstanceRef, _position: usize) {}

    fn materialize_new(&self, type_name: &str) -> Option<Record> {
        Some(Record::open(type_name))
    }
}
