//! Traversal guard for recursive encode and decode passes.

use docbind_model::InstanceRef;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{BindError, BindResult, FieldPath};

/// Bounds the depth of a traversal and, optionally, detects cycles.
///
/// Depth counts object levels below the root: the root is at depth 0 and a
/// `max_depth` of 0 admits no nested objects. Cycle detection tracks the
/// instances currently on the traversal stack by pointer, so an instance
/// shared by two sibling fields is not a cycle.
#[derive(Debug, Default)]
pub struct TraversalGuard {
    max_depth: Option<usize>,
    on_stack: Option<HashSet<usize>>,
    depth: usize,
}

impl TraversalGuard {
    pub fn new(max_depth: Option<usize>, detect_cycles: bool) -> Self {
        Self {
            max_depth,
            on_stack: detect_cycles.then(HashSet::new),
            depth: 0,
        }
    }

    /// A guard that never rejects anything.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Enters one object level.
    pub fn descend(&mut self, path: &FieldPath) -> BindResult<()> {
        if let Some(max_depth) = self.max_depth {
            if self.depth > max_depth {
                return Err(BindError::DepthExceeded {
                    path: path.clone(),
                    max_depth,
                });
            }
        }
        self.depth += 1;
        Ok(())
    }

    pub fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Enters an instance: one level deeper, and on the stack if cycles are tracked.
    pub fn enter(&mut self, instance: &InstanceRef, path: &FieldPath) -> BindResult<()> {
        if let Some(on_stack) = &mut self.on_stack {
            if !on_stack.insert(key(instance)) {
                return Err(BindError::CycleDetected {
                    path: path.clone(),
                    type_name: instance.type_name().to_string(),
                });
            }
        }
        if let Err(err) = self.descend(path) {
            self.forget(instance);
            return Err(err);
        }
        Ok(())
    }

    pub fn leave(&mut self, instance: &InstanceRef) {
        self.forget(instance);
        self.ascend();
    }

    fn forget(&mut self, instance: &InstanceRef) {
        if let Some(on_stack) = &mut self.on_stack {
            on_stack.remove(&key(instance));
        }
    }
}

fn key(instance: &InstanceRef) -> usize {
    Arc::as_ptr(instance) as usize
}
