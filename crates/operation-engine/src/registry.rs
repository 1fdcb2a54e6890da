//! Operation registry
//!
//! Maps callable references to validated operation templates. Hosts use it
//! to rebuild instances from their serialized [`OperationState`] and to lay
//! out operation menus from declared categories.
//!
//! # Usage
//!
//! ```ignore
//! let mut registry = OperationRegistry::new();
//! registry.register(operation(add)?);
//!
//! let state = registry.get("add").unwrap().instantiate().reduce();
//! let restored = registry.reconstruct(state)?;
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;

use crate::descriptor::{OperationDescriptor, OperationInstance, OperationState};
use crate::error::{OperationError, Result};

/// Registry of operation templates keyed by callable reference
pub struct OperationRegistry {
    entries: HashMap<String, Arc<OperationDescriptor>>,
}

impl OperationRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a template, replacing any with the same callable reference
    pub fn register(&mut self, descriptor: Arc<OperationDescriptor>) {
        let key = descriptor.callable_ref().to_string();
        if self.entries.insert(key.clone(), descriptor).is_some() {
            log::debug!("Replaced registered operation for callable '{}'", key);
        }
    }

    /// Get a template by callable reference
    pub fn get(&self, callable: &str) -> Option<&Arc<OperationDescriptor>> {
        self.entries.get(callable)
    }

    /// Check if a callable reference is registered
    pub fn contains(&self, callable: &str) -> bool {
        self.entries.contains_key(callable)
    }

    /// All registered templates, ordered by callable reference
    pub fn all(&self) -> Vec<&Arc<OperationDescriptor>> {
        let mut all: Vec<_> = self.entries.iter().collect();
        all.sort_by(|a, b| a.0.cmp(b.0));
        all.into_iter().map(|(_, d)| d).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge another registry into this one
    ///
    /// Entries from `other` override entries in `self` with the same callable reference.
    pub fn merge(&mut self, other: OperationRegistry) {
        self.entries.extend(other.entries);
    }

    /// Rebuild an instance from its minimal serialized state
    pub fn reconstruct(&self, state: OperationState) -> Result<OperationInstance> {
        let descriptor = self
            .get(&state.callable)
            .ok_or_else(|| OperationError::UnregisteredCallable(state.callable.clone()))?;
        OperationInstance::restore(Arc::clone(descriptor), state)
    }

    /// Rebuild an instance from a JSON-encoded state
    pub fn reconstruct_json(&self, json: &str) -> Result<OperationInstance> {
        let state: OperationState = serde_json::from_str(json)?;
        self.reconstruct(state)
    }

    /// Build the category menu tree
    ///
    /// An operation appears once under each of its category paths;
    /// operations without categories sit at the root.
    pub fn menu(&self) -> CategoryMenu {
        let mut root = CategoryMenu::default();
        for descriptor in self.all() {
            if descriptor.metadata.categories.is_empty() {
                root.operations.push(descriptor.name.clone());
                continue;
            }
            for path in &descriptor.metadata.categories {
                let mut node = &mut root;
                for label in path.labels() {
                    node = node.submenus.entry(label.clone()).or_default();
                }
                node.operations.push(descriptor.name.clone());
            }
        }
        root
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// One level of the operation menu
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryMenu {
    /// Nested menus by label
    pub submenus: BTreeMap<String, CategoryMenu>,
    /// Operation names listed at this level
    pub operations: Vec<String>,
}

impl CategoryMenu {
    /// Follow a path of labels down the tree
    pub fn find(&self, path: &[&str]) -> Option<&CategoryMenu> {
        path.iter()
            .try_fold(self, |node, label| node.submenus.get(*label))
    }
}
