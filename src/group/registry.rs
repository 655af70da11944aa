//! Group Registry
//!
//! Resolves group names for the peer endpoint and any other caller holding
//! the registry handle.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::error::{CacheError, Result};
use crate::group::{Group, GroupBuilder};

// == Group Registry ==
/// Name to group map. Lookups share a read lock; creation takes the write lock.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // == Create ==
    /// Builds a group and registers it under its name.
    ///
    /// Fails if the builder has no loader or the name is taken.
    pub fn create(&self, builder: GroupBuilder) -> Result<Arc<Group>> {
        let group = Arc::new(builder.build()?);

        let mut groups = self.groups.write();
        if groups.contains_key(group.name()) {
            return Err(CacheError::DuplicateGroup(group.name().to_string()));
        }
        groups.insert(group.name().to_string(), group.clone());
        info!(group = %group.name(), "group created");

        Ok(group)
    }

    // == Get ==
    /// Returns the group registered as `name`, if any.
    pub fn get(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().get(name).cloned()
    }

    /// All groups, ordered by name.
    pub fn groups(&self) -> Vec<Arc<Group>> {
        let mut groups: Vec<_> = self.groups.read().values().cloned().collect();
        groups.sort_by(|a, b| a.name().cmp(b.name()));
        groups
    }

    pub fn len(&self) -> usize {
        self.groups.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.read().is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn echo(name: &str) -> GroupBuilder {
        Group::builder(name).loader_fn(|key| Ok(key.as_bytes().to_vec()))
    }

    #[test]
    fn test_create_and_get() {
        let registry = GroupRegistry::new();
        let group = registry.create(echo("scores").cache_bytes(2 << 10)).unwrap();

        let found = registry.get("scores").unwrap();
        assert!(Arc::ptr_eq(&group, &found));
        assert_eq!(found.cache().capacity(), 2 << 10);
    }

    #[test]
    fn test_unknown_group_is_none() {
        let registry = GroupRegistry::new();
        assert!(registry.get("nogroup").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_create_without_loader_fails() {
        let registry = GroupRegistry::new();
        let result = registry.create(Group::builder("scores"));

        assert!(matches!(result, Err(CacheError::MissingLoader(_))));
        assert!(registry.get("scores").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let registry = GroupRegistry::new();
        let first = registry.create(echo("scores")).unwrap();

        assert!(matches!(
            registry.create(echo("scores")),
            Err(CacheError::DuplicateGroup(name)) if name == "scores"
        ));
        assert!(Arc::ptr_eq(&first, &registry.get("scores").unwrap()));
    }

    #[test]
    fn test_groups_sorted_by_name() {
        let registry = GroupRegistry::new();
        for name in ["users", "avatars", "scores"] {
            registry.create(echo(name)).unwrap();
        }

        let names: Vec<String> = registry
            .groups()
            .iter()
            .map(|g| g.name().to_string())
            .collect();
        assert_eq!(names, vec!["avatars", "scores", "users"]);
        assert_eq!(registry.len(), 3);
    }
}
