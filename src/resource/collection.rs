//! Ordered, identity-keyed resources of one collection.

use rustc_hash::FxHashMap;

use crate::core::{PipelineError, PipelineResult};

use super::resource::{Resource, ResourceId};

/// Resources of one collection (`pages`, `posts`, ...) in registration order.
///
/// Registering an identity again replaces the resource in place, keeping its
/// original position. Lookups by identity are O(1).
#[derive(Debug, Default)]
pub struct ResourceCollection {
    name: String,
    resources: Vec<Resource>,
    index: FxHashMap<ResourceId, usize>,
}

impl ResourceCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert or replace by identity.
    ///
    /// A resource without a relative path has no output location and fails
    /// with [`PipelineError::ResourceIdentity`].
    pub fn register(&mut self, resource: Resource) -> PipelineResult<()> {
        let id = resource.id();
        if id.relative_path.trim().is_empty() {
            return Err(PipelineError::ResourceIdentity {
                collection: self.name.clone(),
                reason: "empty relative path".into(),
            });
        }
        if id.locale.is_empty() {
            return Err(PipelineError::ResourceIdentity {
                collection: self.name.clone(),
                reason: format!("`{}` has no locale", id.relative_path),
            });
        }

        match self.index.get(id) {
            Some(&pos) => self.resources[pos] = resource,
            None => {
                self.index.insert(id.clone(), self.resources.len());
                self.resources.push(resource);
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &ResourceId) -> Option<&Resource> {
        self.index.get(id).map(|&pos| &self.resources[pos])
    }

    pub fn get_mut(&mut self, id: &ResourceId) -> Option<&mut Resource> {
        self.index.get(id).map(|&pos| &mut self.resources[pos])
    }

    /// First resource matching `predicate`, in registration order.
    pub fn find(&self, predicate: impl Fn(&Resource) -> bool) -> Option<&Resource> {
        self.resources.iter().find(|r| predicate(r))
    }

    /// All resources matching `predicate`, in registration order.
    pub fn select(&self, predicate: impl Fn(&Resource) -> bool) -> Vec<&Resource> {
        self.resources.iter().filter(|r| predicate(r)).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Resource> {
        self.resources.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Resource> {
        self.resources.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Drop every resource, ready for the next full build.
    pub fn clear(&mut self) {
        self.resources.clear();
        self.index.clear();
    }
}

impl<'a> IntoIterator for &'a ResourceCollection {
    type Item = &'a Resource;
    type IntoIter = std::slice::Iter<'a, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
