use crate::config::ContainerConfig;
use crate::di::{Deps, Entry, Ref, Value};
use crate::error::{InjectaError, Result};
use crate::logger::Logger;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as Slot;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

struct Scope {
    entries: DashMap<String, Entry>,
    parent: Option<Container>,
    config: Arc<ContainerConfig>,
}

/// Named-reference registry with parent delegation.
///
/// `Container` is a handle: cloning it with [`Clone::clone`] yields the same
/// container. Use [`Container::clone_with`] or [`Container::child`] to derive a
/// child container that reads through to this one.
#[derive(Clone)]
pub struct Container {
    scope: Arc<Scope>,
}

impl Container {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            scope: Arc::new(Scope {
                entries: DashMap::new(),
                parent: None,
                config: Arc::new(config),
            }),
        }
    }

    /// Create a child container delegating to this one.
    ///
    /// Each override is stored directly on the child and shadows the parent's
    /// entry of the same name for every lookup through the child. The parent
    /// is never modified.
    pub fn clone_with(&self, overrides: Option<Deps>) -> Container {
        let child = Container {
            scope: Arc::new(Scope {
                entries: DashMap::new(),
                parent: Some(self.clone()),
                config: Arc::clone(&self.scope.config),
            }),
        };
        if let Some(overrides) = overrides {
            for (name, value) in overrides {
                child.scope.entries.insert(name, Entry::direct(value));
            }
        }
        tracing::debug!(
            "Created child container with {} own entries",
            child.scope.entries.len()
        );
        child
    }

    pub fn child(&self) -> Container {
        self.clone_with(None)
    }

    /// Add a named reference.
    ///
    /// The first call for `name` on this container stores `value` directly when
    /// it is callable or `directly` is set, and behind a swappable proxy
    /// otherwise. Later calls re-target the proxy, so everyone already holding
    /// the entry sees the new value, or replace a direct entry outright.
    pub fn add_ref(&self, name: impl Into<String>, value: impl Into<Ref>, directly: bool) -> &Self {
        let name = name.into();
        let value = value.into();

        match self.scope.entries.entry(name) {
            Slot::Vacant(slot) => {
                let entry = if directly || value.is_callable() {
                    Entry::direct(value)
                } else {
                    Entry::swappable(value)
                };
                tracing::debug!("Added {:?} as {:?}", slot.key(), entry);
                slot.insert(entry);
            }
            Slot::Occupied(mut slot) => {
                let proxy = slot.get().proxy().cloned();
                match proxy {
                    Some(proxy) => {
                        tracing::debug!("Re-targeted {:?}", slot.key());
                        proxy.retarget(value);
                    }
                    None => {
                        tracing::debug!("Replaced direct entry {:?}", slot.key());
                        slot.insert(Entry::direct(value));
                    }
                }
            }
        }
        self
    }

    pub fn add_directly(&self, name: impl Into<String>, value: impl Into<Ref>) -> &Self {
        self.add_ref(name, value, true)
    }

    /// Look up `name` here, then through the parent chain.
    pub fn get(&self, name: &str) -> Option<Entry> {
        let mut current = Some(self);
        while let Some(container) = current {
            if let Some(entry) = container.scope.entries.get(name) {
                return Some(entry.value().clone());
            }
            current = container.scope.parent.as_ref();
        }
        None
    }

    pub fn get_own(&self, name: &str) -> Option<Entry> {
        self.scope
            .entries
            .get(name)
            .map(|entry| entry.value().clone())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn contains_own(&self, name: &str) -> bool {
        self.scope.entries.contains_key(name)
    }

    /// Typed lookup of the current value stored under `name`.
    pub fn resolve<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        let entry = self
            .get(name)
            .ok_or_else(|| InjectaError::not_found(name))?;
        entry
            .downcast::<T>()
            .ok_or_else(|| InjectaError::downcast_failed::<T>(name))
    }

    /// Names stored on this container itself, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .scope
            .entries
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.scope.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scope.entries.is_empty()
    }

    pub fn parent(&self) -> Option<&Container> {
        self.scope.parent.as_ref()
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.scope.config
    }

    /// The logging collaborator, if one is registered under the logger name.
    pub fn logger(&self) -> Option<Arc<dyn Logger>> {
        self.get(&self.scope.config.logger_key)
            .and_then(|entry| entry.downcast::<Arc<dyn Logger>>())
            .map(|logger| logger.as_ref().clone())
    }

    pub fn set_logger(&self, logger: Arc<dyn Logger>) -> &Self {
        let key = self.scope.config.logger_key.clone();
        self.add_directly(key, Value::new(logger))
    }

    /// Whether both handles point at the same container.
    pub fn ptr_eq(&self, other: &Container) -> bool {
        Arc::ptr_eq(&self.scope, &other.scope)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("names", &self.names())
            .field("has_parent", &self.scope.parent.is_some())
            .finish()
    }
}
