use crate::di::Factory;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A type-erased, shared value stored in the container.
#[derive(Clone)]
pub struct Value(Arc<dyn Any + Send + Sync>);

impl Value {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.0.clone().downcast::<T>().ok()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Value(..)")
    }
}

/// Anything that can be stored under a name: a plain value or a callable factory.
#[derive(Clone, Debug)]
pub enum Ref {
    Value(Value),
    Factory(Factory),
}

impl Ref {
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Ref::Value(Value::new(value))
    }

    /// Callables are always stored directly, never behind a swappable proxy.
    pub fn is_callable(&self) -> bool {
        match self {
            Ref::Value(_) => false,
            Ref::Factory(factory) => factory.is_callable(),
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Ref::Value(value) => Some(value),
            Ref::Factory(_) => None,
        }
    }

    pub fn as_factory(&self) -> Option<&Factory> {
        match self {
            Ref::Value(_) => None,
            Ref::Factory(factory) => Some(factory),
        }
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.as_value().and_then(Value::downcast)
    }

    pub fn ptr_eq(&self, other: &Ref) -> bool {
        match (self, other) {
            (Ref::Value(a), Ref::Value(b)) => a.ptr_eq(b),
            (Ref::Factory(a), Ref::Factory(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<Value> for Ref {
    fn from(value: Value) -> Self {
        Ref::Value(value)
    }
}

impl From<Factory> for Ref {
    fn from(factory: Factory) -> Self {
        Ref::Factory(factory)
    }
}

impl From<&str> for Ref {
    fn from(value: &str) -> Self {
        Ref::value(value.to_string())
    }
}

impl From<String> for Ref {
    fn from(value: String) -> Self {
        Ref::value(value)
    }
}

/// Explicit dependencies keyed by name.
///
/// Used both to override what a factory receives from the container and to
/// seed a child container in [`Container::clone_with`](crate::Container::clone_with).
#[derive(Clone, Debug, Default)]
pub struct Deps {
    refs: HashMap<String, Ref>,
}

impl Deps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Ref>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Ref>) -> Option<Ref> {
        self.refs.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Ref> {
        self.refs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.refs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Ref)> {
        self.refs.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Deps
where
    K: Into<String>,
    V: Into<Ref>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut deps = Deps::new();
        for (name, value) in iter {
            deps.insert(name, value);
        }
        deps
    }
}

impl IntoIterator for Deps {
    type Item = (String, Ref);
    type IntoIter = std::collections::hash_map::IntoIter<String, Ref>;

    fn into_iter(self) -> Self::IntoIter {
        self.refs.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_downcast() {
        let value = Value::new(42u32);
        assert!(value.is::<u32>());
        assert_eq!(*value.downcast::<u32>().unwrap(), 42);
        assert!(value.downcast::<String>().is_none());
    }

    #[test]
    fn test_string_refs() {
        let r: Ref = "load".into();
        assert!(!r.is_callable());
        assert_eq!(r.downcast::<String>().unwrap().as_str(), "load");
    }

    #[test]
    fn test_deps_from_iter() {
        let deps: Deps = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(deps.len(), 2);
        assert!(deps.contains("a"));
        assert!(!deps.contains("c"));
    }
}
