use crate::di::{Factory, Ref, Value};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// One-field mutable box whose target can be replaced in place.
pub(crate) struct Proxy {
    target: RwLock<Ref>,
}

impl Proxy {
    fn new(target: Ref) -> Self {
        Self {
            target: RwLock::new(target),
        }
    }

    fn current(&self) -> Ref {
        self.target
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn retarget(&self, target: Ref) {
        *self.target.write().unwrap_or_else(PoisonError::into_inner) = target;
    }
}

#[derive(Clone)]
enum Slot {
    Direct(Ref),
    Swappable(Arc<Proxy>),
}

/// A named reference held by a container.
///
/// Cloning an `Entry` is cheap and keeps pointing at the same slot: holders of
/// a swappable entry see every later override of that name, holders of a
/// direct entry keep the value they were given.
#[derive(Clone)]
pub struct Entry {
    slot: Slot,
}

impl Entry {
    pub fn direct(target: impl Into<Ref>) -> Self {
        Self {
            slot: Slot::Direct(target.into()),
        }
    }

    pub fn swappable(target: impl Into<Ref>) -> Self {
        Self {
            slot: Slot::Swappable(Arc::new(Proxy::new(target.into()))),
        }
    }

    pub fn is_swappable(&self) -> bool {
        matches!(self.slot, Slot::Swappable(_))
    }

    pub(crate) fn proxy(&self) -> Option<&Arc<Proxy>> {
        match &self.slot {
            Slot::Swappable(proxy) => Some(proxy),
            Slot::Direct(_) => None,
        }
    }

    /// The current target, read through the proxy for swappable entries.
    pub fn target(&self) -> Ref {
        match &self.slot {
            Slot::Direct(target) => target.clone(),
            Slot::Swappable(proxy) => proxy.current(),
        }
    }

    pub fn value(&self) -> Option<Value> {
        match self.target() {
            Ref::Value(value) => Some(value),
            Ref::Factory(_) => None,
        }
    }

    pub fn factory(&self) -> Option<Factory> {
        match self.target() {
            Ref::Factory(factory) => Some(factory),
            Ref::Value(_) => None,
        }
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.target().downcast::<T>()
    }

    /// Identity comparison: same proxy, or same direct target.
    pub fn ptr_eq(&self, other: &Entry) -> bool {
        match (&self.slot, &other.slot) {
            (Slot::Swappable(a), Slot::Swappable(b)) => Arc::ptr_eq(a, b),
            (Slot::Direct(a), Slot::Direct(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_swappable() { "swappable" } else { "direct" };
        f.debug_struct("Entry")
            .field("kind", &kind)
            .field("target", &self.target())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Impl(&'static str);

    #[test]
    fn test_swappable_sees_retarget() {
        let entry = Entry::swappable(Ref::value(Impl("impl1")));
        let holder = entry.clone();
        assert_eq!(holder.downcast::<Impl>().unwrap().0, "impl1");

        entry.proxy().unwrap().retarget(Ref::value(Impl("impl2")));
        assert_eq!(holder.downcast::<Impl>().unwrap().0, "impl2");
        assert!(holder.ptr_eq(&entry));
    }

    #[test]
    fn test_direct_is_not_swappable() {
        let entry = Entry::direct(Ref::value(1u8));
        assert!(!entry.is_swappable());
        assert!(entry.proxy().is_none());
        assert!(entry.factory().is_none());
        assert_eq!(*entry.downcast::<u8>().unwrap(), 1);
    }
}
