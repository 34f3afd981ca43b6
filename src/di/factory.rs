use crate::di::{Args, Ref, Value};
use crate::error::{InjectaError, Result};
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

type CallFn = dyn Fn(&Args) -> Option<Produced> + Send + Sync;
type ConstructFn = dyn Fn(&Args) -> Result<Value> + Send + Sync;

/// How a factory is invoked by the injector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FactoryKind {
    /// Plain invocation; the closure decides what it produces.
    Function,
    /// Constructor-style instantiation through [`Construct`].
    Constructor,
    /// A pre-supplied value, never invoked.
    Value,
}

#[derive(Clone)]
pub(crate) enum Body {
    Function(Arc<CallFn>),
    Constructor(Arc<ConstructFn>),
    Value(Arc<Provided>),
}

/// Types that can be instantiated by the container from their declared dependencies.
///
/// Usually derived with `#[derive(Construct)]`, which lists the struct's fields
/// as dependencies. Hand-written impls may instead return the constructor's
/// source text from [`Construct::signature`] and let the introspector find the
/// names.
pub trait Construct: Any + Send + Sync + Sized {
    fn dependencies() -> Option<Vec<String>> {
        None
    }

    fn signature() -> Option<&'static str> {
        None
    }

    fn construct(args: &Args) -> Result<Self>;
}

/// A callable (or pre-built value) that can be registered into a container.
#[derive(Clone)]
pub struct Factory {
    name: Option<String>,
    declared_name: Option<String>,
    dependencies: Option<Arc<[String]>>,
    signature: Option<Arc<str>>,
    body: Body,
}

impl Factory {
    /// A plain factory function. `name` is its intrinsic name, used when the
    /// registration does not name the result otherwise.
    pub fn function<F, R>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Args) -> R + Send + Sync + 'static,
        R: IntoProduced,
    {
        Self::from_body(
            Some(name.into()),
            Body::Function(Arc::new(move |args: &Args| f(args).into_produced())),
        )
    }

    pub fn constructor<T: Construct>() -> Self {
        let mut factory = Self::from_body(
            Some(short_type_name::<T>().to_string()),
            Body::Constructor(Arc::new(|args: &Args| T::construct(args).map(Value::new))),
        );
        factory.dependencies = T::dependencies().map(Arc::from);
        factory.signature = T::signature().map(Arc::from);
        factory
    }

    /// A pre-built value; registering it stores the value without invoking anything.
    pub fn value(value: impl Into<Ref>) -> Self {
        Self::from_body(None, Body::Value(Arc::new(Provided::Ready(value.into()))))
    }

    pub fn bundle(components: Components) -> Self {
        Self::from_body(None, Body::Value(Arc::new(Provided::Bundle(components))))
    }

    fn from_body(name: Option<String>, body: Body) -> Self {
        Self {
            name,
            declared_name: None,
            dependencies: None,
            signature: None,
            body,
        }
    }

    /// Attach an explicit, ordered dependency list. Takes precedence over the signature.
    pub fn with_dependencies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Attach source text whose parameter list names the dependencies.
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        let signature: String = signature.into();
        self.signature = Some(Arc::from(signature));
        self
    }

    /// Declare the name the result is registered under.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.declared_name = Some(name.into());
        self
    }

    pub fn kind(&self) -> FactoryKind {
        match self.body {
            Body::Function(_) => FactoryKind::Function,
            Body::Constructor(_) => FactoryKind::Constructor,
            Body::Value(_) => FactoryKind::Value,
        }
    }

    pub fn is_callable(&self) -> bool {
        self.kind() != FactoryKind::Value
    }

    /// The intrinsic name: the function name or the constructed type's name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn declared_name(&self) -> Option<&str> {
        self.declared_name.as_deref()
    }

    pub fn dependencies(&self) -> Option<&[String]> {
        self.dependencies.as_deref()
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub(crate) fn body(&self) -> &Body {
        &self.body
    }

    /// The pre-built value of a non-callable factory.
    pub(crate) fn provided(&self) -> Option<&Provided> {
        match &self.body {
            Body::Value(provided) => Some(provided.as_ref()),
            Body::Function(_) | Body::Constructor(_) => None,
        }
    }

    pub fn ptr_eq(&self, other: &Factory) -> bool {
        match (&self.body, &other.body) {
            (Body::Function(a), Body::Function(b)) => Arc::ptr_eq(a, b),
            (Body::Constructor(a), Body::Constructor(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("kind", &self.kind())
            .field("name", &self.name)
            .field("declared_name", &self.declared_name)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

impl From<Components> for Factory {
    fn from(components: Components) -> Self {
        Factory::bundle(components)
    }
}

impl From<Value> for Factory {
    fn from(value: Value) -> Self {
        Factory::value(value)
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Named sub-values registered individually when a bundle is stored.
#[derive(Clone, Debug, Default)]
pub struct Components {
    entries: Vec<(String, Ref)>,
}

impl Components {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Ref>) -> Self {
        self.entries.push((name.into(), value.into()));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Ref)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl IntoIterator for Components {
    type Item = (String, Ref);
    type IntoIter = std::vec::IntoIter<(String, Ref)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A settled result: a single reference or a bundle of them.
#[derive(Clone, Debug)]
pub enum Provided {
    Ready(Ref),
    Bundle(Components),
}

pub type PendingFuture = Pin<Box<dyn Future<Output = anyhow::Result<Option<Produced>>> + Send>>;

/// A factory result that has not settled yet.
pub struct Pending(PendingFuture);

impl Pending {
    /// Await the result, flattening pending values that settle into further pending values.
    pub(crate) async fn settle(self) -> anyhow::Result<Option<Provided>> {
        let mut outcome = self.0.await;
        loop {
            match outcome {
                Ok(Some(Produced::Pending(next))) => outcome = next.0.await,
                Ok(Some(Produced::Ready(value))) => return Ok(Some(Provided::Ready(value))),
                Ok(Some(Produced::Bundle(components))) => {
                    return Ok(Some(Provided::Bundle(components)));
                }
                Ok(None) => return Ok(None),
                Err(err) => return Err(err),
            }
        }
    }
}

/// What a factory invocation produced.
pub enum Produced {
    Ready(Ref),
    Bundle(Components),
    Pending(Pending),
}

impl Produced {
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Produced::Ready(Ref::value(value))
    }

    pub fn ready(value: impl Into<Ref>) -> Self {
        Produced::Ready(value.into())
    }

    pub fn bundle(components: Components) -> Self {
        Produced::Bundle(components)
    }

    pub fn pending<F, T>(future: F) -> Self
    where
        F: Future<Output = anyhow::Result<T>> + Send + 'static,
        T: IntoProduced,
    {
        Produced::Pending(Pending(Box::pin(async move {
            future.await.map(IntoProduced::into_produced)
        })))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Produced::Pending(_))
    }
}

impl From<Provided> for Produced {
    fn from(provided: Provided) -> Self {
        match provided {
            Provided::Ready(value) => Produced::Ready(value),
            Provided::Bundle(components) => Produced::Bundle(components),
        }
    }
}

impl fmt::Debug for Produced {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Produced::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Produced::Bundle(components) => f.debug_tuple("Bundle").field(components).finish(),
            Produced::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Conversion of a factory's return value into a (possibly absent) result.
pub trait IntoProduced {
    fn into_produced(self) -> Option<Produced>;
}

impl IntoProduced for Produced {
    fn into_produced(self) -> Option<Produced> {
        Some(self)
    }
}

impl IntoProduced for Provided {
    fn into_produced(self) -> Option<Produced> {
        Some(self.into())
    }
}

impl IntoProduced for Components {
    fn into_produced(self) -> Option<Produced> {
        Some(Produced::Bundle(self))
    }
}

impl IntoProduced for Ref {
    fn into_produced(self) -> Option<Produced> {
        Some(Produced::Ready(self))
    }
}

impl IntoProduced for Value {
    fn into_produced(self) -> Option<Produced> {
        Some(Produced::Ready(Ref::Value(self)))
    }
}

impl<T: IntoProduced> IntoProduced for Option<T> {
    fn into_produced(self) -> Option<Produced> {
        self.and_then(IntoProduced::into_produced)
    }
}

impl<T: IntoProduced> IntoProduced for std::result::Result<T, InjectaError> {
    fn into_produced(self) -> Option<Produced> {
        match self {
            Ok(value) => value.into_produced(),
            Err(err) => {
                tracing::warn!("Factory produced no value: {}", err);
                None
            }
        }
    }
}
