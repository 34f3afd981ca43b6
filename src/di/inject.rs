use crate::di::factory::Body;
use crate::di::introspect::dependency_names;
use crate::di::{Container, Deps, Entry, Factory, Produced, Ref, Value};
use crate::error::{InjectaError, Result};
use std::any::Any;
use std::sync::Arc;

/// Resolved arguments for one factory invocation, in declaration order.
///
/// A slot is `None` when its dependency could not be found.
#[derive(Clone, Debug, Default)]
pub struct Args {
    slots: Vec<(String, Option<Entry>)>,
}

impl Args {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.slots.get(index).map(|(name, _)| name.as_str())
    }

    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.slots.get(index).and_then(|(_, entry)| entry.as_ref())
    }

    pub fn by_name(&self, name: &str) -> Option<&Entry> {
        self.slots
            .iter()
            .find(|(slot, _)| slot == name)
            .and_then(|(_, entry)| entry.as_ref())
    }

    /// Snapshot of the current target, downcast to `T`.
    pub fn value<T: Any + Send + Sync>(&self, index: usize) -> Option<Arc<T>> {
        self.entry(index).and_then(Entry::downcast::<T>)
    }

    pub fn container(&self, index: usize) -> Option<Container> {
        self.value::<Container>(index).map(|c| c.as_ref().clone())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Entry>)> {
        self.slots
            .iter()
            .map(|(name, entry)| (name.as_str(), entry.as_ref()))
    }
}

/// Conversion of one resolved argument into a typed parameter.
pub trait FromArg: Sized {
    fn from_arg(args: &Args, index: usize) -> Result<Self>;
}

fn slot_name(args: &Args, index: usize) -> String {
    args.name(index)
        .map_or_else(|| format!("#{index}"), str::to_string)
}

impl FromArg for Entry {
    fn from_arg(args: &Args, index: usize) -> Result<Self> {
        args.entry(index)
            .cloned()
            .ok_or_else(|| InjectaError::not_found(slot_name(args, index)))
    }
}

impl FromArg for Option<Entry> {
    fn from_arg(args: &Args, index: usize) -> Result<Self> {
        Ok(args.entry(index).cloned())
    }
}

impl<T: Any + Send + Sync> FromArg for Arc<T> {
    fn from_arg(args: &Args, index: usize) -> Result<Self> {
        let entry = Entry::from_arg(args, index)?;
        entry
            .downcast::<T>()
            .ok_or_else(|| InjectaError::downcast_failed::<T>(slot_name(args, index)))
    }
}

impl<T: Any + Send + Sync> FromArg for Option<Arc<T>> {
    fn from_arg(args: &Args, index: usize) -> Result<Self> {
        Ok(args.value::<T>(index))
    }
}

impl FromArg for Container {
    fn from_arg(args: &Args, index: usize) -> Result<Self> {
        Arc::<Container>::from_arg(args, index).map(|c| c.as_ref().clone())
    }
}

impl FromArg for Option<Container> {
    fn from_arg(args: &Args, index: usize) -> Result<Self> {
        Ok(args.container(index))
    }
}

/// Resolve `names` against `container`, preferring `overrides`.
pub fn resolve(names: &[String], container: &Container, overrides: Option<&Deps>) -> Args {
    let config = container.config();
    let slots = names
        .iter()
        .map(|name| {
            if let Some(value) = overrides.and_then(|deps| deps.get(name)) {
                return (name.clone(), Some(Entry::direct(value.clone())));
            }
            if *name == config.container_key {
                let this = Ref::Value(Value::new(container.clone()));
                return (name.clone(), Some(Entry::direct(this)));
            }
            let entry = container.get(name);
            if entry.is_none() {
                tracing::trace!("Dependency '{}' is not registered", name);
                if config.warn_on_missing {
                    if let Some(logger) = container.logger() {
                        logger.warn(&format!("Can't inject dependency: {name}"));
                    }
                }
            }
            (name.clone(), entry)
        })
        .collect();
    Args { slots }
}

impl Container {
    /// Invoke `factory` with its dependencies resolved from this container.
    ///
    /// Returns `None` for non-callable factories and for factories that
    /// produce nothing. Never fails.
    pub fn inject(&self, factory: &Factory, dependencies: Option<&Deps>) -> Option<Produced> {
        if !factory.is_callable() {
            return None;
        }
        let names = dependency_names(factory);
        let args = resolve(&names, self, dependencies);

        match factory.body() {
            Body::Function(call) => call(&args),
            Body::Constructor(construct) => match construct(&args) {
                Ok(instance) => Some(Produced::Ready(Ref::Value(instance))),
                Err(err) => {
                    tracing::warn!(
                        "Failed to construct {}: {}",
                        factory.name().unwrap_or("<anonymous>"),
                        err
                    );
                    None
                }
            },
            Body::Value(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::Construct;
    use crate::logger::Logger;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingLogger {
        warnings: Mutex<Vec<String>>,
    }

    impl Logger for RecordingLogger {
        fn warn(&self, message: &str) {
            self.warnings.lock().unwrap().push(message.to_string());
        }

        fn error(&self, _message: &str) {}
    }

    fn concat_factory() -> Factory {
        Factory::function("sync1", |args: &Args| {
            let a = args.value::<String>(0)?;
            let b = args.value::<String>(1)?;
            Some(Produced::value(format!("{a}{b}")))
        })
        .with_signature("function sync1(a, b)")
    }

    #[test]
    fn test_overrides_win() {
        let container = Container::new();
        container.add_ref("a", "a1", false).add_ref("b", "b1", false);

        let deps = Deps::new().with("b", "load");
        let produced = container.inject(&concat_factory(), Some(&deps)).unwrap();
        let Produced::Ready(value) = produced else {
            panic!("expected a ready value");
        };
        assert_eq!(value.downcast::<String>().unwrap().as_str(), "a1load");
    }

    #[test]
    fn test_reserved_container_name() {
        let container = Container::new();
        container.add_ref("marker", "root", false);

        let factory = Factory::function("probe", |args: &Args| {
            let c = args.container(0)?;
            c.resolve::<String>("marker").ok().map(|m| Produced::value(m.len()))
        })
        .with_dependencies(["container"]);

        match container.inject(&factory, None) {
            Some(Produced::Ready(value)) => assert_eq!(*value.downcast::<usize>().unwrap(), 4),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_dependency_warns() {
        let logger = Arc::new(RecordingLogger::default());
        let container = Container::new();
        container.set_logger(logger.clone());

        let args = resolve(&["nothing".to_string()], &container, None);
        assert_eq!(args.len(), 1);
        assert!(args.entry(0).is_none());
        assert_eq!(
            *logger.warnings.lock().unwrap(),
            vec!["Can't inject dependency: nothing".to_string()]
        );
    }

    #[test]
    fn test_missing_dependency_without_logger() {
        let container = Container::new();
        let args = resolve(&["a".to_string(), "b".to_string()], &container, None);
        assert_eq!(args.name(1), Some("b"));
        assert!(args.by_name("a").is_none());
    }

    #[test]
    fn test_non_callable_is_noop() {
        let container = Container::new();
        assert!(container.inject(&Factory::value("v"), None).is_none());
    }

    struct Pair {
        left: Arc<String>,
        right: Option<Arc<String>>,
    }

    impl Construct for Pair {
        fn dependencies() -> Option<Vec<String>> {
            Some(vec!["left".into(), "right".into()])
        }

        fn construct(args: &Args) -> Result<Self> {
            Ok(Pair {
                left: FromArg::from_arg(args, 0)?,
                right: FromArg::from_arg(args, 1)?,
            })
        }
    }

    #[test]
    fn test_constructor_instantiation() {
        let container = Container::new();
        container.add_ref("left", "L", false);

        let Some(Produced::Ready(value)) = container.inject(&Factory::constructor::<Pair>(), None)
        else {
            panic!("expected an instance");
        };
        let pair = value.downcast::<Pair>().unwrap();
        assert_eq!(pair.left.as_str(), "L");
        assert!(pair.right.is_none());
    }

    #[test]
    fn test_failed_construction_is_absent() {
        let container = Container::new();
        assert!(container.inject(&Factory::constructor::<Pair>(), None).is_none());
    }

    struct Port(u16);

    impl Construct for Port {
        fn dependencies() -> Option<Vec<String>> {
            Some(vec!["port".into()])
        }

        fn construct(args: &Args) -> Result<Self> {
            let raw = Arc::<String>::from_arg(args, 0)?;
            raw.parse()
                .map(Port)
                .map_err(|err| InjectaError::factory_failed("Port", format!("{raw:?}: {err}")))
        }
    }

    #[test]
    fn test_construct_rejects_invalid_input() {
        let container = Container::new();
        container.add_ref("port", "not-a-port", false);
        let args = resolve(&["port".to_string()], &container, None);
        assert!(matches!(
            Port::construct(&args),
            Err(InjectaError::FactoryFailed { name, .. }) if name == "Port"
        ));
        assert!(container.inject(&Factory::constructor::<Port>(), None).is_none());

        container.add_ref("port", "8080", false);
        let Some(Produced::Ready(value)) = container.inject(&Factory::constructor::<Port>(), None)
        else {
            panic!("expected an instance");
        };
        assert_eq!(value.downcast::<Port>().unwrap().0, 8080);
    }

    #[test]
    fn test_from_arg_errors() {
        let container = Container::new();
        container.add_ref("n", Ref::value(1u8), false);
        let args = resolve(&["n".to_string(), "missing".to_string()], &container, None);

        assert!(matches!(
            Arc::<String>::from_arg(&args, 0),
            Err(InjectaError::DowncastFailed { .. })
        ));
        assert!(matches!(
            Entry::from_arg(&args, 1),
            Err(InjectaError::DependencyNotFound { name }) if name == "missing"
        ));
        assert_eq!(*Arc::<u8>::from_arg(&args, 0).unwrap(), 1);
    }
}
