use crate::di::{Container, Deps, Factory, Produced, Provided};
use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;

/// Options for [`Container::register_with`].
///
/// A bare name converts into options that only carry the name, `Deps` into
/// options that only carry dependency overrides.
#[derive(Clone, Debug, Default)]
pub struct RegisterOptions {
    pub dependencies: Option<Deps>,
    pub name: Option<String>,
    pub directly: bool,
}

impl RegisterOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dependencies(mut self, dependencies: Deps) -> Self {
        self.dependencies = Some(dependencies);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn directly(mut self, directly: bool) -> Self {
        self.directly = directly;
        self
    }
}

impl From<&str> for RegisterOptions {
    fn from(name: &str) -> Self {
        RegisterOptions::new().name(name)
    }
}

impl From<String> for RegisterOptions {
    fn from(name: String) -> Self {
        RegisterOptions::new().name(name)
    }
}

impl From<Deps> for RegisterOptions {
    fn from(dependencies: Deps) -> Self {
        RegisterOptions::new().dependencies(dependencies)
    }
}

impl<S: Into<String>> From<(Deps, S)> for RegisterOptions {
    fn from((dependencies, name): (Deps, S)) -> Self {
        RegisterOptions::new().dependencies(dependencies).name(name)
    }
}

pub type PendingRegistration = Pin<Box<dyn Future<Output = Container> + Send>>;

/// Outcome of a registration: the container, or a future resolving to it once
/// an asynchronous factory has settled.
///
/// A pending registration stores its result only while it is being awaited.
/// The factory has already run when `Pending` is returned, so dropping the
/// registration discards the result and the name is never stored. Nothing
/// cancels the factory's own side effects.
#[must_use = "a pending registration does nothing unless awaited"]
pub enum Registration {
    Ready(Container),
    Pending(PendingRegistration),
}

impl Registration {
    pub fn is_pending(&self) -> bool {
        matches!(self, Registration::Pending(_))
    }

    /// The container, if the registration completed synchronously.
    pub fn ready(&self) -> Option<&Container> {
        match self {
            Registration::Ready(container) => Some(container),
            Registration::Pending(_) => None,
        }
    }

    pub fn into_ready(self) -> Option<Container> {
        match self {
            Registration::Ready(container) => Some(container),
            Registration::Pending(_) => None,
        }
    }

    pub fn register(self, factory: impl Into<Factory>) -> Registration {
        self.register_with(factory, RegisterOptions::default())
    }

    /// Register after this registration has completed.
    pub fn register_with(
        self,
        factory: impl Into<Factory>,
        options: impl Into<RegisterOptions>,
    ) -> Registration {
        let factory = factory.into();
        let options = options.into();
        match self {
            Registration::Ready(container) => container.register_with(factory, options),
            Registration::Pending(pending) => Registration::Pending(Box::pin(async move {
                pending.await.register_with(factory, options).await
            })),
        }
    }

    pub fn register_directly(self, factory: impl Into<Factory>) -> Registration {
        self.register_directly_with(factory, RegisterOptions::default())
    }

    pub fn register_directly_with(
        self,
        factory: impl Into<Factory>,
        options: impl Into<RegisterOptions>,
    ) -> Registration {
        self.register_with(factory, options.into().directly(true))
    }
}

impl IntoFuture for Registration {
    type Output = Container;
    type IntoFuture = PendingRegistration;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Registration::Ready(container) => Box::pin(std::future::ready(container)),
            Registration::Pending(pending) => pending,
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Registration::Ready(container) => f.debug_tuple("Ready").field(container).finish(),
            Registration::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

impl Container {
    pub fn register(&self, factory: impl Into<Factory>) -> Registration {
        self.register_with(factory, RegisterOptions::default())
    }

    /// Invoke `factory` and store what it produces.
    ///
    /// Pre-built values are stored under the given name, their declared name,
    /// or expanded when they are component bundles. Callable factories are
    /// injected; their result is stored under the given name, else the
    /// declared name, else the factory's own name. Asynchronous results turn
    /// the whole registration into [`Registration::Pending`], which must be
    /// awaited for the result to be stored. Failures are reported to the
    /// logger and never returned.
    pub fn register_with(
        &self,
        factory: impl Into<Factory>,
        options: impl Into<RegisterOptions>,
    ) -> Registration {
        let factory = factory.into();
        let RegisterOptions {
            dependencies,
            name,
            directly,
        } = options.into();

        if !factory.is_callable() {
            if let Some(provided) = factory.provided() {
                let name = name.or_else(|| factory.declared_name().map(str::to_string));
                self.store(name.as_deref(), provided.clone(), directly);
            }
            return Registration::Ready(self.clone());
        }

        let Some(produced) = self.inject(&factory, dependencies.as_ref()) else {
            tracing::debug!(
                "Factory {:?} produced nothing",
                factory.name().unwrap_or_default()
            );
            return Registration::Ready(self.clone());
        };
        let name = name
            .or_else(|| factory.declared_name().map(str::to_string))
            .or_else(|| factory.name().map(str::to_string));

        match produced {
            Produced::Ready(value) => {
                self.store(name.as_deref(), Provided::Ready(value), directly);
                Registration::Ready(self.clone())
            }
            Produced::Bundle(components) => {
                self.store(name.as_deref(), Provided::Bundle(components), directly);
                Registration::Ready(self.clone())
            }
            Produced::Pending(pending) => {
                let container = self.clone();
                Registration::Pending(Box::pin(async move {
                    let label = name.as_deref().unwrap_or_default();
                    match pending.settle().await {
                        Ok(Some(provided)) => container.store(name.as_deref(), provided, directly),
                        Ok(None) => {
                            if let Some(logger) = container.logger() {
                                logger.error(&format!("Can't inject {label}"));
                            }
                        }
                        Err(err) => {
                            if let Some(logger) = container.logger() {
                                logger.error(&format!("Can't inject {label}: {err}"));
                            }
                        }
                    }
                    container
                }))
            }
        }
    }

    pub fn register_directly(&self, factory: impl Into<Factory>) -> Registration {
        self.register_directly_with(factory, RegisterOptions::default())
    }

    pub fn register_directly_with(
        &self,
        factory: impl Into<Factory>,
        options: impl Into<RegisterOptions>,
    ) -> Registration {
        self.register_with(factory, options.into().directly(true))
    }

    /// Store a settled value: every sub-entry of a bundle under its own name,
    /// anything else under `name` when there is one.
    fn store(&self, name: Option<&str>, provided: Provided, directly: bool) {
        match provided {
            Provided::Bundle(components) => {
                for (sub_name, value) in components {
                    self.add_ref(sub_name, value, directly);
                }
            }
            Provided::Ready(value) => match name {
                Some(name) => {
                    self.add_ref(name, value, directly);
                }
                None => tracing::debug!("Dropping unnamed registration {:?}", value),
            },
        }
    }
}
