use crate::di::{Container, Registration};

/// A reusable group of registrations.
///
/// # Example
/// ```
/// use injecta::{Args, Container, Factory, Module, Produced, Registration};
///
/// struct GreetingModule;
///
/// impl Module for GreetingModule {
///     fn register(&self, container: &Container) -> Registration {
///         container.add_ref("name", "world", false);
///         container.register(
///             Factory::function("greeting", |args: &Args| {
///                 let name = args.value::<String>(0)?;
///                 Some(Produced::value(format!("hello {name}")))
///             })
///             .with_dependencies(["name"]),
///         )
///     }
/// }
///
/// let container = Container::new();
/// let _ = container.install(&GreetingModule);
/// assert_eq!(container.resolve::<String>("greeting").unwrap().as_str(), "hello world");
/// ```
pub trait Module {
    /// Register this module's references and factories into `container`.
    fn register(&self, container: &Container) -> Registration;
}

impl Container {
    pub fn install(&self, module: &dyn Module) -> Registration {
        tracing::debug!("Installing module into {:?}", self.names());
        module.register(self)
    }

    /// Install `modules` one after another; each waits for the previous one to settle.
    pub fn install_all(&self, modules: Vec<Box<dyn Module + Send>>) -> Registration {
        let mut modules = modules.into_iter();
        let Some(first) = modules.next() else {
            return Registration::Ready(self.clone());
        };
        let registration = first.register(self);
        let rest: Vec<_> = modules.collect();
        if rest.is_empty() {
            return registration;
        }
        match registration {
            Registration::Ready(container) => container.install_all(rest),
            Registration::Pending(pending) => Registration::Pending(Box::pin(async move {
                pending.await.install_all(rest).await
            })),
        }
    }
}
