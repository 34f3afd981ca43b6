use crate::config::ContainerConfig;
use crate::di::{Container, Ref};
use crate::logger::Logger;
use std::sync::Arc;

/// Builder for a root container.
///
/// Collects the configuration, the logging collaborator and the initial
/// references, then creates the container and adds them in order.
///
/// # Example
/// ```
/// use injecta::{ContainerBuilder, TracingLogger};
/// use std::sync::Arc;
///
/// let container = ContainerBuilder::new()
///     .logger(Arc::new(TracingLogger))
///     .add_ref("greeting", "hello")
///     .build();
///
/// assert_eq!(container.resolve::<String>("greeting").unwrap().as_str(), "hello");
/// ```
pub struct ContainerBuilder {
    config: ContainerConfig,
    logger: Option<Arc<dyn Logger>>,
    refs: Vec<(String, Ref, bool)>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            config: ContainerConfig::default(),
            logger: None,
            refs: Vec::new(),
        }
    }

    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Queue a reference, added with [`Container::add_ref`] on build.
    pub fn add_ref(mut self, name: impl Into<String>, value: impl Into<Ref>) -> Self {
        self.refs.push((name.into(), value.into(), false));
        self
    }

    pub fn add_directly(mut self, name: impl Into<String>, value: impl Into<Ref>) -> Self {
        self.refs.push((name.into(), value.into(), true));
        self
    }

    pub fn build(self) -> Container {
        let container = Container::with_config(self.config);
        if let Some(logger) = self.logger {
            container.set_logger(logger);
        }
        for (name, value, directly) in self.refs {
            container.add_ref(name, value, directly);
        }
        container
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::TracingLogger;

    #[test]
    fn test_build() {
        let container = ContainerBuilder::new()
            .config(ContainerConfig::default().logger_key("log"))
            .logger(Arc::new(TracingLogger))
            .add_ref("swap", "s")
            .add_directly("fixed", "f")
            .add_ref("swap", "s2")
            .build();

        assert!(container.logger().is_some());
        assert!(container.contains_own("log"));
        assert!(container.get("swap").unwrap().is_swappable());
        assert!(!container.get("fixed").unwrap().is_swappable());
        assert_eq!(container.resolve::<String>("swap").unwrap().as_str(), "s2");
    }
}
