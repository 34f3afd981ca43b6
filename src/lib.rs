//! # Injecta
//!
//! A runtime dependency injection container with named references.
//!
//! Services, values and factories are stored under names. Registering a
//! factory resolves its declared dependency names against the container,
//! invokes it, and stores what it produces under a new name that later
//! registrations can depend on in turn.
//!
//! ## Features
//!
//! - **Swappable references**: entries added with [`Container::add_ref`] sit
//!   behind a proxy, so re-adding a name updates every earlier holder
//! - **Child containers**: [`Container::clone_with`] reads through to its
//!   parent and never writes to it
//! - **Async factories**: a pending result turns the registration into a
//!   future that stores the value once it settles
//! - **Component bundles**: one factory can register several names at once
//! - **Derives**: `#[derive(Construct)]` and `#[factory]` declare dependencies
//!   from field and parameter names
//!
//! ## Quick Start
//!
//! ```rust
//! use injecta::{Args, Container, Deps, Factory, Produced};
//!
//! struct Greeter {
//!     text: String,
//! }
//!
//! let container = Container::new();
//! container.add_ref("a", "a1", false);
//!
//! let factory = Factory::function("sync1", |args: &Args| {
//!     let a = args.value::<String>(0)?;
//!     let b = args.value::<String>(1)?;
//!     Some(Produced::value(Greeter { text: format!("{a}{b}") }))
//! })
//! .with_signature("fn sync1(a, b)");
//!
//! let _ = container.register_with(factory, Deps::new().with("b", "load"));
//! assert_eq!(container.resolve::<Greeter>("sync1").unwrap().text, "a1load");
//! ```

pub mod config;
pub mod di;
pub mod error;
pub mod logger;
pub mod module;

// Re-export core types
pub use config::ContainerConfig;
pub use di::{
    Args, Components, Construct, Container, ContainerBuilder, Deps, Entry, Factory, FactoryKind,
    FromArg, IntoProduced, Produced, Provided, Ref, RegisterOptions, Registration, Value,
};
pub use error::{InjectaError, Result};
pub use logger::{Logger, TracingLogger};
pub use module::Module;

// Re-export macros
pub use injecta_macro::{Construct, factory};

#[doc(hidden)]
pub mod __private {
    pub use anyhow;
    pub use tracing;
}

/// Prelude module for convenient imports
///
/// ```
/// use injecta::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::ContainerConfig;
    pub use crate::di::{
        Args, Components, Container, ContainerBuilder, Deps, Entry, Factory, FactoryKind, FromArg,
        IntoProduced, Produced, Ref, RegisterOptions, Registration, Value,
    };
    pub use crate::error::{InjectaError, Result};
    pub use crate::logger::{Logger, TracingLogger};
    pub use crate::module::Module;
    pub use crate::{Construct, factory};
    pub use std::sync::Arc;
}
